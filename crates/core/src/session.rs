//! Session identity and the authoring state machine.
//!
//! Identity (role, doctor, hospital, token) is resolved once when the host starts a session and
//! handed to the components that need it; nothing here reads ambient storage.
//!
//! Authoring one appointment's prescription moves through three states:
//!
//! ```text
//! Editing --submit ok--> Preview --confirm_save ok--> Finalized
//!    ^                      |
//!    +--------back----------+
//! ```
//!
//! A failed submit stays in `Editing`; a failed save stays in `Preview` so the user can retry
//! without re-entering anything.

use crate::composer::PrescriptionComposer;
use crate::draft::PrescriptionDraft;
use crate::finalize::{finalize, ClinicApi};
use crate::preview::{PreviewRenderer, PrintFacility};
use crate::{PrescriptionError, PrescriptionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Staff => "staff",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = PrescriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "staff" => Ok(Role::Staff),
            other => Err(PrescriptionError::InvalidInput(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

/// Who is using the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    role: Role,
    doctor_id: Option<String>,
    hospital_id: Option<String>,
    token: Option<String>,
}

impl SessionContext {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            doctor_id: None,
            hospital_id: None,
            token: None,
        }
    }

    pub fn with_doctor_id(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    pub fn with_hospital_id(mut self, hospital_id: impl Into<String>) -> Self {
        self.hospital_id = Some(hospital_id.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn doctor_id(&self) -> Option<&str> {
        self.doctor_id.as_deref()
    }

    pub fn hospital_id(&self) -> Option<&str> {
        self.hospital_id.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Route guard: fail unless the session's role is one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> PrescriptionResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(PrescriptionError::Forbidden {
                role: self.role.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthoringState {
    Editing,
    Preview(PrescriptionDraft),
    Finalized,
}

impl AuthoringState {
    fn describe(&self) -> &'static str {
        match self {
            AuthoringState::Editing => "editing",
            AuthoringState::Preview(_) => "previewing",
            AuthoringState::Finalized => "finalized",
        }
    }
}

/// What the host should do after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// Forget the persisted appointment selection.
    pub clear_appointment_context: bool,
    pub message: Option<String>,
}

pub struct AuthoringSession {
    session: SessionContext,
    composer: PrescriptionComposer,
    renderer: PreviewRenderer,
    state: AuthoringState,
}

impl AuthoringSession {
    /// Start authoring. Only doctors may write prescriptions.
    ///
    /// # Errors
    ///
    /// Returns `PrescriptionError::Forbidden` for any other role and
    /// `PrescriptionError::InvalidInput` when the session carries no doctor id.
    pub fn new(
        session: SessionContext,
        composer: PrescriptionComposer,
        renderer: PreviewRenderer,
    ) -> PrescriptionResult<Self> {
        session.require_role(&[Role::Doctor])?;
        if session.doctor_id().map_or(true, |id| id.trim().is_empty()) {
            return Err(PrescriptionError::InvalidInput(
                "doctor session has no doctor id".into(),
            ));
        }

        Ok(Self {
            session,
            composer,
            renderer,
            state: AuthoringState::Editing,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn state(&self) -> &AuthoringState {
        &self.state
    }

    pub fn composer(&self) -> &PrescriptionComposer {
        &self.composer
    }

    /// Editable form state; only available while editing.
    pub fn composer_mut(&mut self) -> PrescriptionResult<&mut PrescriptionComposer> {
        match self.state {
            AuthoringState::Editing => Ok(&mut self.composer),
            ref other => Err(PrescriptionError::InvalidState(other.describe())),
        }
    }

    pub fn draft(&self) -> Option<&PrescriptionDraft> {
        match &self.state {
            AuthoringState::Preview(draft) => Some(draft),
            _ => None,
        }
    }

    /// Compose a draft dated today and move to preview.
    pub fn submit(&mut self) -> PrescriptionResult<&PrescriptionDraft> {
        self.submit_on(chrono::Local::now().date_naive())
    }

    /// Compose a draft dated `date` and move to preview.
    ///
    /// Validation failures leave the session editing.
    pub fn submit_on(&mut self, date: chrono::NaiveDate) -> PrescriptionResult<&PrescriptionDraft> {
        if self.state != AuthoringState::Editing {
            return Err(PrescriptionError::InvalidState(self.state.describe()));
        }

        let draft = self.composer.submit_on(date).map_err(|e| {
            tracing::debug!("prescription submit rejected: {}", e);
            e
        })?;
        self.state = AuthoringState::Preview(draft);

        match &self.state {
            AuthoringState::Preview(draft) => Ok(draft),
            _ => Err(PrescriptionError::InvalidState(self.state.describe())),
        }
    }

    /// Discard the draft and resume editing from the composer's current state.
    pub fn back(&mut self) -> PrescriptionResult<()> {
        match self.state {
            AuthoringState::Preview(_) => {
                self.state = AuthoringState::Editing;
                Ok(())
            }
            ref other => Err(PrescriptionError::InvalidState(other.describe())),
        }
    }

    /// Rendered preview of the current draft.
    pub fn render(&self) -> PrescriptionResult<String> {
        self.draft()
            .map(|draft| self.renderer.render(draft))
            .ok_or(PrescriptionError::InvalidState(self.state.describe()))
    }

    /// Send the rendered preview to the host's print facility.
    pub fn print(&self, printer: &dyn PrintFacility) -> PrescriptionResult<()> {
        let document = self.render()?;
        printer.print(&document);
        Ok(())
    }

    /// Finalize the previewed draft with the clinic API.
    ///
    /// On failure the session stays in preview with the same draft, so the call can be retried.
    pub async fn confirm_save<A: ClinicApi>(
        &mut self,
        api: &A,
    ) -> PrescriptionResult<FinalizeOutcome> {
        let AuthoringState::Preview(draft) = &self.state else {
            return Err(PrescriptionError::InvalidState(self.state.describe()));
        };
        let doctor_id = self.session.doctor_id().unwrap_or_default();
        let hospital = self.session.hospital_id().unwrap_or("-");

        match finalize(api, draft.appointment_id(), draft, doctor_id).await {
            Ok(receipt) => {
                tracing::info!(
                    appointment = %receipt.appointment_id,
                    hospital,
                    "prescription finalized"
                );
                self.state = AuthoringState::Finalized;
                Ok(FinalizeOutcome {
                    clear_appointment_context: true,
                    message: receipt.message,
                })
            }
            Err(e) => {
                tracing::error!(
                    appointment = %draft.appointment_id(),
                    hospital,
                    "prescription finalize failed: {}",
                    e
                );
                Err(e.into())
            }
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.state == AuthoringState::Finalized
    }
}
