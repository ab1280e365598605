//! Finalize submission.
//!
//! Maps a draft into the clinic API's finalize payload and submits it. Submission is all or
//! nothing from the caller's point of view: the draft is only borrowed, so a failed call leaves
//! it intact for a retry.

use crate::constants::FINALIZE_OK_STATUS;
use crate::draft::PrescriptionDraft;
use crate::error::ApiError;
use rx_types::AppointmentId;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The remote clinic API consumed by the authoring flow.
pub trait ClinicApi {
    /// Medicine names for autocomplete suggestions.
    fn fetch_common_medicines(&self) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// Durably record a prescription against an appointment.
    fn finalize_appointment(
        &self,
        appointment_id: &AppointmentId,
        payload: &FinalizePayload,
    ) -> impl Future<Output = Result<FinalizeResponse, ApiError>> + Send;
}

/// One medicine line as the clinic API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedicine {
    pub medicine: String,
    pub quantity: i64,
    pub daily_dose: String,
    pub meal_timing: String,
}

/// Body of `PUT /doctor/appointment/finalize/{appointmentId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePayload {
    pub doctor_id: String,
    pub prescriptions: Vec<PrescribedMedicine>,
    /// Free-text notes first, then the selected complaints.
    pub complaints: Vec<String>,
    pub bp: String,
    pub sugar: String,
    pub weight: String,
    pub advice_given: Vec<String>,
}

impl FinalizePayload {
    pub fn from_draft(draft: &PrescriptionDraft, doctor_id: &str) -> Self {
        let prescriptions = draft
            .medicines()
            .iter()
            .map(|m| PrescribedMedicine {
                medicine: m.name.clone(),
                quantity: parse_quantity(m.quantity.as_str()),
                daily_dose: m.daily_dose_code().to_string(),
                meal_timing: m.meal_relation().as_str().to_string(),
            })
            .collect();

        let complaints = std::iter::once(draft.complaints().notes.clone())
            .chain(draft.complaints().selected.iter().cloned())
            .collect();

        let vitals = draft.vitals();
        Self {
            doctor_id: doctor_id.to_string(),
            prescriptions,
            complaints,
            bp: vitals.blood_pressure.clone(),
            sugar: vitals.sugar.clone(),
            weight: vitals.weight.clone(),
            advice_given: vec![draft.advice_notes().to_string()],
        }
    }
}

/// Read the leading integer of a free-text quantity.
///
/// Leading whitespace and a sign are allowed and parsing stops at the first non-digit, so
/// `"10 tabs"` is 10. Anything without digits, or a zero, becomes 1.
pub fn parse_quantity(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let parsed = rest[..digits_len]
        .parse::<i64>()
        .ok()
        .map(|n| if negative { -n } else { n });

    match parsed {
        Some(n) if n != 0 => n,
        _ => 1,
    }
}

/// Response of the finalize endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Proof of a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReceipt {
    pub appointment_id: AppointmentId,
    pub message: Option<String>,
}

/// Submit `draft` for `appointment_id`.
///
/// # Errors
///
/// Returns the client's `ApiError` when the call fails, and `ApiError::Rejected` when the API
/// answers with any status other than `ok`.
pub async fn finalize<A: ClinicApi>(
    api: &A,
    appointment_id: &AppointmentId,
    draft: &PrescriptionDraft,
    doctor_id: &str,
) -> Result<FinalizeReceipt, ApiError> {
    let payload = FinalizePayload::from_draft(draft, doctor_id);
    let response = api.finalize_appointment(appointment_id, &payload).await?;

    if response.status != FINALIZE_OK_STATUS {
        return Err(ApiError::Rejected {
            message: response.message,
        });
    }

    Ok(FinalizeReceipt {
        appointment_id: appointment_id.clone(),
        message: response.message,
    })
}
