//! Prescription draft types.
//!
//! A draft is produced only by [`crate::PrescriptionComposer::submit`]. Its fields are private and
//! exposed read-only, so a draft is never patched in place: a new submission produces a new draft.

use crate::dosage::DosageCode;
use crate::medicine::{DosageStrength, MealRelation, Quantity, Schedule};
use rx_types::{AppointmentId, NonEmptyText};
use serde::{Deserialize, Serialize};

/// Prescribing doctor, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInfo {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub registration_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub logo_ref: Option<String>,
}

impl DoctorInfo {
    pub fn new(name: NonEmptyText) -> Self {
        Self {
            name,
            specialization: String::new(),
            registration_id: String::new(),
            address: String::new(),
            phone: String::new(),
            logo_ref: None,
        }
    }
}

/// Vital values as they go onto the prescription. Empty means not recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftVitals {
    pub blood_pressure: String,
    pub sugar: String,
    pub weight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftComplaints {
    pub selected: Vec<String>,
    pub notes: String,
}

/// A medicine row that survived submission, with its derived dosage code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftMedicine {
    pub name: String,
    #[schema(value_type = String)]
    pub quantity: Quantity,
    pub dosage: DosageStrength,
    pub schedule: Schedule,
    #[serde(flatten)]
    pub dosage_code: DosageCode,
}

impl DraftMedicine {
    pub fn meal_relation(&self) -> MealRelation {
        self.schedule.meal_relation
    }

    pub fn daily_dose_code(&self) -> &str {
        &self.dosage_code.daily_dose_code
    }

    pub fn preview_label(&self) -> &str {
        &self.dosage_code.preview_label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    created_date: String,
    #[schema(value_type = String)]
    appointment_id: AppointmentId,
    doctor: DoctorInfo,
    vitals: DraftVitals,
    complaints: DraftComplaints,
    medicines: Vec<DraftMedicine>,
    advice_notes: String,
}

impl PrescriptionDraft {
    pub(crate) fn new(
        created_date: String,
        appointment_id: AppointmentId,
        doctor: DoctorInfo,
        vitals: DraftVitals,
        complaints: DraftComplaints,
        medicines: Vec<DraftMedicine>,
        advice_notes: String,
    ) -> Self {
        Self {
            created_date,
            appointment_id,
            doctor,
            vitals,
            complaints,
            medicines,
            advice_notes,
        }
    }

    /// Date the draft was composed, formatted `dd/mm/yyyy`.
    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn appointment_id(&self) -> &AppointmentId {
        &self.appointment_id
    }

    pub fn doctor(&self) -> &DoctorInfo {
        &self.doctor
    }

    pub fn vitals(&self) -> &DraftVitals {
        &self.vitals
    }

    pub fn complaints(&self) -> &DraftComplaints {
        &self.complaints
    }

    pub fn medicines(&self) -> &[DraftMedicine] {
        &self.medicines
    }

    pub fn advice_notes(&self) -> &str {
        &self.advice_notes
    }
}
