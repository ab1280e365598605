//! Patient visit history.
//!
//! The selected appointment record embeds the patient's past prescriptions. This module reads
//! that record and summarises each past prescription as a visit for display beside the authoring
//! form.

use crate::constants::{DRAFT_DATE_FORMAT, NOT_AVAILABLE};
use crate::dosage::{decode_daily_dose, time_letters};
use crate::medicine::Quantity;
use crate::{PrescriptionError, PrescriptionResult};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_VISIT_REASON: &str = "General consultation";
const NO_ADVICE: &str = "No advice provided.";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastMedication {
    #[serde(default)]
    pub medicine: String,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub daily_dose: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastPrescription {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub bp: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<PastMedication>,
}

/// The patient part of an appointment record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub prescriptions: Vec<PastPrescription>,
}

impl PatientRecord {
    pub fn from_json_str(content: &str) -> PrescriptionResult<Self> {
        serde_json::from_str(content).map_err(PrescriptionError::JsonDeserialization)
    }

    pub fn from_json_file(path: &Path) -> PrescriptionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(PrescriptionError::FileRead)?;
        Self::from_json_str(&content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitMedicine {
    pub name: String,
    /// `"{quantity} tabs"`.
    pub dosage: String,
    /// The stored daily dose code, e.g. `1-0-1`.
    pub when: String,
    /// `M-N` style letters, or the raw code when it cannot be decoded.
    pub when_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub visit_date: String,
    pub reason: String,
    pub bp: String,
    pub advice: String,
    pub medicines: Vec<VisitMedicine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientHistory {
    pub patient_name: String,
    pub mobile: String,
    pub visits: Vec<VisitSummary>,
}

impl PatientHistory {
    /// Summarise every past prescription in `record`.
    ///
    /// `reason` is the reason recorded on the current appointment; it is shown on every visit and
    /// defaults to a general consultation.
    pub fn from_record(record: &PatientRecord, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_VISIT_REASON);

        let visits = record
            .prescriptions
            .iter()
            .map(|past| VisitSummary::from_past(past, reason))
            .collect();

        Self {
            patient_name: record.name.clone(),
            mobile: record.phone.clone(),
            visits,
        }
    }
}

impl VisitSummary {
    fn from_past(past: &PastPrescription, reason: &str) -> Self {
        let bp = past
            .bp
            .as_deref()
            .map(str::trim)
            .filter(|bp| !bp.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        let advice = if past.instructions.is_empty() {
            NO_ADVICE.to_string()
        } else {
            past.instructions.join(", ")
        };

        let medicines = past
            .medications
            .iter()
            .map(|m| VisitMedicine {
                name: m.medicine.clone(),
                dosage: format!("{} tabs", m.quantity.as_str()),
                when: m.daily_dose.clone(),
                when_label: match decode_daily_dose(&m.daily_dose) {
                    Some((morning, afternoon, night)) => time_letters(morning, afternoon, night),
                    None => m.daily_dose.clone(),
                },
            })
            .collect();

        Self {
            visit_date: format_visit_date(&past.created_at),
            reason: reason.to_string(),
            bp,
            advice,
            medicines,
        }
    }
}

/// Format an RFC 3339 timestamp or a plain `YYYY-MM-DD` date as `dd/mm/yyyy`.
/// Timestamps are shown in local time. Anything else is shown as stored.
fn format_visit_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp
            .with_timezone(&Local)
            .format(DRAFT_DATE_FORMAT)
            .to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(DRAFT_DATE_FORMAT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_date(timestamp: &str) -> String {
        DateTime::parse_from_rfc3339(timestamp)
            .expect("valid timestamp")
            .with_timezone(&Local)
            .format("%d/%m/%Y")
            .to_string()
    }

    const RECORD: &str = r#"{
        "name": "Ravi Kumar",
        "phone": "9876543210",
        "prescriptions": [
            {
                "createdAt": "2025-11-03T09:15:00.000Z",
                "bp": "130/85",
                "instructions": ["Rest", "Hydrate"],
                "medications": [
                    {"medicine": "Amoxicillin", "quantity": 10, "dailyDose": "1-0-1"},
                    {"medicine": "Cetirizine", "quantity": "5", "dailyDose": "0-0-1"}
                ]
            },
            {
                "createdAt": "2025-12-20",
                "medications": [
                    {"medicine": "ORS", "quantity": 2, "dailyDose": "as needed"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_history_maps_past_prescriptions() {
        let record = PatientRecord::from_json_str(RECORD).expect("valid json");
        let history = PatientHistory::from_record(&record, Some("Follow-up"));

        assert_eq!(history.patient_name, "Ravi Kumar");
        assert_eq!(history.mobile, "9876543210");
        assert_eq!(history.visits.len(), 2);

        let first = &history.visits[0];
        assert_eq!(first.visit_date, local_date("2025-11-03T09:15:00.000Z"));
        assert_eq!(first.reason, "Follow-up");
        assert_eq!(first.bp, "130/85");
        assert_eq!(first.advice, "Rest, Hydrate");
        assert_eq!(first.medicines[0].dosage, "10 tabs");
        assert_eq!(first.medicines[0].when, "1-0-1");
        assert_eq!(first.medicines[0].when_label, "M-N");
        assert_eq!(first.medicines[1].dosage, "5 tabs");
        assert_eq!(first.medicines[1].when_label, "N");
    }

    #[test]
    fn test_history_fallbacks() {
        let record = PatientRecord::from_json_str(RECORD).expect("valid json");
        let history = PatientHistory::from_record(&record, None);

        let second = &history.visits[1];
        assert_eq!(second.visit_date, "20/12/2025");
        assert_eq!(second.reason, "General consultation");
        assert_eq!(second.bp, "N/A");
        assert_eq!(second.advice, "No advice provided.");
        assert_eq!(second.medicines[0].when_label, "as needed");
    }

    #[test]
    fn test_timestamps_use_local_date() {
        let late = "2025-11-03T23:30:00Z";
        assert_eq!(format_visit_date(late), local_date(late));
        let offset = "2025-11-04T01:00:00+05:30";
        assert_eq!(format_visit_date(offset), local_date(offset));
        assert_eq!(format_visit_date(" 2025-11-03 "), "03/11/2025");
    }

    #[test]
    fn test_unparsable_date_is_kept() {
        assert_eq!(format_visit_date("last tuesday"), "last tuesday");
    }

    #[test]
    fn test_empty_record() {
        let history = PatientHistory::from_record(&PatientRecord::default(), Some("  "));
        assert!(history.visits.is_empty());
        assert!(history.patient_name.is_empty());
    }
}
