//! Declarative prescription form.
//!
//! A form is the whole authoring input in one document (YAML for the CLI, JSON for the REST
//! facade). [`PrescriptionComposer::from_form`] replays it through the same editor operations a
//! user would perform, so every invariant of the interactive path applies.

use crate::composer::PrescriptionComposer;
use crate::draft::DoctorInfo;
use crate::medicine::{DosageStrength, MealRelation, MedicineField, Quantity, ScheduleUpdate};
use crate::vitals::VitalField;
use crate::{PrescriptionError, PrescriptionResult};
use rx_types::AppointmentId;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormVitals {
    /// Present when recorded.
    #[serde(default)]
    pub blood_pressure: Option<String>,
    #[serde(default)]
    pub sugar: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormMedicine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = String)]
    pub quantity: Quantity,
    #[serde(default)]
    pub dosage: DosageStrength,
    #[serde(default)]
    pub morning: bool,
    #[serde(default)]
    pub afternoon: bool,
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub meal: MealRelation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionForm {
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub vitals: FormVitals,
    #[serde(default)]
    pub complaints: Vec<String>,
    #[serde(default)]
    pub complaint_notes: String,
    #[serde(default)]
    pub medicines: Vec<FormMedicine>,
    #[serde(default)]
    pub advice: String,
}

impl PrescriptionForm {
    pub fn from_yaml_str(content: &str) -> PrescriptionResult<Self> {
        serde_yaml::from_str(content).map_err(PrescriptionError::YamlDeserialization)
    }

    pub fn from_yaml_file(path: &Path) -> PrescriptionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(PrescriptionError::FileRead)?;
        Self::from_yaml_str(&content)
    }

    /// The appointment in the form, if any. Blank counts as absent.
    pub fn appointment(&self) -> PrescriptionResult<Option<AppointmentId>> {
        match self.appointment_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) => Ok(Some(AppointmentId::new(id)?)),
        }
    }
}

impl PrescriptionComposer {
    /// Build a composer by replaying `form`.
    ///
    /// `fallback_appointment` is used when the form does not name one, mirroring a host that
    /// keeps the selected appointment outside the form.
    ///
    /// # Errors
    ///
    /// Returns `PrescriptionError::InvalidInput` for complaints outside `complaint_vocabulary`,
    /// and `PrescriptionError::Text` for a malformed appointment id.
    pub fn from_form(
        form: &PrescriptionForm,
        fallback_appointment: Option<AppointmentId>,
        doctor: DoctorInfo,
        complaint_vocabulary: Vec<String>,
    ) -> PrescriptionResult<Self> {
        let appointment = form.appointment()?.or(fallback_appointment);
        let mut composer = PrescriptionComposer::new(appointment, doctor, complaint_vocabulary);

        let vitals = composer.vitals_mut();
        vitals.record(VitalField::BloodPressure, form.vitals.blood_pressure.clone());
        vitals.record(VitalField::Sugar, form.vitals.sugar.clone());
        vitals.record(VitalField::Weight, form.vitals.weight.clone());

        let complaints = composer.complaints_mut();
        for complaint in &form.complaints {
            if !complaints.is_selected(complaint) {
                complaints.toggle(complaint)?;
            }
        }
        complaints.set_notes(form.complaint_notes.clone());

        let list = composer.medicines_mut();
        for (index, medicine) in form.medicines.iter().enumerate() {
            if index >= list.len() {
                list.add_row();
            }
            list.update_field(index, MedicineField::Name(medicine.name.clone()));
            list.update_field(index, MedicineField::Quantity(medicine.quantity.clone()));
            list.update_field(index, MedicineField::Dosage(medicine.dosage));
            list.update_schedule(index, ScheduleUpdate::Morning(medicine.morning));
            list.update_schedule(index, ScheduleUpdate::Afternoon(medicine.afternoon));
            list.update_schedule(index, ScheduleUpdate::Night(medicine.night));
            list.update_schedule(index, ScheduleUpdate::Meal(medicine.meal));
        }

        composer.set_advice_notes(form.advice.clone());
        Ok(composer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COMMON_COMPLAINTS;
    use crate::error::ValidationError;
    use rx_types::NonEmptyText;

    const FORM: &str = r#"
appointmentId: appt-77
vitals:
  bloodPressure: 120/80 mmHg
  weight: 72 kg
complaints: [Fever, Body Ache]
complaintNotes: Since yesterday evening
medicines:
  - name: Amoxicillin
    quantity: 10
    dosage: 1 tab
    morning: true
    night: true
  - name: Vitamin D
    quantity: "4"
    morning: true
    meal: before
  - name: ""
advice: Drink plenty of fluids
"#;

    fn vocabulary() -> Vec<String> {
        COMMON_COMPLAINTS.iter().map(|c| c.to_string()).collect()
    }

    fn doctor() -> DoctorInfo {
        DoctorInfo::new(NonEmptyText::new("Dr. Asha Rao").expect("valid"))
    }

    #[test]
    fn test_yaml_form_replays_into_draft() {
        let form = PrescriptionForm::from_yaml_str(FORM).expect("valid yaml");
        let composer =
            PrescriptionComposer::from_form(&form, None, doctor(), vocabulary()).expect("valid");

        let draft = composer.submit().expect("valid draft");
        assert_eq!(draft.appointment_id().as_str(), "appt-77");
        assert_eq!(draft.vitals().blood_pressure, "120/80 mmHg");
        assert_eq!(draft.vitals().sugar, "");
        assert_eq!(draft.vitals().weight, "72 kg");
        assert_eq!(draft.complaints().selected, ["Fever", "Body Ache"]);
        assert_eq!(draft.medicines().len(), 2);
        assert_eq!(draft.medicines()[0].quantity.as_str(), "10");
        assert_eq!(draft.medicines()[1].preview_label(), "M (Before Food)");
        assert_eq!(draft.advice_notes(), "Drink plenty of fluids");
    }

    #[test]
    fn test_fallback_appointment_is_used_when_form_has_none() {
        let form = PrescriptionForm {
            medicines: vec![FormMedicine {
                name: "Paracetamol".into(),
                ..FormMedicine::default()
            }],
            ..PrescriptionForm::default()
        };

        let composer = PrescriptionComposer::from_form(&form, None, doctor(), vocabulary())
            .expect("valid");
        assert_eq!(composer.submit(), Err(ValidationError::MissingContext));

        let fallback = AppointmentId::new("appt-host").expect("valid");
        let composer =
            PrescriptionComposer::from_form(&form, Some(fallback), doctor(), vocabulary())
                .expect("valid");
        assert_eq!(
            composer.submit().expect("draft").appointment_id().as_str(),
            "appt-host"
        );
    }

    #[test]
    fn test_duplicate_complaints_do_not_toggle_off() {
        let form = PrescriptionForm {
            appointment_id: Some("a1".into()),
            complaints: vec!["Cough".into(), "Cough".into()],
            ..PrescriptionForm::default()
        };
        let composer =
            PrescriptionComposer::from_form(&form, None, doctor(), vocabulary()).expect("valid");
        assert_eq!(composer.complaints().selected(), ["Cough"]);
    }

    #[test]
    fn test_unknown_complaint_is_rejected() {
        let form = PrescriptionForm {
            complaints: vec!["Hiccups".into()],
            ..PrescriptionForm::default()
        };
        let err = PrescriptionComposer::from_form(&form, None, doctor(), vocabulary())
            .expect_err("should reject");
        assert!(matches!(err, PrescriptionError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_appointment_is_rejected() {
        let form = PrescriptionForm {
            appointment_id: Some("../../admin".into()),
            ..PrescriptionForm::default()
        };
        let err = PrescriptionComposer::from_form(&form, None, doctor(), vocabulary())
            .expect_err("should reject");
        assert!(matches!(err, PrescriptionError::Text(_)));
    }
}
