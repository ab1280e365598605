//! Prescription composer.
//!
//! Owns the in-progress vitals, complaints, medicine rows and advice for one appointment and turns
//! them into an immutable [`PrescriptionDraft`]. Composing never touches the network; the draft is
//! previewed first and finalized as a separate step.

use crate::complaints::ComplaintSet;
use crate::constants::DRAFT_DATE_FORMAT;
use crate::dosage::encode;
use crate::draft::{DoctorInfo, DraftComplaints, DraftMedicine, PrescriptionDraft};
use crate::error::ValidationError;
use crate::medicine::MedicineList;
use crate::vitals::VitalsCapture;
use chrono::NaiveDate;
use rx_types::AppointmentId;

#[derive(Debug, Clone)]
pub struct PrescriptionComposer {
    appointment_id: Option<AppointmentId>,
    doctor: DoctorInfo,
    vitals: VitalsCapture,
    complaints: ComplaintSet,
    medicines: MedicineList,
    advice_notes: String,
}

impl PrescriptionComposer {
    /// Start composing for `appointment_id`, with one empty medicine row ready for input.
    ///
    /// A missing appointment is accepted here and reported by [`Self::submit`], matching a form
    /// that opens before the host has resolved its appointment selection.
    pub fn new(
        appointment_id: Option<AppointmentId>,
        doctor: DoctorInfo,
        complaint_vocabulary: Vec<String>,
    ) -> Self {
        let mut medicines = MedicineList::new();
        medicines.add_row();

        Self {
            appointment_id,
            doctor,
            vitals: VitalsCapture::new(),
            complaints: ComplaintSet::new(complaint_vocabulary),
            medicines,
            advice_notes: String::new(),
        }
    }

    pub fn appointment_id(&self) -> Option<&AppointmentId> {
        self.appointment_id.as_ref()
    }

    pub fn doctor(&self) -> &DoctorInfo {
        &self.doctor
    }

    pub fn vitals(&self) -> &VitalsCapture {
        &self.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut VitalsCapture {
        &mut self.vitals
    }

    pub fn complaints(&self) -> &ComplaintSet {
        &self.complaints
    }

    pub fn complaints_mut(&mut self) -> &mut ComplaintSet {
        &mut self.complaints
    }

    pub fn medicines(&self) -> &MedicineList {
        &self.medicines
    }

    pub fn medicines_mut(&mut self) -> &mut MedicineList {
        &mut self.medicines
    }

    pub fn advice_notes(&self) -> &str {
        &self.advice_notes
    }

    pub fn set_advice_notes(&mut self, notes: impl Into<String>) {
        self.advice_notes = notes.into();
    }

    /// Compose a draft dated today (local time).
    pub fn submit(&self) -> Result<PrescriptionDraft, ValidationError> {
        self.submit_on(chrono::Local::now().date_naive())
    }

    /// Compose a draft dated `date`.
    ///
    /// # Errors
    ///
    /// - `ValidationError::MissingContext` when no appointment is attached.
    /// - `ValidationError::NoMedicines` when every medicine row has a blank name.
    pub fn submit_on(&self, date: NaiveDate) -> Result<PrescriptionDraft, ValidationError> {
        let Some(appointment_id) = self.appointment_id.clone() else {
            return Err(ValidationError::MissingContext);
        };

        let medicines: Vec<DraftMedicine> = self
            .medicines
            .named_entries()
            .map(|entry| DraftMedicine {
                name: entry.name.trim().to_string(),
                quantity: entry.quantity.clone(),
                dosage: entry.dosage,
                schedule: entry.schedule,
                dosage_code: encode(&entry.schedule),
            })
            .collect();

        if medicines.is_empty() {
            return Err(ValidationError::NoMedicines);
        }

        tracing::debug!(
            appointment = %appointment_id,
            medicines = medicines.len(),
            "prescription draft composed"
        );

        Ok(PrescriptionDraft::new(
            date.format(DRAFT_DATE_FORMAT).to_string(),
            appointment_id,
            self.doctor.clone(),
            self.vitals.snapshot(),
            DraftComplaints {
                selected: self.complaints.selected().to_vec(),
                notes: self.complaints.notes().to_string(),
            },
            medicines,
            self.advice_notes.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COMMON_COMPLAINTS;
    use crate::medicine::{MealRelation, MedicineField, ScheduleUpdate};
    use crate::vitals::VitalField;
    use rx_types::NonEmptyText;

    fn doctor() -> DoctorInfo {
        DoctorInfo::new(NonEmptyText::new("Dr. Asha Rao").expect("valid name"))
    }

    fn composer(appointment: Option<&str>) -> PrescriptionComposer {
        PrescriptionComposer::new(
            appointment.map(|a| AppointmentId::new(a).expect("valid id")),
            doctor(),
            COMMON_COMPLAINTS.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn add_medicine(
        composer: &mut PrescriptionComposer,
        name: &str,
        updates: &[ScheduleUpdate],
    ) {
        let list = composer.medicines_mut();
        let reuse_last = list
            .len()
            .checked_sub(1)
            .and_then(|last| list.get(last))
            .is_some_and(|last| !last.has_name());
        if !reuse_last {
            list.add_row();
        }
        let index = list.len() - 1;
        list.update_field(index, MedicineField::Name(name.into()));
        for update in updates {
            list.update_schedule(index, *update);
        }
    }

    #[test]
    fn test_starts_with_one_empty_row() {
        let composer = composer(Some("appt-1"));
        assert_eq!(composer.medicines().len(), 1);
        assert!(!composer.medicines().get(0).expect("row").has_name());
    }

    #[test]
    fn test_missing_context_is_checked_first() {
        let composer = composer(None);
        assert_eq!(composer.submit_on(date()), Err(ValidationError::MissingContext));
    }

    #[test]
    fn test_all_blank_medicines_is_rejected() {
        let mut composer = composer(Some("appt-1"));
        composer.medicines_mut().add_row();
        composer
            .medicines_mut()
            .update_field(1, MedicineField::Name("   ".into()));
        assert_eq!(composer.submit_on(date()), Err(ValidationError::NoMedicines));
    }

    #[test]
    fn test_single_named_medicine_among_blanks() {
        let mut composer = composer(Some("appt-1"));
        composer.medicines_mut().add_row();
        composer.medicines_mut().add_row();
        composer
            .medicines_mut()
            .update_field(1, MedicineField::Name("Paracetamol".into()));

        let draft = composer.submit_on(date()).expect("valid draft");
        assert_eq!(draft.medicines().len(), 1);
        assert_eq!(draft.medicines()[0].name, "Paracetamol");
    }

    #[test]
    fn test_two_medicines_are_encoded_in_order() {
        let mut composer = composer(Some("appt-1"));
        add_medicine(
            &mut composer,
            "Amoxicillin",
            &[ScheduleUpdate::Morning(true), ScheduleUpdate::Night(true)],
        );
        add_medicine(
            &mut composer,
            "Vitamin D",
            &[
                ScheduleUpdate::Morning(true),
                ScheduleUpdate::Meal(MealRelation::Before),
            ],
        );

        let draft = composer.submit_on(date()).expect("valid draft");
        let summary: Vec<_> = draft
            .medicines()
            .iter()
            .map(|m| (m.name.as_str(), m.daily_dose_code(), m.preview_label()))
            .collect();
        assert_eq!(
            summary,
            [
                ("Amoxicillin", "1-0-1", "M-N (After Food)"),
                ("Vitamin D", "1-0-0", "M (Before Food)"),
            ]
        );
    }

    #[test]
    fn test_draft_folds_vitals_complaints_and_advice() {
        let mut composer = composer(Some("appt-9"));
        add_medicine(&mut composer, "  Cetirizine ", &[]);
        composer
            .vitals_mut()
            .record(VitalField::BloodPressure, Some("120/80 mmHg".into()));
        composer.vitals_mut().set_recorded(VitalField::Sugar, true);
        composer.vitals_mut().set_value(VitalField::Sugar, "95 mg/dl");
        composer.vitals_mut().set_recorded(VitalField::Sugar, false);
        composer.complaints_mut().toggle("Cough").expect("known");
        composer.complaints_mut().set_notes("Dry cough at night");
        composer.set_advice_notes("Steam inhalation twice daily");

        let draft = composer.submit_on(date()).expect("valid draft");
        assert_eq!(draft.created_date(), "14/03/2026");
        assert_eq!(draft.appointment_id().as_str(), "appt-9");
        assert_eq!(draft.vitals().blood_pressure, "120/80 mmHg");
        assert_eq!(draft.vitals().sugar, "");
        assert_eq!(draft.complaints().selected, ["Cough"]);
        assert_eq!(draft.complaints().notes, "Dry cough at night");
        assert_eq!(draft.advice_notes(), "Steam inhalation twice daily");
        assert_eq!(draft.medicines()[0].name, "Cetirizine");
    }

    #[test]
    fn test_submit_does_not_consume_editing_state() {
        let mut composer = composer(Some("appt-1"));
        add_medicine(&mut composer, "Paracetamol", &[]);
        let first = composer.submit_on(date()).expect("valid");
        let second = composer.submit_on(date()).expect("valid");
        assert_eq!(first, second);
        assert_eq!(composer.medicines().len(), 1);
    }
}
