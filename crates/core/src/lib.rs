//! # RX Core
//!
//! Core business logic for authoring a prescription against an appointment.
//!
//! This crate contains the pure authoring workflow:
//! - Vitals capture, complaint selection and the medicine list editor
//! - Dosage encoding (`1-0-1` codes and `M-N (After Food)` labels)
//! - Composition of an immutable prescription draft, its print preview and the finalize payload
//! - The editing → preview → finalized state machine for one appointment
//!
//! **No transport concerns**: the clinic HTTP API is reached through the [`finalize::ClinicApi`]
//! trait, implemented in `rx-client`. REST and CLI surfaces live in `api-rest` and `rx-cli`.

pub mod complaints;
pub mod composer;
pub mod config;
pub mod constants;
pub mod dosage;
pub mod draft;
pub mod error;
pub mod finalize;
pub mod form;
pub mod history;
pub mod medicine;
pub mod preview;
pub mod session;
pub mod vitals;

pub use complaints::ComplaintSet;
pub use composer::PrescriptionComposer;
pub use config::CoreConfig;
pub use dosage::{encode, DosageCode};
pub use draft::{DoctorInfo, DraftComplaints, DraftMedicine, DraftVitals, PrescriptionDraft};
pub use error::{ApiError, PrescriptionError, PrescriptionResult, ValidationError};
pub use finalize::{finalize, ClinicApi, FinalizePayload, FinalizeReceipt, FinalizeResponse};
pub use form::PrescriptionForm;
pub use history::{PatientHistory, PatientRecord, VisitSummary};
pub use medicine::{
    DosageStrength, MealRelation, MedicineCatalog, MedicineEntry, MedicineField, MedicineId,
    MedicineList, Quantity, Schedule, ScheduleUpdate,
};
pub use preview::{PreviewRenderer, PrintFacility};
pub use session::{AuthoringSession, AuthoringState, FinalizeOutcome, Role, SessionContext};
pub use vitals::{VitalField, VitalReading, VitalsCapture};

pub use rx_types::{AppointmentId, NonEmptyText, TextError};
