use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rx_client::ClinicApiClient;
use rx_core::{
    dosage::encode, AppointmentId, AuthoringSession, CoreConfig, DoctorInfo, MealRelation,
    MedicineCatalog, NonEmptyText, PatientHistory, PatientRecord, PrescriptionComposer,
    PrescriptionError, PrescriptionForm, PreviewRenderer, PrintFacility, Role, Schedule,
    SessionContext, TextError,
};

mod printer;

use printer::{FilePrinter, StdoutPrinter};

#[derive(Parser)]
#[command(name = "rx")]
#[command(about = "Prescription authoring CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a dosing schedule into its daily dose code and preview label
    Encode {
        #[arg(long)]
        morning: bool,
        #[arg(long)]
        afternoon: bool,
        #[arg(long)]
        night: bool,
        /// before or after
        #[arg(long, default_value = "after")]
        meal: MealRelation,
    },
    /// List the selectable complaints
    Complaints,
    /// Suggest medicine names from the clinic catalog
    Suggest {
        /// Fragment of a medicine name
        query: String,
    },
    /// Compose a YAML prescription form and print its preview
    Preview {
        /// Prescription form (YAML)
        form: PathBuf,
        /// Write the preview to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Appointment to use when the form names none
        #[arg(long, env = "RX_APPOINTMENT_ID")]
        appointment: Option<String>,
        #[command(flatten)]
        doctor: DoctorArgs,
    },
    /// Compose a YAML prescription form and record it against its appointment
    Finalize {
        /// Prescription form (YAML)
        form: PathBuf,
        /// Appointment to use when the form names none
        #[arg(long, env = "RX_APPOINTMENT_ID")]
        appointment: Option<String>,
        /// Identifier of the prescribing doctor
        #[arg(long, env = "RX_DOCTOR_ID")]
        doctor_id: String,
        #[arg(long, env = "RX_HOSPITAL_ID")]
        hospital_id: Option<String>,
        #[command(flatten)]
        doctor: DoctorArgs,
    },
    /// Summarise a patient's past prescriptions
    History {
        /// Patient record (JSON) as embedded in the appointment
        patient: PathBuf,
        /// Reason for the current appointment
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Doctor details printed in the prescription header.
#[derive(Args)]
struct DoctorArgs {
    #[arg(long, env = "RX_DOCTOR_NAME")]
    doctor_name: String,
    #[arg(long, env = "RX_DOCTOR_SPECIALIZATION", default_value = "")]
    specialization: String,
    #[arg(long, env = "RX_DOCTOR_REGISTRATION", default_value = "")]
    registration: String,
    #[arg(long, env = "RX_DOCTOR_ADDRESS", default_value = "")]
    address: String,
    #[arg(long, env = "RX_DOCTOR_PHONE", default_value = "")]
    phone: String,
    #[arg(long, env = "RX_DOCTOR_LOGO")]
    logo: Option<String>,
}

impl DoctorArgs {
    fn into_doctor(self) -> Result<DoctorInfo, TextError> {
        Ok(DoctorInfo {
            name: NonEmptyText::new(&self.doctor_name)?,
            specialization: self.specialization,
            registration_id: self.registration,
            address: self.address,
            phone: self.phone,
            logo_ref: self.logo,
        })
    }
}

fn load_config() -> Result<CoreConfig, PrescriptionError> {
    CoreConfig::from_env_values(
        std::env::var("RX_API_URL").ok(),
        std::env::var("RX_API_TIMEOUT_SECS").ok(),
        std::env::var("RX_COMPLAINTS").ok(),
        std::env::var("RX_BRANDING").ok(),
    )
}

fn compose(
    cfg: &CoreConfig,
    form: &Path,
    appointment: Option<String>,
    doctor: DoctorArgs,
) -> Result<PrescriptionComposer, Box<dyn std::error::Error>> {
    let form = PrescriptionForm::from_yaml_file(form)?;
    let fallback = appointment
        .filter(|a| !a.trim().is_empty())
        .map(|a| AppointmentId::new(&a))
        .transpose()?;
    Ok(PrescriptionComposer::from_form(
        &form,
        fallback,
        doctor.into_doctor()?,
        cfg.complaint_vocabulary().to_vec(),
    )?)
}

/// Print to stdout, or write to `out` when the user named a file.
fn deliver_preview(rendered: &str, out: Option<PathBuf>) -> Result<(), PrescriptionError> {
    match out {
        Some(path) => FilePrinter::new(path).write(rendered),
        None => {
            StdoutPrinter.print(rendered);
            Ok(())
        }
    }
}

fn format_history(history: &PatientHistory) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Patient: {} ({})", history.patient_name, history.mobile);
    if history.visits.is_empty() {
        let _ = writeln!(out, "No past visits.");
    }
    for visit in &history.visits {
        let _ = writeln!(out, "Visit {} - {}", visit.visit_date, visit.reason);
        let _ = writeln!(out, "  BP: {}", visit.bp);
        let _ = writeln!(out, "  Advice: {}", visit.advice);
        for medicine in &visit.medicines {
            let _ = writeln!(
                out,
                "  - {}, {}, {} ({})",
                medicine.name, medicine.dosage, medicine.when_label, medicine.when
            );
        }
    }
    out
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("rx=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Encode {
            morning,
            afternoon,
            night,
            meal,
        }) => {
            let code = encode(&Schedule {
                morning,
                afternoon,
                night,
                meal_relation: meal,
            });
            println!("Daily dose: {}", code.daily_dose_code);
            println!("Preview: {}", code.preview_label);
        }
        Some(Commands::Complaints) => {
            let cfg = load_config()?;
            for complaint in cfg.complaint_vocabulary() {
                println!("{}", complaint);
            }
        }
        Some(Commands::Suggest { query }) => {
            let cfg = load_config()?;
            let client = ClinicApiClient::new(&cfg, std::env::var("RX_API_TOKEN").ok())?;
            let catalog = MedicineCatalog::load(&client).await;
            let matches = catalog.suggest(&query);
            if matches.is_empty() {
                println!("No matching medicines.");
            }
            for name in matches {
                println!("{}", name);
            }
        }
        Some(Commands::Preview {
            form,
            out,
            appointment,
            doctor,
        }) => {
            let cfg = load_config()?;
            let composer = compose(&cfg, &form, appointment, doctor)?;
            let draft = composer.submit()?;
            let rendered = PreviewRenderer::from_config(&cfg).render(&draft);
            deliver_preview(&rendered, out)?;
        }
        Some(Commands::Finalize {
            form,
            appointment,
            doctor_id,
            hospital_id,
            doctor,
        }) => {
            let cfg = load_config()?;
            let mut session = SessionContext::new(Role::Doctor).with_doctor_id(doctor_id);
            if let Some(hospital_id) = hospital_id {
                session = session.with_hospital_id(hospital_id);
            }
            if let Ok(token) = std::env::var("RX_API_TOKEN") {
                session = session.with_token(token);
            }

            let composer = compose(&cfg, &form, appointment, doctor)?;
            let mut authoring =
                AuthoringSession::new(session, composer, PreviewRenderer::from_config(&cfg))?;
            authoring.submit()?;
            authoring.print(&StdoutPrinter)?;

            let client = ClinicApiClient::new(
                &cfg,
                authoring.session().token().map(str::to_string),
            )?;
            match authoring.confirm_save(&client).await {
                Ok(outcome) => {
                    println!(
                        "{}",
                        outcome.message.as_deref().unwrap_or("Prescription saved.")
                    );
                }
                Err(PrescriptionError::Api(e)) => {
                    eprintln!("Error: {}", e.user_message());
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::History { patient, reason }) => {
            let record = PatientRecord::from_json_file(&patient)?;
            let history = PatientHistory::from_record(&record, reason.as_deref());
            print!("{}", format_history(&history));
        }
        None => {
            println!("Use 'rx --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_encode_arguments() {
        let cli = Cli::try_parse_from(["rx", "encode", "--morning", "--night", "--meal", "before"])
            .expect("valid arguments");
        match cli.command {
            Some(Commands::Encode {
                morning,
                afternoon,
                night,
                meal,
            }) => {
                assert!(morning && night && !afternoon);
                assert_eq!(meal, MealRelation::Before);
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn test_format_history() {
        let record = PatientRecord::from_json_str(
            r#"{"name": "Ravi", "phone": "98765", "prescriptions": [
                {"createdAt": "2025-01-02", "medications": [
                    {"medicine": "ORS", "quantity": 2, "dailyDose": "1-1-0"}
                ]}
            ]}"#,
        )
        .expect("valid json");
        let text = format_history(&PatientHistory::from_record(&record, None));
        assert!(text.starts_with("Patient: Ravi (98765)"));
        assert!(text.contains("Visit 02/01/2025 - General consultation"));
        assert!(text.contains("  - ORS, 2 tabs, M-A (1-1-0)"));
    }

    #[test]
    fn test_preview_out_failure_is_an_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("missing").join("rx.txt");
        let err = deliver_preview("Rx", Some(path.clone())).expect_err("unwritable");
        assert!(matches!(err, PrescriptionError::FileWrite(_)));
        assert!(!path.exists());

        let path = dir.path().join("rx.txt");
        deliver_preview("Rx", Some(path.clone())).expect("written");
        assert_eq!(std::fs::read_to_string(path).expect("readable"), "Rx");
    }

    #[test]
    fn test_format_empty_history() {
        let text = format_history(&PatientHistory::from_record(&PatientRecord::default(), None));
        assert!(text.contains("No past visits."));
    }
}
