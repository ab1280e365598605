//! Constants used throughout the RX core crate.

/// Complaint vocabulary offered by the complaint selector when none is configured.
pub const COMMON_COMPLAINTS: [&str; 8] = [
    "Fever",
    "Headache",
    "Cough",
    "Sore Throat",
    "Fatigue",
    "Nausea",
    "Body Ache",
    "Dizziness",
];

/// Default base URL of the clinic API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.medipanels.com/api";

/// Default timeout applied to clinic API requests.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default software branding printed at the foot of a prescription.
pub const DEFAULT_BRANDING: &str = "cureLink";

/// Status value the clinic API returns for a successful finalize.
pub const FINALIZE_OK_STATUS: &str = "ok";

/// Shown when the clinic API fails without a usable message.
pub const GENERIC_FINALIZE_ERROR: &str = "Could not save prescription due to an API error.";

/// Placeholder for values that were not recorded or not scheduled.
pub const NOT_AVAILABLE: &str = "N/A";

/// Date format used for draft and visit dates.
pub const DRAFT_DATE_FORMAT: &str = "%d/%m/%Y";
