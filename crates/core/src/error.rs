use crate::constants::GENERIC_FINALIZE_ERROR;

/// Reasons a prescription cannot be composed into a draft.
///
/// These are checked before any I/O happens, so they never reach the clinic API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid appointment")]
    MissingContext,
    #[error("Please add at least one medicine")]
    NoMedicines,
}

/// Failures talking to the clinic API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("failed to reach clinic API: {0}")]
    Transport(String),
    #[error("clinic API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("clinic API rejected the request: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("failed to decode clinic API response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text suitable for showing to the user.
    ///
    /// Messages returned by the API are passed through verbatim; everything else falls back to a
    /// generic sentence.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Transport(message) if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FINALIZE_ERROR.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrescriptionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("operation not allowed while {0}")]
    InvalidState(&'static str),
    #[error("role '{role}' may not perform this action")]
    Forbidden { role: String },
    #[error("invalid text: {0}")]
    Text(#[from] rx_types::TextError),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to deserialize JSON: {0}")]
    JsonDeserialization(serde_json::Error),
}

pub type PrescriptionResult<T> = std::result::Result<T, PrescriptionError>;
