use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Principal payload must be a JSON object")]
    NotAnObject,

    #[error("Principal payload is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown account status: {0}")]
    UnknownStatus(String),

    #[error("Principal does not match schema: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for NormalizeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}
