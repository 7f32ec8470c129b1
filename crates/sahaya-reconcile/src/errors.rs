use chrono::NaiveDate;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ReconcileError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("meeting on {next} follows meeting on {previous}")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ReconcileError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
