use thiserror::Error;

/// Errors raised by the encoder and the parsing helpers around it.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// An argument could not be read as the type the operation needs.
    #[error("\"{argument}\" {reason}")]
    TypeValidation {
        argument: &'static str,
        reason: String,
    },

    /// A mutation or report was requested before any mapping was built.
    #[error("No encoding was created! Build a mapping before calling `{operation}`.")]
    NotFitted { operation: &'static str },

    #[error("Label {0} was not encoded and does not exist.")]
    UnknownLabel(String),

    #[error(
        "Label {0} was already encoded, use set_value() to set a different code or remove_label() to remove it."
    )]
    DuplicateLabel(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed mapping model: {0}")]
    Json(#[from] serde_json::Error),
}

impl EncoderError {
    pub fn type_validation(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::TypeValidation {
            argument,
            reason: reason.into(),
        }
    }

    pub fn not_fitted(operation: &'static str) -> Self {
        Self::NotFitted { operation }
    }
}
