use thiserror::Error;

/// Reasons a filter specification string is rejected.
///
/// Every variant is an invalid filter spec and carries the offending input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterSpecError {
    #[error("Invalid filter spec '{spec}': too many fields (max 5)")]
    TooManyFields { spec: String },

    #[error("Invalid filter spec '{spec}': invalid action '{action}'")]
    InvalidAction { spec: String, action: String },

    #[error("Invalid filter spec '{spec}': unknown warning category '{category}'")]
    UnknownCategory { spec: String, category: String },

    #[error("Invalid filter spec '{spec}': invalid lineno '{lineno}'")]
    InvalidLineno { spec: String, lineno: String },

    #[error("Invalid filter spec '{spec}': bad {field} pattern: {reason}")]
    InvalidPattern {
        spec: String,
        field: &'static str,
        reason: String,
    },
}

impl FilterSpecError {
    /// The raw spec string that failed to parse.
    pub fn spec(&self) -> &str {
        match self {
            Self::TooManyFields { spec }
            | Self::InvalidAction { spec, .. }
            | Self::UnknownCategory { spec, .. }
            | Self::InvalidLineno { spec, .. }
            | Self::InvalidPattern { spec, .. } => spec,
        }
    }
}
