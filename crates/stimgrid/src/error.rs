//! Error type shared by parameter-space enumeration and stimulus synthesis.

/// Errors raised while configuring a stimulus set or rendering one combination.
#[derive(Debug, Clone, PartialEq)]
pub enum StimulusError {
    /// Invalid configuration, or a formula asked for a parameter that the
    /// resolved assignment does not carry.
    Configuration(String),
    /// Combination index outside `[0, total)`.
    IndexOutOfRange { index: usize, total: usize },
    /// A per-combination geometric constraint is violated.
    Domain(String),
}

impl std::fmt::Display for StimulusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
            Self::IndexOutOfRange { index, total } => {
                write!(
                    f,
                    "combination index {} out of range (total {})",
                    index, total
                )
            }
            Self::Domain(msg) => write!(f, "domain error: {}", msg),
        }
    }
}

impl std::error::Error for StimulusError {}

impl From<serde_json::Error> for StimulusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Configuration(format!("config json: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, StimulusError>;
