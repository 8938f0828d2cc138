//! Domain error types.

/// Top-level error type for walkforge.
#[derive(Debug, thiserror::Error)]
pub enum WalkforgeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("signal/bar mismatch: {signals} signals for {bars} bars")]
    SignalMismatch { signals: usize, bars: usize },

    #[error("results store error: {reason}")]
    Results { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&WalkforgeError> for std::process::ExitCode {
    fn from(err: &WalkforgeError) -> Self {
        let code: u8 = match err {
            WalkforgeError::Io(_) => 1,
            WalkforgeError::ConfigParse { .. }
            | WalkforgeError::ConfigMissing { .. }
            | WalkforgeError::ConfigInvalid { .. } => 2,
            WalkforgeError::Data { .. } | WalkforgeError::InsufficientData { .. } => 3,
            WalkforgeError::SignalMismatch { .. } => 4,
            WalkforgeError::Results { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
