//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for confluence.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    #[error("{strategy} needs {need} observations, have {have}")]
    InsufficientHistory {
        strategy: String,
        have: usize,
        need: usize,
    },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("out-of-order observation for {symbol}: {timestamp} is not after {last}")]
    OutOfOrderObservation {
        symbol: String,
        timestamp: NaiveDateTime,
        last: NaiveDateTime,
    },

    #[error("invalid transition for {symbol}: {reason}")]
    InvalidTransition { symbol: String, reason: String },

    #[error("shared state poisoned: {what}")]
    StatePoisoned { what: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("feed error: {reason}")]
    Feed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfluenceError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        ConfluenceError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfluenceError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the position model itself is inconsistent.
    pub fn is_state_violation(&self) -> bool {
        matches!(
            self,
            ConfluenceError::InvalidTransition { .. } | ConfluenceError::StatePoisoned { .. }
        )
    }
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. } | ConfluenceError::ConfigInvalid { .. } => 2,
            ConfluenceError::Feed { .. } => 3,
            ConfluenceError::InvalidTransition { .. } | ConfluenceError::StatePoisoned { .. } => 4,
            ConfluenceError::InsufficientHistory { .. }
            | ConfluenceError::InvalidInput { .. }
            | ConfluenceError::OutOfOrderObservation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message() {
        let err = ConfluenceError::InsufficientHistory {
            strategy: "RSI".into(),
            have: 3,
            need: 16,
        };
        assert_eq!(err.to_string(), "RSI needs 16 observations, have 3");
    }

    #[test]
    fn config_invalid_message() {
        let err = ConfluenceError::config_invalid("risk", "leverage_ceiling", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [risk] leverage_ceiling: must be positive"
        );
    }

    #[test]
    fn state_violations() {
        let transition = ConfluenceError::InvalidTransition {
            symbol: "AAPL".into(),
            reason: "already open".into(),
        };
        assert!(transition.is_state_violation());
        assert!(!ConfluenceError::invalid_input("negative price").is_state_violation());
    }
}
