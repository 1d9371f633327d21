//! Error types for tcscript.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tcscript operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tcscript.
#[derive(Error, Debug)]
pub enum Error {
    // Generation errors
    #[error("unknown congestion level: {0:?} (expected one of low, medium, high, normal)")]
    UnknownLevel(String),

    #[error("a scenario needs exactly 3 phases, got {got}")]
    InvalidPhaseCount { got: usize },

    #[error("invalid congestion profile: {0}")]
    InvalidProfile(String),

    // Script errors
    #[error("script not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("malformed record on line {line}: field `{field}` is not an integer")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        #[source]
        source: ParseIntError,
    },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True when a script source was missing rather than unreadable or malformed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SourceNotFound(_))
    }

    /// Errors that abort a single scenario but should not stop a batch.
    pub fn is_scenario_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownLevel(_) | Error::InvalidPhaseCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::SourceNotFound(PathBuf::from("x.txt")).is_not_found());
        assert!(!Error::UnknownLevel("extreme".into()).is_not_found());

        assert!(Error::UnknownLevel("extreme".into()).is_scenario_error());
        assert!(Error::InvalidPhaseCount { got: 2 }.is_scenario_error());
        assert!(!Error::Config("bad".into()).is_scenario_error());
    }

    #[test]
    fn test_malformed_record_message() {
        let source = "abc".parse::<i64>().unwrap_err();
        let err = Error::MalformedRecord {
            line: 7,
            field: "start_ms",
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("start_ms"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
