//! Error types for trak
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, malformed input)
//! - 4: Operation failed (I/O, serialization, notification backend)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the trak CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for trak operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No data directory available; pass --data-dir or set TRAK_DATA_DIR")]
    NoDataDir,

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Document '{key}' unreadable at {}: {reason}", .path.display())]
    DocumentLoad {
        key: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Notification backend failed: {0}")]
    Notification(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) | Error::NoDataDir => {
                exit_codes::USER_ERROR
            }
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::DocumentLoad { .. }
            | Error::Notification(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for trak operations
pub type Result<T> = std::result::Result<T, Error>;
