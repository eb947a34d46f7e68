use std::fmt;
use std::io;

use docsafe_gate::SafeError;
use docsafe_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    let code = match err {
        SchemaError::LoadFailed(_) => FAILURE,
        SchemaError::NoSchema(_) => USAGE,
        SchemaError::CompileFailed(_)
        | SchemaError::InvalidJson(_)
        | SchemaError::InvalidPattern(_) => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn safe_error(context: &str, err: SafeError) -> CliError {
    let code = match err {
        SafeError::ValidationFailed { .. } | SafeError::Precondition(_) | SafeError::Match(_) => {
            DATA_INVALID
        }
        SafeError::Forbidden { .. } => PERMISSION_DENIED,
        SafeError::NotFound { .. } => FAILURE,
        SafeError::Transport(_) | SafeError::Method { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
