/// Errors that can occur while loading or compiling schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The schema source is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered under the given name.
    #[error("no schema registered under '{0}'")]
    NoSchema(String),

    /// A match pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A value was rejected by a [`crate::Matcher`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Expected a JSON object.
    #[error("expected an object, got {0}")]
    NotAnObject(&'static str),

    /// Expected a JSON string.
    #[error("expected a string, got {0}")]
    NotAString(&'static str),

    /// The object carries a key outside the whitelist.
    #[error("key '{0}' is not allowed")]
    KeyNotAllowed(String),

    /// The string did not match the pattern.
    #[error("'{value}' does not match {pattern}")]
    NoMatch { value: String, pattern: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Short JSON type name used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
