use std::collections::BTreeMap;

use docsafe_schema::MatchError;
use serde::Serialize;
use serde_json::Value;

/// Field name to human-readable message.
pub type FieldErrorMap = BTreeMap<String, String>;

pub const CODE_FORBIDDEN: &str = "forbidden";
pub const CODE_NOT_FOUND: &str = "not-found";
pub const CODE_VALIDATION_FAILED: &str = "validation-failed";
pub const CODE_PRECONDITION_FAILED: &str = "precondition-failed";
pub const CODE_MATCH_FAILED: &str = "match-failed";
pub const CODE_TRANSPORT_ERROR: &str = "transport-error";
pub const CODE_INTERNAL_ERROR: &str = "internal-error";

const DEFAULT_FORBIDDEN_REASON: &str = "Forbidden";
const DEFAULT_NOT_FOUND_REASON: &str = "Not Found";
const DEFAULT_VALIDATION_REASON: &str = "Validation Error";

/// Errors raised by methods and surfaced to callers.
///
/// `Forbidden`, `NotFound` and `ValidationFailed` are the application error
/// kinds; the remaining variants cover malformed input and failures reported
/// by the transport or the remote method.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SafeError {
    /// The caller may not perform the operation.
    #[error("{reason} [forbidden]: {details}")]
    Forbidden { reason: String, details: String },

    /// The target of the operation does not exist.
    #[error("{reason} [not-found]: {details}")]
    NotFound { reason: String, details: String },

    /// The document or modifier did not satisfy its schema.
    #[error("{reason} [validation-failed]: {}", summarize(.details))]
    ValidationFailed {
        reason: String,
        details: FieldErrorMap,
    },

    /// Malformed input to a helper, e.g. a non-object document.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A value was rejected by a match predicate.
    #[error("match failed: {0}")]
    Match(#[from] MatchError),

    /// The transport failed before a result was produced.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other error reported by a remote method.
    #[error("{reason} [{code}]")]
    Method {
        code: String,
        reason: String,
        details: Option<String>,
    },
}

impl SafeError {
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::forbidden_with_reason(details, DEFAULT_FORBIDDEN_REASON)
    }

    pub fn forbidden_with_reason(details: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            details: details.into(),
        }
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::not_found_with_reason(details, DEFAULT_NOT_FOUND_REASON)
    }

    pub fn not_found_with_reason(details: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
            details: details.into(),
        }
    }

    pub fn validation_failed(details: FieldErrorMap) -> Self {
        Self::validation_failed_with_reason(details, DEFAULT_VALIDATION_REASON)
    }

    pub fn validation_failed_with_reason(details: FieldErrorMap, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            reason: reason.into(),
            details,
        }
    }

    pub fn method(
        code: impl Into<String>,
        reason: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self::Method {
            code: code.into(),
            reason: reason.into(),
            details,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Self::Forbidden { .. } => CODE_FORBIDDEN,
            Self::NotFound { .. } => CODE_NOT_FOUND,
            Self::ValidationFailed { .. } => CODE_VALIDATION_FAILED,
            Self::Precondition(_) => CODE_PRECONDITION_FAILED,
            Self::Match(_) => CODE_MATCH_FAILED,
            Self::Transport(_) => CODE_TRANSPORT_ERROR,
            Self::Method { code, .. } => code.as_str(),
        }
    }

    /// Human-readable reason.
    pub fn reason(&self) -> &str {
        match self {
            Self::Forbidden { reason, .. }
            | Self::NotFound { reason, .. }
            | Self::ValidationFailed { reason, .. }
            | Self::Method { reason, .. } => reason.as_str(),
            Self::Precondition(_) => "Precondition failed",
            Self::Match(_) => "Match failed",
            Self::Transport(_) => "Transport error",
        }
    }

    /// Details rendered as text; field errors are rendered as JSON.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Forbidden { details, .. } | Self::NotFound { details, .. } => {
                Some(details.clone())
            }
            Self::ValidationFailed { details, .. } => serde_json::to_string(details).ok(),
            Self::Precondition(message) | Self::Transport(message) => Some(message.clone()),
            Self::Match(err) => Some(err.to_string()),
            Self::Method { details, .. } => details.clone(),
        }
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrorMap> {
        match self {
            Self::ValidationFailed { details, .. } => Some(details),
            _ => None,
        }
    }

    pub fn is_validation_failed(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Serializable form sent back to callers.
    pub fn payload(&self) -> ErrorPayload {
        let details = match self {
            Self::ValidationFailed { details, .. } => {
                serde_json::to_value(details).unwrap_or(Value::Null)
            }
            other => other.details().map(Value::String).unwrap_or(Value::Null),
        };
        ErrorPayload {
            error: self.code().to_string(),
            reason: self.reason().to_string(),
            details,
        }
    }
}

/// Wire shape of a [`SafeError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

fn summarize(details: &FieldErrorMap) -> String {
    details
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, SafeError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn kinds_carry_codes_and_default_reasons() {
        let forbidden = SafeError::forbidden("You must be logged in");
        assert_eq!(forbidden.code(), "forbidden");
        assert_eq!(forbidden.reason(), "Forbidden");
        assert_eq!(forbidden.details().as_deref(), Some("You must be logged in"));

        let missing = SafeError::not_found("task 7");
        assert_eq!(missing.code(), "not-found");
        assert_eq!(missing.reason(), "Not Found");

        let invalid = SafeError::validation_failed(FieldErrorMap::new());
        assert_eq!(invalid.code(), "validation-failed");
        assert_eq!(invalid.reason(), "Validation Error");
    }

    #[test]
    fn reasons_can_be_overridden() {
        let err = SafeError::forbidden_with_reason("admins only", "Access denied");
        assert_eq!(err.reason(), "Access denied");
        assert_eq!(err.to_string(), "Access denied [forbidden]: admins only");

        let err = SafeError::not_found_with_reason("x", "Gone");
        assert_eq!(err.reason(), "Gone");
    }

    #[test]
    fn validation_failure_exposes_field_errors() {
        let mut details = FieldErrorMap::new();
        details.insert("title".to_string(), "title is required".to_string());
        let err = SafeError::validation_failed(details.clone());

        assert!(err.is_validation_failed());
        assert_eq!(err.field_errors(), Some(&details));
        assert_eq!(
            err.to_string(),
            "Validation Error [validation-failed]: title: title is required"
        );
        assert_eq!(
            err.details().as_deref(),
            Some(r#"{"title":"title is required"}"#)
        );
    }

    #[test]
    fn payload_serializes_details_by_kind() {
        let mut details = FieldErrorMap::new();
        details.insert("a".to_string(), "bad".to_string());
        let payload = serde_json::to_value(SafeError::validation_failed(details).payload()).unwrap();
        assert_eq!(
            payload,
            json!({"error": "validation-failed", "reason": "Validation Error", "details": {"a": "bad"}})
        );

        let payload =
            serde_json::to_value(SafeError::method("boom", "Exploded", None).payload()).unwrap();
        assert_eq!(payload, json!({"error": "boom", "reason": "Exploded"}));
    }

    #[test]
    fn match_errors_convert() {
        let err: SafeError = MatchError::KeyNotAllowed("c".to_string()).into();
        assert_eq!(err.code(), "match-failed");
        assert!(err.field_errors().is_none());
    }
}
