//! Validate-and-clean gate and error taxonomy.
//!
//! [`validate`] runs a document or modifier through a [`docsafe_schema::Schema`]:
//! prepare hook, cleaning with filtering and trimming disabled, then
//! validation. Failures surface as [`SafeError::ValidationFailed`] carrying a
//! [`FieldErrorMap`].

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;

pub use config::{FailureMode, GateConfig};
pub use error::{
    ErrorPayload, FieldErrorMap, Result, SafeError, CODE_FORBIDDEN, CODE_INTERNAL_ERROR,
    CODE_MATCH_FAILED, CODE_NOT_FOUND, CODE_PRECONDITION_FAILED, CODE_TRANSPORT_ERROR,
    CODE_VALIDATION_FAILED,
};
pub use gate::{validate, validate_collect, ValidationGate, ValidationOptions};
pub use identity::{check_logged_in, require_user, CallContext, IdentityContext, LOGIN_REQUIRED};
