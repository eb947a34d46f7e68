//! Schema-gated document validation for method handlers.
//!
//! docsafe cleans and validates incoming documents and modifiers against a
//! schema before they reach storage, raises a small closed set of
//! application errors, and wraps a host framework's call and subscribe
//! primitives with consistent logging and user-facing notifications.
//!
//! # Crate Structure
//!
//! - [`schema`]: Schema contract, JSON Schema document schemas, match predicates
//! - [`gate`]: Validate-and-clean gate, `SafeError` taxonomy, login guard
//! - [`rpc`]: Call/subscribe wrappers and ok-handler strategies

/// Re-export schema types.
pub mod schema {
    pub use docsafe_schema::*;
}

/// Re-export gate types.
pub mod gate {
    pub use docsafe_gate::*;
}

/// Re-export call/subscribe types.
pub mod rpc {
    pub use docsafe_rpc::*;
}
