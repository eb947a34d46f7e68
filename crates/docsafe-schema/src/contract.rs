//! The contract a schema implementation must satisfy to be driven by the
//! validation gate.

use serde_json::{Map, Value};

use crate::config::CleanOptions;

/// Parameters handed to a schema's prepare hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareParams<'a> {
    /// True when the attributes come from a modifier's `$set` component.
    pub is_update: bool,
    /// Snapshot of the full modifier, present only for updates.
    pub modifier: Option<&'a Map<String, Value>>,
}

impl PrepareParams<'_> {
    /// Parameters for a full-document insert.
    pub fn insert() -> Self {
        Self {
            is_update: false,
            modifier: None,
        }
    }
}

impl<'a> PrepareParams<'a> {
    /// Parameters for a modifier update.
    pub fn update(modifier: &'a Map<String, Value>) -> Self {
        Self {
            is_update: true,
            modifier: Some(modifier),
        }
    }
}

/// Options for [`ValidationContext::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Validate the input as a modifier rather than a full document.
    pub modifier: bool,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKey {
    /// Field name (dotted for nested paths).
    pub name: String,
    /// Human-readable message.
    pub message: String,
}

impl InvalidKey {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Outcome of the last validation pass run on a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorObject {
    pub invalid_keys: Vec<InvalidKey>,
}

/// Transient state accumulated by one validation pass.
pub trait ValidationContext {
    /// Validate `doc` and record its invalid keys. Returns true when valid.
    fn validate(&mut self, doc: &Map<String, Value>, options: ValidateOptions) -> bool;

    /// Invalid keys recorded by the last call to [`ValidationContext::validate`].
    fn error_object(&self) -> ErrorObject;
}

/// A set of field rules that can clean and validate documents.
pub trait Schema {
    type Context: ValidationContext;

    /// Create a fresh validation context bound to this schema.
    fn new_context(&self) -> Self::Context;

    /// Coerce, default and optionally filter/trim `doc` in place.
    fn clean(&self, doc: &mut Map<String, Value>, options: &CleanOptions);

    /// Whether [`Schema::prepare`] should run before validation.
    fn has_prepare(&self) -> bool {
        false
    }

    /// Derive or inject attributes before validation. No-op by default.
    fn prepare(&self, _attrs: &mut Map<String, Value>, _params: &PrepareParams<'_>) {}
}
