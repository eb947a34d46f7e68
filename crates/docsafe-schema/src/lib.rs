//! Schema contract and JSON Schema-backed document schemas for docsafe.
//!
//! A [`Schema`] cleans documents in place and hands out fresh
//! [`ValidationContext`]s that record per-field failures. [`DocumentSchema`]
//! implements the contract on top of JSON Schema, with an optional prepare
//! hook and custom [`Matcher`]s per field.

mod clean;
pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod matchers;
pub mod patterns;
pub mod registry;
mod validator;

pub use config::{CleanOptions, RegistryConfig};
pub use contract::{
    ErrorObject, InvalidKey, PrepareParams, Schema, ValidateOptions, ValidationContext,
};
pub use document::{DocumentContext, DocumentSchema, PrepareHook};
pub use error::{json_type_name, MatchError, Result, SchemaError};
pub use matchers::{Matcher, RegEx, WhitelistedObject};
pub use registry::SchemaRegistry;
pub use validator::ROOT_KEY;
