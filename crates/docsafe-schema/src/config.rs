/// Controls how a [`crate::SchemaRegistry`] loads and resolves schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, [`crate::SchemaRegistry::lookup`] returns
    /// `SchemaError::NoSchema` for unknown names instead of `None`.
    pub fail_on_missing_schema: bool,
    /// Maximum bytes allowed per schema file.
    pub max_schema_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fail_on_missing_schema: false,
            max_schema_file_size: 256 * 1024,
        }
    }
}

/// Options for [`crate::Schema::clean`].
///
/// The defaults match a plain cleaning pass: filtering, trimming, type
/// conversion and defaulting all enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Treat the input as a modifier (`$set`, `$unset`, ...).
    pub is_modifier: bool,
    /// Drop fields the schema does not declare.
    pub filter: bool,
    /// Trim leading and trailing whitespace from string values.
    pub trim_strings: bool,
    /// Coerce scalar values toward the declared field type.
    pub auto_convert: bool,
    /// Insert schema `default` values for missing fields of full documents.
    pub apply_defaults: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            is_modifier: false,
            filter: true,
            trim_strings: true,
            auto_convert: true,
            apply_defaults: true,
        }
    }
}
