use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::document::DocumentSchema;
use crate::error::{Result, SchemaError};

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Name-keyed registry of compiled document schemas.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, DocumentSchema>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: BTreeMap::new(),
            config,
        }
    }

    /// Register a schema under `name` from a JSON string.
    pub fn register(&mut self, name: &str, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(name, &schema)
    }

    /// Register a schema under `name` from a JSON value.
    pub fn register_value(&mut self, name: &str, schema: &Value) -> Result<()> {
        let compiled = DocumentSchema::from_value(schema)?;
        self.insert(name, compiled);
        Ok(())
    }

    /// Register an already compiled schema, e.g. one carrying a prepare hook.
    pub fn insert(&mut self, name: &str, schema: DocumentSchema) {
        debug!(name, "registered schema");
        self.schemas.insert(name.to_string(), schema);
    }

    /// Load `dir/<name>.schema.json` and register it under `name`.
    ///
    /// A name that is not a plain identifier, or has no file, is reported as
    /// [`SchemaError::NoSchema`].
    pub fn load_named(&mut self, dir: &Path, name: &str) -> Result<&DocumentSchema> {
        let path = dir.join(format!("{name}{SCHEMA_SUFFIX}"));
        if !is_schema_name(name) || !path.is_file() {
            return Err(SchemaError::NoSchema(name.to_string()));
        }
        self.load_file(name, &path)
    }

    /// Read and compile one schema file, registering it under `name`.
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<&DocumentSchema> {
        let load_failed =
            |err: std::io::Error| SchemaError::LoadFailed(format!("{}: {err}", path.display()));

        let size = std::fs::metadata(path).map_err(load_failed)?.len();
        if size > self.config.max_schema_file_size as u64 {
            return Err(SchemaError::LoadFailed(format!(
                "{}: schema file too large ({size} bytes)",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(load_failed)?;
        let schema = DocumentSchema::from_json(&text)?;
        debug!(name, path = %path.display(), "loaded schema file");
        self.insert(name, schema);
        self.require(name)
    }

    /// Load from embedded schema strings.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        for (name, schema) in schemas {
            registry.register(name, schema)?;
        }
        Ok(registry)
    }

    /// Get the schema registered under `name`.
    pub fn get(&self, name: &str) -> Option<&DocumentSchema> {
        self.schemas.get(name)
    }

    /// Look up `name`, honoring `fail_on_missing_schema`.
    pub fn lookup(&self, name: &str) -> Result<Option<&DocumentSchema>> {
        match self.schemas.get(name) {
            Some(schema) => Ok(Some(schema)),
            None if self.config.fail_on_missing_schema => {
                Err(SchemaError::NoSchema(name.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Get the schema registered under `name` or fail.
    pub fn require(&self, name: &str) -> Result<&DocumentSchema> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::NoSchema(name.to_string()))
    }

    /// Check if a schema is registered under `name`.
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn is_schema_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
