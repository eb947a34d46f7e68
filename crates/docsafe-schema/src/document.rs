use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::clean::clean_document;
use crate::config::CleanOptions;
use crate::contract::{
    ErrorObject, InvalidKey, PrepareParams, Schema, ValidateOptions, ValidationContext,
};
use crate::error::{Result, SchemaError};
use crate::matchers::Matcher;
use crate::validator::{validate_document, validate_modifier};

/// Hook run before cleaning to derive or inject attributes.
pub type PrepareHook = dyn Fn(&mut Map<String, Value>, &PrepareParams<'_>) + Send + Sync;

/// Object schema backed by JSON Schema.
///
/// Each declared property (recursively, through nested `properties` and
/// object `items`) is compiled into its own validator so failures can be
/// reported per field name. Root `$defs`/`definitions` are carried into every
/// field validator so local `$ref`s keep resolving.
#[derive(Clone)]
pub struct DocumentSchema {
    inner: Arc<Inner>,
}

#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) source: Value,
    /// Whole-document validator for keywords not broken down per field.
    pub(crate) validator: Arc<Validator>,
    pub(crate) root: ObjectRules,
    pub(crate) prepare: Option<Arc<PrepareHook>>,
    pub(crate) matchers: BTreeMap<String, Vec<Arc<dyn Matcher>>>,
}

/// Declared fields of one object level.
#[derive(Clone, Default)]
pub(crate) struct ObjectRules {
    pub(crate) fields: BTreeMap<String, FieldRule>,
    pub(crate) required: BTreeSet<String>,
    pub(crate) allow_unknown: bool,
}

impl ObjectRules {
    pub(crate) fn is_declared(&self) -> bool {
        !self.fields.is_empty() || !self.allow_unknown
    }
}

#[derive(Clone)]
pub(crate) struct FieldRule {
    pub(crate) validator: Arc<Validator>,
    pub(crate) kind: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) object: Option<ObjectRules>,
    pub(crate) items: Option<Box<FieldRule>>,
}

impl FieldRule {
    /// First error the field validator reports for `value`, if any.
    pub(crate) fn first_error(&self, value: &Value) -> Option<String> {
        self.validator
            .iter_errors(value)
            .next()
            .map(|err| err.to_string())
    }
}

/// Where a dotted path landed inside the schema.
pub(crate) struct ResolvedPath<'a> {
    pub(crate) rule: &'a FieldRule,
    pub(crate) required: bool,
}

pub(crate) enum PathLookup<'a> {
    Declared(ResolvedPath<'a>),
    /// The path leaves the declared schema somewhere that accepts unknown keys.
    Open,
    /// The path names a field the schema forbids.
    Undeclared,
}

impl ObjectRules {
    /// Resolve a dotted modifier path such as `address.city` or `tags.0`.
    pub(crate) fn resolve(&self, path: &str) -> PathLookup<'_> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return PathLookup::Undeclared;
        };

        let Some(mut rule) = self.fields.get(first) else {
            return self.unknown_lookup();
        };
        let mut required = self.required.contains(first);

        for segment in segments {
            if is_positional(segment) {
                match rule.items.as_deref() {
                    Some(items) => {
                        rule = items;
                        required = false;
                    }
                    None => return PathLookup::Open,
                }
                continue;
            }

            let Some(object) = rule.object.as_ref() else {
                return PathLookup::Open;
            };
            match object.fields.get(segment) {
                Some(next) => {
                    required = object.required.contains(segment);
                    rule = next;
                }
                None => return object.unknown_lookup(),
            }
        }

        PathLookup::Declared(ResolvedPath { rule, required })
    }

    fn unknown_lookup(&self) -> PathLookup<'_> {
        if self.allow_unknown {
            PathLookup::Open
        } else {
            PathLookup::Undeclared
        }
    }
}

fn is_positional(segment: &str) -> bool {
    segment == "$" || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

impl DocumentSchema {
    /// Compile a schema from a JSON string.
    pub fn from_json(schema_json: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_json)?;
        Self::from_value(&schema)
    }

    /// Compile a schema from a JSON value. The root must describe an object.
    pub fn from_value(schema: &Value) -> Result<Self> {
        let root_map = schema.as_object().ok_or_else(|| {
            SchemaError::CompileFailed("document schema must be a JSON object".to_string())
        })?;
        if let Some(kind) = primary_type(root_map) {
            if kind != "object" {
                return Err(SchemaError::CompileFailed(format!(
                    "document schema must describe an object, got type '{kind}'"
                )));
            }
        }

        let validator = jsonschema::validator_for(schema)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;

        let defs = RootDefinitions::collect(root_map);
        let root = compile_object(root_map, &defs)?;

        Ok(Self {
            inner: Arc::new(Inner {
                source: schema.clone(),
                validator: Arc::new(validator),
                root,
                prepare: None,
                matchers: BTreeMap::new(),
            }),
        })
    }

    /// Attach a prepare hook run before cleaning.
    pub fn with_prepare<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, &PrepareParams<'_>) + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.inner).prepare = Some(Arc::new(hook));
        self
    }

    /// Attach a custom matcher to a (dotted) field path.
    pub fn with_field_matcher<M>(mut self, field: impl Into<String>, matcher: M) -> Self
    where
        M: Matcher + 'static,
    {
        Arc::make_mut(&mut self.inner)
            .matchers
            .entry(field.into())
            .or_default()
            .push(Arc::new(matcher));
        self
    }

    /// The schema source this was compiled from.
    pub fn source(&self) -> &Value {
        &self.inner.source
    }

    /// Top-level field names in declaration-independent (sorted) order.
    pub fn field_names(&self) -> Vec<&str> {
        self.inner.root.fields.keys().map(String::as_str).collect()
    }

    /// Whether `field` is required at the top level.
    pub fn is_required(&self, field: &str) -> bool {
        self.inner.root.required.contains(field)
    }
}

impl fmt::Debug for DocumentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSchema")
            .field("fields", &self.field_names())
            .field("has_prepare", &self.inner.prepare.is_some())
            .field("matchers", &self.inner.matchers.len())
            .finish()
    }
}

impl Schema for DocumentSchema {
    type Context = DocumentContext;

    fn new_context(&self) -> DocumentContext {
        DocumentContext {
            schema: Arc::clone(&self.inner),
            invalid_keys: Vec::new(),
        }
    }

    fn clean(&self, doc: &mut Map<String, Value>, options: &CleanOptions) {
        clean_document(&self.inner.root, doc, options);
    }

    fn has_prepare(&self) -> bool {
        self.inner.prepare.is_some()
    }

    fn prepare(&self, attrs: &mut Map<String, Value>, params: &PrepareParams<'_>) {
        if let Some(hook) = &self.inner.prepare {
            hook(attrs, params);
        }
    }
}

/// Validation context bound to one [`DocumentSchema`].
pub struct DocumentContext {
    schema: Arc<Inner>,
    invalid_keys: Vec<InvalidKey>,
}

impl DocumentContext {
    /// Whether the last validation recorded no errors.
    pub fn is_valid(&self) -> bool {
        self.invalid_keys.is_empty()
    }

    /// Forget the outcome of the last validation.
    pub fn reset(&mut self) {
        self.invalid_keys.clear();
    }
}

impl fmt::Debug for DocumentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentContext")
            .field("invalid_keys", &self.invalid_keys)
            .finish()
    }
}

impl ValidationContext for DocumentContext {
    fn validate(&mut self, doc: &Map<String, Value>, options: ValidateOptions) -> bool {
        self.invalid_keys = if options.modifier {
            validate_modifier(&self.schema, doc)
        } else {
            validate_document(&self.schema, doc)
        };
        self.invalid_keys.is_empty()
    }

    fn error_object(&self) -> ErrorObject {
        ErrorObject {
            invalid_keys: self.invalid_keys.clone(),
        }
    }
}

struct RootDefinitions {
    schema_uri: Option<Value>,
    defs: Option<Value>,
    definitions: Option<Value>,
}

impl RootDefinitions {
    fn collect(root: &Map<String, Value>) -> Self {
        Self {
            schema_uri: root.get("$schema").cloned(),
            defs: root.get("$defs").cloned(),
            definitions: root.get("definitions").cloned(),
        }
    }

    /// Wrap a sub-schema so root-relative `$ref`s still resolve.
    fn embed(&self, sub: &Value) -> Value {
        if self.defs.is_none() && self.definitions.is_none() {
            return match (&self.schema_uri, sub) {
                (Some(uri), Value::Object(map)) if !map.contains_key("$schema") => {
                    let mut map = map.clone();
                    map.insert("$schema".to_string(), uri.clone());
                    Value::Object(map)
                }
                _ => sub.clone(),
            };
        }

        let mut wrapper = Map::new();
        if let Some(uri) = &self.schema_uri {
            wrapper.insert("$schema".to_string(), uri.clone());
        }
        if let Some(defs) = &self.defs {
            wrapper.insert("$defs".to_string(), defs.clone());
        }
        if let Some(definitions) = &self.definitions {
            wrapper.insert("definitions".to_string(), definitions.clone());
        }
        wrapper.insert("allOf".to_string(), Value::Array(vec![sub.clone()]));
        Value::Object(wrapper)
    }
}

fn compile_object(map: &Map<String, Value>, defs: &RootDefinitions) -> Result<ObjectRules> {
    // Keys matched by `patternProperties` are left to the whole-document
    // validator rather than rejected as undeclared.
    let closed = matches!(map.get("additionalProperties"), Some(Value::Bool(false)))
        && !map.contains_key("patternProperties");
    let mut rules = ObjectRules {
        allow_unknown: !closed,
        ..ObjectRules::default()
    };

    if let Some(Value::Object(properties)) = map.get("properties") {
        for (name, sub) in properties {
            rules
                .fields
                .insert(name.clone(), compile_field(name, sub, defs)?);
        }
    }

    if let Some(Value::Array(required)) = map.get("required") {
        rules.required = required
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    Ok(rules)
}

fn compile_field(name: &str, sub: &Value, defs: &RootDefinitions) -> Result<FieldRule> {
    let validator = jsonschema::validator_for(&defs.embed(sub))
        .map_err(|err| SchemaError::CompileFailed(format!("field '{name}': {err}")))?;

    let map = sub.as_object();
    let kind = map.and_then(primary_type).map(str::to_string);
    let default = map.and_then(|m| m.get("default")).cloned();

    let object = match map {
        Some(m) if m.contains_key("properties") => Some(compile_object(m, defs)?),
        _ => None,
    };
    let items = match map.and_then(|m| m.get("items")) {
        Some(items @ Value::Object(_)) => Some(Box::new(compile_field(name, items, defs)?)),
        _ => None,
    };

    Ok(FieldRule {
        validator: Arc::new(validator),
        kind,
        default,
        object,
        items,
    })
}

/// First non-null entry of a schema's `type` keyword.
fn primary_type(map: &Map<String, Value>) -> Option<&str> {
    match map.get("type") {
        Some(Value::String(kind)) => Some(kind.as_str()),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null"),
        _ => None,
    }
}
