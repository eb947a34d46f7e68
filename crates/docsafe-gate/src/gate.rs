use docsafe_schema::{
    json_type_name, CleanOptions, PrepareParams, Schema, ValidateOptions, ValidationContext,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{FailureMode, GateConfig};
use crate::error::{FieldErrorMap, Result, SafeError};

/// Per-call options for the gate.
pub struct ValidationOptions<'a, C> {
    /// Treat the input as a modifier rather than a full document.
    pub is_modifier: bool,
    /// Validation context to record into. A fresh one is created per call
    /// when absent; sharing one across calls is the caller's responsibility.
    pub context: Option<&'a mut C>,
}

impl<C> Default for ValidationOptions<'_, C> {
    fn default() -> Self {
        Self {
            is_modifier: false,
            context: None,
        }
    }
}

impl<'a, C> ValidationOptions<'a, C> {
    /// Options for validating a modifier.
    pub fn modifier() -> Self {
        Self {
            is_modifier: true,
            context: None,
        }
    }

    /// Record into an explicit context instead of a fresh one.
    pub fn with_context(mut self, context: &'a mut C) -> Self {
        self.context = Some(context);
        self
    }
}

/// Clean and validate `doc_or_mod` in place, raising
/// [`SafeError::ValidationFailed`] with the field errors on failure.
pub fn validate<S: Schema>(
    doc_or_mod: &mut Value,
    schema: &S,
    options: ValidationOptions<'_, S::Context>,
) -> Result<()> {
    match clean_and_validate(doc_or_mod, schema, options)? {
        Some(errors) => {
            warn!(fields = ?errors.keys().collect::<Vec<_>>(), "validation failed");
            Err(SafeError::validation_failed(errors))
        }
        None => Ok(()),
    }
}

/// Like [`validate`] but returns the field errors instead of raising them.
/// Precondition failures are still raised.
pub fn validate_collect<S: Schema>(
    doc_or_mod: &mut Value,
    schema: &S,
    options: ValidationOptions<'_, S::Context>,
) -> Result<Option<FieldErrorMap>> {
    clean_and_validate(doc_or_mod, schema, options)
}

/// Gate whose failure delivery is fixed by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationGate {
    config: GateConfig,
}

impl ValidationGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the gate. With [`FailureMode::Raise`] a failure is an `Err`; with
    /// [`FailureMode::Return`] it is `Ok(Some(errors))`.
    pub fn check<S: Schema>(
        &self,
        doc_or_mod: &mut Value,
        schema: &S,
        options: ValidationOptions<'_, S::Context>,
    ) -> Result<Option<FieldErrorMap>> {
        match self.config.failure_mode {
            FailureMode::Raise => validate(doc_or_mod, schema, options).map(|()| None),
            FailureMode::Return => validate_collect(doc_or_mod, schema, options),
        }
    }
}

fn clean_and_validate<S: Schema>(
    doc_or_mod: &mut Value,
    schema: &S,
    options: ValidationOptions<'_, S::Context>,
) -> Result<Option<FieldErrorMap>> {
    let doc = as_document(doc_or_mod)?;
    let is_modifier = options.is_modifier;

    if schema.has_prepare() {
        run_prepare(doc, schema, is_modifier)?;
    }

    schema.clean(
        doc,
        &CleanOptions {
            is_modifier,
            filter: false,
            trim_strings: false,
            ..CleanOptions::default()
        },
    );

    let mut fresh;
    let context = match options.context {
        Some(context) => context,
        None => {
            fresh = schema.new_context();
            &mut fresh
        }
    };

    if context.validate(doc, ValidateOptions { modifier: is_modifier }) {
        debug!(is_modifier, "document passed validation");
        return Ok(None);
    }

    let errors: FieldErrorMap = context
        .error_object()
        .invalid_keys
        .into_iter()
        .map(|key| (key.name, key.message))
        .collect();
    debug!(
        is_modifier,
        invalid_keys = errors.len(),
        "document failed validation"
    );
    Ok(Some(errors))
}

fn as_document(doc_or_mod: &mut Value) -> Result<&mut Map<String, Value>> {
    let kind = json_type_name(doc_or_mod);
    doc_or_mod.as_object_mut().ok_or_else(|| {
        SafeError::Precondition(format!("document must be an object, got {kind}"))
    })
}

/// Hand the prepare hook the attributes being written: the document itself,
/// or a modifier's `$set` component (a detached empty map when absent).
fn run_prepare<S: Schema>(
    doc: &mut Map<String, Value>,
    schema: &S,
    is_modifier: bool,
) -> Result<()> {
    if !is_modifier {
        schema.prepare(doc, &PrepareParams::insert());
        return Ok(());
    }

    let snapshot = doc.clone();
    let params = PrepareParams::update(&snapshot);
    match doc.get_mut("$set") {
        Some(Value::Object(attrs)) => schema.prepare(attrs, &params),
        None | Some(Value::Null) => schema.prepare(&mut Map::new(), &params),
        Some(other) => {
            return Err(SafeError::Precondition(format!(
                "$set must be an object, got {}",
                json_type_name(other)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use docsafe_schema::DocumentSchema;
    use serde_json::json;

    use super::*;

    const TASK: &str = r#"{
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "priority": { "type": "integer", "default": 3 },
            "done": { "type": "boolean" },
            "updatedAt": { "type": "integer" }
        },
        "required": ["title"]
    }"#;

    const ALL_OPTIONAL: &str = r#"{
        "type": "object",
        "properties": { "note": { "type": "string" } }
    }"#;

    fn task_schema() -> DocumentSchema {
        DocumentSchema::from_json(TASK).unwrap()
    }

    #[test]
    fn conforming_document_passes_and_keeps_fields() {
        let mut doc = json!({"title": "write docs", "done": false});
        validate(&mut doc, &task_schema(), ValidationOptions::default()).unwrap();
        assert_eq!(doc.get("title"), Some(&json!("write docs")));
        assert_eq!(doc.get("done"), Some(&json!(false)));
        // Defaulting still runs.
        assert_eq!(doc.get("priority"), Some(&json!(3)));
    }

    #[test]
    fn missing_required_field_raises_exactly_that_field() {
        let mut doc = json!({"done": true});
        let err = validate(&mut doc, &task_schema(), ValidationOptions::default()).unwrap_err();

        let errors = err.field_errors().expect("validation failure");
        assert_eq!(errors.len(), 1);
        assert!(!errors["title"].is_empty());
        assert_eq!(err.code(), "validation-failed");
    }

    #[test]
    fn never_filters_or_trims() {
        let mut doc = json!({"title": "  padded  ", "extra": " kept "});
        validate(&mut doc, &task_schema(), ValidationOptions::default()).unwrap();
        assert_eq!(doc.get("title"), Some(&json!("  padded  ")));
        assert_eq!(doc.get("extra"), Some(&json!(" kept ")));
    }

    #[test]
    fn coercion_runs_before_validation() {
        let mut doc = json!({"title": "t", "priority": "5", "done": "true"});
        validate(&mut doc, &task_schema(), ValidationOptions::default()).unwrap();
        assert_eq!(doc.get("priority"), Some(&json!(5)));
        assert_eq!(doc.get("done"), Some(&json!(true)));
    }

    #[test]
    fn empty_document_passes_all_optional_schema() {
        let schema = DocumentSchema::from_json(ALL_OPTIONAL).unwrap();
        let mut doc = json!({});
        validate(&mut doc, &schema, ValidationOptions::default()).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn non_object_input_is_a_precondition_failure() {
        let inputs = [
            (json!([1, 2]), "array"),
            (json!("doc"), "string"),
            (json!(null), "null"),
            (json!(4), "number"),
        ];
        for (mut input, kind) in inputs {
            let err =
                validate(&mut input, &task_schema(), ValidationOptions::default()).unwrap_err();
            assert_eq!(
                err,
                SafeError::Precondition(format!("document must be an object, got {kind}"))
            );

            let err = validate_collect(&mut input, &task_schema(), ValidationOptions::default())
                .unwrap_err();
            assert!(matches!(err, SafeError::Precondition(_)));
        }
    }

    #[test]
    fn collect_mode_returns_errors() {
        let mut doc = json!({});
        let errors = validate_collect(&mut doc, &task_schema(), ValidationOptions::default())
            .unwrap()
            .expect("errors");
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["title"]);

        let mut doc = json!({"title": "ok"});
        assert!(
            validate_collect(&mut doc, &task_schema(), ValidationOptions::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn gate_failure_mode_selects_delivery() {
        let schema = task_schema();

        let raising = ValidationGate::default();
        let mut doc = json!({});
        assert!(matches!(
            raising.check(&mut doc, &schema, ValidationOptions::default()),
            Err(SafeError::ValidationFailed { .. })
        ));

        let returning = ValidationGate::new(GateConfig {
            failure_mode: FailureMode::Return,
        });
        let mut doc = json!({});
        let errors = returning
            .check(&mut doc, &schema, ValidationOptions::default())
            .unwrap()
            .expect("errors returned");
        assert!(errors.contains_key("title"));

        let mut doc = json!({"title": "fine"});
        assert_eq!(
            raising.check(&mut doc, &schema, ValidationOptions::default()),
            Ok(None)
        );
    }

    #[test]
    fn prepare_hook_sees_document_on_insert() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let schema = task_schema().with_prepare(move |attrs, params| {
            record
                .lock()
                .unwrap()
                .push((params.is_update, params.modifier.is_some()));
            attrs.insert("title".to_string(), json!("derived"));
        });

        let mut doc = json!({});
        validate(&mut doc, &schema, ValidationOptions::default()).unwrap();
        assert_eq!(doc.get("title"), Some(&json!("derived")));
        assert_eq!(*seen.lock().unwrap(), vec![(false, false)]);
    }

    #[test]
    fn prepare_hook_sees_set_component_on_update() {
        let schema = task_schema().with_prepare(|attrs, params| {
            assert!(params.is_update);
            assert!(params.modifier.unwrap().contains_key("$set"));
            attrs.insert("updatedAt".to_string(), json!(1700000000));
        });

        let mut modifier = json!({"$set": {"done": true}});
        validate(&mut modifier, &schema, ValidationOptions::modifier()).unwrap();
        assert_eq!(
            modifier,
            json!({"$set": {"done": true, "updatedAt": 1700000000}})
        );
    }

    #[test]
    fn modifier_without_set_gives_hook_empty_attributes() {
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let schema = task_schema().with_prepare(move |attrs, params| {
            *record.lock().unwrap() = Some((attrs.is_empty(), params.is_update));
            attrs.insert("updatedAt".to_string(), json!(1));
        });

        let mut modifier = json!({"$unset": {"done": ""}});
        validate(&mut modifier, &schema, ValidationOptions::modifier()).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((true, true)));
        // The detached map is not written back.
        assert_eq!(modifier, json!({"$unset": {"done": ""}}));
    }

    #[test]
    fn non_object_set_is_a_precondition_failure() {
        let schema = task_schema().with_prepare(|_, _| {});
        let mut modifier = json!({"$set": "title"});
        assert_eq!(
            validate(&mut modifier, &schema, ValidationOptions::modifier()),
            Err(SafeError::Precondition("$set must be an object, got string".to_string()))
        );
    }

    #[test]
    fn modifier_validation_failure_names_fields() {
        let mut modifier = json!({"$set": {"priority": "high"}});
        let err = validate(&mut modifier, &task_schema(), ValidationOptions::modifier())
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("priority"));
    }

    #[test]
    fn explicit_context_records_outcome() {
        let schema = task_schema();
        let mut context = schema.new_context();

        let mut doc = json!({});
        let options = ValidationOptions::default().with_context(&mut context);
        assert!(validate(&mut doc, &schema, options).is_err());
        assert_eq!(context.error_object().invalid_keys.len(), 1);

        let mut doc = json!({"title": "ok"});
        let options = ValidationOptions::default().with_context(&mut context);
        assert!(validate(&mut doc, &schema, options).is_ok());
        assert!(context.is_valid());
    }
}
