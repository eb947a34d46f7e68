use jsonschema::error::ValidationErrorKind;
use jsonschema::paths::Location;
use serde_json::{Map, Value};

use crate::contract::InvalidKey;
use crate::document::{FieldRule, Inner, ObjectRules, PathLookup};

/// Modifier operators whose operand is a `{path: value}` map of new values.
const SET_OPERATORS: [&str; 2] = ["$set", "$setOnInsert"];

/// Invalid-key name for failures of the document as a whole, e.g.
/// `minProperties` or `oneOf` at the root.
pub const ROOT_KEY: &str = "$root";

pub(crate) fn validate_document(schema: &Inner, doc: &Map<String, Value>) -> Vec<InvalidKey> {
    let mut errors = Vec::new();
    validate_object(schema, &schema.root, doc, "", &mut errors);
    validate_whole(schema, doc, &mut errors);
    errors
}

/// Run the whole-document validator and add failures at names the field
/// pass has not already reported.
fn validate_whole(schema: &Inner, doc: &Map<String, Value>, errors: &mut Vec<InvalidKey>) {
    let instance = Value::Object(doc.clone());
    for err in schema.validator.iter_errors(&instance) {
        let base = dotted(err.instance_path());
        let names = match err.kind() {
            ValidationErrorKind::Required { property } => {
                let property = match property {
                    Value::String(name) => name.clone(),
                    other => other.to_string(),
                };
                vec![join(&base, &property)]
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                unexpected.iter().map(|name| join(&base, name)).collect()
            }
            _ if base.is_empty() => vec![ROOT_KEY.to_string()],
            _ => vec![base],
        };

        for name in names {
            if errors.iter().all(|known| known.name != name) {
                errors.push(InvalidKey::new(name, err.to_string()));
            }
        }
    }
}

fn dotted(location: &Location) -> String {
    location
        .iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

pub(crate) fn validate_modifier(schema: &Inner, modifier: &Map<String, Value>) -> Vec<InvalidKey> {
    let mut errors = Vec::new();

    for (op, operand) in modifier {
        if !op.starts_with('$') {
            errors.push(InvalidKey::new(
                op.as_str(),
                format!("{op} is not a modifier operator"),
            ));
            continue;
        }

        let Some(fields) = operand.as_object() else {
            errors.push(InvalidKey::new(
                op.as_str(),
                format!("{op} operand must be an object"),
            ));
            continue;
        };

        match op.as_str() {
            op if SET_OPERATORS.contains(&op) => {
                for (path, value) in fields {
                    validate_set_path(schema, path, value, &mut errors);
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    if let PathLookup::Declared(resolved) = schema.root.resolve(path) {
                        if resolved.required {
                            errors.push(required(path));
                        }
                    }
                }
            }
            "$inc" => {
                for (path, value) in fields {
                    if !value.is_number() {
                        errors.push(InvalidKey::new(
                            path.as_str(),
                            format!("{path} must be incremented by a number"),
                        ));
                    } else if let PathLookup::Undeclared = schema.root.resolve(path) {
                        errors.push(not_allowed(path));
                    }
                }
            }
            "$push" | "$addToSet" => {
                for (path, value) in fields {
                    validate_push_path(schema, path, value, &mut errors);
                }
            }
            "$pull" => {
                for path in fields.keys() {
                    if let PathLookup::Undeclared = schema.root.resolve(path) {
                        errors.push(not_allowed(path));
                    }
                }
            }
            other => errors.push(InvalidKey::new(
                other,
                format!("{other} is not a supported modifier operator"),
            )),
        }
    }

    errors
}

fn validate_set_path(schema: &Inner, path: &str, value: &Value, errors: &mut Vec<InvalidKey>) {
    match schema.root.resolve(path) {
        PathLookup::Declared(resolved) => {
            if value.is_null() && resolved.required {
                errors.push(required(path));
            } else {
                validate_value(schema, resolved.rule, value, path, errors);
            }
        }
        PathLookup::Open => run_matchers(schema, path, value, errors),
        PathLookup::Undeclared => errors.push(not_allowed(path)),
    }
}

fn validate_push_path(schema: &Inner, path: &str, value: &Value, errors: &mut Vec<InvalidKey>) {
    let element_rule = match schema.root.resolve(path) {
        PathLookup::Declared(resolved) => resolved.rule.items.as_deref(),
        PathLookup::Open => None,
        PathLookup::Undeclared => {
            errors.push(not_allowed(path));
            return;
        }
    };
    let Some(rule) = element_rule else {
        return;
    };

    let each = value
        .as_object()
        .and_then(|m| m.get("$each"))
        .and_then(Value::as_array);
    let elements: Vec<&Value> = match each {
        Some(items) => items.iter().collect(),
        None => vec![value],
    };

    let element_path = format!("{path}.$");
    for element in elements {
        validate_value(schema, rule, element, &element_path, errors);
    }
}

fn validate_object(
    schema: &Inner,
    rules: &ObjectRules,
    map: &Map<String, Value>,
    prefix: &str,
    errors: &mut Vec<InvalidKey>,
) {
    for (name, rule) in &rules.fields {
        let path = join(prefix, name);
        match map.get(name) {
            None | Some(Value::Null) if rules.required.contains(name) => {
                errors.push(required(&path));
            }
            None => {}
            Some(value) => validate_value(schema, rule, value, &path, errors),
        }
    }

    // Required names without a property declaration still have to be present.
    for name in &rules.required {
        if !rules.fields.contains_key(name) && map.get(name).is_none_or(Value::is_null) {
            errors.push(required(&join(prefix, name)));
        }
    }

    for (name, value) in map {
        if rules.fields.contains_key(name) {
            continue;
        }
        let path = join(prefix, name);
        if rules.allow_unknown {
            run_matchers(schema, &path, value, errors);
        } else {
            errors.push(not_allowed(&path));
        }
    }
}

fn validate_value(
    schema: &Inner,
    rule: &FieldRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<InvalidKey>,
) {
    let before = errors.len();

    match (&rule.object, value) {
        (Some(object), Value::Object(map)) => {
            validate_object(schema, object, map, path, errors);
        }
        _ => {
            if let (Some(items), Value::Array(elements)) = (rule.items.as_deref(), value) {
                for (index, element) in elements.iter().enumerate() {
                    validate_value(schema, items, element, &format!("{path}.{index}"), errors);
                }
            }
        }
    }

    // Keywords that are not broken down per field still apply to the whole value.
    if errors.len() == before {
        if let Some(message) = rule.first_error(value) {
            errors.push(InvalidKey::new(path, message));
        }
    }

    if errors.len() == before {
        run_matchers(schema, path, value, errors);
    }
}

fn run_matchers(schema: &Inner, path: &str, value: &Value, errors: &mut Vec<InvalidKey>) {
    let Some(matchers) = schema.matchers.get(path) else {
        return;
    };
    if let Some(err) = matchers.iter().find_map(|m| m.check(value).err()) {
        errors.push(InvalidKey::new(path, format!("{path}: {err}")));
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn required(path: &str) -> InvalidKey {
    InvalidKey::new(path, format!("{path} is required"))
}

fn not_allowed(path: &str) -> InvalidKey {
    InvalidKey::new(path, format!("{path} is not allowed by the schema"))
}
