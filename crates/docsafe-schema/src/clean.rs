use serde_json::{Map, Number, Value};

use crate::config::CleanOptions;
use crate::document::{FieldRule, ObjectRules, PathLookup};

const SET_OPERATORS: [&str; 2] = ["$set", "$setOnInsert"];

pub(crate) fn clean_document(
    root: &ObjectRules,
    doc: &mut Map<String, Value>,
    options: &CleanOptions,
) {
    if options.is_modifier {
        clean_modifier(root, doc, options);
    } else {
        clean_object(root, doc, options);
    }
}

fn clean_modifier(root: &ObjectRules, modifier: &mut Map<String, Value>, options: &CleanOptions) {
    for (op, operand) in modifier.iter_mut() {
        let Some(fields) = operand.as_object_mut() else {
            continue;
        };

        if options.filter {
            fields.retain(|path, _| !matches!(root.resolve(path), PathLookup::Undeclared));
        }

        match op.as_str() {
            op if SET_OPERATORS.contains(&op) => {
                for (path, value) in fields.iter_mut() {
                    match root.resolve(path) {
                        PathLookup::Declared(resolved) => {
                            clean_value(resolved.rule, value, options)
                        }
                        _ => trim_if_string(value, options),
                    }
                }
            }
            "$inc" if options.auto_convert => {
                for value in fields.values_mut() {
                    if let Some(number) = value.as_str().and_then(parse_number) {
                        *value = number;
                    }
                }
            }
            "$push" | "$addToSet" => {
                for (path, value) in fields.iter_mut() {
                    let PathLookup::Declared(resolved) = root.resolve(path) else {
                        continue;
                    };
                    let Some(items) = resolved.rule.items.as_deref() else {
                        continue;
                    };
                    match value.get_mut("$each").and_then(Value::as_array_mut) {
                        Some(each) => each
                            .iter_mut()
                            .for_each(|element| clean_value(items, element, options)),
                        None => clean_value(items, value, options),
                    }
                }
            }
            _ => {}
        }
    }

    if options.filter {
        modifier.retain(|_, operand| !matches!(operand, Value::Object(m) if m.is_empty()));
    }
}

fn clean_object(rules: &ObjectRules, map: &mut Map<String, Value>, options: &CleanOptions) {
    if options.filter && rules.is_declared() {
        map.retain(|name, _| rules.fields.contains_key(name));
    }

    for (name, value) in map.iter_mut() {
        match rules.fields.get(name) {
            Some(rule) => clean_value(rule, value, options),
            None => trim_if_string(value, options),
        }
    }

    if options.apply_defaults {
        for (name, rule) in &rules.fields {
            if let Some(default) = &rule.default {
                if !map.contains_key(name) {
                    map.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

fn clean_value(rule: &FieldRule, value: &mut Value, options: &CleanOptions) {
    if options.auto_convert {
        convert(rule.kind.as_deref(), value);
    }
    trim_if_string(value, options);

    match value {
        Value::Object(map) => {
            if let Some(object) = &rule.object {
                clean_object(object, map, options);
            }
        }
        Value::Array(elements) => {
            if let Some(items) = rule.items.as_deref() {
                for element in elements {
                    clean_value(items, element, options);
                }
            }
        }
        _ => {}
    }
}

fn trim_if_string(value: &mut Value, options: &CleanOptions) {
    if !options.trim_strings {
        return;
    }
    if let Value::String(text) = value {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }
}

/// Coerce a scalar toward the declared JSON Schema type. Values that cannot
/// be converted are left for validation to reject.
fn convert(kind: Option<&str>, value: &mut Value) {
    let converted = match (kind, &*value) {
        (Some("string"), Value::Number(n)) => Some(Value::String(n.to_string())),
        (Some("string"), Value::Bool(b)) => Some(Value::String(b.to_string())),
        (Some("number"), Value::String(s)) => parse_number(s),
        (Some("integer"), Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (Some("integer"), Value::Number(n)) if n.is_f64() => n.as_f64().and_then(exact_integer),
        (Some("boolean"), Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (Some("boolean"), Value::Number(n)) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
        (Some("array"), scalar) if !scalar.is_array() && !scalar.is_null() => {
            Some(Value::Array(vec![scalar.clone()]))
        }
        _ => None,
    };

    if let Some(converted) = converted {
        *value = converted;
    }
}

/// Whole floats that fit `i64` or `u64` exactly; anything else stays a float.
fn exact_integer(f: f64) -> Option<Value> {
    if f.fract() != 0.0 {
        return None;
    }
    // `i64::MAX as f64` rounds up to 2^63, so the upper bounds are exclusive.
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else if f >= 0.0 && f < u64::MAX as f64 {
        Some(Value::from(f as u64))
    } else {
        None
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
