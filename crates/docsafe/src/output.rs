use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use docsafe_gate::FieldErrorMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    schema_id: &'static str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrorMap>,
}

const VALIDATION_SCHEMA_ID: &str =
    "https://schemas.3leaps.dev/docsafe/cli/v1/validation-result.schema.json";
const MATCH_SCHEMA_ID: &str = "https://schemas.3leaps.dev/docsafe/cli/v1/match-result.schema.json";

/// Print a document that passed the gate, after cleaning.
pub fn print_document(document: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ValidationOutput {
            schema_id: VALIDATION_SCHEMA_ID,
            valid: true,
            document: Some(document),
            errors: None,
        }),
        OutputFormat::Table => {
            let rows = match document.as_object() {
                Some(map) => map
                    .iter()
                    .map(|(field, value)| vec![field.clone(), render_value(value)])
                    .collect(),
                None => vec![vec!["(document)".to_string(), render_value(document)]],
            };
            print_table(vec!["FIELD", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// Print the field errors of a failed validation.
pub fn print_field_errors(errors: &FieldErrorMap, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ValidationOutput {
            schema_id: VALIDATION_SCHEMA_ID,
            valid: false,
            document: None,
            errors: Some(errors),
        }),
        OutputFormat::Table => {
            let rows = errors
                .iter()
                .map(|(field, message)| vec![field.clone(), message.clone()])
                .collect();
            print_table(vec!["FIELD", "ERROR"], rows);
        }
        OutputFormat::Pretty => {
            for (field, message) in errors {
                println!("{field}: {message}");
            }
        }
    }
}

#[derive(Serialize)]
pub struct MatchOutput<'a> {
    pub predicate: &'a str,
    pub value: &'a Value,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn print_match(out: &MatchOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Envelope<'a> {
                schema_id: &'static str,
                #[serde(flatten)]
                result: &'a MatchOutput<'a>,
            }
            print_json(&Envelope {
                schema_id: MATCH_SCHEMA_ID,
                result: out,
            });
        }
        OutputFormat::Table => {
            print_table(
                vec!["PREDICATE", "VALUE", "MATCHED", "REASON"],
                vec![vec![
                    out.predicate.to_string(),
                    render_value(out.value),
                    out.matched.to_string(),
                    out.reason.clone().unwrap_or_default(),
                ]],
            );
        }
        OutputFormat::Pretty => match &out.reason {
            Some(reason) => println!("{}: rejected ({reason})", out.predicate),
            None => println!("{}: matched", out.predicate),
        },
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
