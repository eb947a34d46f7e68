use std::path::Path;

use docsafe_gate::{FailureMode, GateConfig, SafeError, ValidationGate, ValidationOptions};
use docsafe_schema::{DocumentSchema, SchemaRegistry};
use serde_json::Value;
use tracing::{debug, info};

use crate::cmd::ValidateArgs;
use crate::exit::{
    io_error, json_error, safe_error, schema_error, CliError, CliResult, DATA_INVALID, SUCCESS,
    USAGE,
};
use crate::output::{print_document, print_field_errors, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args)?;
    let mut document = load_document(&args)?;

    let failure_mode = if args.return_errors {
        FailureMode::Return
    } else {
        FailureMode::Raise
    };
    let gate = ValidationGate::new(GateConfig { failure_mode });
    let options = if args.modifier {
        ValidationOptions::modifier()
    } else {
        ValidationOptions::default()
    };

    debug!(modifier = args.modifier, ?failure_mode, "running validation gate");
    match gate.check(&mut document, &schema, options) {
        Ok(None) => {
            info!("document is valid");
            print_document(&document, format);
            Ok(SUCCESS)
        }
        Ok(Some(errors)) => {
            print_field_errors(&errors, format);
            Ok(DATA_INVALID)
        }
        Err(err @ SafeError::ValidationFailed { .. }) => Err(safe_error("validation failed", err)),
        Err(err) => Err(safe_error("cannot validate input", err)),
    }
}

fn load_schema(args: &ValidateArgs) -> CliResult<DocumentSchema> {
    if let Some(path) = &args.schema {
        let text = read_file(path)?;
        return DocumentSchema::from_json(&text)
            .map_err(|err| schema_error(&format!("schema {}", path.display()), err));
    }

    let (Some(dir), Some(name)) = (&args.schema_dir, &args.name) else {
        return Err(CliError::new(
            USAGE,
            "either --schema or --schema-dir with --name is required",
        ));
    };
    let mut registry = SchemaRegistry::new();
    registry
        .load_named(dir, name)
        .cloned()
        .map_err(|err| schema_error(&format!("schema directory {}", dir.display()), err))
}

fn load_document(args: &ValidateArgs) -> CliResult<Value> {
    let text = match (&args.doc, &args.json) {
        (Some(path), _) => read_file(path)?,
        (None, Some(json)) => json.clone(),
        (None, None) => return Err(CliError::new(USAGE, "either --doc or --json is required")),
    };
    serde_json::from_str(&text).map_err(|err| json_error("document is not valid JSON", err))
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
}
