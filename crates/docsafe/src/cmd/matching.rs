use docsafe_schema::{Matcher, RegEx, WhitelistedObject};
use serde_json::Value;

use crate::cmd::MatchArgs;
use crate::exit::{json_error, schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_match, MatchOutput, OutputFormat};

pub fn run(args: MatchArgs, format: OutputFormat) -> CliResult<i32> {
    let (predicate, matcher, value) = build(args)?;

    let reason = matcher.check(&value).err().map(|err| err.to_string());
    let matched = reason.is_none();
    print_match(
        &MatchOutput {
            predicate: &predicate,
            value: &value,
            matched,
            reason,
        },
        format,
    );

    Ok(if matched { SUCCESS } else { DATA_INVALID })
}

fn build(args: MatchArgs) -> CliResult<(String, Box<dyn Matcher>, Value)> {
    if let Some(keys) = args.keys {
        let value = serde_json::from_str(&args.value)
            .map_err(|err| json_error("value is not valid JSON", err))?;
        let predicate = format!("keys[{}]", keys.join(","));
        return Ok((predicate, Box::new(WhitelistedObject::new(keys)), value));
    }

    let value = Value::String(args.value);
    if args.url {
        return Ok(("url".to_string(), Box::new(RegEx::url()), value));
    }
    if args.old_id {
        return Ok(("old-id".to_string(), Box::new(RegEx::old_id()), value));
    }
    match args.regex {
        Some(pattern) => {
            let matcher = RegEx::new(&pattern).map_err(|err| schema_error("--regex", err))?;
            Ok((format!("regex {pattern}"), Box::new(matcher), value))
        }
        None => Err(CliError::new(
            USAGE,
            "one of --url, --old-id, --regex or --keys is required",
        )),
    }
}
