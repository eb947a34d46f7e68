use clap::{ArgGroup, Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod matching;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean and validate a document or modifier against a schema.
    Validate(ValidateArgs),
    /// Check a value against a match predicate.
    Match(MatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Match(args) => matching::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["schema", "schema_dir"])))]
#[command(group(ArgGroup::new("input").required(true).args(["doc", "json"])))]
pub struct ValidateArgs {
    /// Schema file.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Directory of `<name>.schema.json` files.
    #[arg(long, value_name = "DIR", requires = "name")]
    pub schema_dir: Option<PathBuf>,
    /// Schema name within --schema-dir.
    #[arg(long)]
    pub name: Option<String>,
    /// Read the document from a file.
    #[arg(long, value_name = "FILE")]
    pub doc: Option<PathBuf>,
    /// Inline JSON document.
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,
    /// Treat the input as a modifier (`$set`, `$unset`, ...).
    #[arg(long)]
    pub modifier: bool,
    /// Print field errors instead of failing with an error message.
    #[arg(long)]
    pub return_errors: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("predicate").required(true).args(["url", "old_id", "regex", "keys"])))]
pub struct MatchArgs {
    /// Value to check. Parsed as JSON with --keys, taken verbatim otherwise.
    pub value: String,
    /// Permissive URL pattern.
    #[arg(long)]
    pub url: bool,
    /// Legacy 17-character id pattern.
    #[arg(long)]
    pub old_id: bool,
    /// Custom regular expression.
    #[arg(long, value_name = "PATTERN")]
    pub regex: Option<String>,
    /// Object key whitelist (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub keys: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
