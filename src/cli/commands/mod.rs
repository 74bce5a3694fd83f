pub mod migrate;
pub mod prune;
pub mod serve;
pub mod token;

use std::fmt::Display;

use serde_json::Value;

use crate::cli::OutputFormat;

/// Print a command result: the JSON value as-is, or the text line.
pub(crate) fn print_output(format: OutputFormat, json: Value, text: impl Display) {
    match format {
        OutputFormat::Json => println!("{}", json),
        OutputFormat::Text => println!("{}", text),
    }
}
