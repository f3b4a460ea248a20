use clap::Args;
use serde::Serialize;
use serde_json::Value;

use rebalance_core::input::parse_locale_number;
use rebalance_core::Money;

/// Arguments for the number-reading helper
#[derive(Args)]
pub struct ParseArgs {
    /// Text as it would be typed into a value, percentage or capital field
    #[arg(required = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ParsedField {
    text: String,
    value: Money,
}

pub fn run_parse(args: ParseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let results: Vec<ParsedField> = args
        .text
        .into_iter()
        .map(|text| ParsedField {
            value: parse_locale_number(&text),
            text,
        })
        .collect();
    Ok(serde_json::json!({ "results": results }))
}
