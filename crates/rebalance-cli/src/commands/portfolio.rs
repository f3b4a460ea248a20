use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use rebalance_core::allocation::{RebalanceInput, ZeroGapPolicy};
use rebalance_core::input::{parse_locale_number, RawPortfolio};
use rebalance_core::{Asset, Portfolio};

use crate::input;

/// Portfolio arguments shared by every command that runs the engine
#[derive(Args, Debug)]
pub struct PortfolioArgs {
    /// Path to a JSON file: either typed assets or raw form text
    #[arg(long)]
    pub input: Option<String>,

    /// Asset as NAME:VALUE:PERCENT, repeatable (e.g. "Bonds:1500,50:40")
    #[arg(long = "asset", value_name = "NAME:VALUE:PERCENT", allow_hyphen_values = true)]
    pub assets: Vec<String>,

    /// New capital to invest; comma or dot decimal separator
    #[arg(long, allow_hyphen_values = true)]
    pub capital: Option<String>,

    /// Allowed deviation of the percentage sum from 100 (default: exact)
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// What to do with capital when no asset is below target
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Leave the capital unallocated
    DropCapital,
    /// Split the capital by target percentage
    TargetWeights,
}

impl From<PolicyArg> for ZeroGapPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::DropCapital => ZeroGapPolicy::DropCapital,
            PolicyArg::TargetWeights => ZeroGapPolicy::TargetWeights,
        }
    }
}

/// Resolve the engine input from `--input`, piped stdin, or `--asset` flags,
/// then apply any option overrides given on the command line.
pub fn load_rebalance_input(
    args: &PortfolioArgs,
) -> Result<RebalanceInput, Box<dyn std::error::Error>> {
    let mut rebalance_input = if let Some(ref path) = args.input {
        input_from_value(input::file::read_json_value(path)?)?
    } else if !args.assets.is_empty() {
        RebalanceInput::from(portfolio_from_flags(&args.assets, args.capital.as_deref())?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        input_from_value(data)?
    } else {
        return Err("Provide --asset NAME:VALUE:PERCENT flags, --input <file.json>, or pipe JSON via stdin".into());
    };

    if let Some(tolerance) = args.tolerance {
        rebalance_input.options.sum_tolerance = tolerance;
    }
    if let Some(policy) = args.policy {
        rebalance_input.options.zero_gap_policy = policy.into();
    }

    debug!(
        assets = rebalance_input.assets.len(),
        capital = %rebalance_input.available_capital,
        tolerance = %rebalance_input.options.sum_tolerance,
        policy = ?rebalance_input.options.zero_gap_policy,
        "Resolved rebalance input"
    );
    Ok(rebalance_input)
}

/// Raw form text is recognised by its `capital_text` / `value_text` fields;
/// anything else is read as typed input.
fn input_from_value(data: Value) -> Result<RebalanceInput, Box<dyn std::error::Error>> {
    if is_form_text(&data) {
        let raw: RawPortfolio = serde_json::from_value(data)?;
        debug!(rows = raw.assets.len(), "Collecting raw form text");
        Ok(RebalanceInput::from(raw.collect()))
    } else {
        Ok(serde_json::from_value(data)?)
    }
}

fn is_form_text(data: &Value) -> bool {
    let Some(obj) = data.as_object() else {
        return false;
    };
    if obj.contains_key("capital_text") {
        return true;
    }
    obj.get("assets")
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
        .and_then(|first| first.as_object())
        .map(|first| first.contains_key("value_text") || first.contains_key("percent_text"))
        .unwrap_or(false)
}

fn portfolio_from_flags(
    flags: &[String],
    capital: Option<&str>,
) -> Result<Portfolio, Box<dyn std::error::Error>> {
    let assets = flags
        .iter()
        .map(|flag| parse_asset_flag(flag))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Portfolio {
        assets,
        available_capital: capital.map(parse_locale_number).unwrap_or(Decimal::ZERO),
    })
}

/// Parse `NAME:VALUE:PERCENT`. The name may itself contain colons; the
/// numbers are read leniently like any other form field.
pub fn parse_asset_flag(flag: &str) -> Result<Asset, String> {
    let mut parts = flag.rsplitn(3, ':');
    let percent = parts.next();
    let value = parts.next();
    let name = parts.next();
    match (name, value, percent) {
        (Some(name), Some(value), Some(percent)) => Ok(Asset {
            name: name.to_string(),
            current_value: parse_locale_number(value),
            target_percent: parse_locale_number(percent),
        }),
        _ => Err(format!(
            "Invalid asset '{}'. Expected NAME:VALUE:PERCENT (e.g. \"Stocks:1000:60\")",
            flag
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_asset_flag_with_comma_decimals() {
        let asset = parse_asset_flag("Bonds:1500,50:40").unwrap();
        assert_eq!(asset, Asset::new("Bonds", dec!(1500.50), dec!(40)));
    }

    #[test]
    fn test_asset_flag_name_with_colon() {
        let asset = parse_asset_flag("Fund: Global:10:100").unwrap();
        assert_eq!(asset.name, "Fund: Global");
        assert_eq!(asset.current_value, dec!(10));
    }

    #[test]
    fn test_asset_flag_lenient_numbers() {
        let asset = parse_asset_flag(":n/a:").unwrap();
        assert_eq!(asset, Asset::new("", Decimal::ZERO, Decimal::ZERO));
    }

    #[test]
    fn test_asset_flag_missing_fields() {
        assert!(parse_asset_flag("Stocks:1000").is_err());
        assert!(parse_asset_flag("Stocks").is_err());
    }

    #[test]
    fn test_form_text_detection() {
        assert!(is_form_text(&json!({ "capital_text": "100", "assets": [] })));
        assert!(is_form_text(&json!({ "assets": [{ "name": "A", "value_text": "1" }] })));
        assert!(!is_form_text(&json!({
            "assets": [{ "name": "A", "current_value": "1", "target_percent": "100" }],
            "available_capital": "10"
        })));
    }

    #[test]
    fn test_typed_json_input() {
        let input = input_from_value(json!({
            "assets": [
                { "name": "A", "current_value": "100", "target_percent": "50" },
                { "name": "B", "current_value": 100, "target_percent": 50 }
            ],
            "available_capital": "100",
            "options": { "zero_gap_policy": "target_weights" }
        }))
        .unwrap();
        assert_eq!(input.assets.len(), 2);
        assert_eq!(input.assets[1].current_value, dec!(100));
        assert_eq!(input.options.zero_gap_policy, ZeroGapPolicy::TargetWeights);
    }

    #[test]
    fn test_form_json_input() {
        let input = input_from_value(json!({
            "assets": [
                { "name": "A", "value_text": "200,0", "percent_text": "50" },
                { "name": "B", "value_text": "", "percent_text": "50" }
            ],
            "capital_text": "100"
        }))
        .unwrap();
        assert_eq!(input.assets[0].current_value, dec!(200));
        assert_eq!(input.assets[1].current_value, Decimal::ZERO);
        assert_eq!(input.available_capital, dec!(100));
    }

    #[test]
    fn test_flags_default_capital_to_zero() {
        let portfolio = portfolio_from_flags(&["A:1:100".to_string()], None).unwrap();
        assert_eq!(portfolio.available_capital, Decimal::ZERO);
    }
}
