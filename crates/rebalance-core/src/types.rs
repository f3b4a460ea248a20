use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed on a 0–100 scale (50 = 50%). Never as fractions.
pub type Percent = Decimal;

/// A named holding with its current value and target share of the portfolio.
///
/// Assets have no identifier of their own: their position in the portfolio is
/// their identity, and every output preserves that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub current_value: Money,
    pub target_percent: Percent,
}

impl Asset {
    pub fn new(name: impl Into<String>, current_value: Money, target_percent: Percent) -> Self {
        Self {
            name: name.into(),
            current_value,
            target_percent,
        }
    }
}

/// An ordered set of assets plus the new money to be invested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    pub available_capital: Money,
}

impl Portfolio {
    pub fn names(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.name.clone()).collect()
    }

    pub fn current_values(&self) -> Vec<Money> {
        self.assets.iter().map(|a| a.current_value).collect()
    }

    pub fn target_percents(&self) -> Vec<Percent> {
        self.assets.iter().map(|a| a.target_percent).collect()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
