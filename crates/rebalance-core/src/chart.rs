//! Before/after pie-chart datasets.
//!
//! Only the data is produced here; drawing is left to whatever front end
//! consumes it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RebalanceError;
use crate::types::Money;
use crate::RebalanceResult;

/// One pie: a slice per asset, in portfolio order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieDataset {
    pub labels: Vec<String>,
    pub values: Vec<Money>,
    /// Share of each slice in this dataset's own total, 0–100, the way a pie
    /// chart sizes its slices. The "after" slices therefore always sum to 100,
    /// even when capital was left unallocated. All zero when the total is zero.
    pub percentages: Vec<Decimal>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub before: PieDataset,
    pub after: PieDataset,
}

/// `n` evenly spaced hues at fixed saturation and lightness, as CSS `hsl()` strings.
pub fn generate_colors(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (360.0 / n as f64 * i as f64).floor() as u32;
            format!("hsl({hue}, 70%, 60%)")
        })
        .collect()
}

/// Build the "current" and "current + contribution" datasets.
pub fn build_chart_data(
    names: &[String],
    current_values: &[Money],
    contributions: &[Money],
) -> RebalanceResult<ChartData> {
    if current_values.len() != names.len() || contributions.len() != names.len() {
        return Err(RebalanceError::InvalidInput {
            field: "contributions".into(),
            reason: format!(
                "Expected {} current values and contributions, got {} and {}",
                names.len(),
                current_values.len(),
                contributions.len()
            ),
        });
    }

    let final_values = current_values
        .iter()
        .zip(contributions)
        .map(|(v, c)| v.checked_add(*c).ok_or_else(|| overflow("contributions")))
        .collect::<RebalanceResult<Vec<Money>>>()?;

    Ok(ChartData {
        before: dataset(names, current_values.to_vec(), "current_values")?,
        after: dataset(names, final_values, "contributions")?,
    })
}

fn dataset(names: &[String], values: Vec<Money>, field: &str) -> RebalanceResult<PieDataset> {
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| overflow(field))?;
    let percentages = values
        .iter()
        .map(|v| {
            if total.is_zero() {
                Ok(Decimal::ZERO)
            } else {
                v.checked_div(total)
                    .and_then(|share| share.checked_mul(dec!(100)))
                    .ok_or_else(|| overflow(field))
            }
        })
        .collect::<RebalanceResult<Vec<Decimal>>>()?;

    Ok(PieDataset {
        labels: names.to_vec(),
        colors: generate_colors(names.len()),
        values,
        percentages,
    })
}

fn overflow(field: &str) -> RebalanceError {
    RebalanceError::InvalidInput {
        field: field.into(),
        reason: "sum overflows the supported decimal range".into(),
    }
}
