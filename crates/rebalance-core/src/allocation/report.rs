use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{
    allocate_with, checked_sum, overflow, target_values, AllocationOptions, ZeroGapPolicy,
};
use crate::types::*;
use crate::RebalanceResult;

/// Input for a full rebalance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceInput {
    pub assets: Vec<Asset>,
    /// New money to distribute across the assets
    pub available_capital: Money,
    #[serde(default)]
    pub options: AllocationOptions,
}

impl From<Portfolio> for RebalanceInput {
    fn from(portfolio: Portfolio) -> Self {
        Self {
            assets: portfolio.assets,
            available_capital: portfolio.available_capital,
            options: AllocationOptions::default(),
        }
    }
}

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub name: String,
    pub current_value: Money,
    pub target_percent: Percent,
    /// Value the asset should hold once the capital is added
    pub target_value: Money,
    pub suggested_contribution: Money,
    /// current_value + suggested_contribution
    pub final_value: Money,
    /// Shortfall still left after this contribution, floored at zero
    pub remaining_gap: Money,
}

/// Output of the rebalance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceOutput {
    pub allocations: Vec<AllocationLine>,
    pub total_current: Money,
    pub total_final: Money,
    pub total_contribution: Money,
    /// Capital the engine did not place (only when no asset was below target)
    pub unallocated_capital: Money,
    /// Sum of remaining gaps; zero when the portfolio ends up on target
    pub remaining_shortfall: Money,
    pub fully_balanced: bool,
}

/// Allocate the capital and build the per-asset result table.
pub fn calculate_rebalance(
    input: &RebalanceInput,
) -> RebalanceResult<ComputationOutput<RebalanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let names: Vec<String> = input.assets.iter().map(|a| a.name.clone()).collect();
    let current: Vec<Money> = input.assets.iter().map(|a| a.current_value).collect();
    let percents: Vec<Percent> = input.assets.iter().map(|a| a.target_percent).collect();

    let contributions = allocate_with(
        &names,
        &current,
        &percents,
        input.available_capital,
        &input.options,
    )?;
    let targets = target_values(&current, &percents, input.available_capital)?;

    if input.assets.iter().any(|a| a.current_value < Decimal::ZERO) {
        warnings.push("Negative current value present; results may be meaningless".into());
    }
    if input.assets.iter().any(|a| a.target_percent < Decimal::ZERO) {
        warnings.push("Negative target percentage present".into());
    }
    if input.available_capital < Decimal::ZERO {
        warnings.push("Available capital is negative".into());
    }

    let allocations = input
        .assets
        .iter()
        .zip(targets.iter())
        .zip(contributions.iter())
        .map(|((asset, target), contribution)| {
            let final_value = asset
                .current_value
                .checked_add(*contribution)
                .ok_or_else(|| overflow("current_values"))?;
            let remaining_gap = target
                .checked_sub(final_value)
                .ok_or_else(|| overflow("current_values"))?
                .max(Decimal::ZERO);
            Ok(AllocationLine {
                name: asset.name.clone(),
                current_value: asset.current_value,
                target_percent: asset.target_percent,
                target_value: *target,
                suggested_contribution: *contribution,
                final_value,
                remaining_gap,
            })
        })
        .collect::<RebalanceResult<Vec<AllocationLine>>>()?;

    let total_current = checked_sum(&current, "current_values")?;
    let total_final = total_current
        .checked_add(input.available_capital)
        .ok_or_else(|| overflow("available_capital"))?;
    let total_contribution = checked_sum(&contributions, "available_capital")?;
    let unallocated_capital = input
        .available_capital
        .checked_sub(total_contribution)
        .ok_or_else(|| overflow("available_capital"))?;
    let remaining_gaps: Vec<Money> = allocations.iter().map(|l| l.remaining_gap).collect();
    let remaining_shortfall = checked_sum(&remaining_gaps, "current_values")?;

    if !input.available_capital.is_zero()
        && total_contribution.is_zero()
        && input.options.zero_gap_policy == ZeroGapPolicy::DropCapital
    {
        warnings.push(format!(
            "Every asset is at or above its target value; {} of capital was not allocated",
            input.available_capital.round_dp(2)
        ));
    }

    let output = RebalanceOutput {
        allocations,
        total_current,
        total_final,
        total_contribution,
        unallocated_capital,
        remaining_shortfall,
        fully_balanced: remaining_shortfall.is_zero(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Proportional gap-filling contribution allocation",
        &serde_json::json!({
            "assets": input.assets.len(),
            "available_capital": input.available_capital.to_string(),
            "sum_tolerance": input.options.sum_tolerance.to_string(),
            "zero_gap_policy": input.options.zero_gap_policy,
        }),
        warnings,
        elapsed,
        output,
    ))
}
