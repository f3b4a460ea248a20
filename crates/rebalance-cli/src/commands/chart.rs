use clap::Args;
use serde_json::Value;
use std::time::Instant;

use rebalance_core::allocation::calculate_rebalance;
use rebalance_core::chart::build_chart_data;
use rebalance_core::{with_metadata, Money};

use super::portfolio::{load_rebalance_input, PortfolioArgs};

/// Arguments for the before/after chart datasets
#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
}

pub fn run_chart(args: ChartArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let input_data = load_rebalance_input(&args.portfolio)?;
    let report = calculate_rebalance(&input_data)?;

    let lines = &report.result.allocations;
    let names: Vec<String> = lines.iter().map(|l| l.name.clone()).collect();
    let current: Vec<Money> = lines.iter().map(|l| l.current_value).collect();
    let contributions: Vec<Money> = lines.iter().map(|l| l.suggested_contribution).collect();
    let chart = build_chart_data(&names, &current, &contributions)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Portfolio composition before and after the suggested contributions",
        &serde_json::json!({
            "assets": names.len(),
            "available_capital": input_data.available_capital.to_string(),
        }),
        report.warnings,
        elapsed,
        chart,
    );
    Ok(serde_json::to_value(output)?)
}
