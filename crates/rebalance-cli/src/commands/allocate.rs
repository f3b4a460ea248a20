use clap::Args;
use serde_json::Value;
use tracing::{info, warn};

use rebalance_core::allocation::calculate_rebalance;

use super::portfolio::{load_rebalance_input, PortfolioArgs};

/// Arguments for the contribution allocation
#[derive(Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_data = load_rebalance_input(&args.portfolio)?;
    let result = calculate_rebalance(&input_data)?;

    info!(
        total_current = %result.result.total_current,
        total_contribution = %result.result.total_contribution,
        remaining_shortfall = %result.result.remaining_shortfall,
        "Allocation complete"
    );
    for w in &result.warnings {
        warn!("{}", w);
    }

    Ok(serde_json::to_value(result)?)
}
