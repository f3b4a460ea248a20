pub mod engine;
pub mod report;

pub use engine::{allocate, allocate_portfolio, allocate_with, AllocationOptions, ZeroGapPolicy};
pub use report::{calculate_rebalance, AllocationLine, RebalanceInput, RebalanceOutput};
