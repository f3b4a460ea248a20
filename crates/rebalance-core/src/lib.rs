pub mod error;
pub mod input;
pub mod types;

#[cfg(feature = "allocation")]
pub mod allocation;

#[cfg(feature = "charts")]
pub mod chart;

pub use error::RebalanceError;
pub use types::*;

/// Standard result type for all rebalancing operations
pub type RebalanceResult<T> = Result<T, RebalanceError>;
