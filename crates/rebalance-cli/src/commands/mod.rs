pub mod allocate;
pub mod chart;
pub mod parse;
pub mod portfolio;
