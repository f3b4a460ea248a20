use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use rebalance_core::allocation::{self, RebalanceInput};
use rebalance_core::chart;
use rebalance_core::input::{self, RawPortfolio};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Blank form rows for `count` assets, with the default names pre-filled.
#[napi]
pub fn blank_form(count: u32) -> NapiResult<String> {
    let form = RawPortfolio::with_count(count as usize);
    serde_json::to_string(&form).map_err(to_napi_error)
}

/// Read one form field the way the calculator does: comma decimals, zero on garbage.
#[napi]
pub fn parse_locale_number(text: String) -> String {
    input::parse_locale_number(&text).to_string()
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AllocateArgs {
    names: Vec<String>,
    current_values: Vec<Decimal>,
    target_percents: Vec<Decimal>,
    available_capital: Decimal,
    #[serde(default)]
    options: allocation::AllocationOptions,
}

/// Bare engine call: parallel arrays in, contributions out.
#[napi]
pub fn allocate(input_json: String) -> NapiResult<String> {
    let args: AllocateArgs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = allocation::allocate_with(
        &args.names,
        &args.current_values,
        &args.target_percents,
        args.available_capital,
        &args.options,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_rebalance(input_json: String) -> NapiResult<String> {
    let input: RebalanceInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = allocation::calculate_rebalance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Full round from raw form text: collect, allocate, and report.
#[napi]
pub fn calculate_from_form(form_json: String) -> NapiResult<String> {
    let form: RawPortfolio = serde_json::from_str(&form_json).map_err(to_napi_error)?;
    let input = RebalanceInput::from(form.collect());
    let output = allocation::calculate_rebalance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ChartArgs {
    names: Vec<String>,
    current_values: Vec<Decimal>,
    contributions: Vec<Decimal>,
}

#[napi]
pub fn chart_data(input_json: String) -> NapiResult<String> {
    let args: ChartArgs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = chart::build_chart_data(&args.names, &args.current_values, &args.contributions)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_colors(count: u32) -> Vec<String> {
    chart::generate_colors(count as usize)
}
