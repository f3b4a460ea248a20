use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RebalanceError;
use crate::types::*;
use crate::RebalanceResult;

const HUNDRED: Decimal = dec!(100);

/// What to do with new capital when no asset is below its target value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroGapPolicy {
    /// Allocate nothing; every contribution is zero and the capital is left out.
    #[default]
    DropCapital,
    /// Split the capital by target percentage.
    TargetWeights,
}

/// Knobs for the allocation engine. The defaults give exact-sum validation
/// and drop capital when there is no gap to fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationOptions {
    /// Allowed absolute deviation of the percentage sum from 100.
    pub sum_tolerance: Decimal,
    pub zero_gap_policy: ZeroGapPolicy,
}

/// Distribute `available_capital` across assets in proportion to how far each
/// one is below its target value once the new capital is counted.
///
/// The three sequences are parallel and ordered by asset. Target percentages
/// must sum to exactly 100.
///
/// ```text
/// total_final  = Σ current + capital
/// gap_i        = max(0, total_final * pct_i / 100 - current_i)
/// contribution = gap_i / Σ gap * capital
/// ```
pub fn allocate(
    names: &[String],
    current_values: &[Money],
    target_percents: &[Percent],
    available_capital: Money,
) -> RebalanceResult<Vec<Money>> {
    allocate_with(
        names,
        current_values,
        target_percents,
        available_capital,
        &AllocationOptions::default(),
    )
}

/// [`allocate`] with explicit validation tolerance and zero-gap policy.
pub fn allocate_with(
    names: &[String],
    current_values: &[Money],
    target_percents: &[Percent],
    available_capital: Money,
    options: &AllocationOptions,
) -> RebalanceResult<Vec<Money>> {
    if current_values.len() != names.len() {
        return Err(length_mismatch("current_values", current_values.len(), names.len()));
    }
    if target_percents.len() != names.len() {
        return Err(length_mismatch("target_percents", target_percents.len(), names.len()));
    }

    validate_percent_sum(target_percents, options.sum_tolerance)?;

    let shortfalls = gaps(current_values, target_percents, available_capital)?;
    let total_gap = checked_sum(&shortfalls, "current_values")?;

    if total_gap.is_zero() {
        return match options.zero_gap_policy {
            ZeroGapPolicy::DropCapital => Ok(vec![Decimal::ZERO; names.len()]),
            ZeroGapPolicy::TargetWeights => target_percents
                .iter()
                .map(|pct| {
                    available_capital
                        .checked_mul(*pct / HUNDRED)
                        .ok_or_else(|| overflow("available_capital"))
                })
                .collect(),
        };
    }

    shortfalls
        .iter()
        .map(|gap| {
            (*gap / total_gap)
                .checked_mul(available_capital)
                .ok_or_else(|| overflow("available_capital"))
        })
        .collect()
}

/// Run the engine over a collected [`Portfolio`].
pub fn allocate_portfolio(
    portfolio: &Portfolio,
    options: &AllocationOptions,
) -> RebalanceResult<Vec<Money>> {
    allocate_with(
        &portfolio.names(),
        &portfolio.current_values(),
        &portfolio.target_percents(),
        portfolio.available_capital,
        options,
    )
}

/// Value each asset should hold once `available_capital` is added.
pub fn target_values(
    current_values: &[Money],
    target_percents: &[Percent],
    available_capital: Money,
) -> RebalanceResult<Vec<Money>> {
    let total_final = checked_sum(current_values, "current_values")?
        .checked_add(available_capital)
        .ok_or_else(|| overflow("available_capital"))?;
    target_percents
        .iter()
        .map(|pct| {
            total_final
                .checked_mul(*pct / HUNDRED)
                .ok_or_else(|| overflow("target_percents"))
        })
        .collect()
}

/// Shortfall of each asset against its target value, floored at zero.
pub fn gaps(
    current_values: &[Money],
    target_percents: &[Percent],
    available_capital: Money,
) -> RebalanceResult<Vec<Money>> {
    target_values(current_values, target_percents, available_capital)?
        .iter()
        .zip(current_values)
        .map(|(target, current)| {
            target
                .checked_sub(*current)
                .map(|gap| gap.max(Decimal::ZERO))
                .ok_or_else(|| overflow("current_values"))
        })
        .collect()
}

/// Sum that reports `Decimal` overflow as invalid input on `field`.
pub(crate) fn checked_sum(values: &[Decimal], field: &str) -> RebalanceResult<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| overflow(field))
}

pub(crate) fn overflow(field: &str) -> RebalanceError {
    RebalanceError::InvalidInput {
        field: field.into(),
        reason: "sum overflows the supported decimal range".into(),
    }
}

fn validate_percent_sum(target_percents: &[Percent], tolerance: Decimal) -> RebalanceResult<()> {
    let actual = checked_sum(target_percents, "target_percents")?;
    let within = actual
        .checked_sub(HUNDRED)
        .is_some_and(|deviation| deviation.abs() <= tolerance.abs());
    if !within {
        return Err(RebalanceError::PercentagesNotHundred { actual });
    }
    Ok(())
}

fn length_mismatch(field: &str, got: usize, expected: usize) -> RebalanceError {
    RebalanceError::InvalidInput {
        field: field.into(),
        reason: format!("Expected {expected} entries (one per asset name), got {got}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Asset {i}")).collect()
    }

    #[test]
    fn test_even_split_when_equally_short() {
        let result = allocate(
            &names(2),
            &[dec!(100), dec!(100)],
            &[dec!(50), dec!(50)],
            dec!(100),
        )
        .unwrap();
        assert_eq!(result, vec![dec!(50), dec!(50)]);
    }

    #[test]
    fn test_overweight_asset_gets_nothing() {
        let result = allocate(
            &names(2),
            &[dec!(200), dec!(0)],
            &[dec!(50), dec!(50)],
            dec!(100),
        )
        .unwrap();
        assert_eq!(result, vec![dec!(0), dec!(100)]);
    }

    #[test]
    fn test_sum_of_99_rejected_with_actual() {
        let err = allocate(
            &names(2),
            &[dec!(10), dec!(10)],
            &[dec!(49), dec!(50)],
            dec!(100),
        )
        .unwrap_err();
        match err {
            RebalanceError::PercentagesNotHundred { actual } => assert_eq!(actual, dec!(99)),
            other => panic!("Expected PercentagesNotHundred, got {other:?}"),
        }
    }

    #[test]
    fn test_thirds_pass_exactly() {
        let result = allocate(
            &names(3),
            &[dec!(0), dec!(0), dec!(0)],
            &[dec!(33.33), dec!(33.33), dec!(33.34)],
            dec!(100),
        )
        .unwrap();
        assert_eq!(result, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    }

    #[test]
    fn test_repeated_thirds_fail() {
        let err = allocate(
            &names(3),
            &[dec!(0), dec!(0), dec!(0)],
            &[dec!(33.33), dec!(33.33), dec!(33.33)],
            dec!(100),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::PercentagesNotHundred { actual } if actual == dec!(99.99)
        ));
    }

    #[test]
    fn test_tolerance_accepts_small_deviation() {
        let options = AllocationOptions {
            sum_tolerance: dec!(0.01),
            ..Default::default()
        };
        let result = allocate_with(
            &names(3),
            &[dec!(0), dec!(0), dec!(0)],
            &[dec!(33.33), dec!(33.33), dec!(33.33)],
            dec!(99.99),
            &options,
        )
        .unwrap();
        // Equal gaps split the capital in thirds: 99.99 / 3 = 33.33
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| *c == result[0]));
        for c in &result {
            assert!(
                (*c - dec!(33.33)).abs() < dec!(0.000000001),
                "Expected 33.33, got {}",
                c
            );
        }
    }

    #[test]
    fn test_no_gap_drops_capital_by_default() {
        // Capital of zero with a portfolio exactly on target leaves no gap
        let result = allocate(
            &names(2),
            &[dec!(300), dec!(100)],
            &[dec!(75), dec!(25)],
            dec!(0),
        )
        .unwrap();
        assert_eq!(result, vec![Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_no_gap_target_weights_policy() {
        // With a tolerated sum below 100, both assets can sit above target
        // even though new capital arrives.
        let options = AllocationOptions {
            sum_tolerance: dec!(1),
            zero_gap_policy: ZeroGapPolicy::TargetWeights,
        };
        let result = allocate_with(
            &names(2),
            &[dec!(100), dec!(100)],
            &[dec!(49.5), dec!(49.5)],
            dec!(1),
            &options,
        )
        .unwrap();
        assert_eq!(result, vec![dec!(0.495), dec!(0.495)]);
    }

    #[test]
    fn test_no_gap_drop_policy_with_capital() {
        let options = AllocationOptions {
            sum_tolerance: dec!(1),
            ..Default::default()
        };
        let result = allocate_with(
            &names(2),
            &[dec!(100), dec!(100)],
            &[dec!(49.5), dec!(49.5)],
            dec!(1),
            &options,
        )
        .unwrap();
        assert_eq!(result, vec![Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_length_mismatch_is_invalid_input() {
        let err = allocate(
            &names(2),
            &[dec!(1)],
            &[dec!(50), dec!(50)],
            dec!(10),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::InvalidInput { ref field, .. } if field == "current_values"
        ));
    }

    #[test]
    fn test_gaps_floor_at_zero() {
        let g = gaps(
            &[dec!(500), dec!(0)],
            &[dec!(50), dec!(50)],
            dec!(100),
        )
        .unwrap();
        assert_eq!(g, vec![Decimal::ZERO, dec!(300)]);
    }

    #[test]
    fn test_current_value_overflow_is_invalid_input() {
        let huge = crate::input::parse_locale_number("5e28");
        let err = allocate(&names(2), &[huge, huge], &[dec!(50), dec!(50)], dec!(100))
            .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::InvalidInput { ref field, .. } if field == "current_values"
        ));
    }

    #[test]
    fn test_capital_overflow_is_invalid_input() {
        let err = allocate(&names(1), &[Decimal::MAX], &[dec!(100)], Decimal::MAX).unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidInput { .. }));
    }

    #[test]
    fn test_percent_overflow_is_invalid_input() {
        let err = allocate(
            &names(2),
            &[dec!(1), dec!(1)],
            &[Decimal::MAX, Decimal::MAX],
            dec!(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::InvalidInput { ref field, .. } if field == "target_percents"
        ));
    }

    #[test]
    fn test_large_percent_sum_is_rejected_not_panicking() {
        // Sum fits, but the deviation from 100 does not
        let err = allocate(
            &names(2),
            &[dec!(1), dec!(1)],
            &[Decimal::MIN, dec!(0)],
            dec!(1),
        )
        .unwrap_err();
        assert!(matches!(err, RebalanceError::PercentagesNotHundred { .. }));
    }
}
