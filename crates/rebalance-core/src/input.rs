//! Lenient collection of user-entered text into a [`Portfolio`].
//!
//! Form fields arrive as free text with a comma or dot decimal separator.
//! Nothing here ever fails: text that does not start with a number becomes
//! zero, and names are kept exactly as typed.

use std::str::FromStr;

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::types::{Asset, Money, Portfolio};

/// One asset row as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAssetRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value_text: String,
    #[serde(default)]
    pub percent_text: String,
}

/// The whole form: asset rows plus the capital field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPortfolio {
    #[serde(default)]
    pub assets: Vec<RawAssetRecord>,
    #[serde(default)]
    pub capital_text: String,
}

impl RawAssetRecord {
    /// A blank row with the pre-filled name the form shows for position `index` (1-based).
    pub fn blank(index: usize) -> Self {
        Self {
            name: default_asset_name(index),
            ..Self::default()
        }
    }

    pub fn to_asset(&self) -> Asset {
        Asset {
            name: self.name.clone(),
            current_value: parse_locale_number(&self.value_text),
            target_percent: parse_locale_number(&self.percent_text),
        }
    }
}

impl RawPortfolio {
    /// Build `count` blank rows named "Asset 1" … "Asset {count}".
    pub fn with_count(count: usize) -> Self {
        Self {
            assets: (1..=count).map(RawAssetRecord::blank).collect(),
            capital_text: String::new(),
        }
    }

    pub fn collect(&self) -> Portfolio {
        Portfolio {
            assets: self.assets.iter().map(RawAssetRecord::to_asset).collect(),
            available_capital: parse_locale_number(&self.capital_text),
        }
    }
}

pub fn default_asset_name(index: usize) -> String {
    format!("Asset {index}")
}

/// Parse a user-entered number, treating anything unparseable as zero.
///
/// Leading whitespace is skipped and the first `,` is read as the decimal
/// point. The longest numeric prefix is used, so trailing text is ignored
/// (`"12,5 EUR"` is 12.5). Values that overflow `Decimal` also become zero.
pub fn parse_locale_number(text: &str) -> Money {
    let normalized = text.trim_start().replacen(',', ".", 1);
    match scan_number(&normalized) {
        Some(parts) => parts.to_decimal().unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

#[derive(Debug, PartialEq)]
struct NumberParts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
    exponent: Option<&'a str>,
}

impl NumberParts<'_> {
    fn to_decimal(&self) -> Option<Decimal> {
        let integer = if self.integer.is_empty() { "0" } else { self.integer };
        let literal = if self.fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{integer}.{}", self.fraction)
        };
        let mut value = Decimal::from_str(&literal).ok()?;

        if let Some(exp_text) = self.exponent {
            let exp: i64 = exp_text.parse().ok()?;
            let factor = Decimal::TEN.checked_powi(exp.unsigned_abs() as i64)?;
            value = if exp >= 0 {
                value.checked_mul(factor)?
            } else {
                value.checked_div(factor)?
            };
        }

        Some(if self.negative { -value } else { value })
    }
}

/// Split the longest leading `[+-]?digits[.digits][(e|E)[+-]digits]` run.
fn scan_number(text: &str) -> Option<NumberParts<'_>> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let integer = &text[int_start..pos];

    let mut fraction = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        fraction = &text[frac_start..end];
        pos = end;
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut exponent = None;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let exp_start = pos + 1;
        let mut end = exp_start;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            exponent = Some(&text[exp_start..end]);
        }
    }

    Some(NumberParts {
        negative,
        integer,
        fraction,
        exponent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_and_dot_decimal() {
        assert_eq!(parse_locale_number("100"), dec!(100));
        assert_eq!(parse_locale_number("12.75"), dec!(12.75));
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(parse_locale_number("1500,50"), dec!(1500.50));
        assert_eq!(parse_locale_number("33,34"), dec!(33.34));
    }

    #[test]
    fn test_only_first_comma_is_converted() {
        // "1,234,5" -> "1.234,5" -> numeric prefix "1.234"
        assert_eq!(parse_locale_number("1,234,5"), dec!(1.234));
    }

    #[test]
    fn test_unparseable_becomes_zero() {
        assert_eq!(parse_locale_number(""), Decimal::ZERO);
        assert_eq!(parse_locale_number("   "), Decimal::ZERO);
        assert_eq!(parse_locale_number("abc"), Decimal::ZERO);
        assert_eq!(parse_locale_number("."), Decimal::ZERO);
        assert_eq!(parse_locale_number("-"), Decimal::ZERO);
        assert_eq!(parse_locale_number("R$ 100"), Decimal::ZERO);
    }

    #[test]
    fn test_trailing_text_ignored() {
        assert_eq!(parse_locale_number("12,5abc"), dec!(12.5));
        assert_eq!(parse_locale_number("  40 %"), dec!(40));
    }

    #[test]
    fn test_partial_forms() {
        assert_eq!(parse_locale_number(",5"), dec!(0.5));
        assert_eq!(parse_locale_number("7."), dec!(7));
        assert_eq!(parse_locale_number("-3,5"), dec!(-3.5));
        assert_eq!(parse_locale_number("+8"), dec!(8));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse_locale_number("1e3"), dec!(1000));
        assert_eq!(parse_locale_number("2,5E-1"), dec!(0.25));
        // Incomplete exponent is not part of the number
        assert_eq!(parse_locale_number("4e"), dec!(4));
        assert_eq!(parse_locale_number("4e+"), dec!(4));
    }

    #[test]
    fn test_overflow_becomes_zero() {
        assert_eq!(parse_locale_number("1e400"), Decimal::ZERO);
    }

    #[test]
    fn test_with_count_prefills_names() {
        let raw = RawPortfolio::with_count(3);
        let names: Vec<&str> = raw.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Asset 1", "Asset 2", "Asset 3"]);
        assert!(raw.capital_text.is_empty());
    }

    #[test]
    fn test_collect_preserves_order_and_empty_names() {
        let raw = RawPortfolio {
            assets: vec![
                RawAssetRecord {
                    name: "Bonds".into(),
                    value_text: "1000,00".into(),
                    percent_text: "40".into(),
                },
                RawAssetRecord {
                    name: String::new(),
                    value_text: "oops".into(),
                    percent_text: "60,0".into(),
                },
            ],
            capital_text: "250,5".into(),
        };
        let portfolio = raw.collect();
        assert_eq!(
            portfolio,
            Portfolio {
                assets: vec![
                    Asset::new("Bonds", dec!(1000), dec!(40)),
                    Asset::new("", Decimal::ZERO, dec!(60)),
                ],
                available_capital: dec!(250.5),
            }
        );
    }
}
