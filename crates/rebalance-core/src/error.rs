use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RebalanceError {
    #[error("Target percentages must sum to 100% (currently {actual:.2}%)")]
    PercentagesNotHundred { actual: Decimal },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RebalanceError {
    fn from(e: serde_json::Error) -> Self {
        RebalanceError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentages_message_shows_two_decimals() {
        let err = RebalanceError::PercentagesNotHundred {
            actual: dec!(99.99),
        };
        assert_eq!(
            err.to_string(),
            "Target percentages must sum to 100% (currently 99.99%)"
        );
    }

    #[test]
    fn test_percentages_message_pads_whole_numbers() {
        let err = RebalanceError::PercentagesNotHundred { actual: dec!(99) };
        assert_eq!(
            err.to_string(),
            "Target percentages must sum to 100% (currently 99.00%)"
        );
    }
}
