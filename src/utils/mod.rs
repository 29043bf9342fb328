//! Utility functions for formatting and common operations
//!
//! Centralized formatting so currency and percentage values display
//! consistently across all commands.

use rust_decimal::Decimal;

/// Format a currency amount with a dollar sign and thousands separators:
/// "$1,234.56", "$-500.00"
pub fn format_currency(value: Decimal) -> String {
    format!("${}", format_decimal(value))
}

/// Format a number with thousands separators and two decimal places
pub fn format_decimal(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let parts: Vec<&str> = formatted.split('.').collect();

    let integer_part = parts[0];
    let decimal_part = parts.get(1).unwrap_or(&"00");

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}{}.{}", sign, with_separators, decimal_part)
}

/// Format a percentage with two decimal places: "12.34%"
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
        assert_eq!(format_currency(dec!(0.99)), "$0.99");
        assert_eq!(format_currency(dec!(1000000)), "$1,000,000.00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "$-1,234.56");
        assert_eq!(format_currency(dec!(-0.01)), "$-0.01");
    }

    #[test]
    fn test_format_decimal_small_values() {
        assert_eq!(format_decimal(dec!(0)), "0.00");
        assert_eq!(format_decimal(dec!(12)), "12.00");
        assert_eq!(format_decimal(dec!(999.99)), "999.99");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(12.34)), "12.34%");
        assert_eq!(format_percent(dec!(-5)), "-5.00%");
    }
}
