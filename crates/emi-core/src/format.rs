//! Indian Rupee display formatting (lakh/crore digit grouping).

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use crate::types::Money;

const RUPEE_PREFIX: &str = "₹ ";

/// Format `value` as rupees with two decimals and Indian grouping:
/// the last three integer digits, then groups of two.
///
/// `5_00_000` → `"₹ 5,00,000.00"`. Negative amounts render as `"₹ 0.00"`.
pub fn format_inr(value: Money) -> String {
    if value < Decimal::ZERO {
        return format!("{RUPEE_PREFIX}0.00");
    }

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (integer_part, decimal_part) = match text.split_once('.') {
        Some((i, d)) => (i, d),
        None => (text.as_str(), "00"),
    };

    format!(
        "{RUPEE_PREFIX}{}.{decimal_part}",
        group_indian(integer_part)
    )
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{last_three}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_small_amounts() {
        assert_eq!(format_inr(dec!(0)), "₹ 0.00");
        assert_eq!(format_inr(dec!(999)), "₹ 999.00");
        assert_eq!(format_inr(dec!(1000)), "₹ 1,000.00");
    }

    #[test]
    fn test_lakh_and_crore_grouping() {
        assert_eq!(format_inr(dec!(500000)), "₹ 5,00,000.00");
        assert_eq!(format_inr(dec!(12345678.9)), "₹ 1,23,45,678.90");
        assert_eq!(format_inr(dec!(123456789)), "₹ 12,34,56,789.00");
    }

    #[test]
    fn test_rounds_to_paise() {
        assert_eq!(format_inr(dec!(10258.265663)), "₹ 10,258.27");
        assert_eq!(format_inr(dec!(0.005)), "₹ 0.01");
    }

    #[test]
    fn test_negative_is_zero() {
        assert_eq!(format_inr(dec!(-1)), "₹ 0.00");
    }
}
