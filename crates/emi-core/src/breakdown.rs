//! Principal vs interest split of the total amount payable, as drawn by the
//! calculator's donut chart.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationOutput;
use crate::types::{Money, Rate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal: Money,
    pub total_interest: Money,
    /// principal / (principal + interest)
    pub principal_share: Rate,
    /// 1 - principal_share
    pub interest_share: Rate,
}

impl PaymentBreakdown {
    /// Shares are both zero when there is nothing to split.
    pub fn new(principal: Money, total_interest: Money) -> Self {
        let total = principal + total_interest;
        let (principal_share, interest_share) = if total.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            let p = principal / total;
            (p, Decimal::ONE - p)
        };
        Self {
            principal,
            total_interest,
            principal_share,
            interest_share,
        }
    }

    pub fn from_output(principal: Money, output: &AmortizationOutput) -> Self {
        Self::new(principal, output.total_interest)
    }

    /// Principal share as a whole percentage, e.g. `81` for 0.8137.
    pub fn principal_percent(&self) -> Decimal {
        (self.principal_share * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_shares_sum_to_one() {
        let b = PaymentBreakdown::new(dec!(500000), dec!(115495.94));
        assert_eq!(b.principal_share + b.interest_share, Decimal::ONE);
        assert_eq!(b.principal_percent(), dec!(81));
    }

    #[test]
    fn test_zero_total() {
        let b = PaymentBreakdown::new(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(b.principal_share, Decimal::ZERO);
        assert_eq!(b.interest_share, Decimal::ZERO);
        assert_eq!(b.principal_percent(), Decimal::ZERO);
    }

    #[test]
    fn test_interest_free_split() {
        let b = PaymentBreakdown::new(dec!(1000), Decimal::ZERO);
        assert_eq!(b.principal_share, Decimal::ONE);
        assert_eq!(b.interest_share, Decimal::ZERO);
    }
}
