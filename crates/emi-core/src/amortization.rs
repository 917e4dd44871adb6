//! Fixed-rate loan amortization (reducing balance, level monthly payment).
//!
//! Derives the equated monthly installment (EMI) for a principal, an annual
//! rate quoted in percent and a term in whole years, then walks the balance
//! down period by period. The final period absorbs any rounding residue so
//! the closing balance is exactly zero. All math uses `rust_decimal::Decimal`.
//!
//! Degenerate inputs never raise: they produce a zero payment and an empty
//! schedule, and [`calculate_emi`] reports the failed guards as warnings.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::types::{with_metadata, ComputationOutput, Money, Rate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: u32 = 12;
const PERCENT_DIVISOR: Decimal = dec!(100);

/// Initial principal shown by the calculator widget.
pub const DEFAULT_PRINCIPAL: Money = dec!(500000);
/// Initial annual rate (percent) shown by the calculator widget.
pub const DEFAULT_ANNUAL_RATE_PERCENT: Rate = dec!(8.5);
/// Initial term (years) shown by the calculator widget.
pub const DEFAULT_TERM_YEARS: u32 = 5;

/// Longest term the engine will amortize. Longer terms count as
/// unrepresentable and produce the zero result.
pub const MAX_TERM_YEARS: u32 = 100;
/// `MAX_TERM_YEARS` in monthly periods.
pub const MAX_PERIOD_COUNT: u32 = MAX_TERM_YEARS * MONTHS_PER_YEAR;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Loan inputs as entered by the user. Missing fields deserialize to the
/// widget defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanParameters {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual interest rate in percent (8.5 = 8.5% p.a.).
    pub annual_rate_percent: Rate,
    /// Loan term in whole years.
    pub term_years: u32,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            principal: DEFAULT_PRINCIPAL,
            annual_rate_percent: DEFAULT_ANNUAL_RATE_PERCENT,
            term_years: DEFAULT_TERM_YEARS,
        }
    }
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate_percent: Rate, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    pub fn periodic_rate(&self) -> Rate {
        periodic_rate(self.annual_rate_percent)
    }

    pub fn period_count(&self) -> u32 {
        period_count(self.term_years)
    }

    /// Human-readable reasons these inputs cannot produce a positive payment.
    /// Empty when every guard holds.
    pub fn degenerate_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.principal <= Decimal::ZERO {
            reasons.push(format!(
                "principal must be greater than zero (got {})",
                self.principal
            ));
        }
        if self.periodic_rate() <= Decimal::ZERO {
            reasons.push(format!(
                "annual rate must be greater than zero (got {}%); zero-interest loans are not modelled",
                self.annual_rate_percent
            ));
        }
        if self.period_count() == 0 {
            reasons.push("term must be at least one year".to_string());
        } else if self.period_count() > MAX_PERIOD_COUNT {
            reasons.push(format!(
                "term must not exceed {} years (got {})",
                MAX_TERM_YEARS, self.term_years
            ));
        }
        reasons
    }
}

/// One period of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based period (month) number.
    pub period: u32,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Outstanding balance after this period's payment.
    pub remaining_balance: Money,
}

impl ScheduleEntry {
    /// Copy with the three amounts rounded to `dp` places, midpoint away
    /// from zero.
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            period: self.period,
            principal_portion: round_money(self.principal_portion, dp),
            interest_portion: round_money(self.interest_portion, dp),
            remaining_balance: round_money(self.remaining_balance, dp),
        }
    }
}

/// Result of a full amortization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Monthly rate as a decimal (annual percent / 12 / 100).
    pub periodic_rate: Rate,
    /// Number of monthly payments.
    pub period_count: u32,
    /// Equated monthly installment. Zero for degenerate inputs.
    pub periodic_payment: Money,
    pub total_interest: Money,
    /// periodic_payment * period_count.
    pub total_payment: Money,
    pub schedule: Vec<ScheduleEntry>,
}

impl AmortizationOutput {
    fn degenerate(periodic_rate: Rate, period_count: u32) -> Self {
        Self {
            periodic_rate,
            period_count,
            periodic_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }

    /// True when the inputs produced no payment and no schedule.
    pub fn is_degenerate(&self) -> bool {
        self.periodic_payment.is_zero()
    }

    /// Copy with every monetary amount rounded to `dp` places, midpoint away
    /// from zero. Display only; the rounded schedule no longer sums exactly.
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            periodic_rate: self.periodic_rate,
            period_count: self.period_count,
            periodic_payment: round_money(self.periodic_payment, dp),
            total_interest: round_money(self.total_interest, dp),
            total_payment: round_money(self.total_payment, dp),
            schedule: self.schedule.iter().map(|e| e.rounded(dp)).collect(),
        }
    }
}

fn round_money(value: Money, dp: u32) -> Money {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly rate from an annual percentage. Zero for non-positive rates.
pub fn periodic_rate(annual_rate_percent: Rate) -> Rate {
    if annual_rate_percent <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    annual_rate_percent / Decimal::from(MONTHS_PER_YEAR) / PERCENT_DIVISOR
}

/// Number of monthly payments in a term of `term_years`.
pub fn period_count(term_years: u32) -> u32 {
    term_years.saturating_mul(MONTHS_PER_YEAR)
}

/// Level payment `P * r * (1 + r)^n / ((1 + r)^n - 1)`.
///
/// Returns zero when any guard fails, when `periods` exceeds
/// [`MAX_PERIOD_COUNT`], or when the arithmetic leaves the representable
/// range (overflow, division by zero).
pub fn periodic_payment(principal: Money, rate: Rate, periods: u32) -> Money {
    if principal <= Decimal::ZERO
        || rate <= Decimal::ZERO
        || periods == 0
        || periods > MAX_PERIOD_COUNT
    {
        return Decimal::ZERO;
    }

    let growth = match (Decimal::ONE + rate).checked_powu(u64::from(periods)) {
        Some(g) => g,
        None => return Decimal::ZERO,
    };

    let payment = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE));

    match payment {
        Some(p) if p > Decimal::ZERO => p,
        _ => Decimal::ZERO,
    }
}

/// Month-by-month schedule for a level `payment` produced by
/// [`periodic_payment`] for the same inputs.
///
/// The final period's principal portion is forced to the outstanding
/// balance, which closes the schedule at exactly zero.
fn build_schedule(
    principal: Money,
    payment: Money,
    rate: Rate,
    periods: u32,
) -> Vec<ScheduleEntry> {
    if principal <= Decimal::ZERO
        || payment <= Decimal::ZERO
        || periods == 0
        || periods > MAX_PERIOD_COUNT
    {
        return Vec::new();
    }

    let mut schedule = Vec::with_capacity(periods as usize);
    let mut balance = principal;

    for period in 1..=periods {
        let is_final = period == periods;

        let interest_portion = balance * rate;
        let principal_portion = if is_final {
            balance
        } else {
            payment - interest_portion
        };

        balance -= principal_portion;
        if is_final || balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        schedule.push(ScheduleEntry {
            period,
            principal_portion: principal_portion.max(Decimal::ZERO),
            interest_portion: interest_portion.max(Decimal::ZERO),
            remaining_balance: balance,
        });
    }

    schedule
}

/// Full amortization for the given inputs. Never fails.
pub fn compute(principal: Money, annual_rate_percent: Rate, term_years: u32) -> AmortizationOutput {
    let rate = periodic_rate(annual_rate_percent);
    let periods = period_count(term_years);

    let payment = periodic_payment(principal, rate, periods);
    if payment.is_zero() {
        debug!(
            %principal,
            %annual_rate_percent,
            term_years,
            "degenerate loan parameters; returning empty schedule"
        );
        return AmortizationOutput::degenerate(rate, periods);
    }

    let total_payment = match payment.checked_mul(Decimal::from(periods)) {
        Some(t) => t,
        None => {
            debug!(%payment, periods, "total payment overflows; returning empty schedule");
            return AmortizationOutput::degenerate(rate, periods);
        }
    };
    let total_interest = if total_payment > Decimal::ZERO {
        total_payment - principal
    } else {
        Decimal::ZERO
    };

    let schedule = build_schedule(principal, payment, rate, periods);

    debug!(
        %principal,
        %annual_rate_percent,
        term_years,
        %payment,
        periods = schedule.len(),
        "amortization computed"
    );

    AmortizationOutput {
        periodic_rate: rate,
        period_count: periods,
        periodic_payment: payment,
        total_interest,
        total_payment,
        schedule,
    }
}

/// [`compute`] for a parameter set.
pub fn amortize(params: &LoanParameters) -> AmortizationOutput {
    compute(params.principal, params.annual_rate_percent, params.term_years)
}

/// Amortize and wrap the result in the standard computation envelope.
/// Failed guards are reported in `warnings`; the result is still returned.
pub fn calculate_emi(params: &LoanParameters) -> ComputationOutput<AmortizationOutput> {
    let start = Instant::now();

    let output = amortize(params);

    let mut warnings = params.degenerate_reasons();
    if output.is_degenerate() && warnings.is_empty() {
        warnings.push("periodic payment is not representable for these inputs".to_string());
    }

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Fixed-rate amortization (reducing balance, level monthly payment)",
        params,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periodic_rate_from_percent() {
        assert_eq!(periodic_rate(dec!(12)), dec!(0.01));
        assert_eq!(periodic_rate(dec!(0)), Decimal::ZERO);
        assert_eq!(periodic_rate(dec!(-3)), Decimal::ZERO);
    }

    #[test]
    fn test_period_count() {
        assert_eq!(period_count(5), 60);
        assert_eq!(period_count(0), 0);
        assert_eq!(period_count(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_payment_reference_value() {
        // 500,000 at 8.5% over 5 years ≈ 10,258.27 per month
        let payment = periodic_payment(dec!(500000), periodic_rate(dec!(8.5)), 60);
        assert!((payment - dec!(10258.27)).abs() < dec!(0.01), "got {payment}");
    }

    #[test]
    fn test_payment_guards() {
        let r = periodic_rate(dec!(10));
        assert_eq!(periodic_payment(dec!(0), r, 12), Decimal::ZERO);
        assert_eq!(periodic_payment(dec!(-1000), r, 12), Decimal::ZERO);
        assert_eq!(periodic_payment(dec!(1000), Decimal::ZERO, 12), Decimal::ZERO);
        assert_eq!(periodic_payment(dec!(1000), r, 0), Decimal::ZERO);
    }

    #[test]
    fn test_payment_overflow_is_zero() {
        // (1 + 10)^360 does not fit in 96 bits
        assert_eq!(periodic_payment(dec!(1000), dec!(10), 360), Decimal::ZERO);
        assert_eq!(periodic_payment(Decimal::MAX, dec!(0.5), 12), Decimal::ZERO);
    }

    #[test]
    fn test_first_period_interest_on_full_principal() {
        let out = compute(dec!(1200), dec!(12), 1);
        assert_eq!(out.schedule.len(), 12);
        let first = &out.schedule[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.interest_portion, dec!(12));
    }

    #[test]
    fn test_final_period_closes_exactly() {
        let out = compute(dec!(750000), dec!(9.25), 30);
        assert_eq!(out.schedule.len(), 360);
        let last = out.schedule.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert_eq!(last.period, 360);
    }

    #[test]
    fn test_degenerate_output_is_empty() {
        let out = compute(dec!(500000), dec!(0), 5);
        assert!(out.is_degenerate());
        assert!(out.schedule.is_empty());
        assert_eq!(out.total_payment, Decimal::ZERO);
        assert_eq!(out.total_interest, Decimal::ZERO);
        assert_eq!(out.period_count, 60);
    }

    #[test]
    fn test_degenerate_reasons() {
        let params = LoanParameters::new(dec!(0), dec!(-1), 0);
        let reasons = params.degenerate_reasons();
        assert_eq!(reasons.len(), 3);
        assert!(LoanParameters::default().degenerate_reasons().is_empty());
    }

    #[test]
    fn test_calculate_emi_envelope_warnings() {
        let out = calculate_emi(&LoanParameters::new(dec!(500000), dec!(0), 5));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("annual rate"));
        assert!(out.result.schedule.is_empty());

        let ok = calculate_emi(&LoanParameters::default());
        assert!(ok.warnings.is_empty());
        assert_eq!(ok.metadata.precision, "rust_decimal_128bit");
        assert_eq!(ok.assumptions["term_years"], 5);
    }

    #[test]
    fn test_rounded_output() {
        let out = compute(dec!(500000), dec!(8.5), 5).rounded(2);
        assert_eq!(out.periodic_payment, dec!(10258.27));
        assert_eq!(out.periodic_payment.scale(), 2);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_defaults_deserialize() {
        let params: LoanParameters = serde_json::from_str(r#"{"term_years": 10}"#).unwrap();
        assert_eq!(params.principal, DEFAULT_PRINCIPAL);
        assert_eq!(params.annual_rate_percent, DEFAULT_ANNUAL_RATE_PERCENT);
        assert_eq!(params.term_years, 10);
    }

    #[test]
    fn test_term_beyond_maximum_is_unrepresentable() {
        // a tiny rate keeps (1 + r)^n in range, so only the term limit stops it
        let out = compute(dec!(100000), dec!(0.000001), 100_000_000);
        assert!(out.is_degenerate());
        assert!(out.schedule.is_empty());
        assert_eq!(periodic_payment(dec!(100000), dec!(0.01), MAX_PERIOD_COUNT + 1), Decimal::ZERO);

        let envelope = calculate_emi(&LoanParameters::new(dec!(100000), dec!(0.000001), 100_000_000));
        assert_eq!(envelope.warnings.len(), 1);
        assert!(envelope.warnings[0].contains("must not exceed 100 years"));
    }

    #[test]
    fn test_maximum_term_still_amortizes() {
        let out = compute(dec!(100000), dec!(8.5), MAX_TERM_YEARS);
        assert_eq!(out.schedule.len() as u32, MAX_PERIOD_COUNT);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }
}
