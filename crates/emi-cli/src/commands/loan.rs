use clap::Args;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Instant;

use emi_core::amortization::{self, LoanParameters};
use emi_core::breakdown::PaymentBreakdown;
use emi_core::format::format_inr;
use emi_core::input::{parse_amount, parse_years};
use emi_core::types::{with_metadata, Money, Rate};
use emi_core::viewport::{ScheduleViewport, PAGE_SIZE};

use crate::input;

/// Result fields rendered as rupees under `--inr`.
const MONEY_FIELDS: [&str; 7] = [
    "principal",
    "periodic_payment",
    "total_interest",
    "total_payment",
    "principal_portion",
    "interest_portion",
    "remaining_balance",
];

const SHARE_DP: u32 = 4;

/// Loan inputs shared by every loan command. Values are taken as typed
/// text; anything non-numeric counts as zero.
#[derive(Args, Clone)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Loan amount (e.g. 500000)
    #[arg(long)]
    pub principal: Option<String>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long, alias = "annual-rate")]
    pub rate: Option<String>,

    /// Loan term in whole years
    #[arg(long)]
    pub years: Option<String>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Presentation of monetary amounts
#[derive(Args, Clone)]
pub struct DisplayArgs {
    /// Decimal places for monetary amounts
    #[arg(long, default_value = "2")]
    pub dp: u32,

    /// Show monetary amounts as Indian Rupees (₹ 5,00,000.00)
    #[arg(long)]
    pub inr: bool,
}

/// Arguments for the loan summary
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page
    #[arg(long, default_value_t = PAGE_SIZE)]
    pub page_size: usize,

    /// Print every period instead of a single page
    #[arg(long, conflicts_with_all = ["page", "page_size"])]
    pub all: bool,
}

/// Arguments for the principal/interest breakdown
#[derive(Args)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Serialize)]
struct LoanSummary {
    principal: Money,
    annual_rate_percent: Rate,
    term_years: u32,
    periodic_rate: Rate,
    period_count: u32,
    periodic_payment: Money,
    total_interest: Money,
    total_payment: Money,
    principal_share: Rate,
    interest_share: Rate,
}

/// Loan parameters from `--input`, then piped stdin, then individual flags.
pub fn resolve_params(args: &LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_config(path);
    }
    if let Some(params) = input::stdin::read_stdin::<LoanParameters>()? {
        return Ok(params);
    }
    Ok(params_from_flags(args))
}

/// Loan parameters from individual flags, defaulting missing ones.
pub fn params_from_flags(args: &LoanArgs) -> LoanParameters {
    let defaults = LoanParameters::default();
    LoanParameters {
        principal: args
            .principal
            .as_deref()
            .map(parse_amount)
            .unwrap_or(defaults.principal),
        annual_rate_percent: args
            .rate
            .as_deref()
            .map(parse_amount)
            .unwrap_or(defaults.annual_rate_percent),
        term_years: args
            .years
            .as_deref()
            .map(parse_years)
            .unwrap_or(defaults.term_years),
    }
}

/// Loan summary. Returns the resolved parameters alongside the output so
/// the caller can draw the breakdown chart afterwards.
pub fn run_calculate(
    args: CalculateArgs,
) -> Result<(Value, LoanParameters), Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let envelope = amortization::calculate_emi(&params);

    let out = envelope.result.rounded(args.display.dp);
    let breakdown = PaymentBreakdown::from_output(params.principal, &envelope.result);

    let summary = LoanSummary {
        principal: params.principal,
        annual_rate_percent: params.annual_rate_percent,
        term_years: params.term_years,
        periodic_rate: out.periodic_rate,
        period_count: out.period_count,
        periodic_payment: out.periodic_payment,
        total_interest: out.total_interest,
        total_payment: out.total_payment,
        principal_share: round_share(breakdown.principal_share),
        interest_share: round_share(breakdown.interest_share),
    };

    let result = with_metadata(
        &envelope.methodology,
        &params,
        envelope.warnings,
        envelope.metadata.computation_time_us,
        summary,
    );

    let value = display_value(serde_json::to_value(result)?, &args.display);
    Ok((value, params))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let start = Instant::now();

    let output = amortization::amortize(&params);
    let len = output.schedule.len();

    let (viewport, page) = if args.all {
        (ScheduleViewport::with_page_size(len, len.max(1))?, 1)
    } else {
        (ScheduleViewport::with_page_size(len, args.page_size)?, args.page)
    };

    let mut warnings = params.degenerate_reasons();
    if len > 0 && (page == 0 || page > viewport.total_pages()) {
        warnings.push(format!(
            "page {} is outside 1..={}; no rows shown",
            page,
            viewport.total_pages()
        ));
    }

    let snapshot = viewport
        .snapshot(&output.schedule, page)
        .rounded(args.display.dp);

    let result = with_metadata(
        "Amortization schedule (paged view)",
        &params,
        warnings,
        start.elapsed().as_micros() as u64,
        snapshot,
    );

    Ok(display_value(serde_json::to_value(result)?, &args.display))
}

pub fn run_breakdown(args: BreakdownArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve_params(&args.loan)?;
    let start = Instant::now();

    let output = amortization::amortize(&params);
    let breakdown = PaymentBreakdown::from_output(params.principal, &output);
    let rounded = PaymentBreakdown {
        principal: breakdown.principal,
        total_interest: round_money(breakdown.total_interest, args.display.dp),
        principal_share: round_share(breakdown.principal_share),
        interest_share: round_share(breakdown.interest_share),
    };

    let result = with_metadata(
        "Principal vs interest share of total payment",
        &params,
        params.degenerate_reasons(),
        start.elapsed().as_micros() as u64,
        rounded,
    );

    Ok(display_value(serde_json::to_value(result)?, &args.display))
}

/// Apply `--inr` to an already serialized value.
pub fn display_value(mut value: Value, display: &DisplayArgs) -> Value {
    if display.inr {
        apply_inr(&mut value);
    }
    value
}

fn apply_inr(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if MONEY_FIELDS.contains(&key.as_str()) {
                    if let Value::String(s) = val {
                        if let Ok(amount) = Decimal::from_str(s) {
                            *val = Value::String(format_inr(amount));
                        }
                    }
                } else {
                    apply_inr(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(apply_inr),
        _ => {}
    }
}

fn round_share(share: Rate) -> Rate {
    share.round_dp_with_strategy(SHARE_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn round_money(value: Money, dp: u32) -> Money {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
