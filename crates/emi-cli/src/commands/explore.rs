use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead};

use emi_core::calculator::{EmiCalculator, RenderSurface};
use emi_core::types::{Money, Rate};
use emi_core::viewport::SchedulePage;

use crate::chart::TerminalChart;
use crate::commands::loan::{display_value, params_from_flags, DisplayArgs, LoanArgs};
use crate::input;
use crate::output;
use crate::OutputFormat;

const HELP: &str = "\
commands:
  principal <amount>   set the loan amount
  rate <percent>       set the annual interest rate
  years <n>            set the term in years
  next | prev          move through the schedule one page at a time
  show                 print the current state again
  help                 this message
  quit                 end the session";

/// Arguments for an interactive calculator session
#[derive(Args)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

/// What the session prints after every command.
#[derive(Debug, Serialize)]
struct CalculatorView {
    principal: Money,
    annual_rate_percent: Rate,
    term_years: u32,
    periodic_payment: Money,
    total_interest: Money,
    total_payment: Money,
    #[serde(flatten)]
    page: SchedulePage,
}

/// Drive an [`EmiCalculator`] from stdin, one command per line. Input-edit
/// commands recompute everything and return to the first page.
pub fn run_explore(
    args: ExploreArgs,
    format: &OutputFormat,
) -> Result<Value, Box<dyn std::error::Error>> {
    // stdin carries the session, so parameters come from the file or flags only
    let params = match args.loan.input {
        Some(ref path) => input::file::read_config(path)?,
        None => params_from_flags(&args.loan),
    };

    let mut calc = EmiCalculator::new(params);
    let mut chart: Option<Box<dyn RenderSurface>> = if format.carries_chart() {
        Some(Box::new(TerminalChart::stdout()))
    } else {
        None
    };

    if input::stdin::is_interactive() {
        println!("{HELP}\n");
    }
    show(&mut calc, &mut chart, &args.display, format)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let (command, arg) = match line.trim().split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line.trim(), ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => continue,
            "principal" | "p" => calc.set_principal_text(arg),
            "rate" | "r" => calc.set_annual_rate_text(arg),
            "years" | "y" => calc.set_term_years_text(arg),
            "next" | "n" => calc.next_page(),
            "prev" | "b" => calc.prev_page(),
            "show" | "s" => {}
            "help" | "?" => {
                println!("{HELP}");
                continue;
            }
            "quit" | "q" | "exit" => break,
            other => {
                eprintln!("unknown command '{other}' (type 'help')");
                continue;
            }
        }

        tracing::debug!(command, page = calc.current_page(), "explore command applied");
        show(&mut calc, &mut chart, &args.display, format)?;
    }

    Ok(Value::Null)
}

/// Print the current view, then draw the chart under it. The chart is only
/// attached for the duration of the draw, so setters never render ahead of
/// the view.
fn show(
    calc: &mut EmiCalculator,
    chart: &mut Option<Box<dyn RenderSurface>>,
    display: &DisplayArgs,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = calc.output().rounded(display.dp);
    let params = calc.params();

    let view = CalculatorView {
        principal: params.principal,
        annual_rate_percent: params.annual_rate_percent,
        term_years: params.term_years,
        periodic_payment: out.periodic_payment,
        total_interest: out.total_interest,
        total_payment: out.total_payment,
        page: calc.page_snapshot().rounded(display.dp),
    };

    let value = display_value(serde_json::to_value(&view)?, display);
    output::format_output(format, &value);

    if let Some(surface) = chart.take() {
        calc.attach_surface(surface);
        *chart = calc.detach_surface();
    }
    Ok(())
}
