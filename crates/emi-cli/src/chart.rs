use colored::Colorize;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use emi_core::breakdown::PaymentBreakdown;
use emi_core::calculator::RenderSurface;
use emi_core::format::format_inr;

const BAR_WIDTH: usize = 40;

/// Principal vs interest bar drawn on the terminal.
///
/// Only available when stdout is a TTY, so piped output and redirected files
/// never receive escape codes.
pub struct TerminalChart {
    tty: bool,
}

impl TerminalChart {
    pub fn stdout() -> Self {
        Self {
            tty: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RenderSurface for TerminalChart {
    fn is_available(&self) -> bool {
        self.tty
    }

    fn draw_breakdown(&mut self, breakdown: &PaymentBreakdown) {
        let principal_cells = (breakdown.principal_share * Decimal::from(BAR_WIDTH as u64))
            .round()
            .to_usize()
            .unwrap_or(0)
            .min(BAR_WIDTH);
        let interest_cells = BAR_WIDTH - principal_cells;

        println!();
        println!(
            "  {}{}  {}% Principal",
            "█".repeat(principal_cells).as_str().truecolor(0, 123, 255),
            "█".repeat(interest_cells).as_str().truecolor(255, 153, 51),
            breakdown.principal_percent()
        );
        println!(
            "  {} {}   {} {}",
            "■".truecolor(0, 123, 255),
            format_inr(breakdown.principal),
            "■".truecolor(255, 153, 51),
            format_inr(breakdown.total_interest)
        );
    }
}
