//! Stateful calculator: the current inputs plus everything derived from them.
//!
//! Every setter is an input-mutation entry point. It replaces the input,
//! recomputes the whole amortization synchronously, puts the schedule view
//! back on page 1, and then redraws the breakdown chart if a drawing surface
//! is attached and available. Because mutation needs `&mut self`, readers
//! never see inputs and derived values out of step.

use tracing::{debug, trace};

use crate::amortization::{amortize, AmortizationOutput, LoanParameters, ScheduleEntry};
use crate::breakdown::PaymentBreakdown;
use crate::input::{parse_amount, parse_years};
use crate::types::{Money, Rate};
use crate::viewport::{SchedulePage, ScheduleViewport};

/// Somewhere the principal/interest breakdown can be drawn.
pub trait RenderSurface {
    /// False when there is nothing to draw on (headless or server execution).
    fn is_available(&self) -> bool;

    fn draw_breakdown(&mut self, breakdown: &PaymentBreakdown);
}

pub struct EmiCalculator {
    params: LoanParameters,
    output: AmortizationOutput,
    viewport: ScheduleViewport,
    surface: Option<Box<dyn RenderSurface>>,
}

impl Default for EmiCalculator {
    fn default() -> Self {
        Self::new(LoanParameters::default())
    }
}

impl EmiCalculator {
    pub fn new(params: LoanParameters) -> Self {
        let output = amortize(&params);
        let viewport = ScheduleViewport::new(output.schedule.len());
        Self {
            params,
            output,
            viewport,
            surface: None,
        }
    }

    /// Attach a drawing surface and render the current state onto it.
    pub fn attach_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.surface = Some(surface);
        self.render();
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn RenderSurface>> {
        self.surface.take()
    }

    // -- inputs -------------------------------------------------------------

    pub fn params(&self) -> &LoanParameters {
        &self.params
    }

    pub fn set_parameters(&mut self, params: LoanParameters) {
        self.params = params;
        self.recompute();
    }

    pub fn set_principal(&mut self, principal: Money) {
        self.params.principal = principal;
        self.recompute();
    }

    pub fn set_annual_rate(&mut self, annual_rate_percent: Rate) {
        self.params.annual_rate_percent = annual_rate_percent;
        self.recompute();
    }

    pub fn set_term_years(&mut self, term_years: u32) {
        self.params.term_years = term_years;
        self.recompute();
    }

    pub fn set_principal_text(&mut self, text: &str) {
        self.set_principal(parse_amount(text));
    }

    pub fn set_annual_rate_text(&mut self, text: &str) {
        self.set_annual_rate(parse_amount(text));
    }

    pub fn set_term_years_text(&mut self, text: &str) {
        self.set_term_years(parse_years(text));
    }

    // -- derived ------------------------------------------------------------

    pub fn output(&self) -> &AmortizationOutput {
        &self.output
    }

    pub fn periodic_payment(&self) -> Money {
        self.output.periodic_payment
    }

    pub fn total_interest(&self) -> Money {
        self.output.total_interest
    }

    pub fn total_payment(&self) -> Money {
        self.output.total_payment
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.output.schedule
    }

    pub fn breakdown(&self) -> PaymentBreakdown {
        PaymentBreakdown::from_output(self.params.principal, &self.output)
    }

    // -- pagination ---------------------------------------------------------

    pub fn current_page(&self) -> usize {
        self.viewport.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.viewport.total_pages()
    }

    pub fn page_entries(&self) -> &[ScheduleEntry] {
        self.viewport.current(&self.output.schedule)
    }

    pub fn page_snapshot(&self) -> SchedulePage {
        self.viewport
            .snapshot(&self.output.schedule, self.viewport.current_page())
    }

    pub fn next_page(&mut self) {
        self.viewport.next();
    }

    pub fn prev_page(&mut self) {
        self.viewport.prev();
    }

    // -- internals ----------------------------------------------------------

    fn recompute(&mut self) {
        self.output = amortize(&self.params);
        self.viewport.reset(self.output.schedule.len());
        debug!(
            principal = %self.params.principal,
            annual_rate_percent = %self.params.annual_rate_percent,
            term_years = self.params.term_years,
            payment = %self.output.periodic_payment,
            "calculator recomputed"
        );
        self.render();
    }

    fn render(&mut self) {
        if self.output.periodic_payment.is_zero() {
            return;
        }
        let breakdown = self.breakdown();
        match self.surface.as_mut() {
            Some(surface) if surface.is_available() => surface.draw_breakdown(&breakdown),
            Some(_) => trace!("render surface unavailable; skipping chart"),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSurface {
        available: bool,
        draws: Rc<RefCell<Vec<PaymentBreakdown>>>,
    }

    impl RenderSurface for RecordingSurface {
        fn is_available(&self) -> bool {
            self.available
        }

        fn draw_breakdown(&mut self, breakdown: &PaymentBreakdown) {
            self.draws.borrow_mut().push(breakdown.clone());
        }
    }

    fn recording(available: bool) -> (Box<dyn RenderSurface>, Rc<RefCell<Vec<PaymentBreakdown>>>) {
        let draws = Rc::new(RefCell::new(Vec::new()));
        let surface = RecordingSurface {
            available,
            draws: Rc::clone(&draws),
        };
        (Box::new(surface), draws)
    }

    #[test]
    fn test_default_state() {
        let calc = EmiCalculator::default();
        assert_eq!(calc.schedule().len(), 60);
        assert_eq!(calc.total_pages(), 5);
        assert_eq!(calc.current_page(), 1);
        assert!(calc.periodic_payment() > Decimal::ZERO);
    }

    #[test]
    fn test_input_change_resets_page() {
        let mut calc = EmiCalculator::default();
        calc.next_page();
        calc.next_page();
        assert_eq!(calc.current_page(), 3);

        calc.set_annual_rate(dec!(9));
        assert_eq!(calc.current_page(), 1);

        calc.next_page();
        calc.set_term_years(10);
        assert_eq!(calc.current_page(), 1);
        assert_eq!(calc.total_pages(), 10);

        calc.next_page();
        calc.set_principal_text("750000");
        assert_eq!(calc.current_page(), 1);
        assert_eq!(calc.params().principal, dec!(750000));
    }

    #[test]
    fn test_derived_values_follow_inputs() {
        let mut calc = EmiCalculator::default();
        let before = calc.periodic_payment();
        calc.set_principal(dec!(1000000));
        assert!(calc.periodic_payment() > before);
        assert_eq!(
            calc.total_payment(),
            calc.periodic_payment() * Decimal::from(60)
        );
    }

    #[test]
    fn test_text_input_coerced_to_zero() {
        let mut calc = EmiCalculator::default();
        calc.set_annual_rate_text("abc");
        assert_eq!(calc.params().annual_rate_percent, Decimal::ZERO);
        assert_eq!(calc.periodic_payment(), Decimal::ZERO);
        assert!(calc.schedule().is_empty());
        assert_eq!(calc.total_pages(), 0);
        assert!(calc.page_entries().is_empty());

        calc.set_annual_rate_text("8.5");
        calc.set_term_years_text("-4");
        assert_eq!(calc.params().term_years, 0);
        assert!(calc.schedule().is_empty());
    }

    #[test]
    fn test_page_entries_follow_navigation() {
        let mut calc = EmiCalculator::default();
        assert_eq!(calc.page_entries()[0].period, 1);
        calc.next_page();
        assert_eq!(calc.page_entries()[0].period, 13);
        let snap = calc.page_snapshot();
        assert_eq!(snap.page, 2);
        assert_eq!(snap.entries.len(), 12);
    }

    #[test]
    fn test_attach_renders_immediately() {
        let mut calc = EmiCalculator::default();
        let (surface, draws) = recording(true);
        calc.attach_surface(surface);
        assert_eq!(draws.borrow().len(), 1);

        calc.set_term_years(7);
        assert_eq!(draws.borrow().len(), 2);
        assert_eq!(draws.borrow()[1], calc.breakdown());
    }

    #[test]
    fn test_unavailable_surface_is_skipped() {
        let mut calc = EmiCalculator::default();
        let (surface, draws) = recording(false);
        calc.attach_surface(surface);
        calc.set_principal(dec!(250000));
        assert!(draws.borrow().is_empty());
    }

    #[test]
    fn test_zero_payment_is_not_drawn() {
        let mut calc = EmiCalculator::new(LoanParameters::new(dec!(0), dec!(8.5), 5));
        let (surface, draws) = recording(true);
        calc.attach_surface(surface);
        assert!(draws.borrow().is_empty());

        calc.set_principal(dec!(100000));
        assert_eq!(draws.borrow().len(), 1);
        assert!(calc.detach_surface().is_some());
        calc.set_principal(dec!(200000));
        assert_eq!(draws.borrow().len(), 1);
    }

    #[test]
    fn test_reattached_surface_draws_latest_state_once() {
        let mut calc = EmiCalculator::default();
        let (surface, draws) = recording(true);
        calc.attach_surface(surface);
        let surface = calc.detach_surface().unwrap();

        calc.set_principal_text("800000");
        calc.set_term_years_text("20");
        calc.next_page();
        assert_eq!(draws.borrow().len(), 1);

        calc.attach_surface(surface);
        assert_eq!(draws.borrow().len(), 2);
        assert_eq!(draws.borrow()[1], calc.breakdown());
        assert_eq!(draws.borrow()[1].principal, dec!(800000));
    }
}
