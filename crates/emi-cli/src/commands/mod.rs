pub mod explore;
pub mod loan;
