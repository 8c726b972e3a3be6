//! Derived tables: returns and correlation.

pub mod correlation;
pub mod returns;

pub use correlation::CorrelationMatrix;
pub use returns::Returns;
