//! Line item pricer.
//!
//! Turns one line item's inputs plus resolved catalog values into material
//! cost, labor cost, total cost and selling price. Pure and deterministic:
//! configuration is always passed in, never read from ambient state.

pub mod config;
pub mod input;
pub mod pricer;

pub use config::PricingConfig;
pub use input::{LineItemInput, ResolvedRates};
pub use pricer::{price, price_line_item, CostBreakdown, PricedLineItem};
