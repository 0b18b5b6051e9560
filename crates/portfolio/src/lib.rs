//! Portfolio statistics: the dashboard numbers for one franchise.

pub mod stats;

pub use stats::{compute_portfolio_stats, PortfolioStats};
