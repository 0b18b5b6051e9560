//! Process-wide logging setup.

pub mod subscriber;

pub use subscriber::{init, init_with_default_filter, LogFormat};
