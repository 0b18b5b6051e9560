//! Application layer: tenant context, configuration and the quote service.
//!
//! `QuoteService` is the one entry point a presentation layer talks to. It
//! resolves catalog values, enforces client referential integrity and routes
//! project changes through the event-sourced dispatcher.

pub mod config;
pub mod context;
pub mod dto;
pub mod errors;
pub mod services;

pub use config::{AppConfig, TenantPricing};
pub use context::TenantContext;
pub use dto::{LineItemView, NewClient, NewLineItem, NewProject, ProjectView};
pub use errors::{ServiceError, ServiceResult};
pub use services::{InMemoryQuoteService, QuoteService};
