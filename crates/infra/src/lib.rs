//! Infrastructure layer: event store, command dispatch and tenant-scoped storage.
//!
//! Everything here is in-memory. The traits are the seams a durable backend
//! would plug into.

pub mod command_dispatcher;
pub mod event_store;
pub mod read_model;
