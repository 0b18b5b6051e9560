//! Domain events.
//!
//! Aggregates describe every state change as an immutable, versioned event;
//! the event store persists them and rehydration replays them.

pub mod event;

pub use event::{Event, INITIAL_SCHEMA_VERSION};
