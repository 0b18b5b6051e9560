//! Clients of a franchise (the people projects are quoted for).
//!
//! Plain tenant-scoped records: registration and partial update rules live
//! here, storage and the "no delete while referenced" rule live with the
//! application service.

pub mod client;

pub use client::{Client, ClientId, ContactInfo, RegisterClient, UpdateClient};
