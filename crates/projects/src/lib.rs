//! Projects domain module (event-sourced).
//!
//! A project is a quote for one client: an ordered list of priced line items,
//! totals that always equal the fold over those items, and a status that moves
//! `draft -> sent -> approved | rejected`. Pure domain logic only.

pub mod aggregator;
pub mod lifecycle;
pub mod line_item;
pub mod project;
pub mod status;

pub use aggregator::{fold_totals, recompute_project};
pub use lifecycle::transition_status;
pub use line_item::{LineItem, LineItemId};
pub use project::{
    AddItem, ChangeStatus, CreateProject, DeleteProject, ItemAdded, ItemRemoved, ItemUpdated,
    NewItem, Project, ProjectCommand, ProjectCreated, ProjectDeleted, ProjectEvent, ProjectId,
    ProjectRecomputed, RecomputeTotals, RemoveItem, StatusChanged, UpdateItem,
};
pub use status::ProjectStatus;
