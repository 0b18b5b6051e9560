use chrono::{DateTime, Utc};

/// Schema version every event type starts at.
pub const INITIAL_SCHEMA_VERSION: u32 = 1;

/// A fact recorded against one aggregate stream.
///
/// Once appended an event is never edited. A payload whose shape changes gets
/// a higher `version` and must stay readable next to the old one.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted `<context>.<aggregate>.<fact>` name, e.g.
    /// `projects.project.status_changed`. Stored next to the payload.
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32 {
        INITIAL_SCHEMA_VERSION
    }

    /// Business time, not the time the store received the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
