use std::collections::HashMap;
use std::sync::RwLock;

use wrapquote_core::{AggregateId, ExpectedVersion, TenantId};

use super::r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    tenant_id: TenantId,
    aggregate_id: AggregateId,
}

/// In-memory append-only event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamKey, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[StoredEvent]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let Some(first) = events.first() else {
            return Ok(vec![]);
        };

        // All events must target the same tenant + aggregate stream.
        let tenant_id = first.tenant_id;
        let aggregate_id = first.aggregate_id;
        let aggregate_type = first.aggregate_type.clone();

        for (idx, e) in events.iter().enumerate() {
            if e.tenant_id != tenant_id {
                return Err(EventStoreError::TenantIsolation(format!(
                    "batch contains multiple tenant_ids (index {idx})"
                )));
            }
            if e.aggregate_id != aggregate_id {
                return Err(EventStoreError::InvalidAppend(format!(
                    "batch contains multiple aggregate_ids (index {idx})"
                )));
            }
            if e.aggregate_type != aggregate_type {
                return Err(EventStoreError::AggregateTypeMismatch(format!(
                    "batch contains multiple aggregate_types (index {idx})"
                )));
            }
        }

        let key = StreamKey {
            tenant_id,
            aggregate_id,
        };

        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        let stream = streams.entry(key).or_default();
        let current = Self::current_version(stream);

        if !expected_version.matches(current) {
            return Err(EventStoreError::Concurrency(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        if let Some(existing) = stream.first() {
            if existing.aggregate_type != aggregate_type {
                return Err(EventStoreError::AggregateTypeMismatch(format!(
                    "stream aggregate_type is '{}', attempted append with '{}'",
                    existing.aggregate_type, aggregate_type
                )));
            }
        }

        let mut next = current + 1;
        let mut committed = Vec::with_capacity(events.len());
        for e in events {
            let stored = StoredEvent {
                event_id: e.event_id,
                tenant_id: e.tenant_id,
                aggregate_id: e.aggregate_id,
                aggregate_type: e.aggregate_type,
                sequence_number: next,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            };
            next += 1;
            stream.push(stored.clone());
            committed.push(stored);
        }

        Ok(committed)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let key = StreamKey {
            tenant_id,
            aggregate_id,
        };

        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        Ok(streams.get(&key).cloned().unwrap_or_default())
    }

    fn list_aggregate_ids(
        &self,
        tenant_id: TenantId,
        aggregate_type: &str,
    ) -> Result<Vec<AggregateId>, EventStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        // v7 ids sort by creation time.
        let mut ids: Vec<AggregateId> = streams
            .iter()
            .filter(|(key, stream)| {
                key.tenant_id == tenant_id
                    && stream.first().is_some_and(|e| e.aggregate_type == aggregate_type)
            })
            .map(|(key, _)| key.aggregate_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn event(tenant_id: TenantId, aggregate_id: AggregateId, aggregate_type: &str) -> UncommittedEvent {
        UncommittedEvent {
            event_id: Uuid::now_v7(),
            tenant_id,
            aggregate_id,
            aggregate_type: aggregate_type.to_string(),
            event_type: "test.event".to_string(),
            event_version: 1,
            occurred_at: Utc::now(),
            payload: json!({}),
        }
    }

    #[test]
    fn append_assigns_contiguous_sequence_numbers() {
        let store = InMemoryEventStore::new();
        let tenant_id = TenantId::new();
        let aggregate_id = AggregateId::new();

        let first = store
            .append(
                vec![event(tenant_id, aggregate_id, "projects.project"); 2],
                ExpectedVersion::Exact(0),
            )
            .unwrap();
        let second = store
            .append(
                vec![event(tenant_id, aggregate_id, "projects.project")],
                ExpectedVersion::Exact(2),
            )
            .unwrap();

        assert_eq!(first.iter().map(|e| e.sequence_number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second[0].sequence_number, 3);
        assert_eq!(store.load_stream(tenant_id, aggregate_id).unwrap().len(), 3);
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let store = InMemoryEventStore::new();
        let tenant_id = TenantId::new();
        let aggregate_id = AggregateId::new();
        store
            .append(vec![event(tenant_id, aggregate_id, "projects.project")], ExpectedVersion::Exact(0))
            .unwrap();

        let err = store
            .append(vec![event(tenant_id, aggregate_id, "projects.project")], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, EventStoreError::Concurrency(_)));
        assert_eq!(store.load_stream(tenant_id, aggregate_id).unwrap().len(), 1);
    }

    #[test]
    fn mixed_tenant_batch_is_rejected_atomically() {
        let store = InMemoryEventStore::new();
        let tenant_id = TenantId::new();
        let aggregate_id = AggregateId::new();

        let err = store
            .append(
                vec![
                    event(tenant_id, aggregate_id, "projects.project"),
                    event(TenantId::new(), aggregate_id, "projects.project"),
                ],
                ExpectedVersion::Any,
            )
            .unwrap_err();
        assert!(matches!(err, EventStoreError::TenantIsolation(_)));
        assert!(store.load_stream(tenant_id, aggregate_id).unwrap().is_empty());
    }

    #[test]
    fn streams_are_invisible_to_other_tenants() {
        let store = InMemoryEventStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let aggregate_id = AggregateId::new();
        store
            .append(vec![event(tenant_a, aggregate_id, "projects.project")], ExpectedVersion::Any)
            .unwrap();

        assert!(store.load_stream(tenant_b, aggregate_id).unwrap().is_empty());
        assert!(store.list_aggregate_ids(tenant_b, "projects.project").unwrap().is_empty());
    }

    #[test]
    fn list_aggregate_ids_filters_by_type_and_sorts() {
        let store = InMemoryEventStore::new();
        let tenant_id = TenantId::new();
        let first = AggregateId::new();
        let second = AggregateId::new();
        let other = AggregateId::new();

        store
            .append(vec![event(tenant_id, second, "projects.project")], ExpectedVersion::Any)
            .unwrap();
        store
            .append(vec![event(tenant_id, first, "projects.project")], ExpectedVersion::Any)
            .unwrap();
        store
            .append(vec![event(tenant_id, other, "something.else")], ExpectedVersion::Any)
            .unwrap();

        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(store.list_aggregate_ids(tenant_id, "projects.project").unwrap(), expected);
    }
}
