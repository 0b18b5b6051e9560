use thiserror::Error;

use wrapquote_core::DomainError;
use wrapquote_infra::command_dispatcher::DispatchError;
use wrapquote_infra::event_store::EventStoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every `QuoteService` operation.
///
/// Domain refusals keep their structured `DomainError` so callers can match
/// on the kind; storage problems are flattened to a message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Another writer changed the project first; reload and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<DispatchError> for ServiceError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Domain(e) => ServiceError::Domain(e),
            DispatchError::Concurrency(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

impl From<EventStoreError> for ServiceError {
    fn from(value: EventStoreError) -> Self {
        DispatchError::from(value).into()
    }
}

impl ServiceError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(e) => match e {
                DomainError::InvalidInput { .. } => "invalid_input",
                DomainError::NotFound { .. } => "not_found",
                DomainError::InvalidTransition { .. } => "invalid_transition",
                DomainError::ReferentialIntegrity(_) => "referential_integrity",
                DomainError::InvariantViolation(_) => "invariant_violation",
                DomainError::InvalidId(_) => "invalid_id",
                DomainError::Conflict(_) => "conflict",
            },
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Storage(_) => "storage_error",
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
