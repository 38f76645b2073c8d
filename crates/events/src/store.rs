//! Persistence ports for events and registrations.
//!
//! Stores traffic in raw records; the domain re-validates on hydration, so
//! there is no construction path that bypasses the entity factories.

use std::sync::Arc;

use thiserror::Error;

use eventcloud_core::{EventId, ExpectedVersion, RegistrationId, TenantId, UserId};

use crate::event::EventRecord;
use crate::registration::RegistrationRecord;

/// Store operation error.
///
/// Infrastructure failures, as opposed to domain errors. The manager
/// translates these at the boundary; raw store errors never reach callers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed (version mismatch).
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// A uniqueness constraint was violated.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The targeted row does not exist (or is not visible to the tenant).
    #[error("not found")]
    NotFound,

    /// Catch-all storage/transport failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// An active event together with its eagerly loaded registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListing {
    pub event: EventRecord,
    pub registrations: Vec<RegistrationRecord>,
}

/// Durable storage for events.
///
/// Implementations are responsible for tenant isolation (rows belonging to a
/// different tenant are invisible, not errors), for hiding soft-deleted rows,
/// and for the optimistic concurrency token on `update`.
pub trait EventStore: Send + Sync {
    fn insert(&self, record: &EventRecord) -> Result<(), StoreError>;

    fn get(
        &self,
        tenant_id: Option<TenantId>,
        id: EventId,
    ) -> Result<Option<EventRecord>, StoreError>;

    /// Active (not cancelled, not deleted) events, newest-created first,
    /// with registrations eagerly included.
    fn list_active(&self, tenant_id: Option<TenantId>) -> Result<Vec<EventListing>, StoreError>;

    /// Overwrite the stored row iff its version matches `expected`; a
    /// mismatch fails with [`StoreError::Conflict`].
    fn update(&self, record: &EventRecord, expected: ExpectedVersion) -> Result<(), StoreError>;
}

/// Durable storage for registrations.
pub trait RegistrationStore: Send + Sync {
    /// Insert a new registration.
    ///
    /// The `(tenant, event, user)` uniqueness constraint is enforced here,
    /// atomically with the write: when two writers race, exactly one insert
    /// succeeds and the other fails with [`StoreError::UniqueViolation`].
    fn insert(&self, record: &RegistrationRecord) -> Result<(), StoreError>;

    fn find(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<RegistrationRecord>, StoreError>;

    /// Delete a registration. Fails with [`StoreError::NotFound`] if no such
    /// row exists.
    fn remove(&self, tenant_id: Option<TenantId>, id: RegistrationId) -> Result<(), StoreError>;

    fn list_for_event(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
    ) -> Result<Vec<RegistrationRecord>, StoreError>;
}

impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    fn insert(&self, record: &EventRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn get(
        &self,
        tenant_id: Option<TenantId>,
        id: EventId,
    ) -> Result<Option<EventRecord>, StoreError> {
        (**self).get(tenant_id, id)
    }

    fn list_active(&self, tenant_id: Option<TenantId>) -> Result<Vec<EventListing>, StoreError> {
        (**self).list_active(tenant_id)
    }

    fn update(&self, record: &EventRecord, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).update(record, expected)
    }
}

impl<T> RegistrationStore for Arc<T>
where
    T: RegistrationStore + ?Sized,
{
    fn insert(&self, record: &RegistrationRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn find(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<RegistrationRecord>, StoreError> {
        (**self).find(tenant_id, event_id, user_id)
    }

    fn remove(&self, tenant_id: Option<TenantId>, id: RegistrationId) -> Result<(), StoreError> {
        (**self).remove(tenant_id, id)
    }

    fn list_for_event(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
    ) -> Result<Vec<RegistrationRecord>, StoreError> {
        (**self).list_for_event(tenant_id, event_id)
    }
}
