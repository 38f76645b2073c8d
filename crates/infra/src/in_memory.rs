//! In-memory persistence adapter for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use eventcloud_core::{EventId, ExpectedVersion, RegistrationId, TenantId, UserId};
use eventcloud_events::{
    EventListing, EventRecord, EventStore, RegistrationRecord, RegistrationStore, StoreError,
};

/// In-memory row store implementing both persistence ports.
///
/// Intended for tests/dev. Not optimized for performance. Visibility requires
/// an exact tenant match, and soft-deleted rows are invisible to reads.
///
/// The registration uniqueness check runs under the same write guard as the
/// insert, so concurrent duplicate registrations cannot both commit.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    events: RwLock<HashMap<EventId, EventRecord>>,
    registrations: RwLock<HashMap<RegistrationId, RegistrationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl core::fmt::Debug) -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

impl EventStore for InMemoryStore {
    fn insert(&self, record: &EventRecord) -> Result<(), StoreError> {
        let mut events = self.events.write().map_err(poisoned)?;

        if events.contains_key(&record.id) {
            return Err(StoreError::UniqueViolation(format!(
                "events(id) — {}",
                record.id
            )));
        }

        events.insert(record.id, record.clone());
        Ok(())
    }

    fn get(
        &self,
        tenant_id: Option<TenantId>,
        id: EventId,
    ) -> Result<Option<EventRecord>, StoreError> {
        let events = self.events.read().map_err(poisoned)?;

        Ok(events
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id && !r.audit.deleted)
            .cloned())
    }

    fn list_active(&self, tenant_id: Option<TenantId>) -> Result<Vec<EventListing>, StoreError> {
        let events = self.events.read().map_err(poisoned)?;
        let registrations = self.registrations.read().map_err(poisoned)?;

        let mut listings: Vec<EventListing> = events
            .values()
            .filter(|r| r.tenant_id == tenant_id && !r.cancelled && !r.audit.deleted)
            .map(|r| EventListing {
                event: r.clone(),
                registrations: registrations
                    .values()
                    .filter(|reg| reg.event_id == r.id && reg.tenant_id == tenant_id)
                    .cloned()
                    .collect(),
            })
            .collect();

        // Newest-created first.
        listings.sort_by(|a, b| b.event.audit.created_at.cmp(&a.event.audit.created_at));

        Ok(listings)
    }

    fn update(&self, record: &EventRecord, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut events = self.events.write().map_err(poisoned)?;

        let existing = events
            .get(&record.id)
            .filter(|r| r.tenant_id == record.tenant_id)
            .ok_or(StoreError::NotFound)?;

        if !expected.matches(existing.version) {
            return Err(StoreError::Conflict(format!(
                "expected {expected:?}, found {}",
                existing.version
            )));
        }

        events.insert(record.id, record.clone());
        Ok(())
    }
}

impl RegistrationStore for InMemoryStore {
    fn insert(&self, record: &RegistrationRecord) -> Result<(), StoreError> {
        let mut registrations = self.registrations.write().map_err(poisoned)?;

        // Check-and-insert under one guard: this is the authoritative
        // closure of the duplicate-registration race.
        let duplicate = registrations.values().any(|r| {
            r.tenant_id == record.tenant_id
                && r.event_id == record.event_id
                && r.user_id == record.user_id
        });
        if duplicate || registrations.contains_key(&record.id) {
            return Err(StoreError::UniqueViolation(
                "registrations(tenant_id, event_id, user_id)".to_string(),
            ));
        }

        registrations.insert(record.id, record.clone());
        Ok(())
    }

    fn find(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<RegistrationRecord>, StoreError> {
        let registrations = self.registrations.read().map_err(poisoned)?;

        Ok(registrations
            .values()
            .find(|r| {
                r.tenant_id == tenant_id && r.event_id == event_id && r.user_id == user_id
            })
            .cloned())
    }

    fn remove(&self, tenant_id: Option<TenantId>, id: RegistrationId) -> Result<(), StoreError> {
        let mut registrations = self.registrations.write().map_err(poisoned)?;

        match registrations.get(&id) {
            Some(r) if r.tenant_id == tenant_id => {
                registrations.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    fn list_for_event(
        &self,
        tenant_id: Option<TenantId>,
        event_id: EventId,
    ) -> Result<Vec<RegistrationRecord>, StoreError> {
        let registrations = self.registrations.read().map_err(poisoned)?;

        Ok(registrations
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.event_id == event_id)
            .cloned()
            .collect())
    }
}
