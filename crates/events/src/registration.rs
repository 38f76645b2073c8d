use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcloud_core::{
    AuditMeta, DomainError, DomainResult, Entity, EventId, RegistrationId, TenantId, UserId,
};

use crate::event::Event;

/// Reference to a user owned by the external identity subsystem.
///
/// Only the identity and the age attribute are visible to this domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attendee {
    pub id: UserId,
    pub age: u8,
}

/// Entity: an active registration of a user for an event.
///
/// At most one active registration exists per (event, user) pair. This entity
/// enforces the event-side rules; uniqueness is enforced by the manager's
/// fast-path check and, authoritatively, by the store's constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    id: RegistrationId,
    tenant_id: Option<TenantId>,
    event_id: EventId,
    user_id: UserId,
    audit: AuditMeta,
}

/// Raw persisted shape of a [`Registration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: RegistrationId,
    pub tenant_id: Option<TenantId>,
    pub event_id: EventId,
    pub user_id: UserId,
    pub audit: AuditMeta,
}

impl Registration {
    /// Register `attendee` for `event`.
    ///
    /// Fails with `EventCancelled` if the event is cancelled and `AgeTooLow`
    /// if the attendee is younger than the event's minimum age. An attendee
    /// exactly at the minimum age is admitted.
    pub fn create(event: &Event, attendee: &Attendee, now: DateTime<Utc>) -> DomainResult<Self> {
        if event.is_cancelled() {
            return Err(DomainError::EventCancelled);
        }
        if attendee.age < event.min_age_to_register() {
            return Err(DomainError::AgeTooLow {
                required: event.min_age_to_register(),
                actual: attendee.age,
            });
        }

        Ok(Self {
            id: RegistrationId::new(),
            tenant_id: event.tenant_id(),
            event_id: event.id_typed(),
            user_id: attendee.id,
            audit: AuditMeta::new(now, Some(attendee.id)),
        })
    }

    /// Rebuild a registration from its persisted record.
    pub fn hydrate(record: RegistrationRecord) -> DomainResult<Self> {
        Ok(Self {
            id: record.id,
            tenant_id: record.tenant_id,
            event_id: record.event_id,
            user_id: record.user_id,
            audit: record.audit,
        })
    }

    pub fn to_record(&self) -> RegistrationRecord {
        RegistrationRecord {
            id: self.id,
            tenant_id: self.tenant_id,
            event_id: self.event_id,
            user_id: self.user_id,
            audit: self.audit.clone(),
        }
    }

    pub fn id_typed(&self) -> RegistrationId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn audit(&self) -> &AuditMeta {
        &self.audit
    }
}

impl Entity for Registration {
    type Id = RegistrationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
