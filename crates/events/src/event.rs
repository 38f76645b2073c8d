use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use eventcloud_core::{AuditMeta, DomainError, DomainResult, Entity, EventId, TenantId, UserId};

use crate::notifications::{EventCancelled, EventNotification};

pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 128;
pub const MAX_MIN_AGE_TO_REGISTER: u8 = 60;

/// Minimum gap between `now` and an event's date when scheduling or
/// rescheduling. Could become configurable per tenant.
pub const MIN_LEAD_HOURS: i64 = 3;

/// Period before start during which cancellation counts as "too late".
/// Advisory only: `cancel` does not enforce it (see
/// [`Event::is_cancellation_window_closed`]).
pub const CANCELLATION_WINDOW_HOURS: i64 = 2;

/// Input for [`Event::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEvent {
    pub tenant_id: Option<TenantId>,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub min_age_to_register: u8,
}

/// Entity: a scheduled event owned by a tenant.
///
/// Constructed only through [`Event::create`] (fresh instances) or
/// [`Event::hydrate`] (reconstruction from storage); both paths validate.
/// Mutations go through `set_date` and `cancel`, which re-check invariants
/// and bump the optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    tenant_id: Option<TenantId>,
    title: String,
    description: Option<String>,
    date: DateTime<Utc>,
    min_age_to_register: u8,
    cancelled: bool,
    audit: AuditMeta,
    version: u64,
    /// Notifications produced by mutations, drained by the orchestrating
    /// layer after a successful commit.
    pending: Vec<EventNotification>,
}

/// Raw persisted shape of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub tenant_id: Option<TenantId>,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub min_age_to_register: u8,
    pub cancelled: bool,
    pub audit: AuditMeta,
    pub version: u64,
}

impl Event {
    /// Create a new event. The only public construction path.
    pub fn create(
        input: CreateEvent,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_title(&input.title)?;
        validate_description(input.description.as_deref())?;
        validate_min_age(input.min_age_to_register)?;
        validate_date(input.date, now)?;

        Ok(Self {
            id: EventId::new(),
            tenant_id: input.tenant_id,
            title: input.title,
            description: input.description,
            date: input.date,
            min_age_to_register: input.min_age_to_register,
            cancelled: false,
            audit: AuditMeta::new(now, actor),
            version: 1,
            pending: Vec::new(),
        })
    }

    /// Rebuild an event from its persisted record.
    ///
    /// Structural constraints (lengths, age bound) are re-checked so storage
    /// cannot smuggle an invalid instance past the factory. Temporal rules are
    /// not: stored events age past their date naturally.
    pub fn hydrate(record: EventRecord) -> DomainResult<Self> {
        validate_title(&record.title)?;
        validate_description(record.description.as_deref())?;
        validate_min_age(record.min_age_to_register)?;

        Ok(Self {
            id: record.id,
            tenant_id: record.tenant_id,
            title: record.title,
            description: record.description,
            date: record.date,
            min_age_to_register: record.min_age_to_register,
            cancelled: record.cancelled,
            audit: record.audit,
            version: record.version,
            pending: Vec::new(),
        })
    }

    /// The persisted shape of this event. Pending notifications are not part
    /// of persistent state.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            id: self.id,
            tenant_id: self.tenant_id,
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            min_age_to_register: self.min_age_to_register,
            cancelled: self.cancelled,
            audit: self.audit.clone(),
            version: self.version,
        }
    }

    pub fn id_typed(&self) -> EventId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn min_age_to_register(&self) -> u8 {
        self.min_age_to_register
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn audit(&self) -> &AuditMeta {
        &self.audit
    }

    /// Monotonically increasing version, checked by the store on update.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the event's date has already passed.
    pub fn is_in_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    /// Whether the event starts within the cancellation window (2 hours).
    ///
    /// Policy query only. `cancel` blocks solely on `is_in_past`; callers
    /// wanting the stricter window rule must check this explicitly.
    pub fn is_cancellation_window_closed(&self, now: DateTime<Utc>) -> bool {
        self.date - now <= Duration::hours(CANCELLATION_WINDOW_HOURS)
    }

    /// Reschedule the event.
    pub fn set_date(
        &mut self,
        new_date: DateTime<Utc>,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.cancelled {
            return Err(DomainError::EventCancelled);
        }
        validate_date(new_date, now)?;

        self.date = new_date;
        self.audit.touch(now, actor);
        self.version += 1;
        Ok(())
    }

    /// Cancel the event.
    ///
    /// Blocked only once the event is truly in the past. On success the
    /// cancellation notification is appended to the pending buffer for
    /// post-commit dispatch.
    pub fn cancel(&mut self, actor: Option<UserId>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_in_past(now) {
            return Err(DomainError::EventInPast);
        }

        self.cancelled = true;
        self.audit.touch(now, actor);
        self.version += 1;

        self.pending
            .push(EventNotification::EventCancelled(EventCancelled {
                event_id: self.id,
                tenant_id: self.tenant_id,
                cancelled_by: actor,
                occurred_at: now,
            }));

        Ok(())
    }

    /// Drain notifications produced since the last drain.
    pub fn take_notifications(&mut self) -> Vec<EventNotification> {
        core::mem::take(&mut self.pending)
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> DomainResult<()> {
    if let Some(d) = description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::validation(format!(
                "description cannot exceed {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn validate_min_age(min_age: u8) -> DomainResult<()> {
    if min_age > MAX_MIN_AGE_TO_REGISTER {
        return Err(DomainError::validation(format!(
            "minimum age to register must be between 0 and {MAX_MIN_AGE_TO_REGISTER}"
        )));
    }
    Ok(())
}

fn validate_date(date: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
    if date < now {
        return Err(DomainError::DateInPast);
    }
    if date <= now + Duration::hours(MIN_LEAD_HOURS) {
        return Err(DomainError::LeadTimeTooShort {
            min_lead_hours: MIN_LEAD_HOURS,
        });
    }
    Ok(())
}
