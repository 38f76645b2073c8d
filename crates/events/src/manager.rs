//! Persistence-aware orchestration across Event + Registration.

use chrono::{DateTime, Utc};

use eventcloud_core::{
    DomainError, DomainResult, EventId, ExpectedVersion, TenantId, UserId,
};
use eventcloud_notifications::NotificationSink;

use crate::event::{CreateEvent, Event};
use crate::notifications::EventNotification;
use crate::registration::{Attendee, Registration};
use crate::store::{EventStore, RegistrationStore, StoreError};

/// Domain service coordinating entities, the persistence store, and the
/// notification sink.
///
/// Every operation either applies fully or not at all: mutations are made on
/// a clone and swapped into the caller's entity only after the store has
/// committed them. Notifications are dispatched after the commit,
/// best-effort — a sink failure is logged and never fails the operation.
pub struct EventManager<ES, RS, NS> {
    events: ES,
    registrations: RS,
    sink: NS,
}

impl<ES, RS, NS> EventManager<ES, RS, NS> {
    pub fn new(events: ES, registrations: RS, sink: NS) -> Self {
        Self {
            events,
            registrations,
            sink,
        }
    }

    pub fn into_parts(self) -> (ES, RS, NS) {
        (self.events, self.registrations, self.sink)
    }
}

impl<ES, RS, NS> EventManager<ES, RS, NS>
where
    ES: EventStore,
    RS: RegistrationStore,
    NS: NotificationSink<EventNotification>,
{
    /// Create and persist a new event.
    pub fn create(
        &self,
        input: CreateEvent,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let event = Event::create(input, actor, now)?;
        self.events
            .insert(&event.to_record())
            .map_err(store_error)?;

        tracing::info!("created event {}", event.id_typed());
        Ok(event)
    }

    /// Fetch an event by identifier, scoped to the tenant.
    pub fn get(&self, tenant_id: Option<TenantId>, id: EventId) -> DomainResult<Event> {
        let record = self
            .events
            .get(tenant_id, id)
            .map_err(store_error)?
            .ok_or(DomainError::NotFound)?;

        Event::hydrate(record)
    }

    /// Active events for the tenant, newest first, with their registrations.
    pub fn list(
        &self,
        tenant_id: Option<TenantId>,
    ) -> DomainResult<Vec<(Event, Vec<Registration>)>> {
        let listings = self.events.list_active(tenant_id).map_err(store_error)?;

        listings
            .into_iter()
            .map(|listing| {
                let event = Event::hydrate(listing.event)?;
                let registrations = listing
                    .registrations
                    .into_iter()
                    .map(Registration::hydrate)
                    .collect::<DomainResult<Vec<_>>>()?;
                Ok((event, registrations))
            })
            .collect()
    }

    /// Cancel an event and persist the change.
    ///
    /// On success the caller's entity reflects the committed state and the
    /// cancellation notification has been handed to the sink. On any failure
    /// the caller's entity is untouched.
    pub fn cancel(
        &self,
        event: &mut Event,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let expected = ExpectedVersion::Exact(event.version());
        let mut next = event.clone();
        next.cancel(actor, now)?;

        self.events
            .update(&next.to_record(), expected)
            .map_err(store_error)?;

        self.dispatch(&mut next);
        tracing::info!("cancelled event {}", next.id_typed());

        *event = next;
        Ok(())
    }

    /// Reschedule an event and persist the change, under the same
    /// all-or-nothing discipline as `cancel`.
    pub fn reschedule(
        &self,
        event: &mut Event,
        new_date: DateTime<Utc>,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let expected = ExpectedVersion::Exact(event.version());
        let mut next = event.clone();
        next.set_date(new_date, actor, now)?;

        self.events
            .update(&next.to_record(), expected)
            .map_err(store_error)?;

        tracing::info!("rescheduled event {} to {}", next.id_typed(), new_date);

        *event = next;
        Ok(())
    }

    /// Register an attendee for an event.
    ///
    /// Rule order: cancelled event, minimum age, duplicate registration.
    /// The duplicate check here is a fast-path rejection; the store's
    /// uniqueness constraint is the second line of defense, translated to
    /// the same `AlreadyRegistered` error when two calls race.
    pub fn register(
        &self,
        event: &Event,
        attendee: &Attendee,
        now: DateTime<Utc>,
    ) -> DomainResult<Registration> {
        let registration = Registration::create(event, attendee, now)?;

        let existing = self
            .registrations
            .find(event.tenant_id(), event.id_typed(), attendee.id)
            .map_err(store_error)?;
        if existing.is_some() {
            return Err(DomainError::AlreadyRegistered);
        }

        match self.registrations.insert(&registration.to_record()) {
            Ok(()) => {
                tracing::info!(
                    "registered user {} for event {}",
                    attendee.id,
                    event.id_typed()
                );
                Ok(registration)
            }
            Err(StoreError::UniqueViolation(_)) => Err(DomainError::AlreadyRegistered),
            Err(err) => Err(store_error(err)),
        }
    }

    /// Cancel an attendee's registration for an event.
    ///
    /// Fails with `NotFound` when no active registration exists, including
    /// when a concurrent call removed it first.
    pub fn cancel_registration(&self, event: &Event, attendee: &Attendee) -> DomainResult<()> {
        let registration = self
            .registrations
            .find(event.tenant_id(), event.id_typed(), attendee.id)
            .map_err(store_error)?
            .ok_or(DomainError::NotFound)?;

        self.registrations
            .remove(event.tenant_id(), registration.id)
            .map_err(store_error)?;

        tracing::info!(
            "cancelled registration of user {} for event {}",
            attendee.id,
            event.id_typed()
        );
        Ok(())
    }

    /// Publish pending notifications after a successful commit. Best-effort.
    fn dispatch(&self, event: &mut Event) {
        for notification in event.take_notifications() {
            if let Err(err) = self.sink.publish(notification) {
                tracing::warn!(
                    "failed to publish notification for event {}: {err:?}",
                    event.id_typed()
                );
            }
        }
    }
}

fn store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::Conflict(msg) => DomainError::ConcurrentModification(msg),
        StoreError::NotFound => DomainError::NotFound,
        StoreError::UniqueViolation(msg) | StoreError::Storage(msg) => {
            DomainError::Persistence(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use eventcloud_core::RegistrationId;
    use eventcloud_notifications::{InMemorySink, Subscription};

    use crate::event::EventRecord;
    use crate::registration::RegistrationRecord;
    use crate::store::EventListing;

    /// Event store that accepts every write and finds nothing.
    struct NullEventStore;

    impl EventStore for NullEventStore {
        fn insert(&self, _: &EventRecord) -> Result<(), StoreError> {
            Ok(())
        }

        fn get(
            &self,
            _: Option<TenantId>,
            _: EventId,
        ) -> Result<Option<EventRecord>, StoreError> {
            Ok(None)
        }

        fn list_active(&self, _: Option<TenantId>) -> Result<Vec<EventListing>, StoreError> {
            Ok(Vec::new())
        }

        fn update(&self, _: &EventRecord, _: ExpectedVersion) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Event store whose updates always lose the optimistic concurrency race.
    struct StaleEventStore;

    impl EventStore for StaleEventStore {
        fn insert(&self, _: &EventRecord) -> Result<(), StoreError> {
            Ok(())
        }

        fn get(
            &self,
            _: Option<TenantId>,
            _: EventId,
        ) -> Result<Option<EventRecord>, StoreError> {
            Ok(None)
        }

        fn list_active(&self, _: Option<TenantId>) -> Result<Vec<EventListing>, StoreError> {
            Ok(Vec::new())
        }

        fn update(&self, _: &EventRecord, _: ExpectedVersion) -> Result<(), StoreError> {
            Err(StoreError::Conflict("stale version".to_string()))
        }
    }

    /// Registration store simulating a losing race: the fast-path find sees
    /// nothing, but the constraint rejects the insert.
    struct RacingRegistrationStore;

    impl RegistrationStore for RacingRegistrationStore {
        fn insert(&self, _: &RegistrationRecord) -> Result<(), StoreError> {
            Err(StoreError::UniqueViolation(
                "registrations(tenant_id, event_id, user_id)".to_string(),
            ))
        }

        fn find(
            &self,
            _: Option<TenantId>,
            _: EventId,
            _: UserId,
        ) -> Result<Option<RegistrationRecord>, StoreError> {
            Ok(None)
        }

        fn remove(&self, _: Option<TenantId>, _: RegistrationId) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_for_event(
            &self,
            _: Option<TenantId>,
            _: EventId,
        ) -> Result<Vec<RegistrationRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Registration store whose reads fail outright.
    struct BrokenRegistrationStore;

    impl RegistrationStore for BrokenRegistrationStore {
        fn insert(&self, _: &RegistrationRecord) -> Result<(), StoreError> {
            Err(StoreError::Storage("connection reset".to_string()))
        }

        fn find(
            &self,
            _: Option<TenantId>,
            _: EventId,
            _: UserId,
        ) -> Result<Option<RegistrationRecord>, StoreError> {
            Err(StoreError::Storage("connection reset".to_string()))
        }

        fn remove(&self, _: Option<TenantId>, _: RegistrationId) -> Result<(), StoreError> {
            Err(StoreError::Storage("connection reset".to_string()))
        }

        fn list_for_event(
            &self,
            _: Option<TenantId>,
            _: EventId,
        ) -> Result<Vec<RegistrationRecord>, StoreError> {
            Err(StoreError::Storage("connection reset".to_string()))
        }
    }

    /// Sink that always refuses to deliver.
    struct DeadSink;

    impl NotificationSink<EventNotification> for DeadSink {
        type Error = &'static str;

        fn publish(&self, _: EventNotification) -> Result<(), Self::Error> {
            Err("sink is down")
        }

        fn subscribe(&self) -> Subscription<EventNotification> {
            let (_tx, rx) = std::sync::mpsc::channel();
            Subscription::new(rx)
        }
    }

    fn test_event(now: DateTime<Utc>) -> Event {
        Event::create(
            CreateEvent {
                tenant_id: Some(TenantId::new()),
                title: "Launch party".to_string(),
                description: None,
                date: now + Duration::hours(4),
                min_age_to_register: 0,
            },
            None,
            now,
        )
        .unwrap()
    }

    #[test]
    fn get_missing_event_is_not_found() {
        let manager = EventManager::new(
            NullEventStore,
            RacingRegistrationStore,
            InMemorySink::new(),
        );

        let err = manager.get(None, EventId::new()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn constraint_violation_translates_to_already_registered() {
        let now = Utc::now();
        let manager = EventManager::new(
            NullEventStore,
            RacingRegistrationStore,
            InMemorySink::new(),
        );
        let event = test_event(now);
        let attendee = Attendee {
            id: UserId::new(),
            age: 30,
        };

        let err = manager.register(&event, &attendee, now).unwrap_err();
        assert_eq!(err, DomainError::AlreadyRegistered);
    }

    #[test]
    fn storage_failures_surface_as_persistence_errors() {
        let now = Utc::now();
        let manager = EventManager::new(
            NullEventStore,
            BrokenRegistrationStore,
            InMemorySink::new(),
        );
        let event = test_event(now);
        let attendee = Attendee {
            id: UserId::new(),
            age: 30,
        };

        let err = manager.register(&event, &attendee, now).unwrap_err();
        match err {
            DomainError::Persistence(_) => {}
            other => panic!("expected Persistence error, got {other:?}"),
        }
    }

    #[test]
    fn losing_cancel_maps_to_concurrent_modification_and_leaves_event_untouched() {
        let now = Utc::now();
        let manager = EventManager::new(
            StaleEventStore,
            RacingRegistrationStore,
            InMemorySink::new(),
        );
        let mut event = test_event(now);
        let version_before = event.version();

        let err = manager.cancel(&mut event, None, now).unwrap_err();
        match err {
            DomainError::ConcurrentModification(_) => {}
            other => panic!("expected ConcurrentModification, got {other:?}"),
        }

        assert!(!event.is_cancelled());
        assert_eq!(event.version(), version_before);
        assert!(event.take_notifications().is_empty());
    }

    #[test]
    fn cancel_publishes_exactly_one_notification() {
        let now = Utc::now();
        let sink: InMemorySink<EventNotification> = InMemorySink::new();
        let subscription = sink.subscribe();
        let manager = EventManager::new(NullEventStore, RacingRegistrationStore, sink);
        let mut event = test_event(now);

        manager.cancel(&mut event, None, now).unwrap();
        assert!(event.is_cancelled());

        let EventNotification::EventCancelled(n) = subscription.try_recv().unwrap();
        assert_eq!(n.event_id, event.id_typed());
        assert!(subscription.try_recv().is_err());
    }

    #[test]
    fn sink_failure_does_not_fail_cancel() {
        let now = Utc::now();
        let manager = EventManager::new(NullEventStore, RacingRegistrationStore, DeadSink);
        let mut event = test_event(now);

        manager.cancel(&mut event, None, now).unwrap();
        assert!(event.is_cancelled());
    }

    #[test]
    fn reschedule_conflict_leaves_event_untouched() {
        let now = Utc::now();
        let manager = EventManager::new(
            StaleEventStore,
            RacingRegistrationStore,
            InMemorySink::new(),
        );
        let mut event = test_event(now);
        let date_before = event.date();

        let err = manager
            .reschedule(&mut event, now + Duration::hours(8), None, now)
            .unwrap_err();
        match err {
            DomainError::ConcurrentModification(_) => {}
            other => panic!("expected ConcurrentModification, got {other:?}"),
        }
        assert_eq!(event.date(), date_before);
    }
}
