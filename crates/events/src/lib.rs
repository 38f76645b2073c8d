//! `eventcloud-events` — event management domain.
//!
//! Tenants create events, users register and cancel registrations, organizers
//! cancel events subject to time-based rules. Entities own their invariants;
//! the [`EventManager`] orchestrates persistence-aware operations across them.
//!
//! All time- and identity-dependent operations take explicit `now`/actor
//! arguments; there is no ambient clock or session state anywhere in the crate.

pub mod event;
pub mod manager;
pub mod notifications;
pub mod registration;
pub mod store;

pub use event::{CreateEvent, Event, EventRecord};
pub use manager::EventManager;
pub use notifications::{EventCancelled, EventNotification};
pub use registration::{Attendee, Registration, RegistrationRecord};
pub use store::{EventListing, EventStore, RegistrationStore, StoreError};
