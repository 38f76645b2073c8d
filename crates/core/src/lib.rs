//! `eventcloud-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod audit;
pub mod concurrency;
pub mod entity;
pub mod error;
pub mod id;

pub use audit::AuditMeta;
pub use concurrency::ExpectedVersion;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EventId, RegistrationId, TenantId, UserId};
