//! Audit metadata: creation/modification tracking and soft deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Audit trail carried by every persisted entity.
///
/// Deletion is soft: rows are flagged, never physically dropped. Filtering
/// deleted rows out of reads is the persistence collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMeta {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<UserId>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
}

impl AuditMeta {
    /// Fresh audit metadata for a newly created entity.
    pub fn new(now: DateTime<Utc>, actor: Option<UserId>) -> Self {
        Self {
            created_at: now,
            created_by: actor,
            modified_at: None,
            modified_by: None,
            deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Record a mutation.
    pub fn touch(&mut self, now: DateTime<Utc>, actor: Option<UserId>) {
        self.modified_at = Some(now);
        self.modified_by = actor;
    }

    /// Flag the entity as deleted (soft delete).
    pub fn mark_deleted(&mut self, now: DateTime<Utc>, actor: Option<UserId>) {
        self.deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = actor;
    }
}
