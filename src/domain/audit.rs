//! Administrative audit trail.
//!
//! Append-only list of admin actions, newest first, capped at
//! [`MAX_AUDIT_ENTRIES`]. Entries are immutable; the only way to remove
//! them is eviction by the cap or an explicit clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of audit entries retained.
pub const MAX_AUDIT_ENTRIES: usize = 100;

/// A single recorded administrative action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Short action label (e.g. `Fee Updated`).
    pub action: String,
    /// Free-text description of the change.
    pub details: String,
    /// Acting role label (`Admin`, `System`).
    pub actor: String,
}

/// Bounded, newest-first audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Appends an entry, evicting the oldest beyond the cap.
    pub fn record(
        &mut self,
        action: impl Into<String>,
        details: impl Into<String>,
        actor: impl Into<String>,
    ) -> &AuditEntry {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action: action.into(),
            details: details.into(),
            actor: actor.into(),
        };
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_AUDIT_ENTRIES);
        &self.entries[0]
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&AuditEntry> {
        self.entries.first()
    }

    /// Removes every entry. Clearing is itself not recorded.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
