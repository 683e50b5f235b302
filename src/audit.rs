//! Append-only audit log with tamper-evident checksums
//!
//! Every engine action (cleaning, reconciling, detail generation) appends
//! one entry. The checksum is a truncated SHA-256 over the entry's other
//! fields; it makes accidental mutation visible but is not a security
//! control against an adversary who can rewrite the log wholesale.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::types::AuditError;

/// Length of the hex checksum prefix stored on each entry
const CHECKSUM_LEN: usize = 16;

/// Action name used for the fallback entry written when a details payload
/// cannot be serialized
pub const AUDIT_FALLBACK_ACTION: &str = "AUDIT_SERIALIZATION_FAILED";

/// A single immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// When the action happened (UTC)
    pub timestamp: NaiveDateTime,
    /// Short upper-case action name, e.g. `CLEAN_MANUAL`
    pub action: String,
    /// Structured payload describing the action
    pub details: Value,
    /// Who or what performed the action
    pub actor: String,
    /// Truncated SHA-256 over the other four fields
    pub checksum: String,
}

impl AuditLogEntry {
    /// Create an entry timestamped now
    pub fn new(action: impl Into<String>, details: Value, actor: impl Into<String>) -> Self {
        Self::at(chrono::Utc::now().naive_utc(), action, details, actor)
    }

    /// Create an entry with an explicit timestamp
    pub fn at(
        timestamp: NaiveDateTime,
        action: impl Into<String>,
        details: Value,
        actor: impl Into<String>,
    ) -> Self {
        let action = action.into();
        let actor = actor.into();
        let checksum = compute_checksum(&timestamp, &action, &details, &actor);
        Self {
            timestamp,
            action,
            details,
            actor,
            checksum,
        }
    }

    /// Recompute the checksum and compare it to the stored one
    pub fn verify(&self) -> bool {
        self.checksum == compute_checksum(&self.timestamp, &self.action, &self.details, &self.actor)
    }
}

fn compute_checksum(timestamp: &NaiveDateTime, action: &str, details: &Value, actor: &str) -> String {
    // `Value`'s Display is compact JSON with sorted object keys, which is
    // canonical enough for a deterministic digest
    let payload = format!("{timestamp}{action}{details}{actor}");
    let digest = Sha256::digest(payload.as_bytes());
    let hex = format!("{digest:x}");
    hex[..CHECKSUM_LEN].to_string()
}

/// Append-only sequence of audit entries for one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    actor: String,
    entries: Vec<AuditLogEntry>,
}

impl AuditLog {
    /// Create an empty log whose entries are attributed to `actor`
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            entries: Vec::new(),
        }
    }

    /// Record an action with a serializable details payload
    ///
    /// Serialization failure is fatal only to this call: a fallback entry
    /// naming the failed action is appended so the omission stays visible,
    /// and the error is returned for the caller to surface if it wants to.
    pub fn record<T: Serialize>(
        &mut self,
        action: &str,
        details: T,
    ) -> Result<&AuditLogEntry, AuditError> {
        match serde_json::to_value(details) {
            Ok(value) => Ok(self.push(action, value)),
            Err(err) => {
                let message = err.to_string();
                self.push(
                    AUDIT_FALLBACK_ACTION,
                    json!({ "action": action, "error": message }),
                );
                Err(AuditError::Serialization(err))
            }
        }
    }

    fn push(&mut self, action: &str, details: Value) -> &AuditLogEntry {
        let entry = AuditLogEntry::new(action, details, self.actor.clone());
        self.entries.push(entry);
        self.entries.last().expect("entry was just pushed")
    }

    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log, handing its entries to a result bundle
    pub fn into_entries(self) -> Vec<AuditLogEntry> {
        self.entries
    }
}
