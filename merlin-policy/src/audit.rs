//! The margin audit log.
//!
//! One immutable entry per quote computation: inputs, resolved band,
//! adjuster identifiers, every clamp event, the resulting blended margin,
//! and the policy version active at computation time so the result stays
//! reproducible after later policy edits. Entries are append-only and
//! never mutated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::guards::ClampEvent;

/// Immutable record of one margin computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginAuditEntry {
    /// Assigned by the log on append, e.g. "MA-000001".
    pub entry_id: String,
    pub request_id: String,
    pub policy_version: String,
    /// RFC 3339 timestamp, supplied by the caller at computation time.
    pub recorded_at: String,
    pub total_base_cost: f64,
    pub total_sell_price: f64,
    pub blended_margin: f64,
    pub band_id: String,
    pub risk_level: String,
    pub segment: String,
    pub line_count: usize,
    pub clamp_events: Vec<ClampEvent>,
    pub warnings: Vec<String>,
}

/// Append-only store of audit entries with sequential ids.
///
/// The only shared mutable state in the engine; a mutex suffices because
/// appends are rare (one per quote) and tiny.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<MarginAuditEntry>>,
    next_seq: AtomicU64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, assigning its id. Returns the assigned id.
    pub fn append(&self, mut entry: MarginAuditEntry) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        entry.entry_id = format!("MA-{seq:06}");
        let id = entry.entry_id.clone();
        self.lock().push(entry);
        id
    }

    pub fn get(&self, entry_id: &str) -> Option<MarginAuditEntry> {
        self.lock().iter().find(|e| e.entry_id == entry_id).cloned()
    }

    /// Most recent entry for a request id, if any.
    pub fn find_by_request(&self, request_id: &str) -> Option<MarginAuditEntry> {
        self.lock()
            .iter()
            .rev()
            .find(|e| e.request_id == request_id)
            .cloned()
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<MarginAuditEntry> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MarginAuditEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            log::warn!("audit log lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
