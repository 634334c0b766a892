//! The versioned policy store.
//!
//! Quote computations read an immutable `Arc<PolicySnapshot>`; admin
//! edits clone the active snapshot, apply the change, validate the result
//! wholesale, and only then swap it in under a bumped version. A broken
//! edit never replaces a working policy, and in-flight computations keep
//! the snapshot they started with.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use merlin_catalog::QuestionCatalog;
use merlin_policy::audit::AuditLog;
use merlin_policy::snapshot::PolicySnapshot;

use crate::error::BridgeResult;

pub struct PolicyStore {
    base_version: String,
    revision: u64,
    snapshot: Arc<PolicySnapshot>,
    history: Vec<Arc<PolicySnapshot>>,
    /// Shared margin audit log, appended by the pricing pipeline.
    pub audit: Arc<AuditLog>,
    catalog: Option<QuestionCatalog>,
}

impl PolicyStore {
    /// Build a store around a snapshot, validating it first.
    pub fn new(snapshot: PolicySnapshot) -> BridgeResult<Self> {
        snapshot.validate()?;
        Ok(Self {
            base_version: snapshot.version.clone(),
            revision: 0,
            snapshot: Arc::new(snapshot),
            history: Vec::new(),
            audit: Arc::new(AuditLog::new()),
            catalog: None,
        })
    }

    pub fn with_catalog(mut self, catalog: QuestionCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn active_version(&self) -> &str {
        &self.snapshot.version
    }

    pub fn catalog(&self) -> Option<&QuestionCatalog> {
        self.catalog.as_ref()
    }

    pub fn catalog_mut(&mut self) -> Option<&mut QuestionCatalog> {
        self.catalog.as_mut()
    }

    /// Apply an edit to a copy of the active snapshot. The edited
    /// snapshot is validated wholesale; on success it becomes active
    /// under a new revision and the previous snapshot is retained in
    /// history. On failure the active snapshot is untouched.
    pub fn apply<F>(&mut self, edit: F) -> BridgeResult<String>
    where
        F: FnOnce(&mut PolicySnapshot),
    {
        let mut next = (*self.snapshot).clone();
        edit(&mut next);
        next.version = format!("{}.r{}", self.base_version, self.revision + 1);
        next.validate()?;

        self.history.push(Arc::clone(&self.snapshot));
        self.revision += 1;
        self.snapshot = Arc::new(next);
        log::info!("policy updated to version {}", self.snapshot.version);
        Ok(self.snapshot.version.clone())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Structured summary for administrators.
    pub fn status(&self) -> PolicyStatus {
        let validation_error = self.snapshot.validate().err().map(|e| e.to_string());
        PolicyStatus {
            version: self.snapshot.version.clone(),
            revision: self.revision,
            band_count: self.snapshot.bands.len(),
            product_policy_count: self.snapshot.product_policies.len(),
            risk_level_count: self.snapshot.risk_adjusters.len(),
            segment_count: self.snapshot.segment_adjusters.len(),
            guard_count: self.snapshot.guards.guards.len(),
            tier_count: self.snapshot.price_tiers.tiers.len(),
            audit_entries: self.audit.len(),
            valid: validation_error.is_none(),
            validation_error,
        }
    }
}

/// Admin-facing policy summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStatus {
    pub version: String,
    pub revision: u64,
    pub band_count: usize,
    pub product_policy_count: usize,
    pub risk_level_count: usize,
    pub segment_count: usize,
    pub guard_count: usize,
    pub tier_count: usize,
    pub audit_entries: usize,
    pub valid: bool,
    pub validation_error: Option<String>,
}

impl PolicyStatus {
    /// Render a terse text summary for admin tooling.
    pub fn to_admin_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "[POLICY {} | revision {}]",
            self.version, self.revision
        ));
        lines.push(format!(
            "Bands: {} | Product policies: {} | Risk levels: {} | Segments: {}",
            self.band_count, self.product_policy_count, self.risk_level_count, self.segment_count
        ));
        lines.push(format!(
            "Price guards: {} | Unit price tiers: {} | Audit entries: {}",
            self.guard_count, self.tier_count, self.audit_entries
        ));
        match &self.validation_error {
            None => lines.push("Status: valid".into()),
            Some(err) => lines.push(format!("Status: INVALID: {err}")),
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_policy::bands::{BandTable, MarginBand};

    fn snapshot() -> PolicySnapshot {
        PolicySnapshot {
            version: "2026-08.v3".into(),
            bands: BandTable {
                bands: vec![MarginBand {
                    id: "all".into(),
                    min_total: 0.0,
                    max_total: None,
                    margin_min: 0.10,
                    margin_max: 0.25,
                    margin_target: 0.18,
                    description: String::new(),
                }],
            },
            ..PolicySnapshot::default()
        }
    }

    #[test]
    fn store_validates_initial_snapshot() {
        assert!(PolicyStore::new(snapshot()).is_ok());
        let broken = PolicySnapshot::default(); // empty band table
        assert!(PolicyStore::new(broken).is_err());
    }

    #[test]
    fn apply_bumps_version_and_keeps_history() {
        let mut store = PolicyStore::new(snapshot()).unwrap();
        assert_eq!(store.active_version(), "2026-08.v3");

        let version = store
            .apply(|s| s.bands.bands[0].margin_target = 0.17)
            .unwrap();
        assert_eq!(version, "2026-08.v3.r1");
        assert_eq!(store.revision(), 1);
        assert_eq!(store.history_len(), 1);
        assert!((store.snapshot().bands.bands[0].margin_target - 0.17).abs() < 1e-12);
    }

    #[test]
    fn failed_apply_leaves_active_snapshot_untouched() {
        let mut store = PolicyStore::new(snapshot()).unwrap();
        let err = store.apply(|s| s.bands.bands.clear());
        assert!(err.is_err());
        assert_eq!(store.active_version(), "2026-08.v3");
        assert_eq!(store.revision(), 0);
        assert_eq!(store.snapshot().bands.len(), 1);
    }

    #[test]
    fn status_reports_table_sizes() {
        let store = PolicyStore::new(snapshot()).unwrap();
        let status = store.status();
        assert!(status.valid);
        assert_eq!(status.band_count, 1);
        assert_eq!(status.audit_entries, 0);
        let summary = status.to_admin_summary();
        assert!(summary.contains("2026-08.v3"));
        assert!(summary.contains("Status: valid"));
    }
}
