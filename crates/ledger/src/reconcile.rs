use std::collections::HashSet;

use crate::error::Result;
use crate::quota::QuotaLedger;

/// Repairs applied by [`QuotaLedger::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Recorded usage belonged to a completely different key set and was dropped.
    pub credentials_replaced: bool,
    /// Number of keys no longer configured whose entries were removed.
    pub pruned: usize,
    /// Out-of-range active index that was reset to 0.
    pub index_reset_from: Option<usize>,
    /// Index selected because the active key was already at its limit.
    pub switched_to: Option<usize>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        !self.credentials_replaced
            && self.pruned == 0
            && self.index_reset_from.is_none()
            && self.switched_to.is_none()
    }
}

impl QuotaLedger {
    /// Aligns the loaded state with the configured keys. Each repair is
    /// persisted on its own so an interruption leaves a consistent file.
    pub fn reconcile(&mut self, max_per_credential: u64) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        self.reconcile_key_set(&mut report)?;
        self.repair_index_range(&mut report)?;
        self.repair_exhausted_active(max_per_credential, &mut report)?;
        Ok(report)
    }

    fn reconcile_key_set(&mut self, report: &mut ReconcileReport) -> Result<()> {
        let configured: HashSet<&str> = self.credentials.iter().map(String::as_str).collect();
        let overlaps = self
            .state
            .key_usage
            .keys()
            .any(|key| configured.contains(key.as_str()));

        if !overlaps {
            report.credentials_replaced = !self.state.key_usage.is_empty();
            if report.credentials_replaced {
                tracing::warn!("api keys were replaced, clearing per-key usage records");
            }
            self.state.key_usage.clear();
            self.state.key_details.clear();
            self.state.current_key_index = 0;
            return self.persist();
        }

        let stale: HashSet<String> = self
            .state
            .key_usage
            .keys()
            .chain(self.state.key_details.keys())
            .filter(|key| !configured.contains(key.as_str()))
            .cloned()
            .collect();
        if stale.is_empty() {
            return Ok(());
        }
        self.state.key_usage.retain(|key, _| !stale.contains(key));
        self.state.key_details.retain(|key, _| !stale.contains(key));
        report.pruned = stale.len();
        tracing::info!(removed = stale.len(), "removed entries for unconfigured api keys");
        self.persist()
    }

    fn repair_index_range(&mut self, report: &mut ReconcileReport) -> Result<()> {
        let index = self.state.current_key_index;
        if index >= self.credentials.len() && index != 0 {
            tracing::warn!(from = index, "active key index out of range, resetting to 0");
            self.state.current_key_index = 0;
            report.index_reset_from = Some(index);
            self.persist()?;
        }
        Ok(())
    }

    fn repair_exhausted_active(
        &mut self,
        max_per_credential: u64,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let Some(current) = self.credentials.get(self.state.current_key_index) else {
            return Ok(());
        };
        if self.usage_count(current) < max_per_credential {
            return Ok(());
        }
        let available = self
            .credentials
            .iter()
            .position(|key| self.usage_count(key) < max_per_credential);
        if let Some(index) = available {
            tracing::info!(
                index = index + 1,
                configured = self.credentials.len(),
                "active api key is used up, switching to an available one"
            );
            self.state.current_key_index = index;
            report.switched_to = Some(index);
            self.persist()?;
        }
        Ok(())
    }
}
