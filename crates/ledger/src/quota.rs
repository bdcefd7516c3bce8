use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tinybatch_core::{CredentialStatus, CredentialUsage, KeyDetails, mask_credential};

use crate::error::{LedgerError, Result};
use crate::store;

/// On-disk shape of the quota record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaState {
    pub key_usage: BTreeMap<String, u64>,
    pub key_details: BTreeMap<String, KeyDetails>,
    pub current_key_index: usize,
    pub total_compressions: u64,
    pub last_run_time: Option<String>,
}

/// Credential selected for the next compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCredential {
    pub index: usize,
    pub credential: String,
}

/// Per-credential usage counters and the rotation pointer.
///
/// The configured credential list is read-only here; its order decides the
/// rotation order. Every mutation that reaches disk goes through
/// [`QuotaLedger::persist`].
#[derive(Debug)]
pub struct QuotaLedger {
    pub(crate) path: PathBuf,
    pub(crate) credentials: Vec<String>,
    pub(crate) state: QuotaState,
}

impl QuotaLedger {
    pub fn open(path: impl Into<PathBuf>, credentials: Vec<String>) -> Result<Self> {
        let path = path.into();
        let state = store::load_or_default(&path)?;
        Ok(Self {
            path,
            credentials,
            state,
        })
    }

    pub fn credentials(&self) -> &[String] {
        &self.credentials
    }

    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    pub fn active_index(&self) -> usize {
        self.state.current_key_index
    }

    pub fn total_compressions(&self) -> u64 {
        self.state.total_compressions
    }

    pub fn usage_count(&self, credential: &str) -> u64 {
        self.state.key_usage.get(credential).copied().unwrap_or(0)
    }

    pub fn usage(&self, credential: &str) -> CredentialUsage {
        let details = self
            .state
            .key_details
            .get(credential)
            .cloned()
            .unwrap_or_default();
        CredentialUsage {
            usage_count: self.usage_count(credential),
            first_used: details.first_used,
            last_used: details.last_used,
        }
    }

    pub fn persist(&self) -> Result<()> {
        store::write_json(&self.path, &self.state)
    }

    pub fn current_credential(&self) -> Result<ActiveCredential> {
        let index = self.state.current_key_index;
        match self.credentials.get(index) {
            Some(credential) => Ok(ActiveCredential {
                index,
                credential: credential.clone(),
            }),
            None => Err(LedgerError::Exhausted {
                configured: self.credentials.len(),
            }),
        }
    }

    /// Adds a zeroed entry for `credential` if it has none. Returns whether one was added.
    pub fn ensure_capacity(&mut self, credential: &str) -> bool {
        let mut added = false;
        if !self.state.key_usage.contains_key(credential) {
            self.state.key_usage.insert(credential.to_string(), 0);
            added = true;
        }
        if !self.state.key_details.contains_key(credential) {
            self.state
                .key_details
                .insert(credential.to_string(), KeyDetails::default());
            added = true;
        }
        added
    }

    /// Moves past every credential that has reached `max_per_credential`,
    /// starting at the active one. Fails once the list runs out.
    pub fn check_and_rotate(&mut self, max_per_credential: u64) -> Result<ActiveCredential> {
        let mut active = self.current_credential()?;
        let mut rotated = false;
        while self.usage_count(&active.credential) >= max_per_credential {
            tracing::info!(
                index = active.index + 1,
                limit = max_per_credential,
                "api key reached its compression limit"
            );
            self.state.current_key_index += 1;
            rotated = true;
            active = match self.current_credential() {
                Ok(next) => next,
                Err(err) => {
                    self.persist()?;
                    return Err(err);
                }
            };
        }
        self.ensure_capacity(&active.credential);
        if rotated {
            self.persist()?;
            tracing::info!(
                index = active.index + 1,
                configured = self.credentials.len(),
                "switched to next api key"
            );
        }
        Ok(active)
    }

    /// Counts one successful compression against `credential` and persists it.
    /// The in-memory state is restored if the write fails.
    pub fn record_success(&mut self, credential: &str, timestamp: &str) -> Result<u64> {
        let previous = self.state.clone();
        let count = {
            let usage = self
                .state
                .key_usage
                .entry(credential.to_string())
                .or_insert(0);
            *usage += 1;
            *usage
        };
        let details = self
            .state
            .key_details
            .entry(credential.to_string())
            .or_default();
        if details.first_used.is_none() {
            details.first_used = Some(timestamp.to_string());
        }
        details.last_used = Some(timestamp.to_string());
        self.state.total_compressions += 1;

        if let Err(err) = self.persist() {
            self.state = previous;
            return Err(err);
        }
        Ok(count)
    }

    pub fn record_run(&mut self, timestamp: &str) -> Result<()> {
        self.state.last_run_time = Some(timestamp.to_string());
        self.persist()
    }

    pub fn remaining(&self, credential: &str, max_per_credential: u64) -> u64 {
        max_per_credential.saturating_sub(self.usage_count(credential))
    }

    pub fn status(&self, max_per_credential: u64) -> Vec<CredentialStatus> {
        self.credentials
            .iter()
            .enumerate()
            .map(|(index, credential)| {
                let usage = self.usage(credential);
                let percent_used = if max_per_credential > 0 {
                    usage.usage_count as f64 / max_per_credential as f64 * 100.0
                } else {
                    0.0
                };
                CredentialStatus {
                    index,
                    masked: mask_credential(credential),
                    usage: usage.usage_count,
                    limit: max_per_credential,
                    remaining: max_per_credential as i64 - usage.usage_count as i64,
                    percent_used,
                    first_used: usage.first_used,
                    last_used: usage.last_used,
                    active: index == self.state.current_key_index,
                }
            })
            .collect()
    }
}
