//! Snapshot/restore bookkeeping for registries.
//!
//! A registry's state starts *unprotected*: names registered before the
//! first [`RegistryState::store`] become part of the baseline. After a
//! `store`, newly registered names land in the `new` set;
//! [`RegistryState::take_new`] hands them back for deletion and resets the
//! set, making restore idempotent with respect to the stored snapshot.

use std::collections::HashSet;

/// Tracks which registry keys belong to the stored baseline and which were
/// added after the most recent snapshot.
#[derive(Debug, Default)]
pub struct RegistryState {
    /// Keys present at the moment of the last snapshot.
    baseline: HashSet<String>,
    /// Keys registered since the last snapshot.
    new: HashSet<String>,
    /// Whether a snapshot has been taken.
    protected: bool,
}

impl RegistryState {
    /// Create an empty, unprotected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration.
    pub fn add(&mut self, key: &str) {
        if self.protected {
            self.new.insert(key.to_string());
        } else {
            self.baseline.insert(key.to_string());
        }
    }

    /// Fold the new keys into the baseline and start protecting.
    pub fn store(&mut self) {
        self.baseline.extend(self.new.drain());
        self.protected = true;
    }

    /// Hand back the keys added since the last snapshot and reset the set.
    pub fn take_new(&mut self) -> Vec<String> {
        let keys: Vec<String> = self.new.drain().collect();
        self.protected = true;
        keys
    }

    /// Keys in the stored baseline.
    #[must_use]
    pub fn baseline_len(&self) -> usize {
        self.baseline.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
