use crate::core::error::StorageError;
use crate::models::activity::ActivityLogEntry;
use crate::utils::time::current_timestamp;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only audit trail.
///
/// Appends never reject duplicate content; the only failure mode is the
/// store being unreachable, which callers on login/logout/settings paths
/// treat as non-fatal for the primary action.
pub trait ActivityLedger: Send + Sync {
    fn record(
        &self,
        user_id: u32,
        action: &str,
        details: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<u64, StorageError>;

    /// Most-recent-first, bounded by `limit`.
    fn list_for_user(&self, user_id: u32, limit: usize) -> Result<Vec<ActivityLogEntry>, StorageError>;

    /// Most-recent-first across all users, bounded by `limit`.
    fn list_all(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StorageError>;

    /// Delete entries strictly older than `now - max_age_secs`; returns
    /// the number removed. Safe to run concurrently with appends.
    fn prune_older_than(&self, max_age_secs: i64) -> Result<usize, StorageError>;
}

pub struct MemoryActivityStore {
    entries: DashMap<u64, ActivityLogEntry>,
    next_id: AtomicU64,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append with an explicit timestamp (bot-pushed entries, tests).
    pub fn record_at(
        &self,
        user_id: u32,
        action: &str,
        details: Option<&str>,
        ip_address: Option<&str>,
        timestamp: i64,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.entries.insert(
            id,
            ActivityLogEntry {
                id,
                user_id,
                action: action.to_string(),
                details: details.map(str::to_string),
                ip_address: ip_address.map(str::to_string),
                timestamp,
            },
        );

        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_sorted<F>(&self, filter: F, limit: usize) -> Vec<ActivityLogEntry>
    where
        F: Fn(&ActivityLogEntry) -> bool,
    {
        let mut entries: Vec<ActivityLogEntry> = self
            .entries
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        entries.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        entries.truncate(limit);
        entries
    }
}

impl Default for MemoryActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLedger for MemoryActivityStore {
    fn record(
        &self,
        user_id: u32,
        action: &str,
        details: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<u64, StorageError> {
        Ok(self.record_at(user_id, action, details, ip_address, current_timestamp()))
    }

    fn list_for_user(&self, user_id: u32, limit: usize) -> Result<Vec<ActivityLogEntry>, StorageError> {
        Ok(self.collect_sorted(|entry| entry.user_id == user_id, limit))
    }

    fn list_all(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StorageError> {
        Ok(self.collect_sorted(|_| true, limit))
    }

    fn prune_older_than(&self, max_age_secs: i64) -> Result<usize, StorageError> {
        let cutoff = current_timestamp() - max_age_secs;
        // Count inside the sweep; a length snapshot taken around the
        // retain can be skewed by concurrent appends.
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.timestamp >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
