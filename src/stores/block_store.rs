use crate::models::block::{DeliveryBlockLog, NewDeliveryBlockLog};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory store for delivery block outcomes pushed by the bot.
pub struct BlockStore {
    blocks: DashMap<u64, DeliveryBlockLog>,
    next_id: AtomicU64,
}

impl BlockStore {
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn record(&self, new_log: NewDeliveryBlockLog) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.blocks.insert(
            id,
            DeliveryBlockLog {
                id,
                user_id: new_log.user_id,
                block_id: new_log.block_id,
                pickup_location: new_log.pickup_location,
                delivery_location: new_log.delivery_location,
                payout: new_log.payout,
                result: new_log.result,
                timestamp: new_log.timestamp,
            },
        );

        id
    }

    /// A user's block logs, most-recent-first, bounded by `limit`.
    pub fn list_for_user(&self, user_id: u32, limit: usize) -> Vec<DeliveryBlockLog> {
        let mut logs: Vec<DeliveryBlockLog> = self
            .blocks
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        logs.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        logs.truncate(limit);
        logs
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}
