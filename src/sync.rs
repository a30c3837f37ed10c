//! Background block-number synchronization for live entities.
//!
//! Each entity (keyed by kind and id) may own one sync slot: a cached block
//! number and, while auto-sync runs, a tokio task refreshing it on a fixed
//! interval. The cached value is written only by that task.
//!
//! ```text
//! start(key) ──► spawn ─► tick (immediate) ─► get_block_number ─► store
//!                            ▲                                     │
//!                            └────────────── interval ◄────────────┘
//! stop(key)  ──► abort task (no-op when none is running)
//! drop       ──► abort every task
//! ```

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy::{primitives::U256, providers::Provider};
use dashmap::DashMap;
use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};

use crate::prelude::{LottoError, Result};

/// Identity of an on-chain entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: &'static str,
    pub id: U256,
}

/// Sentinel stored before the first successful sync.
const UNSYNCED: u64 = u64::MAX;

struct SyncSlot {
    block: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl Default for SyncSlot {
    fn default() -> Self {
        Self {
            block: Arc::new(AtomicU64::new(UNSYNCED)),
            task: None,
        }
    }
}

impl SyncSlot {
    fn block(&self) -> Option<u64> {
        match self.block.load(Ordering::Acquire) {
            UNSYNCED => None,
            block => Some(block),
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// Per-entity sync slots.
#[derive(Default)]
pub struct BlockSync {
    slots: DashMap<EntityKey, SyncSlot>,
}

impl BlockSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing `key`'s cached block every `interval`, first tick
    /// immediately. A running timer for the same key is replaced.
    ///
    /// Fails with `RuntimeUnavailable` outside of a tokio runtime.
    pub fn start<P>(&self, key: EntityKey, provider: P, interval: Duration) -> Result<()>
    where
        P: Provider + Clone + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| LottoError::RuntimeUnavailable)?;
        let mut slot = self.slots.entry(key).or_default();
        if let Some(previous) = slot.task.take() {
            previous.abort();
        }

        let block = slot.block.clone();
        slot.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match provider.get_block_number().await {
                    Ok(number) => {
                        block.store(number, Ordering::Release);
                        tracing::trace!(kind = key.kind, id = %key.id, block = number, "synced block");
                    }
                    Err(err) => {
                        tracing::warn!(kind = key.kind, id = %key.id, error = %err, "block sync failed");
                    }
                }
            }
        }));

        tracing::debug!(kind = key.kind, id = %key.id, ?interval, "auto-sync started");
        Ok(())
    }

    /// Cancel the timer of `key`. Safe to call repeatedly or for keys that
    /// never synced. The cached block is kept.
    pub fn stop(&self, key: &EntityKey) {
        let Some(mut slot) = self.slots.get_mut(key) else {
            return;
        };
        if let Some(task) = slot.task.take() {
            task.abort();
            tracing::debug!(kind = key.kind, id = %key.id, "auto-sync stopped");
        }
    }

    /// Cancel the timer of `key` and drop its slot, cached block included.
    /// Slots are otherwise kept for the lifetime of the client.
    pub fn forget(&self, key: &EntityKey) {
        if let Some((_, mut slot)) = self.slots.remove(key) {
            if let Some(task) = slot.task.take() {
                task.abort();
            }
            tracing::debug!(kind = key.kind, id = %key.id, "sync slot removed");
        }
    }

    /// Number of entities holding a slot, running or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn block(&self, key: &EntityKey) -> Option<u64> {
        self.slots.get(key).and_then(|slot| slot.block())
    }

    pub fn is_synced(&self, key: &EntityKey) -> bool {
        self.block(key).is_some()
    }

    pub fn is_running(&self, key: &EntityKey) -> bool {
        self.slots.get(key).is_some_and(|slot| slot.is_running())
    }

    /// Number of timers currently alive.
    pub fn running(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_running()).count()
    }

    /// Poll every `poll` until `key` has synced once and return the block.
    ///
    /// Fails with `NotSynchronized` if auto-sync was never started for `key`
    /// or was stopped before producing a value, since nothing would ever
    /// populate it.
    pub async fn wait_first(&self, key: &EntityKey, poll: Duration) -> Result<u64> {
        let mut ticker = tokio::time::interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // the slot guard must not be held across the await above
            let (block, running) = match self.slots.get(key) {
                Some(slot) => (slot.block(), slot.is_running()),
                None => (None, false),
            };
            match block {
                Some(block) => return Ok(block),
                None if !running => {
                    return Err(LottoError::NotSynchronized {
                        kind: key.kind,
                        id: key.id,
                    })
                }
                None => {}
            }
        }
    }
}

impl Drop for BlockSync {
    fn drop(&mut self) {
        for mut slot in self.slots.iter_mut() {
            if let Some(task) = slot.task.take() {
                task.abort();
            }
        }
    }
}
