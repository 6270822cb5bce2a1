//! Pacing of external calls and the per-address work list.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between consecutive calls to [`Pacer::wait`].
///
/// The first call returns immediately.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until at least `interval` has passed since the previous call.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let due = last + self.interval;
            if due > Instant::now() {
                sleep_until(due).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// One address to visit: a seed (by position in the seed file) and an
/// address index on its receive chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub seed_index: usize,
    pub address_index: u32,
}

/// FIFO of [`WorkItem`]s, seed by seed, addresses in ascending order.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: VecDeque<WorkItem>,
}

impl WorkQueue {
    pub fn new(seed_count: usize, addresses_per_seed: u32) -> Self {
        let items = (0..seed_count)
            .flat_map(|seed_index| {
                (0..addresses_per_seed).map(move |address_index| WorkItem {
                    seed_index,
                    address_index,
                })
            })
            .collect();
        Self { items }
    }

    pub fn pop(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Drop the remaining items of `seed_index`; returns how many were dropped.
    pub fn skip_seed(&mut self, seed_index: usize) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.seed_index != seed_index);
        before - self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
