//! Event Bus (C7). See §4.7.
//!
//! Grounded in the teacher's `StewardshipState` (`api/stewardship_routes.rs`):
//! a double-checked `RwLock<HashMap<Uuid, broadcast::Sender<_>>>` giving
//! one bounded channel per job. Slow subscribers are dropped (the
//! `broadcast` channel's lag semantics) rather than blocking publishers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::events::types::{EventKind, JobEvent};

const CHANNEL_CAPACITY: usize = 16;

struct JobChannel {
    tx: broadcast::Sender<JobEvent>,
    next_seq: AtomicU64,
    dropped_subscribers: AtomicU64,
}

#[derive(Clone)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Uuid, Arc<JobChannel>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn get_or_create(&self, job_id: Uuid) -> Arc<JobChannel> {
        {
            let channels = self.channels.read().await;
            if let Some(ch) = channels.get(&job_id) {
                return ch.clone();
            }
        }
        let mut channels = self.channels.write().await;
        channels
            .entry(job_id)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
                Arc::new(JobChannel {
                    tx,
                    next_seq: AtomicU64::new(1),
                    dropped_subscribers: AtomicU64::new(0),
                })
            })
            .clone()
    }

    pub async fn publish(&self, job_id: Uuid, kind: EventKind) -> JobEvent {
        let channel = self.get_or_create(job_id).await;
        let seq = channel.next_seq.fetch_add(1, Ordering::SeqCst);
        let event = JobEvent {
            job_id,
            seq,
            at: Utc::now(),
            kind,
        };
        // Best-effort: no subscribers is not an error.
        let _ = channel.tx.send(event.clone());
        event
    }

    pub async fn subscribe(&self, job_id: Uuid) -> broadcast::Receiver<JobEvent> {
        self.get_or_create(job_id).await.tx.subscribe()
    }

    /// Called by the SSE layer when a subscriber lags and misses events.
    pub async fn record_dropped_subscriber(&self, job_id: Uuid) {
        let channel = self.get_or_create(job_id).await;
        channel.dropped_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn dropped_subscriber_count(&self, job_id: Uuid) -> u64 {
        let channel = self.get_or_create(job_id).await;
        channel.dropped_subscribers.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_numbers_are_monotonic_per_job() {
        let bus = EventBus::new();
        let job_id = Uuid::new_v4();
        let e1 = bus.publish(job_id, EventKind::JobSucceeded).await;
        let e2 = bus.publish(job_id, EventKind::JobSucceeded).await;
        assert_eq!(e1.seq, 1);
        assert_eq!(e2.seq, 2);
    }

    #[tokio::test]
    async fn separate_jobs_have_independent_sequences() {
        let bus = EventBus::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ea = bus.publish(a, EventKind::JobSucceeded).await;
        let eb = bus.publish(b, EventKind::JobSucceeded).await;
        assert_eq!(ea.seq, 1);
        assert_eq!(eb.seq, 1);
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let job_id = Uuid::new_v4();
        let mut rx = bus.subscribe(job_id).await;
        bus.publish(job_id, EventKind::JobCancelled).await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event.kind, EventKind::JobCancelled));
    }
}
