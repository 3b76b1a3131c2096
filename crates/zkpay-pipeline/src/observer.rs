//! # Stage Observers
//!
//! Receivers for the stage-event stream. Observers are called inline from
//! the pipeline, so they must not block: the channel observer uses an
//! unbounded sender and ignores a closed receiver.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use zkpay_core::ProcessId;

use crate::stage::{StageEvent, StageStatus};

pub trait StageObserver: Send + Sync {
    fn observe(&self, event: &StageEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn observe(&self, event: &StageEvent) {
        match event.status {
            StageStatus::Failed => tracing::warn!(
                process_id = %event.process_id,
                stage = %event.stage,
                status = %event.status,
                payload = %event.payload,
                "stage failed"
            ),
            _ => tracing::info!(
                process_id = %event.process_id,
                stage = %event.stage,
                status = %event.status,
                payload = %event.payload,
                "stage transition"
            ),
        }
    }
}

/// Sends events over an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StageEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StageObserver for ChannelObserver {
    fn observe(&self, event: &StageEvent) {
        // The receiver going away does not affect the run.
        let _ = self.tx.send(event.clone());
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<StageEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, process_id: ProcessId) -> Vec<StageEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.process_id == process_id)
            .cloned()
            .collect()
    }
}

impl StageObserver for MemoryObserver {
    fn observe(&self, event: &StageEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Delivers each event to several observers, in order.
#[derive(Default, Clone)]
pub struct FanoutObserver {
    observers: Vec<Arc<dyn StageObserver>>,
}

impl FanoutObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for FanoutObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl StageObserver for FanoutObserver {
    fn observe(&self, event: &StageEvent) {
        for observer in &self.observers {
            observer.observe(event);
        }
    }
}
