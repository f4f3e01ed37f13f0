//! Shared test doubles for exporter integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use courier::adapters::sender::{SendOutcome, Sender};
use courier::core::persist::{PersistentQueue, QueueStats};
use courier::domain::{Batch, Envelope, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Sender that replays a fixed script of outcomes and records every call
///
/// Once the script is exhausted it keeps returning `fallback`.
pub struct ScriptedSender {
    script: Mutex<VecDeque<SendOutcome>>,
    fallback: SendOutcome,
    sent: Mutex<Vec<Batch>>,
    redirects: Mutex<Vec<String>>,
    shut_down: AtomicBool,
}

impl ScriptedSender {
    pub fn new(script: Vec<SendOutcome>) -> Self {
        Self::with_fallback(script, SendOutcome::status(200))
    }

    pub fn always(outcome: SendOutcome) -> Self {
        Self::with_fallback(Vec::new(), outcome)
    }

    pub fn with_fallback(script: Vec<SendOutcome>, fallback: SendOutcome) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            sent: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn sent(&self) -> Vec<Batch> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sender for ScriptedSender {
    async fn send(&self, batch: &Batch) -> SendOutcome {
        self.sent.lock().unwrap().push(batch.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn handle_permanent_redirect(&self, location: &str) -> Result<()> {
        self.redirects.lock().unwrap().push(location.to_string());
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory queue; `accepting = false` makes every push fail
pub struct MemoryQueue {
    batches: Mutex<VecDeque<Batch>>,
    accepting: bool,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            accepting: true,
        }
    }

    pub fn full() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            accepting: false,
        }
    }

    pub fn pushed(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait]
impl PersistentQueue for MemoryQueue {
    async fn push(&self, batch: &Batch) -> bool {
        if !self.accepting {
            return false;
        }
        self.batches.lock().unwrap().push_back(batch.clone());
        true
    }

    async fn shift(&self) -> Result<Option<Batch>> {
        Ok(self.batches.lock().unwrap().pop_front())
    }

    async fn stats(&self) -> Result<QueueStats> {
        Ok(QueueStats {
            records: self.batches.lock().unwrap().len(),
            bytes: 0,
        })
    }
}

/// Batch of `size` envelopes named `evt-0`, `evt-1`, ...
pub fn batch_of(size: usize) -> Batch {
    Batch::new(
        (0..size)
            .map(|i| Envelope::new(format!("evt-{i}")).with_instrumentation_key("ikey-test"))
            .collect(),
    )
}

pub fn names(batch: &Batch) -> Vec<String> {
    batch.iter().map(|e| e.name.clone()).collect()
}

pub fn redirect_to(location: &str) -> SendOutcome {
    SendOutcome::Redirect {
        status: 307,
        location: Some(location.to_string()),
    }
}
