//! Test doubles for the scheduler.
//!
//! Provides a scripted [`DmaEngine`] that records every start and chain, and
//! a [`Recorder`] completion that logs the order completions ran in.

#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::driver::config::{Queue, TransferStatus};
use crate::driver::descriptor::Completion;
use crate::driver::error::EngineError;
use crate::hal::engine::DmaEngine;
use crate::internal::constants::QUEUE_COUNT;

// =============================================================================
// Mock Engine
// =============================================================================

/// Engine that records calls instead of touching hardware.
///
/// Payloads are plain `u32` tags so tests can match them against
/// completion ids.
#[derive(Debug, Default)]
pub struct MockEngine {
    /// `(queue, head)` for every `start`, in call order
    pub starts: Vec<(Queue, u32)>,
    /// `(queue, tail, next)` for every `chain`, in call order
    pub chains: Vec<(Queue, u32, u32)>,
    /// Error returned by the next `start` or `chain`
    pub fail_next: Option<EngineError>,
    /// Hardware LLI counters; `None` means the engine keeps none
    pub lli: [Option<u16>; QUEUE_COUNT],
}

impl MockEngine {
    /// Engine without LLI counters
    pub const fn new() -> Self {
        Self {
            starts: Vec::new(),
            chains: Vec::new(),
            fail_next: None,
            lli: [None; QUEUE_COUNT],
        }
    }

    /// Engine with LLI counters starting at zero
    pub const fn with_lli_counters() -> Self {
        let mut engine = Self::new();
        engine.lli = [Some(0); QUEUE_COUNT];
        engine
    }

    /// Make the next `start` or `chain` fail with `error`
    pub fn fail_next(&mut self, error: EngineError) {
        self.fail_next = Some(error);
    }

    /// Set the hardware LLI counter of `queue`
    pub fn set_lli(&mut self, queue: Queue, value: u16) {
        self.lli[queue.index()] = Some(value);
    }

    /// Pretend the hardware finished `count` more descriptors on `queue`
    pub fn advance_lli(&mut self, queue: Queue, count: u16) {
        let counter = self.lli[queue.index()].get_or_insert(0);
        *counter = counter.wrapping_add(count);
    }
}

impl DmaEngine for MockEngine {
    type Payload = u32;

    fn start(&mut self, queue: Queue, head: u32) -> Result<(), EngineError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.starts.push((queue, head));
        Ok(())
    }

    fn chain(&mut self, queue: Queue, tail: u32, next: u32) -> Result<(), EngineError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.chains.push((queue, tail, next));
        Ok(())
    }

    fn lli_counter(&self, queue: Queue) -> Option<u16> {
        self.lli[queue.index()]
    }
}

// =============================================================================
// Completion Recorder
// =============================================================================

/// Shared log of `(id, status)` pairs, appended as completions run.
#[derive(Debug, Clone, Default)]
pub struct CompletionLog(Arc<Mutex<Vec<(u32, TransferStatus)>>>);

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completion that appends `id` to this log when run
    pub fn recorder(&self, id: u32) -> Recorder {
        Recorder {
            id,
            log: self.clone(),
        }
    }

    pub fn entries(&self) -> Vec<(u32, TransferStatus)> {
        self.0.lock().unwrap().clone()
    }

    /// Completion ids in the order they ran
    pub fn ids(&self) -> Vec<u32> {
        self.entries().into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Completion that records its id into a [`CompletionLog`]
#[derive(Debug)]
pub struct Recorder {
    id: u32,
    log: CompletionLog,
}

impl Recorder {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Completion for Recorder {
    fn complete(self, status: TransferStatus) {
        self.log.0.lock().unwrap().push((self.id, status));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_engine_records_calls() {
        let mut engine = MockEngine::new();
        engine.start(Queue::Prog0, 1).unwrap();
        engine.chain(Queue::Prog0, 1, 2).unwrap();

        assert_eq!(engine.starts, [(Queue::Prog0, 1)]);
        assert_eq!(engine.chains, [(Queue::Prog0, 1, 2)]);
    }

    #[test]
    fn mock_engine_fails_once() {
        let mut engine = MockEngine::new();
        engine.fail_next(EngineError::Busy);

        assert_eq!(engine.start(Queue::Prog1, 1), Err(EngineError::Busy));
        assert_eq!(engine.start(Queue::Prog1, 1), Ok(()));
        assert_eq!(engine.starts.len(), 1);
    }

    #[test]
    fn mock_engine_lli_wraps() {
        let mut engine = MockEngine::with_lli_counters();
        engine.set_lli(Queue::Prog0, u16::MAX);
        engine.advance_lli(Queue::Prog0, 2);
        assert_eq!(engine.lli_counter(Queue::Prog0), Some(1));
        assert_eq!(engine.lli_counter(Queue::Prog1), Some(0));
    }

    #[test]
    fn recorder_logs_in_run_order() {
        let log = CompletionLog::new();
        let first = log.recorder(1);
        let second = log.recorder(2);
        assert_eq!(second.id(), 2);

        second.complete(TransferStatus::Error);
        first.complete(TransferStatus::Success);
        assert_eq!(
            log.entries(),
            [(2, TransferStatus::Error), (1, TransferStatus::Success)]
        );
        assert_eq!(log.len(), 2);
    }
}
