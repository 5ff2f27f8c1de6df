//! ISR-safe scheduler wrapper using critical sections.
//!
//! Provides [`SharedHalDma`] so thread mode can submit while the DMA
//! interrupt completes. Each operation holds the critical section only for
//! its own O(1) list update; completion actions run after it is released.

use super::primitives::CriticalSectionCell;
use crate::driver::config::{HalDmaConfig, Queue, TransferStatus};
use crate::driver::descriptor::{Completion, DescHandle};
use crate::driver::error::{DmaResult, Result, SubmitError};
use crate::driver::scheduler::HalDma;
use crate::driver::stats::DmaStats;
use crate::hal::engine::DmaEngine;
use crate::internal::constants::DEFAULT_POOL_SIZE;

/// ISR-safe [`HalDma`] wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of each call.
///
/// # Example
///
/// ```ignore
/// static DMA: SharedHalDma<LmacEngine, Callback<u16>> =
///     SharedHalDma::new(LmacEngine::new(), HalDmaConfig::new());
///
/// DMA.initialize().unwrap();
///
/// if let Some(handle) = DMA.acquire() {
///     DMA.submit(handle, Queue::Prog1, desc_addr, Callback::new(rx_done, 0)).ok();
/// }
///
/// #[interrupt]
/// fn DMA_IRQ() {
///     DMA.service(Queue::Prog1, TransferStatus::Success).ok();
/// }
/// ```
pub struct SharedHalDma<E: DmaEngine, C, const N: usize = DEFAULT_POOL_SIZE> {
    inner: CriticalSectionCell<HalDma<E, C, N>>,
}

impl<E: DmaEngine, C, const N: usize> SharedHalDma<E, C, N> {
    /// Create a new shared scheduler (const, suitable for static initialization).
    pub const fn new(engine: E, config: HalDmaConfig) -> Self {
        Self {
            inner: CriticalSectionCell::new(HalDma::new(engine, config)),
        }
    }

    /// Execute a closure with exclusive access to the scheduler.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut HalDma<E, C, N>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut HalDma<E, C, N>) -> R,
    {
        self.inner.try_with(f)
    }

    /// See [`HalDma::initialize`]
    pub fn initialize(&self) -> Result<()> {
        self.inner.with(HalDma::initialize)
    }

    /// See [`HalDma::teardown`]
    pub fn teardown(&self) -> Result<()> {
        self.inner.with(HalDma::teardown)
    }

    /// See [`HalDma::acquire`]
    pub fn acquire(&self) -> Option<DescHandle> {
        self.inner.with(HalDma::acquire)
    }

    /// See [`HalDma::try_acquire`]
    pub fn try_acquire(&self) -> Result<DescHandle> {
        self.inner.with(HalDma::try_acquire)
    }

    /// See [`HalDma::release`]
    pub fn release(&self, handle: DescHandle) -> Result<()> {
        self.inner.with(|dma| dma.release(handle))
    }

    /// See [`HalDma::submit`]
    pub fn submit(
        &self,
        handle: DescHandle,
        queue: Queue,
        payload: E::Payload,
        completion: C,
    ) -> core::result::Result<(), SubmitError> {
        self.inner.with(|dma| dma.submit(handle, queue, payload, completion))
    }

    /// See [`HalDma::push`]
    pub fn push(&self, handle: DescHandle, queue: Queue) -> core::result::Result<(), SubmitError> {
        self.inner.with(|dma| dma.push(handle, queue))
    }

    /// Snapshot of the event counters
    pub fn stats(&self) -> DmaStats {
        self.inner.with_ref(HalDma::stats)
    }

    /// Wrappers available to `acquire`
    pub fn free_count(&self) -> usize {
        self.inner.with_ref(HalDma::free_count)
    }

    /// Descriptors linked into `queue`
    pub fn in_flight(&self, queue: Queue) -> usize {
        self.inner.with_ref(|dma| dma.in_flight(queue))
    }
}

impl<E: DmaEngine, C: Completion, const N: usize> SharedHalDma<E, C, N> {
    /// Complete the head of `queue`.
    ///
    /// The descriptor is unlinked and recycled inside the critical section;
    /// its completion runs after the section ends and may submit again.
    pub fn on_completion(&self, queue: Queue, status: TransferStatus) -> DmaResult<()> {
        if let Some(completion) = self.inner.with(|dma| dma.retire(queue))? {
            completion.complete(status);
        }
        Ok(())
    }

    /// Interrupt entry; see [`HalDma::service`].
    ///
    /// Each descriptor is retired in its own critical section, so
    /// completions submitted from a callback are not drained by this call.
    pub fn service(&self, queue: Queue, status: TransferStatus) -> DmaResult<usize> {
        let due = self.inner.with(|dma| dma.due_completions(queue))?;
        for _ in 0..due {
            if let Err(e) = self.on_completion(queue, status) {
                self.inner.with(|dma| dma.resync_lli(queue));
                return Err(e);
            }
        }
        Ok(due as usize)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::ViolationPolicy;
    use crate::driver::error::{DmaError, Error, ProtocolError};
    use crate::testing::{CompletionLog, MockEngine, Recorder};

    fn shared<const N: usize>() -> SharedHalDma<MockEngine, Recorder, N> {
        let dma = SharedHalDma::new(MockEngine::new(), HalDmaConfig::new());
        dma.initialize().unwrap();
        dma
    }

    #[test]
    fn shared_round_trip() {
        let dma = shared::<2>();
        let log = CompletionLog::new();

        let a = dma.acquire().unwrap();
        let b = dma.acquire().unwrap();
        assert!(dma.acquire().is_none());
        dma.submit(a, Queue::Prog0, 1, log.recorder(1)).unwrap();
        dma.submit(b, Queue::Prog0, 2, log.recorder(2)).unwrap();
        assert_eq!(dma.in_flight(Queue::Prog0), 2);

        dma.on_completion(Queue::Prog0, TransferStatus::Success).unwrap();
        dma.on_completion(Queue::Prog0, TransferStatus::Success).unwrap();
        assert_eq!(log.ids(), [1, 2]);
        assert_eq!(dma.free_count(), 2);
        assert_eq!(dma.stats().completed, 2);
    }

    #[test]
    fn shared_spurious_completion() {
        let dma = shared::<2>();
        assert_eq!(
            dma.on_completion(Queue::Prog1, TransferStatus::Success),
            Err(DmaError::SpuriousCompletion)
        );
        assert_eq!(dma.stats().spurious, 1);
    }

    #[test]
    fn shared_service_drains_counter() {
        let dma: SharedHalDma<MockEngine, Recorder, 4> =
            SharedHalDma::new(MockEngine::with_lli_counters(), HalDmaConfig::new());
        dma.initialize().unwrap();
        let log = CompletionLog::new();
        for id in 1..=3 {
            let handle = dma.acquire().unwrap();
            dma.submit(handle, Queue::Prog1, id, log.recorder(id)).unwrap();
        }

        dma.with(|inner| inner.engine_mut().advance_lli(Queue::Prog1, 3));
        assert_eq!(dma.service(Queue::Prog1, TransferStatus::Success), Ok(3));
        assert_eq!(log.ids(), [1, 2, 3]);

        dma.with(|inner| inner.engine_mut().advance_lli(Queue::Prog1, 1));
        assert_eq!(
            dma.service(Queue::Prog1, TransferStatus::Success),
            Err(DmaError::SpuriousCompletion)
        );
        assert_eq!(dma.with(|inner| inner.lli_count(Queue::Prog1)), 4);
    }

    #[test]
    fn shared_service_ignores_lagging_counter() {
        let dma: SharedHalDma<MockEngine, Recorder, 4> =
            SharedHalDma::new(MockEngine::with_lli_counters(), HalDmaConfig::new());
        dma.initialize().unwrap();
        let log = CompletionLog::new();
        for id in 1..=3 {
            let handle = dma.acquire().unwrap();
            dma.submit(handle, Queue::Prog0, id, log.recorder(id)).unwrap();
        }

        dma.on_completion(Queue::Prog0, TransferStatus::Success).unwrap();
        assert_eq!(
            dma.service(Queue::Prog0, TransferStatus::Success),
            Err(DmaError::SpuriousCompletion)
        );
        assert_eq!(log.ids(), [1]);
        assert_eq!(dma.in_flight(Queue::Prog0), 2);
        assert_eq!(dma.with(|inner| inner.lli_count(Queue::Prog0)), 0);
    }

    #[test]
    fn shared_violation_reported() {
        let dma: SharedHalDma<MockEngine, Recorder, 2> = SharedHalDma::new(
            MockEngine::new(),
            HalDmaConfig::new().with_violation_policy(ViolationPolicy::Report),
        );
        assert_eq!(
            dma.try_acquire().err(),
            Some(Error::Protocol(ProtocolError::NotInitialized))
        );
        dma.initialize().unwrap();
        assert_eq!(
            dma.initialize(),
            Err(Error::Protocol(ProtocolError::AlreadyInitialized))
        );
    }

    #[test]
    fn shared_teardown() {
        let dma = shared::<2>();
        let handle = dma.acquire().unwrap();
        assert_eq!(dma.teardown(), Err(Error::Dma(DmaError::Busy)));
        dma.release(handle).unwrap();
        assert_eq!(dma.teardown(), Ok(()));
    }

    #[test]
    fn try_with_fails_while_borrowed() {
        let dma = shared::<2>();
        let nested = dma.with(|_| dma.try_with(|inner| inner.free_count()));
        assert_eq!(nested, None);
        assert_eq!(dma.try_with(|inner| inner.free_count()), Some(2));
    }

    #[test]
    fn completion_can_resubmit_into_freed_slot() {
        type Chain = SharedHalDma<MockEngine, fn(TransferStatus), 1>;
        static CHAIN: Chain = SharedHalDma::new(MockEngine::new(), HalDmaConfig::new());

        fn resubmit(_: TransferStatus) {
            // Single-slot pool: only succeeds if the finished wrapper is free already
            let handle = CHAIN.acquire().unwrap();
            CHAIN.submit(handle, Queue::Prog0, 2, finish).unwrap();
        }

        fn finish(_: TransferStatus) {}

        CHAIN.initialize().unwrap();
        let handle = CHAIN.acquire().unwrap();
        CHAIN.submit(handle, Queue::Prog0, 1, resubmit).unwrap();

        CHAIN
            .on_completion(Queue::Prog0, TransferStatus::Success)
            .unwrap();
        assert_eq!(CHAIN.in_flight(Queue::Prog0), 1);
        assert_eq!(CHAIN.stats().kicks, 2);
        let starts = CHAIN.with(|dma| dma.engine().starts.clone());
        assert_eq!(starts, [(Queue::Prog0, 1), (Queue::Prog0, 2)]);

        CHAIN
            .on_completion(Queue::Prog0, TransferStatus::Success)
            .unwrap();
        assert_eq!(CHAIN.free_count(), 1);
    }
}
