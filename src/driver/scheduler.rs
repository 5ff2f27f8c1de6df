//! Program-queue scheduler.
//!
//! This module contains the main [`HalDma`] structure and its operations:
//!
//! - Initialization and teardown
//! - Descriptor acquire/release (delegated to the pool)
//! - Submission onto the two program queues, arming the engine on the
//!   idle-to-active edge
//! - Completion handling, per interrupt or drained from the engine's LLI
//!   counter
//!
//! For interrupt-safe shared access, see
//! [`SharedHalDma`](crate::sync::SharedHalDma).

use super::config::{HalDmaConfig, Queue, State, TransferStatus, ViolationPolicy};
use super::descriptor::{Completion, DescHandle, DescriptorWrapper, Membership};
use super::error::{
    DmaError, DmaResult, Error, ProtocolError, ProtocolResult, Result, SubmitError,
};
use super::pool::DescriptorPool;
use super::stats::DmaStats;
use crate::hal::engine::DmaEngine;
use crate::internal::constants::{DEFAULT_POOL_SIZE, QUEUE_COUNT};
use crate::internal::list::IndexList;

/// Wrapper type a [`HalDma`] stores for engine `E` and completion `C`
pub type Descriptor<E, C> = DescriptorWrapper<<E as DmaEngine>::Payload, C>;

// =============================================================================
// DMA HAL
// =============================================================================

/// DMA descriptor pool and program-queue scheduler.
///
/// One instance exists per DMA engine. It owns `N` descriptor wrappers, two
/// FIFO program queues and the engine handle used to arm them.
///
/// # Type Parameters
/// * `E` - Hardware descriptor driver
/// * `C` - Completion action stored with each descriptor
/// * `N` - Number of descriptor wrappers (default 4)
///
/// # Example
/// ```ignore
/// static mut DMA: HalDma<LmacEngine, Callback<u16>> =
///     HalDma::new(LmacEngine::new(), HalDmaConfig::new());
///
/// let dma = unsafe { &mut *core::ptr::addr_of_mut!(DMA) };
/// dma.initialize()?;
///
/// let handle = dma.try_acquire()?;
/// dma.submit(handle, Queue::Prog0, desc_addr, Callback::new(tx_done, 3))
///     .map_err(Error::from)?;
///
/// // In the DMA interrupt:
/// dma.service(Queue::Prog0, TransferStatus::Success)?;
/// ```
///
/// Use [`SharedHalDma`](crate::sync::SharedHalDma) instead of `static mut`
/// when both thread mode and an interrupt touch the scheduler.
pub struct HalDma<E: DmaEngine, C, const N: usize = DEFAULT_POOL_SIZE> {
    /// Hardware descriptor driver
    engine: E,
    /// Current configuration
    config: HalDmaConfig,
    /// Wrapper arena and free-list
    pool: DescriptorPool<E::Payload, C, N>,
    /// Program queues, threaded through the pool's arena
    queues: [IndexList; QUEUE_COUNT],
    /// Descriptors linked per queue
    in_flight: [u16; QUEUE_COUNT],
    /// Software mirror of the engine's LLI completion counters
    lli_count: [u16; QUEUE_COUNT],
    /// Event counters
    stats: DmaStats,
    /// Lifecycle state
    state: State,
}

impl<E: DmaEngine, C, const N: usize> HalDma<E, C, N> {
    /// Create a new scheduler around `engine`.
    ///
    /// This is a const function suitable for static initialization.
    /// The scheduler starts `Uninitialized`; call [`initialize`](Self::initialize)
    /// once before use.
    pub const fn new(engine: E, config: HalDmaConfig) -> Self {
        Self {
            engine,
            config,
            pool: DescriptorPool::new(),
            queues: [IndexList::new(); QUEUE_COUNT],
            in_flight: [0; QUEUE_COUNT],
            lli_count: [0; QUEUE_COUNT],
            stats: DmaStats::new(),
            state: State::Uninitialized,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Populate the pool, empty both queues and snapshot the engine's LLI
    /// counters.
    ///
    /// Calling this on a ready scheduler is a protocol violation.
    pub fn initialize(&mut self) -> Result<()> {
        let policy = self.config.violation_policy;
        if self.state == State::Ready {
            return Err(violation(policy, ProtocolError::AlreadyInitialized).into());
        }
        self.pool
            .initialize()
            .map_err(|e| Error::from(violation(policy, e)))?;

        for queue in &mut self.queues {
            queue.clear();
        }
        self.in_flight = [0; QUEUE_COUNT];
        self.lli_count = [0; QUEUE_COUNT];
        if self.config.snapshot_lli_on_init {
            for queue in Queue::ALL {
                if let Some(count) = self.engine.lli_counter(queue) {
                    self.lli_count[queue.index()] = count;
                }
            }
        }
        self.stats = DmaStats::new();
        self.state = State::Ready;

        info!("DMA HAL initialized with {} descriptors", N);
        Ok(())
    }

    /// Return to the uninitialized state so `initialize` may run again.
    ///
    /// Fails with [`DmaError::Busy`] while any descriptor is queued or held.
    pub fn teardown(&mut self) -> Result<()> {
        self.ensure_ready()?;
        if !self.queues.iter().all(IndexList::is_empty) || self.pool.held_count() != 0 {
            warn!(
                "DMA HAL teardown refused: {} queued, {} held",
                self.queued_count(),
                self.pool.held_count()
            );
            return Err(DmaError::Busy.into());
        }

        self.pool.teardown()?;
        self.state = State::Uninitialized;

        info!("DMA HAL torn down");
        Ok(())
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Check if `initialize` has run
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.state == State::Ready
    }

    /// Get the current configuration
    #[inline(always)]
    pub fn config(&self) -> &HalDmaConfig {
        &self.config
    }

    /// Event counters since `initialize` or the last reset
    #[inline(always)]
    pub fn stats(&self) -> DmaStats {
        self.stats
    }

    /// Zero the event counters
    pub fn reset_stats(&mut self) {
        self.stats = DmaStats::new();
    }

    /// Number of descriptor wrappers
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Wrappers available to `acquire`
    #[inline(always)]
    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Wrappers borrowed by callers and not yet submitted or released
    #[inline(always)]
    pub fn held_count(&self) -> usize {
        self.pool.held_count()
    }

    /// Descriptors linked into `queue`
    #[inline(always)]
    pub fn in_flight(&self, queue: Queue) -> usize {
        self.in_flight[queue.index()] as usize
    }

    /// Descriptors linked into either queue
    pub fn queued_count(&self) -> usize {
        Queue::ALL.iter().map(|&q| self.in_flight(q)).sum()
    }

    /// Check if `queue` has nothing linked
    #[inline(always)]
    pub fn is_idle(&self, queue: Queue) -> bool {
        self.queues[queue.index()].is_empty()
    }

    /// Head of `queue`, the next descriptor the engine will complete
    pub fn peek(&self, queue: Queue) -> Option<&Descriptor<E, C>> {
        self.queues[queue.index()]
            .head()
            .map(|index| self.pool.slot(index))
    }

    /// Payloads linked into `queue`, head first.
    ///
    /// Lets the engine driver re-arm a queue from its head after a fault.
    pub fn payloads(&self, queue: Queue) -> impl Iterator<Item = E::Payload> + '_ {
        let slots = self.pool.slots();
        self.queues[queue.index()]
            .iter(slots)
            .filter_map(move |index| slots[index as usize].payload())
    }

    /// Where the descriptor named by `handle` currently lives
    pub fn membership(&self, handle: &DescHandle) -> Option<Membership> {
        self.pool.membership(handle)
    }

    /// Software LLI counter for `queue`
    #[inline(always)]
    pub fn lli_count(&self, queue: Queue) -> u16 {
        self.lli_count[queue.index()]
    }

    /// Descriptors the engine reports finished on `queue` that have not been
    /// completed yet. `None` if the engine keeps no LLI counter.
    pub fn pending_lli(&self, queue: Queue) -> Option<u16> {
        self.engine
            .lli_counter(queue)
            .map(|hw| hw.wrapping_sub(self.lli_count[queue.index()]))
    }

    /// Snap the software LLI counter to the engine's current value
    pub fn resync_lli(&mut self, queue: Queue) {
        let q = queue.index();
        if let Some(hw) = self.engine.lli_counter(queue) {
            debug!("LLI counter on {:?} resynced {} -> {}", queue, self.lli_count[q], hw);
            self.lli_count[q] = hw;
        }
    }

    /// Borrow the engine
    #[inline(always)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutably borrow the engine
    #[inline(always)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // =========================================================================
    // Descriptor Pool
    // =========================================================================

    /// Take a free descriptor.
    ///
    /// Returns `None` when the pool is exhausted. Never blocks.
    pub fn acquire(&mut self) -> Option<DescHandle> {
        if self.ensure_ready().is_err() {
            return None;
        }
        match self.pool.acquire() {
            Some(handle) => {
                trace!("acquired descriptor {}", handle.index());
                Some(handle)
            }
            None => {
                self.stats.record_exhausted();
                debug!("descriptor pool exhausted");
                None
            }
        }
    }

    /// Take a free descriptor, failing with
    /// [`DmaError::NoDescriptorsAvailable`] when the pool is exhausted.
    pub fn try_acquire(&mut self) -> Result<DescHandle> {
        self.ensure_ready()?;
        self.acquire().ok_or(Error::Dma(DmaError::NoDescriptorsAvailable))
    }

    /// Give an unsubmitted descriptor back to the pool.
    ///
    /// Its payload and completion are dropped without being invoked.
    pub fn release(&mut self, handle: DescHandle) -> Result<()> {
        self.ensure_ready()?;
        let policy = self.config.violation_policy;
        let index = handle.index();
        self.pool
            .release(handle)
            .map_err(|e| Error::from(violation(policy, e)))?;
        trace!("released descriptor {}", index);
        Ok(())
    }

    /// Borrow a held descriptor
    pub fn descriptor(&self, handle: &DescHandle) -> Result<&Descriptor<E, C>> {
        let policy = self.config.violation_policy;
        self.pool
            .get(handle)
            .map_err(|e| Error::from(violation(policy, e)))
    }

    /// Mutably borrow a held descriptor to fill in payload and completion
    pub fn descriptor_mut(&mut self, handle: &DescHandle) -> Result<&mut Descriptor<E, C>> {
        let policy = self.config.violation_policy;
        self.pool
            .get_mut(handle)
            .map_err(|e| Error::from(violation(policy, e)))
    }

    /// Point a held descriptor at `payload` and attach its completion
    pub fn prepare(
        &mut self,
        handle: &DescHandle,
        payload: E::Payload,
        completion: C,
    ) -> Result<()> {
        let desc = self.descriptor_mut(handle)?;
        desc.set_payload(payload);
        desc.set_completion(completion);
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Fill a held descriptor and append it to `queue`.
    ///
    /// On failure the descriptor is still held and its handle comes back in
    /// the [`SubmitError`].
    pub fn submit(
        &mut self,
        handle: DescHandle,
        queue: Queue,
        payload: E::Payload,
        completion: C,
    ) -> core::result::Result<(), SubmitError> {
        if let Err(e) = self.prepare(&handle, payload, completion) {
            return Err(SubmitError::new(e, handle));
        }
        self.push(handle, queue)
    }

    /// Append an already prepared descriptor to `queue`.
    ///
    /// If the queue was empty the engine is armed with this descriptor;
    /// otherwise it is chained behind the current tail. The engine is asked
    /// first, so a refusal leaves the queue unchanged and the descriptor
    /// held.
    pub fn push(
        &mut self,
        handle: DescHandle,
        queue: Queue,
    ) -> core::result::Result<(), SubmitError> {
        let policy = self.config.violation_policy;
        let payload = match self.submittable(&handle) {
            Ok(payload) => payload,
            Err(e) => return Err(SubmitError::new(violation(policy, e).into(), handle)),
        };

        let q = queue.index();
        let slot = handle.slot();
        let armed = match self.queues[q].tail() {
            None if self.config.kick_on_idle => self.engine.start(queue, payload).map(|()| true),
            None => Ok(false),
            Some(tail) => match self.pool.slot(tail).payload() {
                Some(prev) => self.engine.chain(queue, prev, payload).map(|()| false),
                None => Ok(false),
            },
        };
        let armed = match armed {
            Ok(armed) => armed,
            Err(e) => {
                self.stats.record_submit_failure();
                warn!("engine refused descriptor {} on {:?}: {}", slot, queue, e);
                return Err(SubmitError::new(DmaError::SubmitFailed(e).into(), handle));
            }
        };

        self.pool.mark_queued(slot, queue);
        self.queues[q].push_back(self.pool.slots_mut(), slot);
        self.in_flight[q] += 1;
        self.stats.record_submit();
        if armed {
            self.stats.record_kick();
            trace!("{:?} idle -> active, armed with {}", queue, slot);
        }
        Ok(())
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Unlink the head of `queue`, recycle its wrapper and hand back the
    /// completion for the caller to run.
    ///
    /// The wrapper is already free when this returns, so the completion may
    /// acquire it again.
    pub(crate) fn retire(&mut self, queue: Queue) -> DmaResult<Option<C>> {
        let q = queue.index();
        let Some(slot) = self.queues[q].pop_front(self.pool.slots_mut()) else {
            self.stats.record_spurious();
            warn!("spurious completion on {:?}", queue);
            return Err(DmaError::SpuriousCompletion);
        };

        self.in_flight[q] = self.in_flight[q].saturating_sub(1);
        self.lli_count[q] = self.lli_count[q].wrapping_add(1);
        self.stats.record_completion();
        trace!("completed descriptor {} on {:?}", slot, queue);
        Ok(self.pool.reclaim(slot))
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Number of completions `service` should run on `queue`.
    ///
    /// More than `N` outstanding completions cannot happen, so such a value
    /// means the mirror ran ahead of the hardware counter.
    pub(crate) fn due_completions(&mut self, queue: Queue) -> DmaResult<u16> {
        let Some(due) = self.pending_lli(queue) else {
            return Ok(1);
        };
        if usize::from(due) > N {
            self.stats.record_spurious();
            warn!("LLI counter on {:?} lags by {}", queue, due.wrapping_neg());
            self.resync_lli(queue);
            return Err(DmaError::SpuriousCompletion);
        }
        Ok(due)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state != State::Ready {
            let policy = self.config.violation_policy;
            return Err(violation(policy, ProtocolError::NotInitialized).into());
        }
        Ok(())
    }

    /// Check a handle is ready to be linked and return its payload
    fn submittable(&self, handle: &DescHandle) -> ProtocolResult<E::Payload> {
        if self.state != State::Ready {
            return Err(ProtocolError::NotInitialized);
        }
        self.pool.check_held(handle)?;
        let desc = self.pool.slot(handle.slot());
        if !desc.has_completion() {
            return Err(ProtocolError::MissingCompletion);
        }
        desc.payload().ok_or(ProtocolError::MissingPayload)
    }
}

impl<E: DmaEngine, C: Completion, const N: usize> HalDma<E, C, N> {
    /// Handle one completion on `queue`.
    ///
    /// Pops the head descriptor, returns it to the pool and runs its
    /// completion with `status`. An empty queue is a spurious completion:
    /// counted, logged and reported without any state change.
    pub fn on_completion(&mut self, queue: Queue, status: TransferStatus) -> DmaResult<()> {
        if let Some(completion) = self.retire(queue)? {
            completion.complete(status);
        }
        Ok(())
    }

    /// Interrupt entry: complete everything the engine finished on `queue`.
    ///
    /// With an LLI counter, drains until the software mirror catches up with
    /// the hardware; without one, completes exactly one descriptor. Returns
    /// the number completed. If the engine reports more completions than
    /// were queued, the extra one is counted as spurious and the mirror is
    /// resynced. A counter that lags the mirror by more than the pool can
    /// hold completes nothing: it is counted as spurious and resynced.
    pub fn service(&mut self, queue: Queue, status: TransferStatus) -> DmaResult<usize> {
        let due = self.due_completions(queue)?;
        for _ in 0..due {
            if let Err(e) = self.on_completion(queue, status) {
                self.resync_lli(queue);
                return Err(e);
            }
        }
        Ok(due as usize)
    }
}

/// Apply the configured policy to a lifecycle violation.
#[track_caller]
fn violation(policy: ViolationPolicy, err: ProtocolError) -> ProtocolError {
    error!("DMA protocol violation: {}", err);
    match policy {
        ViolationPolicy::Panic => panic!("DMA protocol violation: {}", err),
        ViolationPolicy::Report => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
