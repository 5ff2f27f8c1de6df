//! Scheduler event counters.
//!
//! All counters wrap on overflow. They are diagnostics only; nothing in the
//! scheduler branches on them.

// =============================================================================
// DMA Statistics
// =============================================================================

/// Counters kept by the scheduler since `initialize` or the last reset.
///
/// # Example
///
/// ```ignore
/// let stats = dma.stats();
/// if stats.spurious > 0 {
///     warn!("completion interrupts without queued work: {}", stats.spurious);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaStats {
    /// Descriptors accepted into a program queue
    pub submitted: u32,
    /// Descriptors completed and recycled
    pub completed: u32,
    /// Idle-to-active transitions that armed the engine
    pub kicks: u32,
    /// `acquire` calls that found the pool empty
    pub exhausted: u32,
    /// Completions signalled for an empty queue
    pub spurious: u32,
    /// Submissions the engine refused
    pub submit_failures: u32,
}

impl DmaStats {
    /// All counters at zero. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            submitted: 0,
            completed: 0,
            kicks: 0,
            exhausted: 0,
            spurious: 0,
            submit_failures: 0,
        }
    }

    /// Descriptors submitted but not yet completed, across both queues
    #[inline]
    #[must_use]
    pub const fn outstanding(&self) -> u32 {
        self.submitted.wrapping_sub(self.completed)
    }

    /// Check if any anomaly was counted
    #[inline]
    #[must_use]
    pub const fn has_anomaly(&self) -> bool {
        self.spurious != 0 || self.submit_failures != 0
    }

    #[inline]
    pub(crate) fn record_submit(&mut self) {
        self.submitted = self.submitted.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_completion(&mut self) {
        self.completed = self.completed.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_kick(&mut self) {
        self.kicks = self.kicks.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_exhausted(&mut self) {
        self.exhausted = self.exhausted.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_spurious(&mut self) {
        self.spurious = self.spurious.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_submit_failure(&mut self) {
        self.submit_failures = self.submit_failures.wrapping_add(1);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
