//! Configuration types for the DMA HAL

use crate::driver::error::ConfigError;
use crate::internal::constants::QUEUE_COUNT;

/// Program queue selector.
///
/// The engine services two independent FIFO program queues. What each queue
/// carries (direction, priority, LLI channel) is decided by the surrounding
/// driver; this layer only keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Queue {
    /// Program queue 0
    #[default]
    Prog0 = 0,
    /// Program queue 1
    Prog1 = 1,
}

impl Queue {
    /// Both queues, in index order
    pub const ALL: [Queue; QUEUE_COUNT] = [Queue::Prog0, Queue::Prog1];

    /// Array index of this queue
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Queue for a raw selector, if it names one
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Queue::Prog0),
            1 => Some(Queue::Prog1),
            _ => None,
        }
    }
}

impl TryFrom<usize> for Queue {
    type Error = ConfigError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Queue::from_index(index).ok_or(ConfigError::InvalidQueue)
    }
}

/// Outcome of a transfer, handed to the completion action unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// Engine finished the descriptor
    #[default]
    Success,
    /// Engine reported an error for the descriptor
    Error,
}

impl TransferStatus {
    /// Check if the transfer finished without error
    #[inline(always)]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, TransferStatus::Success)
    }
}

/// What to do when a caller breaks the descriptor lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViolationPolicy {
    /// Panic on the spot
    #[default]
    Panic,
    /// Log and return the [`ProtocolError`](crate::ProtocolError); state is untouched
    Report,
}

/// Complete DMA HAL configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalDmaConfig {
    /// Handling of lifecycle violations
    pub violation_policy: ViolationPolicy,
    /// Arm the engine when a push lands in an empty queue.
    ///
    /// Disable for engines that free-run from their own linked list and
    /// only need descriptors chained.
    pub kick_on_idle: bool,
    /// Read the engine's LLI counters during `initialize` so that
    /// `service` starts from the hardware's current position
    pub snapshot_lli_on_init: bool,
}

impl Default for HalDmaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HalDmaConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violation_policy: ViolationPolicy::Panic,
            kick_on_idle: true,
            snapshot_lli_on_init: true,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the violation policy
    #[must_use]
    pub const fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }

    /// Enable or disable arming the engine on the idle-to-active edge
    #[must_use]
    pub const fn with_kick_on_idle(mut self, enabled: bool) -> Self {
        self.kick_on_idle = enabled;
        self
    }

    /// Enable or disable the LLI counter snapshot at init
    #[must_use]
    pub const fn with_lli_snapshot(mut self, enabled: bool) -> Self {
        self.snapshot_lli_on_init = enabled;
        self
    }
}

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Constructed, `initialize` not yet called (or torn down)
    #[default]
    Uninitialized,
    /// Pool populated, queues accepting descriptors
    Ready,
}

// =============================================================================
// Unit Tests
// =============================================================================
