//! Centralized Constants
//!
//! Single source of truth for the sizes and counts used by the descriptor
//! pool and program scheduler.

// =============================================================================
// Program Queues
// =============================================================================

/// Number of program queues serviced by one DMA engine instance
pub const QUEUE_COUNT: usize = 2;

// =============================================================================
// Descriptor Pool
// =============================================================================

/// Default number of descriptor wrappers in a pool.
///
/// Matches the four general purpose descriptors the LMAC firmware reserves
/// for its DMA HAL.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Largest pool a scheduler can index (list links are `u16`)
pub const MAX_POOL_SIZE: usize = u16::MAX as usize;

// =============================================================================
// Tests
// =============================================================================
