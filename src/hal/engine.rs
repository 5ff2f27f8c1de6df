//! DMA engine HAL
//!
//! This module defines the seam between the descriptor scheduler and the
//! low-level driver that actually programs the LMAC DMA controller. The
//! scheduler never touches registers; it calls [`DmaEngine`] at exactly two
//! points:
//!
//! - **start**: a queue goes from idle to active and its new head must be
//!   handed to the hardware.
//! - **chain**: a descriptor is appended behind a queue that is already
//!   running and the hardware linked list must be extended.
//!
//! On the completion path the scheduler may read back the engine's LLI
//! counter to learn how many descriptors finished since the last interrupt.

use crate::driver::config::Queue;
use crate::driver::error::EngineError;

// =============================================================================
// DMA Engine Trait
// =============================================================================

/// Trait for the hardware descriptor driver.
///
/// Implementations wrap whatever register block or vendor driver runs the
/// program queues. The payload is an opaque, copyable reference to the
/// hardware descriptor (an address, an index into a descriptor table).
///
/// Both submission hooks are called before the scheduler links the
/// descriptor, so an `Err` leaves the queue unchanged and the caller keeps
/// the descriptor.
pub trait DmaEngine {
    /// Reference to a hardware descriptor
    type Payload: Copy;

    /// Arm `queue` with `head`, its first and only pending descriptor.
    fn start(&mut self, queue: Queue, head: Self::Payload) -> Result<(), EngineError>;

    /// Link `next` behind `tail` on a queue that is already running.
    ///
    /// The default does nothing, for engines that pick descriptors up from
    /// the payload's own next pointer.
    fn chain(
        &mut self,
        queue: Queue,
        tail: Self::Payload,
        next: Self::Payload,
    ) -> Result<(), EngineError> {
        let _ = (queue, tail, next);
        Ok(())
    }

    /// Hardware count of descriptors completed on `queue`, if the engine
    /// keeps one. The value wraps at `u16::MAX`.
    fn lli_counter(&self, queue: Queue) -> Option<u16> {
        let _ = queue;
        None
    }
}

impl<E: DmaEngine + ?Sized> DmaEngine for &mut E {
    type Payload = E::Payload;

    #[inline]
    fn start(&mut self, queue: Queue, head: Self::Payload) -> Result<(), EngineError> {
        (**self).start(queue, head)
    }

    #[inline]
    fn chain(
        &mut self,
        queue: Queue,
        tail: Self::Payload,
        next: Self::Payload,
    ) -> Result<(), EngineError> {
        (**self).chain(queue, tail, next)
    }

    #[inline]
    fn lli_counter(&self, queue: Queue) -> Option<u16> {
        (**self).lli_counter(queue)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
