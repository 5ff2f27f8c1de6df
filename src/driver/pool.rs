//! Descriptor pool: the fixed arena of wrappers and its free-list.
//!
//! The pool is the only place wrappers exist. `initialize` threads every slot
//! onto the free-list; afterwards wrappers only move between the free-list,
//! callers (held) and the scheduler's program queues.

use crate::driver::config::Queue;
use crate::driver::descriptor::{DescHandle, DescriptorWrapper, Membership};
use crate::driver::error::{DmaError, DmaResult, ProtocolError, ProtocolResult};
use crate::internal::constants::MAX_POOL_SIZE;
use crate::internal::list::{IndexList, Linked};

/// Fixed-size pool of descriptor wrappers.
///
/// # Type Parameters
/// * `P` - Hardware descriptor payload handle
/// * `C` - Completion action type
/// * `N` - Number of wrappers (1..=65535)
pub struct DescriptorPool<P, C, const N: usize> {
    /// Wrapper storage, never reallocated
    slots: [DescriptorWrapper<P, C>; N],
    /// Free-list threaded through `slots`
    free: IndexList,
    /// Wrappers currently borrowed by callers
    held: u16,
    /// Whether `initialize` has run
    initialized: bool,
}

impl<P, C, const N: usize> DescriptorPool<P, C, N> {
    const CAPACITY_CHECK: () = assert!(
        N > 0 && N <= MAX_POOL_SIZE,
        "descriptor pool size must be between 1 and 65535"
    );

    /// Create an uninitialized pool. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::CAPACITY_CHECK;
        Self {
            slots: [const { DescriptorWrapper::new() }; N],
            free: IndexList::new(),
            held: 0,
            initialized: false,
        }
    }

    /// Number of wrappers in the pool
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Link every slot into the free-list.
    ///
    /// Must run exactly once before any other operation.
    pub fn initialize(&mut self) -> ProtocolResult<()> {
        if self.initialized {
            return Err(ProtocolError::AlreadyInitialized);
        }

        self.free.clear();
        for index in 0..N {
            let slot = index as u16;
            let desc = &mut self.slots[index];
            desc.clear();
            desc.set_membership(Membership::Free);
            self.free.push_back(&mut self.slots, slot);
        }
        self.held = 0;
        self.initialized = true;
        Ok(())
    }

    /// Check if `initialize` has run
    #[inline(always)]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Take the head of the free-list.
    ///
    /// Returns `None` when the pool is exhausted; treat that as backpressure.
    pub fn acquire(&mut self) -> Option<DescHandle> {
        let index = self.free.pop_front(&mut self.slots)?;
        self.slots[index as usize].set_membership(Membership::Held);
        self.held += 1;
        Some(DescHandle::new(index))
    }

    /// Return a held wrapper to the free-list, dropping its payload and
    /// completion.
    ///
    /// The handle is consumed so it cannot name the slot again.
    #[allow(clippy::needless_pass_by_value)]
    pub fn release(&mut self, handle: DescHandle) -> ProtocolResult<()> {
        match self.check_held(&handle) {
            Ok(()) => {}
            Err(ProtocolError::DescriptorNotHeld) => return Err(ProtocolError::DoubleRelease),
            Err(e) => return Err(e),
        }
        self.recycle(handle.slot());
        self.held -= 1;
        Ok(())
    }

    /// Borrow a held wrapper
    pub fn get(&self, handle: &DescHandle) -> ProtocolResult<&DescriptorWrapper<P, C>> {
        self.check_held(handle)?;
        Ok(&self.slots[handle.index()])
    }

    /// Mutably borrow a held wrapper to fill in payload and completion
    pub fn get_mut(&mut self, handle: &DescHandle) -> ProtocolResult<&mut DescriptorWrapper<P, C>> {
        self.check_held(handle)?;
        Ok(&mut self.slots[handle.index()])
    }

    /// Current membership of the slot a handle names
    pub fn membership(&self, handle: &DescHandle) -> Option<Membership> {
        self.slots
            .get(handle.index())
            .map(DescriptorWrapper::membership)
    }

    /// Wrappers on the free-list
    #[inline(always)]
    pub const fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Wrappers borrowed by callers
    #[inline(always)]
    pub const fn held_count(&self) -> usize {
        self.held as usize
    }

    /// Return to the uninitialized state.
    ///
    /// Fails with [`DmaError::Busy`] unless every wrapper is back on the
    /// free-list.
    pub fn teardown(&mut self) -> DmaResult<()> {
        if self.initialized && self.free.len() != N {
            return Err(DmaError::Busy);
        }
        for desc in &mut self.slots {
            desc.clear();
            desc.set_membership(Membership::Unallocated);
            desc.set_next(None);
        }
        self.free.clear();
        self.held = 0;
        self.initialized = false;
        Ok(())
    }

    // =========================================================================
    // Scheduler hooks
    // =========================================================================

    /// Validate that `handle` names a slot held by the caller.
    pub(crate) fn check_held(&self, handle: &DescHandle) -> ProtocolResult<()> {
        let desc = self
            .slots
            .get(handle.index())
            .ok_or(ProtocolError::InvalidDescriptor)?;
        match desc.membership() {
            Membership::Held => Ok(()),
            Membership::Free => Err(ProtocolError::DescriptorNotHeld),
            Membership::Queued(_) => Err(ProtocolError::DescriptorLinked),
            Membership::Unallocated => Err(ProtocolError::NotInitialized),
        }
    }

    /// Hand a held slot to a program queue. The caller links it.
    pub(crate) fn mark_queued(&mut self, index: u16, queue: Queue) {
        self.slots[index as usize].set_membership(Membership::Queued(queue));
        self.held -= 1;
    }

    /// Recycle a slot just unlinked from a program queue, returning its
    /// completion so the caller can run it.
    pub(crate) fn reclaim(&mut self, index: u16) -> Option<C> {
        let completion = self.slots[index as usize].take_completion();
        self.recycle(index);
        completion
    }

    #[inline(always)]
    pub(crate) fn slot(&self, index: u16) -> &DescriptorWrapper<P, C> {
        &self.slots[index as usize]
    }

    #[inline(always)]
    pub(crate) fn slots(&self) -> &[DescriptorWrapper<P, C>] {
        &self.slots
    }

    #[inline(always)]
    pub(crate) fn slots_mut(&mut self) -> &mut [DescriptorWrapper<P, C>] {
        &mut self.slots
    }

    fn recycle(&mut self, index: u16) {
        let desc = &mut self.slots[index as usize];
        desc.clear();
        desc.set_membership(Membership::Free);
        self.free.push_back(&mut self.slots, index);
    }
}

impl<P, C, const N: usize> Default for DescriptorPool<P, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
