//! Descriptor wrappers, handles and completion actions.
//!
//! A [`DescriptorWrapper`] is one schedulable unit of DMA work. It refers to
//! a hardware descriptor payload owned elsewhere and carries the one-shot
//! [`Completion`] to run when the engine finishes it.
//!
//! Wrappers live in a fixed arena inside the pool and never move. Callers
//! name them through a [`DescHandle`], which is move-only: submitting or
//! releasing consumes it, so safe code cannot keep a reference to a
//! descriptor the scheduler owns.

use crate::driver::config::{Queue, TransferStatus};
use crate::internal::list::Linked;

// =============================================================================
// Completion
// =============================================================================

/// One-shot action run when the engine finishes a descriptor.
///
/// Taking `self` by value makes exactly-once invocation a property of the
/// type: once run, the completion is gone.
///
/// Any `FnOnce(TransferStatus)` qualifies, so plain `fn` items work. For a
/// callback that needs state, use [`Callback`] or implement this trait on a
/// small enum of the completion actions the driver knows about.
pub trait Completion {
    /// Run the action with the transfer outcome
    fn complete(self, status: TransferStatus);
}

impl<F> Completion for F
where
    F: FnOnce(TransferStatus),
{
    #[inline]
    fn complete(self, status: TransferStatus) {
        self(status);
    }
}

/// Function pointer paired with the context it is called back with.
///
/// The context is captured by value and handed back unchanged.
///
/// # Example
///
/// ```ignore
/// fn tx_done(frame: u16, status: TransferStatus) { /* ... */ }
///
/// let cb = Callback::new(tx_done, 7);
/// dma.prepare(&handle, desc_addr, cb)?;
/// ```
#[derive(Clone, Copy)]
pub struct Callback<T> {
    func: fn(T, TransferStatus),
    context: T,
}

impl<T> Callback<T> {
    /// Create a callback from a function and its context
    #[must_use]
    pub const fn new(func: fn(T, TransferStatus), context: T) -> Self {
        Self { func, context }
    }

    /// Context that will be passed back to the function
    pub const fn context(&self) -> &T {
        &self.context
    }
}

impl<T> Completion for Callback<T> {
    #[inline]
    fn complete(self, status: TransferStatus) {
        (self.func)(self.context, status);
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callback")
            .field("func", &(self.func as *const ()))
            .field("context", &self.context)
            .finish()
    }
}

// =============================================================================
// Membership
// =============================================================================

/// Which list, if any, a descriptor currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Membership {
    /// Pool not initialized yet
    #[default]
    Unallocated,
    /// In the free pool
    Free,
    /// Borrowed by a caller between acquire and submit
    Held,
    /// Linked into a program queue, owned by the scheduler
    Queued(Queue),
}

// =============================================================================
// Descriptor Handle
// =============================================================================

/// Move-only handle to a descriptor held by the caller.
///
/// Obtained from `acquire`, consumed by `submit`/`push` or `release`.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "an unused handle leaks its descriptor; submit or release it"]
pub struct DescHandle {
    index: u16,
}

impl DescHandle {
    pub(crate) const fn new(index: u16) -> Self {
        Self { index }
    }

    /// Slot index of the descriptor inside its pool
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    #[inline(always)]
    pub(crate) const fn slot(&self) -> u16 {
        self.index
    }
}

// =============================================================================
// Descriptor Wrapper
// =============================================================================

/// One schedulable unit of DMA work.
///
/// # Type Parameters
/// * `P` - Handle to the hardware descriptor payload (address, reference)
/// * `C` - Completion action type
pub struct DescriptorWrapper<P, C> {
    /// Hardware descriptor, not owned
    payload: Option<P>,
    /// Run once when the engine finishes this descriptor
    completion: Option<C>,
    /// Current list membership
    membership: Membership,
    /// Link to the next slot in the same list
    next: Option<u16>,
}

impl<P, C> DescriptorWrapper<P, C> {
    /// Create an empty, unallocated wrapper. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            payload: None,
            completion: None,
            membership: Membership::Unallocated,
            next: None,
        }
    }

    /// Current list membership
    #[inline(always)]
    pub const fn membership(&self) -> Membership {
        self.membership
    }

    /// Hardware descriptor this wrapper refers to
    #[inline(always)]
    pub fn payload(&self) -> Option<P>
    where
        P: Copy,
    {
        self.payload
    }

    /// Point the wrapper at a hardware descriptor
    pub fn set_payload(&mut self, payload: P) {
        self.payload = Some(payload);
    }

    /// Set the action to run on completion, replacing any previous one
    pub fn set_completion(&mut self, completion: C) {
        self.completion = Some(completion);
    }

    /// Check if a completion action is set
    #[inline(always)]
    pub const fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Check if a payload is set
    #[inline(always)]
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub(crate) fn set_membership(&mut self, membership: Membership) {
        self.membership = membership;
    }

    pub(crate) fn take_completion(&mut self) -> Option<C> {
        self.completion.take()
    }

    /// Drop payload and completion so a recycled wrapper carries nothing stale.
    pub(crate) fn clear(&mut self) {
        self.payload = None;
        self.completion = None;
    }
}

impl<P, C> Default for DescriptorWrapper<P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: core::fmt::Debug, C> core::fmt::Debug for DescriptorWrapper<P, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DescriptorWrapper")
            .field("payload", &self.payload)
            .field("has_completion", &self.completion.is_some())
            .field("membership", &self.membership)
            .finish_non_exhaustive()
    }
}

impl<P, C> Linked for DescriptorWrapper<P, C> {
    #[inline(always)]
    fn next(&self) -> Option<u16> {
        self.next
    }

    #[inline(always)]
    fn set_next(&mut self, next: Option<u16>) {
        self.next = next;
    }
}

// =============================================================================
// Tests
// =============================================================================
