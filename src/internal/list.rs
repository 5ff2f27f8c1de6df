//! Index-linked FIFO lists over a fixed slot arena.
//!
//! Every descriptor slot carries one `next` link, so a slot can sit in at
//! most one list at a time. Lists only store head/tail indices; the slots
//! themselves live in the pool's array and never move.

/// A slot that can be threaded onto an [`IndexList`].
pub(crate) trait Linked {
    /// Index of the following slot in the list this slot belongs to
    fn next(&self) -> Option<u16>;

    /// Rewrite the link to the following slot
    fn set_next(&mut self, next: Option<u16>);
}

/// Singly linked FIFO of slot indices with O(1) push-back and pop-front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IndexList {
    head: Option<u16>,
    tail: Option<u16>,
    len: u16,
}

impl IndexList {
    /// Create an empty list. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of linked slots
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if the list has no slots
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Index of the first slot
    #[inline(always)]
    pub const fn head(&self) -> Option<u16> {
        self.head
    }

    /// Index of the last slot
    #[inline(always)]
    pub const fn tail(&self) -> Option<u16> {
        self.tail
    }

    /// Forget every link. The slots keep whatever `next` they had.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Append `index` after the current tail.
    ///
    /// The slot must not already be linked into any list.
    pub fn push_back<T: Linked>(&mut self, slots: &mut [T], index: u16) {
        slots[index as usize].set_next(None);
        match self.tail {
            Some(tail) => slots[tail as usize].set_next(Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    /// Unlink and return the first slot.
    pub fn pop_front<T: Linked>(&mut self, slots: &mut [T]) -> Option<u16> {
        let head = self.head?;
        let next = slots[head as usize].next();
        slots[head as usize].set_next(None);

        self.head = next;
        if next.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(head)
    }

    /// Walk the list looking for `index`. O(n).
    #[cfg(test)]
    pub fn contains<T: Linked>(&self, slots: &[T], index: u16) -> bool {
        self.iter(slots).any(|i| i == index)
    }

    /// Iterate slot indices from head to tail
    pub fn iter<'a, T: Linked>(&self, slots: &'a [T]) -> Iter<'a, T> {
        Iter {
            slots,
            cursor: self.head,
            remaining: self.len,
        }
    }
}

/// Iterator over the slot indices of an [`IndexList`].
pub(crate) struct Iter<'a, T> {
    slots: &'a [T],
    cursor: Option<u16>,
    remaining: u16,
}

impl<T: Linked> Iterator for Iter<'_, T> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        // `remaining` bounds the walk even if a link was corrupted into a cycle
        if self.remaining == 0 {
            return None;
        }
        let index = self.cursor?;
        self.cursor = self.slots[index as usize].next();
        self.remaining -= 1;
        Some(index)
    }
}

// =============================================================================
// Tests
// =============================================================================
