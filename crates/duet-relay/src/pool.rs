//! FIFO waiting pool of participants looking for a partner.

use std::collections::VecDeque;

use duet_common::Handle;

/// Each handle occupies at most one slot.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queue: VecDeque<Handle>,
}

impl WaitingPool {
    /// Append to the back. Returns false if the handle was already waiting.
    pub fn enqueue(&mut self, handle: Handle) -> bool {
        if self.contains(&handle) {
            return false;
        }
        self.queue.push_back(handle);
        true
    }

    pub fn dequeue_front(&mut self) -> Option<Handle> {
        self.queue.pop_front()
    }

    /// Put a handle back at the head, ahead of everyone else.
    pub fn push_front(&mut self, handle: Handle) {
        if !self.contains(&handle) {
            self.queue.push_front(handle);
        }
    }

    /// Remove a handle wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, handle: &Handle) -> bool {
        match self.queue.iter().position(|h| h == handle) {
            Some(idx) => {
                self.queue.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.queue.iter().any(|h| h == handle)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.queue.iter()
    }
}
