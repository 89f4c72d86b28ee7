//! Fixed-capacity single-producer/single-consumer queue moving CAN frames
//! between the receive interrupt and the foreground loop.
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::protocol::transport::can_frame::CanFrame;

//==================================================================================FRAME_QUEUE

/// Lock-free ring buffer of CAN frames with `N - 1` usable slots.
///
/// One slot always stays empty so that `head == tail` means empty and
/// `(tail + 1) % N == head` means full, using nothing but the two indices.
/// Exactly one context may produce (`enqueue`) and exactly one context may
/// consume (`dequeue`, `peek`, `remove_front`); the discipline is enforced by
/// usage, not by the type. Frames cross the boundary by value.
pub struct FrameQueue<const N: usize> {
    items: UnsafeCell<[CanFrame; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// The producer only writes `tail` and slots not yet visible to the consumer;
// the consumer only writes `head`. The atomic index handoff is the sole
// synchronization point between the two contexts.
unsafe impl<const N: usize> Sync for FrameQueue<N> {}

impl<const N: usize> FrameQueue<N> {
    /// Create an empty queue. Suitable for `static` storage.
    pub const fn new() -> Self {
        Self {
            items: UnsafeCell::new([CanFrame::empty(); N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Copy `frame` into the queue. Returns `false` when the queue is full;
    /// the frame is then dropped by the caller, never waited on.
    pub fn enqueue(&self, frame: &CanFrame) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) % N;
        if next == self.head.load(Ordering::Acquire) {
            return false;
        }
        // Safety: only the producer writes this slot, and the consumer cannot
        // observe it until the release store below publishes the new tail.
        // Per-slot raw access so no reference to the whole array is formed
        // while the other context touches its own slot.
        unsafe {
            self.items.get().cast::<CanFrame>().add(tail).write(*frame);
        }
        self.tail.store(next, Ordering::Release);
        true
    }

    /// Remove and return the oldest frame, or `None` when empty.
    pub fn dequeue(&self) -> Option<CanFrame> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }
        // Safety: the producer never touches a published slot before the
        // consumer releases it by advancing `head`.
        let frame = unsafe { self.items.get().cast::<CanFrame>().add(head).read() };
        self.head.store((head + 1) % N, Ordering::Release);
        Some(frame)
    }

    /// Copy of the oldest frame without removing it, or `None` when empty.
    pub fn peek(&self) -> Option<CanFrame> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }
        // Safety: same slot ownership argument as `dequeue`.
        Some(unsafe { self.items.get().cast::<CanFrame>().add(head).read() })
    }

    /// Drop the oldest frame without returning it. No-op when empty.
    pub fn remove_front(&self) {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return;
        }
        self.head.store((head + 1) % N, Ordering::Release);
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + N - head) % N
    }

    /// Checks whether the queue holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether another `enqueue` would fail.
    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }

    /// Usable slot count (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N - 1
    }
}

impl<const N: usize> Default for FrameQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
