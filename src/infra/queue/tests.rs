//! Frame queue tests covering FIFO order, capacity, and index wraparound.
use super::*;

fn frame(tag: u8) -> CanFrame {
    CanFrame::new(0x100 + tag as u32, false, &[tag, tag, tag])
}

#[test]
/// Frames come back out in exactly the order they went in.
fn test_fifo_order() {
    let queue: FrameQueue<8> = FrameQueue::new();
    for tag in 0..5 {
        assert!(queue.enqueue(&frame(tag)));
    }
    for tag in 0..5 {
        assert_eq!(queue.dequeue(), Some(frame(tag)));
    }
    assert_eq!(queue.dequeue(), None);
}

#[test]
/// A queue of capacity N holds N - 1 frames before enqueue starts failing.
fn test_capacity_is_n_minus_one() {
    let queue: FrameQueue<8> = FrameQueue::new();
    assert_eq!(queue.capacity(), 7);
    for tag in 0..7 {
        assert!(queue.enqueue(&frame(tag)));
    }
    assert!(queue.is_full());
    assert!(!queue.enqueue(&frame(99)));
    // The rejected frame must not have displaced anything.
    assert_eq!(queue.len(), 7);
    assert_eq!(queue.peek(), Some(frame(0)));
}

#[test]
/// Indices wrap around the backing array without disturbing order.
fn test_order_preserved_across_wraparound() {
    let queue: FrameQueue<4> = FrameQueue::new();
    // Cycle enough frames through to wrap the indices several times.
    let mut expected = 0u8;
    for tag in 0..20u8 {
        assert!(queue.enqueue(&frame(tag)));
        if queue.is_full() {
            assert_eq!(queue.dequeue(), Some(frame(expected)));
            expected += 1;
        }
    }
    while let Some(out) = queue.dequeue() {
        assert_eq!(out, frame(expected));
        expected += 1;
    }
    assert_eq!(expected, 20);
}

#[test]
/// Peek leaves the frame in place; remove_front drops it without returning.
fn test_peek_and_remove_front() {
    let queue: FrameQueue<4> = FrameQueue::new();
    assert_eq!(queue.peek(), None);
    queue.remove_front(); // no-op on empty
    assert!(queue.enqueue(&frame(1)));
    assert!(queue.enqueue(&frame(2)));
    assert_eq!(queue.peek(), Some(frame(1)));
    assert_eq!(queue.len(), 2);
    queue.remove_front();
    assert_eq!(queue.peek(), Some(frame(2)));
    assert_eq!(queue.len(), 1);
}

#[test]
/// Draining resets the queue to a reusable empty state.
fn test_refill_after_drain() {
    let queue: FrameQueue<4> = FrameQueue::new();
    for round in 0..3 {
        for tag in 0..3 {
            assert!(queue.enqueue(&frame(round * 3 + tag)));
        }
        for tag in 0..3 {
            assert_eq!(queue.dequeue(), Some(frame(round * 3 + tag)));
        }
        assert!(queue.is_empty());
    }
}
