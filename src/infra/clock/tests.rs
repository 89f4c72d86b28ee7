//! Pacing clock tests, with emphasis on the counter wrap boundary.
use super::*;

#[test]
/// Plain forward distance, no wraparound involved.
fn test_elapsed_simple() {
    assert_eq!(elapsed_micros(1_000, 400), 600);
    assert_eq!(elapsed_micros(500, 500), 0);
}

#[test]
/// Distance across the wrap boundary is still the true tick count.
fn test_elapsed_across_wraparound() {
    let since = u32::MAX - 99;
    let now = 200u32;
    assert_eq!(elapsed_micros(now, since), 300);
}

#[test]
/// Separation check right at the boundary: exactly `required` ticks pass.
fn test_separation_boundary() {
    assert!(!separation_elapsed(799, 500, 300));
    assert!(separation_elapsed(800, 500, 300));
    assert!(separation_elapsed(801, 500, 300));
}

#[test]
/// A timestamp taken just before the wrap still gates correctly after it.
fn test_separation_across_wraparound() {
    let since = u32::MAX - 100;
    // 100 ticks to the wrap plus 150 after it: 250 elapsed.
    assert!(!separation_elapsed(149, since, 300));
    // 100 ticks to the wrap plus 200 after it: 300 elapsed.
    assert!(separation_elapsed(199, since, 300));
}

#[test]
/// Zero separation is always satisfied, whatever the timestamps.
fn test_zero_separation_always_elapsed() {
    assert!(separation_elapsed(0, 0, 0));
    assert!(separation_elapsed(5, u32::MAX, 0));
}
