//! Tests for progress indicators

use super::*;

#[test]
fn test_null_progress_never_cancels() {
    let p = NullProgress;
    p.step_progress();
    p.step_progress();
    assert!(!p.is_canceled());
    assert!(check_canceled(&p).is_ok());
}

#[test]
fn test_counting_progress_counts_steps_and_inits() {
    let p = CountingProgress::new();
    p.init_progress("Loading Tables...", 10, 0, 1);
    p.step_progress();
    p.step_progress();
    assert_eq!(p.inits(), 1);
    assert_eq!(p.steps(), 2);
}

#[test]
fn test_cancel_after_threshold() {
    let p = CountingProgress::cancel_after(3);
    p.step_progress();
    p.step_progress();
    assert!(!p.is_canceled());
    p.step_progress();
    assert!(p.is_canceled());
    assert!(matches!(check_canceled(&p), Err(FlintError::Canceled)));
}

#[test]
fn test_direct_cancel() {
    let p = CountingProgress::new();
    assert!(!p.is_canceled());
    p.cancel();
    assert!(p.is_canceled());
}
