use super::*;
use crate::foundation::core::Fps;

fn policy() -> SeekPolicy {
    SeekPolicy::from_config(&RendererConfig::with_output(
        64,
        36,
        Fps::new(30, 1).unwrap(),
    ))
}

fn req(timestamp_ms: i64, clip: u64) -> SeekRequest {
    SeekRequest {
        timestamp_ms,
        frame: Fps::new(30, 1).unwrap().frame_at_ms(timestamp_ms),
        clip: Some(ClipId(clip)),
    }
}

fn cursor(timestamp_ms: i64, clip: u64, warmup_attempts: u32) -> Cursor {
    Cursor {
        timestamp_ms,
        frame: Fps::new(30, 1).unwrap().frame_at_ms(timestamp_ms),
        clip: Some(ClipId(clip)),
        warmup_attempts,
    }
}

#[test]
fn no_cursor_is_far() {
    assert_eq!(policy().classify(req(0, 1), None, None, false), SeekClass::Far);
}

#[test]
fn next_frame_is_near_one_step() {
    let p = policy();
    assert_eq!(
        p.classify(req(1033, 1), Some(cursor(1000, 1, 0)), Some(30), false),
        SeekClass::Near { steps: 1 }
    );
}

#[test]
fn same_frame_is_cache_hit_unless_warming() {
    let p = policy();
    assert_eq!(
        p.classify(req(1010, 1), Some(cursor(1000, 1, 0)), Some(30), false),
        SeekClass::CacheHit
    );
    assert_eq!(
        p.classify(req(1000, 1), Some(cursor(1000, 1, 1)), Some(30), false),
        SeekClass::Far
    );
}

#[test]
fn backward_and_distant_requests_are_far() {
    let p = policy();
    let c = Some(cursor(1000, 1, 0));
    assert_eq!(p.classify(req(967, 1), c, Some(30), false), SeekClass::Far);
    assert_eq!(p.classify(req(1100, 1), c, Some(30), false), SeekClass::Far);
}

#[test]
fn clip_change_forces_far() {
    let p = policy();
    assert_eq!(
        p.classify(req(1033, 2), Some(cursor(1000, 1, 0)), Some(30), false),
        SeekClass::Far
    );
}

#[test]
fn warming_cursor_accepts_next_frame_as_near() {
    let p = policy();
    assert_eq!(
        p.classify(req(1533, 1), Some(cursor(1500, 1, 1)), None, false),
        SeekClass::Near { steps: 1 }
    );
}

#[test]
fn playback_mode_widens_forward_window() {
    let p = policy();
    let c = Some(cursor(1000, 1, 0));
    assert_eq!(p.classify(req(1100, 1), c, Some(30), true), SeekClass::Near { steps: 3 });
    assert_eq!(p.classify(req(7000, 1), c, Some(30), true), SeekClass::Far);
    assert!((p.threshold_ms(false) - 50.0).abs() < 1e-6);
    assert!((p.threshold_ms(true) - 5000.0).abs() < 1e-6);
}
