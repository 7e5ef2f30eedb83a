use std::sync::atomic::AtomicUsize;

use super::*;

fn clock(fps: u32, threads: usize) -> PlaybackClock {
    PlaybackClock::new(ClockOpts {
        fps: Fps::new(fps, 1).unwrap(),
        threads: Some(threads),
    })
    .unwrap()
}

#[test]
fn ticks_carry_frame_aligned_timestamps() {
    let c = clock(100, 2);
    let seen = std::sync::Mutex::new(Vec::new());
    let report = c.drive(1000, 5, |ts| {
        seen.lock().unwrap().push(ts);
        OutcomeKind::Success
    });
    assert_eq!(
        report,
        ClockReport {
            ticks: 5,
            success: 5,
            ..ClockReport::default()
        }
    );
    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen, vec![1000, 1010, 1020, 1030, 1040]);
}

#[test]
fn slow_ticks_overlap_instead_of_delaying_schedule() {
    let c = clock(100, 4);
    let in_flight = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let started = Instant::now();
    let report = c.drive(0, 8, |_| {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(40));
        in_flight.fetch_sub(1, Ordering::SeqCst);
        OutcomeKind::Skipped
    });
    assert_eq!(report.skipped, 8);
    assert!(peak.load(Ordering::SeqCst) >= 2);
    assert!(started.elapsed() < Duration::from_millis(8 * 40));
}

#[test]
fn outcomes_are_tallied_by_kind() {
    let c = clock(200, 2);
    let report = c.drive(0, 4, |ts| match ts {
        0 => OutcomeKind::Fallback,
        5 => OutcomeKind::Failure,
        _ => OutcomeKind::Success,
    });
    assert_eq!(report.fallback, 1);
    assert_eq!(report.failure, 1);
    assert_eq!(report.success, 2);
}

#[test]
fn zero_threads_is_rejected() {
    let err = PlaybackClock::new(ClockOpts {
        fps: Fps::default(),
        threads: Some(0),
    })
    .unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Validation);
}
