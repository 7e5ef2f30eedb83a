use super::*;
use crate::foundation::core::Fps;
use crate::pipeline::synthetic::SyntheticFactory;
use crate::timeline::model::{Clip, ClipId, ClipSource, Track};

fn timeline() -> Arc<Timeline> {
    Arc::new(Timeline {
        tracks: vec![Track {
            name: "main".to_string(),
            clips: vec![Clip {
                id: ClipId(1),
                start_ms: 0,
                duration_ms: 2000,
                source: ClipSource::TestPattern {
                    color: [90, 30, 160, 255],
                },
                rect: None,
            }],
        }],
    })
}

fn engine(config: EngineConfig) -> PlaybackEngine {
    PlaybackEngine::new(
        timeline(),
        RendererConfig::with_output(64, 36, Fps::new(30, 1).unwrap()),
        config,
        Arc::new(SyntheticFactory::default()),
    )
    .unwrap()
}

fn poll_frame(e: &PlaybackEngine, ts: i64) -> Option<FrameBuffer> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(f) = e.try_get_frame(ts) {
            return Some(f);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn nothing_queued_before_start() {
    let e = engine(EngineConfig::default());
    assert!(!e.is_running());
    assert!(e.try_get_frame(0).is_none());
    assert_eq!(e.stats().misses, 1);
}

#[test]
fn start_fills_queue_from_start_position() {
    let mut e = engine(EngineConfig::default());
    e.start(0).unwrap();
    assert!(e.is_running());
    assert!(e.wait_warm(Duration::from_secs(5)));

    let f = poll_frame(&e, 0).unwrap();
    assert_eq!(f.timestamp_ms(), 0);
    assert_eq!((f.width(), f.height()), (64, 36));
    assert!(!f.is_placeholder());
    assert!(e.stats().produced >= 1);
}

#[test]
fn fill_thread_respects_lookahead() {
    let mut e = engine(EngineConfig {
        lookahead_ms: 200,
        resync_window_ms: 1000,
        ..EngineConfig::default()
    });
    e.start(0).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));
    std::thread::sleep(Duration::from_millis(200));
    assert!(e.next_ms() <= 200 + 34);
    assert!(e.queue_len() <= e.config().queue_capacity);
}

#[test]
fn play_head_jump_resyncs_decoding() {
    let mut e = engine(EngineConfig {
        lookahead_ms: 200,
        resync_window_ms: 600,
        ..EngineConfig::default()
    });
    e.start(0).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));

    let f = poll_frame(&e, 1500).unwrap();
    assert!((f.timestamp_ms() - 1500).abs() <= 50);
    assert!(e.stats().resyncs >= 1);
}

#[test]
fn play_head_moving_back_resyncs_within_window() {
    let mut e = engine(EngineConfig::default());
    e.start(1000).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));

    let f = poll_frame(&e, 0).unwrap();
    assert_eq!(f.timestamp_ms(), 0);
    assert!(e.stats().resyncs >= 1);
    assert!(e.next_ms() <= 500 + 34);
}

#[test]
fn play_head_moving_back_after_end_restarts_filling() {
    let mut e = engine(EngineConfig::default());
    e.start(1500).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));

    e.set_play_head(2000);
    let deadline = Instant::now() + Duration::from_secs(5);
    while e.next_ms() <= 2000 {
        assert!(Instant::now() < deadline, "fill thread never reached the end");
        std::thread::sleep(Duration::from_millis(5));
    }

    let f = poll_frame(&e, 1000).unwrap();
    assert!((f.timestamp_ms() - 1000).abs() <= 50);
    assert!(e.stats().resyncs >= 1);
    assert_eq!(e.stats().failures, 0);
}

#[test]
fn end_of_content_idles_without_failures() {
    let mut e = engine(EngineConfig::default());
    e.start(1900).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(e.stats().failures, 0);
    assert!(e.next_ms() <= 2000 + 34 + 34);
}

#[test]
fn stop_is_idempotent_and_clears_queue() {
    let mut e = engine(EngineConfig::default());
    e.start(0).unwrap();
    assert!(e.wait_warm(Duration::from_secs(5)));
    e.stop();
    e.stop();
    assert!(!e.is_running());
    assert_eq!(e.queue_len(), 0);
    assert!(!e.wait_warm(Duration::from_millis(20)));
}

#[test]
fn negative_start_is_rejected() {
    let mut e = engine(EngineConfig::default());
    let err = e.start(-5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert!(!e.is_running());
}

#[test]
fn invalid_engine_config_is_rejected() {
    let bad = EngineConfig {
        queue_capacity: 0,
        ..EngineConfig::default()
    };
    assert!(bad.validate().is_err());
    let bad = EngineConfig {
        resync_window_ms: 100,
        ..EngineConfig::default()
    };
    assert!(bad.validate().is_err());
    assert!(EngineConfig::default().validate().is_ok());
}
