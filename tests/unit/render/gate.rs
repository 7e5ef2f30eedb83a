use std::sync::Arc;

use super::*;
use crate::foundation::core::Fps;
use crate::foundation::error::ErrorKind;
use crate::pipeline::synthetic::SyntheticFactory;
use crate::render::config::RendererConfig;
use crate::render::outcome::OutcomeKind;
use crate::timeline::model::{Clip, ClipId, ClipSource, Timeline, Track};

fn gate() -> RenderGate {
    let timeline = Arc::new(Timeline {
        tracks: vec![Track {
            name: "main".to_string(),
            clips: vec![Clip {
                id: ClipId(7),
                start_ms: 0,
                duration_ms: 1000,
                source: ClipSource::Solid {
                    color: [10, 120, 220, 255],
                },
                rect: None,
            }],
        }],
    });
    let config = RendererConfig::with_output(32, 18, Fps::new(30, 1).unwrap());
    RenderGate::new(Renderer::new(timeline, config, &SyntheticFactory::default()).unwrap())
}

#[test]
fn idle_gate_renders() {
    let g = gate();
    assert!(!g.is_busy());
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Success);
    assert!(!g.is_busy());
    assert_eq!(
        g.stats(),
        GateStats {
            attempts: 1,
            skipped: 0
        }
    );
}

#[test]
fn held_flag_skips_without_rendering() {
    let g = gate();
    g.busy.store(true, Ordering::Release);
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Skipped);
    assert_eq!(g.renderer_stats().renders, 0);
    g.busy.store(false, Ordering::Release);
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Success);
    assert_eq!(g.stats().skipped, 1);
}

#[test]
fn control_lock_makes_ticks_skip() {
    let g = gate();
    let held = g.renderer.lock().unwrap();
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Skipped);
    drop(held);
    assert!(!g.is_busy());
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Success);
}

#[test]
fn poisoned_renderer_is_recovered() {
    let g = gate();
    std::thread::scope(|s| {
        let res: std::thread::Result<()> = s
            .spawn(|| {
                let _guard = g.renderer.lock().unwrap();
                panic!("render panicked");
            })
            .join();
        assert!(res.is_err());
    });
    assert!(g.renderer.is_poisoned());
    assert_eq!(g.try_render(0).kind(), OutcomeKind::Success);
    assert!(!g.renderer.is_poisoned());
}

#[test]
fn destroy_through_gate() {
    let g = gate();
    g.destroy();
    g.destroy();
    let out = g.try_render(0);
    assert_eq!(out.error().map(|e| e.kind()), Some(ErrorKind::InvalidState));
    assert!(g.into_inner().is_destroyed());
}

#[test]
fn playback_mode_passes_through() {
    let g = gate();
    g.set_playback_mode(true);
    assert!((g.frame_interval_ms() - 1000.0 / 30.0).abs() < 1e-9);
    assert!(g.into_inner().playback_mode());
}
