use super::*;

fn clip(id: u64, start_ms: i64, duration_ms: i64) -> Clip {
    Clip {
        id: ClipId(id),
        start_ms,
        duration_ms,
        source: ClipSource::Solid {
            color: [255, 0, 0, 255],
        },
        rect: None,
    }
}

fn two_tracks() -> Timeline {
    Timeline {
        tracks: vec![
            Track {
                name: "base".to_string(),
                clips: vec![clip(1, 0, 1000), clip(2, 1000, 1000)],
            },
            Track {
                name: "overlay".to_string(),
                clips: vec![clip(3, 500, 1000)],
            },
        ],
    }
}

#[test]
fn end_is_max_clip_end() {
    assert_eq!(two_tracks().end_ms(), 2000);
    assert_eq!(Timeline::default().end_ms(), 0);
}

#[test]
fn active_clips_are_bottom_first_and_half_open() {
    let tl = two_tracks();
    let ids: Vec<_> = tl.active_clips(600).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![ClipId(1), ClipId(3)]);

    let ids: Vec<_> = tl.active_clips(1000).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![ClipId(2), ClipId(3)]);

    assert!(tl.active_clips(2000).is_empty());
}

#[test]
fn top_clip_prefers_upper_track() {
    let tl = two_tracks();
    assert_eq!(tl.top_clip_at(100).map(|c| c.id), Some(ClipId(1)));
    assert_eq!(tl.top_clip_at(700).map(|c| c.id), Some(ClipId(3)));
    assert_eq!(tl.top_clip_at(1600).map(|c| c.id), Some(ClipId(2)));
    assert_eq!(tl.top_clip_at(5000), None);
}

#[test]
fn validate_rejects_bad_clips() {
    assert!(two_tracks().validate().is_ok());

    let mut tl = two_tracks();
    tl.tracks[0].clips[0].duration_ms = 0;
    assert!(tl.validate().is_err());

    let mut tl = two_tracks();
    tl.tracks[1].clips[0].id = ClipId(1);
    assert!(tl.validate().unwrap_err().to_string().contains("duplicate"));

    let mut tl = two_tracks();
    tl.tracks[0].clips[0].start_ms = -1;
    assert!(tl.validate().is_err());

    let mut tl = two_tracks();
    tl.tracks[0].clips[0].rect = Some(kurbo::Rect::new(0.0, 0.0, 0.0, 10.0));
    assert!(tl.validate().is_err());
}

#[test]
fn json_round_trip_uses_tagged_sources() {
    let json = r#"{
        "tracks": [{
            "name": "main",
            "clips": [{
                "id": 7,
                "start_ms": 0,
                "duration_ms": 500,
                "source": { "kind": "test_pattern", "color": [10, 20, 30, 255] }
            }]
        }]
    }"#;
    let tl: Timeline = serde_json::from_str(json).unwrap();
    assert_eq!(tl.tracks[0].clips[0].id, ClipId(7));
    assert_eq!(tl.tracks[0].clips[0].rect, None);
    assert!(matches!(
        tl.tracks[0].clips[0].source,
        ClipSource::TestPattern { .. }
    ));
}

#[test]
fn from_reader_rejects_invalid_timelines() {
    let dup = r#"{"tracks": [{"name": "a", "clips": [
        {"id": 1, "start_ms": 0, "duration_ms": 100,
         "source": {"kind": "solid", "color": [0, 0, 0, 255]}},
        {"id": 1, "start_ms": 100, "duration_ms": 100,
         "source": {"kind": "solid", "color": [0, 0, 0, 255]}}
    ]}]}"#;
    let err = Timeline::from_reader(dup.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("duplicate clip id"));

    assert!(Timeline::from_reader("not json".as_bytes()).is_err());
    assert!(Timeline::from_path("/definitely/missing/timeline.json").is_err());
}
