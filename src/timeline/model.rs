use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{PreviewError, PreviewResult};

/// Stable clip identity used for cache bookkeeping.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(pub u64);

/// Read-only timeline: an ordered stack of tracks.
///
/// Tracks composite bottom-to-top in declaration order. A timeline is shared between renderers
/// and playback engines behind an `Arc` and never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Tracks, bottom first.
    pub tracks: Vec<Track>,
}

/// A named lane of non-owning clip placements.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    /// Display name.
    pub name: String,
    /// Clips on this track. Overlaps inside one track resolve to the later clip.
    pub clips: Vec<Clip>,
}

/// A clip placed on the timeline over `[start_ms, start_ms + duration_ms)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    /// Unique identity across the whole timeline.
    pub id: ClipId,
    /// Timeline position of the first frame.
    pub start_ms: i64,
    /// Length on the timeline, must be > 0.
    pub duration_ms: i64,
    /// What the clip decodes to.
    pub source: ClipSource,
    /// Placement on the output canvas. `None` covers the whole canvas.
    #[serde(default)]
    pub rect: Option<kurbo::Rect>,
}

/// Media behind a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipSource {
    /// Animated test pattern: solid fill plus a bar that moves with clip-local time.
    TestPattern {
        /// Straight-alpha RGBA8 base color.
        color: [u8; 4],
    },
    /// Static solid color.
    Solid {
        /// Straight-alpha RGBA8 color.
        color: [u8; 4],
    },
}

impl Clip {
    /// Exclusive end timestamp.
    pub fn end_ms(&self) -> i64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Return `true` when `timestamp_ms` falls inside the clip.
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms < self.end_ms()
    }
}

impl Timeline {
    /// Parse and validate a timeline from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PreviewResult<Self> {
        let timeline: Self = serde_json::from_reader(r)
            .map_err(|e| PreviewError::validation(format!("parse timeline JSON: {e}")))?;
        timeline.validate()?;
        Ok(timeline)
    }

    /// Parse and validate a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PreviewError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate clip placement invariants.
    pub fn validate(&self) -> PreviewResult<()> {
        let mut seen = HashSet::new();
        for track in &self.tracks {
            for clip in &track.clips {
                if clip.start_ms < 0 {
                    return Err(PreviewError::validation(format!(
                        "clip {} on track '{}' starts before 0",
                        clip.id.0, track.name
                    )));
                }
                if clip.duration_ms <= 0 {
                    return Err(PreviewError::validation(format!(
                        "clip {} on track '{}' must have duration_ms > 0",
                        clip.id.0, track.name
                    )));
                }
                if let Some(r) = clip.rect
                    && (!r.is_finite() || r.width() <= 0.0 || r.height() <= 0.0)
                {
                    return Err(PreviewError::validation(format!(
                        "clip {} rect must be finite with positive area",
                        clip.id.0
                    )));
                }
                if !seen.insert(clip.id) {
                    return Err(PreviewError::validation(format!(
                        "duplicate clip id {}",
                        clip.id.0
                    )));
                }
            }
        }
        Ok(())
    }

    /// Exclusive end of the last clip; `0` for an empty timeline.
    pub fn end_ms(&self) -> i64 {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(Clip::end_ms)
            .max()
            .unwrap_or(0)
    }

    /// Clips visible at `timestamp_ms`, bottom track first, at most one per track.
    pub fn active_clips(&self, timestamp_ms: i64) -> Vec<&Clip> {
        self.tracks
            .iter()
            .filter_map(|t| t.clips.iter().rev().find(|c| c.contains(timestamp_ms)))
            .collect()
    }

    /// Topmost clip visible at `timestamp_ms`.
    pub fn top_clip_at(&self, timestamp_ms: i64) -> Option<&Clip> {
        self.tracks
            .iter()
            .rev()
            .find_map(|t| t.clips.iter().rev().find(|c| c.contains(timestamp_ms)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
