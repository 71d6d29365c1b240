//! Grouping of per-frame detections into per-track sequences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assessment::track::{Track, TrackPoint};
use crate::table::Frame;

/// Configuration for track reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructConfig {
    /// Detections at or below this confidence are dropped before any
    /// derivation.
    pub min_confidence: f64,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
        }
    }
}

/// Tracks rebuilt from one snapshot of the detection table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    tracks: BTreeMap<i64, Track>,
    total_frames: usize,
    frame_counts: BTreeMap<usize, usize>,
}

impl Reconstruction {
    pub fn tracks(&self) -> &BTreeMap<i64, Track> {
        &self.tracks
    }

    pub fn track(&self, track_id: i64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Accepted detections per frame, for every frame that held at least one
    /// detection before filtering.
    pub fn frame_counts(&self) -> &BTreeMap<usize, usize> {
        &self.frame_counts
    }
}

/// Rebuild per-track sequences from frames.
///
/// Frames are visited in ascending index order whatever order they are passed
/// in, so each track's points come out strictly ordered by frame. Untracked
/// detections count toward per-frame totals but never form a track.
pub fn reconstruct(frames: &[Frame], config: &ReconstructConfig) -> Reconstruction {
    let mut ordered: Vec<&Frame> = frames.iter().collect();
    ordered.sort_by_key(|frame| frame.index);

    let mut tracks: BTreeMap<i64, Track> = BTreeMap::new();
    let mut frame_counts = BTreeMap::new();
    let mut discarded = 0usize;

    for frame in ordered {
        if frame.is_empty() {
            continue;
        }

        let mut accepted = 0;
        for det in frame.iter() {
            if det.confidence <= config.min_confidence {
                discarded += 1;
                continue;
            }
            accepted += 1;

            if !det.is_tracked() {
                continue;
            }

            let point = TrackPoint {
                frame_index: frame.index,
                bbox: det.bbox,
                confidence: det.confidence,
            };
            tracks
                .entry(det.track_id)
                .and_modify(|track| track.push(point))
                .or_insert_with(|| Track::new(det.track_id, point));
        }
        frame_counts.insert(frame.index, accepted);
    }

    debug!(
        tracks = tracks.len(),
        frames = frames.len(),
        discarded,
        min_confidence = config.min_confidence,
        "Reconstructed tracks"
    );

    Reconstruction {
        tracks,
        total_frames: frames.len(),
        frame_counts,
    }
}
