//! Per-frame detection records.

use serde::Serialize;

use crate::table::BoundingBox;

/// Track identifier written for detections that no tracker claimed.
pub const UNTRACKED: i64 = -1;

/// Largest frame index accepted from a table, about 46 hours at 60 fps.
/// Frames are dense, so the index bounds the size of every frame sequence.
pub const MAX_FRAME_INDEX: usize = 10_000_000;

/// One observed object instance in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    /// 0-based frame position in the video
    pub frame_index: usize,
    /// Track identifier, or [`UNTRACKED`]
    pub track_id: i64,
    /// Object category
    pub class_id: i64,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(
        frame_index: usize,
        track_id: i64,
        class_id: i64,
        confidence: f64,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            frame_index,
            track_id,
            class_id,
            confidence,
            bbox,
        }
    }

    #[inline]
    pub fn is_tracked(&self) -> bool {
        self.track_id != UNTRACKED
    }
}

/// A position in the video and the detections observed there.
///
/// Frames are always dense: a video of `N` frames is `N` values indexed
/// `0..N`, with empty `detections` where nothing was observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub index: usize,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            detections: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }
}
