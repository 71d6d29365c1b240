//! Per-track summaries and aggregate track-quality metrics.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::assessment::reconstruct::Reconstruction;
use crate::assessment::stats::{self, TrackVariability};
use crate::assessment::track::Track;
use crate::{Error, Result};

/// Span, size and continuity of a single track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackSummary {
    pub start_frame: usize,
    pub end_frame: usize,
    pub total_detections: usize,
    pub gap_count: usize,
    pub average_confidence: f64,
}

impl TrackSummary {
    pub fn of(track: &Track) -> Self {
        let confidences = track.confidences();
        Self {
            start_frame: track.start_frame(),
            end_frame: track.end_frame(),
            total_detections: track.detection_count(),
            gap_count: track.gaps().len(),
            average_confidence: confidences.iter().sum::<f64>() / confidences.len() as f64,
        }
    }

    /// Frames spanned, inclusive of both ends.
    pub fn duration(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }
}

/// Summaries for every reconstructed track, keyed by track id.
pub fn summarize(reconstruction: &Reconstruction) -> BTreeMap<i64, TrackSummary> {
    reconstruction
        .tracks()
        .iter()
        .map(|(&id, track)| (id, TrackSummary::of(track)))
        .collect()
}

/// Process-wide track quality metrics.
///
/// The three variability averages are only present when at least one track
/// had enough samples to compute them; they are never reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub total_tracks: usize,
    pub total_frames: usize,
    pub avg_detections_per_frame: f64,
    pub avg_track_duration: f64,
    pub max_track_duration: usize,
    pub min_track_duration: usize,
    pub avg_track_fragmentation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_velocity_consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_size_consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_confidence_stability: Option<f64>,
    /// Mean of `1 / (1 + component)` over the available variability averages,
    /// or 0 when none is available.
    pub track_stability_score: f64,
}

/// Aggregate metrics over all reconstructed tracks.
///
/// Fails with [`Error::EmptyInput`] when there are no tracks.
pub fn aggregate(reconstruction: &Reconstruction) -> Result<AggregateMetrics> {
    let tracks = reconstruction.tracks();
    if tracks.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut durations = Vec::with_capacity(tracks.len());
    let mut fragmentations = Vec::with_capacity(tracks.len());
    let mut velocity = Vec::new();
    let mut size = Vec::new();
    let mut confidence = Vec::new();

    for track in tracks.values() {
        durations.push(track.duration());
        fragmentations.push(track.gaps().len() as f64);

        let variability = TrackVariability::of(track);
        velocity.extend(variability.velocity);
        size.extend(variability.size);
        confidence.extend(variability.confidence);
    }

    let counts: Vec<f64> = reconstruction
        .frame_counts()
        .values()
        .map(|&c| c as f64)
        .collect();
    let duration_samples: Vec<f64> = durations.iter().map(|&d| d as f64).collect();

    let avg_velocity_consistency = stats::mean(&velocity);
    let avg_size_consistency = stats::mean(&size);
    let avg_confidence_stability = stats::mean(&confidence);

    let factors: Vec<f64> = [
        avg_size_consistency,
        avg_velocity_consistency,
        avg_confidence_stability,
    ]
    .into_iter()
    .flatten()
    .map(|component| 1.0 / (1.0 + component))
    .collect();

    Ok(AggregateMetrics {
        total_tracks: tracks.len(),
        total_frames: reconstruction.total_frames(),
        avg_detections_per_frame: stats::mean(&counts).unwrap_or(0.0),
        avg_track_duration: stats::mean(&duration_samples).unwrap_or(0.0),
        max_track_duration: durations.iter().copied().max().unwrap_or(0),
        min_track_duration: durations.iter().copied().min().unwrap_or(0),
        avg_track_fragmentation: stats::mean(&fragmentations).unwrap_or(0.0),
        avg_velocity_consistency,
        avg_size_consistency,
        avg_confidence_stability,
        track_stability_score: stats::mean(&factors).unwrap_or(0.0),
    })
}

enum Field {
    Count(usize),
    Value(Option<f64>),
}

/// One line per metric in field order; absent components are skipped.
impl fmt::Display for AggregateMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tracking Assessment Metrics:")?;
        writeln!(f, "{}", "-".repeat(50))?;

        let fields = [
            ("total_tracks", Field::Count(self.total_tracks)),
            ("total_frames", Field::Count(self.total_frames)),
            ("avg_detections_per_frame", Field::Value(Some(self.avg_detections_per_frame))),
            ("avg_track_duration", Field::Value(Some(self.avg_track_duration))),
            ("max_track_duration", Field::Count(self.max_track_duration)),
            ("min_track_duration", Field::Count(self.min_track_duration)),
            ("avg_track_fragmentation", Field::Value(Some(self.avg_track_fragmentation))),
            ("avg_velocity_consistency", Field::Value(self.avg_velocity_consistency)),
            ("avg_size_consistency", Field::Value(self.avg_size_consistency)),
            ("avg_confidence_stability", Field::Value(self.avg_confidence_stability)),
            ("track_stability_score", Field::Value(Some(self.track_stability_score))),
        ];
        for (name, field) in fields {
            match field {
                Field::Count(value) => writeln!(f, "{name:25}: {value}")?,
                Field::Value(Some(value)) => writeln!(f, "{name:25}: {value:.3}")?,
                Field::Value(None) => {}
            }
        }
        Ok(())
    }
}
