//! Track reconstruction, quality metrics and problematic-track classification.
//!
//! Everything here is a pure function of a table snapshot: rebuild, never
//! patch, whenever the table changes.

mod classifier;
mod metrics;
mod reconstruct;
mod stats;
mod track;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub use classifier::{ClassifierThresholds, FlagReason, classify, flag};
pub use metrics::{AggregateMetrics, TrackSummary, aggregate, summarize};
pub use reconstruct::{ReconstructConfig, Reconstruction, reconstruct};
pub use stats::{TrackVariability, coefficient_of_variation, mean, population_std};
pub use track::{Gap, Track, TrackPoint};

use crate::table::Frame;
use crate::Result;

/// Everything an operator needs to review one table snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub summaries: BTreeMap<i64, TrackSummary>,
    pub metrics: AggregateMetrics,
    pub flagged: BTreeSet<i64>,
    pub reasons: BTreeMap<i64, Vec<FlagReason>>,
}

/// Run the full pipeline: reconstruct, summarize, aggregate and classify.
///
/// Fails with [`crate::Error::EmptyInput`] when no track survives filtering.
pub fn assess(
    frames: &[Frame],
    reconstruct_config: &ReconstructConfig,
    thresholds: &ClassifierThresholds,
) -> Result<Assessment> {
    let reconstruction = reconstruct(frames, reconstruct_config);
    let summaries = summarize(&reconstruction);
    let metrics = aggregate(&reconstruction)?;
    let reasons = classify(&reconstruction, &summaries, thresholds);
    let flagged = reasons.keys().copied().collect();

    Ok(Assessment {
        summaries,
        metrics,
        flagged,
        reasons,
    })
}

/// First and last frame of every track, in track id order.
///
/// `None` when there are no tracks.
pub fn edge_frames(summaries: &BTreeMap<i64, TrackSummary>) -> Option<(Vec<usize>, Vec<usize>)> {
    if summaries.is_empty() {
        return None;
    }

    Some(
        summaries
            .values()
            .map(|summary| (summary.start_frame, summary.end_frame))
            .unzip(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DetectionTable;

    const TABLE: &str = "frame,track_id,class_id,confidence,x1,y1,x2,y2\n\
                         0,1,0,0.9,0,0,10,10\n\
                         1,1,0,0.9,1,0,11,10\n\
                         1,2,0,0.2,5,5,6,6\n\
                         3,2,0,0.8,5,5,6,6\n\
                         4,2,0,0.8,6,5,7,6\n";

    #[test]
    fn test_assess_pipeline() {
        let frames = DetectionTable::from_reader(TABLE.as_bytes())
            .unwrap()
            .to_frames();
        let result = assess(
            &frames,
            &ReconstructConfig::default(),
            &ClassifierThresholds::default(),
        )
        .unwrap();

        assert_eq!(result.metrics.total_tracks, 2);
        assert_eq!(result.metrics.total_frames, 5);
        // The 0.2 detection of track 2 is dropped, so it starts at frame 3.
        assert_eq!(result.summaries[&2].start_frame, 3);
        // Both tracks are shorter than the default minimum duration.
        assert_eq!(result.flagged, BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_edge_frames() {
        let frames = DetectionTable::from_reader(TABLE.as_bytes())
            .unwrap()
            .to_frames();
        let summaries = summarize(&reconstruct(&frames, &ReconstructConfig::default()));

        assert_eq!(edge_frames(&summaries), Some((vec![0, 3], vec![1, 4])));
        assert_eq!(edge_frames(&BTreeMap::new()), None);
    }
}
