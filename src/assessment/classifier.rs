//! Threshold rules for tracks that need operator attention.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::metrics::TrackSummary;
use crate::assessment::reconstruct::Reconstruction;

/// Thresholds for flagging problematic tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Tracks spanning fewer frames than this are flagged
    pub min_duration: usize,
    /// Tracks with more gaps than this are flagged
    pub max_gaps: usize,
    /// Tracks with a lower average confidence are flagged
    pub min_confidence: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            min_duration: 10,
            max_gaps: 3,
            min_confidence: 0.4,
        }
    }
}

/// Why a track was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FlagReason {
    ShortDuration { duration: usize, min_duration: usize },
    Fragmented { gaps: usize, max_gaps: usize },
    LowConfidence { average: f64, min_confidence: f64 },
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortDuration {
                duration,
                min_duration,
            } => write!(f, "duration {} < {}", duration, min_duration),
            Self::Fragmented { gaps, max_gaps } => write!(f, "{} gaps > {}", gaps, max_gaps),
            Self::LowConfidence {
                average,
                min_confidence,
            } => write!(f, "avg confidence {:.2} < {:.2}", average, min_confidence),
        }
    }
}

/// Evaluate every rule for every track and keep the tracks that broke any.
///
/// Summaries missing from `summaries` are computed from the track itself.
pub fn classify(
    reconstruction: &Reconstruction,
    summaries: &BTreeMap<i64, TrackSummary>,
    thresholds: &ClassifierThresholds,
) -> BTreeMap<i64, Vec<FlagReason>> {
    let mut flagged = BTreeMap::new();

    for (&id, track) in reconstruction.tracks() {
        let summary = summaries
            .get(&id)
            .copied()
            .unwrap_or_else(|| TrackSummary::of(track));

        let mut reasons = Vec::new();
        if summary.duration() < thresholds.min_duration {
            reasons.push(FlagReason::ShortDuration {
                duration: summary.duration(),
                min_duration: thresholds.min_duration,
            });
        }
        if summary.gap_count > thresholds.max_gaps {
            reasons.push(FlagReason::Fragmented {
                gaps: summary.gap_count,
                max_gaps: thresholds.max_gaps,
            });
        }
        if summary.average_confidence < thresholds.min_confidence {
            reasons.push(FlagReason::LowConfidence {
                average: summary.average_confidence,
                min_confidence: thresholds.min_confidence,
            });
        }

        if !reasons.is_empty() {
            flagged.insert(id, reasons);
        }
    }

    flagged
}

/// Ids of tracks that break at least one threshold rule.
pub fn flag(
    reconstruction: &Reconstruction,
    summaries: &BTreeMap<i64, TrackSummary>,
    thresholds: &ClassifierThresholds,
) -> BTreeSet<i64> {
    classify(reconstruction, summaries, thresholds)
        .into_keys()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{ReconstructConfig, reconstruct, summarize};
    use crate::table::{BoundingBox, Detection, Frame};

    fn rec(tracks: &[(i64, &[usize], f64)]) -> Reconstruction {
        let max = tracks
            .iter()
            .flat_map(|(_, frames, _)| frames.iter().copied())
            .max()
            .unwrap_or(0);
        let mut frames: Vec<Frame> = (0..=max).map(Frame::new).collect();
        for &(id, track_frames, conf) in tracks {
            for &f in track_frames {
                frames[f].detections.push(Detection::new(
                    f,
                    id,
                    0,
                    conf,
                    BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                ));
            }
        }
        reconstruct(&frames, &ReconstructConfig::default())
    }

    #[test]
    fn test_flag_rules() {
        let long: Vec<usize> = (0..20).collect();
        let short: Vec<usize> = (0..5).collect();
        let fragmented: Vec<usize> = (0..40).step_by(5).collect();
        let r = rec(&[
            (1, &long[..], 0.9),
            (2, &short[..], 0.9),
            (3, &fragmented[..], 0.9),
            (4, &long[..], 0.35),
        ]);
        let summaries = summarize(&r);
        let flagged = flag(&r, &summaries, &ClassifierThresholds::default());

        assert_eq!(flagged, BTreeSet::from([2, 3, 4]));

        let reasons = classify(&r, &summaries, &ClassifierThresholds::default());
        assert!(matches!(&reasons[&2][..], [FlagReason::ShortDuration { duration: 5, .. }]));
        assert!(matches!(&reasons[&3][..], [FlagReason::Fragmented { gaps: 7, .. }]));
        assert!(matches!(&reasons[&4][..], [FlagReason::LowConfidence { .. }]));
    }

    #[test]
    fn test_boundaries_are_not_flagged() {
        // Exactly min_duration frames and exactly max_gaps gaps.
        let frames: Vec<usize> = vec![0, 2, 4, 6, 7, 8, 9];
        let r = rec(&[(1, &frames[..], 0.4)]);
        let thresholds = ClassifierThresholds {
            min_duration: 10,
            max_gaps: 3,
            min_confidence: 0.3,
        };
        assert!(flag(&r, &summarize(&r), &thresholds).is_empty());
    }

    #[test]
    fn test_confidence_just_below_threshold_is_flagged() {
        let r = rec(&[(1, &[0][..], 0.39999999), (2, &[1][..], 0.4)]);
        let thresholds = ClassifierThresholds {
            min_duration: 1,
            ..Default::default()
        };
        let flagged = flag(&r, &summarize(&r), &thresholds);

        assert_eq!(flagged, BTreeSet::from([1]));
    }

    #[test]
    fn test_missing_summary_computed() {
        let short: Vec<usize> = (0..3).collect();
        let r = rec(&[(9, &short[..], 0.9)]);
        let flagged = flag(&r, &BTreeMap::new(), &ClassifierThresholds::default());
        assert!(flagged.contains(&9));
    }

    #[test]
    fn test_reason_display() {
        let reason = FlagReason::LowConfidence {
            average: 0.351,
            min_confidence: 0.4,
        };
        assert_eq!(reason.to_string(), "avg confidence 0.35 < 0.40");
    }
}
