//! Reconstructed per-track temporal sequences.

use serde::Serialize;

use crate::table::BoundingBox;

/// One accepted observation of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub frame_index: usize,
    pub bbox: BoundingBox,
    pub confidence: f64,
}

/// A break in per-frame continuity: `frame_after - frame_before > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub frame_before: usize,
    pub frame_after: usize,
}

/// All accepted detections sharing one track identifier, in frame order.
///
/// A track always holds at least one point; it only exists because some
/// detection referred to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: i64,
    points: Vec<TrackPoint>,
}

impl Track {
    pub(crate) fn new(id: i64, first: TrackPoint) -> Self {
        Self {
            id,
            points: vec![first],
        }
    }

    pub(crate) fn push(&mut self, point: TrackPoint) {
        self.points.push(point);
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn detection_count(&self) -> usize {
        self.points.len()
    }

    pub fn start_frame(&self) -> usize {
        self.points[0].frame_index
    }

    pub fn end_frame(&self) -> usize {
        self.points[self.points.len() - 1].frame_index
    }

    /// Frames spanned from first to last observation, inclusive.
    pub fn duration(&self) -> usize {
        self.end_frame() - self.start_frame() + 1
    }

    /// Continuity breaks between successive observations.
    pub fn gaps(&self) -> Vec<Gap> {
        self.points
            .windows(2)
            .filter(|pair| pair[1].frame_index - pair[0].frame_index > 1)
            .map(|pair| Gap {
                frame_before: pair[0].frame_index,
                frame_after: pair[1].frame_index,
            })
            .collect()
    }

    /// Center displacement between observations in adjacent frames.
    ///
    /// Pairs separated by a gap yield no sample: a jump across missing frames
    /// is not motion between two frames.
    pub fn velocity_samples(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .filter(|pair| pair[1].frame_index - pair[0].frame_index == 1)
            .map(|pair| nalgebra::distance(&pair[0].bbox.center(), &pair[1].bbox.center()))
            .collect()
    }

    pub fn areas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.bbox.area()).collect()
    }

    pub fn confidences(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.confidence).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_at(frames: &[usize]) -> Track {
        let mut points = frames.iter().map(|&f| TrackPoint {
            frame_index: f,
            bbox: BoundingBox::new(f as f64 * 10.0, 0.0, f as f64 * 10.0 + 4.0, 4.0),
            confidence: 0.9,
        });
        let mut track = Track::new(1, points.next().unwrap());
        points.for_each(|p| track.push(p));
        track
    }

    #[test]
    fn test_gap_detection() {
        let track = track_at(&[0, 1, 2, 5, 6]);
        let gaps = track.gaps();

        assert_eq!(
            gaps,
            vec![Gap {
                frame_before: 2,
                frame_after: 5
            }]
        );
    }

    #[test]
    fn test_velocity_excludes_gap_jumps() {
        let track = track_at(&[0, 1, 2, 5, 6]);
        let velocities = track.velocity_samples();

        // (0,1), (1,2), (5,6); the 2 -> 5 jump contributes nothing.
        assert_eq!(velocities.len(), 3);
        assert!(velocities.iter().all(|v| (v - 10.0).abs() < 1e-9));
    }

    #[test]
    fn test_span() {
        let track = track_at(&[3, 4, 9]);
        assert_eq!(track.start_frame(), 3);
        assert_eq!(track.end_frame(), 9);
        assert_eq!(track.duration(), 7);
        assert_eq!(track.detection_count(), 3);
    }

    #[test]
    fn test_single_point() {
        let track = track_at(&[4]);
        assert!(track.gaps().is_empty());
        assert!(track.velocity_samples().is_empty());
        assert_eq!(track.duration(), 1);
    }
}
