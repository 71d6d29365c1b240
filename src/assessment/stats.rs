//! Population statistics and per-track variability.

use ndarray::aview1;

use crate::assessment::track::Track;

/// Arithmetic mean, `None` for an empty sample.
pub fn mean(samples: &[f64]) -> Option<f64> {
    aview1(samples).mean()
}

/// Population standard deviation (divides by `n`), `None` for an empty sample.
pub fn population_std(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(aview1(samples).std(0.0))
}

/// Coefficient of variation `std / mean`; `+inf` when the mean is zero.
pub fn coefficient_of_variation(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    let std = population_std(samples)?;
    if mean > 0.0 {
        Some(std / mean)
    } else {
        Some(f64::INFINITY)
    }
}

/// Variability of one track. A component is `None` when the track has fewer
/// than two qualifying samples for it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackVariability {
    /// Std of center displacement between adjacent frames
    pub velocity: Option<f64>,
    /// Coefficient of variation of box area
    pub size: Option<f64>,
    /// Std of detection confidence
    pub confidence: Option<f64>,
}

impl TrackVariability {
    pub fn of(track: &Track) -> Self {
        Self {
            velocity: at_least_two(track.velocity_samples(), population_std),
            size: at_least_two(track.areas(), coefficient_of_variation),
            confidence: at_least_two(track.confidences(), population_std),
        }
    }
}

fn at_least_two(samples: Vec<f64>, stat: fn(&[f64]) -> Option<f64>) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    stat(&samples)
}
