//! Value-list sources that are resolved once, at construction time, into the
//! concrete lists a parameter space enumerates.

use std::f64::consts::{PI, TAU};

use crate::error::{Result, StimulusError};

/// Orientations are spread over `[0, π)`.
pub const ORIENTATION_PERIOD: f64 = PI;
/// Phases are spread over `[0, 2π)`.
pub const PHASE_PERIOD: f64 = TAU;

/// Where stimulus centres come from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSpec {
    /// Explicit `(x, y)` centres, used in the given order.
    Explicit(Vec<[f64; 2]>),
    /// Every integer centre in the half-open rectangle
    /// `[x_range[0], x_range[1]) × [y_range[0], y_range[1])`.
    ///
    /// `x` varies slowest, `y` fastest.
    Grid { x_range: [i32; 2], y_range: [i32; 2] },
}

impl LocationSpec {
    pub fn grid(x_range: [i32; 2], y_range: [i32; 2]) -> Self {
        Self::Grid { x_range, y_range }
    }

    pub fn resolve(&self) -> Vec<[f64; 2]> {
        match self {
            Self::Explicit(points) => points.clone(),
            Self::Grid { x_range, y_range } => (x_range[0]..x_range[1])
                .flat_map(|x| (y_range[0]..y_range[1]).map(move |y| [x as f64, y as f64]))
                .collect(),
        }
    }
}

impl Default for LocationSpec {
    fn default() -> Self {
        Self::Explicit(vec![[32.0, 32.0]])
    }
}

/// Angle list given either explicitly or as a count of evenly spaced values.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleSpec {
    /// Explicit angles in radians.
    Values(Vec<f64>),
    /// `n` angles `k · period / n` for `k in 0..n`.
    EvenlySpaced(usize),
}

impl AngleSpec {
    /// Resolve into radians, spreading evenly spaced counts over `[0, period)`.
    pub fn resolve(&self, period: f64) -> Result<Vec<f64>> {
        match self {
            Self::Values(values) => Ok(values.clone()),
            Self::EvenlySpaced(0) => Err(StimulusError::Configuration(
                "evenly spaced angle count must be >= 1".to_string(),
            )),
            Self::EvenlySpaced(n) => Ok((0..*n)
                .map(|k| k as f64 * period / *n as f64)
                .collect()),
        }
    }
}

impl Default for AngleSpec {
    fn default() -> Self {
        Self::Values(vec![0.0])
    }
}

impl From<Vec<f64>> for AngleSpec {
    fn from(values: Vec<f64>) -> Self {
        Self::Values(values)
    }
}

impl From<usize> for AngleSpec {
    fn from(count: usize) -> Self {
        Self::EvenlySpaced(count)
    }
}

/// Envelope aspect ratios `γ = 1 − e²`; no eccentricities means `[1]`.
pub fn gammas_from_eccentricities(eccentricities: Option<&[f64]>) -> Result<Vec<f64>> {
    let Some(eccentricities) = eccentricities else {
        return Ok(vec![1.0]);
    };
    eccentricities
        .iter()
        .map(|&e| {
            if (0.0..=1.0).contains(&e) {
                Ok(1.0 - e * e)
            } else {
                Err(StimulusError::Configuration(format!(
                    "eccentricity must lie in [0, 1], got {}",
                    e
                )))
            }
        })
        .collect()
}
