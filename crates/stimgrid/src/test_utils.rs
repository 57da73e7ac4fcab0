//! Shared helpers for the unit tests: tiny synthetic parameter spaces and
//! image comparisons.

use crate::canvas::{Canvas, Photometric, StimulusImage};
use crate::error::{Result, StimulusError};
use crate::gabor::GaborConfig;
use crate::param_space::{ParameterAssignment, ParameterDescriptor, ParameterSpace};
use crate::values::{AngleSpec, LocationSpec};

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

/// Parameter space over `0..n` per descriptor; each stimulus is filled with
/// the decimal encoding of its digits plus a small per-pixel ramp.
pub(crate) struct CountingSpace {
    descriptors: Vec<ParameterDescriptor>,
}

impl CountingSpace {
    pub(crate) fn new(counts: &[usize]) -> Self {
        let descriptors = counts
            .iter()
            .zip(NAMES)
            .map(|(&n, name)| {
                let values: Vec<f64> = (0..n).map(|v| v as f64).collect();
                ParameterDescriptor::scalars(name, &values)
            })
            .collect();
        Self { descriptors }
    }
}

impl ParameterSpace for CountingSpace {
    fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    fn canvas(&self) -> Canvas {
        Canvas::new(3, 2)
    }

    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage> {
        let code = assignment
            .iter()
            .filter_map(|(_, v)| v.as_scalar())
            .fold(0.0, |acc, v| acc * 10.0 + v);
        Ok(self.canvas().render(|x, y| code + 0.01 * (x + 3.0 * y)))
    }
}

/// Single-descriptor space whose combination `fail_at` is invalid.
pub(crate) struct FailingSpace {
    descriptors: Vec<ParameterDescriptor>,
    fail_at: f64,
}

impl FailingSpace {
    pub(crate) fn new(total: usize, fail_at: usize) -> Self {
        let values: Vec<f64> = (0..total).map(|v| v as f64).collect();
        Self {
            descriptors: vec![ParameterDescriptor::scalars("k", &values)],
            fail_at: fail_at as f64,
        }
    }
}

impl ParameterSpace for FailingSpace {
    fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    fn canvas(&self) -> Canvas {
        Canvas::new(2, 2)
    }

    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage> {
        let k = assignment.scalar("k")?;
        if k == self.fail_at {
            return Err(StimulusError::Domain(format!("combination {} rejected", k)));
        }
        Ok(self.canvas().render(|_, _| k))
    }
}

/// 9×9 canvas, one patch at the centre, size 4, absolute frequency 0.1,
/// full contrast, orientation and phase 0, grey 0 in `[-1, 1]`.
pub(crate) fn single_gabor_config() -> GaborConfig {
    GaborConfig {
        canvas: Canvas::new(9, 9),
        locations: LocationSpec::Explicit(vec![[4.0, 4.0]]),
        sizes: vec![4.0],
        spatial_frequencies: vec![0.1],
        contrasts: vec![1.0],
        orientations: AngleSpec::Values(vec![0.0]),
        phases: AngleSpec::Values(vec![0.0]),
        eccentricities: None,
        photometric: Photometric::default(),
        relative_spatial_frequency: false,
    }
}

pub(crate) fn max_abs(img: &StimulusImage) -> f32 {
    img.pixels().map(|p| p[0].abs()).fold(0.0, f32::max)
}

pub(crate) fn max_abs_diff(a: &StimulusImage, b: &StimulusImage) -> f32 {
    assert_eq!(a.dimensions(), b.dimensions());
    a.pixels()
        .zip(b.pixels())
        .map(|(p, q)| (p[0] - q[0]).abs())
        .fold(0.0, f32::max)
}

/// Pixel-wise sum of two equally sized images.
pub(crate) fn sum(a: &StimulusImage, b: &StimulusImage) -> StimulusImage {
    let (w, h) = a.dimensions();
    image::ImageBuffer::from_fn(w, h, |x, y| {
        image::Luma([a.get_pixel(x, y)[0] + b.get_pixel(x, y)[0]])
    })
}
