//! Difference-of-Gaussians blobs.
//!
//! The raw field `G(σ) − k·G(s·σ)` has a peak magnitude that depends on `σ`,
//! `s` and `k` with no closed form over a finite canvas, so it is rescaled
//! after evaluation to the amplitude the requested contrast asks for, then
//! offset by the grey level.

use crate::canvas::{Canvas, Photometric, StimulusImage};
use crate::error::{Result, StimulusError};
use crate::param_space::{
    validate_descriptors, ParameterAssignment, ParameterDescriptor, ParameterSpace,
};
use crate::values::LocationSpec;

/// Configuration of a [`DiffOfGaussiansSet`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiffOfGaussiansConfig {
    pub canvas: Canvas,
    pub locations: LocationSpec,
    /// Standard deviation of the centre Gaussian in pixels.
    pub sizes: Vec<f64>,
    /// Surround SD as a multiple of the centre SD; must exceed 1.
    pub sizes_scale_surround: Vec<f64>,
    pub contrasts: Vec<f64>,
    /// Surround weight relative to the centre.
    pub contrasts_scale_surround: Vec<f64>,
    #[serde(flatten)]
    pub photometric: Photometric,
}

impl Default for DiffOfGaussiansConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            locations: LocationSpec::default(),
            sizes: vec![4.0],
            sizes_scale_surround: vec![2.0],
            contrasts: vec![1.0],
            contrasts_scale_surround: vec![0.5],
            photometric: Photometric::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOfGaussiansParams {
    pub location: [f64; 2],
    pub size: f64,
    pub size_scale_surround: f64,
    pub contrast: f64,
    pub contrast_scale_surround: f64,
}

impl DiffOfGaussiansParams {
    pub fn from_assignment(a: &ParameterAssignment) -> Result<Self> {
        Ok(Self {
            location: a.point("location")?,
            size: a.scalar("size")?,
            size_scale_surround: a.scalar("size_scale_surround")?,
            contrast: a.scalar("contrast")?,
            contrast_scale_surround: a.scalar("contrast_scale_surround")?,
        })
    }
}

/// Unnormalized isotropic Gaussian `exp(-r² / 2σ²)` around `mean`.
pub fn gaussian_density(x: f64, y: f64, mean: [f64; 2], scale: f64) -> f64 {
    let dx = x - mean[0];
    let dy = y - mean[1];
    (-(dx * dx + dy * dy) / (2.0 * scale * scale)).exp()
}

/// Every combination of location, centre size, surround scale, contrast and
/// surround weight, rendered as a contrast-normalized DoG.
#[derive(Debug, Clone)]
pub struct DiffOfGaussiansSet {
    config: DiffOfGaussiansConfig,
    descriptors: Vec<ParameterDescriptor>,
}

impl DiffOfGaussiansSet {
    pub fn new(config: DiffOfGaussiansConfig) -> Result<Self> {
        config.canvas.validate()?;
        config.photometric.validate()?;

        let descriptors = vec![
            ParameterDescriptor::points("location", &config.locations.resolve()),
            ParameterDescriptor::scalars("size", &config.sizes),
            ParameterDescriptor::scalars("size_scale_surround", &config.sizes_scale_surround),
            ParameterDescriptor::scalars("contrast", &config.contrasts),
            ParameterDescriptor::scalars(
                "contrast_scale_surround",
                &config.contrasts_scale_surround,
            ),
        ];
        validate_descriptors(&descriptors)?;

        let set = Self {
            config,
            descriptors,
        };
        tracing::debug!(
            counts = ?set.counts(),
            total = set.total_combinations(),
            "difference-of-gaussians set configured"
        );
        Ok(set)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &DiffOfGaussiansConfig {
        &self.config
    }

    /// Render a DoG from explicit parameters.
    ///
    /// Fails when `size_scale_surround <= 1`.
    pub fn render_params(&self, p: &DiffOfGaussiansParams) -> Result<StimulusImage> {
        if p.size_scale_surround <= 1.0 || p.size_scale_surround.is_nan() {
            return Err(StimulusError::Domain(format!(
                "size_scale_surround must be larger than 1, got {}",
                p.size_scale_surround
            )));
        }

        let canvas = self.config.canvas;
        let surround_scale = p.size_scale_surround * p.size;
        let mut raw = Vec::with_capacity(canvas.n_pixels());
        for y in 0..canvas.height {
            for x in 0..canvas.width {
                let (x, y) = (x as f64, y as f64);
                let center = gaussian_density(x, y, p.location, p.size);
                let surround = gaussian_density(x, y, p.location, surround_scale);
                raw.push(center - p.contrast_scale_surround * surround);
            }
        }

        let (lo, hi) = raw
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let current = lo.abs().max(hi.abs());
        let required = self.config.photometric.amplitude(p.contrast);
        let scaling = if current > 0.0 && current.is_finite() {
            required / current
        } else {
            tracing::warn!(
                size = p.size,
                size_scale_surround = p.size_scale_surround,
                contrast_scale_surround = p.contrast_scale_surround,
                "flat difference-of-gaussians field, emitting grey"
            );
            0.0
        };

        let grey = self.config.photometric.grey_level;
        let width = canvas.width as usize;
        Ok(canvas.render(|x, y| {
            scaling * raw[y as usize * width + x as usize] + grey
        }))
    }
}

impl ParameterSpace for DiffOfGaussiansSet {
    fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage> {
        self.render_params(&DiffOfGaussiansParams::from_assignment(assignment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::max_abs;
    use approx::assert_abs_diff_eq;

    fn dog_config(size_scale_surround: f64) -> DiffOfGaussiansConfig {
        DiffOfGaussiansConfig {
            canvas: Canvas::new(25, 19),
            locations: LocationSpec::Explicit(vec![[12.0, 9.0]]),
            sizes: vec![2.0],
            sizes_scale_surround: vec![size_scale_surround],
            contrasts: vec![1.0],
            contrasts_scale_surround: vec![0.5],
            photometric: Photometric::default(),
        }
    }

    #[test]
    fn surround_must_be_wider_than_centre() {
        let set = DiffOfGaussiansSet::new(dog_config(0.5)).unwrap();
        let err = set.stimulus_at(0).unwrap_err();
        assert!(matches!(err, StimulusError::Domain(_)));

        let set = DiffOfGaussiansSet::new(dog_config(1.0)).unwrap();
        assert!(set.stimulus_at(0).is_err());

        let set = DiffOfGaussiansSet::new(dog_config(2.0)).unwrap();
        assert!(set.stimulus_at(0).is_ok());
    }

    #[test]
    fn peak_magnitude_matches_requested_contrast() {
        let mut cfg = dog_config(2.0);
        cfg.contrasts = vec![0.25, 1.0];
        cfg.sizes = vec![1.5, 3.0];
        cfg.contrasts_scale_surround = vec![0.2, 0.9];
        let set = DiffOfGaussiansSet::new(cfg).unwrap();

        for idx in 0..set.total_combinations() {
            let contrast = set.assignment_at(idx).unwrap().scalar("contrast").unwrap();
            let img = set.stimulus_at(idx).unwrap();
            assert_abs_diff_eq!(max_abs(&img), contrast as f32, epsilon = 1e-6);
        }
    }

    #[test]
    fn centre_pixel_is_positive_peak_for_weak_surround() {
        let img = DiffOfGaussiansSet::new(dog_config(2.0))
            .unwrap()
            .stimulus_at(0)
            .unwrap();
        assert_abs_diff_eq!(img.get_pixel(12, 9)[0], 1.0, epsilon = 1e-6);
        // Far corner is dominated by the (negative) surround.
        assert!(img.get_pixel(0, 0)[0] <= 0.0);
    }

    #[test]
    fn grey_level_offsets_and_limits_amplitude() {
        let mut cfg = dog_config(2.0);
        cfg.photometric = Photometric::new(0.5, [0.0, 1.0]);
        let img = DiffOfGaussiansSet::new(cfg)
            .unwrap()
            .stimulus_at(0)
            .unwrap();
        assert_abs_diff_eq!(img.get_pixel(12, 9)[0], 1.0, epsilon = 1e-6);
        assert!(img.pixels().all(|p| p[0] >= -1e-6 && p[0] <= 1.0 + 1e-6));
    }

    #[test]
    fn zero_contrast_is_flat_grey() {
        let mut cfg = dog_config(3.0);
        cfg.contrasts = vec![0.0];
        cfg.photometric.grey_level = -0.25;
        let img = DiffOfGaussiansSet::new(cfg)
            .unwrap()
            .stimulus_at(0)
            .unwrap();
        assert!(img.pixels().all(|p| (p[0] + 0.25).abs() < 1e-6));
    }

    #[test]
    fn flat_field_renders_grey_instead_of_nan() {
        let mut cfg = dog_config(2.0);
        cfg.canvas = Canvas::new(1, 1);
        cfg.locations = LocationSpec::Explicit(vec![[0.0, 0.0]]);
        cfg.contrasts_scale_surround = vec![1.0];
        let img = DiffOfGaussiansSet::new(cfg)
            .unwrap()
            .stimulus_at(0)
            .unwrap();
        assert_eq!(img.get_pixel(0, 0)[0], 0.0);
    }

    #[test]
    fn invalid_combination_aborts_only_itself() {
        let mut cfg = dog_config(2.0);
        cfg.sizes_scale_surround = vec![0.5, 2.0];
        let set = DiffOfGaussiansSet::new(cfg).unwrap();
        assert!(set.stimulus_at(0).is_err());
        assert!(set.stimulus_at(1).is_ok());
        assert!(set.all_stimuli().is_err());
    }
}
