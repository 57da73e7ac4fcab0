//! Gabor patches: an oriented cosine grating under a Gaussian envelope.
//!
//! For a pixel expressed in the grating frame `(x, y)` (origin at the patch
//! centre, rotated by the orientation):
//!
//! ```text
//! envelope = exp(-(x² + γ·y²) / (2·(size/4)²))
//! grating  = cos(2π·f·x + phase)
//! pixel    = contrast · A_max · envelope · grating + grey_level
//! ```
//!
//! `size` spans ±2 standard deviations of the envelope and `A_max` is the
//! largest amplitude the pixel boundaries allow around `grey_level`, so any
//! contrast in `[0, 1]` stays displayable.

use crate::canvas::{cosine_grating, Canvas, Photometric, RotatedFrame, StimulusImage};
use crate::error::Result;
use crate::param_space::{
    validate_descriptors, ParameterAssignment, ParameterDescriptor, ParameterSpace,
    ParameterValue,
};
use crate::values::{
    gammas_from_eccentricities, AngleSpec, LocationSpec, ORIENTATION_PERIOD, PHASE_PERIOD,
};

/// Configuration of a [`GaborSet`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GaborConfig {
    pub canvas: Canvas,
    pub locations: LocationSpec,
    /// Envelope sizes (±2 SD) in pixels.
    pub sizes: Vec<f64>,
    /// Grating frequencies; cycles per pixel, or per envelope size when
    /// `relative_spatial_frequency` is set.
    pub spatial_frequencies: Vec<f64>,
    /// Fractions of the maximum displayable amplitude.
    pub contrasts: Vec<f64>,
    pub orientations: AngleSpec,
    pub phases: AngleSpec,
    /// Envelope eccentricities in `[0, 1]`; `None` gives circular envelopes.
    pub eccentricities: Option<Vec<f64>>,
    #[serde(flatten)]
    pub photometric: Photometric,
    /// Divide each frequency by the combination's size before rendering.
    pub relative_spatial_frequency: bool,
}

impl Default for GaborConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            locations: LocationSpec::default(),
            sizes: vec![16.0],
            spatial_frequencies: vec![1.0],
            contrasts: vec![1.0],
            orientations: AngleSpec::EvenlySpaced(8),
            phases: AngleSpec::Values(vec![0.0]),
            eccentricities: None,
            photometric: Photometric::default(),
            relative_spatial_frequency: true,
        }
    }
}

/// Fully resolved arguments of one Gabor patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    pub location: [f64; 2],
    pub size: f64,
    /// Absolute frequency in cycles per pixel.
    pub spatial_frequency: f64,
    pub contrast: f64,
    pub orientation: f64,
    pub phase: f64,
    pub gamma: f64,
}

impl GaborParams {
    pub fn from_assignment(a: &ParameterAssignment) -> Result<Self> {
        Ok(Self {
            location: a.point("location")?,
            size: a.scalar("size")?,
            spatial_frequency: a.scalar("spatial_frequency")?,
            contrast: a.scalar("contrast")?,
            orientation: a.scalar("orientation")?,
            phase: a.scalar("phase")?,
            gamma: a.scalar("gamma")?,
        })
    }
}

/// The Gabor formula bound to one canvas and photometric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborRenderer {
    pub canvas: Canvas,
    pub photometric: Photometric,
}

impl GaborRenderer {
    pub fn new(canvas: Canvas, photometric: Photometric) -> Self {
        Self {
            canvas,
            photometric,
        }
    }

    pub fn render(&self, p: &GaborParams) -> StimulusImage {
        self.canvas.render(self.pixel_fn(p))
    }

    /// Full-precision pixel value at `(x, y)` for one patch.
    pub fn pixel_fn(&self, p: &GaborParams) -> impl Fn(f64, f64) -> f64 {
        let frame = RotatedFrame::new(p.location, p.orientation);
        let sigma = p.size / 4.0;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let amplitude = self.photometric.amplitude(p.contrast);
        let grey = self.photometric.grey_level;
        let p = *p;

        move |px, py| {
            let v = frame.to_local(px, py);
            let envelope = (-(v.x * v.x + p.gamma * v.y * v.y) / two_sigma_sq).exp();
            let grating = cosine_grating(p.spatial_frequency, v.x, p.phase);
            amplitude * envelope * grating + grey
        }
    }
}

/// Every combination of location, size, frequency, contrast, orientation,
/// phase and aspect ratio, rendered as a Gabor patch.
#[derive(Debug, Clone)]
pub struct GaborSet {
    config: GaborConfig,
    renderer: GaborRenderer,
    descriptors: Vec<ParameterDescriptor>,
}

impl GaborSet {
    pub fn new(config: GaborConfig) -> Result<Self> {
        config.canvas.validate()?;
        config.photometric.validate()?;

        let descriptors = vec![
            ParameterDescriptor::points("location", &config.locations.resolve()),
            ParameterDescriptor::scalars("size", &config.sizes),
            ParameterDescriptor::scalars("spatial_frequency", &config.spatial_frequencies),
            ParameterDescriptor::scalars("contrast", &config.contrasts),
            ParameterDescriptor::scalars(
                "orientation",
                &config.orientations.resolve(ORIENTATION_PERIOD)?,
            ),
            ParameterDescriptor::scalars("phase", &config.phases.resolve(PHASE_PERIOD)?),
            ParameterDescriptor::scalars(
                "gamma",
                &gammas_from_eccentricities(config.eccentricities.as_deref())?,
            ),
        ];
        validate_descriptors(&descriptors)?;

        let set = Self {
            renderer: GaborRenderer::new(config.canvas, config.photometric),
            config,
            descriptors,
        };
        tracing::debug!(
            counts = ?set.counts(),
            total = set.total_combinations(),
            "gabor set configured"
        );
        Ok(set)
    }

    /// Parse a [`GaborConfig`] from JSON text and build the set.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &GaborConfig {
        &self.config
    }

    pub fn renderer(&self) -> &GaborRenderer {
        &self.renderer
    }
}

impl ParameterSpace for GaborSet {
    fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    fn resolve(&self, assignment: ParameterAssignment) -> Result<ParameterAssignment> {
        relative_frequency(assignment, self.config.relative_spatial_frequency)
    }

    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage> {
        Ok(self.renderer.render(&GaborParams::from_assignment(assignment)?))
    }
}

/// Express `spatial_frequency` per pixel when it was configured per envelope size.
pub(crate) fn relative_frequency(
    mut assignment: ParameterAssignment,
    relative: bool,
) -> Result<ParameterAssignment> {
    if relative {
        let size = assignment.scalar("size")?;
        let frequency = assignment.scalar("spatial_frequency")?;
        assignment.set("spatial_frequency", ParameterValue::Scalar(frequency / size))?;
    }
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{max_abs, single_gabor_config};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn single_patch_peaks_at_its_centre() {
        let set = GaborSet::new(single_gabor_config()).unwrap();
        assert_eq!(set.total_combinations(), 1);

        let all = set.all_stimuli().unwrap();
        assert_eq!(all.shape(), [1, 9, 9]);
        assert_abs_diff_eq!(all.at(0, 4, 4).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_contrast_is_flat_grey() {
        let mut cfg = single_gabor_config();
        cfg.contrasts = vec![0.0];
        let img = GaborSet::new(cfg.clone()).unwrap().stimulus_at(0).unwrap();
        assert!(img.pixels().all(|p| p[0] == 0.0));

        cfg.photometric.grey_level = 0.3;
        let img = GaborSet::new(cfg).unwrap().stimulus_at(0).unwrap();
        for p in img.pixels() {
            assert_abs_diff_eq!(p[0], 0.3, epsilon = 1e-6);
        }
    }

    #[test]
    fn full_contrast_stays_within_unit_amplitude() {
        let mut cfg = single_gabor_config();
        cfg.canvas = Canvas::new(32, 24);
        cfg.locations = LocationSpec::Explicit(vec![[10.0, 12.0], [20.5, 7.0]]);
        cfg.sizes = vec![6.0, 20.0];
        cfg.spatial_frequencies = vec![0.05, 0.3];
        cfg.orientations = AngleSpec::EvenlySpaced(4);
        cfg.phases = AngleSpec::EvenlySpaced(3);
        cfg.eccentricities = Some(vec![0.0, 0.8]);
        let set = GaborSet::new(cfg).unwrap();

        for (_, img) in set.iter_stimuli() {
            assert!(max_abs(&img.unwrap()) <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn grey_level_shrinks_the_amplitude() {
        let mut cfg = single_gabor_config();
        cfg.photometric = Photometric::new(-0.2, [-1.0, 1.0]);
        let img = GaborSet::new(cfg).unwrap().stimulus_at(0).unwrap();
        assert_abs_diff_eq!(img.get_pixel(4, 4)[0], 0.6, epsilon = 1e-6);
    }

    #[test]
    fn relative_frequency_is_divided_by_size() {
        let mut cfg = single_gabor_config();
        cfg.sizes = vec![4.0, 8.0];
        cfg.spatial_frequencies = vec![0.5];
        cfg.relative_spatial_frequency = true;
        let set = GaborSet::new(cfg).unwrap();

        let raw = set.raw_assignment_at(1).unwrap();
        assert_eq!(raw.scalar("spatial_frequency").unwrap(), 0.5);

        let resolved = set.assignment_at(1).unwrap();
        assert_relative_eq!(resolved.scalar("spatial_frequency").unwrap(), 0.5 / 8.0);
        assert_relative_eq!(
            set.assignment_at(0).unwrap().scalar("spatial_frequency").unwrap(),
            0.5 / 4.0
        );

        // The sweep renders the resolved frequency, not the configured one.
        let params = GaborParams::from_assignment(&resolved).unwrap();
        let expected = set.renderer().render(&params);
        assert_eq!(set.all_stimuli().unwrap().get(1).unwrap(), expected);
    }

    #[test]
    fn quarter_turn_transposes_a_centred_patch() {
        let mut cfg = single_gabor_config();
        cfg.orientations = AngleSpec::Values(vec![0.0, FRAC_PI_2]);
        cfg.spatial_frequencies = vec![0.2];
        let set = GaborSet::new(cfg).unwrap();
        let a = set.stimulus_at(0).unwrap();
        let b = set.stimulus_at(1).unwrap();
        for y in 0..9 {
            for x in 0..9 {
                assert_abs_diff_eq!(b.get_pixel(x, y)[0], a.get_pixel(y, x)[0], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn eccentricity_becomes_gamma_descriptor() {
        let mut cfg = single_gabor_config();
        cfg.eccentricities = Some(vec![0.0, 0.6]);
        let set = GaborSet::new(cfg).unwrap();
        assert_eq!(set.total_combinations(), 2);
        assert_abs_diff_eq!(
            set.assignment_at(1).unwrap().scalar("gamma").unwrap(),
            0.64,
            epsilon = 1e-12
        );
    }

    #[test]
    fn grid_locations_and_counts() {
        let mut cfg = single_gabor_config();
        cfg.locations = LocationSpec::grid([2, 5], [3, 5]);
        cfg.orientations = AngleSpec::EvenlySpaced(4);
        let set = GaborSet::new(cfg).unwrap();
        assert_eq!(set.counts(), vec![6, 1, 1, 1, 4, 1, 1]);
        assert_eq!(set.assignment_at(4).unwrap().point("location").unwrap(), [2.0, 4.0]);
    }

    #[test]
    fn empty_value_list_is_a_configuration_error() {
        let mut cfg = single_gabor_config();
        cfg.sizes.clear();
        assert!(GaborSet::new(cfg).is_err());
    }

    #[test]
    fn config_parses_from_json_with_defaults() {
        let set = GaborSet::from_json_str(
            r#"{
                "canvas": {"width": 9, "height": 9},
                "locations": {"explicit": [[4.0, 4.0]]},
                "sizes": [4.0],
                "spatial_frequencies": [0.1],
                "contrasts": [1.0],
                "orientations": {"values": [0.0]},
                "phases": {"evenly_spaced": 2},
                "relative_spatial_frequency": false
            }"#,
        )
        .unwrap();
        assert_eq!(set.config().photometric, Photometric::default());
        assert_eq!(set.total_combinations(), 2);
        assert_abs_diff_eq!(set.stimulus_at(0).unwrap().get_pixel(4, 4)[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(set.stimulus_at(1).unwrap().get_pixel(4, 4)[0], -1.0, epsilon = 1e-6);
    }
}
