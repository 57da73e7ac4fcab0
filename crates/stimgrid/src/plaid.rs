//! Plaids: the pixel-wise sum of a preferred Gabor and its orthogonal twin.
//!
//! Both components share location, size, frequency, phase and aspect ratio;
//! only the contrast differs and the second one is turned by `π/2`. The sum
//! is not clamped, so two full-contrast components can leave the display
//! range.

use std::f64::consts::FRAC_PI_2;

use crate::canvas::{Canvas, Photometric, StimulusImage};
use crate::error::Result;
use crate::gabor::{relative_frequency, GaborParams, GaborRenderer};
use crate::param_space::{
    validate_descriptors, ParameterAssignment, ParameterDescriptor, ParameterSpace,
};
use crate::values::{
    gammas_from_eccentricities, AngleSpec, LocationSpec, ORIENTATION_PERIOD, PHASE_PERIOD,
};

/// Configuration of a [`PlaidSet`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaidConfig {
    pub canvas: Canvas,
    pub locations: LocationSpec,
    pub sizes: Vec<f64>,
    pub spatial_frequencies: Vec<f64>,
    /// Orientation of the preferred component.
    pub orientations: AngleSpec,
    pub phases: AngleSpec,
    pub eccentricities: Option<Vec<f64>>,
    pub contrasts_preferred: Vec<f64>,
    pub contrasts_orthogonal: Vec<f64>,
    #[serde(flatten)]
    pub photometric: Photometric,
    pub relative_spatial_frequency: bool,
}

impl Default for PlaidConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            locations: LocationSpec::default(),
            sizes: vec![16.0],
            spatial_frequencies: vec![1.0],
            orientations: AngleSpec::EvenlySpaced(8),
            phases: AngleSpec::Values(vec![0.0]),
            eccentricities: None,
            contrasts_preferred: vec![0.5],
            contrasts_orthogonal: vec![0.0, 0.5],
            photometric: Photometric::default(),
            relative_spatial_frequency: true,
        }
    }
}

/// Resolved arguments shared by both plaid components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaidParams {
    pub location: [f64; 2],
    pub size: f64,
    pub spatial_frequency: f64,
    pub orientation: f64,
    pub phase: f64,
    pub gamma: f64,
    pub contrast_preferred: f64,
    pub contrast_orthogonal: f64,
}

impl PlaidParams {
    pub fn from_assignment(a: &ParameterAssignment) -> Result<Self> {
        Ok(Self {
            location: a.point("location")?,
            size: a.scalar("size")?,
            spatial_frequency: a.scalar("spatial_frequency")?,
            orientation: a.scalar("orientation")?,
            phase: a.scalar("phase")?,
            gamma: a.scalar("gamma")?,
            contrast_preferred: a.scalar("contrast_preferred")?,
            contrast_orthogonal: a.scalar("contrast_orthogonal")?,
        })
    }

    /// The two Gabor components: preferred, then orthogonal.
    pub fn components(&self) -> [GaborParams; 2] {
        let shared = GaborParams {
            location: self.location,
            size: self.size,
            spatial_frequency: self.spatial_frequency,
            contrast: self.contrast_preferred,
            orientation: self.orientation,
            phase: self.phase,
            gamma: self.gamma,
        };
        [
            shared,
            GaborParams {
                contrast: self.contrast_orthogonal,
                orientation: self.orientation + FRAC_PI_2,
                ..shared
            },
        ]
    }
}

/// Every combination of location, size, frequency, orientation, phase, aspect
/// ratio and the two contrasts, rendered as a plaid.
#[derive(Debug, Clone)]
pub struct PlaidSet {
    config: PlaidConfig,
    gabor: GaborRenderer,
    descriptors: Vec<ParameterDescriptor>,
}

impl PlaidSet {
    pub fn new(config: PlaidConfig) -> Result<Self> {
        config.canvas.validate()?;
        config.photometric.validate()?;

        let descriptors = vec![
            ParameterDescriptor::points("location", &config.locations.resolve()),
            ParameterDescriptor::scalars("size", &config.sizes),
            ParameterDescriptor::scalars("spatial_frequency", &config.spatial_frequencies),
            ParameterDescriptor::scalars(
                "orientation",
                &config.orientations.resolve(ORIENTATION_PERIOD)?,
            ),
            ParameterDescriptor::scalars("phase", &config.phases.resolve(PHASE_PERIOD)?),
            ParameterDescriptor::scalars(
                "gamma",
                &gammas_from_eccentricities(config.eccentricities.as_deref())?,
            ),
            ParameterDescriptor::scalars("contrast_preferred", &config.contrasts_preferred),
            ParameterDescriptor::scalars("contrast_orthogonal", &config.contrasts_orthogonal),
        ];
        validate_descriptors(&descriptors)?;

        let set = Self {
            gabor: GaborRenderer::new(config.canvas, config.photometric),
            config,
            descriptors,
        };
        tracing::debug!(
            counts = ?set.counts(),
            total = set.total_combinations(),
            "plaid set configured"
        );
        Ok(set)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &PlaidConfig {
        &self.config
    }

    /// Render a plaid from explicit parameters.
    pub fn render_params(&self, params: &PlaidParams) -> StimulusImage {
        let [preferred, orthogonal] = params.components();
        let preferred = self.gabor.pixel_fn(&preferred);
        let orthogonal = self.gabor.pixel_fn(&orthogonal);
        self.config
            .canvas
            .render(|x, y| preferred(x, y) + orthogonal(x, y))
    }
}

impl ParameterSpace for PlaidSet {
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
        Ok(self.render_params(&PlaidParams::from_assignment(assignment)?))
    }
}
