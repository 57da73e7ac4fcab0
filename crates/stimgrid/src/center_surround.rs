//! Centre-surround stimuli: a grating disk inside a grating annulus.
//!
//! With `R = size_total`, the centre disk covers radii `r <= size_center·R`
//! and the surround annulus `size_surround·R < r <= R`. Each region carries
//! its own orientation, phase and contrast; the spatial frequency is shared
//! and given in cycles per pixel.
//!
//! Pixels outside both regions are exactly `0.0`, not `grey_level`: the
//! grey level only enters through the contrast amplitude. Callers that want
//! a grey background must add it themselves.

use crate::canvas::{cosine_grating, Canvas, Photometric, RotatedFrame, StimulusImage};
use crate::error::{Result, StimulusError};
use crate::param_space::{
    validate_descriptors, ParameterAssignment, ParameterDescriptor, ParameterSpace,
};
use crate::values::{AngleSpec, LocationSpec, ORIENTATION_PERIOD, PHASE_PERIOD};

/// Configuration of a [`CenterSurroundSet`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CenterSurroundConfig {
    pub canvas: Canvas,
    pub locations: LocationSpec,
    /// Outer radius of the surround in pixels.
    pub sizes_total: Vec<f64>,
    /// Centre radius as a fraction of the total size.
    pub sizes_center: Vec<f64>,
    /// Inner radius of the surround as a fraction of the total size.
    pub sizes_surround: Vec<f64>,
    pub contrasts_center: Vec<f64>,
    pub contrasts_surround: Vec<f64>,
    pub orientations_center: AngleSpec,
    pub orientations_surround: AngleSpec,
    pub spatial_frequencies: Vec<f64>,
    pub phases_center: AngleSpec,
    pub phases_surround: AngleSpec,
    #[serde(flatten)]
    pub photometric: Photometric,
}

impl Default for CenterSurroundConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            locations: LocationSpec::default(),
            sizes_total: vec![24.0],
            sizes_center: vec![0.5],
            sizes_surround: vec![0.6],
            contrasts_center: vec![1.0],
            contrasts_surround: vec![0.0, 1.0],
            orientations_center: AngleSpec::Values(vec![0.0]),
            orientations_surround: AngleSpec::EvenlySpaced(4),
            spatial_frequencies: vec![0.1],
            phases_center: AngleSpec::Values(vec![0.0]),
            phases_surround: AngleSpec::Values(vec![0.0]),
            photometric: Photometric::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterSurroundParams {
    pub location: [f64; 2],
    pub size_total: f64,
    pub size_center: f64,
    pub size_surround: f64,
    pub contrast_center: f64,
    pub contrast_surround: f64,
    pub orientation_center: f64,
    pub orientation_surround: f64,
    pub spatial_frequency: f64,
    pub phase_center: f64,
    pub phase_surround: f64,
}

impl CenterSurroundParams {
    pub fn from_assignment(a: &ParameterAssignment) -> Result<Self> {
        Ok(Self {
            location: a.point("location")?,
            size_total: a.scalar("size_total")?,
            size_center: a.scalar("size_center")?,
            size_surround: a.scalar("size_surround")?,
            contrast_center: a.scalar("contrast_center")?,
            contrast_surround: a.scalar("contrast_surround")?,
            orientation_center: a.scalar("orientation_center")?,
            orientation_surround: a.scalar("orientation_surround")?,
            spatial_frequency: a.scalar("spatial_frequency")?,
            phase_center: a.scalar("phase_center")?,
            phase_surround: a.scalar("phase_surround")?,
        })
    }

    /// Centre disk membership of a radius.
    pub fn in_center(&self, r: f64) -> bool {
        r <= self.size_center * self.size_total
    }

    /// Surround annulus membership of a radius.
    pub fn in_surround(&self, r: f64) -> bool {
        r > self.size_surround * self.size_total && r <= self.size_total
    }
}

/// Every combination of the centre/surround geometry, contrasts,
/// orientations, shared frequency and phases.
#[derive(Debug, Clone)]
pub struct CenterSurroundSet {
    config: CenterSurroundConfig,
    descriptors: Vec<ParameterDescriptor>,
}

impl CenterSurroundSet {
    pub fn new(config: CenterSurroundConfig) -> Result<Self> {
        config.canvas.validate()?;
        config.photometric.validate()?;

        let descriptors = vec![
            ParameterDescriptor::points("location", &config.locations.resolve()),
            ParameterDescriptor::scalars("size_total", &config.sizes_total),
            ParameterDescriptor::scalars("size_center", &config.sizes_center),
            ParameterDescriptor::scalars("size_surround", &config.sizes_surround),
            ParameterDescriptor::scalars("contrast_center", &config.contrasts_center),
            ParameterDescriptor::scalars("contrast_surround", &config.contrasts_surround),
            ParameterDescriptor::scalars(
                "orientation_center",
                &config.orientations_center.resolve(ORIENTATION_PERIOD)?,
            ),
            ParameterDescriptor::scalars(
                "orientation_surround",
                &config.orientations_surround.resolve(ORIENTATION_PERIOD)?,
            ),
            ParameterDescriptor::scalars("spatial_frequency", &config.spatial_frequencies),
            ParameterDescriptor::scalars(
                "phase_center",
                &config.phases_center.resolve(PHASE_PERIOD)?,
            ),
            ParameterDescriptor::scalars(
                "phase_surround",
                &config.phases_surround.resolve(PHASE_PERIOD)?,
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
            "center-surround set configured"
        );
        Ok(set)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &CenterSurroundConfig {
        &self.config
    }

    /// Render from explicit parameters. Fails when `size_center > size_surround`.
    pub fn render_params(&self, p: &CenterSurroundParams) -> Result<StimulusImage> {
        if p.size_center > p.size_surround {
            return Err(StimulusError::Domain(format!(
                "size_center ({}) cannot be larger than size_surround ({})",
                p.size_center, p.size_surround
            )));
        }

        let center_frame = RotatedFrame::new(p.location, p.orientation_center);
        let surround_frame = RotatedFrame::new(p.location, p.orientation_surround);
        let photometric = &self.config.photometric;
        let amplitude_center = photometric.amplitude(p.contrast_center);
        let amplitude_surround = photometric.amplitude(p.contrast_surround);

        // Masks share one unrotated radius so the regions stay disjoint.
        Ok(self.config.canvas.render(|x, y| {
            let r = (x - p.location[0]).hypot(y - p.location[1]);
            let mut v = 0.0;
            if p.in_center(r) {
                let c = center_frame.to_local(x, y);
                v += amplitude_center * cosine_grating(p.spatial_frequency, c.x, p.phase_center);
            }
            if p.in_surround(r) {
                let s = surround_frame.to_local(x, y);
                v += amplitude_surround
                    * cosine_grating(p.spatial_frequency, s.x, p.phase_surround);
            }
            v
        }))
    }
}

impl ParameterSpace for CenterSurroundSet {
    fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage> {
        self.render_params(&CenterSurroundParams::from_assignment(assignment)?)
    }
}
