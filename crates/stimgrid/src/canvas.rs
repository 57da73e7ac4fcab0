//! Pixel canvas, photometric range, and the local coordinate frames the
//! synthesizers evaluate their formulas in.
//!
//! Pixel `(x, y)` is addressed the way `image` addresses it: `x` is the column
//! in `0..width`, `y` the row in `0..height`. A stimulus therefore has the
//! logical array shape `(height, width)`.

use image::{ImageBuffer, Luma};
use nalgebra::{Rotation2, Vector2};

use crate::error::{Result, StimulusError};

/// One rendered stimulus. Pixels are evaluated in `f64` and stored as `f32`.
pub type StimulusImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Output canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Array shape `[height, width]`.
    pub fn shape(self) -> [usize; 2] {
        [self.height as usize, self.width as usize]
    }

    /// Number of pixels on the canvas.
    pub fn n_pixels(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Evaluate `f(x, y)` at every pixel centre, row by row.
    pub fn render<F>(self, mut f: F) -> StimulusImage
    where
        F: FnMut(f64, f64) -> f64,
    {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            Luma([f(x as f64, y as f64) as f32])
        })
    }

    pub(crate) fn validate(self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StimulusError::Configuration(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(64, 64)
    }
}

/// Display range and baseline luminance shared by every stimulus of a set.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Photometric {
    /// Baseline (mean) pixel value the stimulus is centred on.
    pub grey_level: f64,
    /// Range `[low, high]` the display can reproduce.
    pub pixel_boundaries: [f64; 2],
}

impl Default for Photometric {
    fn default() -> Self {
        Self {
            grey_level: 0.0,
            pixel_boundaries: [-1.0, 1.0],
        }
    }
}

impl Photometric {
    pub fn new(grey_level: f64, pixel_boundaries: [f64; 2]) -> Self {
        Self {
            grey_level,
            pixel_boundaries,
        }
    }

    /// Largest symmetric excursion around `grey_level` that stays in range.
    pub fn max_amplitude(&self) -> f64 {
        let [low, high] = self.pixel_boundaries;
        (low - self.grey_level)
            .abs()
            .min((high - self.grey_level).abs())
    }

    /// Amplitude for a contrast given as a fraction of [`Self::max_amplitude`].
    pub fn amplitude(&self, contrast: f64) -> f64 {
        contrast * self.max_amplitude()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let [low, high] = self.pixel_boundaries;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(StimulusError::Configuration(format!(
                "pixel_boundaries must be finite with low <= high, got [{}, {}]",
                low, high
            )));
        }
        if !self.grey_level.is_finite() {
            return Err(StimulusError::Configuration(
                "grey_level must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pixel frame translated to `origin` and rotated by `angle` radians.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RotatedFrame {
    origin: Vector2<f64>,
    rotation: Rotation2<f64>,
}

impl RotatedFrame {
    pub(crate) fn new(origin: [f64; 2], angle: f64) -> Self {
        Self {
            origin: Vector2::new(origin[0], origin[1]),
            rotation: Rotation2::new(angle),
        }
    }

    /// Pixel coordinates expressed in the rotated frame.
    pub(crate) fn to_local(self, x: f64, y: f64) -> Vector2<f64> {
        self.rotation * (Vector2::new(x, y) - self.origin)
    }
}

/// `cos(2π · frequency · x + phase)`.
pub(crate) fn cosine_grating(spatial_frequency: f64, x: f64, phase: f64) -> f64 {
    (spatial_frequency * x * std::f64::consts::TAU + phase).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn max_amplitude_uses_the_tighter_bound() {
        let p = Photometric::new(-0.2, [-1.0, 1.0]);
        assert_abs_diff_eq!(p.max_amplitude(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(p.amplitude(0.5), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn rotated_frame_quarter_turn() {
        let frame = RotatedFrame::new([4.0, 4.0], FRAC_PI_2);
        let v = frame.to_local(5.0, 4.0);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn render_has_height_by_width_shape() {
        let canvas = Canvas::new(5, 3);
        let img = canvas.render(|x, y| x + 10.0 * y);
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(canvas.shape(), [3, 5]);
        assert_eq!(img.get_pixel(4, 2)[0], 24.0);
    }

    #[test]
    fn empty_canvas_and_inverted_range_are_rejected() {
        assert!(Canvas::new(0, 4).validate().is_err());
        assert!(Photometric::new(0.0, [1.0, -1.0]).validate().is_err());
        assert!(Photometric::default().validate().is_ok());
    }
}
