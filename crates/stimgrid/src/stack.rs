//! Contiguous `[len, height, width]` storage for batches and full sweeps.

use image::ImageBuffer;

use crate::canvas::{Canvas, StimulusImage};
use crate::error::{Result, StimulusError};

/// Equally sized stimuli stored back to back in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusStack {
    canvas: Canvas,
    data: Vec<f32>,
}

impl StimulusStack {
    pub fn with_capacity(canvas: Canvas, capacity: usize) -> Self {
        Self {
            canvas,
            data: Vec::with_capacity(capacity * canvas.n_pixels()),
        }
    }

    pub fn from_images(canvas: Canvas, images: &[StimulusImage]) -> Result<Self> {
        let mut stack = Self::with_capacity(canvas, images.len());
        for img in images {
            stack.push(img)?;
        }
        Ok(stack)
    }

    /// Append one stimulus; its dimensions must match the stack's canvas.
    pub fn push(&mut self, image: &StimulusImage) -> Result<()> {
        let (w, h) = image.dimensions();
        if (w, h) != (self.canvas.width, self.canvas.height) {
            return Err(StimulusError::Configuration(format!(
                "stimulus is {}x{}, stack expects {}x{}",
                w, h, self.canvas.width, self.canvas.height
            )));
        }
        self.data.extend_from_slice(image.as_raw());
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn len(&self) -> usize {
        match self.canvas.n_pixels() {
            0 => 0,
            n => self.data.len() / n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `[len, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        let [h, w] = self.canvas.shape();
        [self.len(), h, w]
    }

    fn slice(&self, i: usize) -> Option<&[f32]> {
        let n = self.canvas.n_pixels();
        self.data.get(i * n..(i + 1) * n)
    }

    /// Copy of stimulus `i`.
    pub fn get(&self, i: usize) -> Option<StimulusImage> {
        let pixels = self.slice(i)?;
        ImageBuffer::from_raw(self.canvas.width, self.canvas.height, pixels.to_vec())
    }

    /// Value at `(i, y, x)` in array order.
    pub fn at(&self, i: usize, y: u32, x: u32) -> Option<f32> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let offset = y as usize * self.canvas.width as usize + x as usize;
        self.slice(i).map(|s| s[offset])
    }

    pub fn iter(&self) -> impl Iterator<Item = StimulusImage> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }
}
