//! Cartesian-product parameter spaces.
//!
//! A stimulus set declares an ordered list of [`ParameterDescriptor`]s. Every
//! combination of one value per descriptor is addressed by a linear index in
//! `[0, total)`, decoded row-major: the first descriptor varies slowest, the
//! last one fastest.

mod batches;

use serde::ser::SerializeMap;

use crate::canvas::{Canvas, StimulusImage};
use crate::error::{Result, StimulusError};
use crate::stack::StimulusStack;

pub use batches::{StimulusBatches, StimulusIter};

/// One concrete parameter value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(f64),
    /// Pixel position `(x, y)`.
    Point([f64; 2]),
}

impl ParameterValue {
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Point(_) => None,
        }
    }

    pub fn as_point(self) -> Option<[f64; 2]> {
        match self {
            Self::Point(p) => Some(p),
            Self::Scalar(_) => None,
        }
    }
}

/// Named, ordered list of the values one parameter takes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub values: Vec<ParameterValue>,
}

impl ParameterDescriptor {
    pub fn new(name: &'static str, values: Vec<ParameterValue>) -> Self {
        Self { name, values }
    }

    pub fn scalars(name: &'static str, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(ParameterValue::Scalar).collect())
    }

    pub fn points(name: &'static str, values: &[[f64; 2]]) -> Self {
        Self::new(name, values.iter().copied().map(ParameterValue::Point).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check that every descriptor is non-empty, names are unique, and the
/// product of the list lengths fits in `usize`.
pub fn validate_descriptors(descriptors: &[ParameterDescriptor]) -> Result<()> {
    let mut total: usize = 1;
    for (i, d) in descriptors.iter().enumerate() {
        if d.is_empty() {
            return Err(StimulusError::Configuration(format!(
                "parameter '{}' has no values",
                d.name
            )));
        }
        if descriptors[..i].iter().any(|other| other.name == d.name) {
            return Err(StimulusError::Configuration(format!(
                "duplicate parameter name '{}'",
                d.name
            )));
        }
        total = total.checked_mul(d.len()).ok_or_else(|| {
            StimulusError::Configuration("number of combinations overflows usize".to_string())
        })?;
    }
    Ok(())
}

/// Decompose `index` into one digit per radix in `counts`, row-major.
///
/// Returns `None` when `index` is not below the product of `counts`.
pub fn unravel_index(index: usize, counts: &[usize]) -> Option<Vec<usize>> {
    let total = counts
        .iter()
        .try_fold(1usize, |acc, &c| acc.checked_mul(c))?;
    if index >= total {
        return None;
    }
    let mut digits = vec![0; counts.len()];
    let mut rest = index;
    for (digit, &count) in digits.iter_mut().zip(counts).rev() {
        *digit = rest % count;
        rest /= count;
    }
    Some(digits)
}

/// One value per parameter, in descriptor order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAssignment {
    entries: Vec<(&'static str, ParameterValue)>,
}

impl ParameterAssignment {
    pub fn new(entries: Vec<(&'static str, ParameterValue)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ParameterValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, name: &str) -> Option<ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
    }

    /// Scalar value of `name`; a missing or non-scalar entry is a
    /// configuration error.
    pub fn scalar(&self, name: &str) -> Result<f64> {
        self.get(name)
            .and_then(ParameterValue::as_scalar)
            .ok_or_else(|| missing(name, "scalar"))
    }

    pub fn point(&self, name: &str) -> Result<[f64; 2]> {
        self.get(name)
            .and_then(ParameterValue::as_point)
            .ok_or_else(|| missing(name, "point"))
    }

    /// Replace the value of an existing entry.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> Result<()> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| missing(name, "any"))?;
        slot.1 = value;
        Ok(())
    }
}

fn missing(name: &str, kind: &str) -> StimulusError {
    StimulusError::Configuration(format!(
        "assignment has no {} parameter '{}'",
        kind, name
    ))
}

impl serde::Serialize for ParameterAssignment {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A stimulus set: a fixed parameter space plus the formula that turns one
/// assignment into an image.
///
/// Implementors supply [`descriptors`](Self::descriptors),
/// [`canvas`](Self::canvas) and [`render`](Self::render); they may override
/// [`resolve`](Self::resolve) to derive parameters from one another before
/// rendering. Everything else is provided.
pub trait ParameterSpace {
    /// Ordered descriptors; the first varies slowest.
    fn descriptors(&self) -> &[ParameterDescriptor];

    fn canvas(&self) -> Canvas;

    /// Render one fully resolved assignment.
    fn render(&self, assignment: &ParameterAssignment) -> Result<StimulusImage>;

    /// Derive formula arguments from the raw combination.
    fn resolve(&self, assignment: ParameterAssignment) -> Result<ParameterAssignment> {
        Ok(assignment)
    }

    fn parameter_names(&self) -> Vec<&'static str> {
        self.descriptors().iter().map(|d| d.name).collect()
    }

    /// Length of each descriptor's value list.
    fn counts(&self) -> Vec<usize> {
        self.descriptors().iter().map(ParameterDescriptor::len).collect()
    }

    fn total_combinations(&self) -> usize {
        self.descriptors().iter().map(ParameterDescriptor::len).product()
    }

    /// Combination `index` straight from the value lists, before [`resolve`](Self::resolve).
    fn raw_assignment_at(&self, index: usize) -> Result<ParameterAssignment> {
        let descriptors = self.descriptors();
        let digits = unravel_index(index, &self.counts()).ok_or_else(|| {
            StimulusError::IndexOutOfRange {
                index,
                total: self.total_combinations(),
            }
        })?;
        Ok(ParameterAssignment::new(
            descriptors
                .iter()
                .zip(digits)
                .map(|(d, k)| (d.name, d.values[k]))
                .collect(),
        ))
    }

    fn assignment_at(&self, index: usize) -> Result<ParameterAssignment> {
        self.resolve(self.raw_assignment_at(index)?)
    }

    fn stimulus_at(&self, index: usize) -> Result<StimulusImage> {
        let assignment = self.assignment_at(index)?;
        tracing::trace!(index, "rendering stimulus");
        self.render(&assignment)
    }

    /// Lazy batches of `batch_size` consecutive stimuli; the last may be shorter.
    fn stimulus_batches(&self, batch_size: usize) -> Result<StimulusBatches<'_, Self>>
    where
        Self: Sized,
    {
        StimulusBatches::new(self, batch_size)
    }

    /// Every stimulus in index order, with per-index results so a caller can
    /// skip invalid combinations.
    fn iter_stimuli(&self) -> StimulusIter<'_, Self>
    where
        Self: Sized,
    {
        StimulusIter::new(self)
    }

    /// Every stimulus in index order; fails on the first invalid combination.
    fn all_stimuli(&self) -> Result<StimulusStack> {
        let total = self.total_combinations();
        let mut stack = StimulusStack::with_capacity(self.canvas(), total);
        for index in 0..total {
            stack.push(&self.stimulus_at(index)?)?;
        }
        Ok(stack)
    }

    /// Same result as [`all_stimuli`](Self::all_stimuli), computed on the rayon pool.
    #[cfg(feature = "parallel")]
    fn all_stimuli_par(&self) -> Result<StimulusStack>
    where
        Self: Sync + Sized,
    {
        use rayon::prelude::*;

        let images = (0..self.total_combinations())
            .into_par_iter()
            .map(|index| self.stimulus_at(index))
            .collect::<Result<Vec<_>>>()?;
        StimulusStack::from_images(self.canvas(), &images)
    }
}
