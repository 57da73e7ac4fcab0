//! Pull-based sequences over a parameter space.
//!
//! Both iterators borrow the space and hold nothing but a cursor, so every
//! call to [`ParameterSpace::stimulus_batches`] or
//! [`ParameterSpace::iter_stimuli`] starts again from index 0.

use std::iter::FusedIterator;

use super::ParameterSpace;
use crate::canvas::StimulusImage;
use crate::error::{Result, StimulusError};
use crate::stack::StimulusStack;

/// Consecutive stimuli grouped into [`StimulusStack`]s of at most `batch_size`.
///
/// Yields `Err` for the batch containing the first failing combination and
/// then ends.
#[derive(Debug)]
pub struct StimulusBatches<'a, S: ?Sized> {
    space: &'a S,
    batch_size: usize,
    next: usize,
    total: usize,
}

impl<'a, S: ParameterSpace + ?Sized> StimulusBatches<'a, S> {
    pub(crate) fn new(space: &'a S, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(StimulusError::Configuration(
                "batch_size must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            space,
            batch_size,
            next: 0,
            total: space.total_combinations(),
        })
    }

    /// Number of batches not yet pulled.
    pub fn remaining(&self) -> usize {
        (self.total - self.next).div_ceil(self.batch_size)
    }
}

impl<S: ParameterSpace + ?Sized> Iterator for StimulusBatches<'_, S> {
    type Item = Result<StimulusStack>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let start = self.next;
        let end = (start + self.batch_size).min(self.total);
        let mut batch = StimulusStack::with_capacity(self.space.canvas(), end - start);
        for index in start..end {
            let pushed = self
                .space
                .stimulus_at(index)
                .and_then(|img| batch.push(&img));
            if let Err(e) = pushed {
                self.next = self.total;
                return Some(Err(e));
            }
        }
        self.next = end;
        tracing::debug!(start, end, total = self.total, "stimulus batch ready");
        Some(Ok(batch))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<S: ParameterSpace + ?Sized> FusedIterator for StimulusBatches<'_, S> {}

/// `(index, result)` for every combination in order. Failures do not end the
/// sequence.
#[derive(Debug)]
pub struct StimulusIter<'a, S: ?Sized> {
    space: &'a S,
    next: usize,
    total: usize,
}

impl<'a, S: ParameterSpace + ?Sized> StimulusIter<'a, S> {
    pub(crate) fn new(space: &'a S) -> Self {
        Self {
            space,
            next: 0,
            total: space.total_combinations(),
        }
    }
}

impl<S: ParameterSpace + ?Sized> Iterator for StimulusIter<'_, S> {
    type Item = (usize, Result<StimulusImage>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((index, self.space.stimulus_at(index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.total - self.next;
        (n, Some(n))
    }
}

impl<S: ParameterSpace + ?Sized> ExactSizeIterator for StimulusIter<'_, S> {}

impl<S: ParameterSpace + ?Sized> FusedIterator for StimulusIter<'_, S> {}
