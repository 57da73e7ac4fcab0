//! stimgrid: parametric visual stimulus sets for vision experiments and
//! neural-response modelling.
//!
//! A stimulus set declares a list of value lists (locations, sizes,
//! frequencies, contrasts, orientations, phases, ...). Every combination of
//! the Cartesian product is addressed by a linear index and rendered,
//! deterministically, into an `f32` image.
//!
//! Synthesizers:
//!
//! 1. **Gabor** – oriented cosine grating under a Gaussian envelope.
//! 2. **Plaid** – sum of a Gabor and its orthogonal twin.
//! 3. **Difference of Gaussians** – contrast-normalized centre minus surround.
//! 4. **Centre-surround** – grating disk inside a grating annulus.
//!
//! # Public API
//! - [`ParameterSpace`] for enumeration: [`ParameterSpace::assignment_at`],
//!   [`ParameterSpace::stimulus_at`], [`ParameterSpace::stimulus_batches`],
//!   [`ParameterSpace::all_stimuli`]
//! - one `*Set` / `*Config` pair per synthesizer
//! - [`StimulusImage`] and [`StimulusStack`] outputs
//!
//! ```
//! use stimgrid::{AngleSpec, GaborConfig, GaborSet, ParameterSpace};
//!
//! let set = GaborSet::new(GaborConfig {
//!     orientations: AngleSpec::EvenlySpaced(4),
//!     ..GaborConfig::default()
//! })?;
//! for batch in set.stimulus_batches(2)? {
//!     let batch = batch?;
//!     assert_eq!(batch.shape(), [2, 64, 64]);
//! }
//! # Ok::<(), stimgrid::StimulusError>(())
//! ```

mod canvas;
mod center_surround;
mod dog;
mod error;
mod gabor;
mod param_space;
mod plaid;
mod stack;
mod values;

#[cfg(test)]
mod test_utils;

pub use canvas::{Canvas, Photometric, StimulusImage};
pub use center_surround::{CenterSurroundConfig, CenterSurroundParams, CenterSurroundSet};
pub use dog::{gaussian_density, DiffOfGaussiansConfig, DiffOfGaussiansParams, DiffOfGaussiansSet};
pub use error::{Result, StimulusError};
pub use gabor::{GaborConfig, GaborParams, GaborRenderer, GaborSet};
pub use param_space::{
    unravel_index, validate_descriptors, ParameterAssignment, ParameterDescriptor,
    ParameterSpace, ParameterValue, StimulusBatches, StimulusIter,
};
pub use plaid::{PlaidConfig, PlaidParams, PlaidSet};
pub use stack::StimulusStack;
pub use values::{
    gammas_from_eccentricities, AngleSpec, LocationSpec, ORIENTATION_PERIOD, PHASE_PERIOD,
};
