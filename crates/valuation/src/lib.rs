//! Deterministic procedural economics for placed landmarks.
//!
//! Every figure is a pure function of the (quantized) coordinate, so a
//! pointer jittering by a few centimeters never changes the readout.

pub mod appraisal;
pub mod classify;
pub mod error;
pub mod neighborhoods;
pub mod seed;
pub mod tourism;
pub mod zones;

pub use appraisal::*;
pub use classify::*;
pub use error::*;
pub use neighborhoods::{Neighborhood, NeighborhoodAtlas};
pub use seed::*;
pub use tourism::*;
pub use zones::*;
