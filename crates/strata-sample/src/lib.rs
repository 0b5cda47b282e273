//! Classification samples and the seeded coordinate PRNG for the strata pipeline.
//!
//! This is the leaf crate of the workspace: the bit-packed sample value that
//! flows between pipeline stages, and the pure seed-mixing primitives every
//! stage uses to make reproducible per-cell decisions.

mod rng;
mod sample;

pub use rng::{PositionRng, StageSeed};
pub use sample::{BiomeId, GroupId, Sample, SampleParts};
