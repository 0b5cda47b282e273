//! Layered biome classification pipeline.
//!
//! Composes a chain of seeded, cached transformation stages (scale, land,
//! islands, ice, groups, biomes, isles, borders, ocean fill, finalize) into a
//! single deterministic sampler: for any world seed, resolved configuration,
//! and signed 2D coordinate, [`BiomeSampler::sample_at`] returns the same
//! bit-packed classification value on every run.
//!
//! The pipeline is built once per `(seed, config)` pair with
//! [`build_pipeline`]; configuration-shape problems surface there as
//! [`BuildError`], never during sampling. Sampling is total and infallible.

mod builder;
mod cache;
mod config;
mod error;
mod registry;
mod sampler;
mod stage;

pub mod debug_viz;

pub use builder::build_pipeline;
pub use config::{
    BiomeDescriptor, GenerationMode, GroupConfig, IceSettings, ImageMode, ImageOverlay,
    LayerConfig,
};
pub use error::BuildError;
pub use sampler::BiomeSampler;

pub use strata_sample::{BiomeId, GroupId, Sample, SampleParts};
