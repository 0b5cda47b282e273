//! Image override stage: maps coordinates through a pre-resolved lookup.
//!
//! Where the overlay has a cell, its biome id replaces whatever the
//! procedural chain produced; land is implied for any non-ocean id. Outside
//! the overlay, `ContinueNormal` falls through to the upstream sample and
//! the other modes fall back to ocean (`Repeat` never falls outside).

use strata_sample::{BiomeId, Sample};

use crate::config::{ImageMode, ImageOverlay};
use crate::sampler::ChainNode;

pub(super) fn eval(
    parent: &mut ChainNode,
    overlay: &ImageOverlay,
    mode: ImageMode,
    ocean: BiomeId,
    x: i32,
    y: i32,
) -> Sample {
    match overlay.lookup(x, y, mode) {
        Some(biome) => {
            let sample = Sample::EMPTY.with_biome(biome);
            if biome == ocean {
                sample
            } else {
                sample.with_land()
            }
        }
        None => match mode {
            ImageMode::ContinueNormal => parent.sample_at(x, y),
            ImageMode::Repeat | ImageMode::FillEmpty => Sample::EMPTY.with_biome(ocean),
        },
    }
}
