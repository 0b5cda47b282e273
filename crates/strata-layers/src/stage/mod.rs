//! The transformation catalog: a closed set of stage kinds with one
//! evaluation function each.
//!
//! Every stage is a pure function of (upstream sampler, derived seed,
//! coordinate); its only side effect is its own cache, which lives in the
//! surrounding [`ChainNode`]. The builder decides which kinds run at which
//! depth; evaluation itself is uniform dispatch over the enum.

mod biome;
mod border;
mod group;
mod ice;
mod image;
mod isle;
mod islands;
mod scale;

use std::sync::Arc;

use strata_sample::{BiomeId, GroupId, PositionRng, Sample, StageSeed};

use crate::config::{IceSettings, ImageMode, ImageOverlay};
use crate::registry::{BorderCandidate, FlatBiome, GroupRegistry, IsleCandidate, WeightedList};
use crate::sampler::ChainNode;

/// One stage kind plus its build-time parameters and shared registries.
pub(crate) enum StageKind {
    /// Depth-0 source: constant empty (ocean) sample.
    Init,
    /// Resolution doubling; the fuzzy variant always picks a random parent
    /// for the odd/odd child instead of the modal one.
    Scale { fuzzy: bool },
    /// Turns cells to land with probability `1/rarity`.
    Land { rarity: u32 },
    /// Coastline fuzzing around land/ocean transitions.
    AddIslands,
    /// Flags cold cells as ice.
    Ice {
        settings: IceSettings,
        groups: Arc<GroupRegistry>,
    },
    /// Rarity-weighted group assignment for land cells.
    Group {
        candidates: Arc<WeightedList<GroupId>>,
        freeze: bool,
    },
    /// Normal-mode biome assignment within the cell's group.
    Biome {
        groups: Arc<GroupRegistry>,
        depth: u32,
    },
    /// BeforeGroups-mode global biome assignment.
    BeforeGroups {
        candidates: Arc<WeightedList<FlatBiome>>,
        depth: u32,
    },
    /// Isle placement inside eligible host biomes.
    Isle { candidates: Arc<Vec<IsleCandidate>> },
    /// Border placement around target biomes.
    Border { candidates: Arc<Vec<BorderCandidate>> },
    /// Fills unassigned ocean cells with the default ocean biome.
    ApplyOcean { ocean: BiomeId },
    /// Strips transient bits, leaving (LAND, ICE, biome).
    Finalize,
    /// Image-derived biome override.
    FromImage {
        overlay: Arc<ImageOverlay>,
        mode: ImageMode,
        ocean: BiomeId,
    },
}

/// Evaluate one stage at a coordinate.
pub(crate) fn eval(
    kind: &StageKind,
    seed: StageSeed,
    upstream: Option<&mut ChainNode>,
    x: i32,
    y: i32,
) -> Sample {
    match kind {
        StageKind::Init => Sample::EMPTY,
        StageKind::Scale { fuzzy } => scale::eval(seed, parent(upstream), *fuzzy, x, y),
        StageKind::Land { rarity } => land(seed, parent(upstream), *rarity, x, y),
        StageKind::AddIslands => islands::eval(seed, parent(upstream), x, y),
        StageKind::Ice { settings, groups } => {
            ice::eval(seed, parent(upstream), settings, groups, x, y)
        }
        StageKind::Group { candidates, freeze } => {
            group::eval(seed, parent(upstream), candidates, *freeze, x, y)
        }
        StageKind::Biome { groups, depth } => {
            biome::normal(seed, parent(upstream), groups, *depth, x, y)
        }
        StageKind::BeforeGroups { candidates, depth } => {
            biome::before_groups(seed, parent(upstream), candidates, *depth, x, y)
        }
        StageKind::Isle { candidates } => isle::eval(seed, parent(upstream), candidates, x, y),
        StageKind::Border { candidates } => border::eval(parent(upstream), candidates, x, y),
        StageKind::ApplyOcean { ocean } => apply_ocean(parent(upstream), *ocean, x, y),
        StageKind::Finalize => parent(upstream).sample_at(x, y).finalized(),
        StageKind::FromImage {
            overlay,
            mode,
            ocean,
        } => image::eval(parent(upstream), overlay, *mode, *ocean, x, y),
    }
}

/// Every kind except `Init` is wired with an upstream node by the builder.
fn parent(upstream: Option<&mut ChainNode>) -> &mut ChainNode {
    upstream.expect("non-source stage wired without an upstream sampler")
}

/// Land introduction: a per-cell, independent rarity check.
fn land(seed: StageSeed, parent: &mut ChainNode, rarity: u32, x: i32, y: i32) -> Sample {
    let sample = parent.sample_at(x, y);
    if sample.is_land() {
        return sample;
    }
    let mut rng = PositionRng::at(seed, x, y);
    if rng.chance(rarity) {
        sample.with_land()
    } else {
        sample
    }
}

/// Ocean fill: every non-land cell still lacking a biome gets the default
/// ocean biome. Land cells without a biome stay at id 0, the generator-level
/// fallback.
fn apply_ocean(parent: &mut ChainNode, ocean: BiomeId, x: i32, y: i32) -> Sample {
    let sample = parent.sample_at(x, y);
    if !sample.is_land() && !sample.has_biome() {
        sample.with_biome(ocean)
    } else {
        sample
    }
}
