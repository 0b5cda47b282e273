//! Biome assignment stages, one per generation mode.
//!
//! Both variants run the same weighted walk; the draw space is the full
//! cumulative rarity, so the walk always lands on some member, but the
//! winner only takes effect when its configured size matches the current
//! depth. A cell whose winner belongs to a different depth stays unassigned
//! and re-rolls (under a different stage salt) when that depth's stage runs.

use strata_sample::{PositionRng, Sample, StageSeed};

use crate::registry::{FlatBiome, GroupRegistry, WeightedList};
use crate::sampler::ChainNode;

/// Normal mode: pick within the cell's already-assigned group.
pub(super) fn normal(
    seed: StageSeed,
    parent: &mut ChainNode,
    groups: &GroupRegistry,
    depth: u32,
    x: i32,
    y: i32,
) -> Sample {
    let sample = parent.sample_at(x, y);
    if !sample.is_land() || sample.has_biome() {
        return sample;
    }
    let Some(group) = groups.get(sample.group()) else {
        return sample;
    };
    let mut rng = PositionRng::at(seed, x, y);
    match group.members.pick(&mut rng) {
        Some(member) if member.size == depth => sample.with_biome(member.id),
        _ => sample,
    }
}

/// BeforeGroups mode: pick globally over every group's members, stamping the
/// winner's owning group so later stages still see group temperature.
pub(super) fn before_groups(
    seed: StageSeed,
    parent: &mut ChainNode,
    candidates: &WeightedList<FlatBiome>,
    depth: u32,
    x: i32,
    y: i32,
) -> Sample {
    let sample = parent.sample_at(x, y);
    if !sample.is_land() || sample.has_biome() {
        return sample;
    }
    let mut rng = PositionRng::at(seed, x, y);
    match candidates.pick(&mut rng) {
        Some(flat) if flat.size == depth => sample.with_group(flat.group).with_biome(flat.biome),
        _ => sample,
    }
}
