//! Ice stage: flags cold cells as ICE, independently of biome assignment.
//!
//! A land cell qualifies when its assigned group is cold (average
//! temperature below the freeze threshold) or when it carries no group yet;
//! ocean cells qualify only when the configuration opts in. Qualifying cells
//! then freeze with probability `1/rarity`.

use strata_sample::{PositionRng, Sample, StageSeed};

use crate::config::IceSettings;
use crate::registry::GroupRegistry;
use crate::sampler::ChainNode;

pub(super) fn eval(
    seed: StageSeed,
    parent: &mut ChainNode,
    settings: &IceSettings,
    groups: &GroupRegistry,
    x: i32,
    y: i32,
) -> Sample {
    let sample = parent.sample_at(x, y);
    if sample.is_ice() {
        return sample;
    }
    let eligible = if sample.is_land() {
        match groups.get(sample.group()) {
            Some(group) => group.is_cold(),
            None => true,
        }
    } else {
        settings.apply_to_ocean
    };
    if !eligible {
        return sample;
    }
    let mut rng = PositionRng::at(seed, x, y);
    if rng.chance(settings.rarity) {
        sample.with_ice()
    } else {
        sample
    }
}
