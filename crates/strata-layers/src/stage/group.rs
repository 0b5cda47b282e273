//! Group assignment stage.
//!
//! At its configured depth, assigns a group id to land cells that have none,
//! via a rarity-weighted pick over the groups registered at that depth. The
//! draw space exceeds the summed group rarities, so a draw can land in the
//! unallocated remainder and leave the cell ungrouped.
//!
//! With freezing enabled, a cell first adopts the group of an
//! already-assigned west or north neighbor, which grows spatially coherent
//! group regions instead of per-cell noise.

use strata_sample::{GroupId, PositionRng, Sample, StageSeed};

use crate::registry::WeightedList;
use crate::sampler::ChainNode;

pub(super) fn eval(
    seed: StageSeed,
    parent: &mut ChainNode,
    candidates: &WeightedList<GroupId>,
    freeze: bool,
    x: i32,
    y: i32,
) -> Sample {
    let sample = parent.sample_at(x, y);
    if !sample.is_land() || sample.group() != GroupId::NONE {
        return sample;
    }

    if freeze {
        let west = parent.sample_at(x - 1, y);
        if west.is_land() && west.group() != GroupId::NONE {
            return sample.with_group(west.group());
        }
        let north = parent.sample_at(x, y - 1);
        if north.is_land() && north.group() != GroupId::NONE {
            return sample.with_group(north.group());
        }
    }

    let mut rng = PositionRng::at(seed, x, y);
    match candidates.pick(&mut rng) {
        Some(&group) => sample.with_group(group),
        None => sample,
    }
}
