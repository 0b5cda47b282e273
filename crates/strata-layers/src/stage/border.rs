//! Border stage: transition rings around target biomes.
//!
//! A cell with an assigned biome becomes a border biome when at least one of
//! its 3x3 neighbors carries one of the candidate's target biomes and no
//! neighbor carries an excluded biome. Cells already inside the target (or
//! already the border biome) are left alone, so the ring forms on the
//! outside of the target region. No randomness is involved; the outcome is
//! a pure function of the neighborhood.

use strata_sample::Sample;

use crate::registry::BorderCandidate;
use crate::sampler::ChainNode;

pub(super) fn eval(
    parent: &mut ChainNode,
    candidates: &[BorderCandidate],
    x: i32,
    y: i32,
) -> Sample {
    let center = parent.sample_at(x, y);
    if !center.is_land() || !center.has_biome() {
        return center;
    }

    let neighbors = [
        parent.sample_at(x - 1, y - 1),
        parent.sample_at(x, y - 1),
        parent.sample_at(x + 1, y - 1),
        parent.sample_at(x - 1, y),
        parent.sample_at(x + 1, y),
        parent.sample_at(x - 1, y + 1),
        parent.sample_at(x, y + 1),
        parent.sample_at(x + 1, y + 1),
    ];

    for candidate in candidates {
        if center.biome() == candidate.biome || candidate.targets.contains(&center.biome()) {
            continue;
        }
        let mut touches_target = false;
        let mut touches_excluded = false;
        for neighbor in &neighbors {
            let biome = neighbor.biome();
            if candidate.targets.contains(&biome) {
                touches_target = true;
            }
            if candidate.excluded.contains(&biome) {
                touches_excluded = true;
            }
        }
        if touches_target && !touches_excluded {
            return center.with_biome(candidate.biome);
        }
    }
    center
}
