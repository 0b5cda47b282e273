//! Isle stage: small enclosed biome patches inside designated hosts.
//!
//! Candidates at a depth are tried in registration order; the first whose
//! rarity check succeeds and whose host set covers the cell's current biome
//! (or open ocean, for ocean-hosting candidates) wins. The rarity draw is
//! consumed for every candidate whether or not it is eligible, so the stream
//! stays aligned with the registration order — part of the reproducibility
//! contract.

use strata_sample::{PositionRng, Sample, StageSeed};

use crate::registry::IsleCandidate;
use crate::sampler::ChainNode;

pub(super) fn eval(
    seed: StageSeed,
    parent: &mut ChainNode,
    candidates: &[IsleCandidate],
    x: i32,
    y: i32,
) -> Sample {
    let sample = parent.sample_at(x, y);
    let mut rng = PositionRng::at(seed, x, y);
    for candidate in candidates {
        let selected = rng.chance(candidate.chance);
        if !selected {
            continue;
        }
        let eligible = if sample.is_land() {
            candidate.hosts.contains(&sample.biome())
        } else {
            candidate.in_ocean
        };
        if eligible {
            return sample
                .with_land()
                .with_island()
                .with_biome(candidate.biome);
        }
    }
    sample
}
