//! Add-islands stage: coastline fuzzing.
//!
//! Reads the four diagonal neighbors of the 3x3 neighborhood from upstream.
//! An ocean cell next to land has a 1-in-3 chance of adopting one of its
//! land neighbors (picked by reservoir sampling, so every land neighbor is
//! equally likely); a land cell next to ocean erodes to ocean 1 in 5 times.
//! The builder splices this stage only while the depth is inside the
//! `land_size + land_fuzz` window, before any biome content exists, so a
//! flip back to ocean resets the cell outright.

use strata_sample::{PositionRng, Sample, StageSeed};

use crate::sampler::ChainNode;

pub(super) fn eval(seed: StageSeed, parent: &mut ChainNode, x: i32, y: i32) -> Sample {
    let center = parent.sample_at(x, y);
    let corners = [
        parent.sample_at(x - 1, y - 1),
        parent.sample_at(x + 1, y - 1),
        parent.sample_at(x - 1, y + 1),
        parent.sample_at(x + 1, y + 1),
    ];
    let mut rng = PositionRng::at(seed, x, y);

    if center.is_land() {
        let touches_ocean = corners.iter().any(|c| !c.is_land());
        if touches_ocean && rng.chance(5) {
            return Sample::EMPTY;
        }
        return center;
    }

    // Reservoir-pick one land corner; each draw is consumed unconditionally
    // so the stream stays aligned regardless of the pick outcome.
    let mut seen = 0;
    let mut pick = None;
    for corner in corners {
        if corner.is_land() {
            seen += 1;
            if rng.chance(seen) {
                pick = Some(corner);
            }
        }
    }
    if let Some(land) = pick {
        if rng.chance(3) {
            return land;
        }
    }
    center
}
