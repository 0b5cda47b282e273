//! Scale (zoom) stage: doubles effective resolution.
//!
//! Each child cell reads up to four parent cells at half-resolution
//! coordinates and picks one of them, which is how coarse randomness becomes
//! fine detail without recomputing from scratch. The per-cell stream is
//! opened at the even child coordinate so all four children of one parent
//! cell share the same draws; the draw count then depends only on the
//! child's parity, keeping every child deterministic on its own.

use strata_sample::{PositionRng, Sample, StageSeed};

use crate::sampler::ChainNode;

pub(super) fn eval(
    seed: StageSeed,
    parent: &mut ChainNode,
    fuzzy: bool,
    x: i32,
    y: i32,
) -> Sample {
    let px = x >> 1;
    let py = y >> 1;
    let p00 = parent.sample_at(px, py);
    let mut rng = PositionRng::at(seed, x & !1, y & !1);

    let x_odd = x & 1 == 1;
    let y_odd = y & 1 == 1;
    if !x_odd && !y_odd {
        return p00;
    }

    let p01 = parent.sample_at(px, py + 1);
    let south = rng.choose2(p00, p01);
    if !x_odd {
        return south;
    }

    let p10 = parent.sample_at(px + 1, py);
    let east = rng.choose2(p00, p10);
    if !y_odd {
        return east;
    }

    let p11 = parent.sample_at(px + 1, py + 1);
    if fuzzy {
        rng.choose4(p00, p10, p01, p11)
    } else {
        mode_or_random(&mut rng, p00, p10, p01, p11)
    }
}

/// The odd/odd child takes the modal parent value; ties fall back to a
/// uniform pick.
fn mode_or_random(
    rng: &mut PositionRng,
    a: Sample,
    b: Sample,
    c: Sample,
    d: Sample,
) -> Sample {
    if b == c && c == d {
        b
    } else if a == b && a == c {
        a
    } else if a == b && a == d {
        a
    } else if a == c && a == d {
        a
    } else if a == b && c != d {
        a
    } else if a == c && b != d {
        a
    } else if a == d && b != c {
        a
    } else if b == c && a != d {
        b
    } else if b == d && a != c {
        b
    } else if c == d && a != b {
        c
    } else {
        rng.choose4(a, b, c, d)
    }
}
