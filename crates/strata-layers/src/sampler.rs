//! The built sampler chain.
//!
//! A pipeline is a linear chain of [`ChainNode`]s, each holding one stage
//! kind, its derived seed, its own bounded cache, and an owned upstream
//! node. Shared read-only registries ride inside the stage kinds behind
//! `Arc`; everything mutable (the caches) is chain-local, so one chain per
//! thread samples without any locking.

use strata_sample::{Sample, StageSeed};

use crate::cache::SampleCache;
use crate::stage::{self, StageKind};

/// One stage instance in a built chain.
pub(crate) struct ChainNode {
    kind: StageKind,
    seed: StageSeed,
    cache: SampleCache,
    upstream: Option<Box<ChainNode>>,
}

impl ChainNode {
    pub(crate) fn new(
        kind: StageKind,
        seed: StageSeed,
        cache_capacity: usize,
        upstream: Option<Box<ChainNode>>,
    ) -> Self {
        Self {
            kind,
            seed,
            cache: SampleCache::new(cache_capacity),
            upstream,
        }
    }

    /// Sample this stage at a coordinate, consulting the stage cache first.
    pub(crate) fn sample_at(&mut self, x: i32, y: i32) -> Sample {
        if let Some(hit) = self.cache.get(x, y) {
            return hit;
        }
        let value = stage::eval(&self.kind, self.seed, self.upstream.as_deref_mut(), x, y);
        self.cache.insert(x, y, value);
        value
    }

    /// Number of stages in the chain, this node included.
    pub(crate) fn depth(&self) -> usize {
        1 + self.upstream.as_ref().map_or(0, |node| node.depth())
    }
}

/// A built classification pipeline.
///
/// `sample_at` takes `&mut self` because every query updates the per-stage
/// caches. The sampler is reentrant along one execution context only: build
/// one sampler per generation thread (builds are cheap; the registries they
/// share are immutable).
pub struct BiomeSampler {
    root: ChainNode,
}

impl BiomeSampler {
    pub(crate) fn new(root: ChainNode) -> Self {
        Self { root }
    }

    /// The finalized classification value for a coordinate: LAND flag, ICE
    /// flag, and biome id. Any signed coordinate is valid; sampling never
    /// fails.
    pub fn sample_at(&mut self, x: i32, y: i32) -> Sample {
        self.root.sample_at(x, y)
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.root.depth()
    }
}
