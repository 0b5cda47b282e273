//! Read-only selection registries derived from the configuration at build
//! time: the group registry and the per-depth weighted candidate lists.
//!
//! All rarity-weighted picks share one rule: draw in `0..space`, walk the
//! entries in registration order accumulating weights, and return the first
//! entry whose cumulative weight exceeds the draw. A draw landing beyond the
//! cumulative total selects nothing, leaving the cell for a later stage.

use hashbrown::HashMap;
use strata_sample::{BiomeId, GroupId, PositionRng};

/// Groups with an average temperature below this are "cold" and eligible for
/// ice.
pub(crate) const FREEZE_THRESHOLD: f32 = 0.33;

/// One weighted candidate.
#[derive(Clone, Debug)]
pub(crate) struct WeightedEntry<T> {
    pub value: T,
    pub weight: u32,
}

/// An ordered weighted candidate list with an explicit draw space.
///
/// When `space` exceeds the cumulative weight, the surplus is the
/// "no selection" remainder.
#[derive(Clone, Debug)]
pub(crate) struct WeightedList<T> {
    entries: Vec<WeightedEntry<T>>,
    space: u32,
}

impl<T> WeightedList<T> {
    /// Build a list. The draw space is the larger of `min_space` and the
    /// cumulative weight, so every entry stays reachable.
    pub fn new(entries: Vec<WeightedEntry<T>>, min_space: u32) -> Self {
        let total: u32 = entries.iter().map(|e| e.weight).sum();
        Self {
            entries,
            space: total.max(min_space),
        }
    }

    /// Run one weighted pick against the given per-cell stream.
    pub fn pick(&self, rng: &mut PositionRng) -> Option<&T> {
        if self.space == 0 {
            return None;
        }
        let draw = rng.next_bounded(self.space);
        let mut cumulative = 0u32;
        for entry in &self.entries {
            cumulative += entry.weight;
            if cumulative > draw {
                return Some(&entry.value);
            }
        }
        None
    }
}

/// One member biome inside a built group.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MemberBiome {
    pub id: BiomeId,
    pub size: u32,
}

/// A biome group after build: derived average temperature and the weighted
/// member list (draw space = cumulative member rarity, so the walk always
/// lands on some member — it just may be one for a different depth).
#[derive(Clone, Debug)]
pub(crate) struct Group {
    pub id: GroupId,
    pub avg_temperature: f32,
    pub members: WeightedList<MemberBiome>,
}

impl Group {
    pub fn is_cold(&self) -> bool {
        self.avg_temperature < FREEZE_THRESHOLD
    }
}

/// Maps group id to built group for the lifetime of a pipeline.
#[derive(Clone, Debug, Default)]
pub(crate) struct GroupRegistry {
    groups: HashMap<u8, Group>,
}

impl GroupRegistry {
    pub fn insert(&mut self, group: Group) {
        self.groups.insert(group.id.0, group);
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id.0)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// A flat biome candidate for BeforeGroups assignment: the member plus its
/// owning group, so the winning cell can be stamped with both ids.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FlatBiome {
    pub group: GroupId,
    pub biome: BiomeId,
    pub size: u32,
}

/// One isle candidate at a given depth.
#[derive(Clone, Debug)]
pub(crate) struct IsleCandidate {
    pub biome: BiomeId,
    /// Selection denominator: `(rarity scale + 1) - rarity`, so rarer biomes
    /// get a larger denominator.
    pub chance: u32,
    /// Host biomes this isle may replace.
    pub hosts: Vec<BiomeId>,
    /// Whether the isle may also spawn in open ocean.
    pub in_ocean: bool,
}

/// One border candidate at a given depth.
#[derive(Clone, Debug)]
pub(crate) struct BorderCandidate {
    pub biome: BiomeId,
    /// The border forms on cells adjacent to these biomes.
    pub targets: Vec<BiomeId>,
    /// No border forms if any neighbor carries one of these biomes.
    pub excluded: Vec<BiomeId>,
}
