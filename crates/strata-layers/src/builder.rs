//! Pipeline builder: validates the configuration, derives the read-only
//! selection registries, and assembles the stage chain.
//!
//! The chain is assembled bottom-up in a fixed order: at every depth a scale
//! stage runs first, then land introduction (once, with a fuzzy scale),
//! coastline fuzzing inside the fuzz window, group/biome assignment per
//! mode, ice at its configured depth, and any isle/border candidates
//! registered for the depth. Ocean fill and finalize close the procedural
//! chain; an image override wraps (or replaces) it in FromImage mode.
//!
//! Stage salts are fixed constants, so a given seed always reproduces the
//! same world layout.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashSet;
use strata_sample::{BiomeId, GroupId, StageSeed};
use tracing::debug;

use crate::config::{GenerationMode, ImageMode, LayerConfig};
use crate::error::BuildError;
use crate::registry::{
    BorderCandidate, FlatBiome, Group, GroupRegistry, IsleCandidate, MemberBiome, WeightedEntry,
    WeightedList,
};
use crate::sampler::{BiomeSampler, ChainNode};
use crate::stage::StageKind;

/// Build a sampler chain for one `(seed, configuration)` pair.
///
/// # Errors
///
/// Returns a [`BuildError`] for any configuration-shape problem; a returned
/// sampler never fails during sampling.
pub fn build_pipeline(seed: i64, config: &LayerConfig) -> Result<BiomeSampler, BuildError> {
    validate(config)?;
    let registries = Registries::derive(config);
    let sampler = BiomeSampler::new(assemble(seed, config, &registries));
    debug!(
        stages = sampler.stage_count(),
        generation_depth = config.generation_depth,
        groups = registries.groups.len(),
        "built biome classification pipeline"
    );
    Ok(sampler)
}

fn check_biome_id(id: BiomeId) -> Result<(), BuildError> {
    if id.0 == 0 || id.0 > BiomeId::MAX {
        return Err(BuildError::BiomeIdOutOfRange(id.0));
    }
    Ok(())
}

fn depth_in_range(stage: &'static str, depth: u32, max: u32) -> Result<(), BuildError> {
    if depth >= max {
        return Err(BuildError::DepthOutOfRange { stage, depth, max });
    }
    Ok(())
}

fn validate(config: &LayerConfig) -> Result<(), BuildError> {
    if config.land_rarity == 0 {
        return Err(BuildError::ZeroRarity("land"));
    }
    if config.ice.rarity == 0 {
        return Err(BuildError::ZeroRarity("ice"));
    }
    check_biome_id(config.ocean_biome)?;

    let max = config.generation_depth;

    // The registered-descriptor universe: group members, isle and border
    // candidates, plus the ocean biome. Candidate eligibility sets may only
    // reference ids in this universe.
    let mut known: HashSet<u32> = HashSet::new();
    known.insert(config.ocean_biome.0);
    for groups in config.groups.values() {
        for group in groups {
            for member in &group.biomes {
                check_biome_id(member.id)?;
                known.insert(member.id.0);
            }
        }
    }
    for descriptors in config.isles.values().chain(config.borders.values()) {
        for descriptor in descriptors {
            check_biome_id(descriptor.id)?;
            known.insert(descriptor.id.0);
        }
    }

    let mut seen_groups: HashSet<u8> = HashSet::new();
    for (&depth, groups) in &config.groups {
        depth_in_range("group", depth, max)?;
        for group in groups {
            if group.id == GroupId::NONE || group.id.0 > GroupId::MAX {
                return Err(BuildError::GroupIdOutOfRange(u32::from(group.id.0)));
            }
            if !seen_groups.insert(group.id.0) {
                return Err(BuildError::DuplicateGroup(group.id.0));
            }
            if group.biomes.is_empty() {
                return Err(BuildError::EmptyGroup(group.id.0));
            }
            let total: u32 = group.biomes.iter().map(|b| b.rarity).sum();
            if total == 0 {
                return Err(BuildError::ZeroGroupRarity(group.id.0));
            }
        }
    }

    for &depth in &config.biome_depths {
        depth_in_range("biome assignment", depth, max)?;
        if config.groups.is_empty() {
            return Err(BuildError::NoGroupsForBiomeDepth(depth));
        }
    }

    for (&depth, descriptors) in &config.isles {
        depth_in_range("isle", depth, max)?;
        for descriptor in descriptors {
            if descriptor.rarity == 0 {
                return Err(BuildError::ZeroRarity("isle candidate"));
            }
            if descriptor.rarity > config.biome_rarity_scale {
                return Err(BuildError::RarityAboveScale {
                    id: descriptor.id.0,
                    rarity: descriptor.rarity,
                    scale: config.biome_rarity_scale,
                });
            }
            if descriptor.isle_in.is_empty() {
                return Err(BuildError::EmptyIsleHosts(descriptor.id.0));
            }
            for host in &descriptor.isle_in {
                if !known.contains(&host.0) {
                    return Err(BuildError::UnknownBiomeReference {
                        context: "isle host set",
                        id: host.0,
                    });
                }
            }
        }
    }

    for (&depth, descriptors) in &config.borders {
        depth_in_range("border", depth, max)?;
        for descriptor in descriptors {
            if descriptor.border_in.is_empty() {
                return Err(BuildError::EmptyBorderTargets(descriptor.id.0));
            }
            for id in descriptor.border_in.iter().chain(&descriptor.not_border_near) {
                if !known.contains(&id.0) {
                    return Err(BuildError::UnknownBiomeReference {
                        context: "border target set",
                        id: id.0,
                    });
                }
            }
        }
    }

    if matches!(config.mode, GenerationMode::FromImage(_)) {
        let overlay = config.image.as_ref().ok_or(BuildError::MissingImage)?;
        let expected = overlay.width as usize * overlay.height as usize;
        if overlay.cells.len() != expected {
            return Err(BuildError::ImageSizeMismatch {
                actual: overlay.cells.len(),
                width: overlay.width,
                height: overlay.height,
            });
        }
        for cell in overlay.cells.iter().flatten() {
            check_biome_id(*cell)?;
        }
    }

    Ok(())
}

/// The read-only registries shared by the assembled stages.
struct Registries {
    groups: Arc<GroupRegistry>,
    groups_at_depth: BTreeMap<u32, Arc<WeightedList<GroupId>>>,
    flat_biomes: Arc<WeightedList<FlatBiome>>,
    isles_at_depth: BTreeMap<u32, Arc<Vec<IsleCandidate>>>,
    borders_at_depth: BTreeMap<u32, Arc<Vec<BorderCandidate>>>,
}

impl Registries {
    fn derive(config: &LayerConfig) -> Self {
        let mut registry = GroupRegistry::default();
        let mut groups_at_depth = BTreeMap::new();
        let mut flat_entries = Vec::new();

        for (&depth, groups) in &config.groups {
            let mut entries = Vec::with_capacity(groups.len());
            for group in groups {
                let avg_temperature = group.biomes.iter().map(|b| b.temperature).sum::<f32>()
                    / group.biomes.len() as f32;
                let members = group
                    .biomes
                    .iter()
                    .map(|b| WeightedEntry {
                        value: MemberBiome {
                            id: b.id,
                            size: b.size,
                        },
                        weight: b.rarity,
                    })
                    .collect();
                registry.insert(Group {
                    id: group.id,
                    avg_temperature,
                    members: WeightedList::new(members, 0),
                });
                entries.push(WeightedEntry {
                    value: group.id,
                    weight: group.rarity,
                });
                for member in &group.biomes {
                    flat_entries.push(WeightedEntry {
                        value: FlatBiome {
                            group: group.id,
                            biome: member.id,
                            size: member.size,
                        },
                        weight: member.rarity,
                    });
                }
            }
            groups_at_depth.insert(
                depth,
                Arc::new(WeightedList::new(entries, config.group_rarity_total)),
            );
        }

        let isles_at_depth = config
            .isles
            .iter()
            .map(|(&depth, descriptors)| {
                let candidates = descriptors
                    .iter()
                    .map(|d| IsleCandidate {
                        biome: d.id,
                        chance: (config.biome_rarity_scale + 1) - d.rarity,
                        hosts: d
                            .isle_in
                            .iter()
                            .copied()
                            .filter(|host| *host != config.ocean_biome)
                            .collect(),
                        in_ocean: d.isle_in.contains(&config.ocean_biome),
                    })
                    .collect();
                (depth, Arc::new(candidates))
            })
            .collect();

        let borders_at_depth = config
            .borders
            .iter()
            .map(|(&depth, descriptors)| {
                let candidates = descriptors
                    .iter()
                    .map(|d| BorderCandidate {
                        biome: d.id,
                        targets: d.border_in.clone(),
                        excluded: d.not_border_near.clone(),
                    })
                    .collect();
                (depth, Arc::new(candidates))
            })
            .collect();

        Self {
            groups: Arc::new(registry),
            groups_at_depth,
            flat_biomes: Arc::new(WeightedList::new(flat_entries, 0)),
            isles_at_depth,
            borders_at_depth,
        }
    }
}

fn assemble(seed: i64, config: &LayerConfig, registries: &Registries) -> ChainNode {
    let capacity = config.cache_capacity;
    let derive = |salt: i64| StageSeed::derive(seed, salt);
    let wrap = |kind: StageKind, seed: StageSeed, node: ChainNode| {
        ChainNode::new(kind, seed, capacity, Some(Box::new(node)))
    };

    let mut node = ChainNode::new(StageKind::Init, derive(1), capacity, None);

    let procedural = !matches!(
        config.mode,
        GenerationMode::FromImage(mode) if mode != ImageMode::ContinueNormal
    );

    if procedural {
        for depth in 0..config.generation_depth {
            let depth_salt = i64::from(depth);
            node = wrap(
                StageKind::Scale { fuzzy: false },
                derive(2000 + depth_salt),
                node,
            );

            if depth == config.land_size {
                node = wrap(
                    StageKind::Land {
                        rarity: config.land_rarity,
                    },
                    derive(1),
                    node,
                );
                node = wrap(StageKind::Scale { fuzzy: true }, derive(2000), node);
            }

            if depth < config.land_size + config.land_fuzz {
                node = wrap(StageKind::AddIslands, derive(depth_salt), node);
            }

            match config.mode {
                GenerationMode::Normal => {
                    if let Some(candidates) = registries.groups_at_depth.get(&depth) {
                        node = wrap(
                            StageKind::Group {
                                candidates: candidates.clone(),
                                freeze: config.freeze_groups,
                            },
                            derive(depth_salt),
                            node,
                        );
                    }
                    if config.biome_depths.contains(&depth) {
                        node = wrap(
                            StageKind::Biome {
                                groups: registries.groups.clone(),
                                depth,
                            },
                            derive(depth_salt),
                            node,
                        );
                    }
                }
                GenerationMode::BeforeGroups => {
                    if config.biome_depths.contains(&depth) {
                        node = wrap(
                            StageKind::BeforeGroups {
                                candidates: registries.flat_biomes.clone(),
                                depth,
                            },
                            derive(depth_salt),
                            node,
                        );
                    }
                }
                GenerationMode::FromImage(_) => {}
            }

            if depth == config.ice.depth {
                node = wrap(
                    StageKind::Ice {
                        settings: config.ice,
                        groups: registries.groups.clone(),
                    },
                    derive(depth_salt),
                    node,
                );
            }

            if let Some(candidates) = registries.isles_at_depth.get(&depth) {
                node = wrap(
                    StageKind::Isle {
                        candidates: candidates.clone(),
                    },
                    derive(depth_salt),
                    node,
                );
            }

            if let Some(candidates) = registries.borders_at_depth.get(&depth) {
                node = wrap(
                    StageKind::Border {
                        candidates: candidates.clone(),
                    },
                    derive(depth_salt),
                    node,
                );
            }
        }

        node = wrap(
            StageKind::ApplyOcean {
                ocean: config.ocean_biome,
            },
            derive(3),
            node,
        );
        node = wrap(StageKind::Finalize, derive(1), node);
    }

    if let GenerationMode::FromImage(mode) = config.mode {
        if let Some(overlay) = &config.image {
            node = wrap(
                StageKind::FromImage {
                    overlay: Arc::new(overlay.clone()),
                    mode,
                    ocean: config.ocean_biome,
                },
                derive(0),
                node,
            );
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BiomeDescriptor, GroupConfig, IceSettings, ImageOverlay};
    use strata_sample::Sample;

    fn biome(id: u32, rarity: u32, size: u32) -> BiomeDescriptor {
        BiomeDescriptor {
            id: BiomeId(id),
            rarity,
            size,
            temperature: 0.5,
            isle_in: Vec::new(),
            border_in: Vec::new(),
            not_border_near: Vec::new(),
        }
    }

    fn one_group_config() -> LayerConfig {
        let mut config = LayerConfig {
            generation_depth: 4,
            land_size: 2,
            land_rarity: 2,
            land_fuzz: 1,
            biome_depths: vec![2],
            ocean_biome: BiomeId(1),
            group_rarity_total: 0,
            ..LayerConfig::default()
        };
        config.groups.insert(
            2,
            vec![GroupConfig {
                id: GroupId(1),
                rarity: 1,
                biomes: vec![biome(2, 1, 2)],
            }],
        );
        config
    }

    fn grid(sampler: &mut BiomeSampler, size: i32) -> Vec<Sample> {
        let mut out = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                out.push(sampler.sample_at(x, y));
            }
        }
        out
    }

    // --- validation ---

    #[test]
    fn test_zero_land_rarity_rejected() {
        let config = LayerConfig {
            land_rarity: 0,
            ..LayerConfig::default()
        };
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::ZeroRarity("land"))
        ));
    }

    #[test]
    fn test_biome_id_out_of_range_rejected() {
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].biomes[0].id = BiomeId(BiomeId::MAX + 1);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::BiomeIdOutOfRange(_))
        ));
    }

    #[test]
    fn test_zero_group_id_rejected() {
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].id = GroupId::NONE;
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::GroupIdOutOfRange(0))
        ));
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut config = one_group_config();
        let group = config.groups[&2][0].clone();
        config.groups.get_mut(&2).unwrap().push(group);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::DuplicateGroup(1))
        ));
    }

    #[test]
    fn test_empty_group_rejected() {
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].biomes.clear();
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::EmptyGroup(1))
        ));
    }

    #[test]
    fn test_zero_cumulative_rarity_rejected() {
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].biomes[0].rarity = 0;
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::ZeroGroupRarity(1))
        ));
    }

    #[test]
    fn test_group_depth_beyond_generation_depth_rejected() {
        let mut config = one_group_config();
        let groups = config.groups.remove(&2).unwrap();
        config.groups.insert(9, groups);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::DepthOutOfRange {
                stage: "group",
                depth: 9,
                max: 4
            })
        ));
    }

    #[test]
    fn test_biome_depth_without_groups_rejected() {
        let config = LayerConfig {
            biome_depths: vec![1],
            ..LayerConfig::default()
        };
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::NoGroupsForBiomeDepth(1))
        ));
    }

    #[test]
    fn test_isle_with_unknown_host_rejected() {
        let mut config = one_group_config();
        let mut isle = biome(5, 10, 3);
        isle.isle_in = vec![BiomeId(999)];
        config.isles.insert(3, vec![isle]);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::UnknownBiomeReference {
                context: "isle host set",
                id: 999
            })
        ));
    }

    #[test]
    fn test_isle_rarity_above_scale_rejected() {
        let mut config = one_group_config();
        let mut isle = biome(5, 101, 3);
        isle.isle_in = vec![BiomeId(2)];
        config.isles.insert(3, vec![isle]);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::RarityAboveScale {
                id: 5,
                rarity: 101,
                scale: 100
            })
        ));
    }

    #[test]
    fn test_border_without_targets_rejected() {
        let mut config = one_group_config();
        config.borders.insert(3, vec![biome(6, 1, 3)]);
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::EmptyBorderTargets(6))
        ));
    }

    #[test]
    fn test_from_image_without_overlay_rejected() {
        let config = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::FillEmpty),
            ..LayerConfig::default()
        };
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::MissingImage)
        ));
    }

    #[test]
    fn test_image_size_mismatch_rejected() {
        let config = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::FillEmpty),
            image: Some(ImageOverlay {
                width: 2,
                height: 2,
                offset_x: 0,
                offset_y: 0,
                cells: vec![Some(BiomeId(1))],
            }),
            ..LayerConfig::default()
        };
        assert!(matches!(
            build_pipeline(1, &config),
            Err(BuildError::ImageSizeMismatch { actual: 1, .. })
        ));
    }

    // --- pipeline properties ---

    #[test]
    fn test_two_builds_sample_identically() {
        let config = one_group_config();
        let mut a = build_pipeline(12345, &config).unwrap();
        let mut b = build_pipeline(12345, &config).unwrap();
        for y in -20..20 {
            for x in -20..20 {
                assert_eq!(
                    a.sample_at(x, y),
                    b.sample_at(x, y),
                    "independent builds must agree at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_determinism_at_random_coordinates() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let config = one_group_config();
        let mut a = build_pipeline(31415, &config).unwrap();
        let mut b = build_pipeline(31415, &config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            let x = rng.random_range(-100_000..100_000);
            let y = rng.random_range(-100_000..100_000);
            assert_eq!(
                a.sample_at(x, y),
                b.sample_at(x, y),
                "independent builds must agree at far-flung coordinate ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_different_seeds_produce_different_worlds() {
        let config = one_group_config();
        let mut a = build_pipeline(1, &config).unwrap();
        let mut b = build_pipeline(2, &config).unwrap();
        let differing = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| a.sample_at(x, y) != b.sample_at(x, y))
            .count();
        assert!(
            differing > 0,
            "seed 1 and seed 2 should not generate identical 32x32 windows"
        );
    }

    #[test]
    fn test_query_order_does_not_affect_results() {
        let config = one_group_config();
        let mut forward = build_pipeline(777, &config).unwrap();
        let mut reverse = build_pipeline(777, &config).unwrap();
        let mut expected = Vec::new();
        for y in 0..16 {
            for x in 0..16 {
                expected.push(((x, y), forward.sample_at(x, y)));
            }
        }
        for &((x, y), sample) in expected.iter().rev() {
            assert_eq!(
                reverse.sample_at(x, y),
                sample,
                "sampling order must not change the value at ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_caching_is_transparent() {
        let cached_config = one_group_config();
        let uncached_config = LayerConfig {
            cache_capacity: 0,
            ..one_group_config()
        };
        let mut cached = build_pipeline(9001, &cached_config).unwrap();
        let mut uncached = build_pipeline(9001, &uncached_config).unwrap();
        for y in -16..16 {
            for x in -16..16 {
                assert_eq!(
                    cached.sample_at(x, y),
                    uncached.sample_at(x, y),
                    "cache must only affect performance, never the value at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_land_fraction_converges_to_rarity() {
        // Land at depth 0 followed by a single fuzzy scale keeps the per-cell
        // land probability at exactly 1/rarity.
        let rarity = 4;
        let config = LayerConfig {
            generation_depth: 1,
            land_size: 0,
            land_rarity: rarity,
            land_fuzz: 0,
            ..LayerConfig::default()
        };
        let mut sampler = build_pipeline(555, &config).unwrap();
        let size = 128;
        let land = grid(&mut sampler, size)
            .iter()
            .filter(|s| s.is_land())
            .count();
        let observed = land as f64 / f64::from(size * size);
        let expected = 1.0 / f64::from(rarity);
        assert!(
            (observed - expected).abs() < 0.05,
            "land fraction {observed} should converge to {expected}"
        );
    }

    #[test]
    fn test_end_to_end_scenario_leaves_no_unassigned_cells() {
        let config = one_group_config();
        let mut sampler = build_pipeline(12345, &config).unwrap();
        let samples = grid(&mut sampler, 16);
        let mut land = 0u32;
        for (index, sample) in samples.iter().enumerate() {
            if sample.is_land() {
                land += 1;
                assert_eq!(
                    sample.biome(),
                    BiomeId(2),
                    "land cell {index} must carry the group's only biome"
                );
            } else {
                assert_eq!(
                    sample.biome(),
                    BiomeId(1),
                    "ocean cell {index} must carry the ocean biome"
                );
            }
            assert_eq!(
                sample.group(),
                GroupId::NONE,
                "finalized samples must not expose group bits"
            );
            assert!(!sample.is_island(), "finalized samples must not expose the island marker");
        }
        let fraction = f64::from(land) / 256.0;
        assert!(
            (0.1..0.9).contains(&fraction),
            "land fraction {fraction} should be in the neighborhood of 1/land_rarity"
        );
    }

    #[test]
    fn test_border_biome_never_touches_excluded_neighbor() {
        // Host 2, filler 3, excluded 4; border 9 forms around 2 but never
        // next to 4.
        let mut config = LayerConfig {
            generation_depth: 3,
            land_size: 0,
            land_rarity: 1,
            land_fuzz: 0,
            biome_depths: vec![0],
            ocean_biome: BiomeId(1),
            group_rarity_total: 0,
            ..LayerConfig::default()
        };
        config.groups.insert(
            0,
            vec![GroupConfig {
                id: GroupId(1),
                rarity: 1,
                biomes: vec![biome(2, 2, 0), biome(3, 1, 0), biome(4, 1, 0)],
            }],
        );
        let mut border = biome(9, 1, 2);
        border.border_in = vec![BiomeId(2)];
        border.not_border_near = vec![BiomeId(4)];
        config.borders.insert(2, vec![border]);

        let mut sampler = build_pipeline(4242, &config).unwrap();
        let size = 64i32;
        let samples = grid(&mut sampler, size);
        let at = |x: i32, y: i32| samples[(y * size + x) as usize];

        let mut border_cells = 0;
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                if at(x, y).biome() != BiomeId(9) {
                    continue;
                }
                border_cells += 1;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        assert_ne!(
                            at(x + dx, y + dy).biome(),
                            BiomeId(4),
                            "border biome at ({x}, {y}) touches an excluded neighbor"
                        );
                    }
                }
            }
        }
        assert!(
            border_cells > 0,
            "the border biome should occur somewhere in a 64x64 window"
        );
    }

    #[test]
    fn test_isle_only_replaces_its_host() {
        // Isle 8 hosted only in biome 2, with a certain (1-in-1) selection
        // chance. Diffing against the same pipeline without the isle stage
        // shows exactly the host cells converted.
        let mut with_isle = one_group_config();
        let mut isle = biome(8, 100, 3);
        isle.isle_in = vec![BiomeId(2)];
        with_isle.isles.insert(3, vec![isle]);
        let without_isle = one_group_config();

        let mut a = build_pipeline(31337, &with_isle).unwrap();
        let mut b = build_pipeline(31337, &without_isle).unwrap();
        let mut converted = 0;
        for y in 0..48 {
            for x in 0..48 {
                let isle_sample = a.sample_at(x, y);
                let base = b.sample_at(x, y);
                if isle_sample == base {
                    continue;
                }
                converted += 1;
                assert_eq!(
                    base.biome(),
                    BiomeId(2),
                    "isle at ({x}, {y}) must have replaced its configured host"
                );
                assert_eq!(isle_sample.biome(), BiomeId(8));
                assert!(isle_sample.is_land());
            }
        }
        assert!(converted > 0, "a certain-chance isle should appear in 48x48");
    }

    #[test]
    fn test_ocean_hosted_isle_becomes_land() {
        let mut config = one_group_config();
        let mut isle = biome(8, 100, 3);
        isle.isle_in = vec![BiomeId(1)];
        config.isles.insert(3, vec![isle]);

        let mut with_isle = build_pipeline(99, &config).unwrap();
        let mut base = build_pipeline(99, &one_group_config()).unwrap();
        let mut converted = 0;
        for y in 0..48 {
            for x in 0..48 {
                let sample = with_isle.sample_at(x, y);
                let before = base.sample_at(x, y);
                if sample == before {
                    continue;
                }
                converted += 1;
                assert!(
                    !before.is_land(),
                    "ocean-hosted isle at ({x}, {y}) must have replaced ocean"
                );
                assert!(sample.is_land(), "isle cells are land");
                assert_eq!(sample.biome(), BiomeId(8));
            }
        }
        assert!(converted > 0, "ocean-hosted isle should appear in 48x48");
    }

    #[test]
    fn test_before_groups_mode_assigns_biomes_and_groups() {
        let mut config = one_group_config();
        config.mode = GenerationMode::BeforeGroups;
        let mut sampler = build_pipeline(12345, &config).unwrap();
        let samples = grid(&mut sampler, 16);
        for sample in &samples {
            if sample.is_land() {
                assert_eq!(sample.biome(), BiomeId(2));
            } else {
                assert_eq!(sample.biome(), BiomeId(1));
            }
        }
    }

    #[test]
    fn test_pure_image_mode_skips_the_procedural_chain() {
        let config = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::FillEmpty),
            ocean_biome: BiomeId(1),
            image: Some(ImageOverlay {
                width: 2,
                height: 1,
                offset_x: 0,
                offset_y: 0,
                cells: vec![Some(BiomeId(7)), None],
            }),
            ..LayerConfig::default()
        };
        let mut sampler = build_pipeline(1, &config).unwrap();
        assert_eq!(sampler.stage_count(), 2, "FillEmpty mode is init + image only");

        let inside = sampler.sample_at(0, 0);
        assert!(inside.is_land());
        assert_eq!(inside.biome(), BiomeId(7));

        // Transparent cell and out-of-bounds cells both fall back to ocean.
        for (x, y) in [(1, 0), (5, 5), (-3, 0)] {
            let sample = sampler.sample_at(x, y);
            assert!(!sample.is_land());
            assert_eq!(sample.biome(), BiomeId(1), "({x}, {y}) must be ocean");
        }
    }

    #[test]
    fn test_repeat_image_mode_tiles_the_overlay() {
        let config = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::Repeat),
            ocean_biome: BiomeId(1),
            image: Some(ImageOverlay {
                width: 2,
                height: 2,
                offset_x: 0,
                offset_y: 0,
                cells: vec![
                    Some(BiomeId(7)),
                    Some(BiomeId(1)),
                    Some(BiomeId(3)),
                    Some(BiomeId(4)),
                ],
            }),
            ..LayerConfig::default()
        };
        let mut sampler = build_pipeline(1, &config).unwrap();
        for y in -6..6 {
            for x in -6..6 {
                assert_eq!(
                    sampler.sample_at(x, y),
                    sampler.sample_at(x + 2, y + 2),
                    "repeat mode must tile with the overlay period"
                );
            }
        }
        // An ocean-id cell stays ocean even inside the overlay.
        assert!(!sampler.sample_at(1, 0).is_land());
    }

    #[test]
    fn test_continue_normal_image_overrides_only_covered_cells() {
        let overlay = ImageOverlay {
            width: 1,
            height: 1,
            offset_x: 0,
            offset_y: 0,
            cells: vec![Some(BiomeId(2))],
        };
        let with_cell = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::ContinueNormal),
            image: Some(overlay.clone()),
            ..one_group_config()
        };
        let empty = LayerConfig {
            mode: GenerationMode::FromImage(ImageMode::ContinueNormal),
            image: Some(ImageOverlay {
                cells: vec![None],
                ..overlay
            }),
            ..one_group_config()
        };
        let mut a = build_pipeline(5, &with_cell).unwrap();
        let mut b = build_pipeline(5, &empty).unwrap();
        assert_eq!(a.sample_at(0, 0).biome(), BiomeId(2));
        assert!(a.sample_at(0, 0).is_land());
        for y in 1..12 {
            for x in 1..12 {
                assert_eq!(
                    a.sample_at(x, y),
                    b.sample_at(x, y),
                    "cells outside the overlay must fall through to the procedural chain"
                );
            }
        }
    }

    #[test]
    fn test_freeze_groups_still_assigns_every_land_cell() {
        let mut config = one_group_config();
        config.freeze_groups = true;
        let mut frozen = build_pipeline(12345, &config).unwrap();
        for sample in grid(&mut frozen, 16) {
            if sample.is_land() {
                assert_eq!(sample.biome(), BiomeId(2));
            }
        }
    }

    #[test]
    fn test_ice_flags_cold_group_land() {
        // A single very cold group with a certain freeze chance: every land
        // cell carries ice.
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].biomes[0].temperature = 0.0;
        config.ice = IceSettings {
            depth: 3,
            rarity: 1,
            apply_to_ocean: false,
        };
        let mut sampler = build_pipeline(2024, &config).unwrap();
        let samples = grid(&mut sampler, 24);
        let mut land = 0;
        for sample in &samples {
            if sample.is_land() {
                land += 1;
                assert!(sample.is_ice(), "cold-group land must freeze at rarity 1");
            } else {
                assert!(!sample.is_ice(), "ocean must not freeze unless configured");
            }
        }
        assert!(land > 0);
    }

    #[test]
    fn test_warm_group_land_never_freezes() {
        let mut config = one_group_config();
        config.groups.get_mut(&2).unwrap()[0].biomes[0].temperature = 0.9;
        config.ice = IceSettings {
            depth: 3,
            rarity: 1,
            apply_to_ocean: false,
        };
        let mut sampler = build_pipeline(2024, &config).unwrap();
        for sample in grid(&mut sampler, 24) {
            assert!(!sample.is_ice(), "warm-group cells must never freeze");
        }
    }
}
