//! Pipeline configuration: the fully resolved inputs the builder consumes.
//!
//! The pipeline never parses configuration text; a loader (or test fixture)
//! hands it a [`LayerConfig`] value. All types here are plain data with
//! serde derives, and `Clone` produces a deep copy — independent group and
//! candidate lists — so concurrent pipeline builds never share mutable
//! substructure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_sample::{BiomeId, GroupId};

/// Descriptor for one biome, as resolved by the configuration loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDescriptor {
    /// Registered biome id (1..=[`BiomeId::MAX`]).
    pub id: BiomeId,
    /// Rarity weight for weighted selection.
    pub rarity: u32,
    /// Target generation depth ("size"): the depth at which this biome is
    /// placed by a biome-assignment or isle/border stage.
    pub size: u32,
    /// Biome temperature, used to derive the owning group's average.
    pub temperature: f32,
    /// Biome ids this biome may appear as an isle within. The ocean biome id
    /// here enables ocean hosting.
    #[serde(default)]
    pub isle_in: Vec<BiomeId>,
    /// Biome ids this biome forms a border around.
    #[serde(default)]
    pub border_in: Vec<BiomeId>,
    /// Biome ids this biome must never border.
    #[serde(default)]
    pub not_border_near: Vec<BiomeId>,
}

/// One biome group: a cluster of biomes assigned together to a land region.
///
/// Average temperature and cumulative rarity are derived by the builder, not
/// stored here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Registered group id (1..=[`GroupId::MAX`]).
    pub id: GroupId,
    /// Rarity weight of the group itself.
    pub rarity: u32,
    /// Ordered member biomes; order is part of the reproducibility contract.
    pub biomes: Vec<BiomeDescriptor>,
}

/// Ice stage parameters.
///
/// The depth the ice stage runs at is configurable rather than a fixed
/// constant; 3 keeps the long-standing default layout. A depth at or beyond
/// the generation depth disables the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceSettings {
    /// Generation depth at which the ice stage runs.
    pub depth: u32,
    /// Rarity denominator: a qualifying cell freezes with probability
    /// `1/rarity`.
    pub rarity: u32,
    /// Also freeze ocean cells, not just cold-group land.
    pub apply_to_ocean: bool,
}

impl Default for IceSettings {
    fn default() -> Self {
        Self {
            depth: 3,
            rarity: 5,
            apply_to_ocean: false,
        }
    }
}

/// How the overlay behaves outside its own bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMode {
    /// Tile the overlay infinitely in both axes.
    Repeat,
    /// Run the procedural chain and let the overlay override it where the
    /// overlay has cells.
    ContinueNormal,
    /// Skip the procedural chain; cells outside the overlay become ocean.
    FillEmpty,
}

/// Selects how biomes are assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Groups are assigned first; biomes are picked within the cell's group.
    Normal,
    /// Biomes are assigned globally before any group exists.
    BeforeGroups,
    /// Biomes come from an image-derived lookup table.
    FromImage(ImageMode),
}

/// A pre-resolved image lookup: the loader has already mapped pixels to
/// biome ids. `None` cells are transparent (unmapped pixels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    pub width: u32,
    pub height: u32,
    /// World x of the overlay's first column.
    pub offset_x: i32,
    /// World y of the overlay's first row.
    pub offset_y: i32,
    /// Row-major cells, `width * height` entries.
    pub cells: Vec<Option<BiomeId>>,
}

impl ImageOverlay {
    /// Look up the overlay cell covering a world coordinate.
    ///
    /// In [`ImageMode::Repeat`] the overlay tiles infinitely; in the other
    /// modes coordinates outside the overlay return `None`.
    pub fn lookup(&self, x: i32, y: i32, mode: ImageMode) -> Option<BiomeId> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let mut col = i64::from(x) - i64::from(self.offset_x);
        let mut row = i64::from(y) - i64::from(self.offset_y);
        if matches!(mode, ImageMode::Repeat) {
            col = col.rem_euclid(i64::from(self.width));
            row = row.rem_euclid(i64::from(self.height));
        }
        if col < 0 || row < 0 || col >= i64::from(self.width) || row >= i64::from(self.height) {
            return None;
        }
        self.cells[(row * i64::from(self.width) + col) as usize]
    }
}

/// The full, resolved pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Number of scale iterations; each depth doubles effective resolution.
    pub generation_depth: u32,
    /// Depth at which land is introduced.
    pub land_size: u32,
    /// Land rarity denominator: a cell becomes land with probability
    /// `1/land_rarity` at the land depth.
    pub land_rarity: u32,
    /// Number of depths past `land_size` during which the coastline keeps
    /// being fuzzed by the add-islands stage.
    pub land_fuzz: u32,
    /// Depths at which biome-assignment stages run.
    pub biome_depths: Vec<u32>,
    /// Biome groups registered per generation depth.
    pub groups: BTreeMap<u32, Vec<GroupConfig>>,
    /// Isle candidates registered per generation depth.
    pub isles: BTreeMap<u32, Vec<BiomeDescriptor>>,
    /// Border candidates registered per generation depth.
    pub borders: BTreeMap<u32, Vec<BiomeDescriptor>>,
    /// Biome id written into unassigned ocean cells by the ocean stage.
    pub ocean_biome: BiomeId,
    /// Global rarity scale for isle selection chances.
    pub biome_rarity_scale: u32,
    /// Draw space for the group pick; the gap above the summed group
    /// rarities is the "no group" remainder.
    pub group_rarity_total: u32,
    /// Force group continuity from already-assigned neighbors instead of
    /// re-rolling every cell.
    pub freeze_groups: bool,
    /// Ice stage parameters.
    pub ice: IceSettings,
    /// Biome assignment mode.
    pub mode: GenerationMode,
    /// Image overlay; required in [`GenerationMode::FromImage`].
    pub image: Option<ImageOverlay>,
    /// Per-stage cache capacity in entries; 0 disables caching.
    pub cache_capacity: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            generation_depth: 4,
            land_size: 0,
            land_rarity: 3,
            land_fuzz: 2,
            biome_depths: Vec::new(),
            groups: BTreeMap::new(),
            isles: BTreeMap::new(),
            borders: BTreeMap::new(),
            ocean_biome: BiomeId(1),
            biome_rarity_scale: 100,
            group_rarity_total: 100,
            freeze_groups: false,
            ice: IceSettings::default(),
            mode: GenerationMode::Normal,
            image: None,
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: u32) -> BiomeDescriptor {
        BiomeDescriptor {
            id: BiomeId(id),
            rarity: 1,
            size: 0,
            temperature: 0.5,
            isle_in: Vec::new(),
            border_in: Vec::new(),
            not_border_near: Vec::new(),
        }
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut config = LayerConfig::default();
        config.groups.insert(
            0,
            vec![GroupConfig {
                id: GroupId(1),
                rarity: 1,
                biomes: vec![descriptor(2)],
            }],
        );

        let snapshot = config.clone();
        config.groups.get_mut(&0).unwrap()[0].biomes.push(descriptor(3));
        config.biome_depths.push(9);

        assert_eq!(
            snapshot.groups[&0][0].biomes.len(),
            1,
            "mutating the original must not reach into the clone's group lists"
        );
        assert!(snapshot.biome_depths.is_empty());
    }

    #[test]
    fn test_overlay_lookup_repeat_wraps() {
        let overlay = ImageOverlay {
            width: 2,
            height: 2,
            offset_x: 0,
            offset_y: 0,
            cells: vec![
                Some(BiomeId(1)),
                Some(BiomeId(2)),
                Some(BiomeId(3)),
                Some(BiomeId(4)),
            ],
        };
        assert_eq!(overlay.lookup(0, 0, ImageMode::Repeat), Some(BiomeId(1)));
        assert_eq!(overlay.lookup(2, 0, ImageMode::Repeat), Some(BiomeId(1)));
        assert_eq!(overlay.lookup(-1, -1, ImageMode::Repeat), Some(BiomeId(4)));
        assert_eq!(
            overlay.lookup(-1, -1, ImageMode::FillEmpty),
            None,
            "non-repeat modes must not wrap"
        );
    }

    #[test]
    fn test_overlay_lookup_respects_offsets() {
        let overlay = ImageOverlay {
            width: 1,
            height: 1,
            offset_x: 10,
            offset_y: -5,
            cells: vec![Some(BiomeId(7))],
        };
        assert_eq!(
            overlay.lookup(10, -5, ImageMode::ContinueNormal),
            Some(BiomeId(7))
        );
        assert_eq!(overlay.lookup(0, 0, ImageMode::ContinueNormal), None);
    }
}
