//! The bit-packed classification value for one coordinate at one pipeline stage.
//!
//! Layout of the 32-bit sample, high bit first:
//!
//! | bits   | field  |
//! |--------|--------|
//! | 31     | ICE    |
//! | 30     | ISLAND |
//! | 29     | LAND   |
//! | 28..22 | group  |
//! | 21..0  | biome  |
//!
//! All mask constants live here; stages manipulate samples only through the
//! methods below.

use serde::{Deserialize, Serialize};

/// Unique identifier for a biome.
///
/// Id 0 is reserved: it marks a cell whose biome has not been resolved yet,
/// and doubles as the generator-level ocean fallback. Valid registered ids
/// are `1..=BiomeId::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeId(pub u32);

impl BiomeId {
    /// Number of bits a biome id occupies inside a sample.
    pub const BITS: u32 = 22;
    /// Largest id that fits in the sample's biome field.
    pub const MAX: u32 = (1 << Self::BITS) - 1;
    /// The unresolved-biome marker.
    pub const NONE: Self = Self(0);
}

/// Unique identifier for a biome group.
///
/// Id 0 means "no group assigned"; valid registered ids are `1..=GroupId::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u8);

impl GroupId {
    /// Largest id that fits in the sample's 7-bit group field.
    pub const MAX: u8 = 127;
    /// The no-group marker.
    pub const NONE: Self = Self(0);
}

/// A bit-packed classification value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sample(u32);

const ICE_BIT: u32 = 1 << 31;
const ISLAND_BIT: u32 = 1 << 30;
const LAND_BIT: u32 = 1 << 29;
const GROUP_SHIFT: u32 = BiomeId::BITS;
const GROUP_BITS: u32 = (GroupId::MAX as u32) << GROUP_SHIFT;
const BIOME_BITS: u32 = BiomeId::MAX;

impl Sample {
    /// The depth-0 source value: ocean, no flags, nothing assigned.
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw 32-bit value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Pack a full tuple of fields into a sample.
    pub fn pack(parts: SampleParts) -> Self {
        let mut raw = (parts.biome.0 & BIOME_BITS)
            | ((u32::from(parts.group.0) << GROUP_SHIFT) & GROUP_BITS);
        if parts.land {
            raw |= LAND_BIT;
        }
        if parts.island {
            raw |= ISLAND_BIT;
        }
        if parts.ice {
            raw |= ICE_BIT;
        }
        Self(raw)
    }

    /// Unpack into the full tuple of fields. Exact inverse of [`Sample::pack`].
    pub fn parts(self) -> SampleParts {
        SampleParts {
            ice: self.is_ice(),
            island: self.is_island(),
            land: self.is_land(),
            group: self.group(),
            biome: self.biome(),
        }
    }

    pub const fn is_land(self) -> bool {
        self.0 & LAND_BIT != 0
    }

    pub const fn is_ice(self) -> bool {
        self.0 & ICE_BIT != 0
    }

    pub const fn is_island(self) -> bool {
        self.0 & ISLAND_BIT != 0
    }

    /// The assigned group, or [`GroupId::NONE`].
    pub const fn group(self) -> GroupId {
        GroupId(((self.0 & GROUP_BITS) >> GROUP_SHIFT) as u8)
    }

    /// The assigned biome, or [`BiomeId::NONE`].
    pub const fn biome(self) -> BiomeId {
        BiomeId(self.0 & BIOME_BITS)
    }

    /// Whether a biome id has been resolved for this cell.
    pub const fn has_biome(self) -> bool {
        self.0 & BIOME_BITS != 0
    }

    #[must_use]
    pub const fn with_land(self) -> Self {
        Self(self.0 | LAND_BIT)
    }

    #[must_use]
    pub const fn with_ice(self) -> Self {
        Self(self.0 | ICE_BIT)
    }

    #[must_use]
    pub const fn with_island(self) -> Self {
        Self(self.0 | ISLAND_BIT)
    }

    /// Replace the group field.
    #[must_use]
    pub const fn with_group(self, group: GroupId) -> Self {
        Self((self.0 & !GROUP_BITS) | (((group.0 as u32) << GROUP_SHIFT) & GROUP_BITS))
    }

    /// Replace the biome field.
    #[must_use]
    pub const fn with_biome(self, biome: BiomeId) -> Self {
        Self((self.0 & !BIOME_BITS) | (biome.0 & BIOME_BITS))
    }

    /// Strip the transient fields (ISLAND flag and group id), leaving the
    /// externally consumed (LAND, ICE, biome) triple.
    #[must_use]
    pub const fn finalized(self) -> Self {
        Self(self.0 & (LAND_BIT | ICE_BIT | BIOME_BITS))
    }
}

/// The unpacked form of a [`Sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleParts {
    pub ice: bool,
    pub island: bool,
    pub land: bool,
    pub group: GroupId,
    pub biome: BiomeId,
}
