//! Pipeline construction errors.
//!
//! Every configuration-shape problem is detected while building the pipeline
//! and reported here; a successfully built pipeline never fails at sampling
//! time.

use strata_sample::{BiomeId, GroupId};

/// Errors raised while validating a [`crate::LayerConfig`] and assembling the
/// stage chain.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A biome id is zero (reserved) or does not fit the 22-bit sample field.
    #[error("biome id {0} is out of range (valid ids are 1..={max})", max = BiomeId::MAX)]
    BiomeIdOutOfRange(u32),

    /// A group id is zero (reserved) or does not fit the 7-bit sample field.
    #[error("group id {0} is out of range (valid ids are 1..={max})", max = GroupId::MAX)]
    GroupIdOutOfRange(u32),

    /// The same group id was registered twice.
    #[error("group id {0} is registered more than once")]
    DuplicateGroup(u8),

    /// A group has no member biomes.
    #[error("group {0} has no member biomes")]
    EmptyGroup(u8),

    /// A group's cumulative member rarity is zero, so no member could ever win
    /// a weighted pick.
    #[error("group {0} has a cumulative rarity of zero")]
    ZeroGroupRarity(u8),

    /// A rarity denominator that must be nonzero is zero.
    #[error("{0} rarity must be nonzero")]
    ZeroRarity(&'static str),

    /// An isle candidate's rarity exceeds the global rarity scale, leaving it
    /// a zero (or negative) selection chance.
    #[error("isle biome {id} has rarity {rarity}, above the rarity scale {scale}")]
    RarityAboveScale { id: u32, rarity: u32, scale: u32 },

    /// An isle candidate lists no host biomes.
    #[error("isle biome {0} lists no host biomes")]
    EmptyIsleHosts(u32),

    /// A border candidate lists no target biomes.
    #[error("border biome {0} lists no target biomes")]
    EmptyBorderTargets(u32),

    /// An isle/border candidate references a biome id that is neither a
    /// registered descriptor nor the ocean biome.
    #[error("{context} references unregistered biome id {id}")]
    UnknownBiomeReference { context: &'static str, id: u32 },

    /// A stage is configured at a depth the generation loop never reaches.
    #[error("{stage} depth {depth} is outside the generation depth {max}")]
    DepthOutOfRange {
        stage: &'static str,
        depth: u32,
        max: u32,
    },

    /// Normal-mode biome assignment is configured but no biome groups exist.
    #[error("biome assignment at depth {0} has no biome groups to draw from")]
    NoGroupsForBiomeDepth(u32),

    /// FromImage mode selected without an image overlay.
    #[error("FromImage mode requires an image overlay")]
    MissingImage,

    /// The image overlay's cell buffer does not match its declared dimensions.
    #[error("image overlay has {actual} cells, expected {width}x{height}")]
    ImageSizeMismatch {
        actual: usize,
        width: u32,
        height: u32,
    },
}
