//! Fixed reward catalog and its value-tier partition.
//!
//! The catalog is a compiled-in, value-ordered table. Nothing mutates it at
//! runtime; samplers only ever partition it into the four value tiers and
//! draw from the resulting buckets.

use serde::{Deserialize, Serialize};

/// Highest value still counted as the lowest tier.
pub const TIER_LOW_MAX: u32 = 1_000;

/// Highest value still counted as the mid tier.
pub const TIER_MID_MAX: u32 = 3_000;

/// Highest value still counted as the high tier; everything above is top.
pub const TIER_HIGH_MAX: u32 = 6_000;

/// Identifier a loot entry carries in the host's item database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogId(u32);

impl CatalogId {
    /// Creates a new catalog identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable description of a single reward entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LootDefinition {
    display_name: &'static str,
    catalog_id: CatalogId,
    value: u32,
}

impl LootDefinition {
    /// Creates a new loot definition.
    #[must_use]
    pub const fn new(display_name: &'static str, catalog_id: CatalogId, value: u32) -> Self {
        Self {
            display_name,
            catalog_id,
            value,
        }
    }

    /// Human-readable name of the entry.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Identifier of the entry in the host's item database.
    #[must_use]
    pub const fn catalog_id(&self) -> CatalogId {
        self.catalog_id
    }

    /// Economic value of the entry.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Value tier the entry belongs to.
    #[must_use]
    pub const fn tier(&self) -> ValueTier {
        ValueTier::of_value(self.value)
    }
}

/// One of the four value-based partitions of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueTier {
    /// Entries valued up to [`TIER_LOW_MAX`].
    Low,
    /// Entries valued above [`TIER_LOW_MAX`] up to [`TIER_MID_MAX`].
    Mid,
    /// Entries valued above [`TIER_MID_MAX`] up to [`TIER_HIGH_MAX`].
    High,
    /// Entries valued above [`TIER_HIGH_MAX`].
    Top,
}

impl ValueTier {
    /// Number of value tiers.
    pub const COUNT: usize = 4;

    /// Tiers ordered from lowest to highest value.
    pub const ORDERED: [ValueTier; ValueTier::COUNT] =
        [ValueTier::Low, ValueTier::Mid, ValueTier::High, ValueTier::Top];

    /// Classifies a value into its tier.
    #[must_use]
    pub const fn of_value(value: u32) -> ValueTier {
        if value <= TIER_LOW_MAX {
            ValueTier::Low
        } else if value <= TIER_MID_MAX {
            ValueTier::Mid
        } else if value <= TIER_HIGH_MAX {
            ValueTier::High
        } else {
            ValueTier::Top
        }
    }

    /// Zero-based position of the tier, lowest value first.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ValueTier::Low => 0,
            ValueTier::Mid => 1,
            ValueTier::High => 2,
            ValueTier::Top => 3,
        }
    }
}

/// Catalog entries bucketed by value tier.
///
/// Building the partition is deterministic: partitioning the same catalog
/// twice yields identical membership in identical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierPartition {
    all: Vec<LootDefinition>,
    tiers: [Vec<LootDefinition>; ValueTier::COUNT],
}

impl TierPartition {
    /// Buckets the provided catalog into the four value tiers.
    #[must_use]
    pub fn build(catalog: &[LootDefinition]) -> Self {
        let mut tiers: [Vec<LootDefinition>; ValueTier::COUNT] = Default::default();
        for entry in catalog {
            tiers[entry.tier().index()].push(*entry);
        }
        Self {
            all: catalog.to_vec(),
            tiers,
        }
    }

    /// Entries of one tier, in catalog order.
    #[must_use]
    pub fn tier(&self, tier: ValueTier) -> &[LootDefinition] {
        &self.tiers[tier.index()]
    }

    /// Entries of one tier, falling back to the whole catalog when empty.
    #[must_use]
    pub fn tier_or_all(&self, tier: ValueTier) -> &[LootDefinition] {
        let bucket = self.tier(tier);
        if bucket.is_empty() {
            &self.all
        } else {
            bucket
        }
    }

    /// Every partitioned entry, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[LootDefinition] {
        &self.all
    }

    /// The single most valuable entry of the catalog, if any.
    #[must_use]
    pub fn most_valuable(&self) -> Option<LootDefinition> {
        self.all.iter().copied().max_by_key(LootDefinition::value)
    }
}

/// Complete reward catalog, ordered by ascending value.
#[must_use]
pub const fn full_catalog() -> &'static [LootDefinition] {
    &CATALOG
}

const CATALOG: [LootDefinition; 30] = [
    LootDefinition::new("Bighead Goldfish", CatalogId::new(1123), 492),
    LootDefinition::new("Brown Sardine", CatalogId::new(1106), 497),
    LootDefinition::new("Blue Mackerel", CatalogId::new(1100), 506),
    LootDefinition::new("Red Goldfish", CatalogId::new(1119), 515),
    LootDefinition::new("Pink Goldfish", CatalogId::new(1114), 525),
    LootDefinition::new("Redfin Snapper", CatalogId::new(1117), 785),
    LootDefinition::new("Blue Tang", CatalogId::new(1103), 805),
    LootDefinition::new("Purple Damselfish", CatalogId::new(1115), 814),
    LootDefinition::new("Green Pufferfish", CatalogId::new(1126), 970),
    LootDefinition::new("Red Coral Grouper", CatalogId::new(1118), 983),
    LootDefinition::new("Blue Damselfish", CatalogId::new(1098), 996),
    LootDefinition::new("White Bream", CatalogId::new(1124), 1_006),
    LootDefinition::new("Green Snapper", CatalogId::new(1097), 1_066),
    LootDefinition::new("White Batfish", CatalogId::new(1122), 1_108),
    LootDefinition::new("Brown Barracuda", CatalogId::new(1105), 1_128),
    LootDefinition::new("Greenback Carp", CatalogId::new(1109), 1_578),
    LootDefinition::new("Green Fathead", CatalogId::new(1108), 1_640),
    LootDefinition::new("Blue Milkfish", CatalogId::new(1099), 1_715),
    LootDefinition::new("Bigeye Redfish", CatalogId::new(1120), 1_835),
    LootDefinition::new("Yellowtail Puffer", CatalogId::new(1110), 2_057),
    LootDefinition::new("Brown Grunt", CatalogId::new(1104), 2_063),
    LootDefinition::new("Orange Squirrelfish", CatalogId::new(1113), 2_979),
    LootDefinition::new("Blue Marlin", CatalogId::new(1101), 3_762),
    LootDefinition::new("Pinkfin Flamefish", CatalogId::new(1116), 3_798),
    LootDefinition::new("Yellowfin Snapper", CatalogId::new(1125), 3_807),
    LootDefinition::new("Blue Sailfish", CatalogId::new(1102), 4_107),
    LootDefinition::new("Orange Bluefin", CatalogId::new(1112), 4_113),
    LootDefinition::new("Blue Catshark", CatalogId::new(1111), 6_084),
    LootDefinition::new("Red Grouper", CatalogId::new(1121), 6_534),
    LootDefinition::new("Golden Arowana", CatalogId::new(1107), 12_300),
];
