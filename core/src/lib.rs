#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the blast-fishing engine.
//!
//! This crate defines the message surface that connects host adapters, the
//! scene, and the pure systems. Adapters submit [`Command`] values describing
//! explosion reports and cache maintenance, the pipeline executes them
//! against the classifier and the loot generator, and broadcasts [`Event`]
//! values for placement collaborators to react to. The crate also carries the
//! data model those systems agree on: surface tags and probe contracts, the
//! reward catalog with its value tiers, the trigger-cost model, and the
//! persistent counter contract backing the guarantee tracks.

use glam::Vec3;

pub mod catalog;
pub mod counter;
pub mod geometry;
pub mod trigger;

pub use catalog::{
    full_catalog, CatalogId, LootDefinition, TierPartition, ValueTier, TIER_HIGH_MAX,
    TIER_LOW_MAX, TIER_MID_MAX,
};
pub use counter::{CounterStore, HIGH_TRACK_COUNTER, LOW_TRACK_COUNTER};
pub use geometry::{
    Aabb, GeometryError, GeometryQuery, SurfaceHit, SurfaceMask, SurfaceTag, TaggedVolume,
    VolumeId,
};
pub use trigger::{CostFactor, GuaranteeAward, GuaranteeTrack, TriggerTier};

/// Commands that express everything the host may ask of the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Records the value of the item that will trigger the next explosion.
    ///
    /// Hosts that learn the trigger cost ahead of the detonation (for example
    /// when the item leaves the inventory) submit it here so a later
    /// [`Command::ReportExplosion`] without an explicit cost can fall back to
    /// the most recent capture.
    NoteTriggerCost {
        /// Economic value of the triggering item; non-positive captures are ignored.
        cost: u32,
    },
    /// Reports that an explosion occurred and requests assessment plus loot.
    ReportExplosion {
        /// World-space detonation point.
        position: Vec3,
        /// Value of the triggering item, when the host knows it at report
        /// time. `None` falls back to the last noted cost.
        trigger_cost: Option<u32>,
        /// Luck stat in `[0, 1]` supplied by the host, or `None` to let the
        /// pipeline draw one uniformly.
        luck: Option<f32>,
    },
    /// Requests a rescan of liquid-tagged volumes before the next assessment.
    RebuildLiquidCache,
}

/// Events broadcast by the pipeline after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Reports the classification verdict for one explosion.
    ExplosionAssessed {
        /// Detonation point that was assessed.
        position: Vec3,
        /// Whether the point was judged to lie inside a liquid region.
        in_liquid: bool,
        /// Trigger cost the pipeline settled on for this explosion.
        trigger_cost: u32,
    },
    /// Carries the reward batch produced for an in-liquid explosion.
    LootGenerated {
        /// Detonation point the batch belongs to.
        position: Vec3,
        /// Items drawn from the catalog, possibly empty on a dud roll.
        items: Vec<LootDefinition>,
        /// Combined value of the batch.
        total_value: u64,
    },
    /// Announces that a guarantee rule pre-empted random sampling.
    GuaranteeTriggered {
        /// Track whose counter crossed a guarantee threshold.
        track: GuaranteeTrack,
        /// Counter value after the increment that fired the rule.
        count: i64,
        /// Outcome class the rule forced.
        award: GuaranteeAward,
    },
    /// Confirms that the liquid volume cache was rebuilt.
    LiquidCacheRebuilt {
        /// Number of liquid-tagged volumes now cached.
        volumes: usize,
    },
}
