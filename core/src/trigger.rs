//! Trigger-cost model: ordinal tiers, the continuous cost factor, and the
//! guarantee track vocabulary.
//!
//! The cost of the item that set off an explosion shapes the reward odds in
//! two ways. The coarse [`TriggerTier`] selects fixed probability tables, and
//! the fine-grained [`CostFactor`] nudges those tables continuously so two
//! costs inside the same tier still produce slightly different odds.

use serde::{Deserialize, Serialize};

/// Ordinal classification of a trigger cost, cheapest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerTier {
    /// Throwaway triggers below 800 value.
    D,
    /// Budget triggers below 2,000 value.
    C,
    /// Mid-range triggers below 4,500 value.
    B,
    /// Expensive triggers below 9,000 value.
    A,
    /// Premium triggers worth 9,000 value or more.
    S,
}

impl TriggerTier {
    /// Classifies an integer trigger cost via fixed breakpoints.
    #[must_use]
    pub const fn from_cost(cost: u32) -> TriggerTier {
        if cost < 800 {
            TriggerTier::D
        } else if cost < 2_000 {
            TriggerTier::C
        } else if cost < 4_500 {
            TriggerTier::B
        } else if cost < 9_000 {
            TriggerTier::A
        } else {
            TriggerTier::S
        }
    }

    /// Per-value-tier multipliers applied to the base tier probabilities.
    ///
    /// Ordered lowest value tier first. Cheap triggers push mass toward the
    /// low tier; premium triggers tilt it toward the top.
    #[must_use]
    pub const fn tier_multipliers(self) -> [f32; 4] {
        match self {
            TriggerTier::D => [1.20, 0.90, 0.60, 0.40],
            TriggerTier::C => [1.00, 1.00, 0.90, 0.80],
            TriggerTier::B => [0.90, 1.05, 1.15, 1.10],
            TriggerTier::A => [0.75, 1.05, 1.35, 1.45],
            TriggerTier::S => [0.60, 1.00, 1.60, 1.90],
        }
    }

    /// Base probability that one batch slot yields an item at all.
    #[must_use]
    pub const fn success_probability(self) -> f32 {
        match self {
            TriggerTier::D => 0.70,
            TriggerTier::C => 0.78,
            TriggerTier::B => 0.85,
            TriggerTier::A => 0.92,
            TriggerTier::S => 0.97,
        }
    }

    /// Probability that the whole call yields nothing.
    #[must_use]
    pub const fn dud_probability(self) -> f32 {
        match self {
            TriggerTier::D => 0.10,
            _ => 0.01,
        }
    }

    /// Guarantee track this tier's usage is counted against.
    #[must_use]
    pub const fn guarantee_track(self) -> GuaranteeTrack {
        match self {
            TriggerTier::D | TriggerTier::C => GuaranteeTrack::LowCost,
            TriggerTier::B | TriggerTier::A | TriggerTier::S => GuaranteeTrack::HighCost,
        }
    }
}

/// Normalized measure of how expensive the triggering item was.
///
/// Derived from a cost by linear normalization against a configured
/// `(min, max)` window followed by square-root compression, so mid-priced
/// triggers already receive most of the nudge.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct CostFactor(f32);

impl CostFactor {
    /// Factor for a trigger at or below the configured minimum cost.
    pub const ZERO: CostFactor = CostFactor(0.0);

    /// Derives the factor for `cost` inside the `(min_cost, max_cost)` window.
    ///
    /// A degenerate window with `max_cost <= min_cost` collapses to a binary
    /// factor: 1 at or above the maximum, 0 below it.
    #[must_use]
    pub fn from_cost(cost: u32, min_cost: u32, max_cost: u32) -> Self {
        if max_cost <= min_cost {
            return if cost >= max_cost {
                Self(1.0)
            } else {
                Self(0.0)
            };
        }
        let span = (max_cost - min_cost) as f32;
        let offset = cost.saturating_sub(min_cost) as f32;
        Self((offset / span).clamp(0.0, 1.0).sqrt())
    }

    /// Retrieves the factor as a value in `[0, 1]`.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

/// Guarantee track a generation call is counted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuaranteeTrack {
    /// Track shared by TriggerTier B, A and S usage.
    HighCost,
    /// Track shared by TriggerTier D and C usage.
    LowCost,
}

impl GuaranteeTrack {
    /// Persistent counter key backing the track.
    #[must_use]
    pub const fn counter_key(self) -> &'static str {
        match self {
            GuaranteeTrack::HighCost => crate::counter::HIGH_TRACK_COUNTER,
            GuaranteeTrack::LowCost => crate::counter::LOW_TRACK_COUNTER,
        }
    }
}

/// Outcome class a guarantee rule forces when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuaranteeAward {
    /// One entry sampled from the top value tier.
    TopTier,
    /// One entry sampled from the high value tier.
    HighTier,
    /// The single most valuable catalog entry.
    BestInCatalog,
    /// One entry sampled from the low value tier.
    LowTier,
}
