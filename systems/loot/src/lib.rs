#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tiered loot sampling with a persistent guarantee mechanism.
//!
//! Each generation call charges one of two usage counters, depending on the
//! cost tier of the triggering item. Counter thresholds force specific
//! high-value outcomes before any randomness runs, which bounds the worst
//! case wait for a rare reward. The random path draws a luck-sized batch
//! whose per-item tier odds are skewed by the trigger's cost tier and cost
//! factor and decayed across successive hits in the same batch. A configured
//! total-value cap bounds every batch, guaranteed awards included, by
//! substituting downward through the tiers.

use blast_fishing_core::{
    CostFactor, CounterStore, GuaranteeAward, GuaranteeTrack, LootDefinition, TierPartition,
    TriggerTier, ValueTier, TIER_HIGH_MAX,
};
use rand::Rng;

/// Flat success scale applied on top of the tier base probability.
const SUCCESS_COST_SCALE: f32 = 0.15;
/// Jackpot odds when the caller does not override them.
const JACKPOT_BASE_CHANCE: f32 = 0.01;
/// Extra jackpot odds granted to the most expensive triggers.
const JACKPOT_COST_BONUS: f32 = 0.02;
/// In-tier sampling weight exponent over the entry value.
const WEIGHT_EXPONENT: f32 = 0.45;
/// Extra weight for entries above the top-tier value threshold.
const TOP_VALUE_MULTIPLIER: f32 = 1.18;
/// Top-tier probability boost at full cost factor.
const TOP_TIER_COST_BOOST: f32 = 0.06;
/// Lowest-tier probability penalty at full cost factor.
const LOW_TIER_COST_PENALTY: f32 = 0.04;

const HIGH_TRACK_TOP_INTERVAL: i64 = 100;
const HIGH_TRACK_MID_INTERVAL: i64 = 50;
const LOW_TRACK_RUNAWAY_THRESHOLD: i64 = 114;
const LOW_TRACK_TOP_INTERVAL: i64 = 51;
const LOW_TRACK_LOW_INTERVAL: i64 = 20;

/// Tuning for the random sampling path.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Base probability of each value tier before any adjustment, ordered
    /// lowest tier first. Normalized at sampling time.
    pub base_tier_probs: [f32; ValueTier::COUNT],
    /// Per-produced-item decay applied to the upper tiers within one batch.
    pub decay_base: f32,
    /// Fixed jackpot odds. `None` derives them from the cost factor.
    pub jackpot_chance: Option<f32>,
    /// Ceiling on the summed value of one batch. `None` is uncapped.
    pub value_cap: Option<u64>,
    /// Trigger cost mapped to cost factor 0.
    pub min_cost: u32,
    /// Trigger cost mapped to cost factor 1.
    pub max_cost: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_tier_probs: [0.68, 0.22, 0.07, 0.03],
            decay_base: 0.85,
            jackpot_chance: None,
            value_cap: None,
            min_cost: 300,
            max_cost: 12_000,
        }
    }
}

impl GeneratorConfig {
    /// Clamps every field into its workable range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for prob in self.base_tier_probs.iter_mut() {
            *prob = prob.max(0.0);
        }
        if self.base_tier_probs.iter().sum::<f32>() <= 0.0 {
            self.base_tier_probs = GeneratorConfig::default().base_tier_probs;
        }
        self.decay_base = self.decay_base.clamp(0.0, 1.0);
        self.jackpot_chance = self.jackpot_chance.map(|chance| chance.clamp(0.0, 1.0));
        self
    }
}

/// Outcome of one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct LootBatch {
    /// Items produced, in draw order. May be empty.
    pub items: Vec<LootDefinition>,
    /// Summed value of `items`.
    pub total_value: u64,
    /// Guarantee track charged by this call.
    pub track: GuaranteeTrack,
    /// Track count after this call's increment.
    pub track_count: i64,
    /// Guarantee that pre-empted the random path, if one fired.
    pub guarantee: Option<GuaranteeAward>,
}

impl LootBatch {
    fn from_items(
        items: Vec<LootDefinition>,
        track: GuaranteeTrack,
        track_count: i64,
        guarantee: Option<GuaranteeAward>,
    ) -> Self {
        let total_value = items.iter().map(|item| u64::from(item.value())).sum();
        Self {
            items,
            total_value,
            track,
            track_count,
            guarantee,
        }
    }
}

/// Samples loot batches from a value-tiered catalog.
///
/// The counter store is a constructor dependency so hosts decide where the
/// guarantee counts live; the generator charges exactly one track once per
/// call and never resets a counter.
#[derive(Debug)]
pub struct LootGenerator<S> {
    catalog: TierPartition,
    config: GeneratorConfig,
    store: S,
}

impl<S: CounterStore> LootGenerator<S> {
    /// Builds a generator over `catalog`, sanitizing the config first.
    #[must_use]
    pub fn new(catalog: &[LootDefinition], config: GeneratorConfig, store: S) -> Self {
        Self {
            catalog: TierPartition::build(catalog),
            config: config.sanitized(),
            store,
        }
    }

    /// Tuning currently in effect.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Counter store backing the guarantee tracks.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates one batch for a trigger of `trigger_cost`, with `luck` in
    /// `[0, 1]` controlling the batch size band.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        luck: f32,
        trigger_cost: u32,
        rng: &mut R,
    ) -> LootBatch {
        let trigger = TriggerTier::from_cost(trigger_cost);
        let cost_factor =
            CostFactor::from_cost(trigger_cost, self.config.min_cost, self.config.max_cost);
        let track = trigger.guarantee_track();
        let count = self.store.increment_counter(track.counter_key());

        if let Some(award) = guarantee_award(track, count) {
            // The cap binds awards too: substitute downward when the awarded
            // entry exceeds it, or forgo the item while still recording the
            // fired rule and the charged count.
            let items: Vec<_> = self
                .award_item(award, rng)
                .and_then(|item| self.fit_to_cap(item, 0))
                .into_iter()
                .collect();
            log::info!(
                "loot_generator: {track:?} guarantee fired at count {count}, awarding {award:?}"
            );
            return LootBatch::from_items(items, track, count, Some(award));
        }

        let slots = batch_size(luck, rng);

        if rng.gen::<f32>() < trigger.dud_probability() {
            log::debug!("loot_generator: dud roll emptied a {trigger:?} batch");
            return LootBatch::from_items(Vec::new(), track, count, None);
        }

        let mut items = Vec::with_capacity(slots);
        let mut total_value = 0u64;

        let jackpot_chance = match self.config.jackpot_chance {
            Some(chance) => chance,
            None => JACKPOT_BASE_CHANCE + JACKPOT_COST_BONUS * cost_factor.get(),
        };
        if rng.gen::<f32>() < jackpot_chance {
            if let Some(candidate) = self.weighted_pick(ValueTier::Top, rng) {
                // A jackpot that cannot fit the cap is forgone outright; it
                // never costs a batch slot.
                match self.fit_to_cap(candidate, total_value) {
                    Some(item) => {
                        log::debug!("loot_generator: jackpot produced {}", item.display_name());
                        total_value += u64::from(item.value());
                        items.push(item);
                    }
                    None => log::debug!("loot_generator: jackpot forgone, nothing fits the cap"),
                }
            }
        }

        let success_probability = (trigger.success_probability()
            * (1.0 + SUCCESS_COST_SCALE * cost_factor.get()))
        .min(1.0);
        let base_probs = self.adjusted_tier_probs(trigger, cost_factor);

        for _ in items.len()..slots {
            if rng.gen::<f32>() >= success_probability {
                continue;
            }
            let probs = decayed_probs(base_probs, self.config.decay_base, items.len());
            let value_tier = roll_tier(&probs, rng);
            let Some(candidate) = self.weighted_pick(value_tier, rng) else {
                continue;
            };
            let Some(item) = self.fit_to_cap(candidate, total_value) else {
                continue;
            };
            total_value += u64::from(item.value());
            items.push(item);
        }

        log::debug!(
            "loot_generator: produced {} items worth {total_value} for a {trigger:?} trigger",
            items.len()
        );
        LootBatch::from_items(items, track, count, None)
    }

    /// Resolves a guarantee award to a concrete catalog entry.
    fn award_item<R: Rng + ?Sized>(
        &self,
        award: GuaranteeAward,
        rng: &mut R,
    ) -> Option<LootDefinition> {
        match award {
            GuaranteeAward::TopTier => self.weighted_pick(ValueTier::Top, rng),
            GuaranteeAward::HighTier => self.weighted_pick(ValueTier::High, rng),
            GuaranteeAward::LowTier => self.weighted_pick(ValueTier::Low, rng),
            GuaranteeAward::BestInCatalog => self.catalog.most_valuable(),
        }
    }

    /// Base tier probabilities adjusted for the trigger tier and cost
    /// factor, normalized to sum to one.
    fn adjusted_tier_probs(&self, trigger: TriggerTier, cost_factor: CostFactor) -> [f32; 4] {
        let mut probs = self.config.base_tier_probs;
        for (prob, multiplier) in probs.iter_mut().zip(trigger.tier_multipliers()) {
            *prob *= multiplier;
        }
        probs[ValueTier::Top.index()] += TOP_TIER_COST_BOOST * cost_factor.get();
        let low = ValueTier::Low.index();
        probs[low] = (probs[low] - LOW_TIER_COST_PENALTY * cost_factor.get()).max(0.0);
        normalized(probs)
    }

    /// Samples one entry from a tier with weight `max(1, value)^0.45`,
    /// multiplied for entries above the top value threshold. An empty tier
    /// falls back to the full catalog; `None` means the catalog is empty.
    fn weighted_pick<R: Rng + ?Sized>(
        &self,
        tier: ValueTier,
        rng: &mut R,
    ) -> Option<LootDefinition> {
        let entries = self.catalog.tier_or_all(tier);
        if entries.is_empty() {
            return None;
        }
        let total: f32 = entries.iter().map(entry_weight).sum();
        let roll = rng.gen::<f32>() * total;
        let mut cumulative = 0.0;
        for entry in entries {
            cumulative += entry_weight(entry);
            if roll < cumulative {
                return Some(*entry);
            }
        }
        entries.last().copied()
    }

    /// Applies the value cap to a candidate. Returns the candidate itself
    /// when it fits, the best substitute when it does not, or `None` when
    /// nothing at or below the remaining headroom exists.
    fn fit_to_cap(&self, candidate: LootDefinition, total_so_far: u64) -> Option<LootDefinition> {
        let Some(cap) = self.config.value_cap else {
            return Some(candidate);
        };
        let headroom = cap.saturating_sub(total_so_far);
        if u64::from(candidate.value()) <= headroom {
            return Some(candidate);
        }
        self.substitute_under(candidate.tier(), headroom)
    }

    /// Highest-value entry at or below `headroom`, searching the starting
    /// tier first and then each lower tier in turn.
    fn substitute_under(&self, start: ValueTier, headroom: u64) -> Option<LootDefinition> {
        ValueTier::ORDERED[..=start.index()]
            .iter()
            .rev()
            .find_map(|tier| {
                self.catalog
                    .tier(*tier)
                    .iter()
                    .filter(|item| u64::from(item.value()) <= headroom)
                    .max_by_key(|item| item.value())
                    .copied()
            })
    }
}

/// First matching guarantee rule for a track at the given count, if any.
fn guarantee_award(track: GuaranteeTrack, count: i64) -> Option<GuaranteeAward> {
    match track {
        GuaranteeTrack::HighCost => {
            if count % HIGH_TRACK_TOP_INTERVAL == 0 {
                Some(GuaranteeAward::TopTier)
            } else if count % HIGH_TRACK_MID_INTERVAL == 0 {
                Some(GuaranteeAward::HighTier)
            } else {
                None
            }
        }
        GuaranteeTrack::LowCost => {
            // Counts past the runaway threshold stay eligible forever; there
            // is deliberately no reset here.
            if count > LOW_TRACK_RUNAWAY_THRESHOLD {
                Some(GuaranteeAward::BestInCatalog)
            } else if count % LOW_TRACK_TOP_INTERVAL == 0 {
                Some(GuaranteeAward::TopTier)
            } else if count % LOW_TRACK_LOW_INTERVAL == 0 {
                Some(GuaranteeAward::LowTier)
            } else {
                None
            }
        }
    }
}

/// Batch size from the luck band. The top band draws nothing from the rng.
fn batch_size<R: Rng + ?Sized>(luck: f32, rng: &mut R) -> usize {
    if luck < 0.25 {
        rng.gen_range(2..=3)
    } else if luck < 0.50 {
        rng.gen_range(3..=4)
    } else if luck < 0.75 {
        rng.gen_range(4..=5)
    } else {
        5
    }
}

/// Shrinks the upper tiers by `decay_base ^ produced` and hands the removed
/// mass to the lowest tier, so repeated hits in one batch drift downward.
fn decayed_probs(mut probs: [f32; 4], decay_base: f32, produced: usize) -> [f32; 4] {
    if produced == 0 {
        return probs;
    }
    let decay = decay_base.powi(produced as i32);
    let mut shifted = 0.0;
    for prob in probs.iter_mut().skip(1) {
        shifted += *prob * (1.0 - decay);
        *prob *= decay;
    }
    probs[0] += shifted;
    normalized(probs)
}

fn normalized(mut probs: [f32; 4]) -> [f32; 4] {
    let total: f32 = probs.iter().sum();
    if total > f32::EPSILON {
        for prob in probs.iter_mut() {
            *prob /= total;
        }
        probs
    } else {
        [1.0 / probs.len() as f32; 4]
    }
}

/// Cumulative roll over the four tier probabilities. Floating point drift
/// past the last boundary resolves to the top tier.
fn roll_tier<R: Rng + ?Sized>(probs: &[f32; 4], rng: &mut R) -> ValueTier {
    let roll = rng.gen::<f32>();
    let mut cumulative = 0.0;
    for (index, prob) in probs.iter().enumerate() {
        cumulative += prob;
        if roll < cumulative {
            return ValueTier::ORDERED[index];
        }
    }
    ValueTier::Top
}

fn entry_weight(entry: &LootDefinition) -> f32 {
    let weight = (entry.value().max(1) as f32).powf(WEIGHT_EXPONENT);
    if entry.value() > TIER_HIGH_MAX {
        weight * TOP_VALUE_MULTIPLIER
    } else {
        weight
    }
}
