#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-driven orchestration of liquid assessment and loot generation.
//!
//! The pipeline owns one classifier and one generator and translates host
//! [`Command`] values into [`Event`] values. It also keeps the most recently
//! noted trigger cost, so hosts that learn an item's value before the
//! detonation can report the explosion itself without repeating it.

use blast_fishing_core::{Command, CounterStore, Event, GeometryQuery, LootDefinition};
use blast_fishing_system_classifier::{ClassifierConfig, LiquidClassifier};
use blast_fishing_system_loot::{GeneratorConfig, LootGenerator};
use rand::Rng;

/// Tuning for the pipeline and both systems it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Tuning forwarded to the liquid classifier.
    pub classifier: ClassifierConfig,
    /// Tuning forwarded to the loot generator.
    pub generator: GeneratorConfig,
    /// Trigger cost assumed when a report carries none and none was noted.
    pub fallback_trigger_cost: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            generator: GeneratorConfig::default(),
            fallback_trigger_cost: 500,
        }
    }
}

/// Stateful command processor connecting the classifier and the generator.
///
/// The liquid volume cache starts empty; hosts submit
/// [`Command::RebuildLiquidCache`] once the scene is populated and again
/// whenever liquid volumes change.
#[derive(Debug)]
pub struct Pipeline<S> {
    classifier: LiquidClassifier,
    generator: LootGenerator<S>,
    fallback_trigger_cost: u32,
    noted_trigger_cost: Option<u32>,
}

impl<S: CounterStore> Pipeline<S> {
    /// Builds a pipeline drawing rewards from `catalog` and guarantee counts
    /// from `store`.
    #[must_use]
    pub fn new(config: PipelineConfig, catalog: &[LootDefinition], store: S) -> Self {
        Self {
            classifier: LiquidClassifier::new(config.classifier),
            generator: LootGenerator::new(catalog, config.generator, store),
            fallback_trigger_cost: config.fallback_trigger_cost,
            noted_trigger_cost: None,
        }
    }

    /// Classifier driven by this pipeline.
    #[must_use]
    pub fn classifier(&self) -> &LiquidClassifier {
        &self.classifier
    }

    /// Generator driven by this pipeline.
    #[must_use]
    pub fn generator(&self) -> &LootGenerator<S> {
        &self.generator
    }

    /// The trigger cost a report without one would currently fall back to.
    #[must_use]
    pub fn noted_trigger_cost(&self) -> Option<u32> {
        self.noted_trigger_cost
    }

    /// Executes every command in order, appending resulting events to `out`.
    pub fn handle<G: GeometryQuery, R: Rng + ?Sized>(
        &mut self,
        commands: &[Command],
        geometry: &G,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        for command in commands {
            self.apply(command.clone(), geometry, rng, out);
        }
    }

    fn apply<G: GeometryQuery, R: Rng + ?Sized>(
        &mut self,
        command: Command,
        geometry: &G,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        match command {
            Command::NoteTriggerCost { cost } => {
                if cost > 0 {
                    self.noted_trigger_cost = Some(cost);
                } else {
                    log::debug!("pipeline: ignored a non-positive trigger cost capture");
                }
            }
            Command::ReportExplosion {
                position,
                trigger_cost,
                luck,
            } => {
                let trigger_cost = trigger_cost
                    .filter(|cost| *cost > 0)
                    .or(self.noted_trigger_cost)
                    .unwrap_or(self.fallback_trigger_cost);
                let in_liquid = self.classifier.is_in_liquid(geometry, position);
                out.push(Event::ExplosionAssessed {
                    position,
                    in_liquid,
                    trigger_cost,
                });
                if !in_liquid {
                    return;
                }

                let luck = luck.unwrap_or_else(|| rng.gen());
                let batch = self.generator.generate(luck, trigger_cost, rng);
                if let Some(award) = batch.guarantee {
                    out.push(Event::GuaranteeTriggered {
                        track: batch.track,
                        count: batch.track_count,
                        award,
                    });
                }
                out.push(Event::LootGenerated {
                    position,
                    items: batch.items,
                    total_value: batch.total_value,
                });
            }
            Command::RebuildLiquidCache => {
                let volumes = self.classifier.rebuild_cache(geometry);
                out.push(Event::LiquidCacheRebuilt { volumes });
            }
        }
    }
}
