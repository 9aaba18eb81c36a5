#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for driving explosions against a scene description.
//!
//! The binary stands in for a game host: it loads a TOML scene, opens the
//! persisted guarantee counters, runs commands through the pipeline and
//! prints the resulting events. Runs are reproducible; each one seeds its
//! rng from a label and an index.

mod scene_file;

use std::path::{Path, PathBuf};

use anyhow::Result;
use blast_fishing_core::{
    full_catalog, Command as PipelineCommand, CounterStore, Event, LootDefinition,
    HIGH_TRACK_COUNTER, LOW_TRACK_COUNTER,
};
use blast_fishing_store::{FileCounterStore, MemoryCounterStore};
use blast_fishing_system_classifier::LiquidClassifier;
use blast_fishing_system_loot::{GeneratorConfig, LootGenerator};
use blast_fishing_system_pipeline::{Pipeline, PipelineConfig};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Blast-fishing command-line interface.
#[derive(Debug, Parser)]
#[command(name = "blast-fishing", about = "Assess explosions and sample loot")]
struct Cli {
    /// Scene description file the commands run against.
    #[arg(long, default_value = "demos/pond.toml")]
    scene: PathBuf,
    /// Document holding the persisted guarantee counters.
    #[arg(long, default_value = "counters.json")]
    counters: PathBuf,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Classifies a point against the scene without generating loot.
    #[command(allow_negative_numbers = true)]
    Assess {
        #[command(flatten)]
        point: Point3,
    },
    /// Reports an explosion and prints the assessment and any loot.
    #[command(allow_negative_numbers = true)]
    Explode {
        #[command(flatten)]
        point: Point3,
        /// Value of the triggering item; omitted falls back to the last
        /// noted cost, else the configured default.
        #[arg(long)]
        cost: Option<u32>,
        /// Luck stat in [0, 1]; omitted draws one uniformly.
        #[arg(long)]
        luck: Option<f32>,
        /// Label the run's rng seed is derived from.
        #[arg(long, default_value = "explode")]
        seed_label: String,
        /// Index mixed into the seed, for repeat runs under one label.
        #[arg(long, default_value_t = 0)]
        seed_index: u64,
    },
    /// Batch-simulates generation outcomes against a throwaway counter
    /// store, for tuning inspection.
    Simulate {
        /// Number of batches to generate.
        #[arg(long, default_value_t = 100)]
        runs: u32,
        /// Trigger cost applied to every batch.
        #[arg(long, default_value_t = 500)]
        cost: u32,
        /// Fixed luck stat; omitted draws one per batch.
        #[arg(long)]
        luck: Option<f32>,
        /// Label the per-run rng seeds are derived from.
        #[arg(long, default_value = "simulate")]
        seed_label: String,
    },
    /// Inspects or edits the persisted guarantee counters.
    Counters {
        #[command(subcommand)]
        action: CounterAction,
    },
}

#[derive(Debug, Subcommand)]
enum CounterAction {
    /// Prints every persisted counter.
    Show,
    /// Sets one counter to the given value.
    Set {
        /// Counter key, for example `HighTierUsageCount`.
        key: String,
        /// Value to store.
        value: i64,
    },
    /// Resets both guarantee track counters to zero.
    Reset,
}

/// World-space coordinates of a detonation point.
#[derive(Debug, Args)]
struct Point3 {
    /// X coordinate.
    x: f32,
    /// Y coordinate, along the world up axis.
    y: f32,
    /// Z coordinate.
    z: f32,
}

impl Point3 {
    fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Assess { point } => run_assess(&cli.scene, point.vec3()),
        CliCommand::Explode {
            point,
            cost,
            luck,
            seed_label,
            seed_index,
        } => run_explode(
            &cli.scene,
            &cli.counters,
            point.vec3(),
            cost,
            luck,
            &seed_label,
            seed_index,
        ),
        CliCommand::Simulate {
            runs,
            cost,
            luck,
            seed_label,
        } => run_simulate(runs, cost, luck, &seed_label),
        CliCommand::Counters { action } => run_counters(&cli.counters, action),
    }
}

fn run_assess(scene_path: &Path, point: Vec3) -> Result<()> {
    let scene = scene_file::load_scene(scene_path)?;
    let mut classifier = LiquidClassifier::default();
    let cached = classifier.rebuild_cache(&scene);
    let verdict = if classifier.is_in_liquid(&scene, point) {
        "liquid"
    } else {
        "dry"
    };
    println!(
        "({:.2}, {:.2}, {:.2}) is {verdict} ({cached} liquid volumes cached)",
        point.x, point.y, point.z
    );
    Ok(())
}

fn run_explode(
    scene_path: &Path,
    counters_path: &Path,
    point: Vec3,
    cost: Option<u32>,
    luck: Option<f32>,
    seed_label: &str,
    seed_index: u64,
) -> Result<()> {
    let scene = scene_file::load_scene(scene_path)?;
    let store = FileCounterStore::open(counters_path);
    let mut pipeline = Pipeline::new(PipelineConfig::default(), full_catalog(), store);
    let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(seed_label, seed_index));

    let mut events = Vec::new();
    pipeline.handle(
        &[
            PipelineCommand::RebuildLiquidCache,
            PipelineCommand::ReportExplosion {
                position: point,
                trigger_cost: cost,
                luck,
            },
        ],
        &scene,
        &mut rng,
        &mut events,
    );

    for event in &events {
        print_event(event);
    }
    Ok(())
}

fn run_simulate(runs: u32, cost: u32, luck: Option<f32>, seed_label: &str) -> Result<()> {
    let generator = LootGenerator::new(
        full_catalog(),
        GeneratorConfig::default(),
        MemoryCounterStore::new(),
    );

    let mut total_items = 0usize;
    let mut total_value = 0u64;
    let mut empty_batches = 0u32;
    let mut guarantees = 0u32;
    let mut best: Option<LootDefinition> = None;

    for run in 0..runs {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(seed_label, u64::from(run)));
        let luck_value = luck.unwrap_or_else(|| rng.gen());
        let batch = generator.generate(luck_value, cost, &mut rng);

        total_items += batch.items.len();
        total_value += batch.total_value;
        if batch.items.is_empty() {
            empty_batches += 1;
        }
        if batch.guarantee.is_some() {
            guarantees += 1;
        }
        for item in &batch.items {
            if best.map_or(true, |held| item.value() > held.value()) {
                best = Some(*item);
            }
        }
    }

    println!("simulated {runs} batches at trigger cost {cost}");
    println!("  items produced: {total_items} (worth {total_value})");
    println!("  empty batches: {empty_batches}");
    println!("  guarantees fired: {guarantees}");
    match best {
        Some(item) => println!("  best single item: {} ({})", item.display_name(), item.value()),
        None => println!("  best single item: none"),
    }
    Ok(())
}

fn run_counters(counters_path: &Path, action: CounterAction) -> Result<()> {
    let store = FileCounterStore::open(counters_path);
    match action {
        CounterAction::Show => {
            let snapshot = store.snapshot();
            if snapshot.is_empty() {
                println!("no counters recorded at {}", store.path().display());
            } else {
                for (key, value) in snapshot {
                    println!("{key} = {value}");
                }
            }
        }
        CounterAction::Set { key, value } => {
            store.set_counter(&key, value);
            println!("{key} = {value}");
        }
        CounterAction::Reset => {
            store.set_counter(HIGH_TRACK_COUNTER, 0);
            store.set_counter(LOW_TRACK_COUNTER, 0);
            println!("guarantee tracks reset");
        }
    }
    Ok(())
}

fn print_event(event: &Event) {
    match event {
        Event::LiquidCacheRebuilt { volumes } => {
            println!("cached {volumes} liquid volumes");
        }
        Event::ExplosionAssessed {
            position,
            in_liquid,
            trigger_cost,
        } => {
            let verdict = if *in_liquid { "liquid" } else { "dry" };
            println!(
                "assessment at ({:.2}, {:.2}, {:.2}): {verdict}, trigger cost {trigger_cost}",
                position.x, position.y, position.z
            );
        }
        Event::GuaranteeTriggered {
            track,
            count,
            award,
        } => {
            println!("guarantee: {track:?} track reached {count}, forcing {award:?}");
        }
        Event::LootGenerated {
            items, total_value, ..
        } => {
            if items.is_empty() {
                println!("loot: nothing surfaced");
            } else {
                println!("loot: {} items worth {total_value}", items.len());
                for item in items {
                    println!("  {} ({})", item.display_name(), item.value());
                }
            }
        }
    }
}

fn derive_seed(label: &str, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
