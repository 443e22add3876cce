//! Generate synthetic samples for under-represented intents.
//!
//! Reads: a baseline of current intent counts (built-in table, or measured
//!        from a flattened JSONL file with `--baseline`)
//! Writes: <out-dir>/augmented_<intent>.jsonl, topping each intent up to
//!         `--target-count` samples
//!
//! Samples come from the built-in emergency-services catalog unless
//! `--catalog` points at a JSON catalog of the same shape as `--dump-catalog`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use rand::prelude::*;

use dialogue_prep::analyze;
use dialogue_prep::augment::{self, Catalog, DEFAULT_TARGET_COUNT};
use dialogue_prep::config::{self, SEED_ENV, TARGET_COUNT_ENV};

#[derive(Parser)]
#[command(name = "augment-data")]
#[command(about = "Top up intents with templated synthetic samples")]
struct Args {
    /// Directory the augmented_<intent>.jsonl files are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Samples per intent after augmentation
    #[arg(long, env = TARGET_COUNT_ENV, default_value_t = DEFAULT_TARGET_COUNT)]
    target_count: usize,
    /// Random seed
    #[arg(long, env = SEED_ENV, default_value_t = 42)]
    seed: u64,
    /// JSON catalog of slots and templates per intent
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Flattened JSONL file to measure current intent counts from
    #[arg(long)]
    baseline: Option<PathBuf>,
    /// Only generate these intents (default: every catalog intent)
    #[arg(long = "intent")]
    intents: Vec<String>,
    /// Write the active catalog as JSON to this path and exit
    #[arg(long)]
    dump_catalog: Option<PathBuf>,
}

fn main() -> Result<()> {
    config::load_env();
    config::init_logging();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path).with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::emergency(),
    };

    if let Some(path) = &args.dump_catalog {
        let json = serde_json::to_string_pretty(&catalog)?;
        fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
        println!("Catalog written to {}", path.display());
        return Ok(());
    }

    for intent in &args.intents {
        catalog.get(intent)?;
    }

    let baseline: IndexMap<String, usize> = match &args.baseline {
        Some(path) => {
            let distribution = analyze::analyze_file(path)
                .with_context(|| format!("measuring baseline from {}", path.display()))?;
            catalog
                .intents()
                .map(|intent| (intent.to_string(), distribution.intents.get(intent)))
                .collect()
        }
        None => augment::default_baseline(),
    };

    let plan: Vec<(String, usize)> = augment::plan(&catalog, &baseline, args.target_count)
        .into_iter()
        .filter(|(intent, _)| args.intents.is_empty() || args.intents.contains(intent))
        .collect();

    for (intent, to_generate) in &plan {
        println!("Generating {} samples for intent '{}'", to_generate, intent);
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let outcomes = augment::augment(&catalog, &plan, &args.out_dir, &mut rng)?;

    println!("\n{}", "=".repeat(60));
    let total: usize = outcomes.iter().map(|o| o.generated).sum();
    for outcome in &outcomes {
        match &outcome.path {
            Some(path) => println!("  {}: {} -> {}", outcome.intent, outcome.generated, path.display()),
            None => println!("  {}: already at target", outcome.intent),
        }
    }
    println!("Generated {} samples (seed {})", total, args.seed);

    Ok(())
}
