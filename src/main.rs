use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use dialogue_prep::{analyze, config, convert, merge, view};

#[derive(Parser)]
#[command(name = "dialogue-prep")]
#[command(about = "Prepare dialogue intent/slot data for text-to-text training")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten dialogue JSON files into input/target JSONL
    Convert {
        /// Input dialogue JSON files (glob patterns allowed)
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<String>,
        /// Output JSONL file
        #[arg(short, long)]
        output: PathBuf,
        /// Also write dialogue_id and turn_id on each record
        #[arg(long)]
        keep_ids: bool,
    },
    /// Show intent and slot distribution of a flattened JSONL file
    Analyze {
        /// Path to JSONL file
        file: PathBuf,
        /// Number of values listed per slot
        #[arg(long, default_value_t = analyze::DEFAULT_TOP_VALUES)]
        top: usize,
        /// Browse the distribution interactively
        #[arg(long)]
        tui: bool,
    },
    /// Merge multiple JSONL files into one
    Merge {
        /// Output merged JSONL file path
        output: PathBuf,
        /// Input JSONL file paths to merge
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Require every line to be valid JSON
        #[arg(long)]
        validate: bool,
    },
}

fn main() -> Result<()> {
    config::load_env();
    config::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { inputs, output, keep_ids } => {
            let files = convert::expand_inputs(&inputs)?;
            if files.is_empty() {
                bail!("no input files matched {:?}", inputs);
            }
            info!(files = files.len(), "converting dialogues");

            let summary = convert::convert_files(&files, &output, keep_ids)
                .with_context(|| format!("converting into {}", output.display()))?;
            println!(
                "Flattened {} dialogues from {} files into {} examples: {}",
                summary.dialogues,
                summary.files,
                summary.examples,
                output.display()
            );
        }
        Commands::Analyze { file, top, tui } => {
            let distribution = analyze::analyze_file(&file)
                .with_context(|| format!("analysing {}", file.display()))?;
            if tui {
                view::run(&distribution, top).context("terminal view failed")?;
            } else {
                print!("{}", analyze::render_text(&distribution, top));
            }
        }
        Commands::Merge { output, inputs, validate } => {
            let summary = merge::merge_jsonl(&output, &inputs, validate)
                .with_context(|| format!("merging into {}", output.display()))?;
            info!(lines = summary.lines, "merge complete");
            println!("Merged {} files into {}", summary.files, summary.output.display());
        }
    }

    Ok(())
}
