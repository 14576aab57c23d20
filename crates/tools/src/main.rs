use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use navcore::{Policy, ReplayOutcome, load_journal, replay_to_end};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSONL journal to replay
    #[arg(short, long)]
    journal: PathBuf,

    /// Path to the maze layout the journal was recorded against
    #[arg(short, long)]
    layout: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let layout = fs::read_to_string(&args.layout)
        .with_context(|| format!("Failed to read layout file: {}", args.layout.display()))?;
    let journal = load_journal(&args.journal)
        .map_err(|e| anyhow::anyhow!("Failed to load journal: {e}"))?;

    let outcome: ReplayOutcome = replay_to_end(&layout, Policy::default(), &journal)
        .map_err(|e| anyhow::anyhow!("Replay failed during execution: {e}"))?;

    println!("Replay complete.");
    println!("Final Tick: {}", outcome.final_tick);
    println!("Snapshot Hash: {}", outcome.snapshot_hash);
    println!("Pellets Remaining: {}", outcome.pellets_remaining);

    Ok(())
}
