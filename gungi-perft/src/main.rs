//! Gungi perft
//!
//! Counts the action tree below the starting position to a fixed depth.
//! Useful for spotting move-generation regressions: the per-depth totals
//! only change when the rules do.

mod counter;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gungi_core::{GameState, Player, Ruleset, Setup};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::counter::{Counter, Counts};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SetupArg {
    Standard,
    PlacementOnly,
}

impl From<SetupArg> for Setup {
    fn from(arg: SetupArg) -> Setup {
        match arg {
            SetupArg::Standard => Setup::Standard,
            SetupArg::PlacementOnly => Setup::PlacementOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Count the Gungi action tree to a fixed depth")]
struct Args {
    /// Plies to expand below the starting position
    #[arg(short, long, default_value_t = 3)]
    depth: u32,

    #[arg(long, value_enum, default_value_t = SetupArg::Standard)]
    setup: SetupArg,

    /// Captured non-king pieces join the capturer's reserve
    #[arg(long)]
    captures_to_reserve: bool,

    /// Allow reserve placement anywhere on the board
    #[arg(long)]
    no_frontline: bool,

    /// Read the ruleset from a JSON file instead of the flags above
    #[arg(long, conflicts_with_all = ["setup", "captures_to_reserve", "no_frontline"])]
    ruleset: Option<PathBuf>,

    /// Print the subtree size below each root action
    #[arg(long)]
    divide: bool,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 5)]
    log_interval: u64,
}

impl Args {
    fn ruleset(&self) -> Result<Ruleset> {
        match &self.ruleset {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                Ruleset::from_json(&json).with_context(|| format!("bad ruleset {}", path.display()))
            }
            None => Ok(Ruleset {
                setup: self.setup.into(),
                captures_to_reserve: self.captures_to_reserve,
                enforce_frontline: !self.no_frontline,
            }),
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let ruleset = args.ruleset()?;

    // Stop early on SIGINT and report what was counted so far
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("interrupt received, stopping");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let root = GameState::new(ruleset);
    println!("{}", root.board());
    info!(depth = args.depth, ruleset = ?root.ruleset(), "counting");

    let counter = Counter::new(args.depth, Duration::from_secs(args.log_interval), running);
    let start = Instant::now();
    let outcome = if args.divide {
        let (per_action, outcome) = counter.divide(&root);
        for (action, counts) in &per_action {
            println!("{:?}: {}", action, counts.leaves);
        }
        println!();
        outcome
    } else {
        counter.count(&root)
    };
    let elapsed = start.elapsed();

    print_summary(&outcome.counts);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if outcome.complete {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\nCount was interrupted before completion.");
        Ok(ExitCode::FAILURE)
    }
}

fn print_summary(counts: &Counts) {
    println!("Leaves:      {}", counts.leaves);
    println!("Nodes:       {}", counts.nodes);
    println!("Placements:  {}", counts.placements);
    println!("Moves:       {}", counts.moves);
    println!("Captures:    {}", counts.captures);
    println!("Stacks:      {}", counts.stacks_on_opponent);
    println!("P1 wins:     {}", counts.wins[Player::One.index()]);
    println!("P2 wins:     {}", counts.wins[Player::Two.index()]);
    if counts.rejected > 0 {
        println!("Rejected:    {}", counts.rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_ruleset() {
        let args = Args::parse_from(["perft", "--setup", "placement-only", "--no-frontline"]);
        let ruleset = args.ruleset().unwrap();
        assert_eq!(ruleset.setup, Setup::PlacementOnly);
        assert!(!ruleset.enforce_frontline);
        assert!(!ruleset.captures_to_reserve);
    }

    #[test]
    fn test_missing_ruleset_file_names_path() {
        let args = Args::parse_from(["perft", "--ruleset", "/nonexistent/gungi-ruleset.json"]);
        let err = args.ruleset().unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.starts_with("cannot read /nonexistent/gungi-ruleset.json"), "{}", msg);
    }

    #[test]
    fn test_bad_ruleset_json_is_rejected() {
        let path = std::env::temp_dir().join(format!("gungi-perft-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "setup": "standard", "bogus": true }"#).unwrap();

        let args = Args::parse_from(["perft", "--ruleset", path.to_str().unwrap()]);
        let err = args.ruleset().unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(format!("{:#}", err).starts_with("bad ruleset"));
    }
}
