//! cutin - command-line tools around the cut-in simulator core
//!
//! The simulation itself runs inside a host simulator; these commands cover
//! the files around it: scenario catalogs, campaign configs and step logs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cut_in_simulator_core_rs::metrics::summarize_step_log;
use cut_in_simulator_core_rs::orchestrator::{compute_config_hash, CampaignConfig};
use cut_in_simulator_core_rs::sink::read_step_log;
use cut_in_simulator_core_rs::ScenarioCatalog;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cutin")]
#[command(version)]
#[command(about = "Scenario catalogs and step logs for adversarial cut-in testing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a scenario catalog and list its records
    Catalog {
        /// Scenario CSV file
        #[arg(value_name = "CSV")]
        path: PathBuf,

        /// Only print the first N records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print per-episode safety summaries from a step log
    Summarize {
        /// Step log CSV written by a campaign
        #[arg(value_name = "STEP_LOG")]
        path: PathBuf,

        /// Only summarise this episode
        #[arg(short, long)]
        episode: Option<usize>,
    },

    /// Check a campaign config and show what it would run
    Plan {
        /// Campaign config JSON
        #[arg(short, long, value_name = "JSON")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cut_in_simulator_core_rs=info,cutin=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Catalog { path, limit } => run_catalog(&path, limit),
        Commands::Summarize { path, episode } => run_summarize(&path, episode),
        Commands::Plan { config } => run_plan(&config),
    }
}

fn run_catalog(path: &Path, limit: Option<usize>) -> Result<()> {
    let catalog = ScenarioCatalog::load(path)
        .with_context(|| format!("Failed to load scenario catalog '{}'", path.display()))?;

    println!("scenarios:   {}", catalog.len());
    println!("fingerprint: {}", catalog.fingerprint());
    println!();
    println!(
        "{:>6}  {:>10}  {:>10}  {:>10}  {:>6}",
        "index", "gap_m", "bv_mps", "av_mps", "lanes"
    );

    let shown = limit.unwrap_or(catalog.len());
    for (index, record) in catalog.records().iter().take(shown).enumerate() {
        println!(
            "{:>6}  {:>10.2}  {:>10.2}  {:>10.2}  {:>+6}",
            index,
            record.initial_gap(),
            record.aggressor_speed(),
            record.target_speed(),
            record.lane_offset()
        );
    }
    if shown < catalog.len() {
        println!("... {} more", catalog.len() - shown);
    }
    Ok(())
}

fn run_summarize(path: &Path, episode: Option<usize>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
    let rows = read_step_log(file)
        .with_context(|| format!("Failed to read step log '{}'", path.display()))?;
    info!(rows = rows.len(), "Step log loaded");

    let summaries = summarize_step_log(&rows, episode);
    if summaries.is_empty() {
        match episode {
            Some(e) => anyhow::bail!("Episode {} not found in '{}'", e, path.display()),
            None => anyhow::bail!("'{}' has no rows", path.display()),
        }
    }

    println!(
        "{:>7}  {:>6}  {:>10}  {:>10}  {:>9}",
        "episode", "steps", "min_ttc_s", "min_sep_m", "collision"
    );
    let mut collisions = 0;
    for (episode, summary) in &summaries {
        if summary.collided() {
            collisions += 1;
        }
        println!(
            "{:>7}  {:>6}  {:>10}  {:>10}  {:>9}",
            episode,
            summary.steps,
            summary
                .min_ttc
                .map_or_else(|| "inf".to_string(), |t| format!("{:.2}", t)),
            summary
                .min_separation
                .map_or_else(|| "-".to_string(), |d| format!("{:.2}", d)),
            summary
                .first_collision_step
                .map_or_else(|| "-".to_string(), |s| format!("step {}", s)),
        );
    }
    println!();
    println!("{} episodes, {} with collisions", summaries.len(), collisions);
    Ok(())
}

fn run_plan(config_path: &Path) -> Result<()> {
    let config = CampaignConfig::from_json_file(config_path)?;
    let catalog = config.load_catalog()?;
    let orchestrator_config = config.orchestrator_config();
    let episodes = config.episode_count(&catalog);

    println!("catalog:        {} ({} scenarios)", config.scenario_path.display(), catalog.len());
    println!("fingerprint:    {}", catalog.fingerprint());
    println!("episodes:       {}", episodes);
    println!(
        "catalog cycles: {:.2}",
        episodes as f64 / catalog.len() as f64
    );
    println!("max steps:      {}", orchestrator_config.max_steps_per_episode);
    println!("controller:     {:?}", orchestrator_config.controller);
    println!("config hash:    {}", compute_config_hash(&orchestrator_config)?);
    println!("log dir:        {}", config.log_dir.display());
    Ok(())
}
