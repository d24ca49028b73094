//! Combat resolution engine for the math adventure's battle mini-game.
//!
//! [`encounter::EncounterController`] drives a live, paced encounter;
//! [`simulator::simulate_battle`] replays the same round logic headlessly and
//! [`analyzer::DifficultyAnalyzer`] aggregates batches of those runs.

pub mod ability;
pub mod analyzer;
pub mod combat_log;
pub mod config;
pub mod damage;
pub mod encounter;
pub mod engine;
pub mod model;
pub mod roster;
pub mod schedule;
pub mod simulator;
pub mod status;
pub mod templates;

use crate::analyzer::{analyze_adventure, render_report, write_report, DifficultyAnalyzer};
use crate::config::{load_simulation_config, AnalyzerConfig};
use crate::templates::{builtin_catalog, load_catalog, GrowthCurve};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Falls back to the bundled catalog when absent.
    pub catalog_path: Option<PathBuf>,
    pub config_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.analyzer.max_rounds == 0 {
        anyhow::bail!("--max-rounds must be > 0");
    }
    let simulation = load_simulation_config(&opts.config_path)?;
    let loaded;
    let catalog = match &opts.catalog_path {
        Some(path) => {
            loaded = load_catalog(path)?;
            &loaded
        }
        None => builtin_catalog(),
    };
    let analyzer = DifficultyAnalyzer::new(opts.analyzer.clone());
    let results = analyze_adventure(catalog, &GrowthCurve::default(), &simulation, &analyzer)?;
    print!("{}", render_report(&results));
    if let Some(path) = &opts.output_path {
        write_report(&results, path)?;
        println!("Wrote {} encounter report(s) to {}", results.len(), path.display());
    }
    Ok(())
}
