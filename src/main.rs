use mathquest_combat::config::AnalyzerConfig;
use mathquest_combat::{run, CliOptions};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--config simulation.json] [--catalog catalog.json] \
[--output report.json] [--seed SEED] [--success-trials N] [--fail-trials N] \
[--random-trials N] [--max-rounds N]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut config_path = PathBuf::from("data/simulation.json");
    let mut catalog_path = None;
    let mut output_path = None;
    let mut analyzer = AnalyzerConfig::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config simulation.json)")
                })?;
            }
            "--catalog" => {
                catalog_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--catalog requires a path (e.g. --catalog catalog.json)")
                })?);
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output report.json)")
                })?);
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                analyzer.seed = val.parse()?;
            }
            "--success-trials" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--success-trials requires a number"))?;
                analyzer.all_success_trials = val.parse()?;
            }
            "--fail-trials" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--fail-trials requires a number"))?;
                analyzer.all_fail_trials = val.parse()?;
            }
            "--random-trials" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--random-trials requires a number"))?;
                analyzer.random_trials = val.parse()?;
            }
            "--max-rounds" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-rounds requires a number"))?;
                analyzer.max_rounds = val.parse()?;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        catalog_path,
        config_path,
        output_path,
        analyzer,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let opts = parse_args()?;
    run(opts)
}
