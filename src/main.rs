// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use log::info;

use stockwell::cli::{print_json, print_report, Args};
use stockwell::config::TfConfig;
use stockwell::core::TfAnalyzer;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let base = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Some(
                TfConfig::from_json(&json)
                    .with_context(|| format!("parsing config {}", path.display()))?,
            )
        }
        None => None,
    };
    let config = args
        .analysis_config(base)
        .context("invalid analysis settings")?;

    let data = args
        .signal_spec()
        .generate()
        .context("generating synthetic epochs")?;
    info!("Generated {:?} block from {} components", data.dim(), args.tones.len());

    let analyzer = TfAnalyzer::with_config(config, args.srate)
        .context("configuring analyzer")?;
    let result = match analyzer.analyze(data.view()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", format!("Analysis failed: {e}").red());
            return Err(e.into());
        }
    };

    if args.json {
        print_json(analyzer.config(), &result)?;
    } else {
        print_report(analyzer.config(), &result, args.rows);
    }

    Ok(())
}
