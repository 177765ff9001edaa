use anyhow::Result;
use log::LevelFilter;
use std::path::PathBuf;

use trainedml_cli::cli::build_cli;
use trainedml_cli::run::input::RunConfig;
use trainedml_cli::run::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TRAINEDML_LOG", "error,trainedml=info"))
        .init();

    let matches = build_cli().get_matches();

    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("Using configuration file: {:?}", path);
    }

    let config = RunConfig::from_arguments(config_path, &matches)?;
    log::debug!("Run configuration: {:?}", config);

    match pipeline::run(&config) {
        Ok(outcome) => {
            log::info!("Finished {} run", outcome.task);
            Ok(())
        }
        Err(e) => {
            log::error!("Run failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
