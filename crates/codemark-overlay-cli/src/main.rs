mod scenario;

use anyhow::{Result, bail};
use codemark_overlay_config::Config;
use std::{env, path::PathBuf, process};

use crate::scenario::Scenario;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--config <config.toml>] <scenario.toml>");
    process::exit(1);
}

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    match explicit {
        Some(path) => match Config::load_from_path(&path)? {
            Some(config) => Ok(config),
            None => bail!("Config file {} does not exist", path.display()),
        },
        None => {
            let config = Config::load()?;
            if config.is_none() {
                log::info!(
                    "No config at {}, using defaults",
                    Config::config_path().display()
                );
            }
            Ok(config.unwrap_or_default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("codemark-overlay-cli", String::as_str);

    let (config_path, scenario_path) = match args.as_slice() {
        [_, scenario] => (None, PathBuf::from(scenario)),
        [_, flag, config, scenario] if flag == "--config" => {
            (Some(PathBuf::from(config)), PathBuf::from(scenario))
        }
        _ => usage(program),
    };

    let config = load_config(config_path)?;
    let scenario = Scenario::load(&scenario_path)?;
    log::info!("Replaying {}", scenario_path.display());

    let report = scenario.run(config.panel_settings())?;
    print!("{report}");
    Ok(())
}
