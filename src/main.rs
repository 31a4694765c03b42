use std::env;

use log::info;

use tapeloop::driver::{self, RunConfig};

/// Runs the demo: `tapeloop [config.json]`. Set `RUST_LOG` to change verbosity.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => {
            info!("loading run config from {path}");
            RunConfig::load_json(&path)?
        }
        None => RunConfig::default(),
    };

    let report = driver::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
