// Headless entry point: steps the rain at a fixed cadence and logs statistics.
use std::process::ExitCode;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use glyphrain::app::{DriverParams, RainDriver};
use glyphrain::cli::Args;
use glyphrain::config::AppConfig;
use glyphrain::rain::animation::AnimationSystem;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = AppConfig::load_or_default(&args.config);
    args.apply_overrides(&mut cfg);

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_for_ctrlc = stop_flag.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        stop_flag_for_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!("Ctrl-C handler unavailable: {err}");
    }

    let system = AnimationSystem::from_config(&cfg);
    let driver = match RainDriver::spawn(system, DriverParams::from(&cfg.runtime), stop_flag) {
        Ok(driver) => driver,
        Err(err) => {
            error!("failed to start update thread: {err}");
            return ExitCode::FAILURE;
        }
    };

    let every = cfg.runtime.stats_every.max(1);
    for stats in driver.stats().iter() {
        if stats.frame % every == 0 {
            info!(
                frame = stats.frame,
                streaks = stats.streaks,
                active_heads = stats.active_heads,
                wanted = stats.target,
                characters = stats.characters,
                "rain"
            );
        }
    }
    match driver.join() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
