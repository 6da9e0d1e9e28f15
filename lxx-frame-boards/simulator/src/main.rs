mod drivers;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lxx_frame_common::*;
use lxx_frame_core::{CycleContent, RefreshCycle};

use drivers::{FileFetcher, HostPower, LoopbackLink, init_epd};

#[derive(Parser)]
#[command(name = "lxx-frame-simulator")]
#[command(about = "Run one wake cycle of the e-paper frame on the host", long_about = None)]
#[command(version)]
struct Cli {
    /// Frame configuration (JSON); `credentials.url` may be a `file://` url or a local path
    #[arg(short, long)]
    config: PathBuf,

    /// Where to write a screenshot of the refreshed panel (format from the extension)
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Simulate a WiFi connection failure
    #[arg(long)]
    offline: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match fs::read(&cli.config) {
        Ok(bytes) => match FrameConfig::from_json(&bytes) {
            Ok(config) => config,
            Err(e) => {
                error!("Invalid configuration {}: {}", cli.config.display(), e);
                return ExitCode::FAILURE;
            }
        },
        Err(e) => {
            error!("Cannot read {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    info!("lxx-frame simulator starting...");
    let (epd, probe) = init_epd(config.driver);
    let mut cycle = RefreshCycle::new(
        epd,
        LoopbackLink::new(!cli.offline),
        FileFetcher,
        HostPower::default(),
        &config,
    );

    let report = cycle.run_once();
    info!("Cycle finished: {:?}", report);
    info!(
        "Panel refreshed {} time(s), asleep: {}, light sleep {} ms, deep sleep {:?} ms",
        probe.refreshes(),
        probe.is_asleep(),
        cycle.power().light_sleep_ms,
        cycle.power().deep_sleep_ms
    );

    let render = cycle.display().render_config();
    match probe.screenshot(&cli.output, render.geometry, &render.palette) {
        Ok(true) => {}
        Ok(false) => warn!("Panel was not refreshed, no image written"),
        Err(e) => {
            error!("Failed to write {}: {}", cli.output.display(), e);
            return ExitCode::FAILURE;
        }
    }

    match report.content {
        CycleContent::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
