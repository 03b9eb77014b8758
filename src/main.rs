mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use eframe::egui;

use app::IceFeedApp;
use icefeed::config::FeedConfig;
use icefeed::feed::{open_destinations, FeedDriver, LogRenderer};
use state::AppState;

const USAGE: &str = "usage: icefeed [DATA_FILE] [--config FILE] [--headless]";

#[derive(Debug, Default)]
struct CliArgs {
    data: Option<PathBuf>,
    config: Option<PathBuf>,
    headless: bool,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = CliArgs::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a file")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--headless" => parsed.headless = true,
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path if parsed.data.is_none() => parsed.data = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {extra}\n{USAGE}"),
            }
        }
        Ok(parsed)
    }
}

/// Feed the dataset into log destinations without opening a window.
fn run_headless(args: &CliArgs, config: &FeedConfig) -> Result<()> {
    let path = args.data.as_ref().context("--headless needs a DATA_FILE")?;
    let dataset = config.load_dataset(path)?;

    let specs = config.series_specs();
    let mut lanes = open_destinations(&mut LogRenderer, &specs);
    let report = FeedDriver::new(config.key_column.clone())
        .with_pacing(config.pacing())
        .with_mode(config.mode)
        .with_policy(config.policy)
        .run(&dataset, &mut lanes)?;

    for lane in &report.lanes {
        log::info!(
            "{}: {} admitted, {} invalid, {} rejected",
            lane.name,
            lane.admitted,
            lane.invalid,
            lane.rejected
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };

    if args.headless {
        return run_headless(&args, &config);
    }

    let mut state = AppState::new(config);
    if let Some(path) = &args.data {
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "icefeed – Sea Ice Extent",
        options,
        Box::new(|_cc| Ok(Box::new(IceFeedApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
