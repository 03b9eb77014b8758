use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use eframe::egui;

use icefeed::config::{FeedConfig, ValidationMode};
use icefeed::data::model::Dataset;
use icefeed::error::SeriesError;
use icefeed::feed::{open_destinations, FeedDriver, FeedReport, StopSignal};
use icefeed::series::{SeriesTable, TableBuilder};

use crate::ui::live::{LiveHandle, PlotRenderer};

type FeedOutcome = Result<FeedReport, SeriesError>;

// ---------------------------------------------------------------------------
// Live session: a feed running on a worker thread
// ---------------------------------------------------------------------------

pub struct LiveSession {
    pub handles: Vec<LiveHandle>,
    stop: StopSignal,
    worker: Option<JoinHandle<FeedOutcome>>,
    pub outcome: Option<FeedOutcome>,
}

impl LiveSession {
    /// Create one plot destination per configured series and start feeding
    /// `dataset` into them.
    pub fn start(
        dataset: Arc<Dataset>,
        config: &FeedConfig,
        ctx: Option<egui::Context>,
    ) -> Result<Self> {
        let specs = config.series_specs();
        let mut renderer = PlotRenderer::new(ctx, config.progressive_x);
        let mut lanes = open_destinations(&mut renderer, &specs);
        let stop = StopSignal::new();
        let mut driver = FeedDriver::new(config.key_column.clone())
            .with_pacing(config.pacing())
            .with_mode(config.mode)
            .with_policy(config.policy)
            .with_stop_signal(stop.clone());

        let worker = std::thread::Builder::new()
            .name("feed".to_string())
            .spawn(move || driver.run(&dataset, &mut lanes))
            .context("spawning feed worker")?;

        log::info!("Live feed started with {} series", specs.len());
        Ok(Self {
            handles: renderer.into_handles(),
            stop,
            worker: Some(worker),
            outcome: None,
        })
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Collect the worker's result once it has finished.
    pub fn poll(&mut self) {
        if !self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.join() {
            Ok(outcome) => {
                if let Err(e) = &outcome {
                    log::error!("Live feed failed: {e}");
                }
                self.outcome = Some(outcome);
            }
            Err(_) => log::error!("Live feed worker panicked"),
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.stop.stop();
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: FeedConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    /// Where the dataset came from.
    pub source: Option<PathBuf>,

    /// Series extracted for the static view.
    pub table: Option<SeriesTable>,

    /// Running or finished live feed.
    pub live: Option<LiveSession>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            table: None,
            live: None,
            status_message: None,
        }
    }

    /// Load a file, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match self.config.load_dataset(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and build its series table.
    pub fn set_dataset(&mut self, dataset: Dataset, source: PathBuf) {
        self.live = None;
        self.dataset = Some(Arc::new(dataset));
        self.source = Some(source);
        self.status_message = None;
        self.rebuild_table();
    }

    /// Rebuild the static series table from the current configuration.
    pub fn rebuild_table(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let builder = TableBuilder::new(self.config.key_column.clone())
            .with_mode(self.config.mode)
            .with_policy(self.config.policy);
        match builder.build(dataset, &self.config.series_specs()) {
            Ok(table) => self.table = Some(table),
            Err(e) => {
                log::error!("Failed to build series: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.table = None;
            }
        }
    }

    pub fn set_mode(&mut self, mode: ValidationMode) {
        if self.config.mode != mode {
            self.config.mode = mode;
            self.rebuild_table();
        }
    }

    pub fn start_live(&mut self, ctx: &egui::Context) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };
        self.live = None;
        match LiveSession::start(dataset, &self.config, Some(ctx.clone())) {
            Ok(session) => self.live = Some(session),
            Err(e) => {
                log::error!("Failed to start live feed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn stop_live(&mut self) {
        if let Some(live) = &self.live {
            live.stop();
        }
    }

    /// Leave the live view and return to the static table.
    pub fn clear_live(&mut self) {
        self.live = None;
    }

    pub fn poll_live(&mut self) {
        if let Some(live) = &mut self.live {
            live.poll();
        }
    }

    pub fn is_live_running(&self) -> bool {
        self.live.as_ref().is_some_and(LiveSession::is_running)
    }
}
