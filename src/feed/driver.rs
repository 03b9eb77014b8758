use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ErrorPolicy, ValidationMode};
use crate::data::filter::complete_case_indices;
use crate::data::model::{CellValue, Dataset, Row};
use crate::error::{AppendError, PointIssue, SeriesError};
use crate::series::spec::{DisplayAttributes, SeriesSpec};
use crate::series::table::Point;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Append-only destination for one series, owned by the renderer.
pub trait SeriesSink {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError>;
}

impl<S: SeriesSink + ?Sized> SeriesSink for Box<S> {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError> {
        (**self).append(key, value)
    }
}

impl<S: SeriesSink + ?Sized> SeriesSink for &mut S {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError> {
        (**self).append(key, value)
    }
}

/// Creates one destination per series.
pub trait Renderer {
    type Sink: SeriesSink;

    fn create(&mut self, name: &str, display: &DisplayAttributes) -> Self::Sink;
}

/// Create a destination for every spec, in spec order.
pub fn open_destinations<R: Renderer>(
    renderer: &mut R,
    specs: &[SeriesSpec],
) -> Vec<(SeriesSpec, R::Sink)> {
    specs
        .iter()
        .map(|spec| (spec.clone(), renderer.create(&spec.name, &spec.display)))
        .collect()
}

/// Waits out the pacing delay between admissions.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Caller-held stop flag, checked before every row and every point.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-series outcome of a feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneReport {
    pub name: String,
    pub admitted: usize,
    pub invalid: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    pub rows_total: usize,
    pub rows_processed: usize,
    pub lanes: Vec<LaneReport>,
    /// Skipped series and rejected appends, in the order they happened.
    pub errors: Vec<SeriesError>,
    pub cancelled: bool,
}

impl FeedReport {
    pub fn lane(&self, name: &str) -> Option<&LaneReport> {
        self.lanes.iter().find(|l| l.name == name)
    }

    /// Points admitted to the named series; zero when the series is unknown.
    pub fn admitted_for(&self, name: &str) -> usize {
        self.lane(name).map_or(0, |l| l.admitted)
    }

    pub fn total_admitted(&self) -> usize {
        self.lanes.iter().map(|l| l.admitted).sum()
    }

    pub fn total_invalid(&self) -> usize {
        self.lanes.iter().map(|l| l.invalid).sum()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Feeds dataset rows into series destinations, one point at a time.
///
/// Rows are visited in input order and, within a row, series in the order of
/// the lanes passed to [`FeedDriver::run`]. Destinations stay owned by the
/// caller.
#[derive(Debug)]
pub struct FeedDriver<P = ThreadPacer> {
    key_column: String,
    pacing: Option<Duration>,
    mode: ValidationMode,
    policy: ErrorPolicy,
    stop: StopSignal,
    pacer: P,
}

impl FeedDriver<ThreadPacer> {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            pacing: None,
            mode: ValidationMode::default(),
            policy: ErrorPolicy::default(),
            stop: StopSignal::new(),
            pacer: ThreadPacer,
        }
    }
}

impl<P: Pacer> FeedDriver<P> {
    /// A zero duration disables pacing.
    pub fn with_pacing(mut self, pacing: Option<Duration>) -> Self {
        self.pacing = pacing.filter(|d| !d.is_zero());
        self
    }

    /// In strict mode rows missing any fed column are skipped whole.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> FeedDriver<Q> {
        FeedDriver {
            key_column: self.key_column,
            pacing: self.pacing,
            mode: self.mode,
            policy: self.policy,
            stop: self.stop,
            pacer,
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Admit every valid point of `dataset` to its series' destination.
    ///
    /// Invalid points are skipped. Missing series columns and rejected
    /// appends are recorded in the report, or returned as the error under
    /// [`ErrorPolicy::FailFast`]. A missing key column is always an error.
    pub fn run<S: SeriesSink>(
        &mut self,
        dataset: &Dataset,
        lanes: &mut [(SeriesSpec, S)],
    ) -> Result<FeedReport, SeriesError> {
        let key_pos = dataset
            .column_index(&self.key_column)
            .ok_or_else(|| SeriesError::Schema {
                column: self.key_column.clone(),
            })?;

        let mut report = FeedReport {
            rows_total: dataset.len(),
            lanes: lanes
                .iter()
                .map(|(spec, _)| LaneReport {
                    name: spec.name.clone(),
                    ..LaneReport::default()
                })
                .collect(),
            ..FeedReport::default()
        };

        let mut active: Vec<(usize, usize)> = Vec::with_capacity(lanes.len());
        for (lane, (spec, _)) in lanes.iter().enumerate() {
            match dataset.column_index(&spec.column) {
                Some(pos) => active.push((lane, pos)),
                None => {
                    let err = SeriesError::MissingSeriesColumn {
                        series: spec.name.clone(),
                        column: spec.column.clone(),
                    };
                    if self.policy == ErrorPolicy::FailFast {
                        return Err(err);
                    }
                    log::warn!("Skipping series: {err}");
                    report.errors.push(err);
                }
            }
        }

        let mut complete = vec![true; dataset.len()];
        if self.mode == ValidationMode::Strict {
            let mut required = vec![self.key_column.as_str()];
            for &(lane, _) in &active {
                required.push(lanes[lane].0.column.as_str());
            }
            complete.fill(false);
            for i in complete_case_indices(dataset, &required) {
                complete[i] = true;
            }
        }

        'rows: for (row_idx, row) in dataset.rows().enumerate() {
            if self.stop.is_stopped() {
                report.cancelled = true;
                break;
            }
            if !complete[row_idx] {
                log::debug!("Skipping incomplete row {row_idx}");
                report.rows_processed += 1;
                continue;
            }
            for &(lane, pos) in &active {
                if self.stop.is_stopped() {
                    report.cancelled = true;
                    break 'rows;
                }

                let (spec, sink) = &mut lanes[lane];
                let point = match read_point(row, key_pos, pos) {
                    Ok(point) => point,
                    Err(issue) => {
                        let err = SeriesError::InvalidPoint {
                            series: spec.name.clone(),
                            row: row_idx,
                            issue,
                        };
                        log::debug!("Skipping point: {err}");
                        report.lanes[lane].invalid += 1;
                        continue;
                    }
                };

                log::debug!(
                    "Adding data for {}: {}={}, value={}",
                    spec.name,
                    self.key_column,
                    point.key,
                    point.value
                );
                match sink.append(point.key, point.value) {
                    Ok(()) => {
                        report.lanes[lane].admitted += 1;
                        if let Some(delay) = self.pacing {
                            self.pacer.pause(delay);
                        }
                    }
                    Err(source) => {
                        let err = SeriesError::DestinationAppend {
                            series: spec.name.clone(),
                            row: row_idx,
                            source,
                        };
                        if self.policy == ErrorPolicy::FailFast {
                            return Err(err);
                        }
                        log::warn!("{err}");
                        report.lanes[lane].rejected += 1;
                        report.errors.push(err);
                    }
                }
            }
            report.rows_processed += 1;
        }

        log::info!(
            "Feed {}: {} points admitted over {} of {} rows, {} invalid skipped, {} errors",
            if report.cancelled { "stopped" } else { "complete" },
            report.total_admitted(),
            report.rows_processed,
            report.rows_total,
            report.total_invalid(),
            report.errors.len()
        );
        Ok(report)
    }
}

fn read_point(row: Row<'_>, key_pos: usize, value_pos: usize) -> Result<Point, PointIssue> {
    let key = read_number(row.at(key_pos), PointIssue::MissingKey, PointIssue::NonNumericKey)?;
    let value = read_number(
        row.at(value_pos),
        PointIssue::MissingValue,
        PointIssue::NonNumericValue,
    )?;
    Ok(Point { key, value })
}

fn read_number(
    cell: Option<&CellValue>,
    missing: PointIssue,
    non_numeric: PointIssue,
) -> Result<f64, PointIssue> {
    match cell {
        None => Err(missing),
        Some(c) if c.is_missing() => Err(missing),
        Some(c) => c.as_f64().ok_or(non_numeric),
    }
}
