use std::sync::Arc;

use eframe::egui;
use parking_lot::Mutex;

use icefeed::error::AppendError;
use icefeed::feed::{Renderer, SeriesSink};
use icefeed::series::DisplayAttributes;

// ---------------------------------------------------------------------------
// Plot destinations
// ---------------------------------------------------------------------------

pub type SharedPoints = Arc<Mutex<Vec<[f64; 2]>>>;

/// Read side of a live series, kept by the UI.
#[derive(Debug, Clone)]
pub struct LiveHandle {
    pub name: String,
    pub display: DisplayAttributes,
    pub points: SharedPoints,
}

impl LiveHandle {
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }
}

/// Write side of a live series, handed to the feed driver.
pub struct PlotSeries {
    points: SharedPoints,
    ctx: Option<egui::Context>,
    progressive_x: bool,
}

impl SeriesSink for PlotSeries {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError> {
        if !key.is_finite() || !value.is_finite() {
            return Err(AppendError::NonFinite { key, value });
        }
        {
            let mut points = self.points.lock();
            if self.progressive_x {
                if let Some(&[last, _]) = points.last() {
                    if key < last {
                        return Err(AppendError::OutOfOrder { key, last });
                    }
                }
            }
            points.push([key, value]);
        }
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
        Ok(())
    }
}

/// Creates [`PlotSeries`] destinations and remembers their read handles.
pub struct PlotRenderer {
    ctx: Option<egui::Context>,
    progressive_x: bool,
    handles: Vec<LiveHandle>,
}

impl PlotRenderer {
    pub fn new(ctx: Option<egui::Context>, progressive_x: bool) -> Self {
        Self {
            ctx,
            progressive_x,
            handles: Vec::new(),
        }
    }

    pub fn into_handles(self) -> Vec<LiveHandle> {
        self.handles
    }
}

impl Renderer for PlotRenderer {
    type Sink = PlotSeries;

    fn create(&mut self, name: &str, display: &DisplayAttributes) -> PlotSeries {
        let points = SharedPoints::default();
        self.handles.push(LiveHandle {
            name: name.to_string(),
            display: *display,
            points: points.clone(),
        });
        PlotSeries {
            points,
            ctx: self.ctx.clone(),
            progressive_x: self.progressive_x,
        }
    }
}
