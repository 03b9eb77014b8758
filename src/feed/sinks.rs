use crate::error::AppendError;
use crate::series::spec::DisplayAttributes;
use crate::series::table::Point;

use super::driver::{Renderer, SeriesSink};

/// Collects admitted points in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    pub name: String,
    pub points: Vec<Point>,
}

impl SeriesSink for VecSink {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError> {
        self.points.push(Point { key, value });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct VecRenderer;

impl Renderer for VecRenderer {
    type Sink = VecSink;

    fn create(&mut self, name: &str, _display: &DisplayAttributes) -> VecSink {
        VecSink {
            name: name.to_string(),
            points: Vec::new(),
        }
    }
}

/// Writes each admitted point to the log instead of drawing it.
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
    admitted: usize,
}

impl LogSink {
    pub fn admitted(&self) -> usize {
        self.admitted
    }
}

impl SeriesSink for LogSink {
    fn append(&mut self, key: f64, value: f64) -> Result<(), AppendError> {
        if !key.is_finite() || !value.is_finite() {
            return Err(AppendError::NonFinite { key, value });
        }
        self.admitted += 1;
        log::info!("Adding data for {}: key={key}, value={value}", self.name);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    type Sink = LogSink;

    fn create(&mut self, name: &str, display: &DisplayAttributes) -> LogSink {
        log::info!(
            "Series '{name}' colour {:?}, thickness {}",
            display.color,
            display.thickness
        );
        LogSink {
            name: name.to_string(),
            admitted: 0,
        }
    }
}
