//! Point-by-point admission of dataset rows into series destinations.

pub mod driver;
pub mod sinks;

pub use driver::{
    open_destinations, FeedDriver, FeedReport, LaneReport, Pacer, Renderer, SeriesSink,
    StopSignal, ThreadPacer,
};
pub use sinks::{LogRenderer, LogSink, VecRenderer, VecSink};
