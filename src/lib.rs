//! Tabular sea-ice datasets turned into independently coloured series and
//! fed point by point into chart destinations.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod series;
