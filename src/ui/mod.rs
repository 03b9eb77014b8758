pub mod live;
pub mod panels;
pub mod plot;
