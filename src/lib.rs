pub mod builder;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod frames;
pub mod indicator;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod render;
pub mod utils;

pub use crate::dashboard::Dashboard;
pub use crate::error::{Error, Result};
