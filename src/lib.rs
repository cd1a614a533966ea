//! Kitchen AIOps - log-tail anomaly scoring.
//!
//! Each training or scoring call runs the same synchronous pipeline: read
//! the tail of the order log, decode the qualifying order events, encode
//! the fixed feature layout, score against the trained outlier model,
//! rescale within the batch, and aggregate per region.

pub mod config;
pub mod error;
pub mod event;
pub mod features;
pub mod handlers;
pub mod model;
pub mod scoring;
pub mod server;
pub mod tail;
pub mod telemetry;

pub use error::{AppError, AppResult};
