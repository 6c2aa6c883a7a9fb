//! Train, persist, and serve a binary classifier for a fixed 30-feature
//! tabular dataset.
//!
//! The serving binary loads one artifact at startup and answers `/health`
//! and `/predict`; `train` and `evaluate` are separate binaries built on the
//! same modules.

pub mod api;
pub mod config;
pub mod data;
pub mod evaluate;
pub mod latency;
pub mod metrics;
pub mod model;
pub mod state;
pub mod train;
pub mod types;

pub use config::Settings;
pub use model::{Classifier, LogisticModel, ModelConfig};
pub use state::AppState;
