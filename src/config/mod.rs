// src/config/mod.rs
//! Configuration loading: aggregator weights (file-backed, hot-reloadable) and
//! service settings (env).

pub mod service;
pub mod weights;

pub use service::ServiceConfig;
pub use weights::{load_default, load_from, AggregatorConfig, HotReloadAggregator};
