// src/config/weights.rs
//! Aggregator configuration: source weights + reliabilities, loaded from TOML
//! or JSON, with a hot-reload wrapper for the service.
//!
//! TOML shape:
//! ```toml
//! [weights]
//! stocks = 0.4
//! news = 0.3
//! social = 0.3
//!
//! [reliability]
//! stocks = 0.9
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};
use tracing::{info, warn};

use crate::aggregator::{default_reliability, default_weights, SentimentAggregator};
use crate::error::ConfigurationError;
use crate::source::Source;

pub const ENV_WEIGHTS_PATH: &str = "MOODMETER_WEIGHTS_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/weights.toml";
pub const DEFAULT_JSON_PATH: &str = "config/weights.json";

/// Raw config as written on disk. Keys are source names in any spelling;
/// they are parsed (and aliases resolved) when the aggregator is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub reliability: BTreeMap<String, f64>,
}

impl AggregatorConfig {
    /// Built-in seed: stocks 40%, news 30%, social 30%.
    pub fn default_seed() -> Self {
        Self {
            weights: default_weights()
                .into_iter()
                .map(|(s, w)| (s.to_string(), w))
                .collect(),
            reliability: default_reliability()
                .into_iter()
                .map(|(s, r)| (s.to_string(), r))
                .collect(),
        }
    }

    /// Validate and build. Sources are ordered stocks, news, social, then
    /// named channels alphabetically.
    pub fn build(&self) -> Result<SentimentAggregator, ConfigurationError> {
        let mut weights: Vec<(Source, f64)> = self
            .weights
            .iter()
            .map(|(k, w)| (Source::parse(k), *w))
            .collect();
        weights.sort_by(|a, b| a.0.cmp(&b.0));

        SentimentAggregator::new(weights)?.with_reliability(
            self.reliability
                .iter()
                .map(|(k, r)| (Source::parse(k), *r)),
        )
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

/// Load from an explicit path. `.json` parses as JSON, anything else as TOML.
pub fn load_from(path: &Path) -> Result<AggregatorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading weights from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parsed = if ext == "json" {
        AggregatorConfig::from_json_str(&content)
    } else {
        AggregatorConfig::from_toml_str(&content)
    };
    parsed.with_context(|| format!("parsing weights from {}", path.display()))
}

/// Which file the service should read, if any:
/// 1) $MOODMETER_WEIGHTS_PATH (must exist)
/// 2) config/weights.toml
/// 3) config/weights.json
///
/// `Ok(None)` means use the built-in seed.
pub fn resolve_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_WEIGHTS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        bail!("{ENV_WEIGHTS_PATH} points to non-existent path {}", pb.display());
    }
    for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(Some(pb));
        }
    }
    Ok(None)
}

/// Resolve, load and build in one go.
pub fn load_default() -> Result<SentimentAggregator> {
    let cfg = match resolve_path()? {
        Some(path) => load_from(&path)?,
        None => AggregatorConfig::default_seed(),
    };
    cfg.build().map_err(|e| anyhow!(e))
}

/// Shared aggregator that follows its config file. Readers get an `Arc`
/// snapshot; a rejected file never replaces a working aggregator.
#[derive(Debug)]
pub struct HotReloadAggregator {
    path: Option<PathBuf>,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    aggregator: Arc<SentimentAggregator>,
    last_modified: Option<SystemTime>,
}

impl HotReloadAggregator {
    /// Fixed aggregator, no file behind it.
    pub fn fixed(aggregator: SentimentAggregator) -> Self {
        Self {
            path: None,
            inner: RwLock::new(State {
                aggregator: Arc::new(aggregator),
                last_modified: None,
            }),
        }
    }

    /// Load `path` now; fails if the initial file is unreadable or invalid.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let aggregator = load_from(&path)?.build().map_err(|e| anyhow!(e))?;
        let last_modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        info!(path = %path.display(), "loaded aggregator weights");
        Ok(Self {
            path: Some(path),
            inner: RwLock::new(State {
                aggregator: Arc::new(aggregator),
                last_modified,
            }),
        })
    }

    /// Env/default-path lookup; built-in seed when no file exists.
    pub fn from_env() -> Result<Self> {
        match resolve_path()? {
            Some(path) => Self::from_path(path),
            None => {
                info!("no weights file found, using built-in seed");
                Ok(Self::fixed(SentimentAggregator::dashboard_default()))
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current aggregator, reloading first if the file's mtime changed.
    pub fn current(&self) -> Arc<SentimentAggregator> {
        let Some(path) = self.path.as_deref() else {
            return self.snapshot();
        };

        let mtime = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(m) => m,
            // File gone: keep serving what we have.
            Err(_) => return self.snapshot(),
        };

        {
            let guard = self.inner.read().expect("weights rwlock poisoned");
            if guard.last_modified == Some(mtime) {
                return guard.aggregator.clone();
            }
        }

        let mut guard = self.inner.write().expect("weights rwlock poisoned");
        // Double-check in case another reader already reloaded.
        if guard.last_modified != Some(mtime) {
            match load_from(path).and_then(|c| c.build().map_err(|e| anyhow!(e))) {
                Ok(agg) => {
                    info!(path = %path.display(), "reloaded aggregator weights");
                    guard.aggregator = Arc::new(agg);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %format!("{e:#}"),
                        "rejected weights reload"
                    );
                    metrics::counter!("moodmeter_weights_reload_failures_total").increment(1);
                }
            }
            // Remember the mtime either way so a bad file is not re-parsed per call.
            guard.last_modified = Some(mtime);
        }
        guard.aggregator.clone()
    }

    /// Force a reload from disk. On error the previous aggregator stays.
    pub fn reload(&self) -> Result<Arc<SentimentAggregator>> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("no weights file configured"))?;
        let agg = Arc::new(load_from(path)?.build().map_err(|e| anyhow!(e))?);
        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();

        let mut guard = self.inner.write().expect("weights rwlock poisoned");
        guard.aggregator = agg.clone();
        guard.last_modified = mtime;
        info!(path = %path.display(), "reloaded aggregator weights on request");
        Ok(agg)
    }

    fn snapshot(&self) -> Arc<SentimentAggregator> {
        self.inner
            .read()
            .expect("weights rwlock poisoned")
            .aggregator
            .clone()
    }
}
