//! Service Configuration Module
//!
//! Every constant of the scoring formula, plus the server and storage
//! settings, loaded from TOML instead of being hardcoded.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` CLI flag
//! 2. `ERW_CONFIG` environment variable (path to TOML file)
//! 3. `erw_config.toml` in the current working directory
//! 4. Built-in defaults (the v3.0 formula)
//!
//! ## Hot reload
//!
//! The active [`SiteScorer`] lives behind an `ArcSwap`. [`reload_scorer`]
//! re-reads the file, validates it and swaps in a new scorer; on any error
//! the previous scorer stays active. The [`watcher`] drives the same call
//! from file mtime changes.

mod scoring_config;
mod service_config;
pub mod defaults;
pub mod validation;
pub mod watcher;

pub use scoring_config::*;
pub use service_config::*;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::scoring::SiteScorer;

/// A single changed key between two scoring configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    /// Dotted key path, e.g. `scoring.cost.basalt_cost_per_ton`.
    pub key: String,
    pub old: String,
    pub new: String,
}

impl std::fmt::Display for ConfigChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.key, self.old, self.new)
    }
}

/// Reload the scoring section of the config file at `path` into `active`.
///
/// Server and storage sections are only read at startup; changes to them are
/// ignored here. Returns the list of changed scoring keys (empty if the file
/// is unchanged).
pub fn reload_scorer(
    path: &Path,
    active: &ArcSwap<SiteScorer>,
) -> Result<Vec<ConfigChange>, ConfigError> {
    let loaded = ServiceConfig::load_from_file(path)?;
    let scorer = SiteScorer::new(loaded.scoring)?;

    let changes = diff_scoring(active.load().config(), scorer.config());
    if changes.is_empty() {
        tracing::info!(path = %path.display(), "Config reloaded, no scoring changes");
        return Ok(changes);
    }

    for change in &changes {
        tracing::info!(key = %change.key, old = %change.old, new = %change.new, "Scoring config changed");
    }
    tracing::info!(
        version = %scorer.config().version,
        changed = changes.len(),
        "Swapped in reloaded scorer"
    );
    active.store(Arc::new(scorer));
    Ok(changes)
}

/// Key-by-key difference between two scoring configurations.
pub fn diff_scoring(old: &ScoringConfig, new: &ScoringConfig) -> Vec<ConfigChange> {
    let old = flatten(old);
    let new = flatten(new);

    let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| {
            let before = old.get(key).map(String::as_str).unwrap_or("<unset>");
            let after = new.get(key).map(String::as_str).unwrap_or("<unset>");
            (before != after).then(|| ConfigChange {
                key: key.clone(),
                old: before.to_string(),
                new: after.to_string(),
            })
        })
        .collect()
}

fn flatten(config: &ScoringConfig) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Ok(value) = toml::Value::try_from(config) {
        flatten_value(&value, "scoring", &mut out);
    }
    out
}

fn flatten_value(value: &toml::Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (k, v) in table {
                flatten_value(v, &format!("{prefix}.{k}"), out);
            }
        }
        toml::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_value(v, &format!("{prefix}[{i}]"), out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
