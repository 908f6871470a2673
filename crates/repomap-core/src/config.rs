use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration document. The outer CLI loads this
/// from a JSON file and/or `REPOMAP_*` environment overrides; this crate
/// only defines the shape and validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepomapConfig {
    pub project_root: PathBuf,
    pub fuzzy_match: FuzzyMatchConfig,
    pub semantic_match: SemanticMatchConfig,
    pub performance: PerformanceConfig,
    pub trees: TreesConfig,
    pub dependencies: DependenciesConfig,
    pub log_level: String,
    pub refresh_cache: bool,
}

impl Default for RepomapConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            fuzzy_match: FuzzyMatchConfig::default(),
            semantic_match: SemanticMatchConfig::default(),
            performance: PerformanceConfig::default(),
            trees: TreesConfig::default(),
            dependencies: DependenciesConfig::default(),
            log_level: "info".to_string(),
            refresh_cache: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyMatchConfig {
    pub enabled: bool,
    pub threshold: u32,
}

impl Default for FuzzyMatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticMatchConfig {
    pub enabled: bool,
    pub threshold: f64,
}

impl Default for SemanticMatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_workers: usize,
    pub cache_size: usize,
    pub enable_progress: bool,
    pub enable_monitoring: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            cache_size: 10_000,
            enable_progress: false,
            enable_monitoring: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreesConfig {
    pub max_depth: usize,
    pub entrypoint_threshold: u32,
}

impl Default for TreesConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            entrypoint_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependenciesConfig {
    pub cache_graphs: bool,
    pub max_graph_size: usize,
    pub enable_call_graph: bool,
    pub enable_impact_analysis: bool,
    pub centrality_algorithms: Vec<String>,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            cache_graphs: true,
            max_graph_size: 50_000,
            enable_call_graph: true,
            enable_impact_analysis: true,
            centrality_algorithms: vec![
                "degree".into(),
                "betweenness".into(),
                "pagerank".into(),
                "eigenvector".into(),
                "closeness".into(),
                "composite".into(),
            ],
        }
    }
}

impl RepomapConfig {
    /// Load from a JSON document, applying `REPOMAP_*` environment
    /// overrides for a small set of scalar fields.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut cfg: Self =
            serde_json::from_str(text).map_err(|e| Error::Configuration(e.to_string()))?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("REPOMAP_FUZZY_THRESHOLD") {
            if let Ok(n) = v.parse() {
                self.fuzzy_match.threshold = n;
            }
        }
        if let Ok(v) = std::env::var("REPOMAP_MAX_WORKERS") {
            if let Ok(n) = v.parse() {
                self.performance.max_workers = n;
            }
        }
        if let Ok(v) = std::env::var("REPOMAP_LOG_LEVEL") {
            self.log_level = v;
        }
    }

    /// Clamp/validate the fields whose ranges are fixed explicitly.
    /// Invalid values are clamped into range rather than rejected — a
    /// malformed document is fatal to the request, but an out-of-range
    /// threshold is a correctable mistake, not a malformed document.
    pub fn validate(&mut self) -> Result<()> {
        if self.fuzzy_match.threshold > 100 {
            self.fuzzy_match.threshold = 100;
        }
        self.semantic_match.threshold = self.semantic_match.threshold.clamp(0.0, 1.0);
        if self.performance.max_workers == 0 {
            return Err(Error::Configuration(
                "performance.max_workers must be at least 1".into(),
            ));
        }
        if self.trees.max_depth == 0 {
            return Err(Error::Configuration(
                "trees.max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether the process-wide cache switch is enabled: honored only
    /// when globally enabled, since an environment switch may disable
    /// it regardless of what the config document says.
    pub fn cache_enabled() -> bool {
        std::env::var("REPOMAP_DISABLE_CACHE")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true)
    }

    pub fn workspace_dir() -> Option<PathBuf> {
        std::env::var("REPOMAP_WORKSPACE_DIR").ok().map(PathBuf::from)
    }

    pub fn session_dir() -> Option<PathBuf> {
        std::env::var("REPOMAP_SESSION_DIR").ok().map(PathBuf::from)
    }

    /// Default cache directory: `<home>/.repomap-tool/cache`.
    pub fn default_cache_dir() -> PathBuf {
        if let Some(dir) = Self::workspace_dir() {
            return dir.join(".repomap-tool").join("cache");
        }
        dirs_home().join(".repomap-tool").join("cache")
    }
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let mut cfg = RepomapConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn clamps_out_of_range_thresholds() {
        let mut cfg = RepomapConfig::default();
        cfg.fuzzy_match.threshold = 250;
        cfg.semantic_match.threshold = 5.0;
        cfg.validate().unwrap();
        assert_eq!(cfg.fuzzy_match.threshold, 100);
        assert_eq!(cfg.semantic_match.threshold, 1.0);
    }

    #[test]
    fn rejects_zero_workers() {
        let mut cfg = RepomapConfig::default();
        cfg.performance.max_workers = 0;
        assert!(cfg.validate().is_err());
    }
}
