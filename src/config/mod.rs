//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::session::selection::{SeedPolicy, SelectionStrategy};

/// Harness-configuration options (spec §6) plus file-discovery knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclude patterns (glob) applied during source discovery.
    #[serde(rename = "exclude")]
    pub exclude_patterns: Vec<String>,
    /// Selection strategy used to pick the next mutation for a run.
    pub selection: SelectionStrategy,
    /// Seed policy driving the selection strategy's PRNG.
    pub seed_policy: SeedPolicy,
    /// Base seed for the `PerRun` seed policy (`sessionSeed + run`).
    /// Ignored under `PerChange`.
    pub session_seed: i64,
    /// Whether the order of runs within a session is shuffled.
    pub shuffle: bool,
    /// Upper bound on the total number of runs per session, baseline
    /// included (baseline is run 0, so `max_runs=1` permits the baseline
    /// and zero mutation runs). `0` means unbounded (run until every
    /// discovered point is exhausted).
    pub max_runs: u32,
    /// Expected number of tests the baseline run should execute; used to
    /// detect a partial run (spec §4.4).
    pub expected_test_count: Option<u32>,
    /// Per-run timeout in milliseconds. `0` disables the bound.
    pub timeout_ms: u64,
    /// Trap strings (display-name fragments) to run directly instead of
    /// going through a selection strategy.
    pub traps: Vec<String>,
    /// If non-empty, only these display-name-matching targets are
    /// eligible for selection/exhaustion/summary.
    pub include_targets: Vec<String>,
    /// Display-name-matching targets excluded from
    /// selection/exhaustion/summary.
    pub exclude_targets: Vec<String>,
    /// Output configuration for the session summary.
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_patterns: Vec::new(),
            selection: SelectionStrategy::default(),
            seed_policy: SeedPolicy::default(),
            session_seed: 0,
            shuffle: false,
            max_runs: 0,
            expected_test_count: None,
            timeout_ms: 30_000,
            traps: Vec::new(),
            include_targets: Vec::new(),
            exclude_targets: Vec::new(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config`
    /// flags. Env vars with a `MUTFLOW_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("MUTFLOW_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Alias for `from_file`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path)
    }

    /// Load configuration from a directory, looking for `mutflow.toml` or
    /// `.mutflow/mutflow.toml`. Missing files are silently skipped
    /// (defaults are used). Env vars with a `MUTFLOW_` prefix override
    /// file/default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("mutflow.toml")))
            .merge(Toml::file(dir.join(".mutflow/mutflow.toml")))
            .merge(Env::prefixed("MUTFLOW_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Alias for `load_default`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_default(dir)
    }

    /// The embedded default configuration, as documented TOML.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }

    /// Build a [`crate::session::SessionConfig`] from this configuration.
    /// The CLI overlays per-invocation flags on top of the result.
    pub fn to_session_config(&self) -> crate::session::SessionConfig {
        crate::session::SessionConfig {
            selection: self.selection,
            seed_policy: self.seed_policy,
            shuffle: self.shuffle,
            max_runs: self.max_runs,
            expected_test_count: self.expected_test_count,
            timeout_ms: self.timeout_ms,
            traps: self.traps.clone(),
            include_targets: self.include_targets.clone(),
            exclude_targets: self.exclude_targets.clone(),
            session_seed: self.session_seed,
        }
    }
}

/// Output configuration for the session summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(format!("Unknown format: {s}. Use 'text', 'json', or 'md'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_runs, 0);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(!config.shuffle);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("unknown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file("mutflow.toml", "max_runs = 100\ntimeout_ms = 5000")?;
            let config = Config::from_file("mutflow.toml").unwrap();
            assert_eq!(config.max_runs, 100);
            assert_eq!(config.timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_no_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.timeout_ms, 30_000);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_dot_mutflow() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join(".mutflow")).unwrap();
            jail.create_file(".mutflow/mutflow.toml", "max_runs = 7")?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.max_runs, 7);
            Ok(())
        });
    }

    #[test]
    fn test_from_file_errors_on_missing_file() {
        let result = Config::from_file("/nonexistent/path/mutflow.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "expected 'not found' in: {err}");
    }

    #[test]
    fn test_env_var_overrides_file_value() {
        Jail::expect_with(|jail| {
            jail.create_file("mutflow.toml", "max_runs = 15")?;
            jail.set_env("MUTFLOW_MAX_RUNS", "5");
            let config = Config::from_file("mutflow.toml").unwrap();
            assert_eq!(config.max_runs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_config_with_exclude_patterns() {
        Jail::expect_with(|jail| {
            jail.create_file("mutflow.toml", "exclude = [\"target/**\", \"vendor/**\"]")?;
            let config = Config::from_file("mutflow.toml").unwrap();
            assert_eq!(config.exclude_patterns.len(), 2);
            assert!(config.exclude_patterns.contains(&"target/**".to_string()));
            Ok(())
        });
    }

    #[test]
    fn test_config_default_toml() {
        let content = Config::default_toml();
        assert!(!content.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("selection"));
        assert!(json.contains("timeout_ms"));
    }

    #[test]
    fn test_to_session_config_carries_fields_through() {
        let mut config = Config::default();
        config.max_runs = 12;
        config.traps = vec!["(Calc.rs:8) 0 → -1".to_string()];
        let session_config = config.to_session_config();
        assert_eq!(session_config.max_runs, 12);
        assert_eq!(session_config.traps, config.traps);
        assert_eq!(session_config.session_seed, config.session_seed);
    }
}
