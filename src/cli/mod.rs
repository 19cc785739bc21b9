//! The demo CLI surface (ambient per SPEC_FULL.md §0.5 — not one of the
//! four core subsystems). `mutflow` either walks marked source files and
//! prints the dispatch points the transformer would inject ("report"
//! mode, no live session required), or — when given a test command —
//! drives a full baseline-then-mutation-runs session through
//! [`crate::harness::ReferenceHarness`] and prints the closing summary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::session::{SeedPolicy, SelectionStrategy};

/// mutflow - mutant-schemata mutation testing for Rust.
#[derive(Parser)]
#[command(name = "mutflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root path to scan for marked Rust source files.
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Configuration file path (defaults to `mutflow.toml` or
    /// `.mutflow/mutflow.toml` under `path`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format for the report or session summary.
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Shell command that runs the test suite. When set, drives a full
    /// session via `ReferenceHarness`; otherwise mutflow only reports
    /// the mutation points the transformer would inject.
    #[arg(long)]
    pub test_cmd: Option<String>,

    /// Selection strategy for the next mutation run (overrides config).
    #[arg(long, value_enum)]
    pub selection: Option<SelectionArg>,

    /// Seed policy for the selection strategy's PRNG (overrides config).
    #[arg(long, value_enum)]
    pub seed_policy: Option<SeedPolicyArg>,

    /// Base seed for the `PerRun` seed policy (overrides config).
    #[arg(long)]
    pub seed: Option<i64>,

    /// Upper bound on total runs per session including the baseline, 0
    /// for unbounded (overrides config).
    #[arg(long)]
    pub max_runs: Option<u32>,

    /// Expected number of tests the baseline should execute; used for
    /// partial-run detection (overrides config).
    #[arg(long)]
    pub expected_test_count: Option<u32>,

    /// Per-run timeout in milliseconds, 0 disables the bound (overrides
    /// config).
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// A trap display-name string to run first; repeatable (overrides
    /// config's `traps` list when any are given).
    #[arg(long = "trap")]
    pub traps: Vec<String>,

    /// Restrict selection/exhaustion/summary to this owner (repeatable;
    /// overrides config's `include_targets` when any are given).
    #[arg(long = "include-target")]
    pub include_targets: Vec<String>,

    /// Exclude this owner from selection/exhaustion/summary (repeatable;
    /// overrides config's `exclude_targets` when any are given).
    #[arg(long = "exclude-target")]
    pub exclude_targets: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SelectionArg {
    PureRandom,
    MostLikelyRandom,
    MostLikelyStable,
}

impl From<SelectionArg> for SelectionStrategy {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::PureRandom => SelectionStrategy::PureRandom,
            SelectionArg::MostLikelyRandom => SelectionStrategy::MostLikelyRandom,
            SelectionArg::MostLikelyStable => SelectionStrategy::MostLikelyStable,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeedPolicyArg {
    PerRun,
    PerChange,
}

impl From<SeedPolicyArg> for SeedPolicy {
    fn from(arg: SeedPolicyArg) -> Self {
        match arg {
            SeedPolicyArg::PerRun => SeedPolicy::PerRun,
            SeedPolicyArg::PerChange => SeedPolicy::PerChange,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Overlay this invocation's flags onto a loaded
    /// [`crate::config::Config`]'s derived
    /// [`crate::session::SessionConfig`]. CLI-provided list flags
    /// (`--trap`, `--include-target`, `--exclude-target`) replace the
    /// config's list wholesale when non-empty; scalar flags override
    /// unconditionally when present.
    pub fn apply_overrides(
        &self,
        mut session_config: crate::session::SessionConfig,
    ) -> crate::session::SessionConfig {
        if let Some(selection) = self.selection {
            session_config.selection = selection.into();
        }
        if let Some(seed_policy) = self.seed_policy {
            session_config.seed_policy = seed_policy.into();
        }
        if let Some(seed) = self.seed {
            session_config.session_seed = seed;
        }
        if let Some(max_runs) = self.max_runs {
            session_config.max_runs = max_runs;
        }
        if self.expected_test_count.is_some() {
            session_config.expected_test_count = self.expected_test_count;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            session_config.timeout_ms = timeout_ms;
        }
        if !self.traps.is_empty() {
            session_config.traps = self.traps.clone();
        }
        if !self.include_targets.is_empty() {
            session_config.include_targets = self.include_targets.clone();
        }
        if !self.exclude_targets.is_empty() {
            session_config.exclude_targets = self.exclude_targets.clone();
        }
        session_config
    }
}
