//! C4 — the session and selection engine.
//!
//! One [`Session`] per test class, implementing the state machine from
//! spec.md §4.4 verbatim: `Baseline → (select → MutationRun)* →
//! Exhausted | PartialRun`. [`crate::harness`] (C5) is the thin facade a
//! multi-pass test driver actually calls; `Session` is where the state
//! lives.

pub mod display;
pub mod selection;
pub mod summary;
pub mod target_filter;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{Error, Result};
use crate::registry::{self, ActiveMutation, DiscoveredPoint, PointId};

pub use selection::{SeedPolicy, SelectionStrategy};
pub use summary::Summary;
use target_filter::TargetFilter;

/// Per-session configuration (spec.md §3 "Configuration", §6
/// "Harness-configuration options").
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub selection: SelectionStrategy,
    pub seed_policy: SeedPolicy,
    pub shuffle: bool,
    /// Upper bound on the total number of runs, baseline included
    /// (baseline is run 0, so `max_runs=1` means no mutation runs). `0`
    /// means unbounded — run until untested mutations are exhausted.
    pub max_runs: u32,
    pub expected_test_count: Option<u32>,
    /// `0` disables the per-run bound.
    pub timeout_ms: u64,
    pub traps: Vec<String>,
    pub include_targets: Vec<String>,
    pub exclude_targets: Vec<String>,
    pub session_seed: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selection: SelectionStrategy::default(),
            seed_policy: SeedPolicy::default(),
            shuffle: false,
            max_runs: 0,
            expected_test_count: None,
            timeout_ms: 30_000,
            traps: Vec::new(),
            include_targets: Vec::new(),
            exclude_targets: Vec::new(),
            session_seed: 0,
        }
    }
}

/// The recorded disposition of one tested mutation (spec.md §3
/// "mutationResults").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Killed(String),
    Survived,
    TimedOut(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No run has started yet.
    Created,
    /// Baseline (run 0) in flight.
    Baseline,
    /// Baseline complete; waiting for the next `selectMutationForRun`.
    AwaitingSelection,
    /// A mutation run (run ≥ 1) in flight.
    MutationRun,
    /// Untested mutations exhausted (honouring the target filter), or
    /// `maxRuns` reached.
    Exhausted,
    /// Baseline executed fewer tests than `expectedTestCount`.
    PartialRun,
}

/// Per-test-class session state (spec.md §3 "Session state").
pub struct Session {
    config: SessionConfig,
    target_filter: TargetFilter,

    discovered_points: Mutex<HashMap<PointId, DiscoveredPoint>>,
    touch_counts: Mutex<HashMap<PointId, u32>>,
    tested_mutations: Mutex<HashSet<ActiveMutation>>,
    mutation_results: Mutex<HashMap<ActiveMutation, MutationOutcome>>,
    trapped_mutations: Mutex<Vec<ActiveMutation>>,
    executed_test_ids: Mutex<HashSet<String>>,

    current_run: Mutex<Option<u32>>,
    active_mutation: Mutex<Option<ActiveMutation>>,
    test_failed_in_current_run: AtomicBool,
    timed_out_in_current_run: Mutex<Option<String>>,
    killed_by_test: Mutex<Option<String>>,

    registry_handle: Mutex<Option<registry::SessionHandle>>,
    phase: Mutex<Phase>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Arc<Self> {
        let target_filter =
            TargetFilter::new(config.include_targets.clone(), config.exclude_targets.clone());
        Arc::new(Self {
            config,
            target_filter,
            discovered_points: Mutex::new(HashMap::new()),
            touch_counts: Mutex::new(HashMap::new()),
            tested_mutations: Mutex::new(HashSet::new()),
            mutation_results: Mutex::new(HashMap::new()),
            trapped_mutations: Mutex::new(Vec::new()),
            executed_test_ids: Mutex::new(HashSet::new()),
            current_run: Mutex::new(None),
            active_mutation: Mutex::new(None),
            test_failed_in_current_run: AtomicBool::new(false),
            timed_out_in_current_run: Mutex::new(None),
            killed_by_test: Mutex::new(None),
            registry_handle: Mutex::new(None),
            phase: Mutex::new(Phase::Created),
        })
    }

    /// Begin `run` (0 = baseline). Acquires the process-wide registry
    /// session slot for the duration of the run; blocks if another
    /// session currently holds it.
    pub fn start_run(&self, run: u32, mutation: Option<ActiveMutation>) -> Result<()> {
        {
            let mut current = self.current_run.lock();
            if current.is_some() {
                return Err(Error::registry("startRun called while a run is already open"));
            }
            *current = Some(run);
        }
        *self.active_mutation.lock() = mutation.clone();
        self.test_failed_in_current_run.store(false, Ordering::SeqCst);
        *self.timed_out_in_current_run.lock() = None;
        *self.killed_by_test.lock() = None;
        *self.phase.lock() = if run == 0 { Phase::Baseline } else { Phase::MutationRun };

        let handle = registry::begin_session(mutation);
        handle.begin_test();
        *self.registry_handle.lock() = Some(handle);
        Ok(())
    }

    /// Report that `test_id` finished executing during the current run.
    /// Touch counts for the just-finished test are folded in (baseline
    /// only — spec.md §4.4 "touchCounts: baseline only"); the touch
    /// accumulator is then reset for the next test.
    pub fn track_test_execution(&self, test_id: &str) -> Result<()> {
        let guard = self.registry_handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| Error::registry("trackTestExecution called outside a run"))?;
        handle.end_test();
        handle.begin_test();
        drop(guard);

        self.executed_test_ids.lock().insert(test_id.to_string());
        Ok(())
    }

    /// Route a test-execution exception to this run's kill bookkeeping.
    /// The exception itself is absorbed by the caller — mutations killed
    /// via failing assertions never fail the overall build (spec.md
    /// §4.4).
    pub fn mark_test_failed(&self, test_name: &str) {
        self.test_failed_in_current_run.store(true, Ordering::SeqCst);
        let mut killed_by = self.killed_by_test.lock();
        if killed_by.is_none() {
            *killed_by = Some(test_name.to_string());
        }
    }

    /// Record that the current run exceeded its configured timeout.
    /// Not part of the abstract harness contract (spec.md §4.5 has no
    /// timeout-reporting op) — `ReferenceHarness` calls this directly
    /// since it alone owns the run's wall-clock bound.
    pub fn record_timeout(&self, hint: impl Into<String>) {
        let mut timed_out = self.timed_out_in_current_run.lock();
        if timed_out.is_none() {
            *timed_out = Some(hint.into());
        }
    }

    /// Spec.md §3: "if no test reported failure for the active mutation
    /// and no timeout occurred, `didMutationSurvive()` is true." Pure
    /// function of the current run's flags.
    pub fn did_mutation_survive(&self) -> bool {
        !self.test_failed_in_current_run.load(Ordering::SeqCst)
            && self.timed_out_in_current_run.lock().is_none()
    }

    pub fn get_active_mutation(&self) -> Option<ActiveMutation> {
        self.active_mutation.lock().clone()
    }

    /// Canonical display name for an arbitrary mutation against this
    /// session's discovered points.
    pub fn get_display_name(&self, mutation: &ActiveMutation) -> Result<String> {
        let points = self.discovered_points.lock();
        let point = points
            .get(&mutation.point_id)
            .ok_or_else(|| Error::registry(format!("unknown point id: {}", mutation.point_id)))?;
        Ok(display::display_name(point, mutation.variant_index))
    }

    /// Compute and store this run's outcome (mutation runs only — a
    /// no-op during the baseline, which has no single active mutation to
    /// score).
    pub fn record_mutation_result(&self) -> Result<()> {
        let Some(mutation) = self.active_mutation.lock().clone() else {
            return Ok(());
        };
        let outcome = if self.test_failed_in_current_run.load(Ordering::SeqCst) {
            let by = self
                .killed_by_test
                .lock()
                .clone()
                .unwrap_or_else(|| "<unknown test>".to_string());
            MutationOutcome::Killed(by)
        } else if let Some(hint) = self.timed_out_in_current_run.lock().clone() {
            MutationOutcome::TimedOut(hint)
        } else {
            MutationOutcome::Survived
        };
        self.tested_mutations.lock().insert(mutation.clone());
        self.mutation_results.lock().insert(mutation, outcome);
        Ok(())
    }

    /// End the current run: releases the registry session slot, merges
    /// baseline discoveries, and (for the baseline) runs partial-run
    /// detection and trap resolution.
    pub fn end_run(&self) -> Result<()> {
        let run = self
            .current_run
            .lock()
            .take()
            .ok_or_else(|| Error::registry("endRun called with no open run"))?;
        let handle = self
            .registry_handle
            .lock()
            .take()
            .ok_or_else(|| Error::registry("endRun called with no open registry session"))?;
        let discoveries = registry::end_session(handle);
        *self.active_mutation.lock() = None;

        if run == 0 {
            let mut points = self.discovered_points.lock();
            for point in discoveries.points {
                points.entry(point.point_id.clone()).or_insert(point);
            }
            drop(points);
            *self.touch_counts.lock() = discoveries.touch_counts;

            if let Some(expected) = self.config.expected_test_count {
                if (self.executed_test_ids.lock().len() as u32) < expected {
                    *self.phase.lock() = Phase::PartialRun;
                    return Ok(());
                }
            }

            self.resolve_traps();
            *self.phase.lock() = Phase::AwaitingSelection;
        } else {
            *self.phase.lock() = Phase::AwaitingSelection;
        }
        Ok(())
    }

    fn resolve_traps(&self) {
        let points = self.discovered_points.lock();
        let resolution = display::resolve_traps(&self.config.traps, points.values());
        for trap in &resolution.unresolved {
            tracing::warn!(
                trap = %trap,
                candidates = ?resolution.candidates,
                "unresolved trap: no discovered mutation matches this display name"
            );
        }
        *self.trapped_mutations.lock() = resolution.resolved;
    }

    /// The untested mutation pool, honouring the target filter.
    fn untested_pool(&self) -> Vec<ActiveMutation> {
        let points = self.discovered_points.lock();
        let tested = self.tested_mutations.lock();
        let mut pool = Vec::new();
        for point in points.values() {
            if !self.target_filter.allows(&point.point_id) {
                continue;
            }
            for variant_index in 0..point.variant_count {
                let mutation = ActiveMutation {
                    point_id: point.point_id.clone(),
                    variant_index,
                };
                if !tested.contains(&mutation) {
                    pool.push(mutation);
                }
            }
        }
        pool.sort_by(|a, b| (a.point_id.clone(), a.variant_index).cmp(&(b.point_id.clone(), b.variant_index)));
        pool
    }

    /// Select the mutation for `run` (spec.md §4.4 "Selection"). `None`
    /// means the session is exhausted (honouring `maxRuns` and the
    /// target filter) or a partial run was detected.
    ///
    /// `maxRuns` bounds the *total* number of runs in the session,
    /// baseline included (spec.md §4.4's `Baseline → Exhausted` edge is
    /// labelled `maxRuns=1`): baseline is run 0, so run `r` may proceed
    /// only while `r < maxRuns`.
    pub fn select_mutation_for_run(&self, run: u32) -> Result<Option<ActiveMutation>> {
        if matches!(*self.phase.lock(), Phase::PartialRun) {
            return Ok(None);
        }
        if self.config.max_runs != 0 && run >= self.config.max_runs {
            *self.phase.lock() = Phase::Exhausted;
            return Ok(None);
        }

        let tested = self.tested_mutations.lock();
        if let Some(trap) = self
            .trapped_mutations
            .lock()
            .iter()
            .find(|m| !tested.contains(*m))
            .cloned()
        {
            drop(tested);
            return Ok(Some(trap));
        }
        drop(tested);

        let untested = self.untested_pool();
        if untested.is_empty() {
            *self.phase.lock() = Phase::Exhausted;
            return Ok(None);
        }

        let touch_counts = self.touch_counts.lock().clone();
        let mut sorted_ids: Vec<PointId> = self.discovered_points.lock().keys().cloned().collect();
        sorted_ids.sort();
        let sorted_id_refs: Vec<&PointId> = sorted_ids.iter().collect();

        let seed = selection::derive_seed(
            self.config.seed_policy,
            self.config.session_seed,
            run,
            &sorted_id_refs,
        );
        let mutation = selection::select(self.config.selection, seed, &untested, &touch_counts);
        Ok(Some(mutation))
    }

    pub fn is_partial_run(&self) -> bool {
        matches!(*self.phase.lock(), Phase::PartialRun)
    }

    /// Close the session and build its summary (spec.md §4.4
    /// "Summary"). Never itself returns `Err` for survived/timed-out
    /// mutations — those are reported in the summary; callers use
    /// [`Summary::as_result`]-style inspection (see `mutflow::harness`)
    /// to translate a summary into the process exit behaviour spec.md
    /// §6 describes.
    pub fn close_session(&self) -> Result<Summary> {
        if self.is_partial_run() {
            return Ok(Summary::build(0, Vec::new(), true));
        }

        let total = {
            let points = self.discovered_points.lock();
            points
                .values()
                .filter(|p| self.target_filter.allows(&p.point_id))
                .map(|p| p.variant_count as usize)
                .sum()
        };

        let results = self.mutation_results.lock();
        let points = self.discovered_points.lock();
        let mut tested = Vec::with_capacity(results.len());
        for (mutation, outcome) in results.iter() {
            if !self.target_filter.allows(&mutation.point_id) {
                continue;
            }
            let display_name = points
                .get(&mutation.point_id)
                .map(|p| display::display_name(p, mutation.variant_index))
                .unwrap_or_else(|| mutation.point_id.clone());
            tested.push((mutation.clone(), outcome.clone(), display_name));
        }
        tested.sort_by(|a, b| a.2.cmp(&b.2));

        Ok(Summary::build(total, tested, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{self as reg, SourceLocation};

    fn loc(line: u32) -> SourceLocation {
        SourceLocation { file: "Calc.rs".into(), line }
    }

    fn config() -> SessionConfig {
        SessionConfig {
            selection: SelectionStrategy::MostLikelyStable,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn baseline_discovers_points_and_touch_counts() {
        reg::reset_for_test();
        let session = Session::new(config());
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("test_positive").unwrap();
        session.end_run().unwrap();

        assert_eq!(session.discovered_points.lock().len(), 1);
        assert_eq!(session.touch_counts.lock().get("Calc_0"), Some(&1));
    }

    #[test]
    fn no_duplicate_selection_across_a_session() {
        reg::reset_for_test();
        let session = Session::new(config());
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        let m1 = session.select_mutation_for_run(1).unwrap().unwrap();
        session.start_run(1, Some(m1.clone())).unwrap();
        session.record_mutation_result().unwrap();
        session.end_run().unwrap();

        let pool_after = session.untested_pool();
        assert!(!pool_after.contains(&m1));
    }

    #[test]
    fn max_runs_of_one_permits_baseline_but_no_mutation_runs() {
        reg::reset_for_test();
        let mut cfg = config();
        cfg.max_runs = 1;
        let session = Session::new(cfg);
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        assert_eq!(session.select_mutation_for_run(1).unwrap(), None);
    }

    #[test]
    fn max_runs_bounds_total_runs_including_baseline() {
        reg::reset_for_test();
        let mut cfg = config();
        cfg.max_runs = 2;
        let session = Session::new(cfg);
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        let first = session.select_mutation_for_run(1).unwrap();
        assert!(first.is_some());
        session.start_run(1, first.clone()).unwrap();
        session.record_mutation_result().unwrap();
        session.end_run().unwrap();

        assert_eq!(session.select_mutation_for_run(2).unwrap(), None);
    }

    #[test]
    fn partial_run_skips_mutation_runs() {
        reg::reset_for_test();
        let mut cfg = config();
        cfg.expected_test_count = Some(3);
        let session = Session::new(cfg);
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        assert!(session.is_partial_run());
        assert_eq!(session.select_mutation_for_run(1).unwrap(), None);
        let summary = session.close_session().unwrap();
        assert!(summary.partial_run);
    }

    #[test]
    fn mutation_run_records_killed_outcome() {
        reg::reset_for_test();
        let session = Session::new(config());
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        let mutation = session.select_mutation_for_run(1).unwrap().unwrap();
        session.start_run(1, Some(mutation.clone())).unwrap();
        session.mark_test_failed("test_boundary");
        session.record_mutation_result().unwrap();
        session.end_run().unwrap();

        let results = session.mutation_results.lock();
        assert_eq!(results.get(&mutation), Some(&MutationOutcome::Killed("test_boundary".into())));
    }

    #[test]
    fn mutation_run_with_no_failure_survives() {
        reg::reset_for_test();
        let session = Session::new(config());
        session.start_run(0, None).unwrap();
        reg::check("Calc_0", 2, loc(1), ">", &[">=", "<"], 1);
        session.track_test_execution("t1").unwrap();
        session.end_run().unwrap();

        let mutation = session.select_mutation_for_run(1).unwrap().unwrap();
        session.start_run(1, Some(mutation.clone())).unwrap();
        assert!(session.did_mutation_survive());
        session.record_mutation_result().unwrap();
        session.end_run().unwrap();

        let results = session.mutation_results.lock();
        assert_eq!(results.get(&mutation), Some(&MutationOutcome::Survived));
    }
}
