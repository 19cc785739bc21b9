//! C5 — the harness interface (spec.md §4.5).
//!
//! A thin surface any multi-pass test driver can call: create a session,
//! drive the baseline/mutation-run loop, read back per-run outcomes.
//! [`Session`] already implements every operation inherently; [`Harness`]
//! just names that surface as a trait so a driver can be written against
//! it generically (and so a test double can stand in for a real session).
//!
//! [`ReferenceHarness`] is the one concrete driver this crate ships: it
//! shells out to a configured external test command, grounded on the
//! teacher's `executor.rs` (`ExecutorConfig`, async `tokio::process`
//! execution, per-run timeout via `tokio::time::timeout`). It is a
//! reference, not the only valid adapter — a host integrated with its
//! test framework would report `trackTestExecution`/`markTestFailed` per
//! actual test rather than once per process run.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::process::Command as AsyncCommand;
use tokio::time::timeout;

use crate::core::{Error, Result};
use crate::registry::ActiveMutation;
use crate::session::{Session, SessionConfig, Summary};

/// The nine spec.md §4.5 operations, named as the session already
/// implements them.
pub trait Harness {
    fn select_mutation_for_run(&self, run: u32) -> Result<Option<ActiveMutation>>;
    fn start_run(&self, run: u32, mutation: Option<ActiveMutation>) -> Result<()>;
    fn track_test_execution(&self, test_id: &str) -> Result<()>;
    fn mark_test_failed(&self, test_name: &str);
    fn record_mutation_result(&self) -> Result<()>;
    fn did_mutation_survive(&self) -> bool;
    fn get_active_mutation(&self) -> Option<ActiveMutation>;
    fn get_display_name(&self, mutation: &ActiveMutation) -> Result<String>;
    fn end_run(&self) -> Result<()>;
    fn close_session(&self) -> Result<Summary>;
}

impl Harness for Session {
    fn select_mutation_for_run(&self, run: u32) -> Result<Option<ActiveMutation>> {
        Session::select_mutation_for_run(self, run)
    }
    fn start_run(&self, run: u32, mutation: Option<ActiveMutation>) -> Result<()> {
        Session::start_run(self, run, mutation)
    }
    fn track_test_execution(&self, test_id: &str) -> Result<()> {
        Session::track_test_execution(self, test_id)
    }
    fn mark_test_failed(&self, test_name: &str) {
        Session::mark_test_failed(self, test_name)
    }
    fn record_mutation_result(&self) -> Result<()> {
        Session::record_mutation_result(self)
    }
    fn did_mutation_survive(&self) -> bool {
        Session::did_mutation_survive(self)
    }
    fn get_active_mutation(&self) -> Option<ActiveMutation> {
        Session::get_active_mutation(self)
    }
    fn get_display_name(&self, mutation: &ActiveMutation) -> Result<String> {
        Session::get_display_name(self, mutation)
    }
    fn end_run(&self) -> Result<()> {
        Session::end_run(self)
    }
    fn close_session(&self) -> Result<Summary> {
        Session::close_session(self)
    }
}

/// Opaque handle to a live session (spec.md §4.5 `sessionId`). Clone and
/// share across threads — every operation forwards to the shared
/// [`Session`].
#[derive(Clone)]
pub struct SessionId(Arc<Session>);

impl Harness for SessionId {
    fn select_mutation_for_run(&self, run: u32) -> Result<Option<ActiveMutation>> {
        self.0.select_mutation_for_run(run)
    }
    fn start_run(&self, run: u32, mutation: Option<ActiveMutation>) -> Result<()> {
        self.0.start_run(run, mutation)
    }
    fn track_test_execution(&self, test_id: &str) -> Result<()> {
        self.0.track_test_execution(test_id)
    }
    fn mark_test_failed(&self, test_name: &str) {
        self.0.mark_test_failed(test_name)
    }
    fn record_mutation_result(&self) -> Result<()> {
        self.0.record_mutation_result()
    }
    fn did_mutation_survive(&self) -> bool {
        self.0.did_mutation_survive()
    }
    fn get_active_mutation(&self) -> Option<ActiveMutation> {
        self.0.get_active_mutation()
    }
    fn get_display_name(&self, mutation: &ActiveMutation) -> Result<String> {
        self.0.get_display_name(mutation)
    }
    fn end_run(&self) -> Result<()> {
        self.0.end_run()
    }
    fn close_session(&self) -> Result<Summary> {
        self.0.close_session()
    }
}

/// `createSession` (spec.md §4.5).
pub fn create_session(config: SessionConfig) -> SessionId {
    SessionId(Session::new(config))
}

/// Configuration for [`ReferenceHarness`] (mirrors the teacher's
/// `ExecutorConfig`).
#[derive(Debug, Clone)]
pub struct ReferenceHarnessConfig {
    /// Shell command that runs the test suite; exit code 0 means "no
    /// failure reported".
    pub test_command: String,
    /// Working directory the test command runs in.
    pub working_dir: Option<PathBuf>,
    /// Per-run timeout in milliseconds; `0` disables the bound.
    pub timeout_ms: u64,
}

impl Default for ReferenceHarnessConfig {
    fn default() -> Self {
        Self {
            test_command: "cargo test".to_string(),
            working_dir: None,
            timeout_ms: 0,
        }
    }
}

/// One external-process run's disposition.
enum RunOutcome {
    Passed,
    Failed,
    TimedOut,
    Error(String),
}

async fn run_test_command(config: &ReferenceHarnessConfig) -> RunOutcome {
    let mut cmd = if cfg!(windows) {
        let mut c = AsyncCommand::new("cmd");
        c.args(["/C", &config.test_command]);
        c
    } else {
        let mut c = AsyncCommand::new("sh");
        c.args(["-c", &config.test_command]);
        c
    };
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let spawn_and_wait = async {
        match cmd.spawn() {
            Ok(mut child) => match child.wait().await {
                Ok(status) if status.success() => RunOutcome::Passed,
                Ok(_) => RunOutcome::Failed,
                Err(e) => RunOutcome::Error(e.to_string()),
            },
            Err(e) => RunOutcome::Error(e.to_string()),
        }
    };

    if config.timeout_ms == 0 {
        spawn_and_wait.await
    } else {
        match timeout(Duration::from_millis(config.timeout_ms), spawn_and_wait).await {
            Ok(outcome) => outcome,
            Err(_) => RunOutcome::TimedOut,
        }
    }
}

/// Reference implementation of the "test-framework adapter" collaborator
/// spec.md leaves external: drives a [`Session`] by shelling out to one
/// configured test command per run, treating the whole process
/// invocation as a single observed test (`"<test_command>"` as the test
/// id). A host with real per-test visibility would call
/// [`Harness::track_test_execution`]/[`Harness::mark_test_failed`] once
/// per actual test instead.
pub struct ReferenceHarness {
    config: ReferenceHarnessConfig,
    session: SessionId,
}

impl ReferenceHarness {
    pub fn new(session_config: SessionConfig, harness_config: ReferenceHarnessConfig) -> Self {
        Self {
            config: harness_config,
            session: create_session(session_config),
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Run one pass of the test command under `mutation` (`None` for the
    /// baseline) and fold the outcome into the session.
    async fn run_once(&self, run: u32, mutation: Option<ActiveMutation>) -> Result<()> {
        self.session.start_run(run, mutation)?;
        let start = Instant::now();
        let outcome = run_test_command(&self.config).await;
        let elapsed = start.elapsed();

        match outcome {
            RunOutcome::Passed => {}
            RunOutcome::Failed => self.session.mark_test_failed(&self.config.test_command),
            RunOutcome::TimedOut => {
                self.session.0.record_timeout(format!(
                    "exceeded {}ms (elapsed {}ms)",
                    self.config.timeout_ms,
                    elapsed.as_millis()
                ));
            }
            RunOutcome::Error(message) => return Err(Error::config(message)),
        }

        self.session.track_test_execution(&self.config.test_command)?;
        self.session.record_mutation_result()?;
        self.session.end_run()
    }

    /// Drive the full spec.md §4.4 state machine to completion: baseline,
    /// then repeatedly select-and-run until the session reports
    /// exhaustion or a partial run. Returns the closing [`Summary`].
    pub async fn run_to_completion(&self) -> Result<Summary> {
        self.run_once(0, None).await?;

        if self.session.0.is_partial_run() {
            return self.session.close_session();
        }

        let mut run = 1;
        loop {
            let Some(mutation) = self.session.select_mutation_for_run(run)? else {
                break;
            };
            self.run_once(run, Some(mutation)).await?;
            run += 1;
        }

        self.session.close_session()
    }
}
