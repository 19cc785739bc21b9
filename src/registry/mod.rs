//! C1 — the runtime mutation registry.
//!
//! A single process-wide coordinator bridging the code the IR transformer
//! emits and the session engine. Exactly one session may be held at a
//! time; `check` is the non-blocking, constant-time call every injected
//! dispatch branch makes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::ThreadId;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A stable per-session mutation-point identifier, `<owner>_<n>`.
pub type PointId = String;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPoint {
    pub point_id: PointId,
    pub variant_count: u32,
    pub source_location: SourceLocation,
    pub original_operator: String,
    pub variant_operators: Vec<String>,
    pub occurrence_on_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveMutation {
    pub point_id: PointId,
    pub variant_index: u32,
}

/// Accumulated discoveries and touch counts, returned to the caller of
/// `with_session` on release.
#[derive(Debug, Clone, Default)]
pub struct SessionDiscoveries {
    pub points: Vec<DiscoveredPoint>,
    pub touch_counts: std::collections::HashMap<PointId, u32>,
}

struct SessionSlot {
    active_mutation: Option<ActiveMutation>,
    discovered: DashMap<PointId, DiscoveredPoint>,
    touch_counts: DashMap<PointId, AtomicU32>,
    /// Points `check` has observed for the test currently running on
    /// each thread. Keyed by thread so that concurrently-running tests
    /// (§5/§8.5: "per test", not "per process") each fold into their own
    /// touch set instead of conflating into one. Drained once per test
    /// by the session engine so that a test touching the same point N
    /// times still counts as one touch.
    current_test_touches: DashMap<ThreadId, HashSet<PointId>>,
}

impl SessionSlot {
    fn new(active_mutation: Option<ActiveMutation>) -> Self {
        Self {
            active_mutation,
            discovered: DashMap::new(),
            touch_counts: DashMap::new(),
            current_test_touches: DashMap::new(),
        }
    }
}

/// The process-wide slot, guarding only session *acquisition and
/// release* — never held across a run. `check` clones the `Arc` out
/// from under a momentary lock and does the rest of its work lock-free,
/// so it never contends with a session-handle owner on the same thread.
static SLOT: OnceLock<Mutex<Option<Arc<SessionSlot>>>> = OnceLock::new();

fn slot() -> &'static Mutex<Option<Arc<SessionSlot>>> {
    SLOT.get_or_init(|| Mutex::new(None))
}

/// Handle to the currently held session, yielded to the closure passed
/// to [`with_session`] (or returned directly by [`begin_session`]).
/// Holds its own `Arc` to the session state rather than a lock guard on
/// [`SLOT`], so it never blocks a concurrent [`check`] call.
pub struct SessionHandle {
    inner: Arc<SessionSlot>,
}

impl SessionHandle {
    /// Mark the start of a new test: clears this thread's per-test touch
    /// set so the next drain reflects only this test's `check` calls.
    pub fn begin_test(&self) {
        self.inner.current_test_touches.insert(std::thread::current().id(), HashSet::new());
    }

    /// Drain the points `check` observed on this thread since the last
    /// `begin_test` and fold them into the session's touch counts (each
    /// point increments by exactly one, regardless of how many times it
    /// was hit).
    pub fn end_test(&self) {
        let tid = std::thread::current().id();
        let Some((_, touched)) = self.inner.current_test_touches.remove(&tid) else {
            return;
        };
        for point_id in touched {
            self.inner
                .touch_counts
                .entry(point_id)
                .or_insert_with(|| AtomicU32::new(0))
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn active_mutation(&self) -> Option<&ActiveMutation> {
        self.inner.active_mutation.as_ref()
    }

    fn snapshot(&self) -> SessionDiscoveries {
        let points = self
            .inner
            .discovered
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let touch_counts = self
            .inner
            .touch_counts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        SessionDiscoveries {
            points,
            touch_counts,
        }
    }
}

/// Record that `check` observed `point_id` for the test currently
/// running on this thread. Internal: called from [`check`] itself.
fn record_touch(inner: &SessionSlot, point_id: &str) {
    inner
        .current_test_touches
        .entry(std::thread::current().id())
        .or_default()
        .insert(point_id.to_string());
}

/// The call every injected dispatch branch makes. Idempotent for the
/// same `point_id` within a session: the first call registers the
/// discovered point with the given descriptive fields; later calls with
/// the same id are no-ops against the discovery map (the stored
/// `variant_count` is the first caller's). Returns the active variant
/// index for `point_id`, or `None` ("use original") outside a session,
/// when no mutation is active, or when a different point is active.
#[allow(clippy::too_many_arguments)]
pub fn check(
    point_id: &str,
    variant_count: u32,
    source_location: SourceLocation,
    original_operator: &str,
    variant_operators: &[&str],
    occurrence_on_line: u32,
) -> Option<u32> {
    // Lock only long enough to clone the Arc out; the rest of this call
    // touches the lock-free DashMaps inside it, so it never blocks on
    // (or is blocked by) a `with_session`/`begin_session` caller holding
    // the session open for the whole run.
    let inner = slot().lock().clone()?;
    let inner = &inner;

    record_touch(inner, point_id);

    inner.discovered.entry(point_id.to_string()).or_insert_with(|| DiscoveredPoint {
        point_id: point_id.to_string(),
        variant_count,
        source_location,
        original_operator: original_operator.to_string(),
        variant_operators: variant_operators.iter().map(|s| s.to_string()).collect(),
        occurrence_on_line,
    });

    match &inner.active_mutation {
        Some(active) if active.point_id == point_id => Some(active.variant_index),
        _ => None,
    }
}

/// Scoped acquisition of the global session slot. Blocks until any
/// previously held session is released. Returns the accumulated
/// discoveries on release, then clears the slot for the next session.
pub fn with_session<R>(
    active_mutation: Option<ActiveMutation>,
    f: impl FnOnce(&SessionHandle) -> R,
) -> (R, SessionDiscoveries) {
    let inner = Arc::new(SessionSlot::new(active_mutation));
    *slot().lock() = Some(inner.clone());
    let handle = SessionHandle { inner };
    let result = f(&handle);
    let discoveries = handle.snapshot();
    drop(handle);
    *slot().lock() = None;
    (result, discoveries)
}

/// Explicit (non-closure-scoped) acquisition of the global session slot,
/// for callers whose test invocations arrive as separate calls over time
/// rather than within one Rust closure (the session engine's `startRun`/
/// `endRun` pair, driven externally by a harness loop). The returned
/// handle owns an `Arc` to the session state rather than a lock guard,
/// so holding it across a run never blocks [`check`] — only a
/// concurrent `begin_session`/`with_session` swapping in a *new*
/// session briefly contends on [`SLOT`].
///
/// Pair with [`end_session`]; a session started here is visible to
/// `check` until `end_session` clears the slot.
pub fn begin_session(active_mutation: Option<ActiveMutation>) -> SessionHandle {
    let inner = Arc::new(SessionSlot::new(active_mutation));
    *slot().lock() = Some(inner.clone());
    SessionHandle { inner }
}

/// Release a handle acquired via [`begin_session`], returning the
/// accumulated discoveries and clearing the slot for the next session.
pub fn end_session(handle: SessionHandle) -> SessionDiscoveries {
    let discoveries = handle.snapshot();
    drop(handle);
    *slot().lock() = None;
    discoveries
}

/// Testing-only reset of the global registry, for test isolation across
/// `#[test]` functions that each exercise a fresh session.
#[doc(hidden)]
pub fn reset_for_test() {
    *slot().lock() = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation {
            file: "test.rs".into(),
            line,
        }
    }

    #[test]
    fn check_outside_session_returns_none() {
        reset_for_test();
        assert_eq!(check("p_0", 2, loc(1), ">", &[">=", "<"], 1), None);
    }

    #[test]
    fn check_discovers_point_once() {
        reset_for_test();
        let (_, discoveries) = with_session(None, |_handle| {
            check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
            check("p_0", 99, loc(1), ">", &[">=", "<"], 1);
        });
        assert_eq!(discoveries.points.len(), 1);
        assert_eq!(discoveries.points[0].variant_count, 2);
    }

    #[test]
    fn check_routes_to_active_variant() {
        reset_for_test();
        let active = ActiveMutation {
            point_id: "p_0".into(),
            variant_index: 1,
        };
        let (results, _) = with_session(Some(active), |_handle| {
            let a = check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
            let b = check("p_1", 2, loc(2), ">", &[">=", "<"], 1);
            (a, b)
        });
        assert_eq!(results, (Some(1), None));
    }

    #[test]
    fn touch_count_dedups_within_one_test() {
        reset_for_test();
        let (_, discoveries) = with_session(None, |handle| {
            handle.begin_test();
            check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
            check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
            handle.end_test();

            handle.begin_test();
            check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
            handle.end_test();
        });
        assert_eq!(discoveries.touch_counts.get("p_0"), Some(&2));
    }

    #[test]
    fn check_inside_begin_session_does_not_deadlock() {
        reset_for_test();
        let handle = begin_session(None);
        handle.begin_test();
        check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
        handle.end_test();
        let discoveries = end_session(handle);
        assert_eq!(discoveries.touch_counts.get("p_0"), Some(&1));
    }

    #[test]
    fn touches_on_distinct_threads_do_not_conflate() {
        reset_for_test();
        let handle = begin_session(None);
        let inner = &handle;
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    inner.begin_test();
                    check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
                    inner.end_test();
                });
            }
        });
        let discoveries = end_session(handle);
        assert_eq!(discoveries.touch_counts.get("p_0"), Some(&4));
    }

    #[test]
    fn session_state_does_not_persist_across_sessions() {
        reset_for_test();
        with_session(None, |_h| {
            check("p_0", 2, loc(1), ">", &[">=", "<"], 1);
        });
        let (_, discoveries) = with_session(None, |_h| {});
        assert!(discoveries.points.is_empty());
    }
}
