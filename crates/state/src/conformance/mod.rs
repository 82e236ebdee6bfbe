//! Backend checks for `WorldState` implementations.
//!
//! The ledger contract assumes a few things of every store: point writes are
//! read back byte for byte, range scans are ordered and half-open, scan
//! iterators can always be released, and a write set replays in order. The
//! suite exercises each of these against a fresh store per check:
//!
//! - `kv`: get, put, overwrite, delete, absent keys
//! - `range`: key order, bounds, unbounded scans, close, early close, drop
//! - `apply`: ordered replay, put-then-delete, deletes of existing keys
//!
//! ```ignore
//! use enginelife_state::conformance::run_conformance_suite;
//! use enginelife_state::MemoryWorldState;
//!
//! let report = run_conformance_suite(|| async { MemoryWorldState::new() }).await;
//! assert!(report.failed == 0, "{report}");
//! ```

mod apply;
mod kv;
mod range;

use std::fmt;
use std::future::Future;

use crate::{StateIterator, WorldState};

/// Outcome of one check against one store.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub category: &'static str,
    pub name: &'static str,
    pub passed: bool,
    /// Why the check failed; `None` when it passed.
    pub message: Option<String>,
}

impl TestResult {
    fn new(category: &'static str, name: &'static str, outcome: Result<(), String>) -> Self {
        let message = outcome.err();
        Self {
            category,
            name,
            passed: message.is_none(),
            message,
        }
    }
}

/// Every check from one suite run, with totals.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl ConformanceReport {
    fn from_results(results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            results,
            passed,
            failed: total - passed,
            total,
        }
    }

    /// The checks that did not pass, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.failures() {
            let why = r.message.as_deref().unwrap_or("");
            writeln!(f, "  {}::{} failed: {}", r.category, r.name, why)?;
        }
        Ok(())
    }
}

/// Run every check against stores built by `factory`, one store per check.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: WorldState,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = kv::run_kv_tests(&factory).await;
    results.extend(range::run_range_tests(&factory).await);
    results.extend(apply::run_apply_tests(&factory).await);
    ConformanceReport::from_results(results)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Put each `(key, value)` pair, mapping errors to strings.
async fn seed<S: WorldState>(s: &S, entries: &[(&str, &str)]) -> Result<(), String> {
    for (k, v) in entries {
        s.put(k, v.as_bytes().to_vec())
            .await
            .map_err(|e| format!("put {k}: {e}"))?;
    }
    Ok(())
}

/// Drain a scan into its keys, closing the iterator on every path.
async fn scan_keys<S: WorldState>(s: &S, start: &str, end: &str) -> Result<Vec<String>, String> {
    let mut iter = s
        .range_scan(start, end)
        .await
        .map_err(|e| format!("range_scan: {e}"))?;
    let mut keys = Vec::new();
    let drained = loop {
        match iter.next().await {
            Ok(Some(kv)) => keys.push(kv.key),
            Ok(None) => break Ok(()),
            Err(e) => break Err(format!("next: {e}")),
        }
    };
    iter.close().await.map_err(|e| format!("close: {e}"))?;
    drained.map(|()| keys)
}
