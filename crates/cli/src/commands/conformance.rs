use std::sync::atomic::{AtomicUsize, Ordering};

use enginelife_state::conformance::{run_conformance_suite, TestResult};
use enginelife_state::{FileWorldState, MemoryWorldState};
use serde_json::json;

use crate::OutputFormat;

/// Run the world state conformance suite against the memory backend and a
/// file backend in a scratch directory.
pub(crate) async fn cmd_conformance(output: OutputFormat, quiet: bool) -> Result<(), String> {
    let memory = run_conformance_suite(|| async { MemoryWorldState::new() }).await;

    let scratch = tempfile::tempdir().map_err(|e| format!("cannot create scratch dir: {e}"))?;
    let counter = AtomicUsize::new(0);
    let file = run_conformance_suite(|| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        let path = scratch.path().join(format!("state-{n}.json"));
        async move { FileWorldState::fresh(path) }
    })
    .await;

    let reports = [("memory", &memory), ("file", &file)];
    match output {
        OutputFormat::Json => {
            let doc: Vec<_> = reports
                .iter()
                .map(|(backend, r)| {
                    json!({
                        "backend": backend,
                        "passed": r.passed,
                        "failed": r.failed,
                        "total": r.total,
                        "failures": r.failures().map(failure_json).collect::<Vec<_>>(),
                    })
                })
                .collect();
            let pretty = serde_json::to_string_pretty(&doc)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet {
                for (backend, report) in &reports {
                    print!("[{}] {}", backend, report);
                }
            }
        }
    }

    let failed: usize = reports.iter().map(|(_, r)| r.failed).sum();
    if failed > 0 {
        return Err(format!("{failed} conformance check(s) failed"));
    }
    Ok(())
}

fn failure_json(t: &TestResult) -> serde_json::Value {
    json!({
        "category": t.category,
        "name": t.name,
        "message": t.message,
    })
}
