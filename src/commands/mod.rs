//! The `import`, `parse` and `export` command flows.
//!
//! Each flow takes its collaborators (executor, confirmer, cancellation token)
//! as arguments and returns what should be printed, so the binary only wires
//! them to the terminal.

pub mod export;
pub mod import;
pub mod parse;

use std::fmt::Write;

use lagoon_sync_core::{ApplyResult, Operation};

/// One operation description per line.
pub fn render_plan(plan: &[Operation]) -> String {
    let mut out = String::new();
    for operation in plan {
        let _ = writeln!(out, "{}", operation.description);
    }
    out
}

/// Human-readable summary of a run. Every failure is listed.
pub fn render_apply_result(result: &ApplyResult) -> String {
    let mut out = String::new();

    if !result.failed.is_empty() {
        let _ = writeln!(out, "Failed operations:");
        for failed in &result.failed {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                failed.index + 1,
                failed.description,
                failed.error
            );
        }
        let _ = writeln!(out);
    }

    if result.cancelled {
        let _ = writeln!(out, "Import cancelled.");
    }

    let _ = writeln!(
        out,
        "Summary: {} applied, {} failed, {} not attempted",
        result.applied,
        result.failed.len(),
        result.not_attempted
    );
    out
}
