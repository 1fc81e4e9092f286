pub mod deps;
pub mod metadata;
pub mod versions;

use crate::core::error::{PpvError, Result};

/// Upper bound on in-flight index requests when several packages are
/// queried in one invocation.
pub(crate) const FETCH_CONCURRENCY: usize = 4;

/// Folds per-package failures into the command result. A single-package
/// invocation surfaces its error directly; a multi-package one has
/// already reported each failure to stderr and ends with a summary
/// carrying the most severe exit code.
pub(crate) fn finish(total: usize, failures: Vec<PpvError>) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    if total == 1 {
        let mut failures = failures;
        return Err(failures.remove(0));
    }

    let code = failures.iter().map(PpvError::exit_code).max().unwrap_or(1);
    Err(PpvError::Partial {
        failed: failures.len(),
        total,
        code,
    })
}
