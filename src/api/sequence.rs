//! Result ordering across rapid recalculations. Calculations themselves are
//! synchronous and run to completion; what needs guarding is the caller
//! applying a stale result after a newer one when edits arrive quickly.
//! Cancellation is realised by dropping the result, never by interrupting.

use crate::api::dto::{ExpeditionReport, ExpeditionRequest};
use crate::api::runner;
use crate::error_handling::CalcError;

/// Monotonic generation guard: results tagged with an older generation than
/// the newest applied one are dropped.
#[derive(Debug, Default)]
pub struct ResultSequencer {
    issued: u64,
    applied: u64,
}

/// A report tagged with the generation of the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedReport {
    pub generation: u64,
    pub report: ExpeditionReport,
}

impl ResultSequencer {
    pub fn new() -> ResultSequencer {
        ResultSequencer::default()
    }

    /// Reserve the next generation number for an incoming request.
    pub fn next_generation(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Run a calculation under a fresh generation.
    pub fn calculate(
        &mut self,
        request: &ExpeditionRequest,
    ) -> Result<SequencedReport, CalcError> {
        let generation = self.next_generation();
        let report = runner::calculate(request)?;
        Ok(SequencedReport { generation, report })
    }

    /// Accept a result only if nothing newer has been applied yet. Returns
    /// the report to render, or `None` when the result is stale.
    pub fn apply(&mut self, result: SequencedReport) -> Option<ExpeditionReport> {
        if result.generation <= self.applied {
            log::debug!(
                "dropping stale result: generation {} <= applied {}",
                result.generation,
                self.applied
            );
            return None;
        }
        self.applied = result.generation;
        Some(result.report)
    }
}
