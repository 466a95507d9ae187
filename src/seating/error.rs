use thiserror::Error;

/// Fatal failures surfaced to the caller. No partial seating is ever
/// produced alongside one of these.
#[derive(Debug, Error)]
pub enum SeatingError {
    /// Malformed or infeasible input, rejected before any scheduling work.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Neither solver produced a valid full assignment.
    #[error("cannot produce a valid seating: {0}")]
    Infeasible(String),
}

/// Soft failures of a single solve attempt. The orchestrator falls through
/// to the greedy path on any of these; only a greedy `Infeasible` becomes
/// fatal.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The solver is switched off (time limit of zero).
    #[error("solver unavailable: {0}")]
    Unavailable(String),

    /// The time budget ran out without a feasible incumbent.
    #[error("solver timed out without a feasible solution")]
    Timeout,

    /// The search space was exhausted without a feasible solution.
    #[error("no feasible assignment: {0}")]
    Infeasible(String),

    /// The solver returned an assignment that fails verification.
    #[error("solver produced an inconsistent assignment: {0}")]
    Inconsistent(String),
}
