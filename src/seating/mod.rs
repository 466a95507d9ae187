//! Multi-round table seating for pair tournaments.
//!
//! Pipeline: roster expansion + grid resolution -> visitation planning ->
//! exact solver with greedy fallback -> seat packing. Persistence of the
//! finished seating is the caller's concern.

mod error;
pub mod exact;
pub mod greedy;
pub mod grid;
pub mod roster;
pub mod slots;
pub mod types;
pub mod visitation;

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};

pub use error::{SeatingError, SolveError};
pub use types::{
    Assignment, GridCell, PairEntry, RoundSeating, ScheduleResult, SeatEntry, SeatingRequest,
    SolverKind, TableSeating, UserEntry, TABLE_CAPACITY,
};

use exact::ExactScheduler;
use greedy::GreedyScheduler;
use grid::{check_capacity, resolve_grid};
use roster::{expand_roster, parse_exclusions, separation_edges};
use slots::{pack_table, SeatPreferences};
use types::Roster;
use visitation::ideal_visits;

/// Default exact-solver budget when the request does not set one.
pub const DEFAULT_SOLVER_TIME_LIMIT_SECS: u64 = 30;

/// Everything a scheduling strategy needs for one run. Built fresh per
/// invocation; nothing here outlives the call.
pub struct SolveInput<'a> {
    pub roster: &'a Roster,
    pub num_tables: usize,
    pub num_rounds: usize,
    /// Normalized player-index edges that must never share a table.
    pub separations: &'a HashSet<(usize, usize)>,
    /// Per-table ideal visit counts.
    pub ideal: &'a [u32],
    pub master_seed: u64,
}

/// A scheduling strategy: produce per-round table memberships or report a
/// soft failure.
pub trait Scheduler {
    fn name(&self) -> &'static str;
    fn solve(&self, input: &SolveInput) -> Result<Assignment, SolveError>;
}

/// Runs the full seating pipeline for one request.
///
/// Validation failures surface before any scheduling work. The exact solver
/// is tried first; any of its soft failures silently hands control to the
/// greedy fallback. Only a greedy failure is fatal.
pub fn generate_seating(request: &SeatingRequest) -> Result<ScheduleResult, SeatingError> {
    let roster = expand_roster(&request.pairs, &request.users)?;
    if roster.pairs.is_empty() {
        return Err(SeatingError::Validation(
            "no approved pairs to seat".to_string(),
        ));
    }

    let shape = resolve_grid(&request.grid)?;
    check_capacity(&shape, roster.len())?;

    let exclusions = parse_exclusions(&request.exclusions_text, &roster);
    let separations = separation_edges(&roster, &exclusions);
    let ideal = ideal_visits(shape.num_rounds, shape.num_tables);
    let master_seed = request.master_seed.unwrap_or_else(rand::random);

    let input = SolveInput {
        roster: &roster,
        num_tables: shape.num_tables,
        num_rounds: shape.num_rounds,
        separations: &separations,
        ideal: &ideal,
        master_seed,
    };

    let time_limit = Duration::from_secs(
        request
            .solver_time_limit_secs
            .unwrap_or(DEFAULT_SOLVER_TIME_LIMIT_SECS),
    );
    let exact = ExactScheduler { time_limit };

    let exact_result = exact.solve(&input).and_then(|assignment| {
        verify_assignment(&assignment, &input).map_err(SolveError::Inconsistent)?;
        Ok(assignment)
    });

    let (assignment, solver) = match exact_result {
        Ok(assignment) => {
            info!(
                "seating produced by the {} solver (seed {})",
                exact.name(),
                master_seed
            );
            (assignment, SolverKind::Exact)
        }
        Err(err) => {
            warn!("exact solver unusable ({}); falling back", err);
            let fallback = GreedyScheduler;
            let assignment = fallback
                .solve(&input)
                .map_err(|e| SeatingError::Infeasible(e.to_string()))?;
            verify_assignment(&assignment, &input).map_err(SeatingError::Infeasible)?;
            info!(
                "seating produced by the {} fallback (seed {})",
                fallback.name(),
                master_seed
            );
            (assignment, SolverKind::Greedy)
        }
    };

    let prefs = SeatPreferences::new(&roster.players);
    let rounds = assignment
        .iter()
        .enumerate()
        .map(|(r, tables)| {
            let round = r as u32 + 1;
            RoundSeating {
                round,
                tables: tables
                    .iter()
                    .enumerate()
                    .map(|(t, members)| TableSeating {
                        table: t as u32,
                        game_id: shape.game_ids.get(&(round, t as u32)).cloned(),
                        seats: pack_table(
                            round,
                            t as u32,
                            members,
                            &roster.players,
                            &prefs,
                            master_seed,
                        ),
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(ScheduleResult {
        rounds,
        master_seed,
        solver,
        generated_at: Utc::now(),
    })
}

/// Checks the hard invariants of a raw assignment: every player at exactly
/// one table per round, no table over capacity, no separation edge inside a
/// table.
pub fn verify_assignment(assignment: &Assignment, input: &SolveInput) -> Result<(), String> {
    if assignment.len() != input.num_rounds {
        return Err(format!(
            "expected {} rounds, got {}",
            input.num_rounds,
            assignment.len()
        ));
    }

    for (r, tables) in assignment.iter().enumerate() {
        if tables.len() != input.num_tables {
            return Err(format!(
                "round {} has {} tables, expected {}",
                r + 1,
                tables.len(),
                input.num_tables
            ));
        }

        let mut seen = vec![false; input.roster.len()];
        for members in tables {
            if members.len() > TABLE_CAPACITY {
                return Err(format!(
                    "a table in round {} holds {} players, over capacity {}",
                    r + 1,
                    members.len(),
                    TABLE_CAPACITY
                ));
            }
            for (i, &p) in members.iter().enumerate() {
                if seen[p] {
                    return Err(format!(
                        "player {} assigned twice in round {}",
                        input.roster.players[p].id,
                        r + 1
                    ));
                }
                seen[p] = true;
                for &q in &members[i + 1..] {
                    if input.separations.contains(&(p.min(q), p.max(q))) {
                        return Err(format!(
                            "players {} and {} share a table in round {}",
                            input.roster.players[p].id,
                            input.roster.players[q].id,
                            r + 1
                        ));
                    }
                }
            }
        }

        if let Some(p) = seen.iter().position(|&s| !s) {
            return Err(format!(
                "player {} unassigned in round {}",
                input.roster.players[p].id,
                r + 1
            ));
        }
    }

    Ok(())
}
