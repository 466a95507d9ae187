use std::collections::HashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of seats at a single table in one round.
pub const TABLE_CAPACITY: usize = 10;

/// One tournament entrant, expanded from an approved pair.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub nickname: String,
    pub pair_id: String,
}

/// An approved team of exactly two players.
#[derive(Debug, Clone)]
pub struct Pair {
    pub id: String,
    /// Indices into `Roster::players`.
    pub member_a: usize,
    pub member_b: usize,
}

/// The expanded roster for one scheduling run.
#[derive(Debug, Clone)]
pub struct Roster {
    pub players: Vec<Player>,
    pub pairs: Vec<Pair>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Table/round dimensions recovered from the pre-existing grid, plus the
/// (round, table) -> game record id map for the result writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridShape {
    pub num_tables: usize,
    pub num_rounds: usize,
    /// Keyed by (1-based round, 0-based table).
    pub game_ids: HashMap<(u32, u32), String>,
}

/// Table memberships for one round: `tables[t]` holds player indices.
pub type RoundTables = Vec<Vec<usize>>;

/// Full assignment across rounds: `rounds[r][t]` holds player indices.
pub type Assignment = Vec<RoundTables>;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// An approved pair as received from the registration collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairEntry {
    pub pair_id: String,
    pub members: Vec<String>,
}

/// A user directory entry (nickname -> id resolution).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub nickname: String,
}

/// One cell of the pre-existing round x table grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub game_id: String,
    /// 1-based round label, when the grid carries one.
    pub round: Option<u32>,
    /// 0-based table index.
    pub table: u32,
}

/// A full seating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatingRequest {
    pub pairs: Vec<PairEntry>,
    pub users: Vec<UserEntry>,
    pub grid: Vec<GridCell>,
    /// Newline-separated "nickA, nickB" lines.
    #[serde(default)]
    pub exclusions_text: String,
    /// Omit for a fresh random seed per invocation.
    #[serde(default)]
    pub master_seed: Option<u64>,
    /// Omit for the default budget; 0 disables the exact solver.
    #[serde(default)]
    pub solver_time_limit_secs: Option<u64>,
}

/// Which scheduling strategy produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Exact,
    Greedy,
}

/// One seat cell: a real player or a placeholder, with reset scoring fields
/// for the downstream scoring subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatEntry {
    /// 1-based seat number.
    pub seat: u32,
    pub player_id: String,
    pub nickname: String,
    pub is_placeholder: bool,
    pub role: String,
    pub bonus_points: f64,
}

/// One table within a round: exactly `TABLE_CAPACITY` seat entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSeating {
    /// 0-based table index.
    pub table: u32,
    /// Game record id of the originating grid cell, when known.
    pub game_id: Option<String>,
    pub seats: Vec<SeatEntry>,
}

/// One round of the seating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSeating {
    /// 1-based round number.
    pub round: u32,
    pub tables: Vec<TableSeating>,
}

/// The complete seating handed to the result writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub rounds: Vec<RoundSeating>,
    pub master_seed: u64,
    pub solver: SolverKind,
    pub generated_at: DateTime<Utc>,
}
