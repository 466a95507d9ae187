use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::types::{Player, SeatEntry, TABLE_CAPACITY};

/// Role and bonus every seat starts with; the scoring subsystem overwrites
/// these later.
const DEFAULT_ROLE: &str = "citizen";

/// Per-player seat-preference permutations, computed once per scheduling run
/// and cycled round by round.
///
/// Each permutation is seeded by an fxhash of the player id, so a player's
/// preferred seats survive process restarts (the default hasher does not).
pub struct SeatPreferences {
    perms: Vec<Vec<usize>>,
}

impl SeatPreferences {
    pub fn new(players: &[Player]) -> Self {
        let perms = players
            .iter()
            .map(|player| {
                let mut perm: Vec<usize> = (0..TABLE_CAPACITY).collect();
                let mut rng = StdRng::seed_from_u64(fxhash::hash64(player.id.as_str()));
                perm.shuffle(&mut rng);
                perm
            })
            .collect();
        Self { perms }
    }

    /// The player's preferred 0-based seat for a 1-based round.
    fn preferred(&self, player_idx: usize, round: u32) -> usize {
        self.perms[player_idx][(round as usize).wrapping_sub(1) % TABLE_CAPACITY]
    }
}

/// Converts one table's unordered membership into a dense array of exactly
/// `TABLE_CAPACITY` numbered seats.
///
/// The membership order is shuffled with a round+table scoped seed for
/// fairness, each player's preferred seat is probed with wrap-around, and
/// leftover seats become placeholders named from their coordinates.
pub fn pack_table(
    round: u32,
    table: u32,
    members: &[usize],
    players: &[Player],
    prefs: &SeatPreferences,
    master_seed: u64,
) -> Vec<SeatEntry> {
    let mut members: Vec<usize> = members.to_vec();
    if members.len() > TABLE_CAPACITY {
        // Upstream bug guard: keep the first `capacity` placements.
        warn!(
            "table {} in round {} holds {} players, over capacity {}; truncating",
            table,
            round,
            members.len(),
            TABLE_CAPACITY
        );
        members.truncate(TABLE_CAPACITY);
    }

    let seed = master_seed
        .wrapping_add(u64::from(round).wrapping_mul(100))
        .wrapping_add(u64::from(table));
    let mut rng = StdRng::seed_from_u64(seed);
    members.shuffle(&mut rng);

    let mut occupied: Vec<Option<usize>> = vec![None; TABLE_CAPACITY];
    for &player_idx in &members {
        let preferred = prefs.preferred(player_idx, round);
        // Linear probe forward from the preferred seat, wrapping; guaranteed
        // to land because membership size <= capacity.
        for offset in 0..TABLE_CAPACITY {
            let seat = (preferred + offset) % TABLE_CAPACITY;
            if occupied[seat].is_none() {
                occupied[seat] = Some(player_idx);
                break;
            }
        }
    }

    occupied
        .into_iter()
        .enumerate()
        .map(|(seat_idx, slot)| {
            let seat = seat_idx as u32 + 1;
            match slot {
                Some(player_idx) => SeatEntry {
                    seat,
                    player_id: players[player_idx].id.clone(),
                    nickname: players[player_idx].nickname.clone(),
                    is_placeholder: false,
                    role: DEFAULT_ROLE.to_string(),
                    bonus_points: 0.0,
                },
                None => SeatEntry {
                    seat,
                    player_id: format!("empty-r{}-t{}-s{}", round, table, seat),
                    nickname: "Empty".to_string(),
                    is_placeholder: true,
                    role: DEFAULT_ROLE.to_string(),
                    bonus_points: 0.0,
                },
            }
        })
        .collect()
}
