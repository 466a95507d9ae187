use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::SeatingError;
use super::types::{Pair, PairEntry, Player, Roster, UserEntry};

/// Expands approved pairs into a flat player list with a pair lookup.
///
/// Fails when a pair does not have exactly two members, when a member id is
/// not present in the user directory, or when a player appears in more than
/// one pair.
pub fn expand_roster(pairs: &[PairEntry], users: &[UserEntry]) -> Result<Roster, SeatingError> {
    let directory: HashMap<&str, &UserEntry> =
        users.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut players: Vec<Player> = Vec::with_capacity(pairs.len() * 2);
    let mut expanded: Vec<Pair> = Vec::with_capacity(pairs.len());
    let mut seen: HashMap<String, String> = HashMap::new(); // player id -> pair id

    for entry in pairs {
        if entry.members.len() != 2 {
            return Err(SeatingError::Validation(format!(
                "pair {} has {} members, expected exactly 2",
                entry.pair_id,
                entry.members.len()
            )));
        }

        let mut indices = [0usize; 2];
        for (slot, member_id) in entry.members.iter().enumerate() {
            let user = directory.get(member_id.as_str()).ok_or_else(|| {
                SeatingError::Validation(format!(
                    "pair {} member {} does not match any known user",
                    entry.pair_id, member_id
                ))
            })?;

            if let Some(other_pair) = seen.get(member_id) {
                return Err(SeatingError::Validation(format!(
                    "player {} appears in both pair {} and pair {}",
                    member_id, other_pair, entry.pair_id
                )));
            }
            seen.insert(member_id.clone(), entry.pair_id.clone());

            indices[slot] = players.len();
            players.push(Player {
                id: user.id.clone(),
                nickname: user.nickname.clone(),
                pair_id: entry.pair_id.clone(),
            });
        }

        expanded.push(Pair {
            id: entry.pair_id.clone(),
            member_a: indices[0],
            member_b: indices[1],
        });
    }

    Ok(Roster {
        players,
        pairs: expanded,
    })
}

/// Parses the free-text exclusion list ("nickA, nickB" per line) into a set
/// of player index pairs, normalized so the smaller index comes first.
///
/// Lines that do not contain exactly two names, and nicknames that do not
/// resolve to a rostered player, are dropped silently.
pub fn parse_exclusions(text: &str, roster: &Roster) -> HashSet<(usize, usize)> {
    let by_nickname: HashMap<&str, usize> = roster
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| (p.nickname.as_str(), i))
        .collect();

    let mut exclusions = HashSet::new();

    for line in text.lines() {
        let names: Vec<&str> = line.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        if names.len() != 2 {
            if !line.trim().is_empty() {
                debug!("skipping malformed exclusion line: {:?}", line);
            }
            continue;
        }

        match (by_nickname.get(names[0]), by_nickname.get(names[1])) {
            (Some(&a), Some(&b)) if a != b => {
                exclusions.insert((a.min(b), a.max(b)));
            }
            _ => {
                debug!("dropping unresolved exclusion entry: {:?}", line);
            }
        }
    }

    exclusions
}

/// The full separation set: pair partners plus operator exclusions. No table
/// may hold both endpoints of any of these edges in the same round.
pub fn separation_edges(
    roster: &Roster,
    exclusions: &HashSet<(usize, usize)>,
) -> HashSet<(usize, usize)> {
    let mut edges = exclusions.clone();
    for pair in &roster.pairs {
        let (a, b) = (pair.member_a, pair.member_b);
        edges.insert((a.min(b), a.max(b)));
    }
    edges
}
