use std::collections::HashSet;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::SolveError;
use super::types::{Assignment, RoundTables, TABLE_CAPACITY};
use super::{Scheduler, SolveInput};

/// Round-by-round constructive fallback. Deterministic for a given master
/// seed: each round shuffles the pair processing order with its own RNG
/// (`master_seed + round_index`), then places both members of each pair at
/// the best available tables, backtracking on the first member's choice when
/// it would strand the second.
pub struct GreedyScheduler;

impl Scheduler for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, input: &SolveInput) -> Result<Assignment, SolveError> {
        let num_players = input.roster.len();
        // visits[p][t]: how often player p has sat at table t so far.
        let mut visits = vec![vec![0u32; input.num_tables]; num_players];
        let mut rounds: Assignment = Vec::with_capacity(input.num_rounds);

        for round in 0..input.num_rounds {
            let mut rng = StdRng::seed_from_u64(input.master_seed.wrapping_add(round as u64));

            let mut order: Vec<usize> = (0..input.roster.pairs.len()).collect();
            order.shuffle(&mut rng);

            let mut tables: RoundTables = vec![Vec::new(); input.num_tables];

            for &pair_idx in &order {
                let pair = &input.roster.pairs[pair_idx];
                let chosen = choose_tables_for_pair(
                    pair.member_a,
                    pair.member_b,
                    &tables,
                    &visits,
                    input.separations,
                    &mut rng,
                );

                let (table_a, table_b) = chosen.ok_or_else(|| {
                    SolveError::Infeasible(format!(
                        "cannot separate pair {} in round {}",
                        pair.id,
                        round + 1
                    ))
                })?;

                tables[table_a].push(pair.member_a);
                tables[table_b].push(pair.member_b);
                visits[pair.member_a][table_a] += 1;
                visits[pair.member_b][table_b] += 1;
            }

            debug!(
                "greedy round {}: table loads {:?}",
                round + 1,
                tables.iter().map(Vec::len).collect::<Vec<_>>()
            );
            rounds.push(tables);
        }

        Ok(rounds)
    }
}

/// Tables player `p` could join right now, best first: remaining capacity,
/// no separation conflict with current members, preferring tables visited
/// fewest times so far, tie-broken by current round load, then randomly.
fn candidate_tables(
    player: usize,
    forbidden: Option<usize>,
    tables: &RoundTables,
    visits: &[Vec<u32>],
    separations: &HashSet<(usize, usize)>,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..tables.len())
        .filter(|&t| Some(t) != forbidden)
        .filter(|&t| tables[t].len() < TABLE_CAPACITY)
        .filter(|&t| {
            tables[t]
                .iter()
                .all(|&other| !separated(player, other, separations))
        })
        .collect();

    // Shuffle before the stable sort so equal scores break randomly.
    candidates.shuffle(rng);
    candidates.sort_by_key(|&t| (visits[player][t], tables[t].len()));
    candidates
}

fn separated(a: usize, b: usize, separations: &HashSet<(usize, usize)>) -> bool {
    separations.contains(&(a.min(b), a.max(b)))
}

/// Joint placement for one pair, computed before any mutation: take the
/// first table choice for `a` that leaves a valid table for `b`. The first
/// iteration is `a`'s best candidate; later iterations are the backtrack.
fn choose_tables_for_pair(
    a: usize,
    b: usize,
    tables: &RoundTables,
    visits: &[Vec<u32>],
    separations: &HashSet<(usize, usize)>,
    rng: &mut StdRng,
) -> Option<(usize, usize)> {
    for table_a in candidate_tables(a, None, tables, visits, separations, rng) {
        let for_b = candidate_tables(b, Some(table_a), tables, visits, separations, rng);
        if let Some(&table_b) = for_b.first() {
            return Some((table_a, table_b));
        }
    }
    None
}
