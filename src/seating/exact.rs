use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::SolveError;
use super::types::{Assignment, TABLE_CAPACITY};
use super::visitation::visit_window;
use super::{Scheduler, SolveInput};

/// Exact solver for the 0/1 seating program: every player at exactly one
/// table per round, capacity and pair separation respected, per-table visit
/// counts inside the relaxed `[ideal-1, ideal+1]` window, minimizing total
/// |visits - ideal| deviation.
///
/// Solved by branch-and-bound over per-(pair, round) table choices. Any
/// feasible incumbent found before the deadline is accepted; running out of
/// budget without one is a soft failure that hands control to the greedy
/// fallback.
pub struct ExactScheduler {
    pub time_limit: Duration,
}

impl Scheduler for ExactScheduler {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn solve(&self, input: &SolveInput) -> Result<Assignment, SolveError> {
        if self.time_limit.is_zero() {
            return Err(SolveError::Unavailable(
                "exact solver disabled (time limit is zero)".to_string(),
            ));
        }

        let windows: Vec<(u32, u32)> = input
            .ideal
            .iter()
            .map(|&ideal| visit_window(ideal, input.num_rounds))
            .collect();

        let mut search = Search {
            input,
            windows,
            deadline: Instant::now() + self.time_limit,
            rng: StdRng::seed_from_u64(input.master_seed ^ 0x9e37_79b9_7f4a_7c15),
            nodes: 0,
            timed_out: false,
            best_cost: u64::MAX,
            best: None,
            visits: vec![vec![0u32; input.num_tables]; input.roster.len()],
            overflow: 0,
            rounds: Vec::with_capacity(input.num_rounds),
        };
        search.dfs(0, 0);

        debug!(
            "exact search: {} nodes, best cost {:?}, timed out: {}",
            search.nodes,
            (search.best_cost != u64::MAX).then_some(search.best_cost),
            search.timed_out
        );

        match search.best {
            Some(assignment) => Ok(assignment),
            None if search.timed_out => Err(SolveError::Timeout),
            None => Err(SolveError::Infeasible(
                "no assignment satisfies the visitation windows".to_string(),
            )),
        }
    }
}

struct Search<'a> {
    input: &'a SolveInput<'a>,
    /// Per-table `[min, max]` visit window (hard constraint 4).
    windows: Vec<(u32, u32)>,
    deadline: Instant,
    rng: StdRng,
    nodes: u64,
    timed_out: bool,
    best_cost: u64,
    best: Option<Assignment>,
    /// visits[p][t] under the current partial assignment.
    visits: Vec<Vec<u32>>,
    /// Count of assignments beyond a table's ideal; a monotone lower bound
    /// on the final deviation cost of any completion.
    overflow: u64,
    rounds: Assignment,
}

impl Search<'_> {
    /// Explores one decision node: pair `k` of round `round`. Returns false
    /// when the whole search must stop (deadline hit or optimum proven).
    fn dfs(&mut self, round: usize, k: usize) -> bool {
        self.nodes += 1;
        if self.nodes & 0x3ff == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
            return false;
        }

        if round == self.input.num_rounds {
            let cost = self.total_cost();
            if cost < self.best_cost {
                self.best_cost = cost;
                self.best = Some(self.rounds.clone());
            }
            // A zero-deviation schedule cannot be improved on.
            return self.best_cost > 0;
        }

        // Deviation already locked in; nothing below can beat the incumbent.
        if self.overflow >= self.best_cost {
            return true;
        }

        if k == 0 {
            self.rounds
                .push(vec![Vec::new(); self.input.num_tables]);
        }

        let pair = &self.input.roster.pairs[k];
        let (a, b) = (pair.member_a, pair.member_b);
        let combos = self.candidate_moves(round, a, b);

        for (table_a, table_b) in combos {
            self.place(round, a, table_a);
            self.place(round, b, table_b);

            let keep_going = if k + 1 == self.input.roster.pairs.len() {
                self.dfs(round + 1, 0)
            } else {
                self.dfs(round, k + 1)
            };

            self.unplace(round, b, table_b);
            self.unplace(round, a, table_a);

            if !keep_going {
                if k == 0 {
                    self.rounds.pop();
                }
                return false;
            }
        }

        if k == 0 {
            self.rounds.pop();
        }
        true
    }

    /// Feasible (table_a, table_b) moves for the pair, best first: prefer
    /// under-visited tables, then lighter current loads, ties broken by the
    /// seeded shuffle so distinct master seeds explore distinct optima.
    fn candidate_moves(&mut self, round: usize, a: usize, b: usize) -> Vec<(usize, usize)> {
        let num_tables = self.input.num_tables;
        let remaining_rounds = (self.input.num_rounds - round - 1) as u32;

        let mut combos: Vec<(usize, usize)> = Vec::new();
        for table_a in 0..num_tables {
            if !self.admissible(round, a, table_a, remaining_rounds) {
                continue;
            }
            for table_b in 0..num_tables {
                if table_b == table_a {
                    continue;
                }
                if self.admissible(round, b, table_b, remaining_rounds) {
                    combos.push((table_a, table_b));
                }
            }
        }

        combos.shuffle(&mut self.rng);
        combos.sort_by_key(|&(ta, tb)| {
            let visit_score = self.visits[a][ta] + self.visits[b][tb];
            let load_score = self.rounds[round][ta].len() + self.rounds[round][tb].len();
            (visit_score, load_score)
        });
        combos
    }

    /// Whether player `p` may join `table` this round: capacity, separation,
    /// window max, and enough rounds left to still meet every window min.
    fn admissible(&self, round: usize, p: usize, table: usize, remaining_rounds: u32) -> bool {
        let members = &self.rounds[round][table];
        if members.len() >= TABLE_CAPACITY {
            return false;
        }
        if self.visits[p][table] >= self.windows[table].1 {
            return false;
        }
        if members.iter().any(|&other| {
            self.input
                .separations
                .contains(&(p.min(other), p.max(other)))
        }) {
            return false;
        }

        // Deficit lookahead: after taking this table, the remaining window
        // minimums must still fit into the remaining rounds.
        let mut deficit = 0u32;
        for t in 0..self.input.num_tables {
            let after = self.visits[p][t] + u32::from(t == table);
            deficit += self.windows[t].0.saturating_sub(after);
        }
        deficit <= remaining_rounds
    }

    fn place(&mut self, round: usize, p: usize, table: usize) {
        if self.visits[p][table] >= self.input.ideal[table] {
            self.overflow += 1;
        }
        self.visits[p][table] += 1;
        self.rounds[round][table].push(p);
    }

    fn unplace(&mut self, round: usize, p: usize, table: usize) {
        self.rounds[round][table].pop();
        self.visits[p][table] -= 1;
        if self.visits[p][table] >= self.input.ideal[table] {
            self.overflow -= 1;
        }
    }

    fn total_cost(&self) -> u64 {
        let mut cost = 0u64;
        for per_table in &self.visits {
            for (t, &v) in per_table.iter().enumerate() {
                cost += u64::from(v.abs_diff(self.input.ideal[t]));
            }
        }
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::roster::{expand_roster, separation_edges};
    use crate::seating::test_support::{make_pairs, make_users};
    use crate::seating::types::Roster;
    use crate::seating::verify_assignment;
    use crate::seating::visitation::ideal_visits;

    fn roster_of(pairs: usize) -> Roster {
        let users = make_users(pairs * 2);
        let entries = make_pairs(&users);
        expand_roster(&entries, &users).unwrap()
    }

    fn visits_of(assignment: &Assignment, players: usize, tables: usize) -> Vec<Vec<u32>> {
        let mut visits = vec![vec![0u32; tables]; players];
        for round in assignment {
            for (t, members) in round.iter().enumerate() {
                for &p in members {
                    visits[p][t] += 1;
                }
            }
        }
        visits
    }

    #[test]
    fn solves_small_instance_within_windows() {
        let roster = roster_of(6);
        let separations = separation_edges(&roster, &Default::default());
        let ideal = ideal_visits(3, 2);
        let input = SolveInput {
            roster: &roster,
            num_tables: 2,
            num_rounds: 3,
            separations: &separations,
            ideal: &ideal,
            master_seed: 11,
        };

        let scheduler = ExactScheduler {
            time_limit: Duration::from_secs(10),
        };
        let assignment = scheduler.solve(&input).unwrap();
        verify_assignment(&assignment, &input).unwrap();

        let visits = visits_of(&assignment, roster.len(), 2);
        for per_table in &visits {
            for (t, &v) in per_table.iter().enumerate() {
                let (min, max) = visit_window(ideal[t], 3);
                assert!(
                    v >= min && v <= max,
                    "visit count {} outside window [{}, {}] for table {}",
                    v,
                    min,
                    max,
                    t
                );
            }
        }
    }

    #[test]
    fn zero_time_limit_reports_unavailable() {
        let roster = roster_of(2);
        let separations = separation_edges(&roster, &Default::default());
        let ideal = ideal_visits(2, 2);
        let input = SolveInput {
            roster: &roster,
            num_tables: 2,
            num_rounds: 2,
            separations: &separations,
            ideal: &ideal,
            master_seed: 1,
        };

        let scheduler = ExactScheduler {
            time_limit: Duration::ZERO,
        };
        assert!(matches!(
            scheduler.solve(&input),
            Err(SolveError::Unavailable(_))
        ));
    }

    #[test]
    fn honors_exclusions() {
        let roster = roster_of(3);
        let a = roster.pairs[0].member_a;
        let b = roster.pairs[1].member_b;
        let mut exclusions = std::collections::HashSet::new();
        exclusions.insert((a.min(b), a.max(b)));
        let separations = separation_edges(&roster, &exclusions);
        let ideal = ideal_visits(4, 3);
        let input = SolveInput {
            roster: &roster,
            num_tables: 3,
            num_rounds: 4,
            separations: &separations,
            ideal: &ideal,
            master_seed: 3,
        };

        let scheduler = ExactScheduler {
            time_limit: Duration::from_secs(5),
        };
        let assignment = scheduler.solve(&input).unwrap();
        verify_assignment(&assignment, &input).unwrap();
        for round in &assignment {
            for members in round {
                assert!(!(members.contains(&a) && members.contains(&b)));
            }
        }
    }
}
