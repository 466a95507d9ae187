use std::collections::{HashMap, HashSet};

use super::error::SeatingError;
use super::types::{GridCell, GridShape, TABLE_CAPACITY};

/// Derives `(num_tables, num_rounds)` from the pre-existing round x table
/// grid. The grid only teaches us the dimensions and which game record backs
/// each cell; it never drives assignment logic.
///
/// When every cell carries a round label the round count is the number of
/// distinct labels; the labels only order the rounds and are ranked into
/// `1..=R`, so a setup step that numbered its games 2, 3, ... still binds
/// every output round to its game record. Otherwise the cell count must
/// divide evenly by the table count, and the quotient is used.
pub fn resolve_grid(cells: &[GridCell]) -> Result<GridShape, SeatingError> {
    if cells.is_empty() {
        return Err(SeatingError::Validation(
            "the round/table grid is empty; run game setup first".to_string(),
        ));
    }

    let tables: HashSet<u32> = cells.iter().map(|c| c.table).collect();
    let num_tables = tables.len();
    if num_tables < 2 {
        return Err(SeatingError::Validation(format!(
            "at least 2 tables are required to separate pairs, found {}",
            num_tables
        )));
    }

    let all_labeled = cells.iter().all(|c| c.round.is_some());

    let mut game_ids: HashMap<(u32, u32), String> = HashMap::new();
    let num_rounds = if all_labeled {
        // Rank the distinct labels into 1..=R before keying game records,
        // matching the 1-based round numbers the result carries.
        let mut labels: Vec<u32> = cells.iter().filter_map(|c| c.round).collect();
        labels.sort_unstable();
        labels.dedup();
        let rank: HashMap<u32, u32> = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| (label, i as u32 + 1))
            .collect();

        for cell in cells {
            let label = cell.round.unwrap_or(0);
            let round = rank.get(&label).copied().unwrap_or(0);
            let prev = game_ids.insert((round, cell.table), cell.game_id.clone());
            if prev.is_some() {
                return Err(SeatingError::Validation(format!(
                    "duplicate grid cell for round {} at table {}; game setup misfired",
                    label, cell.table
                )));
            }
        }
        labels.len()
    } else if cells.len() % num_tables == 0 {
        // Unlabeled grids are assigned rounds in cell order, one full set of
        // tables per round.
        let mut seen_per_table: HashMap<u32, u32> = HashMap::new();
        for cell in cells {
            let counter = seen_per_table.entry(cell.table).or_insert(0);
            *counter += 1;
            game_ids.insert((*counter, cell.table), cell.game_id.clone());
        }
        cells.len() / num_tables
    } else {
        return Err(SeatingError::Validation(format!(
            "round count is ambiguous: {} cells do not divide evenly across {} tables",
            cells.len(),
            num_tables
        )));
    };

    Ok(GridShape {
        num_tables,
        num_rounds,
        game_ids,
    })
}

/// Rejects rosters that cannot physically fit the grid.
pub fn check_capacity(shape: &GridShape, num_players: usize) -> Result<(), SeatingError> {
    let seats = shape.num_tables * TABLE_CAPACITY;
    if num_players > seats {
        return Err(SeatingError::Validation(format!(
            "{} players exceed {} tables x {} seats = {} available seats",
            num_players, shape.num_tables, TABLE_CAPACITY, seats
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(game_id: &str, round: Option<u32>, table: u32) -> GridCell {
        GridCell {
            game_id: game_id.to_string(),
            round,
            table,
        }
    }

    fn labeled_grid(rounds: u32, tables: u32) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for r in 1..=rounds {
            for t in 0..tables {
                cells.push(cell(&format!("g-{}-{}", r, t), Some(r), t));
            }
        }
        cells
    }

    #[test]
    fn resolves_labeled_grid() {
        let shape = resolve_grid(&labeled_grid(3, 2)).unwrap();
        assert_eq!(shape.num_tables, 2);
        assert_eq!(shape.num_rounds, 3);
        assert_eq!(shape.game_ids.get(&(2, 1)).unwrap(), "g-2-1");
    }

    #[test]
    fn falls_back_to_division_without_labels() {
        let mut cells = Vec::new();
        for r in 0..4 {
            for t in 0..3 {
                cells.push(cell(&format!("g{}{}", r, t), None, t));
            }
        }

        let shape = resolve_grid(&cells).unwrap();
        assert_eq!(shape.num_tables, 3);
        assert_eq!(shape.num_rounds, 4);
        // Cell order determines round numbering for unlabeled grids.
        assert_eq!(shape.game_ids.get(&(1, 0)).unwrap(), "g00");
        assert_eq!(shape.game_ids.get(&(4, 2)).unwrap(), "g32");
    }

    #[test]
    fn ranks_noncontiguous_round_labels() {
        // Setup numbered its games 2 and 3; the seating still runs rounds
        // 1 and 2, each bound to the right game record.
        let cells = vec![
            cell("g-2-0", Some(2), 0),
            cell("g-2-1", Some(2), 1),
            cell("g-3-0", Some(3), 0),
            cell("g-3-1", Some(3), 1),
        ];

        let shape = resolve_grid(&cells).unwrap();
        assert_eq!(shape.num_rounds, 2);
        assert_eq!(shape.game_ids.get(&(1, 0)).unwrap(), "g-2-0");
        assert_eq!(shape.game_ids.get(&(2, 1)).unwrap(), "g-3-1");
        assert!(shape.game_ids.get(&(3, 0)).is_none());
    }

    #[test]
    fn rejects_duplicate_grid_cell() {
        let cells = vec![
            cell("a", Some(1), 0),
            cell("b", Some(1), 1),
            cell("c", Some(1), 0),
        ];
        let err = resolve_grid(&cells).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_ambiguous_round_count() {
        let cells = vec![
            cell("a", None, 0),
            cell("b", None, 1),
            cell("c", None, 0),
        ];
        let err = resolve_grid(&cells).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn rejects_single_table() {
        let cells = vec![cell("a", Some(1), 0), cell("b", Some(2), 0)];
        let err = resolve_grid(&cells).unwrap_err();
        assert!(err.to_string().contains("2 tables"));
    }

    #[test]
    fn rejects_overfull_roster() {
        let shape = resolve_grid(&labeled_grid(1, 2)).unwrap();
        // 25 pairs on 2 tables: 50 players > 20 seats.
        let err = check_capacity(&shape, 50).unwrap_err();
        assert!(err.to_string().contains("exceed"));
        assert!(check_capacity(&shape, 20).is_ok());
    }

    #[test]
    fn resolution_is_idempotent() {
        let cells = labeled_grid(5, 6);
        let first = resolve_grid(&cells).unwrap();
        let second = resolve_grid(&cells).unwrap();
        assert_eq!(first, second);
    }
}
