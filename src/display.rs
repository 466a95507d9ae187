use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::seating::ScheduleResult;

/// Prints the full seating, round by round, table by table.
pub fn print_seating(result: &ScheduleResult) {
    println!(
        "\n=== Seating (solver: {:?}, seed: {}) ===",
        result.solver, result.master_seed
    );

    for round in &result.rounds {
        println!("\nRound {}:", round.round);
        for table in &round.tables {
            let game = table.game_id.as_deref().unwrap_or("-");
            println!("  Table {} (game {}):", table.table, game);
            for seat in &table.seats {
                if seat.is_placeholder {
                    println!("    Seat {:2} -> [EMPTY]", seat.seat);
                } else {
                    println!(
                        "    Seat {:2} -> {} (ID: {})",
                        seat.seat, seat.nickname, seat.player_id
                    );
                }
            }
        }
    }
}

/// Writes the seating to a CSV file, one row per seat cell.
pub fn write_seating_csv<P: AsRef<Path>>(
    result: &ScheduleResult,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    write_seating(result, file)
}

fn write_seating<W: Write>(
    result: &ScheduleResult,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["round", "table", "seat", "player_id", "nickname", "placeholder"])?;

    for round in &result.rounds {
        for table in &round.tables {
            for seat in &table.seats {
                wtr.write_record(&[
                    round.round.to_string(),
                    table.table.to_string(),
                    seat.seat.to_string(),
                    seat.player_id.clone(),
                    seat.nickname.clone(),
                    seat.is_placeholder.to_string(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::{generate_seating, test_support::request, TABLE_CAPACITY};

    #[test]
    fn exports_one_row_per_seat() {
        let mut req = request(4, 2, 2);
        req.master_seed = Some(3);
        req.solver_time_limit_secs = Some(0);
        let result = generate_seating(&req).unwrap();

        let mut buf = Vec::new();
        write_seating(&result, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Header plus rounds x tables x capacity rows.
        assert_eq!(lines.len(), 1 + 2 * 2 * TABLE_CAPACITY);
        assert_eq!(
            lines[0],
            "round,table,seat,player_id,nickname,placeholder"
        );
        assert!(lines[1].starts_with("1,0,1,"));
    }
}
