mod display;
mod parser;
mod seating;
mod web;

use display::{print_seating, write_seating_csv};
use parser::{load_exclusions, load_roster};
use seating::{generate_seating, GridCell, SeatingRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        println!("Starting seating server on port {}...", port);
        println!("POST a seating request to http://localhost:{}/api/seating", port);

        web::start_server(port).await?;
        return Ok(());
    }

    // CLI mode: roster.csv rounds tables [exclusions.txt] [--seed N]
    if args.len() < 4 {
        eprintln!("Usage: {} <roster.csv> <rounds> <tables> [exclusions.txt] [--seed N]", args[0]);
        eprintln!("       {} web [port]", args[0]);
        std::process::exit(2);
    }

    let roster_path = &args[1];
    let rounds: u32 = args[2].parse()?;
    let tables: u32 = args[3].parse()?;
    let exclusions_path = args.get(4).filter(|a| !a.starts_with("--")).map(String::as_str);
    let master_seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok());

    println!("Loading roster from {}...", roster_path);
    let (pairs, users) = load_roster(roster_path)?;
    println!("Loaded {} pairs ({} players)", pairs.len(), users.len());

    let exclusions_text = load_exclusions(exclusions_path)?;

    // The external "set up games" step normally creates the grid; the CLI
    // builds an equivalent labeled one.
    let mut grid = Vec::new();
    for r in 1..=rounds {
        for t in 0..tables {
            grid.push(GridCell {
                game_id: format!("game-r{}-t{}", r, t),
                round: Some(r),
                table: t,
            });
        }
    }

    let request = SeatingRequest {
        pairs,
        users,
        grid,
        exclusions_text,
        master_seed,
        solver_time_limit_secs: None,
    };

    println!("\n=== Running Seating Scheduler ===");
    let result = generate_seating(&request)?;

    print_seating(&result);

    write_seating_csv(&result, "seating.csv")?;
    println!("\nSeating saved to seating.csv");

    Ok(())
}
