use miette::*;

use aoc2023_day_16::optimizer::best_entry_with_progress;
use aoc2023_day_16::Grid;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/input2.txt").to_string());
    let input = std::fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {path}"))?;

    let grid = Grid::parse(&input)?;
    let best = best_entry_with_progress(&grid)?;
    tracing::info!(start = ?best.start, "entry");
    println!("Result: {}", best.energized);
    Ok(())
}
