pub mod beam;
pub mod deflection;
pub mod error;
pub mod grid;
pub mod optimizer;
pub mod part1;
pub mod part2;

use miette::*;

pub use beam::{propagate, BeamState, Energized, Wavefront};
pub use deflection::{deflect, Deflection, Direction};
pub use error::GridError;
pub use grid::{Grid, Position, Tile};
pub use optimizer::{best_entry, entry_states, maximal_energized_count, Best, Strategy};

/// Number of cells energized by a single beam entering at `start`.
#[tracing::instrument(skip(input))]
pub fn simulate(input: &str, start: BeamState) -> Result<usize> {
    let grid = Grid::parse(input)?;
    Ok(propagate(&grid, start)?.count())
}

/// Highest energized count over every inward-facing edge entry.
#[tracing::instrument(skip(input))]
pub fn optimize(input: &str) -> Result<usize> {
    let grid = Grid::parse(input)?;
    Ok(maximal_energized_count(&grid)?)
}
