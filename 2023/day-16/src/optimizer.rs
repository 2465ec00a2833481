use indicatif::{ParallelProgressIterator, ProgressBar};
use itertools::chain;
use rayon::prelude::*;
use tracing::info;

use crate::beam::{propagate, BeamState};
use crate::deflection::Direction;
use crate::error::GridError;
use crate::grid::{Grid, Position};

/// How candidate entries are evaluated. Both produce the same [`Best`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    #[default]
    Parallel,
}

/// The winning entry and how many cells it energizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Best {
    pub start: BeamState,
    pub energized: usize,
}

/// Every beam that enters from an edge heading inwards: top, left, bottom,
/// then right edge. Corner cells show up once per edge they sit on.
pub fn entry_states(grid: &Grid) -> Vec<BeamState> {
    let (rows, columns) = grid.extent();

    chain!(
        (0..columns).map(|c| BeamState::new(Position::new(0, c), Direction::South)),
        (0..rows).map(|r| BeamState::new(Position::new(r, 0), Direction::East)),
        (0..columns).map(|c| BeamState::new(Position::new(rows - 1, c), Direction::North)),
        (0..rows).map(|r| BeamState::new(Position::new(r, columns - 1), Direction::West))
    )
    .collect()
}

fn evaluate(grid: &Grid, start: BeamState) -> Result<Best, GridError> {
    let energized = propagate(grid, start)?.count();
    Ok(Best { start, energized })
}

/// Keeps the first entry among those with the highest count, so the
/// outcome only depends on the order of `results`.
fn reduce(results: Vec<Best>) -> Result<Best, GridError> {
    results
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.energized > best.energized {
                candidate
            } else {
                best
            }
        })
        .ok_or(GridError::Empty)
}

#[tracing::instrument(skip(grid), fields(rows = grid.row_count(), columns = grid.column_count()))]
pub fn best_entry(grid: &Grid, strategy: Strategy) -> Result<Best, GridError> {
    let starts = entry_states(grid);

    // Runs share nothing but the grid, and collecting keeps input order
    let results = match strategy {
        Strategy::Sequential => starts
            .iter()
            .map(|&start| evaluate(grid, start))
            .collect::<Result<Vec<_>, _>>()?,
        Strategy::Parallel => starts
            .par_iter()
            .map(|&start| evaluate(grid, start))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let best = reduce(results)?;
    info!(start = ?best.start, energized = best.energized, "best entry found");
    Ok(best)
}

/// Parallel search that reports progress on a terminal bar.
#[tracing::instrument(skip(grid))]
pub fn best_entry_with_progress(grid: &Grid) -> Result<Best, GridError> {
    let starts = entry_states(grid);
    let bar = ProgressBar::new(starts.len() as u64);

    let results = starts
        .par_iter()
        .progress_with(bar.clone())
        .map(|&start| evaluate(grid, start))
        .collect::<Result<Vec<_>, _>>()?;
    bar.finish_and_clear();

    reduce(results)
}

pub fn maximal_energized_count(grid: &Grid) -> Result<usize, GridError> {
    best_entry(grid, Strategy::Parallel).map(|best| best.energized)
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;
    use std::collections::HashSet;

    const CONTRAPTION: &str = r".|...\....
|.-.\.....
.....|-...
........|.
..........
.........\
..../.\\..
.-.-/..|..
.|....-|.\
..//.|....";

    #[rstest]
    #[case(Strategy::Sequential)]
    #[case(Strategy::Parallel)]
    fn finds_best_entry(#[case] strategy: Strategy) -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let best = best_entry(&grid, strategy)?;
        assert_eq!(best.energized, 51);
        assert_eq!(
            best.start,
            BeamState::new(Position::new(0, 3), Direction::South)
        );
        Ok(())
    }

    #[test]
    fn progress_variant_agrees() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        assert_eq!(
            best_entry_with_progress(&grid)?,
            best_entry(&grid, Strategy::Sequential)?
        );
        Ok(())
    }

    #[rstest]
    #[case(".", 1, 1)]
    #[case("...", 1, 3)]
    #[case("/\\\n\\/", 2, 2)]
    #[case(CONTRAPTION, 10, 10)]
    fn entries_cover_every_edge(
        #[case] input: &str,
        #[case] rows: usize,
        #[case] columns: usize,
    ) -> Result<()> {
        let grid = Grid::parse(input)?;
        let starts = entry_states(&grid);
        assert_eq!(starts.len(), 2 * (rows + columns));

        let unique: HashSet<_> = starts.iter().collect();
        assert_eq!(unique.len(), starts.len());

        for start in &starts {
            assert!(grid.contains(start.position));
            // Stepping backwards must leave the grid: the beam came from outside
            assert!(!grid.contains(start.position.step(start.direction.opposite())));
        }
        Ok(())
    }

    #[rstest]
    #[case(".", 1)]
    #[case("/", 1)]
    #[case("...", 3)]
    #[case("/\\\n\\/", 1)]
    #[case("/-\\\n|.|\n\\-/", 8)]
    fn strategies_agree(#[case] input: &str, #[case] expected: usize) -> Result<()> {
        let grid = Grid::parse(input)?;
        let sequential = best_entry(&grid, Strategy::Sequential)?;
        let parallel = best_entry(&grid, Strategy::Parallel)?;
        assert_eq!(sequential, parallel);
        assert_eq!(maximal_energized_count(&grid)?, expected);
        Ok(())
    }

    #[test]
    fn count_never_exceeds_grid() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        for start in entry_states(&grid) {
            assert!(propagate(&grid, start)?.count() <= grid.len());
        }
        Ok(())
    }
}
