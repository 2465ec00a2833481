use bitvec::prelude::*;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::deflection::Direction;
use crate::error::GridError;
use crate::grid::{Grid, Position};

/// A beam at `position`, travelling in `direction`. This is the unit the
/// engine deduplicates on: the same cell may be crossed once per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeamState {
    pub position: Position,
    pub direction: Direction,
}

impl BeamState {
    pub const fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// Dense set of beam states: four bits per cell, one per direction.
/// States are only ever added.
#[derive(Debug, Clone)]
struct VisitedStates {
    bits: BitVec<usize, Lsb0>,
    len: usize,
}

impl VisitedStates {
    fn new(cells: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 0; cells * Direction::ALL.len()],
            len: 0,
        }
    }

    /// Returns `true` if the state was not already present.
    #[inline(always)]
    fn insert(&mut self, cell: usize, direction: Direction) -> bool {
        let idx = cell * Direction::ALL.len() + direction.index();
        if self.bits[idx] {
            return false;
        }
        self.bits.set(idx, true);
        self.len += 1;
        true
    }

    /// Collapses directions: a cell is energized if any of its states is set.
    fn cells(&self) -> BitVec<usize, Lsb0> {
        self.bits
            .chunks_exact(Direction::ALL.len())
            .map(|states| states.any())
            .collect()
    }
}

/// Wavefront expansion of the beam state graph, one wave per [`advance`].
///
/// Every state is marked visited the moment it enters a frontier, so no
/// state is expanded twice and loops of mirrors cannot keep the traversal
/// alive. The run ends once a wave produces nothing new.
///
/// [`advance`]: Wavefront::advance
pub struct Wavefront<'g> {
    grid: &'g Grid,
    visited: VisitedStates,
    /// Pending states paired with their cell index.
    frontier: Vec<(usize, BeamState)>,
    next: Vec<(usize, BeamState)>,
    waves: usize,
}

impl<'g> Wavefront<'g> {
    /// Seeds the traversal. The start must lie on the grid.
    pub fn new(grid: &'g Grid, start: BeamState) -> Result<Self, GridError> {
        let cell = grid
            .index_of(start.position)
            .ok_or_else(|| grid.out_of_bounds(start.position))?;

        let mut visited = VisitedStates::new(grid.len());
        visited.insert(cell, start.direction);

        Ok(Self {
            grid,
            visited,
            frontier: vec![(cell, start)],
            next: Vec::new(),
            waves: 0,
        })
    }

    /// Expands the current frontier by one step and returns how many
    /// previously unseen states it produced.
    pub fn advance(&mut self) -> usize {
        self.next.clear();

        for &(cell, state) in &self.frontier {
            let tile = self.grid.tile_at_index(cell);
            for direction in tile.deflect(state.direction) {
                let position = state.position.step(direction);
                // Beams leaving the grid are dropped
                let Some(next_cell) = self.grid.index_of(position) else {
                    continue;
                };
                if self.visited.insert(next_cell, direction) {
                    self.next.push((next_cell, BeamState::new(position, direction)));
                }
            }
        }

        std::mem::swap(&mut self.frontier, &mut self.next);
        self.waves += 1;
        trace!(
            wave = self.waves,
            frontier = self.frontier.len(),
            visited = self.visited.len
        );

        self.frontier.len()
    }

    pub fn is_done(&self) -> bool {
        self.frontier.is_empty()
    }

    /// States waiting to be expanded by the next [`Wavefront::advance`].
    pub fn frontier(&self) -> impl Iterator<Item = BeamState> + '_ {
        self.frontier.iter().map(|&(_, state)| state)
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len
    }

    pub fn waves(&self) -> usize {
        self.waves
    }

    /// Drops direction information, keeping only which cells were crossed.
    pub fn energized(&self) -> Energized {
        Energized {
            rows: self.grid.row_count(),
            columns: self.grid.column_count(),
            extent: self.grid.extent(),
            cells: self.visited.cells(),
        }
    }
}

/// Cells crossed by at least one beam during a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Energized {
    rows: usize,
    columns: usize,
    extent: (i32, i32),
    cells: BitVec<usize, Lsb0>,
}

impl Energized {
    pub fn count(&self) -> usize {
        self.cells.count_ones()
    }

    pub fn contains(&self, position: Position) -> bool {
        let (Ok(row), Ok(column)) = (
            usize::try_from(position.row()),
            usize::try_from(position.column()),
        ) else {
            return false;
        };
        row < self.rows && column < self.columns && self.cells[row * self.columns + column]
    }

    /// Energized positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let (rows, columns) = self.extent;
        (0..rows)
            .flat_map(move |row| (0..columns).map(move |column| Position::new(row, column)))
            .zip(self.cells.iter().by_vals())
            .filter_map(|(position, lit)| lit.then_some(position))
    }

    /// Debug map with `#` for energized cells and `.` elsewhere.
    pub fn render(&self) -> String {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().map(|b| if *b { '#' } else { '.' }).collect::<String>())
            .join("\n")
    }
}

/// Runs the beam from `start` until no new state appears.
#[tracing::instrument(
    level = "debug",
    skip(grid),
    fields(rows = grid.row_count(), columns = grid.column_count())
)]
pub fn propagate(grid: &Grid, start: BeamState) -> Result<Energized, GridError> {
    let mut wavefront = Wavefront::new(grid, start)?;
    while !wavefront.is_done() {
        wavefront.advance();
    }

    let energized = wavefront.energized();
    debug!(
        waves = wavefront.waves(),
        states = wavefront.visited_len(),
        energized = energized.count(),
        "beam settled"
    );
    Ok(energized)
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;

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

    fn east_from_origin() -> BeamState {
        BeamState::new(Position::new(0, 0), Direction::East)
    }

    #[test]
    fn energizes_example_contraption() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let energized = propagate(&grid, east_from_origin())?;
        assert_eq!(energized.count(), 46);
        assert_eq!(
            energized.render(),
            "######....
.#...#....
.#...#####
.#...##...
.#...##...
.#...##...
.#..####..
########..
.#######..
.#...#.#.."
        );
        Ok(())
    }

    #[rstest]
    #[case(".", Direction::East, 1)]
    #[case("/", Direction::East, 1)]
    #[case("|", Direction::East, 1)]
    #[case("...", Direction::East, 3)]
    #[case("...", Direction::West, 1)]
    #[case(".\\.\n...", Direction::East, 3)]
    fn small_grids(
        #[case] input: &str,
        #[case] direction: Direction,
        #[case] expected: usize,
    ) -> Result<()> {
        let grid = Grid::parse(input)?;
        let start = BeamState::new(Position::new(0, 0), direction);
        assert_eq!(propagate(&grid, start)?.count(), expected);
        Ok(())
    }

    #[test]
    fn terminates_on_closed_mirror_loop() -> Result<()> {
        // (0,1) -> (1,1) -> (1,0) -> (0,0) -> back to (0,1) heading east
        let grid = Grid::parse("/\\\n\\/")?;
        let start = BeamState::new(Position::new(0, 1), Direction::East);

        let mut wavefront = Wavefront::new(&grid, start)?;
        while !wavefront.is_done() {
            wavefront.advance();
        }
        assert_eq!(wavefront.visited_len(), 4);
        assert_eq!(wavefront.energized().count(), 4);
        Ok(())
    }

    #[test]
    fn terminates_on_splitter_ring() -> Result<()> {
        let grid = Grid::parse("/-\\\n|.|\n\\-/")?;
        let start = BeamState::new(Position::new(1, 1), Direction::North);
        let energized = propagate(&grid, start)?;
        assert_eq!(energized.count(), 9);
        Ok(())
    }

    #[test]
    fn visited_grows_monotonically() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let mut wavefront = Wavefront::new(&grid, east_from_origin())?;
        let initial = wavefront.visited_len();
        assert_eq!(initial, 1);

        while !wavefront.is_done() {
            let before = wavefront.visited_len();
            let added = wavefront.advance();
            assert_eq!(wavefront.visited_len(), before + added);
            assert_eq!(wavefront.frontier().count(), added);
        }
        assert!(wavefront.visited_len() > initial);
        assert!(wavefront.visited_len() <= grid.len() * Direction::ALL.len());
        Ok(())
    }

    #[test]
    fn frontier_never_repeats_a_state() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let mut wavefront = Wavefront::new(&grid, east_from_origin())?;
        let mut seen = std::collections::HashSet::new();
        loop {
            for state in wavefront.frontier() {
                assert!(grid.contains(state.position));
                assert!(seen.insert(state), "{state:?} expanded twice");
            }
            if wavefront.is_done() {
                break;
            }
            wavefront.advance();
        }
        assert_eq!(seen.len(), wavefront.visited_len());
        Ok(())
    }

    #[test]
    fn energized_positions_stay_on_grid() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let energized = propagate(&grid, east_from_origin())?;
        assert!(energized.count() <= grid.len());
        assert!(energized.positions().all(|p| grid.contains(p)));
        assert_eq!(energized.positions().count(), energized.count());
        assert!(energized.contains(Position::new(0, 0)));
        assert!(!energized.contains(Position::new(9, 9)));
        assert!(!energized.contains(Position::new(-1, 0)));
        Ok(())
    }

    #[test]
    fn positions_follow_row_major_order() -> Result<()> {
        // East along row 0, down the mirror, out the bottom
        let grid = Grid::parse(".\\.\n...\n...")?;
        let energized = propagate(&grid, east_from_origin())?;
        assert_eq!(
            energized.positions().collect::<Vec<_>>(),
            [
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(2, 1),
            ]
        );
        Ok(())
    }

    #[test]
    fn repeated_runs_agree() -> Result<()> {
        let grid = Grid::parse(CONTRAPTION)?;
        let first = propagate(&grid, east_from_origin())?;
        for _ in 0..5 {
            assert_eq!(propagate(&grid, east_from_origin())?, first);
        }
        Ok(())
    }

    #[test]
    fn rejects_off_grid_start() -> Result<()> {
        let grid = Grid::parse("..")?;
        let start = BeamState::new(Position::new(0, 2), Direction::West);
        assert!(matches!(
            propagate(&grid, start),
            Err(GridError::OutOfBounds { .. })
        ));
        Ok(())
    }
}
