use std::fmt;
use std::str::FromStr;

use chumsky::prelude::*;
use glam::IVec2;
use miette::NamedSource;

use crate::deflection::Direction;
use crate::error::GridError;

/// A cell coordinate. Stored as `(column, row)` so that direction offsets
/// can be added directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(IVec2);

impl Position {
    pub const fn new(row: i32, column: i32) -> Self {
        Self(IVec2::new(column, row))
    }

    #[inline(always)]
    pub fn row(self) -> i32 {
        self.0.y
    }

    #[inline(always)]
    pub fn column(self) -> i32 {
        self.0.x
    }

    /// The neighbouring cell one step towards `direction`. May lie off-grid.
    #[inline(always)]
    pub fn step(self, direction: Direction) -> Self {
        Self(self.0 + direction.offset())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    /// `.`
    Empty,
    /// `|`
    SplitterVertical,
    /// `-`
    SplitterHorizontal,
    /// `\`
    MirrorBackslash,
    /// `/`
    MirrorForwardslash,
}

impl Tile {
    pub const ALL: [Tile; 5] = [
        Tile::Empty,
        Tile::SplitterVertical,
        Tile::SplitterHorizontal,
        Tile::MirrorBackslash,
        Tile::MirrorForwardslash,
    ];

    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::SplitterVertical => '|',
            Tile::SplitterHorizontal => '-',
            Tile::MirrorBackslash => '\\',
            Tile::MirrorForwardslash => '/',
        }
    }
}

impl TryFrom<char> for Tile {
    type Error = char;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        Tile::ALL
            .into_iter()
            .find(|tile| tile.symbol() == symbol)
            .ok_or(symbol)
    }
}

/// Immutable, rectangular grid of tiles stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    /// `(rows, columns)` as signed coordinates; both fit in `i32`.
    extent: (i32, i32),
    tiles: Vec<Tile>,
}

/// Signed extent of a `rows x columns` grid. [`Position`] is `i32` based,
/// so larger grids are refused.
fn signed_extent(rows: usize, columns: usize) -> Result<(i32, i32), GridError> {
    match (i32::try_from(rows), i32::try_from(columns)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(GridError::TooLarge { rows, columns }),
    }
}

fn parser<'a>() -> impl Parser<'a, &'a str, Vec<Vec<Tile>>, extra::Err<Rich<'a, char>>> {
    let tile = choice((
        just('.').to(Tile::Empty),
        just('|').to(Tile::SplitterVertical),
        just('-').to(Tile::SplitterHorizontal),
        just('\\').to(Tile::MirrorBackslash),
        just('/').to(Tile::MirrorForwardslash),
    ));

    // Only real line breaks separate rows; other vertical whitespace is not a tile
    let line_break = just("\r\n").or(just("\n")).or(just("\r"));

    tile.repeated()
        .collect::<Vec<_>>()
        .separated_by(line_break)
        .allow_trailing()
        .collect::<Vec<_>>()
}

impl Grid {
    /// Parses one row per line, split on `\n`, `\r\n` or `\r`. A trailing
    /// newline is accepted, anything else that breaks rectangularity is not.
    /// Grids wider or taller than `i32::MAX` are refused.
    pub fn parse(input: &str) -> Result<Self, GridError> {
        let rows = parser()
            .parse(input)
            .into_result()
            .map_err(|errors| Self::diagnose(input, &errors))?;

        Self::from_rows(rows)
    }

    pub fn from_rows(mut rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        // Trailing newlines show up as empty rows at the end
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        // Rows are measured against the first one that has tiles
        let Some(columns) = rows.iter().map(Vec::len).find(|&len| len > 0) else {
            return Err(GridError::Empty);
        };

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != columns)
        {
            return Err(GridError::Ragged {
                row,
                expected: columns,
                found,
            });
        }

        let extent = signed_extent(rows.len(), columns)?;

        Ok(Self {
            rows: rows.len(),
            columns,
            extent,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    /// The parser only stops early on a symbol that is neither a tile nor a
    /// line break, so the furthest error always points at one.
    fn diagnose(input: &str, errors: &[Rich<'_, char>]) -> GridError {
        let offset = errors
            .iter()
            .map(|e| e.span().start)
            .max()
            .unwrap_or(input.len());
        let symbol = input
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        let (row, column) = locate(input.get(..offset).unwrap_or(input));

        GridError::UnknownTile {
            symbol,
            row,
            column,
            src: NamedSource::new("grid", input.to_string()),
            span: (offset, symbol.len_utf8()).into(),
        }
    }

    #[inline(always)]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index_of(position).is_some()
    }

    /// Row-major index of `position`, or `None` when it lies off-grid.
    #[inline(always)]
    pub(crate) fn index_of(&self, position: Position) -> Option<usize> {
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        (row < self.rows && column < self.columns).then_some(row * self.columns + column)
    }

    pub fn get(&self, position: Position) -> Option<Tile> {
        self.index_of(position).map(|idx| self.tiles[idx])
    }

    /// Strict lookup. Callers are expected to have checked [`Grid::contains`].
    pub fn tile_at(&self, position: Position) -> Result<Tile, GridError> {
        self.get(position).ok_or_else(|| self.out_of_bounds(position))
    }

    /// `(rows, columns)` as signed coordinates.
    pub(crate) fn extent(&self) -> (i32, i32) {
        self.extent
    }

    pub(crate) fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            position,
            rows: self.rows,
            columns: self.columns,
        }
    }

    pub(crate) fn tile_at_index(&self, index: usize) -> Tile {
        self.tiles[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.tiles.chunks(self.columns)
    }
}

/// Row and column (in chars) reached after reading `prefix`.
fn locate(prefix: &str) -> (usize, usize) {
    let mut row = 0;
    let mut column = 0;
    let mut chars = prefix.chars().peekable();

    while let Some(symbol) = chars.next() {
        match symbol {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                row += 1;
                column = 0;
            }
            _ => column += 1,
        }
    }
    (row, column)
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for tile in row {
                write!(f, "{}", tile.symbol())?;
            }
        }
        Ok(())
    }
}
