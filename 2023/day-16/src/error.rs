use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::grid::Position;

#[derive(Error, Diagnostic, Debug)]
pub enum GridError {
    #[error("unrecognized tile {symbol:?} at row {row}, column {column}")]
    #[diagnostic(
        code(grid::unknown_tile),
        help("tiles must be one of `.`, `|`, `-`, `\\` or `/`")
    )]
    UnknownTile {
        symbol: char,
        row: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a tile")]
        span: SourceSpan,
    },

    #[error("row {row} has {found} tiles, expected {expected}")]
    #[diagnostic(code(grid::ragged), help("every row of the grid must have the same length"))]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid of {rows}x{columns} tiles exceeds the addressable size")]
    #[diagnostic(code(grid::too_large), help("rows and columns are limited to i32::MAX"))]
    TooLarge { rows: usize, columns: usize },

    #[error("grid has no tiles")]
    #[diagnostic(code(grid::empty))]
    Empty,

    #[error("position {position} lies outside the {rows}x{columns} grid")]
    #[diagnostic(code(grid::out_of_bounds))]
    OutOfBounds {
        position: Position,
        rows: usize,
        columns: usize,
    },
}
