use glam::IVec2;

use crate::grid::Tile;

/// Travel direction of a beam.
///
/// Rows grow towards the south and columns towards the east, so `North`
/// decreases the row index and `East` increases the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Offset of one step as `(column, row)`.
    #[inline(always)]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::North => IVec2::NEG_Y,
            Direction::South => IVec2::Y,
            Direction::East => IVec2::X,
            Direction::West => IVec2::NEG_X,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Dense index used by the visited bitset.
    #[inline(always)]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Outgoing directions produced by a tile: one for pass-through and
/// mirrors, two for a splitter hit on its flat side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deflection {
    One(Direction),
    Two(Direction, Direction),
}

impl Deflection {
    pub fn len(&self) -> usize {
        match self {
            Deflection::One(_) => 1,
            Deflection::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, direction: Direction) -> bool {
        match *self {
            Deflection::One(a) => a == direction,
            Deflection::Two(a, b) => a == direction || b == direction,
        }
    }
}

impl IntoIterator for Deflection {
    type Item = Direction;
    type IntoIter = std::iter::Chain<std::iter::Once<Direction>, std::option::IntoIter<Direction>>;

    fn into_iter(self) -> Self::IntoIter {
        let (first, second) = match self {
            Deflection::One(a) => (a, None),
            Deflection::Two(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }
}

/// The deflection table: where a beam entering `tile` while travelling in
/// `incoming` leaves towards.
pub fn deflect(tile: Tile, incoming: Direction) -> Deflection {
    use Direction::*;

    match (tile, incoming) {
        (Tile::Empty, d) => Deflection::One(d),

        // `\` pairs north with west and south with east
        (Tile::MirrorBackslash, North) => Deflection::One(West),
        (Tile::MirrorBackslash, South) => Deflection::One(East),
        (Tile::MirrorBackslash, East) => Deflection::One(South),
        (Tile::MirrorBackslash, West) => Deflection::One(North),

        // `/` pairs north with east and south with west
        (Tile::MirrorForwardslash, North) => Deflection::One(East),
        (Tile::MirrorForwardslash, South) => Deflection::One(West),
        (Tile::MirrorForwardslash, East) => Deflection::One(North),
        (Tile::MirrorForwardslash, West) => Deflection::One(South),

        (Tile::SplitterVertical, East | West) => Deflection::Two(North, South),
        (Tile::SplitterVertical, d @ (North | South)) => Deflection::One(d),

        (Tile::SplitterHorizontal, North | South) => Deflection::Two(East, West),
        (Tile::SplitterHorizontal, d @ (East | West)) => Deflection::One(d),
    }
}

impl Tile {
    #[inline(always)]
    pub fn deflect(self, incoming: Direction) -> Deflection {
        deflect(self, incoming)
    }
}
