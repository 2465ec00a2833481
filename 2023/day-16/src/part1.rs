use miette::*;

use crate::{simulate, BeamState, Direction, Position};

/// The beam enters the top-left corner heading east.
const ENTRY: BeamState = BeamState::new(Position::new(0, 0), Direction::East);

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let energized = simulate(input, ENTRY)?;
    Ok(energized.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = r".|...\....
|.-.\.....
.....|-...
........|.
..........
.........\
..../.\\..
.-.-/..|..
.|....-|.\
..//.|....";
        assert_eq!("46", process(input)?);
        Ok(())
    }
}
