use miette::*;

use crate::optimize;

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let energized = optimize(input)?;
    Ok(energized.to_string())
}
