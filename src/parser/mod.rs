mod json;
mod perspective;

pub use json::parse_model_output;
pub use perspective::{Perspective, PerspectiveCandidate};

use crate::error::ParseError;

/// Parse provider output into positional perspective candidates.
/// Fails only when no supported JSON shape yields a single object.
pub fn parse_candidates(raw: &str) -> Result<Vec<PerspectiveCandidate>, ParseError> {
    let values = parse_model_output(raw)?;
    Ok(values.iter().map(PerspectiveCandidate::from_value).collect())
}
