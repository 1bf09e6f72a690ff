use crate::shape::{ShapeKind, Solid};

pub const CUBE_KEYWORDS: [&str; 3] = ["cube", "box", "square"];
pub const SPHERE_KEYWORDS: [&str; 3] = ["sphere", "ball", "round"];

/// Checked in order. The first set with a hit decides, so a prompt naming
/// both shapes ("a round box") is a cube.
const KEYWORD_TABLE: [(Solid, &[&str]); 2] = [
    (Solid::Cube, &CUBE_KEYWORDS),
    (Solid::Sphere, &SPHERE_KEYWORDS),
];

/// Maps a free-text prompt to a shape kind by case-insensitive substring
/// match. Anything without a keyword hit, including empty input, is `Unknown`.
pub fn classify(prompt: &str) -> ShapeKind {
    let normalized = prompt.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| normalized.contains(keyword)))
        .map(|(solid, _)| solid.kind())
        .unwrap_or(ShapeKind::Unknown)
}
