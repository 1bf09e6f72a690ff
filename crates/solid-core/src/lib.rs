pub mod classify;
pub mod planner;
pub mod shape;

pub use classify::{CUBE_KEYWORDS, SPHERE_KEYWORDS, classify};
pub use planner::{OUTPUT_EXTENSION, OutputPlanner, OutputTarget, PathError, TIMESTAMP_FORMAT};
pub use shape::{ShapeKind, Solid};
