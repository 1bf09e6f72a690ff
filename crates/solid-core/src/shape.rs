use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of intents a prompt can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Unknown,
    Cube,
    Sphere,
}

impl ShapeKind {
    /// The generatable solid for this kind. `Unknown` has none, so it can
    /// never be turned into a kernel code.
    pub fn solid(self) -> Option<Solid> {
        match self {
            ShapeKind::Unknown => None,
            ShapeKind::Cube => Some(Solid::Cube),
            ShapeKind::Sphere => Some(Solid::Sphere),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Unknown => "unknown",
            ShapeKind::Cube => "cube",
            ShapeKind::Sphere => "sphere",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A shape the native kernel knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solid {
    Cube,
    Sphere,
}

impl Solid {
    pub const ALL: [Solid; 2] = [Solid::Cube, Solid::Sphere];

    /// Kernel shape id. Fixed by the native `generate_shape` contract.
    pub fn code(self) -> i32 {
        match self {
            Solid::Cube => 1,
            Solid::Sphere => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|solid| solid.code() == code)
    }

    /// File name label used by the output planner.
    pub fn label(self) -> &'static str {
        match self {
            Solid::Cube => "cube",
            // The kernel approximates the sphere with a tetrahedron.
            Solid::Sphere => "sphere_sim",
        }
    }

    pub fn kind(self) -> ShapeKind {
        match self {
            Solid::Cube => ShapeKind::Cube,
            Solid::Sphere => ShapeKind::Sphere,
        }
    }
}

impl From<Solid> for ShapeKind {
    fn from(value: Solid) -> Self {
        value.kind()
    }
}

impl fmt::Display for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::{ShapeKind, Solid};

    #[test]
    fn codes_are_a_fixed_bijection() {
        assert_eq!(Solid::Cube.code(), 1);
        assert_eq!(Solid::Sphere.code(), 2);
        for solid in Solid::ALL {
            assert_eq!(Solid::from_code(solid.code()), Some(solid));
        }
    }

    #[test]
    fn codes_outside_the_contract_are_rejected() {
        for code in [i32::MIN, -1, 0, 3, i32::MAX] {
            assert_eq!(Solid::from_code(code), None, "code {code} should not decode");
        }
    }

    #[test]
    fn unknown_kind_has_no_solid() {
        assert_eq!(ShapeKind::Unknown.solid(), None);
        assert_eq!(ShapeKind::Cube.solid(), Some(Solid::Cube));
        assert_eq!(ShapeKind::Sphere.solid(), Some(Solid::Sphere));
    }

    #[test]
    fn solid_round_trips_through_kind() {
        for solid in Solid::ALL {
            assert_eq!(ShapeKind::from(solid).solid(), Some(solid));
        }
    }

    #[test]
    fn labels_match_output_naming() {
        assert_eq!(Solid::Cube.label(), "cube");
        assert_eq!(Solid::Sphere.label(), "sphere_sim");
        assert_eq!(ShapeKind::Sphere.to_string(), "sphere");
    }
}
