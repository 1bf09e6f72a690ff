use solid_core::Solid;

/// Indexed triangle mesh, zero-based indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

/// Radius of the tetrahedron standing in for a sphere.
pub const SPHERE_SIM_RADIUS: f64 = 1.5;

impl Mesh {
    pub fn for_solid(solid: Solid) -> Self {
        match solid {
            Solid::Cube => cube(),
            Solid::Sphere => tetrahedron(SPHERE_SIM_RADIUS),
        }
    }
}

/// Axis-aligned cube spanning [-1, 1] on every axis. All quads share one
/// winding and are split into triangle fans.
pub fn cube() -> Mesh {
    let vertices = vec![
        [-1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 1.0, -1.0],
    ];
    let quads: [[u32; 4]; 6] = [
        [4, 7, 3, 0], // back
        [1, 2, 6, 5], // front
        [0, 3, 2, 1], // left
        [5, 6, 7, 4], // right
        [3, 7, 6, 2], // top
        [4, 0, 1, 5], // bottom
    ];
    let triangles = quads
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect();

    Mesh {
        vertices,
        triangles,
    }
}

pub fn tetrahedron(r: f64) -> Mesh {
    Mesh {
        vertices: vec![[0.0, r, 0.0], [-r, -r, -r], [r, -r, -r], [0.0, -r, 2.0 * r]],
        triangles: vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]],
    }
}

pub fn to_obj(mesh: &Mesh) -> String {
    let mut out = String::new();
    for vertex in &mesh.vertices {
        out.push_str(&format!("v {} {} {}\n", vertex[0], vertex[1], vertex[2]));
    }
    for triangle in &mesh.triangles {
        out.push_str(&format!(
            "f {} {} {}\n",
            triangle[0] + 1,
            triangle[1] + 1,
            triangle[2] + 1
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use solid_core::Solid;

    use super::{Mesh, cube, tetrahedron, to_obj};

    fn signed_volume(mesh: &Mesh) -> f64 {
        mesh.triangles
            .iter()
            .map(|tri| {
                let a = mesh.vertices[tri[0] as usize];
                let b = mesh.vertices[tri[1] as usize];
                let c = mesh.vertices[tri[2] as usize];
                let cross = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
            })
            .sum()
    }

    #[test]
    fn cube_has_twelve_triangles_over_eight_vertices() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.triangles.len(), 12);
        assert!(
            mesh.triangles
                .iter()
                .flatten()
                .all(|index| (*index as usize) < mesh.vertices.len())
        );
    }

    #[test]
    fn cube_encloses_its_volume() {
        assert!((signed_volume(&cube()).abs() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn tetrahedron_uses_the_requested_radius() {
        let mesh = tetrahedron(1.5);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles.len(), 4);
        assert_eq!(mesh.vertices[0], [0.0, 1.5, 0.0]);
        assert_eq!(mesh.vertices[3], [0.0, -1.5, 3.0]);
    }

    #[test]
    fn solids_map_to_their_meshes() {
        assert_eq!(Mesh::for_solid(Solid::Cube), cube());
        assert_eq!(Mesh::for_solid(Solid::Sphere).vertices.len(), 4);
    }

    #[test]
    fn obj_uses_one_based_faces() {
        let obj = to_obj(&tetrahedron(1.0));
        assert!(obj.starts_with("v 0 1 0\n"));
        assert!(obj.contains("v -1 -1 -1\n"));
        assert!(obj.contains("f 1 2 3\n"));
        assert!(obj.ends_with("f 2 4 3\n"));
    }
}
