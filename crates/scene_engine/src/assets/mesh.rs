//! Mesh representation for 3D models
//!
//! A mesh is either read from an OBJ file (deduplicated by canonical path) or
//! generated from builder parameters (plane, cube, ico-sphere). Generated
//! meshes are in-memory only and every request creates a fresh asset.

use super::obj_loader::{ObjError, ObjLoader};
use super::{Asset, AssetError, AssetId, AssetKind, LoadContext};
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ico-sphere subdivision levels above this produce millions of triangles
const MAX_ICO_SUBDIVISIONS: u32 = 7;

/// Vertex with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Unit normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Where a mesh's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshSource {
    /// Wavefront OBJ file relative to the asset root
    File {
        /// Path relative to the asset root
        path: String,
    },
    /// Single quad
    Plane {
        /// Centre of the quad
        position: Vec3,
        /// Face normal
        normal: Vec3,
        /// Direction of the quad's local +X (U) axis
        tangent: Vec3,
        /// Extent along tangent and bitangent
        size: [f32; 2],
    },
    /// Axis-aligned box
    Cube {
        /// Centre of the box
        position: Vec3,
        /// Full edge lengths
        scale: Vec3,
    },
    /// Subdivided icosahedron projected onto a sphere
    IcoSphere {
        /// Sphere centre
        center: Vec3,
        /// Sphere radius
        radius: f32,
        /// Number of 4-way triangle subdivisions
        subdivisions: u32,
    },
}

impl MeshSource {
    /// OBJ file source
    pub fn file(path: impl Into<String>) -> Self {
        Self::File { path: path.into() }
    }

    /// Unit quad facing +Z with its U axis along +X
    pub fn unit_plane() -> Self {
        Self::Plane {
            position: Vec3::zeros(),
            normal: Vec3::z(),
            tangent: Vec3::x(),
            size: [1.0, 1.0],
        }
    }

    /// True for generated geometry
    pub fn is_procedural(&self) -> bool {
        !matches!(self, Self::File { .. })
    }
}

/// Triangle mesh with cached bounds
#[derive(Debug)]
pub struct Mesh {
    id: AssetId,
    source: MeshSource,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl Mesh {
    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds in model space as `(min, max)`
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    /// Geometry source
    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    fn build(source: &MeshSource, ctx: &LoadContext<'_>) -> Result<(Vec<Vertex>, Vec<u32>), AssetError> {
        match source {
            MeshSource::File { path } => {
                let resolved = ctx.existing_path(path)?;
                ObjLoader::load_obj(&resolved).map_err(|e| match e {
                    ObjError::Io(io) => AssetError::Io(io),
                    other => AssetError::invalid(path, other.to_string()),
                })
            }
            MeshSource::Plane {
                position,
                normal,
                tangent,
                size,
            } => Ok(build_plane(position, normal, tangent, *size)),
            MeshSource::Cube { position, scale } => Ok(build_cube(position, scale)),
            MeshSource::IcoSphere {
                center,
                radius,
                subdivisions,
            } => {
                if *subdivisions > MAX_ICO_SUBDIVISIONS {
                    return Err(AssetError::invalid(
                        "ico_sphere",
                        format!("at most {MAX_ICO_SUBDIVISIONS} subdivisions supported"),
                    ));
                }
                Ok(build_ico_sphere(center, *radius, *subdivisions))
            }
        }
    }
}

impl Asset for Mesh {
    const KIND: AssetKind = AssetKind::Mesh;
    type Params = MeshSource;

    fn load(id: AssetId, source: &MeshSource, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        let (vertices, indices) = Self::build(source, ctx)?;
        if indices.iter().any(|&i| i as usize >= vertices.len()) {
            return Err(AssetError::invalid(format!("{id}"), "index out of range"));
        }

        let mut bounds_min = Vec3::repeat(f32::MAX);
        let mut bounds_max = Vec3::repeat(f32::MIN);
        for vertex in &vertices {
            let p = Vec3::from(vertex.position);
            bounds_min = bounds_min.inf(&p);
            bounds_max = bounds_max.sup(&p);
        }

        log::debug!(
            "Built mesh {} from {:?} ({} vertices, {} triangles)",
            id,
            source,
            vertices.len(),
            indices.len() / 3
        );
        Ok(Self {
            id,
            source: source.clone(),
            vertices,
            indices,
            bounds_min,
            bounds_max,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> MeshSource {
        self.source.clone()
    }

    fn cache_key(source: &MeshSource, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        match source {
            MeshSource::File { path } => Ok(Some(ctx.canonical_path(path)?.display().to_string())),
            _ => Ok(None),
        }
    }

    fn source_path(source: &MeshSource) -> Option<String> {
        match source {
            MeshSource::File { path } => Some(path.clone()),
            _ => None,
        }
    }
}

fn build_plane(position: &Vec3, normal: &Vec3, tangent: &Vec3, size: [f32; 2]) -> (Vec<Vertex>, Vec<u32>) {
    let n = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
    let t = tangent.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::x);
    let b = n.cross(&t);
    let half_u = t * (size[0] * 0.5);
    let half_v = b * (size[1] * 0.5);

    let corners = [
        (position - half_u - half_v, [0.0, 0.0]),
        (position + half_u - half_v, [1.0, 0.0]),
        (position + half_u + half_v, [1.0, 1.0]),
        (position - half_u + half_v, [0.0, 1.0]),
    ];
    let vertices = corners
        .iter()
        .map(|(p, uv)| Vertex::new((*p).into(), n.into(), *uv))
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn build_cube(position: &Vec3, scale: &Vec3) -> (Vec<Vertex>, Vec<u32>) {
    let half = scale * 0.5;
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    // One quad per face: (normal, u axis); v axis = normal x u
    let faces = [
        (Vec3::x(), Vec3::y()),
        (-Vec3::x(), -Vec3::y()),
        (Vec3::y(), -Vec3::x()),
        (-Vec3::y(), Vec3::x()),
        (Vec3::z(), Vec3::x()),
        (-Vec3::z(), -Vec3::x()),
    ];

    for (normal, u) in faces {
        let v = normal.cross(&u);
        let centre = position + normal.component_mul(&half);
        let du = u.component_mul(&half);
        let dv = v.component_mul(&half);
        let base = vertices.len() as u32;
        for (corner, uv) in [
            (centre - du - dv, [0.0, 0.0]),
            (centre + du - dv, [1.0, 0.0]),
            (centre + du + dv, [1.0, 1.0]),
            (centre - du + dv, [0.0, 1.0]),
        ] {
            vertices.push(Vertex::new(corner.into(), normal.into(), uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

fn build_ico_sphere(center: &Vec3, radius: f32, subdivisions: u32) -> (Vec<Vertex>, Vec<u32>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut points: Vec<Vec3> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Vec3::from(*p).normalize())
    .collect();

    let mut triangles: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = ((points[a as usize] + points[b as usize]) * 0.5).normalize();
                points.push(mid);
                (points.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        triangles = next;
    }

    let vertices = points
        .iter()
        .map(|unit| {
            let u = 0.5 + unit.y.atan2(unit.x) / (2.0 * std::f32::consts::PI);
            let v = 0.5 + unit.z.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
            Vertex::new((center + unit * radius).into(), (*unit).into(), [u, v])
        })
        .collect();
    let indices = triangles.into_iter().flatten().collect();
    (vertices, indices)
}
