use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{TetSimError, TetSimResult};

/// Axis-aligned bounding box used for mesh bounds and the world box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Builds a box from `[min_x, min_y, min_z, max_x, max_y, max_z]`.
    pub fn from_array(bounds: [f32; 6]) -> Self {
        Self {
            min: Vec3::new(bounds[0], bounds[1], bounds[2]),
            max: Vec3::new(bounds[3], bounds[4], bounds[5]),
        }
    }

    pub fn to_array(&self) -> [f32; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bounds = Self::empty();
        for &p in points {
            bounds.extend(p);
        }
        bounds
    }

    /// True when `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Static tetrahedral mesh topology and rest positions.
///
/// Indices are validated on construction, so every tet refers to an existing
/// vertex. Topology never changes after a soft body is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTetMesh")]
pub struct TetMesh {
    vertices: Vec<Vec3>,
    tets: Vec<[usize; 4]>,
}

/// Unchecked serialized form; converted through [`TetMesh::new`].
#[derive(Deserialize)]
struct RawTetMesh {
    vertices: Vec<Vec3>,
    tets: Vec<[usize; 4]>,
}

impl TryFrom<RawTetMesh> for TetMesh {
    type Error = TetSimError;

    fn try_from(raw: RawTetMesh) -> TetSimResult<Self> {
        TetMesh::new(raw.vertices, raw.tets)
    }
}

impl TetMesh {
    pub fn new(vertices: Vec<Vec3>, tets: Vec<[usize; 4]>) -> TetSimResult<Self> {
        if vertices.is_empty() {
            return Err(TetSimError::invalid_mesh("mesh has no vertices"));
        }
        let count = vertices.len();
        for tet in &tets {
            if let Some(&index) = tet.iter().find(|&&id| id >= count) {
                return Err(TetSimError::IndexOutOfBounds { index, count });
            }
        }
        Ok(Self { vertices, tets })
    }

    /// Parses flat buffers: 3 floats per vertex, 4 indices per tetrahedron.
    pub fn from_flat(vertices: &[f32], tet_ids: &[u32]) -> TetSimResult<Self> {
        if vertices.len() % 3 != 0 {
            return Err(TetSimError::invalid_mesh(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if tet_ids.len() % 4 != 0 {
            return Err(TetSimError::invalid_mesh(format!(
                "tet index buffer length {} is not a multiple of 4",
                tet_ids.len()
            )));
        }

        let vertices = vertices
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect();
        let tets = tet_ids
            .chunks_exact(4)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize, t[3] as usize])
            .collect();
        Self::new(vertices, tets)
    }

    pub fn builder(vertices: Vec<Vec3>, tets: Vec<[usize; 4]>) -> TetMeshBuilder {
        TetMeshBuilder::new(vertices, tets)
    }

    /// Single tetrahedron spanning the origin and the three unit axes.
    pub fn unit_tetrahedron() -> Self {
        Self {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            tets: vec![[0, 1, 2, 3]],
        }
    }

    /// Cube split into five positively oriented tetrahedra.
    pub fn cube(center: Vec3, half_extent: f32) -> Self {
        let h = half_extent;
        let vertices = vec![
            center + Vec3::new(-h, -h, -h),
            center + Vec3::new(h, -h, -h),
            center + Vec3::new(h, h, -h),
            center + Vec3::new(-h, h, -h),
            center + Vec3::new(-h, -h, h),
            center + Vec3::new(h, -h, h),
            center + Vec3::new(h, h, h),
            center + Vec3::new(-h, h, h),
        ];
        let tets = vec![
            [0, 1, 3, 4],
            [1, 2, 3, 6],
            [1, 4, 5, 6],
            [3, 4, 6, 7],
            [1, 3, 4, 6],
        ];
        Self { vertices, tets }
    }

    /// Axis-aligned block of `resolution^3` cells, each split into six tets
    /// around its main diagonal so neighbouring cells share faces.
    pub fn block(center: Vec3, half_extent: Vec3, resolution: usize) -> Self {
        // Axis order of each path from corner 0 to corner 7, and whether the
        // permutation is odd (its middle vertices are swapped to stay positive).
        const PATHS: [([usize; 3], bool); 6] = [
            ([0, 1, 2], false),
            ([1, 2, 0], false),
            ([2, 0, 1], false),
            ([0, 2, 1], true),
            ([2, 1, 0], true),
            ([1, 0, 2], true),
        ];

        let n = resolution.max(1);
        let stride = n + 1;
        let cell = half_extent * 2.0 / n as f32;
        let origin = center - half_extent;

        let mut vertices = Vec::with_capacity(stride * stride * stride);
        for z in 0..stride {
            for y in 0..stride {
                for x in 0..stride {
                    vertices.push(origin + Vec3::new(x as f32, y as f32, z as f32) * cell);
                }
            }
        }

        let mut tets = Vec::with_capacity(6 * n * n * n);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let corner = |bits: usize| {
                        let (cx, cy, cz) = (x + (bits & 1), y + ((bits >> 1) & 1), z + (bits >> 2));
                        cx + stride * (cy + stride * cz)
                    };
                    for (axes, odd) in PATHS {
                        let a = 1 << axes[0];
                        let ab = a | (1 << axes[1]);
                        let (p1, p2) = if odd { (ab, a) } else { (a, ab) };
                        tets.push([corner(0), corner(p1), corner(p2), corner(7)]);
                    }
                }
            }
        }

        Self { vertices, tets }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn tets(&self) -> &[[usize; 4]] {
        &self.tets
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_tets(&self) -> usize {
        self.tets.len()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Unique tetrahedron edges, each stored as `[low, high]`, sorted.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        const PAIRS: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

        let mut edges: Vec<[usize; 2]> = self
            .tets
            .iter()
            .flat_map(|tet| {
                PAIRS.iter().filter_map(move |&(a, b)| {
                    let (i, j) = (tet[a], tet[b]);
                    match i.cmp(&j) {
                        std::cmp::Ordering::Less => Some([i, j]),
                        std::cmp::Ordering::Greater => Some([j, i]),
                        std::cmp::Ordering::Equal => None,
                    }
                })
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

/// Helper used to place raw vertex/tet buffers before cooking a [`TetMesh`].
#[derive(Debug, Clone)]
pub struct TetMeshBuilder {
    vertices: Vec<Vec3>,
    tets: Vec<[usize; 4]>,
}

impl TetMeshBuilder {
    pub fn new(vertices: Vec<Vec3>, tets: Vec<[usize; 4]>) -> Self {
        Self { vertices, tets }
    }

    /// Shifts every vertex by `offset`.
    pub fn translate(mut self, offset: Vec3) -> Self {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
        self
    }

    /// Uniformly scales vertices about the origin.
    pub fn scale(mut self, factor: f32) -> Self {
        for vertex in &mut self.vertices {
            *vertex *= factor;
        }
        self
    }

    /// Recenters vertices around their centroid.
    pub fn recenter(mut self) -> Self {
        if self.vertices.is_empty() {
            return self;
        }
        let centroid: Vec3 =
            self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32;
        for vertex in &mut self.vertices {
            *vertex -= centroid;
        }
        self
    }

    /// Moves the mesh so its lowest vertex rests at `y = height`.
    pub fn rest_on_floor(self, height: f32) -> Self {
        let lowest = self
            .vertices
            .iter()
            .map(|v| v.y)
            .fold(f32::INFINITY, f32::min);
        if !lowest.is_finite() {
            return self;
        }
        self.translate(Vec3::new(0.0, height - lowest, 0.0))
    }

    pub fn build(self) -> TetSimResult<TetMesh> {
        TetMesh::new(self.vertices, self.tets)
    }
}
