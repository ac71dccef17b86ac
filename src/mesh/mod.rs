//! Grid tessellation into a submesh-partitioned triangle mesh.
//!
//! Every quad cell of a `PointGrid` becomes two triangles. Triangles do not
//! share vertices, so each carries its own flat normal. Submeshes are
//! assigned per grid column: the counter advances once per finished column
//! of quads and the bucket is `counter % submesh_count`.

pub mod materials;

use glam::Vec3;
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::heightmap::HeightGrid;

pub use materials::{Material, MaterialAssigner, MaterialScheme, MeshRenderer, Palette, WhiteSpecular};

/// `width x height` lattice of 3D points, indexed `[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGrid {
    pub width: usize,
    pub height: usize,
    pub points: Vec<Vec3>,
}

impl PointGrid {
    /// Flat plane in XY: point (x, y) = (cell_size * x, cell_size * y, 0).
    pub fn plane(width: usize, height: usize, cell_size: f32) -> Self {
        let mut points = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                points.push(Vec3::new(cell_size * x as f32, cell_size * y as f32, 0.0));
            }
        }
        Self { width, height, points }
    }

    /// Height-field surface in XZ, y = sample * height_scale.
    pub fn from_heights(grid: &HeightGrid, cell_size: f32, height_scale: f32) -> Self {
        let mut points = Vec::with_capacity(grid.len());
        for y in 0..grid.height {
            for x in 0..grid.width {
                points.push(Vec3::new(
                    cell_size * x as f32,
                    grid.get(x, y) * height_scale,
                    cell_size * y as f32,
                ));
            }
        }
        Self {
            width: grid.width,
            height: grid.height,
            points,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        self.points[y * self.width + x]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Vertex indices per submesh, three per triangle.
    pub submeshes: Vec<Vec<u32>>,
}

impl Mesh {
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.len() / 3).sum()
    }

    /// Every triangle as its three corner positions, submesh by submesh.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.submeshes.iter().flat_map(move |indices| {
            indices.chunks_exact(3).map(move |tri| {
                [
                    self.vertices[tri[0] as usize],
                    self.vertices[tri[1] as usize],
                    self.vertices[tri[2] as usize],
                ]
            })
        })
    }
}

/// `(b - a) x (c - a)`, twice the signed area vector of the triangle.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Accumulates triangles into submesh buckets.
pub struct MeshBuilder {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    submeshes: Vec<Vec<u32>>,
}

impl MeshBuilder {
    pub fn new(submesh_count: usize) -> Result<Self> {
        if submesh_count == 0 {
            return Err(TerrainError::invalid("a mesh needs at least one submesh"));
        }
        Ok(Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            submeshes: vec![Vec::new(); submesh_count],
        })
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Append triangle (p0, p1, p2) to `submesh`, in that winding.
    pub fn build_triangle(&mut self, p0: Vec3, p1: Vec3, p2: Vec3, submesh: usize) {
        let normal = face_normal(p0, p1, p2).normalize_or_zero();
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[p0, p1, p2]);
        self.normals.extend_from_slice(&[normal; 3]);
        self.submeshes[submesh].extend_from_slice(&[base, base + 1, base + 2]);
    }

    pub fn build(self) -> Mesh {
        Mesh {
            vertices: self.vertices,
            normals: self.normals,
            submeshes: self.submeshes,
        }
    }
}

/// Tessellate `points` into `submesh_count` submeshes and attach materials.
pub fn tessellate(
    points: &PointGrid,
    submesh_count: usize,
    assigner: &dyn MaterialAssigner,
) -> Result<(Mesh, MeshRenderer)> {
    let mut builder = MeshBuilder::new(submesh_count)?;
    let mut submesh = 0usize;

    for x in 0..points.width.saturating_sub(1) {
        for y in 0..points.height.saturating_sub(1) {
            let b_right = points.get(x, y);
            let b_left = points.get(x + 1, y);
            let t_right = points.get(x, y + 1);
            let t_left = points.get(x + 1, y + 1);

            let bucket = submesh % submesh_count;
            builder.build_triangle(b_left, t_right, t_left, bucket);
            builder.build_triangle(b_left, b_right, t_right, bucket);
        }
        submesh += 1;
    }

    let mesh = builder.build();
    let mut renderer = MeshRenderer::default();
    assigner.add_materials(&mut renderer);

    debug!(
        triangles = mesh.triangle_count(),
        submeshes = submesh_count,
        materials = renderer.materials.len(),
        "tessellated {}x{} grid",
        points.width,
        points.height
    );
    Ok((mesh, renderer))
}
