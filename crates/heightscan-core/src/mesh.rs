//! Triangle mesh synthesis from height grids.
//!
//! The mesh is a regular quad grid split into two triangles per cell, centered
//! on the origin in XY and centered vertically between the grid's extreme
//! heights. Normals come from central differences on the raw grid heights.

use glam::Vec3;
use rayon::prelude::*;

use crate::bounds::{Aabb, BoundingSphere};
use crate::error::{HeightscanError, Result};
use crate::grid::HeightGrid;

/// A mesh vertex with a baked occlusion factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Ambient occlusion factor: 0 = fully occluded, 1 = fully lit.
    pub occlusion: f32,
}

impl Vertex {
    /// Creates a fully lit vertex.
    #[must_use]
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            occlusion: 1.0,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

/// Vertices and triangle indices of a synthesized surface.
///
/// Vertex `row * cols + col` corresponds to grid cell `(row, col)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshTopology {
    pub vertices: Vec<Vertex>,
    /// Triangle corner indices; every three consecutive entries form a triangle.
    pub indices: Vec<u32>,
    /// `(rows, cols)` of the source grid; `None` for hand-built meshes.
    grid_shape: Option<(usize, usize)>,
}

impl MeshTopology {
    /// Wraps existing buffers, checking the index invariants.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self {
            vertices,
            indices,
            grid_shape: None,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// `(rows, cols)` of the grid this mesh was synthesized from.
    ///
    /// `None` for meshes built with [`MeshTopology::new`], which have no grid.
    pub fn grid_shape(&self) -> Option<(usize, usize)> {
        self.grid_shape
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Iterates vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + Clone + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    /// Checks that indices form whole triangles and reference existing vertices.
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(HeightscanError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(HeightscanError::InvalidMesh(format!(
                "index {bad} out of range for {} vertices",
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Axis-aligned bounds of the vertex positions.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions())
    }

    /// Sphere used to size baking cameras.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_points(self.positions())
    }

    /// XY diagonal of the bounding box, 0 for an empty mesh.
    pub fn diagonal_xy(&self) -> f32 {
        self.bounding_box().map_or(0.0, |b| b.diagonal_xy())
    }
}

/// Converts a [`HeightGrid`] into a [`MeshTopology`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshSynthesizer;

impl MeshSynthesizer {
    /// Synthesizes positions, normals and triangle indices for `grid`.
    ///
    /// Degenerate grids (a single row or column) succeed with zero normals and
    /// no triangles.
    pub fn synthesize(grid: &HeightGrid) -> Result<MeshTopology> {
        let rows = grid.rows();
        let cols = grid.cols();
        let count = rows * cols;

        if grid.heights().len() != count {
            return Err(HeightscanError::InvalidMesh(format!(
                "grid reports {rows}x{cols} cells but stores {} heights",
                grid.heights().len()
            )));
        }
        if count == 0 {
            return Err(HeightscanError::InvalidMesh(
                "grid has no cells".to_string(),
            ));
        }
        if u32::try_from(count).is_err() {
            return Err(HeightscanError::InvalidMesh(format!(
                "{count} vertices exceed the u32 index range"
            )));
        }

        let mut vertices = vec![Vertex::default(); count];
        write_positions(grid, &mut vertices);
        write_interior_normals(grid, &mut vertices);
        copy_border_normals(rows, cols, &mut vertices);
        let indices = quad_indices(rows, cols);

        log::debug!(
            "synthesized mesh: {} vertices, {} triangles",
            vertices.len(),
            indices.len() / 3
        );

        Ok(MeshTopology {
            vertices,
            indices,
            grid_shape: Some((rows, cols)),
        })
    }
}

fn write_positions(grid: &HeightGrid, vertices: &mut [Vertex]) {
    let cols = grid.cols();
    let xs = grid.x_spacing();
    let ys = grid.y_spacing();
    let (z_min, z_max) = grid.min_max().unwrap_or((0.0, 0.0));

    let z_offset = (z_min + z_max) * 0.5;
    let x_offset = (cols - 1) as f32 * 0.5 * xs;
    let y_offset = (grid.rows() - 1) as f32 * 0.5 * ys;

    vertices
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, out)| {
            let fy = row as f32 * ys - y_offset;
            for (col, (v, &h)) in out.iter_mut().zip(grid.row(row)).enumerate() {
                v.position = Vec3::new(col as f32 * xs - x_offset, fy, h - z_offset);
            }
        });
}

/// Central-difference normals for every interior vertex.
///
/// Reads only the grid, never the written positions, so rows are independent.
fn write_interior_normals(grid: &HeightGrid, vertices: &mut [Vertex]) {
    let rows = grid.rows();
    let cols = grid.cols();
    if rows < 3 || cols < 3 {
        return;
    }

    let span_x = 2.0 * grid.x_spacing();
    let span_y = 2.0 * grid.y_spacing();

    vertices
        .par_chunks_mut(cols)
        .enumerate()
        .skip(1)
        .take(rows - 2)
        .for_each(|(row, out)| {
            let above = grid.row(row - 1);
            let here = grid.row(row);
            let below = grid.row(row + 1);
            for col in 1..cols - 1 {
                let tangent_x = Vec3::new(span_x, 0.0, here[col + 1] - here[col - 1]);
                let tangent_y = Vec3::new(0.0, span_y, below[col] - above[col]);
                out[col].normal = tangent_x.cross(tangent_y).normalize_or_zero();
            }
        });
}

/// Edge vertices take the normal of their inward neighbor.
///
/// Rows are copied first, then columns. Either way a corner ends up with the
/// normal of its diagonal interior neighbor.
fn copy_border_normals(rows: usize, cols: usize, vertices: &mut [Vertex]) {
    if rows >= 2 {
        for col in 0..cols {
            vertices[col].normal = vertices[cols + col].normal;
            vertices[(rows - 1) * cols + col].normal = vertices[(rows - 2) * cols + col].normal;
        }
    }

    if cols >= 2 {
        for row in 0..rows {
            let base = row * cols;
            vertices[base].normal = vertices[base + 1].normal;
            vertices[base + cols - 1].normal = vertices[base + cols - 2].normal;
        }
    }
}

fn quad_indices(rows: usize, cols: usize) -> Vec<u32> {
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity(6 * (rows - 1) * (cols - 1));
    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            let top_left = (row * cols + col) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((row + 1) * cols + col) as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[top_left, top_right, bottom_left]);
            indices.extend_from_slice(&[top_right, bottom_right, bottom_left]);
        }
    }
    indices
}
