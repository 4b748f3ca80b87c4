//! A loaded surface scan: samples, grid, mesh and bounds.

use std::path::{Path, PathBuf};

use heightscan_core::{
    Aabb, GridBuilder, HeightGrid, HeightscanError, MeshSynthesizer, MeshTopology, Result, Sample,
};

use crate::xyz;

/// One measurement, ready to render.
#[derive(Debug, Clone)]
pub struct Measurement {
    filename: Option<PathBuf>,
    grid: HeightGrid,
    mesh: MeshTopology,
    bounding_box: Aabb,
}

impl Measurement {
    /// Imports an XYZ file and builds its mesh.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let samples = xyz::read_file(path)?;
        let mut measurement = Self::from_samples(&samples)?;
        measurement.filename = Some(path.to_path_buf());
        Ok(measurement)
    }

    /// Builds the grid, mesh and bounding box from samples in metres.
    pub fn from_samples(samples: &[Sample]) -> Result<Self> {
        let grid = GridBuilder::build(samples)?;
        let mesh = MeshSynthesizer::synthesize(&grid)?;
        let bounding_box = mesh
            .bounding_box()
            .ok_or_else(|| HeightscanError::InvalidMesh("mesh has no vertices".into()))?;

        log::info!(
            "measurement grid {}x{}, {} triangles",
            grid.rows(),
            grid.cols(),
            mesh.num_triangles()
        );

        Ok(Self {
            filename: None,
            grid,
            mesh,
            bounding_box,
        })
    }

    /// Source file, if loaded from disk.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn mesh(&self) -> &MeshTopology {
        &self.mesh
    }

    /// Mutable mesh access, used to write baked occlusion.
    ///
    /// The bounding box is computed at load time and is not refreshed.
    pub fn mesh_mut(&mut self) -> &mut MeshTopology {
        &mut self.mesh
    }

    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    /// XY diagonal of the bounding box; the camera's base view height.
    pub fn diagonal(&self) -> f32 {
        self.bounding_box.diagonal_xy()
    }
}
