//! Synthetic height fields shared by the integration tests.

#![allow(dead_code)]

use heightscan::{Measurement, Sample};

/// Grid points per side; spacing 1/16 over [-1, 1].
pub const N: usize = 33;
pub const SPACING: f32 = 0.0625;

/// Vertex index of grid cell `(row, col)`.
pub fn index(row: usize, col: usize) -> usize {
    row * N + col
}

fn coord(i: usize) -> f32 {
    -1.0 + i as f32 * SPACING
}

fn height_field(f: impl Fn(f32, f32) -> f32) -> Measurement {
    let samples: Vec<Sample> = (0..N)
        .flat_map(|r| (0..N).map(move |c| (coord(c), coord(r))))
        .map(|(x, y)| Sample::new(x, y, f(x, y)))
        .collect();
    Measurement::from_samples(&samples).unwrap()
}

/// Smooth cap peaking at the center.
pub fn dome() -> Measurement {
    height_field(|x, y| 0.3 * (1.0 - (x * x + y * y) / 2.0))
}

/// Flat plate with a deep, three-cell-wide trench along the Y axis.
pub fn trench() -> Measurement {
    height_field(|x, _| if x.abs() < 0.1 { -0.5 } else { 0.0 })
}
