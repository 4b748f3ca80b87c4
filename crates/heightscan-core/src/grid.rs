//! Dense height grids built from unordered surface samples.

use std::cmp::Ordering;

use crate::error::{HeightscanError, Result};

/// A single surface sample in working units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<(f32, f32, f32)> for Sample {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

/// A regular 2D grid of heights with spacing and origin metadata.
///
/// Heights are stored row-major: rows follow the sorted distinct y coordinates,
/// columns the sorted distinct x coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    rows: usize,
    cols: usize,
    heights: Vec<f32>,
    x_spacing: f32,
    y_spacing: f32,
    x_origin: f32,
    y_origin: f32,
}

impl HeightGrid {
    /// Creates a grid from an existing row-major height buffer.
    ///
    /// `spacing` and `origin` are `(x, y)` pairs.
    pub fn from_heights(
        rows: usize,
        cols: usize,
        heights: Vec<f32>,
        spacing: (f32, f32),
        origin: (f32, f32),
    ) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            HeightscanError::InvalidMesh(format!("grid of {rows}x{cols} cells overflows"))
        })?;
        if heights.len() != expected {
            return Err(HeightscanError::InvalidMesh(format!(
                "height buffer holds {} values, expected {rows}x{cols} = {expected}",
                heights.len()
            )));
        }

        Ok(Self {
            rows,
            cols,
            heights,
            x_spacing: spacing.0,
            y_spacing: spacing.1,
            x_origin: origin.0,
            y_origin: origin.1,
        })
    }

    /// Number of rows (distinct y values).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (distinct x values).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Distance between the first two distinct x values, 0 for a single column.
    pub fn x_spacing(&self) -> f32 {
        self.x_spacing
    }

    /// Distance between the first two distinct y values, 0 for a single row.
    pub fn y_spacing(&self) -> f32 {
        self.y_spacing
    }

    /// Smallest observed x coordinate.
    pub fn x_origin(&self) -> f32 {
        self.x_origin
    }

    /// Smallest observed y coordinate.
    pub fn y_origin(&self) -> f32 {
        self.y_origin
    }

    /// Height at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the cell is outside the grid.
    #[inline]
    pub fn height(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of range");
        self.heights[row * self.cols + col]
    }

    /// The heights of one row.
    pub fn row(&self, row: usize) -> &[f32] {
        &self.heights[row * self.cols..(row + 1) * self.cols]
    }

    /// All heights in row-major order.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Minimum and maximum height, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.heights.iter().fold(None, |acc, &h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Builds a [`HeightGrid`] from unordered samples.
///
/// Coordinates are matched by exact equality; no tolerance or snapping is
/// applied. Samples landing on the same cell overwrite each other in input
/// order, so the last one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBuilder;

impl GridBuilder {
    /// Builds the grid.
    ///
    /// Fails with [`HeightscanError::Parse`] when no finite sample is given.
    pub fn build(samples: &[Sample]) -> Result<HeightGrid> {
        let skipped = samples.iter().filter(|s| !s.is_finite()).count();
        if skipped > 0 {
            log::debug!("ignoring {skipped} non-finite samples");
        }
        let samples: Vec<Sample> = samples
            .iter()
            .filter(|s| s.is_finite())
            // Adding zero folds -0.0 into 0.0 so both land on one coordinate
            .map(|s| Sample::new(s.x + 0.0, s.y + 0.0, s.z))
            .collect();

        if samples.is_empty() {
            return Err(HeightscanError::Parse(
                "no valid samples in input".to_string(),
            ));
        }

        let xs = distinct_sorted(samples.iter().map(|s| s.x));
        let ys = distinct_sorted(samples.iter().map(|s| s.y));

        let rows = ys.len();
        let cols = xs.len();
        let mut heights = vec![0.0; rows * cols];

        for s in &samples {
            let col = axis_index(&xs, s.x);
            let row = axis_index(&ys, s.y);
            heights[row * cols + col] = s.z;
        }

        log::debug!(
            "built {rows}x{cols} height grid from {} samples",
            samples.len()
        );

        HeightGrid::from_heights(
            rows,
            cols,
            heights,
            (axis_spacing(&xs), axis_spacing(&ys)),
            (xs[0], ys[0]),
        )
    }
}

fn distinct_sorted(values: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut values: Vec<f32> = values.collect();
    values.sort_unstable_by(f32::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    values
}

fn axis_spacing(sorted: &[f32]) -> f32 {
    match sorted {
        [first, second, ..] => second - first,
        _ => 0.0,
    }
}

fn axis_index(sorted: &[f32], value: f32) -> usize {
    // Every value was collected into `sorted`, so the search always hits.
    sorted
        .binary_search_by(|probe| probe.total_cmp(&value))
        .unwrap_or_else(|insert_at| insert_at.min(sorted.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn samples(points: &[(f32, f32, f32)]) -> Vec<Sample> {
        points.iter().copied().map(Sample::from).collect()
    }

    #[test]
    fn test_build_regular_grid() {
        let input = samples(&[
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 2.0),
            (0.0, 2.0, 3.0),
            (1.0, 2.0, 4.0),
            (0.0, 4.0, 5.0),
            (1.0, 4.0, 6.0),
        ]);
        let grid = GridBuilder::build(&input).unwrap();

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.x_spacing(), 1.0);
        assert_eq!(grid.y_spacing(), 2.0);
        assert_eq!(grid.x_origin(), 0.0);
        assert_eq!(grid.y_origin(), 0.0);
        assert_eq!(grid.height(0, 1), 2.0);
        assert_eq!(grid.height(2, 0), 5.0);
        assert_eq!(grid.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_build_unordered_input() {
        let input = samples(&[
            (2.0, 1.0, 9.0),
            (1.0, 1.0, 8.0),
            (2.0, -1.0, 7.0),
            (1.0, -1.0, 6.0),
        ]);
        let grid = GridBuilder::build(&input).unwrap();

        assert_eq!(grid.x_origin(), 1.0);
        assert_eq!(grid.y_origin(), -1.0);
        assert_eq!(grid.heights(), &[6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_last_write_wins() {
        let input = samples(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (0.0, 0.0, 3.0)]);
        let grid = GridBuilder::build(&input).unwrap();
        assert_eq!(grid.height(0, 0), 3.0);
        assert_eq!(grid.height(0, 1), 2.0);
    }

    #[test]
    fn test_single_sample_grid() {
        let grid = GridBuilder::build(&samples(&[(5.0, 7.0, 1.5)])).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (1, 1));
        assert_eq!(grid.x_spacing(), 0.0);
        assert_eq!(grid.y_spacing(), 0.0);
        assert_eq!(grid.x_origin(), 5.0);
        assert_eq!(grid.y_origin(), 7.0);
    }

    #[test]
    fn test_single_column_grid() {
        let input = samples(&[(1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 2.0, 0.0)]);
        let grid = GridBuilder::build(&input).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 1));
        assert_eq!(grid.x_spacing(), 0.0);
        assert_eq!(grid.y_spacing(), 1.0);
    }

    #[test]
    fn test_missing_cells_are_zero() {
        let input = samples(&[(0.0, 0.0, 1.0), (1.0, 1.0, 2.0)]);
        let grid = GridBuilder::build(&input).unwrap();
        assert_eq!(grid.height(0, 1), 0.0);
        assert_eq!(grid.height(1, 0), 0.0);
    }

    #[test]
    fn test_negative_zero_is_one_coordinate() {
        let input = samples(&[(-0.0, 0.0, 1.0), (0.0, 0.0, 2.0), (1.0, 0.0, 3.0)]);
        let grid = GridBuilder::build(&input).unwrap();
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.height(0, 0), 2.0);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = GridBuilder::build(&[]).unwrap_err();
        assert!(matches!(err, HeightscanError::Parse(_)));
    }

    #[test]
    fn test_non_finite_only_is_parse_error() {
        let input = samples(&[(f32::NAN, 0.0, 1.0), (0.0, f32::INFINITY, 1.0)]);
        let err = GridBuilder::build(&input).unwrap_err();
        assert!(matches!(err, HeightscanError::Parse(_)));
    }

    #[test]
    fn test_from_heights_rejects_mismatch() {
        let err = HeightGrid::from_heights(2, 2, vec![0.0; 3], (1.0, 1.0), (0.0, 0.0)).unwrap_err();
        assert!(matches!(err, HeightscanError::InvalidMesh(_)));
    }

    #[test]
    fn test_min_max() {
        let grid =
            HeightGrid::from_heights(1, 3, vec![2.0, -1.0, 5.0], (1.0, 0.0), (0.0, 0.0)).unwrap();
        assert_eq!(grid.min_max(), Some((-1.0, 5.0)));
    }

    proptest! {
        #[test]
        fn prop_dimensions_match_distinct_coordinates(
            points in prop::collection::vec((-50i32..50, -50i32..50, -10.0f32..10.0), 1..200)
        ) {
            let input: Vec<Sample> = points
                .iter()
                .map(|&(x, y, z)| Sample::new(x as f32 * 0.25, y as f32 * 0.5, z))
                .collect();
            let mut xs: Vec<i32> = points.iter().map(|p| p.0).collect();
            let mut ys: Vec<i32> = points.iter().map(|p| p.1).collect();
            xs.sort_unstable();
            xs.dedup();
            ys.sort_unstable();
            ys.dedup();

            let grid = GridBuilder::build(&input).unwrap();
            prop_assert_eq!(grid.cols(), xs.len());
            prop_assert_eq!(grid.rows(), ys.len());
            prop_assert_eq!(grid.heights().len(), xs.len() * ys.len());
        }
    }
}
