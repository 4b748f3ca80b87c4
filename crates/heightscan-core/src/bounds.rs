//! Axis-aligned boxes and bounding spheres for sizing cameras.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Component-wise bounds of `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self { min: p, max: p }),
            Some(b) => Some(Self {
                min: b.min.min(p),
                max: b.max.max(p),
            }),
        })
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal projected onto the XY plane.
    ///
    /// The viewer uses this as its base view height.
    pub fn diagonal_xy(&self) -> f32 {
        self.size().truncate().length()
    }
}

/// Sphere enclosing a set of points, centered on their bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Computes the sphere for `points`.
    ///
    /// The center is the bounding box midpoint and the radius the largest
    /// distance from it. An empty set yields a zero sphere at the origin.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
        I::IntoIter: Clone,
    {
        let points = points.into_iter();
        let Some(aabb) = Aabb::from_points(points.clone()) else {
            return Self::default();
        };
        let center = aabb.center();
        let radius_sq = points.fold(0.0_f32, |r2, p| r2.max(p.distance_squared(center)));

        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }
}
