//! Oriented cutting planes.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{SectionError, SectionResult};

/// A plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3<f64>,
    /// Unit normal.
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing `normal`.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::DegeneratePlane`] for a zero or non-finite normal.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> SectionResult<Self> {
        let length = normal.norm();
        if !length.is_finite() || length <= f64::EPSILON {
            return Err(SectionError::DegeneratePlane {
                normal: [normal.x, normal.y, normal.z],
            });
        }
        Ok(Self {
            origin,
            normal: normal / length,
        })
    }

    /// Plane through `a` perpendicular to the segment `a -> b`.
    ///
    /// The normal points from `b` towards `a`.
    pub fn from_edge(a: Point3<f64>, b: Point3<f64>) -> SectionResult<Self> {
        Self::new(a, a - b)
    }

    /// Signed distance from `p` to the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal)
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal * self.signed_distance(p)
    }

    /// Orthonormal in-plane axes `(u, v)` with `u x v = normal`.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        orthonormal_basis(&self.normal)
    }

    /// Coordinates of `p` in the plane's `(u, v)` frame.
    pub fn to_2d(&self, p: &Point3<f64>) -> (f64, f64) {
        let (u, v) = self.basis();
        let d = p - self.origin;
        (d.dot(&u), d.dot(&v))
    }
}

/// Two unit vectors spanning the plane orthogonal to `normal`.
pub(crate) fn orthonormal_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let u = if normal.x.abs() < 0.9 {
        Vector3::x().cross(normal).normalize()
    } else {
        Vector3::y().cross(normal).normalize()
    };
    let v = normal.cross(&u);
    (u, v)
}
