//! Axis-aligned bounding volumes.
//!
//! Sections accumulate their local boxes by unioning, so [`Aabb`] has an
//! explicit empty state that behaves as the identity of `union`. [`Bounds`]
//! is the world-space box/sphere pair handed to the renderer.

use cgmath::{Matrix4, Vector3, Vector4};

/// An axis-aligned bounding box with a representable empty state.
///
/// `Aabb::empty()` contains nothing and is the identity element of
/// [`Aabb::union`]; growing an empty box by a point yields a zero-size box at
/// that point. An empty box stays empty under [`Aabb::transform_by`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    /// The empty box. `min > max` on every axis, so any union replaces it.
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all of `points`. Empty input gives the empty box.
    pub fn from_points<I: IntoIterator<Item = Vector3<f32>>>(points: I) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Whether the box contains anything at all.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Expand to contain `point`.
    pub fn grow(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Expand to contain `other`. Unioning with an empty box is a no-op.
    pub fn union(&mut self, other: &Aabb) {
        if other.is_valid() {
            self.grow(other.min);
            self.grow(other.max);
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }

    /// The box containing all eight corners transformed by `matrix`.
    ///
    /// Transforming the corners (rather than min/max) keeps the result
    /// conservative under rotation and mirroring.
    pub fn transform_by(&self, matrix: &Matrix4<f32>) -> Aabb {
        if !self.is_valid() {
            return Self::empty();
        }
        let mut out = Self::empty();
        for i in 0..8 {
            let corner = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let moved = matrix * corner;
            out.grow(Vector3::new(moved.x, moved.y, moved.z));
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// World-space bounds as the renderer consumes them: an origin-centered box
/// plus a bounding sphere radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub origin: Vector3<f32>,
    pub box_extent: Vector3<f32>,
    pub sphere_radius: f32,
}

impl Bounds {
    /// A zero-size bound at the origin, used when a component has no valid
    /// local box (no sections, or all sections cleared).
    pub fn zero() -> Self {
        Self {
            origin: Vector3::new(0.0, 0.0, 0.0),
            box_extent: Vector3::new(0.0, 0.0, 0.0),
            sphere_radius: 0.0,
        }
    }

    /// Scale box extent and sphere radius by `factor`, keeping the origin.
    pub fn scaled(mut self, factor: f32) -> Self {
        self.box_extent *= factor;
        self.sphere_radius *= factor;
        self
    }
}

impl From<Aabb> for Bounds {
    fn from(aabb: Aabb) -> Self {
        if !aabb.is_valid() {
            return Self::zero();
        }
        let extent = aabb.extent();
        Self {
            origin: aabb.center(),
            box_extent: extent,
            sphere_radius: (extent.x * extent.x + extent.y * extent.y + extent.z * extent.z)
                .sqrt(),
        }
    }
}
