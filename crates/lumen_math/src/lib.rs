//! Lumen math types: vectors, intervals, rays and bounding boxes.
//!
//! Vectors are glam's double precision `DVec3`. `Point3` and `Color` are
//! aliases that only document intent.

// Re-export glam for convenience
pub use glam::{dvec3, DVec3};

/// A direction or displacement in 3D space.
pub type Vec3 = DVec3;

/// A location in 3D space.
pub type Point3 = DVec3;

/// Linear RGB color, one channel per component.
pub type Color = DVec3;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
