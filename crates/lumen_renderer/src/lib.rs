//! Lumen renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over analytic spheres:
//!
//! - **Acceleration**: [`BvhNode`] over any set of [`Hittable`] objects, with
//!   the flat [`Scene`] scan as the reference path
//! - **Shading**: [`Lambertian`], [`Metal`] and [`Dielectric`] materials,
//!   optionally textured
//! - **Camera**: antialiasing jitter, defocus blur and motion blur sampling
//! - **Scheduling**: single-threaded, channel worker pool and rayon buckets
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lumen_renderer::{render_parallel, CameraSettings, Lambertian, NoProgress,
//!     ParallelConfig, Scene, Sphere, Vec3};
//!
//! let mut scene = Scene::new();
//! scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5,
//!     Lambertian::new(Vec3::splat(0.5)))));
//! scene.enable_bvh(true);
//!
//! let camera = CameraSettings::new().with_image(400, 16.0 / 9.0).build()?;
//! let image = render_parallel(&camera, &scene, &ParallelConfig::default(), &NoProgress)?;
//! ```

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod parallel;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;

pub use bucket::{generate_buckets, render_bucket, render_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use parallel::{render_parallel, ParallelConfig, PixelResult, PixelTask};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, sky_gradient, ImageBuffer, NoProgress,
    RenderProgress, T_MIN,
};
pub use sampling::{gen_f64, stream_seed};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{CheckerTexture, SolidColor, Texture};

/// Re-export the math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
