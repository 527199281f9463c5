//! Sphere primitive for ray tracing.

use crate::{HitRecord, Hittable, Material};
use lumen_math::{Aabb, Interval, Point3, Ray, Vec3};
use std::f64::consts::PI;

/// A sphere primitive, optionally moving along a straight line.
///
/// A moving sphere is at `center` at time 0 and at `center + motion` at
/// time 1; rays sample the position at their own time.
pub struct Sphere<M: Material> {
    center: Point3,
    motion: Option<Vec3>,
    radius: f64,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new stationary sphere.
    pub fn new(center: Point3, radius: f64, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            motion: None,
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving from `center0` (time 0) to `center1` (time 1).
    ///
    /// The bounding box covers the whole sweep.
    pub fn moving(center0: Point3, center1: Point3, radius: f64, material: M) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: center0,
            motion: Some(center1 - center0),
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    /// Center of the sphere at the given time.
    #[inline]
    pub fn center_at(&self, time: f64) -> Point3 {
        match self.motion {
            Some(motion) => self.center + time * motion,
            None => self.center,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn material(&self) -> &M {
        &self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f64, f64) {
        // theta: angle up from -Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl<M: Material + 'static> Hittable for Sphere<M> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let center = self.center_at(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        let mut rec = HitRecord::new(ray, root, outward_normal, &self.material);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);

        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
