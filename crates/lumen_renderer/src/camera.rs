//! Camera for ray generation.
//!
//! [`CameraSettings`] is the plain, serializable description of a shot.
//! [`CameraSettings::build`] validates it and derives the immutable
//! [`Camera`] that the render loops sample rays from.

use serde::{Deserialize, Serialize};

use crate::renderer::render_pixel;
use crate::sampling::{gen_f64, random_in_unit_disk};
use crate::{Hittable, RenderError, RenderResult};
use lumen_math::{Color, Point3, Ray, Vec3};
use rand::RngCore;

/// User-facing camera and quality settings.
///
/// Missing fields fall back to [`CameraSettings::default`] when
/// deserialized, so a settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    // Image
    pub image_width: u32,
    pub aspect_ratio: f64,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub antialiasing: bool,

    // Positioning
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,

    // Lens
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Cone angle of rays through each pixel, in degrees
    pub defocus_angle: f64,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 10,
            max_depth: 50,
            antialiasing: true,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set image width and aspect ratio; the height is derived.
    pub fn with_image(mut self, width: u32, aspect_ratio: f64) -> Self {
        self.image_width = width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_antialiasing(mut self, enabled: bool) -> Self {
        self.antialiasing = enabled;
        self
    }

    /// Image height, `floor(width / aspect_ratio)`.
    pub fn image_height(&self) -> u32 {
        (self.image_width as f64 / self.aspect_ratio) as u32
    }

    /// Validate the settings and derive the camera frame.
    pub fn build(&self) -> RenderResult<Camera> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(RenderError::InvalidAspectRatio(self.aspect_ratio));
        }

        let image_width = self.image_width;
        let image_height = self.image_height();
        if image_width == 0 || image_height == 0 {
            return Err(RenderError::InvalidImageSize {
                width: image_width,
                height: image_height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::ZeroSamples);
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(RenderError::InvalidFieldOfView(self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(RenderError::InvalidFocusDistance(self.focus_dist));
        }

        // Camera basis
        let w = (self.look_from - self.look_at)
            .try_normalize()
            .ok_or(RenderError::DegenerateView)?;
        let u = self.vup.cross(w).try_normalize().ok_or(RenderError::DegenerateView)?;
        let v = w.cross(u);

        let center = self.look_from;

        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * self.aspect_ratio;

        // Viewport edges; v runs down the image
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left = center - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();

        Ok(Camera {
            image_width,
            image_height,
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            antialiasing: self.antialiasing,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_angle: self.defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            samples_scale: 1.0 / self.samples_per_pixel as f64,
        })
    }
}

/// A validated camera, ready to generate rays.
///
/// Immutable once built and shared by reference with every render worker.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    antialiasing: bool,

    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,

    defocus_angle: f64,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,

    samples_scale: f64,
}

impl Camera {
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    /// Get the samples scale factor (1 / samples_per_pixel).
    pub fn samples_scale(&self) -> f64 {
        self.samples_scale
    }

    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The target is jittered inside the pixel, the origin is sampled on
    /// the defocus disk and the time is uniform in `[0, 1)`.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + (i as f64 + offset.x) * self.pixel_delta_u
            + (j as f64 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = (pixel_sample - ray_origin).normalize();
        let ray_time = gen_f64(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Ray through the exact center of pixel (i, j), from the camera center at time 0.
    pub fn center_ray(&self, i: u32, j: u32) -> Ray {
        let pixel_center = self.pixel00_loc + i as f64 * self.pixel_delta_u + j as f64 * self.pixel_delta_v;
        Ray::new(self.center, (pixel_center - self.center).normalize(), 0.0)
    }

    /// Estimate the color of pixel (i, j).
    pub fn pixel_color(&self, i: u32, j: u32, world: &dyn Hittable, rng: &mut dyn RngCore) -> Color {
        render_pixel(self, world, i, j, rng)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f64(rng) - 0.5, gen_f64(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(size: u32) -> CameraSettings {
        CameraSettings::new()
            .with_image(size, 1.0)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
    }

    #[test]
    fn test_default_settings_build() {
        let camera = CameraSettings::default().build().expect("defaults are valid");
        assert_eq!(camera.image_width(), 400);
        assert_eq!(camera.image_height(), 225);
        assert_eq!(camera.pixel_count(), 400 * 225);
        assert!((camera.samples_scale() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_image_height_floors() {
        let settings = CameraSettings::new().with_image(100, 3.0);
        assert_eq!(settings.image_height(), 33);
    }

    #[test]
    fn test_invalid_sizes() {
        assert_eq!(
            CameraSettings::new().with_image(0, 1.0).build().unwrap_err(),
            RenderError::InvalidImageSize { width: 0, height: 0 }
        );
        // 1 / 2 floors to a zero height
        assert_eq!(
            CameraSettings::new().with_image(1, 2.0).build().unwrap_err(),
            RenderError::InvalidImageSize { width: 1, height: 0 }
        );
    }

    #[test]
    fn test_invalid_settings() {
        assert_eq!(square(10).with_quality(0, 10).build().unwrap_err(), RenderError::ZeroSamples);
        assert!(matches!(
            square(10).with_image(10, f64::NAN).build(),
            Err(RenderError::InvalidAspectRatio(_))
        ));
        assert_eq!(
            square(10).with_image(10, -1.0).build().unwrap_err(),
            RenderError::InvalidAspectRatio(-1.0)
        );
        assert_eq!(
            square(10).with_lens(180.0, 0.0, 1.0).build().unwrap_err(),
            RenderError::InvalidFieldOfView(180.0)
        );
        assert_eq!(
            square(10).with_lens(90.0, 0.0, 0.0).build().unwrap_err(),
            RenderError::InvalidFocusDistance(0.0)
        );
    }

    #[test]
    fn test_degenerate_view() {
        let same_point = square(10).with_position(Point3::ONE, Point3::ONE, Vec3::Y);
        assert_eq!(same_point.build().unwrap_err(), RenderError::DegenerateView);

        // Looking straight up with vup = Y
        let collinear = square(10).with_position(Point3::ZERO, Point3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert_eq!(collinear.build().unwrap_err(), RenderError::DegenerateView);
    }

    #[test]
    fn test_center_ray_through_middle_pixel() {
        let camera = square(11).build().expect("valid");
        let ray = camera.center_ray(5, 5);

        assert_eq!(ray.origin(), Point3::ZERO);
        assert_eq!(ray.time(), 0.0);
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_center_ray_image_orientation() {
        let camera = square(11).build().expect("valid");

        // Row 0 is the top of the image, column 0 the left
        let top_left = camera.center_ray(0, 0).direction();
        assert!(top_left.x < 0.0);
        assert!(top_left.y > 0.0);
    }

    #[test]
    fn test_get_ray_is_normalized_and_timed() {
        let camera = square(100).build().expect("valid");
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let ray = camera.get_ray(50, 50, &mut rng);
            assert!((ray.direction().length() - 1.0).abs() < 1e-12);
            assert!((0.0..1.0).contains(&ray.time()));
            assert!(ray.direction().z < 0.0);
            assert_eq!(ray.origin(), Point3::ZERO);
        }
    }

    #[test]
    fn test_defocus_origin_stays_on_disk() {
        let settings = square(50).with_lens(40.0, 10.0, 4.0);
        let camera = settings.build().expect("valid");
        let radius = 4.0 * (5.0f64).to_radians().tan();
        let mut rng = StdRng::seed_from_u64(9);

        let mut moved = false;
        for _ in 0..500 {
            let ray = camera.get_ray(25, 25, &mut rng);
            let offset = ray.origin() - settings.look_from;
            assert!(offset.length() <= radius + 1e-12);
            assert!(offset.z.abs() < 1e-12);
            moved |= offset.length() > 0.0;
        }
        assert!(moved);
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: CameraSettings =
            serde_json::from_str(r#"{ "image_width": 200, "look_from": [13.0, 2.0, 3.0] }"#).expect("parse");

        assert_eq!(settings.image_width, 200);
        assert_eq!(settings.look_from, Point3::new(13.0, 2.0, 3.0));
        assert_eq!(settings.samples_per_pixel, CameraSettings::default().samples_per_pixel);
    }
}
