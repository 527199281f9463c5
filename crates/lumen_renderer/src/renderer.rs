//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a per-path bounce budget
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use std::time::Instant;

use crate::{Camera, Hittable, RenderError, RenderResult};
use lumen_math::{Color, Interval, Ray};
use rand::RngCore;

/// Lower bound of every scene query, so a scattered ray does not
/// re-hit the surface it just left.
pub const T_MIN: f64 = 0.001;

/// Compute the color seen by a ray.
///
/// Traces the ray through the scene, bouncing off surfaces and
/// multiplying attenuations until the ray escapes to the sky, is
/// absorbed, or runs out of depth.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, world, depth - 1, rng),
        None => Color::ZERO,
    }
}

/// Background for rays that escape the scene: white at the horizon
/// blending to sky blue straight up.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 1.0);
    let to_byte = |c: f64| (255.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Estimate the color of pixel (x, y).
///
/// Averages `samples_per_pixel` jittered camera rays, or traces the
/// single center ray when antialiasing is off.
pub fn render_pixel(camera: &Camera, world: &dyn Hittable, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    if !camera.antialiasing() {
        let ray = camera.center_ray(x, y);
        return ray_color(&ray, world, camera.max_depth(), rng);
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..camera.samples_per_pixel() {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth(), rng);
    }

    pixel_color * camera.samples_scale()
}

/// Observer notified as pixels complete.
///
/// Purely advisory; renders behave the same with [`NoProgress`].
pub trait RenderProgress: Send + Sync {
    /// `n` more pixels are done.
    fn inc(&self, n: u64);

    /// The render is complete.
    fn finish(&self) {}
}

/// Progress observer that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl RenderProgress for NoProgress {
    fn inc(&self, _n: u64) {}
}

/// Row-major image of linear colors, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidImageSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        })
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Gamma-corrected 8-bit RGB bytes, three per pixel, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color));
        }
        bytes
    }
}

/// Render the entire scene on the calling thread.
///
/// Pixels are visited row by row with one RNG stream, so the result is
/// reproducible for a given seed.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    rng: &mut dyn RngCore,
    progress: &dyn RenderProgress,
) -> RenderResult<ImageBuffer> {
    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height())?;

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} (single thread)",
        image.width,
        image.height,
        camera.samples_per_pixel(),
        camera.max_depth()
    );
    let start = Instant::now();

    for y in 0..image.height {
        for x in 0..image.width {
            let color = render_pixel(camera, world, x, y, rng);
            image.set(x, y, color);
        }
        progress.inc(u64::from(image.width));
    }

    progress.finish();
    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(image)
}
