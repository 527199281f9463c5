//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon, center-out.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::renderer::render_pixel;
use crate::sampling::stream_seed;
use crate::{Camera, Hittable, ImageBuffer, RenderError, RenderProgress, RenderResult};
use lumen_math::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in render order, also the RNG stream of the bucket
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets covering the image, sorted center-out.
///
/// Edge buckets are clipped to the image. `bucket_size` must be non-zero.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();

    for y in (0..height).step_by(bucket_size as usize) {
        for x in (0..width).step_by(bucket_size as usize) {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
        }
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center.
///
/// The sort is stable, so equidistant buckets keep row-major order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;

    let dist_sq = |b: &Bucket| {
        let dx = b.x as f64 + b.width as f64 / 2.0 - center_x;
        let dy = b.y as f64 + b.height as f64 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    buckets.sort_by(|a, b| dist_sq(a).total_cmp(&dist_sq(b)));
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, camera: &Camera, world: &dyn Hittable, rng: &mut dyn RngCore) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(camera, world, bucket.x + local_x, bucket.y + local_y, rng);
            pixels.push(color);
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their rectangle of `image`.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let row_len = self.bucket.width as usize;
        for (row, colors) in self.pixels.chunks_exact(row_len).enumerate() {
            let start = image.index(self.bucket.x, self.bucket.y + row as u32);
            image.pixels[start..start + row_len].copy_from_slice(colors);
        }
    }
}

/// Render the scene as buckets on the rayon thread pool.
///
/// Bucket `i` samples from RNG stream `(seed, i)`, so the image is
/// reproducible for a seed regardless of thread count.
pub fn render_buckets(
    camera: &Camera,
    world: &dyn Hittable,
    bucket_size: u32,
    seed: u64,
    progress: &dyn RenderProgress,
) -> RenderResult<ImageBuffer> {
    if bucket_size == 0 {
        return Err(RenderError::ZeroBucketSize);
    }

    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height())?;
    let buckets = generate_buckets(image.width, image.height, bucket_size);

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} as {} buckets of {}px",
        image.width,
        image.height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        buckets.len(),
        bucket_size
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(stream_seed(seed, bucket.index as u64));
            let pixels = render_bucket(bucket, camera, world, &mut rng);
            progress.inc(u64::from(bucket.pixel_count()));
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    for result in &results {
        result.write_into(&mut image);
    }

    progress.finish();
    log::debug!("Assembled {} buckets", results.len());
    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, CameraSettings, Lambertian, Metal, NoProgress, Scene, Sphere};
    use lumen_math::Point3;
    use std::sync::Arc;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);

        for bucket in &buckets {
            assert_eq!(bucket.width, 64);
            assert_eq!(bucket.height, 64);
        }
    }

    #[test]
    fn test_generate_buckets_partial() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4);

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);

        // Center bucket first, corners last
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        assert!(buckets[5..].iter().all(|b| b.x != 64 && b.y != 64));

        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.index, i);
        }
    }

    #[test]
    fn test_write_into_places_rectangle() {
        let mut image = ImageBuffer::new(5, 4).expect("non-empty");
        let bucket = Bucket::new(3, 1, 2, 2, 0);
        let pixels = vec![Color::splat(1.0), Color::splat(2.0), Color::splat(3.0), Color::splat(4.0)];

        BucketResult::new(bucket, pixels).write_into(&mut image);

        assert_eq!(image.get(3, 1), Color::splat(1.0));
        assert_eq!(image.get(4, 1), Color::splat(2.0));
        assert_eq!(image.get(3, 2), Color::splat(3.0));
        assert_eq!(image.get(4, 2), Color::splat(4.0));
        assert_eq!(image.get(2, 1), Color::ZERO);
    }

    #[test]
    fn test_buckets_match_single_threaded() {
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, -100.5, -1.0),
            100.0,
            Metal::new(Color::new(0.8, 0.8, 0.0), 0.0),
        )));
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, 0.0, -1.0),
            0.5,
            Metal::new(Color::new(0.7, 0.3, 0.3), 0.0),
        )));

        let camera = CameraSettings::new()
            .with_image(40, 16.0 / 9.0)
            .with_quality(1, 6)
            .with_antialiasing(false)
            .build()
            .expect("valid camera");

        let mut rng = StdRng::seed_from_u64(0);
        let reference = render(&camera, &scene, &mut rng, &NoProgress).expect("render");
        let image = render_buckets(&camera, &scene, 7, 3, &NoProgress).expect("render");

        assert_eq!(image, reference);
    }

    #[test]
    fn test_buckets_reproducible_with_noise() {
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::splat(0.5)),
        )));
        let camera = CameraSettings::new()
            .with_image(24, 1.0)
            .with_quality(4, 4)
            .build()
            .expect("valid camera");

        let first = render_buckets(&camera, &scene, 8, 11, &NoProgress).expect("render");
        let second = render_buckets(&camera, &scene, 8, 11, &NoProgress).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_bucket_size_rejected() {
        let camera = CameraSettings::new().build().expect("valid camera");
        assert_eq!(
            render_buckets(&camera, &Scene::new(), 0, 0, &NoProgress).unwrap_err(),
            RenderError::ZeroBucketSize
        );
    }
}
