//! Multi-threaded renderer built on a channel worker pool.
//!
//! A fixed set of scoped worker threads pull pixel tasks from a shared
//! queue and push finished colors into a bounded result channel. A single
//! collector thread owns the image buffer and writes each result into
//! place, so no pixel storage is ever shared between threads.

use std::panic;
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use crate::renderer::render_pixel;
use crate::sampling::stream_seed;
use crate::{Camera, Hittable, ImageBuffer, RenderError, RenderProgress, RenderResult};
use lumen_math::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Results that may be in flight before workers block; 0 hands each
    /// result directly to the collector
    pub result_capacity: usize,
    /// Base seed; worker `i` draws from stream `(seed, i)`
    pub seed: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            result_capacity: 1024,
            seed: 0,
        }
    }
}

/// One pixel of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelTask {
    pub x: u32,
    pub y: u32,
    /// Row-major position in the image buffer
    pub index: usize,
}

/// A finished pixel on its way to the collector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResult {
    pub index: usize,
    pub color: Color,
}

/// Render the scene across `config.workers` threads.
///
/// Produces the same image layout as [`crate::render`]. Which worker
/// renders which pixel depends on scheduling, so with antialiasing on the
/// noise pattern is only reproducible for a single worker.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &ParallelConfig,
    progress: &dyn RenderProgress,
) -> RenderResult<ImageBuffer> {
    if config.workers == 0 {
        return Err(RenderError::NoWorkers);
    }

    let image = ImageBuffer::new(camera.image_width(), camera.image_height())?;
    let (width, height) = (image.width, image.height);

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} on {} workers",
        width,
        height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        config.workers
    );
    let start = Instant::now();

    let (task_tx, task_rx) = mpsc::channel::<PixelTask>();
    let task_rx = Mutex::new(task_rx);
    let (result_tx, result_rx) = mpsc::sync_channel::<PixelResult>(config.result_capacity);

    let image = thread::scope(|scope| {
        let collector = scope.spawn(move || {
            let mut image = image;
            for result in result_rx {
                image.pixels[result.index] = result.color;
                progress.inc(1);
            }
            image
        });

        let task_rx = &task_rx;
        let workers: Vec<_> = (0..config.workers)
            .map(|worker| {
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(stream_seed(config.seed, worker as u64));
                    let mut rendered = 0usize;

                    loop {
                        // Guard is released before rendering
                        let next = task_rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
                        let Ok(task) = next else { break };

                        let color = render_pixel(camera, world, task.x, task.y, &mut rng);
                        if result_tx.send(PixelResult { index: task.index, color }).is_err() {
                            break;
                        }
                        rendered += 1;
                    }

                    log::debug!("Worker {worker} finished after {rendered} pixels");
                })
            })
            .collect();

        'enqueue: for y in 0..height {
            for x in 0..width {
                let index = y as usize * width as usize + x as usize;
                // Every worker is gone; the joins below report why
                if task_tx.send(PixelTask { x, y, index }).is_err() {
                    break 'enqueue;
                }
            }
        }

        // Close the task queue so idle workers exit
        drop(task_tx);
        for worker in workers {
            if let Err(payload) = worker.join() {
                panic::resume_unwind(payload);
            }
        }

        // Last sender; the collector drains and returns
        drop(result_tx);
        match collector.join() {
            Ok(image) => image,
            Err(payload) => panic::resume_unwind(payload),
        }
    });

    progress.finish();
    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, CameraSettings, Lambertian, Metal, NoProgress, Scene, Sphere};
    use lumen_math::Point3;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Mirror spheres only, so every path is deterministic.
    fn mirror_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, -100.5, -1.0),
            100.0,
            Metal::new(Color::new(0.8, 0.8, 0.0), 0.0),
        )));
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, 0.0, -1.2),
            0.5,
            Metal::new(Color::new(0.1, 0.2, 0.5), 0.0),
        )));
        scene.add(Arc::new(Sphere::new(
            Point3::new(-1.0, 0.0, -1.0),
            0.5,
            Metal::new(Color::new(0.8, 0.8, 0.8), 0.0),
        )));
        scene.enable_bvh(true);
        scene
    }

    fn center_ray_camera(width: u32) -> Camera {
        CameraSettings::new()
            .with_image(width, 16.0 / 9.0)
            .with_quality(1, 6)
            .with_antialiasing(false)
            .build()
            .expect("valid camera")
    }

    #[test]
    fn test_parallel_matches_single_threaded() {
        let scene = mirror_scene();
        let camera = center_ray_camera(48);

        let mut rng = StdRng::seed_from_u64(0);
        let reference = render(&camera, &scene, &mut rng, &NoProgress).expect("render");

        let config = ParallelConfig {
            workers: 4,
            result_capacity: 16,
            seed: 99,
        };
        let image = render_parallel(&camera, &scene, &config, &NoProgress).expect("render");

        assert_eq!(image, reference);
    }

    #[test]
    fn test_tiny_result_capacity() {
        let scene = mirror_scene();
        let camera = center_ray_camera(32);
        let mut rng = StdRng::seed_from_u64(0);
        let reference = render(&camera, &scene, &mut rng, &NoProgress).expect("render");

        for result_capacity in [0, 1] {
            let config = ParallelConfig {
                workers: 3,
                result_capacity,
                seed: 1,
            };
            let image = render_parallel(&camera, &scene, &config, &NoProgress).expect("render");
            assert_eq!(image, reference);
        }
    }

    #[test]
    fn test_single_worker_is_reproducible() {
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(
            Point3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::splat(0.5)),
        )));
        let camera = CameraSettings::new()
            .with_image(16, 1.0)
            .with_quality(4, 5)
            .build()
            .expect("valid camera");
        let config = ParallelConfig {
            workers: 1,
            result_capacity: 8,
            seed: 7,
        };

        let first = render_parallel(&camera, &scene, &config, &NoProgress).expect("render");
        let second = render_parallel(&camera, &scene, &config, &NoProgress).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let scene = Scene::new();
        let camera = center_ray_camera(16);
        let config = ParallelConfig {
            workers: 0,
            ..ParallelConfig::default()
        };

        assert_eq!(
            render_parallel(&camera, &scene, &config, &NoProgress).unwrap_err(),
            RenderError::NoWorkers
        );
    }

    #[test]
    fn test_progress_sees_every_pixel() {
        struct Counter(AtomicU64);
        impl RenderProgress for Counter {
            fn inc(&self, n: u64) {
                self.0.fetch_add(n, Ordering::Relaxed);
            }
        }

        let scene = Scene::new();
        let camera = center_ray_camera(20);
        let counter = Counter(AtomicU64::new(0));
        let config = ParallelConfig {
            workers: 2,
            result_capacity: 4,
            seed: 0,
        };

        render_parallel(&camera, &scene, &config, &counter).expect("render");
        assert_eq!(counter.0.load(Ordering::Relaxed), camera.pixel_count() as u64);
    }

    #[test]
    fn test_default_config() {
        let config = ParallelConfig::default();
        assert!(config.workers >= 1);
        assert_eq!(config.result_capacity, 1024);
    }
}
