//! Showcase scene: a checkered ground, three feature spheres and a grid
//! of small random spheres, some of them moving.

use std::sync::Arc;

use lumen_renderer::{
    CameraSettings, CheckerTexture, Color, Dielectric, Hittable, Lambertian, Material, Metal, Point3, Scene, Sphere,
    Vec3,
};
use rand::Rng;

/// Half-width of the random sphere grid.
const GRID_EXTENT: i32 = 8;

/// Camera framing for [`build_scene`].
pub fn demo_camera() -> CameraSettings {
    CameraSettings::new()
        .with_image(400, 16.0 / 9.0)
        .with_quality(512, 10)
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0)
        .with_antialiasing(true)
}

/// Build the showcase scene, drawing all randomness from `rng`.
pub fn build_scene<R: Rng>(rng: &mut R) -> Scene {
    let mut scene = Scene::new();

    // Ground
    let checker = Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    scene.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::textured(checker),
    )));

    // Three feature spheres
    scene.add(Arc::new(Sphere::new(
        Point3::new(0.0, 0.0, -1.0),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    )));
    scene.add(Arc::new(Sphere::new(Point3::new(-1.0, 0.0, -1.0), 0.5, Dielectric::new(1.5))));
    scene.add(Arc::new(Sphere::new(
        Point3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 1.0),
    )));

    // Small random spheres
    let keep_clear = Point3::new(4.0, 2.0, 0.0);
    for a in -GRID_EXTENT..GRID_EXTENT {
        for b in -GRID_EXTENT..GRID_EXTENT {
            let choose_size: f64 = rng.gen();
            let radius = if choose_size < 0.8 {
                rng.gen_range(0.1..0.25)
            } else if choose_size < 0.95 {
                rng.gen_range(0.25..0.4)
            } else {
                rng.gen_range(0.4..0.6)
            };

            let choose_mat: f64 = rng.gen();
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                radius,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - keep_clear).length() <= 0.9 {
                continue;
            }

            let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
            let moving = rng.gen::<f64>() <= 0.3;
            let rise = if moving { rng.gen_range(0.0..0.3) } else { 0.0 };

            let sphere: Arc<dyn Hittable> = if choose_mat < 0.8 {
                // Diffuse
                small_sphere(center, radius, rise, Lambertian::new(albedo))
            } else if choose_mat < 0.9 {
                // Metal
                small_sphere(center, radius, rise, Metal::new(albedo, rng.gen()))
            } else {
                // Glass
                small_sphere(center, radius, rise, Dielectric::new(1.5))
            };
            scene.add(sphere);
        }
    }

    log::info!("Created {} objects", scene.len());
    scene
}

fn small_sphere<M: Material + 'static>(center: Point3, radius: f64, rise: f64, material: M) -> Arc<dyn Hittable> {
    if rise > 0.0 {
        Arc::new(Sphere::moving(center, center + Vec3::new(0.0, rise, 0.0), radius, material))
    } else {
        Arc::new(Sphere::new(center, radius, material))
    }
}
