//! Procedural textures for diffuse materials.

use std::sync::Arc;

use lumen_math::{Color, Point3};

/// A color that varies over a surface.
pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world point `p`.
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

/// A texture with the same color everywhere.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.albedo
    }
}

/// 3D checkerboard alternating between two textures.
///
/// Cells are cubes of side `scale` in world space, so the pattern does not
/// depend on the surface UV mapping.
pub struct CheckerTexture {
    inv_scale: f64,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    /// Create a checker from two arbitrary textures.
    pub fn new(scale: f64, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    /// Create a checker alternating between two solid colors.
    pub fn from_colors(scale: f64, even: Color, odd: Color) -> Self {
        Self::new(scale, Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);

        if parity == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::ONE;
    const BLACK: Color = Color::ZERO;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::new(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.3, 0.7, Point3::new(5.0, 1.0, -2.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let tex = CheckerTexture::from_colors(1.0, WHITE, BLACK);

        assert_eq!(tex.value(0.0, 0.0, Point3::new(0.5, 0.5, 0.5)), WHITE);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(1.5, 0.5, 0.5)), BLACK);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(1.5, 1.5, 0.5)), WHITE);
    }

    #[test]
    fn test_checker_negative_cells() {
        let tex = CheckerTexture::from_colors(1.0, WHITE, BLACK);

        // floor(-0.5) = -1, odd cell
        assert_eq!(tex.value(0.0, 0.0, Point3::new(-0.5, 0.5, 0.5)), BLACK);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(-0.5, -0.5, 0.5)), WHITE);
    }

    #[test]
    fn test_checker_scale() {
        let tex = CheckerTexture::from_colors(2.0, WHITE, BLACK);

        assert_eq!(tex.value(0.0, 0.0, Point3::new(1.5, 0.0, 0.0)), WHITE);
        assert_eq!(tex.value(0.0, 0.0, Point3::new(2.5, 0.0, 0.0)), BLACK);
    }
}
