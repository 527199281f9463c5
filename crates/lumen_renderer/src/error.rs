//! Configuration errors reported by the renderer.

use thiserror::Error;

/// Errors raised while configuring a render.
///
/// These are programmer or user configuration faults. Numerical edge
/// cases during tracing never surface here; they are absorbed by the
/// optical model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid image size {width}x{height}: both dimensions must be at least 1")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Vertical field of view must be inside (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("Focus distance must be finite and positive, got {0}")]
    InvalidFocusDistance(f64),

    #[error("Camera basis is degenerate: look_from, look_at and vup must not be collinear")]
    DegenerateView,

    #[error("Parallel render needs at least one worker")]
    NoWorkers,

    #[error("Bucket size must be at least 1 pixel")]
    ZeroBucketSize,
}

/// Result type for render configuration.
pub type RenderResult<T> = Result<T, RenderError>;
