//! Image file output.
//!
//! Plain-text PPM (`P3`) is always available; any other extension is
//! handed to the `image` crate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lumen_renderer::{color_to_rgb, ImageBuffer};
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Refusing to write an empty image")]
    EmptyImage,

    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Write `image` as ASCII PPM: header, then one image row per line.
pub fn write_ppm<W: Write>(writer: &mut W, image: &ImageBuffer) -> OutputResult<()> {
    check_buffer(image)?;

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for row in image.pixels.chunks_exact(image.width as usize) {
        let line: Vec<String> = row
            .iter()
            .map(|color| {
                let [r, g, b] = color_to_rgb(*color);
                format!("{r} {g} {b}")
            })
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }

    writer.flush()?;
    Ok(())
}

/// Save `image` to `path`, choosing the format from the extension.
///
/// `.ppm` (or no extension) writes PPM; anything else goes through
/// `image`, e.g. `.png`.
pub fn save_image(image: &ImageBuffer, path: &Path) -> OutputResult<()> {
    check_buffer(image)?;

    let is_ppm = path
        .extension()
        .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let mut writer = BufWriter::new(File::create(path)?);
        write_ppm(&mut writer, image)?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8()).ok_or(
            OutputError::BufferSize {
                width: image.width,
                height: image.height,
            },
        )?;
        rgb.save(path)?;
    }

    log::info!("Saved {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}

fn check_buffer(image: &ImageBuffer) -> OutputResult<()> {
    if image.is_empty() || image.width == 0 || image.height == 0 {
        return Err(OutputError::EmptyImage);
    }
    if image.pixels.len() != image.width as usize * image.height as usize {
        return Err(OutputError::BufferSize {
            width: image.width,
            height: image.height,
        });
    }
    Ok(())
}
