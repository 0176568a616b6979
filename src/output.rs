//! Image file output.
//!
//! Converts the renderer's pixel buffer to 8-bit PNG. Pixels arrive already
//! gamma-corrected and clamped to [0, 0.999], so the conversion is a plain
//! scale to bytes. Default filenames carry a local timestamp so repeated
//! renders never overwrite each other.

use chrono::Local;
use image::{ImageBuffer, Rgb};
use log::info;

use lumen::color;
use lumen::renderer::Image;

/// Build a timestamped filename like `out_2026-08-27_14-03-52.png`.
pub fn timestamped_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Local::now().format("%Y-%m-%d_%H-%M-%S"),
        extension
    )
}

/// Save a rendered image as an 8-bit PNG.
pub fn save_png(image: &Image, path: &str) -> image::ImageResult<()> {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(image.width, image.height, |x, y| {
            Rgb(color::to_rgb8(image.pixel(x, y)))
        });

    buffer.save(path)?;
    info!("image saved as {path}");
    Ok(())
}
