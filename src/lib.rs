pub mod config;
pub mod egui_glue;
pub mod session;
pub mod ui;
pub mod viewer;
pub mod worker;

use anyhow::Result;
use mupdf::{Colorspace, Matrix};

/// Rasterize a single page to an opaque RGB pixmap at the given scale.
/// Returns (rgb_bytes, pixel_width, pixel_height).
pub fn rasterize_page(
    doc: &mupdf::Document,
    page_number: i32,
    scale: f32,
) -> Result<(Vec<u8>, u32, u32)> {
    let page = doc.load_page(page_number)?;

    let pixmap = page.to_pixmap(
        &Matrix::new_scale(scale, scale),
        &Colorspace::device_rgb(),
        false,
        true,
    )?;

    let width = pixmap.width();
    let height = pixmap.height();
    let samples = pixmap.samples().to_vec();

    Ok((samples, width, height))
}
