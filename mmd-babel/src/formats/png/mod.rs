//! PNG export built on the raster canvas.
//!
//! Uses the same layout and drawing code as the SVG export; the canvas is scaled by
//! `theme.scale` before being encoded. The result is binary, so the CLI requires `-o`.

use crate::error::{FormatError, Result};
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::MindMap;
use crate::render::raster::RasterCanvas;
use crate::render::{export_layout, render_map};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub fn serialize_to_png(map: &MindMap, options: &ExportOptions) -> Result<Vec<u8>> {
    let theme = &options.theme;
    let layout = export_layout(map, options);
    let mut canvas = RasterCanvas::new(layout.width, layout.height, theme.scale);
    render_map(map, &layout, theme, options.draw_background, &mut canvas);
    let image = canvas.into_image();
    let (width, height) = image.dimensions();

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| FormatError::Serialization(format!("can't encode png: {e}")))?;
    tracing::debug!(width, height, bytes = bytes.len(), "png export finished");
    Ok(bytes)
}

/// Format implementation for PNG images
#[derive(Default)]
pub struct PngFormat;

impl Format for PngFormat {
    fn name(&self) -> &str {
        "png"
    }

    fn description(&self) -> &str {
        "Raster image of the diagram"
    }

    fn file_extensions(&self) -> &[&str] {
        &["png"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serialize_to_png(map, options).map(SerializedDocument::Binary)
    }
}
