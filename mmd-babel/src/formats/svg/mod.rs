//! SVG export (output only)
//!
//! The map is laid out (see [`crate::render::export_layout`]) and drawn on an
//! [`SvgCanvas`]. Folded branches stay hidden unless `unfold_all` is set; the paper color is
//! painted unless `draw_background` is cleared. Both can be switched per export with
//! `--extra-unfold-all` and `--extra-draw-background`.

use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::MindMap;
use crate::render::svg::SvgCanvas;
use crate::render::{export_layout, render_map};

pub fn serialize_to_svg(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let theme = &options.theme;
    let layout = export_layout(map, options);
    let mut canvas = SvgCanvas::new(layout.width, layout.height, &theme.font_family, theme.font_size);
    render_map(map, &layout, theme, options.draw_background, &mut canvas);
    let svg = canvas.finish();
    tracing::debug!(
        topics = layout.len(),
        width = layout.width,
        height = layout.height,
        "svg export finished"
    );
    Ok(svg)
}

/// Format implementation for SVG images
pub struct SvgFormat;

impl Format for SvgFormat {
    fn name(&self) -> &str {
        "svg"
    }

    fn description(&self) -> &str {
        "Scalable vector image of the diagram"
    }

    fn file_extensions(&self) -> &[&str] {
        &["svg"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serialize_to_svg(map, options).map(SerializedDocument::Text)
    }
}
