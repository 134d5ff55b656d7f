//! Image embedding: any supported raster in, base64 PNG out.

use crate::error::{Diagnostic, ModelError};
use crate::model::{attrs, MindMap, MmUri, TopicId};
use crate::resources::ResourceLoader;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub base64_png: String,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.base64_png)
    }
}

/// Decode PNG, GIF or JPEG bytes and re-encode them as base64 PNG.
pub fn embed(bytes: &[u8]) -> Result<EmbeddedImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let mut png = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(EmbeddedImage {
        base64_png: STANDARD.encode(&png),
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Payload of a `data:` URL, if it is a base64 one.
pub fn data_url_bytes(url: &str) -> Option<Vec<u8>> {
    let rest = url.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Decode the base64 PNG stored in a topic attribute.
pub fn decode_attribute(base64_png: &str) -> Option<DynamicImage> {
    let bytes = STANDARD.decode(base64_png.trim()).ok()?;
    image::load_from_memory(&bytes).ok()
}

/// Fetch an image (data URL or through the loader) and embed it. Failures are reported and
/// yield `None`.
pub fn load(loader: &dyn ResourceLoader, reference: &str, format: &str) -> Option<EmbeddedImage> {
    let bytes = match data_url_bytes(reference) {
        Some(bytes) => bytes,
        None => match loader.load(&MmUri::parse(reference)) {
            Ok(bytes) => bytes,
            Err(diagnostic) => {
                diagnostic.report(format);
                return None;
            }
        },
    };
    match embed(&bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            Diagnostic::resource(reference, e).report(format);
            None
        }
    }
}

/// Store an embedded image on a topic.
pub fn attach(
    map: &mut MindMap,
    topic: TopicId,
    image: &EmbeddedImage,
    name: Option<&str>,
) -> Result<(), ModelError> {
    map.set_attribute(topic, attrs::IMAGE, image.base64_png.clone())?;
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        map.set_attribute(topic, attrs::IMAGE_NAME, name)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}
