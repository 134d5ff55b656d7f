//! Raster canvas on top of `image::RgbaImage`.
//!
//! Shapes are rasterized per pixel with plain alpha blending, no anti-aliasing. Text uses the
//! bitmap font in [`super::font`], scaled so a glyph cell matches the layout metrics.

use super::font::{glyph, is_set, GLYPH_COLUMNS, GLYPH_ROWS};
use super::{Canvas, Point, Stroke};
use crate::common::color::Color;
use crate::common::images::decode_attribute;
use crate::layout::{char_advance, Rect};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

pub struct RasterCanvas {
    image: RgbaImage,
    scale: f32,
}

impl RasterCanvas {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let w = (width * scale).ceil().max(1.0) as u32;
        let h = (height * scale).ceil().max(1.0) as u32;
        Self {
            image: RgbaImage::new(w, h),
            scale,
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let alpha = color.a as f32 / 255.0;
        let Rgba([r, g, b, a]) = *pixel;
        let mix = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;
        let out_a = (color.a as f32 + a as f32 * (1.0 - alpha)).round().min(255.0) as u8;
        *pixel = Rgba([mix(color.r, r), mix(color.g, g), mix(color.b, b), out_a]);
    }

    /// Fill the axis aligned box given in device pixels.
    fn fill_box(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        let (x0, x1) = (x0.round() as i64, x1.round() as i64);
        let (y0, y1) = (y0.round() as i64, y1.round() as i64);
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.blend(x, y, color);
            }
        }
    }

    fn stamp(&mut self, x: f32, y: f32, width: f32, color: Color) {
        let half = (width * self.scale / 2.0).max(0.5);
        let (cx, cy) = (x * self.scale, y * self.scale);
        self.fill_box(cx - half, cy - half, cx + half, cy + half, color);
    }

    /// Draw a polyline, carrying the dash phase across segments.
    fn polyline(&mut self, points: &[Point], stroke: Stroke) {
        let pattern = stroke.pattern();
        let mut travelled = 0.0f32;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
            let steps = (length * self.scale * 2.0).ceil().max(1.0) as usize;
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                let along = travelled + length * t;
                let visible = match pattern {
                    Some((on, off)) => along % (on + off) < on,
                    None => true,
                };
                if visible {
                    self.stamp(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, stroke.width, stroke.color);
                }
            }
            travelled += length;
        }
    }
}

fn inside_rounded(px: f32, py: f32, rect: Rect, radius: f32) -> bool {
    if px < rect.x || py < rect.y || px >= rect.right() || py >= rect.bottom() {
        return false;
    }
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    let cx = px.clamp(rect.x + r, rect.right() - r);
    let cy = py.clamp(rect.y + r, rect.bottom() - r);
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

fn inside_oval(px: f32, py: f32, rect: Rect) -> bool {
    let (rx, ry) = (rect.w / 2.0, rect.h / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    ((px - rect.center_x()) / rx).powi(2) + ((py - rect.center_y()) / ry).powi(2) <= 1.0
}

impl RasterCanvas {
    /// Fill `shape` and paint its border band, both tested per pixel centre in user space.
    fn shape(
        &mut self,
        bounds: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        inside: impl Fn(f32, f32, Rect) -> bool,
    ) {
        let device = bounds.scale(self.scale);
        let (x0, y0) = (device.x.floor() as i64, device.y.floor() as i64);
        let (x1, y1) = (device.right().ceil() as i64, device.bottom().ceil() as i64);
        let border = stroke.map(|s| s.width.max(0.5));
        let inner = border.map(|w| Rect::new(bounds.x + w, bounds.y + w, bounds.w - 2.0 * w, bounds.h - 2.0 * w));
        for y in y0..y1 {
            for x in x0..x1 {
                let (ux, uy) = ((x as f32 + 0.5) / self.scale, (y as f32 + 0.5) / self.scale);
                if !inside(ux, uy, bounds) {
                    continue;
                }
                let in_border = inner.is_some_and(|r| !inside(ux, uy, r));
                match (in_border, stroke, fill) {
                    (true, Some(s), _) => self.blend(x, y, s.color),
                    (false, _, Some(f)) => self.blend(x, y, f),
                    _ => {}
                }
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.polyline(&[from, to], stroke);
    }

    fn rect(&mut self, rect: Rect, corner_radius: f32, fill: Option<Color>, stroke: Option<Stroke>) {
        self.shape(rect, fill, stroke, |x, y, r| inside_rounded(x, y, r, corner_radius));
    }

    fn oval(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        self.shape(rect, fill, stroke, inside_oval);
    }

    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point, stroke: Stroke) {
        const SEGMENTS: usize = 32;
        let points: Vec<Point> = (0..=SEGMENTS)
            .map(|i| {
                let t = i as f32 / SEGMENTS as f32;
                let u = 1.0 - t;
                let blend = |a: f32, b: f32, c: f32, d: f32| {
                    u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
                };
                (
                    blend(from.0, c1.0, c2.0, to.0),
                    blend(from.1, c1.1, c2.1, to.1),
                )
            })
            .collect();
        self.polyline(&points, stroke);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, font_size: f32) {
        let unit = font_size / 9.0 * self.scale;
        let advance = char_advance(font_size) * self.scale;
        let top = y * self.scale - GLYPH_ROWS as f32 * unit;
        let mut left = x * self.scale;
        for ch in text.chars() {
            let bits = glyph(ch);
            for column in 0..GLYPH_COLUMNS {
                for row in 0..GLYPH_ROWS {
                    if is_set(bits, column, row) {
                        let px = left + column as f32 * unit;
                        let py = top + row as f32 * unit;
                        self.fill_box(px, py, px + unit, py + unit, color);
                    }
                }
            }
            left += advance;
        }
    }

    fn image(&mut self, rect: Rect, png_base64: &str) {
        let Some(decoded) = decode_attribute(png_base64) else {
            tracing::warn!("embedded topic image could not be decoded");
            return;
        };
        let device = rect.scale(self.scale);
        let mut src = decoded.to_rgba8();
        let (w, h) = (device.w.round().max(1.0) as u32, device.h.round().max(1.0) as u32);
        if (w, h) != src.dimensions() {
            src = imageops::resize(&src, w, h, FilterType::Triangle);
        }
        imageops::overlay(&mut self.image, &src, device.x.round() as i64, device.y.round() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_rect_paints_inside_only() {
        let mut canvas = RasterCanvas::new(20.0, 20.0, 1.0);
        canvas.rect(
            Rect::new(5.0, 5.0, 10.0, 10.0),
            0.0,
            Some(Color::rgb(255, 0, 0)),
            Some(Stroke::solid(Color::BLACK, 1.0)),
        );
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = RasterCanvas::new(4.0, 4.0, 1.0);
        canvas.rect(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0, Some(Color::WHITE), None);
        canvas.rect(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0, Some(Color::BLACK.with_alpha(128)), None);
        let px = canvas.into_image().get_pixel(1, 1)[0];
        assert!((126..=128).contains(&px));
    }

    #[test]
    fn text_leaves_ink() {
        let mut canvas = RasterCanvas::new(40.0, 20.0, 1.0);
        canvas.text(2.0, 12.0, "Hi", Color::rgb(0, 0, 255), 9.0);
        let img = canvas.into_image();
        assert!(img.pixels().any(|p| p == &Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn scale_grows_the_surface() {
        let canvas = RasterCanvas::new(10.0, 5.0, 2.0);
        assert_eq!(canvas.into_image().dimensions(), (20, 10));
    }
}
