//! SVG canvas.

use super::{Canvas, Point, Stroke, StrokeStyle};
use crate::common::color::Color;
use crate::common::escape::escape_xml;
use crate::layout::Rect;

pub const FONT_CLASS: &str = "mindMapTitleFont";

pub struct SvgCanvas {
    width: f32,
    height: f32,
    font_family: String,
    font_size: f32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f32, height: f32, font_family: &str, font_size: f32) -> Self {
        Self {
            width,
            height,
            font_family: font_family.to_string(),
            font_size,
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 512);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<svg version=\"1.1\" baseProfile=\"tiny\" id=\"svg-root\" width=\"100%\" height=\"100%\" viewBox=\"0 0 {} {}\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
            dbl(self.width),
            dbl(self.height)
        ));
        out.push_str(&format!(
            "<style>.{FONT_CLASS} {{font-family: {}; font-size: {}px; font-style: normal; font-weight: normal;}}</style>\n",
            escape_xml(&self.font_family),
            dbl(self.font_size)
        ));
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

/// Format a coordinate with at most three decimals and no trailing zeros.
pub fn dbl(value: f32) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Alpha channel as a 0..1 fraction.
fn alpha(color: Color) -> String {
    dbl(color.a as f32 / 255.0)
}

fn fill_attrs(fill: Option<Color>) -> String {
    match fill {
        Some(color) if color.is_opaque() => format!(" fill=\"{}\"", color.to_svg()),
        Some(color) => format!(
            " fill=\"{}\" fill-opacity=\"{}\"",
            color.to_svg(),
            alpha(color)
        ),
        None => " fill=\"none\"".to_string(),
    }
}

fn stroke_attrs(stroke: Option<Stroke>) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let mut out = format!(
        " stroke=\"{}\" stroke-width=\"{}\"",
        stroke.color.to_svg(),
        dbl(stroke.width)
    );
    if !stroke.color.is_opaque() {
        out.push_str(&format!(" stroke-opacity=\"{}\"", alpha(stroke.color)));
    }
    match stroke.style {
        StrokeStyle::Solid => out.push_str(" stroke-linecap=\"round\""),
        StrokeStyle::Dashes | StrokeStyle::Dots => {
            if let Some((on, off)) = stroke.pattern() {
                out.push_str(&format!(" stroke-dasharray=\"{},{}\"", dbl(on), dbl(off)));
            }
        }
    }
    out
}

impl Canvas for SvgCanvas {
    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.body.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{}/>\n",
            dbl(from.0),
            dbl(from.1),
            dbl(to.0),
            dbl(to.1),
            stroke_attrs(Some(stroke))
        ));
    }

    fn rect(&mut self, rect: Rect, corner_radius: f32, fill: Option<Color>, stroke: Option<Stroke>) {
        let corners = if corner_radius > 0.0 {
            format!(" rx=\"{0}\" ry=\"{0}\"", dbl(corner_radius))
        } else {
            String::new()
        };
        self.body.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}{}{}/>\n",
            dbl(rect.x),
            dbl(rect.y),
            dbl(rect.w),
            dbl(rect.h),
            corners,
            fill_attrs(fill),
            stroke_attrs(stroke)
        ));
    }

    fn oval(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        self.body.push_str(&format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{}{}/>\n",
            dbl(rect.center_x()),
            dbl(rect.center_y()),
            dbl(rect.w / 2.0),
            dbl(rect.h / 2.0),
            fill_attrs(fill),
            stroke_attrs(stroke)
        ));
    }

    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point, stroke: Stroke) {
        self.body.push_str(&format!(
            "<path d=\"M{},{} C{},{} {},{} {},{}\" fill=\"none\"{}/>\n",
            dbl(from.0),
            dbl(from.1),
            dbl(c1.0),
            dbl(c1.1),
            dbl(c2.0),
            dbl(c2.1),
            dbl(to.0),
            dbl(to.1),
            stroke_attrs(Some(stroke))
        ));
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, font_size: f32) {
        let size = if (font_size - self.font_size).abs() > f32::EPSILON {
            format!(" font-size=\"{}px\"", dbl(font_size))
        } else {
            String::new()
        };
        let opacity = if color.is_opaque() {
            String::new()
        } else {
            format!(" fill-opacity=\"{}\"", alpha(color))
        };
        self.body.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" fill=\"{}\"{} class=\"{FONT_CLASS}\"{} xml:space=\"preserve\">{}</text>\n",
            dbl(x),
            dbl(y),
            color.to_svg(),
            opacity,
            size,
            escape_xml(text)
        ));
    }

    fn image(&mut self, rect: Rect, png_base64: &str) {
        self.body.push_str(&format!(
            "<image width=\"{}\" height=\"{}\" x=\"{}\" y=\"{}\" xlink:href=\"data:image/png;base64,{}\"/>\n",
            dbl(rect.w),
            dbl(rect.h),
            dbl(rect.x),
            dbl(rect.y),
            png_base64.trim()
        ));
    }
}
