//! Diagram rendering.
//!
//!     [`render_map`] turns a map plus its [`Layout`] into primitive draw calls on a
//!     [`Canvas`]: background, connectors, jump arrows, topic boxes, images, text and fold
//!     markers, in that order. The SVG and PNG formats only differ in the canvas they pass.

pub mod font;
pub mod raster;
pub mod svg;

use crate::common::color::Color;
use crate::format::ExportOptions;
use crate::layout::{line_height, text_size, Layout, LayoutOracle, Rect, TreeLayout};
use crate::model::{attrs, MindMap, TopicId};
use crate::theme::Theme;

pub type Point = (f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    Solid,
    Dashes,
    Dots,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub style: StrokeStyle,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    pub fn with_style(self, style: StrokeStyle) -> Self {
        Self { style, ..self }
    }

    /// Length of the visible and the invisible part of one dash period.
    pub fn pattern(&self) -> Option<(f32, f32)> {
        let w = self.width.max(1.0);
        match self.style {
            StrokeStyle::Solid => None,
            StrokeStyle::Dashes => Some((w * 2.0, w)),
            StrokeStyle::Dots => Some((w, w * 2.0)),
        }
    }
}

pub trait Canvas {
    fn line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn rect(&mut self, rect: Rect, corner_radius: f32, fill: Option<Color>, stroke: Option<Stroke>);
    fn oval(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>);
    /// Cubic Bézier curve.
    fn curve(&mut self, from: Point, c1: Point, c2: Point, to: Point, stroke: Stroke);
    /// One line of text; `y` is the baseline.
    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, font_size: f32);
    fn image(&mut self, rect: Rect, png_base64: &str);
}

/// Layout for an export: the caller's oracle if it supplied one, the tree layout otherwise.
pub fn export_layout(map: &MindMap, options: &ExportOptions) -> Layout {
    match &options.layout {
        Some(oracle) => oracle.layout(map, &options.theme, options.unfold_all),
        None => TreeLayout.layout(map, &options.theme, options.unfold_all),
    }
}

/// Draw the whole diagram.
pub fn render_map(map: &MindMap, layout: &Layout, theme: &Theme, draw_background: bool, canvas: &mut dyn Canvas) {
    if draw_background {
        canvas.rect(
            Rect::new(0.0, 0.0, layout.width, layout.height),
            0.0,
            Some(theme.paper_color),
            None,
        );
    }

    let visible: Vec<TopicId> = map.iter().filter(|t| layout.is_visible(*t)).collect();

    for id in &visible {
        draw_connectors(map, layout, theme, *id, canvas);
    }
    if map
        .attribute(attrs::MAP_SHOW_JUMPS)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        for id in &visible {
            draw_jump(map, layout, theme, *id, canvas);
        }
    }
    for id in &visible {
        draw_topic(map, layout, theme, *id, canvas);
    }
}

fn draw_connectors(map: &MindMap, layout: &Layout, theme: &Theme, id: TopicId, canvas: &mut dyn Canvas) {
    let Some(parent) = layout.geometry(id) else { return };
    let stroke = Stroke::solid(theme.connector_color, theme.connector_width);
    let is_root = id == map.root();
    for child in map[id].children() {
        let Some(geometry) = layout.geometry(*child) else { continue };
        let child_box = geometry.bounds;
        let to_x = if geometry.left_side {
            child_box.right()
        } else {
            child_box.x
        };
        let to = (to_x, child_box.center_y());
        if is_root {
            let from = (parent.bounds.center_x(), parent.bounds.center_y());
            let mid = (from.0 + to.0) / 2.0;
            canvas.curve(from, (mid, from.1), (mid, to.1), to, stroke);
        } else {
            let from_x = if geometry.left_side {
                parent.bounds.x
            } else {
                parent.bounds.right()
            };
            let from = (from_x, parent.bounds.center_y());
            let elbow = (from.0 + to.0) / 2.0;
            canvas.line(from, (elbow, from.1), stroke);
            canvas.line((elbow, from.1), (elbow, to.1), stroke);
            canvas.line((elbow, to.1), to, stroke);
        }
    }
}

fn draw_jump(map: &MindMap, layout: &Layout, theme: &Theme, id: TopicId, canvas: &mut dyn Canvas) {
    let Some(uid) = map[id].jump_target() else { return };
    let Some(target) = map.find_topic_by_uid(uid) else { return };
    let (Some(from), Some(to)) = (layout.geometry(id), layout.geometry(target)) else {
        return;
    };
    let stroke = Stroke {
        color: theme.jump_link_color,
        width: theme.jump_link_width,
        style: StrokeStyle::Dashes,
    };
    let start = (from.bounds.center_x(), from.bounds.center_y());
    let end = (to.bounds.center_x(), to.bounds.y);
    let lift = (start.1.min(end.1) - theme.other_level_vertical_inset * 2.0).max(0.0);
    canvas.curve(start, (start.0, lift), (end.0, lift), end, stroke);

    let arrow = theme.jump_link_width * 4.0;
    canvas.line(end, (end.0 - arrow, end.1 - arrow), stroke.with_style(StrokeStyle::Solid));
    canvas.line(end, (end.0 + arrow, end.1 - arrow), stroke.with_style(StrokeStyle::Solid));
}

fn draw_topic(map: &MindMap, layout: &Layout, theme: &Theme, id: TopicId, canvas: &mut dyn Canvas) {
    let Some(geometry) = layout.geometry(id) else { return };
    let topic = &map[id];
    let colors = theme.colors(map, id);
    let bounds = geometry.bounds;
    let radius = if id == map.root() {
        (bounds.h / 2.0).min(16.0)
    } else {
        4.0
    };

    if theme.drop_shadow {
        canvas.rect(
            bounds.translate(theme.shadow_offset, theme.shadow_offset),
            radius,
            Some(theme.shadow_color),
            None,
        );
    }
    canvas.rect(
        bounds,
        radius,
        Some(colors.fill),
        Some(Stroke::solid(colors.border, theme.border_width)),
    );

    let mut top = bounds.y + theme.text_margins;
    if let (Some((w, h)), Some(data)) = (geometry.image, topic.attribute(attrs::IMAGE)) {
        let x = bounds.x + (bounds.w - w) / 2.0;
        canvas.image(Rect::new(x, top, w, h), data);
        top += h + theme.text_margins / 2.0;
    }

    if !topic.text().is_empty() {
        let line_h = line_height(theme.font_size);
        let inner = bounds.w - theme.text_margins * 2.0;
        let align = topic.attribute(attrs::ALIGN).unwrap_or("center");
        for (index, line) in topic.text().split('\n').enumerate() {
            let (line_w, _) = text_size(line, theme.font_size);
            let offset = match align {
                "left" => 0.0,
                "right" => inner - line_w,
                _ => (inner - line_w) / 2.0,
            };
            let baseline = top + line_h * (index as f32 + 1.0) - line_h * 0.2;
            canvas.text(bounds.x + theme.text_margins + offset, baseline, line, colors.text, theme.font_size);
        }
    }

    if geometry.children_hidden {
        let size = theme.collapsator_size;
        let x = if geometry.left_side {
            bounds.x - size / 2.0
        } else {
            bounds.right() - size / 2.0
        };
        canvas.oval(
            Rect::new(x, bounds.center_y() - size / 2.0, size, size),
            Some(theme.other_level_fill),
            Some(Stroke::solid(colors.border, theme.border_width)),
        );
    }
}
