//! Visual theme consumed by the renderers and the PlantUML/Mindmup exporters.

use crate::common::color::Color;
use crate::model::{attrs, MindMap, TopicId};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub paper_color: Color,
    pub root_fill: Color,
    pub first_level_fill: Color,
    pub other_level_fill: Color,
    pub root_text: Color,
    pub first_level_text: Color,
    pub other_level_text: Color,
    pub border_color: Color,
    pub connector_color: Color,
    pub jump_link_color: Color,
    pub shadow_color: Color,
    pub connector_width: f32,
    pub border_width: f32,
    pub jump_link_width: f32,
    pub drop_shadow: bool,
    pub shadow_offset: f32,
    pub paper_margins: f32,
    pub text_margins: f32,
    pub first_level_horizontal_inset: f32,
    pub first_level_vertical_inset: f32,
    pub other_level_horizontal_inset: f32,
    pub other_level_vertical_inset: f32,
    pub collapsator_size: f32,
    pub font_family: String,
    pub font_size: f32,
    /// Pixel scale of raster output.
    pub scale: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            paper_color: Color::rgb(0x61, 0x7B, 0x94),
            root_fill: Color::rgb(0x03, 0x1A, 0x31),
            first_level_fill: Color::rgb(0xB1, 0xBF, 0xCC),
            other_level_fill: Color::rgb(0xFD, 0xFD, 0xFD),
            root_text: Color::WHITE,
            first_level_text: Color::BLACK,
            other_level_text: Color::BLACK,
            border_color: Color::BLACK,
            connector_color: Color::WHITE,
            jump_link_color: Color::rgb(0x00, 0xFF, 0xFF),
            shadow_color: Color::BLACK.with_alpha(0x30),
            connector_width: 1.5,
            border_width: 1.0,
            jump_link_width: 1.5,
            drop_shadow: true,
            shadow_offset: 5.0,
            paper_margins: 20.0,
            text_margins: 10.0,
            first_level_horizontal_inset: 48.0,
            first_level_vertical_inset: 32.0,
            other_level_horizontal_inset: 32.0,
            other_level_vertical_inset: 16.0,
            collapsator_size: 16.0,
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            scale: 1.0,
        }
    }
}

/// Resolved colors of one topic: attribute overrides first, level defaults otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicColors {
    pub fill: Color,
    pub text: Color,
    pub border: Color,
}

impl Theme {
    pub fn default_fill(&self, level: usize) -> Color {
        match level {
            0 => self.root_fill,
            1 => self.first_level_fill,
            _ => self.other_level_fill,
        }
    }

    pub fn default_text(&self, level: usize) -> Color {
        match level {
            0 => self.root_text,
            1 => self.first_level_text,
            _ => self.other_level_text,
        }
    }

    pub fn colors(&self, map: &MindMap, id: TopicId) -> TopicColors {
        let level = map.level(id);
        let topic = &map[id];
        let pick = |key: &str, default: Color| {
            topic
                .attribute(key)
                .and_then(Color::parse)
                .unwrap_or(default)
        };
        TopicColors {
            fill: pick(attrs::FILL_COLOR, self.default_fill(level)),
            text: pick(attrs::TEXT_COLOR, self.default_text(level)),
            border: pick(attrs::BORDER_COLOR, self.border_color),
        }
    }

    /// Horizontal and vertical gap between a topic at `level` and its children.
    pub fn insets(&self, level: usize) -> (f32, f32) {
        if level == 0 {
            (
                self.first_level_horizontal_inset,
                self.first_level_vertical_inset,
            )
        } else {
            (
                self.other_level_horizontal_inset,
                self.other_level_vertical_inset,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_colors_override_level_defaults() {
        let mut map = MindMap::with_root("root");
        let root = map.root();
        let child = map.create_child(root, "child", None).unwrap();
        map.set_attribute(child, attrs::FILL_COLOR, "#FF0000").unwrap();
        let theme = Theme::default();

        let colors = theme.colors(&map, child);
        assert_eq!(colors.fill, Color::rgb(255, 0, 0));
        assert_eq!(colors.text, Color::BLACK);
        assert_eq!(theme.colors(&map, root).fill.to_html(), "#031A31");
    }
}
