//! Topic geometry for the renderers.
//!
//!     The renderers do not decide where topics go; they ask a [`LayoutOracle`]. A GUI hands
//!     in the geometry it already computed for the screen. Headless callers get
//!     [`TreeLayout`]: the root in the middle, first-level topics stacked on the right or left
//!     branch, every subtree vertically centred on its parent.
//!
//!     Text is measured with fixed-advance metrics matching the bitmap font of the raster
//!     renderer.

use crate::common::images;
use crate::model::{attrs, MindMap, TopicId};
use crate::theme::Theme;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.w * factor, self.h * factor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicGeometry {
    pub bounds: Rect,
    /// Whether the topic hangs on the left branch.
    pub left_side: bool,
    /// Folded topic whose children are not laid out.
    pub children_hidden: bool,
    /// Size of the embedded image drawn above the text.
    pub image: Option<(f32, f32)>,
}

/// Geometry of every visible topic plus the canvas size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    topics: HashMap<TopicId, TopicGeometry>,
}

impl Layout {
    pub fn new(width: f32, height: f32, topics: HashMap<TopicId, TopicGeometry>) -> Self {
        Self {
            width,
            height,
            topics,
        }
    }

    pub fn geometry(&self, id: TopicId) -> Option<&TopicGeometry> {
        self.topics.get(&id)
    }

    pub fn is_visible(&self, id: TopicId) -> bool {
        self.topics.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

pub trait LayoutOracle: Send + Sync {
    fn layout(&self, map: &MindMap, theme: &Theme, unfold_all: bool) -> Layout;
}

/// Horizontal advance of one character.
pub fn char_advance(font_size: f32) -> f32 {
    font_size * 6.0 / 9.0
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * 10.0 / 9.0
}

/// Size of a block of (possibly multi-line) text.
pub fn text_size(text: &str, font_size: f32) -> (f32, f32) {
    let lines: Vec<&str> = text.split('\n').collect();
    let widest = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    (
        widest as f32 * char_advance(font_size),
        lines.len() as f32 * line_height(font_size),
    )
}

/// Default headless layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLayout;

struct Placement<'a> {
    map: &'a MindMap,
    theme: &'a Theme,
    unfold_all: bool,
    sizes: HashMap<TopicId, (f32, f32)>,
    images: HashMap<TopicId, (f32, f32)>,
    subtree: HashMap<TopicId, f32>,
    out: HashMap<TopicId, TopicGeometry>,
}

impl Placement<'_> {
    fn visible_children(&self, id: TopicId) -> &[TopicId] {
        let topic = &self.map[id];
        if topic.is_collapsed() && !self.unfold_all && id != self.map.root() {
            &[]
        } else {
            topic.children()
        }
    }

    fn measure(&mut self, id: TopicId) {
        let map = self.map;
        let topic = &map[id];
        let (mut w, mut h) = text_size(topic.text(), self.theme.font_size);
        if let Some(img) = topic
            .attribute(attrs::IMAGE)
            .and_then(images::decode_attribute)
        {
            let (iw, ih) = (img.width() as f32, img.height() as f32);
            self.images.insert(id, (iw, ih));
            w = w.max(iw);
            h += ih + if topic.text().is_empty() { 0.0 } else { self.theme.text_margins / 2.0 };
        }
        let margin = self.theme.text_margins * 2.0;
        self.sizes.insert(id, (w + margin, h + margin));
        for child in self.visible_children(id).to_vec() {
            self.measure(child);
        }
    }

    fn subtree_height(&mut self, id: TopicId, level: usize) -> f32 {
        if let Some(h) = self.subtree.get(&id) {
            return *h;
        }
        let own = self.sizes.get(&id).map(|s| s.1).unwrap_or_default();
        let children = self.visible_children(id).to_vec();
        let (_, vgap) = self.theme.insets(level);
        let stacked = self.stack_height(&children, level + 1, vgap);
        let height = own.max(stacked);
        self.subtree.insert(id, height);
        height
    }

    fn stack_height(&mut self, children: &[TopicId], level: usize, vgap: f32) -> f32 {
        if children.is_empty() {
            return 0.0;
        }
        let total: f32 = children
            .iter()
            .map(|c| self.subtree_height(*c, level))
            .sum();
        total + vgap * (children.len() - 1) as f32
    }

    fn place(&mut self, id: TopicId, edge: f32, top: f32, left: bool, level: usize) {
        let map = self.map;
        let (w, h) = self.sizes.get(&id).copied().unwrap_or_default();
        let span = self.subtree_height(id, level);
        let x = if left { edge - w } else { edge };
        let bounds = Rect::new(x, top + (span - h) / 2.0, w, h);
        let children = self.visible_children(id).to_vec();
        self.out.insert(
            id,
            TopicGeometry {
                bounds,
                left_side: left,
                children_hidden: children.is_empty() && map[id].has_children(),
                image: self.images.get(&id).copied(),
            },
        );

        let (hgap, vgap) = self.theme.insets(level);
        let stacked = self.stack_height(&children, level + 1, vgap);
        let mut y = top + (span - stacked) / 2.0;
        let next_edge = if left { x - hgap } else { x + w + hgap };
        for child in children {
            self.place(child, next_edge, y, left, level + 1);
            y += self.subtree_height(child, level + 1) + vgap;
        }
    }
}

impl LayoutOracle for TreeLayout {
    fn layout(&self, map: &MindMap, theme: &Theme, unfold_all: bool) -> Layout {
        let root = map.root();
        let mut placement = Placement {
            map,
            theme,
            unfold_all,
            sizes: HashMap::new(),
            images: HashMap::new(),
            subtree: HashMap::new(),
            out: HashMap::new(),
        };
        placement.measure(root);

        let (rw, rh) = placement.sizes.get(&root).copied().unwrap_or_default();
        let root_rect = Rect::new(-rw / 2.0, -rh / 2.0, rw, rh);
        placement.out.insert(
            root,
            TopicGeometry {
                bounds: root_rect,
                left_side: false,
                children_hidden: false,
                image: placement.images.get(&root).copied(),
            },
        );

        let (hgap, vgap) = theme.insets(0);
        let (left, right): (Vec<TopicId>, Vec<TopicId>) = map[root]
            .children()
            .iter()
            .partition(|c| map.is_left_sided(**c));
        for (branch, is_left) in [(right, false), (left, true)] {
            let stacked = placement.stack_height(&branch, 1, vgap);
            let mut y = -stacked / 2.0;
            let edge = if is_left {
                root_rect.x - hgap
            } else {
                root_rect.right() + hgap
            };
            for child in branch {
                placement.place(child, edge, y, is_left, 1);
                y += placement.subtree_height(child, 1) + vgap;
            }
        }

        let mut topics = placement.out;
        let min_x = topics.values().map(|g| g.bounds.x).fold(f32::INFINITY, f32::min);
        let min_y = topics.values().map(|g| g.bounds.y).fold(f32::INFINITY, f32::min);
        let max_x = topics.values().map(|g| g.bounds.right()).fold(f32::NEG_INFINITY, f32::max);
        let max_y = topics.values().map(|g| g.bounds.bottom()).fold(f32::NEG_INFINITY, f32::max);
        let margin = theme.paper_margins;
        let shadow = if theme.drop_shadow { theme.shadow_offset } else { 0.0 };
        for geometry in topics.values_mut() {
            geometry.bounds = geometry.bounds.translate(margin - min_x, margin - min_y);
        }
        Layout::new(
            (max_x - min_x) + margin * 2.0 + shadow,
            (max_y - min_y) + margin * 2.0 + shadow,
            topics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MindMap, TopicId, TopicId, TopicId) {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let right = map.create_child(root, "Right", None).unwrap();
        let left = map.create_child(root, "Left", None).unwrap();
        map.set_left_sided(left, true).unwrap();
        let hidden = map.create_child(left, "Hidden", None).unwrap();
        map.set_attribute(left, attrs::COLLAPSED, "true").unwrap();
        (map, right, left, hidden)
    }

    #[test]
    fn branches_go_to_their_side() {
        let (map, right, left, hidden) = sample();
        let theme = Theme::default();
        let layout = TreeLayout.layout(&map, &theme, false);
        let root = layout.geometry(map.root()).unwrap().bounds;
        let r = layout.geometry(right).unwrap();
        let l = layout.geometry(left).unwrap();

        assert!(r.bounds.x >= root.right());
        assert!(l.bounds.right() <= root.x);
        assert!(l.left_side && !r.left_side);
        assert!(l.children_hidden);
        assert!(!layout.is_visible(hidden));
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn unfold_all_shows_folded_children() {
        let (map, _, _, hidden) = sample();
        let layout = TreeLayout.layout(&map, &Theme::default(), true);
        assert!(layout.is_visible(hidden));
    }

    #[test]
    fn everything_fits_inside_the_margins() {
        let (map, ..) = sample();
        let theme = Theme::default();
        let layout = TreeLayout.layout(&map, &theme, true);
        for id in map.iter() {
            let g = layout.geometry(id).unwrap().bounds;
            assert!(g.x >= theme.paper_margins - 0.01);
            assert!(g.y >= theme.paper_margins - 0.01);
            assert!(g.right() <= layout.width);
            assert!(g.bottom() <= layout.height);
        }
    }

    #[test]
    fn text_size_counts_lines() {
        let (w, h) = text_size("ab\nabcd", 9.0);
        assert_eq!(w, 24.0);
        assert_eq!(h, 20.0);
    }
}
