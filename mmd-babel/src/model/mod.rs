//! Mind map document model
//!
//!     A [`MindMap`] owns every [`Topic`] in an arena indexed by [`TopicId`]. Parents are stored
//!     as ids, so the tree has no reference cycles and the whole map is a plain `Clone`.
//!     Removed topics leave a tombstone: ids are never reused within one map.
//!
//!     Jumps between topics ([`Extra::TopicJump`]) hold the target's UID attribute, never an id,
//!     so cyclic jumps keep the tree itself acyclic.
//!
//!     Traversal order is pre-order, depth first, left to right ([`MindMap::iter`]). Every
//!     exporter relies on it.

pub mod attrs;
pub mod extra;
pub mod uri;

pub use extra::{Extra, ExtraType, Note};
pub use uri::MmUri;

use crate::error::ModelError;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};
use std::ops::Index;

/// Handle of a topic inside its owning [`MindMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId(usize);

impl TopicId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Topic {
    text: String,
    attributes: BTreeMap<String, String>,
    extras: BTreeMap<ExtraType, Extra>,
    code_snippets: IndexMap<String, String>,
    children: Vec<TopicId>,
    parent: Option<TopicId>,
}

impl Topic {
    fn new(text: impl Into<String>, parent: Option<TopicId>) -> Self {
        Self {
            text: text.into(),
            parent,
            ..Default::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.attribute(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Extras in the fixed File, Link, TopicJump, Note order.
    pub fn extras(&self) -> impl Iterator<Item = &Extra> {
        self.extras.values()
    }

    pub fn extra(&self, kind: ExtraType) -> Option<&Extra> {
        self.extras.get(&kind)
    }

    pub fn has_extras(&self) -> bool {
        !self.extras.is_empty()
    }

    pub fn note(&self) -> Option<&Note> {
        match self.extras.get(&ExtraType::Note) {
            Some(Extra::Note(note)) => Some(note),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<&MmUri> {
        match self.extras.get(&ExtraType::Link) {
            Some(Extra::Link(uri)) => Some(uri),
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&MmUri> {
        match self.extras.get(&ExtraType::File) {
            Some(Extra::File(uri)) => Some(uri),
            _ => None,
        }
    }

    pub fn jump_target(&self) -> Option<&str> {
        match self.extras.get(&ExtraType::TopicJump) {
            Some(Extra::TopicJump(uid)) => Some(uid),
            _ => None,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.attribute(attrs::UID)
    }

    pub fn code_snippets(&self) -> &IndexMap<String, String> {
        &self.code_snippets
    }

    pub fn children(&self) -> &[TopicId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn parent(&self) -> Option<TopicId> {
        self.parent
    }

    pub fn is_collapsed(&self) -> bool {
        self.flag(attrs::COLLAPSED)
    }
}

#[derive(Debug, Clone)]
pub struct MindMap {
    nodes: Vec<Option<Topic>>,
    root: TopicId,
    attributes: BTreeMap<String, String>,
    uid_counter: u64,
}

impl Default for MindMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<TopicId> for MindMap {
    type Output = Topic;

    fn index(&self, id: TopicId) -> &Topic {
        match self.get(id) {
            Some(topic) => topic,
            None => panic!("topic {id:?} is not part of this map"),
        }
    }
}

impl MindMap {
    /// A map holding a single unlabeled root.
    pub fn new() -> Self {
        Self::with_root("")
    }

    pub fn with_root(text: impl Into<String>) -> Self {
        Self {
            nodes: vec![Some(Topic::new(text, None))],
            root: TopicId(0),
            attributes: BTreeMap::new(),
            uid_counter: 0,
        }
    }

    pub fn root(&self) -> TopicId {
        self.root
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: TopicId) -> Result<&mut Topic, ModelError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnknownTopic(id))
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live topics.
    pub fn topic_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_map_attribute(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.attributes.insert(key, value);
            }
            None => {
                self.attributes.remove(&key);
            }
        }
    }

    /// Create a topic under `parent`, appended or inserted before one of its children.
    pub fn create_child(
        &mut self,
        parent: TopicId,
        text: impl Into<String>,
        insert_before: Option<TopicId>,
    ) -> Result<TopicId, ModelError> {
        let position = {
            let parent_topic = self.get(parent).ok_or(ModelError::UnknownTopic(parent))?;
            match insert_before {
                Some(before) => Some(
                    parent_topic
                        .children
                        .iter()
                        .position(|c| *c == before)
                        .ok_or(ModelError::InvalidParent(before))?,
                ),
                None => None,
            }
        };

        let id = TopicId(self.nodes.len());
        self.nodes.push(Some(Topic::new(text, Some(parent))));
        let children = &mut self.get_mut(parent)?.children;
        match position {
            Some(index) => children.insert(index, id),
            None => children.push(id),
        }
        Ok(id)
    }

    /// Remove a topic with its subtree. Removing the root resets it instead.
    ///
    /// Jumps pointing into the removed subtree are dropped so editing never leaves dangling
    /// references behind.
    pub fn remove(&mut self, id: TopicId) -> Result<(), ModelError> {
        if !self.contains(id) {
            return Err(ModelError::UnknownTopic(id));
        }

        let doomed: Vec<TopicId> = if id == self.root {
            self[id].children.iter().flat_map(|c| self.iter_from(*c)).collect()
        } else {
            self.iter_from(id).collect()
        };
        let mut removed_uids: HashSet<String> = doomed
            .iter()
            .filter_map(|t| self[*t].uid().map(str::to_string))
            .collect();

        if id == self.root {
            if let Some(uid) = self[id].uid() {
                removed_uids.insert(uid.to_string());
            }
            let root = self.get_mut(id)?;
            root.text.clear();
            root.attributes.clear();
            root.extras.clear();
            root.code_snippets.clear();
            root.children.clear();
        } else {
            let parent = self[id].parent;
            if let Some(parent) = parent {
                self.get_mut(parent)?.children.retain(|c| *c != id);
            }
        }

        for topic in doomed {
            self.nodes[topic.0] = None;
        }

        if !removed_uids.is_empty() {
            for topic in self.nodes.iter_mut().flatten() {
                let dangling = matches!(
                    topic.extras.get(&ExtraType::TopicJump),
                    Some(Extra::TopicJump(uid)) if removed_uids.contains(uid)
                );
                if dangling {
                    topic.extras.remove(&ExtraType::TopicJump);
                }
            }
        }
        Ok(())
    }

    /// Move `topic` right before `sibling` in their common parent.
    pub fn move_before(&mut self, topic: TopicId, sibling: TopicId) -> Result<(), ModelError> {
        self.reorder(topic, sibling, 0)
    }

    /// Move `topic` right after `sibling` in their common parent.
    pub fn move_after(&mut self, topic: TopicId, sibling: TopicId) -> Result<(), ModelError> {
        self.reorder(topic, sibling, 1)
    }

    fn reorder(&mut self, topic: TopicId, sibling: TopicId, offset: usize) -> Result<(), ModelError> {
        let parent = self.get(topic).ok_or(ModelError::UnknownTopic(topic))?.parent;
        let sibling_parent = self.get(sibling).ok_or(ModelError::UnknownTopic(sibling))?.parent;
        let parent = parent.ok_or(ModelError::RootOperation)?;
        if Some(parent) != sibling_parent {
            return Err(ModelError::NotSibling(topic, sibling));
        }
        if topic == sibling {
            return Ok(());
        }
        let children = &mut self.get_mut(parent)?.children;
        children.retain(|c| *c != topic);
        let anchor = children
            .iter()
            .position(|c| *c == sibling)
            .ok_or(ModelError::NotSibling(topic, sibling))?;
        children.insert(anchor + offset, topic);
        Ok(())
    }

    pub fn set_text(&mut self, id: TopicId, text: impl Into<String>) -> Result<(), ModelError> {
        self.get_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        id: TopicId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.get_mut(id)?.attributes.insert(key.into(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: TopicId, key: &str) -> Result<Option<String>, ModelError> {
        Ok(self.get_mut(id)?.attributes.remove(key))
    }

    /// Set an extra, replacing any existing extra of the same type.
    pub fn set_extra(&mut self, id: TopicId, extra: Extra) -> Result<(), ModelError> {
        self.get_mut(id)?.extras.insert(extra.extra_type(), extra);
        Ok(())
    }

    pub fn remove_extra(&mut self, id: TopicId, kind: ExtraType) -> Result<Option<Extra>, ModelError> {
        Ok(self.get_mut(id)?.extras.remove(&kind))
    }

    /// Attach a code snippet. A second snippet in the same language replaces the first.
    pub fn add_code_snippet(
        &mut self,
        id: TopicId,
        language: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.get_mut(id)?
            .code_snippets
            .insert(language.into(), body.into());
        Ok(())
    }

    pub fn remove_code_snippet(&mut self, id: TopicId, language: &str) -> Result<Option<String>, ModelError> {
        Ok(self.get_mut(id)?.code_snippets.shift_remove(language))
    }

    pub fn find_topic_by_uid(&self, uid: &str) -> Option<TopicId> {
        self.iter().find(|t| self[*t].uid() == Some(uid))
    }

    /// Distance from the root (root is 0).
    pub fn level(&self, id: TopicId) -> usize {
        let mut level = 0;
        let mut current = self.get(id).and_then(|t| t.parent);
        while let Some(parent) = current {
            level += 1;
            current = self.get(parent).and_then(|t| t.parent);
        }
        level
    }

    /// Child indices from the root down to `id` (empty for the root).
    pub fn path(&self, id: TopicId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|t| t.parent) {
            let index = self[parent]
                .children
                .iter()
                .position(|c| *c == current)
                .unwrap_or_default();
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Index of `id` among its siblings.
    pub fn sibling_index(&self, id: TopicId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self[parent].children.iter().position(|c| *c == id)
    }

    /// Lazy pre-order traversal of the whole map. Restartable: every call starts over.
    pub fn iter(&self) -> PreOrder<'_> {
        self.iter_from(self.root)
    }

    pub fn iter_from(&self, start: TopicId) -> PreOrder<'_> {
        let stack = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        PreOrder { map: self, stack }
    }

    /// Return the topic UID, assigning a fresh one if missing.
    pub fn ensure_uid(&mut self, id: TopicId) -> Result<String, ModelError> {
        if let Some(uid) = self.get(id).ok_or(ModelError::UnknownTopic(id))?.uid() {
            return Ok(uid.to_string());
        }
        let existing: HashSet<String> = self
            .iter()
            .filter_map(|t| self[t].uid().map(str::to_string))
            .collect();
        let uid = loop {
            self.uid_counter += 1;
            let candidate = format!("UID{:04X}", self.uid_counter);
            if !existing.contains(&candidate) {
                break candidate;
            }
        };
        self.set_attribute(id, attrs::UID, uid.clone())?;
        Ok(uid)
    }

    /// Make `source` jump to `target`.
    pub fn link_to(&mut self, source: TopicId, target: TopicId) -> Result<(), ModelError> {
        if !self.contains(source) {
            return Err(ModelError::UnknownTopic(source));
        }
        let uid = self.ensure_uid(target)?;
        self.set_extra(source, Extra::TopicJump(uid))
    }

    /// Deep copy a subtree of `from` under `into_parent`. UIDs are not copied.
    pub fn copy_subtree(
        &mut self,
        from: &MindMap,
        topic: TopicId,
        into_parent: TopicId,
    ) -> Result<TopicId, ModelError> {
        let source = from.get(topic).ok_or(ModelError::UnknownTopic(topic))?;
        let copy = self.create_child(into_parent, source.text.clone(), None)?;
        {
            let target = self.get_mut(copy)?;
            target.attributes = source.attributes.clone();
            target.attributes.remove(attrs::UID);
            target.extras = source.extras.clone();
            target.code_snippets = source.code_snippets.clone();
        }
        for child in source.children.clone() {
            self.copy_subtree(from, child, copy)?;
        }
        Ok(copy)
    }

    pub fn find_all_with_extra(&self, kind: ExtraType) -> Vec<TopicId> {
        self.iter()
            .filter(|t| self[*t].extra(kind).is_some())
            .collect()
    }

    pub fn remove_attribute_from_subtree(&mut self, id: TopicId, key: &str) -> Result<usize, ModelError> {
        let ids: Vec<TopicId> = self.iter_from(id).collect();
        let mut removed = 0;
        for topic in ids {
            if self.get_mut(topic)?.attributes.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn remove_extra_from_subtree(&mut self, id: TopicId, kind: ExtraType) -> Result<usize, ModelError> {
        let ids: Vec<TopicId> = self.iter_from(id).collect();
        let mut removed = 0;
        for topic in ids {
            if self.get_mut(topic)?.extras.remove(&kind).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Expand every folded topic.
    pub fn unfold_all(&mut self) {
        for topic in self.nodes.iter_mut().flatten() {
            topic.attributes.remove(attrs::COLLAPSED);
        }
    }

    /// First-level topics on the left branch.
    pub fn is_left_sided(&self, id: TopicId) -> bool {
        self.get(id).is_some_and(|t| t.flag(attrs::LEFT_SIDE))
    }

    pub fn set_left_sided(&mut self, id: TopicId, left: bool) -> Result<(), ModelError> {
        let topic = self.get_mut(id)?;
        if left {
            topic.attributes.insert(attrs::LEFT_SIDE.to_string(), "true".to_string());
        } else {
            topic.attributes.remove(attrs::LEFT_SIDE);
        }
        Ok(())
    }

    /// Whether `topic` lies in the subtree of `ancestor` (itself included).
    pub fn is_descendant(&self, topic: TopicId, ancestor: TopicId) -> bool {
        let mut current = Some(topic);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|t| t.parent);
        }
        false
    }
}

/// Pre-order iterator over topic ids.
pub struct PreOrder<'a> {
    map: &'a MindMap,
    stack: Vec<TopicId>,
}

impl Iterator for PreOrder<'_> {
    type Item = TopicId;

    fn next(&mut self) -> Option<TopicId> {
        let id = self.stack.pop()?;
        if let Some(topic) = self.map.get(id) {
            self.stack.extend(topic.children.iter().rev().copied());
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MindMap, TopicId, TopicId, TopicId) {
        let mut map = MindMap::with_root("Plan");
        let root = map.root();
        let a = map.create_child(root, "Buy milk", None).unwrap();
        let b = map.create_child(root, "Call Bob", None).unwrap();
        let c = map.create_child(a, "Skimmed", None).unwrap();
        (map, a, b, c)
    }

    fn texts(map: &MindMap) -> Vec<String> {
        map.iter().map(|t| map[t].text().to_string()).collect()
    }

    #[test]
    fn new_map_has_single_unlabeled_root() {
        let map = MindMap::new();
        assert_eq!(map.topic_count(), 1);
        assert_eq!(map[map.root()].text(), "");
        assert!(map[map.root()].parent().is_none());
    }

    #[test]
    fn iteration_is_pre_order() {
        let (map, ..) = sample();
        assert_eq!(texts(&map), vec!["Plan", "Buy milk", "Skimmed", "Call Bob"]);
        // restartable
        assert_eq!(texts(&map), vec!["Plan", "Buy milk", "Skimmed", "Call Bob"]);
    }

    #[test]
    fn insert_before_keeps_order() {
        let (mut map, a, b, _) = sample();
        let root = map.root();
        let x = map.create_child(root, "First", Some(a)).unwrap();
        assert_eq!(map[root].children(), &[x, a, b]);
        assert_eq!(
            map.create_child(a, "bad", Some(b)),
            Err(ModelError::InvalidParent(b))
        );
    }

    #[test]
    fn level_and_path() {
        let (map, a, b, c) = sample();
        assert_eq!(map.level(map.root()), 0);
        assert_eq!(map.level(c), 2);
        assert_eq!(map.path(c), vec![0, 0]);
        assert_eq!(map.path(b), vec![1]);
        assert_eq!(map.sibling_index(a), Some(0));
    }

    #[test]
    fn move_between_siblings() {
        let (mut map, a, b, c) = sample();
        map.move_before(b, a).unwrap();
        assert_eq!(map[map.root()].children(), &[b, a]);
        map.move_after(b, a).unwrap();
        assert_eq!(map[map.root()].children(), &[a, b]);
        assert_eq!(map.move_before(c, b), Err(ModelError::NotSibling(c, b)));
        assert_eq!(map.move_before(map.root(), a), Err(ModelError::RootOperation));
    }

    #[test]
    fn remove_drops_subtree_and_jumps_into_it() {
        let (mut map, a, b, c) = sample();
        map.link_to(b, c).unwrap();
        assert!(map[b].jump_target().is_some());
        map.remove(a).unwrap();
        assert_eq!(map.topic_count(), 2);
        assert!(!map.contains(c));
        assert!(map[b].jump_target().is_none());
        assert_eq!(map.remove(a), Err(ModelError::UnknownTopic(a)));
    }

    #[test]
    fn removing_root_resets_it() {
        let (mut map, ..) = sample();
        let root = map.root();
        map.set_extra(root, Extra::note("x")).unwrap();
        map.remove(root).unwrap();
        assert_eq!(map.topic_count(), 1);
        assert_eq!(map[root].text(), "");
        assert!(!map[root].has_extras());
    }

    #[test]
    fn uids_are_unique_and_stable() {
        let (mut map, a, b, _) = sample();
        map.set_attribute(b, attrs::UID, "UID0001").unwrap();
        let uid_a = map.ensure_uid(a).unwrap();
        assert_ne!(uid_a, "UID0001");
        assert_eq!(map.ensure_uid(a).unwrap(), uid_a);
        assert_eq!(map.find_topic_by_uid(&uid_a), Some(a));
        assert_eq!(map.find_topic_by_uid("nope"), None);
    }

    #[test]
    fn extras_replace_by_type_and_keep_order() {
        let (mut map, a, ..) = sample();
        map.set_extra(a, Extra::note("one")).unwrap();
        map.set_extra(a, Extra::link("https://example.com")).unwrap();
        map.set_extra(a, Extra::file("a.txt")).unwrap();
        map.set_extra(a, Extra::note("two")).unwrap();
        let kinds: Vec<_> = map[a].extras().map(Extra::extra_type).collect();
        assert_eq!(
            kinds,
            vec![ExtraType::File, ExtraType::Link, ExtraType::Note]
        );
        assert_eq!(map[a].note().map(|n| n.text.as_str()), Some("two"));
        assert!(map.remove_extra(a, ExtraType::Link).unwrap().is_some());
        assert!(map[a].link().is_none());
    }

    #[test]
    fn code_snippets_keep_insertion_order() {
        let (mut map, a, ..) = sample();
        map.add_code_snippet(a, "rust", "fn main() {}").unwrap();
        map.add_code_snippet(a, "bash", "ls").unwrap();
        let langs: Vec<_> = map[a].code_snippets().keys().cloned().collect();
        assert_eq!(langs, vec!["rust", "bash"]);
    }

    #[test]
    fn copy_subtree_strips_uids() {
        let (mut map, a, _, c) = sample();
        map.ensure_uid(c).unwrap();
        let mut other = MindMap::with_root("Other");
        let root = other.root();
        let copy = other.copy_subtree(&map, a, root).unwrap();
        assert_eq!(other[copy].text(), "Buy milk");
        let child = other[copy].children()[0];
        assert_eq!(other[child].text(), "Skimmed");
        assert!(other[child].uid().is_none());
        map.remove(a).unwrap();
        assert_eq!(other.topic_count(), 3);
    }

    #[test]
    fn subtree_helpers() {
        let (mut map, a, b, c) = sample();
        map.set_attribute(a, attrs::COLLAPSED, "true").unwrap();
        map.set_attribute(c, attrs::FILL_COLOR, "#FF0000").unwrap();
        map.set_extra(b, Extra::note("n")).unwrap();
        assert_eq!(map.find_all_with_extra(ExtraType::Note), vec![b]);
        assert_eq!(map.remove_attribute_from_subtree(a, attrs::FILL_COLOR).unwrap(), 1);
        assert!(map[a].is_collapsed());
        map.unfold_all();
        assert!(!map[a].is_collapsed());
        map.set_left_sided(a, true).unwrap();
        assert!(map.is_left_sided(a));
        assert!(map.is_descendant(c, a));
        assert!(!map.is_descendant(b, a));
    }
}
