//! Cross-topic jump resolution.
//!
//!     Export: [`LinkTable`] is computed once per export from the finished map. It knows which
//!     topics are jump targets (and so need an anchor) and resolves a jump's UID to its target.
//!     Anchors are derived from UIDs but restricted to `[A-Za-z0-9_-]`, so they can be written
//!     raw into any markup; the heading and the reference use the same string.
//!
//!     Import: importers read external ids while building the tree (pass 1) and record every
//!     `(source, target_external_id)` pair in a [`JumpTableBuilder`]. Finishing the builder
//!     freezes both tables into a [`JumpTable`]; applying it is pass 2. Pairs whose target never
//!     showed up are dropped with a [`Diagnostic::DanglingReference`].

use crate::error::{Diagnostic, ModelError};
use crate::model::{MindMap, Topic, TopicId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct LinkTable {
    by_uid: HashMap<String, TopicId>,
    anchors: HashMap<TopicId, String>,
}

impl LinkTable {
    pub fn build(map: &MindMap) -> Self {
        let wanted: HashSet<&str> = map
            .iter()
            .filter_map(|t| map[t].jump_target())
            .collect();

        let mut table = LinkTable::default();
        let mut taken = HashSet::new();
        for id in map.iter() {
            let Some(uid) = map[id].uid() else { continue };
            // first topic wins if a broken document repeats a uid
            if table.by_uid.contains_key(uid) {
                continue;
            }
            table.by_uid.insert(uid.to_string(), id);
            if wanted.contains(uid) {
                let base = anchor_name(uid);
                let mut anchor = base.clone();
                let mut n = 2;
                while !taken.insert(anchor.clone()) {
                    anchor = format!("{base}-{n}");
                    n += 1;
                }
                table.anchors.insert(id, anchor);
            }
        }
        table
    }

    /// Anchor to emit for `topic`, present only when some jump points at it.
    pub fn anchor(&self, topic: TopicId) -> Option<&str> {
        self.anchors.get(&topic).map(String::as_str)
    }

    pub fn resolve(&self, uid: &str) -> Option<TopicId> {
        self.by_uid.get(uid).copied()
    }

    /// Target of the jump carried by `topic`, if it resolves.
    pub fn jump_of(&self, topic: &Topic) -> Option<TopicId> {
        topic.jump_target().and_then(|uid| self.resolve(uid))
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

/// Markup-safe anchor for a UID. Controls are dropped, other unsafe characters become `_`.
pub fn anchor_name(uid: &str) -> String {
    let name: String = uid
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "topic".to_string()
    } else {
        name
    }
}

/// Pass 1 side tables of a two-pass import.
#[derive(Debug, Default)]
pub struct JumpTableBuilder {
    ids: HashMap<String, TopicId>,
    pending: Vec<(TopicId, String)>,
}

impl JumpTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, external_id: impl Into<String>, topic: TopicId) {
        self.ids.entry(external_id.into()).or_insert(topic);
    }

    pub fn jump(&mut self, source: TopicId, target_external_id: impl Into<String>) {
        self.pending.push((source, target_external_id.into()));
    }

    /// Topic registered under `external_id` so far.
    pub fn topic(&self, external_id: &str) -> Option<TopicId> {
        self.ids.get(external_id).copied()
    }

    pub fn has_jump_from(&self, source: TopicId) -> bool {
        self.pending.iter().any(|(s, _)| *s == source)
    }

    pub fn finish(self) -> JumpTable {
        JumpTable {
            ids: self.ids,
            pending: self.pending,
        }
    }
}

/// Frozen pass 1 output.
#[derive(Debug)]
pub struct JumpTable {
    ids: HashMap<String, TopicId>,
    pending: Vec<(TopicId, String)>,
}

impl JumpTable {
    pub fn topic(&self, external_id: &str) -> Option<TopicId> {
        self.ids.get(external_id).copied()
    }

    /// Pass 2: attach a jump for every pair whose target exists. Returns how many were attached.
    pub fn apply(&self, map: &mut MindMap, format: &str) -> Result<usize, ModelError> {
        let mut attached = 0;
        for (source, target_id) in &self.pending {
            match self.topic(target_id) {
                Some(target) if map.contains(*source) && map.contains(target) => {
                    map.link_to(*source, target)?;
                    attached += 1;
                }
                _ => Diagnostic::dangling(target_id.as_str()).report(format),
            }
        }
        Ok(attached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{attrs, Extra};

    #[test]
    fn only_jump_targets_get_anchors() {
        let mut map = MindMap::with_root("root");
        let root = map.root();
        let a = map.create_child(root, "a", None).unwrap();
        let b = map.create_child(root, "b", None).unwrap();
        map.set_attribute(a, attrs::UID, "U1").unwrap();
        map.set_attribute(b, attrs::UID, "U2").unwrap();
        map.set_extra(b, Extra::jump("U1")).unwrap();

        let table = LinkTable::build(&map);
        assert_eq!(table.anchor(a), Some("U1"));
        assert_eq!(table.anchor(b), None);
        assert_eq!(table.jump_of(&map[b]), Some(a));
        assert_eq!(table.anchor_count(), 1);
    }

    #[test]
    fn dangling_jump_does_not_resolve() {
        let mut map = MindMap::with_root("root");
        let root = map.root();
        map.set_extra(root, Extra::jump("missing")).unwrap();
        let table = LinkTable::build(&map);
        assert_eq!(table.jump_of(&map[root]), None);
        assert_eq!(table.anchor_count(), 0);
    }

    #[test]
    fn two_pass_resolution_skips_missing_targets() {
        let mut map = MindMap::with_root("root");
        let root = map.root();
        let a = map.create_child(root, "a", None).unwrap();
        let b = map.create_child(root, "b", None).unwrap();

        let mut builder = JumpTableBuilder::new();
        builder.register("ext-a", a);
        builder.register("ext-b", b);
        builder.jump(b, "ext-a");
        builder.jump(a, "ext-zz");
        assert!(builder.has_jump_from(b));
        let table = builder.finish();

        assert_eq!(table.apply(&mut map, "test").unwrap(), 1);
        let uid = map[a].uid().unwrap().to_string();
        assert_eq!(map[b].jump_target(), Some(uid.as_str()));
        assert!(map[a].jump_target().is_none());
    }

    #[test]
    fn anchors_are_markup_safe_and_distinct() {
        let mut map = MindMap::with_root("root");
        let root = map.root();
        let a = map.create_child(root, "a", None).unwrap();
        let b = map.create_child(root, "b", None).unwrap();
        let c = map.create_child(root, "c", None).unwrap();
        map.set_attribute(a, attrs::UID, "x\u{7}\"y z").unwrap();
        map.set_attribute(b, attrs::UID, "x_y_z").unwrap();
        map.set_extra(c, Extra::jump("x\u{7}\"y z")).unwrap();
        map.set_extra(a, Extra::jump("x_y_z")).unwrap();

        let table = LinkTable::build(&map);
        assert_eq!(table.anchor(a), Some("x_y_z"));
        assert_eq!(table.anchor(b), Some("x_y_z-2"));
        assert_eq!(table.jump_of(&map[c]), Some(a));
        assert_eq!(anchor_name("\u{1}\u{2}"), "topic");
        assert_eq!(anchor_name("A-1_b"), "A-1_b");
    }
}
