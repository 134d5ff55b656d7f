//! FreeMind import and round trip tests
//!
//! FreeMind is the companion format: every other importer is checked by converting its
//! result to FreeMind and back.

use crate::common::{export_options, load_fixture, texts};
use mmd_babel::formats::treeviz::to_treeviz_str;
use mmd_babel::model::attrs;
use mmd_babel::{Extra, ImportOptions, MindMap, TopicId};
use proptest::prelude::*;

fn round_trip(map: &MindMap) -> MindMap {
    let bytes = mmd_babel::export(map, "freemind", &export_options()).unwrap();
    mmd_babel::import(&bytes, "freemind", &ImportOptions::default()).unwrap()
}

fn child(map: &MindMap, parent: TopicId, index: usize) -> TopicId {
    map[parent].children()[index]
}

#[test]
fn test_fixture_import() {
    let map = load_fixture("sample.mm", "freemind");
    assert_eq!(
        texts(&map),
        vec!["Travel", "Packing", "Passport", "Charger", "Route", "Stop at the lake"]
    );

    let root = map.root();
    let packing = child(&map, root, 0);
    assert!(map.is_left_sided(packing));
    assert!(map[packing].is_collapsed());
    assert_eq!(map[packing].attribute(attrs::TEXT_COLOR), Some("#FF0000"));
    assert_eq!(map[packing].attribute(attrs::FILL_COLOR), Some("#FFFF00"));

    let route = child(&map, root, 1);
    assert!(!map.is_left_sided(route));
    assert_eq!(map[route].link().unwrap().to_string(), "https://example.com/route");
    assert_eq!(map[route].note().unwrap().text, "Take the coastal road");

    let lake = child(&map, route, 0);
    assert!(map[packing].uid().is_some());
    assert_eq!(map[lake].jump_target(), map[packing].uid());
    assert_eq!(map.attribute(attrs::MAP_SHOW_JUMPS), Some("true"));
}

#[test]
fn test_fixture_outline() {
    let map = load_fixture("sample.mm", "freemind");
    insta::assert_snapshot!(to_treeviz_str(&map).trim_end(), @r###"
    ⧉ Map (6 topics)
    └─ ◉ Travel
      ├─ ⊕ Packing
      │ ├─ ○ Passport
      │ └─ ○ Charger
      └─ ○ Route ↗ ✎
        └─ ○ Stop at the lake ⤳
    "###);
}

#[test]
fn test_fixture_survives_a_round_trip() {
    let map = load_fixture("sample.mm", "freemind");
    let back = round_trip(&map);

    assert_eq!(texts(&back), texts(&map));
    for (original, restored) in map.iter().zip(back.iter()) {
        assert_eq!(map.is_left_sided(original), back.is_left_sided(restored));
        assert_eq!(map[original].is_collapsed(), back[restored].is_collapsed());
        assert_eq!(map[original].note(), back[restored].note());
        assert_eq!(
            map[original].link().map(ToString::to_string),
            back[restored].link().map(ToString::to_string)
        );
        assert_eq!(
            map[original].attribute(attrs::FILL_COLOR),
            back[restored].attribute(attrs::FILL_COLOR)
        );
    }
    let root = back.root();
    let lake = child(&back, child(&back, root, 1), 0);
    assert_eq!(back[lake].jump_target(), back[child(&back, root, 0)].uid());
}

#[test]
fn test_mindmup_converts_to_freemind() {
    let map = load_fixture("sample.mup", "mindmup");
    assert_eq!(
        texts(&map),
        vec!["Garden", "Vegetables", "Tomatoes", "Beans", "Flowers", "Tools"]
    );
    let back = round_trip(&map);
    assert_eq!(texts(&back), texts(&map));

    let root = back.root();
    let vegetables = child(&back, root, 0);
    let flowers = child(&back, root, 1);
    let tools = child(&back, root, 2);
    assert!(back.is_left_sided(vegetables));
    assert_eq!(back[vegetables].attribute(attrs::FILL_COLOR), Some("#00FF00"));
    assert_eq!(back[flowers].note().unwrap().text, "water daily");
    assert_eq!(back[tools].jump_target(), back[vegetables].uid());
}

#[test]
fn test_native_document_converts_to_freemind() {
    let map = load_fixture("sample.mmd", "mmd");
    assert_eq!(texts(&map), vec!["Recipes", "Soup", "Tomato", "Bread"]);
    let back = round_trip(&map);
    assert_eq!(texts(&back), texts(&map));

    let root = back.root();
    let soup = child(&back, root, 0);
    assert_eq!(back[root].note().unwrap().text, "Family favourites");
    assert_eq!(back[soup].link().unwrap().to_string(), "https://example.com/soup");
    assert_eq!(back[child(&back, soup, 0)].jump_target(), back[root].uid());
}

/// Extras a generated topic may carry.
#[derive(Debug, Clone)]
struct TopicExtras {
    note: Option<String>,
    link: Option<String>,
    file: Option<String>,
    jump: Option<prop::sample::Index>,
    folded: bool,
}

fn arb_extras() -> impl Strategy<Value = TopicExtras> {
    (
        prop::option::of("[a-zA-Z0-9<>&\"' .\n]{0,20}"),
        prop::option::of("https://example\\.com/[a-z]{1,6}(\\?q=[a-z&=]{1,6})?"),
        prop::option::of("docs/[a-z]{1,6}\\.txt"),
        prop::option::of(any::<prop::sample::Index>()),
        any::<bool>(),
    )
        .prop_map(|(note, link, file, jump, folded)| TopicExtras {
            note,
            link,
            file,
            jump,
            folded,
        })
}

/// Random trees: each entry picks a parent, and maybe a jump target, among the topics
/// created so far.
fn arb_map() -> impl Strategy<Value = MindMap> {
    let words = "[a-zA-Z0-9<>&\"'.,!?-]{1,8}( [a-zA-Z0-9<>&\"'.,!?\n-]{1,8}){0,3}";
    (
        words,
        prop::collection::vec((any::<prop::sample::Index>(), words, arb_extras()), 0..24),
    )
        .prop_map(|(root_text, entries)| {
            let mut map = MindMap::with_root(root_text);
            let mut topics = vec![map.root()];
            for (parent, text, extras) in entries {
                let parent = *parent.get(&topics);
                let topic = map.create_child(parent, text, None).unwrap();
                if let Some(note) = extras.note {
                    map.set_extra(topic, Extra::note(note)).unwrap();
                }
                if let Some(link) = extras.link {
                    map.set_extra(topic, Extra::link(&link)).unwrap();
                }
                if let Some(file) = extras.file {
                    map.set_extra(topic, Extra::file(&file)).unwrap();
                }
                if let Some(target) = extras.jump {
                    map.link_to(topic, *target.get(&topics)).unwrap();
                }
                if extras.folded {
                    map.set_attribute(topic, attrs::COLLAPSED, "true").unwrap();
                }
                topics.push(topic);
            }
            map
        })
}

/// Child-index path of the topic a jump points at.
fn jump_path(map: &MindMap, topic: TopicId) -> Option<Vec<usize>> {
    map[topic]
        .jump_target()
        .and_then(|uid| map.find_topic_by_uid(uid))
        .map(|target| map.path(target))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn freemind_round_trip_keeps_the_tree(map in arb_map()) {
        let back = round_trip(&map);
        prop_assert_eq!(back.topic_count(), map.topic_count());
        for (original, restored) in map.iter().zip(back.iter()) {
            prop_assert_eq!(map[original].text(), back[restored].text());
            prop_assert_eq!(map.path(original), back.path(restored));
            prop_assert_eq!(map[original].is_collapsed(), back[restored].is_collapsed());
            prop_assert_eq!(
                map[original].note().map(|n| n.text.clone()),
                back[restored].note().map(|n| n.text.clone())
            );
            prop_assert_eq!(
                map[original].link().map(ToString::to_string),
                back[restored].link().map(ToString::to_string)
            );
            prop_assert_eq!(
                map[original].file().map(|f| f.path().to_string()),
                back[restored].file().map(|f| f.path().to_string())
            );
            prop_assert_eq!(jump_path(&map, original), jump_path(&back, restored));
        }
    }
}
