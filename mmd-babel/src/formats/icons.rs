//! Icons used by the tree outline.
//!
//! Kept apart from the outline writer so the CLI can print a legend with the same symbols.

/// Unicode icon for a topic kind or extra keyword.
pub fn get_icon(kind: &str) -> &'static str {
    match kind {
        "Map" => "⧉",
        "Root" => "◉",
        "Topic" => "○",
        "Collapsed" => "⊕",
        "NOTE" => "✎",
        "LINK" => "↗",
        "FILE" => "▤",
        "TOPIC" => "⤳",
        "Image" => "▣",
        "Code" => "ƒ",
        "Attribute" => "≔",
        _ => "·",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtraType;

    #[test]
    fn test_icon_mappings() {
        assert_eq!(get_icon("Map"), "⧉");
        assert_eq!(get_icon("Root"), "◉");
        assert_eq!(get_icon("Topic"), "○");
        assert_eq!(get_icon("Collapsed"), "⊕");
        assert_eq!(get_icon("Image"), "▣");
        assert_eq!(get_icon("Code"), "ƒ");
    }

    #[test]
    fn every_extra_type_has_an_icon() {
        for kind in ExtraType::ALL {
            assert_ne!(get_icon(kind.keyword()), "·", "{kind:?}");
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(get_icon("Whatever"), "·");
    }
}
