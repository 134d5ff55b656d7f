//! Well-known attribute keys.

/// Opaque stable identity used by topic jumps.
pub const UID: &str = "topicLinkUID";
pub const FILL_COLOR: &str = "fillColor";
pub const TEXT_COLOR: &str = "textColor";
pub const BORDER_COLOR: &str = "borderColor";
/// `true` on first-level topics placed on the left branch.
pub const LEFT_SIDE: &str = "leftSide";
/// `true` when the topic's children are folded.
pub const COLLAPSED: &str = "collapsed";
/// `left`, `center` or `right`.
pub const ALIGN: &str = "align";
pub const EMOTICON: &str = "mmd.emoticon";
/// Base64 encoded PNG.
pub const IMAGE: &str = "mmd.image";
pub const IMAGE_NAME: &str = "mmd.image.name";
pub const IMAGE_URI: &str = "mmd.image.uri";
pub const NOTE_ENCRYPTED: &str = "extras.note.encrypted";
pub const NOTE_HINT: &str = "extras.note.encrypted.hint";

/// Map level flag telling viewers to draw jump arrows.
pub const MAP_SHOW_JUMPS: &str = "showJumps";
pub const MAP_VERSION: &str = "__version__";
