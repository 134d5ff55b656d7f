//! Mind map model and multi-format conversion
//!
//!     This crate holds the mind map document model ([`MindMap`]) and a uniform interface for
//!     converting it to and from other mind map and outline formats (FreeMind, Mindmup, XMind,
//!     Novamind, Coggle, Markdown, Org-mode, AsciiDoc, PlantUML, plain text, SVG, PNG).
//!
//!     This is a pure lib: it powers mmd-cli but is shell agnostic. No code here prints, reads
//!     environment variables or decides on exit codes. Problems that only degrade the result
//!     (an image that can't be loaded, a jump to a missing topic) are logged through `tracing`
//!     and never abort the conversion.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError, ModelError, Diagnostic
//!     ├── format.rs               # Format trait, import and export options
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # MindMap, Topic, extras, URIs, attribute keys
//!     ├── common                  # Escaping, colors, links, images, archives, outlines
//!     ├── layout.rs               # LayoutOracle and the built-in tree layout
//!     ├── render                  # Canvas trait, SVG and raster canvases
//!     ├── resources.rs            # ResourceLoader (files next to the document, archives)
//!     ├── theme.rs                # Diagram colors and metrics
//!     └── formats
//!         └── <format>
//!             ├── parser.rs       # Parser implementation
//!             ├── serializer.rs   # Serializer implementation
//!             └── mod.rs
//!
//! Testing
//!
//!     Unit tests sit next to the code. Integration tests live in tests/<area>/, wired through
//!     tests/lib.rs since rust does not discover tests in subdirectories. Fixtures are under
//!     tests/fixtures.
//!
//! Formats
//!
//!     Format specific capabilities are implemented with the [`Format`] trait: a name, file
//!     extensions and `parse()` and/or `serialize()`. Each format module documents its element
//!     mapping and what the conversion loses. FreeMind is the companion format: it is the only
//!     one expected to survive a full round trip.
//!
//! Library Choices
//!
//!     As much as possible parsing is offloaded to specialized crates: roxmltree for XML,
//!     serde_json for Mindmup and XMind, zip for archives, html5ever for HTML notes, comrak for
//!     Coggle labels, image for raster pictures. No shelling out, no outside dependencies.

pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod layout;
pub mod model;
pub mod registry;
pub mod render;
pub mod resources;
pub mod theme;

pub use error::{Diagnostic, FormatError, ModelError};
pub use format::{ExportOptions, Format, ImportOptions, SerializedDocument};
pub use model::{Extra, ExtraType, MindMap, MmUri, Note, Topic, TopicId};
pub use registry::FormatRegistry;

/// Serialize `map` with the named format from the default registry.
pub fn export(map: &MindMap, format: &str, options: &ExportOptions) -> error::Result<Vec<u8>> {
    FormatRegistry::with_defaults()
        .serialize(map, format, options)
        .map(SerializedDocument::into_bytes)
}

/// Parse `source` with the named format from the default registry.
///
/// Relative references (images, attached files) resolve through `options.resources`, which
/// [`ImportOptions::with_base_folder`] roots at the document's folder.
pub fn import(source: &[u8], format: &str, options: &ImportOptions) -> error::Result<MindMap> {
    FormatRegistry::with_defaults().parse(source, format, options)
}

/// Topics of `map` in pre-order. Each call starts a fresh traversal.
pub fn iterate(map: &MindMap) -> impl Iterator<Item = &Topic> + '_ {
    map.iter().map(move |id| &map[id])
}
