//! Format implementations
//!
//! Every supported file format lives in its own module and implements [`crate::Format`].
//! Helpers shared by several importers are in [`common`].

pub mod asciidoc;
pub mod coggle;
pub mod common;
pub mod freemind;
pub mod icons;
pub mod markdown;
pub mod mindmup;
pub mod mmd;
pub mod novamind;
pub mod orgmode;
pub mod plantuml;
pub mod png;
pub mod svg;
pub mod text;
pub mod treeviz;
pub mod xmind;

pub use asciidoc::AsciiDocFormat;
pub use coggle::CoggleFormat;
pub use freemind::FreeMindFormat;
pub use markdown::MarkdownFormat;
pub use mindmup::MindmupFormat;
pub use mmd::MmdFormat;
pub use novamind::NovamindFormat;
pub use orgmode::OrgModeFormat;
pub use plantuml::PlantUmlFormat;
pub use png::PngFormat;
pub use svg::SvgFormat;
pub use text::TextFormat;
pub use treeviz::TreevizFormat;
pub use xmind::XMindFormat;
