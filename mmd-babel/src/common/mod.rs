//! Format agnostic helpers shared by the exporters and importers.

pub mod archive;
pub mod color;
pub mod escape;
pub mod html;
pub mod images;
pub mod links;
pub mod outline;
pub(crate) mod paths;
