//! Resource loading for importers (images referenced by the source document).
//!
//!     Importers never touch the file system directly. They ask a [`ResourceLoader`], so archive
//!     based formats can serve entries from the zip and tests can serve nothing at all.
//!     Failures are [`Diagnostic`]s: the importer reports them and omits the resource.

use crate::error::Diagnostic;
use crate::model::MmUri;
use std::fs;
use std::path::PathBuf;

pub trait ResourceLoader: Send + Sync {
    fn load(&self, uri: &MmUri) -> Result<Vec<u8>, Diagnostic>;
}

/// Reads local files, relative references resolved against the document folder.
///
/// Remote URLs are reported as unavailable: fetching them is the caller's business, since the
/// engine defines no timeouts of its own.
#[derive(Debug, Clone, Default)]
pub struct FsResourceLoader {
    base_folder: Option<PathBuf>,
}

impl FsResourceLoader {
    pub fn new(base_folder: Option<PathBuf>) -> Self {
        Self { base_folder }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, uri: &MmUri) -> Result<Vec<u8>, Diagnostic> {
        let path = uri
            .resolve(self.base_folder.as_deref())
            .ok_or_else(|| Diagnostic::resource(uri.to_string(), "remote resources are not fetched"))?;
        tracing::debug!(path = %path.display(), "loading resource");
        fs::read(&path).map_err(|e| Diagnostic::resource(uri.to_string(), e))
    }
}

/// Loader that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceLoader for NoResources {
    fn load(&self, uri: &MmUri) -> Result<Vec<u8>, Diagnostic> {
        Err(Diagnostic::resource(uri.to_string(), "resource loading disabled"))
    }
}
