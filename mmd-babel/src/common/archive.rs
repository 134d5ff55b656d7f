//! Zip containers used by XMind and Novamind documents.
//!
//!     Entries are read eagerly when the archive is opened and the underlying `ZipArchive` is
//!     dropped before [`Archive::open`] returns, so an import never keeps the container open
//!     past its own call, whatever path it exits through.

use crate::error::{Diagnostic, FormatError, Result};
use crate::model::MmUri;
use crate::resources::ResourceLoader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: HashMap<String, Vec<u8>>,
}

impl Archive {
    pub fn is_zip(bytes: &[u8]) -> bool {
        bytes.starts_with(ZIP_SIGNATURE)
    }

    pub fn open(bytes: &[u8], format: &str) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| FormatError::malformed(format, format!("Failed to open archive: {e}")))?;

        let mut entries = HashMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| FormatError::malformed(format, format!("Failed to read entry {i}: {e}")))?;
            if !file.is_file() {
                continue;
            }
            let name = normalize(file.name());
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| FormatError::malformed_at(format, e, name.clone()))?;
            entries.insert(name, content);
        }
        tracing::debug!(format, entries = entries.len(), "archive opened");
        Ok(Self { entries })
    }

    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(&normalize(name)).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    /// A UTF-8 entry, `None` if absent.
    pub fn text(&self, name: &str, format: &str) -> Result<Option<&str>> {
        match self.entry(name) {
            Some(bytes) => crate::format::source_text(bytes, format).map(Some),
            None => Ok(None),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn normalize(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches("./").trim_start_matches('/').to_string()
}

impl ResourceLoader for Archive {
    fn load(&self, uri: &MmUri) -> std::result::Result<Vec<u8>, Diagnostic> {
        let raw = uri.path();
        let decoded = url::form_urlencoded::parse(format!("x={raw}").as_bytes())
            .next()
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| raw.to_string());
        self.entry(raw)
            .or_else(|| self.entry(&decoded))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Diagnostic::resource(uri.to_string(), "entry not found in archive"))
    }
}

#[cfg(test)]
pub(crate) fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_entries_and_serves_resources() {
        let bytes = build_zip(&[
            ("content.json", b"[]"),
            ("resources/pic.png", b"\x89PNG"),
        ]);
        assert!(Archive::is_zip(&bytes));
        let archive = Archive::open(&bytes, "xmind").unwrap();
        assert_eq!(archive.text("content.json", "xmind").unwrap(), Some("[]"));
        assert_eq!(archive.text("missing.xml", "xmind").unwrap(), None);
        assert_eq!(
            archive.load(&MmUri::parse("resources/pic.png")).unwrap(),
            b"\x89PNG".to_vec()
        );
        assert!(archive.load(&MmUri::parse("resources/other.png")).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = Archive::open(b"not a zip", "xmind").unwrap_err();
        assert!(matches!(err, FormatError::MalformedInput { .. }));
    }
}
