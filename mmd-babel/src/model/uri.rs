//! URI wrapper used by link and file extras.
//!
//!     Links point anywhere (`https:`, `mailto:`...). File references are either bare paths
//!     (relative to the document folder) or `file:` URIs, and may carry query parameters such
//!     as `line=12`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmUri {
    raw: String,
    scheme: Option<String>,
    path: String,
    params: BTreeMap<String, String>,
}

impl MmUri {
    /// Parse a URI leniently. Anything that is not a valid absolute URL is a file path.
    pub fn parse(text: &str) -> Self {
        let raw = text.trim().to_string();

        // Windows drive letters parse as one-letter schemes
        if let Ok(url) = Url::parse(&raw) {
            if url.scheme().len() > 1 {
                let scheme = url.scheme().to_string();
                if scheme == "file" {
                    let params = url
                        .query_pairs()
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect();
                    let path = url
                        .to_file_path()
                        .ok()
                        .and_then(|p| p.to_str().map(str::to_string))
                        .unwrap_or_else(|| url.path().to_string());
                    return Self {
                        raw,
                        scheme: Some(scheme),
                        path,
                        params,
                    };
                }
                return Self {
                    path: raw.clone(),
                    raw,
                    scheme: Some(scheme),
                    params: BTreeMap::new(),
                };
            }
        }

        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query)),
            None => (raw.clone(), None),
        };
        let params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            raw,
            scheme: None,
            path,
            params,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::parse(&path.to_string_lossy())
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn is_file(&self) -> bool {
        matches!(self.scheme.as_deref(), None | Some("file"))
    }

    pub fn is_absolute(&self) -> bool {
        if !self.is_file() {
            return true;
        }
        let bytes = self.path.as_bytes();
        self.path.starts_with('/')
            || self.path.starts_with('\\')
            || (bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
    }

    /// For files the path without parameters, for other URIs the full text.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// The `line` parameter of a file reference.
    pub fn line(&self) -> Option<usize> {
        self.params.get("line").and_then(|l| l.trim().parse().ok())
    }

    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        name.rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Render the URI. `ascii` percent-encodes everything outside printable ASCII.
    pub fn as_string(&self, ascii: bool, with_params: bool) -> String {
        if !self.is_file() {
            if ascii {
                return Url::parse(&self.raw)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| percent_encode_non_ascii(&self.raw));
            }
            return self.raw.clone();
        }

        let mut out = if self.scheme.is_some() {
            format!("file://{}", self.path)
        } else {
            self.path.clone()
        };
        if ascii {
            out = percent_encode_non_ascii(&out);
        }
        if with_params && !self.params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            out.push('?');
            out.push_str(&query);
        }
        out
    }

    /// Resolve a file reference against the document folder.
    pub fn resolve(&self, base_folder: Option<&Path>) -> Option<PathBuf> {
        if !self.is_file() {
            return None;
        }
        let path = PathBuf::from(&self.path);
        if self.is_absolute() {
            Some(path)
        } else {
            Some(match base_folder {
                Some(base) => base.join(path),
                None => path,
            })
        }
    }
}

impl fmt::Display for MmUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string(false, true))
    }
}

fn percent_encode_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() && !ch.is_ascii_control() && ch != ' ' {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}
