use crate::model::MmUri;
use pathdiff::diff_paths;
use std::path::Path;

/// Text of a file reference for a document written to `base_folder`.
///
/// Absolute paths inside (or near) the base folder become relative ones, everything else is
/// rendered as stored. Separators are always forward slashes.
pub(crate) fn file_reference(uri: &MmUri, base_folder: Option<&Path>, ascii: bool) -> String {
    if !uri.is_file() {
        return uri.as_string(ascii, false);
    }
    let relative = match base_folder {
        Some(base) if uri.is_absolute() => diff_paths(Path::new(uri.path()), base),
        _ => None,
    };
    match relative {
        Some(path) => {
            let text = to_forward_slashes(&path);
            if ascii {
                MmUri::parse(&text).as_string(true, false)
            } else {
                text
            }
        }
        None => to_forward_slashes(Path::new(&uri.as_string(ascii, false))),
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_files_become_relative_to_base() {
        let uri = MmUri::parse("/home/me/maps/docs/a.txt");
        assert_eq!(
            file_reference(&uri, Some(Path::new("/home/me/maps")), false),
            "docs/a.txt"
        );
        assert_eq!(
            file_reference(&uri, None, false),
            "/home/me/maps/docs/a.txt"
        );
    }

    #[test]
    fn links_and_relative_files_pass_through() {
        let base = Some(Path::new("/tmp"));
        assert_eq!(
            file_reference(&MmUri::parse("https://x.org/a b"), base, true),
            "https://x.org/a%20b"
        );
        assert_eq!(
            file_reference(&MmUri::parse("a\\b.txt"), base, false),
            "a/b.txt"
        );
    }
}
