//! Helpers shared by the integration tests.

use mmd_babel::{ExportOptions, ImportOptions, MindMap};
use std::io::Write;
use std::path::PathBuf;
use time::macros::datetime;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Parse a fixture with the format registered under `format`.
pub fn load_fixture(name: &str, format: &str) -> MindMap {
    let path = fixtures_dir().join(name);
    let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    mmd_babel::import(&bytes, format, &ImportOptions::with_base_folder(fixtures_dir()))
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

/// Export options with a fixed generator and timestamp, for stable output.
pub fn export_options() -> ExportOptions {
    ExportOptions {
        generator: "tests".into(),
        generated_at: datetime!(2024-01-02 03:04:05 UTC),
        ..ExportOptions::default()
    }
}

/// Topic texts in pre-order.
pub fn texts(map: &MindMap) -> Vec<String> {
    mmd_babel::iterate(map).map(|t| t.text().to_string()).collect()
}

pub fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        for (name, content) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}
