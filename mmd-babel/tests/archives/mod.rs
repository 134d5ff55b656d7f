//! Zip based formats (XMind) read through the public entry points.

use crate::common::{build_zip, export_options, texts};
use image::{DynamicImage, ImageFormat, RgbaImage};
use mmd_babel::model::attrs;
use mmd_babel::{FormatError, FormatRegistry, ImportOptions};
use std::io::Cursor;

const CONTENT: &str = r##"[{
  "id": "s1", "title": "Plan",
  "rootTopic": {
    "id": "root", "title": "Launch",
    "children": {"attached": [
      {"id": "design", "title": "Design", "image": {"src": "xap:resources/logo.png"}},
      {"id": "build", "title": "Build", "href": "xmind:#design",
       "notes": {"plain": {"content": "two sprints"}}}
    ]}
  }
}, {
  "id": "s2", "title": "Ignored", "rootTopic": {"id": "other", "title": "Second sheet"}
}]"##;

fn logo() -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

fn workbook() -> Vec<u8> {
    let logo = logo();
    build_zip(&[
        ("content.json", CONTENT.as_bytes()),
        ("resources/logo.png", logo.as_slice()),
    ])
}

#[test]
fn test_xmind_is_detected_and_imported() {
    let registry = FormatRegistry::default();
    let format = registry.detect_format_from_filename("plan.xmind").unwrap();
    let map = registry
        .parse(&workbook(), &format, &ImportOptions::default())
        .unwrap();

    assert_eq!(texts(&map), vec!["Launch", "Design", "Build"]);
    let root = map.root();
    let (design, build) = (map[root].children()[0], map[root].children()[1]);
    assert!(map[design].attribute(attrs::IMAGE).is_some());
    assert_eq!(map[build].note().unwrap().text, "two sprints");
    assert_eq!(map[build].jump_target(), map[design].uid());
}

#[test]
fn test_xmind_to_native_keeps_images_and_jumps() {
    let map = mmd_babel::import(&workbook(), "xmind", &ImportOptions::default()).unwrap();
    let bytes = mmd_babel::export(&map, "mmd", &export_options()).unwrap();
    let back = mmd_babel::import(&bytes, "mmd", &ImportOptions::default()).unwrap();

    assert_eq!(texts(&back), texts(&map));
    let root = back.root();
    let (design, build) = (back[root].children()[0], back[root].children()[1]);
    assert_eq!(
        back[design].attribute(attrs::IMAGE),
        map[map[map.root()].children()[0]].attribute(attrs::IMAGE)
    );
    assert_eq!(back[build].jump_target(), back[design].uid());
}

#[test]
fn test_xmind_renders_to_png() {
    let map = mmd_babel::import(&workbook(), "xmind", &ImportOptions::default()).unwrap();
    let png = mmd_babel::export(&map, "png", &export_options()).unwrap();
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
    assert!(decoded.width() > 0 && decoded.height() > 0);
}

#[test]
fn test_not_an_archive() {
    let err = mmd_babel::import(b"plain text", "xmind", &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::MalformedInput { .. }));

    let no_content = build_zip(&[("meta.xml", b"<meta/>".as_slice())]);
    let err = mmd_babel::import(&no_content, "xmind", &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, FormatError::UnsupportedFormat { .. }));
}
