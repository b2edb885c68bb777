//! Serialize a [`Deck`] into a PresentationML zip package.

use super::{parts, Deck};
use crate::{Error, Result};
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package the deck into an in-memory `.pptx`.
pub fn to_bytes(deck: &Deck) -> Result<Vec<u8>> {
    let cursor = write_package(deck, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Write every part of the package into `sink` and return it.
pub fn write_package<W: Write + Seek>(deck: &Deck, sink: W) -> Result<W> {
    let n = deck.slide_count();
    let mut zip = ZipWriter::new(sink);
    let xml_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // PNG data is already compressed
    let media_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let title = deck.slides().first().map(|s| s.alt_text.as_str()).unwrap_or("");
    let fixed: [(&str, String); 13] = [
        ("[Content_Types].xml", parts::content_types(n)),
        ("_rels/.rels", parts::root_rels()),
        ("docProps/core.xml", parts::core_props(title)),
        ("docProps/app.xml", parts::app_props(n)),
        ("ppt/presentation.xml", parts::presentation(deck.size(), n)),
        ("ppt/_rels/presentation.xml.rels", parts::presentation_rels(n)),
        ("ppt/presProps.xml", parts::pres_props()),
        ("ppt/viewProps.xml", parts::view_props()),
        ("ppt/tableStyles.xml", parts::table_styles()),
        ("ppt/slideMasters/slideMaster1.xml", parts::slide_master()),
        ("ppt/slideMasters/_rels/slideMaster1.xml.rels", parts::slide_master_rels()),
        ("ppt/slideLayouts/slideLayout1.xml", parts::slide_layout()),
        ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", parts::slide_layout_rels()),
    ];
    for (name, body) in &fixed {
        zip.start_file(*name, xml_opts)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.start_file("ppt/theme/theme1.xml", xml_opts)?;
    zip.write_all(parts::theme().as_bytes())?;

    for (i, slide) in deck.slides().iter().enumerate() {
        let no = i + 1;
        let data = std::fs::read(&slide.image).map_err(|e| {
            Error::Package(format!("cannot embed {}: {}", slide.image.display(), e))
        })?;

        zip.start_file(parts::slide_part_name(no), xml_opts)?;
        zip.write_all(parts::picture_slide(deck.size(), no, &slide.alt_text).as_bytes())?;
        zip.start_file(parts::slide_rels_part_name(no), xml_opts)?;
        zip.write_all(parts::picture_slide_rels(no).as_bytes())?;
        zip.start_file(parts::media_part_name(no), media_opts)?;
        zip.write_all(&data)?;
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn empty_deck_has_core_parts() {
        let names = entry_names(to_bytes(&Deck::default()).unwrap());
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.iter().any(|n| n == part), "missing {part}");
        }
        assert!(!names.iter().any(|n| n.starts_with("ppt/slides/")));
    }

    #[test]
    fn embeds_image_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("one.png");
        image::RgbaImage::new(4, 2).save(&png).unwrap();
        let original = std::fs::read(&png).unwrap();

        let mut deck = Deck::default();
        deck.add_picture_slide(&png, "one");
        let mut archive = ZipArchive::new(Cursor::new(to_bytes(&deck).unwrap())).unwrap();

        let mut embedded = Vec::new();
        archive.by_name("ppt/media/image1.png").unwrap().read_to_end(&mut embedded).unwrap();
        assert_eq!(embedded, original);
        assert!(archive.by_name("ppt/slides/_rels/slide1.xml.rels").is_ok());
    }

    #[test]
    fn unreadable_image_is_package_error() {
        let mut deck = Deck::default();
        deck.add_picture_slide("/nonexistent/slide.png", "gone");
        assert!(matches!(to_bytes(&deck), Err(Error::Package(_))));
    }
}
