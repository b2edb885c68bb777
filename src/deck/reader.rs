//! Read back the layout of a written deck (slide size and picture bounds).

use super::SlideSize;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Placement of one picture on a slide, in EMU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureBounds {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    /// Package path of the embedded image, e.g. `ppt/media/image1.png`
    pub media: Option<String>,
}

impl PictureBounds {
    pub fn fills(&self, size: SlideSize) -> bool {
        self.x == 0 && self.y == 0 && self.cx == size.width_emu && self.cy == size.height_emu
    }
}

#[derive(Debug, Clone)]
pub struct DeckSummary {
    pub size: SlideSize,
    /// Pictures of each slide, in presentation order
    pub slides: Vec<Vec<PictureBounds>>,
}

impl DeckSummary {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Open a `.pptx` file and summarize it.
pub fn inspect(path: &Path) -> Result<DeckSummary> {
    let file = File::open(path)?;
    inspect_reader(BufReader::new(file))
}

pub fn inspect_reader<R: Read + Seek>(reader: R) -> Result<DeckSummary> {
    let mut archive = ZipArchive::new(reader)?;

    let pres = read_part(&mut archive, "ppt/presentation.xml")?;
    let (size, slide_rel_ids) = parse_presentation(&pres)?;
    let pres_rels = parse_rels(&read_part(&mut archive, "ppt/_rels/presentation.xml.rels")?)?;

    let mut slides = Vec::with_capacity(slide_rel_ids.len());
    for rid in &slide_rel_ids {
        let target = pres_rels
            .get(rid)
            .ok_or_else(|| Error::Xml(format!("presentation references unknown relationship {}", rid)))?;
        let part = resolve("ppt", target);
        let slide_xml = read_part(&mut archive, &part)?;
        let rels = match rels_part_for(&part) {
            Some(rels_name) if archive.file_names().any(|n| n == rels_name) => {
                parse_rels(&read_part(&mut archive, &rels_name)?)?
            }
            _ => HashMap::new(),
        };
        let slide_dir = part.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        let mut pictures = parse_pictures(&slide_xml)?;
        for pic in &mut pictures {
            if let Some(rid) = pic.media.take() {
                pic.media = rels.get(&rid).map(|t| resolve(slide_dir, t));
            }
        }
        slides.push(pictures);
    }

    Ok(DeckSummary { size, slides })
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::Package(format!("{}: {}", name, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_part_for(part: &str) -> Option<String> {
    let (dir, file) = part.rsplit_once('/')?;
    Some(format!("{}/_rels/{}.rels", dir, file))
}

/// Resolve a relationship target relative to the directory of its source part.
fn resolve(base_dir: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn attr_i64(e: &BytesStart, key: &[u8]) -> Result<i64> {
    let raw = attr(e, key).ok_or_else(|| {
        Error::Xml(format!(
            "<{}> lacks attribute {}",
            String::from_utf8_lossy(e.name().as_ref()),
            String::from_utf8_lossy(key)
        ))
    })?;
    raw.parse()
        .map_err(|_| Error::Xml(format!("not an integer: {}", raw)))
}

fn parse_presentation(xml: &str) -> Result<(SlideSize, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut size = None;
    let mut rel_ids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Empty(ref e) | Event::Start(ref e) => match e.name().as_ref() {
                b"p:sldSz" => {
                    size = Some(SlideSize {
                        width_emu: attr_i64(e, b"cx")?,
                        height_emu: attr_i64(e, b"cy")?,
                    })
                }
                b"p:sldId" => {
                    if let Some(rid) = attr(e, b"r:id") {
                        rel_ids.push(rid);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let size = size.ok_or_else(|| Error::Xml("presentation.xml has no <p:sldSz>".into()))?;
    Ok((size, rel_ids))
}

fn parse_rels(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut map = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Empty(ref e) | Event::Start(ref e) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) {
                    map.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(map)
}

/// Collect `p:pic` placements; `media` holds the blip's relationship id.
fn parse_pictures(xml: &str) -> Result<Vec<PictureBounds>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut pictures = Vec::new();
    let mut current: Option<PictureBounds> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"p:pic" => {
                current = Some(PictureBounds { x: 0, y: 0, cx: 0, cy: 0, media: None });
            }
            Event::End(ref e) if e.name().as_ref() == b"p:pic" => {
                if let Some(pic) = current.take() {
                    pictures.push(pic);
                }
            }
            Event::Empty(ref e) | Event::Start(ref e) => {
                let Some(pic) = current.as_mut() else { continue };
                match e.name().as_ref() {
                    b"a:off" => {
                        pic.x = attr_i64(e, b"x")?;
                        pic.y = attr_i64(e, b"y")?;
                    }
                    b"a:ext" => {
                        pic.cx = attr_i64(e, b"cx")?;
                        pic.cy = attr_i64(e, b"cy")?;
                    }
                    b"a:blip" => pic.media = attr(e, b"r:embed"),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(pictures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::parts;

    #[test]
    fn resolves_relative_targets() {
        assert_eq!(resolve("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve("ppt/slides", "../media/image1.png"), "ppt/media/image1.png");
        assert_eq!(resolve("ppt/slides", "/ppt/media/x.png"), "ppt/media/x.png");
        assert_eq!(rels_part_for("ppt/slides/slide2.xml").unwrap(), "ppt/slides/_rels/slide2.xml.rels");
    }

    #[test]
    fn parses_generated_presentation() {
        let (size, ids) = parse_presentation(&parts::presentation(SlideSize::WIDESCREEN, 2)).unwrap();
        assert_eq!(size, SlideSize::WIDESCREEN);
        assert_eq!(ids, vec!["rId6", "rId7"]);
    }

    #[test]
    fn picture_bounds_ignore_group_transform() {
        let pics = parse_pictures(&parts::picture_slide(SlideSize::WIDESCREEN, 1, "x")).unwrap();
        assert_eq!(pics.len(), 1);
        assert!(pics[0].fills(SlideSize::WIDESCREEN));
        assert_eq!(pics[0].media.as_deref(), Some("rId2"));
    }

    #[test]
    fn presentation_without_size_is_rejected() {
        let xml = r#"<p:presentation xmlns:p="urn:p"><p:sldIdLst/></p:presentation>"#;
        assert!(matches!(parse_presentation(xml), Err(Error::Xml(_))));
    }
}
