use super::numbering::Numbering;
use super::styles::{paragraph_styles, run_styles, StyleSheet};
use super::xml::Element;
use crate::models::report::{
    Block, Image, ImagePosition, ImageSize, Margins, PageSetup, Paragraph, Run, SectionProperties,
    Styles, Table, TableCell,
};
use std::collections::HashMap;

/// Walks `w:body` and turns it into blocks. Embedded images are not read
/// here; each distinct media part is registered and referenced by index.
pub struct BodyParser<'a> {
    styles: &'a StyleSheet,
    numbering: &'a Numbering,
    relationships: &'a HashMap<String, String>,
    media: Vec<String>,
    media_index: HashMap<String, usize>,
}

impl<'a> BodyParser<'a> {
    pub fn new(
        styles: &'a StyleSheet,
        numbering: &'a Numbering,
        relationships: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            styles,
            numbering,
            relationships,
            media: Vec::new(),
            media_index: HashMap::new(),
        }
    }

    /// Archive paths of every referenced media part, in index order.
    pub fn into_media(self) -> Vec<String> {
        self.media
    }

    pub fn parse_blocks(&mut self, container: &Element) -> Vec<Block> {
        let mut blocks = Vec::new();

        for element in container.elements() {
            match element.name.as_str() {
                "w:p" => self.paragraph(element, &mut blocks),
                "w:tbl" => blocks.push(Block::Table(self.table(element))),
                "w:sectPr" => blocks.push(Block::Section(section_properties(element))),
                // Content controls wrap ordinary body content.
                "w:sdt" => {
                    if let Some(content) = element.child("w:sdtContent") {
                        blocks.extend(self.parse_blocks(content));
                    }
                }
                _ => {}
            }
        }

        blocks
    }

    /// Pushes the paragraph, preceded by any images anchored in it.
    fn paragraph(&mut self, paragraph: &Element, blocks: &mut Vec<Block>) {
        let properties = paragraph.child("w:pPr");
        let style_name = properties
            .and_then(|ppr| ppr.find_attr("w:pStyle", "w:val"))
            .map(str::to_string);

        let mut styles = style_name
            .as_deref()
            .and_then(|id| self.styles.get(id))
            .map(|style| style.paragraph.clone().merged(&style.run))
            .unwrap_or_default();

        let mut list_data = None;
        if let Some(ppr) = properties {
            styles.merge(&paragraph_styles(Some(ppr)));

            if let Some(num_pr) = ppr.find("w:numPr") {
                if let Some(num_id) = num_pr.find_attr("w:numId", "w:val") {
                    let level = num_pr.find_attr("w:ilvl", "w:val").unwrap_or("0");
                    list_data = self.numbering.list_data(num_id, level);
                }
            }
        }

        let mut runs = Vec::new();
        for element in paragraph.find_all(&["w:r", "w:drawing", "w:pict"]) {
            match element.name.as_str() {
                "w:r" => {
                    let text: String = element
                        .find_all(&["w:t"])
                        .into_iter()
                        .map(Element::text)
                        .collect();
                    if text.is_empty() {
                        continue;
                    }
                    runs.push(Run {
                        text,
                        styles: self.run_style(element),
                    });
                }
                "w:drawing" => blocks.push(Block::Image(self.drawing(element))),
                "w:pict" => {
                    if let Some(image) = self.legacy_picture(element) {
                        blocks.push(Block::Image(image));
                    }
                }
                _ => {}
            }
        }

        let text = runs.iter().map(|run| run.text.as_str()).collect();

        blocks.push(Block::Paragraph(Paragraph {
            text,
            styles,
            list_data,
            style_name,
            runs,
        }));
    }

    fn run_style(&self, run: &Element) -> Styles {
        let properties = run.child("w:rPr");
        let base = properties
            .and_then(|rpr| rpr.find_attr("w:rStyle", "w:val"))
            .and_then(|id| self.styles.get(id))
            .map(|style| style.run.clone())
            .unwrap_or_default();

        base.merged(&run_styles(properties))
    }

    fn table(&mut self, table: &Element) -> Table {
        let mut rows = Vec::new();

        for row in table.elements().filter(|e| e.name == "w:tr") {
            let mut cells = Vec::new();
            for cell in row.elements().filter(|e| e.name == "w:tc") {
                cells.push(TableCell {
                    content: self.parse_blocks(cell),
                });
            }
            rows.push(cells);
        }

        Table { rows }
    }

    fn drawing(&mut self, drawing: &Element) -> Image {
        let frame = drawing.find("wp:anchor").or_else(|| drawing.find("wp:inline"));
        let mut image = Image::default();

        if let Some(frame) = frame {
            let horizontal = frame.find("wp:positionH").and_then(|e| e.find("wp:align"));
            let vertical = frame.find("wp:positionV").and_then(|e| e.find("wp:align"));
            if let (Some(horizontal), Some(vertical)) = (horizontal, vertical) {
                image.position = ImagePosition {
                    horizontal: Some(horizontal.text()),
                    vertical: Some(vertical.text()),
                };
            }

            let cx = frame.find_attr("wp:extent", "cx").and_then(|v| v.parse().ok());
            let cy = frame.find_attr("wp:extent", "cy").and_then(|v| v.parse().ok());
            if let (Some(width), Some(height)) = (cx, cy) {
                image.size = ImageSize {
                    width: Some(width),
                    height: Some(height),
                };
            }

            if let Some(doc_pr) = frame.find("wp:docPr") {
                for key in ["name", "descr", "title"] {
                    if let Some(value) = doc_pr.attr(key).filter(|v| !v.is_empty()) {
                        image.properties.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        image.media = drawing
            .find_attr("a:blip", "r:embed")
            .and_then(|id| self.register_media(id));
        image
    }

    /// VML pictures (`w:pict`) only carry a relationship id.
    fn legacy_picture(&mut self, picture: &Element) -> Option<Image> {
        let id = picture.find_attr("v:imagedata", "r:id")?;
        Some(Image {
            media: self.register_media(id),
            ..Image::default()
        })
    }

    fn register_media(&mut self, relationship_id: &str) -> Option<usize> {
        let target = self.relationships.get(relationship_id)?;
        let path = resolve_part_path("word", target);

        if let Some(index) = self.media_index.get(&path) {
            return Some(*index);
        }

        let index = self.media.len();
        self.media.push(path.clone());
        self.media_index.insert(path, index);
        Some(index)
    }
}

fn section_properties(section: &Element) -> SectionProperties {
    let width = section.find_attr("w:pgSz", "w:w");
    let height = section.find_attr("w:pgSz", "w:h");
    let page_size = match (width, height) {
        (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
        _ => None,
    };

    let margin = |side: &str| section.find_attr("w:pgMar", side).map(str::to_string);

    SectionProperties {
        styles: PageSetup {
            page_size,
            margins: Margins {
                top: margin("w:top"),
                bottom: margin("w:bottom"),
                left: margin("w:left"),
                right: margin("w:right"),
            },
        },
    }
}

/// Resolve a relationship target against the folder of its source part.
/// Targets starting with `/` are relative to the package root.
pub fn resolve_part_path(base: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        base.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
