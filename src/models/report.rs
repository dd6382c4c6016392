use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Formatting collected from `w:rPr` and `w:pPr`. Paragraph styles carry both
/// paragraph and run properties, flattened into one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_through: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_right: Option<String>,
}

impl Styles {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(&mut self, other: &Styles) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        overlay(&mut self.bold, &other.bold);
        overlay(&mut self.italic, &other.italic);
        overlay(&mut self.underline, &other.underline);
        overlay(&mut self.strike_through, &other.strike_through);
        overlay(&mut self.color, &other.color);
        overlay(&mut self.font_size, &other.font_size);
        overlay(&mut self.font, &other.font);
        overlay(&mut self.background_color, &other.background_color);
        overlay(&mut self.highlight, &other.highlight);
        overlay(&mut self.alignment, &other.alignment);
        overlay(&mut self.spacing_before, &other.spacing_before);
        overlay(&mut self.spacing_after, &other.spacing_after);
        overlay(&mut self.indent_left, &other.indent_left);
        overlay(&mut self.indent_right, &other.indent_right);
    }

    pub fn merged(mut self, other: &Styles) -> Styles {
        self.merge(other);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIndent {
    pub left: Option<String>,
    pub hanging: Option<String>,
    pub first_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub is_bullet: bool,
    pub bullet_text: Option<String>,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<ListIndent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub styles: Styles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub text: String,
    pub styles: Styles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_data: Option<ListData>,
    pub style_name: Option<String>,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "cell")]
pub struct TableCell {
    pub content: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    /// `"<width>x<height>"` in twentieths of a point.
    pub page_size: Option<String>,
    pub margins: Margins,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub styles: PageSetup,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePosition {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// Extent in EMUs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Public URL of the uploaded media; `None` when the upload failed.
    pub src: Option<String>,
    pub position: ImagePosition,
    pub size: ImageSize,
    pub properties: BTreeMap<String, String>,
    /// Index into the extracted media list until the upload resolves it.
    #[serde(skip)]
    pub media: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Section(SectionProperties),
    Image(Image),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub title: String,
    pub body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionEntry {
    Subsection(Subsection),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: Vec<SectionEntry>,
}

/// A converted document as persisted in the reports collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: Vec<Section>,
    pub created_at: String,
    pub updated_at: String,
}
