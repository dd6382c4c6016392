use crate::models::report::{Block, Section, SectionEntry, Subsection};

const SECTION_STYLES: [&str; 2] = ["Heading1", "TGTHEADING1"];
const SUBSECTION_STYLE: &str = "TGTHEADING2";
const COVER_PAGE_TITLE: &str = "Cover Page";

fn heading_style(block: &Block) -> Option<(&str, &str)> {
    match block {
        Block::Paragraph(paragraph) => paragraph
            .style_name
            .as_deref()
            .map(|style| (style, paragraph.text.as_str())),
        _ => None,
    }
}

/// Group blocks under their headings. Content before the first section
/// heading becomes a leading "Cover Page" section.
pub fn map_sections(blocks: Vec<Block>) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut preamble = Vec::new();
    let mut current: Option<Section> = None;
    let mut subsection: Option<Subsection> = None;

    for block in blocks {
        let heading =
            heading_style(&block).map(|(style, text)| (style.to_string(), text.to_string()));

        if let Some((style, title)) = heading {
            if SECTION_STYLES.contains(&style.as_str()) {
                if let Some(mut done) = current.take() {
                    if let Some(open) = subsection.take() {
                        done.body.push(SectionEntry::Subsection(open));
                    }
                    sections.push(done);
                }
                current = Some(Section {
                    title,
                    body: Vec::new(),
                });
                continue;
            }

            if style == SUBSECTION_STYLE {
                if let Some(section) = current.as_mut() {
                    if let Some(open) = subsection.take() {
                        section.body.push(SectionEntry::Subsection(open));
                    }
                    subsection = Some(Subsection {
                        title,
                        body: Vec::new(),
                    });
                    continue;
                }
            }
        }

        match (current.as_mut(), subsection.as_mut()) {
            (Some(_), Some(open)) => open.body.push(block),
            (Some(section), None) => section.body.push(SectionEntry::Block(block)),
            (None, _) => preamble.push(block),
        }
    }

    if let Some(mut section) = current {
        if let Some(open) = subsection {
            section.body.push(SectionEntry::Subsection(open));
        }
        sections.push(section);
    }

    if !preamble.is_empty() {
        sections.insert(
            0,
            Section {
                title: COVER_PAGE_TITLE.to_string(),
                body: preamble.into_iter().map(SectionEntry::Block).collect(),
            },
        );
    }

    sections
}
