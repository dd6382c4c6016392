use super::xml::Element;
use crate::models::report::{ListData, ListIndent};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
struct LevelDefinition {
    num_fmt: Option<String>,
    lvl_text: Option<String>,
    indent: Option<ListIndent>,
}

/// List definitions from `word/numbering.xml`: each `w:num` instance mapped
/// to the levels of the `w:abstractNum` it points at.
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    instances: HashMap<String, HashMap<String, LevelDefinition>>,
}

impl Numbering {
    pub fn parse(root: &Element) -> Self {
        let mut abstract_levels: HashMap<&str, HashMap<String, LevelDefinition>> = HashMap::new();

        for abstract_num in root.elements().filter(|e| e.name == "w:abstractNum") {
            let Some(abstract_id) = abstract_num.attr("w:abstractNumId") else {
                continue;
            };

            let levels = abstract_num
                .elements()
                .filter(|e| e.name == "w:lvl")
                .filter_map(|level| {
                    let index = level.attr("w:ilvl")?;
                    let indent = level.find("w:ind").map(|ind| ListIndent {
                        left: ind.attr("w:left").map(str::to_string),
                        hanging: ind.attr("w:hanging").map(str::to_string),
                        first_line: ind.attr("w:firstLine").map(str::to_string),
                    });

                    Some((
                        index.to_string(),
                        LevelDefinition {
                            num_fmt: level.find_attr("w:numFmt", "w:val").map(str::to_string),
                            lvl_text: level.find_attr("w:lvlText", "w:val").map(str::to_string),
                            indent,
                        },
                    ))
                })
                .collect();

            abstract_levels.insert(abstract_id, levels);
        }

        let instances = root
            .elements()
            .filter(|e| e.name == "w:num")
            .filter_map(|num| {
                let num_id = num.attr("w:numId")?;
                let abstract_id = num.find_attr("w:abstractNumId", "w:val")?;
                let levels = abstract_levels.get(abstract_id)?.clone();
                Some((num_id.to_string(), levels))
            })
            .collect();

        Self { instances }
    }

    /// List details for a paragraph's `w:numId` / `w:ilvl` pair.
    pub fn list_data(&self, num_id: &str, level: &str) -> Option<ListData> {
        let definition = self.instances.get(num_id)?.get(level)?;

        Some(ListData {
            is_bullet: definition.num_fmt.as_deref() == Some("bullet"),
            bullet_text: definition.lvl_text.clone(),
            level: level.to_string(),
            indent: definition.indent.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::docx::xml;

    const NUMBERING: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0">
      <w:numFmt w:val="bullet"/><w:lvlText w:val="•"/>
      <w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr>
    </w:lvl>
    <w:lvl w:ilvl="1"><w:numFmt w:val="decimal"/><w:lvlText w:val="%2."/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="7"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="8"><w:abstractNumId w:val="99"/></w:num>
</w:numbering>"#;

    fn numbering() -> Numbering {
        Numbering::parse(&xml::parse(NUMBERING).unwrap())
    }

    #[test]
    fn test_bullet_level() {
        let data = numbering().list_data("7", "0").unwrap();

        assert!(data.is_bullet);
        assert_eq!(data.bullet_text.as_deref(), Some("•"));
        assert_eq!(data.level, "0");
        let indent = data.indent.unwrap();
        assert_eq!(indent.left.as_deref(), Some("720"));
        assert_eq!(indent.hanging.as_deref(), Some("360"));
        assert_eq!(indent.first_line, None);
    }

    #[test]
    fn test_numbered_level_without_indent() {
        let data = numbering().list_data("7", "1").unwrap();

        assert!(!data.is_bullet);
        assert_eq!(data.bullet_text.as_deref(), Some("%2."));
        assert!(data.indent.is_none());
    }

    #[test]
    fn test_unknown_references() {
        let numbering = numbering();
        assert!(numbering.list_data("8", "0").is_none());
        assert!(numbering.list_data("7", "5").is_none());
        assert!(numbering.list_data("1", "0").is_none());
    }
}
