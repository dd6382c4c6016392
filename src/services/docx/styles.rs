use super::xml::Element;
use crate::models::report::Styles;
use std::collections::HashMap;

/// `basedOn` chains longer than this are treated as cycles and cut.
const MAX_INHERITANCE_DEPTH: usize = 32;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDefinition {
    pub kind: String,
    pub name: Option<String>,
    pub based_on: Option<String>,
    pub run: Styles,
    pub paragraph: Styles,
}

/// Styles from `word/styles.xml`, keyed by `w:styleId`, with `basedOn`
/// inheritance already applied.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, StyleDefinition>,
}

impl StyleSheet {
    pub fn parse(root: &Element) -> Self {
        let mut declared = HashMap::new();

        for style in root.elements().filter(|element| element.name == "w:style") {
            let (Some(id), Some(kind)) = (style.attr("w:styleId"), style.attr("w:type")) else {
                continue;
            };

            declared.insert(
                id.to_string(),
                StyleDefinition {
                    kind: kind.to_string(),
                    name: style.find_attr("w:name", "w:val").map(str::to_string),
                    based_on: style.find_attr("w:basedOn", "w:val").map(str::to_string),
                    run: run_styles(style.child("w:rPr")),
                    paragraph: paragraph_styles(style.child("w:pPr")),
                },
            );
        }

        let styles = declared
            .keys()
            .map(|id| (id.clone(), resolve(&declared, id)))
            .collect();

        Self { styles }
    }

    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.get(id)
    }
}

/// Fold the `basedOn` chain of `id` from the root ancestor down.
fn resolve(declared: &HashMap<String, StyleDefinition>, id: &str) -> StyleDefinition {
    let mut chain = Vec::new();
    let mut current = declared.get(id);

    while let Some(style) = current {
        if chain.len() == MAX_INHERITANCE_DEPTH {
            break;
        }
        chain.push(style);
        current = style.based_on.as_deref().and_then(|parent| declared.get(parent));
    }

    let mut resolved = chain.last().map(|root| (*root).clone()).unwrap_or_default();
    for style in chain.iter().rev().skip(1) {
        resolved.run.merge(&style.run);
        resolved.paragraph.merge(&style.paragraph);
    }

    if let Some(own) = chain.first() {
        resolved.kind = own.kind.clone();
        resolved.name = own.name.clone();
        resolved.based_on = own.based_on.clone();
    }
    resolved
}

/// `<w:b/>` means on; `w:val` of `0`, `false`, `off` or `none` turns it off.
fn toggle(properties: &Element, name: &str) -> Option<bool> {
    properties.find(name).map(|element| {
        !matches!(
            element.attr("w:val"),
            Some("0") | Some("false") | Some("off") | Some("none")
        )
    })
}

fn value(properties: &Element, name: &str, attribute: &str) -> Option<String> {
    properties.find_attr(name, attribute).map(str::to_string)
}

/// Character formatting from a `w:rPr` element.
pub fn run_styles(properties: Option<&Element>) -> Styles {
    let Some(rpr) = properties else {
        return Styles::default();
    };

    Styles {
        bold: toggle(rpr, "w:b"),
        italic: toggle(rpr, "w:i"),
        underline: toggle(rpr, "w:u"),
        strike_through: toggle(rpr, "w:strike"),
        color: value(rpr, "w:color", "w:val"),
        font_size: value(rpr, "w:sz", "w:val"),
        font: value(rpr, "w:rFonts", "w:ascii"),
        background_color: value(rpr, "w:shd", "w:fill"),
        highlight: value(rpr, "w:highlight", "w:val"),
        ..Styles::default()
    }
}

/// Alignment, spacing and indentation from a `w:pPr` element.
pub fn paragraph_styles(properties: Option<&Element>) -> Styles {
    let Some(ppr) = properties else {
        return Styles::default();
    };

    Styles {
        alignment: value(ppr, "w:jc", "w:val"),
        spacing_before: value(ppr, "w:spacing", "w:before"),
        spacing_after: value(ppr, "w:spacing", "w:after"),
        indent_left: value(ppr, "w:ind", "w:left"),
        indent_right: value(ppr, "w:ind", "w:right"),
        ..Styles::default()
    }
}
