//! Table and emphasis excerpts pulled straight from the parse tree.

use edgarsift_core::SupplementaryConfig;
use scraper::{ElementRef, Selector};

use crate::normalize::{NormalizedDocument, BOILERPLATE_TAGS};
use crate::text::{squeeze_whitespace, truncate_chars};

const TABLE_SELECTOR: &str = "table";
const EMPHASIS_SELECTOR: &str = "b, strong, u, em";

/// Extra blocks for the assembler: keyword-bearing tables as one `[Tables]`
/// block, then bold/underlined text as one `[Emphasis]` block.
pub fn supplementary_blocks(doc: &NormalizedDocument, config: &SupplementaryConfig) -> Vec<String> {
    if !config.enabled {
        return Vec::new();
    }

    let mut blocks = Vec::new();

    let tables = keyword_tables(doc, config);
    if !tables.is_empty() {
        let joined = tables.join("\n");
        blocks.push(format!(
            "[Tables]\n{}",
            truncate_chars(&joined, config.max_table_chars)
        ));
    }

    let emphasis = emphasis_texts(doc, config);
    if !emphasis.is_empty() {
        blocks.push(format!("[Emphasis]\n{}", emphasis.join("\n")));
    }

    blocks
}

fn keyword_tables(doc: &NormalizedDocument, config: &SupplementaryConfig) -> Vec<String> {
    let Ok(selector) = Selector::parse(TABLE_SELECTOR) else {
        return Vec::new();
    };
    let keywords: Vec<String> = config
        .table_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    doc.tree()
        .select(&selector)
        .filter(|el| !in_boilerplate(el))
        .map(|el| element_text(&el))
        .filter(|text| {
            let lower = text.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .take(config.max_tables)
        .collect()
}

fn emphasis_texts(doc: &NormalizedDocument, config: &SupplementaryConfig) -> Vec<String> {
    let Ok(selector) = Selector::parse(EMPHASIS_SELECTOR) else {
        return Vec::new();
    };
    doc.tree()
        .select(&selector)
        .filter(|el| !in_boilerplate(el))
        .map(|el| element_text(&el))
        .filter(|text| text.chars().count() > config.min_emphasis_chars)
        .take(config.max_emphasis)
        .collect()
}

fn element_text(el: &ElementRef<'_>) -> String {
    squeeze_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn in_boilerplate(el: &ElementRef<'_>) -> bool {
    el.ancestors().any(|a| {
        a.value()
            .as_element()
            .is_some_and(|e| BOILERPLATE_TAGS.contains(&e.name()))
    })
}
