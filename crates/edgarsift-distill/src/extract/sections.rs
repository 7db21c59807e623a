//! Item section segmentation.
//!
//! A section runs from its `Item N.NN` header to the next item header or
//! the signature block. The `regex` crate has no look-ahead, so the end is
//! found with a second search starting after the header.

use std::collections::HashSet;

use edgarsift_core::{Error, ItemSpec, Limits, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::text::{char_len, squeeze_whitespace, truncate_chars};
use crate::types::ItemSection;

static SECTION_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bitem[\s\x{a0}]*\d+(?:[\s\x{a0}]*[.:,][\s\x{a0}]*|[\s\x{a0}]+)\d+\b|\bsignature")
        .expect("section end regex")
});

/// Header pattern for one item, e.g. `Item 5.02`, `ITEM 5 . 02`, `Item 5:2`.
fn header_pattern(major: u32, minor: u32) -> String {
    format!(
        r"(?i)\bitem[\s\x{{a0}}]*{}(?:[\s\x{{a0}}]*[.:,][\s\x{{a0}}]*|[\s\x{{a0}}]+)0*{}\b",
        major, minor
    )
}

struct CompiledItem {
    spec: ItemSpec,
    header: Regex,
}

/// Splits filing text into the configured item sections.
pub struct SectionSegmenter {
    items: Vec<CompiledItem>,
    min_chars: usize,
    max_chars: usize,
}

impl SectionSegmenter {
    pub fn new(items: &[ItemSpec], limits: &Limits) -> Result<Self> {
        let items = items
            .iter()
            .map(|spec| {
                let header = Regex::new(&header_pattern(spec.major, spec.minor)).map_err(|e| {
                    Error::Config(format!("item {} pattern: {}", spec.code, e))
                })?;
                Ok(CompiledItem {
                    spec: spec.clone(),
                    header,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            items,
            min_chars: limits.min_section_chars,
            max_chars: limits.max_section_chars,
        })
    }

    /// Sections found in `text`, highest weight first; ties keep table order.
    pub fn segment(&self, text: &str) -> Vec<ItemSection> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut sections = Vec::new();

        for item in &self.items {
            if !seen.insert(item.spec.code.as_str()) {
                continue;
            }
            let Some(header) = item.header.find(text) else {
                continue;
            };
            let end = SECTION_END_RE
                .find_at(text, header.end())
                .map(|m| m.start())
                .unwrap_or(text.len());

            let content = squeeze_whitespace(&text[header.start()..end]);
            if char_len(&content) < self.min_chars {
                debug!(
                    "Dropping {} section: {} chars is below the minimum",
                    item.spec.code,
                    char_len(&content)
                );
                continue;
            }

            sections.push(ItemSection {
                code: item.spec.code.clone(),
                label: item.spec.label.clone(),
                weight: item.spec.weight,
                content: truncate_chars(&content, self.max_chars).to_string(),
            });
        }

        sections.sort_by(|a, b| b.weight.cmp(&a.weight));
        sections
    }
}
