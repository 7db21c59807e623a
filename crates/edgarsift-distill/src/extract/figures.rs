//! Monetary amounts, share counts and percentages.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Tried in order; a figure already seen under an earlier pattern is skipped.
static FIGURE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // $1,250,000.00 / $3.5 billion
        r"(?i)\$\d[\d,]*(?:\.\d{1,2})?(?:\s*(?:million|billion|trillion|백만|억|조))?",
        // 500 million dollars / 20억 달러
        r"(?i)\d[\d,]*(?:\.\d{1,2})?\s*(?:million|billion|trillion|백만|억|조)\s*(?:달러|dollars?\b)",
        r"(?i)\d[\d,]*(?:\.\d{1,2})?\s*(?:shares?\b|주식|주)",
        r"(?i)\d[\d,]*(?:\.\d{1,2})?\s*(?:percent\b|%)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("figure regex"))
    .collect()
});

/// Every figure in `text`, first-seen order, no duplicates.
pub fn extract_figures(text: &str) -> Vec<String> {
    let mut figures: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for re in FIGURE_PATTERNS.iter() {
        for m in re.find_iter(text) {
            let s = m.as_str().trim_end_matches(',').to_string();
            if seen.insert(s.clone()) {
                figures.push(s);
            }
        }
    }
    figures
}
