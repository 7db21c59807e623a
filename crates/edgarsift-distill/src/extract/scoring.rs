//! Keyword-weighted sentence relevance.

use edgarsift_core::{KeywordCategory, Limits};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{char_len, squeeze_whitespace};
use crate::types::ScoredSentence;

static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence break regex"));

const MASK: char = '\u{1}';

/// Lowercased keywords sorted longest-first, each tagged with the index of
/// its category.
#[derive(Debug, Clone)]
struct KeywordIndex {
    entries: Vec<(String, usize)>,
}

impl KeywordIndex {
    fn new(categories: &[KeywordCategory]) -> Self {
        let mut entries: Vec<(String, usize)> = categories
            .iter()
            .enumerate()
            .flat_map(|(idx, cat)| {
                cat.keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .map(move |k| (k, idx))
            })
            .collect();
        entries.sort_by(|a, b| {
            char_len(&b.0)
                .cmp(&char_len(&a.0))
                .then_with(|| a.0.cmp(&b.0))
        });
        entries.dedup();
        Self { entries }
    }

    /// Category indices hit by `sentence`. Every match is masked so a
    /// shorter keyword cannot reuse the same span.
    fn hits(&self, sentence: &str, categories: usize) -> Vec<bool> {
        let mut hit = vec![false; categories];
        let mut haystack = sentence.to_lowercase();
        for (keyword, idx) in &self.entries {
            if !haystack.contains(keyword.as_str()) {
                continue;
            }
            hit[*idx] = true;
            let mask: String = std::iter::repeat(MASK).take(keyword.len()).collect();
            haystack = haystack.replace(keyword.as_str(), &mask);
        }
        hit
    }
}

/// Picks the sentences carrying the most keyword weight.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    categories: Vec<KeywordCategory>,
    index: KeywordIndex,
    min_chars: usize,
    threshold: f64,
    top_k: usize,
}

impl RelevanceScorer {
    pub fn new(categories: &[KeywordCategory], limits: &Limits) -> Self {
        Self {
            categories: categories.to_vec(),
            index: KeywordIndex::new(categories),
            min_chars: limits.min_sentence_chars,
            threshold: limits.score_threshold,
            top_k: limits.top_sentences,
        }
    }

    /// Score one unit: the summed weight of every category with a match.
    pub fn score(&self, sentence: &str) -> (f64, Vec<String>) {
        let hits = self.index.hits(sentence, self.categories.len());
        let mut score = 0.0;
        let mut names = Vec::new();
        for (cat, _) in self.categories.iter().zip(&hits).filter(|(_, hit)| **hit) {
            score += cat.weight;
            names.push(cat.name.clone());
        }
        (score, names)
    }

    /// Top-K sentences by score, descending; equal scores keep document
    /// order.
    pub fn top_sentences(&self, text: &str) -> Vec<ScoredSentence> {
        let mut scored: Vec<ScoredSentence> = split_units(text)
            .into_iter()
            .filter(|unit| char_len(unit) >= self.min_chars)
            .filter_map(|unit| {
                let (score, categories) = self.score(&unit);
                (score >= self.threshold).then_some(ScoredSentence {
                    text: unit,
                    score,
                    categories,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);
        scored
    }
}

/// Split on runs of `.`, `!` and `?`. Units come back whitespace-collapsed
/// and without their terminator.
fn split_units(text: &str) -> Vec<String> {
    SENTENCE_BREAK_RE
        .split(text)
        .map(squeeze_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}
