//! Entities passed between pipeline stages.

use serde::Serialize;

use crate::extract::dates::DateTier;
use crate::normalize::ParserKind;

/// A filing as handed to the pipeline: raw bytes of unknown encoding
/// (possibly gzip-compressed) or already-decoded text.
#[derive(Debug, Clone, Copy)]
pub enum RawDocument<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> From<&'a [u8]> for RawDocument<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for RawDocument<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes.as_slice())
    }
}

impl<'a> From<&'a str> for RawDocument<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for RawDocument<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

/// One regulatory item block, e.g. the body of Item 5.02.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSection {
    pub code: String,
    pub label: String,
    pub weight: u32,
    /// Header through the next item header, whitespace-collapsed and capped.
    pub content: String,
}

/// A sentence that cleared the keyword-weight threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    pub text: String,
    pub score: f64,
    /// Names of the keyword categories that matched.
    pub categories: Vec<String>,
}

/// Assembled, size-bounded text block list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distillate {
    pub text: String,
    /// Blocks kept after the block cap and budget.
    pub blocks: usize,
    pub estimated_tokens: usize,
    /// Whether the budget cut or dropped anything.
    pub truncated: bool,
}

/// Pipeline output for one filing.
#[derive(Debug, Clone, Serialize)]
pub struct Distillation {
    pub distillate: String,
    /// Always `YYYY-MM-DD`.
    pub filing_date: String,
    pub date_tier: DateTier,
    pub parser: ParserKind,
    /// Item codes that produced a section, in distillate order.
    pub sections: Vec<String>,
    pub sentence_count: usize,
    pub figure_count: usize,
    pub block_count: usize,
    pub estimated_tokens: usize,
    pub truncated: bool,
    /// SHA-256 of the normalized source text.
    pub content_hash: String,
}
