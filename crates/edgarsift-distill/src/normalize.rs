//! Markup normalizer: raw filing bytes or text → parse tree.
//!
//! Total by contract. Every failure along the way (corrupt gzip, unknown
//! encoding, markup no parser accepts) degrades to the next fallback, and
//! the last resort is an empty tree. Downstream stages can always assume a
//! valid, possibly empty, document.

use std::io::Read;
use std::panic::{self, AssertUnwindSafe};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::MultiGzDecoder;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::RawDocument;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Elements whose text is left out of [`NormalizedDocument::body_text`].
pub const BOILERPLATE_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

static LOOKS_LIKE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z!/?]").expect("markup sniff regex"));

/// Parser back-end that produced a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// Well-formed markup only (every element closed and nested).
    Strict,
    /// html5ever with full error recovery.
    Lenient,
    /// Sniffed and wrapped: plain text is escaped into a `<pre>` fragment.
    Wrapped,
    /// Nothing parsed; the tree is empty.
    Empty,
}

impl ParserKind {
    /// Back-ends in the order they are tried. Strict first, so well-formed
    /// XHTML and inline XBRL keep their exact structure.
    pub fn fallback_chain() -> &'static [ParserKind] {
        &[Self::Strict, Self::Lenient, Self::Wrapped]
    }
}

#[derive(Debug, Error)]
enum Rejection {
    #[error("malformed markup: {0}")]
    Malformed(String),
    #[error("parser panicked")]
    Panicked,
}

/// Cleaned, decoded filing text plus a parse tree over it.
#[derive(Debug)]
pub struct NormalizedDocument {
    source: String,
    tree: Html,
    parser: ParserKind,
}

impl NormalizedDocument {
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            tree: Html::new_document(),
            parser: ParserKind::Empty,
        }
    }

    /// Decoded markup after control-character scrubbing.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Html {
        &self.tree
    }

    pub fn parser(&self) -> ParserKind {
        self.parser
    }

    /// Every text node, joined with single spaces.
    pub fn text(&self) -> String {
        collect_text(&self.tree, false)
    }

    /// Like [`text`](Self::text) but without script, style and page chrome.
    pub fn body_text(&self) -> String {
        collect_text(&self.tree, true)
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Normalize a raw filing. Never fails.
pub fn normalize(raw: RawDocument<'_>) -> NormalizedDocument {
    let source = match raw {
        RawDocument::Bytes(bytes) => decode_bytes(bytes),
        RawDocument::Text(text) => scrub_text(text),
    };

    for &kind in ParserKind::fallback_chain() {
        match parse_with(kind, &source) {
            Ok(tree) => {
                debug!("Parsed {} chars of markup with {:?} parser", source.len(), kind);
                return NormalizedDocument { source, tree, parser: kind };
            }
            Err(e) => debug!("{:?} parser rejected document: {}", kind, e),
        }
    }

    warn!("Every parser rejected the document; continuing with an empty tree");
    NormalizedDocument {
        source,
        ..NormalizedDocument::empty()
    }
}

fn parse_with(kind: ParserKind, text: &str) -> Result<Html, Rejection> {
    match kind {
        ParserKind::Strict => {
            check_well_formed(text)?;
            guarded(|| Html::parse_document(text))
        }
        ParserKind::Lenient => guarded(|| Html::parse_document(text)),
        ParserKind::Wrapped => {
            let wrapped = sniff_and_wrap(text);
            guarded(|| Html::parse_fragment(&wrapped))
        }
        ParserKind::Empty => Ok(Html::new_document()),
    }
}

fn guarded<F: FnOnce() -> Html>(parse: F) -> Result<Html, Rejection> {
    panic::catch_unwind(AssertUnwindSafe(parse)).map_err(|_| Rejection::Panicked)
}

/// Accept only markup whose elements are all closed and properly nested.
fn check_well_formed(text: &str) -> Result<(), Rejection> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    let mut elements = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                elements += 1;
            }
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Rejection::Malformed("unbalanced end tag".into()))?;
            }
            Ok(Event::Empty(_)) => elements += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Rejection::Malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if elements == 0 {
        return Err(Rejection::Malformed("no elements".into()));
    }
    if depth != 0 {
        return Err(Rejection::Malformed(format!("{} unclosed elements", depth)));
    }
    Ok(())
}

fn sniff_and_wrap(text: &str) -> String {
    if LOOKS_LIKE_MARKUP.is_match(text) {
        return text.to_string();
    }
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<pre>{}</pre>", escaped)
}

fn decode_bytes(bytes: &[u8]) -> String {
    let inflated = gunzip(bytes);
    let data = inflated.as_deref().unwrap_or(bytes);

    let cleaned: Vec<u8> = data
        .iter()
        .map(|&b| if is_kept_byte(b) { b } else { b' ' })
        .collect();

    let encoding = detect_encoding(&cleaned);
    let (text, _, had_errors) = encoding.decode(&cleaned);
    if had_errors {
        debug!("Lossy decode with {}", encoding.name());
    }
    text.into_owned()
}

/// Inflate a gzip stream, every member of it. `None` when the input is not gzip or is corrupt.
fn gunzip(bytes: &[u8]) -> Option<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return None;
    }
    let mut out = Vec::new();
    match MultiGzDecoder::new(bytes).read_to_end(&mut out) {
        Ok(_) => {
            debug!("Inflated gzip filing: {} -> {} bytes", bytes.len(), out.len());
            Some(out)
        }
        Err(e) => {
            warn!("Gzip header present but stream unreadable ({}); using raw bytes", e);
            None
        }
    }
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn is_kept_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | 0x20..=0x7e)
}

fn scrub_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && is_kept_byte(c as u8) { c } else { ' ' })
        .collect()
}

fn collect_text(tree: &Html, skip_boilerplate: bool) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in tree.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let text: &str = text;
        if text.trim().is_empty() {
            continue;
        }
        if skip_boilerplate
            && node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| BOILERPLATE_TAGS.contains(&e.name()))
            })
        {
            continue;
        }
        parts.push(text);
    }
    parts.join(" ")
}
