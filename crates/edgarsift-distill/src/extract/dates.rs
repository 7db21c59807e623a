//! Filing date extraction.
//!
//! Tiers are tried in a fixed order and the first one that resolves a
//! plausible date wins:
//!
//! 1. `Header`: the `<SEC-HEADER>` block: labeled `YYYYMMDD` fields, bare
//!    8-digit tokens, then the phrase patterns.
//! 2. `DocumentHead`: phrase patterns over the first `head_chars` chars.
//! 3. `FullText`: phrase patterns over the whole text.
//! 4. `MarkupScan`: `datetime`/`date`/`data-date` attributes and the sole
//!    text of `time`, `date`, `span`, `div`, `p` elements.
//! 5. `Default`: the caller's default, or today.
//!
//! A candidate whose year falls outside `[1990, this year + 5]` is rejected
//! and the search carries on.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use serde::Serialize;
use tracing::debug;

use crate::normalize::NormalizedDocument;
use crate::text::{squeeze_whitespace, truncate_chars};

pub const MIN_YEAR: i32 = 1990;
/// Years past the current one still accepted.
pub const FUTURE_YEARS: i32 = 5;
pub const DEFAULT_HEAD_CHARS: usize = 2000;

/// Tried in order by [`chrono::NaiveDate::parse_from_str`].
pub const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
];

const DATE_ATTRIBUTES: &[&str] = &["datetime", "date", "data-date"];
const DATE_ELEMENTS: &str = "time, date, span, div, p";

static HEADER_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<SEC-HEADER>.*?</SEC-HEADER>").expect("header block regex"));

/// An unterminated header: `SEC-HEADER` up to the next tag.
static HEADER_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SEC-HEADER[^<]*").expect("header run regex"));

static HEADER_FIELD_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)CONFORMED\s+PERIOD\s+OF\s+REPORT[:\s]+(\d{8})\b",
        r"(?i)FILED\s+AS\s+OF\s+DATE[:\s]+(\d{8})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("header field regex"))
    .collect()
});

static EIGHT_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{8})\b").expect("8-digit regex"));

static ISO_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("iso shape regex"));

static ISO_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})[T\s]").expect("iso prefix regex"));

/// Phrase patterns shared by the header, head and full-text tiers. Each
/// captures the date in group 1.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // The cover line reads "Date of Report (Date of earliest event reported): ..."
        r"(?i)date\s+of\s+report\s*(?:\([^)]*\))?\s*[:\(]?\s*(\w+\s+\d{1,2},?\s+\d{4})",
        r"(?i)date\s+of\s+earliest\s+event\s+reported\s*\)?\s*[:\(]?\s*(\w+\s+\d{1,2},?\s+\d{4})",
        r"(?i)filing\s+date\s*[:\(]?\s*(\w+\s+\d{1,2},?\s+\d{4})",
        r"(\d{4}-\d{2}-\d{2})",
        r"(\d{1,2}/\d{1,2}/\d{4})",
        r"(\d{1,2}-\d{1,2}-\d{4})",
        r"\((\w+\s+\d{1,2},?\s+\d{4})\)",
        r"\((\d{1,2}/\d{1,2}/\d{4})\)",
        r"\((\d{4}-\d{2}-\d{2})\)",
        r"(?i)\b(?:on|dated?|as\s+of|effective)\s+(\w+\s+\d{1,2},?\s+\d{4})",
        r"(?i)\b(?:on|dated?|as\s+of|effective)\s+(\d{1,2}/\d{1,2}/\d{4})",
        r"(?i)current\s+report\s+.*?(\w+\s+\d{1,2},?\s+\d{4})",
        r"(?i)form\s+8-k\s+.*?(\w+\s+\d{1,2},?\s+\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date pattern regex"))
    .collect()
});

/// One fallback strategy in the date chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTier {
    Header,
    DocumentHead,
    FullText,
    MarkupScan,
    Default,
}

impl DateTier {
    /// Every tier, in evaluation order. `Default` always resolves.
    pub fn all() -> &'static [DateTier] {
        &[
            Self::Header,
            Self::DocumentHead,
            Self::FullText,
            Self::MarkupScan,
            Self::Default,
        ]
    }
}

/// A matched date string, the tier that found it, and its canonical
/// `YYYY-MM-DD` form when it resolved to a plausible date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCandidate {
    pub raw: String,
    pub tier: DateTier,
    pub canonical: Option<String>,
}

impl DateCandidate {
    /// The string handed back to callers: canonical if resolved, else raw.
    pub fn value(&self) -> &str {
        self.canonical.as_deref().unwrap_or(&self.raw)
    }
}

/// Resolves a filing's date through the tier chain.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    /// Caller-supplied default; today's date when absent.
    explicit_default: Option<String>,
    today: NaiveDate,
    head_chars: usize,
}

impl DateExtractor {
    /// `default_date` is returned when no tier succeeds; `None` or an empty
    /// string means today.
    pub fn new(default_date: Option<&str>) -> Self {
        let explicit_default = default_date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Self {
            explicit_default,
            today: Local::now().date_naive(),
            head_chars: DEFAULT_HEAD_CHARS,
        }
    }

    /// Pin "today" (the plausible-year window and the implicit default).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_head_chars(mut self, head_chars: usize) -> Self {
        self.head_chars = head_chars;
        self
    }

    pub fn default_date(&self) -> String {
        match &self.explicit_default {
            Some(d) => d.clone(),
            None => self.today.format("%Y-%m-%d").to_string(),
        }
    }

    /// The winning candidate, including which tier produced it.
    pub fn resolve(&self, doc: &NormalizedDocument) -> DateCandidate {
        let mut text: Option<String> = None;
        for &tier in DateTier::all() {
            let found = match tier {
                DateTier::Header => self.from_header(doc.source()),
                DateTier::DocumentHead => {
                    let text = text.get_or_insert_with(|| doc.text());
                    self.from_patterns(truncate_chars(text, self.head_chars), tier)
                }
                DateTier::FullText => {
                    let text = text.get_or_insert_with(|| doc.text());
                    self.from_patterns(text, tier)
                }
                DateTier::MarkupScan => self.from_markup(doc),
                DateTier::Default => Some(self.default_candidate()),
            };
            if let Some(candidate) = found {
                debug!("Filing date {} from {:?} tier", candidate.value(), tier);
                return candidate;
            }
        }
        self.default_candidate()
    }

    /// Normalize a date string to `YYYY-MM-DD`, or `None` if it does not
    /// parse or the year is implausible.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        let s = squeeze_whitespace(raw);
        if s.is_empty() {
            return None;
        }

        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            return self.from_compact(&s);
        }

        DATE_FORMATS
            .iter()
            .filter_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
            .find(|d| self.plausible(*d))
            .map(|d| d.format("%Y-%m-%d").to_string())
    }

    fn from_compact(&self, digits: &str) -> Option<String> {
        let year: i32 = digits[..4].parse().ok()?;
        let month: u32 = digits[4..6].parse().ok()?;
        let day: u32 = digits[6..].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
            .filter(|d| self.plausible(*d))
            .map(|d| d.format("%Y-%m-%d").to_string())
    }

    fn plausible(&self, date: NaiveDate) -> bool {
        (MIN_YEAR..=self.today.year() + FUTURE_YEARS).contains(&date.year())
    }

    fn candidate(&self, raw: &str, tier: DateTier) -> DateCandidate {
        DateCandidate {
            raw: raw.to_string(),
            tier,
            canonical: self.canonicalize(raw),
        }
    }

    fn from_header(&self, source: &str) -> Option<DateCandidate> {
        let block = HEADER_BLOCK_RE
            .find(source)
            .or_else(|| HEADER_RUN_RE.find(source))
            .map(|m| m.as_str());
        let region = block.unwrap_or(source);

        for re in HEADER_FIELD_RES.iter() {
            for caps in re.captures_iter(region) {
                if let Some(c) = self.accept(&caps[1], DateTier::Header) {
                    return Some(c);
                }
            }
        }

        // Bare tokens and phrases only count inside an explicit header.
        let block = block?;
        for caps in EIGHT_DIGIT_RE.captures_iter(block) {
            if let Some(c) = self.accept(&caps[1], DateTier::Header) {
                return Some(c);
            }
        }
        self.from_patterns(block, DateTier::Header)
    }

    fn from_patterns(&self, text: &str, tier: DateTier) -> Option<DateCandidate> {
        for re in DATE_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                if let Some(c) = self.accept(&caps[1], tier) {
                    return Some(c);
                }
            }
        }
        None
    }

    fn from_markup(&self, doc: &NormalizedDocument) -> Option<DateCandidate> {
        let selector = Selector::parse(DATE_ELEMENTS).ok()?;
        for el in doc.tree().select(&selector) {
            for attr in DATE_ATTRIBUTES {
                let Some(value) = el.value().attr(attr) else {
                    continue;
                };
                if let Some(c) = self.accept(value, DateTier::MarkupScan) {
                    return Some(c);
                }
                if let Some(caps) = ISO_PREFIX_RE.captures(value.trim()) {
                    if let Some(c) = self.accept(&caps[1], DateTier::MarkupScan) {
                        return Some(c);
                    }
                }
            }

            let mut children = el.children();
            if let (Some(only), None) = (children.next(), children.next()) {
                if let Some(text) = only.value().as_text() {
                    if let Some(c) = self.accept(text, DateTier::MarkupScan) {
                        return Some(c);
                    }
                }
            }
        }
        None
    }

    /// Build a candidate and keep it only if it resolved.
    fn accept(&self, raw: &str, tier: DateTier) -> Option<DateCandidate> {
        let candidate = self.candidate(raw, tier);
        if candidate.canonical.is_none() {
            debug!("Rejected date candidate {:?} in {:?} tier", raw.trim(), tier);
            return None;
        }
        Some(candidate)
    }

    fn default_candidate(&self) -> DateCandidate {
        let raw = self.default_date();
        let canonical = if is_canonical(&raw) {
            self.canonicalize(&raw)
        } else {
            None
        };
        DateCandidate {
            raw,
            tier: DateTier::Default,
            canonical,
        }
    }
}

/// Shape check callers run on the extractor's output.
pub fn is_canonical(date: &str) -> bool {
    ISO_SHAPE_RE.is_match(date)
}
