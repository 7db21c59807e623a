//! The distillation pipeline: raw filing → normalized tree → date, sections,
//! sentences, figures → bounded distillate.

use chrono::Local;
use edgarsift_core::{DistillConfig, Error, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::assemble::ContentAssembler;
use crate::extract::dates::{is_canonical, DateCandidate, DateExtractor, DateTier};
use crate::extract::{extract_figures, supplementary_blocks, RelevanceScorer, SectionSegmenter};
use crate::normalize::{self, NormalizedDocument};
use crate::types::{Distillation, RawDocument};

/// Runs every stage with one shared, read-only configuration.
pub struct Distiller<'a> {
    config: &'a DistillConfig,
    segmenter: SectionSegmenter,
    scorer: RelevanceScorer,
    assembler: ContentAssembler,
}

impl<'a> Distiller<'a> {
    /// Validate the config and compile the item patterns and keyword index.
    pub fn new(config: &'a DistillConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            segmenter: SectionSegmenter::new(&config.items, &config.limits)?,
            scorer: RelevanceScorer::new(&config.keywords, &config.limits),
            assembler: ContentAssembler::new(&config.limits),
        })
    }

    pub fn config(&self) -> &DistillConfig {
        self.config
    }

    pub fn normalize(&self, raw: RawDocument<'_>) -> NormalizedDocument {
        normalize::normalize(raw)
    }

    /// The winning date candidate. Anything that is not `YYYY-MM-DD` after
    /// the tier chain (only possible with a malformed default) becomes today.
    pub fn resolve_date(&self, doc: &NormalizedDocument, default_date: Option<&str>) -> DateCandidate {
        let extractor =
            DateExtractor::new(default_date).with_head_chars(self.config.limits.head_chars);
        let candidate = extractor.resolve(doc);
        if is_canonical(candidate.value()) {
            return candidate;
        }

        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        warn!(
            "Date {:?} is not YYYY-MM-DD; falling back to {}",
            candidate.value(),
            today
        );
        DateCandidate {
            raw: today.clone(),
            tier: DateTier::Default,
            canonical: Some(today),
        }
    }

    /// Canonical filing date; always `YYYY-MM-DD`.
    pub fn filing_date(&self, doc: &NormalizedDocument, default_date: Option<&str>) -> String {
        self.resolve_date(doc, default_date).value().to_string()
    }

    /// Distill one filing. Never fails; degenerate input yields an empty
    /// distillate and the default date.
    pub fn distill(&self, raw: RawDocument<'_>, default_date: Option<&str>) -> Distillation {
        let doc = self.normalize(raw);
        let date = self.resolve_date(&doc, default_date);
        let text = doc.body_text();

        let sections = self.segmenter.segment(&text);
        let sentences = self.scorer.top_sentences(&text);
        let figures = extract_figures(&text);
        let supplementary = supplementary_blocks(&doc, &self.config.supplementary);
        debug!(
            "Extracted {} sections, {} sentences, {} figures, {} supplementary blocks",
            sections.len(),
            sentences.len(),
            figures.len(),
            supplementary.len()
        );

        let distillate = self
            .assembler
            .assemble(&sections, &sentences, &figures, &supplementary);

        info!(
            "Distilled filing dated {} ({:?}): {} blocks, ~{} tokens{}",
            date.value(),
            date.tier,
            distillate.blocks,
            distillate.estimated_tokens,
            if distillate.truncated { ", truncated" } else { "" }
        );

        Distillation {
            filing_date: date.value().to_string(),
            date_tier: date.tier,
            parser: doc.parser(),
            sections: sections.into_iter().map(|s| s.code).collect(),
            sentence_count: sentences.len(),
            figure_count: figures.len().min(self.config.limits.max_figures),
            block_count: distillate.blocks,
            estimated_tokens: distillate.estimated_tokens,
            truncated: distillate.truncated,
            content_hash: content_hash(doc.source()),
            distillate: distillate.text,
        }
    }

    /// Distill a batch. An empty batch is the caller's mistake.
    pub fn distill_all(
        &self,
        docs: &[RawDocument<'_>],
        default_date: Option<&str>,
    ) -> Result<Vec<Distillation>> {
        if docs.is_empty() {
            return Err(Error::NoDocument);
        }
        info!("Distilling {} filings", docs.len());

        #[cfg(feature = "rayon")]
        let out: Vec<Distillation> = docs
            .par_iter()
            .map(|raw| self.distill(*raw, default_date))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let out: Vec<Distillation> = docs
            .iter()
            .map(|raw| self.distill(*raw, default_date))
            .collect();

        Ok(out)
    }
}

/// SHA-256 of `text`, hex encoded.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
