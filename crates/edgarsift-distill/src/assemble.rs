//! Content assembly under the block cap and size budget.

use edgarsift_core::{BudgetStrategy, Limits};
use tracing::debug;

use crate::text::{char_len, tokens_for_chars, truncate_chars};
use crate::types::{Distillate, ItemSection, ScoredSentence};

const BLOCK_SEPARATOR: &str = "\n\n";
const FIGURES_PREFIX: &str = "Key figures: ";

/// Joins extracted pieces, in priority order, into a bounded distillate.
#[derive(Debug, Clone)]
pub struct ContentAssembler {
    max_figures: usize,
    max_blocks: usize,
    token_ceiling: usize,
    char_ceiling: usize,
    strategy: BudgetStrategy,
}

impl ContentAssembler {
    pub fn new(limits: &Limits) -> Self {
        Self {
            max_figures: limits.max_figures,
            max_blocks: limits.max_blocks,
            token_ceiling: limits.token_soft_ceiling,
            char_ceiling: limits.char_ceiling,
            strategy: limits.budget_strategy,
        }
    }

    /// Blocks in priority order: sections, sentences, the figures line,
    /// supplementary excerpts. Capped at `max_blocks`.
    pub fn blocks(
        &self,
        sections: &[ItemSection],
        sentences: &[ScoredSentence],
        figures: &[String],
        supplementary: &[String],
    ) -> Vec<String> {
        let mut blocks: Vec<String> = sections
            .iter()
            .map(|s| format!("[{}]\n{}", s.label, s.content))
            .collect();
        blocks.extend(sentences.iter().map(|s| s.text.clone()));

        let figures: Vec<&str> = figures
            .iter()
            .take(self.max_figures)
            .map(String::as_str)
            .collect();
        if !figures.is_empty() {
            blocks.push(format!("{}{}", FIGURES_PREFIX, figures.join(", ")));
        }

        blocks.extend(supplementary.iter().filter(|b| !b.trim().is_empty()).cloned());
        blocks.truncate(self.max_blocks);
        blocks
    }

    pub fn assemble(
        &self,
        sections: &[ItemSection],
        sentences: &[ScoredSentence],
        figures: &[String],
        supplementary: &[String],
    ) -> Distillate {
        let blocks = self.blocks(sections, sentences, figures, supplementary);
        self.fit(blocks)
    }

    /// Apply the budget to already-ordered blocks.
    pub fn fit(&self, mut blocks: Vec<String>) -> Distillate {
        let mut truncated = false;

        if self.strategy == BudgetStrategy::DropBlocks {
            while blocks.len() > 1 && self.over_budget(joined_chars(&blocks)) {
                blocks.pop();
                truncated = true;
            }
        }

        let mut text = blocks.join(BLOCK_SEPARATOR);
        let mut block_count = blocks.len();
        let chars = char_len(&text);
        if self.over_budget(chars) && chars > self.char_ceiling {
            text = truncate_chars(&text, self.char_ceiling).to_string();
            block_count = blocks_started_before(&blocks, self.char_ceiling);
            truncated = true;
        }

        if truncated {
            debug!(
                "Distillate over budget; {:?} kept {} blocks, {} chars",
                self.strategy,
                block_count,
                char_len(&text)
            );
        }

        let estimated_tokens = tokens_for_chars(char_len(&text));
        Distillate {
            text,
            blocks: block_count,
            estimated_tokens,
            truncated,
        }
    }

    fn over_budget(&self, chars: usize) -> bool {
        chars > self.char_ceiling || tokens_for_chars(chars) > self.token_ceiling
    }
}

fn joined_chars(blocks: &[String]) -> usize {
    let body: usize = blocks.iter().map(|b| char_len(b)).sum();
    body + char_len(BLOCK_SEPARATOR) * blocks.len().saturating_sub(1)
}

/// How many blocks have at least their first char inside the cut.
fn blocks_started_before(blocks: &[String], cut: usize) -> usize {
    let mut offset = 0;
    let mut count = 0;
    for block in blocks {
        if offset >= cut {
            break;
        }
        count += 1;
        offset += char_len(block) + char_len(BLOCK_SEPARATOR);
    }
    count
}
