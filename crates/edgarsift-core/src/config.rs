//! Pipeline configuration: size limits, item table, keyword table.
//!
//! Loaded once at startup and shared by reference with every pipeline call.
//! Nothing in here is mutated while documents are being processed.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::tables::{default_items, default_keywords, DEFAULT_TABLE_KEYWORDS};

/// What the assembler does when the distillate is over budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStrategy {
    /// Cut the whole concatenation at the character ceiling.
    #[default]
    Truncate,
    /// Drop trailing (lowest-priority) blocks until the budget holds.
    DropBlocks,
}

impl FromStr for BudgetStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "truncate" => Ok(Self::Truncate),
            "drop_blocks" | "drop-blocks" => Ok(Self::DropBlocks),
            other => Err(Error::Config(format!("unknown budget strategy: {}", other))),
        }
    }
}

/// Size and threshold limits applied across the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Item section content is cut to this many chars.
    pub max_section_chars: usize,
    /// Item sections shorter than this are treated as false positives.
    pub min_section_chars: usize,
    /// Sentences shorter than this are never scored.
    pub min_sentence_chars: usize,
    /// Minimum aggregate keyword weight for a sentence to be kept.
    pub score_threshold: f64,
    /// Number of scored sentences handed to the assembler.
    pub top_sentences: usize,
    /// Number of figures on the figures line.
    pub max_figures: usize,
    /// Maximum number of blocks in the distillate.
    pub max_blocks: usize,
    /// Estimated-token ceiling that triggers the budget.
    pub token_soft_ceiling: usize,
    /// Hard character ceiling of the distillate.
    pub char_ceiling: usize,
    /// Leading chars of the document searched by the head date tier.
    pub head_chars: usize,
    pub budget_strategy: BudgetStrategy,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_section_chars: 1500,
            min_section_chars: 80,
            min_sentence_chars: 40,
            score_threshold: 1.5,
            top_sentences: 12,
            max_figures: 10,
            max_blocks: 15,
            token_soft_ceiling: 4500,
            char_ceiling: 12_000,
            head_chars: 2000,
            budget_strategy: BudgetStrategy::Truncate,
        }
    }
}

/// One regulatory item the segmenter looks for, e.g. Item 5.02.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Stable code, e.g. `ITEM_5_02`.
    pub code: String,
    pub major: u32,
    pub minor: u32,
    /// Importance; higher sorts first.
    pub weight: u32,
    /// Human label printed in the block header.
    pub label: String,
}

/// A weighted keyword category. A sentence earns the weight once if any
/// keyword of the category occurs in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub weight: f64,
    pub keywords: Vec<String>,
}

/// Table and emphasis excerpt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplementaryConfig {
    pub enabled: bool,
    pub table_keywords: Vec<String>,
    pub max_tables: usize,
    pub max_table_chars: usize,
    pub max_emphasis: usize,
    /// Emphasis text must be longer than this to be kept.
    pub min_emphasis_chars: usize,
}

impl Default for SupplementaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            table_keywords: DEFAULT_TABLE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            max_tables: 3,
            max_table_chars: 1500,
            max_emphasis: 15,
            min_emphasis_chars: 10,
        }
    }
}

/// Top-level distillation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistillConfig {
    pub limits: Limits,
    pub items: Vec<ItemSpec>,
    pub keywords: Vec<KeywordCategory>,
    pub supplementary: SupplementaryConfig,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            items: default_items(),
            keywords: default_keywords(),
            supplementary: SupplementaryConfig::default(),
        }
    }
}

impl DistillConfig {
    /// Load config from a JSON file, falling back to defaults, then apply
    /// environment overrides.
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config = match config_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(s) => match serde_json::from_str::<DistillConfig>(&s) {
                    Ok(c) => {
                        info!("Loaded distill config from {}", path.display());
                        c
                    }
                    Err(e) => {
                        warn!("Ignoring unparseable config {}: {}", path.display(), e);
                        DistillConfig::default()
                    }
                },
                Err(e) => {
                    warn!("Config {} not readable ({}), using defaults", path.display(), e);
                    DistillConfig::default()
                }
            },
            None => DistillConfig::default(),
        };

        config.apply_env();
        config
    }

    /// Strict variant of [`DistillConfig::load`]: a missing or malformed
    /// file is an error.
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(config_path)?;
        let config: DistillConfig = serde_json::from_str(&s)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to disk as pretty JSON.
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        info!("Saved distill config to {}", config_path.display());
        Ok(())
    }

    /// Apply `EDGARSIFT_*` environment overrides. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse::<usize>("EDGARSIFT_MAX_BLOCKS") {
            self.limits.max_blocks = v;
        }
        if let Some(v) = env_parse::<usize>("EDGARSIFT_CHAR_CEILING") {
            self.limits.char_ceiling = v;
        }
        if let Some(v) = env_parse::<usize>("EDGARSIFT_TOKEN_CEILING") {
            self.limits.token_soft_ceiling = v;
        }
        if let Some(v) = env_parse::<BudgetStrategy>("EDGARSIFT_BUDGET_STRATEGY") {
            self.limits.budget_strategy = v;
        }
    }

    /// Reject tables and limits the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let l = &self.limits;
        if l.max_blocks == 0 || l.char_ceiling == 0 || l.token_soft_ceiling == 0 {
            return Err(Error::Config(
                "max_blocks, char_ceiling and token_soft_ceiling must be positive".into(),
            ));
        }
        if l.max_section_chars == 0 {
            return Err(Error::Config("max_section_chars must be positive".into()));
        }
        if !l.score_threshold.is_finite() {
            return Err(Error::Config("score_threshold must be finite".into()));
        }

        let mut codes = HashSet::new();
        for item in &self.items {
            if item.code.trim().is_empty() {
                return Err(Error::Config("item with empty code".into()));
            }
            if !codes.insert(item.code.as_str()) {
                return Err(Error::Config(format!("duplicate item code: {}", item.code)));
            }
        }

        for category in &self.keywords {
            if !(category.weight.is_finite() && category.weight > 0.0) {
                return Err(Error::Config(format!(
                    "keyword category {} needs a positive weight",
                    category.name
                )));
            }
            if category.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "keyword category {} has no keywords",
                    category.name
                )));
            }
        }

        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid {}={}", key, raw);
            None
        }
    }
}
