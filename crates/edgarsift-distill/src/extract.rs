//! Heuristic extractors over a normalized filing.
//!
//! Every extractor is pure pattern matching over text or the parse tree.
//! None of them fail: no match yields an empty result.

pub mod dates;
pub mod figures;
pub mod scoring;
pub mod sections;
pub mod supplementary;

pub use dates::{DateCandidate, DateExtractor, DateTier};
pub use figures::extract_figures;
pub use scoring::RelevanceScorer;
pub use sections::SectionSegmenter;
pub use supplementary::supplementary_blocks;
