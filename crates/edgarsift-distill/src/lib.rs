//! edgarsift distill: reduces 8-K filings of unknown encoding and markup
//! quality to a bounded, high-signal text extract plus a canonical filing
//! date.

pub mod assemble;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod text;
pub mod types;

pub use assemble::ContentAssembler;
pub use extract::{DateCandidate, DateExtractor, DateTier};
pub use normalize::{normalize, NormalizedDocument, ParserKind};
pub use pipeline::{content_hash, Distiller};
pub use types::{Distillate, Distillation, ItemSection, RawDocument, ScoredSentence};
