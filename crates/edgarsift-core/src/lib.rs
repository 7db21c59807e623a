//! edgarsift core: error type, distillation config and the default 8-K tables.

pub mod config;
pub mod error;
pub mod tables;

pub use config::{BudgetStrategy, DistillConfig, ItemSpec, KeywordCategory, Limits, SupplementaryConfig};
pub use error::{Error, Result};
