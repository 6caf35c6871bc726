//! CSS selector types, specificity, indexing and matching.

mod index;
mod matcher;
mod specificity;
mod types;

pub use index::{IndexStats, SelectorIndex};
pub use matcher::{MatchTarget, SelectorMatcher};
pub use specificity::{CascadeRank, Origin, Specificity, SpecificityWithOrder};
pub use types::*;
