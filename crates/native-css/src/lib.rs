//! CSS-subset styling for native UI trees.
//!
//! This crate compiles a subset of CSS and keeps computed styles current as
//! the element tree, interaction state and measurements change:
//!
//! - **Parsing**: Fault-tolerant stylesheet parsing with diagnostics
//! - **Selectors**: Compound selectors and combinators, indexed by rightmost part
//! - **Values**: `calc()`, `var()`, colors, shorthands and transforms resolved to native properties
//! - **Conditions**: `@container` size queries and `@media` color scheme / viewport queries
//! - **Reactivity**: Per-node dependency tracking with batched, ancestor-first recomputes
//!
//! # Example
//!
//! ```
//! use native_css::prelude::*;
//!
//! let mut engine = StyleEngine::new();
//! let diagnostics = engine.register_css(".card { padding: 8px; }", &ParseOptions::default());
//! assert!(diagnostics.is_empty());
//!
//! let card = engine.mount(ElementNode::new("View").with_class("card"), None)?;
//! let style = engine.style(card)?;
//! assert_eq!(style.get("paddingTop"), Some(&ResolvedValue::Number(8.0)));
//! # Ok::<(), native_css::Error>(())
//! ```

pub mod applier;
pub mod parser;
pub mod resolve;
pub mod rules;
pub mod selector;
pub mod style;
pub mod tree;
pub mod types;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::applier::StyleApplier;
    pub use crate::parser::{ParseDiagnostic, ParseOptions};
    pub use crate::resolve::{EngineConfig, LayoutMeasurement, ResolvedKeyframe, StyleEngine};
    pub use crate::rules::{ColorScheme, StyleSheet};
    pub use crate::style::ComputedStyle;
    pub use crate::tree::{BindingState, ContainerRole, ElementNode, NodeId, PseudoState};
    pub use crate::types::{Color, ResolvedValue};
}
