//! CSS parsing.
//!
//! [`parse_stylesheet`] turns stylesheet text into a [`StyleSheet`](crate::rules::StyleSheet)
//! plus a list of [`ParseDiagnostic`]s for everything that had to be
//! dropped. Parsing is fault-tolerant: a bad declaration never loses its
//! rule, and a bad rule never loses the sheet.

mod condition;
mod css_parser;
mod error;
mod selector;
mod value;

pub use css_parser::{ParseOptions, ParseOutput, parse_declarations, parse_stylesheet};
pub use error::{DiagnosticKind, ParseDiagnostic};

pub(crate) use value::parse_component_values;
