//! Value types shared by the parser and the resolver.

mod color;
mod value;

pub use color::Color;
pub use value::{ComponentValue, ResolvedValue, UnitKind, components_to_string, write_components};
