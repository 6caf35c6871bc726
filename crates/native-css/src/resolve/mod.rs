//! Style resolution: cascade, value resolution and the reactive engine.

mod cache;
mod calc;
mod cascade;
mod color;
mod container;
mod dependencies;
mod engine;
mod values;
mod variables;

pub use calc::{LengthContext, Numeric, evaluate_function, is_math_function};
pub use cascade::{CascadeEnvironment, CascadedDeclaration, DeclarationSet, cascade};
pub use color::{is_color_function, resolve_color};
pub use container::{ContainerContext, ContainerKey, container_key, find_container};
pub use dependencies::{AncestorRequirement, ContainerDependency, Dependencies, MissingAncestor};
pub use engine::{EngineConfig, LayoutMeasurement, ResolvedKeyframe, StyleEngine};
pub use values::{ResolveContext, native_name, resolve_declaration};
pub use variables::{VariableSource, substitute};
