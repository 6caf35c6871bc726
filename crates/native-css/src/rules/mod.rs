//! Style rules and stylesheets.

mod condition;
mod rule;
mod stylesheet;

pub use condition::{
    ColorScheme, Comparator, ContainerQuery, MediaQuery, RuleCondition, Size, SizeAxis,
    SizeCondition, SizeFeature,
};
pub use rule::{Declaration, DeclaredValue, StyleRule};
pub use stylesheet::{Keyframe, Keyframes, StyleSheet};
