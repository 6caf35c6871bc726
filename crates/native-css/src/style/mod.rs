//! Style output types.

mod computed;

pub use computed::ComputedStyle;
