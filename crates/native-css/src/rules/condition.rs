//! Conditional group rules: `@container` and `@media`.

use std::fmt;

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_css(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// A measured width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Dimension tested by a size feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeAxis {
    Width,
    Height,
}

/// Comparison in a size feature, read as `<axis> <op> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
}

impl Comparator {
    /// The comparator with its operands swapped (`400px < width` is `width > 400px`).
    pub fn flipped(self) -> Self {
        match self {
            Self::Less => Self::Greater,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::Greater => Self::Less,
            Self::GreaterOrEqual => Self::LessOrEqual,
            Self::Equal => Self::Equal,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "=",
        }
    }
}

/// One size test, e.g. `(width > 400px)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeFeature {
    pub axis: SizeAxis,
    pub comparator: Comparator,
    /// Threshold in pixels.
    pub value: f32,
}

impl SizeFeature {
    pub fn new(axis: SizeAxis, comparator: Comparator, value: f32) -> Self {
        Self {
            axis,
            comparator,
            value,
        }
    }

    /// Test a measured size.
    pub fn evaluate(&self, size: Size) -> bool {
        let actual = match self.axis {
            SizeAxis::Width => size.width,
            SizeAxis::Height => size.height,
        };
        match self.comparator {
            Comparator::Less => actual < self.value,
            Comparator::LessOrEqual => actual <= self.value,
            Comparator::Greater => actual > self.value,
            Comparator::GreaterOrEqual => actual >= self.value,
            Comparator::Equal => actual == self.value,
        }
    }
}

impl fmt::Display for SizeFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.axis {
            SizeAxis::Width => "width",
            SizeAxis::Height => "height",
        };
        write!(f, "({} {} {}px)", axis, self.comparator.as_str(), self.value)
    }
}

/// Conjunction of size features. An empty condition always holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeCondition {
    pub features: Vec<SizeFeature>,
}

impl SizeCondition {
    pub fn new(features: Vec<SizeFeature>) -> Self {
        Self { features }
    }

    pub fn evaluate(&self, size: Size) -> bool {
        self.features.iter().all(|feature| feature.evaluate(size))
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl fmt::Display for SizeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{}", feature)?;
        }
        Ok(())
    }
}

/// `@container [name] <condition>`
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerQuery {
    /// Target container name; `None` selects the nearest container of any name.
    pub name: Option<String>,
    pub condition: SizeCondition,
}

impl fmt::Display for ContainerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@container")?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        if !self.condition.is_empty() {
            write!(f, " {}", self.condition)?;
        }
        Ok(())
    }
}

/// `@media` restricted to color scheme and viewport size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQuery {
    pub color_scheme: Option<ColorScheme>,
    pub viewport: SizeCondition,
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@media")?;
        if let Some(scheme) = self.color_scheme {
            write!(f, " (prefers-color-scheme: {})", scheme)?;
        }
        if !self.viewport.is_empty() {
            write!(f, " {}", self.viewport)?;
        }
        Ok(())
    }
}

/// A condition a rule is nested under.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Container(ContainerQuery),
    Media(MediaQuery),
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(query) => write!(f, "{}", query),
            Self::Media(query) => write!(f, "{}", query),
        }
    }
}
