//! Declared and resolved value types.

use std::fmt;

use super::Color;

/// Units accepted on numeric literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Px,
    Em,
    Rem,
    Deg,
    Rad,
    Grad,
    Turn,
    S,
    Ms,
}

impl UnitKind {
    /// Look up a unit by its (case-insensitive) CSS name.
    pub fn from_css(unit: &str) -> Option<Self> {
        Some(match unit.to_ascii_lowercase().as_str() {
            "px" => Self::Px,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "deg" => Self::Deg,
            "rad" => Self::Rad,
            "grad" => Self::Grad,
            "turn" => Self::Turn,
            "s" => Self::S,
            "ms" => Self::Ms,
            _ => return None,
        })
    }

    /// The CSS spelling of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Deg => "deg",
            Self::Rad => "rad",
            Self::Grad => "grad",
            Self::Turn => "turn",
            Self::S => "s",
            Self::Ms => "ms",
        }
    }

    /// Whether this unit measures length.
    pub fn is_length(&self) -> bool {
        matches!(self, Self::Px | Self::Em | Self::Rem)
    }

    /// Whether this unit measures an angle.
    pub fn is_angle(&self) -> bool {
        matches!(self, Self::Deg | Self::Rad | Self::Grad | Self::Turn)
    }
}

/// A pre-parsed piece of a declaration value.
///
/// Whitespace is not represented: adjacent components were separated by
/// whitespace in the source unless a `Comma`, `Slash` or `Operator` sits
/// between them.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A bare number.
    Literal(f32),
    /// A number with a unit.
    Unit(f32, UnitKind),
    /// A percentage, stored as written (`50%` is `50.0`).
    Percentage(f32),
    Ident(String),
    String(String),
    /// A hash token without the leading `#`.
    Hash(String),
    FunctionCall {
        name: String,
        args: Vec<ComponentValue>,
    },
    /// A `var(--name[, fallback])` reference.
    Reference {
        name: String,
        fallback: Option<Vec<ComponentValue>>,
    },
    Comma,
    Slash,
    /// `+`, `-` or `*` standing on its own.
    Operator(char),
    /// A parenthesized group.
    Block(Vec<ComponentValue>),
}

impl ComponentValue {
    /// The identifier text, if this is an identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this value or anything nested in it is a `var()` reference.
    pub fn has_reference(&self) -> bool {
        match self {
            Self::Reference { .. } => true,
            Self::FunctionCall { args, .. } | Self::Block(args) => {
                args.iter().any(Self::has_reference)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => write!(f, "{n}"),
            Self::Unit(n, unit) => write!(f, "{n}{}", unit.as_str()),
            Self::Percentage(n) => write!(f, "{n}%"),
            Self::Ident(name) => f.write_str(name),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Hash(h) => write!(f, "#{h}"),
            Self::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                write_components(f, args)?;
                f.write_str(")")
            }
            Self::Reference { name, fallback } => {
                write!(f, "var({name}")?;
                if let Some(fallback) = fallback {
                    f.write_str(", ")?;
                    write_components(f, fallback)?;
                }
                f.write_str(")")
            }
            Self::Comma => f.write_str(","),
            Self::Slash => f.write_str("/"),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Block(inner) => {
                f.write_str("(")?;
                write_components(f, inner)?;
                f.write_str(")")
            }
        }
    }
}

/// Serialize a component list with single spaces, commas hugging the left.
pub fn write_components(f: &mut impl fmt::Write, components: &[ComponentValue]) -> fmt::Result {
    for (i, component) in components.iter().enumerate() {
        if i > 0 && !matches!(component, ComponentValue::Comma) {
            f.write_str(" ")?;
        }
        write!(f, "{component}")?;
    }
    Ok(())
}

/// Serialize a component list to a string.
pub fn components_to_string(components: &[ComponentValue]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_components(&mut out, components);
    out
}

/// A value in the host's native style encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Number(f32),
    /// A percentage as written (`50%` is `50.0`), kept for hosts that accept them.
    Percentage(f32),
    Color(Color),
    Keyword(String),
    /// A composed expression left for the host to evaluate at render time.
    Expression(String),
    List(Vec<ResolvedValue>),
    Object(Vec<(String, ResolvedValue)>),
}

impl ResolvedValue {
    /// The number, if this is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The color, if this is a color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Percentage(n) => write!(f, "{n}%"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Keyword(k) | Self::Expression(k) => f.write_str(k),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_serialization() {
        let value = vec![
            ComponentValue::FunctionCall {
                name: "calc".into(),
                args: vec![
                    ComponentValue::Percentage(100.0),
                    ComponentValue::Operator('-'),
                    ComponentValue::Unit(30.0, UnitKind::Px),
                ],
            },
            ComponentValue::Comma,
            ComponentValue::Reference {
                name: "--gap".into(),
                fallback: Some(vec![ComponentValue::Unit(4.0, UnitKind::Rem)]),
            },
        ];
        assert_eq!(components_to_string(&value), "calc(100% - 30px), var(--gap, 4rem)");
    }

    #[test]
    fn reference_detection() {
        let nested = ComponentValue::FunctionCall {
            name: "hsl".into(),
            args: vec![ComponentValue::Reference { name: "--h".into(), fallback: None }],
        };
        assert!(nested.has_reference());
        assert!(!ComponentValue::Literal(1.0).has_reference());
    }

    #[test]
    fn resolved_display() {
        let transform = ResolvedValue::List(vec![ResolvedValue::Object(vec![(
            "rotate".into(),
            ResolvedValue::Keyword("45deg".into()),
        )])]);
        assert_eq!(transform.to_string(), "[{rotate: 45deg}]");
        assert_eq!(ResolvedValue::Percentage(50.0).to_string(), "50%");
    }

    #[test]
    fn unit_lookup() {
        assert_eq!(UnitKind::from_css("PX"), Some(UnitKind::Px));
        assert_eq!(UnitKind::from_css("vw"), None);
        assert!(UnitKind::Rem.is_length());
        assert!(UnitKind::Turn.is_angle());
    }
}
