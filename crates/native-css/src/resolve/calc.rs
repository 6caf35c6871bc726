//! `calc()`, `min()`, `max()` and `clamp()` evaluation.

use crate::types::{ComponentValue, UnitKind};

/// What relative lengths resolve against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Basis for `em`.
    pub font_size: f32,
    /// Basis for `rem`.
    pub root_font_size: f32,
}

impl LengthContext {
    /// Convert a length to pixels. `None` for non-length units.
    pub fn to_px(&self, value: f32, unit: UnitKind) -> Option<f32> {
        match unit {
            UnitKind::Px => Some(value),
            UnitKind::Em => Some(value * self.font_size),
            UnitKind::Rem => Some(value * self.root_font_size),
            _ => None,
        }
    }
}

/// A typed numeric result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Number(f32),
    /// Pixels.
    Length(f32),
    /// Degrees.
    Angle(f32),
    /// As written (`50%` is `50.0`).
    Percentage(f32),
    /// A length combined with a percentage; only layout could resolve it.
    Mixed,
}

impl Numeric {
    /// Read a single component value.
    pub fn from_component(component: &ComponentValue, lengths: &LengthContext) -> Option<Self> {
        match component {
            ComponentValue::Literal(n) => Some(Self::Number(*n)),
            ComponentValue::Percentage(p) => Some(Self::Percentage(*p)),
            ComponentValue::Unit(n, unit) if unit.is_length() => lengths.to_px(*n, *unit).map(Self::Length),
            ComponentValue::Unit(n, unit) if unit.is_angle() => Some(Self::Angle(to_degrees(*n, *unit))),
            ComponentValue::Block(inner) => evaluate_sum(inner, lengths),
            ComponentValue::FunctionCall { name, args } => evaluate_function(name, args, lengths),
            _ => None,
        }
    }

    fn add(self, other: Self) -> Option<Self> {
        use Numeric::*;
        match (self, other) {
            (Number(a), Number(b)) => Some(Number(a + b)),
            (Length(a), Length(b)) => Some(Length(a + b)),
            (Angle(a), Angle(b)) => Some(Angle(a + b)),
            (Percentage(a), Percentage(b)) => Some(Percentage(a + b)),
            (Length(_) | Percentage(_) | Mixed, Length(_) | Percentage(_) | Mixed) => Some(Mixed),
            _ => None,
        }
    }

    fn scale(self, factor: f32) -> Self {
        match self {
            Self::Number(n) => Self::Number(n * factor),
            Self::Length(n) => Self::Length(n * factor),
            Self::Angle(n) => Self::Angle(n * factor),
            Self::Percentage(n) => Self::Percentage(n * factor),
            Self::Mixed => Self::Mixed,
        }
    }

    fn multiply(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Number(factor), value) | (value, Self::Number(factor)) => Some(value.scale(factor)),
            _ => None,
        }
    }

    fn divide(self, other: Self) -> Option<Self> {
        match other {
            Self::Number(divisor) if divisor != 0.0 => Some(self.scale(1.0 / divisor)),
            _ => None,
        }
    }

    /// Compare two values of the same kind.
    fn comparable(self, other: Self) -> Option<(f32, f32)> {
        use Numeric::*;
        match (self, other) {
            (Number(a), Number(b))
            | (Length(a), Length(b))
            | (Angle(a), Angle(b))
            | (Percentage(a), Percentage(b)) => Some((a, b)),
            _ => None,
        }
    }
}

fn to_degrees(value: f32, unit: UnitKind) -> f32 {
    match unit {
        UnitKind::Rad => value.to_degrees(),
        UnitKind::Grad => value * 0.9,
        UnitKind::Turn => value * 360.0,
        _ => value,
    }
}

/// Whether `name` is a math function this module evaluates.
pub fn is_math_function(name: &str) -> bool {
    matches!(name, "calc" | "min" | "max" | "clamp")
}

/// Evaluate a math function call.
pub fn evaluate_function(name: &str, args: &[ComponentValue], lengths: &LengthContext) -> Option<Numeric> {
    match name {
        "calc" => evaluate_sum(args, lengths),
        "min" | "max" => {
            let values = split_arguments(args)
                .map(|arg| evaluate_sum(arg, lengths))
                .collect::<Option<Vec<_>>>()?;
            let pick_max = name == "max";
            values.into_iter().try_fold(None::<Numeric>, |best, value| {
                let Some(best) = best else {
                    return Some(Some(value));
                };
                match best.comparable(value) {
                    Some((a, b)) => Some(Some(if (b > a) == pick_max { value } else { best })),
                    None => best.add(value).map(|_| Some(Numeric::Mixed)),
                }
            })?
        }
        "clamp" => {
            let values = split_arguments(args)
                .map(|arg| evaluate_sum(arg, lengths))
                .collect::<Option<Vec<_>>>()?;
            let [low, preferred, high] = values.as_slice() else {
                return None;
            };
            let upper = evaluate_pair(*preferred, *high, f32::min)?;
            evaluate_pair(*low, upper, f32::max)
        }
        _ => None,
    }
}

fn evaluate_pair(a: Numeric, b: Numeric, pick: fn(f32, f32) -> f32) -> Option<Numeric> {
    match a.comparable(b) {
        Some((x, y)) => Some(match a {
            Numeric::Number(_) => Numeric::Number(pick(x, y)),
            Numeric::Length(_) => Numeric::Length(pick(x, y)),
            Numeric::Angle(_) => Numeric::Angle(pick(x, y)),
            _ => Numeric::Percentage(pick(x, y)),
        }),
        None => a.add(b).map(|_| Numeric::Mixed),
    }
}

fn split_arguments(args: &[ComponentValue]) -> impl Iterator<Item = &[ComponentValue]> {
    args.split(|c| matches!(c, ComponentValue::Comma))
}

/// `sum := product (('+' | '-') product)*`
fn evaluate_sum(components: &[ComponentValue], lengths: &LengthContext) -> Option<Numeric> {
    let mut terms = components.split_inclusive(|c| matches!(c, ComponentValue::Operator('+' | '-')));
    let first = terms.next()?;
    let (mut total, mut pending) = evaluate_term(first, lengths)?;

    for term in terms {
        let (value, next) = evaluate_term(term, lengths)?;
        total = match pending? {
            '+' => total.add(value)?,
            _ => total.add(value.scale(-1.0))?,
        };
        pending = next;
    }

    // A trailing operator is malformed.
    match pending {
        None => Some(total),
        Some(_) => None,
    }
}

/// Evaluate a product, returning it with the additive operator that ended it.
fn evaluate_term(term: &[ComponentValue], lengths: &LengthContext) -> Option<(Numeric, Option<char>)> {
    let (operator, product) = match term.split_last() {
        Some((ComponentValue::Operator(op @ ('+' | '-')), rest)) => (Some(*op), rest),
        _ => (None, term),
    };
    Some((evaluate_product(product, lengths)?, operator))
}

/// `product := value (('*' | '/') value)*`
fn evaluate_product(components: &[ComponentValue], lengths: &LengthContext) -> Option<Numeric> {
    let mut iter = components.iter();
    let mut value = Numeric::from_component(iter.next()?, lengths)?;

    while let Some(op) = iter.next() {
        let operand = Numeric::from_component(iter.next()?, lengths)?;
        value = match op {
            ComponentValue::Operator('*') => value.multiply(operand)?,
            ComponentValue::Slash => value.divide(operand)?,
            _ => return None,
        };
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_component_values;

    const LENGTHS: LengthContext = LengthContext {
        font_size: 5.0,
        root_font_size: 16.0,
    };

    fn eval(text: &str) -> Option<Numeric> {
        let components = parse_component_values(text).unwrap();
        Numeric::from_component(&components[0], &LENGTHS)
    }

    #[test]
    fn calc_arithmetic() {
        assert_eq!(eval("calc(100px + 10px)"), Some(Numeric::Length(110.0)));
        assert_eq!(eval("calc(2em * 2)"), Some(Numeric::Length(20.0)));
        assert_eq!(eval("calc(1rem / 4)"), Some(Numeric::Length(4.0)));
        assert_eq!(eval("calc(10px - 2px * 3)"), Some(Numeric::Length(4.0)));
        assert_eq!(eval("calc((10px - 2px) * 3)"), Some(Numeric::Length(24.0)));
        assert_eq!(eval("calc(1 + 2 * 3)"), Some(Numeric::Number(7.0)));
        assert_eq!(eval("calc(50% + 10%)"), Some(Numeric::Percentage(60.0)));
        assert_eq!(eval("calc(0.5turn + 10deg)"), Some(Numeric::Angle(190.0)));
    }

    #[test]
    fn calc_type_errors() {
        assert_eq!(eval("calc(100% - 30px)"), Some(Numeric::Mixed));
        assert_eq!(eval("calc(10px * 2px)"), None);
        assert_eq!(eval("calc(10px / 0)"), None);
        assert_eq!(eval("calc(10px / 2px)"), None);
        assert_eq!(eval("calc(1 + 2px)"), None);
        assert_eq!(eval("calc(1px +)"), None);
        assert_eq!(eval("calc()"), None);
    }

    #[test]
    fn min_max_clamp() {
        assert_eq!(eval("min(10px, 2rem, 1em)"), Some(Numeric::Length(5.0)));
        assert_eq!(eval("max(10px, 2rem)"), Some(Numeric::Length(32.0)));
        assert_eq!(eval("clamp(10px, 2px, 20px)"), Some(Numeric::Length(10.0)));
        assert_eq!(eval("clamp(10px, 50px, 20px)"), Some(Numeric::Length(20.0)));
        assert_eq!(eval("clamp(10px, calc(5px * 3), 20px)"), Some(Numeric::Length(15.0)));
        assert_eq!(eval("min(10px, 50%)"), Some(Numeric::Mixed));
        assert_eq!(eval("min(10px, 2)"), None);
        assert_eq!(eval("clamp(1px, 2px)"), None);
    }
}
