//! Color values: hex, names and color functions.
//!
//! Legacy comma syntax (`hsl(0, 84%, 60%)`) and modern space syntax
//! (`hsl(0 84% 60% / 0.5)`) are normalized to the same channel list
//! before conversion, so both produce identical colors.

use crate::types::{Color, ComponentValue, ResolvedValue, UnitKind, components_to_string};

/// Resolve a single component as a color.
///
/// Returns an [`ResolvedValue::Expression`] when a color function has
/// channels that are not plain literals (e.g. `calc()`), and `None` when
/// the component is not a color at all.
pub fn resolve_color(component: &ComponentValue) -> Option<ResolvedValue> {
    match component {
        ComponentValue::Hash(hex) => Color::from_hex(hex).map(ResolvedValue::Color),
        ComponentValue::Ident(name) => Color::from_name(name).map(ResolvedValue::Color),
        ComponentValue::FunctionCall { name, args } if is_color_function(name) => {
            let channels = channels(args)?;
            if channels.iter().any(|c| !is_literal(c)) {
                return Some(ResolvedValue::Expression(format!(
                    "{}({})",
                    name,
                    components_to_string(args)
                )));
            }
            convert(name, &channels).map(ResolvedValue::Color)
        }
        _ => None,
    }
}

/// Whether `name` is a color function.
pub fn is_color_function(name: &str) -> bool {
    matches!(name, "rgb" | "rgba" | "hsl" | "hsla" | "oklch" | "oklab")
}

fn is_literal(component: &ComponentValue) -> bool {
    match component {
        ComponentValue::Literal(_) | ComponentValue::Percentage(_) => true,
        ComponentValue::Unit(_, unit) => unit.is_angle(),
        _ => false,
    }
}

/// Split arguments into 3 or 4 channels (the 4th is alpha).
fn channels(args: &[ComponentValue]) -> Option<Vec<&ComponentValue>> {
    let channels: Vec<&ComponentValue> = if args.iter().any(|c| matches!(c, ComponentValue::Comma)) {
        let mut channels = Vec::new();
        for group in args.split(|c| matches!(c, ComponentValue::Comma)) {
            match group {
                [single] => channels.push(single),
                _ => return None,
            }
        }
        channels
    } else {
        let mut parts = args.split(|c| matches!(c, ComponentValue::Slash));
        let mut channels: Vec<&ComponentValue> = parts.next()?.iter().collect();
        match (parts.next(), parts.next()) {
            (None, _) => {}
            (Some([alpha]), None) => channels.push(alpha),
            _ => return None,
        }
        channels
    };

    matches!(channels.len(), 3 | 4).then_some(channels)
}

fn convert(name: &str, channels: &[&ComponentValue]) -> Option<Color> {
    let alpha = match channels.get(3) {
        Some(component) => unit_fraction(component)?,
        None => 1.0,
    };

    match name {
        "rgb" | "rgba" => {
            let channel = |c: &ComponentValue| match c {
                ComponentValue::Literal(n) => Some(n / 255.0),
                ComponentValue::Percentage(p) => Some(p / 100.0),
                _ => None,
            };
            Some(Color::from_rgba(
                channel(channels[0])?.clamp(0.0, 1.0),
                channel(channels[1])?.clamp(0.0, 1.0),
                channel(channels[2])?.clamp(0.0, 1.0),
                alpha.clamp(0.0, 1.0),
            ))
        }
        "hsl" | "hsla" => Some(Color::from_hsla(
            hue(channels[0])?,
            percent_or_number(channels[1], 100.0)?,
            percent_or_number(channels[2], 100.0)?,
            alpha,
        )),
        "oklch" => Some(Color::from_oklch(
            percent_or_number(channels[0], 1.0)?,
            chroma(channels[1])?,
            hue(channels[2])?,
            alpha,
        )),
        "oklab" => Some(Color::from_oklab(
            percent_or_number(channels[0], 1.0)?,
            chroma(channels[1])?,
            chroma(channels[2])?,
            alpha,
        )),
        _ => None,
    }
}

/// Hue in degrees from a number or angle.
fn hue(component: &ComponentValue) -> Option<f32> {
    match component {
        ComponentValue::Literal(n) => Some(*n),
        ComponentValue::Unit(n, UnitKind::Deg) => Some(*n),
        ComponentValue::Unit(n, UnitKind::Rad) => Some(n.to_degrees()),
        ComponentValue::Unit(n, UnitKind::Grad) => Some(n * 0.9),
        ComponentValue::Unit(n, UnitKind::Turn) => Some(n * 360.0),
        _ => None,
    }
}

/// A 0..1 fraction. Percentages map to 0..1; bare numbers are divided by `number_scale`.
fn percent_or_number(component: &ComponentValue, number_scale: f32) -> Option<f32> {
    match component {
        ComponentValue::Percentage(p) => Some(p / 100.0),
        ComponentValue::Literal(n) => Some(n / number_scale),
        _ => None,
    }
}

/// OKLab/OKLCH chroma; `100%` corresponds to 0.4.
fn chroma(component: &ComponentValue) -> Option<f32> {
    match component {
        ComponentValue::Percentage(p) => Some(p / 100.0 * 0.4),
        ComponentValue::Literal(n) => Some(*n),
        _ => None,
    }
}

fn unit_fraction(component: &ComponentValue) -> Option<f32> {
    percent_or_number(component, 1.0)
}
