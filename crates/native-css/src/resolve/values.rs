//! Declaration values to native style values.
//!
//! Property names come out in camelCase. Shorthands expand to their
//! longhands; anything that cannot be expressed natively resolves to
//! nothing (an undefined declaration is omitted, not an error).

use std::borrow::Cow;

use super::calc::{LengthContext, Numeric, is_math_function};
use super::color::resolve_color;
use super::variables::{VariableSource, substitute};
use crate::rules::DeclaredValue;
use crate::types::{Color, ComponentValue, ResolvedValue, UnitKind, components_to_string};

/// Inputs for resolving one declaration on one element.
pub struct ResolveContext<'a> {
    /// The element's font size, the basis for `em`.
    pub font_size: f32,
    /// The parent's font size, the basis for `em` in `font-size` itself.
    pub parent_font_size: f32,
    pub root_font_size: f32,
    pub variables: &'a mut dyn VariableSource,
}

/// Resolve a declaration to zero or more native properties.
///
/// An empty result means the value is undefined for this element.
pub fn resolve_declaration(
    property: &str,
    value: &DeclaredValue,
    ctx: &mut ResolveContext<'_>,
) -> Vec<(String, ResolvedValue)> {
    let components = if value.has_references() {
        match substitute(&value.components, ctx.variables) {
            Some(components) => Cow::Owned(components),
            None => {
                tracing::debug!(target: "native_css::runtime", property, value = %value.raw, "unresolvable var()");
                return Vec::new();
            }
        }
    } else {
        Cow::Borrowed(value.components.as_slice())
    };

    let lengths = LengthContext {
        font_size: if property == "font-size" {
            ctx.parent_font_size
        } else {
            ctx.font_size
        },
        root_font_size: ctx.root_font_size,
    };

    let resolved = resolve_property(property, &components, &lengths).unwrap_or_default();
    if resolved.is_empty() {
        tracing::debug!(target: "native_css::runtime", property, value = %value.raw, "undefined value omitted");
    }
    resolved
}

/// Convert a CSS property name to its native camelCase form.
pub fn native_name(property: &str) -> String {
    let mut name = String::with_capacity(property.len());
    let mut upper = false;
    for c in property.chars() {
        if c == '-' {
            upper = !name.is_empty();
        } else if upper {
            name.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

type Resolved = Option<Vec<(String, ResolvedValue)>>;

fn single(property: &str, value: ResolvedValue) -> Resolved {
    Some(vec![(native_name(property), value)])
}

fn resolve_property(property: &str, components: &[ComponentValue], lengths: &LengthContext) -> Resolved {
    match property {
        "margin" => four_sides(components, ["marginTop", "marginRight", "marginBottom", "marginLeft"], |c| {
            length(c, lengths, true)
        }),
        "padding" => four_sides(components, ["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"], |c| {
            length(c, lengths, true)
        }),
        "inset" => four_sides(components, ["top", "right", "bottom", "left"], |c| length(c, lengths, true)),
        "border-width" => four_sides(
            components,
            ["borderTopWidth", "borderRightWidth", "borderBottomWidth", "borderLeftWidth"],
            |c| length(c, lengths, false),
        ),
        "border-color" => four_sides(
            components,
            ["borderTopColor", "borderRightColor", "borderBottomColor", "borderLeftColor"],
            resolve_color,
        ),
        "border-radius" => four_sides(
            components,
            [
                "borderTopLeftRadius",
                "borderTopRightRadius",
                "borderBottomRightRadius",
                "borderBottomLeftRadius",
            ],
            |c| length(c, lengths, false),
        ),
        "border" => border(components, "border", lengths),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            border(components, &native_name(property), lengths)
        }
        "flex" => flex(components, lengths),
        "box-shadow" => shadow(components, lengths, false),
        "text-shadow" => shadow(components, lengths, true),
        "transform" => transform_list(components, lengths).map(|ops| vec![("transform".to_string(), ResolvedValue::List(ops))]),
        "translate" | "rotate" | "scale" => {
            individual_transform(property, components, lengths)
                .map(|ops| vec![("transform".to_string(), ResolvedValue::List(ops))])
        }
        "aspect-ratio" => aspect_ratio(components).and_then(|v| single(property, v)),
        "font-weight" => font_weight(components).and_then(|v| single(property, v)),
        "font-size" => font_size(components, lengths).and_then(|v| single(property, v)),
        "line-height" => line_height(components, lengths).and_then(|v| single(property, v)),
        "font-family" => font_family(components).and_then(|v| single(property, v)),
        "background" => components
            .iter()
            .find_map(resolve_color)
            .and_then(|v| single("background-color", v)),
        _ => match PropertyKind::of(property) {
            PropertyKind::Color => only(components).and_then(resolve_color).and_then(|v| single(property, v)),
            PropertyKind::Length { percent } => only(components)
                .and_then(|c| length(c, lengths, percent))
                .and_then(|v| single(property, v)),
            PropertyKind::Number => only(components).and_then(|c| number(c, lengths)).and_then(|v| single(property, v)),
            PropertyKind::Keyword => keyword(components).and_then(|v| single(property, v)),
            PropertyKind::Other => generic(components, lengths).and_then(|v| single(property, v)),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyKind {
    Color,
    Length { percent: bool },
    Number,
    Keyword,
    Other,
}

impl PropertyKind {
    fn of(property: &str) -> Self {
        match property {
            "color" | "background-color" | "border-top-color" | "border-right-color" | "border-bottom-color"
            | "border-left-color" | "text-decoration-color" | "text-shadow-color" | "shadow-color" | "tint-color"
            | "overlay-color" | "outline-color" | "caret-color" => Self::Color,

            "width" | "height" | "min-width" | "min-height" | "max-width" | "max-height" | "top" | "right"
            | "bottom" | "left" | "start" | "end" | "margin-top" | "margin-right" | "margin-bottom"
            | "margin-left" | "margin-horizontal" | "margin-vertical" | "margin-start" | "margin-end"
            | "padding-top" | "padding-right" | "padding-bottom" | "padding-left" | "padding-horizontal"
            | "padding-vertical" | "padding-start" | "padding-end" | "flex-basis" => Self::Length { percent: true },

            "letter-spacing" | "border-top-width" | "border-right-width" | "border-bottom-width"
            | "border-left-width" | "border-top-left-radius" | "border-top-right-radius"
            | "border-bottom-left-radius" | "border-bottom-right-radius" | "gap" | "row-gap" | "column-gap"
            | "outline-width" | "outline-offset" | "shadow-radius" | "text-shadow-radius" => {
                Self::Length { percent: false }
            }

            "opacity" | "flex-grow" | "flex-shrink" | "z-index" | "order" | "elevation" | "shadow-opacity" => {
                Self::Number
            }

            "display" | "position" | "flex-direction" | "flex-wrap" | "justify-content" | "align-items"
            | "align-self" | "align-content" | "overflow" | "text-align" | "text-transform"
            | "text-decoration-line" | "text-decoration-style" | "font-style" | "font-variant" | "border-style"
            | "pointer-events" | "direction" | "backface-visibility" | "object-fit" | "resize-mode"
            | "vertical-align" | "text-align-vertical" | "user-select" | "writing-direction" | "box-sizing" => {
                Self::Keyword
            }

            _ => Self::Other,
        }
    }
}

fn only(components: &[ComponentValue]) -> Option<&ComponentValue> {
    match components {
        [component] => Some(component),
        _ => None,
    }
}

/// A length in pixels, a percentage where allowed, or `auto`.
fn length(component: &ComponentValue, lengths: &LengthContext, percent: bool) -> Option<ResolvedValue> {
    match component {
        ComponentValue::Ident(ident) if ident.eq_ignore_ascii_case("auto") => Some(ResolvedValue::Keyword("auto".into())),
        ComponentValue::Ident(_) => None,
        _ => match Numeric::from_component(component, lengths)? {
            Numeric::Number(n) | Numeric::Length(n) => Some(ResolvedValue::Number(n)),
            Numeric::Percentage(p) if percent => Some(ResolvedValue::Percentage(p)),
            _ => None,
        },
    }
}

fn number(component: &ComponentValue, lengths: &LengthContext) -> Option<ResolvedValue> {
    match Numeric::from_component(component, lengths)? {
        Numeric::Number(n) => Some(ResolvedValue::Number(n)),
        Numeric::Percentage(p) => Some(ResolvedValue::Number(p / 100.0)),
        _ => None,
    }
}

fn angle(component: &ComponentValue, lengths: &LengthContext) -> Option<ResolvedValue> {
    match Numeric::from_component(component, lengths)? {
        Numeric::Angle(deg) => Some(ResolvedValue::Keyword(format!("{}deg", deg))),
        // Unitless zero is a valid angle.
        Numeric::Number(n) if n == 0.0 => Some(ResolvedValue::Keyword("0deg".into())),
        _ => None,
    }
}

fn keyword(components: &[ComponentValue]) -> Option<ResolvedValue> {
    let words = components
        .iter()
        .map(ComponentValue::as_ident)
        .collect::<Option<Vec<_>>>()?;
    (!words.is_empty()).then(|| ResolvedValue::Keyword(words.join(" ")))
}

/// Best-effort resolution for properties without a table entry.
fn generic(components: &[ComponentValue], lengths: &LengthContext) -> Option<ResolvedValue> {
    let Some(component) = only(components) else {
        return (!components.is_empty()).then(|| ResolvedValue::Expression(components_to_string(components)));
    };
    match component {
        ComponentValue::Ident(_) | ComponentValue::Hash(_) | ComponentValue::FunctionCall { .. } => {
            if let Some(color) = resolve_color(component) {
                return Some(color);
            }
        }
        _ => {}
    }
    match component {
        ComponentValue::Ident(ident) => Some(ResolvedValue::Keyword(ident.clone())),
        ComponentValue::String(s) => Some(ResolvedValue::Keyword(s.clone())),
        ComponentValue::Unit(_, unit) if unit.is_angle() => angle(component, lengths),
        ComponentValue::Unit(n, unit @ (UnitKind::S | UnitKind::Ms)) => {
            Some(ResolvedValue::Keyword(format!("{}{}", n, unit.as_str())))
        }
        ComponentValue::FunctionCall { name, .. } if !is_math_function(name) => {
            Some(ResolvedValue::Expression(component.to_string()))
        }
        _ => length(component, lengths, true),
    }
}

/// Expand 1-4 values to top/right/bottom/left (or the corner order for radii).
fn four_sides(
    components: &[ComponentValue],
    names: [&str; 4],
    mut resolve: impl FnMut(&ComponentValue) -> Option<ResolvedValue>,
) -> Resolved {
    let values = components.iter().map(&mut resolve).collect::<Option<Vec<_>>>()?;
    let [top, right, bottom, left] = match values.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some(
        names
            .iter()
            .zip([top, right, bottom, left])
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

const BORDER_STYLES: &[&str] = &["none", "hidden", "solid", "dashed", "dotted", "double", "groove", "ridge", "inset", "outset"];

/// `border: <width> || <style> || <color>`
fn border(components: &[ComponentValue], prefix: &str, lengths: &LengthContext) -> Resolved {
    let mut width = None;
    let mut style = None;
    let mut color = None;

    for component in components {
        match component {
            ComponentValue::Ident(ident) if BORDER_STYLES.contains(&ident.to_ascii_lowercase().as_str()) => {
                if style.replace(ResolvedValue::Keyword(ident.to_ascii_lowercase())).is_some() {
                    return None;
                }
            }
            _ => {
                if let Some(value) = length(component, lengths, false).filter(|v| v.as_number().is_some()) {
                    if width.replace(value).is_some() {
                        return None;
                    }
                } else if let Some(value) = resolve_color(component) {
                    if color.replace(value).is_some() {
                        return None;
                    }
                } else {
                    return None;
                }
            }
        }
    }

    let mut resolved = Vec::new();
    if let Some(width) = width {
        resolved.push((format!("{}Width", prefix), width));
    }
    if let Some(style) = style {
        resolved.push(("borderStyle".to_string(), style));
    }
    if let Some(color) = color {
        resolved.push((format!("{}Color", prefix), color));
    }
    (!resolved.is_empty()).then_some(resolved)
}

/// `flex: none | auto | <grow> [<shrink>] [<basis>]`
fn flex(components: &[ComponentValue], lengths: &LengthContext) -> Resolved {
    let out = |grow: f32, shrink: f32, basis: ResolvedValue| {
        Some(vec![
            ("flexGrow".to_string(), ResolvedValue::Number(grow)),
            ("flexShrink".to_string(), ResolvedValue::Number(shrink)),
            ("flexBasis".to_string(), basis),
        ])
    };
    let auto = || ResolvedValue::Keyword("auto".into());
    let literal = |c: &ComponentValue| match c {
        ComponentValue::Literal(n) => Some(*n),
        _ => None,
    };

    match components {
        [ComponentValue::Ident(ident)] => match ident.to_ascii_lowercase().as_str() {
            "none" => out(0.0, 0.0, auto()),
            "auto" => out(1.0, 1.0, auto()),
            "initial" => out(0.0, 1.0, auto()),
            _ => None,
        },
        [value] => match literal(value) {
            Some(grow) => out(grow, 1.0, ResolvedValue::Number(0.0)),
            None => out(1.0, 1.0, length(value, lengths, true)?),
        },
        [grow, second] => {
            let grow = literal(grow)?;
            match literal(second) {
                Some(shrink) => out(grow, shrink, ResolvedValue::Number(0.0)),
                None => out(grow, 1.0, length(second, lengths, true)?),
            }
        }
        [grow, shrink, basis] => out(literal(grow)?, literal(shrink)?, length(basis, lengths, true)?),
        _ => None,
    }
}

/// First shadow of `box-shadow` / `text-shadow`: `<x> <y> [<blur>] [<spread>] [<color>]`.
fn shadow(components: &[ComponentValue], lengths: &LengthContext, text: bool) -> Resolved {
    let prefix = if text { "textShadow" } else { "shadow" };
    let first = components.split(|c| matches!(c, ComponentValue::Comma)).next()?;

    if let [ComponentValue::Ident(ident)] = first {
        if ident.eq_ignore_ascii_case("none") {
            let mut resolved = vec![
                (format!("{}Offset", prefix), offset(0.0, 0.0)),
                (format!("{}Radius", prefix), ResolvedValue::Number(0.0)),
                (format!("{}Color", prefix), ResolvedValue::Color(Color::TRANSPARENT)),
            ];
            if !text {
                resolved.push(("shadowOpacity".to_string(), ResolvedValue::Number(0.0)));
            }
            return Some(resolved);
        }
    }

    let mut numbers = Vec::new();
    let mut color = None;
    for component in first {
        if let Some(n) = length(component, lengths, false).and_then(|v| v.as_number()) {
            // A color may not split the offset pair.
            if color.is_some() && numbers.len() == 1 {
                return None;
            }
            numbers.push(n);
        } else if let Some(value) = resolve_color(component) {
            if color.replace(value).is_some() {
                return None;
            }
        } else {
            // `inset` and anything else has no native equivalent.
            return None;
        }
    }

    let (x, y, blur) = match numbers.as_slice() {
        [x, y] => (*x, *y, 0.0),
        [x, y, blur] => (*x, *y, *blur),
        [x, y, blur, _spread] if !text => (*x, *y, *blur),
        _ => return None,
    };

    let mut resolved = vec![
        (format!("{}Offset", prefix), offset(x, y)),
        (format!("{}Radius", prefix), ResolvedValue::Number(blur)),
        (
            format!("{}Color", prefix),
            color.unwrap_or(ResolvedValue::Color(Color::BLACK)),
        ),
    ];
    if !text {
        resolved.push(("shadowOpacity".to_string(), ResolvedValue::Number(1.0)));
    }
    Some(resolved)
}

fn offset(width: f32, height: f32) -> ResolvedValue {
    ResolvedValue::Object(vec![
        ("width".to_string(), ResolvedValue::Number(width)),
        ("height".to_string(), ResolvedValue::Number(height)),
    ])
}

fn operation(name: &str, value: ResolvedValue) -> ResolvedValue {
    ResolvedValue::Object(vec![(name.to_string(), value)])
}

/// `transform: none | <function>+`
fn transform_list(components: &[ComponentValue], lengths: &LengthContext) -> Option<Vec<ResolvedValue>> {
    if let [ComponentValue::Ident(ident)] = components {
        return ident.eq_ignore_ascii_case("none").then(Vec::new);
    }

    let mut operations = Vec::new();
    for component in components {
        let ComponentValue::FunctionCall { name, args } = component else {
            return None;
        };
        let args: Vec<ComponentValue> = args
            .iter()
            .filter(|c| !matches!(c, ComponentValue::Comma))
            .cloned()
            .collect();
        let translate = |c: &ComponentValue| length(c, lengths, true).filter(|v| !matches!(v, ResolvedValue::Keyword(_)));
        let scale = |c: &ComponentValue| number(c, lengths);
        let rotate = |c: &ComponentValue| angle(c, lengths);

        match (name.as_str(), args.as_slice()) {
            ("translate", [x]) => operations.push(operation("translateX", translate(x)?)),
            ("translate", [x, y]) => {
                operations.push(operation("translateX", translate(x)?));
                operations.push(operation("translateY", translate(y)?));
            }
            ("translatex", [x]) => operations.push(operation("translateX", translate(x)?)),
            ("translatey", [y]) => operations.push(operation("translateY", translate(y)?)),
            ("scale", [s]) => operations.push(operation("scale", scale(s)?)),
            ("scale", [x, y]) => {
                operations.push(operation("scaleX", scale(x)?));
                operations.push(operation("scaleY", scale(y)?));
            }
            ("scalex", [x]) => operations.push(operation("scaleX", scale(x)?)),
            ("scaley", [y]) => operations.push(operation("scaleY", scale(y)?)),
            ("rotate" | "rotatez", [a]) => operations.push(operation(
                if name == "rotate" { "rotate" } else { "rotateZ" },
                rotate(a)?,
            )),
            ("rotatex", [a]) => operations.push(operation("rotateX", rotate(a)?)),
            ("rotatey", [a]) => operations.push(operation("rotateY", rotate(a)?)),
            ("skew", [x]) => operations.push(operation("skewX", rotate(x)?)),
            ("skew", [x, y]) => {
                operations.push(operation("skewX", rotate(x)?));
                operations.push(operation("skewY", rotate(y)?));
            }
            ("skewx", [x]) => operations.push(operation("skewX", rotate(x)?)),
            ("skewy", [y]) => operations.push(operation("skewY", rotate(y)?)),
            ("perspective", [d]) => operations.push(operation("perspective", length(d, lengths, false)?)),
            _ => {
                tracing::debug!(target: "native_css::runtime", function = %name, "unsupported transform function");
                return None;
            }
        }
    }
    Some(operations)
}

/// Individual `translate`, `rotate` and `scale` properties.
fn individual_transform(property: &str, components: &[ComponentValue], lengths: &LengthContext) -> Option<Vec<ResolvedValue>> {
    if let [ComponentValue::Ident(ident)] = components {
        return ident.eq_ignore_ascii_case("none").then(Vec::new);
    }
    let function = ComponentValue::FunctionCall {
        name: property.to_string(),
        args: components.to_vec(),
    };
    transform_list(std::slice::from_ref(&function), lengths)
}

/// `aspect-ratio: <number> [/ <number>] | auto`
fn aspect_ratio(components: &[ComponentValue]) -> Option<ResolvedValue> {
    match components {
        [ComponentValue::Literal(ratio)] => Some(ResolvedValue::Number(*ratio)),
        [ComponentValue::Literal(width), ComponentValue::Slash, ComponentValue::Literal(height)] if *height != 0.0 => {
            Some(ResolvedValue::Number(width / height))
        }
        [ComponentValue::Ident(ident)] if ident.eq_ignore_ascii_case("auto") => Some(ResolvedValue::Keyword("auto".into())),
        _ => None,
    }
}

/// Font weights are strings natively (`"700"`, `"bold"`).
fn font_weight(components: &[ComponentValue]) -> Option<ResolvedValue> {
    match only(components)? {
        ComponentValue::Literal(weight) if (1.0..=1000.0).contains(weight) => {
            Some(ResolvedValue::Keyword(format!("{}", weight)))
        }
        ComponentValue::Ident(ident) => Some(ResolvedValue::Keyword(ident.to_ascii_lowercase())),
        _ => None,
    }
}

/// `font-size`: lengths against the parent font size; percentages of it.
fn font_size(components: &[ComponentValue], lengths: &LengthContext) -> Option<ResolvedValue> {
    match Numeric::from_component(only(components)?, lengths)? {
        Numeric::Number(n) | Numeric::Length(n) => Some(ResolvedValue::Number(n)),
        Numeric::Percentage(p) => Some(ResolvedValue::Number(lengths.font_size * p / 100.0)),
        _ => None,
    }
}

/// Unitless line heights multiply the font size.
fn line_height(components: &[ComponentValue], lengths: &LengthContext) -> Option<ResolvedValue> {
    let component = only(components)?;
    if let ComponentValue::Ident(ident) = component {
        return ident.eq_ignore_ascii_case("normal").then(|| ResolvedValue::Keyword("normal".into()));
    }
    match Numeric::from_component(component, lengths)? {
        Numeric::Number(n) => Some(ResolvedValue::Number(n * lengths.font_size)),
        Numeric::Length(n) => Some(ResolvedValue::Number(n)),
        Numeric::Percentage(p) => Some(ResolvedValue::Number(lengths.font_size * p / 100.0)),
        _ => None,
    }
}

/// The first family of a family list.
fn font_family(components: &[ComponentValue]) -> Option<ResolvedValue> {
    let first = components.split(|c| matches!(c, ComponentValue::Comma)).next()?;
    match first {
        [ComponentValue::String(family)] => Some(ResolvedValue::Keyword(family.clone())),
        words => keyword(words),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_component_values;
    use std::collections::BTreeMap;

    fn resolve_with(property: &str, value: &str, font_size: f32, vars: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut variables: BTreeMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let declared = DeclaredValue::new(value, parse_component_values(value).unwrap());
        let mut ctx = ResolveContext {
            font_size,
            parent_font_size: font_size,
            root_font_size: 16.0,
            variables: &mut variables,
        };
        resolve_declaration(property, &declared, &mut ctx)
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect()
    }

    fn resolve(property: &str, value: &str) -> Vec<(String, String)> {
        resolve_with(property, value, 16.0, &[])
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn native_names() {
        assert_eq!(native_name("background-color"), "backgroundColor");
        assert_eq!(native_name("border-top-left-radius"), "borderTopLeftRadius");
        assert_eq!(native_name("opacity"), "opacity");
    }

    #[test]
    fn lengths_and_units() {
        assert_eq!(resolve("width", "calc(100px + 10px)"), pairs(&[("width", "110")]));
        assert_eq!(resolve_with("width", "calc(2em * 2)", 5.0, &[]), pairs(&[("width", "20")]));
        assert_eq!(resolve("width", "2rem"), pairs(&[("width", "32")]));
        assert_eq!(resolve("width", "50%"), pairs(&[("width", "50%")]));
        assert_eq!(resolve("width", "auto"), pairs(&[("width", "auto")]));
        assert!(resolve("width", "calc(100% - 30px)").is_empty());
        assert!(resolve("gap", "10%").is_empty());
        assert!(resolve("width", "red").is_empty());
    }

    #[test]
    fn font_size_uses_parent() {
        let declared = DeclaredValue::new("2em", parse_component_values("2em").unwrap());
        let mut variables = BTreeMap::new();
        let mut ctx = ResolveContext {
            font_size: 30.0,
            parent_font_size: 10.0,
            root_font_size: 16.0,
            variables: &mut variables,
        };
        let resolved = resolve_declaration("font-size", &declared, &mut ctx);
        assert_eq!(resolved, vec![("fontSize".to_string(), ResolvedValue::Number(20.0))]);
    }

    #[test]
    fn colors() {
        assert_eq!(resolve("color", "hsl(0 100% 50%)"), pairs(&[("color", "rgb(255, 0, 0)")]));
        assert_eq!(
            resolve("background", "#00ff00 repeat"),
            pairs(&[("backgroundColor", "rgb(0, 255, 0)")])
        );
        assert!(resolve("color", "10px").is_empty());
    }

    #[test]
    fn box_shorthands() {
        assert_eq!(
            resolve("margin", "4px 8px"),
            pairs(&[("marginTop", "4"), ("marginRight", "8"), ("marginBottom", "4"), ("marginLeft", "8")])
        );
        assert_eq!(
            resolve("padding", "1px 2px 3px"),
            pairs(&[("paddingTop", "1"), ("paddingRight", "2"), ("paddingBottom", "3"), ("paddingLeft", "2")])
        );
        assert_eq!(resolve("border-radius", "4px").len(), 4);
        assert!(resolve("margin", "1px 2px 3px 4px 5px").is_empty());
        assert_eq!(
            resolve("border", "1px solid red"),
            pairs(&[("borderWidth", "1"), ("borderStyle", "solid"), ("borderColor", "rgb(255, 0, 0)")])
        );
    }

    #[test]
    fn flex_shorthand() {
        assert_eq!(
            resolve("flex", "1"),
            pairs(&[("flexGrow", "1"), ("flexShrink", "1"), ("flexBasis", "0")])
        );
        assert_eq!(
            resolve("flex", "none"),
            pairs(&[("flexGrow", "0"), ("flexShrink", "0"), ("flexBasis", "auto")])
        );
        assert_eq!(
            resolve("flex", "2 3 10px"),
            pairs(&[("flexGrow", "2"), ("flexShrink", "3"), ("flexBasis", "10")])
        );
    }

    #[test]
    fn shadows() {
        assert_eq!(
            resolve("box-shadow", "0 2px 4px rgba(0, 0, 0, 0.5)"),
            pairs(&[
                ("shadowOffset", "{width: 0, height: 2}"),
                ("shadowRadius", "4"),
                ("shadowColor", "rgba(0, 0, 0, 0.5)"),
                ("shadowOpacity", "1"),
            ])
        );
        assert_eq!(
            resolve("text-shadow", "1px 1px"),
            pairs(&[
                ("textShadowOffset", "{width: 1, height: 1}"),
                ("textShadowRadius", "0"),
                ("textShadowColor", "rgb(0, 0, 0)"),
            ])
        );
        assert!(resolve("box-shadow", "inset 0 1px red").is_empty());
    }

    #[test]
    fn transforms() {
        assert_eq!(
            resolve("transform", "translate(10px, 50%) rotate(45deg) scale(2)"),
            pairs(&[("transform", "[{translateX: 10}, {translateY: 50%}, {rotate: 45deg}, {scale: 2}]")])
        );
        assert_eq!(
            resolve("transform", "rotate(0.5turn)"),
            pairs(&[("transform", "[{rotate: 180deg}]")])
        );
        assert_eq!(resolve("transform", "none"), pairs(&[("transform", "[]")]));
        assert_eq!(resolve("rotate", "90deg"), pairs(&[("transform", "[{rotate: 90deg}]")]));
        assert_eq!(
            resolve("translate", "4px 8px"),
            pairs(&[("transform", "[{translateX: 4}, {translateY: 8}]")])
        );
        assert!(resolve("transform", "matrix(1, 0, 0, 1, 0, 0)").is_empty());
    }

    #[test]
    fn typography() {
        assert_eq!(resolve("font-weight", "700"), pairs(&[("fontWeight", "700")]));
        assert_eq!(resolve("font-weight", "Bold"), pairs(&[("fontWeight", "bold")]));
        assert_eq!(resolve_with("line-height", "1.5", 10.0, &[]), pairs(&[("lineHeight", "15")]));
        assert_eq!(
            resolve("font-family", "\"Inter Var\", sans-serif"),
            pairs(&[("fontFamily", "Inter Var")])
        );
        assert_eq!(resolve("aspect-ratio", "16 / 8"), pairs(&[("aspectRatio", "2")]));
    }

    #[test]
    fn keywords_and_numbers() {
        assert_eq!(resolve("display", "none"), pairs(&[("display", "none")]));
        assert_eq!(resolve("opacity", "0.5"), pairs(&[("opacity", "0.5")]));
        assert_eq!(resolve("opacity", "50%"), pairs(&[("opacity", "0.5")]));
        assert!(resolve("display", "10px").is_empty());
    }

    #[test]
    fn variables_are_substituted() {
        assert_eq!(
            resolve_with("padding", "var(--space) calc(var(--space) * 2)", 16.0, &[("--space", "4px")]),
            pairs(&[("paddingTop", "4"), ("paddingRight", "8"), ("paddingBottom", "4"), ("paddingLeft", "8")])
        );
        assert_eq!(
            resolve_with("color", "hsl(var(--hue) 100% 50%)", 16.0, &[("--hue", "0")]),
            pairs(&[("color", "rgb(255, 0, 0)")])
        );
        assert!(resolve("color", "var(--missing)").is_empty());
        assert_eq!(resolve("color", "var(--missing, blue)"), pairs(&[("color", "rgb(0, 0, 255)")]));
    }

    #[test]
    fn unknown_properties_pass_through() {
        assert_eq!(resolve("tint-color", "red"), pairs(&[("tintColor", "rgb(255, 0, 0)")]));
        assert_eq!(resolve("transition-duration", "200ms"), pairs(&[("transitionDuration", "200ms")]));
        assert_eq!(resolve("custom-thing", "a b"), pairs(&[("customThing", "a b")]));
    }
}
