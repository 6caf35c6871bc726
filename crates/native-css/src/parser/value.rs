//! Declaration value parsing into component values.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use super::error::SyntaxError;
use crate::types::{ComponentValue, UnitKind};

type ValueResult<'i, T> = Result<T, CssParseError<'i, SyntaxError>>;

/// Parse a declaration value into component values.
///
/// `var()` calls become [`ComponentValue::Reference`]s; every other function
/// keeps its (lowercased) name and parsed arguments.
pub(crate) fn parse_component_values(text: &str) -> Result<Vec<ComponentValue>, SyntaxError> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_components(&mut parser).map_err(SyntaxError::from_parse_error)
}

fn parse_components<'i>(parser: &mut Parser<'i, '_>) -> ValueResult<'i, Vec<ComponentValue>> {
    let mut components = vec![];

    loop {
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        let component = match &token {
            Token::Number { value, .. } => ComponentValue::Literal(*value),
            Token::Percentage {
                unit_value,
                int_value,
                ..
            } => ComponentValue::Percentage(percentage(*unit_value, *int_value)),
            Token::Dimension { value, unit, .. } => match UnitKind::from_css(unit) {
                Some(unit) => ComponentValue::Unit(*value, unit),
                None => {
                    return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                        "unsupported unit '{}'",
                        unit
                    ))));
                }
            },
            Token::Ident(name) => ComponentValue::Ident(name.to_string()),
            Token::QuotedString(s) => ComponentValue::String(s.to_string()),
            Token::Hash(h) | Token::IDHash(h) => ComponentValue::Hash(h.to_string()),
            Token::Comma => ComponentValue::Comma,
            Token::Delim('/') => ComponentValue::Slash,
            Token::Delim(c @ ('+' | '-' | '*')) => ComponentValue::Operator(*c),
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                if name == "var" {
                    parser.parse_nested_block(|p| parse_reference(p))?
                } else {
                    let args = parser.parse_nested_block(|p| parse_components(p))?;
                    ComponentValue::FunctionCall { name, args }
                }
            }
            Token::ParenthesisBlock => {
                ComponentValue::Block(parser.parse_nested_block(|p| parse_components(p))?)
            }
            other => {
                return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                    "unexpected {:?} in value",
                    other
                ))));
            }
        };

        components.push(component);
    }

    Ok(components)
}

/// Percentage as written. The tokenizer stores `unit_value / 100`, which
/// does not round-trip exactly for fractional values.
fn percentage(unit_value: f32, int_value: Option<i32>) -> f32 {
    match int_value {
        Some(int) => int as f32,
        None => (unit_value * 1_000_000.0).round() / 10_000.0,
    }
}

/// Parse the inside of `var(--name[, fallback])`.
fn parse_reference<'i>(parser: &mut Parser<'i, '_>) -> ValueResult<'i, ComponentValue> {
    let name = parser.expect_ident()?.to_string();
    if !name.starts_with("--") {
        return Err(parser.new_custom_error(SyntaxError::invalid(format!(
            "var() expects a custom property name, found '{}'",
            name
        ))));
    }

    let fallback = if parser.is_exhausted() {
        None
    } else {
        parser.expect_comma()?;
        Some(parse_components(parser)?)
    };

    Ok(ComponentValue::Reference { name, fallback })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ComponentValue> {
        parse_component_values(text).unwrap()
    }

    #[test]
    fn parse_numbers_and_units() {
        assert_eq!(
            parse("10px 1.5em 50% 2 -3rem"),
            vec![
                ComponentValue::Unit(10.0, UnitKind::Px),
                ComponentValue::Unit(1.5, UnitKind::Em),
                ComponentValue::Percentage(50.0),
                ComponentValue::Literal(2.0),
                ComponentValue::Unit(-3.0, UnitKind::Rem),
            ]
        );
    }

    #[test]
    fn parse_calc_operators() {
        assert_eq!(
            parse("calc(100% - 30px)"),
            vec![ComponentValue::FunctionCall {
                name: "calc".into(),
                args: vec![
                    ComponentValue::Percentage(100.0),
                    ComponentValue::Operator('-'),
                    ComponentValue::Unit(30.0, UnitKind::Px),
                ],
            }]
        );
    }

    #[test]
    fn parse_color_syntaxes() {
        assert_eq!(
            parse("hsl(0 84.2% 60.2% / 60%)")[0],
            ComponentValue::FunctionCall {
                name: "hsl".into(),
                args: vec![
                    ComponentValue::Literal(0.0),
                    ComponentValue::Percentage(84.2),
                    ComponentValue::Percentage(60.2),
                    ComponentValue::Slash,
                    ComponentValue::Percentage(60.0),
                ],
            }
        );
        assert_eq!(parse("#ff0000"), vec![ComponentValue::Hash("ff0000".into())]);
        assert_eq!(parse("#0af"), vec![ComponentValue::Hash("0af".into())]);
    }

    #[test]
    fn parse_var_reference() {
        assert_eq!(
            parse("var(--gap, 4px)"),
            vec![ComponentValue::Reference {
                name: "--gap".into(),
                fallback: Some(vec![ComponentValue::Unit(4.0, UnitKind::Px)]),
            }]
        );
        assert_eq!(
            parse("VAR(--gap)"),
            vec![ComponentValue::Reference { name: "--gap".into(), fallback: None }]
        );
    }

    #[test]
    fn parse_rejects_bad_values() {
        let err = parse_component_values("10vw").unwrap_err();
        assert!(err.unsupported);
        assert!(parse_component_values("var(gap)").is_err());
        assert!(parse_component_values("a { b }").is_err());
    }
}
