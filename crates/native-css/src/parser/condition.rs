//! `@container` and `@media` prelude parsing.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use super::error::SyntaxError;
use crate::rules::{
    ColorScheme, Comparator, ContainerQuery, MediaQuery, SizeAxis, SizeCondition, SizeFeature,
};

type ConditionResult<'i, T> = Result<T, CssParseError<'i, SyntaxError>>;

/// Font size that `em` and `rem` resolve against inside queries.
const QUERY_FONT_SIZE: f32 = 16.0;

/// Parse `[name] (<feature>) [and (<feature>)]*`.
pub(crate) fn parse_container_query(prelude: &str) -> Result<ContainerQuery, SyntaxError> {
    let mut input = ParserInput::new(prelude);
    let mut parser = Parser::new(&mut input);
    parse_container(&mut parser).map_err(SyntaxError::from_parse_error)
}

/// Parse `[only] [all|screen] [and] (<feature>) [and (<feature>)]*`.
pub(crate) fn parse_media_query(prelude: &str) -> Result<MediaQuery, SyntaxError> {
    let mut input = ParserInput::new(prelude);
    let mut parser = Parser::new(&mut input);
    parse_media(&mut parser).map_err(SyntaxError::from_parse_error)
}

fn parse_container<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, ContainerQuery> {
    let mut name = None;
    let mut features = vec![];

    loop {
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        match &token {
            Token::ParenthesisBlock => {
                features.push(parser.parse_nested_block(|p| parse_size_feature(p))?);
            }
            Token::Ident(word) if word.eq_ignore_ascii_case("and") && !features.is_empty() => {}
            Token::Ident(word)
                if word.eq_ignore_ascii_case("or") || word.eq_ignore_ascii_case("not") =>
            {
                return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                    "'{}' in @container",
                    word
                ))));
            }
            Token::Ident(word) if name.is_none() && features.is_empty() => {
                name = Some(word.to_string());
            }
            Token::Function(function) => {
                return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                    "@container {}() query",
                    function
                ))));
            }
            other => {
                return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                    "unexpected {:?} in @container",
                    other
                ))));
            }
        }
    }

    if features.is_empty() {
        return Err(parser.new_custom_error(SyntaxError::invalid("@container without a size condition")));
    }

    Ok(ContainerQuery {
        name,
        condition: SizeCondition::new(features),
    })
}

fn parse_media<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, MediaQuery> {
    let mut query = MediaQuery::default();
    let mut features = vec![];

    loop {
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        match &token {
            Token::Ident(word) => match word.to_ascii_lowercase().as_str() {
                "all" | "screen" | "only" | "and" => {}
                "not" | "or" => {
                    return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                        "'{}' in @media",
                        word
                    ))));
                }
                other => {
                    return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                        "media type '{}'",
                        other
                    ))));
                }
            },
            Token::ParenthesisBlock => {
                let scheme = parser.parse_nested_block(|p| parse_media_feature(p))?;
                match scheme {
                    MediaFeature::ColorScheme(scheme) => query.color_scheme = Some(scheme),
                    MediaFeature::Size(feature) => features.push(feature),
                }
            }
            Token::Comma => {
                return Err(parser.new_custom_error(SyntaxError::unsupported("@media query lists")));
            }
            other => {
                return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                    "unexpected {:?} in @media",
                    other
                ))));
            }
        }
    }

    query.viewport = SizeCondition::new(features);
    Ok(query)
}

enum MediaFeature {
    ColorScheme(ColorScheme),
    Size(SizeFeature),
}

fn parse_media_feature<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, MediaFeature> {
    let start = parser.state();
    if let Ok(name) = parser.expect_ident_cloned() {
        if name.eq_ignore_ascii_case("prefers-color-scheme") {
            parser.expect_colon()?;
            let value = parser.expect_ident_cloned()?;
            return ColorScheme::from_css(&value)
                .map(MediaFeature::ColorScheme)
                .ok_or_else(|| {
                    parser.new_custom_error(SyntaxError::invalid(format!(
                        "unknown color scheme '{}'",
                        value
                    )))
                });
        }
    }
    parser.reset(&start);
    parse_size_feature(parser).map(MediaFeature::Size)
}

/// Parse `width: 400px`, `min-width: 400px`, `width > 400px` or `400px < width`.
fn parse_size_feature<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, SizeFeature> {
    let token = parser.next()?.clone();
    match &token {
        Token::Ident(name) => {
            let name = name.to_ascii_lowercase();
            if parser.try_parse(|p| p.expect_colon()).is_ok() {
                let (axis, comparator) = match name.as_str() {
                    "width" => (SizeAxis::Width, Comparator::Equal),
                    "height" => (SizeAxis::Height, Comparator::Equal),
                    "min-width" => (SizeAxis::Width, Comparator::GreaterOrEqual),
                    "max-width" => (SizeAxis::Width, Comparator::LessOrEqual),
                    "min-height" => (SizeAxis::Height, Comparator::GreaterOrEqual),
                    "max-height" => (SizeAxis::Height, Comparator::LessOrEqual),
                    _ => return Err(unsupported_feature(parser, &name)),
                };
                let value = parse_query_length(parser)?;
                return Ok(SizeFeature::new(axis, comparator, value));
            }
            let axis = parse_axis(parser, &name)?;
            let comparator = parse_comparator(parser)?;
            let value = parse_query_length(parser)?;
            Ok(SizeFeature::new(axis, comparator, value))
        }
        Token::Number { .. } | Token::Dimension { .. } => {
            let value = query_length(parser, &token)?;
            let comparator = parse_comparator(parser)?.flipped();
            let name = parser.expect_ident_cloned()?.to_ascii_lowercase();
            let axis = parse_axis(parser, &name)?;
            Ok(SizeFeature::new(axis, comparator, value))
        }
        other => Err(parser.new_custom_error(SyntaxError::invalid(format!(
            "unexpected {:?} in size feature",
            other
        )))),
    }
}

fn unsupported_feature<'i>(parser: &Parser<'i, '_>, name: &str) -> CssParseError<'i, SyntaxError> {
    parser.new_custom_error(SyntaxError::unsupported(format!("size feature '{}'", name)))
}

fn parse_axis<'i>(parser: &Parser<'i, '_>, name: &str) -> ConditionResult<'i, SizeAxis> {
    match name {
        "width" | "inline-size" => Ok(SizeAxis::Width),
        "height" | "block-size" => Ok(SizeAxis::Height),
        _ => Err(unsupported_feature(parser, name)),
    }
}

fn parse_comparator<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, Comparator> {
    let location = parser.current_source_location();
    let comparator = match parser.next()? {
        Token::Delim('<') => Comparator::Less,
        Token::Delim('>') => Comparator::Greater,
        Token::Delim('=') => return Ok(Comparator::Equal),
        _ => {
            return Err(location.new_custom_error(SyntaxError::invalid("expected a comparison operator")));
        }
    };
    if parser.try_parse(|p| p.expect_delim('=')).is_ok() {
        return Ok(match comparator {
            Comparator::Less => Comparator::LessOrEqual,
            _ => Comparator::GreaterOrEqual,
        });
    }
    Ok(comparator)
}

fn parse_query_length<'i>(parser: &mut Parser<'i, '_>) -> ConditionResult<'i, f32> {
    let token = parser.next()?.clone();
    query_length(parser, &token)
}

fn query_length<'i>(parser: &Parser<'i, '_>, token: &Token<'i>) -> ConditionResult<'i, f32> {
    match token {
        Token::Number { value, .. } => Ok(*value),
        Token::Dimension { value, unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "px" => Ok(*value),
            "em" | "rem" => Ok(*value * QUERY_FONT_SIZE),
            other => Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                "unit '{}' in size query",
                other
            )))),
        },
        other => Err(parser.new_custom_error(SyntaxError::invalid(format!(
            "expected a length, found {:?}",
            other
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(comparator: Comparator, value: f32) -> SizeFeature {
        SizeFeature::new(SizeAxis::Width, comparator, value)
    }

    #[test]
    fn container_range_syntax() {
        let query = parse_container_query("(width > 400px)").unwrap();
        assert_eq!(query.name, None);
        assert_eq!(query.condition.features, vec![width(Comparator::Greater, 400.0)]);

        let query = parse_container_query("sidebar (400px <= width) and (height < 30rem)").unwrap();
        assert_eq!(query.name.as_deref(), Some("sidebar"));
        assert_eq!(
            query.condition.features,
            vec![
                width(Comparator::GreaterOrEqual, 400.0),
                SizeFeature::new(SizeAxis::Height, Comparator::Less, 480.0),
            ]
        );
    }

    #[test]
    fn container_min_max_syntax() {
        let query = parse_container_query("card (min-width: 20rem)").unwrap();
        assert_eq!(query.condition.features, vec![width(Comparator::GreaterOrEqual, 320.0)]);
        let query = parse_container_query("(max-width: 300px)").unwrap();
        assert_eq!(query.condition.features, vec![width(Comparator::LessOrEqual, 300.0)]);
    }

    #[test]
    fn container_rejections() {
        assert!(parse_container_query("sidebar").is_err());
        assert!(parse_container_query("(orientation: portrait)").unwrap_err().unsupported);
        assert!(parse_container_query("style(--x: 1)").unwrap_err().unsupported);
        assert!(parse_container_query("(width > 10vw)").unwrap_err().unsupported);
        assert!(!parse_container_query("(width >)").unwrap_err().unsupported);
    }

    #[test]
    fn media_color_scheme() {
        let query = parse_media_query("(prefers-color-scheme: dark)").unwrap();
        assert_eq!(query.color_scheme, Some(ColorScheme::Dark));
        assert!(query.viewport.is_empty());

        let query = parse_media_query("screen and (min-width: 768px)").unwrap();
        assert_eq!(query.color_scheme, None);
        assert_eq!(query.viewport.features, vec![width(Comparator::GreaterOrEqual, 768.0)]);
    }

    #[test]
    fn media_rejections() {
        assert!(parse_media_query("print").unwrap_err().unsupported);
        assert!(parse_media_query("(hover: hover)").unwrap_err().unsupported);
        assert!(parse_media_query("(min-width: 1px), (max-width: 2px)").unwrap_err().unsupported);
        assert!(!parse_media_query("(prefers-color-scheme: sepia)").unwrap_err().unsupported);
    }
}
