//! Selector list parsing.

use cssparser::{Delimiter, ParseError as CssParseError, Parser, ParserInput, Token};

use super::error::SyntaxError;
use crate::selector::{AttributeSelector, Combinator, PseudoClass, Selector, SelectorPart, TypeSelector};

type SelectorResult<'i, T> = Result<T, CssParseError<'i, SyntaxError>>;

/// Parse a comma-separated selector list.
///
/// Any malformed member invalidates the whole list.
pub(crate) fn parse_selector_list(text: &str) -> Result<Vec<Selector>, SyntaxError> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut selectors = vec![];

    loop {
        let selector = parser
            .parse_until_before(Delimiter::Comma, |p| parse_complex(p))
            .map_err(SyntaxError::from_parse_error)?;
        selectors.push(selector);

        match parser.next() {
            Ok(Token::Comma) => continue,
            _ => break,
        }
    }

    Ok(selectors)
}

/// Parse a single compound selector such as `.app` or `#root`.
pub(crate) fn parse_compound_selector(text: &str) -> Result<SelectorPart, SyntaxError> {
    let mut selectors = parse_selector_list(text)?;
    match (selectors.pop(), selectors.is_empty()) {
        (Some(mut selector), true) if selector.parts.len() == 1 => Ok(selector.parts.remove(0)),
        _ => Err(SyntaxError::invalid(format!("`{}` is not a compound selector", text.trim()))),
    }
}

/// Parse one complex selector: compounds joined by whitespace or `>`.
fn parse_complex<'i>(parser: &mut Parser<'i, '_>) -> SelectorResult<'i, Selector> {
    let mut parts = vec![];
    let mut combinators = vec![];
    let mut current = SelectorPart::new();
    let mut pending: Option<Combinator> = None;

    parser.skip_whitespace();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match &token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Descendant);
                }
            }
            Token::Delim('>') => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                if parts.is_empty() {
                    return Err(parser.new_custom_error(SyntaxError::invalid("selector starts with '>'")));
                }
                pending = Some(Combinator::Child);
            }
            Token::Delim(c @ ('+' | '~')) => {
                return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                    "sibling combinator '{}'",
                    c
                ))));
            }
            _ => {
                if current.is_empty() && !parts.is_empty() {
                    combinators.push(pending.take().unwrap_or(Combinator::Descendant));
                }
                apply_simple_selector(parser, &token, &mut current, true)?;
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    } else if pending == Some(Combinator::Child) {
        return Err(parser.new_custom_error(SyntaxError::invalid("selector ends with '>'")));
    }

    if parts.is_empty() {
        return Err(parser.new_custom_error(SyntaxError::invalid("empty selector")));
    }

    Ok(Selector { parts, combinators })
}

/// Add one simple selector token to a compound.
fn apply_simple_selector<'i>(
    parser: &mut Parser<'i, '_>,
    token: &Token<'i>,
    part: &mut SelectorPart,
    allow_dynamic: bool,
) -> SelectorResult<'i, ()> {
    match token {
        Token::Ident(name) => {
            if !part.is_empty() {
                return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                    "type selector '{}' must come first in a compound",
                    name
                ))));
            }
            part.type_selector = Some(TypeSelector::Type(name.to_string()));
        }

        Token::Delim('*') => {
            if !part.is_empty() {
                return Err(parser.new_custom_error(SyntaxError::invalid(
                    "universal selector must come first in a compound",
                )));
            }
            part.type_selector = Some(TypeSelector::Universal);
        }

        Token::Delim('.') => match parser.next_including_whitespace() {
            Ok(Token::Ident(class)) => {
                let class = class.to_string();
                part.classes.push(class);
            }
            _ => {
                return Err(parser.new_custom_error(SyntaxError::invalid("expected class name after '.'")));
            }
        },

        Token::IDHash(id) => {
            if part.id.is_some() {
                return Err(parser.new_custom_error(SyntaxError::invalid("compound has two ids")));
            }
            part.id = Some(id.to_string());
        }

        Token::SquareBracketBlock => {
            let attribute = parser.parse_nested_block(|p| parse_attribute(p))?;
            part.attributes.push(attribute);
        }

        Token::Colon => {
            let pseudo = parse_pseudo_class(parser)?;
            if !allow_dynamic && pseudo.is_dynamic() {
                return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                    ":{} inside :not()",
                    pseudo
                ))));
            }
            part.pseudo_classes.push(pseudo);
        }

        Token::Delim('&') => {
            return Err(parser.new_custom_error(SyntaxError::unsupported("nesting selector '&'")));
        }

        other => {
            return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                "unexpected {:?} in selector",
                other
            ))));
        }
    }

    Ok(())
}

/// Parse what follows a ':' in a compound.
fn parse_pseudo_class<'i>(parser: &mut Parser<'i, '_>) -> SelectorResult<'i, PseudoClass> {
    let token = parser.next_including_whitespace()?.clone();
    match &token {
        Token::Ident(name) => PseudoClass::from_css(name).ok_or_else(|| {
            parser.new_custom_error(SyntaxError::unsupported(format!("pseudo-class :{}", name)))
        }),
        Token::Function(name) if name.eq_ignore_ascii_case("not") => {
            let inner = parser.parse_nested_block(|p| parse_negated_compound(p))?;
            Ok(PseudoClass::Not(Box::new(inner)))
        }
        Token::Function(name) => Err(parser.new_custom_error(SyntaxError::unsupported(format!(
            "pseudo-class :{}()",
            name
        )))),
        Token::Colon => {
            let name = parser
                .next_including_whitespace()
                .map(|t| format!("{:?}", t))
                .unwrap_or_default();
            Err(parser.new_custom_error(SyntaxError::unsupported(format!("pseudo-element ::{}", name))))
        }
        _ => Err(parser.new_custom_error(SyntaxError::invalid("expected pseudo-class name after ':'"))),
    }
}

/// Parse the static compound inside `:not(...)`.
fn parse_negated_compound<'i>(parser: &mut Parser<'i, '_>) -> SelectorResult<'i, SelectorPart> {
    let mut part = SelectorPart::new();
    parser.skip_whitespace();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        if let Token::WhiteSpace(_) = token {
            parser.skip_whitespace();
            if parser.is_exhausted() {
                break;
            }
            return Err(parser.new_custom_error(SyntaxError::unsupported(
                "complex selectors inside :not()",
            )));
        }
        apply_simple_selector(parser, &token, &mut part, false)?;
    }

    if part.is_empty() {
        return Err(parser.new_custom_error(SyntaxError::invalid("empty :not()")));
    }
    Ok(part)
}

/// Parse the inside of `[name]` or `[name=value]`.
fn parse_attribute<'i>(parser: &mut Parser<'i, '_>) -> SelectorResult<'i, AttributeSelector> {
    let name = parser.expect_ident()?.to_string();
    if parser.is_exhausted() {
        return Ok(AttributeSelector::exists(name));
    }

    let token = parser.next()?.clone();
    match token {
        Token::Delim('=') => {}
        Token::IncludeMatch
        | Token::DashMatch
        | Token::PrefixMatch
        | Token::SuffixMatch
        | Token::SubstringMatch => {
            return Err(parser.new_custom_error(SyntaxError::unsupported(format!(
                "attribute operator {:?}",
                token
            ))));
        }
        _ => {
            return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                "expected '=' in attribute selector [{}]",
                name
            ))));
        }
    }

    let value = match parser.next()? {
        Token::Ident(v) | Token::QuotedString(v) => v.to_string(),
        Token::Number { value, .. } => value.to_string(),
        _ => {
            return Err(parser.new_custom_error(SyntaxError::invalid(format!(
                "expected value in attribute selector [{}]",
                name
            ))));
        }
    };
    parser.expect_exhausted()?;

    Ok(AttributeSelector::equals(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> Selector {
        let mut list = parse_selector_list(text).unwrap();
        assert_eq!(list.len(), 1, "{text}");
        list.remove(0)
    }

    #[test]
    fn parse_compound() {
        let sel = parse_one("View.card.primary#main[data-state=open]:hover");
        assert_eq!(sel.parts.len(), 1);
        let part = &sel.parts[0];
        assert_eq!(part.type_selector, Some(TypeSelector::Type("View".into())));
        assert_eq!(part.classes, vec!["card", "primary"]);
        assert_eq!(part.id.as_deref(), Some("main"));
        assert_eq!(part.attributes, vec![AttributeSelector::equals("data-state", "open")]);
        assert_eq!(part.pseudo_classes, vec![PseudoClass::Hover]);
    }

    #[test]
    fn parse_combinators() {
        let sel = parse_one(".a .b>.c > .d");
        assert_eq!(sel.parts.len(), 4);
        assert_eq!(
            sel.combinators,
            vec![Combinator::Descendant, Combinator::Child, Combinator::Child]
        );
        assert_eq!(sel.to_string(), ".a .b > .c > .d");
    }

    #[test]
    fn parse_escaped_classes() {
        let sel = parse_one(".hover\\:bg-red:hover");
        assert_eq!(sel.parts[0].classes, vec!["hover:bg-red"]);
        assert_eq!(sel.parts[0].pseudo_classes, vec![PseudoClass::Hover]);

        let sel = parse_one(".w-1\\/2");
        assert_eq!(sel.parts[0].classes, vec!["w-1/2"]);
    }

    #[test]
    fn parse_list() {
        let list = parse_selector_list(".a, .b:active ,Text").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].parts[0].pseudo_classes, vec![PseudoClass::Active]);
    }

    #[test]
    fn parse_not_and_attributes() {
        let sel = parse_one(":not(.hidden)[data-open]");
        assert_eq!(
            sel.parts[0].pseudo_classes,
            vec![PseudoClass::Not(Box::new(SelectorPart::class_only("hidden")))]
        );
        assert_eq!(sel.parts[0].attributes, vec![AttributeSelector::exists("data-open")]);
    }

    #[test]
    fn parse_rejects_unsupported() {
        for text in [".a + .b", ".a ~ .b", ".a::before", ".a:visited", "[data-x^=\"a\"]", ".a:nth-child(2)"] {
            let err = parse_selector_list(text).unwrap_err();
            assert!(err.unsupported, "{text}: {err:?}");
        }
    }

    #[test]
    fn parse_rejects_invalid() {
        for text in ["", ".", "> .a", ".a >", ".a, ", "#a#b"] {
            let err = parse_selector_list(text).unwrap_err();
            assert!(!err.unsupported, "{text}: {err:?}");
        }
    }

    #[test]
    fn parse_descendant_type_selectors() {
        let sel = parse_one(".a View.b Text");
        assert_eq!(sel.parts.len(), 3);
        assert_eq!(sel.to_string(), ".a View.b Text");
    }

    #[test]
    fn parse_compound_prefix() {
        assert_eq!(parse_compound_selector(" #app ").unwrap(), SelectorPart::id_only("app"));
        assert!(parse_compound_selector(".a .b").is_err());
        assert!(parse_compound_selector(".a, .b").is_err());
    }
}
