//! CSS syntax parser using the `cssparser` crate.
//!
//! This module contains the rule-level grammar: qualified rules, the
//! supported at-rules and declaration blocks. Selectors, values and
//! conditions are parsed by the sibling modules from the text slices
//! captured here.

use cssparser::{Delimiter, ParseError as CssParseError, Parser, ParserInput, SourceLocation, Token};

use super::condition::{parse_container_query, parse_media_query};
use super::error::{DiagnosticKind, Diagnostics, ParseDiagnostic, SyntaxError};
use super::selector::{parse_compound_selector, parse_selector_list};
use super::value::parse_component_values;
use crate::rules::{Declaration, DeclaredValue, Keyframe, Keyframes, RuleCondition, StyleRule, StyleSheet};
use crate::selector::{Selector, SelectorPart};
use crate::types::ComponentValue;

/// Options applied while parsing a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compound selector (e.g. `#app`) prepended with a descendant combinator
    /// to every style rule except `:root` rules.
    pub selector_prefix: Option<String>,
}

impl ParseOptions {
    /// Scope every rule under a compound selector.
    pub fn with_selector_prefix(prefix: impl Into<String>) -> Self {
        Self {
            selector_prefix: Some(prefix.into()),
        }
    }
}

/// A parsed stylesheet plus everything that was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub stylesheet: StyleSheet,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseOutput {
    /// Whether the text parsed without any diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse a stylesheet.
///
/// Parsing never fails as a whole. Malformed declarations and rules are
/// dropped, unsupported constructs are skipped, and each is reported as a
/// [`ParseDiagnostic`] (also logged via `tracing::warn!`).
///
/// # Example
///
/// ```
/// use native_css::parser::{parse_stylesheet, ParseOptions};
///
/// let output = parse_stylesheet(".a { color: red; } .b { color: }", &ParseOptions::default());
/// assert_eq!(output.stylesheet.len(), 2);
/// assert_eq!(output.diagnostics.len(), 1);
/// ```
pub fn parse_stylesheet(css: &str, options: &ParseOptions) -> ParseOutput {
    let mut builder = SheetBuilder::new(options);
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    parse_rule_list(&mut parser, &mut builder, &[]);

    tracing::debug!(
        target: "native_css::parser",
        rules = builder.stylesheet.rules.len(),
        keyframes = builder.stylesheet.keyframes.len(),
        diagnostics = builder.diagnostics.items.len(),
        "parsed stylesheet"
    );

    ParseOutput {
        stylesheet: builder.stylesheet,
        diagnostics: builder.diagnostics.items,
    }
}

/// Parse a bare declaration list, as found in an inline style.
pub fn parse_declarations(css: &str) -> (Vec<Declaration>, Vec<ParseDiagnostic>) {
    let mut diagnostics = Diagnostics::default();
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let declarations = parse_declaration_list(&mut parser, &mut diagnostics);
    (declarations, diagnostics.items)
}

struct SheetBuilder {
    stylesheet: StyleSheet,
    diagnostics: Diagnostics,
    prefix: Option<SelectorPart>,
    order: u32,
}

impl SheetBuilder {
    fn new(options: &ParseOptions) -> Self {
        let mut diagnostics = Diagnostics::default();
        let prefix = options.selector_prefix.as_deref().and_then(|text| {
            parse_compound_selector(text)
                .map_err(|e| {
                    diagnostics.report_error(
                        e,
                        DiagnosticKind::InvalidSelector,
                        SourceLocation { line: 0, column: 1 },
                    )
                })
                .ok()
        });

        Self {
            stylesheet: StyleSheet::new(),
            diagnostics,
            prefix,
            order: 0,
        }
    }

    /// Add one rule per selector, all sharing the next source order.
    fn add_rules(
        &mut self,
        selectors: Vec<Selector>,
        declarations: Vec<Declaration>,
        conditions: &[RuleCondition],
    ) {
        let order = self.order;
        self.order += 1;

        for declaration in &declarations {
            self.record_container_names(declaration);
        }

        for selector in selectors {
            let selector = match &self.prefix {
                Some(prefix) if !selector.is_root() => selector.scoped(prefix.clone()),
                _ => selector,
            };
            let rule = StyleRule::new(selector, declarations.clone(), order)
                .with_conditions(conditions.to_vec());
            self.stylesheet.rules.push(rule);
        }
    }

    fn record_container_names(&mut self, declaration: &Declaration) {
        let names: &[ComponentValue] = match declaration.name.as_str() {
            "container-name" => &declaration.value.components,
            "container" => {
                let end = declaration
                    .value
                    .components
                    .iter()
                    .position(|c| matches!(c, ComponentValue::Slash))
                    .unwrap_or(declaration.value.components.len());
                &declaration.value.components[..end]
            }
            _ => return,
        };
        for name in names.iter().filter_map(ComponentValue::as_ident) {
            if name != "none" {
                self.stylesheet.container_names.insert(name.to_string());
            }
        }
    }
}

/// Parse rules until the input (or enclosing block) is exhausted.
fn parse_rule_list<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut SheetBuilder,
    conditions: &[RuleCondition],
) {
    loop {
        parser.skip_whitespace();

        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        let start = parser.state();
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match token {
            Token::AtKeyword(name) => {
                let name = name.to_ascii_lowercase();
                parse_at_rule(parser, builder, &name, location, conditions);
            }
            Token::CDO | Token::CDC | Token::Semicolon => {}
            _ => {
                parser.reset(&start);
                parse_qualified_rule(parser, builder, location, conditions);
            }
        }
    }
}

/// Consume the remaining tokens and return their source text.
fn consume_text<'i>(parser: &mut Parser<'i, '_>) -> Result<String, CssParseError<'i, ()>> {
    let start = parser.position();
    while parser.next().is_ok() {}
    Ok(parser.slice_from(start).trim().to_string())
}

/// Parse a single rule: selector { declarations }
fn parse_qualified_rule<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut SheetBuilder,
    location: SourceLocation,
    conditions: &[RuleCondition],
) {
    let prelude = parser
        .parse_until_before(Delimiter::CurlyBracketBlock, |p| consume_text(p))
        .unwrap_or_default();

    let has_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
    if !has_block {
        builder.diagnostics.report(
            DiagnosticKind::Syntax,
            format!("expected '{{' after `{}`", prelude),
            location,
        );
        return;
    }

    // An unparsable selector drops the whole rule; the block is skipped unread.
    let selectors = match parse_selector_list(&prelude) {
        Ok(selectors) => selectors,
        Err(e) => {
            let message = format!("`{}`: {}", prelude, e.message);
            builder.diagnostics.report_error(
                SyntaxError { message, ..e },
                DiagnosticKind::InvalidSelector,
                location,
            );
            return;
        }
    };

    let diagnostics = &mut builder.diagnostics;
    let declarations = parser
        .parse_nested_block(|p| Ok::<_, CssParseError<'i, ()>>(parse_declaration_list(p, diagnostics)))
        .unwrap_or_default();

    builder.add_rules(selectors, declarations, conditions);
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    builder: &mut SheetBuilder,
    name: &str,
    location: SourceLocation,
    conditions: &[RuleCondition],
) {
    let prelude = parser
        .parse_until_before(Delimiter::CurlyBracketBlock | Delimiter::Semicolon, |p| consume_text(p))
        .unwrap_or_default();
    let has_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));

    match name {
        "container" | "media" | "keyframes" | "-webkit-keyframes" if !has_block => {
            builder.diagnostics.report(
                DiagnosticKind::Syntax,
                format!("@{} requires a block", name),
                location,
            );
        }

        "container" | "media" => {
            let condition = if name == "container" {
                parse_container_query(&prelude).map(RuleCondition::Container)
            } else {
                parse_media_query(&prelude).map(RuleCondition::Media)
            };

            match condition {
                Ok(condition) => {
                    let mut nested = conditions.to_vec();
                    nested.push(condition);
                    let _ = parser.parse_nested_block(|p| {
                        parse_rule_list(p, builder, &nested);
                        Ok::<_, CssParseError<'i, ()>>(())
                    });
                }
                Err(e) => {
                    let message = format!("@{} {}: {}", name, prelude, e.message);
                    builder.diagnostics.report_error(
                        SyntaxError { message, ..e },
                        DiagnosticKind::Syntax,
                        location,
                    );
                }
            }
        }

        "keyframes" | "-webkit-keyframes" => {
            let keyframes_name = prelude.trim_matches(|c| c == '"' || c == '\'').to_string();
            if keyframes_name.is_empty() {
                builder.diagnostics.report(
                    DiagnosticKind::Syntax,
                    "@keyframes without a name",
                    location,
                );
                return;
            }

            let diagnostics = &mut builder.diagnostics;
            let frames = parser
                .parse_nested_block(|p| Ok::<_, CssParseError<'i, ()>>(parse_keyframe_list(p, diagnostics)))
                .unwrap_or_default();

            builder.stylesheet.keyframes.insert(
                keyframes_name.clone(),
                Keyframes {
                    name: keyframes_name,
                    frames,
                },
            );
        }

        _ => {
            builder.diagnostics.report(
                DiagnosticKind::Unsupported,
                format!("at-rule @{}", name),
                location,
            );
        }
    }
}

fn parse_keyframe_list<'i>(parser: &mut Parser<'i, '_>, diagnostics: &mut Diagnostics) -> Vec<Keyframe> {
    let mut frames = vec![];

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        let prelude = parser
            .parse_until_before(Delimiter::CurlyBracketBlock, |p| consume_text(p))
            .unwrap_or_default();
        if !matches!(parser.next(), Ok(Token::CurlyBracketBlock)) {
            diagnostics.report(
                DiagnosticKind::Syntax,
                format!("expected '{{' after keyframe selector `{}`", prelude),
                location,
            );
            break;
        }

        let offsets = match parse_keyframe_offsets(&prelude) {
            Some(offsets) => offsets,
            None => {
                diagnostics.report(
                    DiagnosticKind::InvalidSelector,
                    format!("invalid keyframe selector `{}`", prelude),
                    location,
                );
                continue;
            }
        };

        let declarations = parser
            .parse_nested_block(|p| Ok::<_, CssParseError<'i, ()>>(parse_declaration_list(p, diagnostics)))
            .unwrap_or_default();
        frames.push(Keyframe {
            offsets,
            declarations,
        });
    }

    frames
}

/// `from`, `to` and percentages, comma-separated.
fn parse_keyframe_offsets(prelude: &str) -> Option<Vec<f32>> {
    prelude
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.to_ascii_lowercase().as_str() {
                "from" => Some(0.0),
                "to" => Some(1.0),
                _ => {
                    let percent: f32 = part.strip_suffix('%')?.trim().parse().ok()?;
                    (0.0..=100.0).contains(&percent).then_some(percent / 100.0)
                }
            }
        })
        .collect()
}

/// Parse declarations until the block is exhausted.
fn parse_declaration_list<'i>(parser: &mut Parser<'i, '_>, diagnostics: &mut Diagnostics) -> Vec<Declaration> {
    let mut declarations = vec![];

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        let result = parser.parse_until_after(Delimiter::Semicolon, |p| {
            let declaration = parse_declaration(p);
            // Leave nothing behind so the error (if any) is ours, not cssparser's.
            while p.next().is_ok() {}
            Ok::<_, CssParseError<'i, ()>>(declaration)
        });

        match result {
            Ok(Ok(declaration)) => declarations.push(declaration),
            Ok(Err(e)) => diagnostics.report_error(e, DiagnosticKind::InvalidDeclaration, location),
            Err(_) => diagnostics.report(
                DiagnosticKind::InvalidDeclaration,
                "malformed declaration",
                location,
            ),
        }
    }

    declarations
}

/// Parse `name: value [!important]`.
fn parse_declaration<'i>(parser: &mut Parser<'i, '_>) -> Result<Declaration, SyntaxError> {
    let name = match parser.next() {
        Ok(Token::Ident(name)) => name.to_string(),
        Ok(Token::AtKeyword(name)) => {
            return Err(SyntaxError::unsupported(format!("nested at-rule @{}", name)));
        }
        Ok(token) => return Err(SyntaxError::invalid(format!("expected property name, found {:?}", token))),
        Err(_) => return Err(SyntaxError::invalid("expected property name")),
    };
    let name = if name.starts_with("--") {
        name
    } else {
        name.to_ascii_lowercase()
    };

    if parser.expect_colon().is_err() {
        return Err(SyntaxError::invalid(format!("expected ':' after `{}`", name)));
    }

    let start = parser.position();
    let _ = parser.parse_until_before(Delimiter::Bang, |p| {
        while p.next().is_ok() {}
        Ok::<_, CssParseError<'i, ()>>(())
    });
    let raw = parser.slice_from(start).trim().to_string();

    let important = if parser.is_exhausted() {
        false
    } else {
        let bang = parser.expect_delim('!').is_ok();
        if !bang || parser.expect_ident_matching("important").is_err() || !parser.is_exhausted() {
            return Err(SyntaxError::invalid(format!("unexpected '!' in `{}`", name)));
        }
        true
    };

    if name.starts_with("--") {
        // Custom properties are token streams; they only need to parse once substituted.
        let components = parse_component_values(&raw).unwrap_or_default();
        return Ok(Declaration::new(name, DeclaredValue::new(raw, components), important));
    }

    if raw.is_empty() {
        return Err(SyntaxError::invalid(format!("empty value for `{}`", name)));
    }

    let components = parse_component_values(&raw).map_err(|e| SyntaxError {
        message: format!("`{}: {}`: {}", name, raw, e.message),
        ..e
    })?;

    Ok(Declaration::new(name, DeclaredValue::new(raw, components), important))
}
