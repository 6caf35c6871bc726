//! `var()` substitution.
//!
//! References are replaced by the parsed tokens of the nearest definition,
//! recursively, so nested functions and fallbacks containing commas behave
//! like the surrounding value was written out in full.

use std::collections::{BTreeMap, HashMap};

use crate::parser::parse_component_values;
use crate::types::ComponentValue;

/// Maximum nesting of references before substitution gives up.
const MAX_SUBSTITUTION_DEPTH: usize = 10;

/// Looks up custom property text by name.
///
/// Implementations may record each lookup as a dependency.
pub trait VariableSource {
    /// Raw text of the nearest definition of `name`.
    fn lookup(&mut self, name: &str) -> Option<String>;
}

impl VariableSource for BTreeMap<String, String> {
    fn lookup(&mut self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VariableSource for HashMap<String, String> {
    fn lookup(&mut self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Replace every `var()` in `components`.
///
/// Returns `None` when a reference has neither a definition nor a
/// fallback, when definitions are cyclic, or when nesting is too deep;
/// the declaration is then undefined.
pub fn substitute(components: &[ComponentValue], source: &mut dyn VariableSource) -> Option<Vec<ComponentValue>> {
    let mut stack = Vec::new();
    let mut output = Vec::with_capacity(components.len());
    substitute_into(components, source, &mut stack, &mut output)?;
    Some(output)
}

fn substitute_into(
    components: &[ComponentValue],
    source: &mut dyn VariableSource,
    stack: &mut Vec<String>,
    output: &mut Vec<ComponentValue>,
) -> Option<()> {
    for component in components {
        match component {
            ComponentValue::Reference { name, fallback } => {
                resolve_reference(name, fallback.as_deref(), source, stack, output)?;
            }
            ComponentValue::FunctionCall { name, args } if component.has_reference() => {
                let mut resolved = Vec::with_capacity(args.len());
                substitute_into(args, source, stack, &mut resolved)?;
                output.push(ComponentValue::FunctionCall {
                    name: name.clone(),
                    args: resolved,
                });
            }
            ComponentValue::Block(inner) if component.has_reference() => {
                let mut resolved = Vec::with_capacity(inner.len());
                substitute_into(inner, source, stack, &mut resolved)?;
                output.push(ComponentValue::Block(resolved));
            }
            other => output.push(other.clone()),
        }
    }
    Some(())
}

fn resolve_reference(
    name: &str,
    fallback: Option<&[ComponentValue]>,
    source: &mut dyn VariableSource,
    stack: &mut Vec<String>,
    output: &mut Vec<ComponentValue>,
) -> Option<()> {
    if stack.len() >= MAX_SUBSTITUTION_DEPTH || stack.iter().any(|n| n == name) {
        tracing::debug!(target: "native_css::runtime", name, chain = ?stack, "cyclic or too deep var()");
        return None;
    }

    if let Some(raw) = source.lookup(name) {
        let parsed = match parse_component_values(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(target: "native_css::runtime", name, raw, error = %e.message, "unparsable custom property");
                return None;
            }
        };
        stack.push(name.to_string());
        let result = substitute_into(&parsed, source, stack, output);
        stack.pop();
        return result;
    }

    match fallback {
        Some(fallback) => substitute_into(fallback, source, stack, output),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UnitKind, components_to_string};

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(value: &str, source: &mut BTreeMap<String, String>) -> Option<String> {
        let components = parse_component_values(value).unwrap();
        substitute(&components, source).map(|c| components_to_string(&c))
    }

    #[test]
    fn substitutes_nested_references() {
        let mut source = vars(&[("--h", "0"), ("--color", "hsl(var(--h) 84% 60%)")]);
        assert_eq!(run("var(--color)", &mut source).as_deref(), Some("hsl(0 84% 60%)"));
    }

    #[test]
    fn fallback_with_commas() {
        let mut source = vars(&[]);
        assert_eq!(
            run("rgb(var(--rgb, 1, 2, 3))", &mut source).as_deref(),
            Some("rgb(1, 2, 3)")
        );
        assert_eq!(run("var(--missing)", &mut source), None);
    }

    #[test]
    fn splices_multiple_tokens() {
        let mut source = vars(&[("--pad", "4px 8px")]);
        let components = parse_component_values("var(--pad) 2px").unwrap();
        let resolved = substitute(&components, &mut source).unwrap();
        assert_eq!(
            resolved,
            vec![
                ComponentValue::Unit(4.0, UnitKind::Px),
                ComponentValue::Unit(8.0, UnitKind::Px),
                ComponentValue::Unit(2.0, UnitKind::Px),
            ]
        );
    }

    #[test]
    fn cycles_are_undefined() {
        let mut source = vars(&[("--a", "var(--b)"), ("--b", "var(--a)")]);
        assert_eq!(run("var(--a)", &mut source), None);

        let mut source = vars(&[("--self", "calc(var(--self) + 1px)")]);
        assert_eq!(run("var(--self, 2px)", &mut source), None);
    }

    #[test]
    fn repeated_reference_is_not_a_cycle() {
        let mut source = vars(&[("--x", "2px")]);
        assert_eq!(run("var(--x) var(--x)", &mut source).as_deref(), Some("2px 2px"));
    }
}
