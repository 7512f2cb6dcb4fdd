//! Placeholder dialect translation.
//!
//! Templates use helper-call tags (`{{ pascal name }}`, `{{ plural(snake name) }}`).
//! Tera expresses the same thing as filter chains, so recognized tags are
//! rewritten to `{{ name | pascal }}` and `{{ name | snake | plural }}` before
//! rendering. Tags outside that grammar are handed to tera unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    error::{Error, Result},
    helpers::HelperRegistry,
};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(?P<expr>[^{}]*)\}\}").unwrap());

static HELPER_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<helper>[A-Za-z_]\w*)\s+(?P<ident>[A-Za-z_]\w*)$").unwrap());

static WRAPPED_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<outer>[A-Za-z_]\w*)\s*\(\s*(?:(?P<helper>[A-Za-z_]\w*)\s+)?(?P<ident>[A-Za-z_]\w*)\s*\)$",
    )
    .unwrap()
});

static TERA_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[{%#]").unwrap());

/// Prefix operators tera understands natively
const OPERATORS: &[&str] = &["not"];

/// Rewrite helper-call tags in `source` into tera filter chains.
///
/// `origin` names the template (usually its path) for error messages.
pub fn translate(origin: &str, source: &str, helpers: &HelperRegistry) -> Result<String> {
    let mut output = String::with_capacity(source.len());
    let mut last = 0;

    for captures in TAG.captures_iter(source) {
        let Some(tag) = captures.get(0) else {
            continue;
        };
        output.push_str(&source[last..tag.start()]);
        output.push_str(&translate_tag(origin, &captures, helpers)?);
        last = tag.end();
    }
    output.push_str(&source[last..]);

    Ok(output)
}

/// Escape tera delimiters in literal text so it renders back verbatim.
///
/// `before_tag` marks text that a placeholder directly follows; a trailing
/// `{` would otherwise merge with the placeholder's opening braces.
pub fn escape_literal(text: &str, before_tag: bool) -> String {
    let mut escaped = TERA_DELIMITER
        .replace_all(text, |captures: &Captures<'_>| string_tag(&captures[0]))
        .into_owned();
    if before_tag && escaped.ends_with('{') {
        escaped.pop();
        escaped.push_str(&string_tag("{"));
    }
    escaped
}

fn string_tag(literal: &str) -> String {
    format!("{{{{ \"{}\" }}}}", literal)
}

fn translate_tag(origin: &str, captures: &Captures<'_>, helpers: &HelperRegistry) -> Result<String> {
    let tag = &captures[0];
    let expression = captures["expr"].trim();

    if let Some(call) = HELPER_CALL.captures(expression) {
        if OPERATORS.contains(&&call["helper"]) {
            return Ok(tag.to_string());
        }
        let chain = [&call["helper"]];
        return filter_chain(origin, tag, &call["ident"], &chain, helpers);
    }

    if let Some(call) = WRAPPED_CALL.captures(expression) {
        let chain: Vec<&str> = call
            .name("helper")
            .map(|m| m.as_str())
            .into_iter()
            .chain(std::iter::once(&call["outer"]))
            .collect();
        return filter_chain(origin, tag, &call["ident"], &chain, helpers);
    }

    Ok(tag.to_string())
}

fn filter_chain(
    origin: &str,
    tag: &str,
    ident: &str,
    chain: &[&str],
    helpers: &HelperRegistry,
) -> Result<String> {
    if let Some(unknown) = chain.iter().find(|helper| !helpers.contains(helper)) {
        return Err(Error::TemplateSyntax {
            path: origin.to_string(),
            expression: tag.to_string(),
            reason: format!("unknown helper `{}`", unknown),
        });
    }

    Ok(format!("{{{{ {} | {} }}}}", ident, chain.join(" | ")))
}
