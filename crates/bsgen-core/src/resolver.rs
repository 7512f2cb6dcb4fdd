//! Name/path parameter resolution.
//!
//! Generation accepts either a bare name (`HelloWorld`) or a concrete path
//! (`src/HelloWorld.ts`). A bare name is substituted into the template path; a
//! concrete path is matched against the template path to recover the name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Characters a bare name may consist of (no path separators)
pub const NAME_PATTERN: &str = "[A-Za-z0-9_-]*";

static BARE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("^{}$", NAME_PATTERN)).unwrap());

static NAME_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*name\s*\}\}").unwrap());

static ANY_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap());

/// A name together with the concrete path it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub path: String,
}

/// Resolve a supplied name or path against a parameterized template path.
///
/// # Errors
///
/// [`Error::AmbiguousPlaceholder`] when `value` is a path but `template_path` does
/// not contain exactly one `{{ name }}`, and [`Error::PathMismatch`] when the path
/// does not match.
pub fn resolve(value: &str, template_path: &str) -> Result<ResolvedName> {
    if BARE_NAME.is_match(value) {
        return Ok(ResolvedName {
            name: value.to_string(),
            path: NAME_PLACEHOLDER
                .replacen(template_path, 1, regex::NoExpand(value))
                .into_owned(),
        });
    }

    let pattern = path_pattern(template_path)?;
    let captures = pattern
        .captures(value)
        .ok_or_else(|| Error::PathMismatch {
            value: value.to_string(),
            template: template_path.to_string(),
        })?;

    Ok(ResolvedName {
        name: captures["name"].to_string(),
        path: value.to_string(),
    })
}

/// Build the anchored pattern matching concrete paths rendered from `template_path`
fn path_pattern(template_path: &str) -> Result<Regex> {
    let count = NAME_PLACEHOLDER.find_iter(template_path).count();
    if count != 1 {
        return Err(Error::AmbiguousPlaceholder {
            template: template_path.to_string(),
            count,
        });
    }

    let mut pattern = String::from(r"^(?:\./)?");
    let mut last = 0;
    for tag in ANY_PLACEHOLDER.find_iter(template_path) {
        pattern.push_str(&regex::escape(&template_path[last..tag.start()]));
        if NAME_PLACEHOLDER.is_match(tag.as_str()) {
            pattern.push_str(&format!("(?P<name>{})", NAME_PATTERN));
        } else {
            pattern.push_str("[^/]*");
        }
        last = tag.end();
    }
    pattern.push_str(&regex::escape(&template_path[last..]));
    pattern.push('$');

    log::debug!("Matching paths for {} with {}", template_path, pattern);
    Ok(Regex::new(&pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_bare_name() {
        let resolved = resolve("HelloWorld", "src/{{ name }}.ts").unwrap();
        assert_eq!(
            resolved,
            ResolvedName {
                name: "HelloWorld".into(),
                path: "src/HelloWorld.ts".into(),
            }
        );
    }

    #[test]
    fn test_resolve_bare_name_tolerates_spacing() {
        assert_eq!(resolve("a", "{{name}}/{{  name }}.ts").unwrap().path, "a/{{  name }}.ts");
        assert_eq!(resolve("koala-bear", "x/{{ name}}").unwrap().path, "x/koala-bear");
    }

    #[test]
    fn test_resolve_bare_name_without_placeholder() {
        let resolved = resolve("HelloWorld", "src/index.ts").unwrap();
        assert_eq!(resolved.name, "HelloWorld");
        assert_eq!(resolved.path, "src/index.ts");
    }

    #[test]
    fn test_resolve_path() {
        let resolved = resolve("src/HelloWorld.ts", "src/{{ name }}.ts").unwrap();
        assert_eq!(
            resolved,
            ResolvedName {
                name: "HelloWorld".into(),
                path: "src/HelloWorld.ts".into(),
            }
        );
    }

    #[test]
    fn test_resolve_path_with_leading_dot() {
        let resolved = resolve("./src/HelloWorld.ts", "src/{{ name }}.ts").unwrap();
        assert_eq!(resolved.name, "HelloWorld");
        assert_eq!(resolved.path, "./src/HelloWorld.ts");
    }

    #[test]
    fn test_resolve_path_with_other_placeholders() {
        let resolved =
            resolve("src/widgets/Koala.tsx", "src/{{ kind }}/{{ name }}.tsx").unwrap();
        assert_eq!(resolved.name, "Koala");
    }

    #[test]
    fn test_resolve_path_escapes_literals() {
        assert!(matches!(
            resolve("src/HelloWorldxts", "src/{{ name }}.ts"),
            Err(Error::PathMismatch { .. })
        ));
    }

    #[test]
    fn test_resolve_mismatch() {
        match resolve("not matching", "src/{{ name }}.ts") {
            Err(Error::PathMismatch { value, template }) => {
                assert_eq!(value, "not matching");
                assert_eq!(template, "src/{{ name }}.ts");
            }
            other => panic!("expected PathMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_path_requires_single_placeholder() {
        assert!(matches!(
            resolve("src/a.ts", "src/index.ts"),
            Err(Error::AmbiguousPlaceholder { count: 0, .. })
        ));
        assert!(matches!(
            resolve("src/a/a.ts", "src/{{ name }}/{{ name }}.ts"),
            Err(Error::AmbiguousPlaceholder { count: 2, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_bare_name_round_trips(name in "[A-Za-z0-9_-]{0,16}") {
            let template = "src/{{ name }}/index.ts";
            let resolved = resolve(&name, template).unwrap();
            prop_assert_eq!(&resolved.name, &name);
            prop_assert_eq!(resolved.path, template.replacen("{{ name }}", &name, 1));
        }

        #[test]
        fn prop_rendered_path_resolves_to_name(name in "[A-Za-z0-9_-]{1,16}") {
            let template = "src/{{ name }}.ts";
            let concrete = format!("src/{}.ts", name);
            let resolved = resolve(&concrete, template).unwrap();
            prop_assert_eq!(resolved.name, name);
            prop_assert_eq!(resolved.path, concrete);
        }
    }
}
