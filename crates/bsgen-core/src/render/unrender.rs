//! Reverse rendering: turn a concrete example into a template.
//!
//! Every case variant of the example's name (and of its plural, when that
//! differs) is replaced by the placeholder that renders back to it.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::{
    case::Case,
    error::Result,
    inflect,
    render::placeholder::escape_literal,
    template::TemplateFile,
};

/// Transforms tried for each name form, highest priority first.
///
/// `None` is the identity. When two transforms produce the same literal the
/// earlier one wins, so `koalaBear` becomes `{{ name }}` rather than
/// `{{ camel name }}`.
const TRANSFORMS: [Option<Case>; 10] = [
    None,
    Some(Case::Camel),
    Some(Case::Pascal),
    Some(Case::Snake),
    Some(Case::Kebab),
    Some(Case::Constant),
    Some(Case::Words),
    Some(Case::Capitalize),
    Some(Case::Lower),
    Some(Case::Upper),
];

/// One literal-to-placeholder replacement rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub literal: String,
    pub placeholder: String,
}

/// Ordered replacement rules for `name`.
///
/// Plural rules come first (only when the plural differs), then singular
/// rules. Duplicate literals keep their first rule, and the list is stably
/// sorted longest literal first so a shorter variant never pre-empts a longer
/// one starting at the same position.
pub fn substitutions(name: &str) -> Vec<Substitution> {
    let singular = inflect::singular_form(name);
    let plural = inflect::plural(name);

    let mut rules: Vec<Substitution> = Vec::new();
    if inflect::has_distinct_plural(name) {
        rules.extend(form_rules(&plural, true));
    }
    rules.extend(form_rules(&singular, false));

    let mut seen = HashSet::new();
    rules.retain(|rule| !rule.literal.is_empty() && seen.insert(rule.literal.clone()));
    rules.sort_by(|a, b| b.literal.len().cmp(&a.literal.len()));
    rules
}

fn form_rules(form: &str, plural: bool) -> impl Iterator<Item = Substitution> + '_ {
    TRANSFORMS.iter().map(move |transform| {
        let (literal, expression) = match transform {
            Some(case) => (case.apply(form), format!("{} name", case)),
            None => (form.to_string(), "name".to_string()),
        };
        let placeholder = if plural {
            format!("{{{{ plural({}) }}}}", expression)
        } else {
            format!("{{{{ {} }}}}", expression)
        };
        Substitution {
            literal,
            placeholder,
        }
    })
}

/// Compiled substitution rules for one name
#[derive(Debug, Clone)]
pub struct Unrenderer {
    pattern: Option<Regex>,
    placeholders: HashMap<String, String>,
}

impl Unrenderer {
    /// Compile the rules for `name` into a single leftmost-first alternation
    pub fn new(name: &str) -> Result<Self> {
        let rules = substitutions(name);
        if rules.is_empty() {
            return Ok(Self {
                pattern: None,
                placeholders: HashMap::new(),
            });
        }

        let alternation = rules
            .iter()
            .map(|rule| regex::escape(&rule.literal))
            .collect::<Vec<_>>()
            .join("|");
        log::debug!("Unrendering \"{}\" with {} rules", name, rules.len());

        Ok(Self {
            pattern: Some(Regex::new(&alternation)?),
            placeholders: rules
                .into_iter()
                .map(|rule| (rule.literal, rule.placeholder))
                .collect(),
        })
    }

    /// Replace every name variant in `text`.
    ///
    /// The text between replacements is escaped so that tera renders it back
    /// verbatim.
    pub fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return escape_literal(text, false);
        };

        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        for found in pattern.find_iter(text) {
            output.push_str(&escape_literal(&text[last..found.start()], true));
            match self.placeholders.get(found.as_str()) {
                Some(placeholder) => output.push_str(placeholder),
                None => output.push_str(&escape_literal(found.as_str(), true)),
            }
            last = found.end();
        }
        output.push_str(&escape_literal(&text[last..], false));
        output
    }

    /// Replace every name variant in a file's path and content
    pub fn apply_file(&self, file: &TemplateFile) -> TemplateFile {
        TemplateFile {
            path: self.apply(&file.path),
            content: self.apply(&file.content),
        }
    }
}

/// Turn a concrete file into a template parameterized by `name`
pub fn unrender_file(file: &TemplateFile, name: &str) -> Result<TemplateFile> {
    Ok(Unrenderer::new(name)?.apply_file(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_unrender_example() {
        let template = unrender_file(
            &file("src/koalaBear.ts", "const koalaBear = new KoalaBear();"),
            "koalaBear",
        )
        .unwrap();
        assert_eq!(template.path, "src/{{ name }}.ts");
        assert_eq!(template.content, "const {{ name }} = new {{ pascal name }}();");
    }

    #[test]
    fn test_unrender_all_cases() {
        let template = unrender_file(
            &file(
                "koala-bear/koala_bear.rs",
                "KOALA_BEAR koala bear koalabear KOALABEAR",
            ),
            "koalaBear",
        )
        .unwrap();
        assert_eq!(template.path, "{{ kebab name }}/{{ snake name }}.rs");
        assert_eq!(
            template.content,
            "{{ constant name }} {{ words name }} {{ lower name }} {{ upper name }}"
        );
    }

    #[test]
    fn test_unrender_plural_before_singular() {
        let template = unrender_file(
            &file(
                "src/categories/category.ts",
                "const categories: Category[] = CATEGORIES.map(toCategory);",
            ),
            "category",
        )
        .unwrap();
        assert_eq!(template.path, "src/{{ plural(name) }}/{{ name }}.ts");
        assert_eq!(
            template.content,
            "const {{ plural(name) }}: {{ pascal name }}[] = {{ plural(constant name) }}.map(to{{ pascal name }});"
        );
    }

    #[test]
    fn test_unrender_uncountable_name_uses_singular_rules_only() {
        let rules = substitutions("equipment");
        assert!(rules.iter().all(|rule| !rule.placeholder.contains("plural")));

        let template = unrender_file(&file("equipment.ts", "Equipment"), "equipment").unwrap();
        assert_eq!(template.path, "{{ name }}.ts");
        assert_eq!(template.content, "{{ pascal name }}");
    }

    #[test]
    fn test_unrender_singular_words_ending_in_s() {
        let template = unrender_file(
            &file("src/campuses/campus.ts", "class Campus {}\nclass Campuses {}\n"),
            "campus",
        )
        .unwrap();
        assert_eq!(template.path, "src/{{ plural(name) }}/{{ name }}.ts");
        assert_eq!(
            template.content,
            "class {{ pascal name }} {}\nclass {{ plural(pascal name) }} {}\n"
        );

        let rules = substitutions("canvas");
        let pascal = rules.iter().find(|r| r.literal == "Canvas").unwrap();
        assert_eq!(pascal.placeholder, "{{ plural(pascal name) }}");
    }

    #[test]
    fn test_unrender_plural_name() {
        let template = unrender_file(
            &file("categories.ts", "Category Categories"),
            "categories",
        )
        .unwrap();
        assert_eq!(template.path, "{{ plural(name) }}.ts");
        assert_eq!(
            template.content,
            "{{ pascal name }} {{ plural(pascal name) }}"
        );
    }

    #[test]
    fn test_unrender_escapes_tera_delimiters() {
        let template = unrender_file(
            &file("count.sh", "echo ${#ARGS[@]} {% x {{ y ${koalaBear}"),
            "koalaBear",
        )
        .unwrap();
        assert_eq!(
            template.content,
            r#"echo ${{ "{#" }}ARGS[@]} {{ "{%" }} x {{ "{{" }} y ${{ "{" }}{{ name }}}"#
        );
    }

    #[test]
    fn test_unrender_escapes_regex_metacharacters() {
        let template = unrender_file(&file("a.b", "a.b axb a+b"), "a.b").unwrap();
        assert_eq!(template.path, "{{ name }}");
        assert!(template.content.starts_with("{{ name }} axb"));
    }

    #[test]
    fn test_unrender_does_not_rescan_placeholders() {
        let template = unrender_file(&file("name.ts", "let name = 1;"), "name").unwrap();
        assert_eq!(template.path, "{{ name }}.ts");
        assert_eq!(template.content, "let {{ name }} = 1;");
    }

    #[test]
    fn test_unrender_leaves_other_text() {
        let template = unrender_file(&file("README.md", "# Project\n"), "koalaBear").unwrap();
        assert_eq!(template, file("README.md", "# Project\n"));
    }

    #[test]
    fn test_unrender_empty_name() {
        let template = unrender_file(&file("a.ts", "a"), "").unwrap();
        assert_eq!(template, file("a.ts", "a"));
    }

    #[test]
    fn test_substitutions_sorted_longest_first() {
        let rules = substitutions("koalaBear");
        assert!(rules
            .windows(2)
            .all(|pair| pair[0].literal.len() >= pair[1].literal.len()));

        let identity = rules.iter().find(|r| r.literal == "koalaBear").unwrap();
        assert_eq!(identity.placeholder, "{{ name }}");
        let pascal = rules.iter().find(|r| r.literal == "KoalaBear").unwrap();
        assert_eq!(pascal.placeholder, "{{ pascal name }}");
        let plural = rules.iter().find(|r| r.literal == "koala_bears").unwrap();
        assert_eq!(plural.placeholder, "{{ plural(snake name) }}");
    }

    #[test]
    fn test_short_name_collisions_pick_one_rule() {
        // snake and kebab of a single-word name are both "ab"
        let rules = substitutions("ab");
        let matching: Vec<_> = rules.iter().filter(|r| r.literal == "ab").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].placeholder, "{{ name }}");
    }
}
