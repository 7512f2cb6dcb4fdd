//! Forward and reverse rendering of template files.
//!
//! [`Renderer::render_file`] turns a [`TemplateFile`] and a name into a concrete
//! file; [`unrender_file`] goes the other way. Rendering is pure: no
//! filesystem access happens here.

pub mod placeholder;
pub mod unrender;

pub use unrender::{substitutions, unrender_file, Substitution, Unrenderer};

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tera::{Context, Tera};

use crate::{
    error::{Error, Result},
    helpers::{HelperFilter, HelperRegistry},
    resolver::{self, ResolvedName},
    template::TemplateFile,
};

/// Values available to a template: the mandatory name plus extra parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderParams {
    /// A bare name or a concrete path matching the template path
    pub name: String,
    /// Extra named values declared by the template's parameters
    pub values: Map<String, JsonValue>,
}

impl RenderParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Map::new(),
        }
    }

    /// Add an extra parameter value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

/// Renders placeholder templates with a fixed set of helpers
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Tera instance with every helper registered as a filter
    tera: Tera,
    helpers: HelperRegistry,
}

impl Renderer {
    /// Create a renderer exposing `helpers` to templates
    pub fn new(helpers: HelperRegistry) -> Self {
        let mut tera = Tera::default();
        for (name, helper) in helpers.iter() {
            tera.register_filter(name, HelperFilter(helper));
        }
        Self { tera, helpers }
    }

    /// Render a single template string.
    ///
    /// `origin` identifies the template in errors.
    pub fn render_str(&self, origin: &str, template: &str, context: &Context) -> Result<String> {
        let translated = placeholder::translate(origin, template, &self.helpers)?;

        // Tera needs mutable access to register the one-off template
        let mut tera = self.tera.clone();
        tera.render_str(&translated, context).map_err(|e| {
            log::debug!("Rendering {} failed: {:?}", origin, e);
            let reason = error_chain(&e);
            Error::TemplateSyntax {
                path: origin.to_string(),
                expression: failing_tag(template, &translated, &reason)
                    .unwrap_or_else(|| excerpt(template)),
                reason,
            }
        })
    }

    /// Render a file's path and content.
    ///
    /// The supplied name is first resolved against the file path, so it may be
    /// either a bare name or a concrete path rendered from this template.
    pub fn render_file(&self, file: &TemplateFile, params: &RenderParams) -> Result<TemplateFile> {
        let ResolvedName { name, path } = resolver::resolve(&params.name, &file.path)?;

        let mut context = Context::new();
        for (key, value) in &params.values {
            context.insert(key.as_str(), value);
        }
        context.insert("name", &name);
        context.insert("path", &path);

        log::debug!("Rendering {} with name \"{}\"", file.path, name);
        Ok(TemplateFile {
            path: self.render_str(&file.path, &path, &context)?,
            content: self.render_str(&file.path, &file.content, &context)?,
        })
    }

    /// Turn a concrete file back into a template parameterized by `name`
    pub fn unrender_file(&self, file: &TemplateFile, name: &str) -> Result<TemplateFile> {
        unrender_file(file, name)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(HelperRegistry::standard())
    }
}

/// Position of a parse error in tera's message, as `--> line:column`
static ERROR_LOCATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"-->\s*(\d+):(\d+)").unwrap());

static MISSING_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Variable `(?P<name>[^`]+)` not found").unwrap());

static TAG_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[{%#]").unwrap());

static TERA_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}").unwrap());

/// The tag a tera error points at.
///
/// Parse errors carry a location in the translated source; render errors
/// name the missing variable, which is looked up in the original tags.
fn failing_tag(template: &str, translated: &str, reason: &str) -> Option<String> {
    if let Some(location) = ERROR_LOCATION.captures(reason) {
        let line: usize = location[1].parse().ok()?;
        let column: usize = location[2].parse().ok()?;
        let text = translated.lines().nth(line.checked_sub(1)?)?;
        let offset = text
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(text.len(), |(index, _)| index);

        let start = TAG_OPEN
            .find_iter(text)
            .take_while(|open| open.start() <= offset)
            .last()?
            .start();
        let rest = &text[start..];
        return Some(TERA_TAG.find(rest).map_or(rest, |tag| tag.as_str()).to_string());
    }

    let variable = MISSING_VARIABLE.captures(reason)?;
    let word = Regex::new(&format!(r"\b{}\b", regex::escape(&variable["name"]))).ok()?;
    TERA_TAG
        .find_iter(template)
        .find(|tag| word.is_match(tag.as_str()))
        .map(|tag| tag.as_str().to_string())
}

fn excerpt(template: &str) -> String {
    const LIMIT: usize = 200;
    if template.chars().count() > LIMIT {
        format!("{}... (truncated)", template.chars().take(LIMIT).collect::<String>())
    } else {
        template.to_string()
    }
}

fn error_chain(error: &tera::Error) -> String {
    let mut reason = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn file(path: &str, content: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_render_file() {
        let renderer = Renderer::default();
        let rendered = renderer
            .render_file(
                &file(
                    "src/{{ name }}.ts",
                    "export class {{ pascal name }} {}\nconst {{ constant name }} = '{{ kebab name }}';",
                ),
                &RenderParams::new("koalaBear"),
            )
            .unwrap();
        assert_eq!(rendered.path, "src/koalaBear.ts");
        assert_eq!(
            rendered.content,
            "export class KoalaBear {}\nconst KOALA_BEAR = 'koala-bear';"
        );
    }

    #[test]
    fn test_render_file_from_path() {
        let renderer = Renderer::default();
        let rendered = renderer
            .render_file(
                &file("src/{{ name }}.ts", "{{ words name }} at {{ path }}"),
                &RenderParams::new("src/HelloWorld.ts"),
            )
            .unwrap();
        assert_eq!(rendered.path, "src/HelloWorld.ts");
        assert_eq!(rendered.content, "hello world at src/HelloWorld.ts");
    }

    #[test]
    fn test_render_file_path_mismatch() {
        let renderer = Renderer::default();
        let result = renderer.render_file(
            &file("src/{{ name }}.ts", ""),
            &RenderParams::new("not matching"),
        );
        assert!(matches!(result, Err(Error::PathMismatch { .. })));
    }

    #[test]
    fn test_render_plural_helpers() {
        let renderer = Renderer::default();
        let rendered = renderer
            .render_file(
                &file(
                    "{{ plural(kebab name) }}/index.ts",
                    "{{ plural(name) }} {{ plural(pascal name) }} {{ plural(upper name) }}",
                ),
                &RenderParams::new("category"),
            )
            .unwrap();
        assert_eq!(rendered.path, "categories/index.ts");
        assert_eq!(rendered.content, "categories Categories CATEGORIES");
    }

    #[test]
    fn test_render_extra_parameters() {
        let renderer = Renderer::default();
        let rendered = renderer
            .render_file(
                &file(
                    "src/{{ kind }}/{{ name }}.ts",
                    "{{ pascal kind }}:{{ count }}:{% if exported %}export{% endif %}",
                ),
                &RenderParams::new("koala")
                    .with("kind", "data-model")
                    .with("count", 3)
                    .with("exported", true),
            )
            .unwrap();
        assert_eq!(rendered.path, "src/data-model/koala.ts");
        assert_eq!(rendered.content, "DataModel:3:export");
    }

    #[test]
    fn test_capitalize_keeps_rest() {
        let renderer = Renderer::default();
        let rendered = renderer
            .render_file(&file("x", "{{ capitalize name }}"), &RenderParams::new("koalaBear"))
            .unwrap();
        assert_eq!(rendered.content, "KoalaBear");
    }

    #[test]
    fn test_unknown_helper_names_file() {
        let renderer = Renderer::default();
        match renderer.render_file(&file("src/a.ts", "{{ shout name }}"), &RenderParams::new("a")) {
            Err(Error::TemplateSyntax {
                path, expression, ..
            }) => {
                assert_eq!(path, "src/a.ts");
                assert_eq!(expression, "{{ shout name }}");
            }
            other => panic!("expected TemplateSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_expression_names_tag() {
        let renderer = Renderer::default();
        let content = "const a = '{{ kebab name }}';\nlet b = {{ name | }};\nlet c = 1;\n";
        match renderer.render_file(&file("src/a.ts", content), &RenderParams::new("a")) {
            Err(Error::TemplateSyntax {
                path, expression, ..
            }) => {
                assert_eq!(path, "src/a.ts");
                assert_eq!(expression, "{{ name | }}");
            }
            other => panic!("expected TemplateSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_variable_names_tag() {
        let renderer = Renderer::default();
        let result = renderer.render_file(
            &file("x", "{{ pascal name }} {{ snake kind }}"),
            &RenderParams::new("a"),
        );
        match result {
            Err(Error::TemplateSyntax { expression, reason, .. }) => {
                assert_eq!(expression, "{{ snake kind }}");
                assert!(reason.contains("kind"));
            }
            other => panic!("expected TemplateSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_render_literal_delimiters() {
        let renderer = Renderer::default();
        let template = unrender_file(&file("run.sh", "echo ${#koala} {% koala"), "koala").unwrap();
        let rendered = renderer.render_file(&template, &RenderParams::new("panda")).unwrap();
        assert_eq!(rendered.content, "echo ${#panda} {% panda");
    }

    #[test]
    fn test_custom_registry() {
        let renderer = Renderer::new(
            HelperRegistry::empty().with("shout", |s| format!("{}!", s.to_uppercase())),
        );
        let rendered = renderer
            .render_file(&file("x", "{{ shout name }}"), &RenderParams::new("hey"))
            .unwrap();
        assert_eq!(rendered.content, "HEY!");
        assert!(renderer
            .render_file(&file("x", "{{ pascal name }}"), &RenderParams::new("hey"))
            .is_err());
    }

    fn round_trip_template() -> TemplateFile {
        file(
            "src/{{ plural(kebab name) }}/{{ name }}.ts",
            "import { {{ pascal name }} } from './{{ kebab name }}';\n\
             export const {{ constant name }}_LIST: {{ pascal name }}[] = [];\n\
             function load{{ plural(pascal name) }}() { return {{ plural(name) }}; }\n\
             // {{ words name }} / {{ upper name }} / {{ lower name }} / {{ snake name }}\n",
        )
    }

    #[test]
    fn test_render_unrender_render() {
        let renderer = Renderer::default();
        let params = RenderParams::new("koalaBear");
        let concrete = renderer.render_file(&round_trip_template(), &params).unwrap();
        let template = renderer.unrender_file(&concrete, "koalaBear").unwrap();
        let again = renderer.render_file(&template, &params).unwrap();
        assert_eq!(again, concrete);
    }

    proptest! {
        #[test]
        fn prop_render_unrender_render(
            name in prop::sample::select(vec![
                "koalaBear", "category", "box", "userProfile", "HttpRequest",
                "order_item", "equipment", "city-hall", "searchQuery",
                "campus", "canvas",
            ])
        ) {
            let renderer = Renderer::default();
            let params = RenderParams::new(name);
            let concrete = renderer.render_file(&round_trip_template(), &params).unwrap();
            let template = renderer.unrender_file(&concrete, name).unwrap();
            let again = renderer.render_file(&template, &params).unwrap();
            prop_assert_eq!(again, concrete);
        }
    }
}
