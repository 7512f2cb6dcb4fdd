//! Template definitions stored in the config file.
//!
//! A template is either a *files* template (a list of path/content pairs), a
//! *steps* template (a list of generator steps) or an *includes* template that
//! composes other templates by reference.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use serde_value::Value as SerdeValue;

use crate::error::{Error, Result};

/// A file path/content pair, possibly containing placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Destination path, relative to the working directory
    pub path: String,

    /// File content
    pub content: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Value type of a template parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Number,
    Boolean,
}

/// An extra named value a template accepts besides `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: ParameterType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    /// Parse a raw command-line value according to the parameter type
    pub fn coerce(&self, raw: &str) -> Result<JsonValue> {
        let invalid = |reason: &str| Error::InvalidParameter {
            parameter: self.name.clone(),
            reason: format!("{} (got \"{}\")", reason, raw),
        };

        match self.kind {
            ParameterType::String => Ok(JsonValue::String(raw.to_string())),
            ParameterType::Number => {
                if let Ok(int) = raw.trim().parse::<i64>() {
                    return Ok(JsonValue::from(int));
                }
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(|| invalid("expected a number"))
            }
            ParameterType::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "" => Ok(JsonValue::Bool(true)),
                "false" | "no" | "0" => Ok(JsonValue::Bool(false)),
                _ => Err(invalid("expected true or false")),
            },
        }
    }

    /// Value used when an optional parameter is neither supplied nor defaulted
    pub fn empty_value(&self) -> JsonValue {
        match self.kind {
            ParameterType::String => JsonValue::String(String::new()),
            ParameterType::Number => JsonValue::from(0),
            ParameterType::Boolean => JsonValue::Bool(false),
        }
    }
}

/// A generator step as written in the config: its `type` plus free-form fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

/// A named, reusable template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,

    pub namespace: String,

    #[serde(default, deserialize_with = "deserialize_aliases")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<TemplateFile>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepConfig>>,
}

/// Borrowed view of what a template contains
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateBody<'a> {
    Files(&'a [TemplateFile]),
    Includes(&'a [String]),
    Steps(&'a [StepConfig]),
}

impl Template {
    /// Create a files template from a `namespace:name` id
    pub fn with_files(id: &str, files: Vec<TemplateFile>) -> Result<Self> {
        let mut template = Self::empty(id)?;
        template.files = Some(files);
        Ok(template)
    }

    /// Create an includes template from a `namespace:name` id
    pub fn with_includes(id: &str, includes: Vec<String>) -> Result<Self> {
        let mut template = Self::empty(id)?;
        template.includes = Some(includes);
        Ok(template)
    }

    fn empty(id: &str) -> Result<Self> {
        let (namespace, name) = split_id(id)?;
        Ok(Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            aliases: Vec::new(),
            description: None,
            parameters: Vec::new(),
            files: None,
            includes: None,
            steps: None,
        })
    }

    /// The fully-qualified `namespace:name` id
    pub fn id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    /// Whether `name` refers to this template by id, name or alias
    pub fn answers_to(&self, name: &str) -> bool {
        self.id() == name || self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// The template body, requiring exactly one of `files`, `includes`, `steps`
    pub fn body(&self) -> Result<TemplateBody<'_>> {
        match (&self.files, &self.includes, &self.steps) {
            (Some(files), None, None) => Ok(TemplateBody::Files(files)),
            (None, Some(includes), None) => Ok(TemplateBody::Includes(includes)),
            (None, None, Some(steps)) => Ok(TemplateBody::Steps(steps)),
            (None, None, None) => Err(Error::invalid_template(
                self.id(),
                "expected one of `files`, `includes` or `steps`",
            )),
            _ => Err(Error::invalid_template(
                self.id(),
                "only one of `files`, `includes` or `steps` may be set",
            )),
        }
    }

    /// Look up a declared parameter
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Split a `namespace:name` template id
pub fn split_id(id: &str) -> Result<(&str, &str)> {
    match id.split_once(':') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => Ok((namespace, name)),
        _ => Err(Error::config(format!(
            "Template name \"{}\" has to contain the namespace (e.g. react:component).",
            id
        ))),
    }
}

/// Deserialize aliases from either a single string or a list of strings
fn deserialize_aliases<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(s) => Ok(s),
                _ => Err(serde::de::Error::custom(
                    "Expected string or array of strings",
                )),
            })
            .collect(),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
