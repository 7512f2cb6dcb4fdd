//! Generation plans: render a template for one or more names.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde_json::{Map, Value as JsonValue};

use crate::{
    config::ConfigFile,
    error::{Error, Result},
    generators::{Generator, GeneratorContext, Outcome, StepGenerator, StepKind},
    render::{RenderParams, Renderer},
    template::Parameter,
};

/// Options for one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory generated paths are relative to
    pub root: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Raw `key=value` parameters from the command line
    pub parameters: HashMap<String, String>,
}

impl GenerateOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            force: false,
            parameters: HashMap::new(),
        }
    }
}

/// What a generation run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub template: String,
    pub outcomes: Vec<Outcome>,
}

/// Parse a `key=value` command-line parameter
pub fn parse_parameter(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::InvalidParameter {
            parameter: raw.to_string(),
            reason: "expected key=value".to_string(),
        }),
    }
}

/// Coerce supplied values against the declared parameters.
///
/// Declared parameters get their default or an empty value of their type
/// when not supplied; undeclared values pass through as strings.
pub fn resolve_parameters(
    template: &str,
    declared: &[Parameter],
    supplied: &HashMap<String, String>,
) -> Result<Map<String, JsonValue>> {
    let mut values = Map::new();

    for parameter in declared {
        let value = match (supplied.get(&parameter.name), &parameter.default) {
            (Some(raw), _) => parameter.coerce(raw)?,
            (None, Some(default)) => parameter.coerce(default)?,
            (None, None) if parameter.required => {
                return Err(Error::MissingParameter {
                    template: template.to_string(),
                    parameter: parameter.name.clone(),
                })
            }
            (None, None) => parameter.empty_value(),
        };
        values.insert(parameter.name.clone(), value);
    }

    for (key, raw) in supplied {
        if key == "name" || key == "path" {
            return Err(Error::InvalidParameter {
                parameter: key.clone(),
                reason: "reserved for the generated name".to_string(),
            });
        }
        if !values.contains_key(key) {
            log::debug!("Parameter \"{}\" is not declared by {}", key, template);
            values.insert(key.clone(), JsonValue::String(raw.clone()));
        }
    }

    Ok(values)
}

/// Generate `template_name` once per entry of `names`.
///
/// All steps are prepared before anything is written. Steps targeting the
/// same file run in plan order; distinct files are written concurrently.
pub async fn generate(
    config: &ConfigFile,
    template_name: &str,
    names: &[String],
    options: &GenerateOptions,
) -> Result<GenerationReport> {
    let template = config
        .config
        .find_template(template_name)
        .ok_or_else(|| Error::TemplateNotFound {
            name: template_name.to_string(),
            config: config.path.display().to_string(),
        })?;
    if names.is_empty() {
        return Err(Error::config("At least one name is required."));
    }

    let id = template.id();
    let resolved = config.config.resolve(template)?;
    let values = resolve_parameters(&id, &resolved.parameters, &options.parameters)?;
    log::debug!(
        "Generating {} for {:?} ({} steps)",
        id,
        names,
        resolved.steps.len()
    );

    let context = GeneratorContext {
        renderer: Arc::new(Renderer::default()),
        root: options.root.clone(),
        force: options.force,
    };

    let mut generators: Vec<StepGenerator> = names
        .iter()
        .flat_map(|name| {
            let params = RenderParams {
                name: name.clone(),
                values: values.clone(),
            };
            let context = context.clone();
            resolved
                .steps
                .iter()
                .map(move |step| StepGenerator::new(step, params.clone(), context.clone()))
        })
        .collect();

    let failures: Vec<Error> = join_all(generators.iter_mut().map(|g| g.prepare()))
        .await
        .into_iter()
        .filter_map(|result| result.err())
        .collect();
    if !failures.is_empty() {
        return Err(Error::Preparation(failures));
    }

    check_conflicts(&generators)?;

    let mut groups: BTreeMap<String, Vec<&StepGenerator>> = BTreeMap::new();
    for generator in &generators {
        groups.entry(generator.key()).or_default().push(generator);
    }

    let outcomes = try_join_all(groups.into_values().map(|group| async move {
        let mut outcomes = Vec::with_capacity(group.len());
        for generator in group {
            outcomes.push(generator.generate().await?);
        }
        Ok::<_, Error>(outcomes)
    }))
    .await?;

    Ok(GenerationReport {
        template: id,
        outcomes: outcomes.into_iter().flatten().collect(),
    })
}

/// Reject plans where two file steps write the same path
fn check_conflicts(generators: &[StepGenerator]) -> Result<()> {
    let mut targets = HashSet::new();
    for generator in generators.iter().filter(|g| g.kind() == StepKind::File) {
        let key = generator.key();
        if !targets.insert(key.clone()) {
            return Err(Error::Conflict(key));
        }
    }
    Ok(())
}
