//! Generators: the handlers for each kind of plan step.
//!
//! A step is prepared first (rendering and validation, no writes) and
//! generated afterwards. The set of kinds is closed: [`Step`] and
//! [`StepGenerator`] have one variant per kind.

pub mod file;
pub mod line;

pub use file::FileGenerator;
pub use line::{LineGenerator, LineStep};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::{
    error::{Error, Result},
    render::{RenderParams, Renderer},
    template::{StepConfig, TemplateFile},
};

/// Kinds of steps a plan may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Create a file from a template file
    File,
    /// Insert a line into an existing file
    Line,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::File => "file",
            StepKind::Line => "line",
        }
    }
}

impl FromStr for StepKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(StepKind::File),
            "line" => Ok(StepKind::Line),
            other => Err(Error::UnsupportedStepKind(other.to_string())),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed plan step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    File(TemplateFile),
    Line(LineStep),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::File(_) => StepKind::File,
            Step::Line(_) => StepKind::Line,
        }
    }
}

impl TryFrom<&StepConfig> for Step {
    type Error = Error;

    fn try_from(config: &StepConfig) -> Result<Self> {
        let fields = JsonValue::Object(config.fields.clone());
        match config.kind.parse::<StepKind>()? {
            StepKind::File => Ok(Step::File(serde_json::from_value(fields)?)),
            StepKind::Line => Ok(Step::Line(serde_json::from_value(fields)?)),
        }
    }
}

/// Outcome of running one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(PathBuf),
    Modified(PathBuf),
    Unchanged(PathBuf),
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Created(path) | Outcome::Modified(path) | Outcome::Unchanged(path) => path,
        }
    }

    /// The same outcome with its path made relative to `root` where possible
    pub fn relative_to(&self, root: &Path) -> Outcome {
        let path = self.path().strip_prefix(root).unwrap_or(self.path()).to_path_buf();
        match self {
            Outcome::Created(_) => Outcome::Created(path),
            Outcome::Modified(_) => Outcome::Modified(path),
            Outcome::Unchanged(_) => Outcome::Unchanged(path),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(path) => write!(f, "File \"{}\" created.", path.display()),
            Outcome::Modified(path) => write!(f, "File \"{}\" modified.", path.display()),
            Outcome::Unchanged(path) => write!(f, "File \"{}\" unchanged.", path.display()),
        }
    }
}

/// Settings shared by every generator of one plan
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    pub renderer: Arc<Renderer>,
    /// Directory relative paths are written under
    pub root: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

impl GeneratorContext {
    /// Join a rendered path onto the root, treating absolute paths as local
    pub(crate) fn target(&self, rendered: &str) -> PathBuf {
        let relative = rendered.trim_start_matches('/');
        if relative.len() != rendered.len() {
            log::warn!(
                "Path \"{}\" starts with \"/\", it will be treated as a local path.",
                rendered
            );
        }
        self.root.join(relative)
    }
}

/// Handler for one step
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Target identity; steps sharing a key run sequentially
    fn key(&self) -> String;

    /// Render and validate without touching the filesystem beyond reads
    async fn prepare(&mut self) -> Result<()>;

    /// Apply the prepared step
    async fn generate(&self) -> Result<Outcome>;
}

/// One generator per step kind
#[derive(Debug)]
pub enum StepGenerator {
    File(FileGenerator),
    Line(LineGenerator),
}

impl StepGenerator {
    pub fn new(step: &Step, params: RenderParams, context: GeneratorContext) -> Self {
        match step {
            Step::File(file) => StepGenerator::File(FileGenerator::new(file.clone(), params, context)),
            Step::Line(line) => StepGenerator::Line(LineGenerator::new(line.clone(), params, context)),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            StepGenerator::File(_) => StepKind::File,
            StepGenerator::Line(_) => StepKind::Line,
        }
    }
}

impl Generator for StepGenerator {
    fn key(&self) -> String {
        match self {
            StepGenerator::File(generator) => generator.key(),
            StepGenerator::Line(generator) => generator.key(),
        }
    }

    async fn prepare(&mut self) -> Result<()> {
        match self {
            StepGenerator::File(generator) => generator.prepare().await,
            StepGenerator::Line(generator) => generator.prepare().await,
        }
    }

    async fn generate(&self) -> Result<Outcome> {
        match self {
            StepGenerator::File(generator) => generator.generate().await,
            StepGenerator::Line(generator) => generator.generate().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step_config(value: JsonValue) -> StepConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_step_kind_from_str() {
        assert_eq!("file".parse::<StepKind>().unwrap(), StepKind::File);
        assert_eq!("line".parse::<StepKind>().unwrap(), StepKind::Line);
        assert!(matches!(
            "copy".parse::<StepKind>(),
            Err(Error::UnsupportedStepKind(ref kind)) if kind == "copy"
        ));
    }

    #[test]
    fn test_step_from_config() {
        let step = Step::try_from(&step_config(json!({
            "type": "file",
            "path": "src/{{ name }}.ts",
            "content": "x",
        })))
        .unwrap();
        assert_eq!(step, Step::File(TemplateFile::new("src/{{ name }}.ts", "x")));

        let step = Step::try_from(&step_config(json!({
            "type": "line",
            "path": "src/index.ts",
            "line": "export * from './{{ name }}';",
            "beforeAll": "^// end",
        })))
        .unwrap();
        assert_eq!(step.kind(), StepKind::Line);
    }

    #[test]
    fn test_step_missing_fields() {
        let result = Step::try_from(&step_config(json!({ "type": "file", "path": "x" })));
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_outcome_relative_to() {
        let root = Path::new("/work");
        let outcome = Outcome::Modified(PathBuf::from("/work/src/index.ts"));
        assert_eq!(
            outcome.relative_to(root).to_string(),
            "File \"src/index.ts\" modified."
        );
        let outside = Outcome::Created(PathBuf::from("/tmp/a.ts"));
        assert_eq!(outside.relative_to(root), outside);
    }

    #[test]
    fn test_target_strips_leading_slash() {
        let context = GeneratorContext {
            renderer: Arc::new(Renderer::default()),
            root: PathBuf::from("/work"),
            force: false,
        };
        assert_eq!(context.target("/src/a.ts"), PathBuf::from("/work/src/a.ts"));
        assert_eq!(context.target("src/a.ts"), PathBuf::from("/work/src/a.ts"));
    }
}
