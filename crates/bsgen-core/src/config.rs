//! Configuration management for bsgen.
//!
//! This module defines the `BsConfig` struct holding the configured templates.
//! The configuration lives in a `.bsconfig.yaml` file that is discovered from
//! the working directory upwards, or in the home directory.
//!
//! # Examples
//!
//! ```no_run
//! use bsgen_core::config::BsConfig;
//!
//! # async fn example() -> bsgen_core::Result<()> {
//! let config = BsConfig::from_file(".bsconfig.yaml").await?;
//! if let Some(template) = config.find_template("react:component") {
//!     println!("{}", template.id());
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    generators::Step,
    template::{Parameter, Template, TemplateBody},
};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// File names searched for, in order of preference
pub const CONFIG_FILE_NAMES: [&str; 2] = [".bsconfig.yaml", ".bsconfig.yml"];

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "BSGEN_CONFIG";

/// Top-level configuration: the list of templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BsConfig {
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// A configuration together with the file it was loaded from
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub config: BsConfig,
}

/// A template with its includes flattened
#[derive(Debug, Clone, Default)]
pub struct ResolvedTemplate {
    /// Steps in plan order
    pub steps: Vec<Step>,
    /// Union of declared parameters; the first declaration of a name wins
    pub parameters: Vec<Parameter>,
}

impl BsConfig {
    /// An empty configuration
    pub fn init() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            Error::config(format!("Loading config \"{}\" failed: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check every template is well formed and ids are unique
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for template in &self.templates {
            if template.name.is_empty() || template.name.contains(':') {
                return Err(Error::invalid_template(
                    template.id(),
                    "name must be non-empty and must not contain `:`",
                ));
            }
            if template.namespace.is_empty() || template.namespace.contains(':') {
                return Err(Error::invalid_template(
                    template.id(),
                    "namespace must be non-empty and must not contain `:`",
                ));
            }
            if !ids.insert(template.id()) {
                return Err(Error::invalid_template(template.id(), "defined more than once"));
            }
            if let TemplateBody::Steps(steps) = template.body()? {
                for step in steps {
                    Step::try_from(step)?;
                }
            }
        }
        Ok(())
    }

    /// Find a template by `namespace:name`, then by name, then by alias
    pub fn find_template(&self, name: &str) -> Option<&Template> {
        self.template(name)
            .or_else(|| self.templates.iter().find(|t| t.name == name))
            .or_else(|| {
                self.templates
                    .iter()
                    .find(|t| t.aliases.iter().any(|alias| alias == name))
            })
    }

    /// Find a template by its exact `namespace:name` id
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id() == id)
    }

    /// Insert a template, replacing one with the same id. Returns whether one was replaced.
    pub fn upsert(&mut self, template: Template) -> bool {
        let id = template.id();
        match self.templates.iter_mut().find(|t| t.id() == id) {
            Some(existing) => {
                *existing = template;
                true
            }
            None => {
                self.templates.push(template);
                false
            }
        }
    }

    /// Flatten a template's includes into a single step list.
    ///
    /// Templates already reached are skipped, so shared and cyclic includes
    /// contribute their steps once.
    pub fn resolve(&self, template: &Template) -> Result<ResolvedTemplate> {
        let mut resolved = ResolvedTemplate::default();
        let mut visited = HashSet::new();
        self.collect(template, &mut visited, &mut resolved)?;
        Ok(resolved)
    }

    fn collect(
        &self,
        template: &Template,
        visited: &mut HashSet<String>,
        resolved: &mut ResolvedTemplate,
    ) -> Result<()> {
        let id = template.id();
        if !visited.insert(id.clone()) {
            log::debug!("Template {} already included, skipping", id);
            return Ok(());
        }

        for parameter in &template.parameters {
            if !resolved.parameters.iter().any(|p| p.name == parameter.name) {
                resolved.parameters.push(parameter.clone());
            }
        }

        match template.body()? {
            TemplateBody::Files(files) => {
                if files.is_empty() {
                    return Err(Error::invalid_template(id, "has no files"));
                }
                resolved
                    .steps
                    .extend(files.iter().cloned().map(Step::File));
            }
            TemplateBody::Steps(steps) => {
                if steps.is_empty() {
                    return Err(Error::invalid_template(id, "has no steps"));
                }
                for step in steps {
                    resolved.steps.push(Step::try_from(step)?);
                }
            }
            TemplateBody::Includes(includes) => {
                if includes.is_empty() {
                    return Err(Error::invalid_template(id, "includes no templates"));
                }
                for include in includes {
                    let included =
                        self.find_template(include)
                            .ok_or_else(|| Error::IncludeNotFound {
                                template: id.clone(),
                                include: include.clone(),
                            })?;
                    self.collect(included, visited, resolved)?;
                }
            }
        }
        Ok(())
    }
}

impl ConfigFile {
    /// Locate the config file, honoring `BSGEN_CONFIG`, then walking up from
    /// `start`, then falling back to the home directory.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            log::debug!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
            return Some(path);
        }

        start
            .ancestors()
            .find_map(find_in_directory)
            .or_else(|| dirs::home_dir().and_then(|home| find_in_directory(&home)))
    }

    /// Discover and load the config file
    pub async fn load(start: &Path) -> Result<Self> {
        let path = Self::discover(start).ok_or(Error::ConfigNotFound)?;
        log::debug!("Loading config {}", path.display());
        let config = BsConfig::from_file(&path).await?;
        Ok(Self { path, config })
    }

    /// Write an empty config file into `directory`
    pub async fn init(directory: &Path, force: bool) -> Result<PathBuf> {
        let path = directory.join(CONFIG_FILE_NAMES[0]);
        if !force && fs::try_exists(&path).await? {
            return Err(Error::FileExists(path));
        }
        fs::create_dir_all(directory).await?;
        BsConfig::init().save(&path).await?;
        log::info!("Config file {} created.", path.display());
        Ok(path)
    }

    /// Persist the config back to where it was loaded from
    pub async fn save(&self) -> Result<()> {
        self.config.save(&self.path).await
    }
}

fn find_in_directory(directory: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| directory.join(name))
        .find(|path| path.is_file())
}
