//! `file` steps: render a template file and write it out.

use std::path::PathBuf;

use tokio::fs;

use super::{Generator, GeneratorContext, Outcome};
use crate::{
    error::{Error, Result},
    render::RenderParams,
    template::TemplateFile,
};

#[derive(Debug)]
pub struct FileGenerator {
    template: TemplateFile,
    params: RenderParams,
    context: GeneratorContext,
    prepared: Option<Prepared>,
}

#[derive(Debug)]
struct Prepared {
    target: PathBuf,
    content: String,
}

impl FileGenerator {
    pub fn new(template: TemplateFile, params: RenderParams, context: GeneratorContext) -> Self {
        Self {
            template,
            params,
            context,
            prepared: None,
        }
    }
}

impl Generator for FileGenerator {
    fn key(&self) -> String {
        match &self.prepared {
            Some(prepared) => prepared.target.display().to_string(),
            None => self.template.path.clone(),
        }
    }

    async fn prepare(&mut self) -> Result<()> {
        let rendered = self
            .context
            .renderer
            .render_file(&self.template, &self.params)?;
        let target = self.context.target(&rendered.path);

        if !self.context.force && fs::try_exists(&target).await? {
            return Err(Error::FileExists(target));
        }

        log::debug!("Prepared {} -> {}", self.template.path, target.display());
        self.prepared = Some(Prepared {
            target,
            content: rendered.content,
        });
        Ok(())
    }

    async fn generate(&self) -> Result<Outcome> {
        let prepared = self.prepared.as_ref().ok_or_else(|| {
            Error::template(format!("step for {} was not prepared", self.template.path))
        })?;

        if let Some(parent) = prepared.target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&prepared.target, &prepared.content).await?;

        log::info!("File \"{}\" created.", prepared.target.display());
        Ok(Outcome::Created(prepared.target.clone()))
    }
}
