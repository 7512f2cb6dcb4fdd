//! `line` steps: insert a rendered line next to lines matching an anchor regex.

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::{Generator, GeneratorContext, Outcome};
use crate::{
    error::{Error, Result},
    render::RenderParams,
    template::TemplateFile,
};

/// Configuration of a `line` step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStep {
    /// Target file, may contain placeholders
    pub path: String,

    /// Line to insert, may contain placeholders
    pub line: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_last: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_last: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_all: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_all: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    First,
    Last,
    All,
}

/// Where to insert, relative to lines matching `pattern`
#[derive(Debug, Clone)]
pub struct Anchor {
    pub pattern: Regex,
    pub position: Position,
    pub occurrence: Occurrence,
}

impl LineStep {
    /// The anchor to insert at. When several are set the first of
    /// `before`, `after`, `beforeLast`, `afterLast`, `beforeAll`, `afterAll` wins.
    pub fn anchor(&self) -> Result<Anchor> {
        let candidates = [
            (&self.before, Position::Before, Occurrence::First),
            (&self.after, Position::After, Occurrence::First),
            (&self.before_last, Position::Before, Occurrence::Last),
            (&self.after_last, Position::After, Occurrence::Last),
            (&self.before_all, Position::Before, Occurrence::All),
            (&self.after_all, Position::After, Occurrence::All),
        ];

        let (pattern, position, occurrence) = candidates
            .into_iter()
            .find_map(|(pattern, position, occurrence)| {
                pattern.as_ref().map(|p| (p, position, occurrence))
            })
            .ok_or_else(|| {
                Error::template(format!(
                    "Line step for {} needs one of before, after, beforeLast, afterLast, beforeAll or afterAll.",
                    self.path
                ))
            })?;

        Ok(Anchor {
            pattern: Regex::new(pattern)?,
            position,
            occurrence,
        })
    }
}

/// Insert `line` around the lines of `content` selected by `anchor`.
///
/// Returns the new content and the number of insertions. The trailing
/// newline state and the newline style of `content` are kept.
pub fn insert_line(content: &str, line: &str, anchor: &Anchor) -> (String, usize) {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();

    let matching: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, text)| anchor.pattern.is_match(text))
        .map(|(index, _)| index)
        .collect();
    let selected: Vec<usize> = match anchor.occurrence {
        Occurrence::First => matching.first().copied().into_iter().collect(),
        Occurrence::Last => matching.last().copied().into_iter().collect(),
        Occurrence::All => matching,
    };

    if selected.is_empty() {
        return (content.to_string(), 0);
    }

    let mut output: Vec<&str> = Vec::with_capacity(lines.len() + selected.len());
    for (index, text) in lines.iter().enumerate() {
        let hit = selected.binary_search(&index).is_ok();
        if hit && anchor.position == Position::Before {
            output.push(line);
        }
        output.push(*text);
        if hit && anchor.position == Position::After {
            output.push(line);
        }
    }

    let mut result = output.join(newline);
    if trailing {
        result.push_str(newline);
    }
    (result, selected.len())
}

#[derive(Debug)]
pub struct LineGenerator {
    step: LineStep,
    params: RenderParams,
    context: GeneratorContext,
    prepared: Option<Prepared>,
}

#[derive(Debug)]
struct Prepared {
    target: PathBuf,
    line: String,
    anchor: Anchor,
}

impl LineGenerator {
    pub fn new(step: LineStep, params: RenderParams, context: GeneratorContext) -> Self {
        Self {
            step,
            params,
            context,
            prepared: None,
        }
    }
}

impl Generator for LineGenerator {
    fn key(&self) -> String {
        match &self.prepared {
            Some(prepared) => prepared.target.display().to_string(),
            None => self.step.path.clone(),
        }
    }

    async fn prepare(&mut self) -> Result<()> {
        let anchor = self.step.anchor()?;

        // path and line render together, so `name` resolves against the step path
        let rendered = self.context.renderer.render_file(
            &TemplateFile::new(self.step.path.clone(), self.step.line.clone()),
            &self.params,
        )?;
        let target = self.context.target(&rendered.path);

        if !fs::try_exists(&target).await? {
            return Err(Error::FileNotFound(target));
        }

        self.prepared = Some(Prepared {
            target,
            line: rendered.content,
            anchor,
        });
        Ok(())
    }

    async fn generate(&self) -> Result<Outcome> {
        let prepared = self.prepared.as_ref().ok_or_else(|| {
            Error::template(format!("step for {} was not prepared", self.step.path))
        })?;

        let content = fs::read_to_string(&prepared.target).await?;
        let (updated, inserted) = insert_line(&content, &prepared.line, &prepared.anchor);
        if inserted == 0 {
            log::warn!(
                "No line in \"{}\" matches /{}/, nothing inserted.",
                prepared.target.display(),
                prepared.anchor.pattern
            );
            return Ok(Outcome::Unchanged(prepared.target.clone()));
        }

        fs::write(&prepared.target, updated).await?;
        log::info!("File \"{}\" modified.", prepared.target.display());
        Ok(Outcome::Modified(prepared.target.clone()))
    }
}
