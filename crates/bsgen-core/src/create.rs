//! Creating templates from existing files or from other templates.

use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use tokio::{fs, task};

use crate::{
    config::BsConfig,
    error::{Error, Result},
    render::{placeholder::escape_literal, Unrenderer},
    template::{split_id, Template, TemplateFile},
};

/// Options for one `create` run
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// `namespace:name` of the new template
    pub template: String,
    /// Files or directories to build a files template from
    pub from_files: Vec<PathBuf>,
    /// Templates to build an includes template from
    pub includes: Vec<String>,
    /// Name to replace with placeholders; defaults to each source's file stem
    pub name: Option<String>,
    /// Replace a template with the same id
    pub force: bool,
    /// Store file contents verbatim
    pub disable_parameters: bool,
    /// Skip files ignored by `.gitignore` when walking directories
    pub gitignore: bool,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    /// Directory source paths are stored relative to
    pub root: PathBuf,
}

/// What a create run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub template: String,
    pub files: usize,
    pub overwritten: bool,
}

/// Build a template and insert it into `config`. The caller saves the config.
pub async fn create(config: &mut BsConfig, options: &CreateOptions) -> Result<CreateReport> {
    split_id(&options.template)?;

    let overwritten = config.template(&options.template).is_some();
    if overwritten && !options.force {
        return Err(Error::TemplateExists(options.template.clone()));
    }

    let mut template = match (options.from_files.is_empty(), options.includes.is_empty()) {
        (false, true) => {
            let files = read_sources(options).await?;
            Template::with_files(&options.template, files)?
        }
        (true, false) => {
            for include in &options.includes {
                if config.find_template(include).is_none() {
                    return Err(Error::IncludeNotFound {
                        template: options.template.clone(),
                        include: include.clone(),
                    });
                }
            }
            Template::with_includes(&options.template, options.includes.clone())?
        }
        (false, false) => {
            return Err(Error::config(
                "Pass either --from-file or --include, not both.",
            ))
        }
        (true, true) => {
            return Err(Error::config(
                "You have to pass --from-file to read from a file or directory, or --include to combine templates.",
            ))
        }
    };
    template.description = options.description.clone();
    template.aliases = options.aliases.clone();

    let files = template.files.as_ref().map_or(0, Vec::len);
    let mut updated = config.clone();
    updated.upsert(template);
    updated.validate()?;
    *config = updated;

    Ok(CreateReport {
        template: options.template.clone(),
        files,
        overwritten,
    })
}

async fn read_sources(options: &CreateOptions) -> Result<Vec<TemplateFile>> {
    let mut files = Vec::new();

    for source in &options.from_files {
        let full = options.root.join(source);
        let metadata = fs::metadata(&full)
            .await
            .map_err(|_| Error::FileNotFound(source.clone()))?;

        let paths = if metadata.is_file() {
            vec![full.clone()]
        } else if metadata.is_dir() {
            discover_files(&full, options.gitignore).await?
        } else {
            return Err(Error::config(format!(
                "{} should be a file or a directory.",
                source.display()
            )));
        };

        let name = match &options.name {
            Some(name) => name.clone(),
            None => source_name(source)?,
        };
        let unrenderer = if options.disable_parameters {
            None
        } else {
            log::debug!("Replacing \"{}\" in {}", name, source.display());
            Some(Unrenderer::new(&name)?)
        };

        for path in paths {
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    log::warn!("Skipping {}: not a UTF-8 text file", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let file = TemplateFile::new(stored_path(&options.root, &path), content);
            files.push(match &unrenderer {
                Some(unrenderer) => unrenderer.apply_file(&file),
                None => TemplateFile::new(
                    escape_literal(&file.path, false),
                    escape_literal(&file.content, false),
                ),
            });
        }
    }

    if files.is_empty() {
        return Err(Error::invalid_template(
            options.template.clone(),
            "no files found in the given sources",
        ));
    }
    Ok(files)
}

/// The name a source stands for: the file stem, or the directory name
fn source_name(source: &Path) -> Result<String> {
    source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::config(format!(
                "Cannot derive a name from {}, pass --name.",
                source.display()
            ))
        })
}

/// Path as written into the config: relative to `root` with `/` separators
fn stored_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or_else(|_| {
        log::warn!(
            "{} is outside {}, storing it as a relative path",
            path.display(),
            root.display()
        );
        path
    });
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Recursively list the files below `dir`, sorted.
///
/// Runs on a blocking thread since the walk is synchronous.
pub async fn discover_files(dir: &Path, gitignore: bool) -> Result<Vec<PathBuf>> {
    let dir_buf = dir.to_path_buf();

    task::spawn_blocking(move || {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&dir_buf)
            .hidden(false)
            .ignore(false)
            .parents(gitignore)
            .git_ignore(gitignore)
            .git_global(gitignore)
            .git_exclude(gitignore)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| Error::config(format!("Walking directory failed: {}", e)))?;
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok::<_, Error>(files)
    })
    .await
    .map_err(|e| Error::config(format!("Directory walk panicked: {}", e)))?
}
