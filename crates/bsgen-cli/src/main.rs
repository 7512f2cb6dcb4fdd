//! bsgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core library.

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use bsgen_core::{
    config::{ConfigFile, CONFIG_FILE_NAMES},
    generate::parse_parameter,
    BsConfig, CreateOptions, GenerateOptions,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bsgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create an empty config file
    Init {
        /// Directory to create the config file in
        #[arg(long, default_value = ".")]
        directory: PathBuf,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create a template from existing files or other templates
    Create {
        /// Template id in the form namespace:name (e.g. react:component)
        template: String,
        /// File or directory to build the template from
        #[arg(long = "from-file", short = 'f')]
        from_files: Vec<PathBuf>,
        /// Existing template to include (repeatable)
        #[arg(long = "include", short = 'i')]
        includes: Vec<String>,
        /// Name to replace with placeholders (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing template with the same id
        #[arg(long)]
        force: bool,
        /// Store the files verbatim, without placeholders
        #[arg(long)]
        disable_parameters: bool,
        /// Skip files ignored by .gitignore
        #[arg(long)]
        gitignore: bool,
        /// Template description
        #[arg(long)]
        description: Option<String>,
        /// Alias for the template (repeatable)
        #[arg(long = "alias", short = 'a')]
        aliases: Vec<String>,
    },
    /// Generate files from a template for one or more names
    #[command(alias = "gen")]
    Generate {
        /// Template id, name or alias
        template: String,
        /// Names or paths to generate
        #[arg(required = true)]
        names: Vec<String>,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
        /// Template parameter as key=value (repeatable)
        #[arg(long = "param", short = 'p')]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    match cli.command {
        Commands::Init { directory, force } => {
            let path = ConfigFile::init(&cwd.join(directory), force)
                .await
                .context("Failed to initialize config")?;
            println!("Config file {} created.", path.display());
        }
        Commands::Create {
            template,
            from_files,
            includes,
            name,
            force,
            disable_parameters,
            gitignore,
            description,
            aliases,
        } => {
            let mut config_file = load_or_new(&cwd).await?;
            let options = CreateOptions {
                template,
                from_files,
                includes,
                name,
                force,
                disable_parameters,
                gitignore,
                description,
                aliases,
                root: cwd.clone(),
            };

            let report = bsgen_core::create(&mut config_file.config, &options)
                .await
                .with_context(|| format!("Failed to create template {}", options.template))?;
            config_file
                .save()
                .await
                .with_context(|| format!("Failed to save {}", config_file.path.display()))?;

            println!(
                "{} template {} in config file {}.",
                if report.overwritten { "Overwritten" } else { "Saved new" },
                report.template,
                config_file.path.display()
            );
        }
        Commands::Generate {
            template,
            names,
            force,
            params,
        } => {
            let config_file = ConfigFile::load(&cwd).await.context("Failed to load config")?;
            let parameters = params
                .iter()
                .map(|raw| parse_parameter(raw))
                .collect::<Result<HashMap<_, _>, _>>()?;
            let options = GenerateOptions {
                root: cwd.clone(),
                force,
                parameters,
            };

            let report = bsgen_core::generate(&config_file, &template, &names, &options)
                .await
                .with_context(|| format!("Failed to generate {}", template))?;
            for outcome in &report.outcomes {
                println!("{}", outcome.relative_to(&cwd));
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the discovered config, or start a new one in the working directory
async fn load_or_new(cwd: &Path) -> anyhow::Result<ConfigFile> {
    match ConfigFile::discover(cwd) {
        Some(path) if path.exists() => ConfigFile::load(cwd)
            .await
            .with_context(|| format!("Failed to load {}", path.display())),
        Some(path) => Ok(ConfigFile {
            path,
            config: BsConfig::init(),
        }),
        None => {
            tracing::debug!("No config found, creating one in {}", cwd.display());
            Ok(ConfigFile {
                path: cwd.join(CONFIG_FILE_NAMES[0]),
                config: BsConfig::init(),
            })
        }
    }
}
