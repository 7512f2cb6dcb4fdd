//! bsgen core library
//!
//! Name-case inference and bidirectional templating for the `bsgen`
//! scaffolding tool: render templates for a name, reverse-engineer templates
//! from example files, and run multi-step generation plans.

pub mod case;
pub mod config;
pub mod create;
pub mod error;
pub mod generate;
pub mod generators;
pub mod helpers;
pub mod inflect;
pub mod render;
pub mod resolver;
pub mod template;

pub use crate::{
    case::Case,
    config::{BsConfig, ConfigFile},
    create::{create, CreateOptions, CreateReport},
    error::{Error, Result},
    generate::{generate, GenerateOptions, GenerationReport},
    helpers::HelperRegistry,
    render::{RenderParams, Renderer},
    resolver::{resolve, ResolvedName},
    template::{Parameter, ParameterType, Template, TemplateFile},
};
