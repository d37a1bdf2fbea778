//! Mapping-function generation: entity graph → mapping plans → Rust source.

pub mod exec;
mod macros;
pub mod order;
pub mod plan;
pub mod render;

use crate::plan::{MappingFn, MappingGenerator};
use proc_macro2::TokenStream;
use rowgraph_config_build::{Config, ConfigError, GenerateConfig};
use rowgraph_schema::{
    build::build_graphs,
    meta::{AnnotationEnvironment, StaticTypes},
    node::EntityGraphs,
    types::TypeRef,
};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;
use tracing::info;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] rowgraph_schema::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "mapping functions call each other in a cycle: {}",
        .path.iter().map(TypeRef::path).collect::<Vec<_>>().join(" -> ")
    )]
    DependencyCycle { path: Vec<TypeRef> },

    #[error("'{first}' and '{second}' both generate function '{function}'")]
    DuplicateFunction {
        function: String,
        first: TypeRef,
        second: TypeRef,
    },

    #[error("'{0}' is not a valid Rust path or identifier")]
    InvalidPath(String),

    #[error("failed to read '{path}': {source}")]
    Io { path: String, source: io::Error },
}

// generate_file
/// Build-script entry: read metadata JSON and the optional config file, and
/// return the generated source.
pub fn generate_file(
    metadata_path: impl AsRef<Path>,
    config_path: impl AsRef<Path>,
) -> Result<String, BuildError> {
    let metadata_path = metadata_path.as_ref();
    let metadata = fs::read_to_string(metadata_path).map_err(|source| BuildError::Io {
        path: metadata_path.display().to_string(),
        source,
    })?;
    let config = Config::load_or_default(config_path)?;

    generate(&metadata, &config)
}

// generate
/// Generate every mapping function for a metadata document.
pub fn generate(metadata: &str, config: &Config) -> Result<String, BuildError> {
    let env = AnnotationEnvironment::from_json(metadata)?;
    let builder = MappingBuilder::from_env(&env, config.generate.clone())?;

    Ok(builder.generate()?.to_string())
}

///
/// MappingBuilder
///
/// Holds the graph of one processing round and the options its functions
/// are generated with.
///

pub struct MappingBuilder {
    pub graphs: EntityGraphs,
    pub config: GenerateConfig,
}

impl MappingBuilder {
    #[must_use]
    pub const fn new(graphs: EntityGraphs, config: GenerateConfig) -> Self {
        Self { graphs, config }
    }

    pub fn from_env(env: &AnnotationEnvironment, config: GenerateConfig) -> Result<Self, BuildError> {
        let graphs = build_graphs(env, &StaticTypes)?;

        Ok(Self::new(graphs, config))
    }

    /// One plan per entity, callees first.
    pub fn plans(&self) -> Result<Vec<MappingFn>, BuildError> {
        MappingGenerator::new(&self.graphs, &self.config).generate_all()
    }

    /// The full generated module.
    pub fn generate(&self) -> Result<TokenStream, BuildError> {
        let plans = self.plans()?;
        let tokens = render::render_all(&plans)?;
        info!(
            entities = self.graphs.len(),
            functions = plans.len(),
            "rendered mapping functions"
        );

        Ok(tokens)
    }
}
