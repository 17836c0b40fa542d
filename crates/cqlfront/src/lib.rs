//! A Clinical Quality Language (CQL) front-end: multi-library dependency
//! loading, semantic analysis, and elaboration into the ELM model.
//!
//! This crate provides:
//! - Parsing CQL source into the concrete AST (via [`cqlfront_parser`])
//! - Multi-library dependency resolution and topological loading
//! - Reference resolution, type checking, and overload resolution
//! - Elaboration of the parse tree into a fully typed ELM [`elm::Library`]
//!
//! # Example
//!
//! ```ignore
//! use cqlfront::{parse, ParseConfig};
//!
//! let cql = r#"
//! library Example version '1.0.0'
//!
//! define InPopulation:
//!     AgeInYears() >= 18
//! "#;
//!
//! let config = ParseConfig::default();
//! let result = parse(&[("Example".to_string(), cql.to_string())], &config);
//! ```

pub use cqlfront_ast as ast;
pub use cqlfront_diagnostics as diagnostics;
pub use cqlfront_elm as elm;
pub use cqlfront_model as model;
pub use cqlfront_parser as parser;
pub use cqlfront_types as types;

pub use cqlfront_ast::{Expression, Library};
pub use cqlfront_diagnostics::{LibraryErrors, ParameterErrors, ParsingError, Result, Severity};

mod config;
mod dependency;
mod entry;
mod model_adapter;

pub use config::ParseConfig;
pub use dependency::{DependencyError, LibraryKey};
pub use entry::{parse, parse_parameters, DefKey, ParseOutcome};
pub use model_adapter::BlockingModelResolver;
