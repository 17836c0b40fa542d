//! CQL data-model-info abstraction
//!
//! This crate provides:
//! - ModelInfo abstraction for FHIR and other data models
//! - The `ModelProvider` trait the elaborator resolves property access
//!   and retrieve type checks against
//! - A concrete `ModelProvider` backed by a parsed ModelInfo document

pub mod model_info;
pub mod provider;
pub mod registry;

pub use model_info::*;
pub use provider::*;
pub use registry::*;
