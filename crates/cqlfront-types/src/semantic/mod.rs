//! Semantic Analysis for CQL
//!
//! This module provides semantic analysis for CQL including:
//! - Symbol table management
//! - Scope handling for queries
//! - Reference resolution
//! - Function overload resolution
//! - Type validation

mod symbols;
mod scope;
mod resolver;

pub use symbols::*;
pub use scope::*;
pub use resolver::*;
