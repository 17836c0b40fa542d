//! Configuration for a parse run.

use cqlfront_diagnostics::Severity;
use cqlfront_model::ModelProvider;
use std::path::PathBuf;
use std::sync::Arc;

/// Validates a unit-of-measure string against UCUM. The front-end does not
/// bundle a validator; callers wire in their own (e.g. backed by
/// `octofhir-ucum`). The default accepts every unit, since an absent
/// validator must never fail elaboration on its own.
pub trait UcumValidator: Send + Sync {
    fn is_valid_unit(&self, unit: &str) -> bool;
}

/// Accepts any unit string. Used when no validator is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveUcumValidator;

impl UcumValidator for PermissiveUcumValidator {
    fn is_valid_unit(&self, _unit: &str) -> bool {
        true
    }
}

/// Configuration governing a single `parse` invocation: which data model
/// collaborator to resolve `using` declarations against, how strictly to
/// treat unsupported constructs, and where to look up `include`d libraries
/// that are not supplied directly in the input set.
#[derive(Clone)]
pub struct ParseConfig {
    /// Resolves `using` declarations and property/retrieve type queries.
    /// `None` means no data model is registered; any `using` declaration
    /// then fails elaboration with an `Unsupported` diagnostic.
    pub model_provider: Option<Arc<dyn ModelProvider>>,
    /// Validates `Quantity` literal units. Defaults to a permissive
    /// validator that accepts anything.
    pub ucum_validator: Arc<dyn UcumValidator>,
    /// Severity assigned to constructs the elaborator recognizes but does
    /// not implement (e.g. a context other than `Patient`). Defaults to
    /// `Error`, failing the library; set to `Warning` to elaborate best-effort.
    pub unsupported_severity: Severity,
    /// Directories searched for an `include`d library's source when it is
    /// not present in the set of libraries passed to `parse`, mirroring a
    /// `CQL_LIBRARY_PATH`-style search path.
    pub library_search_paths: Vec<PathBuf>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            model_provider: None,
            ucum_validator: Arc::new(PermissiveUcumValidator),
            unsupported_severity: Severity::Error,
            library_search_paths: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseConfig")
            .field("model_provider", &self.model_provider.is_some())
            .field("unsupported_severity", &self.unsupported_severity)
            .field("library_search_paths", &self.library_search_paths)
            .finish()
    }
}
