//! The data-model-info collaborator contract.
//!
//! The elaborator resolves property access, retrieve type checks, and the
//! age-calculation rewrite against a `ModelProvider`. This crate's
//! [`crate::registry::ModelRegistry`] is the concrete implementation backed
//! by a parsed `ModelInfo` document; callers may substitute their own.

use crate::model_info::{PropertyInfo, TypeInfo};
use async_trait::async_trait;

/// Queried by the elaborator to resolve named types, property types, and
/// retrieve/age-calculation metadata for a data model declared via `using`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Look up a named type declared by the model (e.g. `Patient`).
    async fn get_type(&self, type_name: &str) -> Result<Option<TypeInfo>, ModelProviderError>;

    /// Resolve the type of `property` on `parent`, following the type's
    /// base-type chain when the property isn't declared directly.
    async fn get_property_type(
        &self,
        parent: &str,
        property: &str,
    ) -> Result<Option<PropertyInfo>, ModelProviderError>;

    /// Whether `type_name` is a valid target for `Retrieve`.
    fn is_retrievable(&self, type_name: &str) -> bool;

    /// The primary code path of a retrievable type, used to elaborate a
    /// `Retrieve` whose code filter omits an explicit path.
    fn get_primary_code_path(&self, type_name: &str) -> Option<String>;

    /// The model's declared identifier, e.g. `"FHIR"`.
    fn model_name(&self) -> String;

    /// The model's declared version, e.g. `"4.0.1"`.
    fn model_version(&self) -> String;

    /// The canonical URL of the model, used to validate a library's `using`
    /// declaration.
    fn model_url(&self) -> String;

    /// The property path used to calculate a patient's age, e.g.
    /// `"birthDate.value"` for FHIR. `None` if the model declares no
    /// patient class.
    fn patient_birth_date_property_path(&self) -> Option<String>;
}

/// Error raised while resolving a model query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelProviderError {
    #[error("failed to parse model info: {0}")]
    ParseError(String),

    #[error("failed to read model info: {0}")]
    IoError(String),

    #[error("type not found: {0}")]
    TypeNotFound(String),
}
