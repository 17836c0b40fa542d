//! Bridges the async [`ModelProvider`] collaborator into the elaborator's
//! synchronous [`ModelTypeResolver`] seam.
//!
//! `cqlfront-elm` cannot depend on `cqlfront-model` (the dependency runs
//! the other way: this crate depends on both), so it defines
//! `ModelTypeResolver` itself and this crate supplies the implementation.
//! `ModelProvider`'s two most structural methods are `async fn`; `parse`
//! is a synchronous entry point, so resolving a property type here means
//! blocking on a dedicated runtime rather than threading `async` through
//! the whole front-end for what is, in every real implementation, an
//! in-memory lookup.

use std::sync::Arc;

use cqlfront_elm::{ModelPropertyType, ModelTypeResolver};
use cqlfront_model::ModelProvider;
use cqlfront_types::CqlType;
use tokio::runtime::Runtime;

/// Maps a FHIR-model primitive's `element_type` name to the CQL system
/// type it carries once unwrapped, and the `FHIRHelpers` function that
/// performs the unwrap. `None` means the property is already a plain
/// model/system type with no wrapper to strip (e.g. a `BackboneElement`).
fn fhir_primitive_unwrap(element_type: &str) -> Option<(CqlType, &'static str)> {
    Some(match element_type {
        "boolean" => (CqlType::Boolean, "ToBoolean"),
        "string" | "code" | "id" | "uri" | "url" | "canonical" | "markdown" | "oid" | "uuid" => {
            (CqlType::String, "ToString")
        }
        "integer" | "unsignedInt" | "positiveInt" => (CqlType::Integer, "ToInteger"),
        "decimal" => (CqlType::Decimal, "ToDecimal"),
        "date" => (CqlType::Date, "ToDate"),
        "dateTime" | "instant" => (CqlType::DateTime, "ToDateTime"),
        "time" => (CqlType::Time, "ToTime"),
        "Quantity" | "Age" | "Duration" | "Count" | "Money" | "Distance" => {
            (CqlType::Quantity, "ToQuantity")
        }
        "Ratio" => (CqlType::Ratio, "ToRatio"),
        "CodeableConcept" => (CqlType::Concept, "ToConcept"),
        "Coding" => (CqlType::Code, "ToCode"),
        _ => return None,
    })
}

/// Implements [`ModelTypeResolver`] over an `Arc<dyn ModelProvider>` by
/// blocking each async call on a private single-threaded runtime.
pub struct BlockingModelResolver {
    provider: Arc<dyn ModelProvider>,
    runtime: Runtime,
}

impl BlockingModelResolver {
    pub fn new(provider: Arc<dyn ModelProvider>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        Ok(Self { provider, runtime })
    }
}

impl ModelTypeResolver for BlockingModelResolver {
    fn property_type(&self, type_name: &str, property: &str) -> Option<ModelPropertyType> {
        let info = self
            .runtime
            .block_on(self.provider.get_property_type(type_name, property))
            .ok()??;

        let (cql_type, unwrap_function) = match fhir_primitive_unwrap(&info.element_type) {
            Some((system_type, function)) => (system_type, Some(function.to_string())),
            None => (
                CqlType::Named {
                    namespace: Some(self.provider.model_name()),
                    name: info.element_type.clone(),
                },
                None,
            ),
        };

        Some(ModelPropertyType {
            cql_type,
            is_list: info.is_list,
            unwrap_function,
        })
    }

    fn patient_birth_date_property_path(&self) -> Option<String> {
        self.provider.patient_birth_date_property_path()
    }

    fn model_name(&self) -> String {
        self.provider.model_name()
    }
}
