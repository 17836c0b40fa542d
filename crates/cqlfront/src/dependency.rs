//! Multi-library dependency loading.
//!
//! A `parse` call is handed a set of CQL library sources with no guaranteed
//! order. Before elaboration can resolve an `include`d definition, the
//! front-end must know which libraries exist, which version of each to use
//! when an `include` omits one, and in what order to elaborate them so that
//! every dependency is already resolved by the time its dependents run.
//!
//! This happens in three phases:
//! 1. [`extract_identity`] reads each source's `library`/`include`
//!    declarations without resolving anything else.
//! 2. [`build_graph`] resolves unversioned includes to the highest
//!    lexicographic version present in the input set and detects duplicate
//!    library identifiers.
//! 3. [`topological_order`] orders libraries so each is elaborated after
//!    everything it includes, failing on a dependency cycle.

use cqlfront_ast::Library as AstLibrary;
use cqlfront_diagnostics::{ErrorType, ParsingError, Severity, CQL0120};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A library's identity: its declared name and version. An empty version
/// string denotes "unversioned" and sorts lowest when resolving an
/// `include` that omits a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryKey {
    pub name: String,
    pub version: String,
}

impl LibraryKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for LibraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}-{}", self.name, self.version)
        }
    }
}

/// Failure of the dependency-loading phase, as distinct from an
/// elaboration-time [`ParsingError`] scoped to one library.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DependencyError {
    #[error("duplicate library identifier: {0}")]
    DuplicateIdentifier(LibraryKey),
    #[error("library {from} includes unresolved library {target}")]
    UnresolvedInclude { from: LibraryKey, target: String },
    #[error("cyclic library dependency: {}", format_cycle(.0))]
    CyclicDependency(Vec<LibraryKey>),
}

fn format_cycle(cycle: &[LibraryKey]) -> String {
    cycle
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl DependencyError {
    /// Render as a library-scoped diagnostic, for callers that want to fold
    /// dependency failures into the same error bag as elaboration failures.
    pub fn to_parsing_error(&self) -> ParsingError {
        ParsingError::new(CQL0120, ErrorType::Validation, Severity::Error, self.to_string())
    }
}

struct Identity {
    key: LibraryKey,
    includes: Vec<(String, Option<String>)>,
}

/// Phase 1: extract each library's identity and raw include references.
fn extract_identity(name_hint: &str, ast: &AstLibrary) -> Identity {
    let key = match &ast.definition {
        Some(def) => LibraryKey::new(
            def.name.name.name.clone(),
            def.version.as_ref().map(|v| v.version.clone()).unwrap_or_default(),
        ),
        None => LibraryKey::new(name_hint, ""),
    };

    let includes = ast
        .includes
        .iter()
        .map(|inc| {
            (
                inc.inner.library.name.name.clone(),
                inc.inner.version.as_ref().map(|v| v.version.clone()),
            )
        })
        .collect();

    Identity { key, includes }
}

/// A directed edge from a library to one it includes, version-resolved.
struct Graph {
    /// Declared libraries, keyed by name (a CQL library name is unique
    /// within an input set; only its version varies).
    by_name: IndexMap<String, LibraryKey>,
    edges: HashMap<LibraryKey, Vec<LibraryKey>>,
}

/// Phase 2: build the include graph, resolving unversioned includes to the
/// highest lexicographic version declared in this input set.
fn build_graph(libraries: &IndexMap<String, AstLibrary>) -> Result<Graph, DependencyError> {
    let mut identities = Vec::with_capacity(libraries.len());
    for (hint, ast) in libraries {
        identities.push(extract_identity(hint, ast));
    }

    let mut by_name: IndexMap<String, LibraryKey> = IndexMap::new();
    let mut versions_by_name: HashMap<String, Vec<String>> = HashMap::new();
    for ident in &identities {
        versions_by_name
            .entry(ident.key.name.clone())
            .or_default()
            .push(ident.key.version.clone());
        if let Some(existing) = by_name.get(&ident.key.name) {
            if existing.version != ident.key.version {
                continue;
            }
            return Err(DependencyError::DuplicateIdentifier(ident.key.clone()));
        }
        by_name.insert(ident.key.name.clone(), ident.key.clone());
    }

    for versions in versions_by_name.values_mut() {
        versions.sort();
    }

    let mut edges: HashMap<LibraryKey, Vec<LibraryKey>> = HashMap::new();
    for ident in &identities {
        let mut resolved = Vec::with_capacity(ident.includes.len());
        for (target_name, target_version) in &ident.includes {
            let version = match target_version {
                Some(v) => v.clone(),
                None => versions_by_name
                    .get(target_name)
                    .and_then(|vs| vs.last())
                    .cloned()
                    .ok_or_else(|| DependencyError::UnresolvedInclude {
                        from: ident.key.clone(),
                        target: target_name.clone(),
                    })?,
            };
            let target_key = LibraryKey::new(target_name.clone(), version);
            if !by_name.contains_key(target_name) {
                return Err(DependencyError::UnresolvedInclude {
                    from: ident.key.clone(),
                    target: target_name.clone(),
                });
            }
            resolved.push(target_key);
        }
        edges.insert(ident.key.clone(), resolved);
    }

    Ok(Graph { by_name, edges })
}

/// Phase 3: topologically order libraries so each comes after everything it
/// includes. Returns the library keys in elaboration order.
fn topological_order(graph: &Graph) -> Result<Vec<LibraryKey>, DependencyError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: HashMap<LibraryKey, Mark> = graph
        .edges
        .keys()
        .map(|k| (k.clone(), Mark::Unvisited))
        .collect();
    let mut order = Vec::with_capacity(graph.edges.len());
    let mut stack: Vec<LibraryKey> = Vec::new();

    fn visit(
        key: &LibraryKey,
        graph: &Graph,
        marks: &mut HashMap<LibraryKey, Mark>,
        stack: &mut Vec<LibraryKey>,
        order: &mut Vec<LibraryKey>,
    ) -> Result<(), DependencyError> {
        match marks.get(key) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = stack.iter().position(|k| k == key).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(key.clone());
                return Err(DependencyError::CyclicDependency(cycle));
            }
            _ => {}
        }

        marks.insert(key.clone(), Mark::InProgress);
        stack.push(key.clone());

        if let Some(deps) = graph.edges.get(key) {
            for dep in deps {
                visit(dep, graph, marks, stack, order)?;
            }
        }

        stack.pop();
        marks.insert(key.clone(), Mark::Done);
        order.push(key.clone());
        Ok(())
    }

    let mut keys: Vec<LibraryKey> = graph.edges.keys().cloned().collect();
    keys.sort();
    for key in &keys {
        visit(key, graph, &mut marks, &mut stack, &mut order)?;
    }

    Ok(order)
}

/// Resolve the elaboration order for a set of libraries, keyed by the
/// caller-supplied name used to report errors before a library's own
/// `library` declaration (if any) is known.
pub fn resolve_order(
    libraries: &IndexMap<String, AstLibrary>,
) -> Result<(Vec<LibraryKey>, HashSet<LibraryKey>), DependencyError> {
    let graph = build_graph(libraries)?;
    let order = topological_order(&graph)?;
    let known: HashSet<LibraryKey> = graph.by_name.values().cloned().collect();
    Ok((order, known))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlfront_ast::{IncludeDefinition, Library, LibraryDefinition, QualifiedIdentifier, Spanned, VersionSpecifier};
    use cqlfront_diagnostics::Span;

    fn lib(name: &str, version: &str, includes: &[(&str, Option<&str>)]) -> AstLibrary {
        let mut l = Library::new();
        l.definition = Some(LibraryDefinition {
            name: QualifiedIdentifier::simple(name),
            version: if version.is_empty() {
                None
            } else {
                Some(VersionSpecifier {
                    version: version.to_string(),
                })
            },
        });
        l.includes = includes
            .iter()
            .map(|(n, v)| {
                Spanned::new(
                    IncludeDefinition {
                        library: QualifiedIdentifier::simple(*n),
                        version: v.map(|v| VersionSpecifier {
                            version: v.to_string(),
                        }),
                        alias: None,
                    },
                    Span::point(0),
                )
            })
            .collect();
        l
    }

    #[test]
    fn test_orders_dependencies_before_dependents() {
        let mut libs = IndexMap::new();
        libs.insert("A".into(), lib("A", "1.0.0", &[]));
        libs.insert("B".into(), lib("B", "1.0.0", &[("A", None)]));

        let (order, _) = resolve_order(&libs).unwrap();
        let pos_a = order.iter().position(|k| k.name == "A").unwrap();
        let pos_b = order.iter().position(|k| k.name == "B").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn test_unversioned_include_resolves_to_highest_version() {
        let mut libs = IndexMap::new();
        libs.insert("A@1".into(), lib("A", "1.0.0", &[]));
        libs.insert("A@2".into(), lib("A", "2.0.0", &[]));
        libs.insert("B".into(), lib("B", "1.0.0", &[("A", None)]));

        let graph = build_graph(&libs).unwrap();
        let b_key = LibraryKey::new("B", "1.0.0");
        let resolved = &graph.edges[&b_key];
        assert_eq!(resolved[0].version, "2.0.0");
    }

    #[test]
    fn test_detects_cycle() {
        let mut libs = IndexMap::new();
        libs.insert("A".into(), lib("A", "1.0.0", &[("B", None)]));
        libs.insert("B".into(), lib("B", "1.0.0", &[("A", None)]));

        let err = resolve_order(&libs).unwrap_err();
        assert!(matches!(err, DependencyError::CyclicDependency(_)));
    }
}
