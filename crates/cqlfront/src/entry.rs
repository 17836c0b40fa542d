//! The front-end's input surface: `parse` elaborates a set of library
//! sources into ELM, `parse_parameters` resolves standalone default-value
//! expressions outside of any library (e.g. values supplied at invocation
//! time).

use crate::config::ParseConfig;
use crate::dependency::{resolve_order, DependencyError};
use crate::model_adapter::BlockingModelResolver;
use cqlfront_ast::Expression as AstExpression;
use cqlfront_diagnostics::{
    ErrorType, LibraryErrors, ParameterErrors, ParsingError, Severity, CQL0020, CQL0300,
};
use cqlfront_elm::elaborator::elaborate_library;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Identifies a parameter default-value expression to resolve, independent
/// of any particular library's symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefKey {
    pub library: String,
    pub name: String,
}

impl DefKey {
    pub fn new(library: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            name: name.into(),
        }
    }
}

/// Result of elaborating a set of libraries: the successfully elaborated
/// libraries plus, for every input library (succeeded or not), the
/// diagnostics accumulated while elaborating it.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub libraries: Vec<cqlfront_elm::Library>,
    pub diagnostics: HashMap<String, LibraryErrors>,
}

impl ParseOutcome {
    /// `true` if every input library elaborated without an `Error`-severity
    /// diagnostic.
    pub fn is_success(&self) -> bool {
        self.diagnostics.values().all(|e| !e.has_fatal())
    }
}

/// Elaborate a set of CQL library sources into ELM.
///
/// `libraries` pairs a caller-chosen name (used only to report dependency
/// errors before a library's own `library` declaration, if any, is known)
/// with its CQL source text. Libraries are resolved into a dependency order
/// via `include` declarations, then each is parsed and elaborated in turn;
/// a library with any `Error`-severity diagnostic contributes no entry to
/// [`ParseOutcome::libraries`] but is still represented in
/// [`ParseOutcome::diagnostics`].
pub fn parse(libraries: &[(String, String)], config: &ParseConfig) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut asts = IndexMap::new();

    for (name, source) in libraries {
        match cqlfront_parser::parse(source) {
            Ok(ast) => {
                asts.insert(name.clone(), ast);
            }
            Err(errors) => {
                outcome.diagnostics.insert(name.clone(), errors);
            }
        }
    }

    let order = match resolve_order(&asts) {
        Ok((order, _known)) => order,
        Err(dep_err) => {
            let err = dep_err.to_parsing_error();
            match &dep_err {
                DependencyError::DuplicateIdentifier(key) => {
                    let mut errs = LibraryErrors::new();
                    errs.push(err);
                    outcome.diagnostics.insert(key.name.clone(), errs);
                }
                DependencyError::UnresolvedInclude { from, .. } => {
                    let mut errs = LibraryErrors::new();
                    errs.push(err);
                    outcome.diagnostics.insert(from.name.clone(), errs);
                }
                DependencyError::CyclicDependency(cycle) => {
                    for key in cycle {
                        outcome
                            .diagnostics
                            .entry(key.name.clone())
                            .or_default()
                            .push(err.clone());
                    }
                }
            }
            return outcome;
        }
    };

    // Built once and reused across every library: spinning up a fresh
    // blocking runtime per library would be wasted setup for what is, in
    // every real `ModelProvider` implementation, an in-memory lookup.
    let model_resolver = config
        .model_provider
        .as_ref()
        .and_then(|provider| BlockingModelResolver::new(provider.clone()).ok());

    for key in &order {
        let Some(ast) = asts.get(&key.name) else {
            continue;
        };
        let mut errors = LibraryErrors::new();

        for using in &ast.usings {
            if config.model_provider.is_none() {
                errors.push(ParsingError::new(
                    CQL0300,
                    ErrorType::Unsupported,
                    config.unsupported_severity,
                    format!(
                        "no data model registered to resolve `using {}`",
                        using.inner.model.name
                    ),
                ));
            }
        }

        let elm_library = elaborate_library(
            ast,
            model_resolver
                .as_ref()
                .map(|r| r as &dyn cqlfront_elm::ModelTypeResolver),
        );

        outcome.diagnostics.insert(key.name.clone(), errors.clone());
        if !errors.has_fatal() {
            outcome.libraries.push(elm_library);
        }
    }

    outcome
}

/// Checks the §6.4 parameter-expression contract: a standalone parameter
/// default value must be a single literal, list selector, or interval
/// selector — not an arbitrary expression requiring a library's symbol
/// table to evaluate.
fn is_valid_parameter_shape(expr: &AstExpression) -> bool {
    matches!(
        expr,
        AstExpression::Literal(_) | AstExpression::List(_) | AstExpression::Interval(_)
    )
}

/// Resolve a set of standalone expressions (e.g. parameter default values
/// supplied independent of a library) into ELM.
///
/// Per §6.4, a standalone parameter default has no library symbol table to
/// elaborate against, so its shape is restricted: a single literal, list
/// selector, or interval selector. Anything else is rejected with
/// [`CQL0020`] rather than silently structurally converted.
pub fn parse_parameters(
    expressions: &HashMap<DefKey, String>,
) -> Result<HashMap<DefKey, cqlfront_elm::Expression>, ParameterErrors> {
    let mut resolved = HashMap::with_capacity(expressions.len());
    let mut errors = ParameterErrors::new();

    for (key, source) in expressions {
        match cqlfront_parser::parse_expression(source) {
            Ok(spanned) => {
                if is_valid_parameter_shape(&spanned.inner) {
                    let converter = cqlfront_elm::AstToElmConverter::new();
                    resolved.insert(key.clone(), converter.convert_expression(&spanned.inner));
                } else {
                    errors.push(ParsingError::new(
                        CQL0020,
                        ErrorType::Validation,
                        Severity::Error,
                        format!(
                            "{}: parameter `{}` must be a single literal, list selector, \
                             or interval selector",
                            key.library, key.name
                        ),
                    ));
                }
            }
            Err(lib_errors) => {
                fold_into(&mut errors, &key.library, lib_errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(errors)
    }
}

fn fold_into(target: &mut ParameterErrors, context: &str, errors: LibraryErrors) {
    for mut err in errors {
        err.message = format!("{context}: {}", err.message);
        target.push(err);
    }
}
