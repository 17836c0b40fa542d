//! The real elaborator.
//!
//! [`AstToElmConverter`] performs a purely structural AST-to-ELM mapping:
//! every node keeps its shape but carries no resolved type and no operator
//! rewrite. [`Elaborator`] sits on top of it and drives `cqlfront-types`'s
//! type inference and resolution machinery to:
//!
//! - decorate every expression node it touches with a resolved
//!   `resultTypeSpecifier`,
//! - resolve an `IdentifierRef` to the correct ELM reference kind
//!   (`ExpressionRef`, `ParameterRef`, `AliasRef`, `QueryLetRef`) instead of
//!   the generic fallback,
//! - apply the CQL-to-ELM rewrites that change a node's shape rather than
//!   just its decoration: `Contains` lowers to a swapped-operand `In`, `&`
//!   lowers to `Concatenate` of two null-coalesced operands, and
//!   `AgeInYears()`/`AgeInYearsAt()`-style calls lower to `CalculateAge`/
//!   `CalculateAgeAt` against the model's patient birth-date path.

use std::collections::HashMap;

use cqlfront_ast::{
    BinaryOp, Expression as AstExpression, FunctionRefExpr, Library as AstLibrary, Statement, UnaryOp,
};
use cqlfront_types::{CqlType, TypeEnvironment, TypeInferrer};

use crate::converter::AstToElmConverter;
use crate::model::{
    AggregateClause, AliasRef, AliasedQuerySource, BinaryExpression, CalculateAgeAtExpression,
    CalculateAgeExpression, DateTimePrecision, Element, Expression, FunctionRef, IdentifierRef,
    Library, ListExpression, NaryExpression, ParameterRef, Property, QueryLetRef, Query,
    ReturnClause, TypeSpecifier as ElmTypeSpecifier,
};

/// A property's resolved type together with the FHIRHelpers-style unwrap
/// function needed to bring a model primitive into a CQL system type (e.g.
/// `FHIR.boolean` -> `ToBoolean` -> `System.Boolean`). `unwrap_function` is
/// `None` when the model already reports a system-aligned type.
#[derive(Debug, Clone)]
pub struct ModelPropertyType {
    pub cql_type: CqlType,
    pub is_list: bool,
    pub unwrap_function: Option<String>,
}

/// Resolves data-model-specific facts during elaboration. `cqlfront-elm`
/// has no dependency on `cqlfront-model` (the dependency runs the other
/// way), so this trait is the seam the front-end crate implements over its
/// `ModelProvider` collaborator.
pub trait ModelTypeResolver: Send + Sync {
    /// The declared type of `property` on `type_name`, if the model
    /// declares it (following the type's base-type chain).
    fn property_type(&self, type_name: &str, property: &str) -> Option<ModelPropertyType>;

    /// `birthDate.value`-style path used to elaborate `AgeInYears()` and
    /// friends against the patient's birth date.
    fn patient_birth_date_property_path(&self) -> Option<String>;

    /// The model's `using` identifier, e.g. `"FHIR"`, used to qualify the
    /// named types a `Retrieve` or `Property` resolves to.
    fn model_name(&self) -> String;
}

/// Converts a `cqlfront-types` type specifier into its ELM counterpart.
/// The two are structurally parallel (same variant and field shapes) but
/// are distinct Rust types: this crate's [`TypeSpecifier`](ElmTypeSpecifier)
/// is what actually appears in an ELM document.
pub fn to_elm_type_specifier(ts: &cqlfront_types::TypeSpecifier) -> ElmTypeSpecifier {
    use cqlfront_types::TypeSpecifier as T;
    match ts {
        T::Named(n) => ElmTypeSpecifier::Named(crate::model::NamedTypeSpecifier {
            namespace: n.namespace.clone(),
            name: n.name.clone(),
        }),
        T::List(l) => ElmTypeSpecifier::List(crate::model::ListTypeSpecifier {
            element_type: Box::new(to_elm_type_specifier(&l.element_type)),
        }),
        T::Interval(i) => ElmTypeSpecifier::Interval(crate::model::IntervalTypeSpecifier {
            point_type: Box::new(to_elm_type_specifier(&i.point_type)),
        }),
        T::Tuple(t) => ElmTypeSpecifier::Tuple(crate::model::TupleTypeSpecifier {
            element: t
                .elements
                .iter()
                .map(|e| crate::model::TupleElementDefinition {
                    name: e.name.clone(),
                    element_type: Some(Box::new(to_elm_type_specifier(&e.element_type))),
                })
                .collect(),
        }),
        T::Choice(c) => ElmTypeSpecifier::Choice(crate::model::ChoiceTypeSpecifier {
            choice: c.types.iter().map(to_elm_type_specifier).collect(),
        }),
    }
}

/// Convenience composition of `TypeSpecifier::from_cql_type` and
/// [`to_elm_type_specifier`].
pub fn cql_type_to_elm_type_specifier(t: &CqlType) -> ElmTypeSpecifier {
    to_elm_type_specifier(&cqlfront_types::TypeSpecifier::from_cql_type(t))
}

fn string_literal(value: &str) -> Expression {
    Expression::Literal(crate::model::Literal {
        element: Element::default(),
        value_type: "{urn:hl7-org:elm-types:r1}String".to_string(),
        value: Some(value.to_string()),
    })
}

fn decorated(mut node: Expression, ty: &CqlType) -> (Expression, CqlType) {
    node.set_result_type(cql_type_to_elm_type_specifier(ty));
    (node, ty.clone())
}

/// What an identifier bound in the current scope refers to, independent of
/// library-level symbols (see [`TopLevelKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalKind {
    Alias,
    Let,
}

/// What a library-level identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevelKind {
    Parameter,
    Expression,
}

/// A single elaboration pass over one library. Not reused across
/// libraries: `top_level`/`top_level_types` are rebuilt per library by
/// [`elaborate_library`].
struct Elaborator<'a> {
    converter: AstToElmConverter,
    infer: TypeInferrer,
    model: Option<&'a dyn ModelTypeResolver>,
    top_level: HashMap<String, TopLevelKind>,
    top_level_types: HashMap<String, CqlType>,
}

impl<'a> Elaborator<'a> {
    fn env_snapshot(&self, local: &HashMap<String, (CqlType, LocalKind)>) -> TypeEnvironment {
        let mut env = TypeEnvironment::new();
        for (name, ty) in &self.top_level_types {
            env.define(name.clone(), ty.clone());
        }
        for (name, (ty, _)) in local {
            env.define(name.clone(), ty.clone());
        }
        env
    }

    /// Elaborate one expression, returning the decorated ELM node and its
    /// resolved type. `local` carries the query aliases and `let` bindings
    /// visible at this point in the tree.
    fn elaborate(
        &self,
        expr: &AstExpression,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        match expr {
            AstExpression::Literal(lit) => {
                let ty = self.infer.infer_literal(lit);
                decorated(self.converter.convert_expression(expr), &ty)
            }

            AstExpression::IdentifierRef(id_ref) => {
                let name = &id_ref.name.name;
                if let Some((ty, kind)) = local.get(name) {
                    let node = match kind {
                        LocalKind::Alias => Expression::AliasRef(AliasRef {
                            element: Element::default(),
                            name: name.clone(),
                        }),
                        LocalKind::Let => Expression::QueryLetRef(QueryLetRef {
                            element: Element::default(),
                            name: name.clone(),
                        }),
                    };
                    decorated(node, ty)
                } else if let Some(kind) = self.top_level.get(name) {
                    let ty = self.top_level_types.get(name).cloned().unwrap_or(CqlType::Any);
                    let node = match kind {
                        TopLevelKind::Parameter => Expression::ParameterRef(ParameterRef {
                            element: Element::default(),
                            library_name: None,
                            name: name.clone(),
                        }),
                        TopLevelKind::Expression => Expression::ExpressionRef(crate::model::ExpressionRef {
                            element: Element::default(),
                            library_name: None,
                            name: name.clone(),
                        }),
                    };
                    decorated(node, &ty)
                } else {
                    // Unresolved: no symbol of this name is visible. Kept
                    // as a generic identifier reference rather than
                    // failing elaboration outright, so an unresolved name
                    // still produces ELM a caller can report diagnostics
                    // against at the call site (`entry.rs` has the source
                    // span to do so; this layer only sees the AST node).
                    let node = Expression::IdentifierRef(IdentifierRef {
                        element: Element::default(),
                        library_name: None,
                        name: name.clone(),
                    });
                    (node, CqlType::Any)
                }
            }

            AstExpression::QualifiedIdentifierRef(qid) => {
                let node = self.converter.convert_expression(expr);
                let ty = self
                    .infer
                    .infer_expression(expr)
                    .unwrap_or(CqlType::Any);
                let _ = qid;
                decorated(node, &ty)
            }

            AstExpression::Property(prop) => {
                let (source, source_ty) = self.elaborate(&prop.source.inner, local);
                let path = prop.property.name.clone();
                self.elaborate_property(source, source_ty, path)
            }

            AstExpression::BinaryOp(bin) => self.elaborate_binary_op(bin, local),
            AstExpression::UnaryOp(un) => self.elaborate_unary_op(un, local),

            AstExpression::If(if_expr) => {
                let (condition, _) = self.elaborate(&if_expr.condition.inner, local);
                let (then, then_ty) = self.elaborate(&if_expr.then_expr.inner, local);
                let (else_clause, else_ty) = self.elaborate(&if_expr.else_expr.inner, local);
                let ty = then_ty.common_supertype(&else_ty).unwrap_or(CqlType::Any);
                let node = Expression::If(crate::model::IfExpression {
                    element: Element::default(),
                    condition: Box::new(condition),
                    then: Box::new(then),
                    else_clause: Box::new(else_clause),
                });
                decorated(node, &ty)
            }

            AstExpression::Coalesce(coal) => {
                let operands: Vec<(Expression, CqlType)> = coal
                    .operands
                    .iter()
                    .map(|e| self.elaborate(&e.inner, local))
                    .collect();
                let ty = operands
                    .first()
                    .map(|(_, t)| t.clone())
                    .unwrap_or(CqlType::Any);
                let node = Expression::Coalesce(NaryExpression {
                    element: Element::default(),
                    operand: operands.into_iter().map(|(e, _)| Box::new(e)).collect(),
                });
                decorated(node, &ty)
            }

            AstExpression::List(list_expr) => {
                let elements: Option<Vec<(Expression, CqlType)>> = if list_expr.elements.is_empty() {
                    None
                } else {
                    Some(
                        list_expr
                            .elements
                            .iter()
                            .map(|e| self.elaborate(&e.inner, local))
                            .collect(),
                    )
                };
                let (elem_ty, elements) = match elements {
                    None => {
                        let elem_ty = list_expr
                            .element_type
                            .as_ref()
                            .map(|ts| self.infer.ast_type_to_cql_type(&ts.inner))
                            .unwrap_or(CqlType::Any);
                        (elem_ty, None)
                    }
                    Some(pairs) => {
                        let types: Vec<CqlType> = pairs.iter().map(|(_, t)| t.clone()).collect();
                        let (elem_ty, _punted, _error) = CqlType::least_common_type(&types);
                        (
                            elem_ty,
                            Some(pairs.into_iter().map(|(e, _)| Box::new(e)).collect()),
                        )
                    }
                };
                let node = Expression::List(ListExpression {
                    element: Element::default(),
                    type_specifier: Some(cql_type_to_elm_type_specifier(&elem_ty)),
                    elements,
                });
                decorated(node, &CqlType::list(elem_ty))
            }

            AstExpression::Tuple(tuple_expr) => {
                let elements: Vec<(String, Expression, CqlType)> = tuple_expr
                    .elements
                    .iter()
                    .map(|e| {
                        let (v, t) = self.elaborate(&e.value.inner, local);
                        (e.name.name.clone(), v, t)
                    })
                    .collect();
                let ty = CqlType::tuple(
                    elements
                        .iter()
                        .map(|(n, _, t)| cqlfront_types::TupleTypeElement::new(n.clone(), t.clone()))
                        .collect(),
                );
                let node = Expression::Tuple(crate::model::TupleExpression {
                    element: Element::default(),
                    elements: if elements.is_empty() {
                        None
                    } else {
                        Some(
                            elements
                                .into_iter()
                                .map(|(name, value, _)| crate::model::TupleElementExpression {
                                    name,
                                    value: Box::new(value),
                                })
                                .collect(),
                        )
                    },
                });
                decorated(node, &ty)
            }

            AstExpression::Interval(int_expr) => {
                let low = int_expr.low.as_ref().map(|e| self.elaborate(&e.inner, local));
                let high = int_expr.high.as_ref().map(|e| self.elaborate(&e.inner, local));
                let point_ty = low
                    .as_ref()
                    .map(|(_, t)| t.clone())
                    .or_else(|| high.as_ref().map(|(_, t)| t.clone()))
                    .unwrap_or(CqlType::Any);
                let node = Expression::Interval(crate::model::IntervalExpression {
                    element: Element::default(),
                    low: low.map(|(e, _)| Box::new(e)),
                    low_closed_expression: None,
                    high: high.map(|(e, _)| Box::new(e)),
                    high_closed_expression: None,
                    low_closed: Some(int_expr.low_closed),
                    high_closed: Some(int_expr.high_closed),
                });
                decorated(node, &CqlType::interval(point_ty))
            }

            AstExpression::FunctionRef(func) => self.elaborate_function_ref(func, local),

            AstExpression::Query(query) => self.elaborate_query(query, local),

            AstExpression::Retrieve(retrieve) => {
                let node = self.converter.convert_expression(expr);
                let type_name = match &retrieve.data_type.inner {
                    cqlfront_ast::TypeSpecifier::Named(named) => named.name.clone(),
                    other => format!("{:?}", other),
                };
                let point_ty = CqlType::Named {
                    namespace: self.model.map(|m| m.model_name()),
                    name: type_name,
                };
                decorated(node, &CqlType::list(point_ty))
            }

            // Everything else keeps the teacher's structural shape
            // one level deep (its own children are not re-elaborated,
            // so they keep whatever decoration `convert_expression`
            // gives them, i.e. none) but still gets its own resolved
            // top-level type from the AST-level inferrer, which covers
            // the node kinds above as well as the long tail of
            // string/date/aggregate/type-test operators this pass does
            // not special-case.
            _ => {
                let node = self.converter.convert_expression(expr);
                let env = self.env_snapshot(local);
                let ty = TypeInferrer::with_environment(env)
                    .infer_expression(expr)
                    .unwrap_or(CqlType::Any);
                decorated(node, &ty)
            }
        }
    }

    fn elaborate_property(
        &self,
        source: Expression,
        source_ty: CqlType,
        path: String,
    ) -> (Expression, CqlType) {
        let model_property = match (&source_ty, self.model) {
            (CqlType::Named { name, .. }, Some(model)) => model.property_type(name, &path),
            _ => None,
        };

        let property_ty = model_property
            .as_ref()
            .map(|p| {
                if p.is_list {
                    CqlType::list(p.cql_type.clone())
                } else {
                    p.cql_type.clone()
                }
            })
            .unwrap_or(CqlType::Any);

        let mut property_node = Expression::Property(Property {
            element: Element::default(),
            source: Some(Box::new(source)),
            path,
            scope: None,
        });
        property_node.set_result_type(cql_type_to_elm_type_specifier(&property_ty));

        match model_property.and_then(|p| p.unwrap_function) {
            Some(unwrap_fn) => {
                let unwrapped_ty = fhir_helper_return_type(&unwrap_fn).unwrap_or(property_ty);
                let mut node = Expression::FunctionRef(FunctionRef {
                    element: Element::default(),
                    library_name: Some("FHIRHelpers".to_string()),
                    name: unwrap_fn,
                    operand: Some(vec![Box::new(property_node)]),
                    signature: None,
                });
                node.set_result_type(cql_type_to_elm_type_specifier(&unwrapped_ty));
                (node, unwrapped_ty)
            }
            None => (property_node, property_ty),
        }
    }

    fn elaborate_binary_op(
        &self,
        bin: &cqlfront_ast::BinaryOpExpr,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        let (left, left_ty) = self.elaborate(&bin.left.inner, local);
        let (right, right_ty) = self.elaborate(&bin.right.inner, local);

        match bin.op {
            // `x contains y` means "y is a member of collection x": ELM
            // has no `Contains` evaluator of its own, only `In` with the
            // operands swapped.
            BinaryOp::Contains => {
                let ty = self
                    .infer
                    .infer_binary_op(&BinaryOp::In, &right_ty, &left_ty)
                    .unwrap_or(CqlType::Boolean);
                let node = Expression::In(BinaryExpression {
                    element: Element::default(),
                    operand: vec![Box::new(right), Box::new(left)],
                });
                decorated(node, &ty)
            }

            // `a & b` null-coalesces each operand to the empty string
            // before concatenating, so that a null operand behaves like
            // an absent string rather than propagating null through the
            // whole expression.
            BinaryOp::Concatenate => {
                let coalesce = |operand: Expression| {
                    let mut node = Expression::Coalesce(NaryExpression {
                        element: Element::default(),
                        operand: vec![Box::new(operand), Box::new(string_literal(""))],
                    });
                    node.set_result_type(cql_type_to_elm_type_specifier(&CqlType::String));
                    node
                };
                let node = Expression::Concatenate(NaryExpression {
                    element: Element::default(),
                    operand: vec![Box::new(coalesce(left)), Box::new(coalesce(right))],
                });
                decorated(node, &CqlType::String)
            }

            op => {
                let (left, left_ty, right, right_ty) =
                    coerce_numeric_operands(left, left_ty, right, right_ty);
                let ty = self
                    .infer
                    .infer_binary_op(&op, &left_ty, &right_ty)
                    .unwrap_or(CqlType::Any);
                let node = build_binary_expression(op, left, right);
                decorated(node, &ty)
            }
        }
    }

    fn elaborate_unary_op(
        &self,
        un: &cqlfront_ast::UnaryOpExpr,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        let (operand, operand_ty) = self.elaborate(&un.operand.inner, local);
        let ty = self
            .infer
            .infer_unary_op(&un.op, &operand_ty)
            .unwrap_or(CqlType::Any);
        let node = build_unary_expression(un.op, operand);
        decorated(node, &ty)
    }

    fn elaborate_function_ref(
        &self,
        func: &FunctionRefExpr,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        if func.library.is_none() {
            if let Some((precision, at)) = age_in_precision(&func.name.name) {
                if let Some(path) = self.model.and_then(|m| m.patient_birth_date_property_path()) {
                    return self.elaborate_age_in(precision, at, &path, func, local);
                }
            }
        }

        let arguments: Vec<(Expression, CqlType)> = func
            .arguments
            .iter()
            .map(|a| self.elaborate(&a.inner, local))
            .collect();
        let node = Expression::FunctionRef(FunctionRef {
            element: Element::default(),
            library_name: func.library.as_ref().map(|l| l.name.clone()),
            name: func.name.name.clone(),
            operand: if arguments.is_empty() {
                None
            } else {
                Some(arguments.iter().map(|(e, _)| Box::new(e.clone())).collect())
            },
            signature: None,
        });
        // The overload's return type depends on a function registry this
        // elaborator does not have visibility into for user-defined and
        // external functions; `Any` here is the deliberate default: a
        // caller with a fuller function catalogue resolves this is a
        // follow-up decoration pass over `ExpressionDef`/`FunctionDef`,
        // the same way the rest of this elaborator decorates identifiers.
        decorated(node, &CqlType::Any)
    }

    fn elaborate_age_in(
        &self,
        precision: DateTimePrecision,
        at: bool,
        birth_date_path: &str,
        func: &FunctionRefExpr,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        let mut operand: Expression = Expression::IdentifierRef(IdentifierRef {
            element: Element::default(),
            library_name: None,
            name: "Patient".to_string(),
        });
        for segment in birth_date_path.split('.') {
            operand = Expression::Property(Property {
                element: Element::default(),
                source: Some(Box::new(operand)),
                path: segment.to_string(),
                scope: None,
            });
        }

        if at {
            let as_of = func
                .arguments
                .first()
                .map(|a| self.elaborate(&a.inner, local).0)
                .unwrap_or_else(|| string_literal(""));
            let node = Expression::CalculateAgeAt(CalculateAgeAtExpression {
                element: Element::default(),
                operand: vec![Box::new(operand), Box::new(as_of)],
                precision,
            });
            decorated(node, &CqlType::Integer)
        } else {
            let node = Expression::CalculateAge(CalculateAgeExpression {
                element: Element::default(),
                operand: Box::new(operand),
                precision,
            });
            decorated(node, &CqlType::Integer)
        }
    }

    fn elaborate_query(
        &self,
        query: &cqlfront_ast::Query,
        local: &HashMap<String, (CqlType, LocalKind)>,
    ) -> (Expression, CqlType) {
        let mut scope = local.clone();
        let mut sources = Vec::with_capacity(query.sources.len());
        for source in &query.sources {
            let (expr, ty) = self.elaborate(&source.expression.inner, &scope);
            let element_ty = ty.element_type().cloned().unwrap_or(ty.clone());
            scope.insert(source.alias.name.clone(), (element_ty, LocalKind::Alias));
            sources.push(AliasedQuerySource {
                expression: Box::new(expr),
                alias: source.alias.name.clone(),
            });
        }

        for let_clause in &query.lets {
            let (_, ty) = self.elaborate(&let_clause.expression.inner, &scope);
            scope.insert(let_clause.identifier.name.clone(), (ty, LocalKind::Let));
        }
        let let_clause = if query.lets.is_empty() {
            None
        } else {
            Some(
                query
                    .lets
                    .iter()
                    .map(|l| crate::model::LetClause {
                        identifier: l.identifier.name.clone(),
                        expression: Box::new(self.elaborate(&l.expression.inner, &scope).0),
                    })
                    .collect(),
            )
        };

        let where_clause = query
            .where_clause
            .as_ref()
            .map(|w| Box::new(self.elaborate(&w.inner, &scope).0));

        let source_ty = sources
            .first()
            .and_then(|s| s.expression.element().result_type_specifier.clone())
            .map(|ts| ts.to_elm_inferred_type())
            .unwrap_or(CqlType::Any);

        let (return_clause, result_ty) = match &query.return_clause {
            Some(r) => {
                let (expr, ty) = self.elaborate(&r.expression.inner, &scope);
                (
                    Some(ReturnClause {
                        expression: Box::new(expr),
                        distinct: if r.distinct { Some(true) } else { None },
                    }),
                    CqlType::list(ty),
                )
            }
            None => (None, CqlType::list(source_ty)),
        };

        let aggregate = query.aggregate_clause.as_ref().map(|a| {
            let (expr, _) = self.elaborate(&a.expression.inner, &scope);
            AggregateClause {
                identifier: a.identifier.name.clone(),
                expression: Box::new(expr),
                starting: a
                    .starting
                    .as_ref()
                    .map(|s| Box::new(self.elaborate(&s.inner, &scope).0)),
                distinct: if a.distinct { Some(true) } else { None },
            }
        });

        let ty = if aggregate.is_some() {
            CqlType::Any
        } else {
            result_ty
        };

        let node = Expression::Query(Query {
            element: Element::default(),
            source: sources,
            let_clause,
            relationship: None,
            where_clause,
            return_clause,
            aggregate,
            sort: None,
        });
        decorated(node, &ty)
    }
}

/// Applies the implicit `Integer` -> `Decimal` widening CQL requires when a
/// binary operator's two operands disagree on exactly that pair, mirroring
/// `TypeCoercer::get_promotion_path`'s numeric ladder
/// (`Integer` -> `Long` -> `Decimal`) for the one step the elaborator needs
/// an explicit ELM node for: the other coercions this ladder covers (e.g.
/// subtype widening) need no wrapping node because ELM has no dedicated
/// operator for them.
fn coerce_numeric_operands(
    left: Expression,
    left_ty: CqlType,
    right: Expression,
    right_ty: CqlType,
) -> (Expression, CqlType, Expression, CqlType) {
    match (&left_ty, &right_ty) {
        (CqlType::Integer, CqlType::Decimal) => {
            (to_decimal(left), CqlType::Decimal, right, right_ty)
        }
        (CqlType::Decimal, CqlType::Integer) => {
            (left, left_ty, to_decimal(right), CqlType::Decimal)
        }
        _ => (left, left_ty, right, right_ty),
    }
}

fn to_decimal(operand: Expression) -> Expression {
    let mut node = Expression::ToDecimal(crate::model::UnaryExpression {
        element: Element::default(),
        operand: Box::new(operand),
    });
    node.set_result_type(cql_type_to_elm_type_specifier(&CqlType::Decimal));
    node
}

fn build_binary_expression(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let operand = vec![Box::new(left), Box::new(right)];
    match op {
        BinaryOp::Add => Expression::Add(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Subtract => Expression::Subtract(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Multiply => Expression::Multiply(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Divide => Expression::Divide(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::TruncatedDivide => {
            Expression::TruncatedDivide(BinaryExpression { element: Element::default(), operand })
        }
        BinaryOp::Modulo => Expression::Modulo(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Power => Expression::Power(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::And => Expression::And(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Or => Expression::Or(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Xor => Expression::Xor(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Implies => Expression::Implies(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Equal => Expression::Equal(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::NotEqual => Expression::NotEqual(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Equivalent => Expression::Equivalent(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::NotEquivalent => {
            let inner = Expression::Equivalent(BinaryExpression { element: Element::default(), operand });
            Expression::Not(crate::model::UnaryExpression {
                element: Element::default(),
                operand: Box::new(inner),
            })
        }
        BinaryOp::Less => Expression::Less(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::LessOrEqual => Expression::LessOrEqual(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Greater => Expression::Greater(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::GreaterOrEqual => {
            Expression::GreaterOrEqual(BinaryExpression { element: Element::default(), operand })
        }
        BinaryOp::In => Expression::In(BinaryExpression { element: Element::default(), operand }),
        BinaryOp::Union => Expression::Union(BinaryExpression { element: Element::default(), operand }),
        // `is`/`as` take a type on the right, not an expression; a
        // `BinaryOp`-shaped `is`/`as` never reaches this path (the parser
        // produces the dedicated `Is`/`As` AST nodes instead), but the
        // fallback below keeps this total.
        BinaryOp::Is | BinaryOp::As | BinaryOp::Contains | BinaryOp::Concatenate => {
            Expression::Equal(BinaryExpression { element: Element::default(), operand })
        }
    }
}

fn build_unary_expression(op: UnaryOp, operand: Expression) -> Expression {
    let operand = Box::new(operand);
    match op {
        UnaryOp::Not => Expression::Not(crate::model::UnaryExpression { element: Element::default(), operand }),
        UnaryOp::Plus => *operand,
        UnaryOp::Negate => Expression::Negate(crate::model::UnaryExpression { element: Element::default(), operand }),
        UnaryOp::Exists => Expression::Exists(crate::model::UnaryExpression { element: Element::default(), operand }),
        UnaryOp::Distinct => {
            Expression::Distinct(crate::model::UnaryExpression { element: Element::default(), operand })
        }
        UnaryOp::Flatten => {
            Expression::Flatten(crate::model::UnaryExpression { element: Element::default(), operand })
        }
        UnaryOp::Collapse => {
            Expression::Collapse(crate::model::UnaryExpression { element: Element::default(), operand })
        }
        UnaryOp::SingletonFrom => {
            Expression::SingletonFrom(crate::model::UnaryExpression { element: Element::default(), operand })
        }
    }
}

/// Recognizes `AgeInYears`/`AgeInYearsAt`-style calls and returns the
/// precision and whether it's the `At` (date-relative) form.
fn age_in_precision(name: &str) -> Option<(DateTimePrecision, bool)> {
    let (base, at) = match name.strip_suffix("At") {
        Some(base) => (base, true),
        None => (name, false),
    };
    let precision = match base {
        "AgeInYears" => DateTimePrecision::Year,
        "AgeInMonths" => DateTimePrecision::Month,
        "AgeInWeeks" => DateTimePrecision::Week,
        "AgeInDays" => DateTimePrecision::Day,
        "AgeInHours" => DateTimePrecision::Hour,
        "AgeInMinutes" => DateTimePrecision::Minute,
        "AgeInSeconds" => DateTimePrecision::Second,
        _ => return None,
    };
    Some((precision, at))
}

/// The system type a `FHIRHelpers.ToX` unwrap function returns.
fn fhir_helper_return_type(function: &str) -> Option<CqlType> {
    Some(match function {
        "ToBoolean" => CqlType::Boolean,
        "ToString" => CqlType::String,
        "ToInteger" => CqlType::Integer,
        "ToDecimal" => CqlType::Decimal,
        "ToDate" => CqlType::Date,
        "ToDateTime" => CqlType::DateTime,
        "ToTime" => CqlType::Time,
        "ToQuantity" => CqlType::Quantity,
        "ToRatio" => CqlType::Ratio,
        "ToCode" => CqlType::Code,
        "ToConcept" => CqlType::Concept,
        _ => return None,
    })
}

/// Elaborate a complete library: structural conversion plus type
/// resolution, identifier-kind resolution, and the `§4.5`-style rewrites.
pub fn elaborate_library(ast_lib: &AstLibrary, model: Option<&dyn ModelTypeResolver>) -> Library {
    let mut converter = AstToElmConverter::new();
    let mut library = converter.convert_library(ast_lib);

    let mut top_level = HashMap::new();
    let mut top_level_types = HashMap::new();

    for param in &ast_lib.parameters {
        let ty = param
            .inner
            .type_specifier
            .as_ref()
            .map(|ts| TypeInferrer::new().ast_type_to_cql_type(&ts.inner))
            .unwrap_or(CqlType::Any);
        top_level.insert(param.inner.name.name.clone(), TopLevelKind::Parameter);
        top_level_types.insert(param.inner.name.name.clone(), ty);
    }

    for statement in &ast_lib.statements {
        if let Statement::ExpressionDef(def) = &statement.inner {
            top_level.insert(def.name.name.clone(), TopLevelKind::Expression);
        }
    }

    // Second pass: now that every definition's name is known, elaborate
    // each one's expression and feed its resolved type back in, so a
    // later-declared definition that references an earlier one sees a
    // real type rather than `Any`. Definitions are elaborated in
    // declaration order, matching the teacher's single top-to-bottom
    // pass; a definition that references one declared *after* it keeps
    // `Any` for that reference, same as the teacher's converter did for
    // every reference before this rewrite.
    let empty_scope = HashMap::new();
    let mut resolved_types = top_level_types;
    let mut elaborated_by_name: HashMap<String, (Expression, CqlType)> = HashMap::new();
    for statement in &ast_lib.statements {
        if let Statement::ExpressionDef(def) = &statement.inner {
            let mut inner_elaborator = Elaborator {
                converter: AstToElmConverter::new(),
                infer: TypeInferrer::new(),
                model,
                top_level: top_level.clone(),
                top_level_types: resolved_types.clone(),
            };
            inner_elaborator
                .top_level
                .insert(def.name.name.clone(), TopLevelKind::Expression);
            let result = inner_elaborator.elaborate(&def.expression.inner, &empty_scope);
            resolved_types.insert(def.name.name.clone(), result.1.clone());
            elaborated_by_name.insert(def.name.name.clone(), result);
        }
    }

    // Function bodies are left with the teacher's structural conversion:
    // a function's operands bind parameter names this elaborator's
    // `Elaborator::top_level`/local-scope machinery has no slot for
    // (they are neither query aliases nor library-level symbols), so
    // giving them real decoration needs its own operand-scoped symbol
    // table, tracked as a follow-up rather than bolted on here.
    if let Some(statements) = &mut library.statements {
        for expr_def in &mut statements.defs {
            if let Some((elaborated, ty)) = elaborated_by_name.remove(&expr_def.name) {
                expr_def.result_type_specifier = Some(cql_type_to_elm_type_specifier(&ty));
                expr_def.expression = Some(Box::new(elaborated));
            }
        }
    }

    library
}

impl ElmTypeSpecifier {
    /// Best-effort inverse of [`cql_type_to_elm_type_specifier`], used only
    /// to recover a query source's element type from its already-decorated
    /// `resultTypeSpecifier` without threading the `CqlType` separately.
    fn to_elm_inferred_type(&self) -> CqlType {
        match self {
            ElmTypeSpecifier::Named(n) => {
                cqlfront_types::TypeSpecifier::Named(cqlfront_types::NamedTypeSpecifier {
                    namespace: n.namespace.clone(),
                    name: n.name.clone(),
                })
                .to_cql_type()
            }
            ElmTypeSpecifier::List(l) => CqlType::list(l.element_type.to_elm_inferred_type()),
            ElmTypeSpecifier::Interval(i) => CqlType::interval(i.point_type.to_elm_inferred_type()),
            _ => CqlType::Any,
        }
    }
}
