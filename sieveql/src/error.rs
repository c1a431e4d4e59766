use crate::ast::PathExpr;
use thiserror::Error;

/// Failure while evaluating a predicate against an in-memory record
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("path {0} refers to a relation that is not joined")]
    UnboundPath(PathExpr),
    #[error("relation not found: {0}")]
    RelationNotFound(String),
    #[error("cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },
    #[error("{function} is not defined for {value}")]
    InvalidFunctionArgument { function: &'static str, value: String },
    #[error("invalid expression: {0}")]
    InvalidExpression(&'static str),
}

/// Custom error type for SQL generation errors
#[derive(Debug, Error, PartialEq)]
pub enum SqlGenerationError {
    #[error("Unsupported expression type: {0}")]
    UnsupportedExpression(&'static str),
    #[error("Join for {0} is declared before the join of its parent relation")]
    OrphanJoin(PathExpr),
    #[error("Path {0} refers to a relation that is not joined")]
    UnboundPath(PathExpr),
}
