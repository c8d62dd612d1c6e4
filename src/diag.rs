//! Translation errors and their diagnostic rendering.
//!
//! Every failure aborts the whole translation: the query cannot be expressed
//! in the wire protocol, and no partial payload is produced. Errors implement
//! [`miette::Diagnostic`] so they can be rendered with codes and help text for
//! the query author.

use miette::{Diagnostic, Report};
use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::ExpressionKind;

/// Result alias used throughout the translator.
pub type Result<T> = std::result::Result<T, TranslateError>;

/// A query expression that cannot be translated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TranslateError {
    /// A chained call is not in the recognized operator vocabulary.
    #[error("unsupported query operator `{0}`")]
    #[diagnostic(
        code(json_query::unsupported_query_operator),
        help(
            "supported operators: Where, Select, Expand, Take, Skip, IncludeTotalCount, OrderBy, ThenBy, OrderByDescending, ThenByDescending"
        )
    )]
    UnsupportedQueryOperator(SmolStr),

    /// A node kind or operator has no filter rendering.
    #[error("`{0}` expressions cannot be rendered into a filter")]
    #[diagnostic(
        code(json_query::unsupported_operator),
        help("filters support AND/OR, comparisons against literals, NOT and member paths")
    )]
    UnsupportedOperator(ExpressionKind),

    /// A member-access receiver resolves to neither a path nor a constant.
    #[error("cannot resolve member `{member}` on a `{receiver}` receiver")]
    #[diagnostic(
        code(json_query::unsupported_member_kind),
        help("members must be read off the query parameter or off a captured value")
    )]
    UnsupportedMemberKind {
        member: SmolStr,
        receiver: ExpressionKind,
    },

    /// A `Select`/`Expand` argument is not a member path or string literal.
    #[error("`{0}` is not a valid select/expand argument")]
    #[diagnostic(
        code(json_query::unsupported_list_argument),
        help("pass member paths such as `e => e.Address.City` or path strings")
    )]
    UnsupportedListArgument(ExpressionKind),

    /// A captured object reached the filter as a final operand.
    #[error("constant of type `{0}` cannot be used as a filter value")]
    #[diagnostic(
        code(json_query::unsupported_constant_shape),
        help("compare against one of the object's primitive members instead")
    )]
    UnsupportedConstantShape(SmolStr),

    /// Reading a captured or static member failed.
    #[error("cannot read member `{member}` of `{container}`")]
    #[diagnostic(code(json_query::constant_evaluation))]
    ConstantEvaluation { container: SmolStr, member: SmolStr },

    /// A recognized operator was called with the wrong argument shape.
    #[error("malformed `{method}` call: expected {expected}")]
    #[diagnostic(code(json_query::malformed_call))]
    MalformedCall {
        method: SmolStr,
        expected: &'static str,
    },

    /// The expression nests deeper than the configured limit.
    #[error("expression nesting exceeds the limit of {0}")]
    #[diagnostic(
        code(json_query::depth_limit_exceeded),
        help("raise `TranslatorConfig::max_depth` or simplify the query")
    )]
    DepthLimitExceeded(usize),

    /// A paging argument is not an integer (strict paging only).
    #[error("`{operator}` argument `{value}` is not an integer")]
    #[diagnostic(code(json_query::invalid_paging_argument))]
    InvalidPagingArgument { operator: SmolStr, value: String },
}

impl TranslateError {
    /// Returns the stable diagnostic code of this error.
    pub fn code_str(&self) -> &'static str {
        match self {
            TranslateError::UnsupportedQueryOperator(_) => "json_query::unsupported_query_operator",
            TranslateError::UnsupportedOperator(_) => "json_query::unsupported_operator",
            TranslateError::UnsupportedMemberKind { .. } => "json_query::unsupported_member_kind",
            TranslateError::UnsupportedListArgument(_) => "json_query::unsupported_list_argument",
            TranslateError::UnsupportedConstantShape(_) => "json_query::unsupported_constant_shape",
            TranslateError::ConstantEvaluation { .. } => "json_query::constant_evaluation",
            TranslateError::MalformedCall { .. } => "json_query::malformed_call",
            TranslateError::DepthLimitExceeded(_) => "json_query::depth_limit_exceeded",
            TranslateError::InvalidPagingArgument { .. } => "json_query::invalid_paging_argument",
        }
    }
}

/// Converts a translation error into a miette report for display.
pub fn into_report(error: TranslateError) -> Report {
    Report::new(error)
}
