//! Fluent query construction.
//!
//! [`Query`] builds the same expression tree a query provider would receive:
//! each operator wraps the previous expression as its source argument.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::ast::builder::{call, constant, lambda, param};
use crate::ast::{Constant, Expression, ResourceSet};
use crate::diag::Result;
use crate::translate::{QueryOperator, TranslatedQuery, Translator};

const LAMBDA_PARAMETER: &str = "e";

/// A query over a named resource set.
///
/// ```
/// use json_query::Query;
///
/// let query = Query::from_resource("Customers")
///     .filter(|e| e.member("Age").greater_or_equal(21))
///     .order_by(|e| e.member("LastName"))
///     .take(10);
///
/// let translated = query.translate().unwrap();
/// assert_eq!(
///     translated.to_json(),
///     r#"{"take":10,"orderBy":["LastName"],"where":{"Age":{"ge":21}}}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    expression: Expression,
    parameters: BTreeMap<SmolStr, String>,
}

impl Query {
    /// Starts a query at the given resource set.
    pub fn from_resource(name: impl Into<SmolStr>) -> Self {
        Self {
            expression: Expression::ResourceSet(ResourceSet::new(name)),
            parameters: BTreeMap::new(),
        }
    }

    fn apply(mut self, operator: QueryOperator, operands: Vec<Expression>) -> Self {
        self.expression = self.chain(operator.method_name(), operands);
        self
    }

    fn chain(&mut self, method: &str, operands: Vec<Expression>) -> Expression {
        let source = std::mem::replace(
            &mut self.expression,
            Expression::Constant(Constant::Null),
        );
        let mut arguments = Vec::with_capacity(operands.len() + 1);
        arguments.push(source);
        arguments.extend(operands);
        call(method, arguments)
    }

    fn selector(body: impl FnOnce(Expression) -> Expression) -> Expression {
        lambda(LAMBDA_PARAMETER, body(param(LAMBDA_PARAMETER)))
    }

    /// Adds a `Where` predicate.
    pub fn filter(self, predicate: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::Where, vec![Self::selector(predicate)])
    }

    /// Adds a `Select` projection.
    pub fn select(self, projection: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::Select, vec![Self::selector(projection)])
    }

    /// Adds an `Expand` over a navigation member.
    pub fn expand(self, navigation: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::Expand, vec![Self::selector(navigation)])
    }

    /// Adds an `Expand` over a literal navigation path.
    pub fn expand_path(self, path: impl Into<SmolStr>) -> Self {
        self.apply(QueryOperator::Expand, vec![constant(path.into())])
    }

    pub fn order_by(self, key: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::OrderBy, vec![Self::selector(key)])
    }

    pub fn order_by_descending(self, key: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::OrderByDescending, vec![Self::selector(key)])
    }

    pub fn then_by(self, key: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::ThenBy, vec![Self::selector(key)])
    }

    pub fn then_by_descending(self, key: impl FnOnce(Expression) -> Expression) -> Self {
        self.apply(QueryOperator::ThenByDescending, vec![Self::selector(key)])
    }

    /// Limits the number of results.
    pub fn take(self, count: impl Into<Constant>) -> Self {
        self.apply(QueryOperator::Take, vec![constant(count)])
    }

    /// Skips leading results.
    pub fn skip(self, count: impl Into<Constant>) -> Self {
        self.apply(QueryOperator::Skip, vec![constant(count)])
    }

    /// Requests the total match count alongside the results.
    pub fn include_total_count(self) -> Self {
        self.apply(QueryOperator::IncludeTotalCount, Vec::new())
    }

    /// Appends an arbitrary method call, recognized or not.
    pub fn call(mut self, method: impl AsRef<str>, operands: Vec<Expression>) -> Self {
        self.expression = self.chain(method.as_ref(), operands);
        self
    }

    /// Adds an extra top-level payload parameter.
    pub fn with_parameter(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Translates this query with the default translator.
    pub fn translate(&self) -> Result<TranslatedQuery> {
        self.translate_with(&Translator::new())
    }

    /// Translates this query with a configured translator.
    ///
    /// Parameters set on the query override same-named translator parameters.
    pub fn translate_with(&self, translator: &Translator<'_>) -> Result<TranslatedQuery> {
        let mut translated = translator.translate(&self.expression)?;
        translated
            .parameters
            .parameters
            .extend(self.parameters.clone());
        Ok(translated)
    }
}
