//! Query pipeline recognition.
//!
//! A fluent query nests its operators outside-in: the outermost call is the
//! last operator applied. The pipeline visitor recurses into each call's
//! source before applying the call itself, so operators reach the
//! [`QueryParameters`] in the order they were written.

use std::ops::ControlFlow;

use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::ast::visit::{ExpressionVisitor, try_visit, walk_expression};
use crate::ast::{
    BinaryOperator, Constant, Expression, ExpressionKind, Lambda, MemberAccess, MethodCall,
    ResourceSet, UnaryOperator,
};
use crate::diag::{Result, TranslateError};
use crate::params::QueryParameters;
use crate::translate::TranslatorConfig;
use crate::translate::list_collector::ListCollector;
use crate::translate::member_path::{MemberPathResolver, ResolvedMember};
use crate::translate::predicate::PredicateRenderer;

/// The recognized query operator vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Where,
    Select,
    Expand,
    Take,
    Skip,
    IncludeTotalCount,
    OrderBy,
    ThenBy,
    OrderByDescending,
    ThenByDescending,
}

impl QueryOperator {
    /// Every recognized operator.
    pub const ALL: [QueryOperator; 10] = [
        QueryOperator::Where,
        QueryOperator::Select,
        QueryOperator::Expand,
        QueryOperator::Take,
        QueryOperator::Skip,
        QueryOperator::IncludeTotalCount,
        QueryOperator::OrderBy,
        QueryOperator::ThenBy,
        QueryOperator::OrderByDescending,
        QueryOperator::ThenByDescending,
    ];

    /// Looks up an operator by its method name.
    pub fn from_method(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.method_name() == name)
    }

    /// Returns the method name the fluent API uses for this operator.
    pub fn method_name(self) -> &'static str {
        match self {
            QueryOperator::Where => "Where",
            QueryOperator::Select => "Select",
            QueryOperator::Expand => "Expand",
            QueryOperator::Take => "Take",
            QueryOperator::Skip => "Skip",
            QueryOperator::IncludeTotalCount => "IncludeTotalCount",
            QueryOperator::OrderBy => "OrderBy",
            QueryOperator::ThenBy => "ThenBy",
            QueryOperator::OrderByDescending => "OrderByDescending",
            QueryOperator::ThenByDescending => "ThenByDescending",
        }
    }

    fn is_descending(self) -> bool {
        matches!(
            self,
            QueryOperator::OrderByDescending | QueryOperator::ThenByDescending
        )
    }
}

/// Walks a chain of operator calls down to the resource set.
pub(crate) struct PipelineVisitor<'r, 'a> {
    resolver: &'r MemberPathResolver<'a>,
    config: &'r TranslatorConfig,
    params: QueryParameters,
    resource: Option<SmolStr>,
    depth: usize,
}

impl<'r, 'a> PipelineVisitor<'r, 'a> {
    pub(crate) fn new(resolver: &'r MemberPathResolver<'a>, config: &'r TranslatorConfig) -> Self {
        Self {
            resolver,
            config,
            params: QueryParameters::default(),
            resource: None,
            depth: 0,
        }
    }

    /// Returns the resource name and the accumulated parameters.
    pub(crate) fn finish(self) -> (Option<SmolStr>, QueryParameters) {
        (self.resource, self.params)
    }

    fn apply(&mut self, operator: QueryOperator, call: &MethodCall) -> Result<()> {
        trace!(operator = operator.method_name(), "applying query operator");
        match operator {
            QueryOperator::Where => {
                let predicate = lambda_operand(call, "a predicate lambda")?;
                let resolver = self.resolver.bind(&predicate.parameters);
                let fragment =
                    PredicateRenderer::render(&resolver, self.config.max_depth, &predicate.body)?;
                self.params.filter = Some(match self.params.filter.take() {
                    Some(previous) => previous.and(fragment),
                    None => fragment,
                });
            }
            QueryOperator::Select => {
                let paths = self.collect_paths(single_operand(call)?)?;
                self.params.select.extend(paths);
            }
            QueryOperator::Expand => {
                let paths = self.collect_paths(single_operand(call)?)?;
                self.params.expand.extend(paths);
            }
            QueryOperator::Take => {
                if let Some(take) = self.paging_argument(operator, call)? {
                    self.params.take = Some(take);
                }
            }
            QueryOperator::Skip => {
                if let Some(skip) = self.paging_argument(operator, call)? {
                    self.params.skip = Some(skip);
                }
            }
            QueryOperator::IncludeTotalCount => {
                if !call.operands().is_empty() {
                    return Err(TranslateError::MalformedCall {
                        method: call.method.clone(),
                        expected: "no arguments",
                    });
                }
                self.params.inline_count = Some(true);
            }
            QueryOperator::OrderBy
            | QueryOperator::ThenBy
            | QueryOperator::OrderByDescending
            | QueryOperator::ThenByDescending => {
                let selector = lambda_operand(call, "a key selector lambda")?;
                let resolver = self.resolver.bind(&selector.parameters);
                let paths = ListCollector::collect(&resolver, &selector.body)?;
                let descending = operator.is_descending();
                self.params
                    .order_by
                    .extend(paths.into_iter().map(|path| {
                        if descending {
                            format!("{path} DESC")
                        } else {
                            path
                        }
                    }));
            }
        }
        Ok(())
    }

    /// Collects a `Select`/`Expand` argument: a lambda over the query
    /// parameter, or a path string.
    fn collect_paths(&self, argument: &Expression) -> Result<Vec<String>> {
        let parameters = argument
            .as_lambda()
            .map(|lambda| lambda.parameters.as_slice())
            .unwrap_or_default();
        ListCollector::collect(&self.resolver.bind(parameters), argument)
    }

    /// Reads a `Take`/`Skip` count.
    ///
    /// Arguments that do not parse as an integer are skipped unless strict
    /// paging is enabled.
    fn paging_argument(&self, operator: QueryOperator, call: &MethodCall) -> Result<Option<i64>> {
        let argument = single_operand(call)?;
        let value = match self.resolver.resolve_operand(argument)? {
            Some(ResolvedMember::Value(value)) => value,
            Some(ResolvedMember::Path(path)) => Constant::String(path.into()),
            None => {
                return self.skip_paging(operator, argument.kind().to_string());
            }
        };

        let parsed = match &value {
            Constant::Integer(count) => Some(*count),
            other => other.to_string().trim().parse::<i64>().ok(),
        };
        match parsed {
            Some(count) => Ok(Some(count)),
            None => self.skip_paging(operator, value.to_string()),
        }
    }

    fn skip_paging(&self, operator: QueryOperator, value: String) -> Result<Option<i64>> {
        if self.config.strict_paging {
            return Err(TranslateError::InvalidPagingArgument {
                operator: SmolStr::new(operator.method_name()),
                value,
            });
        }
        warn!(
            operator = operator.method_name(),
            value = %value,
            "ignoring non-integer paging argument"
        );
        Ok(None)
    }

    fn unsupported(kind: ExpressionKind) -> ControlFlow<TranslateError> {
        ControlFlow::Break(TranslateError::UnsupportedOperator(kind))
    }
}

fn single_operand(call: &MethodCall) -> Result<&Expression> {
    match call.operands() {
        [operand] => Ok(operand),
        _ => Err(TranslateError::MalformedCall {
            method: call.method.clone(),
            expected: "exactly one argument",
        }),
    }
}

fn lambda_operand<'c>(call: &'c MethodCall, expected: &'static str) -> Result<&'c Lambda> {
    single_operand(call)?
        .as_lambda()
        .ok_or_else(|| TranslateError::MalformedCall {
            method: call.method.clone(),
            expected,
        })
}

impl ExpressionVisitor for PipelineVisitor<'_, '_> {
    type Break = TranslateError;

    fn visit_expression(&mut self, expression: &Expression) -> ControlFlow<Self::Break> {
        if self.depth >= self.config.max_depth {
            return ControlFlow::Break(TranslateError::DepthLimitExceeded(self.config.max_depth));
        }
        self.depth += 1;
        let flow = walk_expression(self, expression);
        self.depth -= 1;
        flow
    }

    fn visit_resource_set(&mut self, set: &ResourceSet) -> ControlFlow<Self::Break> {
        self.resource = Some(set.name.clone());
        ControlFlow::Continue(())
    }

    fn visit_call(&mut self, call: &MethodCall) -> ControlFlow<Self::Break> {
        let Some(operator) = QueryOperator::from_method(&call.method) else {
            return ControlFlow::Break(TranslateError::UnsupportedQueryOperator(
                call.method.clone(),
            ));
        };
        let Some(source) = call.source() else {
            return ControlFlow::Break(TranslateError::MalformedCall {
                method: call.method.clone(),
                expected: "a source query",
            });
        };

        // Earlier operators first, so ordering keys keep their written priority.
        try_visit!(self.visit_expression(source));

        match self.apply(operator, call) {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Expression) -> ControlFlow<Self::Break> {
        match op {
            UnaryOperator::Convert | UnaryOperator::Quote => self.visit_expression(operand),
            other => Self::unsupported(other.kind()),
        }
    }

    fn visit_lambda(&mut self, _lambda: &Lambda) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Lambda)
    }

    fn visit_member(&mut self, _access: &MemberAccess) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::MemberAccess)
    }

    fn visit_binary(
        &mut self,
        op: BinaryOperator,
        _left: &Expression,
        _right: &Expression,
    ) -> ControlFlow<Self::Break> {
        Self::unsupported(op.kind())
    }

    fn visit_constant(&mut self, _constant: &Constant) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Constant)
    }

    fn visit_parameter(&mut self, _name: &str) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Parameter)
    }

    fn visit_index(&mut self, _target: &Expression, _index: &Expression) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Index)
    }

    fn visit_conditional(
        &mut self,
        _test: &Expression,
        _if_true: &Expression,
        _if_false: &Expression,
    ) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Conditional)
    }

    fn visit_new(&mut self, _members: &[Expression]) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::New)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip() {
        for operator in QueryOperator::ALL {
            assert_eq!(QueryOperator::from_method(operator.method_name()), Some(operator));
        }
        assert_eq!(QueryOperator::from_method("Distinct"), None);
        assert_eq!(QueryOperator::from_method("where"), None);
    }

    #[test]
    fn descending_operators() {
        assert!(QueryOperator::OrderByDescending.is_descending());
        assert!(QueryOperator::ThenByDescending.is_descending());
        assert!(!QueryOperator::OrderBy.is_descending());
        assert!(!QueryOperator::ThenBy.is_descending());
    }
}
