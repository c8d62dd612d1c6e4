//! Path-list collection for `Select`, `Expand` and ordering keys.

use std::ops::ControlFlow;

use crate::ast::visit::ExpressionVisitor;
use crate::ast::{
    BinaryOperator, Constant, Expression, ExpressionKind, MemberAccess, MethodCall,
    ResourceSet, UnaryOperator,
};
use crate::diag::{Result, TranslateError};
use crate::translate::member_path::{MemberPathResolver, ResolvedMember};

/// Collects member paths from a projection or navigation argument.
///
/// Accepted shapes: a member chain rooted at the lambda parameter (yielding
/// `Address.City`), a string literal (taken verbatim) and an anonymous
/// projection over either. Paths are kept in argument order, duplicates
/// included.
pub(crate) struct ListCollector<'r, 'a> {
    resolver: &'r MemberPathResolver<'a>,
    items: Vec<String>,
}

impl<'r, 'a> ListCollector<'r, 'a> {
    pub(crate) fn new(resolver: &'r MemberPathResolver<'a>) -> Self {
        Self {
            resolver,
            items: Vec::new(),
        }
    }

    /// Collects the paths named by a single argument expression.
    pub(crate) fn collect(
        resolver: &'r MemberPathResolver<'a>,
        argument: &Expression,
    ) -> Result<Vec<String>> {
        let mut collector = Self::new(resolver);
        match collector.visit_expression(argument) {
            ControlFlow::Continue(()) => Ok(collector.into_items()),
            ControlFlow::Break(error) => Err(error),
        }
    }

    pub(crate) fn into_items(self) -> Vec<String> {
        self.items
    }

    fn reject(kind: ExpressionKind) -> ControlFlow<TranslateError> {
        ControlFlow::Break(TranslateError::UnsupportedListArgument(kind))
    }
}

impl ExpressionVisitor for ListCollector<'_, '_> {
    type Break = TranslateError;

    fn visit_member(&mut self, access: &MemberAccess) -> ControlFlow<Self::Break> {
        if !access.is_parameter_rooted() {
            return Self::reject(ExpressionKind::MemberAccess);
        }
        match self.resolver.resolve(access) {
            Ok(ResolvedMember::Path(path)) => {
                self.items.push(path);
                ControlFlow::Continue(())
            }
            Ok(ResolvedMember::Value(_)) => Self::reject(ExpressionKind::MemberAccess),
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn visit_constant(&mut self, constant: &Constant) -> ControlFlow<Self::Break> {
        match constant {
            Constant::String(path) => {
                self.items.push(path.to_string());
                ControlFlow::Continue(())
            }
            _ => Self::reject(ExpressionKind::Constant),
        }
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Expression) -> ControlFlow<Self::Break> {
        match op {
            UnaryOperator::Convert | UnaryOperator::Quote => self.visit_expression(operand),
            other => Self::reject(other.kind()),
        }
    }

    fn visit_resource_set(&mut self, _set: &ResourceSet) -> ControlFlow<Self::Break> {
        Self::reject(ExpressionKind::ResourceSet)
    }

    fn visit_call(&mut self, _call: &MethodCall) -> ControlFlow<Self::Break> {
        Self::reject(ExpressionKind::Call)
    }

    fn visit_binary(
        &mut self,
        op: BinaryOperator,
        _left: &Expression,
        _right: &Expression,
    ) -> ControlFlow<Self::Break> {
        Self::reject(op.kind())
    }

    fn visit_parameter(&mut self, _name: &str) -> ControlFlow<Self::Break> {
        Self::reject(ExpressionKind::Parameter)
    }

    fn visit_index(&mut self, _target: &Expression, _index: &Expression) -> ControlFlow<Self::Break> {
        Self::reject(ExpressionKind::Index)
    }

    fn visit_conditional(
        &mut self,
        _test: &Expression,
        _if_true: &Expression,
        _if_false: &Expression,
    ) -> ControlFlow<Self::Break> {
        Self::reject(ExpressionKind::Conditional)
    }
}
