//! Immutable expression visitor infrastructure.
//!
//! Every `visit_*` method has a default that forwards to the matching `walk_*`
//! function, so implementors only override the node kinds they care about.
//! Traversal stops as soon as a method returns [`ControlFlow::Break`].

use std::ops::ControlFlow;

use crate::ast::constant::Constant;
use crate::ast::expression::{
    BinaryOperator, Expression, Lambda, MemberAccess, MethodCall, ResourceSet, UnaryOperator,
};

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

pub(crate) use try_visit;

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

/// Immutable visitor over query expression trees.
pub trait ExpressionVisitor {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }

    fn visit_resource_set(&mut self, _set: &ResourceSet) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_call(&mut self, call: &MethodCall) -> VisitResult<Self::Break> {
        walk_call(self, call)
    }

    fn visit_lambda(&mut self, lambda: &Lambda) -> VisitResult<Self::Break> {
        walk_lambda(self, lambda)
    }

    fn visit_member(&mut self, access: &MemberAccess) -> VisitResult<Self::Break> {
        walk_member(self, access)
    }

    fn visit_binary(
        &mut self,
        _op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> VisitResult<Self::Break> {
        try_visit!(self.visit_expression(left));
        self.visit_expression(right)
    }

    fn visit_unary(&mut self, _op: UnaryOperator, operand: &Expression) -> VisitResult<Self::Break> {
        self.visit_expression(operand)
    }

    fn visit_constant(&mut self, _constant: &Constant) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_parameter(&mut self, _name: &str) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_index(&mut self, target: &Expression, index: &Expression) -> VisitResult<Self::Break> {
        try_visit!(self.visit_expression(target));
        self.visit_expression(index)
    }

    fn visit_conditional(
        &mut self,
        test: &Expression,
        if_true: &Expression,
        if_false: &Expression,
    ) -> VisitResult<Self::Break> {
        try_visit!(self.visit_expression(test));
        try_visit!(self.visit_expression(if_true));
        self.visit_expression(if_false)
    }

    fn visit_new(&mut self, members: &[Expression]) -> VisitResult<Self::Break> {
        for member in members {
            try_visit!(self.visit_expression(member));
        }
        ControlFlow::Continue(())
    }
}

/// Dispatches an expression to the matching `visit_*` method.
pub fn walk_expression<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    match expression {
        Expression::ResourceSet(set) => visitor.visit_resource_set(set),
        Expression::Call(call) => visitor.visit_call(call),
        Expression::Lambda(lambda) => visitor.visit_lambda(lambda),
        Expression::Member(access) => visitor.visit_member(access),
        Expression::Binary(op, left, right) => visitor.visit_binary(*op, left, right),
        Expression::Unary(op, operand) => visitor.visit_unary(*op, operand),
        Expression::Constant(constant) => visitor.visit_constant(constant),
        Expression::Parameter(name) => visitor.visit_parameter(name),
        Expression::Index(target, index) => visitor.visit_index(target, index),
        Expression::Conditional(test, if_true, if_false) => {
            visitor.visit_conditional(test, if_true, if_false)
        }
        Expression::New(members) => visitor.visit_new(members),
    }
}

/// Visits every call argument in order, source first.
pub fn walk_call<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    call: &MethodCall,
) -> VisitResult<V::Break> {
    for argument in &call.arguments {
        try_visit!(visitor.visit_expression(argument));
    }
    ControlFlow::Continue(())
}

pub fn walk_lambda<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    lambda: &Lambda,
) -> VisitResult<V::Break> {
    visitor.visit_expression(&lambda.body)
}

pub fn walk_member<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    access: &MemberAccess,
) -> VisitResult<V::Break> {
    match &access.receiver {
        Some(receiver) => visitor.visit_expression(receiver),
        None => ControlFlow::Continue(()),
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::{ExpressionVisitor, walk_member};
    use crate::ast::builder::{lambda, param};
    use crate::ast::expression::{Expression, MemberAccess};
    use crate::query::Query;

    #[derive(Default)]
    struct MemberCounter {
        count: usize,
    }

    impl ExpressionVisitor for MemberCounter {
        type Break = ();

        fn visit_member(&mut self, access: &MemberAccess) -> ControlFlow<Self::Break> {
            self.count += 1;
            walk_member(self, access)
        }
    }

    struct StopAtParameter;

    impl ExpressionVisitor for StopAtParameter {
        type Break = String;

        fn visit_parameter(&mut self, name: &str) -> ControlFlow<Self::Break> {
            ControlFlow::Break(name.to_string())
        }
    }

    #[test]
    fn visitor_walks_whole_pipeline() {
        let query = Query::from_resource("Customers")
            .filter(|e| e.member("Address").member("City").equal("Oslo"))
            .order_by(|e| e.member("LastName"));

        let mut visitor = MemberCounter::default();
        let flow = visitor.visit_expression(query.expression());

        assert!(matches!(flow, ControlFlow::Continue(())));
        assert_eq!(visitor.count, 3);
    }

    #[test]
    fn visitor_breaks_early() {
        let expr: Expression = lambda("row", param("row").member("Name"));
        let flow = StopAtParameter.visit_expression(&expr);
        assert_eq!(flow, ControlFlow::Break("row".to_string()));
    }
}
