//! Fluent helpers for composing expression trees by hand.
//!
//! ```
//! use json_query::ast::builder::param;
//!
//! let predicate = param("e")
//!     .member("Age")
//!     .greater_or_equal(21)
//!     .and_also(param("e").member("Retired").equal(false).logical_not());
//! assert!(!predicate.is_parameter_rooted());
//! ```

use smol_str::SmolStr;

use crate::ast::constant::{CapturedObject, Constant};
use crate::ast::expression::{
    BinaryOperator, Expression, Lambda, MemberAccess, MethodCall, UnaryOperator,
};

/// Creates a lambda parameter reference.
pub fn param(name: impl Into<SmolStr>) -> Expression {
    Expression::Parameter(name.into())
}

/// Creates a constant node.
pub fn constant(value: impl Into<Constant>) -> Expression {
    Expression::Constant(value.into())
}

/// Creates a constant node wrapping a captured object.
pub fn captured(object: impl CapturedObject + 'static) -> Expression {
    Expression::Constant(Constant::object(object))
}

/// Creates a static member access (`DeclaringType.member`).
pub fn static_member(declaring_type: impl Into<SmolStr>, member: impl Into<SmolStr>) -> Expression {
    Expression::Member(MemberAccess {
        receiver: None,
        member: member.into(),
        declaring_type: Some(declaring_type.into()),
    })
}

/// Creates a quoted single-parameter lambda.
pub fn lambda(parameter: impl Into<SmolStr>, body: Expression) -> Expression {
    let lambda = Expression::Lambda(Lambda {
        parameters: vec![parameter.into()],
        body: Box::new(body),
    });
    Expression::Unary(UnaryOperator::Quote, Box::new(lambda))
}

/// Creates an anonymous projection over the given members.
pub fn new_object(members: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::New(members.into_iter().collect())
}

/// Creates a method call node.
pub fn call(method: impl Into<SmolStr>, arguments: Vec<Expression>) -> Expression {
    Expression::Call(MethodCall::new(method, arguments))
}

impl Expression {
    /// Accesses a member of this expression.
    pub fn member(self, name: impl Into<SmolStr>) -> Expression {
        Expression::Member(MemberAccess {
            receiver: Some(Box::new(self)),
            member: name.into(),
            declaring_type: None,
        })
    }

    /// Indexes into this expression.
    pub fn index(self, index: impl Into<Expression>) -> Expression {
        Expression::Index(Box::new(self), Box::new(index.into()))
    }

    /// Wraps this expression in a binary node.
    pub fn binary(self, op: BinaryOperator, rhs: impl Into<Expression>) -> Expression {
        Expression::Binary(op, Box::new(self), Box::new(rhs.into()))
    }

    pub fn equal(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::Equal, rhs)
    }

    pub fn not_equal(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::NotEqual, rhs)
    }

    pub fn less_than(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::LessThan, rhs)
    }

    pub fn less_or_equal(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::LessThanOrEqual, rhs)
    }

    pub fn greater_than(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::GreaterThan, rhs)
    }

    pub fn greater_or_equal(self, rhs: impl Into<Expression>) -> Expression {
        self.binary(BinaryOperator::GreaterThanOrEqual, rhs)
    }

    /// Short-circuit AND (`&&`).
    pub fn and_also(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::AndAlso, rhs)
    }

    /// Short-circuit OR (`||`).
    pub fn or_else(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::OrElse, rhs)
    }

    /// Non-short-circuit AND (`&`).
    pub fn and(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::And, rhs)
    }

    /// Non-short-circuit OR (`|`).
    pub fn or(self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Or, rhs)
    }

    /// Logical negation (`!`).
    pub fn logical_not(self) -> Expression {
        Expression::Unary(UnaryOperator::Not, Box::new(self))
    }

    /// Type conversion; transparent to translation.
    pub fn convert(self) -> Expression {
        Expression::Unary(UnaryOperator::Convert, Box::new(self))
    }
}

impl From<Constant> for Expression {
    fn from(value: Constant) -> Self {
        Expression::Constant(value)
    }
}

macro_rules! constant_expression_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(value: $ty) -> Self {
                    Expression::Constant(Constant::from(value))
                }
            }
        )*
    };
}

constant_expression_from!(
    bool,
    i32,
    i64,
    u32,
    f64,
    &str,
    String,
    SmolStr,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
);
