//! Query expression nodes.
//!
//! This module defines the immutable tree a fluent query builds:
//! - The query root (`ResourceSet`) and chained operator calls
//! - Lambdas, parameters and member access chains
//! - Binary and unary operators
//! - Constants, including captured objects
//!
//! The translator only reads these nodes; it never rewrites them.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::constant::Constant;

// ============================================================================
// Expression - Top-level expression type
// ============================================================================

/// Represents any node of a query expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Query root: the base resource set, no further recursion.
    ResourceSet(ResourceSet),

    /// Method call (a chained query operator, or a call inside a lambda body)
    Call(MethodCall),

    /// Lambda with named parameters
    Lambda(Lambda),

    /// Member access (`receiver.member`, or a static member when the receiver is absent)
    Member(MemberAccess),

    /// Binary expression (logical, comparison or arithmetic)
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),

    /// Unary expression (NOT, conversion, quoting, negation)
    Unary(UnaryOperator, Box<Expression>),

    /// Constant value
    Constant(Constant),

    /// Lambda parameter reference
    Parameter(SmolStr),

    /// Indexer access (`target[index]`)
    Index(Box<Expression>, Box<Expression>),

    /// Conditional expression (`test ? if_true : if_false`)
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),

    /// Anonymous object construction, used for multi-member projections
    New(Vec<Expression>),
}

impl Expression {
    /// Returns the flat kind of this node.
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::ResourceSet(_) => ExpressionKind::ResourceSet,
            Expression::Call(_) => ExpressionKind::Call,
            Expression::Lambda(_) => ExpressionKind::Lambda,
            Expression::Member(_) => ExpressionKind::MemberAccess,
            Expression::Binary(op, _, _) => op.kind(),
            Expression::Unary(op, _) => op.kind(),
            Expression::Constant(_) => ExpressionKind::Constant,
            Expression::Parameter(_) => ExpressionKind::Parameter,
            Expression::Index(_, _) => ExpressionKind::Index,
            Expression::Conditional(_, _, _) => ExpressionKind::Conditional,
            Expression::New(_) => ExpressionKind::New,
        }
    }

    /// Strips transparent wrappers (`Convert` and `Quote`) off this node.
    pub fn unwrap_transparent(&self) -> &Expression {
        let mut current = self;
        while let Expression::Unary(UnaryOperator::Convert | UnaryOperator::Quote, operand) =
            current
        {
            current = &**operand;
        }
        current
    }

    /// Returns the lambda behind this node, looking through quoting.
    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self.unwrap_transparent() {
            Expression::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// Returns true when this node is a member chain rooted at a lambda parameter.
    pub fn is_parameter_rooted(&self) -> bool {
        let mut current = self.unwrap_transparent();
        loop {
            match current {
                Expression::Parameter(_) => return true,
                Expression::Member(access) => match access.receiver.as_deref() {
                    Some(receiver) => current = receiver.unwrap_transparent(),
                    None => return false,
                },
                _ => return false,
            }
        }
    }
}

// ============================================================================
// Structural nodes
// ============================================================================

/// The root entity collection a query is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    /// Resource name as exposed by the data service.
    pub name: SmolStr,
}

impl ResourceSet {
    /// Creates a resource set root.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into() }
    }
}

/// A method call node.
///
/// Query operators follow the static-extension shape: argument 0 is the prior
/// pipeline stage and the remaining arguments are the operator's own operands.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Method name (e.g. `Where`, `OrderBy`)
    pub method: SmolStr,
    /// Call arguments, source first
    pub arguments: Vec<Expression>,
}

impl MethodCall {
    /// Creates a method call node.
    pub fn new(method: impl Into<SmolStr>, arguments: Vec<Expression>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Returns the prior pipeline stage, if any.
    pub fn source(&self) -> Option<&Expression> {
        self.arguments.first()
    }

    /// Returns the operator operands (every argument after the source).
    pub fn operands(&self) -> &[Expression] {
        self.arguments.get(1..).unwrap_or(&[])
    }
}

/// A lambda expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// Parameter names
    pub parameters: Vec<SmolStr>,
    /// Lambda body
    pub body: Box<Expression>,
}

/// A member access node.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    /// Receiver expression; `None` for static members
    pub receiver: Option<Box<Expression>>,
    /// Declared member name
    pub member: SmolStr,
    /// Declaring type, used to look up static members
    pub declaring_type: Option<SmolStr>,
}

impl MemberAccess {
    /// Returns true when the receiver chain ends at a lambda parameter.
    pub fn is_parameter_rooted(&self) -> bool {
        self.receiver
            .as_deref()
            .is_some_and(Expression::is_parameter_rooted)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Non-short-circuit AND (&)
    And,
    /// Short-circuit AND (&&)
    AndAlso,
    /// Non-short-circuit OR (|)
    Or,
    /// Short-circuit OR (||)
    OrElse,
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Modulo (%)
    Modulo,
    /// Null coalescing (??)
    Coalesce,
}

impl BinaryOperator {
    /// Returns the flat kind of this operator.
    pub fn kind(self) -> ExpressionKind {
        match self {
            BinaryOperator::And => ExpressionKind::And,
            BinaryOperator::AndAlso => ExpressionKind::AndAlso,
            BinaryOperator::Or => ExpressionKind::Or,
            BinaryOperator::OrElse => ExpressionKind::OrElse,
            BinaryOperator::Equal => ExpressionKind::Equal,
            BinaryOperator::NotEqual => ExpressionKind::NotEqual,
            BinaryOperator::LessThan => ExpressionKind::LessThan,
            BinaryOperator::LessThanOrEqual => ExpressionKind::LessThanOrEqual,
            BinaryOperator::GreaterThan => ExpressionKind::GreaterThan,
            BinaryOperator::GreaterThanOrEqual => ExpressionKind::GreaterThanOrEqual,
            BinaryOperator::Add => ExpressionKind::Add,
            BinaryOperator::Subtract => ExpressionKind::Subtract,
            BinaryOperator::Multiply => ExpressionKind::Multiply,
            BinaryOperator::Divide => ExpressionKind::Divide,
            BinaryOperator::Modulo => ExpressionKind::Modulo,
            BinaryOperator::Coalesce => ExpressionKind::Coalesce,
        }
    }

    /// Returns the operator with its operands swapped (`a < b` becomes `b > a`).
    ///
    /// Operators without a mirrored form are returned unchanged.
    pub fn mirrored(self) -> Self {
        match self {
            BinaryOperator::LessThan => BinaryOperator::GreaterThan,
            BinaryOperator::LessThanOrEqual => BinaryOperator::GreaterThanOrEqual,
            BinaryOperator::GreaterThan => BinaryOperator::LessThan,
            BinaryOperator::GreaterThanOrEqual => BinaryOperator::LessThanOrEqual,
            other => other,
        }
    }

    /// Returns true for comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical NOT (!)
    Not,
    /// Type conversion; transparent to the translator
    Convert,
    /// Quoted lambda; transparent to the translator
    Quote,
    /// Arithmetic negation (-)
    Negate,
}

impl UnaryOperator {
    /// Returns the flat kind of this operator.
    pub fn kind(self) -> ExpressionKind {
        match self {
            UnaryOperator::Not => ExpressionKind::Not,
            UnaryOperator::Convert => ExpressionKind::Convert,
            UnaryOperator::Quote => ExpressionKind::Quote,
            UnaryOperator::Negate => ExpressionKind::Negate,
        }
    }
}

// ============================================================================
// ExpressionKind
// ============================================================================

/// Flat discriminant naming every node kind and operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    ResourceSet,
    Call,
    Lambda,
    MemberAccess,
    Parameter,
    Constant,
    Index,
    Conditional,
    New,
    And,
    AndAlso,
    Or,
    OrElse,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Coalesce,
    Not,
    Convert,
    Quote,
    Negate,
}

impl ExpressionKind {
    /// Returns the kind name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ExpressionKind::ResourceSet => "ResourceSet",
            ExpressionKind::Call => "Call",
            ExpressionKind::Lambda => "Lambda",
            ExpressionKind::MemberAccess => "MemberAccess",
            ExpressionKind::Parameter => "Parameter",
            ExpressionKind::Constant => "Constant",
            ExpressionKind::Index => "Index",
            ExpressionKind::Conditional => "Conditional",
            ExpressionKind::New => "New",
            ExpressionKind::And => "And",
            ExpressionKind::AndAlso => "AndAlso",
            ExpressionKind::Or => "Or",
            ExpressionKind::OrElse => "OrElse",
            ExpressionKind::Equal => "Equal",
            ExpressionKind::NotEqual => "NotEqual",
            ExpressionKind::LessThan => "LessThan",
            ExpressionKind::LessThanOrEqual => "LessThanOrEqual",
            ExpressionKind::GreaterThan => "GreaterThan",
            ExpressionKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            ExpressionKind::Add => "Add",
            ExpressionKind::Subtract => "Subtract",
            ExpressionKind::Multiply => "Multiply",
            ExpressionKind::Divide => "Divide",
            ExpressionKind::Modulo => "Modulo",
            ExpressionKind::Coalesce => "Coalesce",
            ExpressionKind::Not => "Not",
            ExpressionKind::Convert => "Convert",
            ExpressionKind::Quote => "Quote",
            ExpressionKind::Negate => "Negate",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{constant, param};

    #[test]
    fn binary_kind_names_operator() {
        let expr = param("e").member("Age").greater_than(3);
        assert_eq!(expr.kind(), ExpressionKind::GreaterThan);
        assert_eq!(expr.kind().to_string(), "GreaterThan");
    }

    #[test]
    fn mirrored_swaps_ordering_operators_only() {
        assert_eq!(BinaryOperator::LessThan.mirrored(), BinaryOperator::GreaterThan);
        assert_eq!(
            BinaryOperator::GreaterThanOrEqual.mirrored(),
            BinaryOperator::LessThanOrEqual
        );
        assert_eq!(BinaryOperator::Equal.mirrored(), BinaryOperator::Equal);
        assert_eq!(BinaryOperator::NotEqual.mirrored(), BinaryOperator::NotEqual);
    }

    #[test]
    fn unwrap_transparent_strips_convert_and_quote() {
        let inner = param("e").member("Age");
        let wrapped = Expression::Unary(
            UnaryOperator::Quote,
            Box::new(Expression::Unary(UnaryOperator::Convert, Box::new(inner.clone()))),
        );
        assert_eq!(wrapped.unwrap_transparent(), &inner);
    }

    #[test]
    fn parameter_rooted_detection() {
        assert!(param("e").member("Address").member("City").is_parameter_rooted());
        assert!(!constant(5).is_parameter_rooted());
        assert!(!param("e").member("Tags").index(0).member("Name").is_parameter_rooted());
    }

    #[test]
    fn method_call_splits_source_and_operands() {
        let call = MethodCall::new(
            "Take",
            vec![Expression::ResourceSet(ResourceSet::new("Customers")), constant(5)],
        );
        assert!(matches!(call.source(), Some(Expression::ResourceSet(_))));
        assert_eq!(call.operands(), &[constant(5)]);

        let empty = MethodCall::new("Take", Vec::new());
        assert!(empty.source().is_none());
        assert!(empty.operands().is_empty());
    }
}
