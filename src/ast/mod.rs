//! Query expression tree types and traversal.

pub mod builder;
pub mod constant;
pub mod expression;
pub mod visit;

pub use constant::{CapturedObject, CapturedRecord, Constant};
pub use expression::{
    BinaryOperator, Expression, ExpressionKind, Lambda, MemberAccess, MethodCall, ResourceSet,
    UnaryOperator,
};
pub use visit::{ExpressionVisitor, VisitResult};
