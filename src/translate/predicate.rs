//! Filter rendering for `Where` predicates.
//!
//! The renderer walks a boolean expression and appends JSON-shaped text to a
//! [`FilterBuffer`]:
//!
//! ```text
//! Expr := {"and":[Expr,Expr]} | {"or":[Expr,Expr]}
//!       | {"<path>":Literal} | {"<path>":{"<op>":Literal}}
//!       | " NOT " Expr
//! ```
//!
//! Logical chains are not flattened: `(a AND b) AND c` renders as nested
//! pairs. Strings are quoted without escaping.

use std::fmt;
use std::ops::ControlFlow;

use smol_str::SmolStr;

use crate::ast::visit::{ExpressionVisitor, try_visit, walk_expression};
use crate::ast::{
    BinaryOperator, Constant, Expression, ExpressionKind, MemberAccess, MethodCall,
    ResourceSet, UnaryOperator,
};
use crate::diag::{Result, TranslateError};
use crate::params::FilterFragment;
use crate::translate::member_path::{MemberPathResolver, ResolvedMember};

/// Append-only text buffer for one filter rendering.
#[derive(Debug, Default)]
pub(crate) struct FilterBuffer {
    text: String,
}

impl FilterBuffer {
    fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_display(&mut self, value: impl fmt::Display) {
        self.text.push_str(&value.to_string());
    }

    fn push_quoted(&mut self, text: &str) {
        self.text.push('"');
        self.text.push_str(text);
        self.text.push('"');
    }

    fn into_fragment(self) -> FilterFragment {
        FilterFragment::new(self.text)
    }
}

/// Wire code for a comparison operator; `None` for equality, which is inlined.
fn comparison_code(op: BinaryOperator) -> Option<&'static str> {
    match op {
        BinaryOperator::NotEqual => Some("ne"),
        BinaryOperator::LessThan => Some("lt"),
        BinaryOperator::LessThanOrEqual => Some("le"),
        BinaryOperator::GreaterThan => Some("gt"),
        BinaryOperator::GreaterThanOrEqual => Some("ge"),
        _ => None,
    }
}

/// Renders boolean predicates into filter text.
pub(crate) struct PredicateRenderer<'r, 'a> {
    resolver: &'r MemberPathResolver<'a>,
    buffer: FilterBuffer,
    depth: usize,
    max_depth: usize,
}

impl<'r, 'a> PredicateRenderer<'r, 'a> {
    pub(crate) fn new(resolver: &'r MemberPathResolver<'a>, max_depth: usize) -> Self {
        Self {
            resolver,
            buffer: FilterBuffer::default(),
            depth: 0,
            max_depth,
        }
    }

    /// Renders a predicate (or a lambda wrapping one) into a filter fragment.
    pub(crate) fn render(
        resolver: &'r MemberPathResolver<'a>,
        max_depth: usize,
        predicate: &Expression,
    ) -> Result<FilterFragment> {
        let mut renderer = Self::new(resolver, max_depth);
        match renderer.visit_expression(predicate) {
            ControlFlow::Continue(()) => Ok(renderer.buffer.into_fragment()),
            ControlFlow::Break(error) => Err(error),
        }
    }

    fn logical(
        &mut self,
        key: &str,
        left: &Expression,
        right: &Expression,
    ) -> ControlFlow<TranslateError> {
        self.buffer.push_str("{\"");
        self.buffer.push_str(key);
        self.buffer.push_str("\":[");
        try_visit!(self.visit_expression(left));
        self.buffer.push_str(",");
        try_visit!(self.visit_expression(right));
        self.buffer.push_str("]}");
        ControlFlow::Continue(())
    }

    fn comparison(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> ControlFlow<TranslateError> {
        // Keep the property path in key position: `21 <= e.Age` becomes `e.Age >= 21`.
        let (op, key, value) = if !left.is_parameter_rooted() && right.is_parameter_rooted() {
            (op.mirrored(), right, left)
        } else {
            (op, left, right)
        };

        self.buffer.push_str("{");
        try_visit!(self.key(op, key));
        self.buffer.push_str(":");
        match comparison_code(op) {
            None => try_visit!(self.operand(value)),
            Some(code) => {
                self.buffer.push_str("{\"");
                self.buffer.push_str(code);
                self.buffer.push_str("\":");
                try_visit!(self.operand(value));
                self.buffer.push_str("}");
            }
        }
        self.buffer.push_str("}");
        ControlFlow::Continue(())
    }

    /// Renders the key side of a comparison, which must be a property path.
    fn key(&mut self, op: BinaryOperator, key: &Expression) -> ControlFlow<TranslateError> {
        match self.resolver.resolve_operand(key) {
            Ok(Some(ResolvedMember::Path(path))) => {
                self.buffer.push_quoted(&path);
                ControlFlow::Continue(())
            }
            Ok(Some(ResolvedMember::Value(_))) => Self::unsupported(op.kind()),
            Ok(None) => Self::unsupported(key.unwrap_transparent().kind()),
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn operand(&mut self, expression: &Expression) -> ControlFlow<TranslateError> {
        match self.resolver.resolve_operand(expression) {
            Ok(Some(resolved)) => self.resolved(resolved),
            Ok(None) => self.visit_expression(expression),
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn resolved(&mut self, resolved: ResolvedMember) -> ControlFlow<TranslateError> {
        match resolved {
            ResolvedMember::Path(path) => {
                self.buffer.push_quoted(&path);
                ControlFlow::Continue(())
            }
            ResolvedMember::Value(value) => self.constant(&value),
        }
    }

    fn constant(&mut self, constant: &Constant) -> ControlFlow<TranslateError> {
        match constant {
            Constant::Null => self.buffer.push_str("null"),
            Constant::Boolean(true) => self.buffer.push_str("true"),
            Constant::Boolean(false) => self.buffer.push_str("false"),
            Constant::String(value) => self.buffer.push_quoted(value),
            Constant::DateTime(value) => self.buffer.push_quoted(&value.to_rfc3339()),
            Constant::Integer(value) => self.buffer.push_display(value),
            Constant::Float(value) if value.is_finite() => self.buffer.push_display(value),
            Constant::Float(_) => {
                return ControlFlow::Break(TranslateError::UnsupportedConstantShape(
                    SmolStr::new("non-finite float"),
                ));
            }
            Constant::Object(object) => {
                return ControlFlow::Break(TranslateError::UnsupportedConstantShape(
                    SmolStr::new(object.type_name()),
                ));
            }
        }
        ControlFlow::Continue(())
    }

    fn unsupported(kind: ExpressionKind) -> ControlFlow<TranslateError> {
        ControlFlow::Break(TranslateError::UnsupportedOperator(kind))
    }
}

impl ExpressionVisitor for PredicateRenderer<'_, '_> {
    type Break = TranslateError;

    fn visit_expression(&mut self, expression: &Expression) -> ControlFlow<Self::Break> {
        if self.depth >= self.max_depth {
            return ControlFlow::Break(TranslateError::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        let flow = walk_expression(self, expression);
        self.depth -= 1;
        flow
    }

    fn visit_binary(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> ControlFlow<Self::Break> {
        match op {
            BinaryOperator::And | BinaryOperator::AndAlso => self.logical("and", left, right),
            BinaryOperator::Or | BinaryOperator::OrElse => self.logical("or", left, right),
            op if op.is_comparison() => self.comparison(op, left, right),
            op => Self::unsupported(op.kind()),
        }
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Expression) -> ControlFlow<Self::Break> {
        match op {
            UnaryOperator::Not => {
                self.buffer.push_str(" NOT ");
                self.visit_expression(operand)
            }
            UnaryOperator::Convert | UnaryOperator::Quote => self.visit_expression(operand),
            UnaryOperator::Negate => Self::unsupported(ExpressionKind::Negate),
        }
    }

    fn visit_member(&mut self, access: &MemberAccess) -> ControlFlow<Self::Break> {
        match self.resolver.resolve(access) {
            Ok(resolved) => self.resolved(resolved),
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn visit_constant(&mut self, constant: &Constant) -> ControlFlow<Self::Break> {
        self.constant(constant)
    }

    fn visit_resource_set(&mut self, _set: &ResourceSet) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::ResourceSet)
    }

    fn visit_call(&mut self, _call: &MethodCall) -> ControlFlow<Self::Break> {
        Self::unsupported(ExpressionKind::Call)
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
