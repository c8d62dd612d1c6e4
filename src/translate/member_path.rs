//! Member-path resolution.
//!
//! A member chain either roots at the query parameter, in which case it names
//! a dotted property path, or roots at a captured value or static member, in
//! which case it is read eagerly and becomes a constant.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::ast::{Constant, Expression, MemberAccess};
use crate::diag::{Result, TranslateError};
use crate::translate::MemberNaming;

/// Outcome of resolving a member chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedMember {
    /// Dotted path relative to the query parameter (`Address.City`).
    Path(String),
    /// Value read off a captured object or static member.
    Value(Constant),
}

/// Reads members off constant values.
///
/// This is the only place the translator touches runtime values. Reads are
/// assumed side-effect free; any failure aborts the translation.
pub trait ConstantEvaluator {
    /// Reads `member` off `container`.
    fn read_member(&self, container: &Constant, member: &str) -> Result<Constant>;

    /// Reads a static member, optionally qualified by its declaring type.
    fn read_static(&self, declaring_type: Option<&str>, member: &str) -> Result<Constant>;
}

/// Default evaluator: reads [`crate::ast::CapturedObject`] members and a
/// registry of static values.
#[derive(Debug, Clone, Default)]
pub struct CapturedEvaluator {
    statics: BTreeMap<(SmolStr, SmolStr), Constant>,
}

impl CapturedEvaluator {
    /// Creates an evaluator with no static members.
    pub const fn new() -> Self {
        Self {
            statics: BTreeMap::new(),
        }
    }

    /// Registers a static member value.
    pub fn with_static(
        mut self,
        declaring_type: impl Into<SmolStr>,
        member: impl Into<SmolStr>,
        value: impl Into<Constant>,
    ) -> Self {
        self.statics
            .insert((declaring_type.into(), member.into()), value.into());
        self
    }
}

impl ConstantEvaluator for CapturedEvaluator {
    fn read_member(&self, container: &Constant, member: &str) -> Result<Constant> {
        match container {
            Constant::Object(object) => {
                object
                    .member(member)
                    .ok_or_else(|| TranslateError::ConstantEvaluation {
                        container: SmolStr::new(object.type_name()),
                        member: SmolStr::new(member),
                    })
            }
            other => Err(TranslateError::ConstantEvaluation {
                container: SmolStr::new(other.type_name()),
                member: SmolStr::new(member),
            }),
        }
    }

    fn read_static(&self, declaring_type: Option<&str>, member: &str) -> Result<Constant> {
        let declaring_type = declaring_type.unwrap_or_default();
        self.statics
            .get(&(SmolStr::new(declaring_type), SmolStr::new(member)))
            .cloned()
            .ok_or_else(|| TranslateError::ConstantEvaluation {
                container: SmolStr::new(declaring_type),
                member: SmolStr::new(member),
            })
    }
}

/// Resolves member chains against a naming convention and an evaluator.
///
/// Only parameters bound by the enclosing lambda root a path; a resolver
/// fresh from [`MemberPathResolver::new`] binds none.
pub(crate) struct MemberPathResolver<'a> {
    evaluator: &'a dyn ConstantEvaluator,
    naming: &'a dyn MemberNaming,
    parameters: &'a [SmolStr],
}

impl<'a> MemberPathResolver<'a> {
    pub(crate) fn new(evaluator: &'a dyn ConstantEvaluator, naming: &'a dyn MemberNaming) -> Self {
        Self {
            evaluator,
            naming,
            parameters: &[],
        }
    }

    /// Returns a resolver scoped to a lambda's parameters.
    pub(crate) fn bind<'p>(&self, parameters: &'p [SmolStr]) -> MemberPathResolver<'p>
    where
        'a: 'p,
    {
        MemberPathResolver {
            evaluator: self.evaluator,
            naming: self.naming,
            parameters,
        }
    }

    /// Resolves a member access node to a path or a constant.
    pub(crate) fn resolve(&self, access: &MemberAccess) -> Result<ResolvedMember> {
        let receiver = access
            .receiver
            .as_deref()
            .map(Expression::unwrap_transparent);

        match receiver {
            None => {
                let value = self
                    .evaluator
                    .read_static(access.declaring_type.as_deref(), &access.member)?;
                Ok(ResolvedMember::Value(value))
            }
            Some(Expression::Parameter(name)) if self.parameters.contains(name) => Ok(
                ResolvedMember::Path(self.naming.wire_name(&access.member).to_string()),
            ),
            Some(Expression::Constant(container)) => {
                let value = self.evaluator.read_member(container, &access.member)?;
                Ok(ResolvedMember::Value(value))
            }
            Some(Expression::Member(inner)) => match self.resolve(inner)? {
                ResolvedMember::Path(mut path) => {
                    path.push('.');
                    path.push_str(&self.naming.wire_name(&access.member));
                    Ok(ResolvedMember::Path(path))
                }
                ResolvedMember::Value(container) => {
                    let value = self.evaluator.read_member(&container, &access.member)?;
                    Ok(ResolvedMember::Value(value))
                }
            },
            Some(other) => Err(TranslateError::UnsupportedMemberKind {
                member: access.member.clone(),
                receiver: other.kind(),
            }),
        }
    }

    /// Resolves an operand: member chains through [`Self::resolve`], constants as-is.
    ///
    /// Returns `None` for any other node kind.
    pub(crate) fn resolve_operand(&self, expression: &Expression) -> Result<Option<ResolvedMember>> {
        match expression.unwrap_transparent() {
            Expression::Member(access) => self.resolve(access).map(Some),
            Expression::Constant(constant) => Ok(Some(ResolvedMember::Value(constant.clone()))),
            _ => Ok(None),
        }
    }
}
