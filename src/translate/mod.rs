//! Query translation: expression tree in, wire parameters out.

mod list_collector;
mod member_path;
mod pipeline;
mod predicate;

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use serde::Deserialize;
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::{Expression, ExpressionVisitor};
use crate::diag::{Result, TranslateError};
use crate::params::QueryParameters;

pub use member_path::{CapturedEvaluator, ConstantEvaluator, ResolvedMember};
pub use pipeline::QueryOperator;

use member_path::MemberPathResolver;
use pipeline::PipelineVisitor;

static DEFAULT_EVALUATOR: CapturedEvaluator = CapturedEvaluator::new();

/// Maps declared member names to the names the data service expects.
///
/// Metadata-aware implementations live outside this crate; the default,
/// [`DeclaredNames`], uses declared names unchanged.
pub trait MemberNaming {
    /// Returns the wire name for a declared member.
    fn wire_name(&self, member: &str) -> SmolStr;
}

/// Uses declared member names unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredNames;

impl MemberNaming for DeclaredNames {
    fn wire_name(&self, member: &str) -> SmolStr {
        SmolStr::new(member)
    }
}

/// Configuration for query translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslatorConfig {
    /// Maximum expression nesting, for both the operator chain and predicates.
    pub max_depth: usize,

    /// Fail on non-integer `Take`/`Skip` arguments instead of ignoring them.
    pub strict_paging: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            strict_paging: false,
        }
    }
}

impl TranslatorConfig {
    /// Sets the maximum expression nesting.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets strict paging.
    pub fn with_strict_paging(mut self, strict: bool) -> Self {
        self.strict_paging = strict;
        self
    }
}

/// A translated query: the resource it targets and its wire parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    /// Resource set name.
    pub resource: SmolStr,
    /// Accumulated parameters.
    pub parameters: QueryParameters,
}

impl TranslatedQuery {
    /// Renders the JSON payload.
    pub fn to_json(&self) -> String {
        self.parameters.to_json()
    }

    /// Renders `<resource>?<percent-encoded payload>`, or the bare resource
    /// when there is nothing to send.
    pub fn request_uri(&self) -> String {
        if self.parameters.is_empty() {
            return self.resource.to_string();
        }
        format!(
            "{}?{}",
            self.resource,
            urlencoding::encode(&self.parameters.to_json())
        )
    }
}

/// Translates query expressions into wire parameters.
///
/// A translator is reusable and holds no per-query state: each call to
/// [`Translator::translate`] walks the tree with fresh state.
pub struct Translator<'a> {
    config: TranslatorConfig,
    evaluator: Option<&'a dyn ConstantEvaluator>,
    naming: Option<&'a dyn MemberNaming>,
    parameters: BTreeMap<SmolStr, String>,
}

impl<'a> Translator<'a> {
    /// Creates a translator with default configuration.
    pub fn new() -> Self {
        Self::with_config(TranslatorConfig::default())
    }

    /// Creates a translator with custom configuration.
    pub fn with_config(config: TranslatorConfig) -> Self {
        Self {
            config,
            evaluator: None,
            naming: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the evaluator used to read captured and static members.
    pub fn with_evaluator(mut self, evaluator: &'a dyn ConstantEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Sets the member naming convention.
    pub fn with_naming(mut self, naming: &'a dyn MemberNaming) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Adds an extra top-level parameter to every payload.
    pub fn with_parameter(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds extra top-level parameters to every payload.
    pub fn with_parameters<K, V>(mut self, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<SmolStr>,
        V: Into<String>,
    {
        self.parameters
            .extend(parameters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    fn resolver(&self) -> MemberPathResolver<'_> {
        MemberPathResolver::new(
            self.evaluator.unwrap_or(&DEFAULT_EVALUATOR),
            self.naming.unwrap_or(&DeclaredNames),
        )
    }

    /// Translates a query expression rooted at a resource set.
    pub fn translate(&self, expression: &Expression) -> Result<TranslatedQuery> {
        debug!(kind = %expression.kind(), "translating query expression");
        let resolver = self.resolver();
        let mut visitor = PipelineVisitor::new(&resolver, &self.config);
        if let ControlFlow::Break(error) = visitor.visit_expression(expression) {
            debug!(error = %error, "query translation failed");
            return Err(error);
        }

        let (resource, mut parameters) = visitor.finish();
        let resource = resource.ok_or(TranslateError::UnsupportedOperator(expression.kind()))?;
        parameters.parameters.extend(self.parameters.clone());

        debug!(resource = %resource, "query translation finished");
        Ok(TranslatedQuery {
            resource,
            parameters,
        })
    }
}

impl Default for Translator<'_> {
    fn default() -> Self {
        Self::new()
    }
}
