//! Query-expression translator for JSON query services.
//!
//! This library turns a fluent query-expression tree (filter, projection,
//! navigation expansion, ordering and paging over a resource set) into the
//! JSON parameter object a remote data service accepts. Failures are reported
//! as [`TranslateError`] values that render through miette.
//!
//! # Example
//!
//! ```
//! use json_query::Query;
//!
//! let query = Query::from_resource("People")
//!     .filter(|e| {
//!         e.clone()
//!             .member("Age")
//!             .greater_or_equal(21)
//!             .and_also(e.member("Retired").equal(true).logical_not())
//!     })
//!     .order_by(|e| e.member("LastName"))
//!     .take(10);
//!
//! let json = json_query::to_json(query.expression()).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"take":10,"orderBy":["LastName"],"where":{"and":[{"Age":{"ge":21}}, NOT {"Retired":true}]}}"#
//! );
//! ```

pub mod ast;
pub mod diag;
pub mod params;
pub mod query;
pub mod translate;

pub use ast::{Constant, Expression, ExpressionKind};
pub use diag::{Result, TranslateError};
pub use params::{FilterFragment, QueryParameters};
pub use query::Query;
pub use translate::{
    CapturedEvaluator, ConstantEvaluator, DeclaredNames, MemberNaming, QueryOperator,
    ResolvedMember, TranslatedQuery, Translator, TranslatorConfig,
};

/// Translates a query expression with the default translator.
pub fn translate(expression: &Expression) -> Result<TranslatedQuery> {
    Translator::new().translate(expression)
}

/// Translates a query expression straight to its JSON payload.
pub fn to_json(expression: &Expression) -> Result<String> {
    translate(expression).map(|query| query.to_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let query = Query::from_resource("Customers").take(1);
        assert_eq!(to_json(query.expression()), Ok(r#"{"take":1}"#.to_string()));
        assert_eq!(QueryOperator::ALL.len(), 10);
    }
}
