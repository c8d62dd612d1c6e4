//! Translator configuration and collaborators.

mod common;

use common::{expect_error_with, translate_ok, translate_ok_with};
use json_query::ast::CapturedRecord;
use json_query::ast::builder::{captured, param, static_member};
use json_query::diag::Result;
use json_query::{
    CapturedEvaluator, Constant, ConstantEvaluator, MemberNaming, Query, TranslateError,
    Translator, TranslatorConfig,
};
use smol_str::SmolStr;

fn people() -> Query {
    Query::from_resource("People")
}

struct CamelCase;

impl MemberNaming for CamelCase {
    fn wire_name(&self, member: &str) -> SmolStr {
        let mut chars = member.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>().into(),
            None => SmolStr::default(),
        }
    }
}

struct FixedStatics;

impl ConstantEvaluator for FixedStatics {
    fn read_member(&self, container: &Constant, member: &str) -> Result<Constant> {
        Err(TranslateError::ConstantEvaluation {
            container: container.type_name().into(),
            member: member.into(),
        })
    }

    fn read_static(&self, _declaring_type: Option<&str>, _member: &str) -> Result<Constant> {
        Ok(Constant::Integer(42))
    }
}

#[test]
fn strict_paging_rejects_non_integers() {
    let translator =
        Translator::with_config(TranslatorConfig::default().with_strict_paging(true));
    assert_eq!(
        expect_error_with(&people().take("abc"), &translator),
        TranslateError::InvalidPagingArgument {
            operator: "Take".into(),
            value: "abc".into(),
        }
    );
    assert!(matches!(
        expect_error_with(&people().call("Skip", vec![param("x")]), &translator),
        TranslateError::InvalidPagingArgument { .. }
    ));
}

#[test]
fn lenient_paging_skips_non_constant_arguments() {
    let translated = translate_ok(&people().call("Skip", vec![param("x")]));
    assert_eq!(translated.parameters.skip, None);
}

#[test]
fn paging_reads_captured_values() {
    let closure = CapturedRecord::new("Closure").with("pageSize", 25);
    let query = people().call("Take", vec![captured(closure).member("pageSize")]);
    assert_eq!(translate_ok(&query).parameters.take, Some(25));
}

#[test]
fn deep_predicates_hit_the_depth_limit() {
    let query = people().filter(|e| {
        (0..20).fold(e.clone().member("Age").greater_than(0), |acc, i| {
            acc.and_also(e.clone().member("Age").not_equal(i))
        })
    });

    let shallow = Translator::with_config(TranslatorConfig::default().with_max_depth(8));
    assert_eq!(
        expect_error_with(&query, &shallow),
        TranslateError::DepthLimitExceeded(8)
    );
    assert!(translate_ok(&query).parameters.filter.is_some());
}

#[test]
fn long_chains_hit_the_depth_limit() {
    let query = (0..20).fold(people(), |query, i| query.take(i));
    let shallow = Translator::with_config(TranslatorConfig::default().with_max_depth(8));
    assert_eq!(
        expect_error_with(&query, &shallow),
        TranslateError::DepthLimitExceeded(8)
    );
    assert_eq!(translate_ok(&query).parameters.take, Some(19));
}

#[test]
fn member_naming_applies_to_every_segment() {
    let translator = Translator::new().with_naming(&CamelCase);
    let query = people()
        .filter(|e| e.member("FirstName").equal("Ann"))
        .select(|e| e.member("Address").member("City"));
    assert_eq!(
        translate_ok_with(&query, &translator).to_json(),
        r#"{"where":{"firstName":"Ann"},"select":["address.city"]}"#
    );
}

#[test]
fn static_members_use_the_evaluator() {
    let query = people().filter(|e| e.member("Age").less_than(static_member("Limits", "MaxAge")));

    let registry = CapturedEvaluator::new().with_static("Limits", "MaxAge", 65);
    let translator = Translator::new().with_evaluator(&registry);
    assert_eq!(
        translate_ok_with(&query, &translator).to_json(),
        r#"{"where":{"Age":{"lt":65}}}"#
    );

    let translator = Translator::new().with_evaluator(&FixedStatics);
    assert_eq!(
        translate_ok_with(&query, &translator).to_json(),
        r#"{"where":{"Age":{"lt":42}}}"#
    );

    assert_eq!(
        common::expect_error(&query),
        TranslateError::ConstantEvaluation {
            container: "Limits".into(),
            member: "MaxAge".into(),
        }
    );
}

#[test]
fn extra_parameters_merge_after_query_keys() {
    let translator = Translator::new()
        .with_parameter("tenant", "acme")
        .with_parameters([("locale", "en"), ("take", "99")]);
    let translated = translate_ok_with(&people().take(3), &translator);
    assert_eq!(
        translated.to_json(),
        r#"{"take":3,"locale":"en","tenant":"acme"}"#
    );
}

#[test]
fn query_parameters_override_translator_parameters() {
    let translator = Translator::new().with_parameter("tenant", "acme");
    let query = people().with_parameter("tenant", "globex");
    assert_eq!(
        translate_ok_with(&query, &translator).to_json(),
        r#"{"tenant":"globex"}"#
    );
}

#[test]
fn request_uri_encodes_payload() {
    let translated = translate_ok(&people().take(3));
    assert_eq!(translated.request_uri(), "People?%7B%22take%22%3A3%7D");
    assert_eq!(translate_ok(&people()).request_uri(), "People");
}

#[test]
fn config_deserializes_with_defaults() {
    let config: TranslatorConfig = serde_json::from_str(r#"{"maxDepth":16}"#).unwrap();
    assert_eq!(config, TranslatorConfig::default().with_max_depth(16));
}
