//! Operator-chain translation: ordering, paging, projection and the full
//! payload.

mod common;

use common::{assert_translates_to, expect_error, format_error, translate_ok};
use json_query::ast::builder::{call, constant, new_object, param};
use json_query::{ExpressionKind, Query, TranslateError, Translator};

fn people() -> Query {
    Query::from_resource("People")
}

#[test]
fn bare_resource_has_empty_payload() {
    let translated = translate_ok(&people());
    assert_eq!(translated.resource, "People");
    assert_eq!(translated.to_json(), "{}");
}

#[test]
fn ordering_keys_keep_written_priority() {
    let query = people()
        .order_by(|e| e.member("LastName"))
        .then_by(|e| e.member("FirstName"));
    assert_translates_to(&query, r#"{"orderBy":["LastName","FirstName"]}"#);
}

#[test]
fn descending_keys_are_suffixed() {
    assert_translates_to(
        &people().order_by_descending(|e| e.member("Age")),
        r#"{"orderBy":["Age DESC"]}"#,
    );
    assert_translates_to(
        &people()
            .order_by(|e| e.member("LastName"))
            .then_by_descending(|e| e.member("Address").member("City")),
        r#"{"orderBy":["LastName","Address.City DESC"]}"#,
    );
}

#[test]
fn take_and_skip_set_paging() {
    assert_translates_to(&people().take(5), r#"{"take":5}"#);
    assert_translates_to(&people().skip(20).take(10), r#"{"skip":20,"take":10}"#);
}

#[test]
fn last_paging_call_wins() {
    assert_translates_to(&people().take(10).take(5), r#"{"take":5}"#);
}

#[test]
fn non_integer_take_is_ignored() {
    assert_translates_to(&people().take("abc"), "{}");
    assert_translates_to(&people().take(10).skip(1.5), r#"{"take":10}"#);
}

#[test]
fn numeric_string_take_is_parsed() {
    assert_translates_to(&people().take("7"), r#"{"take":7}"#);
}

#[test]
fn include_total_count_sets_inline_count() {
    assert_translates_to(&people().include_total_count(), r#"{"inlineCount":true}"#);
}

#[test]
fn select_collects_paths() {
    assert_translates_to(
        &people().select(|e| e.member("Name")),
        r#"{"select":["Name"]}"#,
    );
    assert_translates_to(
        &people().select(|e| e.member("Address").member("City")),
        r#"{"select":["Address.City"]}"#,
    );
}

#[test]
fn projection_selects_every_member() {
    let query = people().select(|e| {
        new_object([e.clone().member("FirstName"), e.member("LastName")])
    });
    assert_translates_to(&query, r#"{"select":["FirstName","LastName"]}"#);
}

#[test]
fn expand_accepts_members_and_path_strings() {
    let query = people()
        .expand(|e| e.member("Orders"))
        .expand_path("Orders.Items");
    assert_translates_to(&query, r#"{"expand":["Orders","Orders.Items"]}"#);
}

#[test]
fn repeated_filters_are_and_combined() {
    let query = people()
        .filter(|e| e.member("Age").greater_than(1))
        .filter(|e| e.member("Age").less_than(9));
    assert_translates_to(
        &query,
        r#"{"where":{"and":[{"Age":{"gt":1}},{"Age":{"lt":9}}]}}"#,
    );
}

#[test]
fn full_query_round_trip() {
    let query = people()
        .filter(|e| {
            e.clone()
                .member("Age")
                .greater_or_equal(21)
                .and_also(e.member("Retired").equal(true).logical_not())
        })
        .order_by(|e| e.member("LastName"))
        .take(10)
        .skip(0)
        .select(|e| new_object([e.clone().member("FirstName"), e.member("LastName")]));

    assert_translates_to(
        &query,
        r#"{"skip":0,"take":10,"orderBy":["LastName"],"where":{"and":[{"Age":{"ge":21}}, NOT {"Retired":true}]},"select":["FirstName","LastName"]}"#,
    );
}

#[test]
fn translation_is_idempotent() {
    let query = people()
        .filter(|e| e.member("Age").greater_than(30))
        .order_by(|e| e.member("LastName"))
        .then_by(|e| e.member("FirstName"))
        .take(3);

    let translator = Translator::new();
    let first = translator.translate(query.expression()).unwrap().to_json();
    let second = translator.translate(query.expression()).unwrap().to_json();
    assert_eq!(first, second);
}

#[test]
fn unknown_operator_is_rejected() {
    let error = expect_error(&people().call("Distinct", Vec::new()));
    assert_eq!(error, TranslateError::UnsupportedQueryOperator("Distinct".into()));
    assert_eq!(error.code_str(), "json_query::unsupported_query_operator");
    assert!(
        format_error(&error).contains("unsupported query operator `Distinct`"),
        "unexpected report: {}",
        format_error(&error)
    );
}

#[test]
fn unknown_operator_mid_chain_is_rejected() {
    let query = people()
        .take(5)
        .call("Distinct", Vec::new())
        .order_by(|e| e.member("Name"));
    assert_eq!(
        expect_error(&query),
        TranslateError::UnsupportedQueryOperator("Distinct".into())
    );
}

#[test]
fn where_requires_a_lambda() {
    let query = people().call("Where", vec![constant(true)]);
    assert_eq!(
        expect_error(&query),
        TranslateError::MalformedCall {
            method: "Where".into(),
            expected: "a predicate lambda",
        }
    );
}

#[test]
fn select_rejects_computed_values() {
    let query = people().select(|e| e.member("Age").greater_than(3));
    assert_eq!(
        expect_error(&query),
        TranslateError::UnsupportedListArgument(ExpressionKind::GreaterThan)
    );
}

#[test]
fn root_must_be_a_resource_set() {
    assert_eq!(
        json_query::translate(&constant(1)),
        Err(TranslateError::UnsupportedOperator(ExpressionKind::Constant))
    );
    assert_eq!(
        json_query::translate(&call("Take", Vec::new())),
        Err(TranslateError::MalformedCall {
            method: "Take".into(),
            expected: "a source query",
        })
    );
}

#[test]
fn include_total_count_takes_no_arguments() {
    let query = people().call("IncludeTotalCount", vec![constant("junk")]);
    assert_eq!(
        expect_error(&query),
        TranslateError::MalformedCall {
            method: "IncludeTotalCount".into(),
            expected: "no arguments",
        }
    );
}

#[test]
fn select_rejects_unbound_parameters() {
    let query = people().select(|_| param("other").member("Name"));
    assert_eq!(
        expect_error(&query),
        TranslateError::UnsupportedMemberKind {
            member: "Name".into(),
            receiver: ExpressionKind::Parameter,
        }
    );
}
