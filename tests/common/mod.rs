//! Common test utilities
//!
//! Shared helpers for translating queries in integration tests.
//!
//! # Translation Helpers
//! - [`translate_ok`] - Translate a query, panicking with a miette report on failure
//! - [`assert_translates_to`] - Assert the exact JSON payload of a query
//! - [`expect_error`] - Translate a query, expecting it to fail

#![allow(dead_code)]

use json_query::diag::into_report;
use json_query::{Query, TranslateError, TranslatedQuery, Translator};

/// Format an error as a full miette report for assertion messages.
pub fn format_error(error: &TranslateError) -> String {
    format!("{:?}", into_report(error.clone()))
}

/// Translate a query with the default translator.
///
/// # Panics
/// Panics if translation fails, showing the rendered diagnostic.
pub fn translate_ok(query: &Query) -> TranslatedQuery {
    translate_ok_with(query, &Translator::new())
}

/// Translate a query with a configured translator.
pub fn translate_ok_with(query: &Query, translator: &Translator<'_>) -> TranslatedQuery {
    match query.translate_with(translator) {
        Ok(translated) => translated,
        Err(error) => panic!(
            "unexpected translation failure for {:?}:\n{}",
            query.expression(),
            format_error(&error)
        ),
    }
}

/// Assert that a query serializes to exactly `expected`.
pub fn assert_translates_to(query: &Query, expected: &str) {
    let json = translate_ok(query).to_json();
    assert_eq!(json, expected, "unexpected payload for {:?}", query.expression());
}

/// Translate a query, expecting failure.
///
/// # Panics
/// Panics if translation succeeds, showing the produced payload.
pub fn expect_error(query: &Query) -> TranslateError {
    expect_error_with(query, &Translator::new())
}

/// Translate a query with a configured translator, expecting failure.
pub fn expect_error_with(query: &Query, translator: &Translator<'_>) -> TranslateError {
    match query.translate_with(translator) {
        Ok(translated) => panic!(
            "expected translation to fail, got payload {}",
            translated.to_json()
        ),
        Err(error) => error,
    }
}
