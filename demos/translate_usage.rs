//! Query translation demonstration
//!
//! This example builds a few queries and prints the payloads a JSON query
//! service would receive.

use json_query::ast::CapturedRecord;
use json_query::ast::builder::{captured, new_object};
use json_query::diag::into_report;
use json_query::{Query, Translator, TranslatorConfig};

fn main() {
    println!("=== Query Translation Demo ===\n");

    // Example 1: Full pipeline
    demo_full_pipeline();

    // Example 2: Captured values
    demo_captured_values();

    // Example 3: Strict paging
    demo_strict_paging();

    // Example 4: Unsupported operator
    demo_unsupported_operator();
}

fn demo_full_pipeline() {
    println!("--- Example 1: Full Pipeline ---");

    let query = Query::from_resource("People")
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

    match query.translate() {
        Ok(translated) => {
            println!("payload: {}", translated.to_json());
            println!("request: {}", translated.request_uri());
        }
        Err(error) => println!("{:?}", into_report(error)),
    }
    println!();
}

fn demo_captured_values() {
    println!("--- Example 2: Captured Values ---");

    let settings = CapturedRecord::new("Settings")
        .with("minAge", 30)
        .with("city", "Oslo");
    let query = Query::from_resource("People")
        .filter(move |e| {
            e.clone()
                .member("Age")
                .greater_than(captured(settings.clone()).member("minAge"))
                .and_also(e.member("Address").member("City").equal(captured(settings).member("city")))
        })
        .include_total_count();

    match query.translate() {
        Ok(translated) => println!("payload: {}", translated.to_json()),
        Err(error) => println!("{:?}", into_report(error)),
    }
    println!();
}

fn demo_strict_paging() {
    println!("--- Example 3: Strict Paging ---");

    let query = Query::from_resource("People").take("ten");

    let lenient = Translator::new();
    match query.translate_with(&lenient) {
        Ok(translated) => println!("lenient payload: {}", translated.to_json()),
        Err(error) => println!("{:?}", into_report(error)),
    }

    let strict = Translator::with_config(TranslatorConfig::default().with_strict_paging(true));
    match query.translate_with(&strict) {
        Ok(translated) => println!("strict payload: {}", translated.to_json()),
        Err(error) => println!("strict error:\n{:?}", into_report(error)),
    }
    println!();
}

fn demo_unsupported_operator() {
    println!("--- Example 4: Unsupported Operator ---");

    let query = Query::from_resource("People").call("Distinct", Vec::new());
    if let Err(error) = query.translate() {
        println!("{:?}", into_report(error));
    }
    println!();
}
