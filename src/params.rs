//! Accumulated query parameters and their wire serialization.
//!
//! [`QueryParameters`] is the single-use state a translation fills in. Its
//! `to_json` method is the serializer: every token it owns is emitted through
//! `serde_json`, except the filter, which is already JSON-shaped text and is
//! spliced in verbatim.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use smol_str::SmolStr;
use tracing::warn;

/// Wire keys owned by the serializer; extra parameters may not reuse them.
pub const RESERVED_KEYS: [&str; 7] = [
    "skip",
    "take",
    "inlineCount",
    "orderBy",
    "where",
    "select",
    "expand",
];

/// A pre-rendered filter fragment.
///
/// The text is spliced into the payload as-is and never string-escaped. It
/// may contain the ` NOT ` token form, so it is not guaranteed to be strict
/// JSON on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFragment(String);

impl FilterFragment {
    /// Wraps already-rendered filter text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw fragment text.
    pub fn as_raw(&self) -> &str {
        &self.0
    }

    /// Combines two fragments under `{"and":[...]}`.
    pub fn and(self, other: FilterFragment) -> Self {
        Self(format!("{{\"and\":[{},{}]}}", self.0, other.0))
    }
}

impl fmt::Display for FilterFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query parameters accumulated while walking a query expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    /// Number of rows to skip.
    pub skip: Option<i64>,
    /// Maximum number of rows to return.
    pub take: Option<i64>,
    /// Whether the total matching row count is requested.
    pub inline_count: Option<bool>,
    /// Ordering keys in priority order (`"<path>"` or `"<path> DESC"`).
    pub order_by: Vec<String>,
    /// Pre-rendered filter.
    pub filter: Option<FilterFragment>,
    /// Projected member paths.
    pub select: Vec<String>,
    /// Eagerly loaded navigation paths.
    pub expand: Vec<String>,
    /// Free-form parameters merged into the top level of the payload.
    pub parameters: BTreeMap<SmolStr, String>,
}

impl QueryParameters {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when nothing would be serialized.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none()
            && self.take.is_none()
            && self.inline_count.is_none()
            && self.order_by.is_empty()
            && self.filter.is_none()
            && self.select.is_empty()
            && self.expand.is_empty()
            && self.parameters.is_empty()
    }

    /// Renders the wire payload.
    ///
    /// Keys appear in a fixed order (`skip`, `take`, `inlineCount`, `orderBy`,
    /// `where`, `select`, `expand`, then extra parameters by key). Absent
    /// values and empty lists are omitted.
    pub fn to_json(&self) -> String {
        let mut writer = PayloadWriter::default();

        if let Some(skip) = self.skip {
            writer.entry("skip", skip);
        }
        if let Some(take) = self.take {
            writer.entry("take", take);
        }
        if let Some(inline_count) = self.inline_count {
            writer.entry("inlineCount", inline_count);
        }
        if !self.order_by.is_empty() {
            writer.entry("orderBy", string_list(&self.order_by));
        }
        if let Some(filter) = &self.filter {
            writer.raw_entry("where", filter.as_raw());
        }
        if !self.select.is_empty() {
            writer.entry("select", string_list(&self.select));
        }
        if !self.expand.is_empty() {
            writer.entry("expand", string_list(&self.expand));
        }
        for (key, value) in &self.parameters {
            if RESERVED_KEYS.contains(&key.as_str()) {
                warn!(key = %key, "dropping extra parameter that shadows a query key");
                continue;
            }
            writer.entry(key, value.as_str());
        }

        writer.finish()
    }
}

#[derive(Default)]
struct PayloadWriter {
    out: String,
    entries: usize,
}

impl PayloadWriter {
    fn key(&mut self, key: &str) {
        self.out.push(if self.entries == 0 { '{' } else { ',' });
        self.entries += 1;
        self.out.push_str(&Value::from(key).to_string());
        self.out.push(':');
    }

    fn entry(&mut self, key: &str, value: impl Into<Value>) {
        self.key(key);
        self.out.push_str(&value.into().to_string());
    }

    fn raw_entry(&mut self, key: &str, raw: &str) {
        self.key(key);
        self.out.push_str(raw);
    }

    fn finish(mut self) -> String {
        if self.entries == 0 {
            self.out.push('{');
        }
        self.out.push('}');
        self.out
    }
}

fn string_list(items: &[String]) -> Value {
    items.iter().map(String::as_str).collect()
}
