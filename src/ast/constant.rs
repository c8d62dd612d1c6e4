//! Constant values carried by expression trees.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use smol_str::SmolStr;

/// A constant value.
///
/// Primitive variants render directly into a filter. `Object` wraps a
/// captured value (closure environment, local struct) whose members are read
/// through a [`crate::translate::ConstantEvaluator`].
#[derive(Debug, Clone)]
pub enum Constant {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(SmolStr),
    DateTime(DateTime<FixedOffset>),
    Object(Arc<dyn CapturedObject>),
}

impl Constant {
    /// Wraps a captured object.
    pub fn object(object: impl CapturedObject + 'static) -> Self {
        Constant::Object(Arc::new(object))
    }

    /// Returns a short type name for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Constant::Null => "null",
            Constant::Boolean(_) => "bool",
            Constant::Integer(_) => "integer",
            Constant::Float(_) => "float",
            Constant::String(_) => "string",
            Constant::DateTime(_) => "datetime",
            Constant::Object(object) => object.type_name(),
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constant::Null, Constant::Null) => true,
            (Constant::Boolean(a), Constant::Boolean(b)) => a == b,
            (Constant::Integer(a), Constant::Integer(b)) => a == b,
            (Constant::Float(a), Constant::Float(b)) => a == b,
            (Constant::String(a), Constant::String(b)) => a == b,
            (Constant::DateTime(a), Constant::DateTime(b)) => a == b,
            (Constant::Object(a), Constant::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Default textual conversion, as used for paging arguments.
impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => Ok(()),
            Constant::Boolean(value) => write!(f, "{value}"),
            Constant::Integer(value) => write!(f, "{value}"),
            Constant::Float(value) => write!(f, "{value}"),
            Constant::String(value) => f.write_str(value),
            Constant::DateTime(value) => f.write_str(&value.to_rfc3339()),
            Constant::Object(object) => f.write_str(object.type_name()),
        }
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Boolean(value)
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Constant::Integer(i64::from(value))
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Integer(value)
    }
}

impl From<u32> for Constant {
    fn from(value: u32) -> Self {
        Constant::Integer(i64::from(value))
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Float(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(SmolStr::new(value))
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::String(SmolStr::from(value))
    }
}

impl From<SmolStr> for Constant {
    fn from(value: SmolStr) -> Self {
        Constant::String(value)
    }
}

impl From<DateTime<FixedOffset>> for Constant {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Constant::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Constant {
    fn from(value: DateTime<Utc>) -> Self {
        Constant::DateTime(value.fixed_offset())
    }
}

impl<T: Into<Constant>> From<Option<T>> for Constant {
    fn from(value: Option<T>) -> Self {
        value.map_or(Constant::Null, Into::into)
    }
}

// ============================================================================
// Captured objects
// ============================================================================

/// A captured value whose members can be read by name.
///
/// This stands in for runtime reflection: closure environments and other
/// captured values expose their fields through it, and the translator reads
/// them when a member chain is rooted in a constant instead of the query
/// parameter.
pub trait CapturedObject: fmt::Debug + Send + Sync {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Reads a member by its declared name.
    ///
    /// Returns `None` when the member does not exist.
    fn member(&self, name: &str) -> Option<Constant>;
}

/// Map-backed [`CapturedObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    type_name: SmolStr,
    members: BTreeMap<SmolStr, Constant>,
}

impl CapturedRecord {
    /// Creates an empty record with the given type name.
    pub fn new(type_name: impl Into<SmolStr>) -> Self {
        Self {
            type_name: type_name.into(),
            members: BTreeMap::new(),
        }
    }

    /// Adds a member, returning the record.
    pub fn with(mut self, name: impl Into<SmolStr>, value: impl Into<Constant>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Adds a nested captured record as a member.
    pub fn with_object(self, name: impl Into<SmolStr>, object: CapturedRecord) -> Self {
        self.with(name, Constant::object(object))
    }
}

impl CapturedObject for CapturedRecord {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn member(&self, name: &str) -> Option<Constant> {
        self.members.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_default_textual_form() {
        assert_eq!(Constant::from(42).to_string(), "42");
        assert_eq!(Constant::from(2.5).to_string(), "2.5");
        assert_eq!(Constant::from("abc").to_string(), "abc");
        assert_eq!(Constant::from(true).to_string(), "true");
        assert_eq!(Constant::Null.to_string(), "");
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Constant::from(None::<i32>), Constant::Null);
        assert_eq!(Constant::from(Some(3)), Constant::Integer(3));
    }

    #[test]
    fn captured_record_reads_members() {
        let record = CapturedRecord::new("Closure")
            .with("minAge", 21)
            .with_object("filter", CapturedRecord::new("Filter").with("name", "Smith"));

        assert_eq!(record.member("minAge"), Some(Constant::Integer(21)));
        assert!(record.member("missing").is_none());

        let nested = record.member("filter").expect("expected nested object");
        assert_eq!(nested.type_name(), "Filter");
        assert!(matches!(nested, Constant::Object(_)));
    }

    #[test]
    fn objects_compare_by_identity() {
        let object = Constant::object(CapturedRecord::new("Closure"));
        assert_eq!(object, object.clone());
        assert_ne!(object, Constant::object(CapturedRecord::new("Closure")));
    }
}
