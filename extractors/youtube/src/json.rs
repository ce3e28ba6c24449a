//! Fallible traversal of untyped JSON documents.
//!
//! Channel documents are deeply nested and change shape without notice, so every lookup goes
//! through a [JSON pointer](https://datatracker.ietf.org/doc/html/rfc6901) and comes back as
//! either the value or "absent". Absence is never an error at this layer: the optional
//! accessors return [`Option`], the required ones return a [`MissingField`] describing what
//! was looked up, and the caller decides which of the two a given lookup is.

use serde_json::{Map, Value};
use std::fmt;

/// A required lookup found nothing usable at `pointer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// The JSON pointer that was followed.
    pub pointer: String,
    /// The kind of value that was expected there.
    pub expected: &'static str,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} at {}", self.expected, self.pointer)
    }
}

impl std::error::Error for MissingField {}

/// Pointer-based accessors for [`Value`].
///
/// `pointer` uses the RFC 6901 syntax that [`Value::pointer`] accepts, e.g.
/// `"/header/c4TabbedHeaderRenderer/avatar/thumbnails/0/url"`. Array elements are addressed
/// by index segments. An empty pointer addresses the value itself.
pub trait JsonExt {
    /// The value at `pointer`, or `None` if any step along the way is missing or has the
    /// wrong type.
    fn at(&self, pointer: &str) -> Option<&Value>;

    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.at(pointer).and_then(Value::as_str)
    }

    fn array_at(&self, pointer: &str) -> Option<&Vec<Value>> {
        self.at(pointer).and_then(Value::as_array)
    }

    fn object_at(&self, pointer: &str) -> Option<&Map<String, Value>> {
        self.at(pointer).and_then(Value::as_object)
    }

    /// Like [`JsonExt::at`], but treats `null` as absent.
    fn present_at(&self, pointer: &str) -> Option<&Value> {
        self.at(pointer).filter(|v| !v.is_null())
    }

    fn require(&self, pointer: &str) -> Result<&Value, MissingField> {
        self.present_at(pointer)
            .ok_or_else(|| missing(pointer, "a value"))
    }

    fn require_str(&self, pointer: &str) -> Result<&str, MissingField> {
        self.str_at(pointer).ok_or_else(|| missing(pointer, "a string"))
    }

    fn require_array(&self, pointer: &str) -> Result<&Vec<Value>, MissingField> {
        self.array_at(pointer)
            .ok_or_else(|| missing(pointer, "an array"))
    }

    fn require_object(&self, pointer: &str) -> Result<&Map<String, Value>, MissingField> {
        self.object_at(pointer)
            .ok_or_else(|| missing(pointer, "an object"))
    }
}

fn missing(pointer: &str, expected: &'static str) -> MissingField {
    MissingField {
        pointer: pointer.to_string(),
        expected,
    }
}

impl JsonExt for Value {
    fn at(&self, pointer: &str) -> Option<&Value> {
        self.pointer(pointer)
    }
}
