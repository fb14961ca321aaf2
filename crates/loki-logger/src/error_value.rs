//! Normalization of arbitrary error-ish values into log message suffixes.
//!
//! Call sites hand the logger anything from a plain string to a structured
//! payload. [`format_error_to_string`] turns every shape into a single
//! deterministic `error=...` rendering that is safe to append to a log line,
//! and it must never fail itself: it is routinely called from inside an
//! active error-handling path, where a secondary panic would mask the
//! original fault.
//!
//! Classification is explicit rather than reflective: callers construct an
//! [`ErrorValue`] naming the shape they have. Type names carried along in the
//! `, type=` suffix are best-effort metadata, not a stable contract.

use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt::Debug;

/// A classified value attached to a `warn`/`error`/`fatal` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    /// An absent value. Renders as `error=null` with no further fields.
    Null,
    /// A boolean primitive.
    Bool(bool),
    /// A numeric primitive.
    Number(f64),
    /// A string primitive.
    Text(String),
    /// An exception-like value carrying a human-readable message and,
    /// optionally, a multi-line stack trace.
    Exception {
        message: String,
        type_name: String,
        stack: Option<String>,
    },
    /// A key-ordered mapping. Entries render as a JSON object preserving
    /// insertion order.
    Map(Vec<(String, Value)>),
    /// A unique-element collection. Elements render as a JSON array in
    /// iteration order.
    Set(Vec<Value>),
    /// Any other composite value, rendered as its JSON serialization.
    Composite(Value),
    /// Fallback for values that could not be serialized. The rendering was
    /// fixed at construction time.
    Opaque { type_name: String, rendering: String },
}

impl ErrorValue {
    /// Classifies an arbitrary serializable value.
    ///
    /// When serialization fails (self-referential structures, custom
    /// `Serialize` impls that error) this degrades to [`ErrorValue::Opaque`]
    /// holding the `Converting circular structure: ` fallback text instead of
    /// surfacing the fault.
    pub fn composite<T: Serialize + Debug>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => ErrorValue::Composite(json),
            Err(_) => ErrorValue::Opaque {
                type_name: short_type_name::<T>(),
                rendering: format!("Converting circular structure: {value:?}"),
            },
        }
    }

    /// Adapts a standard error. The message is the error's `Display` form;
    /// no stack trace is captured.
    pub fn from_error<E: StdError + ?Sized>(error: &E) -> Self {
        ErrorValue::Exception {
            message: error.to_string(),
            type_name: short_type_name::<E>(),
            stack: None,
        }
    }

    /// An exception-like value with an explicit stack trace.
    pub fn exception(
        message: impl Into<String>,
        type_name: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        ErrorValue::Exception {
            message: message.into(),
            type_name: type_name.into(),
            stack,
        }
    }
}

impl From<&str> for ErrorValue {
    fn from(value: &str) -> Self {
        ErrorValue::Text(value.to_string())
    }
}

impl From<String> for ErrorValue {
    fn from(value: String) -> Self {
        ErrorValue::Text(value)
    }
}

impl From<f64> for ErrorValue {
    fn from(value: f64) -> Self {
        ErrorValue::Number(value)
    }
}

impl From<i64> for ErrorValue {
    fn from(value: i64) -> Self {
        ErrorValue::Number(value as f64)
    }
}

impl From<u64> for ErrorValue {
    fn from(value: u64) -> Self {
        ErrorValue::Number(value as f64)
    }
}

impl From<bool> for ErrorValue {
    fn from(value: bool) -> Self {
        ErrorValue::Bool(value)
    }
}

/// Renders a classified value as a single-line-plus-stack string suitable for
/// appending to a log message.
///
/// Every branch degrades to a string; this function has no error path.
pub fn format_error_to_string(error: &ErrorValue) -> String {
    let mut rendered = String::from("error=");
    match error {
        ErrorValue::Null => {
            rendered.push_str("null");
            return rendered;
        }
        ErrorValue::Bool(value) => {
            rendered.push_str(&value.to_string());
            rendered.push_str(", type=Boolean");
        }
        ErrorValue::Number(value) => {
            rendered.push_str(&value.to_string());
            rendered.push_str(", type=Number");
        }
        ErrorValue::Text(value) => {
            rendered.push_str(value);
            rendered.push_str(", type=String");
        }
        ErrorValue::Exception {
            message,
            type_name,
            stack,
        } => {
            rendered.push_str(message);
            rendered.push_str(", type=");
            rendered.push_str(type_name);
            if let Some(stack) = stack {
                rendered.push_str(", stack=");
                rendered.push_str(stack);
            }
        }
        ErrorValue::Map(entries) => {
            let object: serde_json::Map<String, Value> = entries.iter().cloned().collect();
            rendered.push_str(&json_or_fallback(&Value::Object(object)));
            rendered.push_str(", type=Map");
        }
        ErrorValue::Set(elements) => {
            rendered.push_str(&json_or_fallback(&Value::Array(elements.clone())));
            rendered.push_str(", type=Set");
        }
        ErrorValue::Composite(value) => {
            rendered.push_str(&json_or_fallback(value));
            rendered.push_str(", type=Object");
        }
        ErrorValue::Opaque {
            type_name,
            rendering,
        } => {
            rendered.push_str(rendering);
            rendered.push_str(", type=");
            rendered.push_str(type_name);
        }
    }
    rendered
}

fn json_or_fallback(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(_) => format!("Converting circular structure: {value:?}"),
    }
}

/// Unqualified type name, e.g. `Error` for `std::io::Error`. Best effort:
/// generic parameters are dropped.
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    full.split('<')
        .next()
        .and_then(|path| path.rsplit("::").next())
        .unwrap_or(full)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::ser::Error as SerError;
    use serde_json::json;

    #[test]
    fn test_format_null() {
        assert_eq!(format_error_to_string(&ErrorValue::Null), "error=null");
    }

    #[test]
    fn test_format_text() {
        assert_eq!(
            format_error_to_string(&ErrorValue::from("E")),
            "error=E, type=String"
        );
    }

    #[test]
    fn test_format_number_and_bool() {
        assert_eq!(
            format_error_to_string(&ErrorValue::from(42_i64)),
            "error=42, type=Number"
        );
        assert_eq!(
            format_error_to_string(&ErrorValue::from(1.5)),
            "error=1.5, type=Number"
        );
        assert_eq!(
            format_error_to_string(&ErrorValue::from(true)),
            "error=true, type=Boolean"
        );
    }

    #[test]
    fn test_format_exception_with_stack() {
        let error = ErrorValue::exception(
            "some-message",
            "Error",
            Some("Error: some-message\n    at handler".to_string()),
        );
        assert_eq!(
            format_error_to_string(&error),
            "error=some-message, type=Error, stack=Error: some-message\n    at handler"
        );
    }

    #[test]
    fn test_format_exception_without_stack() {
        let error = ErrorValue::exception("boom", "TypeError", None);
        assert_eq!(format_error_to_string(&error), "error=boom, type=TypeError");
    }

    #[test]
    fn test_from_std_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let rendered = format_error_to_string(&ErrorValue::from_error(&io_error));
        assert_eq!(rendered, "error=missing file, type=Error");
    }

    #[test]
    fn test_format_map_preserves_insertion_order() {
        let error = ErrorValue::Map(vec![
            ("zulu".to_string(), json!(1)),
            ("alpha".to_string(), json!("two")),
        ]);
        assert_eq!(
            format_error_to_string(&error),
            r#"error={"zulu":1,"alpha":"two"}, type=Map"#
        );
    }

    #[test]
    fn test_format_set() {
        let error = ErrorValue::Set(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(format_error_to_string(&error), "error=[1,2,3], type=Set");
    }

    #[test]
    fn test_format_composite_object() {
        let error = ErrorValue::composite(&json!({"name": "John"}));
        assert_eq!(
            format_error_to_string(&error),
            r#"error={"name":"John"}, type=Object"#
        );
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cycle detected"))
        }
    }

    #[test]
    fn test_serialization_failure_degrades_without_panicking() {
        let error = ErrorValue::composite(&Unserializable);
        let rendered = format_error_to_string(&error);
        assert!(rendered.contains("Converting circular structure:"));
        assert!(rendered.starts_with("error="));
        assert!(rendered.ends_with(", type=Unserializable"));
    }

    #[test]
    fn test_short_type_name_drops_path_and_generics() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    proptest! {
        #[test]
        fn prop_text_never_panics(value in ".*") {
            let rendered = format_error_to_string(&ErrorValue::from(value.as_str()));
            prop_assert!(rendered.starts_with("error="));
            prop_assert!(rendered.ends_with(", type=String"));
        }

        #[test]
        fn prop_number_never_panics(value in proptest::num::f64::ANY) {
            let rendered = format_error_to_string(&ErrorValue::from(value));
            prop_assert!(rendered.starts_with("error="));
        }
    }
}
