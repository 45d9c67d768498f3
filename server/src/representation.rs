//! JSON representation of a todo item.
//!
//! Outbound documents carry `url`, `title`, `completed` and `order`. Inbound
//! bodies are read field by field from a `serde_json::Value` so that every
//! problem can be reported against the field that caused it. `url` is
//! server-computed and ignored on input, as are unknown keys.
//!
//! Input is coerced the way form fields usually are: a number is accepted as
//! a title, `"yes"`/`"no"`/`1`/`0` and similar spellings as booleans, and
//! whole floats or numeric strings as an order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{NewTodo, TodoChanges, TodoItem};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_BOOLEAN: &str = "Must be a valid boolean.";
const NOT_INTEGER: &str = "A valid integer is required.";

const MAX_INTEGER_STRING: usize = 1000;

/// Key used for problems that belong to the body as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRepresentation {
    pub url: String,
    pub title: String,
    pub completed: bool,
    pub order: Option<i64>,
}

impl From<TodoItem> for TodoRepresentation {
    fn from(item: TodoItem) -> Self {
        Self {
            url: item.url,
            title: item.title,
            completed: item.completed,
            order: item.order,
        }
    }
}

/// Validation messages keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Read a create body. `title` is required; `completed` defaults to `false`.
pub fn parse_create(body: Value) -> Result<NewTodo, FieldErrors> {
    let changes = parse_fields(body, true)?;
    let Some(title) = changes.title else {
        // parse_fields reports a missing title when it is required
        let mut errors = FieldErrors::default();
        errors.add("title", REQUIRED);
        return Err(errors);
    };
    Ok(NewTodo {
        title,
        completed: changes.completed.unwrap_or(false),
        order: changes.order.flatten(),
    })
}

/// Read an update body. Every field is optional.
pub fn parse_update(body: Value) -> Result<TodoChanges, FieldErrors> {
    parse_fields(body, false)
}

fn parse_fields(body: Value, require_title: bool) -> Result<TodoChanges, FieldErrors> {
    let mut errors = FieldErrors::default();
    let object = match body {
        Value::Object(object) => object,
        other => {
            errors.add(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type(&other)
                ),
            );
            return Err(errors);
        }
    };

    let changes = TodoChanges {
        title: read_title(&object, require_title, &mut errors),
        completed: read_completed(&object, &mut errors),
        order: read_order(&object, &mut errors),
    };

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

fn read_title(
    object: &Map<String, Value>,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let raw = match object.get("title") {
        None => {
            if required {
                errors.add("title", REQUIRED);
            }
            return None;
        }
        Some(Value::Null) => {
            errors.add("title", NOT_NULL);
            return None;
        }
        Some(Value::String(title)) => title.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add("title", NOT_STRING);
            return None;
        }
    };

    let title = raw.trim();
    if title.is_empty() {
        errors.add("title", NOT_BLANK);
        return None;
    }
    Some(title.to_string())
}

fn read_completed(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<bool> {
    let parsed = match object.get("completed")? {
        Value::Null => {
            errors.add("completed", NOT_NULL);
            return None;
        }
        Value::Bool(completed) => Some(*completed),
        Value::String(s) => bool_from_str(s),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.add("completed", NOT_BOOLEAN);
    }
    parsed
}

fn bool_from_str(s: &str) -> Option<bool> {
    match s {
        "t" | "T" | "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On"
        | "ON" | "1" => Some(true),
        "f" | "F" | "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off"
        | "Off" | "OFF" | "0" => Some(false),
        _ => None,
    }
}

fn read_order(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Option<i64>> {
    let parsed = match object.get("order")? {
        Value::Null => return Some(None),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
        Value::String(s) => int_from_str(s),
        _ => None,
    };
    match parsed {
        Some(order) => Some(Some(order)),
        None => {
            errors.add("order", NOT_INTEGER);
            None
        }
    }
}

/// Floats only count when they are whole and small enough to print without
/// an exponent.
fn integral_f64(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v.abs() < 1e16).then_some(v as i64)
}

/// Accepts surrounding whitespace and a trailing `.`, `.0`, `.00`, ...
fn int_from_str(s: &str) -> Option<i64> {
    if s.len() > MAX_INTEGER_STRING {
        return None;
    }
    let s = s.trim();
    let s = match s.rfind('.') {
        Some(dot) if s[dot + 1..].bytes().all(|b| b == b'0') => &s[..dot],
        _ => s,
    };
    s.trim().parse().ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn errors_json(errors: FieldErrors) -> Value {
        serde_json::to_value(errors).unwrap()
    }

    #[test]
    fn representation_serializes_all_four_fields() {
        let item = TodoItem {
            id: 14,
            title: "Buy milk".to_string(),
            completed: false,
            order: Some(1),
            url: "http://localhost:8000/todos/14".to_string(),
        };
        let json = serde_json::to_value(TodoRepresentation::from(item)).unwrap();
        assert_eq!(
            json,
            json!({
                "url": "http://localhost:8000/todos/14",
                "title": "Buy milk",
                "completed": false,
                "order": 1,
            })
        );
    }

    #[test]
    fn representation_emits_null_order() {
        let item = TodoItem {
            id: 1,
            title: "Unordered".to_string(),
            completed: true,
            order: None,
            url: String::new(),
        };
        let json = serde_json::to_value(TodoRepresentation::from(item)).unwrap();
        assert!(json["order"].is_null());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn create_defaults_completed_and_order() {
        let todo = parse_create(json!({"title": "No extras"})).unwrap();
        assert_eq!(
            todo,
            NewTodo {
                title: "No extras".to_string(),
                completed: false,
                order: None,
            }
        );
    }

    #[test]
    fn create_accepts_all_fields() {
        let todo = parse_create(json!({"title": "Done", "completed": true, "order": 4})).unwrap();
        assert!(todo.completed);
        assert_eq!(todo.order, Some(4));
    }

    #[test]
    fn create_rejects_missing_title() {
        let errors = parse_create(json!({"completed": true})).unwrap_err();
        assert_eq!(errors_json(errors), json!({"title": [REQUIRED]}));
    }

    #[test]
    fn create_rejects_blank_and_null_title() {
        let errors = parse_create(json!({"title": "   "})).unwrap_err();
        assert_eq!(errors_json(errors), json!({"title": [NOT_BLANK]}));

        let errors = parse_create(json!({"title": null})).unwrap_err();
        assert_eq!(errors_json(errors), json!({"title": [NOT_NULL]}));
    }

    #[test]
    fn title_is_trimmed() {
        let todo = parse_create(json!({"title": "  Walk dog "})).unwrap();
        assert_eq!(todo.title, "Walk dog");
    }

    #[test]
    fn numeric_title_becomes_text() {
        assert_eq!(parse_create(json!({"title": 5})).unwrap().title, "5");
        assert_eq!(parse_create(json!({"title": 1.5})).unwrap().title, "1.5");
    }

    #[test]
    fn boolean_spellings_are_accepted() {
        for yes in [json!("yes"), json!("true"), json!("ON"), json!("t"), json!(1), json!(1.0)] {
            let changes = parse_update(json!({"completed": yes})).unwrap();
            assert_eq!(changes.completed, Some(true), "{yes}");
        }
        for no in [json!("no"), json!("False"), json!("off"), json!("0"), json!(0)] {
            let changes = parse_update(json!({"completed": no})).unwrap();
            assert_eq!(changes.completed, Some(false), "{no}");
        }
        let errors = parse_update(json!({"completed": "maybe"})).unwrap_err();
        assert_eq!(errors_json(errors), json!({"completed": [NOT_BOOLEAN]}));
        let errors = parse_update(json!({"completed": 2})).unwrap_err();
        assert_eq!(errors_json(errors), json!({"completed": [NOT_BOOLEAN]}));
    }

    #[test]
    fn order_accepts_whole_floats_and_numeric_strings() {
        for (raw, expected) in [
            (json!(1.0), 1),
            (json!("7"), 7),
            (json!(" 8 "), 8),
            (json!("9.00"), 9),
            (json!("-3"), -3),
        ] {
            let changes = parse_update(json!({"order": raw})).unwrap();
            assert_eq!(changes.order, Some(Some(expected)), "{raw}");
        }
        for bad in [json!(1.5), json!("1.5"), json!("ten"), json!(true), json!([1])] {
            let errors = parse_update(json!({"order": bad})).unwrap_err();
            assert_eq!(errors_json(errors), json!({"order": [NOT_INTEGER]}), "{bad}");
        }
    }

    #[test]
    fn client_supplied_url_is_ignored() {
        let todo = parse_create(json!({"title": "Sneaky", "url": "http://evil/todos/1"})).unwrap();
        assert_eq!(todo.title, "Sneaky");

        let changes = parse_update(json!({"url": "http://evil/todos/1"})).unwrap();
        assert_eq!(changes, TodoChanges::default());
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors =
            parse_create(json!({"title": true, "completed": "maybe", "order": 1.5})).unwrap_err();
        assert_eq!(
            errors_json(errors),
            json!({
                "completed": [NOT_BOOLEAN],
                "order": [NOT_INTEGER],
                "title": [NOT_STRING],
            })
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        let errors = parse_update(json!([1, 2])).unwrap_err();
        assert_eq!(
            errors_json(errors),
            json!({"non_field_errors": ["Invalid data. Expected a dictionary, but got list."]})
        );
    }

    #[test]
    fn update_fields_are_optional() {
        let changes = parse_update(json!({})).unwrap();
        assert_eq!(changes, TodoChanges::default());

        let changes = parse_update(json!({"completed": true})).unwrap();
        assert_eq!(
            changes,
            TodoChanges {
                completed: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn update_null_order_clears_it() {
        let changes = parse_update(json!({"order": null})).unwrap();
        assert_eq!(changes.order, Some(None));
    }

    #[test]
    fn field_errors_display_lists_every_message() {
        let mut errors = FieldErrors::default();
        errors.add("title", REQUIRED);
        errors.add("order", NOT_INTEGER);
        assert_eq!(
            errors.to_string(),
            "order: A valid integer is required.; title: This field is required."
        );
    }
}
