//! Record trait and field access.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shelfdb_codec::{to_value, Value};

/// Trait for types that can be stored in a [`Collection`](super::Collection).
///
/// A record is any serde type that serializes to a map (a struct with
/// named fields, or a map-like value). Both methods have defaults built on
/// the serialized form, so most types only need an empty impl:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: String,
///     email: String,
/// }
///
/// impl Record for User {}
/// ```
///
/// Override [`Record::field`] to serve indexed values without serializing
/// the whole record, or [`Record::record_id`] when the id is not the
/// first field.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the value of the named field, or `None` if it is absent.
    ///
    /// A null value counts as absent.
    fn field(&self, name: &str) -> Option<Value> {
        field_of(&to_value(self).ok()?, name).cloned()
    }

    /// Returns the record's identifier, used when rebuilding indexes.
    ///
    /// Defaults to the first field rendered as text.
    fn record_id(&self) -> Option<String> {
        id_of(&to_value(self).ok()?)
    }
}

/// Schema-less records: any map value can be stored as-is.
impl Record for Value {
    fn field(&self, name: &str) -> Option<Value> {
        field_of(self, name).cloned()
    }

    fn record_id(&self) -> Option<String> {
        id_of(self)
    }
}

/// Extracts a named field from the dynamic form of a record.
///
/// Returns `None` if `value` is not a map, lacks the field, or holds null
/// for it.
pub fn field_of<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.get(name).filter(|v| !v.is_null())
}

/// Reads the first field of a record as a non-empty identifier.
pub fn id_of(value: &Value) -> Option<String> {
    let (_, first) = value.first_entry()?;
    let id = match first {
        Value::Null | Value::Array(_) | Value::Map(_) => return None,
        other => other.to_string(),
    };
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct User {
        id: String,
        email: String,
        nickname: Option<String>,
    }

    impl Record for User {}

    #[derive(Debug, Serialize, Deserialize)]
    struct Counter {
        seq: u64,
        label: String,
    }

    impl Record for Counter {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "label" => Some(Value::from(self.label.to_uppercase())),
                _ => None,
            }
        }
    }

    fn user() -> User {
        User {
            id: "u1".into(),
            email: "a@x".into(),
            nickname: None,
        }
    }

    #[test]
    fn default_field_access() {
        let user = user();
        assert_eq!(user.field("email"), Some(Value::from("a@x")));
        assert_eq!(user.field("missing"), None);
    }

    #[test]
    fn null_fields_are_absent() {
        assert_eq!(user().field("nickname"), None);
    }

    #[test]
    fn default_id_is_first_field() {
        assert_eq!(user().record_id().as_deref(), Some("u1"));

        let counter = Counter {
            seq: 7,
            label: "x".into(),
        };
        assert_eq!(counter.record_id().as_deref(), Some("7"));
    }

    #[test]
    fn overridden_field_access() {
        let counter = Counter {
            seq: 1,
            label: "low".into(),
        };
        assert_eq!(counter.field("label"), Some(Value::from("LOW")));
        assert_eq!(counter.field("seq"), None);
    }

    #[test]
    fn dynamic_values_are_records() {
        let value = Value::map(vec![
            (Value::from("id"), Value::from("9")),
            (Value::from("email"), Value::from("z@x")),
        ]);
        assert_eq!(Record::field(&value, "email"), Some(Value::from("z@x")));
        assert_eq!(value.record_id().as_deref(), Some("9"));

        assert_eq!(Record::field(&Value::from("scalar"), "email"), None);
        assert_eq!(Value::from("scalar").record_id(), None);
    }

    #[test]
    fn empty_id_is_rejected() {
        let value = Value::map(vec![(Value::from("id"), Value::from(""))]);
        assert_eq!(id_of(&value), None);
    }
}
