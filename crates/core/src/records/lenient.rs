//! `deserialize_with` helpers that never reject a field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Moves every field of an object under its canonical key.
///
/// Each entry pairs a canonical key with the other spellings it may appear
/// under, in order of precedence. The first non-null spelling wins and the
/// rest are dropped, so a record carrying both a current and a legacy name
/// still reads.
#[must_use]
pub fn canonical_keys(value: Value, fields: &[(&str, &[&str])]) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    for &(key, aliases) in fields {
        let chosen = std::iter::once(key)
            .chain(aliases.iter().copied())
            .filter_map(|name| map.remove(name))
            .fold(None, |chosen: Option<Value>, candidate| {
                chosen.or_else(|| Some(candidate).filter(|v| !v.is_null()))
            });
        if let Some(chosen) = chosen {
            map.insert(key.to_string(), chosen);
        }
    }
    Value::Object(map)
}

/// Implements `Deserialize` for a record derived with `#[serde(remote = "Self")]`,
/// first folding its alternate key spellings through [`canonical_keys`].
macro_rules! deserialize_with_aliases {
    ($record:ty { $($key:literal => [$($alias:literal),+ $(,)?]),+ $(,)? }) => {
        impl<'de> ::serde::Deserialize<'de> for $record {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                const FIELDS: &[(&str, &[&str])] = &[$(($key, &[$($alias),+])),+];
                let value =
                    <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                <$record>::deserialize($crate::records::lenient::canonical_keys(value, FIELDS))
                    .map_err(::serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use deserialize_with_aliases;

/// Reads a free-text field; numbers and `true` are stringified, anything else is absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(text_of)
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Reads a completion signature; `false`, zero and blank text mean unsigned.
pub fn signature<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) if !n.as_f64().is_some_and(f64::is_normal) => None,
        other => text_of(other),
    })
}

/// Reads a boolean flag written as a bool, a number, or a word.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_normal()),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "received"
        ),
        _ => false,
    })
}

/// Reads an identifier written as a string or an integer.
pub fn id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> From<&'a str>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s.trim())
            .filter(|s| !s.is_empty())
            .map(T::from),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(T::from(n.to_string().as_str())),
        _ => None,
    })
}

/// Reads a nested record; anything that is not a readable object is absent.
pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Reads a list of records, dropping elements that cannot be read.
/// Anything that is not an array reads as an empty list.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::debug!(error = %err, "dropping unreadable nested record");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Name of a JSON value's type, for error messages.
pub(crate) const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
