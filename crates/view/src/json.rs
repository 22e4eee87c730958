//! JSON view configuration.

use crate::spec::FilterSpec;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use prism_core::{Error, Record, Result, Value};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Map;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonSpec {
    #[serde(default, rename = "where")]
    where_eq: Option<Map<String, serde_json::Value>>,
    #[serde(default)]
    comparator: Option<String>,
    #[serde(default, deserialize_with = "present")]
    limit: Option<Option<u64>>,
    #[serde(default, deserialize_with = "present")]
    offset: Option<Option<u64>>,
    #[serde(default)]
    watched: Option<Vec<String>>,
    #[serde(default)]
    filter: Option<IgnoredAny>,
    #[serde(default)]
    filters: Option<IgnoredAny>,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> core::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn invalid(err: serde_json::Error) -> Error {
    Error::invalid_spec(format!("{}", err))
}

pub(crate) fn parse<M: Record + 'static>(input: &str) -> Result<FilterSpec<M>> {
    // Structs also deserialize from arrays, by position; only objects are specs.
    let object = match serde_json::from_str::<serde_json::Value>(input).map_err(invalid)? {
        serde_json::Value::Object(object) => object,
        _ => return Err(Error::invalid_spec("a view spec must be a JSON object")),
    };
    let raw: JsonSpec = serde_json::from_value(serde_json::Value::Object(object)).map_err(invalid)?;

    if raw.filter.is_some() || raw.filters.is_some() {
        return Err(Error::invalid_spec(
            "predicate functions cannot be given in JSON, use FilterSpec::filter",
        ));
    }

    let mut spec = FilterSpec::new();
    if let Some(clauses) = raw.where_eq {
        for (field, value) in clauses {
            let value = scalar(&field, value)?;
            spec = spec.where_eq(field, value);
        }
    }
    if let Some(field) = raw.comparator {
        if field.is_empty() {
            return Err(Error::invalid_spec("comparator must name a field"));
        }
        spec = spec.sort_by(field);
    }
    if let Some(limit) = raw.limit {
        spec.limit = Some(limit.map(|n| window("limit", n)).transpose()?);
    }
    if let Some(offset) = raw.offset {
        spec.offset = Some(offset.map(|n| window("offset", n)).transpose()?);
    }
    for field in raw.watched.into_iter().flatten() {
        spec = spec.watch(field);
    }
    Ok(spec)
}

fn scalar(field: &str, value: serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    match value {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int64)
            .or_else(|| n.as_f64().map(Value::Float64))
            .ok_or_else(|| Error::invalid_spec(format!("where.{}: unsupported number {}", field, n))),
        Json::String(s) => Ok(Value::String(s)),
        Json::Array(_) | Json::Object(_) => Err(Error::invalid_spec(format!(
            "where.{}: expected a scalar value",
            field
        ))),
    }
}

fn window(key: &str, n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| Error::invalid_spec(format!("{} {} is out of range", key, n)))
}
