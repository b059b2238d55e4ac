use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One analysis record as the backend sends it.
///
/// Every field is optional: a record with no ticker or no recommendation text still
/// belongs to the batch and is normalized with empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub short_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub short_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub long_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub long_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub overall: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub overall_confidence: Option<f64>,
    #[serde(default)]
    pub strategies: RawField,
    #[serde(default)]
    pub sources: RawField,
}

/// A list-typed field that the backend may send either parsed or JSON-encoded as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Text(String),
    List(Vec<Value>),
    #[default]
    Missing,
    Other(Value),
}

/// Decode a batch payload (a JSON array of records).
///
/// Elements that are not objects are skipped; objects always decode thanks to the lenient
/// field deserializers.
pub fn decode_batch(payload: Value) -> anyhow::Result<Vec<RawRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        // An empty result set is sometimes serialized as null.
        Value::Null => return Ok(Vec::new()),
        other => anyhow::bail!("analysis payload is not a JSON array: {other}"),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "skipping analysis record that is not an object");
            continue;
        }
        let record = serde_json::from_value::<RawRecord>(item)
            .with_context(|| format!("failed to decode analysis record at index {index}"))?;
        out.push(record);
    }
    Ok(out)
}

/// Decode the date whitelist payload (a JSON array of `YYYY-MM-DD` strings, or null).
pub fn decode_dates(payload: Value) -> anyhow::Result<Vec<String>> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value::<Vec<String>>(payload).context("dates payload is not a list of strings")
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Like `lenient_text`, with absent shapes decoding to an empty string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}
