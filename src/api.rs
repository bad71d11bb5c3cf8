//! Wire records of the JSON API
//!
//! The API has no stable contract, so every field is optional and decoded
//! leniently: scalars arrive as strings or numbers, nested objects may be
//! missing or of the wrong shape. A field that does not fit becomes `None`
//! instead of failing the whole response; a list item that is not an object
//! is dropped.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// `{ "result": { "items": [...], "pagination": {...} } }`
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient")]
    pub result: Option<Listing<T>>,
}

impl<T> Envelope<T> {
    pub fn into_items(self) -> Vec<T> {
        self.result.map(|r| r.items).unwrap_or_default()
    }

    pub fn last_page(&self) -> Option<u32> {
        self.result
            .as_ref()
            .and_then(|r| r.pagination.as_ref())
            .and_then(|p| p.last_page)
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Listing<T> {
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<T>,
    #[serde(default, deserialize_with = "lenient")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub last_page: Option<u32>,
}

/// Search hit
#[derive(Debug, Default, Deserialize)]
pub struct MangaRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub hash_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alt_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub poster: Option<Poster>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Poster {
    #[serde(default, deserialize_with = "lenient_string")]
    pub large: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub small: Option<String>,
}

impl Poster {
    /// Largest non-empty variant
    pub fn best(&self) -> Option<&str> {
        [&self.large, &self.medium, &self.small]
            .into_iter()
            .find_map(|v| non_empty(v.as_deref()))
    }
}

/// Chapter listing item
#[derive(Debug, Default, Deserialize)]
pub struct ChapterRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub chapter_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub scanlation_group: Option<ScanlationGroup>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanlationGroup {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Trimmed value, `None` when blank
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(arr) => arr
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(items)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(number.map(|n| n.min(u32::MAX as u64) as u32))
}
