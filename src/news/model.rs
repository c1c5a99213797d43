//! Upstream news payload types.
//!
//! The API has shipped several envelope shapes over time, so parsing is
//! lenient: the collection is located first, then each entry is decoded on
//! its own and entries that do not fit are skipped.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Keys under which the collection may be wrapped.
const ENVELOPE_KEYS: [&str; 3] = ["data", "value", "items"];

/// A single news entry as served by the upstream API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// HTML fragment.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub news_images: Vec<NewsImage>,
}

/// An image attached to a news entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewsImage {
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default, deserialize_with = "truthy")]
    pub main_image: bool,
}

impl NewsItem {
    /// True if `requested` equals this item's id or slug exactly.
    pub fn matches(&self, requested: &str) -> bool {
        self.id.as_deref() == Some(requested) || self.slug.as_deref() == Some(requested)
    }

    /// Path of the preferred share image: the one flagged main, else the first
    /// one that has a path.
    pub fn preferred_image(&self) -> Option<&str> {
        let usable = |img: &&NewsImage| img.path.as_deref().is_some_and(|p| !p.trim().is_empty());

        self.news_images
            .iter()
            .filter(usable)
            .find(|img| img.main_image)
            .or_else(|| self.news_images.iter().find(usable))
            .and_then(|img| img.path.as_deref())
    }
}

/// Normalize any known payload shape into a list of items.
///
/// Accepts a raw array, or an object with the array under `data`, `value` or
/// `items`, including one extra level of nesting (paginated envelopes).
pub fn normalize_payload(payload: &Value) -> Vec<NewsItem> {
    let Some(entries) = locate_collection(payload, 2) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match NewsItem::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed news entry");
                None
            }
        })
        .collect()
}

fn locate_collection(value: &Value, depth: u8) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(map) if depth > 0 => ENVELOPE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|inner| locate_collection(inner, depth - 1)),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NewsImage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NewsImage>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let item = json!({ "id": 7, "title": "t" });
        let shapes = [
            json!([item.clone()]),
            json!({ "data": [item.clone()] }),
            json!({ "value": [item.clone()] }),
            json!({ "items": [item.clone()] }),
            json!({ "data": { "data": [item.clone()], "current_page": 1 } }),
        ];

        for shape in shapes {
            let items = normalize_payload(&shape);
            assert_eq!(items.len(), 1, "shape {}", shape);
            assert_eq!(items[0].id.as_deref(), Some("7"));
        }
    }

    #[test]
    fn test_unknown_shapes_are_empty() {
        assert!(normalize_payload(&json!({ "news": [] })).is_empty());
        assert!(normalize_payload(&json!("nope")).is_empty());
        assert!(normalize_payload(&json!({ "data": null })).is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let items = normalize_payload(&json!([
            { "id": 1, "title": "ok" },
            { "id": 2, "title": ["not", "a", "string"] },
            "garbage",
            { "id": "3", "news_images": null }
        ]));
        let ids: Vec<_> = items.iter().map(|i| i.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_matches_id_or_slug() {
        let item: NewsItem =
            serde_json::from_value(json!({ "id": 1011, "slug": "water-cut" })).unwrap();
        assert!(item.matches("1011"));
        assert!(item.matches("water-cut"));
        assert!(!item.matches("Water-Cut"));
        assert!(!item.matches("101"));
    }

    #[test]
    fn test_preferred_image() {
        let item: NewsItem = serde_json::from_value(json!({
            "id": 1,
            "news_images": [
                { "path": "first.jpg", "main_image": 0 },
                { "path": "main.jpg", "main_image": "1" }
            ]
        }))
        .unwrap();
        assert_eq!(item.preferred_image(), Some("main.jpg"));

        let item: NewsItem = serde_json::from_value(json!({
            "id": 1,
            "news_images": [{ "path": "", "main_image": 1 }, { "path": "second.jpg" }]
        }))
        .unwrap();
        assert_eq!(item.preferred_image(), Some("second.jpg"));

        let item: NewsItem = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(item.preferred_image(), None);
    }
}
