use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat feature name → value mapping produced by the normalizer.
pub type FeatureMap = Map<String, Value>;

// ============ Provider Models ============

/// Identifiers sent to the lead endpoint (e.g. `email`, `phone`).
///
/// Serializes as a plain JSON object, which is exactly the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadQuery(Map<String, Value>);

impl LeadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Parameter names only; values may be personal data and stay out of logs.
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for LeadQuery {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Nested lead record found under `transaction.output` in a provider response.
///
/// Known sections are `data` (personal fields), `demo` (demographics keyed by
/// field then qualifier) and `score` (ordered list of named scores). Any of them
/// may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadRecord(Map<String, Value>);

impl LeadRecord {
    /// Wraps a JSON object. Returns `None` for any other JSON type.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Personal identity fields.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("data").and_then(Value::as_object)
    }

    /// Demographic fields.
    pub fn demo(&self) -> Option<&Map<String, Value>> {
        self.0.get("demo").and_then(Value::as_object)
    }

    /// Score entries in provider order.
    pub fn scores(&self) -> Option<&Vec<Value>> {
        self.0.get("score").and_then(Value::as_array)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for LeadRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============ API Response Models ============

/// Response body for both lead endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadFeaturesResponse {
    /// Whether the provider returned a lead record.
    pub matched: bool,
    /// Normalized features, empty when there was no match.
    pub features: FeatureMap,
    /// Feature keys set by more than one section; the later section's value won.
    pub overridden_features: Vec<String>,
    /// When the features were produced; feature stores key records by it.
    pub event_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_serializes_as_plain_object() {
        let query = LeadQuery::new()
            .with("phone", 3124784892u64)
            .with("email", "someone@example.com");

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"phone": 3124784892u64, "email": "someone@example.com"})
        );
        assert_eq!(query.len(), 2);
        assert!(query.keys().contains(&"phone"));
    }

    #[test]
    fn test_record_sections_ignore_wrong_types() {
        let record = LeadRecord::from_value(json!({
            "data": "not an object",
            "demo": {"age": {"years": 45}},
            "score": {"name": "not a list"}
        }))
        .unwrap();

        assert!(record.data().is_none());
        assert!(record.demo().is_some());
        assert!(record.scores().is_none());
    }

    #[test]
    fn test_record_from_non_object() {
        assert!(LeadRecord::from_value(json!([1, 2])).is_none());
        assert!(LeadRecord::from_value(Value::Null).is_none());
    }
}
