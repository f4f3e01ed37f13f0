//! Telemetry envelopes and batches
//!
//! An [`Envelope`] is the wire-level telemetry record accepted by the ingestion
//! endpoint. The delivery layer treats it as opaque: the only thing it ever does
//! with a [`Batch`] is address envelopes by position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A custom property value
///
/// Properties are limited to a small closed set of primitive kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Custom properties attached to a telemetry item
pub type Properties = BTreeMap<String, PropertyValue>;

/// Payload of an envelope (`baseData`)
///
/// `ver` and `properties` are typed; every other field (metrics, message,
/// duration...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorDomain {
    #[serde(rename = "ver", default = "default_schema_version")]
    pub version: i32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Default for MonitorDomain {
    fn default() -> Self {
        Self {
            version: default_schema_version(),
            properties: Properties::new(),
            fields: Map::new(),
        }
    }
}

fn default_schema_version() -> i32 {
    2
}

/// Envelope data section (`data`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_data: Option<MonitorDomain>,
}

/// One telemetry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Telemetry item name (e.g. `Microsoft.ApplicationInsights.Metric`)
    pub name: String,

    /// Event time
    pub time: DateTime<Utc>,

    /// Instrumentation key of the owning tenant
    #[serde(rename = "iKey", default, skip_serializing_if = "Option::is_none")]
    pub instrumentation_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,

    /// Context tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MonitorBase>,
}

impl Envelope {
    /// Creates an envelope with the given item name, stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: Utc::now(),
            instrumentation_key: None,
            sample_rate: None,
            tags: BTreeMap::new(),
            data: None,
        }
    }

    /// Sets the instrumentation key
    pub fn with_instrumentation_key(mut self, key: impl Into<String>) -> Self {
        self.instrumentation_key = Some(key.into());
        self
    }

    /// Sets the base type (e.g. `MetricData`)
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.data.get_or_insert_with(MonitorBase::default).base_type = Some(base_type.into());
        self
    }

    /// Adds a context tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a custom property to the payload
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.data
            .get_or_insert_with(MonitorBase::default)
            .base_data
            .get_or_insert_with(MonitorDomain::default)
            .properties
            .insert(key.into(), value.into());
        self
    }

    /// Adds an opaque payload field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data
            .get_or_insert_with(MonitorBase::default)
            .base_data
            .get_or_insert_with(MonitorDomain::default)
            .fields
            .insert(key.into(), value);
        self
    }
}

/// An ordered group of envelopes submitted together
///
/// Order is significant: partial-failure reports reference envelopes by index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<Envelope>);

impl Batch {
    pub fn new(envelopes: Vec<Envelope>) -> Self {
        Self(envelopes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn envelopes(&self) -> &[Envelope] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Envelope> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Envelope> {
        self.0
    }

    /// Builds a sub-batch from the given positions
    ///
    /// Positions are de-duplicated and taken in ascending order so the result
    /// keeps the original relative order. Out-of-range positions are skipped.
    pub fn select(&self, indices: &BTreeSet<usize>) -> Batch {
        Batch(
            indices
                .iter()
                .filter_map(|&i| self.0.get(i).cloned())
                .collect(),
        )
    }
}

impl From<Vec<Envelope>> for Batch {
    fn from(envelopes: Vec<Envelope>) -> Self {
        Self(envelopes)
    }
}

impl IntoIterator for Batch {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_names() {
        let envelope = Envelope::new("Microsoft.ApplicationInsights.Metric")
            .with_instrumentation_key("ikey")
            .with_base_type("MetricData")
            .with_tag("ai.cloud.role", "api")
            .with_property("region", "westeurope")
            .with_property("retries", 3i64)
            .with_field("metrics", json!([{"name": "HeartBeat", "value": 0}]));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["iKey"], "ikey");
        assert_eq!(value["data"]["baseType"], "MetricData");
        assert_eq!(value["data"]["baseData"]["ver"], 2);
        assert_eq!(value["data"]["baseData"]["properties"]["retries"], 3);
        assert_eq!(value["data"]["baseData"]["metrics"][0]["name"], "HeartBeat");
        assert_eq!(value["tags"]["ai.cloud.role"], "api");
    }

    #[test]
    fn test_property_values_keep_their_kind() {
        let raw = json!({
            "name": "evt",
            "time": "2025-01-01T00:00:00Z",
            "data": {
                "baseType": "EventData",
                "baseData": {
                    "ver": 2,
                    "name": "checkout",
                    "properties": {"ok": true, "count": 7, "ratio": 0.5, "user": "u1"}
                }
            }
        });

        let envelope: Envelope = serde_json::from_value(raw).unwrap();
        let domain = envelope.data.unwrap().base_data.unwrap();
        assert_eq!(domain.properties["ok"], PropertyValue::Bool(true));
        assert_eq!(domain.properties["count"], PropertyValue::Int(7));
        assert_eq!(domain.properties["ratio"], PropertyValue::Float(0.5));
        assert_eq!(domain.properties["user"], PropertyValue::from("u1"));
        assert_eq!(domain.fields["name"], "checkout");
    }

    #[test]
    fn test_batch_select_keeps_original_order() {
        let batch = Batch::new(vec![
            Envelope::new("a"),
            Envelope::new("b"),
            Envelope::new("c"),
            Envelope::new("d"),
        ]);

        let indices: BTreeSet<usize> = [3, 1, 3, 9].into_iter().collect();
        let selected = batch.select(&indices);

        let names: Vec<&str> = selected.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d"]);
    }

    #[test]
    fn test_batch_serializes_as_array() {
        let batch = Batch::new(vec![Envelope::new("a")]);
        let value = serde_json::to_value(&batch).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["name"], "a");
    }
}
