//! Storage schema conventions
//!
//! A backend ingesting batches may settle into any of several layouts: a
//! name/value pair per document or one field per metric, with the five
//! attributes flattened under one of several namespaces. A [`FieldMapping`]
//! describes one such layout and translates between it and the generator's
//! records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::telemetry::{Measurement, MeasurementAttributes, MetricName};

/// A flat stored document, keyed by dotted field names
pub type Document = Map<String, Value>;

/// Default number of rows requested per query
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// How the metric itself is located in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricLayout {
    /// The metric name and its value live in two fixed fields
    NameValue {
        /// Field holding the dotted metric name
        name_field: String,
        /// Field holding the numeric value
        value_field: String,
    },
    /// The value lives in a field named after the metric
    FieldPerMetric {
        /// Prefix prepended to the metric name
        prefix: String,
    },
}

/// Where the five attributes are flattened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeNamespace {
    /// `attributes.<key>`
    Attributes,
    /// `resource.attributes.<key>`
    ResourceAttributes,
    /// `labels.<key>`
    Labels,
    /// `<key>`
    TopLevel,
}

impl AttributeNamespace {
    /// Prefix prepended to attribute keys
    pub fn prefix(&self) -> &'static str {
        match self {
            AttributeNamespace::Attributes => "attributes.",
            AttributeNamespace::ResourceAttributes => "resource.attributes.",
            AttributeNamespace::Labels => "labels.",
            AttributeNamespace::TopLevel => "",
        }
    }

    /// Fully qualified field for an attribute key
    pub fn field(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }
}

/// One storage schema convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Short label used in logs and outcomes
    pub label: String,
    /// Metric placement
    pub metric: MetricLayout,
    /// Field holding the capture time in epoch milliseconds
    pub timestamp_field: String,
    /// Attribute placement
    pub namespace: AttributeNamespace,
}

impl fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A query for one metric, optionally narrowed by attributes and time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuery {
    /// Metric to fetch
    pub metric: MetricName,
    /// Exact-match attribute filters keyed by dotted attribute key
    pub attributes: BTreeMap<String, String>,
    /// Inclusive lower bound on the capture time
    pub from_ms: Option<i64>,
    /// Inclusive upper bound on the capture time
    pub to_ms: Option<i64>,
    /// Maximum number of rows
    pub limit: usize,
}

impl MetricQuery {
    /// Query every stored value of a metric
    pub fn new(metric: MetricName) -> Self {
        Self { metric, attributes: BTreeMap::new(), from_ms: None, to_ms: None, limit: DEFAULT_QUERY_LIMIT }
    }

    /// Require an attribute value
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Restrict to an inclusive time window
    pub fn between(mut self, from_ms: i64, to_ms: i64) -> Self {
        self.from_ms = Some(from_ms);
        self.to_ms = Some(to_ms);
        self
    }

    /// Cap the number of rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Backend-neutral filter clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals value
    Term {
        /// Field name
        field: String,
        /// Required value
        value: Value,
    },
    /// Numeric field within inclusive bounds
    Range {
        /// Field name
        field: String,
        /// Lower bound
        gte: Option<i64>,
        /// Upper bound
        lte: Option<i64>,
    },
    /// Field is present
    Exists {
        /// Field name
        field: String,
    },
}

/// Backend-neutral search request: every filter must match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Conjunction of filter clauses
    pub filters: Vec<Filter>,
    /// Maximum number of hits
    pub limit: usize,
}

/// One query result mapped back to the generator's vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Metric the value belongs to
    pub metric: MetricName,
    /// Observed value
    pub value: f64,
    /// Capture time in epoch milliseconds
    pub timestamp_ms: i64,
    /// Attributes recovered from the document; missing ones are empty
    pub attributes: MeasurementAttributes,
}

impl FieldMapping {
    /// The fixed candidate list, in priority order
    ///
    /// 1. the batch's own shape: `name`/`value`, `timestampMs`, `attributes.*`
    /// 2. OpenTelemetry-style: `metrics.<name>`, `@timestamp`, `resource.attributes.*`
    /// 3. label-style: `__name__`/`value`, `timestamp`, `labels.*`
    /// 4. fully flat: `<name>`, `@timestamp`, top-level attributes
    pub fn candidates() -> Vec<FieldMapping> {
        vec![
            FieldMapping {
                label: "name-value".to_string(),
                metric: MetricLayout::NameValue {
                    name_field: "name".to_string(),
                    value_field: "value".to_string(),
                },
                timestamp_field: "timestampMs".to_string(),
                namespace: AttributeNamespace::Attributes,
            },
            FieldMapping {
                label: "otel-metrics".to_string(),
                metric: MetricLayout::FieldPerMetric { prefix: "metrics.".to_string() },
                timestamp_field: "@timestamp".to_string(),
                namespace: AttributeNamespace::ResourceAttributes,
            },
            FieldMapping {
                label: "labels".to_string(),
                metric: MetricLayout::NameValue {
                    name_field: "__name__".to_string(),
                    value_field: "value".to_string(),
                },
                timestamp_field: "timestamp".to_string(),
                namespace: AttributeNamespace::Labels,
            },
            FieldMapping {
                label: "flat".to_string(),
                metric: MetricLayout::FieldPerMetric { prefix: String::new() },
                timestamp_field: "@timestamp".to_string(),
                namespace: AttributeNamespace::TopLevel,
            },
        ]
    }

    /// Field holding a metric's value under this convention
    pub fn value_field(&self, metric: MetricName) -> String {
        match &self.metric {
            MetricLayout::NameValue { value_field, .. } => value_field.clone(),
            MetricLayout::FieldPerMetric { prefix } => format!("{}{}", prefix, metric.as_str()),
        }
    }

    /// Render a measurement as a stored document
    pub fn flatten(&self, measurement: &Measurement) -> Document {
        let mut doc = Document::new();

        match &self.metric {
            MetricLayout::NameValue { name_field, value_field } => {
                doc.insert(name_field.clone(), Value::from(measurement.name.as_str()));
                doc.insert(value_field.clone(), Value::from(measurement.value));
            }
            MetricLayout::FieldPerMetric { .. } => {
                doc.insert(self.value_field(measurement.name), Value::from(measurement.value));
            }
        }

        doc.insert(self.timestamp_field.clone(), Value::from(measurement.timestamp_ms));
        for (key, value) in measurement.attributes.pairs() {
            doc.insert(self.namespace.field(key), Value::from(value));
        }
        doc
    }

    /// Build the search request for a query under this convention
    pub fn build_request(&self, query: &MetricQuery) -> SearchRequest {
        let mut filters = Vec::new();

        match &self.metric {
            MetricLayout::NameValue { name_field, value_field } => {
                filters.push(Filter::Term {
                    field: name_field.clone(),
                    value: Value::from(query.metric.as_str()),
                });
                filters.push(Filter::Exists { field: value_field.clone() });
            }
            MetricLayout::FieldPerMetric { .. } => {
                filters.push(Filter::Exists { field: self.value_field(query.metric) });
            }
        }

        for (key, value) in &query.attributes {
            filters.push(Filter::Term { field: self.namespace.field(key), value: Value::from(value.as_str()) });
        }

        if query.from_ms.is_some() || query.to_ms.is_some() {
            filters.push(Filter::Range {
                field: self.timestamp_field.clone(),
                gte: query.from_ms,
                lte: query.to_ms,
            });
        }

        SearchRequest { filters, limit: query.limit }
    }

    /// Map a hit back to a row; `None` when value or timestamp is missing
    pub fn extract_row(&self, metric: MetricName, doc: &Document) -> Option<MetricRow> {
        let value = doc.get(&self.value_field(metric))?.as_f64()?;
        let timestamp_ms = doc.get(&self.timestamp_field)?.as_i64()?;

        let attribute = |key: &str| {
            doc.get(&self.namespace.field(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(MetricRow {
            metric,
            value,
            timestamp_ms,
            attributes: MeasurementAttributes {
                site_id: attribute("site.id"),
                site_name: attribute("site.name"),
                region: attribute("region"),
                device_type: attribute("device.type"),
                device_id: attribute("device.id"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::generate_batch_at;

    #[test]
    fn test_candidate_order() {
        let labels: Vec<String> = FieldMapping::candidates().into_iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["name-value", "otel-metrics", "labels", "flat"]);
    }

    #[test]
    fn test_flatten_name_value() {
        let batch = generate_batch_at(42, 0, None, 1_000);
        let doc = FieldMapping::candidates()[0].flatten(&batch.measurements[0]);

        assert_eq!(doc["name"], "chemical.dosing_rate_lpm");
        assert_eq!(doc["value"], 0.9793162235990167);
        assert_eq!(doc["timestampMs"], 1_000);
        assert_eq!(doc["attributes.device.id"], "HOSP-001-PUMP-2");
        assert_eq!(doc.len(), 8);
    }

    #[test]
    fn test_flatten_field_per_metric() {
        let batch = generate_batch_at(42, 0, None, 1_000);
        let doc = FieldMapping::candidates()[1].flatten(&batch.measurements[0]);

        assert_eq!(doc["metrics.chemical.dosing_rate_lpm"], 0.9793162235990167);
        assert_eq!(doc["@timestamp"], 1_000);
        assert_eq!(doc["resource.attributes.region"], "NA");
        assert!(doc.get("name").is_none());
    }

    #[test]
    fn test_build_request() {
        let mapping = &FieldMapping::candidates()[2];
        let query = MetricQuery::new(MetricName::WaterPh)
            .with_attribute("site.id", "FOOD-003")
            .between(10, 20)
            .with_limit(5);
        let request = mapping.build_request(&query);

        assert_eq!(request.limit, 5);
        assert_eq!(
            request.filters,
            vec![
                Filter::Term { field: "__name__".to_string(), value: Value::from("water.ph") },
                Filter::Exists { field: "value".to_string() },
                Filter::Term { field: "labels.site.id".to_string(), value: Value::from("FOOD-003") },
                Filter::Range { field: "timestamp".to_string(), gte: Some(10), lte: Some(20) },
            ]
        );
    }

    #[test]
    fn test_extract_row_recovers_measurement() {
        let batch = generate_batch_at(3, 1, None, 55);
        for mapping in FieldMapping::candidates() {
            let measurement = &batch.measurements[7];
            let doc = mapping.flatten(measurement);
            let row = mapping.extract_row(measurement.name, &doc).unwrap();
            assert_eq!(row.value, measurement.value);
            assert_eq!(row.timestamp_ms, 55);
            assert_eq!(row.attributes, measurement.attributes);
        }
    }

    #[test]
    fn test_extract_row_requires_value() {
        let mapping = &FieldMapping::candidates()[3];
        let mut doc = Document::new();
        doc.insert("@timestamp".to_string(), Value::from(1));
        assert!(mapping.extract_row(MetricName::WaterPh, &doc).is_none());
    }
}
