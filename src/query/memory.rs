//! In-process search backend
//!
//! Holds flattened documents and answers [`SearchRequest`]s the way a strict
//! document store would: term and range filters on a field it has never
//! indexed are rejected with a 400, while `exists` on such a field simply
//! matches nothing.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

use super::fallback::{MetricSearch, SearchError};
use super::mapping::{Document, FieldMapping, Filter, SearchRequest};
use crate::telemetry::Batch;

/// Documents indexed under whatever convention they were written with
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricStore {
    documents: Vec<Document>,
    known_fields: BTreeSet<String>,
}

impl InMemoryMetricStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one document
    pub fn insert(&mut self, doc: Document) {
        self.known_fields.extend(doc.keys().cloned());
        self.documents.push(doc);
    }

    /// Index every measurement of a batch under one convention
    pub fn ingest_batch(&mut self, batch: &Batch, mapping: &FieldMapping) {
        for measurement in &batch.measurements {
            self.insert(mapping.flatten(measurement));
        }
        trace!(step = batch.step_index, mapping = %mapping, total = self.len(), "Batch ingested");
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether any stored document carried this field
    pub fn knows_field(&self, field: &str) -> bool {
        self.known_fields.contains(field)
    }

    fn check_known(&self, field: &str) -> Result<(), SearchError> {
        if self.knows_field(field) {
            Ok(())
        } else {
            Err(SearchError::Client { status: 400, reason: format!("unknown field: {}", field) })
        }
    }

    fn matches(doc: &Document, filter: &Filter) -> bool {
        match filter {
            Filter::Term { field, value } => doc.get(field) == Some(value),
            Filter::Range { field, gte, lte } => match doc.get(field).and_then(Value::as_i64) {
                Some(v) => gte.map_or(true, |lo| v >= lo) && lte.map_or(true, |hi| v <= hi),
                None => false,
            },
            Filter::Exists { field } => doc.contains_key(field),
        }
    }
}

impl MetricSearch for InMemoryMetricStore {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, SearchError> {
        for filter in &request.filters {
            match filter {
                Filter::Term { field, .. } | Filter::Range { field, .. } => self.check_known(field)?,
                Filter::Exists { .. } => {}
            }
        }

        Ok(self
            .documents
            .iter()
            .filter(|doc| request.filters.iter().all(|f| Self::matches(doc, f)))
            .take(request.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::MetricQuery;
    use crate::telemetry::{generate_batch_at, MetricName};

    fn store(mapping: &FieldMapping) -> InMemoryMetricStore {
        let mut store = InMemoryMetricStore::new();
        store.ingest_batch(&generate_batch_at(42, 0, None, 100), mapping);
        store.ingest_batch(&generate_batch_at(42, 1, None, 200), mapping);
        store
    }

    #[test]
    fn test_term_and_range() {
        let mapping = &FieldMapping::candidates()[0];
        let store = store(mapping);
        assert_eq!(store.len(), 72);

        let query = MetricQuery::new(MetricName::DeviceStatus).with_attribute("region", "EMEA").between(150, 250);
        let hits = store.search(&mapping.build_request(&query)).unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|doc| doc["timestampMs"] == 200));
    }

    #[test]
    fn test_unknown_term_field_is_client_error() {
        let store = store(&FieldMapping::candidates()[0]);
        let foreign = &FieldMapping::candidates()[2];
        let err = store.search(&foreign.build_request(&MetricQuery::new(MetricName::WaterPh))).unwrap_err();
        assert_eq!(err, SearchError::Client { status: 400, reason: "unknown field: __name__".to_string() });
    }

    #[test]
    fn test_unknown_exists_field_matches_nothing() {
        let store = store(&FieldMapping::candidates()[0]);
        let per_metric = &FieldMapping::candidates()[1];
        let hits = store.search(&per_metric.build_request(&MetricQuery::new(MetricName::WaterPh))).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_limit() {
        let mapping = &FieldMapping::candidates()[3];
        let store = store(mapping);
        let hits = store
            .search(&mapping.build_request(&MetricQuery::new(MetricName::WaterPh).with_limit(2)))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}
