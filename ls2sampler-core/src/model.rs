//! Parsed listing model
//!
//! A [`Listing`] maps each set name to the [`SetRecord`] assembled from its
//! metadata row and its data block. The two blocks are far apart in the
//! listing, so records are merged by name rather than built in one go.

use crate::decoder::{Value, ValueType};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// One row of a set's metric list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    /// Single-character role flag (`M` meta, `D` data)
    pub metric_kind: char,
    pub value_type: ValueType,
    /// Value token with any unit suffix removed (kept whole for `char[]`)
    pub raw_value: String,
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.metric_kind, self.value_type, &self.raw_value).serialize(serializer)
    }
}

/// Columns of the `-v` metadata table for one set
///
/// Numeric columns are kept as printed; nothing downstream does arithmetic
/// on them and the timing columns would lose digits as floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetMetadata {
    pub schema: String,
    /// Instance name with the producer prefix removed
    pub instance: String,
    pub flags: String,
    #[serde(rename = "meta_sz")]
    pub meta_size: String,
    #[serde(rename = "data_sz")]
    pub data_size: String,
    pub uid: String,
    pub gid: String,
    #[serde(rename = "perm")]
    pub permissions: String,
    pub update: String,
    pub duration: String,
    pub info: Option<String>,
}

/// Everything the listing says about one set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetRecord {
    name: String,
    #[serde(rename = "ts")]
    timestamp: Option<String>,
    #[serde(rename = "meta")]
    metadata: Option<SetMetadata>,
    metrics: IndexMap<String, Metric>,
    data: IndexMap<String, Value>,
    data_type: IndexMap<String, ValueType>,
}

impl SetRecord {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            metadata: None,
            metrics: IndexMap::new(),
            data: IndexMap::new(),
            data_type: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last update time from the set header, as printed
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn metadata(&self) -> Option<&SetMetadata> {
        self.metadata.as_ref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.metadata.as_ref().map(|meta| meta.schema.as_str())
    }

    /// Metrics in listing order
    pub fn metrics(&self) -> &IndexMap<String, Metric> {
        &self.metrics
    }

    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn data_type(&self) -> &IndexMap<String, ValueType> {
        &self.data_type
    }

    /// True once a set header for this record has been seen
    pub fn has_data_block(&self) -> bool {
        self.timestamp.is_some()
    }

    pub(crate) fn set_metadata(&mut self, metadata: SetMetadata) {
        self.metadata = Some(metadata);
    }

    /// Start a new data block. Metrics from an earlier block are dropped.
    pub(crate) fn begin_data_block(&mut self, timestamp: impl Into<String>) {
        self.timestamp = Some(timestamp.into());
        self.metrics.clear();
        self.data.clear();
        self.data_type.clear();
    }

    /// Record one data row; the three metric maps always share a key set
    pub(crate) fn push_metric(&mut self, name: &str, metric: Metric, value: Value) {
        self.data_type.insert(name.to_string(), metric.value_type);
        self.data.insert(name.to_string(), value);
        self.metrics.insert(name.to_string(), metric);
    }
}

/// Parse result: set name to record, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Listing {
    sets: IndexMap<String, SetRecord>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SetRecord> {
        self.sets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SetRecord> {
        self.sets.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Fetch the record for `name`, creating an empty one on first sight
    pub(crate) fn record_mut(&mut self, name: &str) -> &mut SetRecord {
        self.sets.entry(name.to_string()).or_insert_with(|| SetRecord::new(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut SetRecord> {
        self.sets.get_mut(name)
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a SetRecord;
    type IntoIter = indexmap::map::Values<'a, String, SetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.values()
    }
}

/// Strip the producer prefix (everything up to and including the first `/`)
///
/// Names without a `/` are returned whole.
pub fn core_set_name(name: &str) -> &str {
    name.split_once('/').map_or(name, |(_, rest)| rest)
}
