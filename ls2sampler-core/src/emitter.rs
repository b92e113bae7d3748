//! Sampler configuration emitter
//!
//! Turns a [`Listing`] into the directive lines that load and configure a
//! `test_sampler` plugin instance replaying the listed sets:
//!
//! ```text
//! load name=test_sampler
//! config name=test_sampler action=add_schema schema=S metrics=m:D:u32:7
//! config name=test_sampler action=add_set instance=${HOSTNAME}_${PORT}/I
//! config name=test_sampler producer=${HOSTNAME}_${PORT}
//! start name=test_sampler interval=1000000 offset=0
//! ```

use crate::decoder::ValueType;
use crate::error::EmitError;
use crate::model::Listing;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use tracing::debug;

pub const DEFAULT_PLUGIN: &str = "test_sampler";
pub const DEFAULT_PRODUCER: &str = "${HOSTNAME}_${PORT}";
pub const DEFAULT_INTERVAL: &str = "1000000";
pub const DEFAULT_OFFSET: &str = "0";

/// Values substituted into the directives
///
/// The producer template is written out verbatim; `${...}` references are
/// expanded by whatever consumes the directives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerSettings {
    /// Plugin instance name
    pub plugin: String,
    /// Producer name template
    pub producer: String,
    /// Sample interval in microseconds
    pub interval: String,
    /// Sample offset in microseconds
    pub offset: String,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            plugin: DEFAULT_PLUGIN.to_string(),
            producer: DEFAULT_PRODUCER.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            offset: DEFAULT_OFFSET.to_string(),
        }
    }
}

/// Schema names that already have an `add_schema` directive
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    seen: HashSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `schema`; returns false if it was already registered
    pub fn register(&mut self, schema: &str) -> bool {
        if self.seen.contains(schema) {
            return false;
        }
        self.seen.insert(schema.to_string())
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.seen.contains(schema)
    }
}

/// One `name:kind:type:value` entry of an `add_schema` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: String,
    pub kind: char,
    pub value_type: ValueType,
    pub value: String,
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.name, self.kind, self.value_type, self.value)
    }
}

/// A sampler configuration line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Load { plugin: String },
    AddSchema { plugin: String, schema: String, metrics: Vec<MetricSpec> },
    AddSet { plugin: String, producer: String, instance: String },
    Producer { plugin: String, producer: String },
    Start { plugin: String, interval: String, offset: String },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Load { plugin } => write!(f, "load name={plugin}"),
            Directive::AddSchema { plugin, schema, metrics } => {
                write!(f, "config name={plugin} action=add_schema schema={schema} metrics=")?;
                for (idx, metric) in metrics.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{metric}")?;
                }
                Ok(())
            }
            Directive::AddSet { plugin, producer, instance } => {
                write!(f, "config name={plugin} action=add_set instance={producer}/{instance}")
            }
            Directive::Producer { plugin, producer } => {
                write!(f, "config name={plugin} producer={producer}")
            }
            Directive::Start { plugin, interval, offset } => {
                write!(f, "start name={plugin} interval={interval} offset={offset}")
            }
        }
    }
}

/// Builds and writes the directive sequence for a listing
pub struct Emitter<'s> {
    settings: &'s SamplerSettings,
}

impl<'s> Emitter<'s> {
    pub fn new(settings: &'s SamplerSettings) -> Self {
        Self { settings }
    }

    /// Directives for `listing`, in emission order.
    ///
    /// Schemas already present in `registry` are not registered again, so
    /// one registry can be threaded through several listings.
    pub fn directives(
        &self,
        listing: &Listing,
        registry: &mut SchemaRegistry,
    ) -> Result<Vec<Directive>, EmitError> {
        let plugin = &self.settings.plugin;
        let mut sets = Vec::with_capacity(listing.len());
        for record in listing {
            let metadata = record
                .metadata()
                .ok_or_else(|| EmitError::MissingMetadata { set: record.name().to_string() })?;
            sets.push((record, metadata));
        }

        let mut directives = vec![Directive::Load { plugin: plugin.clone() }];

        for (record, metadata) in &sets {
            if !registry.register(&metadata.schema) {
                debug!(schema = %metadata.schema, set = record.name(), "schema already registered");
                continue;
            }
            let metrics = record
                .metrics()
                .iter()
                .map(|(name, metric)| MetricSpec {
                    name: name.clone(),
                    kind: metric.metric_kind,
                    value_type: metric.value_type,
                    value: metric.raw_value.clone(),
                })
                .collect();
            directives.push(Directive::AddSchema {
                plugin: plugin.clone(),
                schema: metadata.schema.clone(),
                metrics,
            });
        }

        directives.extend(sets.iter().map(|(_, metadata)| Directive::AddSet {
            plugin: plugin.clone(),
            producer: self.settings.producer.clone(),
            instance: metadata.instance.clone(),
        }));

        directives.push(Directive::Producer {
            plugin: plugin.clone(),
            producer: self.settings.producer.clone(),
        });
        directives.push(Directive::Start {
            plugin: plugin.clone(),
            interval: self.settings.interval.clone(),
            offset: self.settings.offset.clone(),
        });

        Ok(directives)
    }

    /// Write the directives for `listing` to `out`, one per line
    pub fn write_to<W: Write>(
        &self,
        listing: &Listing,
        registry: &mut SchemaRegistry,
        out: &mut W,
    ) -> Result<(), EmitError> {
        let directives = self.directives(listing, registry)?;
        for directive in &directives {
            writeln!(out, "{directive}")?;
        }
        out.flush()?;
        Ok(())
    }
}
