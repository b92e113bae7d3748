//! Listing parser
//!
//! Single pass over `ldms_ls -l [-v]` output. The parser tracks whether it is
//! inside the `-v` metadata table and which set's data block is open, and
//! folds every classified line into a [`Listing`].

use crate::classifier::{DataRow, Line, LineClassifier, MetaRow};
use crate::decoder::ValueType;
use crate::error::ParseError;
use crate::model::{Listing, Metric, SetMetadata, core_set_name};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace, warn};

const INSIDE_META: &str = "inside a metadata section";
const OUTSIDE_META: &str = "outside a metadata section";
const AFTER_SET_HEADER: &str = "a set header before metric rows";

/// Whether the parser is inside the metadata table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    OutsideMeta,
    /// Carries the line that opened the section
    InsideMeta { opened_at: usize },
}

/// Parses listing text into a [`Listing`]
#[derive(Default)]
pub struct ListingParser {
    classifier: LineClassifier,
}

impl ListingParser {
    pub fn new() -> Self {
        Self { classifier: LineClassifier::new() }
    }

    /// Parse the whole text. Nothing is returned unless every line is valid.
    pub fn parse(&self, text: &str) -> Result<Listing, ParseError> {
        let mut context = ParseContext::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let text = raw.trim();

            if text.is_empty() {
                context.end_set_block();
                continue;
            }

            let line = self
                .classifier
                .classify(text)
                .ok_or_else(|| ParseError::classification(line_no, text))?;
            trace!(line = line_no, shape = line.shape().name(), "classified");

            context.apply(line_no, text, line)?;
        }

        context.finish()
    }
}

/// Mutable state carried across lines
#[derive(Default)]
struct ParseContext {
    section_state: SectionState,
    /// Key of the set whose data block is open
    current_set: Option<String>,
    listing: Listing,
}

impl ParseContext {
    fn apply(&mut self, line_no: usize, text: &str, line: Line<'_>) -> Result<(), ParseError> {
        let shape = line.shape();
        let inside = matches!(self.section_state, SectionState::InsideMeta { .. });

        if shape.is_meta() {
            let opens = matches!(line, Line::MetaHeader);
            if opens == inside {
                let expected = if opens { OUTSIDE_META } else { INSIDE_META };
                return Err(ParseError::section_state(line_no, shape.name(), expected, text));
            }
        } else if inside {
            return Err(ParseError::section_state(line_no, shape.name(), OUTSIDE_META, text));
        }

        match line {
            Line::MetaHeader => {
                debug!(line = line_no, "entering metadata section");
                self.section_state = SectionState::InsideMeta { opened_at: line_no };
            }
            Line::MetaDashes => {}
            Line::MetaSummary(summary) => {
                debug!(
                    total_sets = summary.total_sets,
                    meta_kb = summary.meta_kb,
                    data_kb = summary.data_kb,
                    memory_kb = summary.memory_kb,
                    "metadata summary"
                );
            }
            Line::MetaEnd => {
                debug!(line = line_no, "leaving metadata section");
                self.section_state = SectionState::OutsideMeta;
            }
            Line::MetaRow(row) => self.apply_meta_row(row),
            Line::SetHeader { set_name, timestamp } => {
                let name = core_set_name(set_name);
                debug!(line = line_no, set = name, "set header");
                self.listing.record_mut(name).begin_data_block(timestamp);
                self.current_set = Some(name.to_string());
            }
            Line::DataRow(row) => self.apply_data_row(line_no, text, row)?,
        }
        Ok(())
    }

    fn apply_meta_row(&mut self, row: MetaRow<'_>) {
        let name = core_set_name(row.instance);
        let metadata = SetMetadata {
            schema: row.schema.to_string(),
            instance: name.to_string(),
            flags: row.flags.to_string(),
            meta_size: row.meta_size.to_string(),
            data_size: row.data_size.to_string(),
            uid: row.uid.to_string(),
            gid: row.gid.to_string(),
            permissions: row.permissions.to_string(),
            update: row.update.to_string(),
            duration: row.duration.to_string(),
            info: row.info.map(str::to_string),
        };
        self.listing.record_mut(name).set_metadata(metadata);
    }

    fn apply_data_row(
        &mut self,
        line_no: usize,
        text: &str,
        row: DataRow<'_>,
    ) -> Result<(), ParseError> {
        let record = self
            .current_set
            .as_deref()
            .and_then(|name| self.listing.get_mut(name))
            .ok_or_else(|| ParseError::section_state(line_no, "data row", AFTER_SET_HEADER, text))?;

        let decoded = row
            .type_tag
            .parse::<ValueType>()
            .and_then(|value_type| Ok((value_type, value_type.decode(row.value)?)));
        let (value_type, value) = decoded.map_err(|e| ParseError::decode(line_no, row.name, e))?;

        let metric = Metric {
            metric_kind: row.flag,
            value_type,
            raw_value: row.value.to_string(),
        };
        record.push_metric(row.name, metric, value);
        Ok(())
    }

    fn end_set_block(&mut self) {
        self.current_set = None;
    }

    fn finish(self) -> Result<Listing, ParseError> {
        if let SectionState::InsideMeta { opened_at } = self.section_state {
            return Err(ParseError::UnterminatedSection { opened_at });
        }
        for record in self.listing.iter() {
            if !record.has_data_block() {
                warn!(set = record.name(), "set has metadata but no data block");
            }
        }
        Ok(self.listing)
    }
}

/// Parse listing text with a fresh [`ListingParser`]
pub fn parse_listing(text: &str) -> Result<Listing, ParseError> {
    let listing = ListingParser::new().parse(text)?;
    info!("Parsed {} sets", listing.len());
    Ok(listing)
}

/// Read a listing file and parse it
pub fn read_listing<P: AsRef<Path>>(path: P) -> Result<Listing> {
    let path = path.as_ref();
    info!("Loading listing file: {:?}", path);

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing file: {:?}", path))?;

    parse_listing(&text).with_context(|| format!("Failed to parse listing file: {:?}", path))
}
