//! Line classifier
//!
//! Turns one trimmed listing line into a typed [`Line`], borrowing its
//! fields from the input. Shapes are tried in the fixed priority order of
//! [`LineShape::PRIORITY`]; the first pattern that matches decides.

use crate::decoder::ValueType;
use regex::Captures;
use regex_utils::ldms_ls::{LineShape, ShapeMatcher};

/// Columns captured from a metadata table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRow<'l> {
    pub schema: &'l str,
    pub instance: &'l str,
    pub flags: &'l str,
    pub meta_size: &'l str,
    pub data_size: &'l str,
    pub uid: &'l str,
    pub gid: &'l str,
    pub permissions: &'l str,
    pub update: &'l str,
    pub duration: &'l str,
    pub info: Option<&'l str>,
}

/// Fields of the `Total Sets: ...` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSummary<'l> {
    pub total_sets: &'l str,
    pub meta_kb: &'l str,
    pub data_kb: &'l str,
    pub memory_kb: &'l str,
}

/// A metric row of a set's data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow<'l> {
    pub flag: char,
    pub type_tag: &'l str,
    pub name: &'l str,
    /// Value token. For every type but `char[]` this stops at the first space
    /// and any unit suffix is dropped.
    pub value: &'l str,
}

/// One classified listing line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'l> {
    MetaHeader,
    MetaDashes,
    MetaRow(MetaRow<'l>),
    MetaSummary(MetaSummary<'l>),
    MetaEnd,
    SetHeader { set_name: &'l str, timestamp: &'l str },
    DataRow(DataRow<'l>),
}

impl Line<'_> {
    pub fn shape(&self) -> LineShape {
        match self {
            Line::MetaHeader => LineShape::MetaHeader,
            Line::MetaDashes => LineShape::MetaDashes,
            Line::MetaRow(_) => LineShape::MetaRow,
            Line::MetaSummary(_) => LineShape::MetaSummary,
            Line::MetaEnd => LineShape::MetaEnd,
            Line::SetHeader { .. } => LineShape::SetHeader,
            Line::DataRow(_) => LineShape::DataRow,
        }
    }
}

/// Classifies listing lines
#[derive(Default)]
pub struct LineClassifier {
    matcher: ShapeMatcher,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self { matcher: ShapeMatcher::new() }
    }

    /// Classify `line`, or return `None` when no shape fits
    pub fn classify<'l>(&self, line: &'l str) -> Option<Line<'l>> {
        let (shape, caps) = self.matcher.match_line(line)?;
        let line = match shape {
            LineShape::MetaHeader => Line::MetaHeader,
            LineShape::MetaDashes => Line::MetaDashes,
            LineShape::MetaEnd => Line::MetaEnd,
            LineShape::MetaRow => Line::MetaRow(MetaRow {
                schema: field(&caps, "schema"),
                instance: field(&caps, "instance"),
                flags: field(&caps, "flags").trim(),
                meta_size: field(&caps, "meta_size"),
                data_size: field(&caps, "data_size"),
                uid: field(&caps, "uid"),
                gid: field(&caps, "gid"),
                permissions: field(&caps, "perm"),
                update: field(&caps, "update"),
                duration: field(&caps, "duration"),
                info: caps.name("info").map(|m| m.as_str()),
            }),
            LineShape::MetaSummary => Line::MetaSummary(MetaSummary {
                total_sets: field(&caps, "total_sets"),
                meta_kb: field(&caps, "meta_kb"),
                data_kb: field(&caps, "data_kb"),
                memory_kb: field(&caps, "mem_kb"),
            }),
            LineShape::SetHeader => Line::SetHeader {
                set_name: field(&caps, "set_name"),
                timestamp: field(&caps, "ts"),
            },
            LineShape::DataRow => Line::DataRow(data_row(&caps)),
        };
        Some(line)
    }
}

fn field<'l>(caps: &Captures<'l>, name: &str) -> &'l str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn data_row<'l>(caps: &Captures<'l>) -> DataRow<'l> {
    let type_tag = field(caps, "type");
    let full_value = field(caps, "value");
    let unit_suffix = type_tag.parse::<ValueType>().map_or(true, ValueType::has_unit_suffix);
    let value = if unit_suffix {
        full_value.split_once(' ').map_or(full_value, |(value, _)| value)
    } else {
        full_value
    };
    DataRow {
        flag: field(caps, "flag").chars().next().unwrap_or_default(),
        type_tag,
        name: field(caps, "name"),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<Line<'_>> {
        LineClassifier::new().classify(line)
    }

    #[test]
    fn test_meta_row_fields() {
        let line = "S P/I C 10 20 1000 100 -rwxr-xr-- 1.5 0.25 some info";
        let Some(Line::MetaRow(row)) = classify(line) else {
            panic!("expected a metadata row");
        };
        assert_eq!(row.schema, "S");
        assert_eq!(row.instance, "P/I");
        assert_eq!(row.flags, "C");
        assert_eq!(row.meta_size, "10");
        assert_eq!(row.data_size, "20");
        assert_eq!(row.uid, "1000");
        assert_eq!(row.gid, "100");
        assert_eq!(row.permissions, "-rwxr-xr--");
        assert_eq!(row.update, "1.5");
        assert_eq!(row.duration, "0.25");
        assert_eq!(row.info, Some("some info"));
    }

    #[test]
    fn test_summary_fields() {
        let line = "Total Sets: 2, Meta Data (kB): 3.90, Data (kB): 0.93, Memory (kB): 4.83";
        assert_eq!(
            classify(line),
            Some(Line::MetaSummary(MetaSummary {
                total_sets: "2",
                meta_kb: "3.90",
                data_kb: "0.93",
                memory_kb: "4.83",
            }))
        );
    }

    #[test]
    fn test_set_header() {
        assert_eq!(
            classify("P/I: consistent, last update: T"),
            Some(Line::SetHeader { set_name: "P/I", timestamp: "T" })
        );
    }

    #[test]
    fn test_unit_is_split_off() {
        let Some(Line::DataRow(row)) = classify("D f32 freq 3.14 Hz") else {
            panic!("expected a data row");
        };
        assert_eq!(row.flag, 'D');
        assert_eq!(row.type_tag, "f32");
        assert_eq!(row.name, "freq");
        assert_eq!(row.value, "3.14");
    }

    #[test]
    fn test_char_array_keeps_whole_value() {
        let Some(Line::DataRow(row)) = classify("M char[] label \"hello world\"") else {
            panic!("expected a data row");
        };
        assert_eq!(row.value, "\"hello world\"");
    }

    #[test]
    fn test_structural_lines() {
        assert_eq!(
            classify("Schema Instance Flags Msize Dsize UID GID Perm Update Duration Info"),
            Some(Line::MetaHeader)
        );
        assert_eq!(classify("---- ---- ----"), Some(Line::MetaDashes));
        assert_eq!(classify("===="), Some(Line::MetaEnd));
        assert_eq!(classify("===").map(|line| line.shape()), Some(LineShape::MetaEnd));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(classify("garbage"), None);
        assert_eq!(classify(""), None);
    }
}
