//! Regex utilities for ls2sampler
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Compiled patterns for the lines printed by `ldms_ls -l [-v]`
///
/// Every pattern is anchored at the start of the line only, so trailing text
/// after a recognised prefix does not prevent a match. Callers are expected to
/// trim the line first.
pub mod ldms_ls {
    use super::*;
    use regex::Captures;

    /// Column titles that open the `-v` metadata table
    pub static META_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^Schema\s+Instance\s+Flags.*\s+Info").expect("Invalid regex pattern")
    });

    /// Table rule made of dashes and spaces
    pub static META_DASHES: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[ -]+$").expect("Invalid regex pattern"));

    /// One row of the metadata table
    pub static META_ROW: Lazy<Regex> = Lazy::new(|| {
        Regex::new(concat!(
            r"^(?P<schema>\S+)\s+",
            r"(?P<instance>\S+)\s+",
            r"(?P<flags>\D+)\s+",
            r"(?P<meta_size>\d+)\s+",
            r"(?P<data_size>\d+)\s+",
            r"(?P<uid>\d+)\s+",
            r"(?P<gid>\d+)\s+",
            r"(?P<perm>-(?:[r-][w-][x-]){3})\s+",
            r"(?P<update>\d+\.\d+)\s+",
            r"(?P<duration>\d+\.\d+)",
            r"(?:\s+(?P<info>.*))?",
        ))
        .expect("Invalid regex pattern")
    });

    /// `Total Sets: ...` summary under the metadata table
    pub static META_SUMMARY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(concat!(
            r"^Total Sets: (?P<total_sets>\d+), ",
            r"Meta Data \(kB\):? (?P<meta_kb>\d+(?:\.\d+)?), ",
            r"Data \(kB\):? (?P<data_kb>\d+(?:\.\d+)?), ",
            r"Memory \(kB\):? (?P<mem_kb>\d+(?:\.\d+)?)",
        ))
        .expect("Invalid regex pattern")
    });

    /// Rule of `=` closing the metadata table
    pub static META_END: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^=+$").expect("Invalid regex pattern"));

    /// `<set>: <state>, last update: <timestamp>`
    pub static SET_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<set_name>[^:]+): .* last update: (?P<ts>.*)")
            .expect("Invalid regex pattern")
    });

    /// `<flag> <type> <name> <value...>`
    pub static DATA_ROW: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<flag>.) (?P<type>\S+)\s+(?P<name>\S+)\s+(?P<value>.*)")
            .expect("Invalid regex pattern")
    });

    /// The line shapes a listing is made of
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LineShape {
        MetaHeader,
        MetaDashes,
        MetaRow,
        MetaSummary,
        MetaEnd,
        SetHeader,
        DataRow,
    }

    impl LineShape {
        /// Shapes in the order they must be tried. Some lines fit more than one
        /// pattern (a dashes rule with a single-dash first column also looks
        /// like a data row), and the earlier shape always wins.
        pub const PRIORITY: [LineShape; 7] = [
            LineShape::MetaHeader,
            LineShape::MetaDashes,
            LineShape::MetaRow,
            LineShape::MetaSummary,
            LineShape::MetaEnd,
            LineShape::SetHeader,
            LineShape::DataRow,
        ];

        pub fn pattern(self) -> &'static Regex {
            match self {
                LineShape::MetaHeader => &META_HEADER,
                LineShape::MetaDashes => &META_DASHES,
                LineShape::MetaRow => &META_ROW,
                LineShape::MetaSummary => &META_SUMMARY,
                LineShape::MetaEnd => &META_END,
                LineShape::SetHeader => &SET_HEADER,
                LineShape::DataRow => &DATA_ROW,
            }
        }

        pub fn name(self) -> &'static str {
            match self {
                LineShape::MetaHeader => "metadata header",
                LineShape::MetaDashes => "metadata rule",
                LineShape::MetaRow => "metadata row",
                LineShape::MetaSummary => "metadata summary",
                LineShape::MetaEnd => "metadata end",
                LineShape::SetHeader => "set header",
                LineShape::DataRow => "data row",
            }
        }

        /// True for the shapes that only appear inside the metadata table
        pub fn is_meta(self) -> bool {
            matches!(
                self,
                LineShape::MetaHeader
                    | LineShape::MetaDashes
                    | LineShape::MetaRow
                    | LineShape::MetaSummary
                    | LineShape::MetaEnd
            )
        }
    }

    /// Tries the shape patterns in priority order
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ShapeMatcher;

    impl ShapeMatcher {
        pub fn new() -> Self {
            Self
        }

        /// Return the first shape whose pattern matches `line`, with its captures
        pub fn match_line<'l>(&self, line: &'l str) -> Option<(LineShape, Captures<'l>)> {
            LineShape::PRIORITY
                .into_iter()
                .find_map(|shape| shape.pattern().captures(line).map(|caps| (shape, caps)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ldms_ls::*;

    fn shape_of(line: &str) -> Option<LineShape> {
        ShapeMatcher::new().match_line(line).map(|(shape, _)| shape)
    }

    #[test]
    fn test_meta_header() {
        let line = "Schema         Instance                 Flags  Msize  Dsize  UID    GID    Perm       Update            Duration          Info";
        assert_eq!(shape_of(line), Some(LineShape::MetaHeader));
    }

    #[test]
    fn test_dashes_win_over_data_row() {
        let line = "- --- --- ---";
        assert!(DATA_ROW.is_match(line));
        assert!(META_DASHES.is_match(line));
        assert_eq!(shape_of(line), Some(LineShape::MetaDashes));
    }

    #[test]
    fn test_wide_dashes_rule() {
        let line = "-------------- ------------------------ ------ ------ ------";
        assert!(!DATA_ROW.is_match(line));
        assert_eq!(shape_of(line), Some(LineShape::MetaDashes));
    }

    #[test]
    fn test_meta_row_captures() {
        let line = "meminfo        node-1/meminfo              CL    1952    464      0      0 -r--r----- 1620000000.001234          0.000123 \"updt_hint_us\"=\"1000000:0\"";
        let (shape, caps) = ShapeMatcher::new().match_line(line).unwrap();
        assert_eq!(shape, LineShape::MetaRow);
        assert_eq!(&caps["schema"], "meminfo");
        assert_eq!(&caps["instance"], "node-1/meminfo");
        assert_eq!(caps["flags"].trim(), "CL");
        assert_eq!(&caps["meta_size"], "1952");
        assert_eq!(&caps["data_size"], "464");
        assert_eq!(&caps["perm"], "-r--r-----");
        assert_eq!(&caps["update"], "1620000000.001234");
        assert_eq!(&caps["duration"], "0.000123");
        assert_eq!(&caps["info"], "\"updt_hint_us\"=\"1000000:0\"");
    }

    #[test]
    fn test_meta_row_without_info() {
        let line = "S P/I C 10 20 0 0 -rwxr-xr-- 1.5 0.25";
        let (shape, caps) = ShapeMatcher::new().match_line(line).unwrap();
        assert_eq!(shape, LineShape::MetaRow);
        assert!(caps.name("info").is_none());
    }

    #[test]
    fn test_summary_with_and_without_colons() {
        assert_eq!(
            shape_of("Total Sets: 2, Meta Data (kB): 3.90, Data (kB): 0.93, Memory (kB): 4.83"),
            Some(LineShape::MetaSummary)
        );
        assert_eq!(
            shape_of("Total Sets: 1, Meta Data (kB) 1.95, Data (kB) 0.46, Memory (kB) 2.42"),
            Some(LineShape::MetaSummary)
        );
    }

    #[test]
    fn test_meta_end() {
        assert_eq!(shape_of("======"), Some(LineShape::MetaEnd));
    }

    #[test]
    fn test_set_header() {
        let line = "node-1/meminfo: consistent, last update: Mon Oct 19 10:00:00 2026 -0500 [1234us]";
        let (shape, caps) = ShapeMatcher::new().match_line(line).unwrap();
        assert_eq!(shape, LineShape::SetHeader);
        assert_eq!(&caps["set_name"], "node-1/meminfo");
        assert_eq!(&caps["ts"], "Mon Oct 19 10:00:00 2026 -0500 [1234us]");
    }

    #[test]
    fn test_data_row() {
        let line = "D u64        MemTotal                                   16384 kB";
        let (shape, caps) = ShapeMatcher::new().match_line(line).unwrap();
        assert_eq!(shape, LineShape::DataRow);
        assert_eq!(&caps["flag"], "D");
        assert_eq!(&caps["type"], "u64");
        assert_eq!(&caps["name"], "MemTotal");
        assert_eq!(&caps["value"], "16384 kB");
    }

    #[test]
    fn test_unrecognised_line() {
        assert_eq!(shape_of("garbage"), None);
    }

    #[test]
    fn test_meta_shapes() {
        assert!(LineShape::MetaSummary.is_meta());
        assert!(!LineShape::SetHeader.is_meta());
        assert!(!LineShape::DataRow.is_meta());
    }
}
