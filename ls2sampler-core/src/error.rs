//! Error types for listing parsing and directive emission
//!
//! Every failure is fatal for the current run: there is no partial result
//! mode, so each error carries enough context (line number, line text,
//! metric name, raw token) to point at the exact spot in the input.

use thiserror::Error;

/// A value token could not be converted under its declared type tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The type tag is not one the decoder table knows
    #[error("unsupported type '{tag}'")]
    UnsupportedType { tag: String },

    /// The token is not a valid literal for the type
    #[error("cannot decode '{raw}' as {value_type}")]
    InvalidValue { value_type: String, raw: String },

    /// One element of an array token is not a valid literal
    #[error("cannot decode element '{element}' of '{raw}' as {value_type}")]
    InvalidElement { value_type: String, raw: String, element: String },
}

impl DecodeError {
    pub fn unsupported(tag: impl Into<String>) -> Self {
        Self::UnsupportedType { tag: tag.into() }
    }

    pub fn invalid(value_type: impl ToString, raw: impl Into<String>) -> Self {
        Self::InvalidValue { value_type: value_type.to_string(), raw: raw.into() }
    }

    pub fn invalid_element(
        value_type: impl ToString,
        raw: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self::InvalidElement {
            value_type: value_type.to_string(),
            raw: raw.into(),
            element: element.into(),
        }
    }
}

/// Broad category of a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line matched none of the known shapes
    Classification,
    /// A line appeared in the wrong section
    SectionState,
    /// A metric value could not be decoded
    Decode,
}

/// Fatal error raised while parsing a listing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: bad line format: {text}")]
    Classification { line: usize, text: String },

    #[error("line {line}: unexpected {found}, expected {expected}: {text}")]
    SectionState { line: usize, found: &'static str, expected: &'static str, text: String },

    #[error("metadata section opened at line {opened_at} is never closed")]
    UnterminatedSection { opened_at: usize },

    #[error("line {line}: metric '{metric}': {source}")]
    Decode {
        line: usize,
        metric: String,
        #[source]
        source: DecodeError,
    },
}

impl ParseError {
    pub fn classification(line: usize, text: impl Into<String>) -> Self {
        Self::Classification { line, text: text.into() }
    }

    pub fn section_state(
        line: usize,
        found: &'static str,
        expected: &'static str,
        text: impl Into<String>,
    ) -> Self {
        Self::SectionState { line, found, expected, text: text.into() }
    }

    pub fn decode(line: usize, metric: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode { line, metric: metric.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Classification { .. } => ErrorKind::Classification,
            Self::SectionState { .. } | Self::UnterminatedSection { .. } => {
                ErrorKind::SectionState
            }
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// 1-based input line the error points at
    pub fn line(&self) -> usize {
        match self {
            Self::Classification { line, .. }
            | Self::SectionState { line, .. }
            | Self::Decode { line, .. } => *line,
            Self::UnterminatedSection { opened_at } => *opened_at,
        }
    }
}

/// Error raised while turning a listing into sampler directives
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("set '{set}' has no metadata row, its schema and instance are unknown")]
    MissingMetadata { set: String },

    #[error("failed to write directives: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::classification(3, "garbage");
        assert_eq!(err.to_string(), "line 3: bad line format: garbage");

        let err = ParseError::decode(7, "m", DecodeError::invalid("u32", "bad"));
        assert_eq!(err.to_string(), "line 7: metric 'm': cannot decode 'bad' as u32");

        let err = DecodeError::unsupported("u128");
        assert_eq!(err.to_string(), "unsupported type 'u128'");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ParseError::classification(1, "x").kind(), ErrorKind::Classification);
        assert_eq!(
            ParseError::section_state(2, "data row", "outside a metadata section", "x").kind(),
            ErrorKind::SectionState
        );
        assert_eq!(
            ParseError::UnterminatedSection { opened_at: 4 }.kind(),
            ErrorKind::SectionState
        );
        assert_eq!(ParseError::UnterminatedSection { opened_at: 4 }.line(), 4);
    }
}
