//! Tokenizer for Abaqus-style `.inp` geometry decks.
//!
//! Lines are classified by their leading `*` keyword into part headers,
//! instance headers, node/element section starts and payload lines. The
//! [`LineCursor`] owns the scan position; nested section readers borrow it
//! mutably and advance it in place.

mod cursor;
mod fields;

use thiserror::Error;

pub use cursor::LineCursor;
pub use fields::{
    ElementRecord, MAX_ID, NodeRecord, parse_element_line, parse_float_row, parse_node_line,
    split_fields,
};

/// Sentinel node reference for an unassigned tetrahedron slot.
pub const SENTINEL_ID: i32 = -1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: missing parameter `{parameter}`")]
    MissingParameter { line: usize, parameter: String },

    #[error("line {line}: invalid number in `{content}`")]
    NumericFormat { line: usize, content: String },

    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::MissingParameter { line, .. }
            | ParseError::NumericFormat { line, .. }
            | ParseError::Format { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub key: String,
    pub value: Option<String>,
}

/// A `*KEYWORD, key=value, ...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Normalized keyword: upper case, whitespace and underscores removed.
    pub keyword: String,
    pub parameters: Vec<Parameter>,
    /// 1-based line number.
    pub line: usize,
}

impl Header {
    /// Case-insensitive lookup of a `key=value` parameter.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .and_then(|p| p.value.as_deref())
    }

    pub fn require(&self, key: &str) -> Result<&str, ParseError> {
        self.parameter(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ParseError::MissingParameter {
                line: self.line,
                parameter: key.to_ascii_lowercase(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    Part(Header),
    Instance(Header),
    NodeSection(Header),
    ElementSection(Header),
    /// Any other `*` keyword (`*End Part`, `*Heading`, `*Assembly`, ...).
    Keyword(Header),
    Comment,
    Blank,
    Data(&'a str),
}

/// Classifies one raw line. `line` is the 1-based line number used in errors.
pub fn classify(raw: &str, line: usize) -> Result<Record<'_>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Record::Blank);
    }
    if is_comment(trimmed) {
        return Ok(Record::Comment);
    }
    if !trimmed.starts_with('*') {
        return Ok(Record::Data(trimmed));
    }

    let body = trimmed.trim_start_matches('*').trim();
    if body.is_empty() {
        // Some legacy decks use a bare "*" as a visual separator.
        return Ok(Record::Keyword(Header {
            keyword: String::new(),
            parameters: Vec::new(),
            line,
        }));
    }

    let header = parse_header(body, line)?;
    Ok(match header.keyword.as_str() {
        "PART" => Record::Part(header),
        "INSTANCE" => Record::Instance(header),
        "NODE" => Record::NodeSection(header),
        "ELEMENT" => Record::ElementSection(header),
        _ => Record::Keyword(header),
    })
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with("**")
}

fn parse_header(header: &str, line: usize) -> Result<Header, ParseError> {
    let fields = split_header_fields(header);
    let keyword_raw = fields.first().map(|s| s.as_str()).unwrap_or("").trim();
    if keyword_raw.is_empty() {
        return Err(ParseError::Format {
            line,
            message: "empty keyword after `*`".to_string(),
        });
    }

    let mut parameters = Vec::new();
    for part in fields.iter().skip(1) {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if let Some((k, v)) = item.split_once('=') {
            parameters.push(Parameter {
                key: k.trim().to_ascii_uppercase(),
                value: Some(unquote(v.trim()).to_string()),
            });
        } else {
            parameters.push(Parameter {
                key: item.to_ascii_uppercase(),
                value: None,
            });
        }
    }

    Ok(Header {
        keyword: normalized_keyword(keyword_raw),
        parameters,
        line,
    })
}

fn split_header_fields(header: &str) -> Vec<String> {
    let mut fields = Vec::<String>::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;

    for ch in header.chars() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(ch);
            }
            ',' if !in_single && !in_double => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"').trim_matches('\'')
}

fn normalized_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_section_markers_case_insensitively() {
        assert!(matches!(classify("*Part, name=Beam", 1), Ok(Record::Part(_))));
        assert!(matches!(classify("*INSTANCE, name=B-1, part=Beam", 1), Ok(Record::Instance(_))));
        assert!(matches!(classify("*node", 1), Ok(Record::NodeSection(_))));
        assert!(matches!(classify("*Element, type=C3D4", 1), Ok(Record::ElementSection(_))));
        assert!(matches!(
            classify("*End Part", 1),
            Ok(Record::Keyword(h)) if h.keyword == "ENDPART"
        ));
        assert!(matches!(classify("*Node Output", 1), Ok(Record::Keyword(_))));
    }

    #[test]
    fn classifies_payload_comments_and_blanks() {
        assert_eq!(classify("  1, 0., 0., 0.", 4), Ok(Record::Data("1, 0., 0., 0.")));
        assert_eq!(classify("** generated", 2), Ok(Record::Comment));
        assert_eq!(classify("   \r", 9), Ok(Record::Blank));
    }

    #[test]
    fn parameter_lookup_ignores_case_and_whitespace() {
        let Ok(Record::Part(header)) = classify("*Part,  NAME = Coil-A ", 3) else {
            panic!("expected part header");
        };
        assert_eq!(header.parameter("name"), Some("Coil-A"));
        assert_eq!(header.require("Name"), Ok("Coil-A"));
        assert_eq!(header.line, 3);
    }

    #[test]
    fn missing_parameter_is_reported_with_line() {
        let Ok(Record::Part(header)) = classify("*Part", 12) else {
            panic!("expected part header");
        };
        let err = header.require("name").expect_err("name is absent");
        assert_eq!(
            err,
            ParseError::MissingParameter {
                line: 12,
                parameter: "name".to_string()
            }
        );
    }

    #[test]
    fn quoted_values_keep_commas_and_lose_quotes() {
        let record = classify("*Instance, name=\"a,b\", part='Core'", 1);
        let Ok(Record::Instance(header)) = record else {
            panic!("expected instance header");
        };
        assert_eq!(header.parameter("name"), Some("a,b"));
        assert_eq!(header.parameter("part"), Some("Core"));
    }

    #[test]
    fn bare_star_is_a_separator_keyword() {
        let Ok(Record::Keyword(header)) = classify("*", 7) else {
            panic!("expected separator keyword");
        };
        assert!(header.keyword.is_empty());
        assert_eq!(header.line, 7);
    }

    #[test]
    fn empty_keyword_before_parameters_is_a_format_error() {
        let err = classify("*, name=x", 5).expect_err("keyword is empty");
        assert_eq!(err.line(), 5);
    }
}
