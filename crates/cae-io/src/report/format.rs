use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// How a column-header line is recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMarker {
    /// A whitespace-delimited token equal to the given text.
    Token(String),
    /// A literal substring of the (trimmed) line.
    Literal(String),
}

impl HeaderMarker {
    /// Text following the marker, or `None` if the line is not a header.
    pub fn trailing<'a>(&self, line: &'a str) -> Option<&'a str> {
        match self {
            HeaderMarker::Literal(marker) => {
                line.find(marker.as_str()).map(|i| &line[i + marker.len()..])
            }
            HeaderMarker::Token(token) => {
                line.match_indices(token.as_str()).find_map(|(i, _)| {
                    let end = i + token.len();
                    let before_ok =
                        line[..i].chars().next_back().is_none_or(char::is_whitespace);
                    let after_ok = line[end..].chars().next().is_none_or(char::is_whitespace);
                    (before_ok && after_ok).then(|| &line[end..])
                })
            }
        }
    }
}

/// Where the node id sits in a header's meta text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIdLocation {
    /// First token after the last occurrence of the delimiter.
    Delimiter(String),
    /// First token starting at a fixed byte offset.
    FixedOffset(usize),
}

/// Which node indices a report block may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeBound {
    /// Indices `>= max_node_id` are out of range, so the highest node of
    /// the part never receives report data.
    #[default]
    MaxNodeId,
    /// Indices `>= node_count` are out of range; every node can be written.
    NodeCount,
}

impl NodeBound {
    /// First node index that is out of range for a part of `node_count`
    /// nodes (`node_count > 0`).
    pub fn limit(self, node_count: usize) -> usize {
        match self {
            NodeBound::MaxNodeId => node_count.saturating_sub(1),
            NodeBound::NodeCount => node_count,
        }
    }
}

/// Format-versioned layout details of a report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFormat {
    pub header_marker: HeaderMarker,
    pub node_id: NodeIdLocation,
    /// Byte offset of the axis digit (`1..=3`) in the meta text.
    pub axis_offset: usize,
    /// Value of the first node id in the report (1 for 1-based ids).
    pub node_id_base: usize,
    /// Lines from the header line to the first data row.
    pub data_offset: usize,
    pub node_bound: NodeBound,
}

impl ReportFormat {
    /// `X` token header, `N: <id>` node annotation, `U:U<axis>` component.
    pub fn standard() -> Self {
        Self {
            header_marker: HeaderMarker::Token("X".to_string()),
            node_id: NodeIdLocation::Delimiter("N:".to_string()),
            axis_offset: 3,
            node_id_base: 1,
            data_offset: 2,
            node_bound: NodeBound::MaxNodeId,
        }
    }

    /// Older exports: `X  ` literal header and the node id at a fixed
    /// column of the meta text (`U:U1 N: 12` style, id at byte 8).
    pub fn legacy() -> Self {
        Self {
            header_marker: HeaderMarker::Literal("X  ".to_string()),
            node_id: NodeIdLocation::FixedOffset(8),
            ..Self::standard()
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ImportError::open(path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_marker_needs_whitespace_on_both_sides() {
        let marker = HeaderMarker::Token("X".to_string());
        assert_eq!(marker.trailing("X      U:U1 N: 3"), Some("      U:U1 N: 3"));
        assert_eq!(marker.trailing("TIME   X   U:U2"), Some("   U:U2"));
        assert_eq!(marker.trailing("XY Data Report"), None);
        assert_eq!(marker.trailing("MAX X"), Some(""));
        assert_eq!(marker.trailing("0.5  1.5E-03"), None);
    }

    #[test]
    fn literal_marker_is_a_substring_match() {
        let marker = HeaderMarker::Literal("X  ".to_string());
        assert_eq!(marker.trailing("X  U:U3 N: 4"), Some("U:U3 N: 4"));
        assert_eq!(marker.trailing("X U:U3"), None);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("format.json");
        fs::write(
            &path,
            r#"{ "node_id_base": 0, "header_marker": { "literal": "X  " } }"#,
        )
        .expect("write format");

        let format = ReportFormat::from_json_file(&path).expect("format parses");
        assert_eq!(format.node_id_base, 0);
        assert_eq!(format.header_marker, HeaderMarker::Literal("X  ".to_string()));
        assert_eq!(format.node_id, ReportFormat::standard().node_id);
        assert_eq!(format.node_bound, NodeBound::MaxNodeId);
    }

    #[test]
    fn node_bound_limits() {
        assert_eq!(NodeBound::MaxNodeId.limit(4), 3);
        assert_eq!(NodeBound::NodeCount.limit(4), 4);
        assert_eq!(NodeBound::MaxNodeId.limit(1), 0);
    }

    #[test]
    fn node_bound_reads_from_json() {
        let format: ReportFormat =
            serde_json::from_str(r#"{ "node_bound": "node_count" }"#).expect("format parses");
        assert_eq!(format.node_bound, NodeBound::NodeCount);
    }

    #[test]
    fn missing_format_file_is_file_not_found() {
        let err = ReportFormat::from_json_file("/definitely/not/here.json").expect_err("missing");
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}
