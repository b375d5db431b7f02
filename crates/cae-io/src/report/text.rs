//! Line buffer over a report file and the header-block locator.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use cae_model::ReportDiagnostic;
use tracing::warn;

use super::format::{NodeIdLocation, ReportFormat};
use crate::error::{ImportError, Result};
use crate::progress::{Progress, ProgressSink};

/// Lines between two progress updates while reading.
const PROGRESS_INTERVAL_LINES: usize = 4096;

/// A column-header line and its meta text (preceding non-blank lines
/// joined with the text after the marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    /// 0-based index into the line buffer.
    pub index: usize,
    pub meta: String,
}

/// A header whose node and axis annotation could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBlock {
    /// 0-based index of the header line.
    pub header: usize,
    /// 0-based node index.
    pub node: usize,
    /// 0 = x, 1 = y, 2 = z.
    pub axis: usize,
}

impl HeaderBlock {
    /// 1-based line number of the header, for messages.
    pub fn line(&self) -> usize {
        self.header + 1
    }
}

/// Trimmed lines of a report file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportText {
    lines: Vec<String>,
}

impl ReportText {
    pub fn from_file(
        path: impl AsRef<Path>,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ImportError::open(path, e))?;
        let total = file.metadata()?.len();
        Self::from_reader(BufReader::new(file), total, progress)
    }

    /// Streams `reader` line by line into the buffer. `total_bytes` is only
    /// used for progress updates.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        total_bytes: u64,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Self> {
        let mut progress = Progress::new(progress);
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut offset: u64 = 0;

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                break;
            }
            offset += bytes_read as u64;
            lines.push(line.trim().to_string());

            if lines.len() % PROGRESS_INTERVAL_LINES == 0 {
                progress.report(offset, total_bytes, "bytes", "reading report lines");
            }
        }
        progress.report(offset, total_bytes.max(offset), "bytes", "reading report lines");

        Ok(Self { lines })
    }

    pub fn from_text(raw: &str) -> Self {
        Self {
            lines: raw.lines().map(|l| l.trim().to_string()).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every line carrying the header marker, in file order.
    pub fn find_headers(&self, format: &ReportFormat) -> Vec<HeaderLine> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let trailing = format.header_marker.trailing(line)?;
                Some(HeaderLine {
                    index,
                    meta: self.meta_text(index, trailing),
                })
            })
            .collect()
    }

    /// Headers with readable annotations; the others are returned as
    /// [`ReportDiagnostic::MalformedBlock`].
    pub fn header_blocks(
        &self,
        headers: &[HeaderLine],
        format: &ReportFormat,
    ) -> (Vec<HeaderBlock>, Vec<ReportDiagnostic>) {
        let mut blocks = Vec::with_capacity(headers.len());
        let mut diagnostics = Vec::new();
        for header in headers {
            match annotate(header, format) {
                Ok(block) => blocks.push(block),
                Err(message) => {
                    warn!(line = header.index + 1, "{message}");
                    diagnostics.push(ReportDiagnostic::MalformedBlock {
                        line: header.index + 1,
                        message,
                    });
                }
            }
        }
        (blocks, diagnostics)
    }

    /// Data rows of the block headed at `header`: from `data_offset` lines
    /// below it (leading blanks skipped) up to the next blank line. Yields
    /// `(line index, row)`.
    pub fn data_rows(
        &self,
        header: usize,
        format: &ReportFormat,
    ) -> impl Iterator<Item = (usize, &str)> {
        let start = (header + format.data_offset).min(self.lines.len());
        self.lines[start..]
            .iter()
            .enumerate()
            .map(move |(i, l)| (start + i, l.as_str()))
            .skip_while(|(_, l)| l.is_empty())
            .take_while(|(_, l)| !l.is_empty())
    }

    /// Time column of the first block. Non-increasing values are reported
    /// and kept as given.
    pub fn read_times(
        &self,
        first: &HeaderLine,
        format: &ReportFormat,
    ) -> Result<(Vec<f64>, Vec<ReportDiagnostic>)> {
        let mut times = Vec::new();
        for (index, row) in self.data_rows(first.index, format) {
            let token = row.split_whitespace().next().unwrap_or_default();
            let time = token.parse::<f64>().map_err(|_| ImportError::NumericFormat {
                line: index + 1,
                content: row.to_string(),
            })?;
            times.push(time);
        }
        if times.is_empty() {
            return Err(ImportError::Format {
                line: first.index + 1,
                message: "first report block has no data rows".to_string(),
            });
        }

        let mut diagnostics = Vec::new();
        for (i, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                warn!(
                    step = i + 1,
                    previous = pair[0],
                    current = pair[1],
                    "report times are not increasing"
                );
                diagnostics.push(ReportDiagnostic::NonMonotonicTime {
                    index: i + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok((times, diagnostics))
    }

    /// Walks back from the header over non-blank lines and joins them, in
    /// file order, with the text after the marker.
    fn meta_text(&self, index: usize, trailing: &str) -> String {
        let first = self.lines[..index]
            .iter()
            .rposition(|l| l.is_empty())
            .map_or(0, |blank| blank + 1);

        let mut parts: Vec<&str> = self.lines[first..index].iter().map(String::as_str).collect();
        let trailing = trailing.trim();
        if !trailing.is_empty() {
            parts.push(trailing);
        }
        parts.join(" ")
    }
}

/// Second whitespace-delimited token of a data row, as a float.
pub fn extract_value(row: &str) -> Option<f64> {
    row.split_whitespace().nth(1)?.parse().ok()
}

fn annotate(
    header: &HeaderLine,
    format: &ReportFormat,
) -> std::result::Result<HeaderBlock, String> {
    let meta = header.meta.as_str();

    let id_text = match &format.node_id {
        NodeIdLocation::Delimiter(delimiter) => meta
            .rfind(delimiter.as_str())
            .map(|i| &meta[i + delimiter.len()..])
            .ok_or_else(|| format!("no `{delimiter}` node annotation in `{meta}`"))?,
        NodeIdLocation::FixedOffset(offset) => meta
            .get(*offset..)
            .ok_or_else(|| format!("header `{meta}` is shorter than node id offset {offset}"))?,
    };
    let raw_id = id_text
        .split_whitespace()
        .next()
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| format!("unreadable node id in `{meta}`"))?;
    let node = raw_id
        .checked_sub(format.node_id_base)
        .ok_or_else(|| format!("node id {raw_id} below base {}", format.node_id_base))?;

    let axis = meta
        .as_bytes()
        .get(format.axis_offset)
        .copied()
        .filter(|b| (b'1'..=b'3').contains(b))
        .map(|b| usize::from(b - b'1'))
        .ok_or_else(|| format!("no axis digit 1-3 at offset {} of `{meta}`", format.axis_offset))?;

    Ok(HeaderBlock {
        header: header.index,
        node,
        axis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingProgress;

    const WRAPPED: &str = "\
XY report

                               U:U2 PI: COIL-1
            X                          N: 7

            0.                   0.
            0.5                  2.5E-03
            1.                   5.0E-03

            X       U:U3 PI: COIL-1 N: 8

            0.                   0.
            0.5                  -1.
            1.                   -2.
";

    #[test]
    fn meta_text_joins_wrapped_header_lines() {
        let text = ReportText::from_text(WRAPPED);
        let headers = text.find_headers(&ReportFormat::standard());
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].index, 3);
        assert_eq!(headers[0].meta, "U:U2 PI: COIL-1 N: 7");
        assert_eq!(headers[1].meta, "U:U3 PI: COIL-1 N: 8");
    }

    #[test]
    fn annotations_give_zero_based_node_and_axis() {
        let text = ReportText::from_text(WRAPPED);
        let format = ReportFormat::standard();
        let (blocks, diagnostics) = text.header_blocks(&text.find_headers(&format), &format);
        assert!(diagnostics.is_empty());
        assert_eq!(blocks[0], HeaderBlock { header: 3, node: 6, axis: 1 });
        assert_eq!(blocks[1], HeaderBlock { header: 9, node: 7, axis: 2 });
    }

    #[test]
    fn times_come_from_the_first_block() {
        let text = ReportText::from_text(WRAPPED);
        let format = ReportFormat::standard();
        let headers = text.find_headers(&format);
        let (times, diagnostics) = text.read_times(&headers[0], &format).expect("times parse");
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn non_increasing_times_are_kept_and_reported() {
        let raw = "X U:U1 N: 1\n\n0. 0.\n2. 0.\n1. 0.\n";
        let text = ReportText::from_text(raw);
        let format = ReportFormat::standard();
        let headers = text.find_headers(&format);
        let (times, diagnostics) = text.read_times(&headers[0], &format).expect("times parse");
        assert_eq!(times, vec![0.0, 2.0, 1.0]);
        assert_eq!(
            diagnostics,
            vec![ReportDiagnostic::NonMonotonicTime {
                index: 2,
                previous: 2.0,
                current: 1.0
            }]
        );
    }

    #[test]
    fn non_numeric_time_is_fatal() {
        let text = ReportText::from_text("X U:U1 N: 1\n\nzero 0.\n");
        let format = ReportFormat::standard();
        let headers = text.find_headers(&format);
        let err = text.read_times(&headers[0], &format).expect_err("time is not a number");
        assert!(matches!(err, ImportError::NumericFormat { line: 3, .. }));
    }

    #[test]
    fn unreadable_annotation_becomes_a_diagnostic() {
        let text = ReportText::from_text("X  U:U9 N: 3\n\n0. 1.\n\nX U:U1 node 4\n\n0. 1.\n");
        let format = ReportFormat::standard();
        let (blocks, diagnostics) = text.header_blocks(&text.find_headers(&format), &format);
        assert!(blocks.is_empty());
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(diagnostics[0], ReportDiagnostic::MalformedBlock { line: 1, .. }));
    }

    #[test]
    fn legacy_format_reads_fixed_offsets() {
        let text = ReportText::from_text("X  U:U1 N: 12\n\n0. 4.\n");
        let format = ReportFormat::legacy();
        let (blocks, _) = text.header_blocks(&text.find_headers(&format), &format);
        assert_eq!(blocks, vec![HeaderBlock { header: 0, node: 11, axis: 0 }]);
    }

    #[test]
    fn extract_value_reads_second_column() {
        assert_eq!(extract_value("0.5     -1.25E-02   7"), Some(-0.0125));
        assert_eq!(extract_value("0.5"), None);
        assert_eq!(extract_value("0.5 abc"), None);
    }

    #[test]
    fn reader_reports_byte_progress() {
        let raw = "a\n".repeat(PROGRESS_INTERVAL_LINES + 1);
        let mut recorder = RecordingProgress::default();
        let text = ReportText::from_reader(raw.as_bytes(), raw.len() as u64, Some(&mut recorder))
            .expect("read");

        assert_eq!(text.len(), PROGRESS_INTERVAL_LINES + 1);
        assert_eq!(recorder.events.len(), 2);
        assert_eq!(recorder.events[0].current, 2 * PROGRESS_INTERVAL_LINES as u64);
        let last = recorder.events.last().expect("final update");
        assert_eq!(last.current, raw.len() as u64);
        assert_eq!(last.unit, "bytes");
    }
}
