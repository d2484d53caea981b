use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// One raw row of the annotation export, before cleanup
///
/// The export's `speaker` and `duration` columns are discarded at parse
/// time: the speaker is re-derived from the layer label in Stage 0 and the
/// duration is redundant with the interval.
#[derive(Debug, Clone)]
pub struct RawAnnotation {
    pub layer: String,
    pub start: f64,
    pub end: f64,
    pub annotation: Option<String>,
    pub filename: String,
}

/// Result of loading the raw annotation export
#[derive(Debug, Default)]
pub struct ParsedTable {
    /// Well-formed rows, in file order
    pub rows: Vec<RawAnnotation>,
    /// Lines dropped for a wrong field count or unparseable timestamps
    pub skipped: usize,
}

/// Load a tab-separated annotation export
///
/// Columns, in order: layer, speaker (discarded), start, end, duration
/// (discarded), annotation, filename. No header. Malformed lines are
/// skipped and counted, never fatal.
pub fn parse_annotation_file(path: &Path) -> Result<ParsedTable> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;
    Ok(parse_annotation_tsv(&content))
}

/// Parse tab-separated annotation text
pub fn parse_annotation_tsv(text: &str) -> ParsedTable {
    let mut table = ParsedTable::default();

    for (line_no, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(row) => table.rows.push(row),
            None => {
                debug!(line = line_no + 1, "skipping malformed line");
                table.skipped += 1;
            }
        }
    }

    table
}

fn parse_line(line: &str) -> Option<RawAnnotation> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return None;
    }

    let start: f64 = fields[2].trim().parse().ok()?;
    let end: f64 = fields[3].trim().parse().ok()?;
    if !start.is_finite() || !end.is_finite() {
        return None;
    }

    let annotation = if fields[5].is_empty() {
        None
    } else {
        Some(fields[5].to_string())
    };

    Some(RawAnnotation {
        layer: fields[0].to_string(),
        start,
        end,
        annotation,
        filename: fields[6].to_string(),
    })
}
