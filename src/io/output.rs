use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{DEICTIC_COLUMN, MISSING_VALUE, OutputRecord};
use crate::stages::{AnchorDiagnostic, DEICTIC, deictic_label};

/// Append-only writer for the aligned output table
///
/// Rows are written headerless in schema order; the header is added later
/// by the tagging pass. Each append opens and closes the file on its own,
/// so no handle outlives a single row write.
pub struct OutputWriter {
    path: PathBuf,
    columns: &'static [&'static str],
}

impl OutputWriter {
    /// Create the writer, truncating any previous output at `path`
    pub fn create(path: &Path, columns: &'static [&'static str]) -> Result<Self> {
        std::fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {path:?}"))?;
        Ok(Self {
            path: path.to_path_buf(),
            columns,
        })
    }

    /// Append one row
    pub fn append(&self, record: &OutputRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file: {:?}", self.path))?;
        writeln!(file, "{}", record.csv_line(self.columns))
            .with_context(|| format!("Failed to append to output file: {:?}", self.path))?;
        Ok(())
    }
}

/// Summary of the deictic tagging pass
#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    pub rows: usize,
    pub deictic: usize,
    pub non_deictic: usize,
}

/// Tag every written row and rewrite the output file with a header
///
/// Reads the headerless first-pass file back, classifies each row's Lemma
/// value, and rewrites the whole file with a header line plus the
/// `IsDeictic` column. Values were joined without quoting on the first
/// pass and are split the same way here.
pub fn apply_deictic_tags(path: &Path, columns: &[&str]) -> Result<TagSummary> {
    let lemma_index = columns
        .iter()
        .position(|c| *c == "Lemma")
        .context("Output schema has no Lemma column")?;

    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;

    let mut output = String::new();
    output.push_str(&columns.join(","));
    output.push(',');
    output.push_str(DEICTIC_COLUMN);
    output.push('\n');

    let mut summary = TagSummary {
        rows: 0,
        deictic: 0,
        non_deictic: 0,
    };

    for line in content.lines() {
        if line.is_empty() {
            continue;
        }
        let lemma = line
            .split(',')
            .nth(lemma_index)
            .unwrap_or(MISSING_VALUE);
        let label = deictic_label(lemma);
        if label == DEICTIC {
            summary.deictic += 1;
        } else {
            summary.non_deictic += 1;
        }
        summary.rows += 1;

        output.push_str(line);
        output.push(',');
        output.push_str(label);
        output.push('\n');
    }

    std::fs::write(path, output)
        .with_context(|| format!("Failed to rewrite output file: {path:?}"))?;

    Ok(summary)
}

/// Machine-readable run report with per-anchor diagnostics
#[derive(Debug, Serialize)]
pub struct AlignmentReport<'a> {
    pub generated_at: String,
    pub input_rows: usize,
    pub input_rows_skipped: usize,
    pub rows_written: usize,
    pub anchors_processed: usize,
    pub anchors_skipped: usize,
    pub phrases_skipped: usize,
    pub diagnostics: &'a [AnchorDiagnostic],
}

/// Write the run report as pretty JSON
pub fn write_report(path: &Path, report: &AlignmentReport<'_>) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {path:?}"))?;
    serde_json::to_writer_pretty(file, report).context("Failed to write report")?;
    Ok(())
}
