use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AnnotationRecord, AnnotationTable, OutputRecord};

/// Lexical categories every anchor must resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequiredField {
    Form,
    Lemma,
    Pos,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Form => "Form",
            RequiredField::Lemma => "Lemma",
            RequiredField::Pos => "Pos",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recoverable conditions found while resolving one anchor
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum AnchorIssue {
    /// The overlap set has no record for a required lexical category
    #[error("no overlapping {0} annotation")]
    MissingField(RequiredField),
    /// A phrase layer too short to carry a hand segment
    #[error("phrase layer {layer:?} has no hand segment")]
    MalformedPhraseLayer { layer: String },
    /// More than one feature key repeats under one phrase; the source
    /// behavior is undefined here, so the phrase is rejected outright
    #[error("features under {prefix:?} repeat more than one key: {keys:?}")]
    AmbiguousFeatures { prefix: String, keys: Vec<String> },
}

/// One skipped anchor or phrase, with enough identity to find it upstream
#[derive(Debug, Clone, Serialize)]
pub struct AnchorDiagnostic {
    pub filename: String,
    pub start: f64,
    pub end: f64,
    pub issue: AnchorIssue,
}

impl AnchorDiagnostic {
    fn new(anchor: &AnnotationRecord, issue: AnchorIssue) -> Self {
        Self {
            filename: anchor.filename.clone(),
            start: anchor.start,
            end: anchor.end,
            issue,
        }
    }
}

/// Result of Stage 1 alignment
#[derive(Debug, Default)]
pub struct AlignResult {
    /// Flattened rows, in anchor order then phrase order
    pub rows: Vec<OutputRecord>,
    /// Anchors that resolved their required fields
    pub anchors_processed: usize,
    /// Anchors dropped for a missing required field
    pub anchors_skipped: usize,
    /// Phrases dropped for ambiguous duplicate keys or a malformed layer
    pub phrases_skipped: usize,
    /// One entry per skipped anchor or phrase
    pub diagnostics: Vec<AnchorDiagnostic>,
}

/// Execute Stage 1: align annotation layers per speech-form anchor
///
/// For each anchor this:
/// 1. Selects the records overlapping the anchor interval (same file and
///    speaker)
/// 2. Extracts Form, Lemma and Pos from the overlap set
/// 3. Finds gesture phrases in the overlap set and gathers the feature
///    layers under each phrase, fanning out when one feature key repeats
/// 4. Merges anchor fields over each feature map (anchor fields win)
///
/// Anchors missing a required field are reported and skipped rather than
/// aborting the run.
pub fn align(table: &AnnotationTable) -> AlignResult {
    let mut result = AlignResult::default();

    for anchor in table.anchors() {
        let overlap = overlapping(table, anchor);

        let base = match required_fields(&overlap) {
            Ok(base) => base,
            Err(issue) => {
                warn!(
                    filename = %anchor.filename,
                    start = anchor.start,
                    end = anchor.end,
                    %issue,
                    "skipping anchor"
                );
                result.diagnostics.push(AnchorDiagnostic::new(anchor, issue));
                result.anchors_skipped += 1;
                continue;
            }
        };

        let phrases: Vec<&AnnotationRecord> = overlap
            .iter()
            .copied()
            .filter(|r| r.layer.contains("Phrase"))
            .collect();

        if phrases.is_empty() {
            result.rows.push(base);
            result.anchors_processed += 1;
            continue;
        }

        for phrase in phrases {
            match gesture_features(table, phrase) {
                Ok(feature_maps) => {
                    for mut features in feature_maps {
                        features.absorb(&base);
                        result.rows.push(features);
                    }
                }
                Err(issue) => {
                    warn!(
                        filename = %phrase.filename,
                        layer = %phrase.layer,
                        %issue,
                        "skipping phrase"
                    );
                    result.diagnostics.push(AnchorDiagnostic::new(anchor, issue));
                    result.phrases_skipped += 1;
                }
            }
        }
        result.anchors_processed += 1;
    }

    debug!(
        rows = result.rows.len(),
        anchors_processed = result.anchors_processed,
        anchors_skipped = result.anchors_skipped,
        "alignment done"
    );

    result
}

/// Records overlapping the anchor interval, scoped to its file and speaker
///
/// The predicate is a disjunction of two independently scoped clauses: a
/// record qualifies when its start falls inside the anchor interval, or
/// when its interval fully contains the anchor's. Both clauses require the
/// filename and speaker match on their own.
fn overlapping<'a>(
    table: &'a AnnotationTable,
    anchor: &AnnotationRecord,
) -> Vec<&'a AnnotationRecord> {
    table
        .iter()
        .filter(|r| {
            let scoped = r.filename == anchor.filename && r.speaker == anchor.speaker;
            let starts_inside = r.start >= anchor.start && r.start < anchor.end;
            let contains_anchor = r.start <= anchor.start && r.end >= anchor.end;
            (scoped && starts_inside) || (scoped && contains_anchor)
        })
        .collect()
}

/// Extract Form, Lemma and Pos from the overlap set
///
/// Form and Lemma take the first match in table order. Pos takes the match
/// with the earliest start; `min_by` keeps the first of equal elements, so
/// ties fall back to table order. Layer matching is substring containment
/// throughout, which downstream disambiguation depends on.
fn required_fields(overlap: &[&AnnotationRecord]) -> Result<OutputRecord, AnchorIssue> {
    let form = overlap
        .iter()
        .find(|r| r.layer.contains("Form"))
        .ok_or(AnchorIssue::MissingField(RequiredField::Form))?;
    let lemma = overlap
        .iter()
        .find(|r| r.layer.contains("Lemma"))
        .ok_or(AnchorIssue::MissingField(RequiredField::Lemma))?;
    let pos = overlap
        .iter()
        .filter(|r| r.layer.contains("Pos"))
        .min_by(|a, b| a.start.total_cmp(&b.start))
        .ok_or(AnchorIssue::MissingField(RequiredField::Pos))?;

    let mut record = OutputRecord::new();
    record.set_annotation("Form", form.annotation.as_deref());
    record.set_annotation("Lemma", lemma.annotation.as_deref());
    record.set_annotation("Pos", pos.annotation.as_deref());
    Ok(record)
}

/// Gather the feature layers under one gesture phrase
///
/// The phrase's layer prefix (the label minus its last segment) selects
/// feature records from the full table: same file, layer containing the
/// prefix, start inside the phrase interval. The speaker is deliberately
/// not filtered here; features belong to the phrase regardless of which
/// speaker track recorded them.
///
/// Feature keys are the matched layers with every `prefix.` occurrence
/// removed. A single repeated key fans out into one map per occurrence,
/// all other keys held fixed. More than one repeated key is rejected.
fn gesture_features(
    table: &AnnotationTable,
    phrase: &AnnotationRecord,
) -> Result<Vec<OutputRecord>, AnchorIssue> {
    let segments: Vec<&str> = phrase.layer.split('.').collect();
    if segments.len() < 2 {
        return Err(AnchorIssue::MalformedPhraseLayer {
            layer: phrase.layer.clone(),
        });
    }
    let prefix = segments[..segments.len() - 1].join(".");
    let hand = segments[segments.len() - 2];
    let strip = format!("{prefix}.");

    let pairs: Vec<(String, Option<&str>)> = table
        .iter()
        .filter(|q| {
            q.filename == phrase.filename
                && q.layer.contains(&prefix)
                && phrase.start <= q.start
                && q.start < phrase.end
        })
        .map(|q| (q.layer.replace(&strip, ""), q.annotation.as_deref()))
        .collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, _) in &pairs {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    let duplicated: Vec<&str> = counts
        .iter()
        .filter(|&(_, &count)| count > 1)
        .map(|(key, _)| *key)
        .collect();

    match duplicated.as_slice() {
        [] => {
            let mut features = OutputRecord::new();
            for (key, value) in &pairs {
                features.set_annotation(key, *value);
            }
            features.set("Hand", hand);
            Ok(vec![features])
        }
        [dup] => {
            let dup = *dup;
            let mut shared = OutputRecord::new();
            for (key, value) in &pairs {
                if key.as_str() != dup {
                    shared.set_annotation(key, *value);
                }
            }
            shared.set("Hand", hand);

            let fanned: Vec<OutputRecord> = pairs
                .iter()
                .filter(|(key, _)| key.as_str() == dup)
                .map(|(_, value)| {
                    let mut features = shared.clone();
                    features.set_annotation(dup, *value);
                    features
                })
                .collect();
            Ok(fanned)
        }
        _ => Err(AnchorIssue::AmbiguousFeatures {
            prefix,
            keys: duplicated.iter().map(|k| k.to_string()).collect(),
        }),
    }
}
