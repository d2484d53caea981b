use tracing::debug;

use crate::io::RawAnnotation;
use crate::models::{AnnotationRecord, AnnotationTable, Speaker};

/// The one known misspelled layer label in the dataset
const SEMANTIC_TYPO: &str = "R.G.Left Semactic";
const SEMANTIC_FIXED: &str = "R.G.Left Semantic";

/// Result of Stage 0 normalization
#[derive(Debug)]
pub struct NormalizeResult {
    /// The cleaned table, same row count as the input
    pub table: AnnotationTable,
    /// Layers that had surrounding whitespace removed
    pub layers_trimmed: usize,
    /// Occurrences of the known typo that were rewritten
    pub typos_fixed: usize,
    /// Hand-sided multi-word labels converted to dotted form
    pub layers_dotted: usize,
    /// Remaining multi-word labels with spaces deleted
    pub layers_despaced: usize,
}

/// Perform Stage 0: layer cleanup and speaker derivation
///
/// This stage:
/// 1. Trims whitespace from every layer label
/// 2. Rewrites the known `Semactic` typo
/// 3. Dots the spaces in hand-sided labels (containing Left/Right)
/// 4. Deletes spaces from any other label
/// 5. Derives the speaker role from the cleaned label's `R.` prefix
///
/// Pure transform: produces a new table, never mutates the input.
pub fn normalize(raw: &[RawAnnotation]) -> NormalizeResult {
    let mut records = Vec::with_capacity(raw.len());
    let mut layers_trimmed = 0;
    let mut typos_fixed = 0;
    let mut layers_dotted = 0;
    let mut layers_despaced = 0;

    for row in raw {
        let trimmed = row.layer.trim();
        if trimmed.len() != row.layer.len() {
            layers_trimmed += 1;
        }

        let mut layer = if trimmed == SEMANTIC_TYPO {
            typos_fixed += 1;
            SEMANTIC_FIXED.to_string()
        } else {
            trimmed.to_string()
        };

        if layer.contains(' ') {
            if layer.contains("Left") || layer.contains("Right") {
                layer = layer.replace(' ', ".");
                layers_dotted += 1;
            } else {
                layer = layer.replace(' ', "");
                layers_despaced += 1;
            }
        }

        let speaker = Speaker::from_layer(&layer);

        records.push(AnnotationRecord {
            layer,
            speaker,
            start: row.start,
            end: row.end,
            annotation: row.annotation.clone(),
            filename: row.filename.clone(),
        });
    }

    debug!(
        layers_trimmed,
        typos_fixed, layers_dotted, layers_despaced, "layer cleanup done"
    );

    NormalizeResult {
        table: AnnotationTable::new(records),
        layers_trimmed,
        typos_fixed,
        layers_dotted,
        layers_despaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(layer: &str) -> RawAnnotation {
        RawAnnotation {
            layer: layer.to_string(),
            start: 0.0,
            end: 1.0,
            annotation: Some("x".to_string()),
            filename: "f1".to_string(),
        }
    }

    fn cleaned_layer(layer: &str) -> String {
        let result = normalize(&[raw(layer)]);
        result.table.records[0].layer.clone()
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(cleaned_layer("  R.S.Form \t"), "R.S.Form");
    }

    #[test]
    fn test_typo_is_fixed_and_dotted() {
        // The rewrite leaves a space, which the hand-sided rule then dots
        assert_eq!(cleaned_layer("R.G.Left Semactic"), "R.G.Left.Semantic");
    }

    #[test]
    fn test_hand_sided_spaces_become_dots() {
        assert_eq!(cleaned_layer("R.G.Right Phase"), "R.G.Right.Phase");
        assert_eq!(cleaned_layer("F.G.Left Practice"), "F.G.Left.Practice");
    }

    #[test]
    fn test_other_spaces_are_deleted() {
        assert_eq!(cleaned_layer("R.S. Form"), "R.S.Form");
    }

    #[test]
    fn test_speaker_derived_from_cleaned_layer() {
        // Leading whitespace must not hide the R. prefix
        let result = normalize(&[raw("  R.S.Form"), raw("F.S.Form")]);
        assert_eq!(result.table.records[0].speaker, Speaker::Router);
        assert_eq!(result.table.records[1].speaker, Speaker::Follower);
    }

    #[test]
    fn test_row_count_preserved() {
        let rows: Vec<RawAnnotation> = ["R.S.Form", " R.G.Left Semactic", "bad layer"]
            .iter()
            .map(|l| raw(l))
            .collect();
        let result = normalize(&rows);
        assert_eq!(result.table.len(), rows.len());
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "  R.G.Left Semactic",
            "R.G.Right Phase",
            "R.S. Form",
            "R.S.Form",
        ];
        for input in inputs {
            let once = cleaned_layer(input);
            let twice = cleaned_layer(&once);
            assert_eq!(once, twice, "cleanup of {input:?} is not idempotent");
        }
    }
}
