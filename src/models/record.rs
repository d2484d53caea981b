use serde::{Deserialize, Serialize};

/// Speaker role, derived from the annotation layer prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// Layers starting with `R.` (the route giver)
    Router,
    /// Everything else
    Follower,
}

impl Speaker {
    /// Derive the speaker role from a cleaned layer label
    pub fn from_layer(layer: &str) -> Self {
        if layer.starts_with("R.") {
            Speaker::Router
        } else {
            Speaker::Follower
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Router => "Router",
            Speaker::Follower => "Follower",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotation on one layer of one recording
///
/// The interval is half-open: the annotation covers [start, end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Dot-separated hierarchical layer label, e.g. `R.G.Left.Phrase`
    pub layer: String,
    /// Speaker role derived from the layer prefix
    pub speaker: Speaker,
    /// Start timestamp
    pub start: f64,
    /// End timestamp (greater than start)
    pub end: f64,
    /// Annotation content; None when the source cell was empty
    pub annotation: Option<String>,
    /// Source recording; records from different files are never joined
    pub filename: String,
}

impl AnnotationRecord {
    /// Whether this record triggers an alignment pass
    pub fn is_anchor(&self) -> bool {
        self.layer.contains("R.S.Form") && self.annotation.is_some()
    }
}

/// The full annotation table for a dataset, in load order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationTable {
    pub records: Vec<AnnotationRecord>,
}

impl AnnotationTable {
    pub fn new(records: Vec<AnnotationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotationRecord> {
        self.records.iter()
    }

    /// Speech-form anchor records, in table order
    pub fn anchors(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.iter().filter(|r| r.is_anchor())
    }

    /// Distinct source filenames, in first-seen order
    pub fn filenames(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.filename.as_str()) {
                seen.push(record.filename.as_str());
            }
        }
        seen
    }

    /// Number of records attributed to a speaker
    pub fn speaker_count(&self, speaker: Speaker) -> usize {
        self.records.iter().filter(|r| r.speaker == speaker).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(layer: &str, annotation: Option<&str>) -> AnnotationRecord {
        AnnotationRecord {
            layer: layer.to_string(),
            speaker: Speaker::from_layer(layer),
            start: 0.0,
            end: 1.0,
            annotation: annotation.map(str::to_string),
            filename: "f1".to_string(),
        }
    }

    #[test]
    fn test_speaker_from_layer() {
        assert_eq!(Speaker::from_layer("R.S.Form"), Speaker::Router);
        assert_eq!(Speaker::from_layer("R.G.Left.Phrase"), Speaker::Router);
        assert_eq!(Speaker::from_layer("F.S.Form"), Speaker::Follower);
        // Prefix match is exact: a bare "R" segment is not enough
        assert_eq!(Speaker::from_layer("Right.Hand"), Speaker::Follower);
    }

    #[test]
    fn test_anchor_detection() {
        assert!(record("R.S.Form", Some("word")).is_anchor());
        // Substring containment, not segment equality
        assert!(record("X.R.S.Form.Extra", Some("word")).is_anchor());
        assert!(!record("R.S.Form", None).is_anchor());
        assert!(!record("R.S.Lemma", Some("word")).is_anchor());
    }

    #[test]
    fn test_filenames_first_seen_order() {
        let mut table = AnnotationTable::default();
        for name in ["b", "a", "b", "c"] {
            let mut r = record("R.S.Form", Some("x"));
            r.filename = name.to_string();
            table.records.push(r);
        }
        assert_eq!(table.filenames(), vec!["b", "a", "c"]);
    }
}
