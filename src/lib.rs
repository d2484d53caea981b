pub mod io;
pub mod models;
pub mod stages;

pub use io::{
    AlignmentReport, OutputWriter, ParsedTable, RawAnnotation, TagSummary, apply_deictic_tags,
    parse_annotation_file, parse_annotation_tsv, write_report,
};
pub use models::{
    AnnotationRecord, AnnotationTable, DEICTIC_COLUMN, MISSING_VALUE, OUTPUT_COLUMNS, OutputRecord,
    Speaker,
};
pub use stages::{
    AlignResult, AnchorDiagnostic, AnchorIssue, DEICTIC_WORDS, NormalizeResult, align,
    deictic_label, normalize,
};
