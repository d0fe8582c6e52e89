// src/error.rs

/// Source-local failures. None of these abort processing of other sources.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("no table found in source document")]
    MissingTable,

    #[error("row {student_id} has {found} cells, expected {expected}")]
    SchemaMismatch {
        student_id: String,
        expected: usize,
        found: usize,
    },

    #[error("record has no student id")]
    MissingStudentId,

    #[error("unsupported source URL: {url}")]
    UnsupportedSource { url: String },
}
