//! Error taxonomy for the ingestion pipeline
//!
//! Four error families map onto the pipeline's failure modes:
//!
//! - [`FormatError`]: the source file's structure is unreadable (bad header,
//!   wrong column count, not a JSON array). The whole parse aborts.
//! - [`ValidationError`]: the structure is fine but a record's values are out
//!   of domain (non-numeric, non-finite, outside physical bounds). Carries
//!   the 1-based record index and the field name so the offending record can
//!   be found and fixed.
//! - [`ConfigError`]: threshold, window or delay configuration is malformed.
//!   Raised before the pipeline starts; never mid-stream.
//! - [`StorageError`]: an append or query against the persistence store
//!   failed. Append failures are fatal to the current tick — the pipeline
//!   halts rather than risk losing an alert.
//!
//! None of these are retried automatically, and every variant names the
//! record, field, line or collection that triggered it.

use thiserror::Error;

/// Structural problems with an input source
#[derive(Debug, Error)]
pub enum FormatError {
    /// The source could not be read at all
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited-text header lacks a required column
    #[error("header is missing required column `{column}`")]
    MissingColumn {
        /// Name of the absent column
        column: &'static str,
    },

    /// A data row does not have enough columns to cover the header
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    ColumnCount {
        /// 1-based line number in the source (header is line 1)
        line: usize,
        /// Columns required by the header layout
        expected: usize,
        /// Columns actually present
        found: usize,
    },

    /// The structured-text source is not an array of reading objects
    #[error("source is not an array of readings: {detail}")]
    Structure {
        /// What was found instead
        detail: String,
    },
}

/// A record whose values are outside the data model's domain
///
/// Parsing is total: the first record that fails validation rejects the
/// whole source. `record` is the 1-based index of the data record (the
/// delimited-text header does not count).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is absent from the record
    #[error("record {record}: field `{field}` is missing")]
    MissingField {
        /// 1-based record index
        record: usize,
        /// Name of the absent field
        field: &'static str,
    },

    /// A field's raw text or JSON value is not a number
    #[error("record {record}: field `{field}` is not numeric: `{raw}`")]
    NotNumeric {
        /// 1-based record index
        record: usize,
        /// Offending field
        field: &'static str,
        /// Raw value as it appeared in the source
        raw: String,
    },

    /// A field parsed as a number but is NaN or infinite
    #[error("record {record}: field `{field}` is not a finite number")]
    NotFinite {
        /// 1-based record index
        record: usize,
        /// Offending field
        field: &'static str,
    },

    /// A value violates its physical bound
    #[error("record {record}: {field} {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// 1-based record index
        record: usize,
        /// Offending field
        field: &'static str,
        /// The value that failed
        value: f32,
        /// Lower physical bound
        min: f32,
        /// Upper physical bound
        max: f32,
    },

    /// The timestamp field is neither integer milliseconds nor ISO-8601
    #[error("record {record}: invalid timestamp `{raw}`")]
    Timestamp {
        /// 1-based record index
        record: usize,
        /// Raw timestamp text
        raw: String,
    },
}

/// Either failure mode of the reading parser
#[derive(Debug, Error)]
pub enum ParseError {
    /// Source structure did not match the expected schema
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A record's values were out of domain
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Malformed threshold, window or delay configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A threshold bound is NaN
    #[error("{metric}: threshold `{bound}` is not a number")]
    NanThreshold {
        /// Metric whose band is malformed
        metric: &'static str,
        /// Which of the four bounds
        bound: &'static str,
    },

    /// Low/high bounds of one severity are inverted
    #[error("{metric}: {low_bound} ({low}) must not exceed {high_bound} ({high})")]
    InvertedBounds {
        /// Metric whose band is malformed
        metric: &'static str,
        /// Name of the lower bound
        low_bound: &'static str,
        /// Name of the upper bound
        high_bound: &'static str,
        /// Lower bound value
        low: f32,
        /// Upper bound value
        high: f32,
    },

    /// A warning bound is more extreme than its critical counterpart
    #[error("{metric}: warning bound {warning} is more extreme than critical bound {critical}")]
    WarningBeyondCritical {
        /// Metric whose band is malformed
        metric: &'static str,
        /// Warning bound value
        warning: f32,
        /// Critical bound value
        critical: f32,
    },

    /// The statistics window must hold at least one reading
    #[error("window size must be at least 1")]
    ZeroWindow,
}

/// Failures of the append-only persistence store
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store directory could not be created or opened
    #[error("failed to open store at `{path}`: {source}")]
    Open {
        /// Directory the store lives in
        path: String,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// An append did not commit
    #[error("append to `{collection}` failed: {source}")]
    Append {
        /// Collection the record was headed for
        collection: &'static str,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A query could not read the collection
    #[error("query on `{collection}` failed: {source}")]
    Query {
        /// Collection being read
        collection: &'static str,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A committed record failed to decode
    ///
    /// A torn *trailing* line (crash between write and sync) is tolerated
    /// and skipped; corruption anywhere else means the file was tampered
    /// with or damaged, and is surfaced rather than silently dropped.
    #[error("`{collection}` line {line} is corrupt: {detail}")]
    Corrupt {
        /// Collection containing the bad record
        collection: &'static str,
        /// 1-based line number of the bad record
        line: usize,
        /// Decode failure detail
        detail: String,
    },
}

/// Top-level error for a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration was rejected before the run started
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input source could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Persistence failed mid-run; the in-flight tick was not completed
    #[error(transparent)]
    Storage(#[from] StorageError),
}
