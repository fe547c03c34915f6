//! Error types for the Strata core.

use thiserror::Error;

/// Core errors
#[derive(Debug, Error)]
pub enum Error {
    /// Export attempted while no layer is selected
    #[error("nothing to encode: no layer selected")]
    NothingToEncode,

    /// Existing output file does not start with a pcap global header
    #[error("not a pcap file")]
    NotPcap,

    /// Existing pcap file was created for a different link type
    #[error("pcap link type mismatch: file has {file}, packet needs {packet}")]
    LinkTypeMismatch {
        /// Link type in the file header
        file: u32,
        /// Link type of the packet being saved
        packet: u32,
    },

    /// Existing pcap file was created with a different snapshot length
    #[error("pcap snap length mismatch: file has {file}, configured {requested}")]
    SnapLenMismatch {
        /// Snapshot length in the file header
        file: u32,
        /// Configured snapshot length
        requested: u32,
    },

    /// I/O failure while writing packets
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Field-level errors raised while editing layer parameters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Input could not be parsed for the field
    #[error("invalid {field}: '{input}' ({reason})")]
    Invalid {
        /// Field label
        field: &'static str,
        /// Rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Value parsed but lies outside the field's range
    #[error("{field} out of range: {value} (max {max})")]
    OutOfRange {
        /// Field label
        field: &'static str,
        /// Parsed value
        value: u64,
        /// Largest accepted value
        max: u64,
    },

    /// No field at this position
    #[error("unknown field index: {0}")]
    UnknownField(usize),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
