//! Error types for the data availability engine
//!
//! One enum per failure class, so callers can tell a malformed sidecar
//! (penalize and drop) from a bad proof (penalize the sender) from a
//! shortfall of columns (fetch more and retry).
use peerdas_types::{BlobIndex, ColumnIndex, CustodyIndex, ethereum_compat::MerkleError};
use thiserror::Error;

/// Malformed input: wrong sizes, lengths or indices. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Column index is outside the extended blob matrix
    #[error("Column index {index} too large, must be below {max}")]
    IndexTooLarge {
        /// Offending column index.
        index: ColumnIndex,
        /// Number of columns.
        max: u64,
    },

    /// Sidecar carries no commitments
    #[error("Sidecar for column {index} has no KZG commitments")]
    NoKzgCommitments {
        /// Column index of the sidecar.
        index: ColumnIndex,
    },

    /// Cells, commitments and proofs of one sidecar disagree in length
    #[error(
        "Sidecar for column {index} has mismatched lengths: {cells} cells, {commitments} \
         commitments, {proofs} proofs"
    )]
    MismatchLength {
        /// Column index of the sidecar.
        index: ColumnIndex,
        /// Cells in the column.
        cells: usize,
        /// Commitments in the sidecar.
        commitments: usize,
        /// Proofs in the sidecar.
        proofs: usize,
    },

    /// Fragment count does not match the block's commitments
    #[error("Got cells and proofs for {actual} blobs but the block commits to {expected}")]
    SizeMismatch {
        /// Commitments in the block.
        expected: usize,
        /// Fragment sets supplied.
        actual: usize,
    },

    /// One blob's fragments do not cover every column
    #[error("Blob {blob_index} has {actual} cells, expected {expected}")]
    CellCountMismatch {
        /// Offending blob.
        blob_index: BlobIndex,
        /// Number of columns.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },

    /// Sidecars of the same block report different blob counts
    #[error("Column {column} has {actual} blobs, expected {expected}")]
    LengthMismatch {
        /// Column that disagrees with the first one.
        column: ColumnIndex,
        /// Blob count of the first column.
        expected: usize,
        /// Blob count of `column`.
        actual: usize,
    },

    /// Sidecar was verified against a different block than the first one
    #[error("Column {column} belongs to a different block than column {first}")]
    BlockMismatch {
        /// Column whose header or commitments differ.
        column: ColumnIndex,
        /// Column the others are compared against.
        first: ColumnIndex,
    },

    /// Sidecar arrived without a signed block header
    #[error("Sidecar for column {index} has no signed block header")]
    NilBlockHeader {
        /// Column index of the sidecar.
        index: ColumnIndex,
    },

    /// Header body root is not a root
    #[error("Body root has {actual} bytes, expected {expected}")]
    BadRootLength {
        /// Configured root length.
        expected: u64,
        /// Length found.
        actual: usize,
    },

    /// Cell bytes could not be used
    #[error("Invalid cell at column {column}, blob {blob_index}: {reason}")]
    InvalidCell {
        /// Column of the cell.
        column: ColumnIndex,
        /// Row of the cell.
        blob_index: BlobIndex,
        /// What was wrong with it.
        reason: String,
    },

    /// Block could not produce its header or commitments proof
    #[error("Block merkleization failed: {0}")]
    Block(#[from] MerkleError),
}

/// Well-formed input that fails a proof check. The sender is at fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptographicError {
    /// Batched cell proof verification rejected the batch or could not run
    #[error("Invalid KZG cell proof in batch of {sidecars} sidecars: {reason}")]
    InvalidKzgProof {
        /// Sidecars in the batch.
        sidecars: usize,
        /// Library error, or `"verification returned false"`.
        reason: String,
    },

    /// Commitments list does not open the header's body root
    #[error("Invalid commitments inclusion proof for column {index}")]
    InvalidInclusionProof {
        /// Column index of the sidecar.
        index: ColumnIndex,
    },
}

/// Not enough, or inconsistent, columns to rebuild blobs.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    /// No sidecars supplied
    #[error("No data column sidecars to reconstruct from")]
    NoSidecars,

    /// Columns required for a direct decode are absent
    #[error("Missing data columns {missing:?}")]
    MissingColumns {
        /// Sorted indices of the absent columns.
        missing: Vec<ColumnIndex>,
    },

    /// Fewer distinct columns than erasure recovery needs
    #[error("Have {have} distinct columns, need at least {need} to reconstruct")]
    NotEnoughColumns {
        /// Distinct columns supplied.
        have: usize,
        /// Minimum for recovery.
        need: u64,
    },

    /// Sidecars disagree on the blob count or the block
    #[error(transparent)]
    Inconsistent(#[from] ValidationError),

    /// Recovery of one blob row failed
    #[error("Failed to recover cells and proofs for blob {blob_index}: {source}")]
    BlobRecovery {
        /// Blob row that failed.
        blob_index: BlobIndex,
        #[source]
        /// Underlying KZG error.
        source: KzgError,
    },
}

/// Custody sampling and custody requirement errors.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// Requested more custody groups than exist
    #[error("Custody group count {count} too large, at most {max} groups exist")]
    TooLarge {
        /// Requested count.
        count: u64,
        /// Number of custody groups.
        max: u64,
    },

    /// Custody group out of range
    #[error("Invalid custody group {group}, must be below {max}")]
    InvalidGroup {
        /// Offending group.
        group: CustodyIndex,
        /// Number of custody groups.
        max: u64,
    },

    /// Column out of range
    #[error("Invalid column {column}, must be below {max}")]
    InvalidColumn {
        /// Offending column.
        column: ColumnIndex,
        /// Number of columns.
        max: u64,
    },

    /// A network parameter used as a divisor is zero
    #[error("Network parameter `{field}` is zero")]
    ZeroParameter {
        /// Name of the parameter.
        field: &'static str,
    },

    /// Sampling produced the wrong number of groups; a logic defect
    #[error("Internal invariant violated: expected {expected} custody groups, got {actual}")]
    Internal {
        /// Requested count.
        expected: u64,
        /// Groups produced.
        actual: usize,
    },

    /// Effective balance lookup failed
    #[error("Failed to read effective balance of validator {index}: {source}")]
    ValidatorBalance {
        /// Validator index that failed.
        index: u64,
        #[source]
        /// Error reported by the state.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Failures reported by the KZG library adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KzgError {
    /// Failed to load the trusted setup file
    #[error("Failed to load trusted setup: {0}")]
    TrustedSetupLoad(String),

    /// Blob bytes rejected by the library
    #[error("Invalid blob data: {0}")]
    InvalidBlob(String),

    /// Cell bytes rejected by the library
    #[error("Invalid cell data: {0}")]
    InvalidCell(String),

    /// Commitment or proof bytes rejected by the library
    #[error("Invalid 48-byte input: {0}")]
    InvalidBytes48(String),

    /// The library call itself failed
    #[error("KZG operation `{operation}` failed: {reason}")]
    Operation {
        /// Library operation name.
        operation: &'static str,
        /// Library error.
        reason: String,
    },
}

/// Errors decoding a peer's discovery record.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// Field not present in the record
    #[error("Node record has no `{0}` field")]
    MissingField(&'static str),

    /// Field present but not an RLP integer
    #[error("Failed to decode `{key}` field: {source}")]
    Decode {
        /// Record key.
        key: &'static str,
        #[source]
        /// RLP error.
        source: alloy_rlp::Error,
    },

    /// Advertised count exceeds the number of custody groups
    #[error("Custody group count {value} exceeds maximum {max}")]
    OutOfRange {
        /// Advertised count.
        value: u64,
        /// Number of custody groups.
        max: u64,
    },
}

/// Any error produced by the engine.
#[derive(Debug, Error)]
pub enum DasError {
    /// Malformed input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Proof check failed
    #[error(transparent)]
    Cryptographic(#[from] CryptographicError),

    /// Not enough columns
    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),

    /// Custody sampling
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// KZG adapter
    #[error(transparent)]
    Kzg(#[from] KzgError),

    /// Discovery record
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Invalid network parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] peerdas_types::spec::SpecError),
}
