//! Fixed sizes of the polynomial-commitment scheme and the beacon block body layout.
//!
//! These are not configurable: the KZG library is compiled against them and the
//! body layout is part of the SSZ container definition. Network parameters that
//! can differ between deployments live in [`crate::spec::DasSpec`].

/// Bytes in a single field element of the BLS12-381 scalar field.
pub const BYTES_PER_FIELD_ELEMENT: usize = 32;

/// Field elements in one (non-extended) blob.
pub const FIELD_ELEMENTS_PER_BLOB: usize = 4096;

/// The number of bytes in a single blob.
pub const BYTES_PER_BLOB: usize = BYTES_PER_FIELD_ELEMENT * FIELD_ELEMENTS_PER_BLOB;

/// Field elements in one cell of the 2x extended blob.
pub const FIELD_ELEMENTS_PER_CELL: usize = 64;

/// The number of bytes in a single cell.
pub const BYTES_PER_CELL: usize = BYTES_PER_FIELD_ELEMENT * FIELD_ELEMENTS_PER_CELL;

/// Cells in an extended blob. The KZG library fixes the column count to this value.
pub const CELLS_PER_EXT_BLOB: usize = 2 * FIELD_ELEMENTS_PER_BLOB / FIELD_ELEMENTS_PER_CELL;

/// The size of a KZG commitment in bytes (compressed BLS12-381 G1 point).
pub const BYTES_PER_COMMITMENT: usize = 48;

/// The size of a KZG proof in bytes (compressed BLS12-381 G1 point).
pub const BYTES_PER_PROOF: usize = 48;

/// The size of a BLS signature in bytes (compressed G2 point).
pub const BYTES_PER_SIGNATURE: usize = 96;

/// Bytes in an SSZ hash tree root.
pub const BYTES_PER_ROOT: usize = 32;

/// Fields in the Fulu `BeaconBlockBody` container.
pub const NUM_BEACON_BLOCK_BODY_FIELDS: usize = 13;

/// Index of `blob_kzg_commitments` within the `BeaconBlockBody` SSZ container.
pub const BLOB_KZG_COMMITMENTS_INDEX: usize = 11;

/// Depth of the body tree: `NUM_BEACON_BLOCK_BODY_FIELDS` padded to the next power of two.
pub const BEACON_BLOCK_BODY_TREE_DEPTH: usize = 4;
