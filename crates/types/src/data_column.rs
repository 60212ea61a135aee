//! Data column sidecar: one column of a block's extended blob matrix.
//!
//! ```text
//!                 column 0   column 1   ...   column 127
//! blob 0 (row) ─  cell       cell             cell
//! blob 1 (row) ─  cell       cell             cell
//!   ...
//!                   │
//!                   ▼
//!         DataColumnSidecar { index: 0, column: [cell of every blob], .. }
//! ```
//!
//! Each sidecar repeats the block's full commitments list and signed header so
//! it can be verified on its own, without the block.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{
    blob::{Blob, Cell, KzgCommitment, KzgProof},
    constants::{
        BYTES_PER_BLOB, BYTES_PER_CELL, BYTES_PER_COMMITMENT, BYTES_PER_PROOF, BYTES_PER_ROOT,
    },
    ethereum_compat::SignedBeaconBlockHeader,
};

/// Position of a blob within its block.
pub type BlobIndex = u64;

/// Position of a column within the extended blob matrix.
pub type ColumnIndex = u64;

/// Identifier of a custody group.
pub type CustodyIndex = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataColumnSidecar {
    pub index: ColumnIndex,

    /// One cell per blob, in blob order.
    pub column: Vec<Cell>,

    /// The block's full commitments list, parallel to `column`.
    pub kzg_commitments: Vec<KzgCommitment>,

    /// Cell proofs, parallel to `column`.
    pub kzg_proofs: Vec<KzgProof>,

    /// `None` only for malformed network input; the verifier rejects it.
    pub signed_block_header: Option<SignedBeaconBlockHeader>,

    /// Branch from the commitments list root to `body_root`.
    pub kzg_commitments_inclusion_proof: Vec<B256>,
}

impl DataColumnSidecar {
    /// Number of blobs covered, as reported by the column itself.
    #[inline]
    pub fn blob_count(&self) -> usize {
        self.column.len()
    }

    pub fn slot(&self) -> Option<u64> {
        self.signed_block_header.as_ref().map(|header| header.message.slot)
    }

    /// Root of the block this column belongs to.
    pub fn block_root(&self) -> Option<B256> {
        self.signed_block_header.as_ref().map(|header| header.message.hash_tree_root())
    }

    /// Approximate wire size, used for metrics.
    pub fn size_bytes(&self) -> usize {
        8 + self.column.len() * BYTES_PER_CELL +
            self.kzg_commitments.len() * BYTES_PER_COMMITMENT +
            self.kzg_proofs.len() * BYTES_PER_PROOF +
            self.kzg_commitments_inclusion_proof.len() * BYTES_PER_ROOT
    }
}

/// A blob rebuilt from columns, with the provenance needed to re-verify it
/// against its block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobSidecar {
    pub index: BlobIndex,

    pub blob: Blob,

    pub kzg_commitment: KzgCommitment,

    /// Blob proof recomputed from `blob` and `kzg_commitment`.
    pub kzg_proof: KzgProof,

    pub signed_block_header: SignedBeaconBlockHeader,

    /// Proof that `kzg_commitment` sits at `index` of the commitments list in
    /// the body under `signed_block_header`.
    pub kzg_commitment_inclusion_proof: Vec<B256>,
}

impl BlobSidecar {
    pub fn new(
        index: BlobIndex,
        blob: Blob,
        kzg_commitment: KzgCommitment,
        kzg_proof: KzgProof,
        signed_block_header: SignedBeaconBlockHeader,
        kzg_commitment_inclusion_proof: Vec<B256>,
    ) -> Self {
        Self {
            index,
            blob,
            kzg_commitment,
            kzg_proof,
            signed_block_header,
            kzg_commitment_inclusion_proof,
        }
    }

    /// Calculate size in bytes for this sidecar
    pub fn size_bytes(&self) -> usize {
        8 + BYTES_PER_BLOB +
            BYTES_PER_COMMITMENT +
            BYTES_PER_PROOF +
            self.kzg_commitment_inclusion_proof.len() * BYTES_PER_ROOT
    }
}
