//! Column codec
//!
//! Transposes per-blob cells into per-column sidecars for broadcast, and
//! rebuilds blobs from the systematic half of the columns on ingest.
//!
//! ```text
//! encode:  blob b, cells [c0 .. c127]  ──>  sidecar c holds cell c of every blob
//! decode:  sidecars 0..64               ──>  blob b = cell 0 ‖ cell 1 ‖ .. ‖ cell 63
//! ```
//!
//! Decoding is a copy because the erasure code is systematic: the first half
//! of the cells are the blob bytes themselves.

use std::collections::BTreeMap;

use alloy_primitives::B256;
use peerdas_types::{
    Blob, BlobIndex, BlobSidecar, CellsAndProofs, ColumnIndex, DasSpec, DataColumnSidecar,
    KzgCommitment, SignedBeaconBlock, SignedBeaconBlockHeader,
    aliases::Bytes,
    constants::{BEACON_BLOCK_BODY_TREE_DEPTH, BYTES_PER_BLOB},
    ethereum_compat::{MerkleError, generate_kzg_commitment_inclusion_proof},
};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    error::{DasError, KzgError, ReconstructionError, ValidationError},
    kzg::CellKzg,
    verifier::VerifiedDataColumnSidecar,
};

/// What the codec needs from a block to build its sidecars.
pub trait BlockContents {
    fn signed_block_header(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<SignedBeaconBlockHeader, MerkleError>;

    fn blob_kzg_commitments(&self) -> &[KzgCommitment];

    /// Branch from the commitments list root to the block body root.
    fn kzg_commitments_inclusion_proof(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<Vec<B256>, MerkleError>;
}

impl BlockContents for SignedBeaconBlock {
    fn signed_block_header(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<SignedBeaconBlockHeader, MerkleError> {
        SignedBeaconBlock::signed_block_header(self, commitments_tree_depth)
    }

    fn blob_kzg_commitments(&self) -> &[KzgCommitment] {
        SignedBeaconBlock::blob_kzg_commitments(self)
    }

    fn kzg_commitments_inclusion_proof(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<Vec<B256>, MerkleError> {
        self.message.body.kzg_commitments_merkle_proof(commitments_tree_depth)
    }
}

/// Compute cells and cell proofs for every blob, one rayon task per blob.
#[instrument(skip_all, level = "debug", fields(blob_count = blobs.len()))]
pub fn compute_cells_and_proofs<K: CellKzg>(
    kzg: &K,
    blobs: &[Blob],
) -> Result<Vec<CellsAndProofs>, KzgError> {
    blobs.par_iter().map(|blob| kzg.compute_cells_and_proofs(blob)).collect()
}

/// Build one sidecar per column from a block and its blobs' cells and proofs.
///
/// Returns an empty list when there is no block or no blobs.
///
/// # Errors
///
/// - `SizeMismatch` if `cells_and_proofs` and the block's commitments differ in length
/// - `CellCountMismatch` if a blob does not have exactly one cell per column
#[instrument(skip_all, level = "debug", fields(blob_count = cells_and_proofs.len()))]
pub fn data_column_sidecars<B: BlockContents>(
    block: Option<&B>,
    cells_and_proofs: &[CellsAndProofs],
    spec: &DasSpec,
) -> Result<Vec<DataColumnSidecar>, ValidationError> {
    let Some(block) = block else {
        return Ok(Vec::new());
    };
    if cells_and_proofs.is_empty() {
        return Ok(Vec::new());
    }

    let commitments = block.blob_kzg_commitments();
    if cells_and_proofs.len() != commitments.len() {
        return Err(ValidationError::SizeMismatch {
            expected: commitments.len(),
            actual: cells_and_proofs.len(),
        });
    }

    let depth = spec.max_commitments_tree_depth();
    build_data_column_sidecars(
        commitments.to_vec(),
        block.kzg_commitments_inclusion_proof(depth)?,
        block.signed_block_header(depth)?,
        cells_and_proofs,
        spec,
    )
}

/// Transpose `cells_and_proofs` into sidecars sharing the given header,
/// commitments and inclusion proof.
pub(crate) fn build_data_column_sidecars(
    kzg_commitments: Vec<KzgCommitment>,
    kzg_commitments_inclusion_proof: Vec<B256>,
    signed_block_header: SignedBeaconBlockHeader,
    cells_and_proofs: &[CellsAndProofs],
    spec: &DasSpec,
) -> Result<Vec<DataColumnSidecar>, ValidationError> {
    let number_of_columns = spec.number_of_columns as usize;
    let blob_count = cells_and_proofs.len();

    for (blob_index, blob) in cells_and_proofs.iter().enumerate() {
        if blob.len() != number_of_columns {
            return Err(ValidationError::CellCountMismatch {
                blob_index: blob_index as BlobIndex,
                expected: number_of_columns,
                actual: blob.len(),
            });
        }
    }

    let mut columns = vec![Vec::with_capacity(blob_count); number_of_columns];
    let mut column_proofs = vec![Vec::with_capacity(blob_count); number_of_columns];
    for blob in cells_and_proofs {
        for (column, (cell, proof)) in blob.cells().iter().zip(blob.proofs()).enumerate() {
            columns[column].push(cell.clone());
            column_proofs[column].push(*proof);
        }
    }

    let sidecars: Vec<DataColumnSidecar> = columns
        .into_iter()
        .zip(column_proofs)
        .enumerate()
        .map(|(index, (column, kzg_proofs))| DataColumnSidecar {
            index: index as ColumnIndex,
            column,
            kzg_commitments: kzg_commitments.clone(),
            kzg_proofs,
            signed_block_header: Some(signed_block_header.clone()),
            kzg_commitments_inclusion_proof: kzg_commitments_inclusion_proof.clone(),
        })
        .collect();

    debug!(blob_count, column_count = sidecars.len(), "Built data column sidecars");

    Ok(sidecars)
}

/// Rebuild blobs from the first half of the columns.
///
/// `indices` selects blobs; an empty selection means every blob. Indices at
/// or beyond the block's blob count are ignored. Each blob's proof is
/// recomputed from its commitment rather than taken from the network.
///
/// # Errors
///
/// - `MissingColumns` listing, in ascending order, every column in
///   `0..ceil(number_of_columns / 2)` not present in `sidecars`
/// - `LengthMismatch` if the sidecars disagree on the blob count
/// - `BlockMismatch` if the sidecars come from different blocks
#[instrument(skip_all, level = "debug", fields(sidecars = sidecars.len()))]
pub fn reconstruct_blobs<K: CellKzg>(
    kzg: &K,
    sidecars: &[VerifiedDataColumnSidecar],
    indices: &[BlobIndex],
    spec: &DasSpec,
) -> Result<Vec<BlobSidecar>, DasError> {
    let by_column: BTreeMap<ColumnIndex, &VerifiedDataColumnSidecar> =
        sidecars.iter().map(|sidecar| (sidecar.index(), sidecar)).collect();

    let needed = spec.minimum_columns_for_reconstruction();
    let missing: Vec<ColumnIndex> =
        (0..needed).filter(|column| !by_column.contains_key(column)).collect();
    if !missing.is_empty() {
        return Err(ReconstructionError::MissingColumns { missing }.into());
    }

    let systematic: Vec<&VerifiedDataColumnSidecar> =
        (0..needed).filter_map(|column| by_column.get(&column).copied()).collect();
    let Some(first) = systematic.first() else {
        return Ok(Vec::new());
    };

    for sidecar in by_column.values() {
        first.ensure_same_block(sidecar)?;
    }
    let blob_count = first.as_sidecar().blob_count();

    let requested: Vec<BlobIndex> = if indices.is_empty() {
        (0..blob_count as BlobIndex).collect()
    } else {
        indices.iter().copied().filter(|index| *index < blob_count as BlobIndex).collect()
    };

    let commitments = &first.as_sidecar().kzg_commitments;
    let body_branch = &first.as_sidecar().kzg_commitments_inclusion_proof;
    let header = first.signed_block_header();
    let depth = spec.max_commitments_tree_depth();

    requested
        .into_iter()
        .map(|blob_index| {
            let row = blob_index as usize;
            let mut data = Vec::with_capacity(BYTES_PER_BLOB);
            for sidecar in &systematic {
                data.extend_from_slice(sidecar.as_sidecar().column[row].as_slice());
            }
            let blob = Blob::new(Bytes::from(data)).map_err(|reason| {
                ValidationError::InvalidCell { column: 0, blob_index, reason }
            })?;

            let commitment = commitments[row];
            let kzg_proof = kzg.compute_blob_proof(&blob, &commitment)?;
            let inclusion_proof = generate_kzg_commitment_inclusion_proof(
                commitments,
                row,
                depth,
                body_branch,
                BEACON_BLOCK_BODY_TREE_DEPTH,
            )
            .map_err(ValidationError::from)?;

            Ok(BlobSidecar::new(
                blob_index,
                blob,
                commitment,
                kzg_proof,
                header.clone(),
                inclusion_proof,
            ))
        })
        .collect()
}
