//! Erasure recovery from a partial column set
//!
//! Any `ceil(number_of_columns / 2)` distinct columns of a block determine every
//! blob's extended cell set. Recovery runs one rayon task per blob, each writing
//! into its own pre-sized output slot. Rayon joins every task before
//! returning, so a failing blob never leaves work in flight; the first error
//! observed is the one reported.

use std::collections::BTreeMap;

use peerdas_types::{BlobIndex, Cell, CellsAndProofs, ColumnIndex, DasSpec, DataColumnSidecar};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    codec::build_data_column_sidecars,
    error::{DasError, ReconstructionError},
    kzg::CellKzg,
    verifier::VerifiedDataColumnSidecar,
};

/// Distinct sidecars by column, checking every one belongs to the same block
/// and covers the same blobs.
fn distinct_columns(
    sidecars: &[VerifiedDataColumnSidecar],
) -> Result<BTreeMap<ColumnIndex, &DataColumnSidecar>, ReconstructionError> {
    let first = sidecars.first().ok_or(ReconstructionError::NoSidecars)?;

    let mut by_column = BTreeMap::new();
    for sidecar in sidecars {
        first.ensure_same_block(sidecar)?;
        by_column.entry(sidecar.index()).or_insert(sidecar.as_sidecar());
    }

    Ok(by_column)
}

/// Recover the full cells and proofs of every blob from the given columns.
///
/// Duplicate columns are used once. The result has one entry per blob, in
/// blob order.
///
/// # Errors
///
/// - `NoSidecars` for an empty input
/// - `LengthMismatch` if the sidecars disagree on the blob count
/// - `BlockMismatch` if the sidecars come from different blocks
/// - `BlobRecovery` naming the blob whose recovery failed
#[instrument(skip_all, level = "debug", fields(sidecars = sidecars.len()))]
pub fn recover_cells_and_kzg_proofs<K: CellKzg>(
    kzg: &K,
    sidecars: &[VerifiedDataColumnSidecar],
) -> Result<Vec<CellsAndProofs>, ReconstructionError> {
    let by_column = distinct_columns(sidecars)?;
    let column_indices: Vec<ColumnIndex> = by_column.keys().copied().collect();
    let blob_count = by_column.values().next().map_or(0, |sidecar| sidecar.blob_count());

    let mut recovered: Vec<Option<CellsAndProofs>> = vec![None; blob_count];
    recovered.par_iter_mut().enumerate().with_max_len(1).try_for_each(|(row, slot)| {
        let cells: Vec<Cell> =
            by_column.values().map(|sidecar| sidecar.column[row].clone()).collect();

        let cells_and_proofs = kzg.recover_cells_and_proofs(&column_indices, &cells).map_err(
            |source| ReconstructionError::BlobRecovery { blob_index: row as BlobIndex, source },
        )?;
        *slot = Some(cells_and_proofs);
        Ok::<_, ReconstructionError>(())
    })?;

    debug!(blob_count, columns = column_indices.len(), "Recovered cells and proofs");

    // every slot is written once try_for_each returns Ok
    Ok(recovered.into_iter().flatten().collect())
}

/// Rebuild every column sidecar of a block from a sufficient subset.
///
/// A complete set is returned as is, sorted by column. Otherwise the missing
/// columns are recovered and all sidecars are re-encoded with the header,
/// commitments and inclusion proof of the first input.
///
/// # Errors
///
/// - `NotEnoughColumns` below `ceil(number_of_columns / 2)` distinct columns
/// - any error of [`recover_cells_and_kzg_proofs`] or re-encoding
#[instrument(skip_all, level = "debug", fields(sidecars = sidecars.len()))]
pub fn reconstruct_data_column_sidecars<K: CellKzg>(
    kzg: &K,
    sidecars: &[VerifiedDataColumnSidecar],
    spec: &DasSpec,
) -> Result<Vec<DataColumnSidecar>, DasError> {
    let by_column = distinct_columns(sidecars)?;

    if by_column.len() as u64 >= spec.number_of_columns {
        return Ok(by_column.into_values().cloned().collect());
    }

    let need = spec.minimum_columns_for_reconstruction();
    if (by_column.len() as u64) < need {
        return Err(ReconstructionError::NotEnoughColumns { have: by_column.len(), need }.into());
    }

    let cells_and_proofs = recover_cells_and_kzg_proofs(kzg, sidecars)?;

    let first = &sidecars[0];
    let sidecars = build_data_column_sidecars(
        first.as_sidecar().kzg_commitments.clone(),
        first.as_sidecar().kzg_commitments_inclusion_proof.clone(),
        first.signed_block_header().clone(),
        &cells_and_proofs,
        spec,
    )?;

    debug!(
        recovered = sidecars.len() - by_column.len(),
        total = sidecars.len(),
        "Reconstructed data column sidecars"
    );

    Ok(sidecars)
}
