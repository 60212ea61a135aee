//! Data column sidecar verification
//!
//! Three independent gates, cheapest first:
//!
//! 1. **Structure**: index in range, commitments present, parallel lists agree
//! 2. **Inclusion**: the commitments list opens the header's `body_root`
//! 3. **KZG**: every cell opens its commitment at its column, checked for a
//!    whole batch of sidecars in one library call
//!
//! Only [`verify_data_column_sidecars`] hands out [`VerifiedDataColumnSidecar`],
//! the type decoding and reconstruction accept.

use std::time::Instant;

use itertools::izip;
use peerdas_types::{
    Cell, ColumnIndex, DasSpec, DataColumnSidecar, KzgCommitment, KzgProof,
    SignedBeaconBlockHeader,
    constants::BLOB_KZG_COMMITMENTS_INDEX,
    ethereum_compat::{kzg_commitments_list_root, verify_merkle_proof},
};
use tracing::{debug, instrument, warn};

use crate::{
    error::{CryptographicError, DasError, ValidationError},
    kzg::CellKzg,
};

/// A sidecar that passed structural, inclusion and KZG verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedDataColumnSidecar {
    sidecar: DataColumnSidecar,
    signed_block_header: SignedBeaconBlockHeader,
}

impl VerifiedDataColumnSidecar {
    #[inline]
    pub fn index(&self) -> ColumnIndex {
        self.sidecar.index
    }

    #[inline]
    pub fn as_sidecar(&self) -> &DataColumnSidecar {
        &self.sidecar
    }

    /// The header the sidecar was verified against.
    #[inline]
    pub fn signed_block_header(&self) -> &SignedBeaconBlockHeader {
        &self.signed_block_header
    }

    pub fn into_inner(self) -> DataColumnSidecar {
        self.sidecar
    }

    /// Check that `other` covers the same blobs of the same block.
    ///
    /// Each sidecar is only verified against its own header, so columns of
    /// different blocks must be told apart before their cells are combined.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` if the blob counts differ
    /// - `BlockMismatch` if the headers or commitments differ
    pub fn ensure_same_block(&self, other: &Self) -> Result<(), ValidationError> {
        let expected = self.sidecar.blob_count();
        let actual = other.sidecar.blob_count();
        if actual != expected {
            return Err(ValidationError::LengthMismatch {
                column: other.index(),
                expected,
                actual,
            });
        }

        if other.signed_block_header != self.signed_block_header
            || other.sidecar.kzg_commitments != self.sidecar.kzg_commitments
        {
            return Err(ValidationError::BlockMismatch {
                column: other.index(),
                first: self.index(),
            });
        }

        Ok(())
    }
}

/// Structural checks on a single sidecar.
///
/// # Errors
///
/// - `IndexTooLarge` if the column index is outside the matrix
/// - `NoKzgCommitments` if the sidecar commits to no blobs
/// - `MismatchLength` if cells, commitments and proofs differ in length
pub fn verify_data_column_sidecar(
    sidecar: &DataColumnSidecar,
    spec: &DasSpec,
) -> Result<(), ValidationError> {
    if sidecar.index >= spec.number_of_columns {
        return Err(ValidationError::IndexTooLarge {
            index: sidecar.index,
            max: spec.number_of_columns,
        });
    }

    if sidecar.kzg_commitments.is_empty() {
        return Err(ValidationError::NoKzgCommitments { index: sidecar.index });
    }

    let cells = sidecar.column.len();
    let commitments = sidecar.kzg_commitments.len();
    let proofs = sidecar.kzg_proofs.len();
    if cells != commitments || commitments != proofs {
        return Err(ValidationError::MismatchLength {
            index: sidecar.index,
            cells,
            commitments,
            proofs,
        });
    }

    Ok(())
}

/// Check that the sidecar's commitments list is the one committed to by the
/// header's body root.
///
/// # Errors
///
/// - `NilBlockHeader` if the sidecar has no header
/// - `BadRootLength` if the body root is not `bytes_per_root` long
/// - `InvalidInclusionProof` if the branch does not open the body root
pub fn verify_data_column_sidecar_inclusion_proof(
    sidecar: &DataColumnSidecar,
    spec: &DasSpec,
) -> Result<(), DasError> {
    let header = sidecar
        .signed_block_header
        .as_ref()
        .ok_or(ValidationError::NilBlockHeader { index: sidecar.index })?;

    let body_root = header.message.body_root;
    if body_root.len() as u64 != spec.bytes_per_root {
        return Err(ValidationError::BadRootLength {
            expected: spec.bytes_per_root,
            actual: body_root.len(),
        }
        .into());
    }

    let list_root =
        kzg_commitments_list_root(&sidecar.kzg_commitments, spec.max_commitments_tree_depth())
            .map_err(ValidationError::from)?;

    if !verify_merkle_proof(
        list_root,
        &sidecar.kzg_commitments_inclusion_proof,
        spec.kzg_commitments_inclusion_proof_depth as usize,
        BLOB_KZG_COMMITMENTS_INDEX,
        body_root,
    ) {
        return Err(CryptographicError::InvalidInclusionProof { index: sidecar.index }.into());
    }

    Ok(())
}

/// Verify the cell proofs of many sidecars with a single batched call.
///
/// Sidecars must already have passed [`verify_data_column_sidecar`]. An empty
/// batch is trivially valid.
///
/// # Errors
///
/// Returns `InvalidKzgProof` if any proof is wrong or the library rejects the input.
#[instrument(skip_all, level = "debug", fields(sidecars = sidecars.len()))]
pub fn verify_data_columns_sidecar_kzg_proofs<K: CellKzg>(
    kzg: &K,
    sidecars: &[DataColumnSidecar],
) -> Result<(), CryptographicError> {
    let cell_count: usize = sidecars.iter().map(|sidecar| sidecar.column.len()).sum();
    if cell_count == 0 {
        return Ok(());
    }

    let mut commitments: Vec<KzgCommitment> = Vec::with_capacity(cell_count);
    let mut column_indices: Vec<ColumnIndex> = Vec::with_capacity(cell_count);
    let mut cells: Vec<Cell> = Vec::with_capacity(cell_count);
    let mut proofs: Vec<KzgProof> = Vec::with_capacity(cell_count);

    for sidecar in sidecars {
        for (cell, commitment, proof) in
            izip!(&sidecar.column, &sidecar.kzg_commitments, &sidecar.kzg_proofs)
        {
            commitments.push(*commitment);
            column_indices.push(sidecar.index);
            cells.push(cell.clone());
            proofs.push(*proof);
        }
    }

    let start = Instant::now();
    let valid = kzg
        .verify_cell_proof_batch(&commitments, &column_indices, &cells, &proofs)
        .map_err(|e| CryptographicError::InvalidKzgProof {
            sidecars: sidecars.len(),
            reason: e.to_string(),
        })?;

    debug!(cells = cell_count, valid, elapsed = ?start.elapsed(), "Batch verified cell proofs");

    if !valid {
        return Err(CryptographicError::InvalidKzgProof {
            sidecars: sidecars.len(),
            reason: "verification returned false".to_string(),
        });
    }

    Ok(())
}

/// Run every check on a batch of sidecars.
///
/// Structural and inclusion checks run per sidecar; KZG proofs are checked
/// once for the whole batch.
pub fn verify_data_column_sidecars<K: CellKzg>(
    kzg: &K,
    sidecars: Vec<DataColumnSidecar>,
    spec: &DasSpec,
) -> Result<Vec<VerifiedDataColumnSidecar>, DasError> {
    for sidecar in &sidecars {
        verify_data_column_sidecar(sidecar, spec)?;
        verify_data_column_sidecar_inclusion_proof(sidecar, spec).inspect_err(|e| {
            warn!(
                column = sidecar.index,
                slot = ?sidecar.slot(),
                error = %e,
                "Rejected data column sidecar"
            );
        })?;
    }

    verify_data_columns_sidecar_kzg_proofs(kzg, &sidecars)?;

    sidecars
        .into_iter()
        .map(|sidecar| {
            let signed_block_header = sidecar
                .signed_block_header
                .clone()
                .ok_or(ValidationError::NilBlockHeader { index: sidecar.index })?;
            Ok(VerifiedDataColumnSidecar { sidecar, signed_block_header })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use peerdas_types::{
        BeaconBlock, BeaconBlockBody, BlsSignature, SignedBeaconBlock, constants::BYTES_PER_CELL,
    };

    use super::*;

    fn sidecar(blobs: u8) -> DataColumnSidecar {
        let spec = DasSpec::mainnet();
        let depth = spec.max_commitments_tree_depth();
        let commitments: Vec<_> = (0..blobs).map(|i| KzgCommitment::new([i + 1; 48])).collect();
        let block = SignedBeaconBlock::new(
            BeaconBlock {
                slot: 10,
                body: BeaconBlockBody::new(commitments.clone()),
                ..Default::default()
            },
            BlsSignature::EMPTY,
        );

        DataColumnSidecar {
            index: 4,
            column: vec![Cell::from_slice(&[0u8; BYTES_PER_CELL]).unwrap(); blobs as usize],
            kzg_commitments: commitments,
            kzg_proofs: vec![KzgProof::new([0u8; 48]); blobs as usize],
            signed_block_header: Some(block.signed_block_header(depth).unwrap()),
            kzg_commitments_inclusion_proof: block
                .message
                .body
                .kzg_commitments_merkle_proof(depth)
                .unwrap(),
        }
    }

    #[test]
    fn test_structural_checks() {
        let spec = DasSpec::mainnet();
        assert_eq!(verify_data_column_sidecar(&sidecar(2), &spec), Ok(()));

        let mut bad = sidecar(2);
        bad.index = 128;
        assert_eq!(
            verify_data_column_sidecar(&bad, &spec),
            Err(ValidationError::IndexTooLarge { index: 128, max: 128 })
        );

        let mut bad = sidecar(2);
        bad.kzg_commitments.clear();
        assert_eq!(
            verify_data_column_sidecar(&bad, &spec),
            Err(ValidationError::NoKzgCommitments { index: 4 })
        );

        let mut bad = sidecar(2);
        bad.kzg_proofs.pop();
        assert_eq!(
            verify_data_column_sidecar(&bad, &spec),
            Err(ValidationError::MismatchLength { index: 4, cells: 2, commitments: 2, proofs: 1 })
        );
    }

    #[test]
    fn test_inclusion_proof_accepts_block_branch() {
        let spec = DasSpec::mainnet();
        assert!(verify_data_column_sidecar_inclusion_proof(&sidecar(3), &spec).is_ok());
    }

    #[test]
    fn test_inclusion_proof_rejects_tampering() {
        let spec = DasSpec::mainnet();

        let mut bad = sidecar(3);
        bad.kzg_commitments[1] = KzgCommitment::new([0xee; 48]);
        assert!(matches!(
            verify_data_column_sidecar_inclusion_proof(&bad, &spec),
            Err(DasError::Cryptographic(CryptographicError::InvalidInclusionProof { index: 4 }))
        ));

        let mut bad = sidecar(3);
        bad.kzg_commitments_inclusion_proof[0] = B256::repeat_byte(1);
        assert!(matches!(
            verify_data_column_sidecar_inclusion_proof(&bad, &spec),
            Err(DasError::Cryptographic(CryptographicError::InvalidInclusionProof { .. }))
        ));

        let mut bad = sidecar(3);
        bad.kzg_commitments_inclusion_proof.pop();
        assert!(verify_data_column_sidecar_inclusion_proof(&bad, &spec).is_err());
    }

    #[test]
    fn test_inclusion_proof_requires_header() {
        let spec = DasSpec::mainnet();
        let headless = DataColumnSidecar { signed_block_header: None, ..sidecar(1) };
        assert!(matches!(
            verify_data_column_sidecar_inclusion_proof(&headless, &spec),
            Err(DasError::Validation(ValidationError::NilBlockHeader { index: 4 }))
        ));
    }

    #[test]
    fn test_bad_root_length_reported() {
        let spec = DasSpec { bytes_per_root: 48, ..DasSpec::mainnet() };
        assert!(matches!(
            verify_data_column_sidecar_inclusion_proof(&sidecar(1), &spec),
            Err(DasError::Validation(ValidationError::BadRootLength { expected: 48, actual: 32 }))
        ));
    }
}
