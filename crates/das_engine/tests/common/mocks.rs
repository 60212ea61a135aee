//! Scripted KZG backend for failure injection.
//!
//! Delegates to the real backend unless told to fail a given operation.

use std::sync::atomic::{AtomicUsize, Ordering};

use peerdas_engine::{
    KzgError,
    kzg::{CKzg, CellKzg},
};
use peerdas_types::{Blob, Cell, CellsAndProofs, ColumnIndex, KzgCommitment, KzgProof};

/// Canned answer for batch verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Delegate,
    Invalid,
    LibraryError,
}

#[derive(Debug)]
pub struct MockKzg {
    inner: CKzg,
    verify: VerifyOutcome,
    fail_recovery: bool,
    recover_calls: AtomicUsize,
}

impl Default for MockKzg {
    fn default() -> Self {
        Self {
            inner: CKzg::mainnet(),
            verify: VerifyOutcome::Delegate,
            fail_recovery: false,
            recover_calls: AtomicUsize::new(0),
        }
    }
}

impl MockKzg {
    pub fn with_verify(mut self, outcome: VerifyOutcome) -> Self {
        self.verify = outcome;
        self
    }

    pub fn failing_recovery(mut self) -> Self {
        self.fail_recovery = true;
        self
    }

    pub fn recover_calls(&self) -> usize {
        self.recover_calls.load(Ordering::SeqCst)
    }
}

impl CellKzg for MockKzg {
    fn blob_to_commitment(&self, blob: &Blob) -> Result<KzgCommitment, KzgError> {
        self.inner.blob_to_commitment(blob)
    }

    fn compute_cells(&self, blob: &Blob) -> Result<Vec<Cell>, KzgError> {
        self.inner.compute_cells(blob)
    }

    fn compute_blob_proof(
        &self,
        blob: &Blob,
        commitment: &KzgCommitment,
    ) -> Result<KzgProof, KzgError> {
        self.inner.compute_blob_proof(blob, commitment)
    }

    fn compute_cells_and_proofs(&self, blob: &Blob) -> Result<CellsAndProofs, KzgError> {
        self.inner.compute_cells_and_proofs(blob)
    }

    fn verify_cell_proof_batch(
        &self,
        commitments: &[KzgCommitment],
        column_indices: &[ColumnIndex],
        cells: &[Cell],
        proofs: &[KzgProof],
    ) -> Result<bool, KzgError> {
        match self.verify {
            VerifyOutcome::Delegate => {
                self.inner.verify_cell_proof_batch(commitments, column_indices, cells, proofs)
            }
            VerifyOutcome::Invalid => Ok(false),
            VerifyOutcome::LibraryError => Err(KzgError::Operation {
                operation: "verify_cell_kzg_proof_batch",
                reason: "injected".to_string(),
            }),
        }
    }

    fn recover_cells_and_proofs(
        &self,
        column_indices: &[ColumnIndex],
        cells: &[Cell],
    ) -> Result<CellsAndProofs, KzgError> {
        self.recover_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recovery {
            return Err(KzgError::Operation {
                operation: "recover_cells_and_kzg_proofs",
                reason: "injected".to_string(),
            });
        }
        self.inner.recover_cells_and_proofs(column_indices, cells)
    }
}
