//! Polynomial commitment adapter
//!
//! The engine never touches field arithmetic. Everything it needs from the
//! KZG library goes through [`CellKzg`], which keeps the library behind one
//! seam: production code uses [`CKzg`] (c-kzg with the Ethereum trusted
//! setup), tests can substitute a scripted implementation.
//!
//! ## Trusted setup
//!
//! [`CKzg::mainnet`] uses the setup bundled with c-kzg, loaded once per
//! process. [`CKzg::from_trusted_setup_file`] reads the JSON format published
//! with the consensus specs (`g1_monomial`, `g1_lagrange`, `g2_monomial`).

use std::{path::Path, sync::Arc};

use c_kzg::{Blob as CKzgBlob, Bytes48, Cell as CKzgCell, KzgSettings};
use peerdas_types::{
    Blob, Cell, CellsAndProofs, ColumnIndex, KzgCommitment, KzgProof, aliases::Bytes,
};
use serde::Deserialize;

use crate::error::KzgError;

/// Number of bytes per G1 point
const BYTES_PER_G1_POINT: usize = 48;
/// Number of bytes per G2 point
const BYTES_PER_G2_POINT: usize = 96;

/// Disables fixed-base multi-scalar multiplication precomputation
const NO_PRECOMPUTE: u64 = 0;

/// Operations the engine consumes from the commitment scheme.
///
/// All inputs are fixed-size byte values; implementations must reject
/// malformed bytes with an error, never panic.
pub trait CellKzg: Send + Sync {
    /// Commit to a blob.
    fn blob_to_commitment(&self, blob: &Blob) -> Result<KzgCommitment, KzgError>;

    /// Extend a blob and return its cells, without proofs.
    fn compute_cells(&self, blob: &Blob) -> Result<Vec<Cell>, KzgError>;

    /// Single proof opening the whole blob against `commitment`.
    fn compute_blob_proof(
        &self,
        blob: &Blob,
        commitment: &KzgCommitment,
    ) -> Result<KzgProof, KzgError>;

    /// Extend a blob and prove every cell.
    fn compute_cells_and_proofs(&self, blob: &Blob) -> Result<CellsAndProofs, KzgError>;

    /// Verify many `(commitment, column, cell, proof)` tuples in one call.
    ///
    /// The four slices are parallel. Returns `Ok(false)` when any proof is wrong.
    fn verify_cell_proof_batch(
        &self,
        commitments: &[KzgCommitment],
        column_indices: &[ColumnIndex],
        cells: &[Cell],
        proofs: &[KzgProof],
    ) -> Result<bool, KzgError>;

    /// Erasure-decode the full cell set of one blob from any half of its
    /// cells, and prove every recovered cell.
    fn recover_cells_and_proofs(
        &self,
        column_indices: &[ColumnIndex],
        cells: &[Cell],
    ) -> Result<CellsAndProofs, KzgError>;
}

/// Wrapper over a BLS G1 point's byte representation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
struct G1Point(#[serde(with = "hex_serde")] [u8; BYTES_PER_G1_POINT]);

/// Wrapper over a BLS G2 point's byte representation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
struct G2Point(#[serde(with = "hex_serde")] [u8; BYTES_PER_G2_POINT]);

/// Trusted setup parameters for KZG
#[derive(Debug, Clone, Deserialize)]
struct TrustedSetup {
    g1_monomial: Vec<G1Point>,
    g1_lagrange: Vec<G1Point>,
    g2_monomial: Vec<G2Point>,
}

impl TrustedSetup {
    fn g1_monomial_bytes(&self) -> Vec<u8> {
        self.g1_monomial.iter().flat_map(|p| p.0).collect()
    }

    fn g1_lagrange_bytes(&self) -> Vec<u8> {
        self.g1_lagrange.iter().flat_map(|p| p.0).collect()
    }

    fn g2_monomial_bytes(&self) -> Vec<u8> {
        self.g2_monomial.iter().flat_map(|p| p.0).collect()
    }
}

/// Hex deserialization helper
mod hex_serde {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::custom(format!("Expected {} bytes, got {}", N, bytes.len()))
        })
    }
}

#[derive(Debug, Clone)]
enum Settings {
    Bundled(&'static KzgSettings),
    Loaded(Arc<KzgSettings>),
}

/// [`CellKzg`] backed by c-kzg.
#[derive(Debug, Clone)]
pub struct CKzg {
    settings: Settings,
}

impl CKzg {
    /// Ethereum mainnet trusted setup bundled with c-kzg.
    pub fn mainnet() -> Self {
        Self { settings: Settings::Bundled(c_kzg::ethereum_kzg_settings(NO_PRECOMPUTE)) }
    }

    /// Load a trusted setup from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `KzgError::TrustedSetupLoad` if the file cannot be read, parsed or loaded.
    pub fn from_trusted_setup_file(path: impl AsRef<Path>) -> Result<Self, KzgError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            KzgError::TrustedSetupLoad(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let trusted_setup: TrustedSetup = serde_json::from_slice(&bytes).map_err(|e| {
            KzgError::TrustedSetupLoad(format!("Failed to parse trusted setup: {:?}", e))
        })?;

        let settings = KzgSettings::load_trusted_setup(
            &trusted_setup.g1_monomial_bytes(),
            &trusted_setup.g1_lagrange_bytes(),
            &trusted_setup.g2_monomial_bytes(),
            NO_PRECOMPUTE,
        )
        .map_err(|e| KzgError::TrustedSetupLoad(format!("Failed to load KZG settings: {:?}", e)))?;

        Ok(Self { settings: Settings::Loaded(Arc::new(settings)) })
    }

    fn settings(&self) -> &KzgSettings {
        match &self.settings {
            Settings::Bundled(settings) => *settings,
            Settings::Loaded(settings) => settings.as_ref(),
        }
    }
}

impl Default for CKzg {
    fn default() -> Self {
        Self::mainnet()
    }
}

fn to_ckzg_blob(blob: &Blob) -> Result<CKzgBlob, KzgError> {
    CKzgBlob::from_bytes(blob.data()).map_err(|e| KzgError::InvalidBlob(format!("{:?}", e)))
}

fn to_bytes48(bytes: &[u8; 48]) -> Result<Bytes48, KzgError> {
    Bytes48::from_bytes(bytes).map_err(|e| KzgError::InvalidBytes48(format!("{:?}", e)))
}

fn to_ckzg_cell(cell: &Cell) -> Result<CKzgCell, KzgError> {
    CKzgCell::from_bytes(cell.as_slice()).map_err(|e| KzgError::InvalidCell(format!("{:?}", e)))
}

fn from_ckzg_cell(cell: &CKzgCell) -> Result<Cell, KzgError> {
    Cell::new(Bytes::copy_from_slice(&cell.to_bytes())).map_err(KzgError::InvalidCell)
}

fn from_ckzg_proof(proof: &c_kzg::KzgProof) -> KzgProof {
    KzgProof::new(proof.to_bytes().into_inner())
}

fn operation_error(operation: &'static str) -> impl FnOnce(c_kzg::Error) -> KzgError {
    move |e| KzgError::Operation { operation, reason: format!("{:?}", e) }
}

fn cells_and_proofs<'a>(
    cells: impl IntoIterator<Item = &'a CKzgCell>,
    proofs: impl IntoIterator<Item = &'a c_kzg::KzgProof>,
) -> Result<CellsAndProofs, KzgError> {
    let cells = cells.into_iter().map(from_ckzg_cell).collect::<Result<Vec<_>, _>>()?;
    let proofs = proofs.into_iter().map(from_ckzg_proof).collect();
    CellsAndProofs::new(cells, proofs)
        .map_err(|reason| KzgError::Operation { operation: "cells_and_proofs", reason })
}

impl CellKzg for CKzg {
    fn blob_to_commitment(&self, blob: &Blob) -> Result<KzgCommitment, KzgError> {
        let commitment = self
            .settings()
            .blob_to_kzg_commitment(&to_ckzg_blob(blob)?)
            .map_err(operation_error("blob_to_kzg_commitment"))?;
        Ok(KzgCommitment::new(commitment.to_bytes().into_inner()))
    }

    fn compute_cells(&self, blob: &Blob) -> Result<Vec<Cell>, KzgError> {
        let cells = self
            .settings()
            .compute_cells(&to_ckzg_blob(blob)?)
            .map_err(operation_error("compute_cells"))?;
        cells.iter().map(from_ckzg_cell).collect()
    }

    fn compute_blob_proof(
        &self,
        blob: &Blob,
        commitment: &KzgCommitment,
    ) -> Result<KzgProof, KzgError> {
        let proof = self
            .settings()
            .compute_blob_kzg_proof(&to_ckzg_blob(blob)?, &to_bytes48(commitment.as_bytes())?)
            .map_err(operation_error("compute_blob_kzg_proof"))?;
        Ok(from_ckzg_proof(&proof))
    }

    fn compute_cells_and_proofs(&self, blob: &Blob) -> Result<CellsAndProofs, KzgError> {
        let (cells, proofs) = self
            .settings()
            .compute_cells_and_kzg_proofs(&to_ckzg_blob(blob)?)
            .map_err(operation_error("compute_cells_and_kzg_proofs"))?;
        cells_and_proofs(cells.iter(), proofs.iter())
    }

    fn verify_cell_proof_batch(
        &self,
        commitments: &[KzgCommitment],
        column_indices: &[ColumnIndex],
        cells: &[Cell],
        proofs: &[KzgProof],
    ) -> Result<bool, KzgError> {
        let commitments = commitments
            .iter()
            .map(|c| to_bytes48(c.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        let cells = cells.iter().map(to_ckzg_cell).collect::<Result<Vec<_>, _>>()?;
        let proofs =
            proofs.iter().map(|p| to_bytes48(p.as_bytes())).collect::<Result<Vec<_>, _>>()?;

        self.settings()
            .verify_cell_kzg_proof_batch(&commitments, column_indices, &cells, &proofs)
            .map_err(operation_error("verify_cell_kzg_proof_batch"))
    }

    fn recover_cells_and_proofs(
        &self,
        column_indices: &[ColumnIndex],
        cells: &[Cell],
    ) -> Result<CellsAndProofs, KzgError> {
        let cells = cells.iter().map(to_ckzg_cell).collect::<Result<Vec<_>, _>>()?;
        let (cells, proofs) = self
            .settings()
            .recover_cells_and_kzg_proofs(column_indices, &cells)
            .map_err(operation_error("recover_cells_and_kzg_proofs"))?;
        cells_and_proofs(cells.iter(), proofs.iter())
    }
}
