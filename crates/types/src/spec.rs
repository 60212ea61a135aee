//! Network parameters consumed by the sampling, codec and verification code.
//!
//! Unlike [`crate::constants`], these can differ between networks and are
//! loaded from the node configuration. `DasSpec::mainnet()` carries the Fulu
//! mainnet values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BEACON_BLOCK_BODY_TREE_DEPTH, BYTES_PER_ROOT, CELLS_PER_EXT_BLOB};

/// Gwei in one ether.
const GWEI_PER_ETH: u64 = 1_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("{field} must be non-zero")]
    Zero { field: &'static str },

    #[error(
        "number_of_columns ({columns}) must be a multiple of number_of_custody_groups ({groups})"
    )]
    ColumnsNotMultipleOfGroups { columns: u64, groups: u64 },

    #[error("number_of_columns ({columns}) must equal the cells per extended blob ({expected})")]
    ColumnsMismatchKzg { columns: u64, expected: u64 },

    #[error("{field} ({value}) exceeds number_of_custody_groups ({groups})")]
    ExceedsGroups { field: &'static str, value: u64, groups: u64 },

    #[error("max_blob_commitments_per_block ({0}) must be a power of two")]
    CommitmentsNotPowerOfTwo(u64),

    #[error("kzg_commitments_inclusion_proof_depth must be {expected}, got {actual}")]
    InclusionProofDepth { expected: u64, actual: u64 },

    #[error("bytes_per_root must be {expected}, got {actual}")]
    RootLength { expected: u64, actual: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DasSpec {
    /// Columns in the extended blob matrix.
    pub number_of_columns: u64,
    /// Custody groups the column space is partitioned into.
    pub number_of_custody_groups: u64,
    /// Gossip subnets data column sidecars are spread over.
    pub data_column_sidecar_subnet_count: u64,
    /// Minimum groups a node samples per slot.
    pub samples_per_slot: u64,
    /// Groups custodied by a node without attached validators.
    pub custody_requirement: u64,
    /// Lower bound for validator-driven custody.
    pub validator_custody_requirement: u64,
    /// Effective balance (gwei) that adds one custody group.
    pub balance_per_additional_custody_group: u64,
    pub max_blob_commitments_per_block: u64,
    /// Branch length from the commitments list root to the block body root.
    pub kzg_commitments_inclusion_proof_depth: u64,
    pub bytes_per_root: u64,
    /// Capacity of the per-peer custody info cache.
    pub peer_info_cache_size: usize,
}

impl Default for DasSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl DasSpec {
    pub const fn mainnet() -> Self {
        Self {
            number_of_columns: CELLS_PER_EXT_BLOB as u64,
            number_of_custody_groups: 128,
            data_column_sidecar_subnet_count: 128,
            samples_per_slot: 8,
            custody_requirement: 4,
            validator_custody_requirement: 8,
            balance_per_additional_custody_group: 32 * GWEI_PER_ETH,
            max_blob_commitments_per_block: 4096,
            kzg_commitments_inclusion_proof_depth: BEACON_BLOCK_BODY_TREE_DEPTH as u64,
            bytes_per_root: BYTES_PER_ROOT as u64,
            peer_info_cache_size: 200,
        }
    }

    /// Columns assigned to each custody group, zero when there are no groups.
    pub const fn columns_per_group(&self) -> u64 {
        match self.number_of_columns.checked_div(self.number_of_custody_groups) {
            Some(columns) => columns,
            None => 0,
        }
    }

    /// Distinct columns needed to recover the full extended blob (half, rounded up).
    pub const fn minimum_columns_for_reconstruction(&self) -> u64 {
        self.number_of_columns.div_ceil(2)
    }

    /// Depth of the sparse merkle tree over the blob commitments list.
    pub const fn max_commitments_tree_depth(&self) -> usize {
        self.max_blob_commitments_per_block.next_power_of_two().ilog2() as usize
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        for (field, value) in [
            ("number_of_columns", self.number_of_columns),
            ("number_of_custody_groups", self.number_of_custody_groups),
            ("data_column_sidecar_subnet_count", self.data_column_sidecar_subnet_count),
            ("balance_per_additional_custody_group", self.balance_per_additional_custody_group),
            ("max_blob_commitments_per_block", self.max_blob_commitments_per_block),
            ("peer_info_cache_size", self.peer_info_cache_size as u64),
        ] {
            if value == 0 {
                return Err(SpecError::Zero { field });
            }
        }

        if self.number_of_columns % self.number_of_custody_groups != 0 {
            return Err(SpecError::ColumnsNotMultipleOfGroups {
                columns: self.number_of_columns,
                groups: self.number_of_custody_groups,
            });
        }

        if self.number_of_columns != CELLS_PER_EXT_BLOB as u64 {
            return Err(SpecError::ColumnsMismatchKzg {
                columns: self.number_of_columns,
                expected: CELLS_PER_EXT_BLOB as u64,
            });
        }

        for (field, value) in [
            ("custody_requirement", self.custody_requirement),
            ("validator_custody_requirement", self.validator_custody_requirement),
        ] {
            if value > self.number_of_custody_groups {
                return Err(SpecError::ExceedsGroups {
                    field,
                    value,
                    groups: self.number_of_custody_groups,
                });
            }
        }

        if !self.max_blob_commitments_per_block.is_power_of_two() {
            return Err(SpecError::CommitmentsNotPowerOfTwo(self.max_blob_commitments_per_block));
        }

        if self.kzg_commitments_inclusion_proof_depth != BEACON_BLOCK_BODY_TREE_DEPTH as u64 {
            return Err(SpecError::InclusionProofDepth {
                expected: BEACON_BLOCK_BODY_TREE_DEPTH as u64,
                actual: self.kzg_commitments_inclusion_proof_depth,
            });
        }

        if self.bytes_per_root != BYTES_PER_ROOT as u64 {
            return Err(SpecError::RootLength {
                expected: BYTES_PER_ROOT as u64,
                actual: self.bytes_per_root,
            });
        }

        Ok(())
    }
}
