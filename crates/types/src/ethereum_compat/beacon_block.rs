//! Minimal Fulu beacon block
//!
//! Data availability code only reads one field of the block body, the blob
//! KZG commitments. Every other body field is carried as its precomputed SSZ
//! root, which is enough to reproduce `body_root` and the commitments
//! inclusion proof bit-for-bit.
//!
//! ## Body layout (13 fields, padded to 16 leaves)
//!
//! | index | field                      |
//! |-------|----------------------------|
//! | 0     | randao_reveal              |
//! | 1     | eth1_data                  |
//! | 2     | graffiti                   |
//! | 3-7   | slashings, attestations, deposits, exits |
//! | 8     | sync_aggregate             |
//! | 9     | execution_payload          |
//! | 10    | bls_to_execution_changes   |
//! | 11    | blob_kzg_commitments       |
//! | 12    | execution_requests         |
//!
//! ## References
//! - Ethereum spec: `consensus-specs/specs/electra/beacon-chain.md#beaconblockbody`
//! - Lighthouse: `lighthouse/consensus/types/src/beacon_block_body.rs`

use alloy_primitives::B256;
use ethereum_hashing::hash32_concat;
use serde::{Deserialize, Serialize};

use super::{
    beacon_header::{BeaconBlockHeader, BlsSignature, SignedBeaconBlockHeader},
    merkle::{MerkleError, kzg_commitments_list_root, merkle_root, merkle_root_and_branch},
};
use crate::{
    blob::KzgCommitment,
    constants::{BEACON_BLOCK_BODY_TREE_DEPTH, BLOB_KZG_COMMITMENTS_INDEX},
};

/// SSZ roots of the body fields this crate never interprets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueBodyRoots {
    pub eth1_data: B256,
    pub graffiti: B256,
    pub proposer_slashings: B256,
    pub attester_slashings: B256,
    pub attestations: B256,
    pub deposits: B256,
    pub voluntary_exits: B256,
    pub sync_aggregate: B256,
    pub execution_payload: B256,
    pub bls_to_execution_changes: B256,
    pub execution_requests: B256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockBody {
    pub randao_reveal: BlsSignature,
    pub roots: OpaqueBodyRoots,
    pub blob_kzg_commitments: Vec<KzgCommitment>,
}

impl BeaconBlockBody {
    pub fn new(blob_kzg_commitments: Vec<KzgCommitment>) -> Self {
        Self { blob_kzg_commitments, ..Default::default() }
    }

    fn leaves(&self, commitments_tree_depth: usize) -> Result<Vec<B256>, MerkleError> {
        let r = &self.roots;
        Ok(vec![
            signature_root(&self.randao_reveal),
            r.eth1_data,
            r.graffiti,
            r.proposer_slashings,
            r.attester_slashings,
            r.attestations,
            r.deposits,
            r.voluntary_exits,
            r.sync_aggregate,
            r.execution_payload,
            r.bls_to_execution_changes,
            kzg_commitments_list_root(&self.blob_kzg_commitments, commitments_tree_depth)?,
            r.execution_requests,
        ])
    }

    /// SSZ `hash_tree_root` of the body.
    pub fn body_root(&self, commitments_tree_depth: usize) -> Result<B256, MerkleError> {
        Ok(merkle_root(&self.leaves(commitments_tree_depth)?, BEACON_BLOCK_BODY_TREE_DEPTH))
    }

    /// Branch from the `blob_kzg_commitments` list root up to the body root.
    pub fn kzg_commitments_merkle_proof(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<Vec<B256>, MerkleError> {
        let leaves = self.leaves(commitments_tree_depth)?;
        let (_, branch) = merkle_root_and_branch(
            &leaves,
            BEACON_BLOCK_BODY_TREE_DEPTH,
            BLOB_KZG_COMMITMENTS_INDEX,
        );
        Ok(branch)
    }
}

/// `Vector[byte, 96]` merkleizes as three chunks padded to four.
fn signature_root(signature: &BlsSignature) -> B256 {
    let bytes = signature.as_bytes();
    let left = hash32_concat(&bytes[0..32], &bytes[32..64]);
    let right = hash32_concat(&bytes[64..96], &[0u8; 32]);
    B256::from(hash32_concat(&left, &right))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlock {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: B256,
    pub state_root: B256,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    /// Header committing to this block's body.
    pub fn block_header(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<BeaconBlockHeader, MerkleError> {
        Ok(BeaconBlockHeader::new(
            self.slot,
            self.proposer_index,
            self.parent_root,
            self.state_root,
            self.body.body_root(commitments_tree_depth)?,
        ))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: BlsSignature,
}

impl SignedBeaconBlock {
    pub fn new(message: BeaconBlock, signature: BlsSignature) -> Self {
        Self { message, signature }
    }

    /// The block's signed header. The block signature covers the header root,
    /// so it carries over unchanged.
    pub fn signed_block_header(
        &self,
        commitments_tree_depth: usize,
    ) -> Result<SignedBeaconBlockHeader, MerkleError> {
        Ok(SignedBeaconBlockHeader::new(
            self.message.block_header(commitments_tree_depth)?,
            self.signature,
        ))
    }

    #[inline]
    pub fn blob_kzg_commitments(&self) -> &[KzgCommitment] {
        &self.message.body.blob_kzg_commitments
    }
}
