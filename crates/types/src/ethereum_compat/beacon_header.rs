//! Beacon block header types
//!
//! Every data column sidecar carries the signed header of its block; the
//! header's `body_root` is the anchor the commitments inclusion proof is
//! checked against.
//!
//! ## References
//! - Ethereum spec: `consensus-specs/specs/phase0/beacon-chain.md#beaconblockheader`
//! - Lighthouse: `lighthouse/consensus/types/src/beacon_block_header.rs`

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

use crate::{blob::impl_fixed_bytes_serde, constants::BYTES_PER_SIGNATURE};

/// A compressed BLS12-381 signature. Signature checks belong to the block
/// import path, so this is carried as opaque bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlsSignature(pub [u8; BYTES_PER_SIGNATURE]);

impl BlsSignature {
    pub const EMPTY: Self = Self([0u8; BYTES_PER_SIGNATURE]);

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; BYTES_PER_SIGNATURE] {
        &self.0
    }
}

impl Default for BlsSignature {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl_fixed_bytes_serde!(BlsSignature, BYTES_PER_SIGNATURE);

/// Beacon block header (Ethereum consensus spec)
///
/// The `body_root` is a Merkle root that commits to all fields in the beacon
/// block body, including the list of blob KZG commitments. This enables:
/// 1. Proving the commitments list is part of the body (via Merkle inclusion proof)
/// 2. Checking a sidecar without downloading the full block body
/// 3. Linking column data → commitments → body_root → signed header
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, TreeHash)]
pub struct BeaconBlockHeader {
    pub slot: u64,

    pub proposer_index: u64,

    /// Parent block root (hash of previous BeaconBlockHeader)
    pub parent_root: B256,

    pub state_root: B256,

    /// Body root (SSZ Merkle root of BeaconBlockBody)
    pub body_root: B256,
}

impl BeaconBlockHeader {
    pub fn new(
        slot: u64,
        proposer_index: u64,
        parent_root: B256,
        state_root: B256,
        body_root: B256,
    ) -> Self {
        Self { slot, proposer_index, parent_root, state_root, body_root }
    }

    /// Calculate the SSZ hash tree root of this header
    ///
    /// This is the value that gets signed by the proposer.
    pub fn hash_tree_root(&self) -> B256 {
        use tree_hash::TreeHash;

        let root = TreeHash::tree_hash_root(self);
        B256::from_slice(root.as_ref())
    }
}

/// Signed beacon block header (Ethereum consensus spec)
///
/// ```text
/// Cell data
///   ↓ (KZG cell proof verifies)
/// KZG commitment
///   ↓ (Merkle inclusion proof verifies)
/// body_root (in BeaconBlockHeader)
///   ↓ (Signature verifies)
/// Proposer's public key
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,

    /// Proposer's signature over hash_tree_root(message)
    pub signature: BlsSignature,
}

impl SignedBeaconBlockHeader {
    pub fn new(message: BeaconBlockHeader, signature: BlsSignature) -> Self {
        Self { message, signature }
    }

    /// Get the message hash that should be signed
    pub fn signing_root(&self) -> B256 {
        self.message.hash_tree_root()
    }
}
