//! Ethereum consensus compatibility layer
//!
//! Just enough of the Fulu beacon block to produce and check the
//! commitments inclusion proof carried by every data column sidecar:
//! - [`BeaconBlockHeader`] / [`SignedBeaconBlockHeader`], copied into sidecars
//! - [`SignedBeaconBlock`] with a body that keeps the blob commitments and
//!   the roots of everything else
//! - sparse merkle helpers in [`merkle`]
//!
//! References:
//! - Ethereum Consensus Specs: `consensus-specs/specs/fulu/`
//! - Lighthouse: `lighthouse/consensus/types/src/`

pub mod beacon_block;
pub mod beacon_header;
pub mod merkle;

pub use beacon_block::{BeaconBlock, BeaconBlockBody, OpaqueBodyRoots, SignedBeaconBlock};
pub use beacon_header::{BeaconBlockHeader, BlsSignature, SignedBeaconBlockHeader};
pub use merkle::{
    MerkleError, generate_kzg_commitment_inclusion_proof, kzg_commitments_list_root,
    verify_kzg_commitment_inclusion_proof, verify_merkle_proof,
};
