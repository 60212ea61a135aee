#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared data model for the PeerDAS subsystem.
//!
//! Everything that crosses a crate boundary lives here: the fixed-size
//! cryptographic byte types, the `DataColumnSidecar` wire entity, the
//! network constants in [`spec::DasSpec`] and the minimal beacon block
//! compat layer needed to produce and check commitment inclusion proofs.

pub mod aliases;
pub mod blob;
pub mod constants;
pub mod data_column;
pub mod ethereum_compat;
pub mod node_id;
pub mod spec;

pub use blob::{Blob, Cell, CellsAndProofs, KzgCommitment, KzgProof};
pub use data_column::{BlobIndex, BlobSidecar, ColumnIndex, CustodyIndex, DataColumnSidecar};
pub use ethereum_compat::{
    BeaconBlock, BeaconBlockBody, BeaconBlockHeader, BlsSignature, SignedBeaconBlock,
    SignedBeaconBlockHeader,
};
pub use node_id::NodeId;
pub use spec::DasSpec;
