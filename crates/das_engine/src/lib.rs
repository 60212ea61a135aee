//! PeerDAS data availability engine
//!
//! This crate lets a node custody and check a fraction of each block's blob
//! data while keeping the whole recoverable:
//! - **Custody**: deterministic node id to custody group and column mapping
//! - **Codec**: blobs to per-column sidecars and back
//! - **Verification**: structure, commitment inclusion and batched KZG cell proofs
//! - **Reconstruction**: parallel erasure recovery from any half of the columns
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       DasEngine                         │
//! │   (orchestration, custody policy, metrics, logging)     │
//! └───────┬───────────────┬───────────────┬─────────────────┘
//!         │               │               │
//!   ┌─────▼─────┐   ┌─────▼──────┐  ┌─────▼──────────┐
//!   │   codec   │   │  verifier  │  │ reconstruction │
//!   │ (encode / │   │ (inclusion │  │ (rayon, one    │
//!   │  decode)  │   │  + KZG)    │  │  task / blob)  │
//!   └─────┬─────┘   └─────┬──────┘  └─────┬──────────┘
//!         └───────────────┼───────────────┘
//!                   ┌─────▼─────┐      ┌──────────────┐
//!                   │  CellKzg  │      │   custody    │
//!                   │  (c-kzg)  │      │ + peer_info  │
//!                   └───────────┘      └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use peerdas_engine::{DasEngine, DasMetrics, custody_info::CustodyType, kzg::CKzg};
//! use peerdas_types::{DasSpec, NodeId};
//!
//! # fn example() -> Result<(), peerdas_engine::DasError> {
//! let engine = DasEngine::new(CKzg::mainnet(), DasSpec::mainnet(), false, DasMetrics::new())?;
//!
//! // Which columns this node has to sample
//! let node_id: NodeId = NodeId::new([1u8; 32]);
//! let columns = engine.sampling_columns(node_id, CustodyType::Actual)?;
//! assert_eq!(columns.len(), 8);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod codec;
pub mod custody;
pub mod custody_info;
/// High-level orchestration.
pub mod engine;
/// Error types for the engine.
pub mod error;
/// Adapter over the KZG library.
pub mod kzg;
/// Prometheus metrics.
pub mod metrics;
pub mod peer_info;
pub mod reconstruction;
pub mod record;
pub mod verifier;

// Re-export main types
pub use engine::DasEngine;
pub use error::{
    CryptographicError, CustodyError, DasError, KzgError, ReconstructionError, RecordError,
    ValidationError,
};
pub use metrics::DasMetrics;
pub use verifier::VerifiedDataColumnSidecar;
