//! High-level data availability orchestration
use std::{sync::Arc, time::Instant};

use peerdas_types::{
    Blob, BlobIndex, BlobSidecar, ColumnIndex, DasSpec, DataColumnSidecar, NodeId,
};
use tracing::{debug, info, warn};

use crate::{
    codec::{self, BlockContents},
    custody::can_self_reconstruct,
    custody_info::{CustodyInfo, CustodyType, ValidatorBalances, validators_custody_requirement},
    error::{CryptographicError, DasError},
    kzg::{CKzg, CellKzg},
    metrics::DasMetrics,
    peer_info::{PeerInfo, PeerInfoCache},
    reconstruction,
    record::{NodeRecord, custody_group_count_from_record},
    verifier::{self, VerifiedDataColumnSidecar},
};

/// Column lifecycle for one node: encoding, verification, reconstruction
/// and custody bookkeeping.
///
/// DasEngine ties the stateless building blocks to the node's state:
/// - The KZG backend, behind [`CellKzg`]
/// - The validated network parameters
/// - The local [`CustodyInfo`]
/// - The peer custody cache
/// - Metrics
///
/// ## Usage
///
/// ```no_run
/// use peerdas_engine::{DasEngine, DasMetrics, kzg::CKzg};
/// use peerdas_types::DasSpec;
///
/// # fn example(block: peerdas_types::SignedBeaconBlock, blobs: Vec<peerdas_types::Blob>)
/// #     -> Result<(), peerdas_engine::DasError> {
/// let engine = DasEngine::new(CKzg::mainnet(), DasSpec::mainnet(), false, DasMetrics::new())?;
///
/// // Proposer side
/// let sidecars = engine.build_sidecars(Some(&block), &blobs)?;
///
/// // Receiver side
/// let verified = engine.verify_sidecars(sidecars)?;
/// let blobs = engine.reconstruct_blobs(&verified, &[])?;
/// # Ok(())
/// # }
/// ```
pub struct DasEngine<K = CKzg> {
    kzg: K,
    spec: DasSpec,
    custody_info: CustodyInfo,
    peer_info: PeerInfoCache,
    metrics: DasMetrics,
}

impl<K: CellKzg> DasEngine<K> {
    /// Create an engine, rejecting inconsistent network parameters.
    pub fn new(
        kzg: K,
        spec: DasSpec,
        subscribe_all_subnets: bool,
        metrics: DasMetrics,
    ) -> Result<Self, DasError> {
        spec.validate()?;

        info!(
            columns = spec.number_of_columns,
            custody_groups = spec.number_of_custody_groups,
            subscribe_all_subnets,
            "Initialized data availability engine"
        );

        Ok(Self {
            kzg,
            peer_info: PeerInfoCache::from_spec(&spec),
            spec,
            custody_info: CustodyInfo::new(subscribe_all_subnets),
            metrics,
        })
    }

    pub fn spec(&self) -> &DasSpec {
        &self.spec
    }

    pub fn kzg(&self) -> &K {
        &self.kzg
    }

    pub fn custody_info(&self) -> &CustodyInfo {
        &self.custody_info
    }

    pub fn metrics(&self) -> &DasMetrics {
        &self.metrics
    }

    /// Compute every blob's cells and proofs and transpose them into one
    /// sidecar per column.
    ///
    /// Returns no sidecars when there is no block or no blob.
    pub fn build_sidecars<B: BlockContents>(
        &self,
        block: Option<&B>,
        blobs: &[Blob],
    ) -> Result<Vec<DataColumnSidecar>, DasError> {
        if block.is_none() || blobs.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let cells_and_proofs = codec::compute_cells_and_proofs(&self.kzg, blobs)?;
        let sidecars = codec::data_column_sidecars(block, &cells_and_proofs, &self.spec)?;

        self.metrics.record_sidecars_built(sidecars.len(), blobs.len());
        debug!(
            blob_count = blobs.len(),
            sidecars = sidecars.len(),
            elapsed = ?start.elapsed(),
            "Built data column sidecars"
        );

        Ok(sidecars)
    }

    /// Verify a batch of sidecars received from the network.
    ///
    /// The whole batch is rejected if any sidecar fails.
    pub fn verify_sidecars(
        &self,
        sidecars: Vec<DataColumnSidecar>,
    ) -> Result<Vec<VerifiedDataColumnSidecar>, DasError> {
        let count = sidecars.len();
        let start = Instant::now();

        let result = verifier::verify_data_column_sidecars(&self.kzg, sidecars, &self.spec);
        self.metrics.observe_verification_time(start.elapsed());

        match &result {
            Ok(_) => {
                self.metrics.record_verifications_success(count);
                debug!(count, elapsed = ?start.elapsed(), "Verified data column sidecars");
            }
            Err(e) => {
                if matches!(
                    e,
                    DasError::Cryptographic(CryptographicError::InvalidInclusionProof { .. })
                ) {
                    self.metrics.record_inclusion_proof_failure();
                }
                self.metrics.record_verifications_failure(count);
                warn!(count, error = %e, "Data column sidecar verification failed");
            }
        }

        result
    }

    /// Rebuild blobs from verified sidecars covering the first half of the
    /// columns. An empty `indices` selects every blob.
    pub fn reconstruct_blobs(
        &self,
        sidecars: &[VerifiedDataColumnSidecar],
        indices: &[BlobIndex],
    ) -> Result<Vec<BlobSidecar>, DasError> {
        codec::reconstruct_blobs(&self.kzg, sidecars, indices, &self.spec)
    }

    /// Recover every column of the block from at least half of them.
    pub fn reconstruct_columns(
        &self,
        sidecars: &[VerifiedDataColumnSidecar],
    ) -> Result<Vec<DataColumnSidecar>, DasError> {
        let start = Instant::now();
        let result =
            reconstruction::reconstruct_data_column_sidecars(&self.kzg, sidecars, &self.spec);
        self.metrics.record_reconstruction(start.elapsed(), result.is_ok());

        match &result {
            Ok(columns) => {
                info!(
                    supplied = sidecars.len(),
                    columns = columns.len(),
                    elapsed = ?start.elapsed(),
                    "Reconstructed data columns"
                );
            }
            Err(e) => warn!(supplied = sidecars.len(), error = %e, "Column reconstruction failed"),
        }

        result
    }

    /// Whether the node custodies enough groups to reconstruct on its own.
    pub fn can_self_reconstruct(&self) -> bool {
        can_self_reconstruct(self.custody_info.actual_group_count(&self.spec), &self.spec)
    }

    /// Recompute the local custody target from the tracked validators.
    ///
    /// An empty validator set clears the requirement, falling back to the
    /// default custody requirement.
    pub fn update_validators_custody<S: ValidatorBalances>(
        &self,
        state: &S,
        indices: &[u64],
    ) -> Result<u64, DasError> {
        let requirement = if indices.is_empty() {
            None
        } else {
            Some(validators_custody_requirement(state, indices.iter().copied(), &self.spec)?)
        };

        self.custody_info.set_validators_custody_requirement(requirement);
        Ok(self.custody_info.target_group_count(&self.spec))
    }

    /// Custody metadata of any node at a given group count, through the cache.
    pub fn peer_info(&self, node_id: NodeId, count: u64) -> Result<Arc<PeerInfo>, DasError> {
        let (info, cached) = self.peer_info.get_or_compute(node_id, count, &self.spec)?;
        self.metrics.record_peer_info_lookup(cached);
        Ok(info)
    }

    /// Custody metadata of a peer at the count advertised in its record.
    pub fn peer_info_from_record<R: NodeRecord + ?Sized>(
        &self,
        node_id: NodeId,
        record: &R,
    ) -> Result<Arc<PeerInfo>, DasError> {
        let count = custody_group_count_from_record(record, &self.spec)?;
        self.peer_info(node_id, count)
    }

    /// Columns the local node samples every slot.
    pub fn sampling_columns(
        &self,
        node_id: NodeId,
        custody_type: CustodyType,
    ) -> Result<Vec<ColumnIndex>, DasError> {
        let count = self.custody_info.custody_group_sampling_size(custody_type, &self.spec);
        Ok(self.peer_info(node_id, count)?.custody_columns.iter().copied().collect())
    }
}
