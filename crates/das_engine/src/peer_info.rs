//! Bounded cache of derived per-peer custody metadata
//!
//! Computing a peer's custody groups walks a hash chain, so results are cached
//! by `(node_id, custody_group_count)`. Entries are never invalidated: the
//! mapping is a pure function of the key. Eviction is LRU only.

use std::{collections::BTreeSet, num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use parking_lot::Mutex;
use peerdas_types::{ColumnIndex, CustodyIndex, DasSpec, NodeId};

use crate::{
    custody::{SubnetId, custody_columns, custody_groups, data_column_subnets},
    error::CustodyError,
};

/// 32-byte node id followed by the big-endian requested count.
type PeerInfoKey = [u8; 40];

/// Custody metadata derived for one peer at one custody group count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub custody_groups: BTreeSet<CustodyIndex>,
    pub custody_columns: BTreeSet<ColumnIndex>,
    pub data_column_subnets: BTreeSet<SubnetId>,
}

impl PeerInfo {
    /// Derive a peer's groups, columns and subnets.
    pub fn compute(node_id: NodeId, count: u64, spec: &DasSpec) -> Result<Self, CustodyError> {
        let custody_groups: BTreeSet<CustodyIndex> =
            custody_groups(node_id, count, spec)?.into_iter().collect();
        let custody_columns = custody_columns(&custody_groups, spec)?;
        let data_column_subnets = data_column_subnets(&custody_columns, spec)?;

        Ok(Self { custody_groups, custody_columns, data_column_subnets })
    }
}

#[derive(Debug)]
pub struct PeerInfoCache {
    cache: Mutex<LruCache<PeerInfoKey, Arc<PeerInfo>>>,
}

impl PeerInfoCache {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn from_spec(spec: &DasSpec) -> Self {
        Self::new(spec.peer_info_cache_size)
    }

    fn key(node_id: NodeId, count: u64) -> PeerInfoKey {
        let mut key = [0u8; 40];
        key[..32].copy_from_slice(node_id.as_bytes());
        key[32..].copy_from_slice(&count.to_be_bytes());
        key
    }

    /// Cached info for the peer, computing and inserting it on a miss.
    ///
    /// The boolean is `true` when the entry was already cached. The lock is
    /// not held while computing, so concurrent misses for one key may both
    /// compute; they produce identical values.
    pub fn get_or_compute(
        &self,
        node_id: NodeId,
        count: u64,
        spec: &DasSpec,
    ) -> Result<(Arc<PeerInfo>, bool), CustodyError> {
        let key = Self::key(node_id, count);

        if let Some(info) = self.cache.lock().get(&key) {
            return Ok((info.clone(), true));
        }

        let info = Arc::new(PeerInfo::compute(node_id, count, spec)?);
        self.cache.lock().put(key, info.clone());

        Ok((info, false))
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}
