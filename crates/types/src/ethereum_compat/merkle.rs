//! Merkle proof utilities for blob KZG commitment inclusion proofs
//!
//! Two proofs hang off the block body:
//!
//! ```text
//! KZG Commitment (leaf)
//!   ↓ [depth(max commitments) branches + 1 length mix-in]
//! blob_kzg_commitments list root
//!   ↓ [BEACON_BLOCK_BODY_TREE_DEPTH branches]
//! BeaconBlockBody root (body_root in header)
//! ```
//!
//! A data column sidecar carries only the lower proof: it ships the whole
//! commitments list, so the receiver rebuilds the list root itself and only
//! needs the branch from there to `body_root`. A blob sidecar carries both,
//! concatenated.
//!
//! The commitments tree is sparse (a handful of leaves in a 4096-wide tree),
//! so roots are computed layer by layer over the populated prefix, padding with
//! precomputed zero-subtree hashes.
//!
//! ## References
//! - Fulu p2p spec: `consensus-specs/specs/fulu/p2p-interface.md#verify_data_column_sidecar_inclusion_proof`
//! - Lighthouse: `lighthouse/consensus/types/src/data_column_sidecar.rs`

use alloy_primitives::B256;
use ethereum_hashing::hash32_concat;
use thiserror::Error;
use tree_hash::{Hash256, TreeHash, mix_in_length};

use crate::{blob::KzgCommitment, constants::BLOB_KZG_COMMITMENTS_INDEX};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Commitments list is empty")]
    EmptyCommitments,

    #[error("Index {index} out of bounds for {len} commitments")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Too many commitments: got {got}, tree of depth {depth} holds {capacity}")]
    TooManyCommitments { got: usize, depth: usize, capacity: usize },

    #[error("Body branch must have {expected} nodes, got {actual}")]
    BodyBranchLength { expected: usize, actual: usize },
}

fn hash_pair(left: &B256, right: &B256) -> B256 {
    B256::from(hash32_concat(left.as_slice(), right.as_slice()))
}

fn to_b256(hash: Hash256) -> B256 {
    B256::from_slice(hash.as_ref())
}

/// `zero_hashes(d)[i]` is the root of an all-zero subtree of height `i`, for `i <= d`.
pub fn zero_hashes(depth: usize) -> Vec<B256> {
    let mut hashes = Vec::with_capacity(depth + 1);
    hashes.push(B256::ZERO);
    for level in 0..depth {
        let below = hashes[level];
        hashes.push(hash_pair(&below, &below));
    }
    hashes
}

/// Root of a depth-`depth` tree whose first leaves are `leaves` and the rest zero,
/// together with the sibling path of `index`.
///
/// `index` may point past the populated leaves; its branch is then made of
/// zero hashes and populated subtree roots.
pub fn merkle_root_and_branch(leaves: &[B256], depth: usize, index: usize) -> (B256, Vec<B256>) {
    let zeros = zero_hashes(depth);
    let mut layer = leaves.to_vec();
    let mut branch = Vec::with_capacity(depth);
    let mut position = index;

    for zero in zeros.iter().take(depth) {
        branch.push(layer.get(position ^ 1).copied().unwrap_or(*zero));

        layer = layer
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(zero)))
            .collect();
        position >>= 1;
    }

    (layer.first().copied().unwrap_or(zeros[depth]), branch)
}

/// Root of a sparse tree, see [`merkle_root_and_branch`].
pub fn merkle_root(leaves: &[B256], depth: usize) -> B256 {
    merkle_root_and_branch(leaves, depth, 0).0
}

/// Folds `branch` onto `leaf`, taking the left/right side from the bits of `index`.
pub fn merkle_root_from_branch(leaf: B256, branch: &[B256], mut index: usize) -> B256 {
    let mut value = leaf;
    for sibling in branch {
        value =
            if index & 1 == 1 { hash_pair(sibling, &value) } else { hash_pair(&value, sibling) };
        index >>= 1;
    }
    value
}

/// `is_valid_merkle_branch` from the consensus specs.
pub fn verify_merkle_proof(
    leaf: B256,
    branch: &[B256],
    depth: usize,
    index: usize,
    root: B256,
) -> bool {
    branch.len() == depth && merkle_root_from_branch(leaf, branch, index) == root
}

/// SSZ `hash_tree_root` of `List[KZGCommitment, 2^tree_depth]`.
pub fn kzg_commitments_list_root(
    commitments: &[KzgCommitment],
    tree_depth: usize,
) -> Result<B256, MerkleError> {
    let leaves = commitment_leaves(commitments, tree_depth)?;
    let root = merkle_root(&leaves, tree_depth);
    Ok(to_b256(mix_in_length(&Hash256::from_slice(root.as_slice()), commitments.len())))
}

fn commitment_leaves(
    commitments: &[KzgCommitment],
    tree_depth: usize,
) -> Result<Vec<B256>, MerkleError> {
    let capacity = 1usize << tree_depth;
    if commitments.len() > capacity {
        return Err(MerkleError::TooManyCommitments {
            got: commitments.len(),
            depth: tree_depth,
            capacity,
        });
    }

    Ok(commitments.iter().map(|c| to_b256(TreeHash::tree_hash_root(c))).collect())
}

fn length_chunk(len: usize) -> B256 {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&(len as u64).to_le_bytes());
    B256::from(chunk)
}

/// Generate a Merkle inclusion proof for a single KZG commitment
///
/// The result proves `commitments[index]` is in the body whose commitments
/// field is opened by `body_branch`, and has
/// `tree_depth + 1 + body_branch.len()` nodes.
///
/// ## Errors
///
/// Returns `Err` if:
/// - Commitments list is empty
/// - Index is out of bounds
/// - The list does not fit a tree of `tree_depth`
/// - `body_branch` is not `body_tree_depth` long
pub fn generate_kzg_commitment_inclusion_proof(
    commitments: &[KzgCommitment],
    index: usize,
    tree_depth: usize,
    body_branch: &[B256],
    body_tree_depth: usize,
) -> Result<Vec<B256>, MerkleError> {
    if commitments.is_empty() {
        return Err(MerkleError::EmptyCommitments);
    }

    if index >= commitments.len() {
        return Err(MerkleError::IndexOutOfBounds { index, len: commitments.len() });
    }

    if body_branch.len() != body_tree_depth {
        return Err(MerkleError::BodyBranchLength {
            expected: body_tree_depth,
            actual: body_branch.len(),
        });
    }

    let leaves = commitment_leaves(commitments, tree_depth)?;
    let (_, list_branch) = merkle_root_and_branch(&leaves, tree_depth, index);

    let mut proof = Vec::with_capacity(tree_depth + 1 + body_tree_depth);
    proof.extend(list_branch);
    // SSZ lists mix in their length as an additional branch
    proof.push(length_chunk(commitments.len()));
    proof.extend_from_slice(body_branch);

    Ok(proof)
}

/// Verify a single-commitment inclusion proof produced by
/// [`generate_kzg_commitment_inclusion_proof`].
pub fn verify_kzg_commitment_inclusion_proof(
    commitment: &KzgCommitment,
    proof: &[B256],
    index: usize,
    tree_depth: usize,
    body_tree_depth: usize,
    body_root: B256,
) -> bool {
    let list_branch_length = tree_depth + 1;

    if proof.len() != list_branch_length + body_tree_depth || index >= 1usize << tree_depth {
        return false;
    }

    let (list_branch, body_branch) = proof.split_at(list_branch_length);

    let leaf = to_b256(TreeHash::tree_hash_root(commitment));
    let list_root = merkle_root_from_branch(leaf, list_branch, index);

    verify_merkle_proof(
        list_root,
        body_branch,
        body_tree_depth,
        BLOB_KZG_COMMITMENTS_INDEX,
        body_root,
    )
}
