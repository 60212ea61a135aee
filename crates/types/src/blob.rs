//! Blob, cell and KZG byte types
//!
//! A blob is the payload a block commits to. For data availability sampling
//! each blob is extended 2x with a Reed-Solomon code and cut into cells, one per
//! column:
//!
//! ```text
//! Blob (4096 field elements, 131,072 bytes)
//!   │ compute_cells_and_proofs()
//!   ▼
//! Extended blob (8192 field elements)
//!   ├─> Cell₀   Cell₁   ...  Cell₁₂₇    (2,048 bytes each, one per column)
//!   └─> Proof₀  Proof₁  ...  Proof₁₂₇   (48 bytes each, opens the matching cell)
//! ```
//!
//! Cells `0..64` hold the original blob bytes verbatim (the code is systematic),
//! which is what makes decoding from the first half of the columns a pure copy.
//!
//! ## References
//!
//! - Consensus specs: <https://github.com/ethereum/consensus-specs/blob/dev/specs/fulu/polynomial-commitments-sampling.md>

use serde::{Deserialize, Serialize};
use tree_hash::{PackedEncoding, TreeHash, TreeHashType};

use crate::{
    aliases::Bytes,
    constants::{BYTES_PER_BLOB, BYTES_PER_CELL, BYTES_PER_COMMITMENT, BYTES_PER_PROOF},
};

/// A single blob containing arbitrary data.
///
/// ## Example
///
/// ```rust
/// use peerdas_types::{aliases::Bytes, blob::Blob};
///
/// let blob = Blob::new(Bytes::from(vec![0u8; 131_072])).unwrap();
/// assert_eq!(blob.size(), 131_072);
///
/// assert!(Blob::new(Bytes::from(vec![0u8; 1000])).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// The raw blob data.
    ///
    /// **Invariant**: This MUST be exactly `BYTES_PER_BLOB` (131,072) bytes.
    /// The constructor enforces this constraint.
    data: Bytes,
}

impl Blob {
    /// Creates a new blob from the given data.
    ///
    /// ## Errors
    ///
    /// Returns an error string if `data.len() != BYTES_PER_BLOB`.
    pub fn new(data: Bytes) -> Result<Self, String> {
        if data.len() != BYTES_PER_BLOB {
            return Err(format!(
                "Invalid blob size: expected {} bytes, got {} bytes",
                BYTES_PER_BLOB,
                data.len()
            ));
        }

        Ok(Self { data })
    }

    /// Returns a reference to the blob data.
    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the size of the blob in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        BYTES_PER_BLOB
    }

    /// Consumes the blob and returns the underlying data.
    #[inline]
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// One evaluation slice of an extended blob, addressed by column index.
///
/// Like [`Blob`], the length invariant is enforced on construction so a
/// `Cell` can always be handed to the KZG library without a size check.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    data: Bytes,
}

impl Cell {
    /// Creates a cell, rejecting anything that is not `BYTES_PER_CELL` long.
    pub fn new(data: Bytes) -> Result<Self, String> {
        if data.len() != BYTES_PER_CELL {
            return Err(format!(
                "Invalid cell size: expected {} bytes, got {} bytes",
                BYTES_PER_CELL,
                data.len()
            ));
        }

        Ok(Self { data })
    }

    /// Creates a cell by copying `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        Self::new(Bytes::copy_from_slice(bytes))
    }

    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_ref()
    }
}

/// A KZG commitment to a blob.
///
/// The commitment is a point on the BLS12-381 elliptic curve (G1 group),
/// serialized as a compressed point. Validation that the bytes are a valid
/// curve point happens inside the KZG library, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KzgCommitment(pub [u8; BYTES_PER_COMMITMENT]);

impl KzgCommitment {
    #[inline]
    pub const fn new(bytes: [u8; BYTES_PER_COMMITMENT]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; BYTES_PER_COMMITMENT] {
        &self.0
    }

    /// Creates a commitment from a byte slice.
    ///
    /// ## Errors
    ///
    /// Returns an error if the slice is not exactly 48 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        <[u8; BYTES_PER_COMMITMENT]>::try_from(bytes).map(Self).map_err(|_| {
            format!(
                "Invalid commitment size: expected {} bytes, got {}",
                BYTES_PER_COMMITMENT,
                bytes.len()
            )
        })
    }
}

impl TreeHash for KzgCommitment {
    fn tree_hash_type() -> TreeHashType {
        <[u8; BYTES_PER_COMMITMENT] as TreeHash>::tree_hash_type()
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        <[u8; BYTES_PER_COMMITMENT] as TreeHash>::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> tree_hash::Hash256 {
        TreeHash::tree_hash_root(&self.0)
    }
}

/// A KZG proof opening either a whole blob or a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KzgProof(pub [u8; BYTES_PER_PROOF]);

impl KzgProof {
    #[inline]
    pub const fn new(bytes: [u8; BYTES_PER_PROOF]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; BYTES_PER_PROOF] {
        &self.0
    }

    /// Creates a proof from a byte slice.
    ///
    /// ## Errors
    ///
    /// Returns an error if the slice is not exactly 48 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        <[u8; BYTES_PER_PROOF]>::try_from(bytes).map(Self).map_err(|_| {
            format!(
                "Invalid proof size: expected {} bytes, got {}",
                BYTES_PER_PROOF,
                bytes.len()
            )
        })
    }
}

// Default serde doesn't support arrays > 32 bytes, so the fixed-size byte
// newtypes serialize as raw bytes and accept either bytes or a sequence back.
macro_rules! impl_fixed_bytes_serde {
    ($name:ident, $len:expr) => {
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_bytes(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct FixedBytesVisitor;

                impl<'de> serde::de::Visitor<'de> for FixedBytesVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        formatter: &mut core::fmt::Formatter<'_>,
                    ) -> core::fmt::Result {
                        write!(formatter, "a {}-byte array", $len)
                    }

                    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        <[u8; $len]>::try_from(v)
                            .map($name)
                            .map_err(|_| serde::de::Error::invalid_length(v.len(), &self))
                    }

                    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                    where
                        A: serde::de::SeqAccess<'de>,
                    {
                        let mut bytes = [0u8; $len];
                        for (i, byte) in bytes.iter_mut().enumerate() {
                            *byte = seq
                                .next_element()?
                                .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                        }
                        Ok($name(bytes))
                    }
                }

                deserializer.deserialize_bytes(FixedBytesVisitor)
            }
        }
    };
}

pub(crate) use impl_fixed_bytes_serde;

impl_fixed_bytes_serde!(KzgCommitment, BYTES_PER_COMMITMENT);
impl_fixed_bytes_serde!(KzgProof, BYTES_PER_PROOF);

/// Every cell of one extended blob together with the proof opening each cell.
///
/// **Invariant**: `cells.len() == proofs.len()`, enforced by [`CellsAndProofs::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellsAndProofs {
    cells: Vec<Cell>,
    proofs: Vec<KzgProof>,
}

impl CellsAndProofs {
    pub fn new(cells: Vec<Cell>, proofs: Vec<KzgProof>) -> Result<Self, String> {
        if cells.len() != proofs.len() {
            return Err(format!(
                "Cells and proofs length mismatch: {} cells, {} proofs",
                cells.len(),
                proofs.len()
            ));
        }

        Ok(Self { cells, proofs })
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn proofs(&self) -> &[KzgProof] {
        &self.proofs
    }

    /// Number of cells (and proofs), i.e. the number of columns covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Cell>, Vec<KzgProof>) {
        (self.cells, self.proofs)
    }
}
