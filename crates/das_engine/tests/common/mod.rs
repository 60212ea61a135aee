//! Shared fixtures for the engine integration tests.
//!
//! Blobs are random but canonical, commitments are real, and every test uses
//! 128 columns over 64 custody groups.
#![allow(dead_code)]

pub mod mocks;

use color_eyre::{Result, eyre::eyre};
use peerdas_engine::{
    VerifiedDataColumnSidecar, codec,
    kzg::{CKzg, CellKzg},
    verifier::verify_data_column_sidecars,
};
use peerdas_types::{
    BeaconBlock, BeaconBlockBody, Blob, BlsSignature, CellsAndProofs, DasSpec, DataColumnSidecar,
    SignedBeaconBlock, aliases::Bytes, constants::BYTES_PER_BLOB,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub fn spec() -> DasSpec {
    DasSpec { number_of_custody_groups: 64, ..DasSpec::mainnet() }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random blob whose field elements all sit below the BLS modulus.
pub fn random_blob(rng: &mut StdRng) -> Blob {
    let mut data = vec![0u8; BYTES_PER_BLOB];
    rng.fill(&mut data[..]);
    for element in data.chunks_mut(32) {
        element[0] = 0;
    }
    Blob::new(Bytes::from(data)).expect("blob has the right size")
}

pub fn random_blobs(seed: u64, count: usize) -> Vec<Blob> {
    let mut rng = rng(seed);
    (0..count).map(|_| random_blob(&mut rng)).collect()
}

/// Block committing to `blobs`, with a signed header.
pub fn block_for_blobs(kzg: &CKzg, blobs: &[Blob]) -> Result<SignedBeaconBlock> {
    let commitments =
        blobs.iter().map(|blob| kzg.blob_to_commitment(blob)).collect::<Result<Vec<_>, _>>()?;

    let message = BeaconBlock {
        slot: 42,
        proposer_index: 7,
        body: BeaconBlockBody::new(commitments),
        ..Default::default()
    };
    Ok(SignedBeaconBlock::new(message, BlsSignature::EMPTY))
}

/// A block, its blobs' cells and proofs and all of its column sidecars.
pub struct Fixture {
    pub kzg: CKzg,
    pub blobs: Vec<Blob>,
    pub block: SignedBeaconBlock,
    pub cells_and_proofs: Vec<CellsAndProofs>,
    pub sidecars: Vec<DataColumnSidecar>,
}

impl Fixture {
    pub fn new(seed: u64, blob_count: usize) -> Result<Self> {
        let kzg = CKzg::mainnet();
        let blobs = random_blobs(seed, blob_count);
        let block = block_for_blobs(&kzg, &blobs)?;
        let cells_and_proofs = codec::compute_cells_and_proofs(&kzg, &blobs)?;
        let sidecars = codec::data_column_sidecars(Some(&block), &cells_and_proofs, &spec())?;

        Ok(Self { kzg, blobs, block, cells_and_proofs, sidecars })
    }

    /// Verify the sidecars at `columns`, in the given order.
    pub fn verified(&self, columns: &[u64]) -> Result<Vec<VerifiedDataColumnSidecar>> {
        let selected = columns
            .iter()
            .map(|column| {
                self.sidecars
                    .get(*column as usize)
                    .cloned()
                    .ok_or_else(|| eyre!("no sidecar for column {column}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(verify_data_column_sidecars(&self.kzg, selected, &spec())?)
    }
}
