//! Batched verification of real column sidecars.

mod common;

use color_eyre::Result;
use common::mocks::{MockKzg, VerifyOutcome};
use peerdas_engine::{
    CryptographicError, DasEngine, DasError, DasMetrics, ValidationError,
    verifier::{verify_data_column_sidecars, verify_data_columns_sidecar_kzg_proofs},
};
use peerdas_types::{Cell, KzgCommitment, aliases::B256};

#[test]
fn untouched_batch_verifies() -> Result<()> {
    let fixture = common::Fixture::new(10, 2)?;

    verify_data_columns_sidecar_kzg_proofs(&fixture.kzg, &fixture.sidecars)?;
    let verified = fixture.verified(&[0, 1, 64, 127])?;
    let indices: Vec<u64> = verified.iter().map(|sidecar| sidecar.index()).collect();
    assert_eq!(indices, vec![0, 1, 64, 127]);

    Ok(())
}

#[test]
fn empty_batch_is_valid() -> Result<()> {
    let kzg = MockKzg::default().with_verify(VerifyOutcome::LibraryError);
    verify_data_columns_sidecar_kzg_proofs(&kzg, &[])?;
    Ok(())
}

#[test]
fn single_mutated_cell_byte_fails_the_batch() -> Result<()> {
    let fixture = common::Fixture::new(11, 2)?;

    for (column, blob, byte) in [(0usize, 0usize, 100usize), (77, 1, 2047)] {
        let mut sidecars = fixture.sidecars.clone();
        let mut data = sidecars[column].column[blob].as_slice().to_vec();
        data[byte] ^= 0x01;
        sidecars[column].column[blob] =
            Cell::from_slice(&data).map_err(|e| color_eyre::eyre::eyre!(e))?;

        assert!(matches!(
            verify_data_columns_sidecar_kzg_proofs(&fixture.kzg, &sidecars),
            Err(CryptographicError::InvalidKzgProof { sidecars: 128, .. })
        ));
    }

    Ok(())
}

#[test]
fn false_or_failing_backend_is_invalid_proof() -> Result<()> {
    let fixture = common::Fixture::new(12, 1)?;

    for outcome in [VerifyOutcome::Invalid, VerifyOutcome::LibraryError] {
        let kzg = MockKzg::default().with_verify(outcome);
        let err = verify_data_columns_sidecar_kzg_proofs(&kzg, &fixture.sidecars[..4]).unwrap_err();
        assert!(matches!(err, CryptographicError::InvalidKzgProof { sidecars: 4, .. }));
    }

    Ok(())
}

#[test]
fn swapped_commitment_fails_inclusion_before_kzg() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(13, 2)?;

    let mut sidecar = fixture.sidecars[9].clone();
    sidecar.kzg_commitments.swap(0, 1);

    let err = verify_data_column_sidecars(&fixture.kzg, vec![sidecar], &spec).unwrap_err();
    assert!(matches!(
        err,
        DasError::Cryptographic(CryptographicError::InvalidInclusionProof { index: 9 })
    ));

    let mut sidecar = fixture.sidecars[9].clone();
    sidecar.kzg_commitments_inclusion_proof[2] = B256::ZERO;
    assert!(verify_data_column_sidecars(&fixture.kzg, vec![sidecar], &spec).is_err());

    let mut sidecar = fixture.sidecars[9].clone();
    sidecar.kzg_commitments[1] = KzgCommitment::new([0u8; 48]);
    assert!(verify_data_column_sidecars(&fixture.kzg, vec![sidecar], &spec).is_err());

    Ok(())
}

#[test]
fn structural_failure_rejects_whole_batch() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(14, 1)?;

    let mut batch = fixture.sidecars[..3].to_vec();
    batch[2].kzg_proofs.clear();

    let err = verify_data_column_sidecars(&fixture.kzg, batch, &spec).unwrap_err();
    assert!(matches!(
        err,
        DasError::Validation(ValidationError::MismatchLength { index: 2, proofs: 0, .. })
    ));

    Ok(())
}

#[test]
fn engine_counts_outcomes() -> Result<()> {
    let fixture = common::Fixture::new(15, 1)?;
    let engine = DasEngine::new(
        MockKzg::default(),
        common::spec(),
        false,
        DasMetrics::new(),
    )?;

    engine.verify_sidecars(fixture.sidecars[..8].to_vec())?;

    let mut tampered = fixture.sidecars[8..10].to_vec();
    tampered[0].kzg_commitments_inclusion_proof.reverse();
    assert!(engine.verify_sidecars(tampered).is_err());

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.verifications_success, 8);
    assert_eq!(snapshot.verifications_failure, 2);
    assert_eq!(snapshot.inclusion_proof_failures, 1);

    Ok(())
}
