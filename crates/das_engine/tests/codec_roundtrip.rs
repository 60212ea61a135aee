//! Encode blobs into column sidecars, verify half of them and decode the
//! blobs back.

mod common;

use color_eyre::Result;
use peerdas_engine::{
    DasError, ReconstructionError, ValidationError,
    codec::{data_column_sidecars, reconstruct_blobs},
    kzg::CellKzg,
};
use peerdas_types::{
    constants::BEACON_BLOCK_BODY_TREE_DEPTH,
    ethereum_compat::verify_kzg_commitment_inclusion_proof,
};

#[test]
fn blobs_survive_encode_then_decode() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(1, 6)?;
    let systematic: Vec<u64> = (0..spec.minimum_columns_for_reconstruction()).collect();

    for blob_count in 1..=6 {
        let blobs = &fixture.blobs[..blob_count];
        let block = common::block_for_blobs(&fixture.kzg, blobs)?;
        let sidecars =
            data_column_sidecars(Some(&block), &fixture.cells_and_proofs[..blob_count], &spec)?;
        assert_eq!(sidecars.len() as u64, spec.number_of_columns);

        let verified = peerdas_engine::verifier::verify_data_column_sidecars(
            &fixture.kzg,
            systematic.iter().map(|c| sidecars[*c as usize].clone()).collect(),
            &spec,
        )?;

        let decoded = reconstruct_blobs(&fixture.kzg, &verified, &[], &spec)?;
        assert_eq!(decoded.len(), blob_count);

        let header = block.signed_block_header(spec.max_commitments_tree_depth())?;
        for (index, sidecar) in decoded.iter().enumerate() {
            assert_eq!(sidecar.index, index as u64);
            assert_eq!(sidecar.blob, blobs[index]);
            assert_eq!(sidecar.kzg_commitment, block.blob_kzg_commitments()[index]);
            assert_eq!(
                sidecar.kzg_proof,
                fixture.kzg.compute_blob_proof(&blobs[index], &sidecar.kzg_commitment)?
            );
            assert_eq!(sidecar.signed_block_header, header);
            assert!(verify_kzg_commitment_inclusion_proof(
                &sidecar.kzg_commitment,
                &sidecar.kzg_commitment_inclusion_proof,
                index,
                spec.max_commitments_tree_depth(),
                BEACON_BLOCK_BODY_TREE_DEPTH,
                header.message.body_root,
            ));
        }
    }

    Ok(())
}

#[test]
fn decode_selects_requested_blobs_only() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(2, 3)?;
    let verified = fixture.verified(&(0..64).collect::<Vec<_>>())?;

    let decoded = reconstruct_blobs(&fixture.kzg, &verified, &[2, 0, 9], &spec)?;
    let indices: Vec<u64> = decoded.iter().map(|sidecar| sidecar.index).collect();
    assert_eq!(indices, vec![2, 0]);
    assert_eq!(decoded[0].blob, fixture.blobs[2]);
    assert_eq!(decoded[1].blob, fixture.blobs[0]);

    Ok(())
}

#[test]
fn decode_ignores_order_and_extra_columns() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(3, 1)?;
    let mut columns: Vec<u64> = (0..64).rev().collect();
    columns.extend([100, 127]);

    let decoded = reconstruct_blobs(&fixture.kzg, &fixture.verified(&columns)?, &[], &spec)?;
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].blob, fixture.blobs[0]);

    Ok(())
}

#[test]
fn decode_without_sidecars_reports_every_needed_column() {
    let spec = common::spec();
    let kzg = peerdas_engine::kzg::CKzg::mainnet();

    let err = reconstruct_blobs(&kzg, &[], &[], &spec).unwrap_err();
    match err {
        DasError::Reconstruction(ReconstructionError::MissingColumns { missing }) => {
            assert_eq!(missing, (0..64).collect::<Vec<u64>>());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decode_reports_gaps_in_systematic_half() -> Result<()> {
    let spec = common::spec();
    let fixture = common::Fixture::new(4, 1)?;
    let columns: Vec<u64> = (0..128).filter(|c| ![5, 17, 63].contains(c)).collect();

    let err =
        reconstruct_blobs(&fixture.kzg, &fixture.verified(&columns)?, &[], &spec).unwrap_err();
    assert!(matches!(
        err,
        DasError::Reconstruction(ReconstructionError::MissingColumns { missing })
            if missing == vec![5, 17, 63]
    ));

    Ok(())
}

#[test]
fn decode_rejects_columns_of_different_blocks() -> Result<()> {
    let spec = common::spec();
    let block_a = common::Fixture::new(100, 1)?;
    let block_b = common::Fixture::new(200, 1)?;

    let mut sidecars = block_a.verified(&(0..32).collect::<Vec<_>>())?;
    sidecars.extend(block_b.verified(&(32..64).collect::<Vec<_>>())?);

    let err = reconstruct_blobs(&block_a.kzg, &sidecars, &[], &spec).unwrap_err();
    assert!(matches!(
        err,
        DasError::Validation(ValidationError::BlockMismatch { column: 32, first: 0 })
    ));

    // either block on its own still decodes
    let systematic = block_b.verified(&(0..64).collect::<Vec<_>>())?;
    let decoded = reconstruct_blobs(&block_b.kzg, &systematic, &[], &spec)?;
    assert_eq!(decoded[0].blob, block_b.blobs[0]);

    Ok(())
}
