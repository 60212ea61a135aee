//! Custody group count advertised in a peer's node record

use std::collections::BTreeMap;

use alloy_rlp::Decodable;
use peerdas_types::DasSpec;

use crate::error::RecordError;

/// Record key holding the RLP encoded custody group count.
pub const CUSTODY_GROUP_COUNT_ENR_KEY: &str = "cgc";

/// Raw key/value access to a discovery record.
pub trait NodeRecord {
    fn get_raw(&self, key: &str) -> Option<&[u8]>;
}

impl NodeRecord for BTreeMap<String, Vec<u8>> {
    fn get_raw(&self, key: &str) -> Option<&[u8]> {
        self.get(key).map(Vec::as_slice)
    }
}

/// Read and bound-check a peer's advertised custody group count.
///
/// # Errors
///
/// - `MissingField` if the record has no `cgc` entry
/// - `Decode` if the entry is not exactly one RLP integer
/// - `OutOfRange` if the count exceeds `number_of_custody_groups`
pub fn custody_group_count_from_record<R: NodeRecord + ?Sized>(
    record: &R,
    spec: &DasSpec,
) -> Result<u64, RecordError> {
    let raw = record
        .get_raw(CUSTODY_GROUP_COUNT_ENR_KEY)
        .ok_or(RecordError::MissingField(CUSTODY_GROUP_COUNT_ENR_KEY))?;

    let decode_error = |source| RecordError::Decode { key: CUSTODY_GROUP_COUNT_ENR_KEY, source };
    let mut buf = raw;
    let value = u64::decode(&mut buf).map_err(decode_error)?;
    if !buf.is_empty() {
        return Err(decode_error(alloy_rlp::Error::UnexpectedLength));
    }

    if value > spec.number_of_custody_groups {
        return Err(RecordError::OutOfRange { value, max: spec.number_of_custody_groups });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &[u8]) -> BTreeMap<String, Vec<u8>> {
        BTreeMap::from([(CUSTODY_GROUP_COUNT_ENR_KEY.to_string(), value.to_vec())])
    }

    #[test]
    fn test_reads_rlp_count() {
        let spec = DasSpec::mainnet();
        for count in [0u64, 4, 127, 128] {
            let encoded = alloy_rlp::encode(count);
            assert_eq!(custody_group_count_from_record(&record(&encoded), &spec), Ok(count));
        }
    }

    #[test]
    fn test_missing_field() {
        let spec = DasSpec::mainnet();
        assert_eq!(
            custody_group_count_from_record(&BTreeMap::new(), &spec),
            Err(RecordError::MissingField("cgc"))
        );
    }

    #[test]
    fn test_undecodable_field() {
        let spec = DasSpec::mainnet();
        // leading zero is non-canonical
        assert!(matches!(
            custody_group_count_from_record(&record(&[0x82, 0x00, 0x01]), &spec),
            Err(RecordError::Decode { key: "cgc", .. })
        ));
        // trailing bytes
        assert!(matches!(
            custody_group_count_from_record(&record(&[0x04, 0x04]), &spec),
            Err(RecordError::Decode { .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let spec = DasSpec::mainnet();
        let encoded = alloy_rlp::encode(129u64);
        assert_eq!(
            custody_group_count_from_record(&record(&encoded), &spec),
            Err(RecordError::OutOfRange { value: 129, max: 128 })
        );
    }
}
