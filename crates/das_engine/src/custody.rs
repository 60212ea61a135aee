//! Custody sampling
//!
//! Maps a node identity to the custody groups it must store, and groups to
//! columns and gossip subnets. Every node computes the same mapping for every
//! peer, so the functions here are pure and deterministic.
//!
//! Columns are dealt round-robin over groups: with `G` groups, group `g` owns
//! columns `g, g + G, g + 2G, ...`.
//!
//! spec: https://github.com/ethereum/consensus-specs/blob/dev/specs/fulu/das-core.md#get_custody_groups

use std::collections::BTreeSet;

use peerdas_types::{ColumnIndex, CustodyIndex, DasSpec, NodeId};

use crate::error::CustodyError;

/// Gossip subnet a data column sidecar is published on.
pub type SubnetId = u64;

/// The custody groups assigned to `node_id` when it custodies `count` groups.
///
/// Returns exactly `count` distinct groups in ascending order. Requesting every
/// group skips the hash walk and returns `0..number_of_custody_groups`.
///
/// `custody_groups(id, x)` is a subset of `custody_groups(id, y)` for `x < y`.
pub fn custody_groups(
    node_id: NodeId,
    count: u64,
    spec: &DasSpec,
) -> Result<Vec<CustodyIndex>, CustodyError> {
    let total = spec.number_of_custody_groups;
    if count > total {
        return Err(CustodyError::TooLarge { count, max: total });
    }

    if count == total {
        return Ok((0..total).collect());
    }

    let mut seen = BTreeSet::new();
    let mut current_id = node_id;
    while (seen.len() as u64) < count {
        let hash = ethereum_hashing::hash_fixed(&current_id.to_le_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash[..8]);
        seen.insert(u64::from_le_bytes(prefix) % total);

        current_id.wrapping_increment();
    }

    // BTreeSet iterates in ascending order
    let groups: Vec<CustodyIndex> = seen.into_iter().collect();
    if groups.len() as u64 != count {
        return Err(CustodyError::Internal { expected: count, actual: groups.len() });
    }

    Ok(groups)
}

/// Columns owned by `group`, ascending.
pub fn compute_columns_for_custody_group(
    group: CustodyIndex,
    spec: &DasSpec,
) -> Result<Vec<ColumnIndex>, CustodyError> {
    let total = spec.number_of_custody_groups;
    if group >= total {
        return Err(CustodyError::InvalidGroup { group, max: total });
    }

    Ok((0..spec.columns_per_group()).map(|i| total * i + group).collect())
}

/// The group owning `column`; inverse of [`compute_columns_for_custody_group`].
pub fn compute_custody_group_for_column(
    column: ColumnIndex,
    spec: &DasSpec,
) -> Result<CustodyIndex, CustodyError> {
    if column >= spec.number_of_columns {
        return Err(CustodyError::InvalidColumn { column, max: spec.number_of_columns });
    }

    column
        .checked_rem(spec.number_of_custody_groups)
        .ok_or(CustodyError::ZeroParameter { field: "number_of_custody_groups" })
}

/// Union of the columns of every group in `groups`.
pub fn custody_columns<'a>(
    groups: impl IntoIterator<Item = &'a CustodyIndex>,
    spec: &DasSpec,
) -> Result<BTreeSet<ColumnIndex>, CustodyError> {
    let mut columns = BTreeSet::new();
    for group in groups {
        columns.extend(compute_columns_for_custody_group(*group, spec)?);
    }
    Ok(columns)
}

pub fn compute_subnet_for_data_column_sidecar(
    column: ColumnIndex,
    spec: &DasSpec,
) -> Result<SubnetId, CustodyError> {
    column
        .checked_rem(spec.data_column_sidecar_subnet_count)
        .ok_or(CustodyError::ZeroParameter { field: "data_column_sidecar_subnet_count" })
}

/// Subnets carrying any of `columns`.
pub fn data_column_subnets<'a>(
    columns: impl IntoIterator<Item = &'a ColumnIndex>,
    spec: &DasSpec,
) -> Result<BTreeSet<SubnetId>, CustodyError> {
    columns
        .into_iter()
        .map(|column| compute_subnet_for_data_column_sidecar(*column, spec))
        .collect()
}

/// Whether custodying `custody_group_count` groups gives a node enough
/// columns to erasure-decode every blob on its own.
pub fn can_self_reconstruct(custody_group_count: u64, spec: &DasSpec) -> bool {
    custody_group_count >= spec.number_of_custody_groups.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn spec_with_groups(groups: u64) -> DasSpec {
        DasSpec { number_of_custody_groups: groups, ..DasSpec::mainnet() }
    }

    #[test]
    fn test_custody_groups_are_distinct_sorted_and_in_range() {
        let spec = DasSpec::mainnet();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let node_id = NodeId::new(rng.r#gen());
            let count = rng.gen_range(0..=spec.number_of_custody_groups);
            let groups = custody_groups(node_id, count, &spec).unwrap();

            assert_eq!(groups.len() as u64, count);
            assert!(groups.windows(2).all(|w| w[0] < w[1]));
            assert!(groups.iter().all(|g| *g < spec.number_of_custody_groups));
        }
    }

    #[test]
    fn test_custody_groups_grow_monotonically() {
        let spec = DasSpec::mainnet();
        let node_id = NodeId::new([7u8; 32]);

        let small = custody_groups(node_id, 4, &spec).unwrap();
        let large = custody_groups(node_id, 16, &spec).unwrap();
        assert!(small.iter().all(|g| large.contains(g)));
    }

    #[test]
    fn test_full_count_returns_every_group_in_order() {
        let spec = spec_with_groups(64);
        let groups = custody_groups(NodeId::new([0xaa; 32]), 64, &spec).unwrap();
        assert_eq!(groups, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_cursor_wraps_at_max_node_id() {
        let spec = DasSpec::mainnet();
        let groups = custody_groups(NodeId::MAX, 8, &spec).unwrap();
        assert_eq!(groups.len(), 8);
    }

    #[test]
    fn test_too_many_groups_rejected() {
        let spec = DasSpec::mainnet();
        assert!(matches!(
            custody_groups(NodeId::ZERO, 129, &spec),
            Err(CustodyError::TooLarge { count: 129, max: 128 })
        ));
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(custody_groups(NodeId::ZERO, 0, &DasSpec::mainnet()).unwrap().is_empty());
    }

    #[test]
    fn test_columns_for_group() {
        let spec = spec_with_groups(64);
        assert_eq!(compute_columns_for_custody_group(2, &spec).unwrap(), vec![2, 66]);
        assert!(matches!(
            compute_columns_for_custody_group(64, &spec),
            Err(CustodyError::InvalidGroup { group: 64, max: 64 })
        ));
    }

    #[test]
    fn test_group_for_column_scenarios() {
        let spec = spec_with_groups(64);
        for (column, group) in [(2, 2), (3, 3), (66, 2), (67, 3)] {
            assert_eq!(compute_custody_group_for_column(column, &spec).unwrap(), group);
        }
        assert!(matches!(
            compute_custody_group_for_column(128, &spec),
            Err(CustodyError::InvalidColumn { column: 128, max: 128 })
        ));
    }

    #[test]
    fn test_group_column_roundtrip() {
        for groups in [64, 128] {
            let spec = spec_with_groups(groups);
            for column in 0..spec.number_of_columns {
                let group = compute_custody_group_for_column(column, &spec).unwrap();
                assert!(compute_columns_for_custody_group(group, &spec).unwrap().contains(&column));
            }
        }
    }

    #[test]
    fn test_custody_columns_union() {
        let spec = spec_with_groups(64);
        let columns = custody_columns(&[1, 3], &spec).unwrap();
        assert_eq!(columns.into_iter().collect::<Vec<_>>(), vec![1, 3, 65, 67]);

        assert!(custody_columns(&[1, 64], &spec).is_err());
    }

    #[test]
    fn test_subnets() {
        let spec = DasSpec { data_column_sidecar_subnet_count: 32, ..DasSpec::mainnet() };
        assert_eq!(compute_subnet_for_data_column_sidecar(33, &spec).unwrap(), 1);

        let subnets = data_column_subnets(&[1, 33, 65, 2], &spec).unwrap();
        assert_eq!(subnets.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_zero_divisors_are_errors() {
        let spec = DasSpec { data_column_sidecar_subnet_count: 0, ..DasSpec::mainnet() };
        assert!(matches!(
            compute_subnet_for_data_column_sidecar(3, &spec),
            Err(CustodyError::ZeroParameter { field: "data_column_sidecar_subnet_count" })
        ));
        assert!(data_column_subnets(&[1, 2], &spec).is_err());
        assert!(data_column_subnets(&Vec::<ColumnIndex>::new(), &spec).unwrap().is_empty());

        let spec = spec_with_groups(0);
        assert!(matches!(
            compute_custody_group_for_column(5, &spec),
            Err(CustodyError::ZeroParameter { field: "number_of_custody_groups" })
        ));
        assert!(matches!(
            compute_columns_for_custody_group(0, &spec),
            Err(CustodyError::InvalidGroup { group: 0, max: 0 })
        ));
        assert!(custody_groups(NodeId::ZERO, 0, &spec).unwrap().is_empty());
        assert!(matches!(
            custody_groups(NodeId::ZERO, 1, &spec),
            Err(CustodyError::TooLarge { count: 1, max: 0 })
        ));
        assert_eq!(spec.columns_per_group(), 0);
    }

    #[test]
    fn test_can_self_reconstruct_thresholds() {
        let spec = spec_with_groups(64);
        assert!(!can_self_reconstruct(31, &spec));
        assert!(can_self_reconstruct(32, &spec));

        // 65 groups is not a valid partition of 128 columns, but the predicate
        // only depends on the group count.
        let spec = spec_with_groups(65);
        assert!(!can_self_reconstruct(32, &spec));
        assert!(can_self_reconstruct(33, &spec));
    }
}
