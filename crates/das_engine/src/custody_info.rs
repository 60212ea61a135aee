//! Per-node custody count policy
//!
//! A node custodies `target` groups: every group when subscribed to all
//! subnets, otherwise the requirement derived from the validators it tracks,
//! falling back to the default `custody_requirement`. What it advertises to
//! peers may lag behind, and it only ever samples from groups it both custodies
//! and advertises.
//!
//! spec: https://github.com/ethereum/consensus-specs/blob/dev/specs/fulu/validator.md#validator-custody

use parking_lot::RwLock;
use peerdas_types::DasSpec;
use tracing::debug;

use crate::error::CustodyError;

/// Which custody count to size sampling against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodyType {
    /// The count the node intends to custody.
    Target,
    /// The count it custodies and has advertised.
    Actual,
}

/// Custody counts of the local node.
///
/// Each field sits behind its own lock; reads vastly outnumber writes.
#[derive(Debug, Default)]
pub struct CustodyInfo {
    subscribe_all_subnets: bool,
    /// Last computed validators custody requirement, `None` while no validator is tracked.
    validators_custody_requirement: RwLock<Option<u64>>,
    /// Last group count written to the node record.
    to_advertise_custody_group_count: RwLock<u64>,
}

impl CustodyInfo {
    pub fn new(subscribe_all_subnets: bool) -> Self {
        Self { subscribe_all_subnets, ..Default::default() }
    }

    pub fn subscribe_all_subnets(&self) -> bool {
        self.subscribe_all_subnets
    }

    pub fn validators_custody_requirement(&self) -> Option<u64> {
        *self.validators_custody_requirement.read()
    }

    /// Record the requirement of the currently tracked validators, or `None`
    /// once no validator is tracked anymore.
    pub fn set_validators_custody_requirement(&self, requirement: Option<u64>) {
        let previous =
            std::mem::replace(&mut *self.validators_custody_requirement.write(), requirement);
        if previous != requirement {
            debug!(?previous, ?requirement, "Validators custody requirement updated");
        }
    }

    pub fn set_to_advertise_group_count(&self, count: u64) {
        *self.to_advertise_custody_group_count.write() = count;
    }

    /// Number of groups the node should custody.
    pub fn target_group_count(&self, spec: &DasSpec) -> u64 {
        if self.subscribe_all_subnets {
            return spec.number_of_custody_groups;
        }

        self.validators_custody_requirement().unwrap_or(spec.custody_requirement)
    }

    /// Number of groups the node advertises in its record.
    pub fn to_advertise_group_count(&self, spec: &DasSpec) -> u64 {
        if self.subscribe_all_subnets {
            return spec.number_of_custody_groups;
        }

        (*self.to_advertise_custody_group_count.read()).max(spec.custody_requirement)
    }

    /// Groups both custodied and advertised.
    pub fn actual_group_count(&self, spec: &DasSpec) -> u64 {
        self.target_group_count(spec).min(self.to_advertise_group_count(spec))
    }

    /// Number of groups to sample per slot.
    pub fn custody_group_sampling_size(&self, custody_type: CustodyType, spec: &DasSpec) -> u64 {
        let custody_group_count = match custody_type {
            CustodyType::Target => self.target_group_count(spec),
            CustodyType::Actual => self.actual_group_count(spec),
        };

        spec.samples_per_slot.max(custody_group_count)
    }
}

/// Read access to validator effective balances, in gwei.
pub trait ValidatorBalances {
    type Error: std::error::Error + Send + Sync + 'static;

    fn effective_balance(&self, index: u64) -> Result<u64, Self::Error>;
}

/// Custody group count required by the validators at `indices`.
///
/// One group per `balance_per_additional_custody_group` of total effective
/// balance, clamped to `[validator_custody_requirement, number_of_custody_groups]`.
///
/// # Errors
///
/// `ValidatorBalance` naming the first index whose balance could not be read.
pub fn validators_custody_requirement<S: ValidatorBalances>(
    state: &S,
    indices: impl IntoIterator<Item = u64>,
    spec: &DasSpec,
) -> Result<u64, CustodyError> {
    let mut total_balance: u64 = 0;
    for index in indices {
        let balance = state
            .effective_balance(index)
            .map_err(|e| CustodyError::ValidatorBalance { index, source: Box::new(e) })?;
        total_balance = total_balance.saturating_add(balance);
    }

    let count = total_balance.checked_div(spec.balance_per_additional_custody_group).unwrap_or(0);

    Ok(count.max(spec.validator_custody_requirement).min(spec.number_of_custody_groups))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const GWEI_PER_ETH: u64 = 1_000_000_000;

    #[derive(Debug, thiserror::Error)]
    #[error("unknown validator {0}")]
    struct UnknownValidator(u64);

    struct State(HashMap<u64, u64>);

    impl ValidatorBalances for State {
        type Error = UnknownValidator;

        fn effective_balance(&self, index: u64) -> Result<u64, Self::Error> {
            self.0.get(&index).copied().ok_or(UnknownValidator(index))
        }
    }

    fn state(balances_eth: &[u64]) -> State {
        State(
            balances_eth
                .iter()
                .enumerate()
                .map(|(i, eth)| (i as u64, eth * GWEI_PER_ETH))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_validators() {
        let spec = DasSpec::mainnet();
        let info = CustodyInfo::new(false);

        assert_eq!(info.target_group_count(&spec), spec.custody_requirement);
        assert_eq!(info.to_advertise_group_count(&spec), spec.custody_requirement);
        assert_eq!(info.actual_group_count(&spec), spec.custody_requirement);
        assert_eq!(
            info.custody_group_sampling_size(CustodyType::Target, &spec),
            spec.samples_per_slot
        );
    }

    #[test]
    fn test_subscribe_all_subnets_overrides_everything() {
        let spec = DasSpec::mainnet();
        let info = CustodyInfo::new(true);
        info.set_validators_custody_requirement(Some(10));
        info.set_to_advertise_group_count(5);

        assert_eq!(info.target_group_count(&spec), 128);
        assert_eq!(info.to_advertise_group_count(&spec), 128);
        assert_eq!(info.custody_group_sampling_size(CustodyType::Actual, &spec), 128);
    }

    #[test]
    fn test_actual_is_min_of_target_and_advertised() {
        let spec = DasSpec::mainnet();
        let info = CustodyInfo::new(false);
        info.set_validators_custody_requirement(Some(20));
        info.set_to_advertise_group_count(12);

        assert_eq!(info.target_group_count(&spec), 20);
        assert_eq!(info.to_advertise_group_count(&spec), 12);
        assert_eq!(info.actual_group_count(&spec), 12);
        assert_eq!(info.custody_group_sampling_size(CustodyType::Target, &spec), 20);
        assert_eq!(info.custody_group_sampling_size(CustodyType::Actual, &spec), 12);

        info.set_validators_custody_requirement(None);
        assert_eq!(info.actual_group_count(&spec), spec.custody_requirement);
    }

    #[test]
    fn test_validators_custody_requirement_clamps() {
        let spec = DasSpec::mainnet();

        // 2 * 32 ETH is two units, raised to the minimum of 8
        assert_eq!(validators_custody_requirement(&state(&[32, 32]), 0..2, &spec).unwrap(), 8);

        // 10 validators at 2048 ETH is 640 units, capped at 128 groups
        let whales = state(&[2048; 10]);
        assert_eq!(validators_custody_requirement(&whales, 0..10, &spec).unwrap(), 128);

        // 20 * 32 ETH sits inside the range
        let mid = state(&[32; 20]);
        assert_eq!(validators_custody_requirement(&mid, 0..20, &spec).unwrap(), 20);

        assert_eq!(validators_custody_requirement(&mid, [], &spec).unwrap(), 8);
    }

    #[test]
    fn test_balance_lookup_failure_names_index() {
        let spec = DasSpec::mainnet();
        let err = validators_custody_requirement(&state(&[32]), [0, 7], &spec).unwrap_err();
        assert!(matches!(err, CustodyError::ValidatorBalance { index: 7, .. }));
    }

    #[test]
    fn test_concurrent_updates_are_never_torn() {
        let spec = DasSpec::mainnet();
        let info = CustodyInfo::new(false);
        let allowed = [spec.custody_requirement, 16, 64];

        std::thread::scope(|s| {
            for writer in 0..2u64 {
                let info = &info;
                s.spawn(move || {
                    for i in 0..1_000u64 {
                        let value = if (i + writer) % 2 == 0 { 16 } else { 64 };
                        info.set_validators_custody_requirement(Some(value));
                        info.set_to_advertise_group_count(value);
                    }
                });
            }

            for _ in 0..4 {
                let info = &info;
                let spec = &spec;
                s.spawn(move || {
                    for _ in 0..1_000 {
                        assert!(allowed.contains(&info.target_group_count(spec)));
                        assert!(allowed.contains(&info.to_advertise_group_count(spec)));
                        assert!(allowed.contains(&info.actual_group_count(spec)));
                    }
                });
            }
        });
    }
}
