use serde::Serialize;

use crate::chain::Address;
use crate::constants::{
    ANNUAL_UJRAH_RATE_BP, BASIS_POINTS_DIVISOR, ESTIMATE_ANNUAL_RATE_PERCENT, MICROALGOS_PER_ALGO,
    SECONDS_PER_YEAR,
};

pub fn micro_to_algo(micro: u64) -> f64 {
    micro as f64 / MICROALGOS_PER_ALGO as f64
}

/// Floors to whole microAlgos; negative and non-finite input yields 0.
pub fn algo_to_micro(algo: f64) -> u64 {
    if !algo.is_finite() || algo <= 0.0 {
        return 0;
    }
    (algo * MICROALGOS_PER_ALGO as f64).floor() as u64
}

// ==================== LEASE ====================
/// `get_my_ijarah_info` result: `(principal, start_time, unclaimed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IjarahInfo {
    pub principal: u64,
    pub start_time: u64,
    pub unclaimed: u64,
}

impl IjarahInfo {
    /// Ujrah accrued since `start_time`, in microAlgos. Display only.
    pub fn accrued_ujrah(&self, now_unix: u64) -> u64 {
        let elapsed = now_unix.saturating_sub(self.start_time) as u128;
        let accrued = self.principal as u128 * ANNUAL_UJRAH_RATE_BP as u128 * elapsed
            / (BASIS_POINTS_DIVISOR as u128 * SECONDS_PER_YEAR as u128);
        accrued.min(u64::MAX as u128) as u64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StakingSnapshot {
    pub address: Address,
    pub wallet_balance: f64,
    pub staked_balance: f64,
    pub total_rewards: f64,
    pub accrued_ujrah: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease: Option<IjarahInfo>,
}

impl StakingSnapshot {
    pub fn new(address: Address, balance_micro: u64, lease: Option<IjarahInfo>, now_unix: u64) -> Self {
        Self {
            address,
            wallet_balance: micro_to_algo(balance_micro),
            staked_balance: lease.map(|l| micro_to_algo(l.principal)).unwrap_or(0.0),
            total_rewards: lease.map(|l| micro_to_algo(l.unclaimed)).unwrap_or(0.0),
            accrued_ujrah: lease
                .map(|l| micro_to_algo(l.accrued_ujrah(now_unix)))
                .unwrap_or(0.0),
            lease,
        }
    }
}

// ==================== ESTIMATES ====================
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DurationOption {
    pub days: u32,
    pub label: &'static str,
    pub apy: &'static str,
}

pub const DURATIONS: [DurationOption; 4] = [
    DurationOption { days: 30, label: "30 Days", apy: "3.0%" },
    DurationOption { days: 90, label: "90 Days", apy: "3.5%" },
    DurationOption { days: 180, label: "180 Days", apy: "4.0%" },
    DurationOption { days: 365, label: "1 Year", apy: "5.0%" },
];

#[derive(Debug, Clone, Serialize)]
pub struct RewardEstimate {
    pub amount: f64,
    pub days: u32,
    pub annual_rate_percent: f64,
    pub estimated_rewards: f64,
}

impl RewardEstimate {
    /// `amount × rate / 100 × days / 365`; unparseable amounts estimate to 0.
    pub fn compute(amount: f64, days: u32) -> Self {
        let estimated_rewards = if amount.is_finite() && amount > 0.0 {
            (amount * ESTIMATE_ANNUAL_RATE_PERCENT / 100.0) * (days as f64 / 365.0)
        } else {
            0.0
        };
        Self {
            amount,
            days,
            annual_rate_percent: ESTIMATE_ANNUAL_RATE_PERCENT,
            estimated_rewards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn estimate_is_simple_interest_over_days() {
        let estimate = RewardEstimate::compute(100.0, 365);
        assert!((estimate.estimated_rewards - 3.0).abs() < EPSILON);
        let month = RewardEstimate::compute(365.0, 30);
        assert!((month.estimated_rewards - 0.9).abs() < EPSILON);
        assert_eq!(RewardEstimate::compute(f64::NAN, 30).estimated_rewards, 0.0);
        assert_eq!(RewardEstimate::compute(-5.0, 30).estimated_rewards, 0.0);
    }

    #[test]
    fn algo_conversions_floor_to_micro() {
        assert_eq!(algo_to_micro(1.0), 1_000_000);
        assert_eq!(algo_to_micro(1.2345678), 1_234_567);
        assert_eq!(algo_to_micro(-1.0), 0);
        assert!((micro_to_algo(2_500_000) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn accrued_ujrah_is_three_percent_per_year() {
        let lease = IjarahInfo {
            principal: 10_000_000,
            start_time: 1_000,
            unclaimed: 0,
        };
        assert_eq!(lease.accrued_ujrah(1_000 + SECONDS_PER_YEAR), 300_000);
        assert_eq!(lease.accrued_ujrah(500), 0);
    }

    #[test]
    fn snapshot_without_lease_reports_zeroes() {
        let snapshot = StakingSnapshot::new(Address([1u8; 32]), 5_000_000, None, 0);
        assert!((snapshot.wallet_balance - 5.0).abs() < EPSILON);
        assert_eq!(snapshot.staked_balance, 0.0);
        assert_eq!(snapshot.total_rewards, 0.0);
    }
}
