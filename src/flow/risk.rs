use super::model::RiskLevel;

const CRITICAL_THRESHOLD: f64 = 10.0;
const HIGH_THRESHOLD: f64 = 1.0;
const MEDIUM_THRESHOLD: f64 = 0.1;

const BUSY_TRANSACTION_COUNT: usize = 100;
const LARGE_VOLUME: f64 = 100.0;
/// Base units (lamports).
const HIGH_FEE: f64 = 1_000_000.0;

/// Classifies a single transfer amount, given in native units.
pub fn calculate_risk_level(amount: f64) -> RiskLevel {
    if amount > CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if amount > HIGH_THRESHOLD {
        RiskLevel::High
    } else if amount > MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Local fallback score used when no external analysis is available.
pub fn heuristic_risk_score(total_transactions: usize, total_volume: f64, max_fee: f64) -> f64 {
    let mut score: f64 = 0.0;
    if total_transactions > BUSY_TRANSACTION_COUNT {
        score += 30.0;
    }
    if total_volume > LARGE_VOLUME {
        score += 40.0;
    }
    if max_fee > HIGH_FEE {
        score += 20.0;
    }
    score.min(100.0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn bracket(amount: f64) -> usize {
        [MEDIUM_THRESHOLD, HIGH_THRESHOLD, CRITICAL_THRESHOLD]
            .iter()
            .filter(|threshold| amount > **threshold)
            .count()
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(calculate_risk_level(0.1), RiskLevel::Low);
        assert_eq!(calculate_risk_level(0.100_001), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(1.0), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(5.0), RiskLevel::High);
        assert_eq!(calculate_risk_level(10.0), RiskLevel::High);
        assert_eq!(calculate_risk_level(10.5), RiskLevel::Critical);
    }

    #[test]
    fn heuristic_adds_up_components() {
        assert_eq!(heuristic_risk_score(0, 0.0, 0.0), 0.0);
        assert_eq!(heuristic_risk_score(101, 0.0, 0.0), 30.0);
        assert_eq!(heuristic_risk_score(100, 100.5, 0.0), 40.0);
        assert_eq!(heuristic_risk_score(5, 1.0, 2_000_000.0), 20.0);
        assert_eq!(heuristic_risk_score(500, 1_000.0, 2_000_000.0), 90.0);
    }

    proptest! {
        #[test]
        fn same_bracket_same_level(a in 0.0f64..50.0, b in 0.0f64..50.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            if bracket(low) == bracket(high) {
                prop_assert_eq!(calculate_risk_level(low), calculate_risk_level(high));
            } else {
                prop_assert!(calculate_risk_level(low) < calculate_risk_level(high));
            }
        }

        #[test]
        fn heuristic_is_capped(count in 0usize..10_000, volume in 0.0f64..1e6, fee in 0.0f64..1e8) {
            let score = heuristic_risk_score(count, volume, fee);
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }
}
