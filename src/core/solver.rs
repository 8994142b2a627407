use super::engine::{MAX_ROUNDS, compute_sequence, validate_parameters};
use super::error::{CalcError, ensure_positive};
use super::types::{
    RoundOutcome, RoundResult, SequenceParameters, StreakExposure, StreakSolveResult,
};

const BANKROLL_EPS: f64 = 1e-9;

/// Money committed by an unbroken run of `streak_len` losses.
pub fn losing_streak_exposure(
    params: &SequenceParameters,
    streak_len: u32,
) -> Result<StreakExposure, CalcError> {
    if streak_len == 0 {
        return Err(CalcError::InvalidParameter(
            "streak length must be >= 1".to_string(),
        ));
    }

    let streak = losing_streak(params, streak_len)?;
    streak
        .last()
        .map(exposure_at)
        .ok_or_else(|| CalcError::InvalidParameter("losing streak produced no rounds".to_string()))
}

/// Longest run of losses (up to the round ceiling) that `bankroll` can fund.
pub fn max_survivable_streak(
    params: &SequenceParameters,
    bankroll: f64,
) -> Result<StreakSolveResult, CalcError> {
    validate_parameters(params)?;
    ensure_positive("bankroll", bankroll)?;

    let streak = losing_streak(params, MAX_ROUNDS)?;
    let covered = streak
        .iter()
        .take_while(|round| round.cumulative_staked <= bankroll + BANKROLL_EPS)
        .count();

    let exposure = covered.checked_sub(1).map(|idx| exposure_at(&streak[idx]));
    let next_stake = streak.get(covered).map(|round| round.stake);
    let capped = covered == streak.len();

    let message = if covered == 0 {
        "Bankroll does not cover the first stake.".to_string()
    } else if capped {
        format!("Bankroll covers the maximum of {MAX_ROUNDS} consecutive losses.")
    } else {
        format!("Bankroll covers {covered} consecutive losses.")
    };

    Ok(StreakSolveResult {
        bankroll,
        max_streak: covered as u32,
        exposure,
        next_stake,
        capped,
        message,
    })
}

fn losing_streak(
    params: &SequenceParameters,
    streak_len: u32,
) -> Result<Vec<RoundResult>, CalcError> {
    let streak_params = SequenceParameters {
        max_rounds: streak_len,
        stop_loss: 0.0,
        ..*params
    };
    let outcomes = vec![RoundOutcome::Loss; streak_len.min(MAX_ROUNDS) as usize];
    compute_sequence(&streak_params, &outcomes)
}

fn exposure_at(round: &RoundResult) -> StreakExposure {
    StreakExposure {
        streak_len: round.round_index,
        final_stake: round.stake,
        total_staked: round.cumulative_staked,
        profit: round.profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StakingPolicy;
    use proptest::prelude::{prop_assert, proptest};

    fn params(policy: StakingPolicy) -> SequenceParameters {
        SequenceParameters {
            initial_stake: 10.0,
            payout_multiplier: 2.0,
            max_rounds: 5,
            stop_loss: 0.0,
            policy,
        }
    }

    #[test]
    fn martingale_exposure_grows_geometrically() {
        let exposure =
            losing_streak_exposure(&params(StakingPolicy::Martingale), 4).expect("valid");

        assert_eq!(exposure.streak_len, 4);
        assert_eq!(exposure.final_stake, 80.0);
        assert_eq!(exposure.total_staked, 150.0);
        assert_eq!(exposure.profit, -150.0);
    }

    #[test]
    fn exposure_ignores_stop_loss_and_clamps_length() {
        let mut p = params(StakingPolicy::DAlembert);
        p.stop_loss = 1.0;
        let exposure = losing_streak_exposure(&p, 120).expect("valid");

        assert_eq!(exposure.streak_len, MAX_ROUNDS);
        assert_eq!(exposure.final_stake, 500.0);
    }

    #[test]
    fn exposure_rejects_empty_streak() {
        assert!(losing_streak_exposure(&params(StakingPolicy::Martingale), 0).is_err());
    }

    #[test]
    fn bankroll_solver_finds_longest_covered_streak() {
        let result =
            max_survivable_streak(&params(StakingPolicy::Martingale), 70.0).expect("valid");

        assert_eq!(result.max_streak, 3);
        assert_eq!(result.next_stake, Some(80.0));
        assert_eq!(result.exposure.map(|e| e.total_staked), Some(70.0));
        assert!(!result.capped);
        assert!(result.message.contains("3 consecutive"));
    }

    #[test]
    fn bankroll_below_first_stake_covers_nothing() {
        let result =
            max_survivable_streak(&params(StakingPolicy::Martingale), 5.0).expect("valid");

        assert_eq!(result.max_streak, 0);
        assert!(result.exposure.is_none());
        assert_eq!(result.next_stake, Some(10.0));
    }

    #[test]
    fn flat_loss_policy_is_capped_at_round_ceiling() {
        let result =
            max_survivable_streak(&params(StakingPolicy::AntiMartingale), 1_000.0).expect("valid");

        assert_eq!(result.max_streak, MAX_ROUNDS);
        assert!(result.capped);
        assert!(result.next_stake.is_none());
    }

    #[test]
    fn bankroll_must_be_positive() {
        assert!(max_survivable_streak(&params(StakingPolicy::Martingale), 0.0).is_err());
        assert!(max_survivable_streak(&params(StakingPolicy::Martingale), f64::NAN).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_solved_streak_fits_and_next_does_not(
            bankroll in 1u32..1_000_000,
            policy_idx in 0usize..3
        ) {
            let policy = [
                StakingPolicy::Martingale,
                StakingPolicy::AntiMartingale,
                StakingPolicy::DAlembert,
            ][policy_idx];
            let p = params(policy);
            let bankroll = bankroll as f64;
            let result = max_survivable_streak(&p, bankroll).unwrap();

            if let Some(exposure) = result.exposure {
                prop_assert!(exposure.total_staked <= bankroll + BANKROLL_EPS);
            }
            if let Some(next) = result.next_stake {
                let spent = result.exposure.map(|e| e.total_staked).unwrap_or(0.0);
                prop_assert!(spent + next > bankroll);
            }
        }
    }
}
