use tracing::debug;

use super::error::{CalcError, ensure_non_negative, ensure_positive};
use super::types::{
    RoundOutcome, RoundResult, SequenceParameters, SequenceStatistics, StakingPolicy,
};

/// Hard ceiling on rounds per sequence. Requests above it are clamped.
pub const MAX_ROUNDS: u32 = 50;

pub fn compute_sequence(
    params: &SequenceParameters,
    outcomes: &[RoundOutcome],
) -> Result<Vec<RoundResult>, CalcError> {
    validate_parameters(params)?;
    let rounds = effective_rounds(params.max_rounds) as usize;
    run_rounds(
        params,
        rounds,
        |idx| outcomes.get(idx).copied().unwrap_or(RoundOutcome::Win),
        true,
    )
}

/// Flips one round and re-derives the whole sequence from round 1.
///
/// The recompute keeps the length of `existing`; stop-loss truncation only
/// applies to the initial computation.
pub fn override_outcome(
    existing: &[RoundResult],
    round_index: u32,
    params: &SequenceParameters,
) -> Result<Vec<RoundResult>, CalcError> {
    validate_parameters(params)?;
    if round_index == 0 || round_index as usize > existing.len() {
        return Err(CalcError::OutOfRange {
            round_index,
            len: existing.len(),
        });
    }

    let flip_idx = (round_index - 1) as usize;
    let outcomes = existing
        .iter()
        .enumerate()
        .map(|(idx, round)| {
            if idx == flip_idx {
                round.outcome.flipped()
            } else {
                round.outcome
            }
        })
        .collect::<Vec<_>>();

    debug!(
        round_index,
        rounds = outcomes.len(),
        outcome = ?outcomes[flip_idx],
        "recomputing sequence after outcome override"
    );

    run_rounds(params, outcomes.len(), |idx| outcomes[idx], false)
}

pub fn compute_statistics(sequence: &[RoundResult]) -> SequenceStatistics {
    let Some(last) = sequence.last() else {
        return SequenceStatistics {
            total_staked: 0.0,
            final_profit: 0.0,
            max_drawdown: 0.0,
        };
    };

    let max_drawdown = sequence
        .iter()
        .map(|round| round.profit)
        .fold(0.0_f64, f64::min);

    SequenceStatistics {
        total_staked: last.cumulative_staked,
        final_profit: last.profit,
        max_drawdown,
    }
}

pub fn validate_parameters(params: &SequenceParameters) -> Result<(), CalcError> {
    ensure_positive("initial stake", params.initial_stake)?;
    if round_cents(params.initial_stake) <= 0.0 {
        return Err(CalcError::InvalidParameter(
            "initial stake must be at least 0.01".to_string(),
        ));
    }

    ensure_positive("payout multiplier", params.payout_multiplier)?;
    if params.payout_multiplier <= 1.0 {
        return Err(CalcError::InvalidParameter(
            "payout multiplier must be > 1".to_string(),
        ));
    }

    if params.max_rounds == 0 {
        return Err(CalcError::InvalidParameter(
            "max rounds must be >= 1".to_string(),
        ));
    }

    ensure_non_negative("stop loss", params.stop_loss)
}

pub fn effective_rounds(requested: u32) -> u32 {
    requested.min(MAX_ROUNDS)
}

/// Stake for the round following a round staked at `previous_stake`.
pub fn next_stake(
    params: &SequenceParameters,
    previous_stake: f64,
    previous_outcome: RoundOutcome,
) -> f64 {
    let base = params.initial_stake;
    match (params.policy, previous_outcome) {
        (StakingPolicy::Martingale, RoundOutcome::Loss) => previous_stake * 2.0,
        (StakingPolicy::Martingale, RoundOutcome::Win) => base,
        (StakingPolicy::AntiMartingale, RoundOutcome::Win) => {
            previous_stake * params.payout_multiplier
        }
        (StakingPolicy::AntiMartingale, RoundOutcome::Loss) => base,
        (StakingPolicy::DAlembert, RoundOutcome::Loss) => previous_stake + base,
        (StakingPolicy::DAlembert, RoundOutcome::Win) => (previous_stake - base).max(base),
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_profit(params: &SequenceParameters, stake: f64, outcome: RoundOutcome) -> f64 {
    match outcome {
        RoundOutcome::Win => stake * (params.payout_multiplier - 1.0),
        RoundOutcome::Loss => -stake,
    }
}

/// Checked before each round against the profit carried in from the
/// previous round only; the upcoming stake plays no part.
fn stop_loss_reached(stop_loss: f64, profit: f64) -> bool {
    stop_loss > 0.0 && profit.abs() >= stop_loss
}

fn run_rounds(
    params: &SequenceParameters,
    rounds: usize,
    outcome_at: impl Fn(usize) -> RoundOutcome,
    enforce_stop_loss: bool,
) -> Result<Vec<RoundResult>, CalcError> {
    let mut results: Vec<RoundResult> = Vec::with_capacity(rounds);
    let mut stake = params.initial_stake;
    let mut cumulative = 0.0;
    let mut profit = 0.0;

    for idx in 0..rounds {
        if let Some(prev) = results.last() {
            stake = next_stake(params, stake, prev.outcome);
        }
        stake = round_cents(stake);
        if !stake.is_finite() {
            return Err(CalcError::InvalidParameter(format!(
                "stake overflowed at round {}; lower the payout multiplier or round count",
                idx + 1
            )));
        }

        if enforce_stop_loss && stop_loss_reached(params.stop_loss, profit) {
            debug!(
                round = idx + 1,
                profit,
                stake,
                stop_loss = params.stop_loss,
                "stop-loss reached before round"
            );
            break;
        }

        let outcome = outcome_at(idx);
        cumulative += stake;
        profit = round_cents(profit + round_profit(params, stake, outcome));

        results.push(RoundResult {
            round_index: idx as u32 + 1,
            stake,
            cumulative_staked: cumulative,
            profit,
            outcome,
        });
    }

    Ok(results)
}
