use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundOutcome {
    Win,
    Loss,
}

impl RoundOutcome {
    pub fn flipped(self) -> Self {
        match self {
            RoundOutcome::Win => RoundOutcome::Loss,
            RoundOutcome::Loss => RoundOutcome::Win,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakingPolicy {
    Martingale,
    AntiMartingale,
    DAlembert,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceParameters {
    pub initial_stake: f64,
    pub payout_multiplier: f64,
    pub max_rounds: u32,
    /// Zero disables the stop-loss.
    pub stop_loss: f64,
    pub policy: StakingPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round_index: u32,
    pub stake: f64,
    pub cumulative_staked: f64,
    pub profit: f64,
    pub outcome: RoundOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceStatistics {
    pub total_staked: f64,
    pub final_profit: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakExposure {
    pub streak_len: u32,
    pub final_stake: f64,
    pub total_staked: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSolveResult {
    pub bankroll: f64,
    pub max_streak: u32,
    pub exposure: Option<StreakExposure>,
    pub next_stake: Option<f64>,
    pub capped: bool,
    pub message: String,
}
