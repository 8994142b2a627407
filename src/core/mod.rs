mod engine;
mod error;
pub mod finance;
pub mod ledger;
mod solver;
mod types;
pub mod wallet;

pub use engine::{
    MAX_ROUNDS, compute_sequence, compute_statistics, next_stake, override_outcome, round_cents,
    validate_parameters,
};
pub use error::{CalcError, LedgerError};
pub use solver::{losing_streak_exposure, max_survivable_streak};
pub use types::{
    RoundOutcome, RoundResult, SequenceParameters, SequenceStatistics, StakingPolicy,
    StreakExposure, StreakSolveResult,
};
