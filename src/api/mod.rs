use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::finance::{
    AmortizationRow, CompoundProjection, DividendFrequency, DividendIncome, LoanProgress,
    LoanTerms, StockGrowth, amortization_schedule, compound_projection, dividend_income,
    loan_progress, monthly_payment, stock_growth, total_payments,
};
use crate::core::ledger::{BetEntry, parse_csv, summarize_ledger, write_csv};
use crate::core::wallet::{
    GuaranteedIncome, StockHolding, Transaction, WalletSummary, summarize_wallet,
};
use crate::core::{
    MAX_ROUNDS, RoundOutcome, RoundResult, SequenceParameters, SequenceStatistics,
    StakingPolicy, StreakExposure, StreakSolveResult, compute_sequence, compute_statistics,
    losing_streak_exposure, max_survivable_streak, override_outcome,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStakingPolicy {
    Martingale,
    AntiMartingale,
    DAlembert,
}

impl From<CliStakingPolicy> for StakingPolicy {
    fn from(value: CliStakingPolicy) -> Self {
        match value {
            CliStakingPolicy::Martingale => StakingPolicy::Martingale,
            CliStakingPolicy::AntiMartingale => StakingPolicy::AntiMartingale,
            CliStakingPolicy::DAlembert => StakingPolicy::DAlembert,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliOutcome {
    #[value(alias = "w")]
    Win,
    #[value(alias = "l", alias = "lose")]
    Loss,
}

impl From<CliOutcome> for RoundOutcome {
    fn from(value: CliOutcome) -> Self {
        match value {
            CliOutcome::Win => RoundOutcome::Win,
            CliOutcome::Loss => RoundOutcome::Loss,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliDividendFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl From<CliDividendFrequency> for DividendFrequency {
    fn from(value: CliDividendFrequency) -> Self {
        match value {
            CliDividendFrequency::Monthly => DividendFrequency::Monthly,
            CliDividendFrequency::Quarterly => DividendFrequency::Quarterly,
            CliDividendFrequency::Annually => DividendFrequency::Annually,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStakingPolicy {
    Martingale,
    #[serde(alias = "antiMartingale", alias = "anti_martingale")]
    AntiMartingale,
    #[serde(alias = "dAlembert", alias = "d_alembert", alias = "dalembert")]
    DAlembert,
}

impl From<ApiStakingPolicy> for CliStakingPolicy {
    fn from(value: ApiStakingPolicy) -> Self {
        match value {
            ApiStakingPolicy::Martingale => CliStakingPolicy::Martingale,
            ApiStakingPolicy::AntiMartingale => CliStakingPolicy::AntiMartingale,
            ApiStakingPolicy::DAlembert => CliStakingPolicy::DAlembert,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiOutcome {
    #[serde(alias = "w")]
    Win,
    #[serde(alias = "l", alias = "lose")]
    Loss,
}

impl From<ApiOutcome> for CliOutcome {
    fn from(value: ApiOutcome) -> Self {
        match value {
            ApiOutcome::Win => CliOutcome::Win,
            ApiOutcome::Loss => CliOutcome::Loss,
        }
    }
}

/// Outcomes arrive as a JSON array, or as `w,l,w` in a query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OutcomeInput {
    List(Vec<ApiOutcome>),
    Delimited(String),
}

impl OutcomeInput {
    fn into_cli(self) -> Result<Vec<CliOutcome>, String> {
        match self {
            OutcomeInput::List(items) => Ok(items.into_iter().map(Into::into).collect()),
            OutcomeInput::Delimited(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| {
                    CliOutcome::from_str(token, true)
                        .map_err(|_| format!("outcomes: unknown outcome '{token}'"))
                })
                .collect(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiDividendFrequency {
    Monthly,
    Quarterly,
    #[serde(alias = "yearly", alias = "annual")]
    Annually,
}

impl From<ApiDividendFrequency> for CliDividendFrequency {
    fn from(value: ApiDividendFrequency) -> Self {
        match value {
            ApiDividendFrequency::Monthly => CliDividendFrequency::Monthly,
            ApiDividendFrequency::Quarterly => CliDividendFrequency::Quarterly,
            ApiDividendFrequency::Annually => CliDividendFrequency::Annually,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SequenceArgs {
    #[arg(long, default_value_t = 10.0, help = "Stake placed in the first round")]
    pub initial_stake: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Payout multiplier (decimal odds) applied to winning stakes, must be > 1"
    )]
    pub payout: f64,
    #[arg(long, default_value_t = 5, help = "Rounds to play, capped at 50")]
    pub rounds: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Stop once the running profit or loss reaches this size; 0 disables"
    )]
    pub stop_loss: f64,
    #[arg(long, value_enum, default_value_t = CliStakingPolicy::Martingale)]
    pub policy: CliStakingPolicy,
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        help = "Per-round outcomes, e.g. w,l,l,w; missing rounds count as wins"
    )]
    pub outcomes: Vec<CliOutcome>,
}

impl Default for SequenceArgs {
    fn default() -> Self {
        Self {
            initial_stake: 10.0,
            payout: 2.0,
            rounds: 5,
            stop_loss: 0.0,
            policy: CliStakingPolicy::Martingale,
            outcomes: Vec::new(),
        }
    }
}

/// Inputs for the bankroll solver. Losses run to the round ceiling with
/// stop-loss disabled, so round count and outcomes are not taken.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct StreakArgs {
    #[arg(long, default_value_t = 10.0, help = "Stake placed in the first round")]
    pub initial_stake: f64,
    #[arg(long, default_value_t = 2.0, help = "Payout multiplier, must be > 1")]
    pub payout: f64,
    #[arg(long, value_enum, default_value_t = CliStakingPolicy::Martingale)]
    pub policy: CliStakingPolicy,
    #[arg(long, default_value_t = 1_000.0, help = "Money available to fund the losses")]
    pub bankroll: f64,
    #[arg(long, help = "Also report the exposure of exactly this many losses")]
    pub length: Option<u32>,
}

impl Default for StreakArgs {
    fn default() -> Self {
        Self {
            initial_stake: 10.0,
            payout: 2.0,
            policy: CliStakingPolicy::Martingale,
            bankroll: 1_000.0,
            length: None,
        }
    }
}

impl StreakArgs {
    fn sequence_args(&self) -> SequenceArgs {
        SequenceArgs {
            initial_stake: self.initial_stake,
            payout: self.payout,
            rounds: MAX_ROUNDS,
            stop_loss: 0.0,
            policy: self.policy,
            outcomes: Vec::new(),
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct LoanArgs {
    #[arg(long, default_value_t = 100_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 10.0, help = "Annual interest rate in percent")]
    pub rate: f64,
    #[arg(long, default_value_t = 5, help = "Loan term in years")]
    pub years: u32,
    #[arg(long, help = "First day of the loan (YYYY-MM-DD); enables progress tracking")]
    pub start_date: Option<NaiveDate>,
    #[arg(long, help = "Evaluation date for progress, defaults to the local date")]
    pub today: Option<NaiveDate>,
}

impl Default for LoanArgs {
    fn default() -> Self {
        Self {
            principal: 100_000.0,
            rate: 10.0,
            years: 5,
            start_date: None,
            today: None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CompoundArgs {
    #[arg(long, default_value_t = 1_000.0)]
    pub initial_amount: f64,
    #[arg(long, default_value_t = 100.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 7.0, help = "Annual return in percent")]
    pub rate: f64,
    #[arg(long, default_value_t = 10)]
    pub years: u32,
}

impl Default for CompoundArgs {
    fn default() -> Self {
        Self {
            initial_amount: 1_000.0,
            monthly_contribution: 100.0,
            rate: 7.0,
            years: 10,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct DividendArgs {
    #[arg(long, default_value_t = 100.0)]
    pub shares: f64,
    #[arg(long, default_value_t = 0.5, help = "Annual dividend per share")]
    pub dividend_per_share: f64,
    #[arg(long, value_enum, default_value_t = CliDividendFrequency::Quarterly)]
    pub frequency: CliDividendFrequency,
}

impl Default for DividendArgs {
    fn default() -> Self {
        Self {
            shares: 100.0,
            dividend_per_share: 0.5,
            frequency: CliDividendFrequency::Quarterly,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct StockGrowthArgs {
    #[arg(long, default_value_t = 100.0)]
    pub initial_price: f64,
    #[arg(long, default_value_t = 150.0)]
    pub final_price: f64,
    #[arg(long, default_value_t = 10.0)]
    pub shares: f64,
    #[arg(long, default_value_t = 5.0, help = "Holding period in years")]
    pub years: f64,
}

impl Default for StockGrowthArgs {
    fn default() -> Self {
        Self {
            initial_price: 100.0,
            final_price: 150.0,
            shares: 10.0,
            years: 5.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SequencePayload {
    #[serde(alias = "initialBet")]
    initial_stake: Option<f64>,
    #[serde(alias = "payoutMultiplier")]
    payout: Option<f64>,
    #[serde(alias = "maxRounds")]
    rounds: Option<u32>,
    stop_loss: Option<f64>,
    #[serde(alias = "method")]
    policy: Option<ApiStakingPolicy>,
    outcomes: Option<OutcomeInput>,

    round_index: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StreakPayload {
    #[serde(alias = "initialBet")]
    initial_stake: Option<f64>,
    #[serde(alias = "payoutMultiplier")]
    payout: Option<f64>,
    #[serde(alias = "method")]
    policy: Option<ApiStakingPolicy>,
    bankroll: Option<f64>,
    #[serde(alias = "length")]
    streak_length: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    principal: Option<f64>,
    #[serde(alias = "interestRate")]
    annual_rate: Option<f64>,
    term_years: Option<u32>,
    start_date: Option<NaiveDate>,
    today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompoundPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DividendPayload {
    shares: Option<f64>,
    dividend_per_share: Option<f64>,
    frequency: Option<ApiDividendFrequency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StockGrowthPayload {
    initial_price: Option<f64>,
    final_price: Option<f64>,
    shares: Option<f64>,
    years: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WalletPayload {
    transactions: Vec<Transaction>,
    #[serde(alias = "incomes")]
    guaranteed_incomes: Vec<GuaranteedIncome>,
    #[serde(alias = "holdings")]
    stocks: Vec<StockHolding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LedgerPayload {
    entries: Vec<BetEntry>,
}

#[derive(Debug)]
struct SequenceRequest {
    args: SequenceArgs,
    round_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceResponse {
    pub policy: StakingPolicy,
    pub initial_stake: f64,
    pub payout: f64,
    pub max_rounds: u32,
    pub stop_loss: f64,
    pub rounds: Vec<RoundResult>,
    pub statistics: SequenceStatistics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    #[serde(flatten)]
    pub solve: StreakSolveResult,
    pub requested: Option<StreakExposure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub monthly_payment: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationRow>,
    pub progress: Option<LoanProgress>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn build_sequence_params(args: &SequenceArgs) -> Result<SequenceParameters, String> {
    if args.rounds == 0 {
        return Err("--rounds must be >= 1".to_string());
    }
    if !args.payout.is_finite() || args.payout <= 1.0 {
        return Err("--payout must be > 1".to_string());
    }
    if !args.initial_stake.is_finite() || args.initial_stake <= 0.0 {
        return Err("--initial-stake must be > 0".to_string());
    }
    if !args.stop_loss.is_finite() || args.stop_loss < 0.0 {
        return Err("--stop-loss must be >= 0".to_string());
    }

    let params = SequenceParameters {
        initial_stake: args.initial_stake,
        payout_multiplier: args.payout,
        max_rounds: args.rounds,
        stop_loss: args.stop_loss,
        policy: args.policy.into(),
    };
    crate::core::validate_parameters(&params).map_err(|e| e.to_string())?;
    Ok(params)
}

fn sequence_outcomes(args: &SequenceArgs) -> Vec<RoundOutcome> {
    args.outcomes.iter().map(|&o| o.into()).collect()
}

pub fn run_sequence(args: &SequenceArgs) -> Result<SequenceResponse, String> {
    let params = build_sequence_params(args)?;
    let rounds = compute_sequence(&params, &sequence_outcomes(args)).map_err(|e| e.to_string())?;
    Ok(sequence_response(&params, rounds))
}

/// Computes the sequence, then flips each listed round in order.
pub fn run_override(args: &SequenceArgs, flips: &[u32]) -> Result<SequenceResponse, String> {
    let params = build_sequence_params(args)?;
    let mut rounds =
        compute_sequence(&params, &sequence_outcomes(args)).map_err(|e| e.to_string())?;
    for &round_index in flips {
        rounds = override_outcome(&rounds, round_index, &params).map_err(|e| e.to_string())?;
    }
    Ok(sequence_response(&params, rounds))
}

pub fn run_streak(args: &StreakArgs) -> Result<StreakResponse, String> {
    let params = build_sequence_params(&args.sequence_args())?;
    if !args.bankroll.is_finite() || args.bankroll <= 0.0 {
        return Err("--bankroll must be > 0".to_string());
    }
    let solve = max_survivable_streak(&params, args.bankroll).map_err(|e| e.to_string())?;
    let requested = match args.length {
        Some(len) => Some(
            losing_streak_exposure(&params, len).map_err(|e| format!("--length: {e}"))?,
        ),
        None => None,
    };
    Ok(StreakResponse { solve, requested })
}

fn sequence_response(params: &SequenceParameters, rounds: Vec<RoundResult>) -> SequenceResponse {
    let statistics = compute_statistics(&rounds);
    SequenceResponse {
        policy: params.policy,
        initial_stake: params.initial_stake,
        payout: params.payout_multiplier,
        max_rounds: params.max_rounds.min(MAX_ROUNDS),
        stop_loss: params.stop_loss,
        rounds,
        statistics,
    }
}

pub fn run_loan(args: &LoanArgs) -> Result<LoanResponse, String> {
    let terms = LoanTerms {
        principal: args.principal,
        annual_rate_pct: args.rate,
        term_years: args.years,
    };
    let payment = monthly_payment(&terms).map_err(|e| e.to_string())?;
    let schedule = amortization_schedule(&terms).map_err(|e| e.to_string())?;
    let total_payments = total_payments(&terms).map_err(|e| e.to_string())?;

    let progress = match args.start_date {
        Some(start) => {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            Some(loan_progress(&terms, start, today).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    Ok(LoanResponse {
        monthly_payment: payment,
        total_payments,
        total_interest: total_payments - terms.principal,
        schedule,
        progress,
    })
}

pub fn run_compound(args: &CompoundArgs) -> Result<CompoundProjection, String> {
    compound_projection(
        args.initial_amount,
        args.monthly_contribution,
        args.rate,
        args.years,
    )
    .map_err(|e| e.to_string())
}

pub fn run_dividend(args: &DividendArgs) -> Result<DividendIncome, String> {
    dividend_income(args.shares, args.dividend_per_share, args.frequency.into())
        .map_err(|e| e.to_string())
}

pub fn run_stock_growth(args: &StockGrowthArgs) -> Result<StockGrowth, String> {
    stock_growth(args.initial_price, args.final_price, args.shares, args.years)
        .map_err(|e| e.to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/sequence",
            get(sequence_get_handler).post(sequence_post_handler),
        )
        .route("/api/sequence/override", post(override_handler))
        .route("/api/streak", post(streak_handler))
        .route("/api/loan", post(loan_handler))
        .route("/api/compound", post(compound_handler))
        .route("/api/dividend", post(dividend_handler))
        .route("/api/stock-growth", post(stock_growth_handler))
        .route("/api/wallet/summary", post(wallet_handler))
        .route("/api/ledger", post(ledger_handler))
        .route("/api/ledger/csv", post(ledger_csv_handler))
        .route("/api/ledger/export", post(ledger_export_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "stakeplan HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn sequence_get_handler(Query(payload): Query<SequencePayload>) -> Response {
    sequence_handler_impl(payload).await
}

async fn sequence_post_handler(Json(payload): Json<SequencePayload>) -> Response {
    sequence_handler_impl(payload).await
}

async fn sequence_handler_impl(payload: SequencePayload) -> Response {
    let result = sequence_request_from_payload(payload).and_then(|req| run_sequence(&req.args));
    respond("sequence", result)
}

async fn override_handler(Json(payload): Json<SequencePayload>) -> Response {
    let result = sequence_request_from_payload(payload).and_then(|req| {
        let round_index = req
            .round_index
            .ok_or_else(|| "roundIndex is required".to_string())?;
        run_override(&req.args, &[round_index])
    });
    respond("sequence/override", result)
}

async fn streak_handler(Json(payload): Json<StreakPayload>) -> Response {
    respond("streak", run_streak(&streak_args_from_payload(payload)))
}

async fn loan_handler(Json(payload): Json<LoanPayload>) -> Response {
    respond("loan", run_loan(&loan_args_from_payload(payload)))
}

async fn compound_handler(Json(payload): Json<CompoundPayload>) -> Response {
    respond("compound", run_compound(&compound_args_from_payload(payload)))
}

async fn dividend_handler(Json(payload): Json<DividendPayload>) -> Response {
    respond("dividend", run_dividend(&dividend_args_from_payload(payload)))
}

async fn stock_growth_handler(Json(payload): Json<StockGrowthPayload>) -> Response {
    respond(
        "stock-growth",
        run_stock_growth(&stock_growth_args_from_payload(payload)),
    )
}

async fn wallet_handler(Json(payload): Json<WalletPayload>) -> Response {
    respond("wallet/summary", wallet_summary_from_payload(&payload))
}

async fn ledger_handler(Json(payload): Json<LedgerPayload>) -> Response {
    let result = ledger_entries_from_payload(payload).map(|entries| summarize_ledger(&entries));
    respond("ledger", result)
}

async fn ledger_export_handler(Json(payload): Json<LedgerPayload>) -> Response {
    let result = ledger_entries_from_payload(payload).and_then(|entries| {
        let mut buf = Vec::new();
        write_csv(&mut buf, &entries).map_err(|e| e.to_string())?;
        String::from_utf8(buf).map_err(|e| e.to_string())
    });
    match result {
        Ok(body) => csv_response(body),
        Err(msg) => {
            warn!(route = "ledger/export", error = %msg, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn ledger_csv_handler(body: String) -> Response {
    let result = parse_csv(body.as_bytes())
        .map(|entries| summarize_ledger(&entries))
        .map_err(|e| e.to_string());
    respond("ledger/csv", result)
}

fn respond<T: Serialize>(route: &str, result: Result<T, String>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => {
            warn!(route, error = %msg, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn csv_response(body: String) -> Response {
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn sequence_request_from_payload(payload: SequencePayload) -> Result<SequenceRequest, String> {
    let mut args = SequenceArgs::default();

    if let Some(v) = payload.initial_stake {
        args.initial_stake = v;
    }
    if let Some(v) = payload.payout {
        args.payout = v;
    }
    if let Some(v) = payload.rounds {
        args.rounds = v;
    }
    if let Some(v) = payload.stop_loss {
        args.stop_loss = v;
    }
    if let Some(v) = payload.policy {
        args.policy = v.into();
    }
    if let Some(v) = payload.outcomes {
        args.outcomes = v.into_cli()?;
    }

    build_sequence_params(&args)?;
    Ok(SequenceRequest {
        args,
        round_index: payload.round_index,
    })
}

fn streak_args_from_payload(payload: StreakPayload) -> StreakArgs {
    let mut args = StreakArgs::default();
    if let Some(v) = payload.initial_stake {
        args.initial_stake = v;
    }
    if let Some(v) = payload.payout {
        args.payout = v;
    }
    if let Some(v) = payload.policy {
        args.policy = v.into();
    }
    if let Some(v) = payload.bankroll {
        args.bankroll = v;
    }
    args.length = payload.streak_length;
    args
}

fn loan_args_from_payload(payload: LoanPayload) -> LoanArgs {
    let mut args = LoanArgs::default();
    if let Some(v) = payload.principal {
        args.principal = v;
    }
    if let Some(v) = payload.annual_rate {
        args.rate = v;
    }
    if let Some(v) = payload.term_years {
        args.years = v;
    }
    args.start_date = payload.start_date;
    args.today = payload.today;
    args
}

fn compound_args_from_payload(payload: CompoundPayload) -> CompoundArgs {
    let mut args = CompoundArgs::default();
    if let Some(v) = payload.initial_amount {
        args.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate {
        args.rate = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    args
}

fn dividend_args_from_payload(payload: DividendPayload) -> DividendArgs {
    let mut args = DividendArgs::default();
    if let Some(v) = payload.shares {
        args.shares = v;
    }
    if let Some(v) = payload.dividend_per_share {
        args.dividend_per_share = v;
    }
    if let Some(v) = payload.frequency {
        args.frequency = v.into();
    }
    args
}

fn stock_growth_args_from_payload(payload: StockGrowthPayload) -> StockGrowthArgs {
    let mut args = StockGrowthArgs::default();
    if let Some(v) = payload.initial_price {
        args.initial_price = v;
    }
    if let Some(v) = payload.final_price {
        args.final_price = v;
    }
    if let Some(v) = payload.shares {
        args.shares = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    args
}

fn wallet_summary_from_payload(payload: &WalletPayload) -> Result<WalletSummary, String> {
    for (idx, tx) in payload.transactions.iter().enumerate() {
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(format!("transactions[{idx}].amount must be >= 0"));
        }
    }
    for (idx, income) in payload.guaranteed_incomes.iter().enumerate() {
        if !income.amount.is_finite() || income.amount < 0.0 {
            return Err(format!("guaranteedIncomes[{idx}].amount must be >= 0"));
        }
    }
    for (idx, stock) in payload.stocks.iter().enumerate() {
        if ![stock.quantity, stock.purchase_price, stock.current_price]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(format!("stocks[{idx}] values must be finite"));
        }
    }

    Ok(summarize_wallet(
        &payload.transactions,
        &payload.guaranteed_incomes,
        &payload.stocks,
    ))
}

fn ledger_entries_from_payload(payload: LedgerPayload) -> Result<Vec<BetEntry>, String> {
    payload
        .entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            BetEntry::new(entry.stake, entry.odds, entry.result)
                .map_err(|e| format!("entries[{idx}]: {e}"))
        })
        .collect()
}

#[cfg(test)]
fn sequence_request_from_json(json: &str) -> Result<SequenceRequest, String> {
    let payload = serde_json::from_str::<SequencePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    sequence_request_from_payload(payload)
}
