use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

use stakeplan::api::{
    self, CompoundArgs, DividendArgs, LoanArgs, SequenceArgs, SequenceResponse, StockGrowthArgs,
    StreakArgs,
};
use stakeplan::core::ledger::{parse_csv, summarize_ledger, write_csv};

#[derive(Parser)]
#[command(
    name = "stakeplan",
    about = "Staking-progression, loan and investment calculators"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
    /// Print the round-by-round staking sequence
    Sequence {
        #[command(flatten)]
        args: SequenceArgs,
        /// Flip the outcome of this round (1-based) and recompute; repeatable
        #[arg(long)]
        flip: Vec<u32>,
    },
    /// Longest losing streak a bankroll can fund
    Streak {
        #[command(flatten)]
        args: StreakArgs,
    },
    /// Monthly payment, amortization and progress of a loan
    Loan {
        #[command(flatten)]
        args: LoanArgs,
        /// Print every row of the amortization schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Compound growth with monthly contributions
    Compound {
        #[command(flatten)]
        args: CompoundArgs,
    },
    /// Dividend income per period
    Dividend {
        #[command(flatten)]
        args: DividendArgs,
    },
    /// Annualised growth of a stock position
    StockGrowth {
        #[command(flatten)]
        args: StockGrowthArgs,
    },
    /// Summarise a stake,odds,result CSV ledger
    Ledger {
        path: PathBuf,
        /// Write the validated entries back out as a clean CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => {
            info!(port, "starting stakeplan");
            api::run_http_server(port)
                .await
                .context("HTTP server failed")?;
        }
        Command::Sequence { args, flip } => {
            let response = if flip.is_empty() {
                api::run_sequence(&args)
            } else {
                api::run_override(&args, &flip)
            }
            .map_err(|e| anyhow!(e))?;
            print_sequence(&response);
        }
        Command::Streak { args } => {
            let response = api::run_streak(&args).map_err(|e| anyhow!(e))?;
            let result = &response.solve;
            println!("{}", result.message);
            if let Some(exposure) = result.exposure {
                println!(
                    "Last covered stake: {:.2}  total staked: {:.2}",
                    exposure.final_stake, exposure.total_staked
                );
            }
            if let Some(next) = result.next_stake {
                println!("Next stake would be: {next:.2}");
            }
            if let Some(requested) = &response.requested {
                println!(
                    "{} losses in a row: last stake {:.2}, total staked {:.2}",
                    requested.streak_len, requested.final_stake, requested.total_staked
                );
            }
        }
        Command::Loan { args, schedule } => {
            let loan = api::run_loan(&args).map_err(|e| anyhow!(e))?;
            println!("Monthly payment: {:.2}", loan.monthly_payment);
            println!("Total payments:  {:.2}", loan.total_payments);
            println!("Total interest:  {:.2}", loan.total_interest);
            if let Some(progress) = &loan.progress {
                println!(
                    "Paid {:.2} over {} months, {:.2} remaining, next payment {}",
                    progress.paid_amount,
                    progress.months_passed,
                    progress.remaining_amount,
                    progress.next_payment_date
                );
            }
            if schedule {
                println!(
                    "{:>5} {:>12} {:>12} {:>12} {:>14}",
                    "month", "payment", "interest", "principal", "balance"
                );
                for row in &loan.schedule {
                    println!(
                        "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.month, row.payment, row.interest, row.principal, row.balance
                    );
                }
            }
        }
        Command::Compound { args } => {
            let projection = api::run_compound(&args).map_err(|e| anyhow!(e))?;
            for (year, balance) in projection.yearly_balances.iter().enumerate() {
                println!("year {:>3}: {balance:>14.2}", year + 1);
            }
            println!("Future value:        {:.2}", projection.future_value);
            println!("Total contributions: {:.2}", projection.total_contributions);
            println!("Total interest:      {:.2}", projection.total_interest);
        }
        Command::Dividend { args } => {
            let income = api::run_dividend(&args).map_err(|e| anyhow!(e))?;
            println!("Annual income:   {:.2}", income.annual_income);
            println!("Periodic income: {:.2}", income.periodic_income);
        }
        Command::StockGrowth { args } => {
            let growth = api::run_stock_growth(&args).map_err(|e| anyhow!(e))?;
            println!("Initial value: {:.2}", growth.initial_value);
            println!("Final value:   {:.2}", growth.final_value);
            println!("Profit:        {:.2}", growth.profit);
            println!("Annual growth: {:.2}%", growth.annual_growth_pct);
        }
        Command::Ledger { path, export } => {
            let file =
                File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            let entries = parse_csv(file)?;
            if let Some(out) = export {
                let file =
                    File::create(&out).with_context(|| format!("creating {}", out.display()))?;
                write_csv(file, &entries)?;
                info!(path = %out.display(), entries = entries.len(), "ledger exported");
            }
            let summary = summarize_ledger(&entries);
            println!("Bets:         {}", summary.bets);
            println!("Total staked: {:.2}", summary.total_staked);
            println!("Total profit: {:.2}", summary.total_profit);
            println!("ROI:          {:.2}%", summary.roi_pct);
            println!(
                "Win rate:     {:.2}% ({} wins)",
                summary.win_rate_pct, summary.win_count
            );
        }
    }

    Ok(())
}

fn print_sequence(response: &SequenceResponse) {
    println!(
        "{:>5} {:>12} {:>14} {:>12} {:>8}",
        "round", "stake", "cumulative", "profit", "outcome"
    );
    for round in &response.rounds {
        let outcome = match round.outcome {
            stakeplan::core::RoundOutcome::Win => "win",
            stakeplan::core::RoundOutcome::Loss => "loss",
        };
        println!(
            "{:>5} {:>12.2} {:>14.2} {:>12.2} {:>8}",
            round.round_index, round.stake, round.cumulative_staked, round.profit, outcome
        );
    }
    let stats = &response.statistics;
    println!(
        "total staked {:.2}, final profit {:.2}, max drawdown {:.2}",
        stats.total_staked, stats.final_profit, stats.max_drawdown
    );
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stakeplan=info"));

    if std::env::var("STAKEPLAN_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
