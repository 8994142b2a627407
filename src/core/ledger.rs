use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::error::LedgerError;

const CSV_HEADER: [&str; 3] = ["stake", "odds", "result"];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    #[serde(alias = "loss")]
    Lose,
    Win,
}

impl BetResult {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "win" => Some(BetResult::Win),
            "lose" => Some(BetResult::Lose),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            BetResult::Win => "win",
            BetResult::Lose => "lose",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetEntry {
    pub stake: f64,
    pub odds: f64,
    pub result: BetResult,
}

impl BetEntry {
    pub fn new(stake: f64, odds: f64, result: BetResult) -> Result<Self, LedgerError> {
        if !stake.is_finite() || stake <= 0.0 {
            return Err(LedgerError::InvalidEntry("stake must be > 0".to_string()));
        }
        if !odds.is_finite() || odds <= 1.0 {
            return Err(LedgerError::InvalidEntry("odds must be > 1".to_string()));
        }
        Ok(Self {
            stake,
            odds,
            result,
        })
    }

    pub fn profit(&self) -> f64 {
        match self.result {
            BetResult::Win => self.stake * (self.odds - 1.0),
            BetResult::Lose => -self.stake,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub bets: usize,
    pub total_staked: f64,
    pub total_profit: f64,
    pub roi_pct: f64,
    pub win_count: usize,
    pub win_rate_pct: f64,
}

pub fn summarize_ledger(entries: &[BetEntry]) -> LedgerSummary {
    let total_staked: f64 = entries.iter().map(|e| e.stake).sum();
    let total_profit: f64 = entries.iter().map(BetEntry::profit).sum();
    let win_count = entries
        .iter()
        .filter(|e| e.result == BetResult::Win)
        .count();

    LedgerSummary {
        bets: entries.len(),
        total_staked,
        total_profit,
        roi_pct: if total_staked > 0.0 {
            total_profit / total_staked * 100.0
        } else {
            0.0
        },
        win_count,
        win_rate_pct: if entries.is_empty() {
            0.0
        } else {
            win_count as f64 / entries.len() as f64 * 100.0
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    stake: String,
    odds: String,
    result: String,
}

impl CsvRow {
    fn into_entry(self) -> Option<BetEntry> {
        let stake = parse_decimal(&self.stake)?;
        let odds = parse_decimal(&self.odds)?;
        let result = BetResult::parse(&self.result)?;
        BetEntry::new(stake, odds, result).ok()
    }
}

/// Accepts both `2.5` and `2,5`.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

/// Reads a `stake,odds,result` CSV. Any invalid row rejects the whole import
/// and reports every offending line number (header is line 1).
pub fn parse_csv<R: Read>(input: R) -> Result<Vec<BetEntry>, LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut entries = Vec::new();
    let mut bad_lines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);
        let entry = record
            .deserialize::<CsvRow>(Some(&headers))
            .ok()
            .and_then(CsvRow::into_entry);
        match entry {
            Some(entry) => entries.push(entry),
            None => bad_lines.push(line),
        }
    }

    if !bad_lines.is_empty() {
        return Err(LedgerError::InvalidRows(bad_lines));
    }
    Ok(entries)
}

pub fn write_csv<W: Write>(output: W, entries: &[BetEntry]) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(CSV_HEADER)?;
    for entry in entries {
        writer.write_record([
            entry.stake.to_string(),
            entry.odds.to_string(),
            entry.result.as_str().to_string(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
