//! Aggregation over wallet records. Storage of the records lives with the
//! remote wallet service; everything here is recomputed from the slices
//! handed in.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuaranteedIncome {
    #[serde(default)]
    pub source: String,
    pub amount: f64,
    pub frequency: IncomeFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHolding {
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub current_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPerformance {
    pub profit: f64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub monthly_guaranteed_income: f64,
    pub investments_yield: f64,
    pub daily: Vec<DailyFlow>,
}

/// Monthly equivalent using the fixed 30-day / 4-week month.
pub fn monthly_equivalent(income: &GuaranteedIncome) -> f64 {
    match income.frequency {
        IncomeFrequency::Daily => income.amount * 30.0,
        IncomeFrequency::Weekly => income.amount * 4.0,
        IncomeFrequency::Monthly => income.amount,
        IncomeFrequency::Yearly => income.amount / 12.0,
    }
}

pub fn holding_performance(holding: &StockHolding) -> HoldingPerformance {
    let delta = holding.current_price - holding.purchase_price;
    let percent_change = if holding.purchase_price == 0.0 {
        0.0
    } else {
        delta / holding.purchase_price * 100.0
    };
    HoldingPerformance {
        profit: delta * holding.quantity,
        percent_change,
    }
}

pub fn summarize_wallet(
    transactions: &[Transaction],
    incomes: &[GuaranteedIncome],
    holdings: &[StockHolding],
) -> WalletSummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut by_day: BTreeMap<NaiveDate, DailyFlow> = BTreeMap::new();

    for tx in transactions {
        let day = by_day.entry(tx.date).or_insert(DailyFlow {
            date: tx.date,
            income: 0.0,
            expenses: 0.0,
        });
        match tx.kind {
            TransactionKind::Income => {
                total_income += tx.amount;
                day.income += tx.amount;
            }
            TransactionKind::Expense => {
                total_expenses += tx.amount;
                day.expenses += tx.amount;
            }
        }
    }

    WalletSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        monthly_guaranteed_income: incomes.iter().map(monthly_equivalent).sum(),
        investments_yield: holdings
            .iter()
            .map(|holding| holding_performance(holding).profit)
            .sum(),
        daily: by_day.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn tx(kind: TransactionKind, amount: f64, day: u32) -> Transaction {
        Transaction {
            kind,
            category: "General".to_string(),
            amount,
            date: date(2026, 3, day),
        }
    }

    #[test]
    fn monthly_equivalent_uses_fixed_month_lengths() {
        let income = |amount, frequency| GuaranteedIncome {
            source: "job".to_string(),
            amount,
            frequency,
        };
        assert_approx(monthly_equivalent(&income(10.0, IncomeFrequency::Daily)), 300.0);
        assert_approx(monthly_equivalent(&income(100.0, IncomeFrequency::Weekly)), 400.0);
        assert_approx(monthly_equivalent(&income(900.0, IncomeFrequency::Monthly)), 900.0);
        assert_approx(monthly_equivalent(&income(1_200.0, IncomeFrequency::Yearly)), 100.0);
    }

    #[test]
    fn holding_performance_handles_zero_purchase_price() {
        let holding = StockHolding {
            symbol: "GIFT".to_string(),
            quantity: 3.0,
            purchase_price: 0.0,
            current_price: 5.0,
        };
        let perf = holding_performance(&holding);
        assert_approx(perf.profit, 15.0);
        assert_eq!(perf.percent_change, 0.0);
    }

    #[test]
    fn summary_groups_cash_flow_by_day_in_date_order() {
        let transactions = vec![
            tx(TransactionKind::Expense, 40.0, 5),
            tx(TransactionKind::Income, 1_000.0, 1),
            tx(TransactionKind::Expense, 60.0, 1),
            tx(TransactionKind::Income, 25.0, 5),
        ];
        let holdings = vec![StockHolding {
            symbol: "ACME".to_string(),
            quantity: 10.0,
            purchase_price: 50.0,
            current_price: 45.0,
        }];
        let incomes = vec![GuaranteedIncome {
            source: "rent".to_string(),
            amount: 600.0,
            frequency: IncomeFrequency::Monthly,
        }];

        let summary = summarize_wallet(&transactions, &incomes, &holdings);

        assert_approx(summary.total_income, 1_025.0);
        assert_approx(summary.total_expenses, 100.0);
        assert_approx(summary.balance, 925.0);
        assert_approx(summary.monthly_guaranteed_income, 600.0);
        assert_approx(summary.investments_yield, -50.0);
        assert_eq!(summary.daily.len(), 2);
        assert_eq!(summary.daily[0].date, date(2026, 3, 1));
        assert_approx(summary.daily[0].income, 1_000.0);
        assert_approx(summary.daily[0].expenses, 60.0);
        assert_approx(summary.daily[1].income, 25.0);
    }

    #[test]
    fn transaction_json_uses_type_key() {
        let json = r#"{"type":"expense","category":"Food","amount":12.5,"date":"2026-03-02"}"#;
        let parsed: Transaction = serde_json::from_str(json).expect("valid json");
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.date, date(2026, 3, 2));
    }
}
