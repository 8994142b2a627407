use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::error::{CalcError, ensure_non_negative, ensure_positive};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual interest rate in percent, e.g. 12 for 12%.
    pub annual_rate_pct: f64,
    pub term_years: u32,
}

impl LoanTerms {
    fn validate(&self) -> Result<(), CalcError> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual rate", self.annual_rate_pct)?;
        if self.term_years == 0 {
            return Err(CalcError::InvalidParameter(
                "term years must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    fn months(&self) -> u32 {
        self.term_years * 12
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate_pct / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProgress {
    pub monthly_payment: f64,
    pub total_payments: f64,
    pub months_passed: u32,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub next_payment_date: NaiveDate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DividendFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl DividendFrequency {
    fn periods_per_year(self) -> f64 {
        match self {
            DividendFrequency::Monthly => 12.0,
            DividendFrequency::Quarterly => 4.0,
            DividendFrequency::Annually => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendIncome {
    pub frequency: DividendFrequency,
    pub annual_income: f64,
    pub periodic_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundProjection {
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub yearly_balances: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockGrowth {
    pub initial_value: f64,
    pub final_value: f64,
    pub profit: f64,
    pub annual_growth_pct: f64,
}

pub fn monthly_payment(terms: &LoanTerms) -> Result<f64, CalcError> {
    terms.validate()?;
    Ok(annuity_payment(
        terms.principal,
        terms.monthly_rate(),
        terms.months(),
    ))
}

/// Sum of every instalment at the level monthly payment.
pub fn total_payments(terms: &LoanTerms) -> Result<f64, CalcError> {
    Ok(monthly_payment(terms)? * terms.months() as f64)
}

fn annuity_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    let n = months as f64;
    if monthly_rate.abs() < 1e-12 {
        return principal / n;
    }
    let growth = (1.0 + monthly_rate).powf(n);
    principal * (monthly_rate * growth) / (growth - 1.0)
}

pub fn amortization_schedule(terms: &LoanTerms) -> Result<Vec<AmortizationRow>, CalcError> {
    let payment = monthly_payment(terms)?;
    let rate = terms.monthly_rate();
    let months = terms.months();

    let mut balance = terms.principal;
    let mut rows = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let interest = balance * rate;
        let mut principal = payment - interest;
        if month == months {
            principal = balance;
        }
        balance = (balance - principal).max(0.0);
        rows.push(AmortizationRow {
            month,
            payment: principal + interest,
            interest,
            principal,
            balance,
        });
    }
    Ok(rows)
}

pub fn loan_progress(
    terms: &LoanTerms,
    start_date: NaiveDate,
    today: NaiveDate,
) -> Result<LoanProgress, CalcError> {
    let payment = monthly_payment(terms)?;
    let total_payments = total_payments(terms)?;
    let months_passed = calendar_months_between(start_date, today);
    let paid_amount = months_passed as f64 * payment;

    Ok(LoanProgress {
        monthly_payment: payment,
        total_payments,
        months_passed,
        paid_amount,
        remaining_amount: total_payments - paid_amount,
        next_payment_date: next_payment_date(start_date, today)?,
    })
}

/// Whole calendar months from `start` to `today`, ignoring the day of month.
fn calendar_months_between(start: NaiveDate, today: NaiveDate) -> u32 {
    let months = (today.year() - start.year()) * 12 + today.month() as i32 - start.month() as i32;
    months.max(0) as u32
}

fn next_payment_date(start: NaiveDate, today: NaiveDate) -> Result<NaiveDate, CalcError> {
    let overflow = || CalcError::InvalidParameter("payment date out of range".to_string());
    let mut offset = 1_u32;
    let mut next = start.checked_add_months(Months::new(offset)).ok_or_else(overflow)?;
    while next < today {
        offset += 1;
        next = start
            .checked_add_months(Months::new(offset))
            .ok_or_else(overflow)?;
    }
    Ok(next)
}

pub fn compound_projection(
    initial_amount: f64,
    monthly_contribution: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<CompoundProjection, CalcError> {
    ensure_non_negative("initial amount", initial_amount)?;
    ensure_non_negative("monthly contribution", monthly_contribution)?;
    ensure_non_negative("annual rate", annual_rate_pct)?;

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let months = years * 12;

    let mut value = initial_amount;
    let mut yearly_balances = Vec::with_capacity(years as usize);
    for month in 1..=months {
        value = value * (1.0 + monthly_rate) + monthly_contribution;
        if month % 12 == 0 {
            yearly_balances.push(value);
        }
    }

    let total_contributions = initial_amount + monthly_contribution * months as f64;
    Ok(CompoundProjection {
        future_value: value,
        total_contributions,
        total_interest: value - total_contributions,
        yearly_balances,
    })
}

pub fn dividend_income(
    shares: f64,
    dividend_per_share: f64,
    frequency: DividendFrequency,
) -> Result<DividendIncome, CalcError> {
    ensure_non_negative("shares", shares)?;
    ensure_non_negative("dividend per share", dividend_per_share)?;

    let annual_income = shares * dividend_per_share;
    Ok(DividendIncome {
        frequency,
        annual_income,
        periodic_income: annual_income / frequency.periods_per_year(),
    })
}

pub fn stock_growth(
    initial_price: f64,
    final_price: f64,
    shares: f64,
    years: f64,
) -> Result<StockGrowth, CalcError> {
    ensure_positive("initial price", initial_price)?;
    ensure_non_negative("final price", final_price)?;
    ensure_non_negative("shares", shares)?;
    ensure_positive("years", years)?;

    let initial_value = initial_price * shares;
    let final_value = final_price * shares;
    Ok(StockGrowth {
        initial_value,
        final_value,
        profit: final_value - initial_value,
        annual_growth_pct: ((final_price / initial_price).powf(1.0 / years) - 1.0) * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn sample_loan() -> LoanTerms {
        LoanTerms {
            principal: 100_000.0,
            annual_rate_pct: 12.0,
            term_years: 1,
        }
    }

    #[test]
    fn monthly_payment_matches_annuity_formula() {
        let payment = monthly_payment(&sample_loan()).expect("valid");
        assert_approx_tol(payment, 8_884.878_867, 1e-5);
    }

    #[test]
    fn total_payments_is_level_payment_times_term() {
        let terms = sample_loan();
        let total = total_payments(&terms).expect("valid");
        let payment = monthly_payment(&terms).expect("valid");

        assert_approx(total, payment * 12.0);
        let progress = loan_progress(&terms, date(2026, 1, 1), date(2026, 1, 1)).expect("valid");
        assert_eq!(progress.total_payments, total);
    }

    #[test]
    fn zero_rate_loan_splits_principal_evenly() {
        let mut terms = sample_loan();
        terms.annual_rate_pct = 0.0;
        let payment = monthly_payment(&terms).expect("valid");
        assert_approx(payment, 100_000.0 / 12.0);
    }

    #[test]
    fn loan_terms_are_validated() {
        let mut terms = sample_loan();
        terms.term_years = 0;
        assert!(monthly_payment(&terms).is_err());

        let mut terms = sample_loan();
        terms.principal = -1.0;
        assert!(monthly_payment(&terms).is_err());
    }

    #[test]
    fn amortization_schedule_pays_off_the_balance() {
        let rows = amortization_schedule(&sample_loan()).expect("valid");

        assert_eq!(rows.len(), 12);
        assert_approx(rows[0].interest, 1_000.0);
        assert_eq!(rows.last().map(|r| r.balance), Some(0.0));
        let repaid: f64 = rows.iter().map(|r| r.principal).sum();
        assert_approx_tol(repaid, 100_000.0, 1e-4);
        for pair in rows.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
        }
    }

    #[test]
    fn loan_progress_counts_calendar_months() {
        let progress =
            loan_progress(&sample_loan(), date(2025, 11, 20), date(2026, 2, 3)).expect("valid");

        assert_eq!(progress.months_passed, 3);
        assert_approx(progress.paid_amount, progress.monthly_payment * 3.0);
        assert_approx(
            progress.remaining_amount,
            progress.total_payments - progress.paid_amount,
        );
        assert_eq!(progress.next_payment_date, date(2026, 2, 20));
    }

    #[test]
    fn loan_progress_before_start_is_clamped_to_zero() {
        let progress =
            loan_progress(&sample_loan(), date(2026, 6, 1), date(2026, 1, 15)).expect("valid");

        assert_eq!(progress.months_passed, 0);
        assert_eq!(progress.next_payment_date, date(2026, 7, 1));
        assert_approx(progress.remaining_amount, progress.total_payments);
    }

    #[test]
    fn next_payment_due_today_is_not_skipped() {
        let progress =
            loan_progress(&sample_loan(), date(2026, 1, 10), date(2026, 3, 10)).expect("valid");
        assert_eq!(progress.next_payment_date, date(2026, 3, 10));
    }

    #[test]
    fn compound_projection_with_zero_rate_is_contributions() {
        let projection = compound_projection(1_000.0, 100.0, 0.0, 2).expect("valid");

        assert_approx(projection.future_value, 3_400.0);
        assert_approx(projection.total_contributions, 3_400.0);
        assert_approx(projection.total_interest, 0.0);
        assert_eq!(projection.yearly_balances.len(), 2);
        assert_approx(projection.yearly_balances[0], 2_200.0);
    }

    #[test]
    fn compound_projection_grows_monthly() {
        let projection = compound_projection(1_000.0, 0.0, 12.0, 1).expect("valid");
        assert_approx_tol(projection.future_value, 1_000.0 * 1.01_f64.powi(12), 1e-9);
    }

    #[test]
    fn dividend_income_splits_by_frequency() {
        let income = dividend_income(100.0, 0.5, DividendFrequency::Quarterly).expect("valid");
        assert_approx(income.annual_income, 50.0);
        assert_approx(income.periodic_income, 12.5);

        let monthly = dividend_income(120.0, 1.0, DividendFrequency::Monthly).expect("valid");
        assert_approx(monthly.periodic_income, 10.0);
    }

    #[test]
    fn stock_growth_reports_annualised_rate() {
        let growth = stock_growth(100.0, 121.0, 10.0, 2.0).expect("valid");

        assert_approx(growth.initial_value, 1_000.0);
        assert_approx(growth.final_value, 1_210.0);
        assert_approx(growth.profit, 210.0);
        assert_approx(growth.annual_growth_pct, 10.0);
    }

    #[test]
    fn stock_growth_rejects_zero_years_and_price() {
        assert!(stock_growth(100.0, 150.0, 1.0, 0.0).is_err());
        assert!(stock_growth(0.0, 150.0, 1.0, 1.0).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_schedule_interest_plus_principal_is_payment(
            principal in 1_000u32..2_000_000,
            rate_bp in 0u32..3_000,
            years in 1u32..30
        ) {
            let terms = LoanTerms {
                principal: principal as f64,
                annual_rate_pct: rate_bp as f64 / 100.0,
                term_years: years,
            };
            let payment = monthly_payment(&terms).unwrap();
            let rows = amortization_schedule(&terms).unwrap();

            prop_assert!(rows.len() as u32 == years * 12);
            for row in &rows[..rows.len() - 1] {
                prop_assert!((row.payment - payment).abs() <= 1e-6 * payment.max(1.0));
                prop_assert!(row.balance >= 0.0);
            }
            let total_principal: f64 = rows.iter().map(|r| r.principal).sum();
            prop_assert!((total_principal - terms.principal).abs() <= 1e-6 * terms.principal);
        }
    }
}
