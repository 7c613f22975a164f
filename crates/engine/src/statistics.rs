//! Derived figures: salary totals, period totals, the monthly summary and the
//! yearly rollup.
//!
//! Everything here is a pure function of its inputs. Nothing is cached; the
//! store recomputes on every read.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{ExpenseEntry, MoneyCents, PeriodKey, SalaryConfiguration, SalaryField};

/// Expenses grouped by the period they were recorded in.
pub type ExpensesByPeriod = BTreeMap<PeriodKey, Vec<ExpenseEntry>>;

/// Savings rate above which savings are considered healthy, in percent.
pub const HEALTHY_SAVINGS_RATE: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryTotals {
    pub gross_pay: MoneyCents,
    pub total_deductions: MoneyCents,
    pub net_pay: MoneyCents,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub total_expenses: MoneyCents,
    pub total_savings: MoneyCents,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub balance_remaining: MoneyCents,
    /// Savings as a percentage of net pay; 0 when net pay is not positive.
    pub savings_rate: f64,
}

impl MonthlySummary {
    pub fn is_positive_cash_flow(&self) -> bool {
        !self.balance_remaining.is_negative()
    }

    pub fn is_healthy_savings(&self) -> bool {
        self.savings_rate > HEALTHY_SAVINGS_RATE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub year: i32,
    pub months_tracked: usize,
    pub total_expenses: MoneyCents,
    pub total_savings: MoneyCents,
    pub monthly_average_expenses: MoneyCents,
}

/// Result of a yearly rollup. `NoData` means no period of that year exists,
/// which is different from tracked periods adding up to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum YearlyRollup {
    NoData { year: i32 },
    Tracked(YearlyTotals),
}

impl YearlyRollup {
    pub fn totals(&self) -> Option<&YearlyTotals> {
        match self {
            Self::NoData { .. } => None,
            Self::Tracked(totals) => Some(totals),
        }
    }
}

/// Everything the summary screen shows for the current period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub period: PeriodKey,
    pub salary: SalaryTotals,
    pub period_totals: PeriodTotals,
    pub summary: MonthlySummary,
    pub yearly: YearlyRollup,
}

/// Gross pay, total deductions and net pay of a salary slip.
///
/// The employer contribution is not part of any of the three figures. Net pay
/// may be negative.
pub fn compute_salary_totals(config: &SalaryConfiguration) -> SalaryTotals {
    let gross_pay: MoneyCents = SalaryField::EARNINGS
        .iter()
        .map(|field| config.get(*field))
        .sum();
    let total_deductions: MoneyCents = SalaryField::DEDUCTIONS
        .iter()
        .map(|field| config.get(*field))
        .sum();

    SalaryTotals {
        gross_pay,
        total_deductions,
        net_pay: gross_pay - total_deductions,
    }
}

/// Splits a period's entries into expenses and savings.
///
/// An entry without a savings flag counts as an expense.
pub fn compute_period_totals<'a, I>(entries: I) -> PeriodTotals
where
    I: IntoIterator<Item = &'a ExpenseEntry>,
{
    entries
        .into_iter()
        .fold(PeriodTotals::default(), |mut totals, entry| {
            if entry.counts_as_savings() {
                totals.total_savings += entry.amount;
            } else {
                totals.total_expenses += entry.amount;
            }
            totals
        })
}

/// Balance left after expenses and the savings rate.
///
/// Savings are not subtracted from the balance.
pub fn compute_monthly_summary(
    net_pay: MoneyCents,
    total_expenses: MoneyCents,
    total_savings: MoneyCents,
) -> MonthlySummary {
    MonthlySummary {
        balance_remaining: net_pay - total_expenses,
        savings_rate: total_savings.percent_of(net_pay),
    }
}

/// Totals for every period of `year`.
///
/// A period counts as tracked as soon as its key exists, even with no
/// entries.
pub fn compute_yearly_rollup(periods: &ExpensesByPeriod, year: i32) -> YearlyRollup {
    let mut months = BTreeSet::new();
    let mut totals = PeriodTotals::default();

    for (period, entries) in periods.iter().filter(|(period, _)| period.year() == year) {
        months.insert(period.month());
        let period_totals = compute_period_totals(entries);
        totals.total_expenses += period_totals.total_expenses;
        totals.total_savings += period_totals.total_savings;
    }

    if months.is_empty() {
        return YearlyRollup::NoData { year };
    }

    YearlyRollup::Tracked(YearlyTotals {
        year,
        months_tracked: months.len(),
        total_expenses: totals.total_expenses,
        total_savings: totals.total_savings,
        monthly_average_expenses: totals.total_expenses.average_over(months.len()),
    })
}

/// Computes the full dashboard for `period`.
pub fn compute_dashboard(
    salary: &SalaryConfiguration,
    periods: &ExpensesByPeriod,
    period: PeriodKey,
) -> Dashboard {
    let salary_totals = compute_salary_totals(salary);
    let period_totals = compute_period_totals(periods.get(&period).into_iter().flatten());
    let summary = compute_monthly_summary(
        salary_totals.net_pay,
        period_totals.total_expenses,
        period_totals.total_savings,
    );

    Dashboard {
        period,
        salary: salary_totals,
        period_totals,
        summary,
        yearly: compute_yearly_rollup(periods, period.year()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(amount: i64, is_savings: Option<bool>) -> ExpenseEntry {
        ExpenseEntry {
            id: format!("e{amount}"),
            name: "item".to_string(),
            amount: MoneyCents::new(amount),
            is_savings,
            category: None,
            notes: None,
            date: None,
        }
    }

    fn key(raw: &str) -> PeriodKey {
        raw.parse().unwrap()
    }

    #[test]
    fn salary_totals_exclude_employer_contribution() {
        let mut config = SalaryConfiguration::default();
        config.basic_salary = MoneyCents::new(300_000);
        config.transport = MoneyCents::new(20_000);
        config.bonus = MoneyCents::new(5_000);
        config.income_tax = MoneyCents::new(40_000);
        config.social_security_employee = MoneyCents::new(15_000);
        config.social_security_employer = MoneyCents::new(30_000);

        let totals = compute_salary_totals(&config);
        assert_eq!(totals.gross_pay, MoneyCents::new(325_000));
        assert_eq!(totals.total_deductions, MoneyCents::new(55_000));
        assert_eq!(totals.net_pay, MoneyCents::new(270_000));

        config.social_security_employer = MoneyCents::new(999_999);
        assert_eq!(compute_salary_totals(&config), totals);
    }

    #[test]
    fn net_pay_can_go_negative() {
        let mut config = SalaryConfiguration::default();
        config.basic_salary = MoneyCents::new(100);
        config.loan_repayment = MoneyCents::new(250);
        assert_eq!(compute_salary_totals(&config).net_pay, MoneyCents::new(-150));
    }

    #[test]
    fn every_field_lands_in_its_total() {
        let mut config = SalaryConfiguration::default();
        for field in SalaryField::all() {
            config.set(field, MoneyCents::new(1)).unwrap();
        }
        let totals = compute_salary_totals(&config);
        assert_eq!(totals.gross_pay, MoneyCents::new(10));
        assert_eq!(totals.total_deductions, MoneyCents::new(10));
        assert_eq!(totals.net_pay, MoneyCents::ZERO);
    }

    #[test]
    fn largest_amounts_do_not_overflow() {
        let mut config = SalaryConfiguration::default();
        for field in SalaryField::all() {
            config.set(field, MoneyCents::MAX).unwrap();
        }
        let totals = compute_salary_totals(&config);
        assert_eq!(totals.gross_pay, MoneyCents::new(MoneyCents::MAX.cents() * 10));
        assert_eq!(totals.net_pay, MoneyCents::ZERO);

        let huge = MoneyCents::new(i64::MAX / 2 + 1);
        let entries = [entry(huge.cents(), None), entry(huge.cents(), None)];
        assert_eq!(
            compute_period_totals(&entries).total_expenses,
            MoneyCents::new(i64::MAX)
        );

        let periods = ExpensesByPeriod::from([
            (key("2024-01"), entries.to_vec()),
            (key("2024-02"), entries.to_vec()),
        ]);
        let rollup = compute_yearly_rollup(&periods, 2024);
        assert_eq!(
            rollup.totals().map(|totals| totals.total_expenses),
            Some(MoneyCents::new(i64::MAX))
        );
    }

    #[test]
    fn unflagged_entry_is_an_expense() {
        let totals = compute_period_totals(&[entry(100, None)]);
        assert_eq!(totals.total_expenses, MoneyCents::new(100));
        assert_eq!(totals.total_savings, MoneyCents::ZERO);
    }

    #[test]
    fn period_totals_cover_every_entry() {
        let entries = [
            entry(800, None),
            entry(260, Some(false)),
            entry(1000, Some(true)),
            entry(350, None),
        ];
        let totals = compute_period_totals(&entries);
        let all: MoneyCents = entries.iter().map(|e| e.amount).sum();
        assert_eq!(totals.total_expenses + totals.total_savings, all);
        assert_eq!(totals.total_savings, MoneyCents::new(1000));
        assert_eq!(
            compute_period_totals(&Vec::<ExpenseEntry>::new()),
            PeriodTotals::default()
        );
    }

    #[test]
    fn summary_does_not_subtract_savings() {
        let summary = compute_monthly_summary(
            MoneyCents::new(10_000),
            MoneyCents::new(4_000),
            MoneyCents::new(2_500),
        );
        assert_eq!(summary.balance_remaining, MoneyCents::new(6_000));
        assert_eq!(summary.savings_rate, 25.0);
        assert!(summary.is_positive_cash_flow());
        assert!(summary.is_healthy_savings());
    }

    #[test]
    fn summary_with_zero_net_pay_has_zero_rate() {
        let summary =
            compute_monthly_summary(MoneyCents::ZERO, MoneyCents::new(50), MoneyCents::new(50));
        assert_eq!(summary.savings_rate, 0.0);
        assert_eq!(summary.balance_remaining, MoneyCents::new(-50));
        assert!(!summary.is_positive_cash_flow());

        let negative =
            compute_monthly_summary(MoneyCents::new(-100), MoneyCents::ZERO, MoneyCents::new(50));
        assert_eq!(negative.savings_rate, 0.0);
    }

    #[test]
    fn exactly_twenty_percent_is_not_healthy() {
        let summary =
            compute_monthly_summary(MoneyCents::new(1000), MoneyCents::ZERO, MoneyCents::new(200));
        assert_eq!(summary.savings_rate, 20.0);
        assert!(!summary.is_healthy_savings());
        assert!(summary.is_positive_cash_flow());
    }

    #[test]
    fn empty_period_still_counts_as_tracked() {
        let mut periods = ExpensesByPeriod::new();
        periods.insert(key("2024-01"), vec![]);
        periods.insert(key("2024-02"), vec![entry(50, Some(false))]);
        periods.insert(key("2023-12"), vec![entry(9_999, None)]);

        let YearlyRollup::Tracked(totals) = compute_yearly_rollup(&periods, 2024) else {
            panic!("2024 has data");
        };
        assert_eq!(totals.months_tracked, 2);
        assert_eq!(totals.total_expenses, MoneyCents::new(50));
        assert_eq!(totals.total_savings, MoneyCents::ZERO);
        assert_eq!(totals.monthly_average_expenses, MoneyCents::new(25));
    }

    #[test]
    fn year_without_periods_reports_no_data() {
        let mut periods = ExpensesByPeriod::new();
        periods.insert(key("2023-05"), vec![entry(10, None)]);
        assert_eq!(
            compute_yearly_rollup(&periods, 2024),
            YearlyRollup::NoData { year: 2024 }
        );
        assert!(compute_yearly_rollup(&periods, 2024).totals().is_none());
    }

    #[test]
    fn dashboard_is_idempotent() {
        let mut config = SalaryConfiguration::default();
        config.basic_salary = MoneyCents::new(500_000);
        let mut periods = ExpensesByPeriod::new();
        periods.insert(
            key("2024-03"),
            vec![entry(80_000, None), entry(100_000, Some(true))],
        );

        let first = compute_dashboard(&config, &periods, key("2024-03"));
        let second = compute_dashboard(&config, &periods, key("2024-03"));
        assert_eq!(first, second);
        assert_eq!(first.summary.balance_remaining, MoneyCents::new(420_000));
        assert_eq!(first.summary.savings_rate, 20.0);

        let unknown = compute_dashboard(&config, &periods, key("2024-04"));
        assert_eq!(unknown.period_totals, PeriodTotals::default());
        assert!(matches!(unknown.yearly, YearlyRollup::Tracked(_)));
    }
}
