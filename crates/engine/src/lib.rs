//! Payroll and period aggregation engine.
//!
//! The engine turns a salary slip and expenses recorded per calendar month into
//! derived figures: salary totals, period totals, the monthly summary and the
//! yearly rollup. [`PeriodStore`] owns the session state and persists it
//! through a [`storage::SnapshotProvider`]; the hosted variant keeps expenses
//! as rows of an [`table::ExpenseTable`].

pub use employee::EmployeeInfo;
pub use error::EngineError;
pub use expenses::{ExpenseEntry, ExpensePatch, NewExpense};
pub use export::{export_to_file, write_csv};
pub use money::MoneyCents;
pub use period::PeriodKey;
pub use salary::{FieldKind, SalaryConfiguration, SalaryField};
pub use statistics::{
    Dashboard, ExpensesByPeriod, HEALTHY_SAVINGS_RATE, MonthlySummary, PeriodTotals,
    SalaryTotals, YearlyRollup, YearlyTotals, compute_dashboard, compute_monthly_summary,
    compute_period_totals, compute_salary_totals, compute_yearly_rollup,
};
pub use store::{PeriodStore, PeriodStoreBuilder, PersistenceNotice, StoreSnapshot};

mod employee;
mod error;
mod expenses;
mod export;
mod money;
mod period;
mod salary;
mod statistics;
pub mod storage;
mod store;
pub mod table;

pub type ResultEngine<T> = Result<T, EngineError>;
