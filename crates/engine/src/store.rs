//! The Period Store: the session's single source of truth.
//!
//! The store owns the employee profile, the active salary slip, the current
//! period and every expense grouped by period. It reads its snapshot from a
//! [`SnapshotProvider`] once when built and writes the affected document back
//! after each mutation.
//!
//! Writes are best effort. The in-memory state is updated first; when the
//! provider then fails, the failure is logged and queued as a
//! [`PersistenceNotice`] for the presentation layer, and the mutation still
//! succeeds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    Dashboard, EmployeeInfo, EngineError, ExpenseEntry, ExpensePatch, ExpensesByPeriod,
    MoneyCents, NewExpense, PeriodKey, ResultEngine, SalaryConfiguration, SalaryField,
    YearlyRollup,
    statistics::{compute_dashboard, compute_yearly_rollup},
    storage::{SnapshotKey, SnapshotProvider, load_snapshot, save_snapshot},
};

/// Starter list used for the very first period when nothing was persisted.
const DEFAULT_EXPENSES: [(&str, i64, bool); 7] = [
    ("Internet", 800, false),
    ("Netflix", 260, false),
    ("Apple Music", 250, false),
    ("Little Sis", 350, false),
    ("Mummy", 200, false),
    ("John", 1000, false),
    ("Savings", 1000, true),
];

/// A write that did not reach the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistenceNotice {
    pub key: SnapshotKey,
    pub message: String,
}

/// Read-only copy of everything the store holds, for export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub employee: EmployeeInfo,
    pub current_period: PeriodKey,
    pub salary: SalaryConfiguration,
    pub expenses_by_period: ExpensesByPeriod,
}

#[derive(Debug)]
pub struct PeriodStore<P> {
    provider: P,
    default_period: PeriodKey,
    employee: EmployeeInfo,
    current_period: PeriodKey,
    salary: SalaryConfiguration,
    expenses: ExpensesByPeriod,
    notices: Vec<PersistenceNotice>,
}

impl<P: SnapshotProvider> PeriodStore<P> {
    /// Return a builder for `PeriodStore`.
    pub fn builder() -> PeriodStoreBuilder<P> {
        PeriodStoreBuilder::default()
    }

    pub fn employee(&self) -> &EmployeeInfo {
        &self.employee
    }

    pub async fn update_employee(&mut self, employee: EmployeeInfo) {
        self.employee = employee;
        tracing::debug!("employee profile updated");
        self.persist(SnapshotKey::EmployeeInfo).await;
    }

    pub fn current_period(&self) -> PeriodKey {
        self.current_period
    }

    /// Moves the current pointer. Does not create an entry for `period`.
    pub async fn set_current_period(&mut self, period: PeriodKey) {
        self.current_period = period;
        tracing::debug!("current period set to {period}");
        self.persist(SnapshotKey::CurrentPeriod).await;
    }

    /// Moves the current pointer by `delta` months and returns the new period.
    pub async fn shift_current_period(&mut self, delta: i32) -> ResultEngine<PeriodKey> {
        let period = self.current_period.shift(delta)?;
        self.set_current_period(period).await;
        Ok(period)
    }

    pub fn salary(&self) -> &SalaryConfiguration {
        &self.salary
    }

    /// Replaces the salary slip. Rejected as a whole if any field is negative.
    pub async fn update_salary(&mut self, salary: SalaryConfiguration) -> ResultEngine<()> {
        salary.validate()?;
        self.salary = salary;
        tracing::debug!("salary configuration updated");
        self.persist(SnapshotKey::SalaryData).await;
        Ok(())
    }

    pub async fn set_salary_field(
        &mut self,
        field: SalaryField,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.salary.set(field, amount)?;
        tracing::debug!("salary field {field} set to {amount}");
        self.persist(SnapshotKey::SalaryData).await;
        Ok(())
    }

    /// Entries of `period` in insertion order; empty for unknown periods.
    pub fn expenses(&self, period: PeriodKey) -> &[ExpenseEntry] {
        self.expenses.get(&period).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn current_expenses(&self) -> &[ExpenseEntry] {
        self.expenses(self.current_period)
    }

    pub fn expenses_by_period(&self) -> &ExpensesByPeriod {
        &self.expenses
    }

    /// Periods present in the mapping, oldest first.
    pub fn available_periods(&self) -> Vec<PeriodKey> {
        self.expenses.keys().copied().collect()
    }

    /// Appends a new entry to the current period. A date, when given, must
    /// fall inside that period.
    pub async fn add_expense(&mut self, draft: NewExpense) -> ResultEngine<ExpenseEntry> {
        self.ensure_in_current_period(draft.date)?;
        let entry = ExpenseEntry::new(draft)?;
        self.expenses
            .entry(self.current_period)
            .or_default()
            .push(entry.clone());
        tracing::debug!(
            "added expense {} ({}) to {}",
            entry.id,
            entry.amount,
            self.current_period
        );
        self.persist(SnapshotKey::ExpensesByPeriod).await;
        Ok(entry)
    }

    /// Edits an entry of the current period in place. A new date must stay
    /// inside that period.
    pub async fn edit_expense(
        &mut self,
        id: &str,
        patch: ExpensePatch,
    ) -> ResultEngine<ExpenseEntry> {
        let period = self.current_period;
        self.ensure_in_current_period(patch.date)?;
        let entry = self
            .expenses
            .get_mut(&period)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.id == id))
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id} in {period}")))?;
        entry.apply(patch)?;
        let updated = entry.clone();
        tracing::debug!("edited expense {id} in {period}");
        self.persist(SnapshotKey::ExpensesByPeriod).await;
        Ok(updated)
    }

    /// Removes an entry from the current period. The period key stays even
    /// when its last entry goes.
    pub async fn delete_expense(&mut self, id: &str) -> ResultEngine<ExpenseEntry> {
        let period = self.current_period;
        let not_found = || EngineError::KeyNotFound(format!("expense {id} in {period}"));
        let entries = self.expenses.get_mut(&period).ok_or_else(not_found)?;
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(not_found)?;
        let removed = entries.remove(index);
        tracing::debug!("deleted expense {id} from {period}");
        self.persist(SnapshotKey::ExpensesByPeriod).await;
        Ok(removed)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            employee: self.employee.clone(),
            current_period: self.current_period,
            salary: self.salary.clone(),
            expenses_by_period: self.expenses.clone(),
        }
    }

    /// Every derived figure for the current period.
    pub fn dashboard(&self) -> Dashboard {
        compute_dashboard(&self.salary, &self.expenses, self.current_period)
    }

    pub fn yearly_rollup(&self, year: i32) -> YearlyRollup {
        compute_yearly_rollup(&self.expenses, year)
    }

    /// Forgets everything, in memory and in the provider. Defaults are not
    /// seeded again.
    pub async fn reset(&mut self) {
        self.employee = EmployeeInfo::default();
        self.current_period = self.default_period;
        self.salary = SalaryConfiguration::default();
        self.expenses.clear();

        for key in SnapshotKey::ALL {
            if let Err(err) = self.provider.remove(key.as_str()).await {
                self.notice(key, err);
            }
        }
        tracing::info!("all data cleared");
    }

    /// Drains the queued persistence failures.
    pub fn take_notices(&mut self) -> Vec<PersistenceNotice> {
        std::mem::take(&mut self.notices)
    }

    fn ensure_in_current_period(&self, date: Option<NaiveDate>) -> ResultEngine<()> {
        match date {
            Some(date) if PeriodKey::from_date(date) != self.current_period => {
                Err(EngineError::InvalidEntry(format!(
                    "date {date} is outside period {}",
                    self.current_period
                )))
            }
            _ => Ok(()),
        }
    }

    async fn persist(&mut self, key: SnapshotKey) {
        let result = match key {
            SnapshotKey::EmployeeInfo => save_snapshot(&self.provider, key, &self.employee).await,
            SnapshotKey::CurrentPeriod => {
                save_snapshot(&self.provider, key, &self.current_period).await
            }
            SnapshotKey::SalaryData => save_snapshot(&self.provider, key, &self.salary).await,
            SnapshotKey::ExpensesByPeriod => {
                save_snapshot(&self.provider, key, &self.expenses).await
            }
        };
        if let Err(err) = result {
            self.notice(key, err);
        }
    }

    fn notice(&mut self, key: SnapshotKey, err: EngineError) {
        tracing::warn!("failed to persist {}: {err}", key.as_str());
        self.notices.push(PersistenceNotice {
            key,
            message: err.to_string(),
        });
    }
}

fn default_expenses() -> ResultEngine<Vec<ExpenseEntry>> {
    DEFAULT_EXPENSES
        .iter()
        .enumerate()
        .map(|(index, (name, amount, is_savings))| {
            let mut draft = NewExpense::new(*name, MoneyCents::from_major(*amount));
            if *is_savings {
                draft = draft.savings(true);
            }
            ExpenseEntry::with_id((index + 1).to_string(), draft)
        })
        .collect()
}

/// Drops persisted entries that would not pass validation on input.
fn valid_expenses(mut expenses: ExpensesByPeriod) -> ExpensesByPeriod {
    for (period, entries) in &mut expenses {
        entries.retain(|entry| match entry.validate() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("discarding persisted expense {} in {period}: {err}", entry.id);
                false
            }
        });
    }
    expenses
}

/// Builder for [`PeriodStore`].
#[derive(Debug)]
pub struct PeriodStoreBuilder<P> {
    provider: Option<P>,
    default_period: Option<PeriodKey>,
    seed_defaults: bool,
}

impl<P> Default for PeriodStoreBuilder<P> {
    fn default() -> Self {
        Self {
            provider: None,
            default_period: None,
            seed_defaults: true,
        }
    }
}

impl<P: SnapshotProvider> PeriodStoreBuilder<P> {
    /// Pass the required persistence provider.
    pub fn provider(mut self, provider: P) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Period used when none was persisted. Defaults to today's month.
    pub fn default_period(mut self, period: PeriodKey) -> Self {
        self.default_period = Some(period);
        self
    }

    /// Whether a first launch gets the starter expense list.
    pub fn seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }

    /// Reads the persisted snapshot and constructs the store.
    pub async fn build(self) -> ResultEngine<PeriodStore<P>> {
        let provider = self.provider.ok_or(EngineError::MissingProvider)?;
        let default_period = self.default_period.unwrap_or_else(PeriodKey::current);

        let employee: EmployeeInfo = load_snapshot(&provider, SnapshotKey::EmployeeInfo)
            .await
            .unwrap_or_default();
        let current_period: PeriodKey = load_snapshot(&provider, SnapshotKey::CurrentPeriod)
            .await
            .unwrap_or(default_period);
        let salary: SalaryConfiguration = load_snapshot(&provider, SnapshotKey::SalaryData)
            .await
            .unwrap_or_default();
        let salary = match salary.validate() {
            Ok(()) => salary,
            Err(err) => {
                tracing::warn!("discarding persisted salary configuration: {err}");
                SalaryConfiguration::default()
            }
        };

        let persisted: Option<ExpensesByPeriod> =
            load_snapshot(&provider, SnapshotKey::ExpensesByPeriod).await;
        let expenses = match persisted {
            Some(expenses) => valid_expenses(expenses),
            None if self.seed_defaults => {
                ExpensesByPeriod::from([(current_period, default_expenses()?)])
            }
            None => ExpensesByPeriod::new(),
        };

        tracing::info!(
            "period store opened at {current_period} with {} period(s)",
            expenses.len()
        );

        Ok(PeriodStore {
            provider,
            default_period,
            employee,
            current_period,
            salary,
            expenses,
            notices: Vec::new(),
        })
    }
}
