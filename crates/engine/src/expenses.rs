//! Expense entries recorded against a period.
//!
//! One [`ExpenseEntry`] type serves both the local snapshot and the remote
//! table rows: the savings flag and the category are both optional. An entry
//! without a flag is a regular expense.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub amount: MoneyCents,
    #[serde(default, alias = "isSavings", skip_serializing_if = "Option::is_none")]
    pub is_savings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExpenseEntry {
    /// Creates a validated entry with a fresh id.
    pub fn new(draft: NewExpense) -> ResultEngine<Self> {
        Self::with_id(Uuid::new_v4().to_string(), draft)
    }

    pub fn with_id(id: String, draft: NewExpense) -> ResultEngine<Self> {
        let name = validate_name(&draft.name)?;
        validate_amount(draft.amount)?;
        Ok(Self {
            id,
            name,
            amount: draft.amount,
            is_savings: draft.is_savings,
            category: draft.category,
            notes: draft.notes,
            date: draft.date,
        })
    }

    /// Checks an entry that did not go through [`ExpenseEntry::new`], such as
    /// one read back from storage.
    pub fn validate(&self) -> ResultEngine<()> {
        validate_name(&self.name)?;
        validate_amount(self.amount)
    }

    /// `true` only for entries explicitly flagged as savings.
    pub fn counts_as_savings(&self) -> bool {
        self.is_savings == Some(true)
    }

    /// Applies an edit. Nothing changes when validation fails.
    pub fn apply(&mut self, patch: ExpensePatch) -> ResultEngine<()> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(is_savings) = patch.is_savings {
            self.is_savings = Some(is_savings);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        Ok(())
    }
}

/// Input for adding an expense.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub name: String,
    pub amount: MoneyCents,
    #[serde(default)]
    pub is_savings: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    pub fn new(name: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            name: name.into(),
            amount,
            ..Default::default()
        }
    }

    pub fn savings(mut self, is_savings: bool) -> Self {
        self.is_savings = Some(is_savings);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Partial update of an expense; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<MoneyCents>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_savings: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn validate_name(name: &str) -> ResultEngine<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidEntry(
            "expense name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "expense amount must not be negative".to_string(),
        ));
    }
    if !amount.is_storable() {
        return Err(EngineError::InvalidAmount(format!(
            "expense amount must not exceed {}",
            MoneyCents::MAX
        )));
    }
    Ok(())
}
