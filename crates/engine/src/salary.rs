//! The salary slip: one configuration of earnings and deductions.
//!
//! The dashboard keeps a single active [`SalaryConfiguration`] shared by every
//! period. Net pay is earnings minus deductions; the employer social-insurance
//! contribution is printed on the slip but never enters any total.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// Which side of the slip a field sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Earning,
    Deduction,
    EmployerContribution,
}

/// Every field of the salary slip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryField {
    BasicSalary,
    GeneralAllowance,
    Medical,
    PhoneAllowance,
    Transport,
    Rent,
    ActingAllowance,
    Overtime,
    IncentivePay,
    Bonus,
    SocialSecurityEmployee,
    IncomeTax,
    SalaryAdvance,
    ProductPhoneRepayment,
    TransportDeduction,
    RentDeduction,
    HubBalance,
    StockDeduction,
    LoanRepayment,
    OtherAdvances,
    SocialSecurityEmployer,
}

impl SalaryField {
    pub const EARNINGS: [SalaryField; 10] = [
        Self::BasicSalary,
        Self::GeneralAllowance,
        Self::Medical,
        Self::PhoneAllowance,
        Self::Transport,
        Self::Rent,
        Self::ActingAllowance,
        Self::Overtime,
        Self::IncentivePay,
        Self::Bonus,
    ];

    pub const DEDUCTIONS: [SalaryField; 10] = [
        Self::SocialSecurityEmployee,
        Self::IncomeTax,
        Self::SalaryAdvance,
        Self::ProductPhoneRepayment,
        Self::TransportDeduction,
        Self::RentDeduction,
        Self::HubBalance,
        Self::StockDeduction,
        Self::LoanRepayment,
        Self::OtherAdvances,
    ];

    /// All fields in slip order: earnings, deductions, employer contribution.
    pub fn all() -> impl Iterator<Item = SalaryField> {
        Self::EARNINGS
            .into_iter()
            .chain(Self::DEDUCTIONS)
            .chain([Self::SocialSecurityEmployer])
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::BasicSalary
            | Self::GeneralAllowance
            | Self::Medical
            | Self::PhoneAllowance
            | Self::Transport
            | Self::Rent
            | Self::ActingAllowance
            | Self::Overtime
            | Self::IncentivePay
            | Self::Bonus => FieldKind::Earning,
            Self::SocialSecurityEmployer => FieldKind::EmployerContribution,
            _ => FieldKind::Deduction,
        }
    }

    /// Stable snake_case key, the same used in the persisted JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::BasicSalary => "basic_salary",
            Self::GeneralAllowance => "general_allowance",
            Self::Medical => "medical",
            Self::PhoneAllowance => "phone_allowance",
            Self::Transport => "transport",
            Self::Rent => "rent",
            Self::ActingAllowance => "acting_allowance",
            Self::Overtime => "overtime",
            Self::IncentivePay => "incentive_pay",
            Self::Bonus => "bonus",
            Self::SocialSecurityEmployee => "social_security_employee",
            Self::IncomeTax => "income_tax",
            Self::SalaryAdvance => "salary_advance",
            Self::ProductPhoneRepayment => "product_phone_repayment",
            Self::TransportDeduction => "transport_deduction",
            Self::RentDeduction => "rent_deduction",
            Self::HubBalance => "hub_balance",
            Self::StockDeduction => "stock_deduction",
            Self::LoanRepayment => "loan_repayment",
            Self::OtherAdvances => "other_advances",
            Self::SocialSecurityEmployer => "social_security_employer",
        }
    }

    /// Caption printed on the payslip.
    pub fn label(self) -> &'static str {
        match self {
            Self::BasicSalary => "Basic Salary",
            Self::GeneralAllowance => "General Allowance",
            Self::Medical => "Medical",
            Self::PhoneAllowance => "Phone Allowance",
            Self::Transport => "Transport",
            Self::Rent => "Rent",
            Self::ActingAllowance => "Acting Allowance",
            Self::Overtime => "Overtime",
            Self::IncentivePay => "Incentive Pay",
            Self::Bonus => "Bonus",
            Self::SocialSecurityEmployee => "NASSIT Employee",
            Self::IncomeTax => "PAYE",
            Self::SalaryAdvance => "Salary Advance",
            Self::ProductPhoneRepayment => "Product Phone Repayment",
            Self::TransportDeduction => "Transport Deduction",
            Self::RentDeduction => "Rent Deduction",
            Self::HubBalance => "Hub Balance",
            Self::StockDeduction => "Stock Deduction",
            Self::LoanRepayment => "Loan Repayment",
            Self::OtherAdvances => "Expenses Advance Others",
            Self::SocialSecurityEmployer => "NASSIT Employer",
        }
    }
}

impl fmt::Display for SalaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SalaryField {
    type Err = EngineError;

    /// Accepts the snake_case key or its kebab-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .find(|field| field.key() == wanted)
            .ok_or_else(|| EngineError::KeyNotFound(format!("salary field {s}")))
    }
}

/// The active salary slip.
///
/// Every field defaults to zero, and fields missing from persisted data are
/// read back as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryConfiguration {
    pub basic_salary: MoneyCents,
    pub general_allowance: MoneyCents,
    pub medical: MoneyCents,
    pub phone_allowance: MoneyCents,
    pub transport: MoneyCents,
    pub rent: MoneyCents,
    pub acting_allowance: MoneyCents,
    pub overtime: MoneyCents,
    pub incentive_pay: MoneyCents,
    pub bonus: MoneyCents,
    pub social_security_employee: MoneyCents,
    pub income_tax: MoneyCents,
    pub salary_advance: MoneyCents,
    pub product_phone_repayment: MoneyCents,
    pub transport_deduction: MoneyCents,
    pub rent_deduction: MoneyCents,
    pub hub_balance: MoneyCents,
    pub stock_deduction: MoneyCents,
    pub loan_repayment: MoneyCents,
    pub other_advances: MoneyCents,
    pub social_security_employer: MoneyCents,
}

impl SalaryConfiguration {
    pub fn get(&self, field: SalaryField) -> MoneyCents {
        *self.slot(field)
    }

    /// Sets one field. Negative amounts and amounts above [`MoneyCents::MAX`]
    /// are rejected.
    pub fn set(&mut self, field: SalaryField, amount: MoneyCents) -> ResultEngine<()> {
        ensure_storable(field, amount)?;
        *self.slot_mut(field) = amount;
        Ok(())
    }

    /// Checks that every field is in `0..=MoneyCents::MAX`.
    pub fn validate(&self) -> ResultEngine<()> {
        SalaryField::all().try_for_each(|field| ensure_storable(field, self.get(field)))
    }

    /// `(field, amount)` pairs in slip order.
    pub fn fields(&self) -> impl Iterator<Item = (SalaryField, MoneyCents)> + '_ {
        SalaryField::all().map(|field| (field, self.get(field)))
    }

    fn slot(&self, field: SalaryField) -> &MoneyCents {
        match field {
            SalaryField::BasicSalary => &self.basic_salary,
            SalaryField::GeneralAllowance => &self.general_allowance,
            SalaryField::Medical => &self.medical,
            SalaryField::PhoneAllowance => &self.phone_allowance,
            SalaryField::Transport => &self.transport,
            SalaryField::Rent => &self.rent,
            SalaryField::ActingAllowance => &self.acting_allowance,
            SalaryField::Overtime => &self.overtime,
            SalaryField::IncentivePay => &self.incentive_pay,
            SalaryField::Bonus => &self.bonus,
            SalaryField::SocialSecurityEmployee => &self.social_security_employee,
            SalaryField::IncomeTax => &self.income_tax,
            SalaryField::SalaryAdvance => &self.salary_advance,
            SalaryField::ProductPhoneRepayment => &self.product_phone_repayment,
            SalaryField::TransportDeduction => &self.transport_deduction,
            SalaryField::RentDeduction => &self.rent_deduction,
            SalaryField::HubBalance => &self.hub_balance,
            SalaryField::StockDeduction => &self.stock_deduction,
            SalaryField::LoanRepayment => &self.loan_repayment,
            SalaryField::OtherAdvances => &self.other_advances,
            SalaryField::SocialSecurityEmployer => &self.social_security_employer,
        }
    }

    fn slot_mut(&mut self, field: SalaryField) -> &mut MoneyCents {
        match field {
            SalaryField::BasicSalary => &mut self.basic_salary,
            SalaryField::GeneralAllowance => &mut self.general_allowance,
            SalaryField::Medical => &mut self.medical,
            SalaryField::PhoneAllowance => &mut self.phone_allowance,
            SalaryField::Transport => &mut self.transport,
            SalaryField::Rent => &mut self.rent,
            SalaryField::ActingAllowance => &mut self.acting_allowance,
            SalaryField::Overtime => &mut self.overtime,
            SalaryField::IncentivePay => &mut self.incentive_pay,
            SalaryField::Bonus => &mut self.bonus,
            SalaryField::SocialSecurityEmployee => &mut self.social_security_employee,
            SalaryField::IncomeTax => &mut self.income_tax,
            SalaryField::SalaryAdvance => &mut self.salary_advance,
            SalaryField::ProductPhoneRepayment => &mut self.product_phone_repayment,
            SalaryField::TransportDeduction => &mut self.transport_deduction,
            SalaryField::RentDeduction => &mut self.rent_deduction,
            SalaryField::HubBalance => &mut self.hub_balance,
            SalaryField::StockDeduction => &mut self.stock_deduction,
            SalaryField::LoanRepayment => &mut self.loan_repayment,
            SalaryField::OtherAdvances => &mut self.other_advances,
            SalaryField::SocialSecurityEmployer => &mut self.social_security_employer,
        }
    }
}

fn ensure_storable(field: SalaryField, amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "{} must not be negative",
            field.label()
        )));
    }
    if !amount.is_storable() {
        return Err(EngineError::InvalidAmount(format!(
            "{} must not exceed {}",
            field.label(),
            MoneyCents::MAX
        )));
    }
    Ok(())
}
