use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{MoneyCents, PeriodKey, SalaryField};

use crate::settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "pocket")]
#[command(about = "Payslip and monthly expense tracker")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Store documents as JSON files in this directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Store documents in this SQLite database.
    #[arg(long, global = true, conflicts_with = "data_dir")]
    pub sqlite: Option<String>,
    /// Keep everything in memory for this run.
    #[arg(long, global = true, conflicts_with_all = ["data_dir", "sqlite"])]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            level: self.level.clone(),
            data_dir: self.data_dir.clone(),
            sqlite: self.sqlite.clone(),
            memory: self.memory,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dashboard of the current period.
    Summary,
    /// Totals of one year, the current period's year by default.
    Year { year: Option<i32> },
    Period(Period),
    Expense(Expense),
    Salary(Salary),
    Employee(Employee),
    /// Write everything to a CSV file.
    Export { path: Option<PathBuf> },
    /// Forget all stored data.
    Reset,
}

#[derive(Args, Debug)]
pub struct Period {
    #[command(subcommand)]
    pub command: PeriodCommand,
}

#[derive(Subcommand, Debug)]
pub enum PeriodCommand {
    Show,
    Next,
    Prev,
    Set { period: PeriodKey },
    Shift {
        #[arg(allow_negative_numbers = true)]
        months: i32,
    },
    /// Periods with recorded expenses, newest first.
    List,
}

#[derive(Args, Debug)]
pub struct Expense {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// Entries of a period, the current one by default.
    List {
        #[arg(long)]
        period: Option<PeriodKey>,
    },
    Add(ExpenseAddArgs),
    Edit(ExpenseEditArgs),
    Rm { id: String },
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    pub name: String,
    pub amount: MoneyCents,
    #[arg(long)]
    pub savings: bool,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ExpenseEditArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub amount: Option<MoneyCents>,
    #[arg(long)]
    pub savings: Option<bool>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct Salary {
    #[command(subcommand)]
    pub command: SalaryCommand,
}

#[derive(Subcommand, Debug)]
pub enum SalaryCommand {
    Show,
    Set { field: SalaryField, amount: MoneyCents },
}

#[derive(Args, Debug)]
pub struct Employee {
    #[command(subcommand)]
    pub command: EmployeeCommand,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    Show,
    Set(EmployeeSetArgs),
}

#[derive(Args, Debug)]
pub struct EmployeeSetArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub employee_id: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_expense_add() {
        let cli = Cli::try_parse_from([
            "pocket", "expense", "add", "Rent", "1200,50", "--category", "home",
        ])
        .unwrap();
        let Command::Expense(Expense {
            command: ExpenseCommand::Add(args),
        }) = cli.command
        else {
            panic!("expected expense add");
        };
        assert_eq!(args.amount, MoneyCents::new(120_050));
        assert_eq!(args.category.as_deref(), Some("home"));
        assert!(!args.savings);
    }

    #[test]
    fn parses_negative_shift_and_salary_field() {
        let cli = Cli::try_parse_from(["pocket", "period", "shift", "-3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Period(Period {
                command: PeriodCommand::Shift { months: -3 }
            })
        ));

        let cli = Cli::try_parse_from(["pocket", "salary", "set", "income-tax", "250"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Salary(Salary {
                command: SalaryCommand::Set {
                    field: SalaryField::IncomeTax,
                    ..
                }
            })
        ));
    }

    #[test]
    fn rejects_bad_period() {
        assert!(Cli::try_parse_from(["pocket", "period", "set", "2024-13"]).is_err());
    }
}
