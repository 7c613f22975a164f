//! Runs one parsed command against the store and prints the result.

use std::path::PathBuf;

use engine::{
    Dashboard, EmployeeInfo, ExpenseEntry, ExpensePatch, FieldKind, HEALTHY_SAVINGS_RATE,
    NewExpense, PeriodStore, YearlyRollup, compute_salary_totals, storage::SnapshotProvider,
};

use crate::{
    cli::{
        Command, EmployeeCommand, EmployeeSetArgs, ExpenseAddArgs, ExpenseCommand,
        ExpenseEditArgs, PeriodCommand, SalaryCommand,
    },
    error::{AppError, Result},
};

pub async fn execute<P: SnapshotProvider>(
    store: &mut PeriodStore<P>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Summary => print_dashboard(&store.dashboard()),
        Command::Year { year } => {
            let year = year.unwrap_or_else(|| store.current_period().year());
            print_yearly(&store.yearly_rollup(year));
        }
        Command::Period(period) => run_period(store, period.command).await?,
        Command::Expense(expense) => run_expense(store, expense.command).await?,
        Command::Salary(salary) => match salary.command {
            SalaryCommand::Show => print_salary(store),
            SalaryCommand::Set { field, amount } => {
                store.set_salary_field(field, amount).await?;
                println!("{}: {amount}", field.label());
            }
        },
        Command::Employee(employee) => match employee.command {
            EmployeeCommand::Show => print_employee(store.employee()),
            EmployeeCommand::Set(args) => {
                let employee = merge_employee(store.employee().clone(), args);
                store.update_employee(employee).await;
                print_employee(store.employee());
            }
        },
        Command::Export { path } => {
            let path = path.unwrap_or_else(default_export_path);
            engine::export_to_file(&store.snapshot(), &path)?;
            println!("exported to {}", path.display());
        }
        Command::Reset => {
            store.reset().await;
            println!("all data cleared");
        }
    }
    Ok(())
}

async fn run_period<P: SnapshotProvider>(
    store: &mut PeriodStore<P>,
    command: PeriodCommand,
) -> Result<()> {
    match command {
        PeriodCommand::Show => {}
        PeriodCommand::Next => {
            store.shift_current_period(1).await?;
        }
        PeriodCommand::Prev => {
            store.shift_current_period(-1).await?;
        }
        PeriodCommand::Set { period } => store.set_current_period(period).await,
        PeriodCommand::Shift { months } => {
            store.shift_current_period(months).await?;
        }
        PeriodCommand::List => {
            let current = store.current_period();
            for period in store.available_periods().into_iter().rev() {
                let marker = if period == current { "*" } else { " " };
                println!(
                    "{marker} {period}  {:<16} {} entries",
                    period.label(),
                    store.expenses(period).len()
                );
            }
            return Ok(());
        }
    }
    let current = store.current_period();
    println!("{current} ({})", current.label());
    Ok(())
}

async fn run_expense<P: SnapshotProvider>(
    store: &mut PeriodStore<P>,
    command: ExpenseCommand,
) -> Result<()> {
    match command {
        ExpenseCommand::List { period } => {
            let period = period.unwrap_or_else(|| store.current_period());
            let entries = store.expenses(period);
            if entries.is_empty() {
                println!("no expenses recorded for {}", period.label());
            }
            for entry in entries {
                print_entry(entry);
            }
        }
        ExpenseCommand::Add(args) => {
            let entry = store.add_expense(new_expense(args)).await?;
            print_entry(&entry);
        }
        ExpenseCommand::Edit(args) => {
            let (id, patch) = expense_patch(args)?;
            let entry = store.edit_expense(&id, patch).await?;
            print_entry(&entry);
        }
        ExpenseCommand::Rm { id } => {
            let entry = store.delete_expense(&id).await?;
            println!("removed {}", entry.name);
        }
    }
    Ok(())
}

fn new_expense(args: ExpenseAddArgs) -> NewExpense {
    let mut draft = NewExpense::new(args.name, args.amount);
    if args.savings {
        draft = draft.savings(true);
    }
    if let Some(category) = args.category {
        draft = draft.category(category);
    }
    if let Some(date) = args.date {
        draft = draft.date(date);
    }
    draft.notes = args.notes;
    draft
}

fn expense_patch(args: ExpenseEditArgs) -> Result<(String, ExpensePatch)> {
    let patch = ExpensePatch {
        name: args.name,
        amount: args.amount,
        category: args.category,
        is_savings: args.savings,
        notes: args.notes,
        date: None,
    };
    if patch.is_empty() {
        return Err(AppError::Usage("nothing to change".to_string()));
    }
    Ok((args.id, patch))
}

fn merge_employee(mut employee: EmployeeInfo, args: EmployeeSetArgs) -> EmployeeInfo {
    if let Some(name) = args.name {
        employee.name = name;
    }
    if let Some(employee_id) = args.employee_id {
        employee.employee_id = employee_id;
    }
    if let Some(department) = args.department {
        employee.department = department;
    }
    if let Some(position) = args.position {
        employee.position = position;
    }
    employee
}

fn default_export_path() -> PathBuf {
    let today = chrono::Local::now().date_naive();
    PathBuf::from(format!("pocket-data-{today}.csv"))
}

fn print_entry(entry: &ExpenseEntry) {
    let kind = if entry.counts_as_savings() {
        "savings"
    } else {
        "expense"
    };
    println!(
        "{:<36}  {:<20} {:>12}  {kind}{}",
        entry.id,
        entry.name,
        entry.amount.to_string(),
        entry
            .category
            .as_deref()
            .map(|category| format!(" [{category}]"))
            .unwrap_or_default()
    );
}

fn print_dashboard(dashboard: &Dashboard) {
    let summary = &dashboard.summary;
    println!("{}", dashboard.period.label());
    println!("  Gross pay          {:>12}", dashboard.salary.gross_pay.to_string());
    println!(
        "  Total deductions   {:>12}",
        dashboard.salary.total_deductions.to_string()
    );
    println!("  Net pay            {:>12}", dashboard.salary.net_pay.to_string());
    println!(
        "  Expenses           {:>12}",
        dashboard.period_totals.total_expenses.to_string()
    );
    println!(
        "  Savings            {:>12}",
        dashboard.period_totals.total_savings.to_string()
    );
    println!(
        "  Balance remaining  {:>12}  {}",
        summary.balance_remaining.to_string(),
        if summary.is_positive_cash_flow() {
            "positive cash flow"
        } else {
            "negative cash flow"
        }
    );
    println!(
        "  Savings rate       {:>11.1}%  {}",
        summary.savings_rate,
        if summary.is_healthy_savings() {
            "healthy".to_string()
        } else {
            format!("aim for more than {HEALTHY_SAVINGS_RATE}%")
        }
    );
    println!();
    print_yearly(&dashboard.yearly);
}

fn print_yearly(rollup: &YearlyRollup) {
    match rollup {
        YearlyRollup::NoData { year } => println!("{year}: nothing tracked yet"),
        YearlyRollup::Tracked(totals) => {
            println!("{}: {} month(s) tracked", totals.year, totals.months_tracked);
            println!("  Expenses           {:>12}", totals.total_expenses.to_string());
            println!("  Savings            {:>12}", totals.total_savings.to_string());
            println!(
                "  Monthly average    {:>12}",
                totals.monthly_average_expenses.to_string()
            );
        }
    }
}

fn print_salary<P: SnapshotProvider>(store: &PeriodStore<P>) {
    let salary = store.salary();
    for (kind, title) in [
        (FieldKind::Earning, "Earnings"),
        (FieldKind::Deduction, "Deductions"),
        (FieldKind::EmployerContribution, "Employer contributions"),
    ] {
        println!("{title}");
        for (field, amount) in salary.fields().filter(|(field, _)| field.kind() == kind) {
            println!(
                "  {:<26} {:>12}  ({})",
                field.label(),
                amount.to_string(),
                field.key()
            );
        }
    }
    let totals = compute_salary_totals(salary);
    println!(
        "Gross pay {}  Deductions {}  Net pay {}",
        totals.gross_pay, totals.total_deductions, totals.net_pay
    );
}

fn print_employee(employee: &EmployeeInfo) {
    println!("Name         {}", employee.name);
    println!("Employee ID  {}", employee.employee_id);
    println!("Department   {}", employee.department);
    println!("Position     {}", employee.position);
}
