//! Tabular export of a [`StoreSnapshot`].
//!
//! The output is one CSV document made of three sections separated by a blank
//! line: the employee profile, the salary slip and the expenses of every
//! period. Each section carries its own header row.

use std::{io::Write, path::Path};

use serde::Serialize;

use crate::{ResultEngine, StoreSnapshot};

#[derive(Serialize)]
struct ProfileRow<'a> {
    field: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SalaryRow {
    label: &'static str,
    amount: String,
}

#[derive(Serialize)]
struct ExpenseRow<'a> {
    period: String,
    name: &'a str,
    amount: String,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'a str,
}

/// Writes the three sections of `snapshot` to `writer`.
pub fn write_csv<W: Write>(snapshot: &StoreSnapshot, mut writer: W) -> ResultEngine<()> {
    write_profile(snapshot, &mut writer)?;
    writer.write_all(b"\n")?;
    write_salary(snapshot, &mut writer)?;
    writer.write_all(b"\n")?;
    write_expenses(snapshot, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes the export to `path`, creating parent directories when needed.
pub fn export_to_file(snapshot: &StoreSnapshot, path: &Path) -> ResultEngine<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(snapshot, std::io::BufWriter::new(file))?;
    tracing::info!("exported snapshot to {}", path.display());
    Ok(())
}

fn write_profile<W: Write>(snapshot: &StoreSnapshot, writer: &mut W) -> ResultEngine<()> {
    let employee = &snapshot.employee;
    let period = snapshot.current_period.to_string();
    let rows = [
        ("Name", employee.name.as_str()),
        ("Employee ID", employee.employee_id.as_str()),
        ("Department", employee.department.as_str()),
        ("Position", employee.position.as_str()),
        ("Current period", period.as_str()),
    ];

    let mut csv = csv::Writer::from_writer(writer);
    for (field, value) in rows {
        csv.serialize(ProfileRow { field, value })?;
    }
    csv.flush()?;
    Ok(())
}

fn write_salary<W: Write>(snapshot: &StoreSnapshot, writer: &mut W) -> ResultEngine<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (field, amount) in snapshot.salary.fields() {
        csv.serialize(SalaryRow {
            label: field.label(),
            amount: amount.to_string(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

fn write_expenses<W: Write>(snapshot: &StoreSnapshot, writer: &mut W) -> ResultEngine<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0;
    for (period, entries) in &snapshot.expenses_by_period {
        for entry in entries {
            csv.serialize(ExpenseRow {
                period: period.to_string(),
                name: &entry.name,
                amount: entry.amount.to_string(),
                kind: if entry.counts_as_savings() {
                    "Savings"
                } else {
                    "Expense"
                },
                category: entry.category.as_deref().unwrap_or(""),
            })?;
            written += 1;
        }
    }
    if written == 0 {
        // Header only, so the section is still recognisable.
        csv.write_record(["period", "name", "amount", "type", "category"])?;
    }
    csv.flush()?;
    Ok(())
}
