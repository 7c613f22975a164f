use serde::{Deserialize, Serialize};

/// Who the payslip belongs to. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeInfo {
    pub name: String,
    pub employee_id: String,
    pub department: String,
    pub position: String,
}
