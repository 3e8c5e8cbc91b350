//! Tabular rendering of query results.

use comfy_table::{presets, Table};
use orgchart_db::{Department, Employee, EmployeeRow, RoleRow};

fn base_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(header.to_vec());
    table
}

pub fn departments(rows: &[Department]) -> Table {
    let mut table = base_table(&["id", "name"]);
    for d in rows {
        table.add_row(vec![d.id.to_string(), d.name.clone()]);
    }
    table
}

pub fn roles(rows: &[RoleRow]) -> Table {
    let mut table = base_table(&["id", "title", "salary", "department"]);
    for r in rows {
        table.add_row(vec![
            r.id.to_string(),
            r.title.clone(),
            r.salary.to_string(),
            r.department.clone(),
        ]);
    }
    table
}

pub fn employees(rows: &[EmployeeRow]) -> Table {
    let mut table = base_table(&[
        "id",
        "first name",
        "last name",
        "title",
        "department",
        "salary",
        "manager",
    ]);
    for e in rows {
        table.add_row(vec![
            e.id.to_string(),
            e.first_name.clone(),
            e.last_name.clone(),
            e.title.clone(),
            e.department.clone(),
            e.salary.to_string(),
            e.manager.clone(),
        ]);
    }
    table
}

/// Raw employee rows, used for the filtered views where role and
/// department are already implied by the filter.
pub fn employees_brief(rows: &[Employee]) -> Table {
    let mut table = base_table(&["id", "first name", "last name", "role id", "manager id"]);
    for e in rows {
        table.add_row(vec![
            e.id.to_string(),
            e.first_name.clone(),
            e.last_name.clone(),
            e.role_id.to_string(),
            e.manager_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        ]);
    }
    table
}
