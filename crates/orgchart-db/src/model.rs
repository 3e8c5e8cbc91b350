//! Typed row structs for the three tables and the denormalized list views.

use rust_decimal::Decimal;
use tokio_postgres::Row;

/// Rendering of a null `manager_id` in employee listings.
pub const NO_MANAGER: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub title: String,
    pub salary: Decimal,
    pub department_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub manager_id: Option<i32>,
}

/// A role joined with the name of its department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRow {
    pub id: i32,
    pub title: String,
    pub salary: Decimal,
    pub department: String,
}

/// An employee joined with role, department, and manager name.
///
/// `manager` carries the manager's full name, or [`NO_MANAGER`] for
/// employees at the root of the reporting tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub department: String,
    pub salary: Decimal,
    pub manager: String,
}

impl TryFrom<&Row> for Department {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl TryFrom<&Row> for Role {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            salary: row.try_get("salary")?,
            department_id: row.try_get("department_id")?,
        })
    }
}

impl TryFrom<&Row> for Employee {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role_id: row.try_get("role_id")?,
            manager_id: row.try_get("manager_id")?,
        })
    }
}

impl TryFrom<&Row> for RoleRow {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            salary: row.try_get("salary")?,
            department: row.try_get("department")?,
        })
    }
}

impl TryFrom<&Row> for EmployeeRow {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            title: row.try_get("title")?,
            department: row.try_get("department")?,
            salary: row.try_get("salary")?,
            manager: row.try_get("manager")?,
        })
    }
}
