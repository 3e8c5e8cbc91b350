//! The query layer: the fixed operation set the interactive shell calls.
//!
//! All SQL text and parameter binding lives here; no other component
//! touches the connection. Every operation acquires a connection from the
//! pool, runs one statement, and releases it. Caller-supplied values are
//! always bound as parameters, never interpolated.

use crate::error::Error;
use crate::model::{Department, Employee, EmployeeRow, Role, RoleRow};
use crate::pool::DbPool;
use rust_decimal::Decimal;

/// Query layer over the department/role/employee tables.
///
/// Holds the injected pool; no cached state between calls, every read
/// goes back to storage.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

const LIST_EMPLOYEES_SQL: &str = "\
    SELECT employee.id, employee.first_name, employee.last_name, \
           role.title, department.name AS department, role.salary, \
           COALESCE(manager.first_name || ' ' || manager.last_name, 'None') AS manager \
    FROM employee \
    JOIN role ON employee.role_id = role.id \
    JOIN department ON role.department_id = department.id \
    LEFT JOIN employee AS manager ON employee.manager_id = manager.id \
    ORDER BY employee.id";

// Walks upward from the candidate manager through manager_id pointers.
// Depth is bounded by the employee count so the walk terminates even if
// stored data already contains a cycle.
const ANCESTOR_CYCLE_SQL: &str = "\
    WITH RECURSIVE chain(id, manager_id, depth) AS ( \
        SELECT id, manager_id, 0 FROM employee WHERE id = $1 \
        UNION ALL \
        SELECT e.id, e.manager_id, c.depth + 1 \
        FROM employee e JOIN chain c ON e.id = c.manager_id \
        WHERE c.depth < (SELECT count(*) FROM employee) \
    ) \
    SELECT EXISTS(SELECT 1 FROM chain WHERE id = $2) AS cycles";

impl Store {
    /// Build a query layer over an explicitly constructed pool.
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self {
            pool: DbPool::new(pool),
        }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// All departments, in id order.
    pub async fn list_departments(&self) -> Result<Vec<Department>, Error> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query("SELECT id, name FROM department ORDER BY id", &[])
            .await?;
        rows.iter().map(|r| Ok(Department::try_from(r)?)).collect()
    }

    /// All roles, each joined with its department's name.
    pub async fn list_roles(&self) -> Result<Vec<RoleRow>, Error> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT role.id, role.title, role.salary, department.name AS department \
                 FROM role JOIN department ON role.department_id = department.id \
                 ORDER BY role.id",
                &[],
            )
            .await?;
        rows.iter().map(|r| Ok(RoleRow::try_from(r)?)).collect()
    }

    /// All employees with role title, department, salary, and manager name.
    pub async fn list_employees(&self) -> Result<Vec<EmployeeRow>, Error> {
        let conn = self.pool.get().await?;
        let rows = conn.query(LIST_EMPLOYEES_SQL, &[]).await?;
        rows.iter().map(|r| Ok(EmployeeRow::try_from(r)?)).collect()
    }

    /// Employees reporting to the given manager.
    ///
    /// `None` selects unmanaged employees (null `manager_id`); plain
    /// equality would never match NULL, hence `IS NOT DISTINCT FROM`.
    pub async fn employees_by_manager(
        &self,
        manager_id: Option<i32>,
    ) -> Result<Vec<Employee>, Error> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT id, first_name, last_name, role_id, manager_id \
                 FROM employee WHERE manager_id IS NOT DISTINCT FROM $1 \
                 ORDER BY id",
                &[&manager_id],
            )
            .await?;
        rows.iter().map(|r| Ok(Employee::try_from(r)?)).collect()
    }

    /// Employees whose role belongs to the given department.
    pub async fn employees_by_department(
        &self,
        department_id: i32,
    ) -> Result<Vec<Employee>, Error> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                "SELECT employee.id, employee.first_name, employee.last_name, \
                        employee.role_id, employee.manager_id \
                 FROM employee JOIN role ON employee.role_id = role.id \
                 WHERE role.department_id = $1 \
                 ORDER BY employee.id",
                &[&department_id],
            )
            .await?;
        rows.iter().map(|r| Ok(Employee::try_from(r)?)).collect()
    }

    /// Sum of salaries over the department's employees.
    ///
    /// Returns `None` when the department has no employees; a null
    /// aggregate is distinct from a zero budget and callers must present
    /// it as such.
    pub async fn department_budget(&self, department_id: i32) -> Result<Option<Decimal>, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "SELECT SUM(role.salary) AS total_budget \
                 FROM employee JOIN role ON employee.role_id = role.id \
                 WHERE role.department_id = $1",
                &[&department_id],
            )
            .await?;
        Ok(row.try_get("total_budget")?)
    }

    /// Create a department. Fails with [`Error::Uniqueness`] if the name
    /// is taken.
    pub async fn add_department(&self, name: &str) -> Result<Department, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO department (name) VALUES ($1) RETURNING *",
                &[&name],
            )
            .await
            .map_err(Error::from_write)?;
        Ok(Department::try_from(&row)?)
    }

    /// Create a role in an existing department.
    pub async fn add_role(
        &self,
        title: &str,
        salary: Decimal,
        department_id: i32,
    ) -> Result<Role, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO role (title, salary, department_id) \
                 VALUES ($1, $2, $3) RETURNING *",
                &[&title, &salary, &department_id],
            )
            .await
            .map_err(Error::from_write)?;
        Ok(Role::try_from(&row)?)
    }

    /// Create an employee holding an existing role, optionally reporting
    /// to an existing manager.
    pub async fn add_employee(
        &self,
        first_name: &str,
        last_name: &str,
        role_id: i32,
        manager_id: Option<i32>,
    ) -> Result<Employee, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "INSERT INTO employee (first_name, last_name, role_id, manager_id) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&first_name, &last_name, &role_id, &manager_id],
            )
            .await
            .map_err(Error::from_write)?;
        Ok(Employee::try_from(&row)?)
    }

    /// Reassign an employee's role. `Ok(None)` when the employee id does
    /// not exist.
    pub async fn update_employee_role(
        &self,
        employee_id: i32,
        new_role_id: i32,
    ) -> Result<Option<Employee>, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "UPDATE employee SET role_id = $1 WHERE id = $2 RETURNING *",
                &[&new_role_id, &employee_id],
            )
            .await
            .map_err(Error::from_write)?;
        row.as_ref().map(Employee::try_from).transpose().map_err(Error::from)
    }

    /// Reassign an employee's manager. `Ok(None)` when the employee id
    /// does not exist.
    ///
    /// Rejects self-management and any assignment that would make the
    /// employee its own ancestor, by walking the candidate manager's
    /// reporting chain before writing. Nothing is written on rejection.
    pub async fn update_employee_manager(
        &self,
        employee_id: i32,
        new_manager_id: Option<i32>,
    ) -> Result<Option<Employee>, Error> {
        if let Some(manager_id) = new_manager_id {
            if manager_id == employee_id {
                return Err(Error::ManagerCycle {
                    employee_id,
                    manager_id,
                });
            }
            let conn = self.pool.get().await?;
            let row = conn
                .query_one(ANCESTOR_CYCLE_SQL, &[&manager_id, &employee_id])
                .await?;
            if row.try_get::<_, bool>("cycles")? {
                return Err(Error::ManagerCycle {
                    employee_id,
                    manager_id,
                });
            }
        }

        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "UPDATE employee SET manager_id = $1 WHERE id = $2 RETURNING *",
                &[&new_manager_id, &employee_id],
            )
            .await
            .map_err(Error::from_write)?;
        row.as_ref().map(Employee::try_from).transpose().map_err(Error::from)
    }

    /// Delete a department. `Ok(None)` when the id does not exist; fails
    /// with [`Error::ReferentialBlock`] while roles reference it.
    pub async fn delete_department(&self, department_id: i32) -> Result<Option<Department>, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "DELETE FROM department WHERE id = $1 RETURNING *",
                &[&department_id],
            )
            .await
            .map_err(Error::from_delete)?;
        row.as_ref().map(Department::try_from).transpose().map_err(Error::from)
    }

    /// Delete a role. `Ok(None)` when the id does not exist; fails with
    /// [`Error::ReferentialBlock`] while employees hold it.
    pub async fn delete_role(&self, role_id: i32) -> Result<Option<Role>, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt("DELETE FROM role WHERE id = $1 RETURNING *", &[&role_id])
            .await
            .map_err(Error::from_delete)?;
        row.as_ref().map(Role::try_from).transpose().map_err(Error::from)
    }

    /// Delete an employee. `Ok(None)` when the id does not exist.
    /// Subordinates' `manager_id` becomes NULL (schema policy), so the
    /// delete always succeeds for an existing row.
    pub async fn delete_employee(&self, employee_id: i32) -> Result<Option<Employee>, Error> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "DELETE FROM employee WHERE id = $1 RETURNING *",
                &[&employee_id],
            )
            .await
            .map_err(Error::from_delete)?;
        row.as_ref().map(Employee::try_from).transpose().map_err(Error::from)
    }
}
