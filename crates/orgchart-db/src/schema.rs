//! Schema provisioning and baseline seed data.
//!
//! Tables are created in dependency order (department, role, employee) so
//! foreign keys resolve, with `IF NOT EXISTS` making startup idempotent.
//!
//! Deletion policy: `department` and `role` rows are blocked from deletion
//! while dependents reference them (plain `REFERENCES`, surfaced as
//! `ReferentialBlock`). Deleting an employee sets subordinates'
//! `manager_id` to NULL, turning them into roots of the reporting tree.

use crate::error::Error;
use crate::store::Store;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS department (
    id SERIAL PRIMARY KEY,
    name VARCHAR(30) UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS role (
    id SERIAL PRIMARY KEY,
    title VARCHAR(30) UNIQUE NOT NULL,
    salary DECIMAL NOT NULL CHECK (salary >= 0),
    department_id INTEGER NOT NULL REFERENCES department(id)
);

CREATE TABLE IF NOT EXISTS employee (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(30) NOT NULL,
    last_name VARCHAR(30) NOT NULL,
    role_id INTEGER NOT NULL REFERENCES role(id),
    manager_id INTEGER REFERENCES employee(id) ON DELETE SET NULL
);
"#;

// Employee has no natural unique key, so seed rows guard with NOT EXISTS
// instead of ON CONFLICT. Parents are resolved by name/title rather than
// assuming serial ids line up.
const SEED_SQL: &str = r#"
INSERT INTO department (name)
VALUES ('Engineering'), ('Human Resources'), ('Sales')
ON CONFLICT (name) DO NOTHING;

INSERT INTO role (title, salary, department_id)
SELECT v.title, v.salary, d.id
FROM (VALUES
    ('Software Engineer', 120000::decimal, 'Engineering'),
    ('HR Manager', 80000::decimal, 'Human Resources'),
    ('Sales Associate', 60000::decimal, 'Sales')
) AS v(title, salary, department), department d
WHERE d.name = v.department
ON CONFLICT (title) DO NOTHING;

INSERT INTO employee (first_name, last_name, role_id, manager_id)
SELECT 'John', 'Doe', (SELECT id FROM role WHERE title = 'Software Engineer'), NULL
WHERE NOT EXISTS (
    SELECT 1 FROM employee WHERE first_name = 'John' AND last_name = 'Doe'
);

INSERT INTO employee (first_name, last_name, role_id, manager_id)
SELECT 'Roe', 'Wade',
       (SELECT id FROM role WHERE title = 'HR Manager'),
       (SELECT id FROM employee WHERE first_name = 'John' AND last_name = 'Doe')
WHERE NOT EXISTS (
    SELECT 1 FROM employee WHERE first_name = 'Roe' AND last_name = 'Wade'
);

INSERT INTO employee (first_name, last_name, role_id, manager_id)
SELECT 'Jace', 'Smith',
       (SELECT id FROM role WHERE title = 'Sales Associate'),
       (SELECT id FROM employee WHERE first_name = 'Roe' AND last_name = 'Wade')
WHERE NOT EXISTS (
    SELECT 1 FROM employee WHERE first_name = 'Jace' AND last_name = 'Smith'
);
"#;

impl Store {
    /// Create the three tables if they do not exist yet.
    ///
    /// Safe to call on every startup. Any failure here is fatal: the rest
    /// of the system cannot function without the schema.
    pub async fn ensure_schema(&self) -> Result<(), Error> {
        let conn = self.pool().get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::debug!("schema ensured");
        Ok(())
    }

    /// Insert baseline departments, roles, and employees.
    ///
    /// Rows that already exist are skipped (insert-or-ignore), so repeated
    /// invocation neither errors nor duplicates.
    pub async fn seed_baseline(&self) -> Result<(), Error> {
        let conn = self.pool().get().await?;
        conn.batch_execute(SEED_SQL).await?;
        tracing::debug!("baseline seed applied");
        Ok(())
    }
}
