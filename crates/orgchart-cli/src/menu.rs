//! The interactive menu loop.
//!
//! Presents the numbered menu, collects inputs, dispatches to the query
//! layer, and renders results. A failed operation is printed and the loop
//! continues; only connection failure ends the session.

use crate::{prompt, render};
use orgchart_db::{Error, Store};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

const MENU: &str = "
 1  View all departments           9  Add an employee
 2  View all roles                10  Update an employee's role
 3  View all employees            11  Update an employee's manager
 4  View employees by manager     12  Delete a department
 5  View employees by department  13  Delete a role
 6  View total department budget  14  Delete an employee
 7  Add a department              15  Quit
 8  Add a role
";

/// Run the menu loop until the user quits or the connection dies.
pub async fn run(store: &Store) -> Result<(), Error> {
    loop {
        println!("{MENU}");
        let choice: u32 = match prompt::parse("What would you like to do? [1-15]") {
            Ok(choice) => choice,
            // Ctrl-D or exhausted piped input: quit cleanly.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                println!("Bye.");
                return Ok(());
            }
            Err(e) => return Err(fatal_io(e)),
        };
        if choice == 15 {
            println!("Bye.");
            return Ok(());
        }

        match dispatch(store, choice).await {
            Ok(()) => {}
            // The session cannot continue without a database.
            Err(err @ Error::Connection(_)) => return Err(err),
            Err(err) => println!("{}", err.red()),
        }
    }
}

async fn dispatch(store: &Store, choice: u32) -> Result<(), Error> {
    match choice {
        1 => {
            let rows = store.list_departments().await?;
            println!("{}", render::departments(&rows));
        }
        2 => {
            let rows = store.list_roles().await?;
            println!("{}", render::roles(&rows));
        }
        3 => {
            let rows = store.list_employees().await?;
            println!("{}", render::employees(&rows));
        }
        4 => {
            let manager_id =
                prompt::parse_opt("Manager id (blank for unmanaged):").map_err(fatal_io)?;
            let rows = store.employees_by_manager(manager_id).await?;
            println!("{}", render::employees_brief(&rows));
        }
        5 => {
            let department_id = prompt::parse("Department id:").map_err(fatal_io)?;
            let rows = store.employees_by_department(department_id).await?;
            println!("{}", render::employees_brief(&rows));
        }
        6 => {
            let department_id = prompt::parse("Department id:").map_err(fatal_io)?;
            match store.department_budget(department_id).await? {
                Some(total) => println!("Total budget: {total}"),
                None => println!("That department has no employees, so no budget."),
            }
        }
        7 => {
            let name = prompt::nonempty("Department name:").map_err(fatal_io)?;
            let department = store.add_department(&name).await?;
            println!("{}", format!("Added department {}.", department.name).green());
        }
        8 => {
            let title = prompt::nonempty("Role title:").map_err(fatal_io)?;
            let salary: Decimal = prompt::parse("Salary:").map_err(fatal_io)?;
            let department_id = prompt::parse("Department id:").map_err(fatal_io)?;
            let role = store.add_role(&title, salary, department_id).await?;
            println!("{}", format!("Added role {}.", role.title).green());
        }
        9 => {
            let first = prompt::nonempty("First name:").map_err(fatal_io)?;
            let last = prompt::nonempty("Last name:").map_err(fatal_io)?;
            let role_id = prompt::parse("Role id:").map_err(fatal_io)?;
            let manager_id =
                prompt::parse_opt("Manager id (blank for none):").map_err(fatal_io)?;
            let employee = store.add_employee(&first, &last, role_id, manager_id).await?;
            println!(
                "{}",
                format!("Added employee {} {}.", employee.first_name, employee.last_name).green()
            );
        }
        10 => {
            let employee_id = prompt::parse("Employee id:").map_err(fatal_io)?;
            let role_id = prompt::parse("New role id:").map_err(fatal_io)?;
            match store.update_employee_role(employee_id, role_id).await? {
                Some(e) => println!(
                    "{}",
                    format!("{} {} now holds role {}.", e.first_name, e.last_name, e.role_id)
                        .green()
                ),
                None => println!("No employee with id {employee_id}."),
            }
        }
        11 => {
            let employee_id = prompt::parse("Employee id:").map_err(fatal_io)?;
            let manager_id =
                prompt::parse_opt("New manager id (blank for none):").map_err(fatal_io)?;
            match store.update_employee_manager(employee_id, manager_id).await? {
                Some(e) => println!(
                    "{}",
                    format!("Updated manager for {} {}.", e.first_name, e.last_name).green()
                ),
                None => println!("No employee with id {employee_id}."),
            }
        }
        12 => {
            let department_id = prompt::parse("Department id:").map_err(fatal_io)?;
            match store.delete_department(department_id).await? {
                Some(d) => println!("{}", format!("Deleted department {}.", d.name).green()),
                None => println!("No department with id {department_id}."),
            }
        }
        13 => {
            let role_id = prompt::parse("Role id:").map_err(fatal_io)?;
            match store.delete_role(role_id).await? {
                Some(r) => println!("{}", format!("Deleted role {}.", r.title).green()),
                None => println!("No role with id {role_id}."),
            }
        }
        14 => {
            let employee_id = prompt::parse("Employee id:").map_err(fatal_io)?;
            match store.delete_employee(employee_id).await? {
                Some(e) => println!(
                    "{}",
                    format!(
                        "Deleted employee {} {}; their reports are now unmanaged.",
                        e.first_name, e.last_name
                    )
                    .green()
                ),
                None => println!("No employee with id {employee_id}."),
            }
        }
        other => println!("No such menu entry: {other}"),
    }
    Ok(())
}

fn fatal_io(err: std::io::Error) -> Error {
    Error::Connection(format!("terminal i/o failed: {err}"))
}
