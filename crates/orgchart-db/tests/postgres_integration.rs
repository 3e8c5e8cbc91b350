//! Integration tests against real PostgreSQL.
//!
//! Each test provisions a disposable Postgres container, builds a pool
//! through the normal config path, and exercises the query layer
//! end to end: constraint errors, referential blocking, the manager
//! hierarchy, and the null-aggregate budget contract.
//!
//! Note: Requires Docker to be running.

use orgchart_db::{DbConfig, Error, Store};
use rust_decimal::Decimal;
use std::time::Duration;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;

/// Start a Postgres container and return a ready `Store` with the schema
/// in place. The container must stay alive for the test's duration.
async fn setup() -> (ContainerAsync<Postgres>, Store) {
    let container = Postgres::default()
        .start()
        .await
        .expect("failed to start postgres container");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("postgres port not mapped");

    let config = DbConfig::from_lookup(|name| match name {
        "DB_HOST" => Some("127.0.0.1".to_string()),
        "DB_USER" => Some("postgres".to_string()),
        "DB_PASSWORD" => Some("postgres".to_string()),
        "DB_NAME" => Some("postgres".to_string()),
        "DB_PORT" => Some(port.to_string()),
        _ => None,
    })
    .expect("config");
    let store = Store::new(config.create_pool().expect("failed to build pool"));

    // The container can accept TCP before it accepts logins, so retry the
    // first statement for a little while.
    let mut attempts = 0;
    loop {
        attempts += 1;
        match store.ensure_schema().await {
            Ok(()) => break,
            Err(_) if attempts < 50 => {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Err(e) => panic!("postgres never became ready: {e}"),
        }
    }

    (container, store)
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let (_pg, store) = setup().await;

    // setup() already ran it once; a second run must not error and the
    // tables must still be usable.
    store.ensure_schema().await.expect("second ensure_schema");
    let departments = store.list_departments().await.expect("list");
    assert!(departments.is_empty());
}

#[tokio::test]
async fn seed_baseline_is_repeatable() {
    let (_pg, store) = setup().await;

    store.seed_baseline().await.expect("first seed");
    store.seed_baseline().await.expect("second seed");

    let departments = store.list_departments().await.unwrap();
    assert_eq!(departments.len(), 3);
    let roles = store.list_roles().await.unwrap();
    assert_eq!(roles.len(), 3);
    let employees = store.list_employees().await.unwrap();
    assert_eq!(employees.len(), 3);

    // John Doe is a root of the reporting tree.
    let john = employees
        .iter()
        .find(|e| e.first_name == "John")
        .expect("seeded employee");
    assert_eq!(john.manager, orgchart_db::NO_MANAGER);

    // Roe Wade reports to John Doe.
    let roe = employees.iter().find(|e| e.first_name == "Roe").unwrap();
    assert_eq!(roe.manager, "John Doe");
}

#[tokio::test]
async fn duplicate_department_name_is_rejected() {
    let (_pg, store) = setup().await;

    store.add_department("Engineering").await.expect("first insert");
    let err = store.add_department("Engineering").await.unwrap_err();
    assert!(matches!(err, Error::Uniqueness(_)), "got {err:?}");

    let departments = store.list_departments().await.unwrap();
    assert_eq!(
        departments.iter().filter(|d| d.name == "Engineering").count(),
        1
    );
}

#[tokio::test]
async fn add_role_requires_existing_department() {
    let (_pg, store) = setup().await;

    let err = store
        .add_role("Ghost Role", Decimal::from(50_000), 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForeignKey(_)), "got {err:?}");
    assert!(store.list_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_salary_is_rejected() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Finance").await.unwrap();
    let err = store
        .add_role("Unpaid Intern", Decimal::from(-1), dept.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_role_title_is_rejected() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    store
        .add_role("Engineer", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let err = store
        .add_role("Engineer", Decimal::from(200), dept.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Uniqueness(_)), "got {err:?}");
}

#[tokio::test]
async fn employee_without_manager_lists_as_none() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let role = store
        .add_role("Engineer", Decimal::from(100_000), dept.id)
        .await
        .unwrap();
    let employee = store
        .add_employee("Ada", "Lovelace", role.id, None)
        .await
        .unwrap();
    assert_eq!(employee.manager_id, None);

    let rows = store.list_employees().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].manager, orgchart_db::NO_MANAGER);
    assert_eq!(rows[0].title, "Engineer");
    assert_eq!(rows[0].department, "Engineering");
}

#[tokio::test]
async fn add_employee_requires_existing_role_and_manager() {
    let (_pg, store) = setup().await;

    let err = store
        .add_employee("No", "Role", 42, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForeignKey(_)), "got {err:?}");

    let dept = store.add_department("Ops").await.unwrap();
    let role = store
        .add_role("Operator", Decimal::from(90_000), dept.id)
        .await
        .unwrap();
    let err = store
        .add_employee("No", "Manager", role.id, Some(42))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForeignKey(_)), "got {err:?}");
}

#[tokio::test]
async fn delete_department_blocked_while_roles_reference_it() {
    let (_pg, store) = setup().await;

    let kept = store.add_department("Engineering").await.unwrap();
    store
        .add_role("Engineer", Decimal::from(100), kept.id)
        .await
        .unwrap();
    let empty = store.add_department("Mailroom").await.unwrap();

    let err = store.delete_department(kept.id).await.unwrap_err();
    assert!(matches!(err, Error::ReferentialBlock(_)), "got {err:?}");
    let names: Vec<_> = store
        .list_departments()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert!(names.contains(&"Engineering".to_string()));

    let deleted = store.delete_department(empty.id).await.unwrap();
    assert_eq!(deleted, Some(empty));
    let names: Vec<_> = store
        .list_departments()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert!(!names.contains(&"Mailroom".to_string()));
}

#[tokio::test]
async fn delete_role_blocked_while_employees_hold_it() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Sales").await.unwrap();
    let role = store
        .add_role("Associate", Decimal::from(60_000), dept.id)
        .await
        .unwrap();
    store
        .add_employee("Jace", "Smith", role.id, None)
        .await
        .unwrap();

    let err = store.delete_role(role.id).await.unwrap_err();
    assert!(matches!(err, Error::ReferentialBlock(_)), "got {err:?}");
}

#[tokio::test]
async fn department_budget_sums_salaries_and_distinguishes_empty() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let junior = store
        .add_role("Junior", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let senior = store
        .add_role("Senior", Decimal::from(200), dept.id)
        .await
        .unwrap();
    store.add_employee("A", "One", junior.id, None).await.unwrap();
    store.add_employee("B", "Two", senior.id, None).await.unwrap();

    let budget = store.department_budget(dept.id).await.unwrap();
    assert_eq!(budget, Some(Decimal::from(300)));

    // A department with no employees has no budget at all, which is not
    // the same thing as a budget of zero.
    let empty = store.add_department("Mailroom").await.unwrap();
    assert_eq!(store.department_budget(empty.id).await.unwrap(), None);
}

#[tokio::test]
async fn self_management_and_ancestor_cycles_are_rejected() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let role = store
        .add_role("Engineer", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let boss = store.add_employee("Top", "Boss", role.id, None).await.unwrap();
    let report = store
        .add_employee("Direct", "Report", role.id, Some(boss.id))
        .await
        .unwrap();

    let err = store
        .update_employee_manager(boss.id, Some(boss.id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ManagerCycle { .. }), "got {err:?}");

    // boss -> report -> boss would make boss its own ancestor.
    let err = store
        .update_employee_manager(boss.id, Some(report.id))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ManagerCycle { .. }), "got {err:?}");

    // Nothing was written by the rejected calls.
    let rows = store.employees_by_manager(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, boss.id);

    // A legitimate reassignment still works: give the report a new
    // manager outside its own subtree.
    let peer = store.add_employee("Other", "Lead", role.id, None).await.unwrap();
    let updated = store
        .update_employee_manager(report.id, Some(peer.id))
        .await
        .unwrap()
        .expect("employee exists");
    assert_eq!(updated.manager_id, Some(peer.id));
}

#[tokio::test]
async fn employees_by_manager_round_trip() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let role = store
        .add_role("Engineer", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let manager = store.add_employee("Mana", "Ger", role.id, None).await.unwrap();
    let direct = store
        .add_employee("New", "Hire", role.id, Some(manager.id))
        .await
        .unwrap();

    let reports = store.employees_by_manager(Some(manager.id)).await.unwrap();
    assert_eq!(reports, vec![direct]);

    // None selects the unmanaged employees.
    let roots = store.employees_by_manager(None).await.unwrap();
    assert_eq!(roots, vec![manager]);
}

#[tokio::test]
async fn employees_by_department_joins_through_role() {
    let (_pg, store) = setup().await;

    let eng = store.add_department("Engineering").await.unwrap();
    let sales = store.add_department("Sales").await.unwrap();
    let eng_role = store
        .add_role("Engineer", Decimal::from(100), eng.id)
        .await
        .unwrap();
    let sales_role = store
        .add_role("Associate", Decimal::from(50), sales.id)
        .await
        .unwrap();
    let engineer = store.add_employee("E", "Ng", eng_role.id, None).await.unwrap();
    store.add_employee("S", "Ells", sales_role.id, None).await.unwrap();

    let in_eng = store.employees_by_department(eng.id).await.unwrap();
    assert_eq!(in_eng, vec![engineer]);
}

#[tokio::test]
async fn updates_and_deletes_report_absence_as_none() {
    let (_pg, store) = setup().await;

    assert_eq!(store.update_employee_role(404, 1).await.unwrap(), None);
    assert_eq!(store.update_employee_manager(404, None).await.unwrap(), None);
    assert_eq!(store.delete_department(404).await.unwrap(), None);
    assert_eq!(store.delete_role(404).await.unwrap(), None);
    assert_eq!(store.delete_employee(404).await.unwrap(), None);
}

#[tokio::test]
async fn update_employee_role_moves_employee() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let junior = store
        .add_role("Junior", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let senior = store
        .add_role("Senior", Decimal::from(200), dept.id)
        .await
        .unwrap();
    let employee = store.add_employee("Up", "Start", junior.id, None).await.unwrap();

    let updated = store
        .update_employee_role(employee.id, senior.id)
        .await
        .unwrap()
        .expect("employee exists");
    assert_eq!(updated.role_id, senior.id);

    let err = store
        .update_employee_role(employee.id, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForeignKey(_)), "got {err:?}");
}

#[tokio::test]
async fn deleting_a_manager_orphans_subordinates_to_root() {
    let (_pg, store) = setup().await;

    let dept = store.add_department("Engineering").await.unwrap();
    let role = store
        .add_role("Engineer", Decimal::from(100), dept.id)
        .await
        .unwrap();
    let manager = store.add_employee("Mana", "Ger", role.id, None).await.unwrap();
    let report = store
        .add_employee("Left", "Behind", role.id, Some(manager.id))
        .await
        .unwrap();

    let deleted = store.delete_employee(manager.id).await.unwrap();
    assert_eq!(deleted.map(|e| e.id), Some(manager.id));

    let roots = store.employees_by_manager(None).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, report.id);
    assert_eq!(roots[0].manager_id, None);
}
