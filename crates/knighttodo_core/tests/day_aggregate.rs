use knighttodo_core::db::open_db_in_memory;
use knighttodo_core::{
    DayService, EntityKind, Hardness, Scariness, ServiceError, SqliteDayRepository, TodoDraft,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> DayService<SqliteDayRepository<'_>> {
    DayService::new(SqliteDayRepository::try_new(conn).unwrap())
}

fn draft(name: &str) -> TodoDraft {
    TodoDraft::new(name, Scariness::Low, Hardness::Easy)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn deleting_day_removes_its_todos_and_nothing_else() {
    let conn = setup();
    let service = service(&conn);

    let monday = service.save("Monday").unwrap();
    let first = service.save_todo(monday.id, &draft("Run")).unwrap();
    let second = service.save_todo(monday.id, &draft("Read")).unwrap();
    let tuesday = service.save("Tuesday").unwrap();
    let kept = service.save_todo(tuesday.id, &draft("Swim")).unwrap();

    service.delete_by_id(monday.id).unwrap();

    assert!(matches!(
        service.find_by_id(monday.id),
        Err(ServiceError::NotFound {
            entity: EntityKind::Day,
            ..
        })
    ));
    for todo_id in [first.id, second.id] {
        assert!(matches!(
            service.find_todo_by_id(monday.id, todo_id),
            Err(ServiceError::NotFound { .. })
        ));
    }
    assert_eq!(service.find_todo_by_id(tuesday.id, kept.id).unwrap(), kept);
    assert_eq!(count(&conn, "day_todos"), 1);
}

#[test]
fn failed_child_delete_rolls_back_the_whole_cascade() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    service.save_todo(day.id, &draft("Run")).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_day_todo_delete BEFORE DELETE ON day_todos
         BEGIN
             SELECT RAISE(ABORT, 'blocked');
         END;",
    )
    .unwrap();

    let err = service.delete_by_id(day.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Cascade {
            entity: EntityKind::Day,
            ..
        }
    ));
    assert_eq!(service.find_by_id(day.id).unwrap().day_todos.len(), 1);
}

#[test]
fn deleting_unknown_day_is_not_found() {
    let conn = setup();
    let service = service(&conn);

    assert!(matches!(
        service.delete_by_id(Uuid::new_v4()),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn find_by_id_returns_todos_in_insertion_order() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    let names = ["Run", "Read", "Write"];
    for name in names {
        service.save_todo(day.id, &draft(name)).unwrap();
    }

    let loaded = service.find_by_id(day.id).unwrap();
    let loaded_names: Vec<_> = loaded
        .day_todos
        .iter()
        .map(|todo| todo.day_todo_name.as_str())
        .collect();
    assert_eq!(loaded_names, names);
    assert!(loaded.day_todos.iter().all(|todo| !todo.ready && todo.experience == 0));
}

#[test]
fn update_day_keeps_todos() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    let todo = service.save_todo(day.id, &draft("Run")).unwrap();

    let updated = service.update_day(day.id, "  Blue Monday ").unwrap();

    assert_eq!(updated.day_name, "Blue Monday");
    assert_eq!(updated.day_todos, vec![todo]);
    assert_eq!(service.find_all().unwrap(), vec![updated]);
}

#[test]
fn blank_names_are_rejected() {
    let conn = setup();
    let service = service(&conn);

    assert!(matches!(service.save("   "), Err(ServiceError::Validation(_))));
    let day = service.save("Monday").unwrap();
    assert!(matches!(
        service.save_todo(day.id, &draft("")),
        Err(ServiceError::Validation(_))
    ));
    assert!(service.find_todos_by_day_id(day.id).unwrap().is_empty());
}

#[test]
fn todo_operations_require_matching_day() {
    let conn = setup();
    let service = service(&conn);
    let monday = service.save("Monday").unwrap();
    let tuesday = service.save("Tuesday").unwrap();
    let todo = service.save_todo(monday.id, &draft("Run")).unwrap();

    assert!(matches!(
        service.find_todo_by_id(tuesday.id, todo.id),
        Err(ServiceError::NotFound {
            entity: EntityKind::DayTodo,
            ..
        })
    ));
    assert!(matches!(
        service.delete_todo(tuesday.id, todo.id),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.save_todo(Uuid::new_v4(), &draft("Run")),
        Err(ServiceError::NotFound {
            entity: EntityKind::Day,
            ..
        })
    ));
    assert!(matches!(
        service.find_todos_by_day_id(Uuid::new_v4()),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn todo_update_overwrites_fields_but_not_ready_state() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    let todo = service.save_todo(day.id, &draft("Run")).unwrap();
    service.update_todo_is_ready(day.id, todo.id, true).unwrap();

    let changed = TodoDraft::new("Sprint", Scariness::Extreme, Hardness::Extraordinary);
    let updated = service.update_todo(day.id, todo.id, &changed).unwrap();

    assert_eq!(updated.day_todo_name, "Sprint");
    assert_eq!(updated.scariness, Scariness::Extreme);
    assert_eq!(updated.hardness, Hardness::Extraordinary);
    assert!(updated.ready);
    assert_eq!(service.find_todo_by_id(day.id, todo.id).unwrap(), updated);
}

#[test]
fn ready_toggle_never_awards_experience() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    let todo = service.save_todo(day.id, &draft("Run")).unwrap();

    let ready = service.update_todo_is_ready(day.id, todo.id, true).unwrap();
    assert!(ready.ready);
    assert_eq!(ready.experience, 0);

    let reverted = service.update_todo_is_ready(day.id, todo.id, false).unwrap();
    assert!(!reverted.ready);
}

#[test]
fn delete_todo_removes_only_that_todo() {
    let conn = setup();
    let service = service(&conn);
    let day = service.save("Monday").unwrap();
    let removed = service.save_todo(day.id, &draft("Run")).unwrap();
    let kept = service.save_todo(day.id, &draft("Read")).unwrap();

    service.delete_todo(day.id, removed.id).unwrap();

    assert_eq!(service.find_todos_by_day_id(day.id).unwrap(), vec![kept]);
}
