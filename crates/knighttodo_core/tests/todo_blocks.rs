use knighttodo_core::db::open_db_in_memory;
use knighttodo_core::{
    EntityKind, Hardness, Scariness, ServiceError, SqliteTodoRepository, TodoDraft, TodoService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> TodoService<SqliteTodoRepository<'_>> {
    TodoService::new(SqliteTodoRepository::try_new(conn).unwrap())
}

fn draft(name: &str) -> TodoDraft {
    TodoDraft::new(name, Scariness::Medium, Hardness::Normal)
}

#[test]
fn find_todos_by_block_id_is_empty_for_block_without_todos() {
    let conn = setup();
    let service = service(&conn);
    let block = service.save_block("Inbox").unwrap();

    assert!(service.find_todos_by_block_id(block.id).unwrap().is_empty());
    assert!(service
        .find_todos_by_block_id(Uuid::new_v4())
        .unwrap()
        .is_empty());
}

#[test]
fn find_todos_by_block_id_returns_only_that_block() {
    let conn = setup();
    let service = service(&conn);
    let inbox = service.save_block("Inbox").unwrap();
    let later = service.save_block("Later").unwrap();
    let first = service.save_todo(inbox.id, &draft("Call mom")).unwrap();
    let second = service.save_todo(inbox.id, &draft("Pay rent")).unwrap();
    let other = service.save_todo(later.id, &draft("Paint")).unwrap();

    assert_eq!(
        service.find_todos_by_block_id(inbox.id).unwrap(),
        vec![first.clone(), second.clone()]
    );
    assert_eq!(
        service.find_all_todos().unwrap(),
        vec![first, second, other]
    );
}

#[test]
fn deleting_block_always_deletes_its_todos() {
    let conn = setup();
    let service = service(&conn);
    let block = service.save_block("Inbox").unwrap();
    let todo = service.save_todo(block.id, &draft("Call mom")).unwrap();
    let kept_block = service.save_block("Later").unwrap();
    let kept = service.save_todo(kept_block.id, &draft("Paint")).unwrap();

    service.delete_block(block.id).unwrap();

    assert!(matches!(
        service.find_block_by_id(block.id),
        Err(ServiceError::NotFound {
            entity: EntityKind::TodoBlock,
            ..
        })
    ));
    assert!(matches!(
        service.find_todo_by_id(block.id, todo.id),
        Err(ServiceError::NotFound { .. })
    ));
    assert_eq!(service.find_all_todos().unwrap(), vec![kept]);
}

#[test]
fn update_block_renames_and_keeps_todos() {
    let conn = setup();
    let service = service(&conn);
    let block = service.save_block("Inbox").unwrap();
    let todo = service.save_todo(block.id, &draft("Call mom")).unwrap();

    let renamed = service.update_block(block.id, "Today").unwrap();

    assert_eq!(renamed.block_name, "Today");
    assert_eq!(renamed.todos, vec![todo]);
    assert_eq!(service.find_all_blocks().unwrap(), vec![renamed]);
}

#[test]
fn save_todo_requires_existing_block() {
    let conn = setup();
    let service = service(&conn);

    assert!(matches!(
        service.save_todo(Uuid::new_v4(), &draft("Call mom")),
        Err(ServiceError::NotFound {
            entity: EntityKind::TodoBlock,
            ..
        })
    ));
    assert!(matches!(
        service.save_block(""),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn ready_toggle_sets_flag_without_experience() {
    let conn = setup();
    let service = service(&conn);
    let block = service.save_block("Inbox").unwrap();
    let todo = service.save_todo(block.id, &draft("Call mom")).unwrap();

    let ready = service.update_todo_is_ready(block.id, todo.id, true).unwrap();
    assert!(ready.ready);
    assert_eq!(ready.experience, 0);
    assert_eq!(service.find_todo_by_id(block.id, todo.id).unwrap(), ready);
}

#[test]
fn todo_operations_require_matching_block() {
    let conn = setup();
    let service = service(&conn);
    let inbox = service.save_block("Inbox").unwrap();
    let later = service.save_block("Later").unwrap();
    let todo = service.save_todo(inbox.id, &draft("Call mom")).unwrap();

    assert!(matches!(
        service.update_todo(later.id, todo.id, &draft("Call dad")),
        Err(ServiceError::NotFound {
            entity: EntityKind::Todo,
            ..
        })
    ));
    assert!(matches!(
        service.update_todo_is_ready(later.id, todo.id, true),
        Err(ServiceError::NotFound { .. })
    ));

    let updated = service.update_todo(inbox.id, todo.id, &draft("Call dad")).unwrap();
    assert_eq!(updated.todo_name, "Call dad");
    service.delete_todo(inbox.id, todo.id).unwrap();
    assert!(service.find_todos_by_block_id(inbox.id).unwrap().is_empty());
}
