//! Todo block repository.
//!
//! # Invariants
//! - Todos are listed in `sort_order ASC, id ASC` order within a block.
//! - Deleting a block always removes its todos in the same transaction.

use crate::model::common::EntityKind;
use crate::model::todo::{Todo, TodoBlock, TodoBlockId, TodoId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, next_sort_order, parse_bool, parse_experience,
    parse_hardness, parse_scariness, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    block_id,
    todo_name,
    scariness,
    hardness,
    ready,
    experience
FROM todos";

/// Repository interface for todo blocks and their todos.
pub trait TodoRepository {
    fn create_block(&self, block: &TodoBlock) -> RepoResult<()>;
    fn get_block(&self, id: TodoBlockId) -> RepoResult<Option<TodoBlock>>;
    fn list_blocks(&self) -> RepoResult<Vec<TodoBlock>>;
    fn update_block(&self, block: &TodoBlock) -> RepoResult<()>;
    /// Deletes the block and every todo in it atomically.
    fn delete_block_cascade(&self, id: TodoBlockId) -> RepoResult<usize>;

    fn create_todo(&self, todo: &Todo) -> RepoResult<()>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn list_todos(&self) -> RepoResult<Vec<Todo>>;
    fn list_todos_by_block(&self, block_id: TodoBlockId) -> RepoResult<Vec<Todo>>;
    fn update_todo(&self, todo: &Todo) -> RepoResult<()>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
}

/// SQLite-backed todo block repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["todo_blocks", "todos"])?;
        Ok(Self { conn })
    }

    fn query_todos(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_block(&self, block: &TodoBlock) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO todo_blocks (id, block_name) VALUES (?1, ?2);",
            params![block.id.to_string(), block.block_name.as_str()],
        )?;
        Ok(())
    }

    fn get_block(&self, id: TodoBlockId) -> RepoResult<Option<TodoBlock>> {
        self.conn
            .query_row(
                "SELECT id, block_name FROM todo_blocks WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(parse_block_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_blocks(&self) -> RepoResult<Vec<TodoBlock>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, block_name
             FROM todo_blocks
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_block_row(row)?);
        }
        Ok(blocks)
    }

    fn update_block(&self, block: &TodoBlock) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todo_blocks
             SET block_name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![block.id.to_string(), block.block_name.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::TodoBlock,
                id: block.id,
            });
        }
        Ok(())
    }

    fn delete_block_cascade(&self, id: TodoBlockId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_todos = tx.execute("DELETE FROM todos WHERE block_id = ?1;", [id.to_string()])?;
        let removed_blocks =
            tx.execute("DELETE FROM todo_blocks WHERE id = ?1;", [id.to_string()])?;
        if removed_blocks == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::TodoBlock,
                id,
            });
        }
        tx.commit()?;
        Ok(removed_todos)
    }

    fn create_todo(&self, todo: &Todo) -> RepoResult<()> {
        let sort_order = next_sort_order(self.conn, "todos", "block_id", todo.block_id)?;
        self.conn.execute(
            "INSERT INTO todos (
                id,
                block_id,
                todo_name,
                scariness,
                hardness,
                ready,
                experience,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                todo.id.to_string(),
                todo.block_id.to_string(),
                todo.todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
                bool_to_int(todo.ready),
                i64::from(todo.experience),
                sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.conn
            .query_row(
                &format!("{TODO_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_todo_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        self.query_todos(
            &format!("{TODO_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"),
            [],
        )
    }

    fn list_todos_by_block(&self, block_id: TodoBlockId) -> RepoResult<Vec<Todo>> {
        self.query_todos(
            &format!(
                "{TODO_SELECT_SQL}
                 WHERE block_id = ?1
                 ORDER BY sort_order ASC, id ASC;"
            ),
            [block_id.to_string()],
        )
    }

    fn update_todo(&self, todo: &Todo) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET todo_name = ?2,
                 scariness = ?3,
                 hardness = ?4,
                 ready = ?5,
                 experience = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                todo.id.to_string(),
                todo.todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
                bool_to_int(todo.ready),
                i64::from(todo.experience),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Todo,
                id: todo.id,
            });
        }
        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Todo,
                id,
            });
        }
        Ok(())
    }
}

fn parse_block_row(row: &Row<'_>) -> RepoResult<TodoBlock> {
    let id_text: String = row.get("id")?;
    Ok(TodoBlock {
        id: parse_uuid(&id_text, "todo_blocks.id")?,
        block_name: row.get("block_name")?,
        todos: Vec::new(),
    })
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id_text: String = row.get("id")?;
    let block_id_text: String = row.get("block_id")?;
    let scariness_text: String = row.get("scariness")?;
    let hardness_text: String = row.get("hardness")?;

    Ok(Todo {
        id: parse_uuid(&id_text, "todos.id")?,
        block_id: parse_uuid(&block_id_text, "todos.block_id")?,
        todo_name: row.get("todo_name")?,
        scariness: parse_scariness(&scariness_text, "todos.scariness")?,
        hardness: parse_hardness(&hardness_text, "todos.hardness")?,
        ready: parse_bool(row.get("ready")?, "todos.ready")?,
        experience: parse_experience(row.get("experience")?, "todos.experience")?,
    })
}
