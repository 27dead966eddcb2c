//! Day aggregate repository.
//!
//! # Invariants
//! - Day todos are listed in `sort_order ASC, id ASC` order.
//! - Deleting a day removes its day todos in the same transaction.

use crate::model::common::EntityKind;
use crate::model::day::{Day, DayId, DayTodo, DayTodoId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, next_sort_order, parse_bool, parse_experience,
    parse_hardness, parse_scariness, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const DAY_SELECT_SQL: &str = "SELECT id, day_name FROM days";

const DAY_TODO_SELECT_SQL: &str = "SELECT
    id,
    day_id,
    day_todo_name,
    scariness,
    hardness,
    ready,
    experience
FROM day_todos";

/// Repository interface for days and their owned todos.
pub trait DayRepository {
    fn create_day(&self, day: &Day) -> RepoResult<()>;
    fn get_day(&self, id: DayId) -> RepoResult<Option<Day>>;
    fn list_days(&self) -> RepoResult<Vec<Day>>;
    /// Overwrites the day name. Child todos are untouched.
    fn update_day(&self, day: &Day) -> RepoResult<()>;
    /// Deletes the day and all its day todos atomically.
    ///
    /// Returns the number of day todos removed with it.
    fn delete_day_cascade(&self, id: DayId) -> RepoResult<usize>;

    fn create_day_todo(&self, todo: &DayTodo) -> RepoResult<()>;
    fn get_day_todo(&self, id: DayTodoId) -> RepoResult<Option<DayTodo>>;
    fn list_day_todos(&self, day_id: DayId) -> RepoResult<Vec<DayTodo>>;
    /// Full overwrite of mutable attributes, including `ready` and `experience`.
    fn update_day_todo(&self, todo: &DayTodo) -> RepoResult<()>;
    fn delete_day_todo(&self, id: DayTodoId) -> RepoResult<()>;
}

/// SQLite-backed day repository.
pub struct SqliteDayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDayRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["days", "day_todos"])?;
        Ok(Self { conn })
    }
}

impl DayRepository for SqliteDayRepository<'_> {
    fn create_day(&self, day: &Day) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO days (id, day_name) VALUES (?1, ?2);",
            params![day.id.to_string(), day.day_name.as_str()],
        )?;
        Ok(())
    }

    fn get_day(&self, id: DayId) -> RepoResult<Option<Day>> {
        self.conn
            .query_row(
                &format!("{DAY_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_day_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_days(&self) -> RepoResult<Vec<Day>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DAY_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(parse_day_row(row)?);
        }
        Ok(days)
    }

    fn update_day(&self, day: &Day) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE days
             SET day_name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![day.id.to_string(), day.day_name.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Day,
                id: day.id,
            });
        }
        Ok(())
    }

    fn delete_day_cascade(&self, id: DayId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_todos = tx.execute("DELETE FROM day_todos WHERE day_id = ?1;", [id.to_string()])?;
        let removed_days = tx.execute("DELETE FROM days WHERE id = ?1;", [id.to_string()])?;
        if removed_days == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Day,
                id,
            });
        }
        tx.commit()?;
        Ok(removed_todos)
    }

    fn create_day_todo(&self, todo: &DayTodo) -> RepoResult<()> {
        let sort_order = next_sort_order(self.conn, "day_todos", "day_id", todo.day_id)?;
        self.conn.execute(
            "INSERT INTO day_todos (
                id,
                day_id,
                day_todo_name,
                scariness,
                hardness,
                ready,
                experience,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                todo.id.to_string(),
                todo.day_id.to_string(),
                todo.day_todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
                bool_to_int(todo.ready),
                i64::from(todo.experience),
                sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_day_todo(&self, id: DayTodoId) -> RepoResult<Option<DayTodo>> {
        self.conn
            .query_row(
                &format!("{DAY_TODO_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_day_todo_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_day_todos(&self, day_id: DayId) -> RepoResult<Vec<DayTodo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DAY_TODO_SELECT_SQL}
             WHERE day_id = ?1
             ORDER BY sort_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([day_id.to_string()])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_day_todo_row(row)?);
        }
        Ok(todos)
    }

    fn update_day_todo(&self, todo: &DayTodo) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE day_todos
             SET day_todo_name = ?2,
                 scariness = ?3,
                 hardness = ?4,
                 ready = ?5,
                 experience = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                todo.id.to_string(),
                todo.day_todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
                bool_to_int(todo.ready),
                i64::from(todo.experience),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::DayTodo,
                id: todo.id,
            });
        }
        Ok(())
    }

    fn delete_day_todo(&self, id: DayTodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM day_todos WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::DayTodo,
                id,
            });
        }
        Ok(())
    }
}

fn parse_day_row(row: &Row<'_>) -> RepoResult<Day> {
    let id_text: String = row.get("id")?;
    Ok(Day {
        id: parse_uuid(&id_text, "days.id")?,
        day_name: row.get("day_name")?,
        day_todos: Vec::new(),
    })
}

fn parse_day_todo_row(row: &Row<'_>) -> RepoResult<DayTodo> {
    let id_text: String = row.get("id")?;
    let day_id_text: String = row.get("day_id")?;
    let scariness_text: String = row.get("scariness")?;
    let hardness_text: String = row.get("hardness")?;

    Ok(DayTodo {
        id: parse_uuid(&id_text, "day_todos.id")?,
        day_id: parse_uuid(&day_id_text, "day_todos.day_id")?,
        day_todo_name: row.get("day_todo_name")?,
        scariness: parse_scariness(&scariness_text, "day_todos.scariness")?,
        hardness: parse_hardness(&hardness_text, "day_todos.hardness")?,
        ready: parse_bool(row.get("ready")?, "day_todos.ready")?,
        experience: parse_experience(row.get("experience")?, "day_todos.experience")?,
    })
}
