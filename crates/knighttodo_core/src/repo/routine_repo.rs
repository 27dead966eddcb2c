//! Routine aggregate repository.
//!
//! # Responsibility
//! - Persist routines, todo templates, routine instances and todo instances.
//! - Execute every cascade (routine, template, instance) in one transaction.
//!
//! # Invariants
//! - Todo instances are always read joined with their current template, so
//!   template renames are visible without rewriting instance rows.
//! - Children are deleted before parents; a failing step rolls back the
//!   whole cascade.

use crate::model::common::EntityKind;
use crate::model::routine::{
    Routine, RoutineId, RoutineInstance, RoutineInstanceId, RoutineTodo, RoutineTodoId,
    RoutineTodoInstance, RoutineTodoInstanceId, RoutineTodoProjection,
};
use crate::repo::{
    bool_to_int, ensure_connection_ready, next_sort_order, parse_bool, parse_experience,
    parse_hardness, parse_scariness, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const ROUTINE_SELECT_SQL: &str = "SELECT id, name, hardness, scariness FROM routines";

const ROUTINE_TODO_SELECT_SQL: &str = "SELECT
    id,
    routine_id,
    routine_todo_name,
    scariness,
    hardness
FROM routine_todos";

const ROUTINE_INSTANCE_SELECT_SQL: &str = "SELECT
    id,
    routine_id,
    name,
    hardness,
    scariness,
    ready
FROM routine_instances";

const TODO_INSTANCE_SELECT_SQL: &str = "SELECT
    ti.id AS id,
    ti.routine_instance_id AS routine_instance_id,
    ti.routine_todo_id AS routine_todo_id,
    ti.ready AS ready,
    ti.experience AS experience,
    t.routine_todo_name AS routine_todo_name,
    t.scariness AS scariness,
    t.hardness AS hardness
FROM routine_todo_instances ti
INNER JOIN routine_todos t ON t.id = ti.routine_todo_id";

/// Row counts removed by a routine cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutineDeletion {
    pub routine_todos: usize,
    pub routine_instances: usize,
    pub routine_todo_instances: usize,
}

/// Repository interface for the routine aggregate.
pub trait RoutineRepository {
    fn create_routine(&self, routine: &Routine) -> RepoResult<()>;
    fn get_routine(&self, id: RoutineId) -> RepoResult<Option<Routine>>;
    fn list_routines(&self) -> RepoResult<Vec<Routine>>;
    fn update_routine(&self, routine: &Routine) -> RepoResult<()>;
    /// Deletes todo instances, instances, templates and the routine atomically.
    fn delete_routine_cascade(&self, id: RoutineId) -> RepoResult<RoutineDeletion>;

    fn create_routine_todo(&self, todo: &RoutineTodo) -> RepoResult<()>;
    fn get_routine_todo(&self, id: RoutineTodoId) -> RepoResult<Option<RoutineTodo>>;
    fn list_routine_todos(&self, routine_id: RoutineId) -> RepoResult<Vec<RoutineTodo>>;
    fn update_routine_todo(&self, todo: &RoutineTodo) -> RepoResult<()>;
    /// Deletes the template and every todo instance referencing it atomically.
    fn delete_routine_todo_cascade(&self, id: RoutineTodoId) -> RepoResult<usize>;

    /// Inserts the instance together with its todo instances atomically.
    fn create_routine_instance(
        &self,
        instance: &RoutineInstance,
        todo_instances: &[RoutineTodoInstance],
    ) -> RepoResult<()>;
    fn get_routine_instance(&self, id: RoutineInstanceId) -> RepoResult<Option<RoutineInstance>>;
    fn list_routine_instances(&self, routine_id: RoutineId) -> RepoResult<Vec<RoutineInstance>>;
    fn update_routine_instance(&self, instance: &RoutineInstance) -> RepoResult<()>;
    /// Deletes the instance and its todo instances atomically.
    fn delete_routine_instance_cascade(&self, id: RoutineInstanceId) -> RepoResult<usize>;

    fn get_routine_todo_instance(
        &self,
        id: RoutineTodoInstanceId,
    ) -> RepoResult<Option<RoutineTodoInstance>>;
    fn list_routine_todo_instances(
        &self,
        routine_instance_id: RoutineInstanceId,
    ) -> RepoResult<Vec<RoutineTodoInstance>>;
    /// Persists `ready` and `experience` in a single statement.
    fn update_routine_todo_instance(&self, todo_instance: &RoutineTodoInstance) -> RepoResult<()>;
    /// Marks a not-ready todo instance ready with its award.
    ///
    /// Returns `false` without writing when the instance is already ready.
    fn mark_routine_todo_instance_awarded(
        &self,
        id: RoutineTodoInstanceId,
        experience: u32,
    ) -> RepoResult<bool>;
}

/// SQLite-backed routine repository.
pub struct SqliteRoutineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoutineRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                "routines",
                "routine_todos",
                "routine_instances",
                "routine_todo_instances",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl RoutineRepository for SqliteRoutineRepository<'_> {
    fn create_routine(&self, routine: &Routine) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO routines (id, name, hardness, scariness) VALUES (?1, ?2, ?3, ?4);",
            params![
                routine.id.to_string(),
                routine.name.as_str(),
                routine.hardness.as_db_str(),
                routine.scariness.as_db_str(),
            ],
        )?;
        Ok(())
    }

    fn get_routine(&self, id: RoutineId) -> RepoResult<Option<Routine>> {
        self.conn
            .query_row(
                &format!("{ROUTINE_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_routine_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_routines(&self) -> RepoResult<Vec<Routine>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROUTINE_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut routines = Vec::new();
        while let Some(row) = rows.next()? {
            routines.push(parse_routine_row(row)?);
        }
        Ok(routines)
    }

    fn update_routine(&self, routine: &Routine) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routines
             SET name = ?2,
                 hardness = ?3,
                 scariness = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                routine.id.to_string(),
                routine.name.as_str(),
                routine.hardness.as_db_str(),
                routine.scariness.as_db_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Routine,
                id: routine.id,
            });
        }
        Ok(())
    }

    fn delete_routine_cascade(&self, id: RoutineId) -> RepoResult<RoutineDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let routine_id = id.to_string();

        // Todo instances can hang off either side of the aggregate: instances
        // of this routine, or templates of this routine.
        let routine_todo_instances = tx.execute(
            "DELETE FROM routine_todo_instances
             WHERE routine_instance_id IN (
                 SELECT id FROM routine_instances WHERE routine_id = ?1
             )
             OR routine_todo_id IN (
                 SELECT id FROM routine_todos WHERE routine_id = ?1
             );",
            [&routine_id],
        )?;
        let routine_instances = tx.execute(
            "DELETE FROM routine_instances WHERE routine_id = ?1;",
            [&routine_id],
        )?;
        let routine_todos = tx.execute(
            "DELETE FROM routine_todos WHERE routine_id = ?1;",
            [&routine_id],
        )?;
        let removed = tx.execute("DELETE FROM routines WHERE id = ?1;", [&routine_id])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Routine,
                id,
            });
        }
        tx.commit()?;

        Ok(RoutineDeletion {
            routine_todos,
            routine_instances,
            routine_todo_instances,
        })
    }

    fn create_routine_todo(&self, todo: &RoutineTodo) -> RepoResult<()> {
        let sort_order = next_sort_order(self.conn, "routine_todos", "routine_id", todo.routine_id)?;
        self.conn.execute(
            "INSERT INTO routine_todos (
                id,
                routine_id,
                routine_todo_name,
                scariness,
                hardness,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                todo.id.to_string(),
                todo.routine_id.to_string(),
                todo.routine_todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
                sort_order,
            ],
        )?;
        Ok(())
    }

    fn get_routine_todo(&self, id: RoutineTodoId) -> RepoResult<Option<RoutineTodo>> {
        self.conn
            .query_row(
                &format!("{ROUTINE_TODO_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_routine_todo_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_routine_todos(&self, routine_id: RoutineId) -> RepoResult<Vec<RoutineTodo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROUTINE_TODO_SELECT_SQL}
             WHERE routine_id = ?1
             ORDER BY sort_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([routine_id.to_string()])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_routine_todo_row(row)?);
        }
        Ok(todos)
    }

    fn update_routine_todo(&self, todo: &RoutineTodo) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routine_todos
             SET routine_todo_name = ?2,
                 scariness = ?3,
                 hardness = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                todo.id.to_string(),
                todo.routine_todo_name.as_str(),
                todo.scariness.as_db_str(),
                todo.hardness.as_db_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::RoutineTodo,
                id: todo.id,
            });
        }
        Ok(())
    }

    fn delete_routine_todo_cascade(&self, id: RoutineTodoId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_instances = tx.execute(
            "DELETE FROM routine_todo_instances WHERE routine_todo_id = ?1;",
            [id.to_string()],
        )?;
        let removed = tx.execute("DELETE FROM routine_todos WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::RoutineTodo,
                id,
            });
        }
        tx.commit()?;
        Ok(removed_instances)
    }

    fn create_routine_instance(
        &self,
        instance: &RoutineInstance,
        todo_instances: &[RoutineTodoInstance],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let sort_order = next_sort_order(
            &tx,
            "routine_instances",
            "routine_id",
            instance.routine_id,
        )?;
        tx.execute(
            "INSERT INTO routine_instances (
                id,
                routine_id,
                name,
                hardness,
                scariness,
                ready,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                instance.id.to_string(),
                instance.routine_id.to_string(),
                instance.name.as_str(),
                instance.hardness.as_db_str(),
                instance.scariness.as_db_str(),
                bool_to_int(instance.ready),
                sort_order,
            ],
        )?;

        for todo_instance in todo_instances {
            tx.execute(
                "INSERT INTO routine_todo_instances (
                    id,
                    routine_instance_id,
                    routine_todo_id,
                    ready,
                    experience
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    todo_instance.id.to_string(),
                    todo_instance.routine_instance_id.to_string(),
                    todo_instance.routine_todo_id.to_string(),
                    bool_to_int(todo_instance.ready),
                    i64::from(todo_instance.experience),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_routine_instance(&self, id: RoutineInstanceId) -> RepoResult<Option<RoutineInstance>> {
        self.conn
            .query_row(
                &format!("{ROUTINE_INSTANCE_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_routine_instance_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_routine_instances(&self, routine_id: RoutineId) -> RepoResult<Vec<RoutineInstance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROUTINE_INSTANCE_SELECT_SQL}
             WHERE routine_id = ?1
             ORDER BY sort_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([routine_id.to_string()])?;
        let mut instances = Vec::new();
        while let Some(row) = rows.next()? {
            instances.push(parse_routine_instance_row(row)?);
        }
        Ok(instances)
    }

    fn update_routine_instance(&self, instance: &RoutineInstance) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routine_instances
             SET name = ?2,
                 hardness = ?3,
                 scariness = ?4,
                 ready = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                instance.id.to_string(),
                instance.name.as_str(),
                instance.hardness.as_db_str(),
                instance.scariness.as_db_str(),
                bool_to_int(instance.ready),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::RoutineInstance,
                id: instance.id,
            });
        }
        Ok(())
    }

    fn delete_routine_instance_cascade(&self, id: RoutineInstanceId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_todo_instances = tx.execute(
            "DELETE FROM routine_todo_instances WHERE routine_instance_id = ?1;",
            [id.to_string()],
        )?;
        let removed = tx.execute(
            "DELETE FROM routine_instances WHERE id = ?1;",
            [id.to_string()],
        )?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::RoutineInstance,
                id,
            });
        }
        tx.commit()?;
        Ok(removed_todo_instances)
    }

    fn get_routine_todo_instance(
        &self,
        id: RoutineTodoInstanceId,
    ) -> RepoResult<Option<RoutineTodoInstance>> {
        self.conn
            .query_row(
                &format!("{TODO_INSTANCE_SELECT_SQL} WHERE ti.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_todo_instance_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_routine_todo_instances(
        &self,
        routine_instance_id: RoutineInstanceId,
    ) -> RepoResult<Vec<RoutineTodoInstance>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_INSTANCE_SELECT_SQL}
             WHERE ti.routine_instance_id = ?1
             ORDER BY t.sort_order ASC, ti.id ASC;"
        ))?;
        let mut rows = stmt.query([routine_instance_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_instance_row(row)?);
        }
        Ok(items)
    }

    fn update_routine_todo_instance(&self, todo_instance: &RoutineTodoInstance) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routine_todo_instances
             SET ready = ?2,
                 experience = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                todo_instance.id.to_string(),
                bool_to_int(todo_instance.ready),
                i64::from(todo_instance.experience),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::RoutineTodoInstance,
                id: todo_instance.id,
            });
        }
        Ok(())
    }

    fn mark_routine_todo_instance_awarded(
        &self,
        id: RoutineTodoInstanceId,
        experience: u32,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE routine_todo_instances
             SET ready = 1,
                 experience = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1 AND ready = 0;",
            params![id.to_string(), i64::from(experience)],
        )?;
        Ok(changed == 1)
    }
}

fn parse_routine_row(row: &Row<'_>) -> RepoResult<Routine> {
    let id_text: String = row.get("id")?;
    let hardness_text: String = row.get("hardness")?;
    let scariness_text: String = row.get("scariness")?;
    Ok(Routine {
        id: parse_uuid(&id_text, "routines.id")?,
        name: row.get("name")?,
        hardness: parse_hardness(&hardness_text, "routines.hardness")?,
        scariness: parse_scariness(&scariness_text, "routines.scariness")?,
        routine_todos: Vec::new(),
        routine_instances: Vec::new(),
    })
}

fn parse_routine_todo_row(row: &Row<'_>) -> RepoResult<RoutineTodo> {
    let id_text: String = row.get("id")?;
    let routine_id_text: String = row.get("routine_id")?;
    let scariness_text: String = row.get("scariness")?;
    let hardness_text: String = row.get("hardness")?;
    Ok(RoutineTodo {
        id: parse_uuid(&id_text, "routine_todos.id")?,
        routine_id: parse_uuid(&routine_id_text, "routine_todos.routine_id")?,
        routine_todo_name: row.get("routine_todo_name")?,
        scariness: parse_scariness(&scariness_text, "routine_todos.scariness")?,
        hardness: parse_hardness(&hardness_text, "routine_todos.hardness")?,
    })
}

fn parse_routine_instance_row(row: &Row<'_>) -> RepoResult<RoutineInstance> {
    let id_text: String = row.get("id")?;
    let routine_id_text: String = row.get("routine_id")?;
    let hardness_text: String = row.get("hardness")?;
    let scariness_text: String = row.get("scariness")?;
    Ok(RoutineInstance {
        id: parse_uuid(&id_text, "routine_instances.id")?,
        routine_id: parse_uuid(&routine_id_text, "routine_instances.routine_id")?,
        name: row.get("name")?,
        hardness: parse_hardness(&hardness_text, "routine_instances.hardness")?,
        scariness: parse_scariness(&scariness_text, "routine_instances.scariness")?,
        ready: parse_bool(row.get("ready")?, "routine_instances.ready")?,
        routine_todo_instances: Vec::new(),
    })
}

fn parse_todo_instance_row(row: &Row<'_>) -> RepoResult<RoutineTodoInstance> {
    let id_text: String = row.get("id")?;
    let instance_id_text: String = row.get("routine_instance_id")?;
    let template_id_text: String = row.get("routine_todo_id")?;
    let scariness_text: String = row.get("scariness")?;
    let hardness_text: String = row.get("hardness")?;
    Ok(RoutineTodoInstance {
        id: parse_uuid(&id_text, "routine_todo_instances.id")?,
        routine_instance_id: parse_uuid(
            &instance_id_text,
            "routine_todo_instances.routine_instance_id",
        )?,
        routine_todo_id: parse_uuid(&template_id_text, "routine_todo_instances.routine_todo_id")?,
        ready: parse_bool(row.get("ready")?, "routine_todo_instances.ready")?,
        experience: parse_experience(row.get("experience")?, "routine_todo_instances.experience")?,
        template: RoutineTodoProjection {
            routine_todo_name: row.get("routine_todo_name")?,
            scariness: parse_scariness(&scariness_text, "routine_todos.scariness")?,
            hardness: parse_hardness(&hardness_text, "routine_todos.hardness")?,
        },
    })
}
