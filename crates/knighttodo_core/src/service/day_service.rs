//! Day aggregate service.
//!
//! # Responsibility
//! - Provide Day and DayTodo create/read/update/delete operations.
//! - Toggle a DayTodo ready flag without awarding experience.
//!
//! # Invariants
//! - Deleting a day removes exactly its own todos, atomically.
//! - `update_day` never touches the day's todos.
//! - DayTodo updates never change `ready` or `experience`.

use crate::model::common::{EntityKind, TodoDraft};
use crate::model::day::{Day, DayId, DayTodo, DayTodoId};
use crate::repo::day_repo::DayRepository;
use crate::service::{
    cascade_error, logged, normalize_draft, normalize_name, ServiceError, ServiceResult,
};
use log::info;

const MODULE: &str = "day_service";

/// Day aggregate service facade.
pub struct DayService<R: DayRepository> {
    repo: R,
}

impl<R: DayRepository> DayService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new day with no todos.
    pub fn save(&self, day_name: &str) -> ServiceResult<Day> {
        logged(MODULE, "day_create", "new", || {
            let day = Day::new(normalize_name(day_name, "dayName")?);
            self.repo.create_day(&day)?;
            Ok(day)
        })
    }

    /// Lists days in creation order, each with its todos.
    pub fn find_all(&self) -> ServiceResult<Vec<Day>> {
        logged(MODULE, "day_list", "all", || {
            let mut days = self.repo.list_days()?;
            for day in &mut days {
                day.day_todos = self.repo.list_day_todos(day.id)?;
            }
            Ok(days)
        })
    }

    pub fn find_by_id(&self, id: DayId) -> ServiceResult<Day> {
        logged(MODULE, "day_find", id, || {
            let mut day = self.load_day(id)?;
            day.day_todos = self.repo.list_day_todos(id)?;
            Ok(day)
        })
    }

    /// Overwrites the day name and returns the day with its todos.
    pub fn update_day(&self, id: DayId, day_name: &str) -> ServiceResult<Day> {
        logged(MODULE, "day_update", id, || {
            let name = normalize_name(day_name, "dayName")?;
            let mut day = self.load_day(id)?;
            day.day_name = name;
            self.repo.update_day(&day)?;
            day.day_todos = self.repo.list_day_todos(id)?;
            Ok(day)
        })
    }

    /// Deletes the day and all of its todos in one transaction.
    pub fn delete_by_id(&self, id: DayId) -> ServiceResult<()> {
        logged(MODULE, "day_delete", id, || {
            let removed_todos = self
                .repo
                .delete_day_cascade(id)
                .map_err(|err| cascade_error(EntityKind::Day, id, err))?;
            info!("event=day_delete module={MODULE} status=ok id={id} removed_todos={removed_todos}");
            Ok(())
        })
    }

    /// Adds a not-ready todo to an existing day.
    pub fn save_todo(&self, day_id: DayId, draft: &TodoDraft) -> ServiceResult<DayTodo> {
        logged(MODULE, "day_todo_create", day_id, || {
            let draft = normalize_draft(draft, "dayTodoName")?;
            self.load_day(day_id)?;
            let todo = DayTodo::new(day_id, &draft);
            self.repo.create_day_todo(&todo)?;
            Ok(todo)
        })
    }

    /// Lists the todos of an existing day in insertion order.
    pub fn find_todos_by_day_id(&self, day_id: DayId) -> ServiceResult<Vec<DayTodo>> {
        logged(MODULE, "day_todo_list", day_id, || {
            self.load_day(day_id)?;
            Ok(self.repo.list_day_todos(day_id)?)
        })
    }

    pub fn find_todo_by_id(&self, day_id: DayId, todo_id: DayTodoId) -> ServiceResult<DayTodo> {
        logged(MODULE, "day_todo_find", todo_id, || {
            self.load_todo(day_id, todo_id)
        })
    }

    /// Overwrites name, scariness and hardness of a day todo.
    pub fn update_todo(
        &self,
        day_id: DayId,
        todo_id: DayTodoId,
        draft: &TodoDraft,
    ) -> ServiceResult<DayTodo> {
        logged(MODULE, "day_todo_update", todo_id, || {
            let draft = normalize_draft(draft, "dayTodoName")?;
            let mut todo = self.load_todo(day_id, todo_id)?;
            todo.apply(&draft);
            self.repo.update_day_todo(&todo)?;
            Ok(todo)
        })
    }

    pub fn delete_todo(&self, day_id: DayId, todo_id: DayTodoId) -> ServiceResult<()> {
        logged(MODULE, "day_todo_delete", todo_id, || {
            self.load_todo(day_id, todo_id)?;
            Ok(self.repo.delete_day_todo(todo_id)?)
        })
    }

    /// Sets the ready flag directly; day todos never earn experience.
    pub fn update_todo_is_ready(
        &self,
        day_id: DayId,
        todo_id: DayTodoId,
        ready: bool,
    ) -> ServiceResult<DayTodo> {
        logged(MODULE, "day_todo_ready", todo_id, || {
            let mut todo = self.load_todo(day_id, todo_id)?;
            todo.ready = ready;
            self.repo.update_day_todo(&todo)?;
            Ok(todo)
        })
    }

    fn load_day(&self, id: DayId) -> ServiceResult<Day> {
        self.repo
            .get_day(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Day, id))
    }

    fn load_todo(&self, day_id: DayId, todo_id: DayTodoId) -> ServiceResult<DayTodo> {
        match self.repo.get_day_todo(todo_id)? {
            Some(todo) if todo.day_id == day_id => Ok(todo),
            _ => Err(ServiceError::not_found(EntityKind::DayTodo, todo_id)),
        }
    }
}
