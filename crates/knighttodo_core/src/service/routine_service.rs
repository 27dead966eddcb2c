//! Routine aggregate service (routines and their todo templates).
//!
//! # Responsibility
//! - Provide routine and template create/read/update/delete operations.
//! - Run the routine cascade: todo instances, instances, templates, routine.
//!
//! # Invariants
//! - A template is only reachable through the routine that owns it.
//! - Deleting a template deletes every todo instance referencing it.

use crate::model::common::{EntityKind, TodoDraft};
use crate::model::routine::{Routine, RoutineId, RoutineTodo, RoutineTodoId};
use crate::repo::routine_repo::RoutineRepository;
use crate::service::{cascade_error, logged, normalize_draft, ServiceError, ServiceResult};
use log::info;

const MODULE: &str = "routine_service";

/// Routine aggregate service facade.
pub struct RoutineService<R: RoutineRepository> {
    repo: R,
}

impl<R: RoutineRepository> RoutineService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn save(&self, draft: &TodoDraft) -> ServiceResult<Routine> {
        logged(MODULE, "routine_create", "new", || {
            let routine = Routine::new(&normalize_draft(draft, "name")?);
            self.repo.create_routine(&routine)?;
            Ok(routine)
        })
    }

    /// Lists routines with their templates and instance summaries.
    pub fn find_all(&self) -> ServiceResult<Vec<Routine>> {
        logged(MODULE, "routine_list", "all", || {
            let mut routines = self.repo.list_routines()?;
            for routine in &mut routines {
                self.attach_children(routine)?;
            }
            Ok(routines)
        })
    }

    pub fn find_by_id(&self, id: RoutineId) -> ServiceResult<Routine> {
        logged(MODULE, "routine_find", id, || {
            let mut routine = self.load_routine(id)?;
            self.attach_children(&mut routine)?;
            Ok(routine)
        })
    }

    /// Overwrites name, hardness and scariness.
    pub fn update_routine(&self, id: RoutineId, draft: &TodoDraft) -> ServiceResult<Routine> {
        logged(MODULE, "routine_update", id, || {
            let draft = normalize_draft(draft, "name")?;
            let mut routine = self.load_routine(id)?;
            routine.apply(&draft);
            self.repo.update_routine(&routine)?;
            self.attach_children(&mut routine)?;
            Ok(routine)
        })
    }

    /// Deletes the routine with its templates, instances and todo instances.
    pub fn delete_by_id(&self, id: RoutineId) -> ServiceResult<()> {
        logged(MODULE, "routine_delete", id, || {
            let removed = self
                .repo
                .delete_routine_cascade(id)
                .map_err(|err| cascade_error(EntityKind::Routine, id, err))?;
            info!(
                "event=routine_delete module={MODULE} status=ok id={id} removed_templates={} removed_instances={} removed_todo_instances={}",
                removed.routine_todos, removed.routine_instances, removed.routine_todo_instances
            );
            Ok(())
        })
    }

    /// Adds a template to an existing routine.
    ///
    /// Existing instances are not back-filled; only instances created later
    /// receive a todo instance for it.
    pub fn save_todo(&self, routine_id: RoutineId, draft: &TodoDraft) -> ServiceResult<RoutineTodo> {
        logged(MODULE, "routine_todo_create", routine_id, || {
            let draft = normalize_draft(draft, "routineTodoName")?;
            self.load_routine(routine_id)?;
            let todo = RoutineTodo::new(routine_id, &draft);
            self.repo.create_routine_todo(&todo)?;
            Ok(todo)
        })
    }

    pub fn find_todos_by_routine_id(&self, routine_id: RoutineId) -> ServiceResult<Vec<RoutineTodo>> {
        logged(MODULE, "routine_todo_list", routine_id, || {
            self.load_routine(routine_id)?;
            Ok(self.repo.list_routine_todos(routine_id)?)
        })
    }

    pub fn find_todo_by_id(
        &self,
        routine_id: RoutineId,
        todo_id: RoutineTodoId,
    ) -> ServiceResult<RoutineTodo> {
        logged(MODULE, "routine_todo_find", todo_id, || {
            self.load_todo(routine_id, todo_id)
        })
    }

    /// Overwrites a template; instances see the change on their next read.
    pub fn update_todo(
        &self,
        routine_id: RoutineId,
        todo_id: RoutineTodoId,
        draft: &TodoDraft,
    ) -> ServiceResult<RoutineTodo> {
        logged(MODULE, "routine_todo_update", todo_id, || {
            let draft = normalize_draft(draft, "routineTodoName")?;
            let mut todo = self.load_todo(routine_id, todo_id)?;
            todo.apply(&draft);
            self.repo.update_routine_todo(&todo)?;
            Ok(todo)
        })
    }

    /// Deletes a template and every todo instance that references it.
    pub fn delete_todo(&self, routine_id: RoutineId, todo_id: RoutineTodoId) -> ServiceResult<()> {
        logged(MODULE, "routine_todo_delete", todo_id, || {
            self.load_todo(routine_id, todo_id)?;
            let removed_instances = self
                .repo
                .delete_routine_todo_cascade(todo_id)
                .map_err(|err| cascade_error(EntityKind::RoutineTodo, todo_id, err))?;
            info!(
                "event=routine_todo_delete module={MODULE} status=ok id={todo_id} removed_todo_instances={removed_instances}"
            );
            Ok(())
        })
    }

    fn attach_children(&self, routine: &mut Routine) -> ServiceResult<()> {
        routine.routine_todos = self.repo.list_routine_todos(routine.id)?;
        routine.routine_instances = self.repo.list_routine_instances(routine.id)?;
        Ok(())
    }

    fn load_routine(&self, id: RoutineId) -> ServiceResult<Routine> {
        self.repo
            .get_routine(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Routine, id))
    }

    fn load_todo(&self, routine_id: RoutineId, todo_id: RoutineTodoId) -> ServiceResult<RoutineTodo> {
        match self.repo.get_routine_todo(todo_id)? {
            Some(todo) if todo.routine_id == routine_id => Ok(todo),
            _ => Err(ServiceError::not_found(EntityKind::RoutineTodo, todo_id)),
        }
    }
}
