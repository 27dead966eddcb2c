//! Routine aggregate.
//!
//! # Responsibility
//! - Model routines, their todo templates, dated instances and the
//!   per-instance completion records.
//!
//! # Invariants
//! - A routine owns its templates and its instances.
//! - A routine instance owns its todo instances.
//! - A todo instance references its template without owning it; template
//!   name/hardness/scariness are projected at read time, never copied.

use crate::model::common::{Hardness, Scariness, TodoDraft};
use uuid::Uuid;

pub type RoutineId = Uuid;
pub type RoutineTodoId = Uuid;
pub type RoutineInstanceId = Uuid;
pub type RoutineTodoInstanceId = Uuid;

/// Named recurring routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub id: RoutineId,
    pub name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
    /// Populated by read paths only.
    pub routine_todos: Vec<RoutineTodo>,
    /// Populated by read paths only, without nested todo instances.
    pub routine_instances: Vec<RoutineInstance>,
}

impl Routine {
    pub fn new(draft: &TodoDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            hardness: draft.hardness,
            scariness: draft.scariness,
            routine_todos: Vec::new(),
            routine_instances: Vec::new(),
        }
    }

    pub fn apply(&mut self, draft: &TodoDraft) {
        self.name = draft.name.clone();
        self.hardness = draft.hardness;
        self.scariness = draft.scariness;
    }
}

/// Template todo belonging to a routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineTodo {
    pub id: RoutineTodoId,
    pub routine_id: RoutineId,
    pub routine_todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
}

impl RoutineTodo {
    pub fn new(routine_id: RoutineId, draft: &TodoDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_id,
            routine_todo_name: draft.name.clone(),
            scariness: draft.scariness,
            hardness: draft.hardness,
        }
    }

    pub fn apply(&mut self, draft: &TodoDraft) {
        self.routine_todo_name = draft.name.clone();
        self.scariness = draft.scariness;
        self.hardness = draft.hardness;
    }
}

/// Input shape for creating or overwriting a routine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineInstanceDraft {
    pub fields: TodoDraft,
    pub ready: bool,
}

/// A dated occurrence of a routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineInstance {
    pub id: RoutineInstanceId,
    pub routine_id: RoutineId,
    pub name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
    pub ready: bool,
    /// Populated by `find_by_id` read paths only.
    pub routine_todo_instances: Vec<RoutineTodoInstance>,
}

impl RoutineInstance {
    pub fn new(routine_id: RoutineId, draft: &RoutineInstanceDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_id,
            name: draft.fields.name.clone(),
            hardness: draft.fields.hardness,
            scariness: draft.fields.scariness,
            ready: draft.ready,
            routine_todo_instances: Vec::new(),
        }
    }

    pub fn apply(&mut self, draft: &RoutineInstanceDraft) {
        self.name = draft.fields.name.clone();
        self.hardness = draft.fields.hardness;
        self.scariness = draft.fields.scariness;
        self.ready = draft.ready;
    }
}

/// Completion record for one template within one routine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineTodoInstance {
    pub id: RoutineTodoInstanceId,
    pub routine_instance_id: RoutineInstanceId,
    pub routine_todo_id: RoutineTodoId,
    pub ready: bool,
    pub experience: u32,
    /// Template projection resolved when the record is read.
    pub template: RoutineTodoProjection,
}

/// Current template attributes joined onto a todo instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineTodoProjection {
    pub routine_todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
}

impl RoutineTodoInstance {
    /// Creates a not-ready instance of `template` under `routine_instance_id`.
    pub fn instantiate(routine_instance_id: RoutineInstanceId, template: &RoutineTodo) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_instance_id,
            routine_todo_id: template.id,
            ready: false,
            experience: 0,
            template: RoutineTodoProjection {
                routine_todo_name: template.routine_todo_name.clone(),
                scariness: template.scariness,
                hardness: template.hardness,
            },
        }
    }
}
