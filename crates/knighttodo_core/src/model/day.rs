//! Day aggregate: a named day owning an ordered list of day todos.

use crate::model::common::{Hardness, Scariness, TodoDraft};
use uuid::Uuid;

pub type DayId = Uuid;
pub type DayTodoId = Uuid;

/// A named day. `day_todos` is populated by read paths only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub id: DayId,
    pub day_name: String,
    pub day_todos: Vec<DayTodo>,
}

impl Day {
    /// Creates a new day with a generated id and no todos.
    pub fn new(day_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            day_name: day_name.into(),
            day_todos: Vec::new(),
        }
    }
}

/// A todo owned by exactly one day.
///
/// Day todos never earn experience through the ready transition; the field
/// exists so the read shape matches other todo kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTodo {
    pub id: DayTodoId,
    pub day_id: DayId,
    pub day_todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
    pub ready: bool,
    pub experience: u32,
}

impl DayTodo {
    /// Creates a not-ready day todo under `day_id` from draft fields.
    pub fn new(day_id: DayId, draft: &TodoDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            day_id,
            day_todo_name: draft.name.clone(),
            scariness: draft.scariness,
            hardness: draft.hardness,
            ready: false,
            experience: 0,
        }
    }

    /// Overwrites all mutable attributes from `draft`.
    pub fn apply(&mut self, draft: &TodoDraft) {
        self.day_todo_name = draft.name.clone();
        self.scariness = draft.scariness;
        self.hardness = draft.hardness;
    }
}
