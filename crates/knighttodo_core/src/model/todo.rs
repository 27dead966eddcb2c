//! Todo block aggregate: a named container of ordered todos.

use crate::model::common::{Hardness, Scariness, TodoDraft};
use uuid::Uuid;

pub type TodoBlockId = Uuid;
pub type TodoId = Uuid;

/// A named todo container. `todos` is populated by read paths only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoBlock {
    pub id: TodoBlockId,
    pub block_name: String,
    pub todos: Vec<Todo>,
}

impl TodoBlock {
    pub fn new(block_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            block_name: block_name.into(),
            todos: Vec::new(),
        }
    }
}

/// A todo that belongs to exactly one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub block_id: TodoBlockId,
    pub todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
    pub ready: bool,
    /// Defaults to 0. Block todos never earn experience.
    pub experience: u32,
}

impl Todo {
    pub fn new(block_id: TodoBlockId, draft: &TodoDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            block_id,
            todo_name: draft.name.clone(),
            scariness: draft.scariness,
            hardness: draft.hardness,
            ready: false,
            experience: 0,
        }
    }

    pub fn apply(&mut self, draft: &TodoDraft) {
        self.todo_name = draft.name.clone();
        self.scariness = draft.scariness;
        self.hardness = draft.hardness;
    }
}
