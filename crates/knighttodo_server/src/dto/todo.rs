use crate::dto::{required_name, todo_draft};
use crate::error::ApiError;
use knighttodo_core::{Hardness, Scariness, Todo, TodoBlock, TodoBlockId, TodoDraft, TodoId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoBlockRequest {
    pub block_name: Option<String>,
}

impl TodoBlockRequest {
    pub fn into_name(self) -> Result<String, ApiError> {
        required_name(self.block_name, "blockName")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub todo_name: Option<String>,
    pub scariness: Option<Scariness>,
    pub hardness: Option<Hardness>,
}

impl TodoRequest {
    pub fn into_draft(self) -> Result<TodoDraft, ApiError> {
        todo_draft(self.todo_name, "todoName", self.scariness, self.hardness)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoBlockResponse {
    pub id: TodoBlockId,
    pub block_name: String,
    pub todos: Vec<TodoResponse>,
}

impl From<TodoBlock> for TodoBlockResponse {
    fn from(block: TodoBlock) -> Self {
        Self {
            id: block.id,
            block_name: block.block_name,
            todos: block.todos.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: TodoId,
    pub block_id: TodoBlockId,
    pub todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
    pub ready: bool,
    pub experience: u32,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            block_id: todo.block_id,
            todo_name: todo.todo_name,
            scariness: todo.scariness,
            hardness: todo.hardness,
            ready: todo.ready,
            experience: todo.experience,
        }
    }
}
