use crate::dto::{required_name, todo_draft};
use crate::error::ApiError;
use knighttodo_core::{Day, DayId, DayTodo, DayTodoId, Hardness, Scariness, TodoDraft};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRequest {
    pub day_name: Option<String>,
}

impl DayRequest {
    pub fn into_name(self) -> Result<String, ApiError> {
        required_name(self.day_name, "dayName")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTodoRequest {
    pub day_todo_name: Option<String>,
    pub scariness: Option<Scariness>,
    pub hardness: Option<Hardness>,
}

impl DayTodoRequest {
    pub fn into_draft(self) -> Result<TodoDraft, ApiError> {
        todo_draft(self.day_todo_name, "dayTodoName", self.scariness, self.hardness)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    pub id: DayId,
    pub day_name: String,
    pub day_todos: Vec<DayTodoResponse>,
}

impl From<Day> for DayResponse {
    fn from(day: Day) -> Self {
        Self {
            id: day.id,
            day_name: day.day_name,
            day_todos: day.day_todos.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayTodoResponse {
    pub id: DayTodoId,
    pub day_id: DayId,
    pub day_todo_name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
    pub ready: bool,
    pub experience: u32,
}

impl From<DayTodo> for DayTodoResponse {
    fn from(todo: DayTodo) -> Self {
        Self {
            id: todo.id,
            day_id: todo.day_id,
            day_todo_name: todo.day_todo_name,
            scariness: todo.scariness,
            hardness: todo.hardness,
            ready: todo.ready,
            experience: todo.experience,
        }
    }
}
