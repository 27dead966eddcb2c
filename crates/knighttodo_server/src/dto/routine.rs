use crate::dto::todo_draft;
use crate::error::ApiError;
use knighttodo_core::{
    Hardness, Routine, RoutineId, RoutineInstance, RoutineInstanceDraft, RoutineInstanceId,
    RoutineTodo, RoutineTodoId, RoutineTodoInstance, RoutineTodoInstanceId, Scariness, TodoDraft,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineRequest {
    pub name: Option<String>,
    pub hardness: Option<Hardness>,
    pub scariness: Option<Scariness>,
}

impl RoutineRequest {
    pub fn into_draft(self) -> Result<TodoDraft, ApiError> {
        todo_draft(self.name, "name", self.scariness, self.hardness)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTodoRequest {
    pub routine_todo_name: Option<String>,
    pub hardness: Option<Hardness>,
    pub scariness: Option<Scariness>,
}

impl RoutineTodoRequest {
    pub fn into_draft(self) -> Result<TodoDraft, ApiError> {
        todo_draft(
            self.routine_todo_name,
            "routineTodoName",
            self.scariness,
            self.hardness,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineInstanceRequest {
    pub name: Option<String>,
    pub hardness: Option<Hardness>,
    pub scariness: Option<Scariness>,
    #[serde(default)]
    pub ready: bool,
}

impl RoutineInstanceRequest {
    pub fn into_draft(self) -> Result<RoutineInstanceDraft, ApiError> {
        Ok(RoutineInstanceDraft {
            fields: todo_draft(self.name, "name", self.scariness, self.hardness)?,
            ready: self.ready,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineResponse {
    pub id: RoutineId,
    pub name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
    pub routine_todos: Vec<RoutineTodoResponse>,
    pub routine_instances: Vec<RoutineInstanceResponse>,
}

impl From<Routine> for RoutineResponse {
    fn from(routine: Routine) -> Self {
        Self {
            id: routine.id,
            name: routine.name,
            hardness: routine.hardness,
            scariness: routine.scariness,
            routine_todos: routine.routine_todos.into_iter().map(Into::into).collect(),
            routine_instances: routine
                .routine_instances
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTodoResponse {
    pub id: RoutineTodoId,
    pub routine_id: RoutineId,
    pub routine_todo_name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
}

impl From<RoutineTodo> for RoutineTodoResponse {
    fn from(todo: RoutineTodo) -> Self {
        Self {
            id: todo.id,
            routine_id: todo.routine_id,
            routine_todo_name: todo.routine_todo_name,
            hardness: todo.hardness,
            scariness: todo.scariness,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineInstanceResponse {
    pub id: RoutineInstanceId,
    pub routine_id: RoutineId,
    pub name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
    pub ready: bool,
    pub routine_todo_instances: Vec<RoutineTodoInstanceResponse>,
}

impl From<RoutineInstance> for RoutineInstanceResponse {
    fn from(instance: RoutineInstance) -> Self {
        Self {
            id: instance.id,
            routine_id: instance.routine_id,
            name: instance.name,
            hardness: instance.hardness,
            scariness: instance.scariness,
            ready: instance.ready,
            routine_todo_instances: instance
                .routine_todo_instances
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Todo instance with its template attributes flattened in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTodoInstanceResponse {
    pub id: RoutineTodoInstanceId,
    pub routine_instance_id: RoutineInstanceId,
    pub routine_todo_id: RoutineTodoId,
    pub routine_todo_name: String,
    pub hardness: Hardness,
    pub scariness: Scariness,
    pub ready: bool,
    pub experience: u32,
}

impl From<RoutineTodoInstance> for RoutineTodoInstanceResponse {
    fn from(todo_instance: RoutineTodoInstance) -> Self {
        Self {
            id: todo_instance.id,
            routine_instance_id: todo_instance.routine_instance_id,
            routine_todo_id: todo_instance.routine_todo_id,
            routine_todo_name: todo_instance.template.routine_todo_name,
            hardness: todo_instance.template.hardness,
            scariness: todo_instance.template.scariness,
            ready: todo_instance.ready,
            experience: todo_instance.experience,
        }
    }
}
