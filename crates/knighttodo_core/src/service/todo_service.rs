//! TodoBlock/Todo service.
//!
//! # Responsibility
//! - Provide block and todo create/read/update/delete operations.
//! - Toggle a todo ready flag without awarding experience.
//!
//! # Invariants
//! - Deleting a block always deletes its todos in the same transaction.
//! - `find_todos_by_block_id` never fails for an unknown block.

use crate::model::common::{EntityKind, TodoDraft};
use crate::model::todo::{Todo, TodoBlock, TodoBlockId, TodoId};
use crate::repo::todo_repo::TodoRepository;
use crate::service::{
    cascade_error, logged, normalize_draft, normalize_name, ServiceError, ServiceResult,
};
use log::info;

const MODULE: &str = "todo_service";

/// TodoBlock/Todo service facade.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn save_block(&self, block_name: &str) -> ServiceResult<TodoBlock> {
        logged(MODULE, "block_create", "new", || {
            let block = TodoBlock::new(normalize_name(block_name, "blockName")?);
            self.repo.create_block(&block)?;
            Ok(block)
        })
    }

    /// Lists blocks in creation order, each with its todos.
    pub fn find_all_blocks(&self) -> ServiceResult<Vec<TodoBlock>> {
        logged(MODULE, "block_list", "all", || {
            let mut blocks = self.repo.list_blocks()?;
            for block in &mut blocks {
                block.todos = self.repo.list_todos_by_block(block.id)?;
            }
            Ok(blocks)
        })
    }

    pub fn find_block_by_id(&self, id: TodoBlockId) -> ServiceResult<TodoBlock> {
        logged(MODULE, "block_find", id, || {
            let mut block = self.load_block(id)?;
            block.todos = self.repo.list_todos_by_block(id)?;
            Ok(block)
        })
    }

    /// Renames a block and returns it with its todos.
    pub fn update_block(&self, id: TodoBlockId, block_name: &str) -> ServiceResult<TodoBlock> {
        logged(MODULE, "block_update", id, || {
            let name = normalize_name(block_name, "blockName")?;
            let mut block = self.load_block(id)?;
            block.block_name = name;
            self.repo.update_block(&block)?;
            block.todos = self.repo.list_todos_by_block(id)?;
            Ok(block)
        })
    }

    /// Deletes the block and all of its todos in one transaction.
    pub fn delete_block(&self, id: TodoBlockId) -> ServiceResult<()> {
        logged(MODULE, "block_delete", id, || {
            let removed_todos = self
                .repo
                .delete_block_cascade(id)
                .map_err(|err| cascade_error(EntityKind::TodoBlock, id, err))?;
            info!("event=block_delete module={MODULE} status=ok id={id} removed_todos={removed_todos}");
            Ok(())
        })
    }

    /// Adds a not-ready todo to an existing block.
    pub fn save_todo(&self, block_id: TodoBlockId, draft: &TodoDraft) -> ServiceResult<Todo> {
        logged(MODULE, "todo_create", block_id, || {
            let draft = normalize_draft(draft, "todoName")?;
            self.load_block(block_id)?;
            let todo = Todo::new(block_id, &draft);
            self.repo.create_todo(&todo)?;
            Ok(todo)
        })
    }

    pub fn find_all_todos(&self) -> ServiceResult<Vec<Todo>> {
        logged(MODULE, "todo_list", "all", || Ok(self.repo.list_todos()?))
    }

    /// Returns the todos referencing `block_id`; empty when there are none.
    pub fn find_todos_by_block_id(&self, block_id: TodoBlockId) -> ServiceResult<Vec<Todo>> {
        logged(MODULE, "todo_list_by_block", block_id, || {
            Ok(self.repo.list_todos_by_block(block_id)?)
        })
    }

    pub fn find_todo_by_id(&self, block_id: TodoBlockId, todo_id: TodoId) -> ServiceResult<Todo> {
        logged(MODULE, "todo_find", todo_id, || {
            self.load_todo(block_id, todo_id)
        })
    }

    /// Overwrites name, scariness and hardness of a todo.
    pub fn update_todo(
        &self,
        block_id: TodoBlockId,
        todo_id: TodoId,
        draft: &TodoDraft,
    ) -> ServiceResult<Todo> {
        logged(MODULE, "todo_update", todo_id, || {
            let draft = normalize_draft(draft, "todoName")?;
            let mut todo = self.load_todo(block_id, todo_id)?;
            todo.apply(&draft);
            self.repo.update_todo(&todo)?;
            Ok(todo)
        })
    }

    pub fn delete_todo(&self, block_id: TodoBlockId, todo_id: TodoId) -> ServiceResult<()> {
        logged(MODULE, "todo_delete", todo_id, || {
            self.load_todo(block_id, todo_id)?;
            Ok(self.repo.delete_todo(todo_id)?)
        })
    }

    /// Sets the ready flag directly; block todos never earn experience.
    pub fn update_todo_is_ready(
        &self,
        block_id: TodoBlockId,
        todo_id: TodoId,
        ready: bool,
    ) -> ServiceResult<Todo> {
        logged(MODULE, "todo_ready", todo_id, || {
            let mut todo = self.load_todo(block_id, todo_id)?;
            todo.ready = ready;
            self.repo.update_todo(&todo)?;
            Ok(todo)
        })
    }

    fn load_block(&self, id: TodoBlockId) -> ServiceResult<TodoBlock> {
        self.repo
            .get_block(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::TodoBlock, id))
    }

    fn load_todo(&self, block_id: TodoBlockId, todo_id: TodoId) -> ServiceResult<Todo> {
        match self.repo.get_todo(todo_id)? {
            Some(todo) if todo.block_id == block_id => Ok(todo),
            _ => Err(ServiceError::not_found(EntityKind::Todo, todo_id)),
        }
    }
}
