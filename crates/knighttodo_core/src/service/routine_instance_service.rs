//! Routine instance service and the todo-instance ready transition.
//!
//! # Responsibility
//! - Create routine instances together with one todo instance per template.
//! - Project current template attributes onto todo instances at read time.
//! - Drive the `not_ready -> ready` transition through the experience client.
//!
//! # Invariants
//! - A failed award leaves the todo instance untouched: no ready flag, no
//!   experience.
//! - Reverting to not-ready keeps the awarded experience and makes no call.
//! - Requesting the current state again is a no-op.
//! - The award write only lands on a todo instance that is still not ready.

use crate::experience::ExperienceClient;
use crate::model::common::EntityKind;
use crate::model::routine::{
    RoutineId, RoutineInstance, RoutineInstanceDraft, RoutineInstanceId, RoutineTodoInstance,
    RoutineTodoInstanceId,
};
use crate::repo::routine_repo::RoutineRepository;
use crate::service::{cascade_error, logged, normalize_draft, ServiceError, ServiceResult};
use log::info;

const MODULE: &str = "routine_instance_service";

/// Result of [`RoutineInstanceService::begin_ready_transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyTransition {
    /// Stored state is final for this request.
    Settled(RoutineTodoInstance),
    /// The instance becomes ready once an award is obtained.
    AwardPending(RoutineTodoInstanceId),
}

/// Asks `experience` for the award of one todo instance.
///
/// Touches no storage, so it can run while other requests use the connection.
pub fn request_award<E: ExperienceClient + ?Sized>(
    experience: &E,
    id: RoutineTodoInstanceId,
) -> ServiceResult<u32> {
    logged(MODULE, "routine_todo_instance_award", id, || {
        experience
            .award(id)
            .map_err(|source| ServiceError::ExternalService { id, source })
    })
}

/// Routine instance service facade.
pub struct RoutineInstanceService<R: RoutineRepository, E: ExperienceClient> {
    repo: R,
    experience: E,
}

impl<R: RoutineRepository, E: ExperienceClient> RoutineInstanceService<R, E> {
    pub fn new(repo: R, experience: E) -> Self {
        Self { repo, experience }
    }

    /// Creates an instance of an existing routine with a not-ready todo
    /// instance for every current template.
    pub fn save(
        &self,
        routine_id: RoutineId,
        draft: &RoutineInstanceDraft,
    ) -> ServiceResult<RoutineInstance> {
        logged(MODULE, "routine_instance_create", routine_id, || {
            let draft = normalize_instance_draft(draft)?;
            if self.repo.get_routine(routine_id)?.is_none() {
                return Err(ServiceError::not_found(EntityKind::Routine, routine_id));
            }

            let mut instance = RoutineInstance::new(routine_id, &draft);
            let todo_instances = self
                .repo
                .list_routine_todos(routine_id)?
                .iter()
                .map(|template| RoutineTodoInstance::instantiate(instance.id, template))
                .collect::<Vec<_>>();
            self.repo
                .create_routine_instance(&instance, &todo_instances)?;
            instance.routine_todo_instances = todo_instances;
            Ok(instance)
        })
    }

    /// Lists instance summaries of an existing routine.
    pub fn find_by_routine_id(&self, routine_id: RoutineId) -> ServiceResult<Vec<RoutineInstance>> {
        logged(MODULE, "routine_instance_list", routine_id, || {
            if self.repo.get_routine(routine_id)?.is_none() {
                return Err(ServiceError::not_found(EntityKind::Routine, routine_id));
            }
            Ok(self.repo.list_routine_instances(routine_id)?)
        })
    }

    /// Returns the instance with its todo instances re-projected from the
    /// current templates.
    pub fn find_by_id(
        &self,
        routine_id: RoutineId,
        id: RoutineInstanceId,
    ) -> ServiceResult<RoutineInstance> {
        logged(MODULE, "routine_instance_find", id, || {
            let mut instance = self.load_instance(routine_id, id)?;
            instance.routine_todo_instances = self.repo.list_routine_todo_instances(id)?;
            Ok(instance)
        })
    }

    /// Overwrites name, hardness, scariness and ready.
    pub fn update(
        &self,
        routine_id: RoutineId,
        id: RoutineInstanceId,
        draft: &RoutineInstanceDraft,
    ) -> ServiceResult<RoutineInstance> {
        logged(MODULE, "routine_instance_update", id, || {
            let draft = normalize_instance_draft(draft)?;
            let mut instance = self.load_instance(routine_id, id)?;
            instance.apply(&draft);
            self.repo.update_routine_instance(&instance)?;
            instance.routine_todo_instances = self.repo.list_routine_todo_instances(id)?;
            Ok(instance)
        })
    }

    /// Deletes the instance and its todo instances in one transaction.
    pub fn delete_by_id(&self, routine_id: RoutineId, id: RoutineInstanceId) -> ServiceResult<()> {
        logged(MODULE, "routine_instance_delete", id, || {
            self.load_instance(routine_id, id)?;
            let removed = self
                .repo
                .delete_routine_instance_cascade(id)
                .map_err(|err| cascade_error(EntityKind::RoutineInstance, id, err))?;
            info!(
                "event=routine_instance_delete module={MODULE} status=ok id={id} removed_todo_instances={removed}"
            );
            Ok(())
        })
    }

    pub fn find_todo_instances(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
    ) -> ServiceResult<Vec<RoutineTodoInstance>> {
        logged(MODULE, "routine_todo_instance_list", instance_id, || {
            self.load_instance(routine_id, instance_id)?;
            Ok(self.repo.list_routine_todo_instances(instance_id)?)
        })
    }

    pub fn find_todo_instance_by_id(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
        id: RoutineTodoInstanceId,
    ) -> ServiceResult<RoutineTodoInstance> {
        logged(MODULE, "routine_todo_instance_find", id, || {
            self.load_todo_instance(routine_id, instance_id, id)
        })
    }

    /// Applies the ready transition of one todo instance in-process.
    ///
    /// Runs [`Self::begin_ready_transition`], [`request_award`] and
    /// [`Self::complete_ready_transition`] back to back. Callers sharing one
    /// connection should run the award step without holding it.
    pub fn update_todo_instance_is_ready(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
        id: RoutineTodoInstanceId,
        ready: bool,
    ) -> ServiceResult<RoutineTodoInstance> {
        match self.begin_ready_transition(routine_id, instance_id, id, ready)? {
            ReadyTransition::Settled(todo_instance) => Ok(todo_instance),
            ReadyTransition::AwardPending(id) => {
                let experience = request_award(&self.experience, id)?;
                self.complete_ready_transition(routine_id, instance_id, id, experience)
            }
        }
    }

    /// Storage-only first step of a ready transition.
    ///
    /// Requesting the current state and reverting to not-ready settle here.
    /// Entering ready writes nothing and asks the caller for an award.
    pub fn begin_ready_transition(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
        id: RoutineTodoInstanceId,
        ready: bool,
    ) -> ServiceResult<ReadyTransition> {
        logged(MODULE, "routine_todo_instance_ready", id, || {
            let mut todo_instance = self.load_todo_instance(routine_id, instance_id, id)?;
            if todo_instance.ready == ready {
                return Ok(ReadyTransition::Settled(todo_instance));
            }
            if ready {
                return Ok(ReadyTransition::AwardPending(id));
            }

            todo_instance.ready = false;
            self.repo.update_routine_todo_instance(&todo_instance)?;
            info!(
                "event=routine_todo_instance_ready module={MODULE} status=ok id={id} ready=false experience={}",
                todo_instance.experience
            );
            Ok(ReadyTransition::Settled(todo_instance))
        })
    }

    /// Stores an award obtained for a pending transition.
    ///
    /// An instance that became ready in the meantime is returned unchanged.
    pub fn complete_ready_transition(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
        id: RoutineTodoInstanceId,
        experience: u32,
    ) -> ServiceResult<RoutineTodoInstance> {
        logged(MODULE, "routine_todo_instance_ready", id, || {
            let mut todo_instance = self.load_todo_instance(routine_id, instance_id, id)?;
            if !self.repo.mark_routine_todo_instance_awarded(id, experience)? {
                info!(
                    "event=routine_todo_instance_ready module={MODULE} status=skipped id={id} reason=already_ready"
                );
                return Ok(todo_instance);
            }

            todo_instance.ready = true;
            todo_instance.experience = experience;
            info!(
                "event=routine_todo_instance_ready module={MODULE} status=ok id={id} ready=true experience={experience}"
            );
            Ok(todo_instance)
        })
    }

    fn load_instance(
        &self,
        routine_id: RoutineId,
        id: RoutineInstanceId,
    ) -> ServiceResult<RoutineInstance> {
        match self.repo.get_routine_instance(id)? {
            Some(instance) if instance.routine_id == routine_id => Ok(instance),
            _ => Err(ServiceError::not_found(EntityKind::RoutineInstance, id)),
        }
    }

    fn load_todo_instance(
        &self,
        routine_id: RoutineId,
        instance_id: RoutineInstanceId,
        id: RoutineTodoInstanceId,
    ) -> ServiceResult<RoutineTodoInstance> {
        self.load_instance(routine_id, instance_id)?;
        match self.repo.get_routine_todo_instance(id)? {
            Some(todo_instance) if todo_instance.routine_instance_id == instance_id => {
                Ok(todo_instance)
            }
            _ => Err(ServiceError::not_found(EntityKind::RoutineTodoInstance, id)),
        }
    }
}

fn normalize_instance_draft(draft: &RoutineInstanceDraft) -> ServiceResult<RoutineInstanceDraft> {
    Ok(RoutineInstanceDraft {
        fields: normalize_draft(&draft.fields, "name")?,
        ready: draft.ready,
    })
}
