//! The task container

use crate::identifier::{ProjectId, TaskId};
use crate::project::error::{ProjectError, ProjectResult};
use crate::task::{AnyExecutable, Executable, Task};
use std::any::type_name;

/// Contains the tasks registered to a project, in registration order
#[derive(Debug)]
pub struct TaskContainer {
    project_id: ProjectId,
    tasks: Vec<Box<dyn AnyExecutable>>,
}

impl TaskContainer {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            tasks: vec![],
        }
    }

    /// Registers a new task
    pub fn register_task<T: Task>(&mut self, name: &str) -> ProjectResult<TaskId> {
        self.register_task_with::<T, _>(name, |_| Ok(()))
    }

    /// Registers a new task, then configures it
    pub fn register_task_with<T, F>(&mut self, name: &str, configure: F) -> ProjectResult<TaskId>
    where
        T: Task,
        F: FnOnce(&mut Executable<T>) -> ProjectResult,
    {
        let id = self.project_id.task(name).map_err(ProjectError::from)?;
        if self.tasks.iter().any(|t| t.task_id() == &id) {
            return Err(ProjectError::TaskAlreadyRegistered(id).into());
        }
        let mut executable = Executable::<T>::new(id.clone());
        configure(&mut executable)?;
        self.tasks.push(Box::new(executable));
        Ok(id)
    }

    /// The ids of all registered tasks
    pub fn get_tasks(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.task_id().clone()).collect()
    }

    /// Finds the id of a task from a full id or shorthand
    pub fn find_task_id(&self, repr: &str) -> ProjectResult<TaskId> {
        let repr = repr.trim_start_matches(crate::identifier::ID_SEPARATOR);
        self.tasks
            .iter()
            .map(|t| t.task_id())
            .find(|id| id.is_shorthand(repr))
            .cloned()
            .ok_or_else(|| ProjectError::NoIdentifiersFound(repr.to_string()).into())
    }

    /// Gets a task
    pub fn get_task(&self, id: &TaskId) -> ProjectResult<&dyn AnyExecutable> {
        self.tasks
            .iter()
            .find(|t| t.task_id() == id)
            .map(|t| t.as_ref())
            .ok_or_else(|| ProjectError::IdentifierMissing(id.clone()).into())
    }

    /// Gets a task as its concrete type
    pub fn get_task_as<T: Task>(&self, id: &TaskId) -> ProjectResult<&Executable<T>> {
        self.get_task(id)?
            .as_any()
            .downcast_ref::<Executable<T>>()
            .ok_or_else(|| {
                ProjectError::TaskTypeMismatch(id.clone(), type_name::<T>().to_string()).into()
            })
    }

    /// Configures a task of a known type
    pub fn configure_task<T, F>(&mut self, id: &TaskId, configure: F) -> ProjectResult
    where
        T: Task,
        F: FnOnce(&mut Executable<T>) -> ProjectResult,
    {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.task_id() == id)
            .ok_or_else(|| ProjectError::IdentifierMissing(id.clone()))?;
        let executable = task
            .as_any_mut()
            .downcast_mut::<Executable<T>>()
            .ok_or_else(|| ProjectError::TaskTypeMismatch(id.clone(), type_name::<T>().to_string()))?;
        configure(executable)
    }

    /// Configures every task of type `T`, like `tasks.withType(T) { }`
    pub fn with_type<T, F>(&mut self, mut configure: F) -> ProjectResult
    where
        T: Task,
        F: FnMut(&mut Executable<T>) -> ProjectResult,
    {
        for task in &mut self.tasks {
            if let Some(executable) = task.as_any_mut().downcast_mut::<Executable<T>>() {
                configure(executable)?;
            }
        }
        Ok(())
    }

    /// Removes a task so it can be executed against the project that owns this container
    pub(crate) fn take(&mut self, id: &TaskId) -> ProjectResult<(usize, Box<dyn AnyExecutable>)> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.task_id() == id)
            .ok_or_else(|| ProjectError::IdentifierMissing(id.clone()))?;
        Ok((index, self.tasks.remove(index)))
    }

    /// Returns a task removed by [`take`](TaskContainer::take) to its original position
    pub(crate) fn put_back(&mut self, index: usize, task: Box<dyn AnyExecutable>) {
        let index = index.min(self.tasks.len());
        self.tasks.insert(index, task);
    }
}
