//! Tasks are the units of work a project registers.

use crate::exception::{BuildException, BuildResult};
use crate::identifier::TaskId;
use crate::project::Project;
use log::{debug, info};
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

pub mod task_container;

pub use task_container::TaskContainer;

/// The group tasks that build outputs belong to
pub const BUILD_GROUP: &str = "build";

/// The action performed by a task.
pub trait Task: Any + Send + Sync + Debug + Default {
    /// Performs the work of this task
    fn task_action(task: &mut Executable<Self>, project: &Project) -> BuildResult;
}

/// Metadata shared by all tasks
#[derive(Debug, Clone)]
pub struct TaskOptions {
    group: Option<String>,
    description: Option<String>,
    enabled: bool,
    depends_on: Vec<String>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            group: None,
            description: None,
            enabled: true,
            depends_on: vec![],
        }
    }
}

impl TaskOptions {
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Representations of the tasks this task depends on
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// A task along with its metadata. Dereferences to the task itself.
pub struct Executable<T: Task> {
    id: TaskId,
    options: TaskOptions,
    task: T,
}

impl<T: Task> Executable<T> {
    pub(crate) fn new(id: TaskId) -> Self {
        Self {
            id,
            options: TaskOptions::default(),
            task: T::default(),
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.id
    }

    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    pub fn set_group(&mut self, group: impl AsRef<str>) {
        self.options.group = Some(group.as_ref().to_string());
    }

    pub fn set_description(&mut self, description: impl AsRef<str>) {
        self.options.description = Some(description.as_ref().to_string());
    }

    /// Enables or disables this task. Disabled tasks are skipped when executed.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    /// Adds a task that must run before this one
    pub fn depends_on(&mut self, task: impl AsRef<str>) {
        let task = task.as_ref().to_string();
        if !self.options.depends_on.contains(&task) {
            self.options.depends_on.push(task);
        }
    }
}

impl<T: Task> Deref for Executable<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

impl<T: Task> DerefMut for Executable<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.task
    }
}

impl<T: Task> Debug for Executable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executable")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("task", &self.task)
            .finish()
    }
}

/// An executable with its type erased
pub trait AnyExecutable: Send + Sync + Debug {
    fn task_id(&self) -> &TaskId;

    fn options(&self) -> &TaskOptions;

    /// Runs the task, unless it's disabled
    fn execute(&mut self, project: &Project) -> BuildResult;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

assert_obj_safe!(AnyExecutable);

impl<T: Task> AnyExecutable for Executable<T> {
    fn task_id(&self) -> &TaskId {
        &self.id
    }

    fn options(&self) -> &TaskOptions {
        &self.options
    }

    fn execute(&mut self, project: &Project) -> BuildResult {
        if !self.options.enabled {
            info!("{} SKIPPED", self.id);
            return Ok(());
        }
        debug!("executing {}", self.id);
        match T::task_action(self, project) {
            Err(BuildException::StopTask) | Err(BuildException::StopAction) => {
                debug!("{} stopped early", self.id);
                Ok(())
            }
            other => other,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
