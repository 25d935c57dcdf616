use crate::exception::{BuildException, BuildResult};
use crate::identifier::{ProjectId, TaskId};
use crate::lazy_evaluation::{Prop, Provider};
use crate::plugins::extensions::{ExtensionAware, ExtensionContainer};
use crate::plugins::Plugin;
use crate::source_sets::SourceSetContainer;
use crate::task::TaskContainer;
use crate::dependencies::ConfigurationContainer;
use log::{debug, info, trace};
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

pub mod error;

pub use error::{ProjectError, ProjectResult};

type AfterEvaluate = Box<dyn FnOnce(&mut Project) -> ProjectResult>;

/// The Project contains the tasks, layout information, and other related objects that would help
/// with project building.
///
/// Configuration happens in two phases. While plugins are applied, they register
/// intentions: extensions, tasks, and callbacks through [`after_evaluate`](Project::after_evaluate).
/// Once all user configuration is loaded, the host calls [`finalize`](Project::finalize) exactly
/// once, which runs those callbacks in the order they were registered.
///
/// # Example
/// ```
/// # use assemble_graal_core::Project;
/// # use assemble_graal_core::defaults::tasks::Empty;
/// let mut project = Project::in_dir_with_id("demo", "demo").unwrap();
/// project.task_container_mut().register_task::<Empty>("hello").unwrap();
/// project.after_evaluate(|project| {
///     project.set_property("evaluated".to_string(), None);
///     Ok(())
/// }).unwrap();
/// project.finalize().unwrap();
/// assert!(project.has_property("evaluated"));
/// ```
pub struct Project {
    project_id: ProjectId,
    project_dir: PathBuf,
    build_dir: Prop<PathBuf>,
    extensions: ExtensionContainer,
    source_sets: SourceSetContainer,
    configurations: ConfigurationContainer,
    task_container: TaskContainer,
    applied_plugins: Vec<String>,
    capabilities: Vec<String>,
    properties: HashMap<String, Option<String>>,
    after_evaluate: Vec<AfterEvaluate>,
    evaluated: bool,
    evaluation_failed: bool,
}

impl Debug for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Project {:?}", self.project_id)
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "project {}", self.project_id)
    }
}

impl Project {
    /// Creates an assemble project in a specified directory, named after that directory.
    pub fn in_dir(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ProjectError::custom(format!("can't name a project after {:?}", path)))?
            .to_string();
        Self::in_dir_with_id(path, name)
    }

    /// Creates an assemble project in a specified directory.
    pub fn in_dir_with_id<I: TryInto<ProjectId>, P: AsRef<Path>>(
        path: P,
        id: I,
    ) -> ProjectResult<Self>
    where
        ProjectError: From<<I as TryInto<ProjectId>>::Error>,
    {
        let id = id.try_into().map_err(ProjectError::from)?;
        let project_dir = path.as_ref().to_path_buf();
        let mut build_dir = Prop::new(id.join("buildDir").map_err(ProjectError::InvalidIdentifier)?);
        build_dir.set(project_dir.join("build"))?;
        debug!("created project {} in {:?}", id, project_dir);
        Ok(Self {
            task_container: TaskContainer::new(id.clone()),
            project_id: id,
            project_dir,
            build_dir,
            extensions: ExtensionContainer::default(),
            source_sets: SourceSetContainer::default(),
            configurations: ConfigurationContainer::default(),
            applied_plugins: vec![],
            capabilities: vec![],
            properties: HashMap::new(),
            after_evaluate: vec![],
            evaluated: false,
            evaluation_failed: false,
        })
    }

    /// Get the id of the project
    pub fn id(&self) -> &ProjectId {
        &self.project_id
    }

    /// The name of the project
    pub fn name(&self) -> &str {
        self.project_id.name()
    }

    /// The directory of the project
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The build directory, `<project>/build` unless changed
    pub fn build_dir(&self) -> ProjectResult<PathBuf> {
        Ok(self.build_dir.fallible_get()?)
    }

    /// Always set as relative to the project dir
    pub fn set_build_dir(&mut self, dir: impl AsRef<Path>) -> ProjectResult {
        self.build_dir.set(self.project_dir.join(dir))?;
        Ok(())
    }

    /// Applies a plugin. Applying a plugin that was already applied does nothing.
    pub fn apply_plugin<P: Plugin>(&mut self) -> ProjectResult {
        let plugin = P::default();
        let plugin_id = plugin.plugin_id().to_string();
        if self.applied_plugins.contains(&plugin_id) {
            trace!("{} already applied to {}", plugin_id, self);
            return Ok(());
        }
        debug!("applying {} to {}", plugin_id, self);
        self.applied_plugins.push(plugin_id);
        plugin.apply(self)
    }

    /// Declares that this project offers some capability, such as `application`
    pub fn declare_capability(&mut self, capability: impl AsRef<str>) {
        let capability = capability.as_ref().to_string();
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
    }

    /// Whether this project offers some capability
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Registers a callback to run once the project has been evaluated.
    ///
    /// # Error
    /// Errors if the project was already finalized.
    pub fn after_evaluate<F>(&mut self, callback: F) -> ProjectResult
    where
        F: FnOnce(&mut Project) -> ProjectResult + 'static,
    {
        if self.evaluated {
            return Err(ProjectError::AlreadyEvaluated.into());
        }
        self.after_evaluate.push(Box::new(callback));
        Ok(())
    }

    /// Whether [`finalize`](Project::finalize) has been called
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Marks the configuration of the project as complete and runs all after evaluate
    /// callbacks, in registration order. Only the first call does anything.
    ///
    /// The first callback that fails stops evaluation, and its error is returned. The project
    /// is then left partially configured, so every later call fails with
    /// [`EvaluationFailed`](ProjectError::EvaluationFailed).
    pub fn finalize(&mut self) -> ProjectResult {
        if self.evaluation_failed {
            return Err(ProjectError::EvaluationFailed(self.project_id.clone()).into());
        }
        if self.evaluated {
            trace!("{} already finalized", self);
            return Ok(());
        }
        self.evaluated = true;
        let callbacks = std::mem::take(&mut self.after_evaluate);
        debug!("finalizing {} ({} callbacks)", self, callbacks.len());
        for callback in callbacks {
            if let Err(e) = callback(self) {
                self.evaluation_failed = true;
                return Err(e);
            }
        }
        Ok(())
    }

    /// The source sets of this project
    pub fn source_sets(&self) -> &SourceSetContainer {
        &self.source_sets
    }

    /// Get mutable access to the source sets
    pub fn source_sets_mut(&mut self) -> &mut SourceSetContainer {
        &mut self.source_sets
    }

    /// The dependency configurations of this project
    pub fn configurations(&self) -> &ConfigurationContainer {
        &self.configurations
    }

    /// Get mutable access to the dependency configurations
    pub fn configurations_mut(&mut self) -> &mut ConfigurationContainer {
        &mut self.configurations
    }

    /// Get access to the task container
    pub fn task_container(&self) -> &TaskContainer {
        &self.task_container
    }

    /// Get access to the task container
    pub fn task_container_mut(&mut self) -> &mut TaskContainer {
        &mut self.task_container
    }

    /// Executes a task after the tasks it depends on. Each task runs at most once.
    pub fn execute_task(&mut self, repr: &str) -> BuildResult {
        let id = self
            .task_container
            .find_task_id(repr)
            .map_err(|e| BuildException::custom(&e.to_string()))?;
        let mut executed = HashSet::new();
        let mut in_progress = HashSet::new();
        self.execute_task_id(&id, &mut executed, &mut in_progress)
    }

    fn execute_task_id(
        &mut self,
        id: &TaskId,
        executed: &mut HashSet<TaskId>,
        in_progress: &mut HashSet<TaskId>,
    ) -> BuildResult {
        if executed.contains(id) {
            return Ok(());
        }
        if !in_progress.insert(id.clone()) {
            return Err(BuildException::custom(&format!(
                "{} depends on itself",
                id
            )));
        }
        let dependencies = self
            .task_container
            .get_task(id)
            .map(|t| t.options().depends_on().to_vec())
            .map_err(|e| BuildException::custom(&e.to_string()))?;
        for dependency in dependencies {
            let dependency = self
                .task_container
                .find_task_id(&dependency)
                .map_err(|e| BuildException::custom(&e.to_string()))?;
            self.execute_task_id(&dependency, executed, in_progress)?;
        }

        let (index, mut task) = self
            .task_container
            .take(id)
            .map_err(|e| BuildException::custom(&e.to_string()))?;
        info!("> Task {}", id);
        let result = task.execute(self);
        self.task_container.put_back(index, task);
        in_progress.remove(id);
        executed.insert(id.clone());
        result
    }

    /// Properties given to the project, usually with `-P`
    pub fn properties(&self) -> &HashMap<String, Option<String>> {
        &self.properties
    }

    /// Sets a property. A property can be set without a value.
    pub fn set_property(&mut self, key: String, value: impl Into<Option<String>>) {
        self.properties.insert(key, value.into());
    }

    /// Gets a property, if it was set
    pub fn get_property(&self, key: &str) -> Option<&Option<String>> {
        self.properties.get(key)
    }

    /// Whether a property was set, with or without a value
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

impl ExtensionAware for Project {
    fn extensions(&self) -> &ExtensionContainer {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut ExtensionContainer {
        &mut self.extensions
    }
}
