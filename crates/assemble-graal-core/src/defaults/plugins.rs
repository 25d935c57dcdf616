//! The `java` and `application` plugins.
//!
//! These only lay out the parts of a JVM project other plugins hook into. Compiling
//! sources is left to the host engine.

use crate::defaults::tasks::Empty;
use crate::lazy_evaluation::Prop;
use crate::plugins::extensions::ExtensionAware;
use crate::plugins::Plugin;
use crate::project::error::ProjectResult;
use crate::project::Project;
use crate::source_sets::{SourceSet, MAIN_SOURCE_SET_NAME, TEST_SOURCE_SET_NAME};
use crate::task::BUILD_GROUP;

/// The capability declared by [`JavaPlugin`](JavaPlugin)
pub const JAVA_CAPABILITY: &str = "java";
/// The capability declared by [`ApplicationPlugin`](ApplicationPlugin)
pub const APPLICATION_CAPABILITY: &str = "application";

/// The name of the task that assembles compiled classes
pub const CLASSES_TASK_NAME: &str = "classes";
/// Dependencies needed to compile and run the main source set
pub const IMPLEMENTATION_CONFIGURATION_NAME: &str = "implementation";
/// Dependencies only needed at runtime
pub const RUNTIME_ONLY_CONFIGURATION_NAME: &str = "runtimeOnly";
/// The resolved runtime classpath of the main source set
pub const RUNTIME_CLASSPATH_CONFIGURATION_NAME: &str = "runtimeClasspath";

/// Adds the `main` and `test` source sets, their configurations, and the `classes` task.
///
/// # Provided Configurations
/// - `implementation`, `runtimeOnly`
/// - `runtimeClasspath`, extending from both
/// - an annotation processor configuration per source set
#[derive(Debug, Default)]
pub struct JavaPlugin;

impl Plugin for JavaPlugin {
    fn apply(&self, project: &mut Project) -> ProjectResult {
        project.declare_capability(JAVA_CAPABILITY);
        let project_dir = project.project_dir().to_path_buf();
        let build_dir = project.build_dir()?;

        for name in [MAIN_SOURCE_SET_NAME, TEST_SOURCE_SET_NAME] {
            let source_set = SourceSet::conventional(name, &project_dir, &build_dir);
            let processor = source_set.annotation_processor_configuration_name();
            project.source_sets_mut().add(source_set)?;
            project.configurations_mut().create(&processor)?;
        }

        let configurations = project.configurations_mut();
        configurations.create(IMPLEMENTATION_CONFIGURATION_NAME)?;
        configurations.create(RUNTIME_ONLY_CONFIGURATION_NAME)?;
        configurations.create_with(RUNTIME_CLASSPATH_CONFIGURATION_NAME, |config| {
            config.extends_from(IMPLEMENTATION_CONFIGURATION_NAME);
            config.extends_from(RUNTIME_ONLY_CONFIGURATION_NAME);
        })?;

        project
            .task_container_mut()
            .register_task_with::<Empty, _>(CLASSES_TASK_NAME, |task| {
                task.set_group(BUILD_GROUP);
                task.set_description("Assembles main classes");
                Ok(())
            })?;
        Ok(())
    }
}

/// The extension added by [`ApplicationPlugin`](ApplicationPlugin)
#[derive(Debug)]
pub struct ApplicationExtension {
    /// The fully qualified name of the class containing the entry point
    pub main_class: Prop<String>,
}

impl ApplicationExtension {
    pub fn new() -> Self {
        Self {
            main_class: Prop::with_name("mainClass"),
        }
    }
}

impl Default for ApplicationExtension {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a java project as a runnable application.
#[derive(Debug, Default)]
pub struct ApplicationPlugin;

impl ApplicationPlugin {
    /// The name of the extension this plugin adds
    pub const EXTENSION_NAME: &'static str = "application";
}

impl Plugin for ApplicationPlugin {
    fn apply(&self, project: &mut Project) -> ProjectResult {
        project.apply_plugin::<JavaPlugin>()?;
        project
            .extensions_mut()
            .add(Self::EXTENSION_NAME, ApplicationExtension::new())?;
        project.declare_capability(APPLICATION_CAPABILITY);
        Ok(())
    }
}
