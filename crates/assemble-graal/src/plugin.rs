//! Contains the native image plugin

use assemble_graal_core::defaults::plugins::{
    ApplicationExtension, APPLICATION_CAPABILITY, CLASSES_TASK_NAME,
};
use assemble_graal_core::lazy_evaluation::Provider;
use assemble_graal_core::plugins::extensions::{ExtensionAware, ExtensionError};
use assemble_graal_core::plugins::Plugin;
use assemble_graal_core::project::error::{ProjectError, ProjectResult};
use assemble_graal_core::source_sets::MAIN_SOURCE_SET_NAME;
use assemble_graal_core::task::BUILD_GROUP;
use assemble_graal_core::Project;
use itertools::Itertools;
use log::{debug, trace};

use crate::extensions::NativeImageExtension;
use crate::resolver::{ApplicationConfig, NativeImageDescriptorResolver, SourceSetDescriptor};
use crate::task::NativeImage;

/// Adds the `graal` extension. Once the project is evaluated, attaches the annotation processor
/// to source sets and, for applications, configures the `nativeImage` task.
///
/// The `nativeImage` task is only added if the project has the `application` capability when
/// this plugin is applied.
#[derive(Debug, Default)]
pub struct NativeImagePlugin;

impl NativeImagePlugin {
    /// The name of the extension added by this plugin
    pub const EXTENSION_NAME: &'static str = "graal";
    /// The name of the native image task
    pub const TASK_NAME: &'static str = "nativeImage";
}

impl Plugin for NativeImagePlugin {
    fn apply(&self, project: &mut Project) -> ProjectResult {
        project
            .extensions_mut()
            .add(Self::EXTENSION_NAME, NativeImageExtension::new())?;
        project.after_evaluate(attach_annotation_processors)?;

        if project.has_capability(APPLICATION_CAPABILITY) {
            project
                .task_container_mut()
                .register_task_with::<NativeImage, _>(Self::TASK_NAME, |task| {
                    task.set_group(BUILD_GROUP);
                    task.set_description("Builds a GraalVM Native Image");
                    task.depends_on(CLASSES_TASK_NAME);
                    Ok(())
                })?;
            project.after_evaluate(configure_native_image_tasks)?;
        } else {
            debug!(
                "{} has no {:?} capability, not adding {:?}",
                project,
                APPLICATION_CAPABILITY,
                Self::TASK_NAME
            );
        }
        Ok(())
    }
}

fn native_image_extension(project: &Project) -> ProjectResult<&NativeImageExtension> {
    project
        .extension::<NativeImageExtension>()
        .ok_or_else(|| ExtensionError::missing::<NativeImageExtension>().into())
}

fn attach_annotation_processors(project: &mut Project) -> ProjectResult {
    let extension = native_image_extension(project)?;
    let settings = extension.settings();
    let resolver = NativeImageDescriptorResolver::new(extension.processor_dependency());

    let source_sets = project.source_sets().clone();
    trace!("source sets of {}: {}", project, source_sets.names().iter().sorted().join(", "));

    resolver.attach_annotation_processors(&settings, &source_sets, project.configurations_mut())
}

fn configure_native_image_tasks(project: &mut Project) -> ProjectResult {
    let extension = native_image_extension(project)?;
    let settings = extension.settings();
    let resolver = NativeImageDescriptorResolver::new(extension.processor_dependency());

    let app_config = ApplicationConfig {
        main_class_name: project
            .extension::<ApplicationExtension>()
            .and_then(|application| application.main_class.try_get()),
    };
    let main = project.source_sets().get_by_name(MAIN_SOURCE_SET_NAME)?;
    let runtime_classpath = project
        .configurations()
        .resolve_files(&main.runtime_classpath_configuration_name())?;
    let main_source_set = SourceSetDescriptor::from(main);
    let project_name = project.name().to_string();

    project
        .task_container_mut()
        .with_type::<NativeImage, _>(|task| {
            let prior_image_name = task.image_name.try_get();
            let descriptor = resolver
                .resolve_descriptor(
                    &settings,
                    &app_config,
                    &runtime_classpath,
                    &main_source_set,
                    prior_image_name.as_deref(),
                    &project_name,
                )
                .map_err(|e| ProjectError::plugin(NativeImagePlugin.plugin_id(), e))?;
            debug!("{} configured with {:?}", task.task_id(), descriptor);
            NativeImage::apply_descriptor(task, &descriptor)?;
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ConfigurationError;
    use assemble_graal_core::defaults::plugins::{ApplicationPlugin, JavaPlugin};
    use std::path::PathBuf;

    fn application() -> Project {
        let mut project = Project::in_dir_with_id("/demo", "demo").unwrap();
        project.apply_plugin::<ApplicationPlugin>().unwrap();
        project.apply_plugin::<NativeImagePlugin>().unwrap();
        project
    }

    fn enable(project: &mut Project) {
        project
            .extension_mut::<NativeImageExtension>()
            .unwrap()
            .enable_native_image
            .set(true)
            .unwrap();
    }

    fn set_main_class(project: &mut Project, main: &str) {
        project
            .extension_mut::<ApplicationExtension>()
            .unwrap()
            .main_class
            .set(main)
            .unwrap();
    }

    fn native_image(project: &Project) -> &assemble_graal_core::task::Executable<NativeImage> {
        let id = project
            .task_container()
            .find_task_id(NativeImagePlugin::TASK_NAME)
            .unwrap();
        project.task_container().get_task_as::<NativeImage>(&id).unwrap()
    }

    #[test]
    fn task_registered_for_applications() {
        let project = application();
        let task = native_image(&project);
        assert_eq!(task.options().group(), Some(BUILD_GROUP));
        assert_eq!(task.options().depends_on(), &[CLASSES_TASK_NAME.to_string()]);
        assert!(project.extensions().contains(NativeImagePlugin::EXTENSION_NAME));
    }

    #[test]
    fn no_task_without_application_capability() {
        let mut project = Project::in_dir_with_id("/demo", "demo").unwrap();
        project.apply_plugin::<JavaPlugin>().unwrap();
        project.apply_plugin::<NativeImagePlugin>().unwrap();
        assert!(project
            .task_container()
            .find_task_id(NativeImagePlugin::TASK_NAME)
            .is_err());
        enable(&mut project);
        project.finalize().unwrap();
        assert_eq!(
            project
                .configurations()
                .get("annotationProcessor")
                .unwrap()
                .dependencies()
                .len(),
            1
        );
    }

    #[test]
    fn disabled_image_still_configured() {
        let mut project = application();
        project.finalize().unwrap();
        let task = native_image(&project);
        assert!(!task.enabled());
        assert_eq!(task.image_name.try_get(), Some("demo".to_string()));
        assert_eq!(task.main.try_get(), None);
        assert!(project
            .configurations()
            .get("annotationProcessor")
            .unwrap()
            .dependencies()
            .is_empty());
    }

    #[test]
    fn enabled_image_configured() {
        let mut project = application();
        enable(&mut project);
        set_main_class(&mut project, "com.example.App");
        project.finalize().unwrap();

        let task = native_image(&project);
        assert!(task.enabled());
        assert_eq!(task.main.try_get(), Some("com.example.App".to_string()));
        assert_eq!(
            task.classpath.try_get().unwrap(),
            vec![
                PathBuf::from("/demo/build/classes/java/main"),
                PathBuf::from("/demo/src/main/resources"),
            ]
        );
    }

    #[test]
    fn missing_main_class_fails_finalize_when_enabled() {
        let mut project = application();
        enable(&mut project);
        let error = project.finalize().unwrap_err();
        assert_eq!(
            error.kind().plugin_error::<ConfigurationError>(),
            Some(&ConfigurationError::MissingMainClass {
                project: "demo".to_string()
            })
        );
    }

    #[test]
    fn user_image_name_kept() {
        let mut project = application();
        let id = project
            .task_container()
            .find_task_id(NativeImagePlugin::TASK_NAME)
            .unwrap();
        project
            .task_container_mut()
            .configure_task::<NativeImage, _>(&id, |task| {
                task.image_name.set("custom")?;
                Ok(())
            })
            .unwrap();
        project.finalize().unwrap();
        assert_eq!(
            native_image(&project).image_name.try_get(),
            Some("custom".to_string())
        );
    }
}
