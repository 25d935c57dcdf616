//! The project definition file, `assemble-graal.toml`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use assemble_graal::{NativeImage, NativeImageExtension, NativeImagePlugin};
use assemble_graal_core::defaults::plugins::{
    ApplicationExtension, ApplicationPlugin, JavaPlugin, RUNTIME_ONLY_CONFIGURATION_NAME,
};
use assemble_graal_core::plugins::extensions::{ExtensionAware, ExtensionError};
use assemble_graal_core::project::error::{ProjectError, ProjectResult};
use assemble_graal_core::source_sets::SourceSet;
use assemble_graal_core::Project;

/// Overrides whether native images are enabled
pub const ENABLED_PROPERTY: &str = "graal.enabled";
/// Pre-sets the image name
pub const IMAGE_NAME_PROPERTY: &str = "graal.image-name";

/// Describes a single project
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectDefinition {
    /// The name of the project. Defaults to the name of its directory.
    name: Option<String>,
    /// Plugins to apply, in order
    #[serde(default)]
    plugins: Vec<PluginName>,
    application: Option<ApplicationDefinition>,
    graal: Option<GraalDefinition>,
    #[serde(default)]
    dependencies: DependenciesDefinition,
    #[serde(default)]
    source_sets: Vec<SourceSetDefinition>,
}

/// The plugins a definition can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginName {
    Java,
    Application,
    Graal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ApplicationDefinition {
    main_class: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct GraalDefinition {
    enabled: Option<bool>,
    additional_source_sets: Option<Vec<String>>,
    processor_dependency: Option<String>,
    image_name: Option<String>,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct DependenciesDefinition {
    /// Local jars and directories needed at runtime
    #[serde(default)]
    runtime: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SourceSetDefinition {
    name: String,
    #[serde(default)]
    classes: Vec<PathBuf>,
    #[serde(default)]
    resources: Vec<PathBuf>,
}

/// The definition file couldn't be read
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// The file couldn't be opened or read
    #[error("Couldn't read {path:?}: {source}")]
    Io {
        /// The definition file
        path: PathBuf,
        /// Why reading failed
        source: std::io::Error,
    },
    /// The file isn't a valid definition
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl FromStr for ProjectDefinition {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl ProjectDefinition {
    /// Reads a definition from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// The plugins applied by this definition
    pub fn plugins(&self) -> &[PluginName] {
        &self.plugins
    }

    /// Creates and finalizes the project described by this definition. Relative paths are
    /// resolved against `project_dir`.
    ///
    /// Properties are applied after the definition, so they override it.
    pub fn build(
        &self,
        project_dir: &Path,
        properties: &HashMap<String, Option<String>>,
    ) -> ProjectResult<Project> {
        let mut project = match &self.name {
            Some(name) => Project::in_dir_with_id(project_dir, name.as_str())?,
            None => Project::in_dir(project_dir)?,
        };
        for (key, value) in properties {
            project.set_property(key.clone(), value.clone());
        }

        for plugin in &self.plugins {
            match plugin {
                PluginName::Java => project.apply_plugin::<JavaPlugin>()?,
                PluginName::Application => project.apply_plugin::<ApplicationPlugin>()?,
                PluginName::Graal => project.apply_plugin::<NativeImagePlugin>()?,
            }
        }

        self.configure_source_sets(&mut project)?;
        for runtime in &self.dependencies.runtime {
            project
                .configurations_mut()
                .add(RUNTIME_ONLY_CONFIGURATION_NAME, project_dir.join(runtime))?;
        }
        if let Some(application) = &self.application {
            if let Some(main_class) = &application.main_class {
                project
                    .extension_mut::<ApplicationExtension>()
                    .ok_or_else(ExtensionError::missing::<ApplicationExtension>)?
                    .main_class
                    .set(main_class.as_str())?;
            }
        }
        if let Some(graal) = &self.graal {
            graal.configure(&mut project)?;
        }
        apply_properties(&mut project, properties)?;

        project.finalize()?;
        Ok(project)
    }

    fn configure_source_sets(&self, project: &mut Project) -> ProjectResult {
        let project_dir = project.project_dir().to_path_buf();
        for definition in &self.source_sets {
            if project.source_sets().find_by_name(&definition.name).is_none() {
                let source_set = SourceSet::new(&definition.name);
                let processor = source_set.annotation_processor_configuration_name();
                project.source_sets_mut().add(source_set)?;
                project.configurations_mut().maybe_create(&processor)?;
            }
            let source_set = project
                .source_sets_mut()
                .find_by_name_mut(&definition.name)
                .ok_or_else(|| ProjectError::SourceSetMissing(definition.name.clone()))?;
            source_set
                .classes_dirs_mut()
                .extend(definition.classes.iter().map(|path| project_dir.join(path)));
            source_set
                .resource_dirs_mut()
                .extend(definition.resources.iter().map(|path| project_dir.join(path)));
        }
        Ok(())
    }
}

impl GraalDefinition {
    fn configure(&self, project: &mut Project) -> ProjectResult {
        let extension = project
            .extension_mut::<NativeImageExtension>()
            .ok_or_else(ExtensionError::missing::<NativeImageExtension>)?;
        if let Some(enabled) = self.enabled {
            extension.enable_native_image.set(enabled)?;
        }
        if let Some(additional) = &self.additional_source_sets {
            extension
                .processing
                .additional_source_sets
                .set(additional.iter().cloned())?;
        }
        if let Some(processor) = &self.processor_dependency {
            extension.processor_dependency.set(processor.as_str())?;
        }

        let image_name = self.image_name.clone();
        let args = self.args.clone();
        project
            .task_container_mut()
            .with_type::<NativeImage, _>(|task| {
                if let Some(image_name) = &image_name {
                    task.image_name.set(image_name.as_str())?;
                }
                task.args.extend(args.iter().cloned())?;
                Ok(())
            })
    }
}

/// Applies `graal.enabled` and `graal.image-name`.
///
/// `-P graal.enabled` without a value enables native images.
fn apply_properties(
    project: &mut Project,
    properties: &HashMap<String, Option<String>>,
) -> ProjectResult {
    if let Some(enabled) = properties.get(ENABLED_PROPERTY) {
        let enabled = match enabled.as_deref() {
            None | Some("") | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(ProjectError::custom(format!(
                    "{} must be true or false, found {:?}",
                    ENABLED_PROPERTY, other
                ))
                .into())
            }
        };
        debug!("{} set to {} by property", ENABLED_PROPERTY, enabled);
        project
            .extension_mut::<NativeImageExtension>()
            .ok_or_else(ExtensionError::missing::<NativeImageExtension>)?
            .enable_native_image
            .set(enabled)?;
    }
    if let Some(Some(image_name)) = properties.get(IMAGE_NAME_PROPERTY) {
        project
            .task_container_mut()
            .with_type::<NativeImage, _>(|task| {
                task.image_name.set(image_name.as_str())?;
                Ok(())
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assemble_graal_core::lazy_evaluation::Provider;

    const DEFINITION: &str = r#"
name = "demo"
plugins = ["application", "graal"]

[application]
main-class = "com.example.App"

[graal]
enabled = true
image-name = "demo-image"
args = ["--no-fallback"]

[dependencies]
runtime = ["libs/a.jar"]
"#;

    #[test]
    fn parse_definition() {
        let definition: ProjectDefinition = DEFINITION.parse().unwrap();
        assert_eq!(definition.name.as_deref(), Some("demo"));
        assert_eq!(
            definition.plugins(),
            &[PluginName::Application, PluginName::Graal]
        );
        let graal = definition.graal.as_ref().unwrap();
        assert_eq!(graal.enabled, Some(true));
        assert_eq!(graal.additional_source_sets, None);
        assert_eq!(definition.dependencies.runtime, vec![PathBuf::from("libs/a.jar")]);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!("name = \"demo\"\nversion = \"1.0\"".parse::<ProjectDefinition>().is_err());
        assert!("[graal]\nenable = true".parse::<ProjectDefinition>().is_err());
        assert!("plugins = [\"kotlin\"]".parse::<ProjectDefinition>().is_err());
    }

    #[test]
    fn build_project() {
        let definition: ProjectDefinition = DEFINITION.parse().unwrap();
        let project = definition.build(Path::new("/demo"), &HashMap::new()).unwrap();
        assert!(project.is_evaluated());

        let id = project.task_container().find_task_id("nativeImage").unwrap();
        let task = project.task_container().get_task_as::<NativeImage>(&id).unwrap();
        assert!(task.enabled());
        assert_eq!(task.image_name.try_get().as_deref(), Some("demo-image"));
        assert_eq!(task.args.try_get(), Some(vec!["--no-fallback".to_string()]));
        assert_eq!(
            task.classpath.try_get().unwrap()[0],
            PathBuf::from("/demo/libs/a.jar")
        );
    }

    #[test]
    fn properties_override_definition() {
        let definition: ProjectDefinition = DEFINITION.parse().unwrap();
        let properties = HashMap::from([
            (ENABLED_PROPERTY.to_string(), Some("false".to_string())),
            (IMAGE_NAME_PROPERTY.to_string(), Some("from-cli".to_string())),
        ]);
        let project = definition.build(Path::new("/demo"), &properties).unwrap();
        assert_eq!(
            project.get_property(ENABLED_PROPERTY),
            Some(&Some("false".to_string()))
        );

        let id = project.task_container().find_task_id("nativeImage").unwrap();
        let task = project.task_container().get_task_as::<NativeImage>(&id).unwrap();
        assert!(!task.enabled());
        assert_eq!(task.image_name.try_get().as_deref(), Some("from-cli"));
    }

    #[test]
    fn invalid_enabled_property() {
        let definition: ProjectDefinition = DEFINITION.parse().unwrap();
        let properties = HashMap::from([(ENABLED_PROPERTY.to_string(), Some("yes".to_string()))]);
        assert!(definition.build(Path::new("/demo"), &properties).is_err());
    }

    #[test]
    fn extra_source_sets() {
        let definition: ProjectDefinition = r#"
name = "demo"
plugins = ["application", "graal"]

[application]
main-class = "com.example.App"

[graal]
enabled = true
additional-source-sets = ["integration"]

[[source-sets]]
name = "integration"
classes = ["out/integration"]

[[source-sets]]
name = "main"
resources = ["config"]
"#
        .parse()
        .unwrap();
        let project = definition.build(Path::new("/demo"), &HashMap::new()).unwrap();
        assert_eq!(
            project
                .configurations()
                .get("integrationAnnotationProcessor")
                .unwrap()
                .dependencies()
                .len(),
            1
        );
        let main = project.source_sets().get_by_name("main").unwrap();
        assert!(main.resource_dirs().contains("/demo/config"));
    }

    #[test]
    fn main_class_required_when_enabled() {
        let definition: ProjectDefinition = r#"
name = "demo"
plugins = ["application", "graal"]

[graal]
enabled = true
"#
        .parse()
        .unwrap();
        let error = definition
            .build(Path::new("/demo"), &HashMap::new())
            .unwrap_err();
        assert!(error.to_string().contains("demo"));
    }
}
