//! Decides whether a native image is built, and what goes into it.
//!
//! The resolver runs once the project is evaluated. It has two jobs:
//! - attach the annotation processor to source sets, through
//!   [`attach_annotation_processors`](NativeImageDescriptorResolver::attach_annotation_processors)
//! - compute the inputs of the native image compiler, through
//!   [`resolve_descriptor`](NativeImageDescriptorResolver::resolve_descriptor)
//!
//! Both only read from the project through the [`SourceSetLookup`] and
//! [`DependencyRegistrar`] traits, so they can be driven by any host.

use assemble_graal_core::dependencies::ConfigurationContainer;
use assemble_graal_core::file_collection::{FileCollection, FileSet};
use assemble_graal_core::project::error::ProjectResult;
use assemble_graal_core::source_sets::{
    SourceSet, SourceSetContainer, MAIN_SOURCE_SET_NAME, TEST_SOURCE_SET_NAME,
};
use log::{debug, info, trace};
use std::path::PathBuf;

/// The source sets that always get the annotation processor, when they exist
pub const DEFAULT_PROCESSED_SOURCE_SETS: [&str; 2] = [MAIN_SOURCE_SET_NAME, TEST_SOURCE_SET_NAME];

/// A snapshot of the user's native image configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSettings {
    /// Whether native image generation is enabled
    pub native_image_enabled: bool,
    /// Additional source sets to attach the processor to. `None` when never configured.
    pub additional_source_set_names: Option<Vec<String>>,
}

/// The parts of a source set the resolver needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSetDescriptor {
    /// The name of the source set
    pub name: String,
    /// Where compiled classes are written
    pub compiled_class_directories: FileSet,
    /// Resources copied next to the compiled classes
    pub resource_directories: FileSet,
    /// The configuration annotation processors are added to
    pub annotation_processor_target_id: String,
}

impl From<&SourceSet> for SourceSetDescriptor {
    fn from(source_set: &SourceSet) -> Self {
        Self {
            name: source_set.name().to_string(),
            compiled_class_directories: source_set.classes_dirs().clone(),
            resource_directories: source_set.resource_dirs().clone(),
            annotation_processor_target_id: source_set.annotation_processor_configuration_name(),
        }
    }
}

/// Finds source sets by name
pub trait SourceSetLookup {
    /// Finds a source set, or `None` if there's no source set with this name
    fn find_source_set(&self, name: &str) -> Option<SourceSetDescriptor>;
}

impl SourceSetLookup for SourceSetContainer {
    fn find_source_set(&self, name: &str) -> Option<SourceSetDescriptor> {
        self.find_by_name(name).map(SourceSetDescriptor::from)
    }
}

/// Adds dependency edges to the host's dependency graph
pub trait DependencyRegistrar {
    /// Adds `notation` to the `target` configuration. Returns `false` if the edge already existed.
    fn register(&mut self, target: &str, notation: &str) -> ProjectResult<bool>;
}

impl DependencyRegistrar for ConfigurationContainer {
    fn register(&mut self, target: &str, notation: &str) -> ProjectResult<bool> {
        self.add(target, notation)
    }
}

/// Configuration of the application the image is built for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// The fully qualified name of the class with the entry point
    pub main_class_name: Option<String>,
}

/// Everything the native image compiler needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeImageDescriptor {
    /// Whether the image should be built at all
    pub enabled: bool,
    /// The main class. Only `None` when the image is disabled.
    pub entry_point_class: Option<String>,
    /// The file name of the built executable
    pub image_name: String,
    /// Ordered and free of duplicates
    pub classpath: Vec<PathBuf>,
}

/// The native image can't be configured
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Native images are enabled but no main class is set
    #[error("No main class is declared for {project}. A main class is required to build a native image")]
    MissingMainClass {
        /// The name of the project
        project: String,
    },
}

/// Computes native image descriptors and attaches annotation processors
#[derive(Debug, Clone)]
pub struct NativeImageDescriptorResolver {
    processor_dependency: String,
}

impl NativeImageDescriptorResolver {
    /// Creates a resolver that attaches the given processor dependency
    pub fn new(processor_dependency: impl AsRef<str>) -> Self {
        Self {
            processor_dependency: processor_dependency.as_ref().to_string(),
        }
    }

    /// The dependency notation this resolver attaches
    pub fn processor_dependency(&self) -> &str {
        &self.processor_dependency
    }

    /// Attaches the annotation processor to the `main` and `test` source sets when they exist,
    /// then to every additional source set, if any were configured.
    ///
    /// Does nothing when native images are disabled. Additional source sets are trusted to
    /// exist: their target is derived from their name and handed straight to the registrar.
    pub fn attach_annotation_processors<L, R>(
        &self,
        settings: &ExtensionSettings,
        source_sets: &L,
        registrar: &mut R,
    ) -> ProjectResult
    where
        L: SourceSetLookup + ?Sized,
        R: DependencyRegistrar + ?Sized,
    {
        if !settings.native_image_enabled {
            trace!("native image disabled, not attaching annotation processors");
            return Ok(());
        }

        for name in DEFAULT_PROCESSED_SOURCE_SETS {
            match source_sets.find_source_set(name) {
                Some(source_set) => {
                    self.attach(&source_set.annotation_processor_target_id, registrar)?
                }
                None => debug!("no {:?} source set, skipping annotation processor", name),
            }
        }

        if let Some(additional) = &settings.additional_source_set_names {
            for name in additional {
                let target = SourceSet::configuration_name_for(name, "annotationProcessor");
                self.attach(&target, registrar)?;
            }
        }
        Ok(())
    }

    fn attach<R: DependencyRegistrar + ?Sized>(&self, target: &str, registrar: &mut R) -> ProjectResult {
        if registrar.register(target, &self.processor_dependency)? {
            info!("added {} to {}", self.processor_dependency, target);
        }
        Ok(())
    }

    /// Computes the descriptor of a native image.
    ///
    /// The descriptor is computed completely even when native images are disabled. The image
    /// name is `prior_image_name` if it's set to something non-empty, and `project_name`
    /// otherwise. The classpath is the runtime classpath, then the compiled classes, then the
    /// resources of the main source set, without duplicates.
    ///
    /// # Error
    /// A missing main class is an error only when native images are enabled.
    pub fn resolve_descriptor<C: FileCollection + ?Sized>(
        &self,
        settings: &ExtensionSettings,
        app_config: &ApplicationConfig,
        runtime_classpath: &C,
        main_source_set: &SourceSetDescriptor,
        prior_image_name: Option<&str>,
        project_name: &str,
    ) -> Result<NativeImageDescriptor, ConfigurationError> {
        let enabled = settings.native_image_enabled;

        let entry_point_class = app_config
            .main_class_name
            .clone()
            .filter(|main| !main.is_empty());
        if enabled && entry_point_class.is_none() {
            return Err(ConfigurationError::MissingMainClass {
                project: project_name.to_string(),
            });
        }

        let image_name = match prior_image_name {
            Some(prior) if !prior.is_empty() => prior.to_string(),
            _ => project_name.to_string(),
        };

        let mut classpath = FileSet::from_iter(runtime_classpath.files());
        classpath += &main_source_set.compiled_class_directories;
        classpath += &main_source_set.resource_directories;

        Ok(NativeImageDescriptor {
            enabled,
            entry_point_class,
            image_name,
            classpath: classpath.files(),
        })
    }
}

impl Default for NativeImageDescriptorResolver {
    fn default() -> Self {
        Self::new(crate::extensions::DEFAULT_PROCESSOR_DEPENDENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assemble_graal_core::file_collection::FileCollection;

    /// Records every registration, including repeated ones
    #[derive(Default)]
    struct Recorder {
        edges: Vec<(String, String)>,
    }

    impl DependencyRegistrar for Recorder {
        fn register(&mut self, target: &str, notation: &str) -> ProjectResult<bool> {
            self.edges.push((target.to_string(), notation.to_string()));
            Ok(true)
        }
    }

    fn java_source_set(name: &str) -> SourceSet {
        let mut set = SourceSet::new(name);
        set.classes_dirs_mut()
            .insert(format!("/demo/build/classes/java/{}", name));
        set.resource_dirs_mut()
            .insert(format!("/demo/src/{}/resources", name));
        set
    }

    fn source_set(name: &str) -> SourceSetDescriptor {
        SourceSetDescriptor::from(&java_source_set(name))
    }

    fn lookup(names: &[&str]) -> SourceSetContainer {
        let mut container = SourceSetContainer::default();
        for name in names {
            container.add(java_source_set(name)).unwrap();
        }
        container
    }

    fn enabled(additional: Option<Vec<&str>>) -> ExtensionSettings {
        ExtensionSettings {
            native_image_enabled: true,
            additional_source_set_names: additional
                .map(|names| names.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn disabled_registers_nothing() {
        let resolver = NativeImageDescriptorResolver::default();
        let mut recorder = Recorder::default();
        let settings = ExtensionSettings {
            native_image_enabled: false,
            additional_source_set_names: Some(vec!["integration".to_string()]),
        };
        resolver
            .attach_annotation_processors(&settings, &lookup(&["main", "test"]), &mut recorder)
            .unwrap();
        assert!(recorder.edges.is_empty());
    }

    #[test]
    fn main_and_test_get_processor() {
        let resolver = NativeImageDescriptorResolver::default();
        let mut recorder = Recorder::default();
        resolver
            .attach_annotation_processors(&enabled(None), &lookup(&["main", "test"]), &mut recorder)
            .unwrap();
        assert_eq!(
            recorder.edges,
            vec![
                (
                    "annotationProcessor".to_string(),
                    "io.micronaut:micronaut-graal".to_string()
                ),
                (
                    "testAnnotationProcessor".to_string(),
                    "io.micronaut:micronaut-graal".to_string()
                ),
            ]
        );
    }

    #[test]
    fn missing_fixed_source_sets_are_skipped() {
        let resolver = NativeImageDescriptorResolver::new("com.example:processor");
        let mut recorder = Recorder::default();
        resolver
            .attach_annotation_processors(&enabled(None), &lookup(&["main"]), &mut recorder)
            .unwrap();
        assert_eq!(
            recorder.edges,
            vec![(
                "annotationProcessor".to_string(),
                "com.example:processor".to_string()
            )]
        );
    }

    #[test]
    fn additional_source_sets_get_processor_too() {
        let resolver = NativeImageDescriptorResolver::default();
        let mut recorder = Recorder::default();
        resolver
            .attach_annotation_processors(
                &enabled(Some(vec!["integrationTest", "jmh"])),
                &lookup(&["main", "test"]),
                &mut recorder,
            )
            .unwrap();
        let targets = recorder
            .edges
            .iter()
            .map(|(target, _)| target.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            targets,
            vec![
                "annotationProcessor",
                "testAnnotationProcessor",
                "integrationTestAnnotationProcessor",
                "jmhAnnotationProcessor"
            ]
        );
    }

    #[test]
    fn empty_additional_source_sets_same_as_absent() {
        let resolver = NativeImageDescriptorResolver::default();
        let mut absent = Recorder::default();
        let mut empty = Recorder::default();
        let sets = lookup(&["main", "test"]);
        resolver
            .attach_annotation_processors(&enabled(None), &sets, &mut absent)
            .unwrap();
        resolver
            .attach_annotation_processors(&enabled(Some(vec![])), &sets, &mut empty)
            .unwrap();
        assert_eq!(absent.edges, empty.edges);
    }

    #[test]
    fn reattaching_is_deduplicated_by_configurations() {
        let resolver = NativeImageDescriptorResolver::default();
        let mut configurations = ConfigurationContainer::default();
        configurations.create("annotationProcessor").unwrap();
        configurations.create("testAnnotationProcessor").unwrap();
        let sets = lookup(&["main", "test"]);
        for _ in 0..2 {
            resolver
                .attach_annotation_processors(&enabled(None), &sets, &mut configurations)
                .unwrap();
        }
        for name in ["annotationProcessor", "testAnnotationProcessor"] {
            assert_eq!(configurations.get(name).unwrap().dependencies().len(), 1);
        }
    }

    fn runtime() -> FileSet {
        FileSet::from_iter(["/libs/micronaut-runtime.jar", "/libs/logback.jar"])
    }

    fn app(main: Option<&str>) -> ApplicationConfig {
        ApplicationConfig {
            main_class_name: main.map(str::to_string),
        }
    }

    #[test]
    fn descriptor_from_inputs() {
        let resolver = NativeImageDescriptorResolver::default();
        let main = source_set("main");
        let descriptor = resolver
            .resolve_descriptor(
                &enabled(None),
                &app(Some("com.example.App")),
                &runtime(),
                &main,
                None,
                "demo",
            )
            .unwrap();
        assert_eq!(
            descriptor,
            NativeImageDescriptor {
                enabled: true,
                entry_point_class: Some("com.example.App".to_string()),
                image_name: "demo".to_string(),
                classpath: vec![
                    PathBuf::from("/libs/micronaut-runtime.jar"),
                    PathBuf::from("/libs/logback.jar"),
                    PathBuf::from("/demo/build/classes/java/main"),
                    PathBuf::from("/demo/src/main/resources"),
                ],
            }
        );
    }

    #[test]
    fn classpath_contains_every_input() {
        let resolver = NativeImageDescriptorResolver::default();
        let main = source_set("main");
        let runtime = runtime();
        let descriptor = resolver
            .resolve_descriptor(&enabled(None), &app(Some("com.example.App")), &runtime, &main, None, "demo")
            .unwrap();
        for path in runtime
            .files()
            .into_iter()
            .chain(main.compiled_class_directories.files())
            .chain(main.resource_directories.files())
        {
            assert!(descriptor.classpath.contains(&path), "{:?} missing", path);
        }
    }

    #[test]
    fn prior_image_name_wins() {
        let resolver = NativeImageDescriptorResolver::default();
        let main = source_set("main");
        let descriptor = resolver
            .resolve_descriptor(
                &enabled(None),
                &app(Some("com.example.App")),
                &runtime(),
                &main,
                Some("foo"),
                "myapp",
            )
            .unwrap();
        assert_eq!(descriptor.image_name, "foo");

        let descriptor = resolver
            .resolve_descriptor(
                &enabled(None),
                &app(Some("com.example.App")),
                &runtime(),
                &main,
                Some(""),
                "myapp",
            )
            .unwrap();
        assert_eq!(descriptor.image_name, "myapp");
    }

    #[test]
    fn missing_main_class_fails_when_enabled() {
        let resolver = NativeImageDescriptorResolver::default();
        let err = resolver
            .resolve_descriptor(&enabled(None), &app(None), &runtime(), &source_set("main"), None, "demo")
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingMainClass {
                project: "demo".to_string()
            }
        );
        assert!(err.to_string().contains("demo"));
    }

    #[test]
    fn missing_main_class_tolerated_when_disabled() {
        let resolver = NativeImageDescriptorResolver::default();
        let descriptor = resolver
            .resolve_descriptor(
                &ExtensionSettings::default(),
                &app(None),
                &runtime(),
                &source_set("main"),
                None,
                "demo",
            )
            .unwrap();
        assert!(!descriptor.enabled);
        assert_eq!(descriptor.entry_point_class, None);
        assert_eq!(descriptor.image_name, "demo");
        assert_eq!(descriptor.classpath.len(), 4);
    }

    #[test]
    fn resolving_is_idempotent() {
        let resolver = NativeImageDescriptorResolver::default();
        let main = source_set("main");
        let resolve = || {
            resolver
                .resolve_descriptor(&enabled(None), &app(Some("com.example.App")), &runtime(), &main, None, "demo")
                .unwrap()
        };
        assert_eq!(resolve(), resolve());
    }
}
