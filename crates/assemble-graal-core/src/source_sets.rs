//! Source sets group the compiled outputs and resources of one compilation unit

use crate::file_collection::FileSet;
use crate::identifier::is_valid_identifier;
use crate::project::error::{ProjectError, ProjectResult};
use heck::ToLowerCamelCase;
use std::path::Path;

/// The name of the main source set
pub const MAIN_SOURCE_SET_NAME: &str = "main";
/// The name of the test source set
pub const TEST_SOURCE_SET_NAME: &str = "test";

/// A named group of sources, compiled outputs and resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    name: String,
    source_dirs: FileSet,
    classes_dirs: FileSet,
    resource_dirs: FileSet,
}

impl SourceSet {
    /// Creates an empty source set
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            source_dirs: FileSet::new(),
            classes_dirs: FileSet::new(),
            resource_dirs: FileSet::new(),
        }
    }

    /// Creates a source set laid out by convention:
    /// - sources in `<project>/src/<name>/java`
    /// - resources in `<project>/src/<name>/resources`
    /// - compiled classes in `<build>/classes/java/<name>`
    pub fn conventional(name: impl AsRef<str>, project_dir: &Path, build_dir: &Path) -> Self {
        let name = name.as_ref();
        let src = project_dir.join("src").join(name);
        let mut source_set = Self::new(name);
        source_set.source_dirs.insert(src.join("java"));
        source_set.resource_dirs.insert(src.join("resources"));
        source_set
            .classes_dirs
            .insert(build_dir.join("classes").join("java").join(name));
        source_set
    }

    /// The name of this source set
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directories sources are read from
    pub fn source_dirs(&self) -> &FileSet {
        &self.source_dirs
    }

    /// Get mutable access to the source directories
    pub fn source_dirs_mut(&mut self) -> &mut FileSet {
        &mut self.source_dirs
    }

    /// The directories compiled classes are written to
    pub fn classes_dirs(&self) -> &FileSet {
        &self.classes_dirs
    }

    /// Get mutable access to the compiled class directories
    pub fn classes_dirs_mut(&mut self) -> &mut FileSet {
        &mut self.classes_dirs
    }

    /// The directories resources are read from
    pub fn resource_dirs(&self) -> &FileSet {
        &self.resource_dirs
    }

    /// Get mutable access to the resource directories
    pub fn resource_dirs_mut(&mut self) -> &mut FileSet {
        &mut self.resource_dirs
    }

    /// The name of the configuration holding annotation processors for this source set
    pub fn annotation_processor_configuration_name(&self) -> String {
        Self::configuration_name_for(&self.name, "annotationProcessor")
    }

    /// The name of the configuration holding the runtime classpath of this source set
    pub fn runtime_classpath_configuration_name(&self) -> String {
        Self::configuration_name_for(&self.name, "runtimeClasspath")
    }

    /// Derives the name of a configuration belonging to a source set, without the source set
    /// having to exist. `main` owns the unprefixed configurations.
    ///
    /// ```
    /// # use assemble_graal_core::source_sets::SourceSet;
    /// assert_eq!(SourceSet::configuration_name_for("main", "annotationProcessor"), "annotationProcessor");
    /// assert_eq!(SourceSet::configuration_name_for("test", "annotationProcessor"), "testAnnotationProcessor");
    /// ```
    pub fn configuration_name_for(source_set: &str, base: &str) -> String {
        if source_set == MAIN_SOURCE_SET_NAME {
            base.to_lower_camel_case()
        } else {
            format!("{}_{}", source_set, base).to_lower_camel_case()
        }
    }
}

/// Contains the source sets of a project, in creation order
#[derive(Debug, Default, Clone)]
pub struct SourceSetContainer {
    source_sets: Vec<SourceSet>,
}

impl SourceSetContainer {
    /// Adds a source set
    ///
    /// # Error
    /// Errors if the name isn't a valid identifier or is already used
    pub fn add(&mut self, source_set: SourceSet) -> ProjectResult<&mut SourceSet> {
        is_valid_identifier(source_set.name()).map_err(ProjectError::from)?;
        if self.find_by_name(source_set.name()).is_some() {
            return Err(ProjectError::SourceSetAlreadyExists(source_set.name().to_string()).into());
        }
        self.source_sets.push(source_set);
        let last = self.source_sets.len() - 1;
        Ok(&mut self.source_sets[last])
    }

    /// Finds a source set by name, if it exists
    pub fn find_by_name(&self, name: &str) -> Option<&SourceSet> {
        self.source_sets.iter().find(|s| s.name() == name)
    }

    /// Finds a source set by name for modification, if it exists
    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut SourceSet> {
        self.source_sets.iter_mut().find(|s| s.name() == name)
    }

    /// Gets a source set by name, erroring if it doesn't exist
    pub fn get_by_name(&self, name: &str) -> ProjectResult<&SourceSet> {
        self.find_by_name(name)
            .ok_or_else(|| ProjectError::SourceSetMissing(name.to_string()).into())
    }

    /// Iterates over the source sets in creation order
    pub fn iter(&self) -> impl Iterator<Item = &SourceSet> {
        self.source_sets.iter()
    }

    /// The names of all source sets, in creation order
    pub fn names(&self) -> Vec<&str> {
        self.source_sets.iter().map(SourceSet::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn conventional_layout() {
        let set = SourceSet::conventional("main", Path::new("/demo"), Path::new("/demo/build"));
        assert!(set.classes_dirs().contains("/demo/build/classes/java/main"));
        assert!(set.resource_dirs().contains("/demo/src/main/resources"));
        assert_eq!(
            set.source_dirs().iter().collect::<Vec<_>>(),
            vec![PathBuf::from("/demo/src/main/java").as_path()]
        );
    }

    #[test]
    fn configuration_names() {
        let integration = SourceSet::new("integrationTest");
        assert_eq!(
            integration.annotation_processor_configuration_name(),
            "integrationTestAnnotationProcessor"
        );
        assert_eq!(
            SourceSet::new("main").runtime_classpath_configuration_name(),
            "runtimeClasspath"
        );
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut container = SourceSetContainer::default();
        container.add(SourceSet::new("main")).unwrap();
        assert!(container.add(SourceSet::new("main")).is_err());
        assert!(container.add(SourceSet::new("bad name")).is_err());
        assert!(container.get_by_name("test").is_err());
        assert_eq!(container.names(), vec!["main"]);
    }
}
