//! Configurations are named buckets of dependencies

use crate::dependencies::{Dependency, IntoDependency};
use crate::file_collection::FileSet;
use crate::identifier::is_valid_identifier;
use crate::project::error::{ProjectError, ProjectResult};
use log::{debug, trace};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// A named set of dependencies. A configuration can extend from other configurations, in
/// which case it also contains all of their dependencies.
#[derive(Debug, Clone)]
pub struct Configuration {
    name: String,
    parents: Vec<String>,
    dependencies: Vec<Dependency>,
}

impl Configuration {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parents: vec![],
            dependencies: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dependencies declared directly in this configuration
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// The names of the configurations this one extends from
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Add a dependency to this configuration. Returns `false` if an equal dependency was
    /// already declared.
    pub fn add_dependency(&mut self, dependency: Dependency) -> bool {
        if self.dependencies.contains(&dependency) {
            trace!("{} already contains {}", self, dependency);
            false
        } else {
            debug!("adding {} to {}", dependency, self);
            self.dependencies.push(dependency);
            true
        }
    }

    /// Adds a configuration that this configuration extends from
    pub fn extends_from(&mut self, other: &str) {
        if !self.parents.iter().any(|p| p == other) {
            self.parents.push(other.to_string());
        }
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration {:?}", self.name)
    }
}

/// Contains all configurations of a project
#[derive(Debug, Default, Clone)]
pub struct ConfigurationContainer {
    configurations: Vec<Configuration>,
}

impl ConfigurationContainer {
    /// Creates a new configuration
    pub fn create(&mut self, name: &str) -> ProjectResult<&mut Configuration> {
        self.create_with(name, |_| {})
    }

    /// Creates a new configuration, then configures it
    pub fn create_with<F>(&mut self, name: &str, configure: F) -> ProjectResult<&mut Configuration>
    where
        F: FnOnce(&mut Configuration),
    {
        is_valid_identifier(name).map_err(ProjectError::from)?;
        if self.find(name).is_some() {
            return Err(ProjectError::ConfigurationAlreadyExists(name.to_string()).into());
        }
        let mut configuration = Configuration::new(name);
        configure(&mut configuration);
        self.configurations.push(configuration);
        let last = self.configurations.len() - 1;
        Ok(&mut self.configurations[last])
    }

    /// Gets an existing configuration, or creates it
    pub fn maybe_create(&mut self, name: &str) -> ProjectResult<&mut Configuration> {
        match self.configurations.iter().position(|c| c.name() == name) {
            Some(index) => Ok(&mut self.configurations[index]),
            None => self.create(name),
        }
    }

    pub fn find(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name() == name)
    }

    pub fn get(&self, name: &str) -> ProjectResult<&Configuration> {
        self.find(name)
            .ok_or_else(|| ProjectError::ConfigurationMissing(name.to_string()).into())
    }

    pub fn get_mut(&mut self, name: &str) -> ProjectResult<&mut Configuration> {
        self.configurations
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| ProjectError::ConfigurationMissing(name.to_string()).into())
    }

    /// Adds a dependency to a configuration, like `dependencies { configuration(notation) }`.
    ///
    /// Returns whether the dependency was newly added.
    ///
    /// # Error
    /// Errors if the configuration doesn't exist or the notation is invalid
    pub fn add<D: IntoDependency>(&mut self, configuration: &str, notation: D) -> ProjectResult<bool> {
        let dependency = notation
            .into_dependency()
            .map_err(ProjectError::custom)?;
        Ok(self.get_mut(configuration)?.add_dependency(dependency))
    }

    /// Gets all dependencies of a configuration, including the ones inherited from parents.
    /// Parents are visited after the configuration itself, each only once.
    pub fn all_dependencies(&self, name: &str) -> ProjectResult<Vec<Dependency>> {
        let mut visited = HashSet::new();
        let mut output = vec![];
        self.collect_dependencies(name, &mut visited, &mut output)?;
        Ok(output)
    }

    fn collect_dependencies(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        output: &mut Vec<Dependency>,
    ) -> ProjectResult {
        if !visited.insert(name.to_string()) {
            return Ok(());
        }
        let configuration = self.get(name)?;
        for dependency in configuration.dependencies() {
            if !output.contains(dependency) {
                output.push(dependency.clone());
            }
        }
        for parent in configuration.parents() {
            self.collect_dependencies(parent, visited, output)?;
        }
        Ok(())
    }

    /// Resolves the local files of a configuration.
    ///
    /// Module dependencies need a repository to be resolved, which is the job of the host
    /// engine. They're skipped here.
    pub fn resolve_files(&self, name: &str) -> ProjectResult<FileSet> {
        let mut files = FileSet::new();
        for dependency in self.all_dependencies(name)? {
            match dependency {
                Dependency::File(path) => {
                    files.insert(path);
                }
                Dependency::Module(module) => {
                    debug!("{} is not a local file, skipping it in {:?}", module, name)
                }
            }
        }
        Ok(files)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configurations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_collection::FileCollection;
    use std::path::PathBuf;

    #[test]
    fn duplicate_dependencies_are_ignored() {
        let mut container = ConfigurationContainer::default();
        container.create("annotationProcessor").unwrap();
        assert!(container
            .add("annotationProcessor", "io.micronaut:micronaut-graal")
            .unwrap());
        assert!(!container
            .add("annotationProcessor", "io.micronaut:micronaut-graal")
            .unwrap());
        assert_eq!(
            container.get("annotationProcessor").unwrap().dependencies().len(),
            1
        );
    }

    #[test]
    fn adding_to_missing_configuration_fails() {
        let mut container = ConfigurationContainer::default();
        let err = container
            .add("integrationAnnotationProcessor", "io.micronaut:micronaut-graal")
            .unwrap_err();
        assert!(matches!(err.kind(), ProjectError::ConfigurationMissing(_)));
    }

    #[test]
    fn resolve_files_through_parents() {
        let mut container = ConfigurationContainer::default();
        container.create("implementation").unwrap();
        container.create("runtimeOnly").unwrap();
        container
            .create_with("runtimeClasspath", |c| {
                c.extends_from("implementation");
                c.extends_from("runtimeOnly");
            })
            .unwrap();
        container.add("implementation", PathBuf::from("lib/a.jar")).unwrap();
        container.add("implementation", "org.slf4j:slf4j-api").unwrap();
        container.add("runtimeOnly", PathBuf::from("lib/b.jar")).unwrap();
        container.add("runtimeOnly", PathBuf::from("lib/a.jar")).unwrap();

        let files = container.resolve_files("runtimeClasspath").unwrap();
        assert_eq!(
            files.files(),
            vec![PathBuf::from("lib/a.jar"), PathBuf::from("lib/b.jar")]
        );
    }
}
