//! Dependencies that can be added to configurations

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod configurations;

pub use configurations::{Configuration, ConfigurationContainer};

/// A dependency of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// A module hosted in some repository, such as `io.micronaut:micronaut-graal`
    Module(ModuleCoordinate),
    /// A file or directory that's already available locally
    File(PathBuf),
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::Module(module) => write!(f, "{}", module),
            Dependency::File(file) => write!(f, "file({:?})", file),
        }
    }
}

/// The `group:name[:version]` coordinate of a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCoordinate {
    group: String,
    name: String,
    version: Option<String>,
}

impl ModuleCoordinate {
    pub fn new(group: &str, name: &str, version: Option<&str>) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl Display for ModuleCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

impl FromStr for ModuleCoordinate {
    type Err = InvalidDependencyNotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(':').collect::<Vec<_>>();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(InvalidDependencyNotation(s.to_string()));
        }
        match parts[..] {
            [group, name] => Ok(Self::new(group, name, None)),
            [group, name, version] => Ok(Self::new(group, name, Some(version))),
            _ => Err(InvalidDependencyNotation(s.to_string())),
        }
    }
}

/// A dependency notation couldn't be parsed
#[derive(Debug, thiserror::Error)]
#[error("Invalid dependency notation {0:?}, expected group:name[:version]")]
pub struct InvalidDependencyNotation(pub String);

/// Something that can be turned into a dependency
pub trait IntoDependency {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation>;
}

impl IntoDependency for Dependency {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        Ok(self)
    }
}

impl IntoDependency for ModuleCoordinate {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        Ok(Dependency::Module(self))
    }
}

impl IntoDependency for &str {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        self.parse().map(Dependency::Module)
    }
}

impl IntoDependency for String {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        self.as_str().into_dependency()
    }
}

impl IntoDependency for PathBuf {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        Ok(Dependency::File(self))
    }
}

impl IntoDependency for &Path {
    fn into_dependency(self) -> Result<Dependency, InvalidDependencyNotation> {
        Ok(Dependency::File(self.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_module_notation() {
        let dep = "io.micronaut:micronaut-graal".into_dependency().unwrap();
        assert_eq!(
            dep,
            Dependency::Module(ModuleCoordinate::new("io.micronaut", "micronaut-graal", None))
        );
        let versioned: ModuleCoordinate = "org.slf4j:slf4j-api:2.0.3".parse().unwrap();
        assert_eq!(versioned.version(), Some("2.0.3"));
        assert_eq!(versioned.to_string(), "org.slf4j:slf4j-api:2.0.3");
    }

    #[test]
    fn reject_bad_notation() {
        assert!("micronaut-graal".into_dependency().is_err());
        assert!("a::b".into_dependency().is_err());
        assert!("a:b:c:d".into_dependency().is_err());
    }
}
