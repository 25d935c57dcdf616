//! Build time exceptions

use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raised while a task is executing.
#[derive(Debug)]
pub enum BuildException {
    /// Stops the current action, but lets the remaining actions run
    StopAction,
    /// Stops the task without failing the build
    StopTask,
    /// Fails the build
    Error(Box<dyn Any + Send + Sync>),
}

impl BuildException {
    pub fn new<E: 'static + Any + Send + Sync>(e: E) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(e);
        BuildException::Error(boxed)
    }

    pub fn custom(e: &str) -> Self {
        Self::new(BuildError::new(e))
    }

    /// Gets a printable message for this exception, if one is available
    pub fn message(&self) -> Option<String> {
        match self {
            BuildException::StopAction | BuildException::StopTask => None,
            BuildException::Error(e) => {
                if let Some(err) = e.downcast_ref::<BuildError>() {
                    Some(err.to_string())
                } else if let Some(s) = e.downcast_ref::<String>() {
                    Some(s.clone())
                } else {
                    e.downcast_ref::<&str>().map(|s| s.to_string())
                }
            }
        }
    }
}

impl<E: 'static + Error + Send + Sync> From<E> for BuildException {
    fn from(e: E) -> Self {
        Self::new(BuildError::new(e.to_string()))
    }
}

impl Display for BuildException {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildException::StopAction => write!(f, "action stopped"),
            BuildException::StopTask => write!(f, "task stopped"),
            BuildException::Error(_) => write!(
                f,
                "{}",
                self.message().unwrap_or_else(|| "unknown error".to_string())
            ),
        }
    }
}

pub type BuildResult<T = ()> = Result<T, BuildException>;

/// Represents any error
#[derive(Debug, thiserror::Error)]
#[error("{}", message)]
pub struct BuildError {
    message: String,
}

impl BuildError {
    /// Create a new, arbitrary build error
    pub fn new(message: impl AsRef<str>) -> Self {
        Self {
            message: message.as_ref().to_string(),
        }
    }
}
