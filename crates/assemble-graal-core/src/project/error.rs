//! The project error type. Should be returned during configuration of the project.

use crate::error::PayloadError;
use crate::identifier::{InvalidId, ProjectId, TaskId};
use crate::lazy_evaluation;
use crate::lazy_evaluation::ProviderError;
use crate::plugins::extensions::ExtensionError;
use std::error::Error;
use std::fmt::Display;
use std::io;
use std::sync::PoisonError;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("No task identifier could be found for {0:?}")]
    NoIdentifiersFound(String),
    #[error("Identifier Missing: {0}")]
    IdentifierMissing(TaskId),
    #[error("Task {0} already registered")]
    TaskAlreadyRegistered(TaskId),
    #[error("Task {0} is not of type {1}")]
    TaskTypeMismatch(TaskId, String),
    #[error("No source set named {0:?}")]
    SourceSetMissing(String),
    #[error("Source set {0:?} already exists")]
    SourceSetAlreadyExists(String),
    #[error("No configuration named {0:?}")]
    ConfigurationMissing(String),
    #[error("Configuration {0:?} already exists")]
    ConfigurationAlreadyExists(String),
    #[error("Project has already been evaluated")]
    AlreadyEvaluated,
    #[error("Evaluation of {0} failed earlier, it can't be finalized again")]
    EvaluationFailed(ProjectId),
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidId),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error(transparent)]
    PropertyError(#[from] lazy_evaluation::Error),
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    #[error(transparent)]
    ExtensionError(#[from] ExtensionError),
    #[error("RwLock poisoned")]
    PoisonError,
    /// An error raised by a plugin while configuring the project
    #[error("{plugin}: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("{0}")]
    CustomError(String),
}

impl<G> From<PoisonError<G>> for ProjectError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

impl ProjectError {
    pub fn custom<E: Display + Send + Sync + 'static>(error: E) -> Self {
        Self::CustomError(error.to_string())
    }

    /// Wraps an error raised by a plugin
    pub fn plugin<E: Error + Send + Sync + 'static>(plugin: impl AsRef<str>, error: E) -> Self {
        Self::Plugin {
            plugin: plugin.as_ref().to_string(),
            source: Box::new(error),
        }
    }

    /// If this error was raised by a plugin, try to get it as a concrete type
    pub fn plugin_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            ProjectError::Plugin { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! payload_from {
    ($from:ty, $ty:ty) => {
        impl From<$from> for $crate::error::PayloadError<$ty>
        where
            $from: Into<$ty>,
        {
            fn from(e: $from) -> Self {
                let err: $ty = e.into();
                $crate::error::PayloadError::new(err)
            }
        }
    };
}

payload_from!(ProjectError, ProjectError);
payload_from!(InvalidId, ProjectError);
payload_from!(lazy_evaluation::Error, ProjectError);
payload_from!(ProviderError, ProjectError);
payload_from!(ExtensionError, ProjectError);
payload_from!(io::Error, ProjectError);

pub type Result<T> = std::result::Result<T, PayloadError<ProjectError>>;
pub type ProjectResult<T = ()> = Result<T>;
