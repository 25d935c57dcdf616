//! Identifiers are used by properties, tasks, and projects.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

/// The separator between parts of an identifier
pub const ID_SEPARATOR: char = ':';

/// Represents some identifier in an assemble project.
///
/// Acts like a path. For example, in `demo:nativeImage:classpath`, the `this` part is
/// `classpath` and the parent is `demo:nativeImage`.
#[derive(Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Id {
    parts: Vec<String>,
}

impl Id {
    /// Create a new id
    ///
    /// # Error
    /// Errors if any part isn't a valid identifier.
    ///
    /// # Example
    /// ```
    /// # use assemble_graal_core::identifier::Id;
    /// let id = Id::new("demo:nativeImage").unwrap();
    /// assert_eq!(id.this(), "nativeImage");
    /// assert!(Id::new("&task").is_err());
    /// assert!(Id::new("2132").is_err());
    /// assert!(Id::new("gef::as").is_err());
    /// ```
    pub fn new<S: AsRef<str>>(val: S) -> Result<Self, InvalidId> {
        Self::from_iter(val.as_ref().split(ID_SEPARATOR))
    }

    /// Try to create an Id from an iterator of parts. Each part must be a valid **part** of an identifier.
    pub fn from_iter<S: AsRef<str>>(iter: impl IntoIterator<Item = S>) -> Result<Self, InvalidId> {
        let parts = iter
            .into_iter()
            .map(|part| {
                let part = part.as_ref();
                is_valid_identifier(part).map(|_| part.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(InvalidId::new(""));
        }
        Ok(Self { parts })
    }

    /// Joins something that can be turned into an identifier to the end of this Id.
    pub fn join<S: AsRef<str>>(&self, next: S) -> Result<Self, InvalidId> {
        let next = Id::new(next)?;
        let mut parts = self.parts.clone();
        parts.extend(next.parts);
        Ok(Self { parts })
    }

    /// Returns this part of an identifier path.
    pub fn this(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns the parent identifier of this id, if it exists.
    pub fn parent(&self) -> Option<Id> {
        match self.parts.len() {
            0 | 1 => None,
            n => Some(Self {
                parts: self.parts[..n - 1].to_vec(),
            }),
        }
    }

    /// Check if the given representation refers to this id, either completely or by a suffix.
    pub fn is_shorthand(&self, repr: &str) -> bool {
        let shorthand = repr.split(ID_SEPARATOR).collect::<Vec<_>>();
        shorthand.len() <= self.parts.len()
            && self
                .parts
                .iter()
                .rev()
                .zip(shorthand.iter().rev())
                .all(|(part, short)| part == short)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            write!(f, "{ID_SEPARATOR}{part}")?;
        }
        Ok(())
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl<S: AsRef<str> + ?Sized> PartialEq<S> for Id {
    fn eq(&self, other: &S) -> bool {
        Id::new(other.as_ref().trim_start_matches(ID_SEPARATOR))
            .map(|id| self == &id)
            .unwrap_or(false)
    }
}

/// How projects are referenced.
#[derive(Default, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct ProjectId(Id);

impl ProjectId {
    pub fn new<S: AsRef<str>>(s: S) -> Result<Self, InvalidId> {
        Id::new(s).map(Self)
    }

    /// The name of the project, the last part of its id
    pub fn name(&self) -> &str {
        self.0.this()
    }

    /// Creates the id of a task within this project
    pub fn task<S: AsRef<str>>(&self, name: S) -> Result<TaskId, InvalidId> {
        self.0.join(name).map(TaskId)
    }
}

impl Deref for ProjectId {
    type Target = Id;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl TryFrom<&str> for ProjectId {
    type Error = InvalidId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How tasks are referenced throughout projects.
///
/// All tasks **must** have an associated TaskId.
#[derive(Default, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct TaskId(Id);

impl TaskId {
    pub fn new<S: AsRef<str>>(s: S) -> Result<TaskId, InvalidId> {
        Id::new(s).map(Self)
    }
}

impl Deref for TaskId {
    type Target = Id;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Id> for TaskId {
    fn from(i: Id) -> Self {
        Self(i)
    }
}

/// The given string is not a valid identifier
#[derive(Debug, thiserror::Error)]
#[error("Invalid identifier {0:?}")]
pub struct InvalidId(pub String);

impl InvalidId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().to_string())
    }
}

/// Checks whether a single identifier part is valid
pub fn is_valid_identifier(id: &str) -> Result<(), InvalidId> {
    static VALID_ID_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-zA-Z][\w-]*$").expect("Invalid Pattern"));

    if VALID_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(InvalidId::new(id))
    }
}
