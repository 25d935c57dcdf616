use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

use crate::identifier::Id;
use crate::lazy_evaluation::{Provider, ProviderError};

assert_impl_all!(Prop<String>: Send, Sync, Clone, Debug);
assert_impl_all!(VecProp<String>: Send, Sync, Clone, Debug);

/// A typed property. Clones of a property share the same value.
pub struct Prop<T: 'static + Send + Sync + Clone> {
    id: Id,
    inner: Arc<RwLock<PropInner<T>>>,
}

enum PropInner<T: Send + Sync + Clone> {
    Unset,
    Provided(Box<dyn Provider<T>>),
}

impl<T: Send + Sync + Clone> PropInner<T> {
    fn get(&self) -> Option<T> {
        match self {
            PropInner::Unset => None,
            PropInner::Provided(provider) => provider.as_ref().try_get(),
        }
    }
}

struct Wrapper<T: Clone + Send + Sync>(T);

impl<T: Clone + Send + Sync> Provider<T> for Wrapper<T> {
    fn try_get(&self) -> Option<T> {
        Some(self.0.clone())
    }
}

impl<T: 'static + Send + Sync + Clone> Prop<T> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            inner: Arc::new(RwLock::new(PropInner::Unset)),
        }
    }

    /// Creates a new, unset property with a name.
    ///
    /// # Panic
    /// Panics if the name is not a valid identifier
    pub fn with_name<S: AsRef<str>>(id: S) -> Self {
        Self::new(Id::new(id).expect("property names must be valid identifiers"))
    }

    pub fn with_value(value: T) -> Self {
        let output = Self::new(Id::default());
        *output.inner.write().unwrap_or_else(PoisonError::into_inner) =
            PropInner::Provided(Box::new(Wrapper(value)));
        output
    }

    /// Sets this property to follow some provider
    pub fn set_with<P: 'static + Provider<T>>(&mut self, val: P) -> Result<(), Error> {
        let mut inner = self.inner.write()?;
        *inner = PropInner::Provided(Box::new(val));
        Ok(())
    }

    pub fn set<P>(&mut self, val: P) -> Result<(), Error>
    where
        P: Into<T>,
    {
        self.set_with(Wrapper(val.into()))
    }

    /// Unsets this property
    pub fn clear(&mut self) -> Result<(), Error> {
        *self.inner.write()? = PropInner::Unset;
        Ok(())
    }

    /// Whether this property can currently produce a value
    pub fn is_present(&self) -> bool {
        self.try_get().is_some()
    }

    /// The identifier of the property
    pub fn id(&self) -> &Id {
        &self.id
    }
}

impl<T: 'static + Send + Sync + Clone> Provider<T> for Prop<T> {
    fn missing_message(&self) -> String {
        format!("{:?} has no value", self.id)
    }

    fn try_get(&self) -> Option<T> {
        self.inner.read().ok().and_then(|inner| inner.get())
    }
}

impl<T: 'static + Send + Sync + Clone> Clone for Prop<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static + Send + Sync + Clone> Default for Prop<T> {
    fn default() -> Self {
        Self::new(Id::default())
    }
}

impl<T: 'static + Send + Sync + Clone + Debug> Debug for Prop<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Some(value) => f
                .debug_struct("Prop")
                .field("id", &self.id)
                .field("value", &value)
                .finish(),
            None => write!(f, "Prop {{ id: {:?} }}", self.id),
        }
    }
}

/// A vec prop is a special property that uses a list.
///
/// Until something is pushed or set, the property is absent. Setting it to an empty list
/// makes it present.
pub struct VecProp<T: 'static + Send + Sync + Clone> {
    id: Id,
    inner: Arc<RwLock<Option<Vec<T>>>>,
}

impl<T: 'static + Send + Sync + Clone> VecProp<T> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a new, absent list property with a name.
    ///
    /// # Panic
    /// Panics if the name is not a valid identifier
    pub fn with_name<S: AsRef<str>>(id: S) -> Self {
        Self::new(Id::new(id).expect("property names must be valid identifiers"))
    }

    /// Replaces the contents of this list
    pub fn set<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<(), Error> {
        *self.inner.write()? = Some(values.into_iter().collect());
        Ok(())
    }

    /// Adds a value to the end of this list, making it present
    pub fn push<V: Into<T>>(&mut self, value: V) -> Result<(), Error> {
        self.inner
            .write()?
            .get_or_insert_with(Vec::new)
            .push(value.into());
        Ok(())
    }

    /// Adds all values to the end of this list, making it present
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<(), Error> {
        self.inner
            .write()?
            .get_or_insert_with(Vec::new)
            .extend(values);
        Ok(())
    }

    /// Whether this list has been set, even if it's empty
    pub fn is_present(&self) -> bool {
        self.try_get().is_some()
    }

    /// The identifier of the property
    pub fn id(&self) -> &Id {
        &self.id
    }
}

impl<T: 'static + Send + Sync + Clone> Provider<Vec<T>> for VecProp<T> {
    fn missing_message(&self) -> String {
        format!("{:?} has no value", self.id)
    }

    fn try_get(&self) -> Option<Vec<T>> {
        self.inner.read().ok().and_then(|inner| inner.clone())
    }
}

impl<T: 'static + Send + Sync + Clone> Clone for VecProp<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static + Send + Sync + Clone> Default for VecProp<T> {
    fn default() -> Self {
        Self::new(Id::default())
    }
}

impl<T: 'static + Send + Sync + Clone + Debug> Debug for VecProp<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "VecProp {:?} ", self.id)?;
        match self.try_get() {
            Some(values) => f.debug_list().entries(values).finish(),
            None => write!(f, "<absent>"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Property's lock was poisoned")]
    LockPoisonError,
    #[error("Property has no value set")]
    PropertyNotSet,
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Self::LockPoisonError
    }
}
