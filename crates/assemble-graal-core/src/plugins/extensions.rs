//! Extensions that plugins can add

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use thiserror::Error;

/// A a helper trait that extends the needed traits to add a value as an extension
pub trait Extension: 'static + Send + Sync {}

impl<E: 'static + Send + Sync> Extension for E {}

/// A type that contains extensions
pub trait ExtensionAware {
    /// Gets the extension container
    fn extensions(&self) -> &ExtensionContainer;
    /// Gets a mutable reference to the extension container
    fn extensions_mut(&mut self) -> &mut ExtensionContainer;

    /// If a single extension is registered with a given type, a reference to that value is returned
    /// as `Some(_)`
    fn extension<E: Extension>(&self) -> Option<&E> {
        self.extensions().get_by_type()
    }

    /// If a single extension is registered with a given type, a mutable reference to that value is returned
    /// as `Some(_)`
    fn extension_mut<E: Extension>(&mut self) -> Option<&mut E> {
        self.extensions_mut().get_by_type_mut()
    }
}

type AnyExtension = Box<dyn Any + Send + Sync>;

/// Contains extensions, by name
#[derive(Default)]
pub struct ExtensionContainer {
    ob_map: HashMap<String, AnyExtension>,
}

impl ExtensionContainer {
    /// Adds a new extension to this container
    ///
    /// # Error
    /// Will return an error if `name` is already registered to this container
    pub fn add<E: Extension, S: AsRef<str>>(
        &mut self,
        name: S,
        value: E,
    ) -> Result<(), ExtensionError> {
        let name = name.as_ref();
        if self.ob_map.contains_key(name) {
            return Err(ExtensionError::AlreadyRegistered(name.to_string()));
        }
        self.ob_map.insert(name.to_string(), Box::new(value));
        Ok(())
    }

    /// Gets an extension by name, as long as it's of type `E`
    pub fn get<E: Extension, S: AsRef<str>>(&self, name: S) -> Option<&E> {
        self.ob_map
            .get(name.as_ref())
            .and_then(|ext| ext.downcast_ref())
    }

    /// Whether an extension with this name exists
    pub fn contains<S: AsRef<str>>(&self, name: S) -> bool {
        self.ob_map.contains_key(name.as_ref())
    }

    /// If a single extension is registered with a given type, a reference to that value is returned
    /// as `Some(_)`
    pub fn get_by_type<E: Extension>(&self) -> Option<&E> {
        let mut found = self
            .ob_map
            .values()
            .filter_map(|value| value.downcast_ref::<E>());
        match (found.next(), found.next()) {
            (Some(ext), None) => Some(ext),
            _ => None,
        }
    }

    /// If a single extension is registered with a given type, a mutable reference to that value is returned
    /// as `Some(_)`
    pub fn get_by_type_mut<E: Extension>(&mut self) -> Option<&mut E> {
        let mut found = self
            .ob_map
            .values_mut()
            .filter_map(|value| value.downcast_mut::<E>());
        match (found.next(), found.next()) {
            (Some(ext), None) => Some(ext),
            _ => None,
        }
    }
}

impl Debug for ExtensionContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionContainer")
            .field("names", &self.ob_map.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension with name {0:?} already registered")]
    AlreadyRegistered(String),
    #[error("No extension of type {0} registered")]
    Missing(String),
}

impl ExtensionError {
    /// Creates the error for a missing extension of type `E`
    pub fn missing<E: Extension>() -> Self {
        Self::Missing(std::any::type_name::<E>().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_extensions() {
        let mut ext = ExtensionContainer::default();
        ext.add("greeting", String::from("Hello, World")).unwrap();

        assert_eq!(ext.get::<String, _>("greeting").unwrap(), "Hello, World");
        assert!(ext.get::<u32, _>("greeting").is_none());
        assert_eq!(ext.get_by_type::<String>().unwrap(), "Hello, World");
    }

    #[test]
    fn ambiguous_types_not_found_by_type() {
        let mut ext = ExtensionContainer::default();
        ext.add("first", 1_u32).unwrap();
        ext.add("second", 2_u32).unwrap();
        assert!(ext.get_by_type::<u32>().is_none());
        assert!(ext.get_by_type_mut::<u32>().is_none());
    }

    #[test]
    fn disallow_same_name_extensions() {
        let mut ext = ExtensionContainer::default();
        ext.add("test", String::from("Hello, World")).unwrap();
        assert!(matches!(
            ext.add("test", String::from("Hello, World")),
            Err(ExtensionError::AlreadyRegistered(_))
        ));
    }
}
