//! Lazy evaluation allows for sharing configuration between plugins, extensions and tasks.
//!
//! The main driving trait that allows for this is [`Provider`](Provider). Objects that
//! implement this trait can try to provide a value of that type.
//!
//! Properties
//! ---
//!
//! `Prop<T>` - A property that can be set to a specific value, or to another provider.
//!
//! `VecProp<T>` - A list property. An unset list property is *absent*, which is distinct
//! from being set to an empty list.
//!
//! ```
//! # use assemble_graal_core::lazy_evaluation::{Prop, Provider};
//! let mut image_name = Prop::<String>::with_name("imageName");
//! assert!(image_name.try_get().is_none());
//! image_name.set("demo").unwrap();
//! assert_eq!(image_name.get(), "demo");
//! ```

pub mod prop;

pub use prop::*;

/// The provider trait represents an object that can continuously produce a value.
///
/// `Option<T>` implements this trait, as do the properties in this module.
pub trait Provider<T: Clone + Send + Sync>: Send + Sync {
    /// The missing message for this provider
    fn missing_message(&self) -> String {
        String::from("Provider has no value set")
    }

    /// Get a value from the provider.
    ///
    /// # Panic
    /// This method will panic if there is no value available.
    fn get(&self) -> T {
        self.try_get().expect(&self.missing_message())
    }

    /// Try to get a value from the provider.
    ///
    /// Will return `Some(v)` if value `v` is available, otherwise `None` is returned.
    fn try_get(&self) -> Option<T>;

    /// Tries to get a value from this provider, returning an error if not available.
    fn fallible_get(&self) -> Result<T, ProviderError> {
        self.try_get()
            .ok_or_else(|| ProviderError::new(self.missing_message()))
    }
}

assert_obj_safe!(Provider<()>);

impl<T: Clone + Send + Sync> Provider<T> for Option<T> {
    fn try_get(&self) -> Option<T> {
        self.clone()
    }
}

/// A value could not be provided
#[derive(Debug, thiserror::Error)]
#[error("{}", message)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_provide() {
        let present = Some(3_i32);
        assert!(matches!(present.fallible_get(), Ok(3)));
        let missing = Option::<usize>::None;
        assert!(missing.fallible_get().is_err());
    }

    #[test]
    fn prop_follows_provider() {
        let mut source = Prop::with_value(String::from("demo"));
        let mut follower = Prop::<String>::with_name("follower");
        follower.set_with(source.clone()).unwrap();
        assert_eq!(follower.get(), "demo");
        source.set("other").unwrap();
        assert_eq!(follower.get(), "other");
    }
}
