#![deny(missing_docs)]

//! Builds GraalVM native images of assemble-graal application projects.
//!
//! Applying [`NativeImagePlugin`](plugin::NativeImagePlugin) adds the `graal` extension. Once the
//! project is finalized, the annotation processor is attached to the processed source sets and
//! the `nativeImage` task is configured from a
//! [`NativeImageDescriptor`](resolver::NativeImageDescriptor).

#[macro_use]
extern crate serde;

pub mod extensions;
pub mod plugin;
pub mod resolver;
pub mod task;

pub use extensions::NativeImageExtension;
pub use plugin::NativeImagePlugin;
pub use resolver::{NativeImageDescriptor, NativeImageDescriptorResolver};
pub use task::NativeImage;
