//! The host build model that assemble-graal plugs into.
//!
//! Only the parts of a build engine that a plugin queries or extends are modeled here:
//! projects, extensions, source sets, configurations, a task registry and the
//! configure/finalize lifecycle. Nothing in this crate schedules or caches work.

#[macro_use]
extern crate static_assertions;

#[macro_use]
extern crate serde;

pub mod defaults;
pub mod dependencies;
pub mod error;
pub mod exception;
pub mod file_collection;
pub mod identifier;
pub mod lazy_evaluation;
pub mod logging;
pub mod plugins;
pub mod project;
pub mod source_sets;
pub mod task;

pub use exception::BuildResult;
pub use project::Project;
pub use task::Task;

