//! Plugins and tasks provided by the host model

pub mod plugins;
pub mod tasks;
