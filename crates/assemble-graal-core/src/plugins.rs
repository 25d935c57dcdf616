//! Provide a "unified" way of adding plugins to an assemble project

use crate::project::error::ProjectResult;
use crate::project::Project;
use std::any::type_name;

pub mod extensions;

/// A plugin to apply to the project. All plugins must implement default.
pub trait Plugin: Default {
    /// Applies the plugin to a project. This is the *configure* phase: plugins should only
    /// register intentions here, and defer work that depends on user configuration to
    /// [`Project::after_evaluate`](Project::after_evaluate).
    fn apply(&self, project: &mut Project) -> ProjectResult;

    /// The id of the plugin. A plugin of a certain ID can only added once
    fn plugin_id(&self) -> &str {
        type_name::<Self>()
    }
}
