//! Default tasks

use crate::exception::BuildResult;
use crate::project::Project;
use crate::task::{Executable, Task};

/// A task that does nothing by itself. Useful for aggregating other tasks.
#[derive(Debug, Default)]
pub struct Empty;

impl Task for Empty {
    fn task_action(_task: &mut Executable<Self>, _project: &Project) -> BuildResult {
        Ok(())
    }
}
