//! The command line front end of assemble-graal.
//!
//! Reads a project definition, builds and finalizes the project, then either prints the
//! resolved native image configuration or runs the `nativeImage` task.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

use std::path::Path;

use anyhow::{anyhow, bail, Result};

use assemble_graal::{NativeImage, NativeImagePlugin};
use assemble_graal_core::logging::LoggingArgs;
use assemble_graal_core::Project;

pub mod cli;
pub mod definition;
pub mod project_properties;

pub use cli::GraalArgs;
pub use definition::ProjectDefinition;
pub use project_properties::ProjectProperties;

/// Runs with the args of the current process
pub fn execute() -> std::result::Result<(), ()> {
    let args = GraalArgs::from_env();
    init_logging(args.logging())?;

    with_args(args).map_err(|e| {
        error!("{:#}", e);
    })
}

fn init_logging(logging: &LoggingArgs) -> std::result::Result<(), ()> {
    logging.init_root_logger().map_err(|e| {
        eprintln!("couldn't initialize logging: {}", e);
    })
}

/// Runs with the given args. Doesn't initialize logging.
pub fn with_args(args: GraalArgs) -> Result<()> {
    let definition = ProjectDefinition::from_file(args.file())?;
    let project_dir = match args.file().parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let mut project = definition.build(&project_dir, &args.properties().properties())?;
    info!("configured {}", project);

    if args.dry_run() {
        println!("{}", dry_run_report(&project)?);
        Ok(())
    } else {
        project
            .execute_task(NativeImagePlugin::TASK_NAME)
            .map_err(|e| anyhow!("{} failed: {}", NativeImagePlugin::TASK_NAME, e))
    }
}

/// The resolved descriptor, as toml, followed by the compiler command line
pub fn dry_run_report(project: &Project) -> Result<String> {
    let id = match project
        .task_container()
        .find_task_id(NativeImagePlugin::TASK_NAME)
    {
        Ok(id) => id,
        Err(_) => bail!(
            "{} has no {} task. Apply the application plugin before the graal plugin",
            project,
            NativeImagePlugin::TASK_NAME
        ),
    };
    let task = project.task_container().get_task_as::<NativeImage>(&id)?;
    let descriptor = NativeImage::descriptor(task);

    let mut report = toml::to_string(&descriptor)?;
    if descriptor.enabled {
        let command_line = task
            .command_line()?
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        report.push_str(&format!("\nnative-image {}\n", command_line));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn second_logger_reported_as_failure() {
        let logging = LoggingArgs::default();
        let _ = init_logging(&logging);
        assert_eq!(init_logging(&logging), Err(()));
    }

    #[test]
    fn report_without_task_fails() {
        let definition: ProjectDefinition = "name = \"demo\"\nplugins = [\"java\", \"graal\"]"
            .parse()
            .unwrap();
        let project = definition
            .build(Path::new("/demo"), &HashMap::new())
            .unwrap();
        assert!(dry_run_report(&project).is_err());
    }
}
