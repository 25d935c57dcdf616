use std::path::{Path, PathBuf};

use clap::Parser;

use assemble_graal_core::logging::LoggingArgs;

use crate::ProjectProperties;

/// The definition file looked for when none is given
pub const DEFAULT_DEFINITION_FILE: &str = "assemble-graal.toml";

/// Builds a GraalVM native image of a project described by a definition file.
#[derive(Debug, Parser, Clone)]
#[clap(name = "assemble-graal")]
#[clap(version, author)]
#[clap(before_help = format!("{} v{}", clap::crate_name!(), clap::crate_version!()))]
#[clap(term_width = 64)]
pub struct GraalArgs {
    /// Project properties. Set using -P or --project-property
    #[clap(flatten)]
    properties: ProjectProperties,
    /// Log level to run in.
    #[clap(flatten)]
    logging: LoggingArgs,

    /// The project definition file
    #[clap(short = 'f', long = "file")]
    #[clap(default_value = DEFAULT_DEFINITION_FILE)]
    #[clap(help_heading = None)]
    file: PathBuf,

    /// Print the resolved native image configuration instead of building it
    #[clap(long)]
    #[clap(help_heading = None)]
    dry_run: bool,
}

impl GraalArgs {
    /// Simulate creating the args from the command line
    pub fn try_command_line<S: AsRef<str>>(cmd: S) -> Result<Self, clap::Error> {
        Self::try_parse_from(
            std::iter::once("assemble-graal").chain(cmd.as_ref().split_whitespace()),
        )
    }

    /// Create the args from the surrounding environment, exiting on invalid args.
    pub fn from_env() -> Self {
        Self::parse_from(std::env::args_os())
    }

    pub fn properties(&self) -> &ProjectProperties {
        &self.properties
    }

    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }

    /// The project definition file
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = GraalArgs::try_command_line("").unwrap();
        assert_eq!(args.file(), Path::new(DEFAULT_DEFINITION_FILE));
        assert!(!args.dry_run());
        assert!(args.properties().properties().is_empty());
    }

    #[test]
    fn all_options() {
        let args = GraalArgs::try_command_line(
            "-f demo/graal.toml --dry-run -P graal.enabled=false -P graal.image-name=app --debug",
        )
        .unwrap();
        assert_eq!(args.file(), Path::new("demo/graal.toml"));
        assert!(args.dry_run());
        assert_eq!(args.properties().property("graal.enabled"), Some("false"));
        assert_eq!(args.properties().property("graal.image-name"), Some("app"));
        assert_eq!(
            args.logging().config_from_settings().0,
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn unknown_flag_rejected() {
        assert!(GraalArgs::try_command_line("--workers 4").is_err());
    }
}
