//! Logging utilities shared by assemble-graal binaries and tests

use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Record};
use std::fmt;
use std::io::stdout;
use std::path::Path;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Provides helpful logging args for clap clis
#[derive(Debug, Default, Clone, clap::Args)]
#[clap(next_help_heading = "LOGGING")]
pub struct LoggingArgs {
    /// Only display error level log messages
    #[clap(long)]
    #[clap(conflicts_with_all(&["warn", "info", "debug", "trace"]))]
    #[clap(display_order = 1)]
    error: bool,

    /// Display warning and above level log messages
    #[clap(long)]
    #[clap(conflicts_with_all(&["error", "info", "debug", "trace"]))]
    #[clap(display_order = 2)]
    warn: bool,

    /// Display info and above level log messages
    #[clap(long)]
    #[clap(conflicts_with_all(&["error", "warn", "debug", "trace"]))]
    #[clap(display_order = 3)]
    info: bool,

    /// Display debug and above level log messages
    #[clap(long)]
    #[clap(conflicts_with_all(&["error", "warn", "info", "trace"]))]
    #[clap(display_order = 4)]
    debug: bool,

    /// Display trace and above level log messages
    #[clap(long)]
    #[clap(conflicts_with_all(&["error", "warn", "info", "debug"]))]
    #[clap(display_order = 5)]
    trace: bool,
}

/// How much context is printed before each message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Basic,
    TimeOnly,
    Complicated,
}

impl LoggingArgs {
    /// Get the level filter from this args
    pub fn config_from_settings(&self) -> (LevelFilter, OutputType) {
        if self.error {
            (LevelFilter::Error, OutputType::Basic)
        } else if self.warn {
            (LevelFilter::Warn, OutputType::Basic)
        } else if self.info {
            (LevelFilter::Info, OutputType::TimeOnly)
        } else if self.debug {
            (LevelFilter::Debug, OutputType::Complicated)
        } else if self.trace {
            (LevelFilter::Trace, OutputType::Complicated)
        } else {
            (LevelFilter::Info, OutputType::Basic)
        }
    }

    /// Initializes the global logger from these args.
    ///
    /// # Error
    /// Errors if a global logger was already set.
    pub fn init_root_logger(&self) -> Result<(), log::SetLoggerError> {
        let (filter, output_mode) = self.config_from_settings();
        init_root_log(filter, output_mode)
    }
}

/// Initializes the global logger with a level and output type
pub fn init_root_log(level: LevelFilter, mode: OutputType) -> Result<(), log::SetLoggerError> {
    Dispatch::new()
        .format(message_format(mode))
        .level(level)
        .chain(stdout())
        .apply()
}

fn message_format(
    output_mode: OutputType,
) -> impl Fn(FormatCallback, &fmt::Arguments, &Record) + Sync + Send + 'static {
    move |out, message, record| {
        out.finish(format_args!(
            "{} {}",
            format_prefix(output_mode, record),
            message
        ))
    }
}

static DATE_TIME_FORMAT: &[FormatItem] = format_description!(
    "[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:4]"
);

fn format_prefix(output_mode: OutputType, record: &Record) -> String {
    use colored::Colorize;
    let level_string = record.level().to_string().to_lowercase();
    let level_string = match record.level() {
        Level::Error => level_string.red().to_string(),
        Level::Warn => level_string.yellow().to_string(),
        Level::Info => level_string.green().to_string(),
        Level::Debug => level_string.blue().to_string(),
        Level::Trace => level_string.bright_black().to_string(),
    };
    match output_mode {
        OutputType::Basic => format!("{}:", level_string),
        OutputType::TimeOnly => {
            let time = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            format!("[{}] {}:", format_time(time), level_string)
        }
        OutputType::Complicated => {
            let file_path = Path::new(record.file().unwrap_or("unknown"));
            format!(
                "[{} {}{} {}]",
                format_time(OffsetDateTime::now_utc()),
                file_path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown"),
                record
                    .line()
                    .map(|l| format!(":{l}"))
                    .unwrap_or_default(),
                level_string
            )
        }
    }
}

fn format_time(time: OffsetDateTime) -> String {
    time.format(DATE_TIME_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        logging: LoggingArgs,
    }

    #[test]
    fn level_from_flags() {
        let cli = Cli::parse_from(["cli", "--debug"]);
        assert_eq!(
            cli.logging.config_from_settings(),
            (LevelFilter::Debug, OutputType::Complicated)
        );
        let cli = Cli::parse_from(["cli"]);
        assert_eq!(
            cli.logging.config_from_settings(),
            (LevelFilter::Info, OutputType::Basic)
        );
        assert!(Cli::try_parse_from(["cli", "--debug", "--trace"]).is_err());
    }
}
