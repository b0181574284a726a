use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::config::{Config, ExportFormat, DEFAULT_CONFIG_PATH};

mod log;

pub(crate) use log::LogLevel;

use self::log::LogStyle;

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "gqlexport", version)]
#[command(arg_required_else_help = true)]
/// Exports every named GraphQL operation, together with the fragments it needs,
/// into one persisted query file per operation.
pub(crate) struct Args {
    /// GraphQL files, or directories searched for them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Path to the TOML configuration file. Defaults to ./gqlexport.toml when it exists.
    #[arg(long, short, env = "GQLEXPORT_CONFIG")]
    pub config: Option<PathBuf>,
    /// Directory receiving the exported files, overriding the configuration
    #[arg(long, short)]
    pub out_dir: Option<PathBuf>,
    /// Shape of the exported files, overriding the configuration
    #[arg(long)]
    pub format: Option<ExportFormat>,
    /// Set the logging level
    #[arg(long = "log", env = "GQLEXPORT_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "GQLEXPORT_LOG_STYLE", default_value_t = LogStyle::Text)]
    log_style: LogStyle,
}

impl Args {
    /// The configuration file merged with the command line overrides.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match self.config.as_deref() {
            Some(path) => Config::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(Path::new(DEFAULT_CONFIG_PATH))?,
            None => Config::default(),
        };

        if let Some(out_dir) = &self.out_dir {
            config.output_dir.clone_from(out_dir);
        }

        if let Some(format) = self.format {
            config.format = format;
        }

        Ok(config)
    }

    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stderr) => layer.with_ansi(true).boxed(),
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gqlexport.toml");
        std::fs::write(&path, "output_dir = \"from-file\"\nformat = \"graphql\"").unwrap();

        let args = Args::parse_from([
            "gqlexport",
            "--config",
            path.to_str().unwrap(),
            "--format",
            "json",
            "src",
        ]);
        let config = args.config().unwrap();

        assert_eq!(config.output_dir, PathBuf::from("from-file"));
        assert_eq!(config.format, ExportFormat::Json);
        assert_eq!(args.paths, [PathBuf::from("src")]);

        let args = Args::parse_from(["gqlexport", "-c", path.to_str().unwrap(), "-o", "elsewhere", "src"]);
        assert_eq!(args.config().unwrap().output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let args = Args::parse_from(["gqlexport", "--config", "/definitely/not/here.toml", "src"]);

        assert!(args.config().is_err());
    }

    #[test]
    fn log_level_parses_from_the_command_line() {
        let args = Args::parse_from(["gqlexport", "--log", "debug", "src"]);

        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.log_level.unwrap_or_default().as_filter_str(), "gqlexport=debug,query_manager=debug,off");
    }
}
