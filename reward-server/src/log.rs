// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Env var holding an `EnvFilter` directive, e.g. `REWARD_LOG=reward_merkle=trace,info`.
pub const LOG_FILTER_ENV: &str = "REWARD_LOG";

const LOG_FILE_PREFIX: &str = "reward-server.log";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Logging configuration error: {0}")]
    Configuration(String),

    #[error("Invalid {LOG_FILTER_ENV} directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Could not create log directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutputDest {
    Stderr,
    Stdout,
    /// Directory receiving daily rolling log files
    Path(PathBuf),
}

impl LogOutputDest {
    pub fn parse_from_str(val: &str) -> Result<Self, LogError> {
        match val {
            "stderr" => Ok(LogOutputDest::Stderr),
            "stdout" => Ok(LogOutputDest::Stdout),
            "data-dir" => {
                let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
                let dir = dirs_next::data_dir()
                    .ok_or_else(|| {
                        LogError::Configuration(
                            "could not obtain data directory path".to_string(),
                        )
                    })?
                    .join("reward-server")
                    .join("logs")
                    .join(format!("log_{timestamp}"));
                Ok(LogOutputDest::Path(dir))
            }
            // May not exist yet, it is created on initialization.
            value => Ok(LogOutputDest::Path(PathBuf::from(value))),
        }
    }
}

impl std::fmt::Display for LogOutputDest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogOutputDest::Stderr => write!(f, "stderr"),
            LogOutputDest::Stdout => write!(f, "stdout"),
            LogOutputDest::Path(p) => write!(f, "{}", p.to_string_lossy()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Default,
    Json,
}

impl LogFormat {
    pub fn parse_from_str(val: &str) -> Result<Self, LogError> {
        match val {
            "default" => Ok(LogFormat::Default),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::Configuration(
                "The only valid values for this argument are \"default\" or \"json\"".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Default => "default",
            LogFormat::Json => "json",
        }
    }
}

pub struct LogBuilder {
    default_logging_targets: Vec<(String, Level)>,
    output_dest: LogOutputDest,
    format: LogFormat,
}

impl LogBuilder {
    /// Create a new builder.
    /// The default_logging_targets are used if the `REWARD_LOG` env variable is not set.
    ///
    /// Logs go to stderr in the default format unless told otherwise.
    pub fn new(default_logging_targets: Vec<(String, Level)>) -> Self {
        Self {
            default_logging_targets,
            output_dest: LogOutputDest::Stderr,
            format: LogFormat::Default,
        }
    }

    pub fn output_dest(&mut self, output_dest: LogOutputDest) {
        self.output_dest = output_dest;
    }

    pub fn format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// The filter from `REWARD_LOG`, or the default targets.
    fn env_filter(&self) -> Result<EnvFilter, LogError> {
        match std::env::var(LOG_FILTER_ENV) {
            Ok(directives) if !directives.trim().is_empty() => {
                Ok(EnvFilter::builder().parse(directives)?)
            }
            _ => {
                let directives = self
                    .default_logging_targets
                    .iter()
                    .map(|(target, level)| format!("{target}={level}"))
                    .collect::<Vec<_>>()
                    .join(",");
                Ok(EnvFilter::builder().parse(directives)?)
            }
        }
    }

    /// Inits logging, returning the non-blocking writer guard when logging to files.
    /// The guard must be held for the life of the program.
    ///
    /// Logging should be instantiated only once.
    pub fn initialize(self) -> Result<Option<WorkerGuard>, LogError> {
        let filter = self.env_filter()?;

        let (layer, guard): (Box<dyn Layer<Registry> + Send + Sync>, _) = match &self.output_dest {
            LogOutputDest::Stderr => (self.fmt_layer(std::io::stderr, true), None),
            LogOutputDest::Stdout => (self.fmt_layer(std::io::stdout, true), None),
            LogOutputDest::Path(dir) => {
                std::fs::create_dir_all(dir)?;
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                println!("Logging to directory: {dir:?}");
                (self.fmt_layer(writer, false), Some(guard))
            }
        };

        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            eprintln!("Tried to initialize and set global default subscriber more than once");
        }
        debug!(
            "Logging in {} format to {}",
            self.format.as_str(),
            self.output_dest
        );

        Ok(guard)
    }

    fn fmt_layer<S, W>(&self, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        match self.format {
            LogFormat::Json => fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(writer)
                .boxed(),
            LogFormat::Default => fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_writer(writer)
                .boxed(),
        }
    }
}
