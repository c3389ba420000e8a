use std::fmt::Display;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
	Trace,
	Debug,
	#[default]
	Info,
	Warn,
	Error,
}

impl Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Trace => write!(f, "trace"),
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warn => write!(f, "warn"),
			Self::Error => write!(f, "error"),
		}
	}
}

/// A named set of log levels.
/// This is what users select in their config.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LoggingPreset {
	#[default]
	Default,
	Verbose,
	Develop,
	Trace,
}

impl LoggingPreset {
	pub fn get_config(&self) -> LoggingConfig {
		match self {
			Self::Default => LoggingConfig {
				other: LogLevel::Warn,
				locate: LogLevel::Warn,
				rewrite: LogLevel::Warn,
				codec: LogLevel::Warn,
				cli: LogLevel::Info,
			},

			Self::Verbose => LoggingConfig {
				other: LogLevel::Warn,
				locate: LogLevel::Info,
				rewrite: LogLevel::Debug,
				codec: LogLevel::Warn,
				cli: LogLevel::Debug,
			},

			Self::Develop => LoggingConfig {
				other: LogLevel::Debug,
				locate: LogLevel::Debug,
				rewrite: LogLevel::Trace,
				codec: LogLevel::Debug,
				cli: LogLevel::Trace,
			},

			Self::Trace => LoggingConfig {
				other: LogLevel::Trace,
				locate: LogLevel::Trace,
				rewrite: LogLevel::Trace,
				codec: LogLevel::Trace,
				cli: LogLevel::Trace,
			},
		}
	}
}

pub struct LoggingConfig {
	other: LogLevel,

	locate: LogLevel,
	rewrite: LogLevel,
	codec: LogLevel,

	cli: LogLevel,
}

impl LoggingConfig {
	/// The filter directives for this config, most specific first.
	pub fn directives(&self) -> String {
		[
			format!("tagsplice_id3::file::locate={}", self.locate),
			format!("tagsplice_id3::file::rewrite={}", self.rewrite),
			format!("tagsplice_id3::codec={}", self.codec),
			format!("tagsplice={}", self.cli),
			self.other.to_string(),
		]
		.join(",")
	}
}

impl From<LoggingConfig> for EnvFilter {
	fn from(value: LoggingConfig) -> Self {
		EnvFilter::builder().parse_lossy(value.directives())
	}
}
