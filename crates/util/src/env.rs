use serde::de::DeserializeOwned;
use smartstring::{LazyCompact, SmartString};
use std::{
	env::VarError,
	io::ErrorKind,
	path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvLoadError {
	#[error("i/o error while reading .env")]
	IOError(#[source] std::io::Error),

	#[error("invalid environment variable")]
	VarError(#[source] VarError),

	#[error("line parse error: `{on_line}` at char {at_char}")]
	LineParse { on_line: String, at_char: usize },

	#[error("other dotenvy error")]
	Other(#[source] dotenvy::Error),

	#[error("missing config value `{0}`")]
	MissingValue(SmartString<LazyCompact>),

	#[error("could not parse config: {0}")]
	OtherParseError(String),
}

impl From<dotenvy::Error> for EnvLoadError {
	fn from(err: dotenvy::Error) -> Self {
		match err {
			dotenvy::Error::Io(err) => Self::IOError(err),
			dotenvy::Error::EnvVar(err) => Self::VarError(err),
			dotenvy::Error::LineParse(on_line, at_char) => Self::LineParse { on_line, at_char },
			err => Self::Other(err),
		}
	}
}

impl From<envy::Error> for EnvLoadError {
	fn from(err: envy::Error) -> Self {
		match err {
			envy::Error::MissingValue(value) => Self::MissingValue(value.into()),
			envy::Error::Custom(message) => Self::OtherParseError(message),
		}
	}
}

pub enum LoadedEnv<T> {
	/// We loaded config from `.env` and env vars
	FoundFile { config: T, path: PathBuf },

	/// We could not find `.env` and only loaded env vars
	OnlyVars(T),
}

impl<T> LoadedEnv<T> {
	pub fn get_config(&self) -> &T {
		match self {
			Self::FoundFile { config, .. } => config,
			Self::OnlyVars(config) => config,
		}
	}

	/// The `.env` we read, if we found one
	pub fn path(&self) -> Option<&Path> {
		match self {
			Self::FoundFile { path, .. } => Some(path),
			Self::OnlyVars(_) => None,
		}
	}
}

/// Load the configuration type `T` from the current environment,
/// including the `.env` if it exists.
pub fn load_env<T: DeserializeOwned>() -> Result<LoadedEnv<T>, EnvLoadError> {
	let env_path = match dotenvy::dotenv() {
		Ok(path) => Some(path),
		Err(dotenvy::Error::Io(err)) if err.kind() == ErrorKind::NotFound => None,
		Err(err) => return Err(err.into()),
	};

	let config = envy::from_env::<T>()?;

	return Ok(match env_path {
		Some(path) => LoadedEnv::FoundFile { config, path },
		None => LoadedEnv::OnlyVars(config),
	});
}
