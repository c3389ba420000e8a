use serde::Deserialize;
use tagsplice_util::logging::LoggingPreset;

/// Note that the field of this struct are not capitalized.
/// Envy is case-insensitive, and expects Rust fields to be snake_case.
#[derive(Debug, Deserialize, Clone)]
pub struct TagspliceConfig {
	/// The logging level to run with
	#[serde(default)]
	pub tagsplice_loglevel: LoggingPreset,

	/// If false, `set` removes the ID3v1 tag of the files it edits
	#[serde(default = "TagspliceConfig::default_keep_v1")]
	pub tagsplice_keep_v1: bool,
}

impl TagspliceConfig {
	fn default_keep_v1() -> bool {
		true
	}
}
