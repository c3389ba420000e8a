use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::TagspliceConfig;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tagsplice_id3::{Field, Frame, FrameId, Id3File, OpenMode};
use tagsplice_util::load_env;
use tracing::{debug, info};

mod config;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Print every frame of a file's tag
	Show { path: PathBuf },

	/// Print every tag region we found in a file
	Regions { path: PathBuf },

	/// Set a text frame. With no values, remove it.
	Set {
		path: PathBuf,
		frame: FrameId,
		values: Vec<String>,
	},

	/// Remove a file's ID3v1 tag
	StripV1 { path: PathBuf },

	/// Rewrite a file's tags without changing them
	Update { path: PathBuf },
}

#[expect(clippy::print_stdout)]
fn show(path: &Path) -> Result<()> {
	let file = Id3File::open(path, OpenMode::ReadOnly)
		.with_context(|| format!("while opening {}", path.display()))?;

	for frame in file.tag().frames() {
		println!("{} ({}):", frame.id(), frame.description());
		for field in frame.fields() {
			println!("  {field}");
		}
	}

	return Ok(());
}

#[expect(clippy::print_stdout)]
fn regions(path: &Path) -> Result<()> {
	let file = Id3File::open(path, OpenMode::ReadOnly)
		.with_context(|| format!("while opening {}", path.display()))?;

	for region in file.regions() {
		let tag = region.tag.and_then(|id| file.physical_tag(id).map(|t| (id, t)));
		match tag {
			Some((id, tag)) => println!(
				"{:>10} {:>8}  {id} {}  {}",
				region.location,
				region.length,
				tag.version(),
				tag.frames().iter().map(|f| f.id()).join(" ")
			),
			None => println!("{:>10} {:>8}  (unparsed)", region.location, region.length),
		}
	}

	println!("trailing tag: {}", file.has_trailing());
	return Ok(());
}

fn set(path: &Path, id: FrameId, values: &[String], keep_v1: bool) -> Result<()> {
	let mut file = Id3File::open(path, OpenMode::ReadWrite)
		.with_context(|| format!("while opening {}", path.display()))?;

	let tag = file.tag_mut();
	if values.is_empty() {
		let n = tag.remove_frames(id);
		info!(message = "Removed frames", frame = %id, count = n);
	} else if id == FrameId::COMMENT {
		tag.remove_frames(id);
		tag.attach_frame(Frame::comment(*b"eng", "", &values.join(" ")));
	} else if matches!(Frame::new(id).field(1), Some(Field::StringList(_))) {
		tag.replace_frame(Frame::text(id, values));
	} else {
		bail!("{id} is not a text frame")
	}

	if !keep_v1 {
		tag.set_render_v1(false);
	}

	file.update()
		.with_context(|| format!("while writing {}", path.display()))?;
	return Ok(());
}

fn rewrite(path: &Path, strip_v1: bool) -> Result<()> {
	let mut file = Id3File::open(path, OpenMode::ReadWrite)
		.with_context(|| format!("while opening {}", path.display()))?;

	if strip_v1 {
		file.tag_mut().set_render_v1(false);
	}

	file.update()
		.with_context(|| format!("while writing {}", path.display()))?;
	return Ok(());
}

fn main() -> Result<()> {
	let config_res = match load_env::<TagspliceConfig>() {
		Ok(x) => x,

		#[expect(clippy::print_stdout)]
		Err(err) => {
			println!("Error while loading .env: {err}");
			std::process::exit(1);
		}
	};

	let config = config_res.get_config().clone();

	tracing_subscriber::fmt()
		.with_env_filter(config.tagsplice_loglevel.get_config())
		.without_time()
		.with_ansi(true)
		.init();

	// Do this now, logging wasn't available earlier
	match config_res.path() {
		Some(path) => debug!(message = "Loaded config from .env", path = %path.display()),
		None => debug!(message = "No `.env` found, loaded config from environment"),
	};

	let cli = Cli::parse();
	match cli.command {
		Commands::Show { path } => show(&path),
		Commands::Regions { path } => regions(&path),
		Commands::Set {
			path,
			frame,
			values,
		} => set(&path, frame, &values, config.tagsplice_keep_v1),
		Commands::StripV1 { path } => rewrite(&path, true),
		Commands::Update { path } => rewrite(&path, false),
	}
}
