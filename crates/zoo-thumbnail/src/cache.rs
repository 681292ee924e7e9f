//! Thumbnails cached on disk next to each other, one file per source and size.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use zoo_conf::ThumbnailSettings;

use crate::error::ThumbnailResult;
use crate::thumbnail::{DEFAULT_QUALITY, Thumbnail};

/// Where the thumbnail of `file` at `width`x`height` is cached.
///
/// The name keeps the source stem and extension and adds a digest of the
/// source path and size.
pub fn cache_path(file: &Path, width: u32, height: u32, cache_dir: &Path) -> PathBuf {
	let stem = file
		.file_stem()
		.map(|stem| stem.to_string_lossy())
		.unwrap_or_default();
	let digest = Sha256::digest(format!("{}{width}{height}", file.display()).as_bytes());
	let name = match file.extension() {
		Some(extension) => format!("{stem}_{}.{}", hex::encode(digest), extension.to_string_lossy()),
		None => format!("{stem}_{}", hex::encode(digest)),
	};
	cache_dir.join(name)
}

/// Produces cached thumbnails in one directory
#[derive(Debug, Clone)]
pub struct Thumbnailer {
	cache_dir: PathBuf,
	quality: u8,
	resize: bool,
}

impl Thumbnailer {
	pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
		Self {
			cache_dir: cache_dir.into(),
			quality: DEFAULT_QUALITY,
			resize: true,
		}
	}

	pub fn from_settings(settings: &ThumbnailSettings) -> Self {
		Self::new(settings.cache_dir.clone())
			.with_quality(settings.quality)
			.with_resize(settings.resize)
	}

	pub fn with_quality(mut self, quality: u8) -> Self {
		self.quality = quality;
		self
	}

	pub fn with_resize(mut self, resize: bool) -> Self {
		self.resize = resize;
		self
	}

	pub fn cache_dir(&self) -> &Path {
		&self.cache_dir
	}

	/// Path of the thumbnail, or `file` itself when none can be produced.
	pub fn resize(&self, file: &Path, width: u32, height: u32) -> PathBuf {
		match self.try_resize(file, width, height) {
			Ok(path) => path,
			Err(error) => {
				tracing::warn!(file = %file.display(), width, height, %error, "thumbnail not created");
				file.to_path_buf()
			}
		}
	}

	/// Creates the cached thumbnail unless an up to date one exists.
	///
	/// A zero width or height follows the source aspect ratio; both zero
	/// caches a copy of the source.
	pub fn try_resize(&self, file: &Path, width: u32, height: u32) -> ThumbnailResult<PathBuf> {
		let target = cache_path(file, width, height, &self.cache_dir);
		if !is_stale(file, &target)? {
			return Ok(target);
		}
		fs::create_dir_all(&self.cache_dir)?;

		if width == 0 && height == 0 {
			fs::copy(file, &target)?;
		} else {
			let mut thumbnail = Thumbnail::open(file)?;
			thumbnail.set_resize(self.resize);
			thumbnail.set_quality(self.quality);
			match (width, height) {
				(width, 0) => thumbnail.size_width(width),
				(0, height) => thumbnail.size_height(height),
				(width, height) => thumbnail.set_size(width, height),
			}
			if let Err(error) = thumbnail.save(&target) {
				// A partial file would pass as fresh next time
				let _ = fs::remove_file(&target);
				return Err(error);
			}
		}

		tracing::info!(file = %file.display(), thumbnail = %target.display(), "cached thumbnail");
		Ok(target)
	}
}

/// Missing, or older than its source.
fn is_stale(file: &Path, thumbnail: &Path) -> std::io::Result<bool> {
	let cached = match fs::metadata(thumbnail) {
		Ok(cached) if cached.is_file() => cached,
		_ => return Ok(true),
	};
	Ok(fs::metadata(file)?.modified()? > cached.modified()?)
}

/// Cached thumbnail of `file` in `cache_dir` with the default quality.
pub fn resize_image(file: impl AsRef<Path>, width: u32, height: u32, cache_dir: impl AsRef<Path>) -> PathBuf {
	Thumbnailer::new(cache_dir.as_ref()).resize(file.as_ref(), width, height)
}
