//! Cached thumbnails on disk

use image::{GenericImageView, ImageReader, RgbImage};
use rstest::{fixture, rstest};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use zoo_conf::ThumbnailSettings;
use zoo_thumbnail::{Thumbnailer, cache_path, resize_image};

struct Media {
	dir: TempDir,
	photo: PathBuf,
}

impl Media {
	fn cache(&self) -> PathBuf {
		self.dir.path().join("cache")
	}
}

/// A 40x20 PNG in a fresh directory
#[fixture]
fn media() -> Media {
	let dir = TempDir::new().unwrap();
	let photo = dir.path().join("photo.png");
	RgbImage::from_pixel(40, 20, image::Rgb([10, 200, 30]))
		.save(&photo)
		.unwrap();
	Media { dir, photo }
}

fn dimensions(path: &Path) -> (u32, u32) {
	ImageReader::open(path).unwrap().decode().unwrap().dimensions()
}

#[rstest]
#[case::both(10, 10, (10, 10))]
#[case::width_only(20, 0, (20, 10))]
#[case::height_only(0, 5, (10, 5))]
fn test_resize_writes_cached_thumbnail(
	media: Media,
	#[case] width: u32,
	#[case] height: u32,
	#[case] expected: (u32, u32),
) {
	// Act
	let path = resize_image(&media.photo, width, height, media.cache());

	// Assert
	assert_eq!(path, cache_path(&media.photo, width, height, &media.cache()));
	assert_eq!(dimensions(&path), expected);
}

#[rstest]
fn test_zero_size_caches_a_copy(media: Media) {
	// Act
	let path = resize_image(&media.photo, 0, 0, media.cache());

	// Assert
	assert_ne!(path, media.photo);
	assert_eq!(fs::read(&path).unwrap(), fs::read(&media.photo).unwrap());
}

#[rstest]
fn test_fresh_thumbnail_is_reused_and_stale_one_rebuilt(media: Media) {
	// Arrange
	let thumbnailer = Thumbnailer::new(media.cache());
	let path = thumbnailer.resize(&media.photo, 10, 10);
	let old = SystemTime::UNIX_EPOCH + Duration::from_secs(60);
	File::options()
		.write(true)
		.open(&media.photo)
		.unwrap()
		.set_modified(old)
		.unwrap();
	let cached_at = fs::metadata(&path).unwrap().modified().unwrap();

	// Act
	let reused = thumbnailer.resize(&media.photo, 10, 10);
	let reused_at = fs::metadata(&reused).unwrap().modified().unwrap();
	File::options()
		.write(true)
		.open(&reused)
		.unwrap()
		.set_modified(old - Duration::from_secs(30))
		.unwrap();
	let rebuilt = thumbnailer.resize(&media.photo, 10, 10);

	// Assert
	assert_eq!(reused, path);
	assert_eq!(reused_at, cached_at);
	assert_eq!(rebuilt, path);
	assert!(fs::metadata(&rebuilt).unwrap().modified().unwrap() > old);
}

#[rstest]
fn test_unusable_source_returns_original_path(media: Media) {
	// Arrange
	let notes = media.dir.path().join("notes.txt");
	fs::write(&notes, "not an image").unwrap();
	let missing = media.dir.path().join("missing.png");

	// Act
	let from_notes = resize_image(&notes, 10, 10, media.cache());
	let from_missing = resize_image(&missing, 10, 10, media.cache());

	// Assert
	assert_eq!(from_notes, notes);
	assert_eq!(from_missing, missing);
	assert!(!cache_path(&notes, 10, 10, &media.cache()).exists());
}

#[rstest]
fn test_settings_configure_thumbnailer(media: Media) {
	// Arrange
	let settings = ThumbnailSettings {
		quality: 60,
		resize: false,
		cache_dir: media.cache(),
	};

	// Act
	let thumbnailer = Thumbnailer::from_settings(&settings);
	let path = thumbnailer.resize(&media.photo, 8, 8);

	// Assert
	assert_eq!(thumbnailer.cache_dir(), media.cache().as_path());
	assert_eq!(dimensions(&path), (8, 8));
}
