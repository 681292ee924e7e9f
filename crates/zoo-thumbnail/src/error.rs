use std::path::PathBuf;

/// Thumbnail generation errors
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
	/// Only GIF, JPEG and PNG sources are thumbnailed
	#[error("Unsupported image format: {0}")]
	UnsupportedFormat(PathBuf),

	#[error("Invalid thumbnail size {width}x{height}")]
	InvalidSize { width: u32, height: u32 },

	#[error(transparent)]
	Image(#[from] image::ImageError),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;
