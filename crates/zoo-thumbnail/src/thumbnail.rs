//! Cropped thumbnails of GIF, JPEG and PNG images.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ThumbnailError, ThumbnailResult};

pub const DEFAULT_QUALITY: u8 = 90;

/// A source image and the box its thumbnail is cut to
///
/// The box starts at the source size. With resize enabled (the default) the
/// source is scaled to cover the box and the overflow is cut evenly from both
/// sides; without it the top-left part of the source is copied as is.
///
/// ```rust,ignore
/// let mut thumbnail = Thumbnail::open("media/bike.jpg")?;
/// thumbnail.set_size(120, 80);
/// thumbnail.save("cache/bike_120x80.jpg")?;
/// ```
#[derive(Debug, Clone)]
pub struct Thumbnail {
	path: PathBuf,
	format: ImageFormat,
	source: DynamicImage,
	width: u32,
	height: u32,
	resize: bool,
	quality: u8,
}

impl Thumbnail {
	/// Reads the image, detecting its format from the content.
	pub fn open(path: impl AsRef<Path>) -> ThumbnailResult<Self> {
		let path = path.as_ref();
		let reader = ImageReader::open(path)?.with_guessed_format()?;
		let format = match reader.format() {
			Some(format @ (ImageFormat::Gif | ImageFormat::Jpeg | ImageFormat::Png)) => format,
			_ => return Err(ThumbnailError::UnsupportedFormat(path.to_path_buf())),
		};
		let source = reader.decode()?;
		let (width, height) = source.dimensions();
		Ok(Self {
			path: path.to_path_buf(),
			format,
			source,
			width,
			height,
			resize: true,
			quality: DEFAULT_QUALITY,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn format(&self) -> ImageFormat {
		self.format
	}

	pub fn source_size(&self) -> (u32, u32) {
		self.source.dimensions()
	}

	/// Size of the thumbnail box.
	pub fn size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	pub fn set_resize(&mut self, resize: bool) {
		self.resize = resize;
	}

	pub fn set_size(&mut self, width: u32, height: u32) {
		self.width = width;
		self.height = height;
	}

	/// Sets the width; the height follows the source aspect ratio.
	pub fn size_width(&mut self, width: u32) {
		let (source_width, source_height) = self.source_size();
		self.width = width;
		self.height = scale(width, source_width, source_height);
	}

	/// Sets the height; the width follows the source aspect ratio.
	pub fn size_height(&mut self, height: u32) {
		let (source_width, source_height) = self.source_size();
		self.width = scale(height, source_height, source_width);
		self.height = height;
	}

	/// JPEG quality, 1 to 100. Other formats are lossless.
	pub fn set_quality(&mut self, quality: u8) {
		self.quality = quality.clamp(1, 100);
	}

	pub fn quality(&self) -> u8 {
		self.quality
	}

	/// Cuts the thumbnail out of the source.
	pub fn render(&self) -> ThumbnailResult<DynamicImage> {
		let (width, height) = (self.width, self.height);
		if width == 0 || height == 0 {
			return Err(ThumbnailError::InvalidSize { width, height });
		}

		let (mut x, mut y) = (0, 0);
		let scaled;
		let source = if self.resize {
			let (source_width, source_height) = self.source_size();
			let resized_width = scale(height, source_height, source_width);
			let resized_height = scale(width, source_width, source_height);
			let (cover_width, cover_height) = if width <= resized_width {
				x = (resized_width - width) / 2;
				(resized_width, height)
			} else {
				y = resized_height.saturating_sub(height) / 2;
				(width, resized_height)
			};
			scaled = self
				.source
				.resize_exact(cover_width.max(1), cover_height.max(1), FilterType::Triangle);
			&scaled
		} else {
			&self.source
		};

		// Uncovered pixels stay transparent
		let mut thumbnail = DynamicImage::new_rgba8(width, height);
		let region = source.crop_imm(x, y, width, height);
		imageops::replace(&mut thumbnail, &region, 0, 0);
		Ok(thumbnail)
	}

	/// Writes the thumbnail to `dest` in the source format.
	pub fn save(&self, dest: impl AsRef<Path>) -> ThumbnailResult<()> {
		let dest = dest.as_ref();
		let thumbnail = self.render()?;

		let mut writer = BufWriter::new(File::create(dest)?);
		match self.format {
			ImageFormat::Jpeg => {
				let encoder = JpegEncoder::new_with_quality(&mut writer, self.quality);
				DynamicImage::ImageRgb8(thumbnail.to_rgb8()).write_with_encoder(encoder)?;
			}
			format => thumbnail.write_to(&mut writer, format)?,
		}
		writer.flush()?;

		tracing::debug!(
			source = %self.path.display(),
			dest = %dest.display(),
			width = self.width,
			height = self.height,
			"saved thumbnail"
		);
		Ok(())
	}
}

/// `target * other / from`, truncated.
fn scale(target: u32, from: u32, other: u32) -> u32 {
	if from == 0 {
		return 0;
	}
	let scaled = u64::from(target) * u64::from(other) / u64::from(from);
	u32::try_from(scaled).unwrap_or(u32::MAX)
}
