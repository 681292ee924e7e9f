//! # zoo-thumbnail
//!
//! Thumbnails for item images.
//!
//! [`Thumbnail`] scales a GIF, JPEG or PNG image to cover a box and cuts the
//! overflow evenly from both sides, keeping the source format.
//! [`Thumbnailer`] caches the result on disk and regenerates it when the
//! source changes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoo_thumbnail::Thumbnailer;
//!
//! let thumbnailer = Thumbnailer::from_settings(&settings.thumbnail);
//! let path = thumbnailer.resize("media/bike.jpg".as_ref(), 120, 80);
//! ```

pub mod cache;
pub mod error;
pub mod thumbnail;

pub use cache::{Thumbnailer, cache_path, resize_image};
pub use error::{ThumbnailError, ThumbnailResult};
pub use thumbnail::{DEFAULT_QUALITY, Thumbnail};
