//! A library for encoding/decoding ICO and CUR files whose images are stored
//! as uncompressed bitmaps.
//!
//! An ICO (or CUR) file is a small directory of entries, each pointing at a
//! bitmap that lacks the usual BMP file header.  Decoding rebuilds that header
//! and hands the bitmap to a BMP decoder; encoding does the reverse.  Entries
//! holding PNG data are detected and rejected.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! // Read an icon and pick its biggest image:
//! let file = File::open("favicon.ico").unwrap();
//! let (icondir, images) = icocur::decode(file).unwrap();
//! let biggest = &images[icondir.largest_index()];
//! println!("{}x{}", biggest.width(), biggest.height());
//!
//! // Write the images back out as a cursor with hotspots at the center:
//! let hotspots: Vec<u16> = images
//!     .iter()
//!     .flat_map(|img| [img.width() as u16 / 2, img.height() as u16 / 2])
//!     .collect();
//! let cursor = icocur::build_cursor_metadata(&images, &hotspots).unwrap();
//! let out = File::create("pointer.cur").unwrap();
//! icocur::encode(out, &cursor, &images).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bitmap;
mod bmpdepth;
mod codec;
mod config;
mod error;
mod icondir;
mod raster;
mod restype;

pub use crate::error::{IcoError, Result};
pub use crate::icondir::{IconDir, IconDirEntry};
pub use crate::raster::RasterImage;
pub use crate::restype::{EntryFields, ResourceType};
use std::io::{Read, Seek, Write};

//===========================================================================//

/// Reads an ICO or CUR file, returning its directory and the decoded image of
/// every entry, in file order.  The images are moved out of the entries, so
/// `IconDirEntry::image` returns `None` on the returned directory; use
/// `IconDir::read` to keep them attached instead.
pub fn decode<R: Read + Seek>(
    reader: R,
) -> Result<(IconDir, Vec<RasterImage>)> {
    let mut icondir = IconDir::read(reader)?;
    let images = icondir.take_images();
    Ok((icondir, images))
}

/// Reads only the header and directory of an ICO or CUR file.
pub fn decode_metadata<R: Read>(reader: R) -> Result<IconDir> {
    IconDir::read_metadata(reader)
}

/// Writes `images` as an ICO or CUR file described by `icondir`.
pub fn encode<W: Write + Seek>(
    writer: W,
    icondir: &IconDir,
    images: &[RasterImage],
) -> Result<()> {
    icondir.write(writer, images)
}

/// Builds the directory for an ICO file holding `images`.
pub fn build_icon_metadata(images: &[RasterImage]) -> Result<IconDir> {
    IconDir::for_icons(images)
}

/// Builds the directory for a CUR file holding `images`, with `hotspots`
/// given as flattened (x, y) pairs.
pub fn build_cursor_metadata(
    images: &[RasterImage],
    hotspots: &[u16],
) -> Result<IconDir> {
    IconDir::for_cursors(images, hotspots)
}

//===========================================================================//
