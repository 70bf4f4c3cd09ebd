use crate::error::{IcoError, Result};
use crate::icondir::{IconDir, IconDirEntry, MAX_DIMENSION};
use crate::raster::RasterImage;
use crate::restype::{EntryFields, ResourceType};

//===========================================================================//

impl IconDir {
    /// Builds the directory for an ICO file holding `images`, in order.  The
    /// color-plane and bits-per-pixel fields are filled in when the file is
    /// written.  Returns an error if any image is larger than 256x256.
    pub fn for_icons(images: &[RasterImage]) -> Result<IconDir> {
        check_image_count(images)?;
        let entries = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let fields =
                    EntryFields::Icon { color_planes: 0, bits_per_pixel: 0 };
                entry_for_image(index, image, fields)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(IconDir::from_entries(ResourceType::Icon, entries))
    }

    /// Builds the directory for a CUR file holding `images`, in order.
    /// `hotspots` holds one (x, y) pair per image, flattened as `[x0, y0, x1,
    /// y1, ...]`.  Returns an error if the number of coordinates isn't twice
    /// the number of images, or if any image is larger than 256x256.
    pub fn for_cursors(
        images: &[RasterImage],
        hotspots: &[u16],
    ) -> Result<IconDir> {
        if hotspots.len() != 2 * images.len() {
            return Err(IcoError::ArityMismatch {
                expected: 2 * images.len(),
                actual: hotspots.len(),
            });
        }
        check_image_count(images)?;
        let entries = images
            .iter()
            .zip(hotspots.chunks_exact(2))
            .enumerate()
            .map(|(index, (image, hotspot))| {
                let fields = EntryFields::Cursor {
                    hotspot_x: hotspot[0],
                    hotspot_y: hotspot[1],
                };
                entry_for_image(index, image, fields)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(IconDir::from_entries(ResourceType::Cursor, entries))
    }
}

fn check_image_count(images: &[RasterImage]) -> Result<()> {
    if images.is_empty() {
        return Err(IcoError::EmptyContainer);
    }
    if images.len() > (u16::MAX as usize) {
        return Err(IcoError::TooManyEntries(images.len()));
    }
    Ok(())
}

fn entry_for_image(
    index: usize,
    image: &RasterImage,
    fields: EntryFields,
) -> Result<IconDirEntry> {
    let (width, height) = (image.width(), image.height());
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(IcoError::ImageTooLarge { index, width, height });
    }
    Ok(IconDirEntry::new(width, height, fields))
}

//===========================================================================//


//===========================================================================//
