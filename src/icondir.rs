use crate::bitmap;
use crate::error::{IcoError, Result};
use crate::raster::RasterImage;
use crate::restype::{EntryFields, ResourceType};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom, Write};

//===========================================================================//

// The size of the ICONDIR header, in bytes.
const HEADER_LEN: u32 = 6;

// The size of one ICONDIRENTRY record, in bytes.
const ENTRY_LEN: u32 = 16;

// The largest width or height an entry can describe.
pub(crate) const MAX_DIMENSION: u32 = 256;

/// Returns the smallest payload offset that lies past the header and all
/// `num_entries` directory records.
fn min_payload_offset(num_entries: usize) -> u32 {
    HEADER_LEN + ENTRY_LEN * (num_entries as u32)
}

//===========================================================================//

/// A collection of images; the contents of a single ICO or CUR file.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IconDir {
    restype: ResourceType,
    entries: Vec<IconDirEntry>,
    largest: usize,
}

impl IconDir {
    pub(crate) fn from_entries(
        restype: ResourceType,
        entries: Vec<IconDirEntry>,
    ) -> IconDir {
        let largest = largest_index(&entries);
        IconDir { restype, entries, largest }
    }

    /// Returns the type of resource stored in this collection, either icons or
    /// cursors.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the entries in this collection, in file order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Returns the index of the entry with the most pixels.  When several
    /// entries tie, the first one in file order wins.
    pub fn largest_index(&self) -> usize {
        self.largest
    }

    /// Returns the entry with the most pixels; see `largest_index`.
    pub fn largest_entry(&self) -> Option<&IconDirEntry> {
        self.entries.get(self.largest)
    }

    /// Consumes the collection and returns the decoded images, in file order.
    /// Entries read with `read_metadata` have no image and are skipped.
    pub fn into_images(self) -> Vec<RasterImage> {
        self.entries.into_iter().filter_map(|entry| entry.image).collect()
    }

    /// Detaches the decoded images from the entries, in file order.
    pub(crate) fn take_images(&mut self) -> Vec<RasterImage> {
        self.entries
            .iter_mut()
            .filter_map(|entry| entry.image.take())
            .collect()
    }

    /// Reads an ICO or CUR file into memory, decoding every image.  Payload
    /// offsets are relative to the reader's position when this is called.
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<IconDir> {
        let base = reader.stream_position()?;
        let (restype, mut entries) = read_directory(&mut reader)?;
        for (index, entry) in entries.iter_mut().enumerate() {
            reader.seek(SeekFrom::Start(base + entry.payload_offset as u64))?;
            let mut data = Vec::new();
            (&mut reader)
                .take(entry.payload_size as u64)
                .read_to_end(&mut data)?;
            if data.len() < entry.payload_size as usize {
                truncated!(
                    "Entry {} payload is {} bytes, but only {} remain",
                    index,
                    entry.payload_size,
                    data.len()
                );
            }
            let image = entry.materialize(&data).map_err(|error| {
                log::debug!("Failed to decode entry {}: {}", index, error);
                error
            })?;
            if image.width() != entry.width {
                log::warn!(
                    "Entry {} declares width {}, but its bitmap is {} wide",
                    index,
                    entry.width,
                    image.width()
                );
            }
            entry.image = Some(image);
        }
        Ok(IconDir::from_entries(restype, entries))
    }

    /// Reads just the header and directory of an ICO or CUR file, without
    /// touching any image data.
    pub fn read_metadata<R: Read>(mut reader: R) -> Result<IconDir> {
        let (restype, entries) = read_directory(&mut reader)?;
        Ok(IconDir::from_entries(restype, entries))
    }

    /// Writes an ICO or CUR file, encoding `images[i]` as the payload of
    /// entry `i`.  For icons, each record's color-plane and bits-per-pixel
    /// fields are taken from the encoded bitmap; cursor records keep their
    /// hotspots.  Payload offsets are relative to the writer's position when
    /// this is called.
    pub fn write<W: Write + Seek>(
        &self,
        mut writer: W,
        images: &[RasterImage],
    ) -> Result<()> {
        if images.len() != self.entries.len() {
            return Err(IcoError::ArityMismatch {
                expected: self.entries.len(),
                actual: images.len(),
            });
        }
        if self.entries.is_empty() {
            return Err(IcoError::EmptyContainer);
        }
        if self.entries.len() > (u16::MAX as usize) {
            return Err(IcoError::TooManyEntries(self.entries.len()));
        }
        for (index, (entry, image)) in
            self.entries.iter().zip(images.iter()).enumerate()
        {
            if image.width() > MAX_DIMENSION || image.height() > MAX_DIMENSION
            {
                return Err(IcoError::ImageTooLarge {
                    index,
                    width: image.width(),
                    height: image.height(),
                });
            }
            if (image.width(), image.height()) != (entry.width, entry.height) {
                return Err(IcoError::DimensionMismatch {
                    index,
                    expected: (entry.width, entry.height),
                    actual: (image.width(), image.height()),
                });
            }
        }
        let payloads = images
            .iter()
            .map(bitmap::dematerialize)
            .collect::<Result<Vec<_>>>()?;

        let base = writer.stream_position()?;
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.restype.number())?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut payload_offset = min_payload_offset(self.entries.len());
        let mut offsets = Vec::<u32>::with_capacity(payloads.len());
        for (entry, payload) in self.entries.iter().zip(payloads.iter()) {
            let fields = match self.restype {
                ResourceType::Icon => EntryFields::Icon {
                    color_planes: payload.color_planes,
                    bits_per_pixel: payload.bits_per_pixel,
                },
                ResourceType::Cursor => entry.fields,
            };
            let payload_size = payload.data.len() as u32;
            write_entry_record(
                &mut writer,
                entry,
                payload.num_colors,
                fields,
                payload_size,
                payload_offset,
            )?;
            offsets.push(payload_offset);
            payload_offset =
                match payload_offset.checked_add(payload_size) {
                    Some(offset) => offset,
                    None => malformed!("ICO file would exceed 4 GiB"),
                };
        }
        for (payload, &offset) in payloads.iter().zip(offsets.iter()) {
            writer.seek(SeekFrom::Start(base + offset as u64))?;
            writer.write_all(&payload.data)?;
        }
        log::debug!(
            "Wrote {:?} directory with {} entries ({} bytes)",
            self.restype,
            self.entries.len(),
            payload_offset
        );
        Ok(())
    }
}

/// Returns the index of the first entry with the largest `width * height`.
fn largest_index(entries: &[IconDirEntry]) -> usize {
    let mut largest = 0;
    let mut largest_area = 0;
    for (index, entry) in entries.iter().enumerate() {
        let area = entry.width * entry.height;
        if area > largest_area {
            largest = index;
            largest_area = area;
        }
    }
    largest
}

/// Reads the ICONDIR header, returning the resource type and entry count.
fn parse_header<R: Read>(reader: &mut R) -> Result<(ResourceType, u16)> {
    let reserved = reader.read_u16::<LittleEndian>()?;
    if reserved != 0 {
        malformed!(
            "Invalid reserved field value in ICONDIR \
             (was {}, but must be 0)",
            reserved
        );
    }
    let restype = reader.read_u16::<LittleEndian>()?;
    let restype = match ResourceType::from_number(restype) {
        Some(restype) => restype,
        None => return Err(IcoError::UnsupportedType(restype)),
    };
    let num_entries = reader.read_u16::<LittleEndian>()?;
    if num_entries == 0 {
        return Err(IcoError::EmptyContainer);
    }
    Ok((restype, num_entries))
}

/// Reads the ICONDIRENTRY record for entry `index` of `num_entries`.
fn parse_entry_record<R: Read>(
    reader: &mut R,
    restype: ResourceType,
    index: usize,
    num_entries: usize,
) -> Result<IconDirEntry> {
    let width_byte = reader.read_u8()?;
    let height_byte = reader.read_u8()?;
    let num_colors = reader.read_u8()?;
    let reserved = reader.read_u8()?;
    if reserved != 0 {
        malformed!(
            "Invalid reserved field value in ICONDIRENTRY {} \
             (was {}, but must be 0)",
            index,
            reserved
        );
    }
    let first = reader.read_u16::<LittleEndian>()?;
    let second = reader.read_u16::<LittleEndian>()?;
    let payload_size = reader.read_u32::<LittleEndian>()?;
    if payload_size == 0 {
        return Err(IcoError::InvalidPayloadSize { index });
    }
    let payload_offset = reader.read_u32::<LittleEndian>()?;
    let minimum = min_payload_offset(num_entries);
    if payload_offset < minimum {
        return Err(IcoError::InvalidOffset {
            index,
            offset: payload_offset,
            minimum,
        });
    }
    // The record has only one byte each for width and height, so a byte of
    // zero stands for 256.
    let width = if width_byte == 0 { 256 } else { width_byte as u32 };
    let height = if height_byte == 0 { 256 } else { height_byte as u32 };
    Ok(IconDirEntry {
        width,
        height,
        num_colors,
        fields: restype.fields(first, second),
        payload_size,
        payload_offset,
        image: None,
    })
}

fn read_directory<R: Read>(
    reader: &mut R,
) -> Result<(ResourceType, Vec<IconDirEntry>)> {
    let (restype, num_entries) = parse_header(reader)?;
    let num_entries = num_entries as usize;
    log::debug!(
        "Reading {:?} directory with {} entries",
        restype,
        num_entries
    );
    let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
    for index in 0..num_entries {
        let entry = parse_entry_record(reader, restype, index, num_entries)?;
        log::trace!(
            "Entry {}: {}x{}, {} bytes at offset {}",
            index,
            entry.width,
            entry.height,
            entry.payload_size,
            entry.payload_offset
        );
        entries.push(entry);
    }
    Ok((restype, entries))
}

fn write_entry_record<W: Write>(
    writer: &mut W,
    entry: &IconDirEntry,
    num_colors: u8,
    fields: EntryFields,
    payload_size: u32,
    payload_offset: u32,
) -> Result<()> {
    // A width/height byte of zero indicates a size of 256.
    let width = if entry.width >= 256 { 0 } else { entry.width as u8 };
    writer.write_u8(width)?;
    let height = if entry.height >= 256 { 0 } else { entry.height as u8 };
    writer.write_u8(height)?;
    writer.write_u8(num_colors)?;
    writer.write_u8(0)?; // reserved
    let (first, second) = fields.to_pair();
    writer.write_u16::<LittleEndian>(first)?;
    writer.write_u16::<LittleEndian>(second)?;
    writer.write_u32::<LittleEndian>(payload_size)?;
    writer.write_u32::<LittleEndian>(payload_offset)?;
    Ok(())
}

//===========================================================================//

/// One entry in an ICO or CUR file; a single icon or cursor.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    fields: EntryFields,
    payload_size: u32,
    payload_offset: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    image: Option<RasterImage>,
}

impl IconDirEntry {
    pub(crate) fn new(
        width: u32,
        height: u32,
        fields: EntryFields,
    ) -> IconDirEntry {
        IconDirEntry {
            width,
            height,
            num_colors: 0,
            fields,
            payload_size: 0,
            payload_offset: 0,
            image: None,
        }
    }

    /// Returns the type of resource stored in this entry, either an icon or a
    /// cursor.
    pub fn resource_type(&self) -> ResourceType {
        self.fields.resource_type()
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of colors in the image's palette, or zero for
    /// truecolor images.
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the record's two type-specific fields as stored on disk.
    pub fn fields(&self) -> EntryFields {
        self.fields
    }

    /// Returns the two auxiliary fields as seen by consumers: the hotspot for
    /// cursors, and `(0, 0)` for icons, whose plane and depth values are
    /// already implied by the decoded pixels.
    pub fn auxiliary(&self) -> (u16, u16) {
        match self.fields {
            EntryFields::Icon { .. } => (0, 0),
            EntryFields::Cursor { hotspot_x, hotspot_y } => {
                (hotspot_x, hotspot_y)
            }
        }
    }

    /// Returns the coordinates of the cursor hotspot (pixels right from the
    /// left edge of the image, and pixels down from the top edge), or `None`
    /// if this entry is an icon.
    pub fn cursor_hotspot(&self) -> Option<(u16, u16)> {
        match self.fields {
            EntryFields::Icon { .. } => None,
            EntryFields::Cursor { hotspot_x, hotspot_y } => {
                Some((hotspot_x, hotspot_y))
            }
        }
    }

    /// Returns the size of the encoded payload, in bytes (zero for entries
    /// that have not been read from or written to a file).
    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Returns the offset of the encoded payload from the start of the file.
    pub fn payload_offset(&self) -> u32 {
        self.payload_offset
    }

    /// Returns the decoded image, if this entry was read with
    /// `IconDir::read`.
    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_ref()
    }

    fn materialize(&self, payload: &[u8]) -> Result<RasterImage> {
        // Cursor records reuse the depth field for the hotspot, so they
        // leave the depth to the bitmap's own header.
        let bits_per_pixel = match self.fields {
            EntryFields::Icon { bits_per_pixel, .. } => bits_per_pixel,
            EntryFields::Cursor { .. } => 0,
        };
        bitmap::materialize(payload, self.height, bits_per_pixel)
    }
}

//===========================================================================//


//===========================================================================//
