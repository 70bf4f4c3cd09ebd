//! Conversion between the headerless DIB payloads stored in ICO/CUR entries
//! and the standalone BMP streams understood by the raster codec.

use crate::bmpdepth::{mask_row_size, BmpDepth};
use crate::codec;
use crate::error::Result;
use crate::raster::RasterImage;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

//===========================================================================//

// The signature that all PNG files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

// The size of a BITMAPFILEHEADER struct, in bytes.
const BMP_FILE_HEADER_LEN: usize = 14;

// The size of a BITMAPINFOHEADER struct, in bytes.  Larger (V4/V5) headers
// start with the same fields.
const BMP_INFO_HEADER_LEN: u32 = 40;

// Byte offsets of fields within the info header:
const WIDTH_OFFSET: usize = 4;
const HEIGHT_OFFSET: usize = 8;
const BITS_PER_PIXEL_OFFSET: usize = 14;
const COMPRESSION_OFFSET: usize = 16;
const COLORS_USED_OFFSET: usize = 32;

// Values of the info header's compression field:
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;
const BI_BITFIELDS: u32 = 3;
const BI_JPEG: u32 = 4;
const BI_PNG: u32 = 5;
const BI_ALPHABITFIELDS: u32 = 6;

//===========================================================================//

/// A headerless bitmap ready to be stored in a directory entry, along with
/// the values an icon entry records for it.
#[derive(Clone, Debug)]
pub(crate) struct Payload {
    pub(crate) data: Vec<u8>,
    pub(crate) num_colors: u8,
    pub(crate) color_planes: u16,
    pub(crate) bits_per_pixel: u16,
}

//===========================================================================//

/// The fields of a payload's info header that matter for reinterpreting it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct InfoHeader {
    header_len: u32,
    width: i32,
    height: i32,
    bits_per_pixel: u16,
    compression: u32,
    colors_used: u32,
}

impl InfoHeader {
    fn parse(payload: &[u8]) -> Result<InfoHeader> {
        if payload.starts_with(PNG_SIGNATURE) {
            unsupported_payload!("PNG-compressed frames are not supported");
        }
        if payload.len() < 4 {
            truncated!("Bitmap payload is only {} bytes long", payload.len());
        }
        let header_len = LittleEndian::read_u32(&payload[0..4]);
        if header_len < BMP_INFO_HEADER_LEN {
            unsupported_payload!(
                "Unsupported bitmap header size (was {}, must be at least {})",
                header_len,
                BMP_INFO_HEADER_LEN
            );
        }
        if (payload.len() as u64) < header_len as u64 {
            truncated!(
                "Bitmap payload is {} bytes long, but its header claims {}",
                payload.len(),
                header_len
            );
        }
        let compression = LittleEndian::read_u32(
            &payload[COMPRESSION_OFFSET..COMPRESSION_OFFSET + 4],
        );
        if compression == BI_JPEG || compression == BI_PNG {
            unsupported_payload!(
                "Bitmap payload wraps compressed data (compression {})",
                compression
            );
        }
        Ok(InfoHeader {
            header_len,
            width: LittleEndian::read_i32(
                &payload[WIDTH_OFFSET..WIDTH_OFFSET + 4],
            ),
            height: LittleEndian::read_i32(
                &payload[HEIGHT_OFFSET..HEIGHT_OFFSET + 4],
            ),
            bits_per_pixel: LittleEndian::read_u16(
                &payload[BITS_PER_PIXEL_OFFSET..BITS_PER_PIXEL_OFFSET + 2],
            ),
            compression,
            colors_used: LittleEndian::read_u32(
                &payload[COLORS_USED_OFFSET..COLORS_USED_OFFSET + 4],
            ),
        })
    }

    fn is_top_down(&self) -> bool {
        self.height < 0
    }

    fn is_run_length_encoded(&self) -> bool {
        self.compression == BI_RLE8 || self.compression == BI_RLE4
    }

    /// Returns the offset of the pixel data within the payload: past the
    /// info header, any bitfield masks that trail a 40-byte header, and the
    /// color table.
    fn pixel_data_offset(&self) -> usize {
        let masks_len = if self.header_len == BMP_INFO_HEADER_LEN {
            match self.compression {
                BI_BITFIELDS => 12,
                BI_ALPHABITFIELDS => 16,
                _ => 0,
            }
        } else {
            0
        };
        let depth = BmpDepth::from_bits_per_pixel(self.bits_per_pixel);
        let num_colors = match depth {
            Some(depth) => depth.num_colors(self.colors_used),
            None => self.colors_used as usize,
        };
        (self.header_len as usize)
            .saturating_add(masks_len)
            .saturating_add(num_colors.saturating_mul(4))
    }
}

//===========================================================================//

/// Builds the 14-byte BITMAPFILEHEADER that turns a payload of
/// `payload_len` bytes into a standalone BMP stream.
fn file_header(
    payload_len: usize,
    pixel_data_offset: usize,
) -> Result<[u8; BMP_FILE_HEADER_LEN]> {
    let mut header = [0u8; BMP_FILE_HEADER_LEN];
    {
        let mut writer = &mut header[..];
        writer.write_all(b"BM")?;
        writer.write_u32::<LittleEndian>(
            (payload_len + BMP_FILE_HEADER_LEN) as u32,
        )?;
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u32::<LittleEndian>(
            (pixel_data_offset + BMP_FILE_HEADER_LEN) as u32,
        )?;
    }
    Ok(header)
}

/// Yields the byte offset of each row of a top-to-bottom RGBA raster with
/// the given row `stride`, in the order a bitmap with the given (signed)
/// `height` stores its rows: bottom-to-top when `height` is positive and
/// top-to-bottom when it is negative.
pub(crate) fn alpha_rows(
    height: i32,
    stride: usize,
) -> impl Iterator<Item = usize> {
    let num_rows = height.unsigned_abs() as usize;
    let bottom_up = height > 0;
    (0..num_rows).map(move |index| {
        let row = if bottom_up { num_rows - 1 - index } else { index };
        row * stride
    })
}

//===========================================================================//

/// Decodes the headerless bitmap `payload` of a directory entry.
///
/// The info header's height field is replaced by `declared_height` (keeping
/// the field's sign), since icon payloads store a height that counts the AND
/// mask rows too.  `declared_bits_per_pixel` is the depth the directory
/// entry records, or zero to use the info header's own bit count.  When that
/// depth is 32, the alpha channel is copied straight from the payload's BGRA
/// pixels, because generic BMP decoders treat the fourth byte of a BI_RGB
/// pixel as padding.  Shallower frames take their transparency from the AND
/// mask, when present.
pub(crate) fn materialize(
    payload: &[u8],
    declared_height: u32,
    declared_bits_per_pixel: u16,
) -> Result<RasterImage> {
    let header = InfoHeader::parse(payload)?;
    let alpha_bits_per_pixel = if declared_bits_per_pixel == 0 {
        header.bits_per_pixel
    } else {
        declared_bits_per_pixel
    };
    let pixel_data_offset = header.pixel_data_offset();
    if pixel_data_offset > payload.len() {
        truncated!(
            "Bitmap pixel data starts at {}, past the {}-byte payload",
            pixel_data_offset,
            payload.len()
        );
    }
    let height = if header.is_top_down() {
        -(declared_height as i32)
    } else {
        declared_height as i32
    };

    let mut stream =
        Vec::<u8>::with_capacity(BMP_FILE_HEADER_LEN + payload.len());
    stream.extend_from_slice(&file_header(payload.len(), pixel_data_offset)?);
    stream.extend_from_slice(payload);
    let height_field = BMP_FILE_HEADER_LEN + HEIGHT_OFFSET;
    LittleEndian::write_i32(
        &mut stream[height_field..height_field + 4],
        height,
    );
    let mut image = codec::decode_bitmap_stream(&stream)?;
    if image.height() != declared_height {
        malformed!(
            "Decoded bitmap is {} rows tall, but its entry declares {}",
            image.height(),
            declared_height
        );
    }

    if alpha_bits_per_pixel == 32 {
        if header.bits_per_pixel != 32 {
            log::warn!(
                "Entry declares 32 bpp, but its bitmap has {} bpp; \
                 keeping decoded alpha",
                header.bits_per_pixel
            );
        } else {
            restore_alpha(&mut image, &payload[pixel_data_offset..], height)?;
        }
    } else if let Some(depth) = BmpDepth::from_bits_per_pixel(
        header.bits_per_pixel,
    ) {
        if depth != BmpDepth::ThirtyTwo && !header.is_run_length_encoded() {
            apply_and_mask(
                &mut image,
                &payload[pixel_data_offset..],
                depth,
                height,
            );
        }
    }
    log::trace!(
        "Materialized {}x{} bitmap at {} bpp",
        header.width,
        image.height(),
        header.bits_per_pixel
    );
    Ok(image)
}

fn restore_alpha(
    image: &mut RasterImage,
    pixel_data: &[u8],
    height: i32,
) -> Result<()> {
    let stride = 4 * image.width() as usize;
    let needed = stride * image.height() as usize;
    if pixel_data.len() < needed {
        truncated!(
            "32-bpp bitmap has {} bytes of pixel data, but needs {}",
            pixel_data.len(),
            needed
        );
    }
    let rgba = image.rgba_data_mut();
    for (source, start) in
        pixel_data.chunks_exact(stride).zip(alpha_rows(height, stride))
    {
        let dest = &mut rgba[start..start + stride];
        for (pixel, bgra) in
            dest.chunks_exact_mut(4).zip(source.chunks_exact(4))
        {
            pixel[3] = bgra[3];
        }
    }
    Ok(())
}

fn apply_and_mask(
    image: &mut RasterImage,
    pixel_data: &[u8],
    depth: BmpDepth,
    height: i32,
) {
    let width = image.width();
    let num_rows = image.height() as usize;
    let mask_start = depth.row_size(width) * num_rows;
    let mask_row = mask_row_size(width);
    let mask_end = mask_start + mask_row * num_rows;
    if pixel_data.len() < mask_end {
        log::debug!("Bitmap has no AND mask; treating it as opaque");
        return;
    }
    let stride = 4 * width as usize;
    let rgba = image.rgba_data_mut();
    for (mask, start) in pixel_data[mask_start..mask_end]
        .chunks_exact(mask_row)
        .zip(alpha_rows(height, stride))
    {
        for col in 0..(width as usize) {
            if (mask[col / 8] >> (7 - col % 8)) & 0x1 == 1 {
                rgba[start + 4 * col + 3] = 0;
            }
        }
    }
}

/// Encodes `image` as a headerless bitmap for storage in a directory entry.
///
/// The height field is doubled to count the AND mask, which is appended
/// after the color data with a bit set for every fully transparent pixel.
pub(crate) fn dematerialize(image: &RasterImage) -> Result<Payload> {
    let stream = codec::encode_bitmap_stream(image)?;
    if stream.len() < BMP_FILE_HEADER_LEN + BMP_INFO_HEADER_LEN as usize {
        truncated!(
            "Raster codec produced only {} bytes of bitmap",
            stream.len()
        );
    }
    let mut data = stream[BMP_FILE_HEADER_LEN..].to_vec();
    let header = InfoHeader::parse(&data)?;

    let sign = if header.is_top_down() { -1 } else { 1 };
    let mask_height = sign * image.height() as i32;
    LittleEndian::write_i32(
        &mut data[HEIGHT_OFFSET..HEIGHT_OFFSET + 4],
        2 * mask_height,
    );

    let width = image.width() as usize;
    let stride = 4 * width;
    let mask_row = mask_row_size(image.width());
    let rgba = image.rgba_data();
    data.reserve(mask_row * image.height() as usize);
    for start in alpha_rows(mask_height, stride) {
        let mut mask = vec![0u8; mask_row];
        let row = &rgba[start..start + stride];
        for (col, pixel) in row.chunks_exact(4).enumerate() {
            if pixel[3] == 0 {
                mask[col / 8] |= 0x80 >> (col % 8);
            }
        }
        data.extend_from_slice(&mask);
    }

    // A full 256-color palette is recorded as zero, like truecolor.
    let depth = BmpDepth::from_bits_per_pixel(header.bits_per_pixel);
    let num_colors = match depth {
        Some(depth) if depth.bits_per_pixel() <= 8 => {
            u8::try_from(depth.num_colors(header.colors_used)).unwrap_or(0)
        }
        _ => 0,
    };

    Ok(Payload {
        data,
        num_colors,
        color_planes: 1,
        bits_per_pixel: header.bits_per_pixel,
    })
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        alpha_rows, dematerialize, file_header, materialize, InfoHeader,
    };
    use crate::error::IcoError;
    use crate::raster::RasterImage;
    use byteorder::{LittleEndian, WriteBytesExt};

    /// Builds a 32-bpp BI_RGB payload.  `rows` are given in storage order.
    fn bgra_payload(
        width: u32,
        stored_height: i32,
        rows: &[&[u8]],
    ) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(width as i32).unwrap();
        data.write_i32::<LittleEndian>(stored_height).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(32).unwrap();
        for _ in 0..6 {
            data.write_u32::<LittleEndian>(0).unwrap();
        }
        for row in rows {
            data.extend_from_slice(row);
        }
        data
    }

    #[test]
    fn alpha_rows_bottom_up() {
        let offsets: Vec<usize> = alpha_rows(3, 8).collect();
        assert_eq!(offsets, vec![16, 8, 0]);
    }

    #[test]
    fn alpha_rows_top_down() {
        let offsets: Vec<usize> = alpha_rows(-3, 8).collect();
        assert_eq!(offsets, vec![0, 8, 16]);
    }

    #[test]
    fn alpha_rows_empty() {
        assert_eq!(alpha_rows(0, 8).count(), 0);
    }

    #[test]
    fn synthesized_file_header() {
        let header = file_header(100, 40).unwrap();
        let expected: &[u8] =
            b"BM\x72\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00";
        assert_eq!(&header[..], expected);
    }

    #[test]
    fn pixel_data_follows_color_table() {
        let mut payload = bgra_payload(1, 2, &[]);
        payload[14] = 8; // bits per pixel
        let header = InfoHeader::parse(&payload).unwrap();
        assert_eq!(header.pixel_data_offset(), 40 + 4 * 256);
        payload[14] = 32;
        payload[16] = 3; // BI_BITFIELDS
        let header = InfoHeader::parse(&payload).unwrap();
        assert_eq!(header.pixel_data_offset(), 52);
    }

    #[test]
    fn restores_alpha_bottom_up() {
        // Stored bottom row first; the height field counts the mask rows.
        let payload = bgra_payload(
            2,
            4,
            &[
                b"\x00\x00\xff\x10\x00\xff\x00\x20",
                b"\xff\x00\x00\x30\xff\xff\xff\x00",
            ],
        );
        let image = materialize(&payload, 2, 32).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        let rgba: &[u8] = b"\
            \x00\x00\xff\x30\xff\xff\xff\x00\
            \xff\x00\x00\x10\x00\xff\x00\x20";
        assert_eq!(image.rgba_data(), rgba);
        // A zero depth defers to the info header, which says 32 bpp.
        assert_eq!(materialize(&payload, 2, 0).unwrap(), image);
    }

    #[test]
    fn restores_alpha_top_down() {
        let payload = bgra_payload(
            2,
            -4,
            &[
                b"\x00\x00\xff\x10\x00\xff\x00\x20",
                b"\xff\x00\x00\x30\xff\xff\xff\x00",
            ],
        );
        let image = materialize(&payload, 2, 32).unwrap();
        let rgba: &[u8] = b"\
            \xff\x00\x00\x10\x00\xff\x00\x20\
            \x00\x00\xff\x30\xff\xff\xff\x00";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn rejects_png_payload() {
        let payload = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";
        let error = materialize(payload, 2, 32).unwrap_err();
        assert!(matches!(error, IcoError::UnsupportedPayloadFormat(_)));
    }

    #[test]
    fn rejects_core_header() {
        let mut payload = vec![0u8; 16];
        payload[0] = 12;
        let error = materialize(&payload, 2, 24).unwrap_err();
        assert!(matches!(error, IcoError::UnsupportedPayloadFormat(_)));
    }

    #[test]
    fn rejects_truncated_payload() {
        let payload = bgra_payload(2, 4, &[]);
        let error = materialize(&payload[..20], 2, 32).unwrap_err();
        assert!(matches!(error, IcoError::TruncatedStream(_)));
    }

    #[test]
    fn dematerialize_strips_file_header() {
        let image = RasterImage::from_rgba_data(3, 2, vec![0x7f; 24]);
        let payload = dematerialize(&image).unwrap();
        assert_eq!(payload.color_planes, 1);
        assert_eq!(payload.bits_per_pixel, 32);
        assert_eq!(payload.num_colors, 0);
        assert_ne!(&payload.data[0..2], b"BM");
        let header = InfoHeader::parse(&payload.data).unwrap();
        assert_eq!(header.width, 3);
        assert_eq!(header.height.abs(), 4);
    }

    #[test]
    fn dematerialize_appends_mask() {
        // Opaque except for the top-left pixel, which is fully transparent.
        let mut rgba = vec![0xff; 2 * 2 * 4];
        rgba[3] = 0;
        let image = RasterImage::from_rgba_data(2, 2, rgba);
        let payload = dematerialize(&image).unwrap();
        let mask = &payload.data[payload.data.len() - 8..];
        let header = InfoHeader::parse(&payload.data).unwrap();
        if header.is_top_down() {
            assert_eq!(mask, b"\x80\x00\x00\x00\x00\x00\x00\x00");
        } else {
            assert_eq!(mask, b"\x00\x00\x00\x00\x80\x00\x00\x00");
        }
    }

    #[test]
    fn round_trip_opaque() {
        let mut rgba = Vec::new();
        for index in 0..(5 * 3) {
            let pixel = [index as u8, 2 * index as u8, 0x33, 0xff];
            rgba.extend_from_slice(&pixel);
        }
        let image = RasterImage::from_rgba_data(5, 3, rgba);
        let payload = dematerialize(&image).unwrap();
        assert_eq!(payload.bits_per_pixel, 24);
        let decoded = materialize(&payload.data, 3, payload.bits_per_pixel);
        assert_eq!(decoded.unwrap(), image);
    }

    #[test]
    fn round_trip_translucent() {
        let mut rgba = Vec::new();
        for index in 0..(7 * 6) {
            let pixel = [0x10, index as u8, 0x20, (index * 6) as u8];
            rgba.extend_from_slice(&pixel);
        }
        let image = RasterImage::from_rgba_data(7, 6, rgba);
        let payload = dematerialize(&image).unwrap();
        assert_eq!(payload.bits_per_pixel, 32);
        let decoded = materialize(&payload.data, 6, payload.bits_per_pixel);
        assert_eq!(decoded.unwrap(), image);
    }
}

//===========================================================================//
