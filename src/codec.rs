//! The raster codec that reads and writes standalone BMP streams (with their
//! 14-byte file header).  The ICO-specific handling lives in `bitmap`; this
//! module only knows about ordinary BMP files.

use crate::error::Result;
use crate::raster::RasterImage;
use image::codecs::bmp::BmpEncoder;
use image::{ColorType, ImageFormat};

//===========================================================================//

/// Decodes a complete BMP stream into an RGBA image.
pub(crate) fn decode_bitmap_stream(data: &[u8]) -> Result<RasterImage> {
    let decoded = image::load_from_memory_with_format(data, ImageFormat::Bmp)?;
    Ok(RasterImage::from_rgba_image(decoded.to_rgba8()))
}

/// Encodes an image as a complete BMP stream: 24 bits per pixel when the
/// image is fully opaque, 32 bits per pixel otherwise.
pub(crate) fn encode_bitmap_stream(image: &RasterImage) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut encoder = BmpEncoder::new(&mut data);
    if image.has_alpha() {
        encoder.encode(
            image.rgba_data(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )?;
    } else {
        let rgb_data: Vec<u8> = image
            .rgba_data()
            .chunks_exact(4)
            .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
            .collect();
        encoder.encode(
            &rgb_data,
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )?;
    }
    Ok(data)
}

//===========================================================================//


//===========================================================================//
