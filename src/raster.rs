use crate::error::{IcoError, Result};
use std::io::{Read, Write};

//===========================================================================//

// Size limits for any image held in memory:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// A decoded image: RGBA pixels in row-major order from top to bottom.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl RasterImage {
    /// Creates a new image with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    /// Panics if the dimensions are out of range or if `rgba_data` is the
    /// wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> RasterImage {
        if width < MIN_WIDTH {
            panic!(
                "Invalid width (was {}, but must be at least {})",
                width, MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            panic!(
                "Invalid height (was {}, but must be at least {})",
                height, MIN_HEIGHT
            );
        }
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        RasterImage { width, height, rgba_data }
    }

    pub(crate) fn from_rgba_image(image: image::RgbaImage) -> RasterImage {
        let (width, height) = image.dimensions();
        RasterImage::from_rgba_data(width, height, image.into_raw())
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    pub(crate) fn rgba_data_mut(&mut self) -> &mut [u8] {
        &mut self.rgba_data
    }

    /// Consumes the image and returns its RGBA data.
    pub fn into_rgba_data(self) -> Vec<u8> {
        self.rgba_data
    }

    /// Returns true if any pixel is less than fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.rgba_data.chunks_exact(4).any(|pixel| pixel[3] != u8::MAX)
    }

    /// Decodes an image from a PNG file.  Returns an error if the PNG data is
    /// malformed or can't be decoded.
    pub fn read_png<R: Read>(reader: R) -> Result<RasterImage> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16,
        );
        let mut png_reader = decoder.read_info()?;
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        let frame = png_reader.next_frame(&mut buffer)?;
        buffer.truncate(frame.buffer_size());
        if frame.width < MIN_WIDTH || frame.height < MIN_HEIGHT {
            return Err(IcoError::RasterCodec(
                format!("Empty PNG image ({}x{})", frame.width, frame.height)
                    .into(),
            ));
        }
        let rgba_data = match frame.color_type {
            png::ColorType::Rgba => buffer,
            png::ColorType::Rgb => buffer
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                .collect(),
            png::ColorType::GrayscaleAlpha => buffer
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect(),
            png::ColorType::Grayscale => buffer
                .iter()
                .flat_map(|&gray| [gray, gray, gray, u8::MAX])
                .collect(),
            png::ColorType::Indexed => {
                return Err(IcoError::RasterCodec(
                    "PNG palette was not expanded".into(),
                ));
            }
        };
        Ok(RasterImage::from_rgba_data(frame.width, frame.height, rgba_data))
    }

    /// Encodes the image as a PNG file, as RGB if it is fully opaque and as
    /// RGBA otherwise.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let has_alpha = self.has_alpha();
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_depth(png::BitDepth::Eight);
        if has_alpha {
            encoder.set_color(png::ColorType::Rgba);
        } else {
            encoder.set_color(png::ColorType::Rgb);
        }
        let mut writer = encoder.write_header()?;
        if has_alpha {
            writer.write_image_data(&self.rgba_data)?;
        } else {
            let rgb_data: Vec<u8> = self
                .rgba_data
                .chunks_exact(4)
                .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
                .collect();
            writer.write_image_data(&rgb_data)?;
        }
        writer.finish()?;
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
