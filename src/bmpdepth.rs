//===========================================================================//

/// A color depth that an embedded DIB payload may use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::Sixteen => 16,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the number of entries in the color table that precedes the
    /// pixel data.  `colors_used` is the info header's `biClrUsed` field,
    /// where zero means "the maximum for this depth".
    pub(crate) fn num_colors(&self, colors_used: u32) -> usize {
        match *self {
            BmpDepth::One | BmpDepth::Four | BmpDepth::Eight => {
                let max = 1usize << self.bits_per_pixel();
                if colors_used == 0 {
                    max
                } else {
                    (colors_used as usize).min(max)
                }
            }
            // Truecolor bitmaps may carry an optional table, which decoders
            // skip over.
            _ => colors_used as usize,
        }
    }

    /// Returns the size in bytes of one row of color data, padded to a
    /// multiple of four bytes.
    pub(crate) fn row_size(&self, width: u32) -> usize {
        let bits = (width as usize) * (self.bits_per_pixel() as usize);
        ((bits + 31) / 32) * 4
    }
}

/// Returns the size in bytes of one row of the 1-bpp AND mask.
pub(crate) fn mask_row_size(width: u32) -> usize {
    ((width as usize + 31) / 32) * 4
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{mask_row_size, BmpDepth};

    #[test]
    fn bmp_depth_round_trip() {
        let depths = &[
            BmpDepth::One,
            BmpDepth::Four,
            BmpDepth::Eight,
            BmpDepth::Sixteen,
            BmpDepth::TwentyFour,
            BmpDepth::ThirtyTwo,
        ];
        for &depth in depths.iter() {
            assert_eq!(
                BmpDepth::from_bits_per_pixel(depth.bits_per_pixel()),
                Some(depth)
            );
        }
    }

    #[test]
    fn color_table_sizes() {
        assert_eq!(BmpDepth::One.num_colors(0), 2);
        assert_eq!(BmpDepth::Four.num_colors(0), 16);
        assert_eq!(BmpDepth::Eight.num_colors(0), 256);
        assert_eq!(BmpDepth::Eight.num_colors(50), 50);
        assert_eq!(BmpDepth::Four.num_colors(300), 16);
        assert_eq!(BmpDepth::TwentyFour.num_colors(0), 0);
        assert_eq!(BmpDepth::ThirtyTwo.num_colors(0), 0);
    }

    #[test]
    fn rows_are_padded_to_four_bytes() {
        assert_eq!(BmpDepth::One.row_size(2), 4);
        assert_eq!(BmpDepth::Four.row_size(9), 8);
        assert_eq!(BmpDepth::TwentyFour.row_size(5), 16);
        assert_eq!(BmpDepth::ThirtyTwo.row_size(5), 20);
        assert_eq!(mask_row_size(1), 4);
        assert_eq!(mask_row_size(33), 8);
    }
}

//===========================================================================//
