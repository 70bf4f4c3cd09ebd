use std::io;

//===========================================================================//

/// Errors from decoding or encoding an ICO/CUR file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IcoError {
    /// A reserved field was nonzero, or the container is otherwise
    /// structurally invalid.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The header's resource type was neither 1 (icon) nor 2 (cursor).
    #[error("unsupported resource type ({0}), must be 1 or 2")]
    UnsupportedType(u16),

    /// An entry's payload is not an uncompressed bitmap (for example, a
    /// PNG-compressed frame).
    #[error("unsupported payload format: {0}")]
    UnsupportedPayloadFormat(String),

    /// The header declared zero entries.
    #[error("container has no entries")]
    EmptyContainer,

    /// An entry record declared a zero-length payload.
    #[error("entry {index} has a zero payload size")]
    InvalidPayloadSize {
        /// The index of the offending entry.
        index: usize,
    },

    /// An entry record pointed its payload into the header or directory.
    #[error(
        "entry {index} has payload offset {offset}, \
         but must be at least {minimum}"
    )]
    InvalidOffset {
        /// The index of the offending entry.
        index: usize,
        /// The offset stored in the entry record.
        offset: u32,
        /// The smallest offset that lies past the directory.
        minimum: u32,
    },

    /// The stream ended before a header, record, or payload was complete.
    #[error("truncated stream: {0}")]
    TruncatedStream(#[source] io::Error),

    /// Any other failure of the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// The number of images does not match the number of entries (or of
    /// hotspot coordinates).
    #[error("expected {expected} items, got {actual}")]
    ArityMismatch {
        /// The count the container requires.
        expected: usize,
        /// The count that was supplied.
        actual: usize,
    },

    /// An image is wider or taller than 256 pixels.
    #[error("image {index} is too large: {width}x{height}, cannot exceed 256")]
    ImageTooLarge {
        /// The index of the offending image.
        index: usize,
        /// The image's width, in pixels.
        width: u32,
        /// The image's height, in pixels.
        height: u32,
    },

    /// An image's dimensions differ from the entry it is written into.
    #[error(
        "image {index} is {}x{}, but its entry is {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        /// The index of the offending image.
        index: usize,
        /// The entry's (width, height).
        expected: (u32, u32),
        /// The image's (width, height).
        actual: (u32, u32),
    },

    /// More entries than the 16-bit count field can hold.
    #[error("too many entries (was {0}, but max is 65535)")]
    TooManyEntries(usize),

    /// The raster codec failed to decode or encode a bitmap.
    #[error("raster codec error: {0}")]
    RasterCodec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<io::Error> for IcoError {
    fn from(error: io::Error) -> IcoError {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            IcoError::TruncatedStream(error)
        } else {
            IcoError::Io(error)
        }
    }
}

impl From<image::ImageError> for IcoError {
    fn from(error: image::ImageError) -> IcoError {
        IcoError::RasterCodec(Box::new(error))
    }
}

impl From<png::DecodingError> for IcoError {
    fn from(error: png::DecodingError) -> IcoError {
        match error {
            png::DecodingError::IoError(error) => IcoError::from(error),
            error => IcoError::RasterCodec(Box::new(error)),
        }
    }
}

impl From<png::EncodingError> for IcoError {
    fn from(error: png::EncodingError) -> IcoError {
        match error {
            png::EncodingError::IoError(error) => IcoError::from(error),
            error => IcoError::RasterCodec(Box::new(error)),
        }
    }
}

/// A specialized `Result` type for ICO/CUR operations.
pub type Result<T> = std::result::Result<T, IcoError>;

//===========================================================================//


//===========================================================================//
