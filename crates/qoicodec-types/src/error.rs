use thiserror::Error;

/// The data does not follow the qoi format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid magic bytes (expected \"qoif\", found {found:?})")]
    InvalidMagic { found: [u8; 4] },
    #[error("invalid channel count (expected 3 or 4, found {found})")]
    InvalidChannels { found: u8 },
    #[error("invalid colorspace (expected 0 or 1, found {found})")]
    InvalidColorSpace { found: u8 },
    #[error("invalid end marker (found {found:?})")]
    InvalidFooter { found: [u8; 8] },
    #[error("data of {len} bytes is too short to hold a header and an end marker")]
    TooShort { len: usize },
    #[error("op stream ends inside a {len} byte chunk at offset {offset}")]
    TruncatedChunk { offset: usize, len: usize },
    #[error("op stream ended after {decoded} of {expected} pixels")]
    MissingPixels { decoded: u64, expected: u64 },
    #[error("image of {width}x{height} pixels exceeds the supported maximum")]
    TooLarge { width: u32, height: u32 },
}

/// A caller supplied a value outside of its documented range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("image must contain at least one pixel, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("expected {expected} pixels for the declared dimensions, got {found}")]
    PixelCount { expected: u64, found: u64 },
    #[error("{len} bytes of raw data are not a whole number of {channels} channel pixels")]
    ChannelMismatch { len: usize, channels: u8 },
    #[error("row {row} has {found} pixels, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("diff ({dr}, {dg}, {db}) is outside of -2..=1")]
    DiffRange { dr: i8, dg: i8, db: i8 },
    #[error("luma (dg {dg}, dr-dg {dr_dg}, db-dg {db_dg}) is outside of -32..=31 / -8..=7")]
    LumaRange { dg: i8, dr_dg: i8, db_dg: i8 },
    #[error("run length {run} is outside of 1..=62")]
    RunLength { run: u8 },
    #[error("cache index {idx} is outside of 0..=63")]
    IndexRange { idx: u8 },
}

/// Decoding would not fill the pixel buffer exactly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferOverrun {
    #[error("chunk of {pixels} pixels at pixel {position} overflows the {capacity} pixel image")]
    Chunk { pixels: u8, position: u64, capacity: u64 },
    #[error("{remaining} op stream bytes remain after all {capacity} pixels were decoded")]
    TrailingData { remaining: usize, capacity: u64 },
}

/// The category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    InvalidArgument,
    BufferOverrun,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    BufferOverrun(#[from] BufferOverrun),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(_) => ErrorKind::Format,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::BufferOverrun(_) => ErrorKind::BufferOverrun,
        }
    }
}
