#![no_std]

mod chunk;
mod error;
mod header;
mod pixel;
mod state;

pub use chunk::{ChunkBuf, QoiChunk};
pub use error::{BufferOverrun, Error, ErrorKind, FormatError, InvalidArgument};
pub use header::{verify_footer, QoiChannels, QoiColorSpace, QoiHeader};
pub use pixel::Pixel;
pub use state::{CoderState, ColorCache};

/// The byte sequence beginning the **Qoi F**ormat Header
pub const QOI_MAGIC: [u8; 4] = *b"qoif";

/// The byte sequence marking the end of a Qoi File
pub const QOI_FOOTER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

/// Length of the encoded [`QoiHeader`]
pub const QOI_HEADER_LEN: usize = 14;

/// Number of slots in the color cache
pub const QOI_CACHE_SIZE: usize = 64;

/// Longest run a single Run chunk can represent
pub const QOI_MAX_RUN: u8 = 62;

/// Largest `width * height` a decoder will allocate for
pub const QOI_PIXELS_MAX: u64 = 400_000_000;
