use crate::error::{FormatError, InvalidArgument};
use crate::{Pixel, QOI_MAX_RUN};

const QOI_OP_INDEX: u8 = 0b00000000;
const QOI_OP_DIFF: u8 = 0b01000000;
const QOI_OP_LUMA: u8 = 0b10000000;
const QOI_OP_RUN: u8 = 0b11000000;
const QOI_OP_RGB: u8 = 0b11111110;
const QOI_OP_RGBA: u8 = 0b11111111;

const QOI_TAG_MASK: u8 = 0b11000000;
const QOI_DATA_MASK: u8 = 0b00111111;

/// An individual Chunk,
/// representing between 1 and 62 pixel
///
/// Fields hold the unbiased values, the bias is only applied when writing the chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QoiChunk {
    #[non_exhaustive]
    Rgb { r: u8, g: u8, b: u8 },
    #[non_exhaustive]
    Rgba { r: u8, g: u8, b: u8, a: u8 },
    #[non_exhaustive]
    Index { idx: u8 /* u6 0..=63 */ },
    #[non_exhaustive]
    Diff {
        dr: i8, /* i2 -2..=1 */
        dg: i8, /* i2 -2..=1 */
        db: i8, /* i2 -2..=1 */
    },
    #[non_exhaustive]
    Luma {
        dg: i8,    /* i6 -32..=31 */
        dr_dg: i8, /* i4 -8..=7 */
        db_dg: i8, /* i4 -8..=7 */
    },
    #[non_exhaustive]
    Run { run: u8 /* u6, 1..=62 */ },
}

impl QoiChunk {
    /// Create a new Run Chunk, run needs to be in the range 1..=62
    pub fn new_run(run: u8) -> Result<Self, InvalidArgument> {
        if (1..=QOI_MAX_RUN).contains(&run) {
            Ok(Self::Run { run })
        } else {
            Err(InvalidArgument::RunLength { run })
        }
    }

    /// Create a new Index Chunk, index needs to be at most 63
    pub fn new_index(idx: u8) -> Result<Self, InvalidArgument> {
        if idx <= QOI_DATA_MASK {
            Ok(Self::Index { idx })
        } else {
            Err(InvalidArgument::IndexRange { idx })
        }
    }

    /// Create the Index Chunk referring to the cache slot of `pixel`
    pub fn index_of(pixel: &Pixel) -> Self {
        Self::Index {
            idx: pixel.pixel_hash(),
        }
    }

    /// Create a new Diff Chunk, all arguments need to be in the range -2..=1
    pub fn new_diff(dr: i8, dg: i8, db: i8) -> Result<Self, InvalidArgument> {
        if [dr, dg, db].iter().all(|d| (-2..=1).contains(d)) {
            Ok(Self::Diff { dr, dg, db })
        } else {
            Err(InvalidArgument::DiffRange { dr, dg, db })
        }
    }

    /// Create a new Luma Chunk, dg needs to be in the range -32..=31,
    /// dr_dg and db_dg need to be in the range -8..=7
    pub fn new_luma(dg: i8, dr_dg: i8, db_dg: i8) -> Result<Self, InvalidArgument> {
        if (-32..=31).contains(&dg) && (-8..=7).contains(&dr_dg) && (-8..=7).contains(&db_dg) {
            Ok(Self::Luma { dg, dr_dg, db_dg })
        } else {
            Err(InvalidArgument::LumaRange { dg, dr_dg, db_dg })
        }
    }

    /// Creates a new RGB Chunk
    pub fn new_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    /// Creates a new RGBA Chunk
    pub fn new_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::Rgba { r, g, b, a }
    }

    /// Number of bytes this chunk occupies in the op stream
    pub fn encoded_len(&self) -> usize {
        match self {
            QoiChunk::Index { .. } | QoiChunk::Diff { .. } | QoiChunk::Run { .. } => 1,
            QoiChunk::Luma { .. } => 2,
            QoiChunk::Rgb { .. } => 4,
            QoiChunk::Rgba { .. } => 5,
        }
    }

    /// Number of pixels this chunk produces
    pub fn pixel_count(&self) -> u8 {
        match self {
            QoiChunk::Run { run } => *run,
            _ => 1,
        }
    }

    /// Read the chunk starting at `data[offset]`, returning it together with its length in bytes
    pub fn read(data: &[u8], offset: usize) -> Result<(Self, usize), FormatError> {
        let truncated = |len| FormatError::TruncatedChunk { offset, len };
        let bytes = data.get(offset..).unwrap_or(&[]);

        match bytes {
            [] => Err(truncated(1)),
            [QOI_OP_RGBA, rest @ ..] => match rest {
                [r, g, b, a, ..] => Ok((Self::new_rgba(*r, *g, *b, *a), 5)),
                _ => Err(truncated(5)),
            },
            [QOI_OP_RGB, rest @ ..] => match rest {
                [r, g, b, ..] => Ok((Self::new_rgb(*r, *g, *b), 4)),
                _ => Err(truncated(4)),
            },
            [init, rest @ ..] => {
                let payload = init & QOI_DATA_MASK;
                let chunk = match init & QOI_TAG_MASK {
                    QOI_OP_INDEX => Self::Index { idx: payload },
                    QOI_OP_DIFF => Self::Diff {
                        dr: ((payload >> 4) & 0b11) as i8 - 2,
                        dg: ((payload >> 2) & 0b11) as i8 - 2,
                        db: (payload & 0b11) as i8 - 2,
                    },
                    QOI_OP_LUMA => {
                        let [next, ..] = rest else {
                            return Err(truncated(2));
                        };
                        return Ok((
                            Self::Luma {
                                dg: payload as i8 - 32,
                                dr_dg: (next >> 4) as i8 - 8,
                                db_dg: (next & 0b1111) as i8 - 8,
                            },
                            2,
                        ));
                    }
                    // 0xFE and 0xFF were matched above, so this is always 1..=62
                    _ => Self::Run { run: payload + 1 },
                };
                Ok((chunk, 1))
            }
        }
    }

    /// Write the Chunk into the provided ChunkBuf
    pub fn write_to_chunk_buffer(&self, buf: &mut ChunkBuf) {
        match *self {
            QoiChunk::Rgb { r, g, b } => {
                // [0b11111110] r g b
                buf.set([QOI_OP_RGB, r, g, b])
            }
            QoiChunk::Rgba { r, g, b, a } => {
                // [0b11111111] r g b a
                buf.set([QOI_OP_RGBA, r, g, b, a])
            }
            QoiChunk::Index { idx } => {
                // [ 0 0 idx idx idx idx idx idx ]
                buf.set([QOI_OP_INDEX | (QOI_DATA_MASK & idx)])
            }
            QoiChunk::Diff { dr, dg, db } => {
                // [ 0 1 dr dr dg dg db db ]
                buf.set([QOI_OP_DIFF
                    | (0b11 & (dr + 2) as u8) << 4
                    | (0b11 & (dg + 2) as u8) << 2
                    | (0b11 & (db + 2) as u8)])
            }
            QoiChunk::Luma { dg, dr_dg, db_dg } => {
                // [ 1 0 dg dg dg dg dg dg ] [ dr_dg dr_dg dr_dg dr_dg db_dg db_dg db_dg db_dg ]
                buf.set([
                    QOI_OP_LUMA | (QOI_DATA_MASK & (dg + 32) as u8),
                    (0b1111 & (dr_dg + 8) as u8) << 4 | (0b1111 & (db_dg + 8) as u8),
                ])
            }
            QoiChunk::Run { run } => {
                // [ 1 1 run run run run run run ]
                // Note: [ 1 1 1 1 1 1 1 1 ] & [ 1 1 1 1 1 1 1 0 ] are the rgba/rgb tags
                debug_assert!((1..=QOI_MAX_RUN).contains(&run));
                buf.set([QOI_OP_RUN | (QOI_DATA_MASK & (run - 1))]);
            }
        }
    }
}

impl IntoIterator for QoiChunk {
    type Item = u8;

    type IntoIter = ChunkBuf;

    fn into_iter(self) -> Self::IntoIter {
        let mut buf = ChunkBuf::new();
        self.write_to_chunk_buffer(&mut buf);
        buf
    }
}

/// A buffer for the bytes of a single Chunk
///
/// used to iterate over the bytes of a Chunk
#[derive(Debug, Clone)]
pub struct ChunkBuf {
    data: [u8; 5],
    len: u8,
    offset: u8,
}

trait ChunkData {}

impl ChunkData for [u8; 1] {}
impl ChunkData for [u8; 2] {}
impl ChunkData for [u8; 4] {}
impl ChunkData for [u8; 5] {}

impl ChunkBuf {
    /// Create a new empty ChunkBuf
    pub fn new() -> Self {
        ChunkBuf {
            data: [0; 5],
            len: 0,
            offset: 0,
        }
    }

    /// Set the content of the ChunkBuf
    fn set<const N: usize>(&mut self, data: [u8; N])
    where
        [u8; N]: ChunkData,
    {
        self.data[..N].copy_from_slice(&data);
        self.offset = 0;
        self.len = N as u8;
    }

    /// Get the data of the last written Chunk, this includes already popped bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[0..self.len as usize]
    }
}

impl Iterator for ChunkBuf {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset < self.len {
            let res = self.data[self.offset as usize];
            self.offset += 1;
            Some(res)
        } else {
            None
        }
    }
}

impl Default for ChunkBuf {
    fn default() -> Self {
        Self::new()
    }
}
