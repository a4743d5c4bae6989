use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::{debug, trace};

use crate::types::{
    verify_footer, BufferOverrun, CoderState, Error, FormatError, InvalidArgument, Pixel,
    QoiChunk, QoiHeader, QOI_FOOTER, QOI_HEADER_LEN, QOI_PIXELS_MAX,
};

/// A decoder for decoding bytes into qoi chunks
///
/// Expects the data to include neither the header nor the footer
pub struct QoiChunkDecoder<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> QoiChunkDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Offset of the next chunk within the op stream
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet decoded
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

impl Iterator for QoiChunkDecoder<'_> {
    type Item = Result<QoiChunk, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        match QoiChunk::read(self.data, self.offset) {
            Ok((chunk, len)) => {
                self.offset += len;
                Some(Ok(chunk))
            }
            Err(err) => {
                // a truncated chunk can only be at the very end
                self.offset = self.data.len();
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for QoiChunkDecoder<'_> {}

/// A decoder turning chunks into the pixels of a single image
///
/// The output buffer is sized for `width * height` pixels up front and never grows past it.
pub struct QoiDecoder {
    state: CoderState,
    pixels: Vec<Pixel>,
    capacity: usize,
}

impl QoiDecoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: CoderState::default(),
            pixels: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The state after the most recently pushed chunk
    pub fn state(&self) -> &CoderState {
        &self.state
    }

    /// Pixels decoded so far
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn is_full(&self) -> bool {
        self.pixels.len() == self.capacity
    }

    /// Decode one chunk, appending its pixels
    pub fn push(&mut self, chunk: &QoiChunk) -> Result<(), BufferOverrun> {
        let count = chunk.pixel_count();
        if self.pixels.len() + count as usize > self.capacity {
            return Err(BufferOverrun::Chunk {
                pixels: count,
                position: self.pixels.len() as u64,
                capacity: self.capacity as u64,
            });
        }

        let previous = self.state.previous;

        let next = match *chunk {
            QoiChunk::Rgb { r, g, b, .. } => self.literal(Pixel {
                r,
                g,
                b,
                a: previous.a,
            }),
            QoiChunk::Rgba { r, g, b, a, .. } => self.literal(Pixel { r, g, b, a }),
            QoiChunk::Index { idx, .. } => self.state.cache.lookup(idx),
            QoiChunk::Diff { dr, dg, db, .. } => self.literal(Pixel {
                r: previous.r.wrapping_add_signed(dr),
                g: previous.g.wrapping_add_signed(dg),
                b: previous.b.wrapping_add_signed(db),
                a: previous.a,
            }),
            QoiChunk::Luma {
                dg, dr_dg, db_dg, ..
            } => self.literal(Pixel {
                r: previous.r.wrapping_add_signed(dr_dg + dg),
                g: previous.g.wrapping_add_signed(dg),
                b: previous.b.wrapping_add_signed(db_dg + dg),
                a: previous.a,
            }),
            QoiChunk::Run { run, .. } => {
                let len = self.pixels.len() + run as usize;
                self.pixels.resize(len, previous);
                return Ok(());
            }
        };

        self.state.previous = next;
        self.pixels.push(next);
        Ok(())
    }

    /// A pixel spelled out by its chunk, these are the only ones entering the cache
    fn literal(&mut self, pixel: Pixel) -> Pixel {
        self.state.cache.store(pixel.pixel_hash(), pixel);
        pixel
    }

    /// The decoded image, only once every pixel has been produced
    pub fn finish(self) -> Result<Vec<Pixel>, FormatError> {
        if self.is_full() {
            Ok(self.pixels)
        } else {
            Err(FormatError::MissingPixels {
                decoded: self.pixels.len() as u64,
                expected: self.capacity as u64,
            })
        }
    }
}

/// Read the header at the start of a qoi file
pub fn decode_header(data: &[u8]) -> Result<QoiHeader, FormatError> {
    let Some(header) = data.first_chunk::<QOI_HEADER_LEN>() else {
        return Err(FormatError::TooShort { len: data.len() });
    };

    let header = QoiHeader::from_bytes(header)?;
    trace!("read header {header:?}");
    Ok(header)
}

/// Decode a whole qoi file into its header and row-major pixels
#[doc(alias = "load")]
pub fn decode(data: &[u8]) -> Result<(QoiHeader, Vec<Pixel>), Error> {
    if data.len() < QOI_HEADER_LEN + QOI_FOOTER.len() {
        return Err(FormatError::TooShort { len: data.len() }.into());
    }

    let header = decode_header(data)?;

    let Some((rest, footer)) = data.split_last_chunk::<8>() else {
        return Err(FormatError::TooShort { len: data.len() }.into());
    };
    verify_footer(footer)?;

    if header.width == 0 || header.height == 0 {
        return Err(InvalidArgument::EmptyImage {
            width: header.width,
            height: header.height,
        }
        .into());
    }

    if header.pixel_count() > QOI_PIXELS_MAX {
        return Err(FormatError::TooLarge {
            width: header.width,
            height: header.height,
        }
        .into());
    }

    debug!(
        "decoding {}x{} image with {} channels",
        header.width,
        header.height,
        header.channels.count()
    );

    let ops = &rest[QOI_HEADER_LEN..];
    let pixels = decode_op_stream(ops, header.pixel_count() as usize)?;

    debug!("decoded {} bytes into {} pixels", data.len(), pixels.len());

    Ok((header, pixels))
}

/// Decode the bytes between header and footer into exactly `pixel_count` pixels
pub fn decode_op_stream(ops: &[u8], pixel_count: usize) -> Result<Vec<Pixel>, Error> {
    let mut chunks = QoiChunkDecoder::new(ops);
    let mut decoder = QoiDecoder::new(pixel_count);

    while !decoder.is_full() {
        let Some(chunk) = chunks.next() else {
            break;
        };
        decoder.push(&chunk?)?;
    }

    if chunks.remaining() > 0 {
        return Err(BufferOverrun::TrailingData {
            remaining: chunks.remaining(),
            capacity: pixel_count as u64,
        }
        .into());
    }

    Ok(decoder.finish()?)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::types::{ErrorKind, QoiChannels, QoiColorSpace};

    fn file(header: &QoiHeader, ops: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&header.to_bytes());
        data.extend_from_slice(ops);
        data.extend_from_slice(&QOI_FOOTER);
        data
    }

    fn header(width: u32, height: u32) -> QoiHeader {
        QoiHeader::new(width, height, QoiChannels::Rgba, QoiColorSpace::SRgbWithLinearAlpha)
    }

    #[test]
    fn test_decoding_image_header() {
        let data = file(&header(3, 7), &[]);
        assert_eq!(decode_header(&data), Ok(header(3, 7)));
    }

    #[test]
    fn test_decoding_invalid_image_header() {
        let mut data = file(&header(1, 1), &[0xc0]);
        data[..4].copy_from_slice(b"qqqq");

        assert_eq!(
            decode(&data),
            Err(Error::Format(FormatError::InvalidMagic { found: *b"qqqq" }))
        );
    }

    #[test]
    fn test_decoding_rgb_op_keeps_alpha() {
        let data = file(&header(2, 1), &[0xff, 1, 2, 3, 4, 0xfe, 101, 102, 103]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(
            pixels,
            vec![Pixel::rgba(1, 2, 3, 4), Pixel::rgba(101, 102, 103, 4)]
        );
    }

    #[test]
    fn test_decoding_run_op() {
        let data = file(&header(5, 1), &[0xfe, 9, 9, 9, 0xc3]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(pixels, vec![Pixel::rgb(9, 9, 9); 5]);
    }

    #[test]
    fn test_decoding_leading_run_repeats_start_pixel() {
        let data = file(&header(2, 1), &[0xc1]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(pixels, vec![Pixel::START; 2]);
    }

    #[test]
    fn test_decoding_index_op() {
        let pixel = Pixel::rgba(101, 102, 103, 104);
        let data = file(&header(3, 1), &[0xff, 101, 102, 103, 104, 0xfe, 0, 0, 0, 54]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(pixels[2], pixel);
    }

    #[test]
    fn test_index_into_fresh_cache_is_zero_pixel() {
        let data = file(&header(1, 1), &[0x05]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(pixels, vec![Pixel::ZERO]);
    }

    #[test]
    fn test_decoding_diff_and_luma_wrap_around() {
        // diff -2, -1, +1 from (0, 0, 0)
        let diff = 0b01_00_01_11;
        // luma dg -8, dr-dg 7, db-dg -8
        let luma = [0x80 | 24, 15 << 4];
        let data = file(&header(2, 1), &[diff, luma[0], luma[1]]);
        let (_, pixels) = decode(&data).unwrap();
        assert_eq!(
            pixels,
            vec![Pixel::rgb(254, 255, 1), Pixel::rgb(253, 247, 241)]
        );
    }

    #[test]
    fn test_run_and_index_leave_cache_untouched() {
        let mut decoder = QoiDecoder::new(10);
        decoder.push(&QoiChunk::new_run(3).unwrap()).unwrap();
        decoder.push(&QoiChunk::new_index(53).unwrap()).unwrap();
        assert_eq!(decoder.state().cache, CoderState::default().cache);
        assert_eq!(decoder.pixels().len(), 4);
    }

    #[test]
    fn test_missing_pixels_is_format_error() {
        let data = file(&header(4, 1), &[0xfe, 1, 2, 3, 0xc1]);
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(
            err,
            Error::Format(FormatError::MissingPixels {
                decoded: 3,
                expected: 4
            })
        );
    }

    #[test]
    fn test_truncated_chunk_is_format_error() {
        let data = file(&header(2, 1), &[0xfe, 1, 2, 3, 0xfe, 1, 2]);
        assert_eq!(
            decode(&data),
            Err(Error::Format(FormatError::TruncatedChunk { offset: 4, len: 4 }))
        );
    }

    #[test]
    fn test_run_past_end_is_overrun() {
        let data = file(&header(2, 1), &[0xc2]);
        assert_eq!(
            decode(&data),
            Err(Error::BufferOverrun(BufferOverrun::Chunk {
                pixels: 3,
                position: 0,
                capacity: 2
            }))
        );
    }

    #[test]
    fn test_trailing_ops_are_overrun() {
        let data = file(&header(1, 1), &[0xc0, 0x40, 0x41]);
        assert_eq!(
            decode(&data),
            Err(Error::BufferOverrun(BufferOverrun::TrailingData {
                remaining: 2,
                capacity: 1
            }))
        );
    }

    #[test]
    fn test_bad_footer() {
        let mut data = file(&header(1, 1), &[0xc0]);
        let last = data.len() - 1;
        data[last] = 0;
        assert_eq!(decode(&data).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            decode(b"qoif"),
            Err(Error::Format(FormatError::TooShort { len: 4 }))
        );
        assert_eq!(
            decode_header(b"qoif\0\0"),
            Err(FormatError::TooShort { len: 6 })
        );
    }

    #[test]
    fn test_empty_and_huge_images_are_rejected() {
        assert_eq!(
            decode(&file(&header(0, 3), &[])).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            decode(&file(&header(u32::MAX, u32::MAX), &[])),
            Err(Error::Format(FormatError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            }))
        );
    }

    #[test]
    fn test_chunk_decoder_reports_offsets() {
        let ops = [0xfe, 1, 2, 3, 0x80 | 32, 0x88, 0xc0];
        let mut chunks = QoiChunkDecoder::new(&ops);
        assert_eq!(chunks.next(), Some(Ok(QoiChunk::new_rgb(1, 2, 3))));
        assert_eq!(chunks.offset(), 4);
        assert_eq!(
            chunks.next(),
            Some(Ok(QoiChunk::new_luma(0, 0, 0).unwrap()))
        );
        assert_eq!(chunks.remaining(), 1);
        assert_eq!(chunks.next(), Some(Ok(QoiChunk::new_run(1).unwrap())));
        assert_eq!(chunks.next(), None);
    }
}
