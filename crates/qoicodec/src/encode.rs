use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::debug;

use crate::types::{
    CoderState, Error, InvalidArgument, Pixel, QoiChannels, QoiChunk, QoiHeader, QOI_FOOTER,
    QOI_HEADER_LEN, QOI_MAX_RUN,
};

/// An encoder for encoding Pixels into Chunks
pub struct QoiChunkEncoder<I> {
    state: CoderState,
    pixel: I,
    peek: Option<Pixel>,
}

impl<I> QoiChunkEncoder<I> {
    pub fn new(pixel: I) -> Self {
        Self {
            state: CoderState::default(),
            pixel,
            peek: None,
        }
    }

    /// The state after the most recently returned chunk
    pub fn state(&self) -> &CoderState {
        &self.state
    }

    /// Emit the pending run, if any
    fn flush_run(&mut self) -> Option<QoiChunk> {
        // run is kept in 0..=62, so this only fails when there is nothing to flush
        QoiChunk::new_run(core::mem::take(&mut self.state.run)).ok()
    }
}

impl<I: Iterator<Item = Pixel>> Iterator for QoiChunkEncoder<I> {
    type Item = QoiChunk;

    fn next(&mut self) -> Option<Self::Item> {
        // we try to encode using these priorities:
        // - fewest bytes
        // - simplest: previous_pixel > index lookup > calculation
        //
        // this results in this ordering:
        // 1. Run    1-byte  / 1..=62 pixel, copy previous_pixel
        //
        // 2. Index  1-byte  / pixel       , copy from index
        // 3. Diff   1-byte  / pixel       , calculation based on previous_pixel
        //
        // 4. Luma   2-bytes / pixel       , calculation based on previous_pixel
        // 5. Rgb    4-bytes / pixel       , alpha based on previous_pixel
        // 6. Rgba   5-bytes / pixel

        let pixel = loop {
            let Some(pixel) = self.peek.take().or_else(|| self.pixel.next()) else {
                // end of input pixels, only an in progress run may be left
                return self.flush_run();
            };

            if pixel != self.state.previous {
                break pixel;
            }

            self.state.run += 1;
            if self.state.run == QOI_MAX_RUN {
                // a full run, neither the index nor the previous pixel change while on a run
                return self.flush_run();
            }
        };

        if self.state.run > 0 {
            // the run ended, emit it now and handle this pixel on the next call
            self.peek = Some(pixel);
            return self.flush_run();
        }

        Some(select_chunk(&mut self.state, pixel))
    }
}

impl<I> FusedIterator for QoiChunkEncoder<I>
where
    QoiChunkEncoder<I>: Iterator,
    I: FusedIterator,
{
}

/// Choose the chunk for a pixel that differs from the previous one
///
/// Updates the cache and the previous pixel exactly like a decoder reading the returned chunk will.
pub fn select_chunk(state: &mut CoderState, pixel: Pixel) -> QoiChunk {
    let idx = pixel.pixel_hash();
    let previous = core::mem::replace(&mut state.previous, pixel);

    if state.cache.lookup(idx) == pixel {
        // the slot already holds this pixel, so the cache stays untouched
        return QoiChunk::index_of(&pixel);
    }

    state.cache.store(idx, pixel);

    if pixel.a != previous.a {
        return QoiChunk::new_rgba(pixel.r, pixel.g, pixel.b, pixel.a);
    }

    // old_{r,g,b} + d{r,g,b} = new_{r,g,b}
    // d{r,g,b} = new_{r,g,b} - old_{r,g,b}
    let dr = pixel.r.wrapping_sub(previous.r) as i8;
    let dg = pixel.g.wrapping_sub(previous.g) as i8;
    let db = pixel.b.wrapping_sub(previous.b) as i8;

    QoiChunk::new_diff(dr, dg, db)
        .or_else(|_| QoiChunk::new_luma(dg, dr.wrapping_sub(dg), db.wrapping_sub(dg)))
        .unwrap_or_else(|_| QoiChunk::new_rgb(pixel.r, pixel.g, pixel.b))
}

/// An encoder used to turn a Qoi Format File Header and Pixels into bytes
pub struct QoiEncoder<I: Iterator<Item = Pixel>> {
    header_bytes: core::array::IntoIter<u8, QOI_HEADER_LEN>,
    chunks: core::iter::Flatten<QoiChunkEncoder<I>>,
    footer_bytes: core::array::IntoIter<u8, 8>,
}

impl<I> QoiEncoder<I>
where
    I: Iterator<Item = Pixel>,
{
    /// Create a new streaming Qoi Encoder
    ///
    /// # Note
    /// the encoder will not stop after width * height pixels on its own!
    /// use [`encode`] to have the pixel count checked against the header
    pub fn new(header: &QoiHeader, pixels: I) -> Self {
        Self {
            header_bytes: header.to_bytes().into_iter(),
            chunks: QoiChunkEncoder::new(pixels).flatten(),
            footer_bytes: QOI_FOOTER.into_iter(),
        }
    }
}

impl<I> FusedIterator for QoiEncoder<I>
where
    I: Iterator<Item = Pixel>,
    QoiEncoder<I>: Iterator,
    QoiChunkEncoder<I>: FusedIterator,
{
}

impl<I: Iterator<Item = Pixel>> Iterator for QoiEncoder<I> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        self.header_bytes
            .next()
            .or_else(|| self.chunks.next())
            .or_else(|| self.footer_bytes.next())
    }
}

/// Encode a whole image into a qoi file
///
/// `pixels` are row-major and must hold exactly `width * height` pixels.
/// For a [`QoiChannels::Rgb`] header every pixel is encoded as fully opaque.
#[doc(alias = "save")]
pub fn encode(header: &QoiHeader, pixels: &[Pixel]) -> Result<Vec<u8>, Error> {
    if header.width == 0 || header.height == 0 {
        return Err(InvalidArgument::EmptyImage {
            width: header.width,
            height: header.height,
        }
        .into());
    }

    let expected = header.pixel_count();
    if pixels.len() as u64 != expected {
        return Err(InvalidArgument::PixelCount {
            expected,
            found: pixels.len() as u64,
        }
        .into());
    }

    debug!(
        "encoding {}x{} image with {} channels",
        header.width,
        header.height,
        header.channels.count()
    );

    // alpha stays 255 throughout a 3 channel image
    let opaque = header.channels == QoiChannels::Rgb;
    let pixels_in = pixels
        .iter()
        .map(|&px| if opaque { Pixel { a: 255, ..px } } else { px });
    let bytes: Vec<u8> = QoiEncoder::new(header, pixels_in).collect();

    debug!(
        "encoded {} pixels into {} bytes",
        pixels.len(),
        bytes.len()
    );

    Ok(bytes)
}
