//! Conversions between [`Pixel`] buffers and the raw layouts images arrive in

use alloc::vec::Vec;

use crate::types::{InvalidArgument, Pixel, QoiChannels};

/// Interleaved RGB or RGBA bytes to pixels, RGB pixels get an alpha of 255
pub fn pixels_from_raw(raw: &[u8], channels: QoiChannels) -> Result<Vec<Pixel>, InvalidArgument> {
    if raw.len() % channels.count() != 0 {
        return Err(InvalidArgument::ChannelMismatch {
            len: raw.len(),
            channels: channels as u8,
        });
    }

    let pixels = match channels {
        QoiChannels::Rgb => raw
            .chunks_exact(3)
            .map(|px| Pixel::rgb(px[0], px[1], px[2]))
            .collect(),
        QoiChannels::Rgba => raw
            .chunks_exact(4)
            .map(|px| Pixel::rgba(px[0], px[1], px[2], px[3]))
            .collect(),
    };

    Ok(pixels)
}

/// Pixels to interleaved bytes, alpha is dropped for RGB
pub fn pixels_to_raw(pixels: &[Pixel], channels: QoiChannels) -> Vec<u8> {
    let mut raw = Vec::with_capacity(pixels.len() * channels.count());

    for px in pixels {
        match channels {
            QoiChannels::Rgb => raw.extend_from_slice(&[px.r, px.g, px.b]),
            QoiChannels::Rgba => raw.extend_from_slice(&[px.r, px.g, px.b, px.a]),
        }
    }

    raw
}

/// A grid of packed `0xAARRGGBB` rows to `(width, height, pixels)`
pub fn pixels_from_argb<R: AsRef<[u32]>>(
    rows: &[R],
) -> Result<(u32, u32, Vec<Pixel>), InvalidArgument> {
    let width = rows.first().map_or(0, |row| row.as_ref().len());
    let height = rows.len();

    if width == 0 {
        return Err(InvalidArgument::EmptyImage {
            width: width as u32,
            height: height as u32,
        });
    }

    let mut pixels = Vec::with_capacity(width * height);
    for (idx, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(InvalidArgument::RaggedRow {
                row: idx,
                expected: width,
                found: row.len(),
            });
        }
        pixels.extend(row.iter().copied().map(Pixel::from_argb));
    }

    Ok((width as u32, height as u32, pixels))
}

/// Row-major pixels back to a grid of packed `0xAARRGGBB` rows
pub fn pixels_to_argb(
    pixels: &[Pixel],
    width: u32,
    height: u32,
) -> Result<Vec<Vec<u32>>, InvalidArgument> {
    if width == 0 || height == 0 {
        return Err(InvalidArgument::EmptyImage { width, height });
    }

    let expected = width as u64 * height as u64;
    if pixels.len() as u64 != expected {
        return Err(InvalidArgument::PixelCount {
            expected,
            found: pixels.len() as u64,
        });
    }

    Ok(pixels
        .chunks_exact(width as usize)
        .map(|row| row.iter().map(Pixel::to_argb).collect())
        .collect())
}
