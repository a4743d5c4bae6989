use std::io::Cursor;

use anyhow::{bail, Context, Result};
use png::Transformations;
use qoicodec::raster::{pixels_from_raw, pixels_to_raw};
use qoicodec::{Pixel, QoiChannels};

/// The frames of a png, an APNG may contain more than one
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    /// Rgba as soon as any frame has a pixel that is not fully opaque
    pub channels: QoiChannels,
    pub frames: Vec<Vec<Pixel>>,
}

pub fn load(data: &[u8]) -> Result<PngImage> {
    // expand palettes and low bit depths, reduce 16 bit samples, so only 8 bit gray/rgb remain
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder.read_info().context("reading png header")?;
    let mut buf = vec![0; reader.output_buffer_size()];

    let (width, height) = reader.info().size();
    let mut channels = QoiChannels::Rgb;
    // a default image outside of the animation is read as one extra leading frame
    let info = reader.info();
    let frame_count = info.animation_control.as_ref().map_or(1, |actl| {
        actl.num_frames as usize + usize::from(info.frame_control.is_none())
    });
    let mut frames = Vec::with_capacity(frame_count);

    for idx in 0..frame_count {
        let info = reader
            .next_frame(&mut buf)
            .with_context(|| format!("reading png frame {idx}"))?;

        let bytes = &buf[..info.buffer_size()];
        let frame = match info.color_type {
            png::ColorType::Grayscale => bytes.iter().map(|&c| Pixel::rgb(c, c, c)).collect(),
            png::ColorType::GrayscaleAlpha => bytes
                .chunks_exact(2)
                .map(|px| Pixel::rgba(px[0], px[0], px[0], px[1]))
                .collect(),
            png::ColorType::Rgb => pixels_from_raw(bytes, QoiChannels::Rgb)?,
            png::ColorType::Rgba => pixels_from_raw(bytes, QoiChannels::Rgba)?,
            png::ColorType::Indexed => bail!("indexed png was not expanded"),
        };

        if frame.iter().any(|px: &Pixel| px.a != 255) {
            channels = QoiChannels::Rgba;
        }
        frames.push(frame);
    }

    Ok(PngImage {
        width,
        height,
        channels,
        frames,
    })
}

pub fn save(
    channels: QoiChannels,
    (width, height): (u32, u32),
    pixels: &[Pixel],
) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(match channels {
        QoiChannels::Rgb => png::ColorType::Rgb,
        QoiChannels::Rgba => png::ColorType::Rgba,
    });
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);

    let mut writer = encoder.write_header().context("writing png header")?;
    writer
        .write_image_data(&pixels_to_raw(pixels, channels))
        .context("writing png image data")?;
    writer.finish().context("finishing png")?;

    Ok(out.into_inner())
}
