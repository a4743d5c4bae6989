use std::fmt;

use anyhow::{Context, Result};
use qoicodec::types::{QoiChunk, QOI_HEADER_LEN};
use qoicodec::{
    decode_header, Pixel, QoiChannels, QoiChunkDecoder, QoiColorSpace, QoiHeader, QOI_FOOTER,
};

pub fn save(
    channels: QoiChannels,
    color_space: QoiColorSpace,
    (width, height): (u32, u32),
    px: &[Pixel],
) -> Result<Vec<u8>> {
    let header = QoiHeader::new(width, height, channels, color_space);
    qoicodec::encode(&header, px).context("encoding qoi")
}

pub fn load(data: &[u8]) -> Result<(QoiHeader, Vec<Pixel>)> {
    qoicodec::decode(data).context("decoding qoi")
}

/// How often each chunk kind occurs in a file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkStats {
    pub rgb: u64,
    pub rgba: u64,
    pub index: u64,
    pub diff: u64,
    pub luma: u64,
    pub run: u64,
    /// pixels covered by all runs together
    pub run_pixels: u64,
    pub bytes: u64,
}

impl ChunkStats {
    pub fn chunks(&self) -> u64 {
        self.rgb + self.rgba + self.index + self.diff + self.luma + self.run
    }

    fn count(&mut self, chunk: &QoiChunk) {
        self.bytes += chunk.encoded_len() as u64;
        match chunk {
            QoiChunk::Rgb { .. } => self.rgb += 1,
            QoiChunk::Rgba { .. } => self.rgba += 1,
            QoiChunk::Index { .. } => self.index += 1,
            QoiChunk::Diff { .. } => self.diff += 1,
            QoiChunk::Luma { .. } => self.luma += 1,
            QoiChunk::Run { run, .. } => {
                self.run += 1;
                self.run_pixels += *run as u64;
            }
        }
    }
}

impl fmt::Display for ChunkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  chunks: {} ({} bytes)", self.chunks(), self.bytes)?;
        writeln!(f, "    rgb:   {}", self.rgb)?;
        writeln!(f, "    rgba:  {}", self.rgba)?;
        writeln!(f, "    index: {}", self.index)?;
        writeln!(f, "    diff:  {}", self.diff)?;
        writeln!(f, "    luma:  {}", self.luma)?;
        write!(f, "    run:   {} ({} pixels)", self.run, self.run_pixels)
    }
}

/// Header and chunk statistics, the file is fully decoded first so only valid files are reported
pub fn info(data: &[u8]) -> Result<(QoiHeader, ChunkStats)> {
    let header = decode_header(data).context("reading qoi header")?;
    load(data)?;

    let ops = &data[QOI_HEADER_LEN..data.len() - QOI_FOOTER.len()];
    let mut stats = ChunkStats::default();
    for chunk in QoiChunkDecoder::new(ops) {
        stats.count(&chunk?);
    }

    Ok((header, stats))
}

pub fn describe(header: &QoiHeader) -> String {
    let channels = match header.channels {
        QoiChannels::Rgb => "rgb",
        QoiChannels::Rgba => "rgba",
    };
    let color_space = match header.color_space {
        QoiColorSpace::SRgbWithLinearAlpha => "srgb with linear alpha",
        QoiColorSpace::AllChannelsLinear => "all channels linear",
    };
    format!("{}x{} {channels}, {color_space}", header.width, header.height)
}
