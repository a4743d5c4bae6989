use crate::error::FormatError;
use crate::{QOI_FOOTER, QOI_HEADER_LEN, QOI_MAGIC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QoiChannels {
    Rgb = 3,
    Rgba = 4,
}

impl QoiChannels {
    /// Number of bytes per pixel in a raw interleaved buffer
    pub fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for QoiChannels {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(QoiChannels::Rgb),
            4 => Ok(QoiChannels::Rgba),
            found => Err(FormatError::InvalidChannels { found }),
        }
    }
}

/// Purely informative, the codec never interprets it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QoiColorSpace {
    SRgbWithLinearAlpha = 0,
    AllChannelsLinear = 1,
}

impl TryFrom<u8> for QoiColorSpace {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoiColorSpace::SRgbWithLinearAlpha),
            1 => Ok(QoiColorSpace::AllChannelsLinear),
            found => Err(FormatError::InvalidColorSpace { found }),
        }
    }
}

/// A struct representing the Qoi Format File Header
///
/// ```text
/// [0..4)   magic "qoif"
/// [4..8)   width  (u32, big-endian)
/// [8..12)  height (u32, big-endian)
/// [12]     channels
/// [13]     colorspace
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QoiHeader {
    pub width: u32,
    pub height: u32,
    pub channels: QoiChannels,
    pub color_space: QoiColorSpace,
}

impl QoiHeader {
    pub fn new(width: u32, height: u32, channels: QoiChannels, color_space: QoiColorSpace) -> Self {
        Self {
            width,
            height,
            channels,
            color_space,
        }
    }

    /// Number of pixels the image holds, `width * height`
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn to_bytes(&self) -> [u8; QOI_HEADER_LEN] {
        let mut bytes = [0; QOI_HEADER_LEN];

        bytes[0..4].copy_from_slice(&QOI_MAGIC);
        bytes[4..8].copy_from_slice(&self.width.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_be_bytes());
        bytes[12] = self.channels as u8;
        bytes[13] = self.color_space as u8;

        bytes
    }

    /// Parse a header, rejecting a wrong magic or unknown channel/colorspace bytes
    pub fn from_bytes(bytes: &[u8; QOI_HEADER_LEN]) -> Result<Self, FormatError> {
        let [m0, m1, m2, m3, w0, w1, w2, w3, h0, h1, h2, h3, channels, color_space] = *bytes;

        let magic = [m0, m1, m2, m3];
        if magic != QOI_MAGIC {
            return Err(FormatError::InvalidMagic { found: magic });
        }

        Ok(Self {
            width: u32::from_be_bytes([w0, w1, w2, w3]),
            height: u32::from_be_bytes([h0, h1, h2, h3]),
            channels: QoiChannels::try_from(channels)?,
            color_space: QoiColorSpace::try_from(color_space)?,
        })
    }
}

/// Check the 8 bytes trailing the op stream against [`QOI_FOOTER`]
pub fn verify_footer(bytes: &[u8; 8]) -> Result<(), FormatError> {
    if *bytes == QOI_FOOTER {
        Ok(())
    } else {
        Err(FormatError::InvalidFooter { found: *bytes })
    }
}
