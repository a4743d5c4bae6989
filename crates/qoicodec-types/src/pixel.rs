use crate::QOI_CACHE_SIZE;

/// A single RGB/RGBA pixel
///
/// In case of RGB the alpha value should always be 255
///
/// For RGBA the values should be un-premultiplied alpha
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// A Pixel with all channels set to 0, the initial value of every cache slot
    pub const ZERO: Self = Pixel {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// The previous pixel assumed before the first pixel of an image
    pub const START: Self = Pixel {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The color cache slot of this pixel, `(r * 3 + g * 5 + b * 7 + a * 11) % 64`
    pub fn pixel_hash(&self) -> u8 {
        (((self.r as usize) * 3
            + (self.g as usize) * 5
            + (self.b as usize) * 7
            + (self.a as usize) * 11)
            % QOI_CACHE_SIZE) as u8
    }

    /// Unpack a `0xAARRGGBB` integer
    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Pack into a `0xAARRGGBB` integer
    pub fn to_argb(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Self::START
    }
}

impl From<[u8; 4]> for Pixel {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Pixel> for [u8; 4] {
    fn from(px: Pixel) -> Self {
        [px.r, px.g, px.b, px.a]
    }
}
