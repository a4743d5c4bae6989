use crate::{Pixel, QOI_CACHE_SIZE};

/// The 64 slot table of recently seen pixels
///
/// A slot always holds the last pixel stored under its hash, collisions simply overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCache {
    slots: [Pixel; QOI_CACHE_SIZE],
}

impl ColorCache {
    pub fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; QOI_CACHE_SIZE],
        }
    }

    /// The pixel currently held by slot `idx`
    ///
    /// # Panics
    /// if `idx` is not a slot, i.e. not in `0..64`
    pub fn lookup(&self, idx: u8) -> Pixel {
        debug_assert!((idx as usize) < QOI_CACHE_SIZE, "cache index {idx} out of range");
        self.slots[idx as usize]
    }

    /// Overwrite slot `idx`, with the same range requirement as [`ColorCache::lookup`]
    pub fn store(&mut self, idx: u8, pixel: Pixel) {
        debug_assert!((idx as usize) < QOI_CACHE_SIZE, "cache index {idx} out of range");
        self.slots[idx as usize] = pixel;
    }

    pub fn slots(&self) -> &[Pixel; QOI_CACHE_SIZE] {
        &self.slots
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The internal state of a Qoi{De,En}coder
///
/// Encoder and decoder must mutate this identically, chunk for chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderState {
    pub previous: Pixel,
    pub cache: ColorCache,
    /// pixels equal to `previous` seen but not yet emitted, encoder only
    pub run: u8,
}

impl Default for CoderState {
    fn default() -> Self {
        Self {
            previous: Pixel::START,
            cache: ColorCache::new(),
            run: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cache_is_zeroed() {
        let cache = ColorCache::new();
        assert!(cache.slots().iter().all(|px| *px == Pixel::ZERO));
    }

    #[test]
    fn store_overwrites_colliding_pixel() {
        let mut cache = ColorCache::new();
        let a = Pixel::rgba(101, 102, 103, 104);
        let b = Pixel::rgba(0, 0, 0, 10);
        assert_eq!(a.pixel_hash(), 54);
        assert_eq!(b.pixel_hash(), 46);

        // 1 * 3 + 57 * 11 = 630 = 9 * 64 + 54
        let c = Pixel::rgba(1, 0, 0, 57);
        assert_eq!(c.pixel_hash(), a.pixel_hash());

        cache.store(a.pixel_hash(), a);
        assert_eq!(cache.lookup(54), a);

        cache.store(c.pixel_hash(), c);
        assert_eq!(cache.lookup(54), c);
        assert_eq!(cache.lookup(46), Pixel::ZERO);
    }

    #[test]
    #[should_panic]
    fn lookup_past_the_last_slot_panics() {
        let mut cache = ColorCache::new();
        cache.store(0, Pixel::rgb(1, 2, 3));
        cache.lookup(64);
    }

    #[test]
    #[should_panic]
    fn store_past_the_last_slot_panics() {
        ColorCache::new().store(64, Pixel::rgb(1, 2, 3));
    }

    #[test]
    fn coder_state_starts_from_opaque_black() {
        let state = CoderState::default();
        assert_eq!(state.previous, Pixel::rgba(0, 0, 0, 255));
        assert_eq!(state.run, 0);
        assert_eq!(state.cache, ColorCache::new());
    }
}
