/// Bit masks locating each channel inside a pixel word.
///
/// A zero mask means the channel is absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChannelMasks {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

impl ChannelMasks {
    pub const fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color layout, ignoring alpha.
    pub fn same_rgb(&self, other: &ChannelMasks) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Position and precision of one channel: `value8 = ((word & mask) >> shift) << loss`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelShift {
    pub shift: u32,
    pub loss: u32,
}

impl ChannelShift {
    pub fn from_mask(mask: u32) -> Self {
        if mask == 0 {
            return Self { shift: 0, loss: 8 };
        }
        Self {
            shift: mask.trailing_zeros(),
            loss: 8u32.saturating_sub(mask.count_ones()),
        }
    }

    #[inline]
    fn extract(self, word: u32, mask: u32) -> u8 {
        (((word & mask) >> self.shift) << self.loss) as u8
    }

    #[inline]
    fn insert(self, value: u8, mask: u32) -> u32 {
        (((value as u32) >> self.loss) << self.shift) & mask
    }
}

/// Layout of a CPU pixel: bytes per pixel plus channel masks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub bytes_per_pixel: u8,
    pub masks: ChannelMasks,
}

impl PixelFormat {
    pub const fn new(bytes_per_pixel: u8, masks: ChannelMasks) -> Self {
        Self {
            bytes_per_pixel,
            masks,
        }
    }

    /// Bytes in memory order R, G, B.
    pub const fn rgb24() -> Self {
        Self::new(3, ChannelMasks::new(0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0))
    }

    /// Bytes in memory order B, G, R.
    pub const fn bgr24() -> Self {
        Self::new(3, ChannelMasks::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0))
    }

    /// Bytes in memory order R, G, B, A.
    pub const fn rgba32() -> Self {
        Self::new(
            4,
            ChannelMasks::new(0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000),
        )
    }

    /// Bytes in memory order B, G, R, A.
    pub const fn bgra32() -> Self {
        Self::new(
            4,
            ChannelMasks::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000),
        )
    }

    /// Bytes in memory order A, B, G, R.
    pub const fn abgr32() -> Self {
        Self::new(
            4,
            ChannelMasks::new(0xFF00_0000, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF),
        )
    }

    pub fn has_alpha(&self) -> bool {
        self.masks.a != 0
    }

    pub fn shifts(&self) -> [ChannelShift; 4] {
        [
            ChannelShift::from_mask(self.masks.r),
            ChannelShift::from_mask(self.masks.g),
            ChannelShift::from_mask(self.masks.b),
            ChannelShift::from_mask(self.masks.a),
        ]
    }

    /// Decodes one pixel word to 8-bit RGBA. Missing alpha reads as opaque.
    pub fn decode(&self, word: u32) -> [u8; 4] {
        let [r, g, b, a] = self.shifts();
        let m = self.masks;
        [
            r.extract(word, m.r),
            g.extract(word, m.g),
            b.extract(word, m.b),
            if m.a == 0 { 255 } else { a.extract(word, m.a) },
        ]
    }

    pub fn encode(&self, rgba: [u8; 4]) -> u32 {
        let [r, g, b, a] = self.shifts();
        let m = self.masks;
        r.insert(rgba[0], m.r) | g.insert(rgba[1], m.g) | b.insert(rgba[2], m.b) | a.insert(rgba[3], m.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_and_loss_of_byte_masks() {
        assert_eq!(ChannelShift::from_mask(0xFF00_0000), ChannelShift { shift: 24, loss: 0 });
        assert_eq!(ChannelShift::from_mask(0x0000_FF00), ChannelShift { shift: 8, loss: 0 });
        assert_eq!(ChannelShift::from_mask(0), ChannelShift { shift: 0, loss: 8 });
    }

    #[test]
    fn shift_and_loss_of_packed_565() {
        assert_eq!(ChannelShift::from_mask(0xF800), ChannelShift { shift: 11, loss: 3 });
        assert_eq!(ChannelShift::from_mask(0x07E0), ChannelShift { shift: 5, loss: 2 });
    }

    #[test]
    fn decode_follows_memory_order() {
        let word = u32::from_le_bytes([10, 20, 30, 40]);
        assert_eq!(PixelFormat::rgba32().decode(word), [10, 20, 30, 40]);
        assert_eq!(PixelFormat::bgra32().decode(word), [30, 20, 10, 40]);
        assert_eq!(PixelFormat::abgr32().decode(word), [40, 30, 20, 10]);
    }

    #[test]
    fn missing_alpha_decodes_opaque() {
        let word = u32::from_le_bytes([1, 2, 3, 0]);
        assert_eq!(PixelFormat::rgb24().decode(word), [1, 2, 3, 255]);
    }

    #[test]
    fn encode_inverts_decode() {
        let f = PixelFormat::abgr32();
        let word = f.encode([1, 2, 3, 4]);
        assert_eq!(word.to_le_bytes(), [4, 3, 2, 1]);
    }
}
