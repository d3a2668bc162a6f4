/// A single RGBA sample. Channels are always within `0..=255`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// Builds a pixel from arbitrary integer channels, clamping each into `0..=255`.
    pub fn new(r: i32, g: i32, b: i32, a: i32) -> Self {
        Self { r: clamp_channel(r), g: clamp_channel(g), b: clamp_channel(b), a: clamp_channel(a) }
    }

    pub const fn opaque(color: Rgb) -> Self {
        Self { r: color.r, g: color.g, b: color.b, a: 255 }
    }

    pub fn from_rgba(sample: [u8; 4]) -> Self {
        Self::new(sample[0].into(), sample[1].into(), sample[2].into(), sample[3].into())
    }

    pub fn is_invisible(&self) -> bool {
        self.a == 0
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Opaque color as written to the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_outside_range_are_clamped() {
        for value in [-1, -255, i32::MIN] {
            let pixel = Pixel::new(value, value, value, value);
            assert_eq!(pixel, Pixel::TRANSPARENT);
        }

        for value in [256, 1000, i32::MAX] {
            let pixel = Pixel::new(value, value, value, value);
            assert_eq!(pixel, Pixel { r: 255, g: 255, b: 255, a: 255 });
        }
    }

    #[test]
    fn test_channels_inside_range_are_preserved() {
        for value in 0..=255 {
            let pixel = Pixel::new(value, 255 - value, value / 2, value);
            assert_eq!(i32::from(pixel.r), value);
            assert_eq!(i32::from(pixel.g), 255 - value);
            assert_eq!(i32::from(pixel.b), value / 2);
            assert_eq!(i32::from(pixel.a), value);
        }
    }

    #[test]
    fn test_alpha_zero_is_invisible() {
        assert!(Pixel::new(255, 10, 10, 0).is_invisible());
        assert!(Pixel::new(255, 10, 10, -20).is_invisible());
        assert!(!Pixel::new(0, 0, 0, 1).is_invisible());
        assert!(!Pixel::opaque(Rgb::BLACK).is_invisible());
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#ff6b00"), Some(Rgb::new(255, 107, 0)));
        assert_eq!(Rgb::from_hex("000000"), Some(Rgb::BLACK));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#ff6b0080"), None);
    }
}
