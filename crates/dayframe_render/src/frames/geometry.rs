use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// How decoded frames are sized relative to the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fit {
    /// Keep the decoded dimensions.
    #[default]
    Native,
    /// Resize to exactly the panel dimensions, ignoring aspect ratio.
    Stretch { width: u32, height: u32 },
}

impl Fit {
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Fit::Native => image,
            Fit::Stretch { width, height } => {
                if width == 0 || height == 0 || image.dimensions() == (width, height) {
                    return image;
                }
                image.resize_exact(width, height, FilterType::CatmullRom)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;

    #[test]
    fn test_native_keeps_dimensions() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(40, 10));
        assert_eq!(Fit::Native.apply(image).dimensions(), (40, 10));
    }

    #[test]
    fn test_stretch_ignores_degenerate_target() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(40, 10));
        let fit = Fit::Stretch { width: 0, height: 16 };
        assert_eq!(fit.apply(image).dimensions(), (40, 10));
    }

    #[test]
    fn test_stretch_changes_aspect() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(40, 10));
        let fit = Fit::Stretch { width: 32, height: 16 };
        assert_eq!(fit.apply(image).dimensions(), (32, 16));
    }
}
