use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageError};
use log::debug;

use super::adjust;
use super::geometry::Fit;
use crate::pixel::Pixel;
use crate::surface::Surface;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("frame resource {} not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read frame resource {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to decode frame resource {}: {source}", .path.display())]
    Decode { path: PathBuf, source: ImageError },
    #[error("frame resource {} has no pixels", .path.display())]
    Empty { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Io { path, .. }
            | LoadError::Decode { path, .. }
            | LoadError::Empty { path } => path,
        }
    }
}

/// Raw decoded samples, one `[r, g, b, a]` per pixel. Rows may be ragged.
#[derive(Clone, Debug, Default)]
pub struct Raster {
    pub rows: Vec<Vec<[u8; 4]>>,
}

impl Raster {
    pub fn new(rows: Vec<Vec<[u8; 4]>>) -> Self {
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }
}

/// Turns an on-disk resource into raw samples.
pub trait RasterDecoder {
    fn decode(&self, path: &Path) -> Result<Raster, LoadError>;
}

/// Decoder backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDecoder {
    fit: Fit,
}

impl ImageDecoder {
    pub fn new(fit: Fit) -> Self {
        Self { fit }
    }
}

impl RasterDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Raster, LoadError> {
        let image = image::open(path).map_err(|err| classify(path, err))?;
        let (w, h) = image.dimensions();
        debug!("decoded frame {}x{} from {}", w, h, path.display());

        let image = self.fit.apply(image);
        Ok(raster_from_image(&image))
    }
}

fn classify(path: &Path, err: ImageError) -> LoadError {
    let path = path.to_path_buf();
    match err {
        ImageError::IoError(source) if source.kind() == io::ErrorKind::NotFound => {
            LoadError::NotFound { path }
        },
        ImageError::IoError(source) => LoadError::Io { path, source },
        source => LoadError::Decode { path, source },
    }
}

pub fn raster_from_image(image: &DynamicImage) -> Raster {
    let rgba = image.to_rgba8();
    let rows = rgba.rows().map(|row| row.map(|pixel| pixel.0).collect()).collect();
    Raster::new(rows)
}

/// Normalizes raw samples into a surface, clamping every channel.
pub fn surface_from_raster(raster: &Raster) -> Surface {
    Surface::from_rows(raster.rows.iter().map(|row| row.iter().copied().map(Pixel::from_rgba)))
}

/// Loads frame resources eagerly into surfaces.
#[derive(Clone, Debug)]
pub struct FrameLoader<D> {
    decoder: D,
    brightness: u8,
}

impl<D: RasterDecoder> FrameLoader<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder, brightness: 100 }
    }

    /// Scales every color channel to `percent` of its decoded value.
    pub fn with_brightness(mut self, percent: u8) -> Self {
        self.brightness = percent.clamp(1, 100);
        self
    }

    pub fn load(&self, path: &Path) -> Result<Surface, LoadError> {
        let mut raster = self.decoder.decode(path)?;
        if raster.is_empty() {
            return Err(LoadError::Empty { path: path.to_path_buf() });
        }

        adjust::apply_brightness(&mut raster, self.brightness);
        Ok(surface_from_raster(&raster))
    }
}
