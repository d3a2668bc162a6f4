mod animator;
mod cancel;
mod canvas;
mod config;
mod frames;
mod glyph;
mod pixel;
mod schedule;
mod surface;

pub use animator::{Animator, Tick, DEFAULT_SPIN_DELAY};
pub use cancel::{CancelToken, DrawStatus};
pub use canvas::{Canvas, FrameBuffer};
pub use config::{
    AnimationConfig, ClockConfig, Config, ConfigError, DisplayConfig, FitMode, FramesConfig,
    ScheduleConfig,
};
pub use frames::{
    geometry::Fit,
    loader::{
        raster_from_image, surface_from_raster, FrameLoader, ImageDecoder, LoadError, Raster,
        RasterDecoder,
    },
};
pub use glyph::{colon, digit, ClockFace, DIGIT_WIDTH, GLYPH_HEIGHT};
pub use pixel::{Pixel, Rgb};
pub use schedule::{
    Frame, FrameEntry, FrameSet, MissPolicy, Schedule, ScheduleError, SpinOrder,
    DEFAULT_REFRESH_INTERVAL_SECS, MINUTES_PER_DAY,
};
pub use surface::Surface;

#[derive(Debug, thiserror::Error)]
pub enum DayframeError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<LoadError> for DayframeError {
    fn from(err: LoadError) -> Self {
        DayframeError::Schedule(ScheduleError::Load(err))
    }
}
