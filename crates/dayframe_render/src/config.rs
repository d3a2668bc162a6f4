//! Startup configuration.
//!
//! Everything is read once from a TOML file before the first frame is drawn.
//! Every section falls back to its defaults, so a partial file (or no file at
//! all) yields a working setup for a 32x16 panel with 64 frames.
//!
//! # Example
//! ```toml
//! [display]
//! width = 64
//! height = 32
//! background = "#000010"
//!
//! [frames]
//! directory = "sky"
//! prefix = "sky"
//! count = 96
//!
//! [schedule]
//! miss_policy = "keep-previous"
//!
//! [clock]
//! color = "#ffaa00"
//! x = 23
//! y = 13
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animator::Animator;
use crate::frames::geometry::Fit;
use crate::frames::loader::{FrameLoader, ImageDecoder};
use crate::glyph::ClockFace;
use crate::pixel::Rgb;
use crate::schedule::{FrameEntry, FrameSet, MissPolicy, Schedule};
use crate::DayframeError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub frames: FramesConfig,
    pub schedule: ScheduleConfig,
    pub animation: AnimationConfig,
    pub clock: ClockConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// Fill color behind transparent frame pixels (#RRGGBB)
    pub background: String,
    /// Frame brightness in percent (1 - 100), applied when frames load
    pub brightness: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    #[default]
    Native,
    Stretch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FramesConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
    /// Number of evenly spaced frames, `<prefix>0` through `<prefix><count - 1>`
    pub count: usize,
    pub fit: FitMode,
    /// Explicitly anchored frames; replaces the evenly spaced set when present
    pub entries: Vec<FrameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds a frame selection stays cached
    pub refresh_interval_secs: u32,
    pub miss_policy: MissPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Render loop rate
    pub fps: u32,
    /// Spin through all frames every this many ticks (0 disables)
    pub spin_every_ticks: u32,
    /// Pause between frames of a spin
    pub spin_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub enabled: bool,
    /// Digit color (#RRGGBB)
    pub color: String,
    /// Left edge of the readout
    pub x: i32,
    /// Top edge of the readout
    pub y: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 32,
            height: 16,
            background: "#000000".to_string(),
            brightness: 100,
        }
    }
}

impl Default for FramesConfig {
    fn default() -> Self {
        FramesConfig {
            directory: PathBuf::from("frames"),
            prefix: "frame".to_string(),
            extension: "png".to_string(),
            count: 64,
            fit: FitMode::Native,
            entries: Vec::new(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig { refresh_interval_secs: 60, miss_policy: MissPolicy::Nearest }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig { fps: 30, spin_every_ticks: 0, spin_delay_ms: 40 }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        // Centered on the default 32x16 panel.
        ClockConfig { enabled: true, color: "#ffffff".to_string(), x: 7, y: 5 }
    }
}

impl Config {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let mut config = Self::parse(&contents, path)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parses a config from a string; relative paths stay relative to the working directory.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid("display dimensions must be non-zero".into()));
        }
        if self.animation.fps == 0 {
            return Err(ConfigError::Invalid("animation.fps must be non-zero".into()));
        }
        if !(1..=100).contains(&self.display.brightness) {
            return Err(ConfigError::Invalid(format!(
                "display.brightness {} is outside 1..=100",
                self.display.brightness
            )));
        }

        self.background()?;
        self.clock_color()?;
        Ok(())
    }

    pub fn background(&self) -> Result<Rgb, ConfigError> {
        parse_color("display.background", &self.display.background)
    }

    pub fn clock_color(&self) -> Result<Rgb, ConfigError> {
        parse_color("clock.color", &self.clock.color)
    }

    pub fn clock_face(&self) -> Result<Option<ClockFace>, ConfigError> {
        if !self.clock.enabled {
            return Ok(None);
        }
        Ok(Some(ClockFace::new(self.clock.x, self.clock.y, self.clock_color()?)))
    }

    pub fn frames_directory(&self) -> PathBuf {
        self.base_dir.join(&self.frames.directory)
    }

    pub fn frame_set(&self) -> FrameSet {
        FrameSet {
            directory: self.frames_directory(),
            prefix: self.frames.prefix.clone(),
            extension: self.frames.extension.clone(),
            count: self.frames.count,
        }
    }

    pub fn fit(&self) -> Fit {
        match self.frames.fit {
            FitMode::Native => Fit::Native,
            FitMode::Stretch => {
                Fit::Stretch { width: self.display.width, height: self.display.height }
            },
        }
    }

    pub fn frame_loader(&self) -> FrameLoader<ImageDecoder> {
        FrameLoader::new(ImageDecoder::new(self.fit())).with_brightness(self.display.brightness)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.animation.fps.max(1)
    }

    /// Loads every configured frame, calling `on_loaded` after each one.
    pub fn load_schedule<F>(&self, on_loaded: F) -> Result<Schedule, DayframeError>
    where
        F: FnMut(usize, &Path),
    {
        let loader = self.frame_loader();
        let schedule = if self.frames.entries.is_empty() {
            Schedule::load_evenly_spaced(&loader, &self.frame_set(), on_loaded)?
        } else {
            let directory = self.frames_directory();
            Schedule::load_entries(&loader, &directory, &self.frames.entries, on_loaded)?
        };

        let interval = chrono::Duration::seconds(self.schedule.refresh_interval_secs.into());
        Ok(schedule.with_refresh_interval(interval).with_miss_policy(self.schedule.miss_policy))
    }

    pub fn animator(&self, schedule: Schedule) -> Result<Animator, ConfigError> {
        let mut animator = Animator::new(schedule)
            .with_background(self.background()?)
            .with_spin_every(self.animation.spin_every_ticks)
            .with_spin_delay(Duration::from_millis(self.animation.spin_delay_ms));
        if let Some(clock) = self.clock_face()? {
            animator = animator.with_clock(clock);
        }
        Ok(animator)
    }
}

fn parse_color(key: &str, value: &str) -> Result<Rgb, ConfigError> {
    Rgb::from_hex(value)
        .ok_or_else(|| ConfigError::Invalid(format!("{key} {value:?} is not a #RRGGBB color")))
}
