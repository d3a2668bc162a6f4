use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cancel::{CancelToken, DrawStatus};
use crate::canvas::Canvas;
use crate::frames::loader::{FrameLoader, LoadError, RasterDecoder};
use crate::surface::Surface;

pub const MINUTES_PER_DAY: u32 = 24 * 60;
const SECONDS_PER_DAY: u32 = MINUTES_PER_DAY * 60;

/// Default time between two selections.
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule has no frames")]
    Empty,
    #[error("frame count {0} does not fit in a day (expected 1..=720)")]
    FrameCount(usize),
    #[error("frame anchor {hour:02}:{minute:02} is not a valid time of day")]
    InvalidAnchor { hour: u32, minute: u32 },
    #[error("frame at {hour:02}:{minute:02} has an empty time window")]
    InvalidWindow { hour: u32, minute: u32 },
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// What happens when no frame window contains the current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissPolicy {
    /// Pick the frame whose anchor is closest, wrapping around midnight.
    #[default]
    Nearest,
    /// Keep whatever frame was selected before.
    KeepPrevious,
}

/// A surface anchored at a time of day, current within `window` minutes of it.
#[derive(Clone, Debug)]
pub struct Frame {
    surface: Surface,
    anchor: NaiveTime,
    window: u32,
}

impl Frame {
    pub fn new(
        surface: Surface,
        hour: u32,
        minute: u32,
        window: u32,
    ) -> Result<Self, ScheduleError> {
        let anchor = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(ScheduleError::InvalidAnchor { hour, minute })?;
        if window == 0 {
            return Err(ScheduleError::InvalidWindow { hour, minute });
        }

        Ok(Self { surface, anchor, window })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn hour(&self) -> u32 {
        self.anchor.hour()
    }

    pub fn minute(&self) -> u32 {
        self.anchor.minute()
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Whether `now` lies strictly within the window around today's anchor.
    pub fn contains(&self, now: &NaiveDateTime) -> bool {
        let anchor = now.date().and_time(self.anchor);
        let minutes = now.signed_duration_since(anchor).num_minutes().unsigned_abs();
        minutes < u64::from(self.window)
    }

    /// Seconds between `now` and the anchor, measured the short way around the clock.
    pub fn distance(&self, now: &NaiveDateTime) -> u32 {
        let now = now.time().num_seconds_from_midnight();
        let anchor = self.anchor.num_seconds_from_midnight();
        let delta = now.abs_diff(anchor);
        delta.min(SECONDS_PER_DAY - delta)
    }
}

/// Evenly spaced frame resources named `<prefix><index>.<extension>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSet {
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
    pub count: usize,
}

impl FrameSet {
    pub fn path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("{}{}.{}", self.prefix, index, self.extension))
    }

    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (0..self.count).map(|index| self.path(index))
    }

    /// Minutes between two neighbouring anchors.
    pub fn spacing(&self) -> u32 {
        match u32::try_from(self.count) {
            Ok(count) if count > 0 => MINUTES_PER_DAY / count,
            _ => 0,
        }
    }
}

/// A frame resource with an explicit anchor, for schedules that are not evenly spaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub file: PathBuf,
    pub hour: u32,
    pub minute: u32,
    pub window: u32,
}

/// Ordered frames plus a cached selection of the current one.
#[derive(Debug)]
pub struct Schedule {
    frames: Vec<Frame>,
    current: Option<usize>,
    last_checked: Option<NaiveDateTime>,
    refresh_interval: Duration,
    miss_policy: MissPolicy,
}

impl Schedule {
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self, ScheduleError> {
        if frames.is_empty() {
            return Err(ScheduleError::Empty);
        }

        Ok(Self {
            frames,
            current: None,
            last_checked: None,
            refresh_interval: Duration::seconds(DEFAULT_REFRESH_INTERVAL_SECS),
            miss_policy: MissPolicy::default(),
        })
    }

    /// Loads `set.count` frames in index order, anchoring index `i` at
    /// `i * spacing` minutes with a window of half the spacing.
    pub fn load_evenly_spaced<D, F>(
        loader: &FrameLoader<D>,
        set: &FrameSet,
        mut on_loaded: F,
    ) -> Result<Self, ScheduleError>
    where
        D: RasterDecoder,
        F: FnMut(usize, &Path),
    {
        if set.count == 0 {
            return Err(ScheduleError::Empty);
        }

        let spacing = set.spacing();
        if spacing < 2 {
            return Err(ScheduleError::FrameCount(set.count));
        }

        let mut frames = Vec::with_capacity(set.count);
        for (index, path) in set.paths().enumerate() {
            let surface = loader.load(&path)?;
            let offset = index as u32 * spacing;
            frames.push(Frame::new(surface, offset / 60, offset % 60, spacing / 2)?);
            on_loaded(index, &path);
        }

        info!(
            "loaded {} frames from {} ({} minutes apart)",
            frames.len(),
            set.directory.display(),
            spacing
        );
        Self::from_frames(frames)
    }

    /// Loads explicitly anchored frames; relative files resolve against `directory`.
    pub fn load_entries<D, F>(
        loader: &FrameLoader<D>,
        directory: &Path,
        entries: &[FrameEntry],
        mut on_loaded: F,
    ) -> Result<Self, ScheduleError>
    where
        D: RasterDecoder,
        F: FnMut(usize, &Path),
    {
        let mut frames = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let path = directory.join(&entry.file);
            let surface = loader.load(&path)?;
            frames.push(Frame::new(surface, entry.hour, entry.minute, entry.window)?);
            on_loaded(index, &path);
        }

        info!("loaded {} scheduled frames from {}", frames.len(), directory.display());
        Self::from_frames(frames)
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Cached selection, `None` until the first refresh.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn last_checked(&self) -> Option<NaiveDateTime> {
        self.last_checked
    }

    /// The cache is stale before the first selection and once the refresh
    /// interval has elapsed. A clock set backwards keeps the cached index.
    pub fn should_refresh(&self, now: NaiveDateTime) -> bool {
        let (Some(_), Some(last_checked)) = (self.current, self.last_checked) else {
            return true;
        };

        now.signed_duration_since(last_checked) >= self.refresh_interval
    }

    /// First frame, in schedule order, whose window contains `now`.
    pub fn select_index(&self, now: NaiveDateTime) -> Option<usize> {
        self.frames.iter().position(|frame| frame.contains(&now))
    }

    /// Frame with the closest anchor; ties go to the earlier frame.
    pub fn nearest_index(&self, now: NaiveDateTime) -> usize {
        self.frames
            .iter()
            .enumerate()
            .min_by_key(|(_, frame)| frame.distance(&now))
            .map_or(0, |(index, _)| index)
    }

    /// Recomputes the selection unconditionally and stamps the check time.
    pub fn refresh(&mut self, now: NaiveDateTime) -> usize {
        let selected = match (self.select_index(now), self.miss_policy, self.current) {
            (Some(index), ..) => index,
            (None, MissPolicy::KeepPrevious, Some(previous)) => {
                debug!("no frame window contains {now}, keeping frame {previous}");
                previous
            },
            (None, ..) => {
                let nearest = self.nearest_index(now);
                warn!("no frame window contains {now}, falling back to nearest frame {nearest}");
                nearest
            },
        };

        if self.current != Some(selected) {
            debug!("selected frame {selected} of {} at {now}", self.frames.len());
        }

        self.current = Some(selected);
        self.last_checked = Some(now);
        selected
    }

    /// Index of the current frame, refreshing the cache first when it is stale.
    pub fn current_index_at(&mut self, now: NaiveDateTime) -> usize {
        match self.current {
            Some(index) if !self.should_refresh(now) => index,
            _ => self.refresh(now),
        }
    }

    pub fn current(&mut self, now: NaiveDateTime) -> &Frame {
        let index = self.current_index_at(now);
        &self.frames[index]
    }

    pub fn draw<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        now: NaiveDateTime,
        cancel: &CancelToken,
    ) -> DrawStatus {
        self.current(now).surface().draw(canvas, 0, 0, cancel)
    }

    /// Every frame once in circular order from the current one, then the
    /// current one again to close the loop.
    pub fn spin_order(&mut self, now: NaiveDateTime) -> SpinOrder {
        let start = self.current_index_at(now);
        SpinOrder { start, len: self.frames.len(), step: 0 }
    }
}

/// Iterator over frame indices visited by a spin.
#[derive(Clone, Debug)]
pub struct SpinOrder {
    start: usize,
    len: usize,
    step: usize,
}

impl Iterator for SpinOrder {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.len == 0 || self.step > self.len {
            return None;
        }

        let index = (self.start + self.step) % self.len;
        self.step += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.len == 0 { 0 } else { self.len + 1 - self.step };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpinOrder {}
