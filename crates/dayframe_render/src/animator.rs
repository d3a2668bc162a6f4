use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use log::debug;

use crate::cancel::{CancelToken, DrawStatus};
use crate::canvas::Canvas;
use crate::glyph::ClockFace;
use crate::pixel::Rgb;
use crate::schedule::Schedule;

pub const DEFAULT_SPIN_DELAY: Duration = Duration::from_millis(40);

/// What a single tick ended up drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub spun: bool,
    pub status: DrawStatus,
}

/// Drives a schedule onto a canvas, either the current frame or a full spin.
#[derive(Debug)]
pub struct Animator {
    schedule: Schedule,
    background: Option<Rgb>,
    clock: Option<ClockFace>,
    spin_delay: Duration,
    spin_every: u32,
    ticks: u64,
}

impl Animator {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            background: None,
            clock: None,
            spin_delay: DEFAULT_SPIN_DELAY,
            spin_every: 0,
            ticks: 0,
        }
    }

    /// Fill the canvas with `color` before each frame is composited.
    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    /// Overlay the clock readout on every rendered frame.
    pub fn with_clock(mut self, clock: ClockFace) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_spin_delay(mut self, delay: Duration) -> Self {
        self.spin_delay = delay;
        self
    }

    /// Spin on every `ticks`-th tick; zero never spins.
    pub fn with_spin_every(mut self, ticks: u32) -> Self {
        self.spin_every = ticks;
        self
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Draws the current frame, then the clock on top of it.
    pub fn render<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        now: NaiveDateTime,
        cancel: &CancelToken,
    ) -> DrawStatus {
        if let Some(color) = self.background {
            canvas.fill(color);
        }

        if self.schedule.draw(canvas, now, cancel).is_cancelled() {
            return DrawStatus::Cancelled;
        }

        match self.clock {
            Some(clock) => clock.draw(canvas, &now, cancel),
            None => DrawStatus::Finished,
        }
    }

    /// Fast-forwards through every frame starting at the current one and
    /// returning to it, pausing `spin_delay` between frames.
    pub fn spin<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        now: NaiveDateTime,
        cancel: &CancelToken,
    ) -> DrawStatus {
        let mut order = self.schedule.spin_order(now).peekable();

        while let Some(index) = order.next() {
            if cancel.is_cancelled() {
                debug!("spin cancelled before frame {index}");
                return DrawStatus::Cancelled;
            }

            if let Some(color) = self.background {
                canvas.fill(color);
            }

            let surface = self.schedule.frames()[index].surface();
            if surface.draw(canvas, 0, 0, cancel).is_cancelled() {
                debug!("spin cancelled during frame {index}");
                return DrawStatus::Cancelled;
            }

            if order.peek().is_some() && !self.spin_delay.is_zero() {
                thread::sleep(self.spin_delay);
            }
        }

        DrawStatus::Finished
    }

    /// One iteration of the render loop.
    pub fn tick<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        now: NaiveDateTime,
        cancel: &CancelToken,
    ) -> Tick {
        self.ticks += 1;

        let spun = self.spin_every > 0 && self.ticks % u64::from(self.spin_every) == 0;
        let status = if spun {
            let status = self.spin(canvas, now, cancel);
            if status.is_cancelled() {
                status
            } else {
                self.render(canvas, now, cancel)
            }
        } else {
            self.render(canvas, now, cancel)
        };

        Tick { spun, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::testing::RecordingCanvas;
    use crate::canvas::FrameBuffer;
    use crate::schedule::tests::{at, even};

    fn animator(count: usize) -> Animator {
        Animator::new(even(count)).with_spin_delay(Duration::ZERO)
    }

    /// Frame indices in the order their tagged pixel was written.
    fn drawn(canvas: &RecordingCanvas) -> Vec<usize> {
        canvas.writes.iter().map(|(_, _, color)| usize::from(color.r)).collect()
    }

    #[test]
    fn test_render_draws_current_frame_over_background() {
        let mut animator = animator(4).with_background(Rgb::new(0, 0, 9));
        let mut canvas = RecordingCanvas::new(1, 1);

        let status = animator.render(&mut canvas, at(18, 5), &CancelToken::new());

        assert_eq!(status, DrawStatus::Finished);
        assert_eq!(canvas.fills, vec![Rgb::new(0, 0, 9)]);
        assert_eq!(drawn(&canvas), vec![3]);
    }

    #[test]
    fn test_spin_visits_every_frame_once_and_closes_the_loop() {
        let mut animator = animator(6);
        let mut canvas = RecordingCanvas::new(1, 1);

        let status = animator.spin(&mut canvas, at(16, 0), &CancelToken::new());

        assert_eq!(status, DrawStatus::Finished);
        assert_eq!(drawn(&canvas), vec![4, 5, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_spin_does_not_move_selection() {
        let mut animator = animator(6);
        let mut canvas = RecordingCanvas::new(1, 1);

        animator.spin(&mut canvas, at(8, 0), &CancelToken::new());

        assert_eq!(animator.schedule().current_index(), Some(2));
    }

    #[test]
    fn test_cancelled_spin_stops_early() {
        let mut animator = animator(6);
        let mut canvas = RecordingCanvas::new(1, 1);
        let token = CancelToken::new();
        token.cancel();

        assert_eq!(animator.spin(&mut canvas, at(8, 0), &token), DrawStatus::Cancelled);
        assert!(canvas.writes.is_empty());
    }

    #[test]
    fn test_spin_cancelled_between_frames_stops_there() {
        let mut animator = animator(6);
        let token = CancelToken::new();
        let mut canvas = RecordingCanvas::new(1, 1).cancelling_after(3, token.clone());

        assert_eq!(animator.spin(&mut canvas, at(16, 0), &token), DrawStatus::Cancelled);
        assert_eq!(drawn(&canvas), vec![4, 5, 0]);
    }

    #[test]
    fn test_tick_spins_on_cadence() {
        let mut animator = animator(3).with_spin_every(3);
        let mut canvas = RecordingCanvas::new(1, 1);
        let token = CancelToken::new();

        let ticks: Vec<bool> =
            (0..6).map(|_| animator.tick(&mut canvas, at(0, 0), &token).spun).collect();

        assert_eq!(ticks, vec![false, false, true, false, false, true]);
        assert_eq!(animator.ticks(), 6);
        // Four plain renders plus two spins of four draws and a render each.
        assert_eq!(canvas.writes.len(), 4 + 2 * (4 + 1));
    }

    #[test]
    fn test_tick_without_cadence_never_spins() {
        let mut animator = animator(3);
        let mut canvas = RecordingCanvas::new(1, 1);
        for _ in 0..10 {
            assert!(!animator.tick(&mut canvas, at(0, 0), &CancelToken::new()).spun);
        }
    }

    #[test]
    fn test_clock_is_drawn_on_top() {
        let clock = ClockFace::new(0, 0, Rgb::new(0, 255, 0));
        let mut animator = animator(1).with_clock(clock);
        let mut buffer = FrameBuffer::new(20, 6);

        animator.render(&mut buffer, at(12, 34), &CancelToken::new());

        // Off cells of the "1" leave the frame pixel at the origin visible.
        assert_eq!(buffer.get(0, 0), Some(Rgb::new(0, 0, 0)));
        assert_eq!(buffer.get(1, 0), Some(Rgb::new(0, 255, 0)));
    }
}
