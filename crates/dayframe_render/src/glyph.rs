use chrono::Timelike;

use crate::cancel::{CancelToken, DrawStatus};
use crate::canvas::Canvas;
use crate::pixel::{Pixel, Rgb};
use crate::surface::Surface;

pub const DIGIT_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;

type Pattern = [&'static str; GLYPH_HEIGHT];

const DIGITS: [Pattern; 10] = [
    ["###", "#.#", "#.#", "#.#", "###"],
    [".#.", "##.", ".#.", ".#.", "###"],
    ["###", "..#", "###", "#..", "###"],
    ["###", "..#", "###", "..#", "###"],
    ["#.#", "#.#", "###", "..#", "..#"],
    ["###", "#..", "###", "..#", "###"],
    ["###", "#..", "###", "#.#", "###"],
    ["###", "..#", "..#", "..#", "..#"],
    ["###", "#.#", "###", "#.#", "###"],
    ["###", "#.#", "###", "..#", "###"],
];

const COLON: Pattern = [".", ".", "#", "#", "."];

/// Builds the 3x5 glyph for `n mod 10`.
pub fn digit(n: u32, color: Rgb) -> Surface {
    build(&DIGITS[(n % 10) as usize], color)
}

/// Builds the 1x5 colon glyph.
pub fn colon(color: Rgb) -> Surface {
    build(&COLON, color)
}

fn build(pattern: &Pattern, color: Rgb) -> Surface {
    let on = Pixel::opaque(color);
    Surface::from_rows(pattern.iter().map(|row| {
        row.chars().map(move |cell| if cell == '#' { on } else { Pixel::TRANSPARENT })
    }))
}

/// Horizontal offsets of `H H : M M` relative to the clock origin.
const LAYOUT: [i32; 5] = [0, 4, 8, 10, 14];

/// Draws a 24 hour `HH:MM` readout with the digit glyphs.
#[derive(Clone, Copy, Debug)]
pub struct ClockFace {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

impl ClockFace {
    pub const WIDTH: usize = 17;

    pub fn new(x: i32, y: i32, color: Rgb) -> Self {
        Self { x, y, color }
    }

    pub fn draw<C, T>(&self, canvas: &mut C, time: &T, cancel: &CancelToken) -> DrawStatus
    where
        C: Canvas + ?Sized,
        T: Timelike,
    {
        let (hour, minute) = (time.hour(), time.minute());
        let glyphs = [
            digit(hour / 10, self.color),
            digit(hour, self.color),
            colon(self.color),
            digit(minute / 10, self.color),
            digit(minute, self.color),
        ];

        for (glyph, offset) in glyphs.iter().zip(LAYOUT) {
            if glyph.draw(canvas, self.x + offset, self.y, cancel).is_cancelled() {
                return DrawStatus::Cancelled;
            }
        }

        DrawStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::canvas::FrameBuffer;

    fn lit(surface: &Surface) -> Vec<Vec<bool>> {
        surface.rows().map(|row| row.iter().map(|pixel| !pixel.is_invisible()).collect()).collect()
    }

    #[test]
    fn test_digits_are_three_by_five() {
        for n in 0..10 {
            let glyph = digit(n, Rgb::WHITE);
            assert_eq!(glyph.width(), DIGIT_WIDTH);
            assert_eq!(glyph.height(), GLYPH_HEIGHT);
        }
    }

    #[test]
    fn test_digits_repeat_every_ten() {
        let colors = [Rgb::WHITE, Rgb::new(255, 0, 0), Rgb::new(1, 2, 3)];
        for color in colors {
            for n in 0..10 {
                let base = lit(&digit(n, color));
                assert_eq!(base, lit(&digit(n + 10, color)));
                assert_eq!(base, lit(&digit(n + 100, color)));
                assert_eq!(digit(n, color), digit(n + 100, color));
            }
        }
    }

    #[test]
    fn test_digits_are_distinct() {
        for a in 0..10 {
            for b in (a + 1)..10 {
                assert_ne!(lit(&digit(a, Rgb::WHITE)), lit(&digit(b, Rgb::WHITE)), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_on_cells_take_color() {
        let color = Rgb::new(10, 20, 30);
        let glyph = digit(8, color);
        for pixel in glyph.rows().flatten() {
            if !pixel.is_invisible() {
                assert_eq!(*pixel, Pixel::opaque(color));
            }
        }
    }

    #[test]
    fn test_colon_pattern() {
        let glyph = colon(Rgb::WHITE);
        assert_eq!(glyph.width(), 1);
        assert_eq!(glyph.height(), GLYPH_HEIGHT);
        assert_eq!(lit(&glyph), vec![vec![false], vec![false], vec![true], vec![true], vec![false]]);
    }

    #[test]
    fn test_clock_face_layout() {
        let face = ClockFace::new(1, 2, Rgb::WHITE);
        let mut buffer = FrameBuffer::new(20, 8);
        let time = NaiveTime::from_hms_opt(10, 47, 0).unwrap();

        assert_eq!(face.draw(&mut buffer, &time, &CancelToken::new()), DrawStatus::Finished);

        // "1" has its top cell in the middle column.
        assert_eq!(buffer.get(2, 2), Some(Rgb::WHITE));
        assert_eq!(buffer.get(1, 2), Some(Rgb::BLACK));
        // "0" left column at x = 1 + 4.
        assert_eq!(buffer.get(5, 4), Some(Rgb::WHITE));
        // Colon at x = 9, rows 4 and 5 relative to y = 2.
        assert_eq!(buffer.get(9, 3), Some(Rgb::BLACK));
        assert_eq!(buffer.get(9, 4), Some(Rgb::WHITE));
        assert_eq!(buffer.get(9, 5), Some(Rgb::WHITE));
        // "4" leaves the top middle cell dark, "7" does not.
        assert_eq!(buffer.get(12, 2), Some(Rgb::BLACK));
        assert_eq!(buffer.get(16, 2), Some(Rgb::WHITE));
        // Nothing past the last glyph.
        assert!((18..20).all(|x| (0..8).all(|y| buffer.get(x, y) == Some(Rgb::BLACK))));
    }
}
