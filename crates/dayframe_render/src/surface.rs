use crate::cancel::{CancelToken, DrawStatus};
use crate::canvas::Canvas;
use crate::pixel::Pixel;

/// Immutable grid of pixels stored row-major in one buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Surface {
    /// Wraps a row-major buffer, or `None` when it does not hold exactly
    /// `width * height` pixels.
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Option<Self> {
        (width * height == pixels.len()).then_some(Self { width, height, pixels })
    }

    /// Builds a surface from rows that may differ in length.
    ///
    /// Short rows are padded with transparent pixels up to the widest row.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Pixel>,
    {
        let rows: Vec<Vec<Pixel>> = rows.into_iter().map(|row| row.into_iter().collect()).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = if width == 0 { 0 } else { rows.len() };

        let mut pixels = Vec::with_capacity(width * height);
        for mut row in rows.into_iter().take(height) {
            row.resize(width, Pixel::TRANSPARENT);
            pixels.extend(row);
        }

        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        self.pixels.chunks(self.width.max(1))
    }

    /// Composites the surface onto `canvas` with its top-left corner at `(x, y)`.
    ///
    /// Invisible pixels leave the canvas untouched. No clipping happens here,
    /// the caller keeps the surface within the panel. The token is checked
    /// before every row; a cancelled draw leaves a partial frame behind.
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        x: i32,
        y: i32,
        cancel: &CancelToken,
    ) -> DrawStatus {
        for (row_index, row) in self.rows().enumerate() {
            if cancel.is_cancelled() {
                return DrawStatus::Cancelled;
            }

            let target_y = y + row_index as i32;
            for (column, pixel) in row.iter().enumerate() {
                if pixel.is_invisible() {
                    continue;
                }
                canvas.set_pixel(x + column as i32, target_y, pixel.rgb());
            }
        }

        DrawStatus::Finished
    }
}
