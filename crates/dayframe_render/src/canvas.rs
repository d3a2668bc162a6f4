use crate::pixel::Rgb;

/// Write-only view of the physical panel.
///
/// Implementations decide what happens to coordinates outside
/// `0..width` x `0..height`; callers are expected not to produce them.
pub trait Canvas {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb);
    fn fill(&mut self, color: Rgb);

    fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }
}

/// In-memory panel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Rgb>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![Rgb::BLACK; width * height] }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> + '_ {
        self.cells.chunks(self.width.max(1))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

impl Canvas for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    /// Out of range writes are dropped, like the panel driver does.
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] = color;
        }
    }

    fn fill(&mut self, color: Rgb) {
        self.cells.fill(color);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_ignores_out_of_range_writes() {
        let mut buffer = FrameBuffer::new(4, 2);
        buffer.set_pixel(-1, 0, Rgb::WHITE);
        buffer.set_pixel(4, 0, Rgb::WHITE);
        buffer.set_pixel(0, 2, Rgb::WHITE);
        assert!(buffer.rows().flatten().all(|cell| *cell == Rgb::BLACK));

        buffer.set_pixel(3, 1, Rgb::WHITE);
        assert_eq!(buffer.get(3, 1), Some(Rgb::WHITE));
        assert_eq!(buffer.get(4, 1), None);
    }

    #[test]
    fn test_clear_fills_black() {
        let mut buffer = FrameBuffer::new(2, 2);
        buffer.fill(Rgb::new(1, 2, 3));
        assert_eq!(buffer.get(1, 1), Some(Rgb::new(1, 2, 3)));
        buffer.clear();
        assert_eq!(buffer.rows().count(), 2);
        assert!(buffer.rows().flatten().all(|cell| *cell == Rgb::BLACK));
    }
}
