use std::io::{self, Write};

use dayframe_render::{FrameBuffer, Rgb};

const UPPER_HALF: char = '\u{2580}';

/// Prints the framebuffer with 24-bit colors, two panel rows per text line.
pub fn render<W: Write>(buffer: &FrameBuffer, out: &mut W) -> io::Result<()> {
    let rows: Vec<&[Rgb]> = buffer.rows().collect();
    for pair in rows.chunks(2) {
        let top = pair[0];
        for (x, upper) in top.iter().enumerate() {
            let lower = pair.get(1).and_then(|row| row.get(x)).copied().unwrap_or(Rgb::BLACK);
            write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}",
                upper.r, upper.g, upper.b, lower.r, lower.g, lower.b, UPPER_HALF
            )?;
        }
        writeln!(out, "\x1b[0m")?;
    }
    out.flush()
}

/// Moves the cursor back to the top-left corner so the next frame overdraws.
pub fn home<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[H")
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[2J\x1b[H")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use dayframe_render::Canvas;

    use super::*;

    #[test]
    fn test_two_rows_share_a_line() {
        let mut buffer = FrameBuffer::new(2, 3);
        buffer.set_pixel(1, 0, Rgb::new(255, 0, 0));
        buffer.set_pixel(1, 1, Rgb::new(0, 0, 255));

        let mut out = Vec::new();
        render(&buffer, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.matches(UPPER_HALF).count(), 4);
        assert!(text.contains("\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m"));
    }
}
