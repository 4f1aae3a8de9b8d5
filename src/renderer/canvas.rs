//! Character canvas that panels are painted onto
//!
//! Cells are display cells: a wide glyph occupies its own cell plus a
//! continuation cell to its right. Writes are atomic for wide glyphs; a glyph
//! that does not fit inside the clip rectangle is not written at all.

use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::layout::Geometry;
use crate::theme::clip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Blank,
    Glyph(char),
    /// Right half of the wide glyph to the left
    Continuation,
}

/// Grid of cells with transparent painting and opaque clearing
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    blank: char,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, blank: char) -> Self {
        Self {
            width,
            height,
            blank,
            cells: vec![Cell::Blank; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// The rectangle cut down to what lies on the canvas
    pub fn clip_rect(&self, rect: Geometry) -> Geometry {
        let x = rect.x.min(self.width);
        let y = rect.y.min(self.height);
        Geometry::new(
            x,
            y,
            rect.right().min(self.width) - x,
            rect.bottom().min(self.height) - y,
        )
    }

    /// Paint text with its first line at the top-left of `rect`
    ///
    /// Spaces are transparent: only visible glyphs overwrite what is already
    /// on the canvas. Anything outside `rect` is clipped.
    pub fn paint(&mut self, text: &str, rect: Geometry) {
        let area = self.clip_rect(rect);
        for (row, line) in text.lines().enumerate() {
            let y = rect.y + row;
            if y >= area.bottom() {
                break;
            }
            let mut x = rect.x;
            for ch in line.chars() {
                let width = match ch.width() {
                    Some(w) if w > 0 => w,
                    // combining marks and control characters take no cell
                    _ => continue,
                };
                if x >= area.right() {
                    break;
                }
                if x + width > area.right() {
                    // wide glyph cut by the clip edge
                    break;
                }
                if ch != ' ' {
                    self.put(x, y, ch, width);
                }
                x += width;
            }
        }
    }

    /// Reset every cell in `rect` to blank, hiding what was painted below
    pub fn clear(&mut self, rect: Geometry) {
        let area = self.clip_rect(rect);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.release(x, y);
            }
            for x in area.x..area.right() {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = Cell::Blank;
                }
            }
        }
    }

    /// Clear `rect` and center `message` in it
    pub fn placeholder(&mut self, message: &str, rect: Geometry) {
        let area = self.clip_rect(rect);
        self.clear(area);
        if area.is_degenerate() {
            return;
        }
        let (clipped, width) = clip(message, area.width);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - 1) / 2;
        self.paint(&clipped, Geometry::new(x, y, width, 1));
    }

    fn put(&mut self, x: usize, y: usize, ch: char, width: usize) {
        for offset in 0..width {
            self.release(x + offset, y);
        }
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell::Glyph(ch);
        }
        for offset in 1..width {
            if let Some(i) = self.index(x + offset, y) {
                self.cells[i] = Cell::Continuation;
            }
        }
    }

    /// Blank out the other half of a wide glyph about to be overwritten
    fn release(&mut self, x: usize, y: usize) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        match self.cells[i] {
            Cell::Continuation if x > 0 => {
                self.cells[i - 1] = Cell::Blank;
                self.cells[i] = Cell::Blank;
            }
            Cell::Glyph(ch) if ch.width().unwrap_or(1) > 1 => {
                if let Some(tail) = self.index(x + 1, y) {
                    if self.cells[tail] == Cell::Continuation {
                        self.cells[tail] = Cell::Blank;
                    }
                }
            }
            _ => {}
        }
    }
}

/// `height` lines of exactly `width` display cells
impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return f.write_str(&"\n".repeat(self.height.saturating_sub(1)));
        }
        for (row, cells) in self.cells.chunks(self.width).enumerate() {
            if row > 0 {
                f.write_str("\n")?;
            }
            for cell in cells {
                match cell {
                    Cell::Blank => write!(f, "{}", self.blank)?,
                    Cell::Glyph(ch) => write!(f, "{ch}")?,
                    Cell::Continuation => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_canvas() {
        let canvas = Canvas::new(3, 2, '.');
        assert_eq!(canvas.to_string(), "...\n...");
    }

    #[test]
    fn test_paint_is_clipped_to_rect() {
        let mut canvas = Canvas::new(6, 2, '.');
        canvas.paint("abcdef\nghijkl\nmnop", Geometry::new(1, 0, 3, 1));
        assert_eq!(canvas.to_string(), ".bcd..\n......");
    }

    #[test]
    fn test_spaces_are_transparent() {
        let mut canvas = Canvas::new(5, 1, ' ');
        canvas.paint("xxxxx", Geometry::new(0, 0, 5, 1));
        canvas.paint("a b c", Geometry::new(0, 0, 5, 1));
        assert_eq!(canvas.to_string(), "axbxc");
    }

    #[test]
    fn test_clear_makes_area_opaque() {
        let mut canvas = Canvas::new(5, 1, '.');
        canvas.paint("xxxxx", Geometry::new(0, 0, 5, 1));
        canvas.clear(Geometry::new(1, 0, 3, 1));
        assert_eq!(canvas.to_string(), "x...x");
    }

    #[test]
    fn test_wide_glyphs_take_two_cells() {
        let mut canvas = Canvas::new(5, 1, '.');
        canvas.paint("日本", Geometry::new(0, 0, 5, 1));
        assert_eq!(canvas.to_string(), "日本.");
    }

    #[test]
    fn test_wide_glyph_cut_at_clip_edge() {
        let mut canvas = Canvas::new(4, 1, '.');
        canvas.paint("a日", Geometry::new(0, 0, 2, 1));
        assert_eq!(canvas.to_string(), "a...");
    }

    #[test]
    fn test_overwriting_half_of_wide_glyph() {
        let mut canvas = Canvas::new(4, 1, '.');
        canvas.paint("日本", Geometry::new(0, 0, 4, 1));
        canvas.paint("x", Geometry::new(1, 0, 1, 1));
        assert_eq!(canvas.to_string(), ".x本");
    }

    #[test]
    fn test_placeholder_is_centered() {
        let mut canvas = Canvas::new(10, 3, '.');
        canvas.placeholder("tiny", Geometry::new(0, 0, 10, 3));
        assert_eq!(canvas.to_string(), "..........\n...tiny...\n..........");
    }

    #[test]
    fn test_placeholder_clipped() {
        let mut canvas = Canvas::new(4, 1, ' ');
        canvas.placeholder("Window too small", Geometry::new(0, 0, 4, 1));
        assert_eq!(canvas.to_string(), "Wind");
    }

    #[test]
    fn test_rect_outside_canvas() {
        let mut canvas = Canvas::new(3, 1, '.');
        canvas.paint("abc", Geometry::new(5, 5, 3, 1));
        canvas.clear(Geometry::new(2, 0, 10, 10));
        assert_eq!(canvas.to_string(), "...");
    }
}
