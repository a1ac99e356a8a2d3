//! A `Surface` backed by a grid of terminal cells.
//!
//! The logical canvas is scaled onto `cols x rows` cells.  Each cell keeps
//! a background colour, blended by alpha, plus an optional glyph used by
//! text.  Nothing touches the terminal until `flush`.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};

use super::{Align, Surface};
use crate::geometry::Rect;

type Rgb = (u8, u8, u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub bg: Rgb,
    pub fg: Rgb,
    pub glyph: char,
}

const BLANK: Cell = Cell {
    bg: (0, 0, 0),
    fg: (255, 255, 255),
    glyph: ' ',
};

/// Approximate RGB for crossterm's named colours.
pub fn to_rgb(color: Color) -> Rgb {
    match color {
        Color::Rgb { r, g, b } => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::DarkGrey => (85, 85, 85),
        Color::Red => (255, 85, 85),
        Color::DarkRed => (170, 0, 0),
        Color::Green => (85, 255, 85),
        Color::DarkGreen => (0, 170, 0),
        Color::Yellow => (255, 255, 85),
        Color::DarkYellow => (170, 85, 0),
        Color::Blue => (85, 85, 255),
        Color::DarkBlue => (0, 0, 170),
        Color::Magenta => (255, 85, 255),
        Color::DarkMagenta => (170, 0, 170),
        Color::Cyan => (85, 255, 255),
        Color::DarkCyan => (0, 170, 170),
        Color::White => (255, 255, 255),
        Color::Grey => (170, 170, 170),
        _ => (128, 128, 128),
    }
}

fn blend(dst: Rgb, src: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |d: u8, s: u8| (d as f32 + (s as f32 - d as f32) * a).round() as u8;
    (mix(dst.0, src.0), mix(dst.1, src.1), mix(dst.2, src.2))
}

/// Cells whose centre lies in `[lo, hi)`, clipped to `0..count`.  A span
/// too thin to contain any centre still covers the cell under its middle.
fn span(lo: f32, hi: f32, cell: f32, count: usize) -> Option<(usize, usize)> {
    if count == 0 || !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return None;
    }
    let first = (lo / cell - 0.5).ceil();
    let last = (hi / cell - 0.5).ceil() - 1.0;
    let (first, last) = if first > last {
        let mid = ((lo + hi) / 2.0 / cell).floor();
        (mid, mid)
    } else {
        (first, last)
    };
    if last < 0.0 || first >= count as f32 {
        return None;
    }
    Some((first.max(0.0) as usize, (last as usize).min(count - 1)))
}

#[derive(Clone, Debug)]
pub struct TerminalSurface {
    cols: usize,
    rows: usize,
    width: f32,
    height: f32,
    offset: (f32, f32),
    cells: Vec<Cell>,
}

impl TerminalSurface {
    /// A `cols x rows` grid showing a `width x height` logical canvas.
    pub fn new(cols: u16, rows: u16, width: f32, height: f32) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Self {
            cols,
            rows,
            width,
            height,
            offset: (0.0, 0.0),
            cells: vec![BLANK; cols * rows],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols as usize;
        self.rows = rows as usize;
        self.cells = vec![BLANK; self.cols * self.rows];
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Logical pixels per cell.
    fn cell_size(&self) -> (f32, f32) {
        (
            self.width / self.cols.max(1) as f32,
            self.height / self.rows.max(1) as f32,
        )
    }

    fn paint(&mut self, col: usize, row: usize, color: Rgb, alpha: f32) {
        let idx = row * self.cols + col;
        if let Some(cell) = self.cells.get_mut(idx) {
            cell.bg = blend(cell.bg, color, alpha);
        }
    }

    /// Queue the whole grid starting at terminal row `top`, then flush.
    pub fn flush_to<W: Write>(&self, out: &mut W, top: u16) -> io::Result<()> {
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, top + row as u16))?;
            let mut current: Option<(Rgb, Rgb)> = None;
            for col in 0..self.cols {
                let cell = self.cells[row * self.cols + col];
                if current != Some((cell.bg, cell.fg)) {
                    let (r, g, b) = cell.bg;
                    out.queue(style::SetBackgroundColor(Color::Rgb { r, g, b }))?;
                    let (r, g, b) = cell.fg;
                    out.queue(style::SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some((cell.bg, cell.fg));
                }
                out.queue(Print(cell.glyph))?;
            }
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (f32, f32) {
        if self.cols == 0 || self.rows == 0 {
            return (0.0, 0.0);
        }
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
        self.offset = (0.0, 0.0);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    fn reset_transform(&mut self) {
        self.offset = (0.0, 0.0);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let (cw, ch) = self.cell_size();
        let (x, y) = (rect.x + self.offset.0, rect.y + self.offset.1);
        let Some((c0, c1)) = span(x, x + rect.width, cw, self.cols) else {
            return;
        };
        let Some((r0, r1)) = span(y, y + rect.height, ch, self.rows) else {
            return;
        };
        let rgb = to_rgb(color);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.paint(col, row, rgb, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32) {
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        let (cw, ch) = self.cell_size();
        let (cx, cy) = (cx + self.offset.0, cy + self.offset.1);
        let Some((c0, c1)) = span(cx - radius, cx + radius, cw, self.cols) else {
            return;
        };
        let Some((r0, r1)) = span(cy - radius, cy + radius, ch, self.rows) else {
            return;
        };
        let rgb = to_rgb(color);
        let mut painted = false;
        for row in r0..=r1 {
            for col in c0..=c1 {
                let px = (col as f32 + 0.5) * cw - cx;
                let py = (row as f32 + 0.5) * ch - cy;
                if px * px + py * py <= radius * radius {
                    self.paint(col, row, rgb, alpha);
                    painted = true;
                }
            }
        }
        if !painted {
            let (col, row) = ((cx / cw).floor(), (cy / ch).floor());
            if col >= 0.0 && row >= 0.0 && (col as usize) < self.cols && (row as usize) < self.rows {
                self.paint(col as usize, row as usize, rgb, alpha);
            }
        }
    }

    fn fill_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]) {
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return;
        };
        let (cw, ch) = self.cell_size();
        let (x, y) = (rect.x + self.offset.0, rect.y + self.offset.1);
        let Some((c0, c1)) = span(x, x + rect.width, cw, self.cols) else {
            return;
        };
        let Some((r0, r1)) = span(y, y + rect.height, ch, self.rows) else {
            return;
        };
        for row in r0..=r1 {
            let t = (((row as f32 + 0.5) * ch - y) / rect.height).clamp(0.0, 1.0);
            let color = stops
                .windows(2)
                .find(|pair| t >= pair[0].0 && t <= pair[1].0)
                .map(|pair| {
                    let (a, b) = (pair[0], pair[1]);
                    let local = if b.0 > a.0 { (t - a.0) / (b.0 - a.0) } else { 0.0 };
                    blend(to_rgb(a.1), to_rgb(b.1), local)
                })
                .unwrap_or_else(|| {
                    if t < first.0 {
                        to_rgb(first.1)
                    } else {
                        to_rgb(last.1)
                    }
                });
            for col in c0..=c1 {
                self.paint(col, row, color, 1.0);
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, align: Align) {
        let (cw, ch) = self.cell_size();
        let (x, y) = (x + self.offset.0, y + self.offset.1);
        let len = text.chars().count() as f32;
        let start = match align {
            Align::Left => (x / cw).floor(),
            Align::Center => (x / cw - len / 2.0).floor(),
            Align::Right => (x / cw - len).floor(),
        };
        let row = (y / ch).floor();
        if row < 0.0 || row as usize >= self.rows {
            return;
        }
        let row = row as usize;
        let fg = to_rgb(color);
        for (i, glyph) in text.chars().enumerate() {
            let col = start + i as f32;
            if col < 0.0 || col as usize >= self.cols {
                continue;
            }
            let idx = row * self.cols + col as usize;
            if let Some(cell) = self.cells.get_mut(idx) {
                cell.glyph = glyph;
                cell.fg = fg;
            }
        }
    }
}
