use crate::render::{begin_frame, draw_overlay_popup, end_frame, set_colors, write_hud, write_size_mismatch, Frame, Renderer};
use std::io::Write;

/// Bit for dot `(dx, dy)` at index `dy * 2 + dx`.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// 2x4 pixels per cell. Pixels brighter than the cell's mid-luma become
/// dots; dots and gaps each take their average color.
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct ColorAcc {
    r: u32,
    g: u32,
    b: u32,
    n: u32,
}

impl ColorAcc {
    fn add(&mut self, (r, g, b): (u8, u8, u8)) {
        self.r += u32::from(r);
        self.g += u32::from(g);
        self.b += u32::from(b);
        self.n += 1;
    }

    fn mean(&self) -> Option<(u8, u8, u8)> {
        (self.n > 0).then(|| ((self.r / self.n) as u8, (self.g / self.n) as u8, (self.b / self.n) as u8))
    }
}

/// Glyph plus foreground/background for one 2x4 block.
pub(crate) fn encode_cell(rgb: &[(u8, u8, u8); 8]) -> (char, (u8, u8, u8), (u8, u8, u8)) {
    let lum = rgb.map(|(r, g, b)| luma(r, g, b));
    let min_l = lum.iter().copied().min().unwrap_or(0);
    let max_l = lum.iter().copied().max().unwrap_or(0);
    let thr = (min_l + max_l) / 2;

    let mut bits = 0u8;
    let mut on = ColorAcc::default();
    let mut off = ColorAcc::default();
    for i in 0..8 {
        if lum[i] > thr {
            bits |= DOT_BITS[i];
            on.add(rgb[i]);
        } else {
            off.add(rgb[i]);
        }
    }

    let bg = off.mean();
    match on.mean() {
        None => {
            let c = bg.unwrap_or((0, 0, 0));
            (' ', c, c)
        }
        Some(fg) => {
            let ch = char::from_u32(0x2800 + u32::from(bits)).unwrap_or(' ');
            (ch, fg, bg.unwrap_or(fg))
        }
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if w != cols * 2 || h != visual_rows * 4 || !frame.has_pixels() {
            return write_size_mismatch(frame, out);
        }

        begin_frame(out, frame.sync_updates)?;
        out.write_all(b"\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            for col in 0..cols {
                let cell = std::array::from_fn(|i| {
                    let x = col * 2 + i % 2;
                    let y = row * 4 + i / 2;
                    let idx = (y * w + x) * 4;
                    (frame.pixels_rgba[idx], frame.pixels_rgba[idx + 1], frame.pixels_rgba[idx + 2])
                });
                let (ch, fg, bg) = encode_cell(&cell);
                set_colors(out, &mut self.last_fg, &mut self.last_bg, fg, bg)?;
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        write_hud(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }
        out.write_all(b"\x1b[?7h")?;
        end_frame(out, frame.sync_updates)
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u16 {
    // Rec.709 weights in 8-bit fixed point.
    ((u32::from(r) * 54 + u32::from(g) * 183 + u32::from(b) * 19) >> 8) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_cell_is_blank() {
        let (ch, fg, bg) = encode_cell(&[(0, 0, 0); 8]);
        assert_eq!(ch, ' ');
        assert_eq!(fg, bg);
    }

    #[test]
    fn single_bright_pixel_sets_its_dot() {
        let mut cell = [(0, 0, 0); 8];
        cell[3] = (255, 200, 100);
        let (ch, fg, bg) = encode_cell(&cell);
        assert_eq!(ch, char::from_u32(0x2800 + 0x10).unwrap());
        assert_eq!(fg, (255, 200, 100));
        assert_eq!(bg, (0, 0, 0));
    }
}
