use crate::render::{begin_frame, draw_overlay_popup, end_frame, set_colors, write_hud, write_size_mismatch, Frame, Renderer};
use std::io::Write;

const HALF_BLOCK: char = '\u{2580}';

/// One upper-half block per cell: foreground is the top pixel, background the bottom.
pub struct HalfBlockRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if w != cols || h != visual_rows * 2 || !frame.has_pixels() {
            return write_size_mismatch(frame, out);
        }

        begin_frame(out, frame.sync_updates)?;
        // Autowrap off while painting full-width rows.
        out.write_all(b"\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        let px = |x: usize, y: usize| {
            let i = (y * w + x) * 4;
            (frame.pixels_rgba[i], frame.pixels_rgba[i + 1], frame.pixels_rgba[i + 2])
        };

        for row in 0..visual_rows {
            for x in 0..cols {
                set_colors(out, &mut self.last_fg, &mut self.last_bg, px(x, row * 2), px(x, row * 2 + 1))?;
                write!(out, "{HALF_BLOCK}")?;
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
