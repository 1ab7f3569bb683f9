mod braille;
mod halfblock;
mod kitty;

pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use crate::config::RendererMode;
use std::io::Write;

/// One resolved frame plus the text that goes around it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    /// Terminal rows covered by the image; HUD rows follow.
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

impl Frame<'_> {
    fn has_pixels(&self) -> bool {
        self.pixels_rgba.len() >= self.pixel_width.saturating_mul(self.pixel_height).saturating_mul(4)
    }
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    }
}

fn begin_frame(out: &mut dyn Write, sync: bool) -> anyhow::Result<()> {
    if sync {
        out.write_all(b"\x1b[?2026h")?;
    }
    out.write_all(b"\x1b[H\x1b[0m")?;
    Ok(())
}

fn end_frame(out: &mut dyn Write, sync: bool) -> anyhow::Result<()> {
    if sync {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

/// Shown instead of the image when the buffer does not match the grid.
fn write_size_mismatch(frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    begin_frame(out, frame.sync_updates)?;
    out.write_all(b"\x1b[2J")?;
    write!(
        out,
        "pixel buffer mismatch ({}x{}, {} bytes)",
        frame.pixel_width,
        frame.pixel_height,
        frame.pixels_rgba.len()
    )?;
    end_frame(out, frame.sync_updates)
}

fn write_hud(out: &mut dyn Write, frame: &Frame<'_>) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let mut lines = frame.hud.lines();
    for i in 0..frame.hud_rows as usize {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", frame.visual_rows as usize + i + 1)?;
        if let Some(line) = lines.next() {
            let clipped = line.char_indices().nth(cols).map_or(line, |(idx, _)| &line[..idx]);
            write!(out, "{clipped}")?;
        }
    }
    Ok(())
}

#[inline]
fn set_colors(
    out: &mut dyn Write,
    last_fg: &mut Option<(u8, u8, u8)>,
    last_bg: &mut Option<(u8, u8, u8)>,
    fg: (u8, u8, u8),
    bg: (u8, u8, u8),
) -> anyhow::Result<()> {
    if *last_fg != Some(fg) {
        write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
        *last_fg = Some(fg);
    }
    if *last_bg != Some(bg) {
        write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
        *last_bg = Some(bg);
    }
    Ok(())
}

/// Centered boxed text over a dark backdrop. The first line is the title.
pub fn draw_overlay_popup(out: &mut dyn Write, term_cols: u16, term_rows: u16, text: &str) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner_w = cols.saturating_sub(6).max(1);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let chars = raw.chars().collect::<Vec<_>>();
        lines.extend(chars.chunks(max_inner_w).map(|c| c.iter().collect::<String>()));
    }

    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner_w);
    let box_w = (inner_w + 4).min(cols.saturating_sub(2)).max(4);
    let inner_w = box_w.saturating_sub(4);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);

    let start_col = cols.saturating_sub(box_w) / 2 + 1;
    let start_row = rows.saturating_sub(box_h) / 2 + 1;

    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(inner_w);
    // EL2 per row instead of writing `cols` spaces avoids edge-wrap artifacts.
    out.write_all(b"\x1b[0m\x1b[38;2;220;228;242m\x1b[48;2;2;4;10m")?;
    for row in 1..=rows {
        write!(out, "\x1b[{row};1H\x1b[2K")?;
    }

    out.write_all(b"\x1b[0m\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m")?;
    write!(out, "\x1b[{start_row};{start_col}H+{horiz}+")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{row};{start_col}H| {blank} |")?;
        if i == 0 {
            write!(
                out,
                "\x1b[{};{}H\x1b[1m\x1b[38;2;255;236;160m{}\x1b[22m\x1b[38;2;236;242;255m",
                row,
                start_col + 2,
                line
            )?;
        } else {
            write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
        }
    }
    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
