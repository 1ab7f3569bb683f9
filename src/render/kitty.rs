use crate::render::{begin_frame, draw_overlay_popup, end_frame, write_hud, write_size_mismatch, Frame, Renderer};
use anyhow::Context;
use base64::Engine;
use std::io::Write;

/// 3072 raw bytes encode to 4096 base64 bytes, the protocol's chunk limit.
const RAW_CHUNK: usize = 3 * 1024;

/// Kitty graphics protocol, pixels sent inline as chunked base64 RGBA.
pub struct KittyRenderer {
    image_id: u32,
    b64_buf: Vec<u8>,
    overlay_visible_last: bool,
    last_hud_rows: u16,
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            b64_buf: Vec::new(),
            overlay_visible_last: false,
            last_hud_rows: 0,
        }
    }
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if !frame.has_pixels() {
            return write_size_mismatch(frame, out);
        }

        begin_frame(out, frame.sync_updates)?;

        if let Some(text) = frame.overlay {
            // The image sits above the text layer; drop it while the popup is up.
            write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)?;
            clear_text_rows(out, frame.term_rows as usize)?;
            write_hud(out, frame)?;
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
            self.overlay_visible_last = true;
            self.last_hud_rows = frame.hud_rows;
            return end_frame(out, frame.sync_updates);
        }

        let len = w * h * 4;
        write_direct_rgba(out, &frame.pixels_rgba[..len], w, h, cols, visual_rows, self.image_id, &mut self.b64_buf)?;

        if frame.hud_rows != self.last_hud_rows {
            clear_text_rows(out, frame.term_rows as usize)?;
        } else if self.overlay_visible_last {
            clear_text_rows(out, visual_rows)?;
        }
        write_hud(out, frame)?;

        self.overlay_visible_last = false;
        self.last_hud_rows = frame.hud_rows;
        end_frame(out, frame.sync_updates)
    }
}

/// Transmit-and-display (`a=T`) with the payload split into `m=1` chunks.
/// Reusing one image id replaces the previous frame in place.
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_direct_rgba(
    out: &mut dyn Write,
    rgba: &[u8],
    w: usize,
    h: usize,
    cols: usize,
    rows: usize,
    image_id: u32,
    b64_buf: &mut Vec<u8>,
) -> anyhow::Result<()> {
    if rgba.is_empty() {
        return Ok(());
    }

    let mut chunks = rgba.chunks(RAW_CHUNK).peekable();
    let mut first = true;
    while let Some(chunk) = chunks.next() {
        let b64_len = chunk.len().div_ceil(3) * 4;
        if b64_buf.len() < b64_len {
            b64_buf.resize(b64_len, 0);
        }
        let written = base64::engine::general_purpose::STANDARD
            .encode_slice(chunk, &mut b64_buf[..b64_len])
            .context("base64 encode pixels")?;

        let more = u8::from(chunks.peek().is_some());
        if first {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={w},v={h},t=d,i={image_id},c={cols},r={rows},C=1,q=2,z=-1,m={more};"
            )?;
            first = false;
        } else {
            write!(out, "\x1b_Gm={more};")?;
        }
        out.write_all(&b64_buf[..written])?;
        out.write_all(b"\x1b\\")?;
    }
    Ok(())
}

fn clear_text_rows(out: &mut dyn Write, rows: usize) -> anyhow::Result<()> {
    for row in 1..=rows {
        write!(out, "\x1b[{row};1H\x1b[0m\x1b[2K")?;
    }
    Ok(())
}
