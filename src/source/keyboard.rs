use super::{draw_gauge, ControlSource};
use crate::control::RawControlReading;
use crate::raster::PreviewImage;
use crossterm::event::KeyCode;

const STEP: f32 = 0.02;
/// Openness covered by the full height of the preview gauges.
const GAUGE_SPAN: f32 = 0.4;

/// Terminal keys nudge two virtual hand openness values.
///
/// `a`/`z` left up/down, `k`/`m` right up/down, `x`/`,` toggle a hand in or
/// out of view, `0` relaxes both.
pub struct KeyboardSource {
    left: f32,
    right: f32,
    left_present: bool,
    right_present: bool,
    preview: PreviewImage,
}

impl KeyboardSource {
    pub fn new() -> Self {
        let mut s = Self {
            left: 0.0,
            right: 0.0,
            left_present: true,
            right_present: true,
            preview: PreviewImage::new(24, 16),
        };
        s.redraw();
        s
    }

    fn redraw(&mut self) {
        let left = self.left_present.then_some(self.left / GAUGE_SPAN);
        let right = self.right_present.then_some(self.right / GAUGE_SPAN);
        self.preview.clear();
        draw_gauge(&mut self.preview, 2, 8, left, [0, 220, 90]);
        draw_gauge(&mut self.preview, 14, 8, right, [230, 40, 40]);
    }
}

impl Default for KeyboardSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSource for KeyboardSource {
    fn label(&self) -> &'static str {
        "keyboard"
    }

    fn read(&mut self, _elapsed: f64) -> RawControlReading {
        RawControlReading {
            left: self.left_present.then_some(self.left),
            right: self.right_present.then_some(self.right),
        }
    }

    fn preview(&self) -> Option<&PreviewImage> {
        Some(&self.preview)
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('a') => self.left = (self.left + STEP).min(1.0),
            KeyCode::Char('z') => self.left = (self.left - STEP).max(0.0),
            KeyCode::Char('k') => self.right = (self.right + STEP).min(1.0),
            KeyCode::Char('m') => self.right = (self.right - STEP).max(0.0),
            KeyCode::Char('x') => self.left_present = !self.left_present,
            KeyCode::Char(',') => self.right_present = !self.right_present,
            KeyCode::Char('0') => {
                self.left = 0.0;
                self.right = 0.0;
            }
            _ => return false,
        }
        self.redraw();
        true
    }
}
